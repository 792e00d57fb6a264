//! Chaum–Pedersen equal-discrete-log proof (spec §4.2).
//!
//! Statement: `(G1^x, G2^x)` for two independently chosen base points.
//! Proves the *same* `x` is the discrete log of both, without revealing it.
//! A single response, two commitments.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "CP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<C: Curve> {
    pub g1: Point<C>,
    pub g2: Point<C>,
    pub x1: Point<C>,
    pub x2: Point<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment<C: Curve> {
    pub k1: Point<C>,
    pub k2: Point<C>,
}

pub type Challenge<C> = Scalar<C>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proof<C: Curve> {
    pub s: Scalar<C>,
}

fn append_statement<C: Curve>(t: &mut Transcript, stmt: &Statement<C>) {
    t.append("g1", stmt.g1.to_bytes(true).as_bytes());
    t.append("g2", stmt.g2.to_bytes(true).as_bytes());
    t.append("x1", stmt.x1.to_bytes(true).as_bytes());
    t.append("x2", stmt.x2.to_bytes(true).as_bytes());
}

pub fn commit<C: Curve, R: RngCore + CryptoRng>(
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Scalar<C>) {
    let k = Scalar::<C>::random(rng);
    (
        Commitment {
            k1: stmt.g1 * k,
            k2: stmt.g2 * k,
        },
        k,
    )
}

pub fn challenge<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
) -> Challenge<C> {
    append_statement(transcript, stmt);
    transcript.append("commitment.k1", commitment.k1.to_bytes(true).as_bytes());
    transcript.append("commitment.k2", commitment.k2.to_bytes(true).as_bytes());
    let bytes = transcript.extract("challenge", 64);
    Scalar::<C>::from_be_bytes_mod_order(&bytes)
}

pub fn prove<C: Curve>(witness: &Scalar<C>, nonce: &Scalar<C>, challenge: &Challenge<C>) -> Proof<C> {
    Proof {
        s: challenge * witness + nonce,
    }
}

pub fn verify<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
    proof: &Proof<C>,
) -> Result<(), InvalidProof> {
    let c = challenge(transcript, stmt, commitment);
    if stmt.g1 * proof.s != commitment.k1 + stmt.x1 * c {
        return Err(InvalidProof::new(TAG, "eq1"));
    }
    if stmt.g2 * proof.s != commitment.k2 + stmt.x2 * c {
        return Err(InvalidProof::new(TAG, "eq2"));
    }
    Ok(())
}

pub fn compute_proof<C: Curve, R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &SecretScalar<C>,
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Proof<C>) {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let (commitment, nonce) = commit(stmt, rng);
    let challenge = challenge(&mut transcript, stmt, &commitment);
    let proof = prove(witness.as_ref(), &nonce, &challenge);
    (commitment, proof)
}

/// `ProveWithStatement`: identical to [`compute_proof`], provided as a
/// distinct name because callers in [`crate::sm2`] already hold
/// `(X1, X2)` computed elsewhere and want that made explicit at the call
/// site (spec §4.2: "accepts externally-supplied `(G1^x, G2^x)`").
pub fn prove_with_statement<C: Curve, R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &SecretScalar<C>,
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Proof<C>) {
    compute_proof(sid, witness, stmt, rng)
}

pub fn verify_proof<C: Curve>(
    sid: &[u8],
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
    proof: &Proof<C>,
) -> Result<(), InvalidProof> {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    verify(&mut transcript, stmt, commitment, proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec::Point;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(2)
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let g1 = Point::<C>::generator();
        let g2 = Point::<C>::generator() * Scalar::<C>::from(7);
        let stmt = Statement {
            g1,
            g2,
            x1: g1 * witness.as_ref(),
            x2: g2 * witness.as_ref(),
        };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_ok());
    }

    #[test]
    fn mismatched_witness_fails() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let other = SecretScalar::<C>::random(&mut rng);
        let g1 = Point::<C>::generator();
        let g2 = Point::<C>::generator() * Scalar::<C>::from(7);
        let stmt = Statement {
            g1,
            g2,
            x1: g1 * witness.as_ref(),
            x2: g2 * other.as_ref(),
        };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_err());
    }
}
