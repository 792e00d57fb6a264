//! REG: proof of knowledge of an ElGamal-exp plaintext/randomness pair
//! (spec §4.2).
//!
//! Statement: ciphertext `(A, B) = (G^r, ek^r * G^m)` under public key
//! `ek`. Proves knowledge of `(m, r)` without revealing either.

use generic_ec::{Curve, Point, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "REG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<C: Curve> {
    pub g: Point<C>,
    pub ek: Point<C>,
    pub a: Point<C>,
    pub b: Point<C>,
}

/// Witness: `(m, r)`, the plaintext and encryption randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness<C: Curve> {
    pub m: Scalar<C>,
    pub r: Scalar<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment<C: Curve> {
    pub y1: Point<C>,
    pub y2: Point<C>,
}

pub type Challenge<C> = Scalar<C>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proof<C: Curve> {
    pub z1: Scalar<C>,
    pub z2: Scalar<C>,
}

struct Nonces<C: Curve> {
    alpha: Scalar<C>,
    beta: Scalar<C>,
}

fn append_statement<C: Curve>(t: &mut Transcript, stmt: &Statement<C>) {
    t.append("g", stmt.g.to_bytes(true).as_bytes());
    t.append("ek", stmt.ek.to_bytes(true).as_bytes());
    t.append("a", stmt.a.to_bytes(true).as_bytes());
    t.append("b", stmt.b.to_bytes(true).as_bytes());
}

fn commit<C: Curve, R: RngCore + CryptoRng>(
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Nonces<C>) {
    let alpha = Scalar::<C>::random(rng);
    let beta = Scalar::<C>::random(rng);
    (
        Commitment {
            y1: stmt.g * beta,
            y2: stmt.ek * beta + stmt.g * alpha,
        },
        Nonces { alpha, beta },
    )
}

fn challenge<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
) -> Challenge<C> {
    append_statement(transcript, stmt);
    transcript.append("commitment.y1", commitment.y1.to_bytes(true).as_bytes());
    transcript.append("commitment.y2", commitment.y2.to_bytes(true).as_bytes());
    let bytes = transcript.extract("challenge", 64);
    Scalar::<C>::from_be_bytes_mod_order(&bytes)
}

fn prove<C: Curve>(witness: &Witness<C>, nonces: &Nonces<C>, challenge: &Challenge<C>) -> Proof<C> {
    Proof {
        z1: nonces.beta + challenge * witness.r,
        z2: nonces.alpha + challenge * witness.m,
    }
}

pub fn verify<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
    proof: &Proof<C>,
) -> Result<(), InvalidProof> {
    let c = challenge(transcript, stmt, commitment);
    if stmt.g * proof.z1 != commitment.y1 + stmt.a * c {
        return Err(InvalidProof::new(TAG, "eq1"));
    }
    if stmt.ek * proof.z1 + stmt.g * proof.z2 != commitment.y2 + stmt.b * c {
        return Err(InvalidProof::new(TAG, "eq2"));
    }
    Ok(())
}

pub fn compute_proof<C: Curve, R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &Witness<C>,
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Proof<C>) {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let (commitment, nonces) = commit(stmt, rng);
    let challenge = challenge(&mut transcript, stmt, &commitment);
    let proof = prove(witness, &nonces, &challenge);
    (commitment, proof)
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
    use crate::elgamal_exp;
    use generic_ec::{Point, SecretScalar};
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(3)
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let ek = g * d.as_ref();

        let m = Scalar::<C>::from(42);
        let r = Scalar::<C>::random(&mut rng);
        let ct = elgamal_exp::encrypt(&elgamal_exp::PublicKey { g, ek }, m, r);

        let stmt = Statement { g, ek, a: ct.u, b: ct.v };
        let witness = Witness { m, r };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_ok());
    }

    #[test]
    fn wrong_message_fails() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let ek = g * d.as_ref();

        let m = Scalar::<C>::from(42);
        let r = Scalar::<C>::random(&mut rng);
        let ct = elgamal_exp::encrypt(&elgamal_exp::PublicKey { g, ek }, m, r);

        let stmt = Statement { g, ek, a: ct.u, b: ct.v };
        let witness = Witness { m: Scalar::<C>::from(43), r };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_err());
    }
}
