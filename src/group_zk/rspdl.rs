//! RSPDL: scalar-product-with-discrete-log proof (spec §4.2).
//!
//! Given `(A, B)` and `X = G^x`, statement `(A' = A*x + G*r, B' = B*x +
//! G*r)`: the *same* scalar `x` that is the discrete log of `X` is also
//! used to scale both `A` and `B`, sharing one blinding factor `r`. Used by
//! [`crate::sm2`] to bind a party's signing share `x_i` (public as `Q_i =
//! G^{x_i}`) to the scalar it used to multiply its aggregated ElGamal
//! ciphertext.

use generic_ec::{Curve, Point, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "RSPDL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<C: Curve> {
    pub g: Point<C>,
    pub a: Point<C>,
    pub b: Point<C>,
    pub x: Point<C>,
    pub a_prime: Point<C>,
    pub b_prime: Point<C>,
}

/// Witness: `(x, r)`, the shared scalar and the shared blinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness<C: Curve> {
    pub x: Scalar<C>,
    pub r: Scalar<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment<C: Curve> {
    pub k: Point<C>,
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
    t.append("a", stmt.a.to_bytes(true).as_bytes());
    t.append("b", stmt.b.to_bytes(true).as_bytes());
    t.append("x", stmt.x.to_bytes(true).as_bytes());
    t.append("a_prime", stmt.a_prime.to_bytes(true).as_bytes());
    t.append("b_prime", stmt.b_prime.to_bytes(true).as_bytes());
}

fn commit<C: Curve, R: RngCore + CryptoRng>(
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Nonces<C>) {
    let alpha = Scalar::<C>::random(rng);
    let beta = Scalar::<C>::random(rng);
    (
        Commitment {
            k: stmt.g * alpha,
            y1: stmt.a * alpha + stmt.g * beta,
            y2: stmt.b * alpha + stmt.g * beta,
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
    transcript.append("commitment.k", commitment.k.to_bytes(true).as_bytes());
    transcript.append("commitment.y1", commitment.y1.to_bytes(true).as_bytes());
    transcript.append("commitment.y2", commitment.y2.to_bytes(true).as_bytes());
    let bytes = transcript.extract("challenge", 64);
    Scalar::<C>::from_be_bytes_mod_order(&bytes)
}

fn prove<C: Curve>(witness: &Witness<C>, nonces: &Nonces<C>, challenge: &Challenge<C>) -> Proof<C> {
    Proof {
        z1: nonces.alpha + challenge * witness.x,
        z2: nonces.beta + challenge * witness.r,
    }
}

pub fn verify<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
    proof: &Proof<C>,
) -> Result<(), InvalidProof> {
    let c = challenge(transcript, stmt, commitment);
    if stmt.g * proof.z1 != commitment.k + stmt.x * c {
        return Err(InvalidProof::new(TAG, "eq-dlog"));
    }
    if stmt.a * proof.z1 + stmt.g * proof.z2 != commitment.y1 + stmt.a_prime * c {
        return Err(InvalidProof::new(TAG, "eq1"));
    }
    if stmt.b * proof.z1 + stmt.g * proof.z2 != commitment.y2 + stmt.b_prime * c {
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
    use generic_ec::{Point, SecretScalar};
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(5)
    }

    fn setup(rng: &mut impl RngCore) -> (Statement<C>, Witness<C>) {
        let g = Point::<C>::generator();
        let a = g * Scalar::<C>::from(13);
        let b = g * Scalar::<C>::from(29);
        let x = SecretScalar::<C>::random(rng);
        let r = Scalar::<C>::random(rng);
        let x_pub = g * x.as_ref();
        let a_prime = a * x.as_ref() + g * r;
        let b_prime = b * x.as_ref() + g * r;
        (
            Statement { g, a, b, x: x_pub, a_prime, b_prime },
            Witness { x: *x.as_ref(), r },
        )
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let (stmt, witness) = setup(&mut rng);
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_ok());
    }

    #[test]
    fn mismatched_scalar_fails() {
        let mut rng = rng();
        let (stmt, mut witness) = setup(&mut rng);
        witness.x = witness.x + Scalar::<C>::from(1);
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_err());
    }
}
