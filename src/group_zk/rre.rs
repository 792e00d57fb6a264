//! RRE: proof of knowledge of an ElGamal rerandomization relation (spec
//! §4.2).
//!
//! Given `(A, B)`, statement `(A', B') = (A*s + G^r, B*s + ek^r)`: the same
//! pair `(s, r)` both scales the original ciphertext and re-blinds it.
//! Used by [`crate::sm2`] whenever one party must prove that a published
//! ciphertext is an honest rerandomization of an earlier one.

use generic_ec::{Curve, Point, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "RRE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<C: Curve> {
    pub g: Point<C>,
    pub ek: Point<C>,
    pub a: Point<C>,
    pub b: Point<C>,
    pub a_prime: Point<C>,
    pub b_prime: Point<C>,
}

/// Witness: `(s, r)`, the scale factor and re-blinding randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness<C: Curve> {
    pub s: Scalar<C>,
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
            y1: stmt.a * beta + stmt.g * alpha,
            y2: stmt.b * beta + stmt.ek * alpha,
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
        z1: nonces.beta + challenge * witness.s,
        z2: nonces.alpha + challenge * witness.r,
    }
}

pub fn verify<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
    proof: &Proof<C>,
) -> Result<(), InvalidProof> {
    let c = challenge(transcript, stmt, commitment);
    if stmt.a * proof.z1 + stmt.g * proof.z2 != commitment.y1 + stmt.a_prime * c {
        return Err(InvalidProof::new(TAG, "eq1"));
    }
    if stmt.b * proof.z1 + stmt.ek * proof.z2 != commitment.y2 + stmt.b_prime * c {
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
        rand_chacha::ChaCha20Rng::seed_from_u64(4)
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let pk = elgamal_exp::derive_public_key(g, &d);

        let m = Scalar::<C>::from(11);
        let (ct, _) = elgamal_exp::encrypt_fresh(&pk, m, &mut rng);

        let s = Scalar::<C>::from(3);
        let r = Scalar::<C>::random(&mut rng);
        let rerand = elgamal_exp::rerandomize(&pk, &ct, s, r);

        let stmt = Statement {
            g,
            ek: pk.ek,
            a: ct.u,
            b: ct.v,
            a_prime: rerand.u,
            b_prime: rerand.v,
        };
        let witness = Witness { s, r };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_ok());
    }

    #[test]
    fn wrong_scale_fails() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let pk = elgamal_exp::derive_public_key(g, &d);

        let m = Scalar::<C>::from(11);
        let (ct, _) = elgamal_exp::encrypt_fresh(&pk, m, &mut rng);

        let s = Scalar::<C>::from(3);
        let r = Scalar::<C>::random(&mut rng);
        let rerand = elgamal_exp::rerandomize(&pk, &ct, s, r);

        let stmt = Statement {
            g,
            ek: pk.ek,
            a: ct.u,
            b: ct.v,
            a_prime: rerand.u,
            b_prime: rerand.v,
        };
        let witness = Witness { s: Scalar::<C>::from(4), r };
        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_err());
    }
}
