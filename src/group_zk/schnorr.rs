//! Schnorr proof-of-knowledge of a discrete log (spec §4.2), with a
//! commit/decommit variant used by [`crate::dkg`] to bind the first mover
//! in a two-message exchange.
//!
//! Statement: `X = G^x`. Proves knowledge of `x` without revealing it.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "Schnorr";

/// Public statement: `x = base^witness` for some base point (defaults to
/// the curve generator, but a caller may supply another — used e.g. by
/// [`crate::group_zk::rspdl`] which reuses this building block over a
/// non-generator base).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<C: Curve> {
    pub base: Point<C>,
    pub x: Point<C>,
}

/// Prover's first message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment<C: Curve> {
    pub k: Point<C>,
}

pub type Challenge<C> = Scalar<C>;

/// Prover's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proof<C: Curve> {
    pub s: Scalar<C>,
}

fn append_statement<C: Curve>(t: &mut Transcript, stmt: &Statement<C>) {
    t.append("base", stmt.base.to_bytes(true).as_bytes());
    t.append("x", stmt.x.to_bytes(true).as_bytes());
}

/// Sample the prover's nonce commitment.
pub fn commit<C: Curve, R: RngCore + CryptoRng>(
    stmt: &Statement<C>,
    rng: &mut R,
) -> (Commitment<C>, Scalar<C>) {
    let k = Scalar::<C>::random(rng);
    (Commitment { k: stmt.base * k }, k)
}

/// Derive the Fiat–Shamir challenge by re-seeding `transcript` with the
/// statement and commitment (strong FS: the statement is appended first).
pub fn challenge<C: Curve>(
    transcript: &mut Transcript,
    stmt: &Statement<C>,
    commitment: &Commitment<C>,
) -> Challenge<C> {
    append_statement(transcript, stmt);
    transcript.append("commitment.k", commitment.k.to_bytes(true).as_bytes());
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
    let expected_challenge = challenge(transcript, stmt, commitment);
    let lhs = stmt.base * proof.s;
    let rhs = commitment.k + stmt.x * expected_challenge;
    if lhs == rhs {
        Ok(())
    } else {
        Err(InvalidProof::new(TAG, "response"))
    }
}

/// Run the full non-interactive proof: sample commitment, derive challenge
/// from a fresh transcript seeded with `sid`, respond.
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

/// Re-run verification against a fresh transcript seeded with the same
/// `sid` the prover used.
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

/// A proof bundled with its own commitment — the unit exchanged by the
/// commit/decommit variant below and by callers who don't want to manage
/// the transcript/commitment split themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullProof<C: Curve> {
    pub commitment: Commitment<C>,
    pub proof: Proof<C>,
}

/// `ProveCommit`: produce a full Schnorr proof, and a hash commitment to it
/// that can be sent first while withholding the proof itself. Used by the
/// DKG (spec §4.7) so the first mover's nonce/response are not observable
/// before the second mover commits to (or in their case, reveals) their own.
pub fn prove_commit<C: Curve, R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &SecretScalar<C>,
    stmt: &Statement<C>,
    rng: &mut R,
) -> (FullProof<C>, [u8; 32]) {
    let (commitment, proof) = compute_proof(sid, witness, stmt, rng);
    let full = FullProof { commitment, proof };
    let hash = hash_full_proof(sid, stmt, &full);
    (full, hash)
}

fn hash_full_proof<C: Curve>(sid: &[u8], stmt: &Statement<C>, full: &FullProof<C>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(sid);
    hasher.update(stmt.base.to_bytes(true).as_bytes());
    hasher.update(stmt.x.to_bytes(true).as_bytes());
    hasher.update(full.commitment.k.to_bytes(true).as_bytes());
    hasher.update(full.proof.s.to_be_bytes().as_bytes());
    hasher.into()
}

/// `DecommitVerify`: check the previously received hash commitment against
/// the now-revealed full proof, then verify the proof itself.
pub fn decommit_verify<C: Curve>(
    sid: &[u8],
    stmt: &Statement<C>,
    commitment_hash: &[u8; 32],
    full: &FullProof<C>,
) -> Result<(), InvalidProof> {
    let recomputed = hash_full_proof(sid, stmt, full);
    if &recomputed != commitment_hash {
        return Err(InvalidProof::new(TAG, "decommit-hash"));
    }
    verify_proof(sid, stmt, &full.commitment, &full.proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec::{Point, SecretScalar};
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(1)
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let base = Point::<C>::generator();
        let x = base * witness.as_ref();
        let stmt = Statement { base, x };

        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_ok());
    }

    #[test]
    fn tampered_response_fails() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let base = Point::<C>::generator();
        let x = base * witness.as_ref();
        let stmt = Statement { base, x };

        let (commitment, mut proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        proof.s = proof.s + Scalar::<C>::from(1);
        assert!(verify_proof(b"sid", &stmt, &commitment, &proof).is_err());
    }

    #[test]
    fn wrong_statement_fails() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let base = Point::<C>::generator();
        let x = base * witness.as_ref();
        let stmt = Statement { base, x };

        let (commitment, proof) = compute_proof(b"sid", &witness, &stmt, &mut rng);
        let other_witness = SecretScalar::<C>::random(&mut rng);
        let bad_stmt = Statement {
            base,
            x: base * other_witness.as_ref(),
        };
        assert!(verify_proof(b"sid", &bad_stmt, &commitment, &proof).is_err());
    }

    #[test]
    fn commit_decommit_roundtrip() {
        let mut rng = rng();
        let witness = SecretScalar::<C>::random(&mut rng);
        let base = Point::<C>::generator();
        let x = base * witness.as_ref();
        let stmt = Statement { base, x };

        let (full, hash) = prove_commit(b"sid", &witness, &stmt, &mut rng);
        assert!(decommit_verify(b"sid", &stmt, &hash, &full).is_ok());
    }

    #[test]
    fn commit_decommit_detects_swapped_proof() {
        let mut rng = rng();
        let witness1 = SecretScalar::<C>::random(&mut rng);
        let base = Point::<C>::generator();
        let stmt1 = Statement { base, x: base * witness1.as_ref() };
        let witness2 = SecretScalar::<C>::random(&mut rng);
        let stmt2 = Statement { base, x: base * witness2.as_ref() };

        let (_, hash1) = prove_commit(b"sid", &witness1, &stmt1, &mut rng);
        let (full2, _) = prove_commit(b"sid", &witness2, &stmt2, &mut rng);
        assert!(decommit_verify(b"sid", &stmt1, &hash1, &full2).is_err());
    }
}
