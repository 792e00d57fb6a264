//! `R_PwR`: proof that a Paillier ciphertext encodes a value bounded by the
//! group order `q` (spec §4.3). The core range proof behind the Paillier
//! MtA receiver's first message (§4.5 step 1): `c_B = Enc(b; r)` for `b`
//! the receiver's curve scalar, verified against the *sender's*
//! integer-commitment parameters.
//!
//! Given `c = r^N * N₁^x mod N²` (`N₁ := N+1`), proves knowledge of `(x,
//! r)` with `x ∈ [0, q)` via two Pedersen-style commitments `(C, D)` over
//! the verifier's `(N₀, g, h)` and a masked re-encryption `d` of the
//! witness, following the same shape as the teacher's
//! `group_element_vs_paillier_encryption_in_range` proof with the curve
//! equality dropped (there is no group element here — only the Paillier
//! ciphertext and the integer commitments).

use libpaillier::{Ciphertext, EncryptionKey, Nonce};
use rand_core::{CryptoRng, RngCore};

use crate::common::{combine, gen_inversible, BigNumber};
use crate::error::InvalidProof;
use crate::integer_zk::CommitmentParams;
use crate::paillier;
use crate::transcript::Transcript;

const TAG: &str = "pwr";

#[derive(Debug, Clone)]
pub struct Statement {
    /// Group order the witness is bounded by.
    pub q: BigNumber,
    /// Paillier public key `c` was encrypted under.
    pub key: EncryptionKey,
    pub c: Ciphertext,
}

#[derive(Debug, Clone)]
pub struct Witness {
    pub x: BigNumber,
    pub r: Nonce,
}

#[derive(Debug, Clone)]
pub struct Commitment {
    pub big_c: BigNumber,
    pub d: Ciphertext,
    pub big_d: BigNumber,
}

struct PrivateCommitment {
    y: BigNumber,
    r_d: Nonce,
    alpha: BigNumber,
    beta: BigNumber,
}

#[derive(Debug, Clone)]
pub struct Proof {
    pub z1: BigNumber,
    pub z2: BigNumber,
    pub z3: BigNumber,
}

fn append_statement(t: &mut Transcript, aux: &CommitmentParams, stmt: &Statement) {
    t.append("aux.n", &aux.n.to_bytes());
    t.append("aux.g", &aux.g.to_bytes());
    t.append("aux.h", &aux.h.to_bytes());
    t.append("q", &stmt.q.to_bytes());
    t.append("key.n", &stmt.key.n().to_bytes());
    t.append("c", &stmt.c.to_bytes());
}

/// Mask range: honest `y` is sampled so that `z1 = y + e*x` always falls in
/// `[2^t*q, 2^{t+l}*q)` for any `e < 2^t` and `x < q` (spec §8 boundary
/// behavior: `R_PwR` must reject `z1` outside exactly that window).
fn y_bounds(q: &BigNumber, t: usize, l: usize) -> (BigNumber, BigNumber) {
    let lower = (BigNumber::one() << t) * q;
    let width = ((BigNumber::one() << (t + l)) - (BigNumber::one() << (t + 1))) * q;
    (lower, width)
}

fn commit<R: RngCore + CryptoRng>(
    aux: &CommitmentParams,
    stmt: &Statement,
    witness: &Witness,
    t: usize,
    l: usize,
    s: usize,
    rng: &mut R,
) -> (Commitment, PrivateCommitment) {
    let (lower, width) = y_bounds(&stmt.q, t, l);
    let y = lower + BigNumber::from_rng(&width, rng);

    let alpha_bound = aux.n.clone() << s;
    let beta_bound = aux.n.clone() << (t + l + s);
    let alpha = BigNumber::from_rng(&alpha_bound, rng);
    let beta = BigNumber::from_rng(&beta_bound, rng);

    let r_d = gen_inversible(stmt.key.n(), rng);
    let d = paillier::encrypt_with_nonce(&stmt.key, &y, r_d.clone()).expect("encryption under valid key cannot fail");

    let commitment = Commitment {
        big_c: combine(&aux.g, &witness.x, &aux.h, &alpha, &aux.n),
        d,
        big_d: combine(&aux.g, &y, &aux.h, &beta, &aux.n),
    };
    let private = PrivateCommitment { y, r_d, alpha, beta };
    (commitment, private)
}

fn challenge(transcript: &mut Transcript, aux: &CommitmentParams, stmt: &Statement, commitment: &Commitment, t: usize) -> BigNumber {
    append_statement(transcript, aux, stmt);
    transcript.append("commitment.c", &commitment.big_c.to_bytes());
    transcript.append("commitment.d", &commitment.d.to_bytes());
    transcript.append("commitment.big_d", &commitment.big_d.to_bytes());
    let bytes = transcript.extract("challenge", (t + 7) / 8);
    BigNumber::from_slice(bytes)
}

fn prove(witness: &Witness, stmt: &Statement, private: &PrivateCommitment, e: &BigNumber) -> Proof {
    Proof {
        z1: &private.y + e * &witness.x,
        z2: combine(&private.r_d, &BigNumber::one(), &witness.r, e, stmt.key.n()),
        z3: &private.beta + e * &private.alpha,
    }
}

pub fn compute_proof<R: RngCore + CryptoRng>(
    sid: &[u8],
    aux: &CommitmentParams,
    witness: &Witness,
    stmt: &Statement,
    params: &crate::SecurityParams,
    rng: &mut R,
) -> Proof {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let (commitment, private) = commit(aux, stmt, witness, params.t as usize, params.l as usize, params.s as usize, rng);
    let e = challenge(&mut transcript, aux, stmt, &commitment, params.t as usize);
    prove(witness, stmt, &private, &e)
}

/// Like [`compute_proof`] but also returns the commitment, for callers
/// (e.g. [`crate::mta::paillier`]) that need to send both over the wire.
pub fn compute_proof_with_commitment<R: RngCore + CryptoRng>(
    sid: &[u8],
    aux: &CommitmentParams,
    witness: &Witness,
    stmt: &Statement,
    params: &crate::SecurityParams,
    rng: &mut R,
) -> (Commitment, Proof) {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let (commitment, private) = commit(aux, stmt, witness, params.t as usize, params.l as usize, params.s as usize, rng);
    let e = challenge(&mut transcript, aux, stmt, &commitment, params.t as usize);
    let proof = prove(witness, stmt, &private, &e);
    (commitment, proof)
}

pub fn verify_proof(
    sid: &[u8],
    aux: &CommitmentParams,
    stmt: &Statement,
    commitment: &Commitment,
    proof: &Proof,
    params: &crate::SecurityParams,
) -> Result<(), InvalidProof> {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let e = challenge(&mut transcript, aux, stmt, commitment, params.t as usize);

    let enc_z1 = paillier::encrypt_with_nonce(&stmt.key, &proof.z1, proof.z2.clone())
        .map_err(|_| InvalidProof::new(TAG, "encryption"))?;
    let rhs = combine(&commitment.d, &BigNumber::one(), &stmt.c, &e, stmt.key.nn());
    if enc_z1 != rhs {
        return Err(InvalidProof::new(TAG, "ciphertext-consistency"));
    }

    let lhs_commit = combine(&aux.g, &proof.z1, &aux.h, &proof.z3, &aux.n);
    let rhs_commit = combine(&commitment.big_d, &BigNumber::one(), &commitment.big_c, &e, &aux.n);
    if lhs_commit != rhs_commit {
        return Err(InvalidProof::new(TAG, "pedersen-consistency"));
    }

    let (lower, upper) = {
        let lo = (BigNumber::one() << (params.t as usize)) * &stmt.q;
        let hi = (BigNumber::one() << ((params.t + params.l) as usize)) * &stmt.q;
        (lo, hi)
    };
    if proof.z1 < lower || proof.z1 >= upper {
        return Err(InvalidProof::new(TAG, "range"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(30)
    }

    fn aux(rng: &mut impl RngCore) -> CommitmentParams {
        let p = BigNumber::from(11);
        let q = BigNumber::from(23);
        let n = &p * &q;
        let h_sqrt = gen_inversible(&n, rng);
        let h = h_sqrt.modmul(&h_sqrt, &n);
        let alpha = BigNumber::from(17);
        let g = h.modpow(&alpha, &n);
        CommitmentParams { n, g, h }
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let params = crate::SecurityParams::TEST;
        let aux = aux(&mut rng);

        let sk = libpaillier::DecryptionKey::random().unwrap();
        let key = libpaillier::EncryptionKey::from(&sk);
        let q = BigNumber::from(1_000_003u64);
        let x = BigNumber::from(12345u64);
        let r = gen_inversible(key.n(), &mut rng);
        let c = paillier::encrypt_with_nonce(&key, &x, r.clone()).unwrap();

        let stmt = Statement { q, key, c };
        let witness = Witness { x, r };

        let (commitment, proof) = compute_proof_with_commitment(b"sid", &aux, &witness, &stmt, &params, &mut rng);
        assert!(verify_proof(b"sid", &aux, &stmt, &commitment, &proof, &params).is_ok());
    }

    #[test]
    fn tampered_z1_lsb_fails() {
        let mut rng = rng();
        let params = crate::SecurityParams::TEST;
        let aux = aux(&mut rng);

        let sk = libpaillier::DecryptionKey::random().unwrap();
        let key = libpaillier::EncryptionKey::from(&sk);
        let q = BigNumber::from(1_000_003u64);
        let x = BigNumber::from(12345u64);
        let r = gen_inversible(key.n(), &mut rng);
        let c = paillier::encrypt_with_nonce(&key, &x, r.clone()).unwrap();

        let stmt = Statement { q, key, c };
        let witness = Witness { x, r };

        let (commitment, mut proof) = compute_proof_with_commitment(b"sid", &aux, &witness, &stmt, &params, &mut rng);
        proof.z1 = &proof.z1 + BigNumber::one();
        assert!(verify_proof(b"sid", &aux, &stmt, &commitment, &proof, &params).is_err());
    }
}
