//! `R_AffRan`: proof that a Paillier ciphertext is an affine-randomised
//! function of another, with bounded coefficients (spec §4.3). This is the
//! Paillier MtA sender's response proof (§4.5 step 2): having computed
//! `c_A = c^a · N₁^α mod N²` for its own input `a` and a fresh mask `α`,
//! the sender proves `a ∈ [0, q)` and `α` bounded by `k := q²·2^{t+l+s}`
//! without revealing either, verified against the *receiver's*
//! integer-commitment parameters.
//!
//! Note there is no extra Paillier nonce in `c_A`'s definition: it inherits
//! its randomness multiplicatively from `c`'s own nonce raised to the `a`-th
//! power, so unlike [`crate::integer_zk::r_pwr`] this proof never calls
//! into the Paillier adapter at all — every operation here is a raw modular
//! exponentiation mod `N²`.

use libpaillier::EncryptionKey;
use rand_core::{CryptoRng, RngCore};

use crate::common::{combine, BigNumber};
use crate::error::InvalidProof;
use crate::integer_zk::CommitmentParams;
use crate::transcript::Transcript;

const TAG: &str = "Affran";

#[derive(Debug, Clone)]
pub struct Statement {
    /// Group order bounding `a`.
    pub q: BigNumber,
    /// Paillier public key both `c` and `c_a` live under.
    pub key: EncryptionKey,
    /// The already-shifted ciphertext `c = c_B * N1^{q*2^{t+l}} mod NN`.
    pub c: BigNumber,
    /// The sender's output ciphertext `c_A = c^a * N1^alpha mod NN`.
    pub c_a: BigNumber,
}

#[derive(Debug, Clone)]
pub struct Witness {
    pub a: BigNumber,
    pub alpha: BigNumber,
}

#[derive(Debug, Clone)]
pub struct Commitment {
    pub b1: BigNumber,
    pub b2: BigNumber,
    pub b3: BigNumber,
    pub b4: BigNumber,
    pub big_a: BigNumber,
}

struct PrivateCommitment {
    mask_a: BigNumber,
    mask_alpha: BigNumber,
    gamma: BigNumber,
    m: BigNumber,
    delta: BigNumber,
    mu: BigNumber,
}

#[derive(Debug, Clone)]
pub struct Proof {
    pub z1: BigNumber,
    pub z2: BigNumber,
    pub z3: BigNumber,
    pub z4: BigNumber,
}

/// `k := q^2 * 2^{t+l+s}`, the bound on `alpha` (spec §4.3/§4.5).
pub fn alpha_bound(q: &BigNumber, t: usize, l: usize, s: usize) -> BigNumber {
    (q * q) << (t + l + s)
}

/// Sample a mask so that `mask + e*witness` always lands in `[2^t*bound,
/// 2^{t+l}*bound)` for any challenge `e < 2^t` and `witness < bound` (the
/// same construction [`crate::integer_zk::r_pwr`] uses for its response).
fn masked_bounds(bound: &BigNumber, t: usize, l: usize) -> (BigNumber, BigNumber) {
    let lower = (BigNumber::one() << t) * bound;
    let width = ((BigNumber::one() << (t + l)) - (BigNumber::one() << (t + 1))) * bound;
    (lower, width)
}

fn append_statement(t: &mut Transcript, aux: &CommitmentParams, stmt: &Statement) {
    t.append("aux.n", &aux.n.to_bytes());
    t.append("aux.g", &aux.g.to_bytes());
    t.append("aux.h", &aux.h.to_bytes());
    t.append("q", &stmt.q.to_bytes());
    t.append("key.n", &stmt.key.n().to_bytes());
    t.append("c", &stmt.c.to_bytes());
    t.append("c_a", &stmt.c_a.to_bytes());
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
    let k = alpha_bound(&stmt.q, t, l, s);
    let nn = stmt.key.nn();
    let n1 = stmt.key.n() + BigNumber::one();

    let (a_lower, a_width) = masked_bounds(&stmt.q, t, l);
    let mask_a = a_lower + BigNumber::from_rng(&a_width, rng);
    let (alpha_lower, alpha_width) = masked_bounds(&k, t, l);
    let mask_alpha = alpha_lower + BigNumber::from_rng(&alpha_width, rng);

    let gamma = BigNumber::from_rng(&(aux.n.clone() << (t + l + s)), rng);
    let m = BigNumber::from_rng(&(aux.n.clone() << s), rng);
    let delta = BigNumber::from_rng(&(aux.n.clone() << (t + l + s)), rng);
    let mu = BigNumber::from_rng(&(aux.n.clone() << s), rng);

    let big_a = combine(&stmt.c, &mask_a, &n1, &mask_alpha, nn);

    let commitment = Commitment {
        b1: combine(&aux.g, &mask_a, &aux.h, &gamma, &aux.n),
        b2: combine(&aux.g, &witness.a, &aux.h, &m, &aux.n),
        b3: combine(&aux.g, &mask_alpha, &aux.h, &delta, &aux.n),
        b4: combine(&aux.g, &witness.alpha, &aux.h, &mu, &aux.n),
        big_a,
    };
    let private = PrivateCommitment { mask_a, mask_alpha, gamma, m, delta, mu };
    (commitment, private)
}

fn challenge(transcript: &mut Transcript, aux: &CommitmentParams, stmt: &Statement, commitment: &Commitment, t: usize) -> BigNumber {
    append_statement(transcript, aux, stmt);
    transcript.append("b1", &commitment.b1.to_bytes());
    transcript.append("b2", &commitment.b2.to_bytes());
    transcript.append("b3", &commitment.b3.to_bytes());
    transcript.append("b4", &commitment.b4.to_bytes());
    transcript.append("big_a", &commitment.big_a.to_bytes());
    let bytes = transcript.extract("challenge", (t + 7) / 8);
    BigNumber::from_slice(bytes)
}

fn prove(witness: &Witness, private: &PrivateCommitment, e: &BigNumber) -> Proof {
    Proof {
        z1: &private.mask_a + e * &witness.a,
        z2: &private.mask_alpha + e * &witness.alpha,
        z3: &private.gamma + e * &private.m,
        z4: &private.delta + e * &private.mu,
    }
}

pub fn compute_proof<R: RngCore + CryptoRng>(
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
    let proof = prove(witness, &private, &e);
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
    let t = params.t as usize;
    let l = params.l as usize;
    let s = params.s as usize;

    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    let e = challenge(&mut transcript, aux, stmt, commitment, t);

    let nn = stmt.key.nn();
    let n1 = stmt.key.n() + BigNumber::one();

    let lhs = combine(&stmt.c, &proof.z1, &n1, &proof.z2, nn);
    let rhs = combine(&commitment.big_a, &BigNumber::one(), &stmt.c_a, &e, nn);
    if lhs != rhs {
        return Err(InvalidProof::new(TAG, "ciphertext-consistency"));
    }

    let lhs_a = combine(&aux.g, &proof.z1, &aux.h, &proof.z3, &aux.n);
    let rhs_a = combine(&commitment.b1, &BigNumber::one(), &commitment.b2, &e, &aux.n);
    if lhs_a != rhs_a {
        return Err(InvalidProof::new(TAG, "pedersen-a"));
    }

    let lhs_alpha = combine(&aux.g, &proof.z2, &aux.h, &proof.z4, &aux.n);
    let rhs_alpha = combine(&commitment.b3, &BigNumber::one(), &commitment.b4, &e, &aux.n);
    if lhs_alpha != rhs_alpha {
        return Err(InvalidProof::new(TAG, "pedersen-alpha"));
    }

    let zero = BigNumber::zero();
    if proof.z1 < zero || proof.z2 < zero {
        return Err(InvalidProof::new(TAG, "range-nonnegative"));
    }
    let q_lo = (BigNumber::one() << t) * &stmt.q;
    let q_hi = (BigNumber::one() << (t + l)) * &stmt.q;
    if proof.z1 < q_lo || proof.z1 >= q_hi {
        return Err(InvalidProof::new(TAG, "range-z1"));
    }
    let k = alpha_bound(&stmt.q, t, l, s);
    let k_lo = (BigNumber::one() << t) * &k;
    let k_hi = (BigNumber::one() << (t + l)) * &k;
    if proof.z2 < k_lo || proof.z2 > k_hi {
        return Err(InvalidProof::new(TAG, "range-z2"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::gen_inversible;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(31)
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

        let b = BigNumber::from(5u64);
        let r = gen_inversible(key.n(), &mut rng);
        let c_b = crate::paillier::encrypt_with_nonce(&key, &b, r).unwrap();
        let shift = q.clone() << (params.t as usize + params.l as usize);
        let n1 = key.n() + BigNumber::one();
        let c = combine(&c_b, &BigNumber::one(), &n1, &shift, key.nn());

        let a = BigNumber::from(3u64);
        let alpha_witness = BigNumber::from(42u64);
        let c_a = combine(&c, &a, &n1, &alpha_witness, key.nn());

        let stmt = Statement { q, key, c, c_a };
        let witness = Witness { a, alpha: alpha_witness };

        let (commitment, proof) = compute_proof(b"sid", &aux, &witness, &stmt, &params, &mut rng);
        assert!(verify_proof(b"sid", &aux, &stmt, &commitment, &proof, &params).is_ok());
    }

    #[test]
    fn tampered_z2_fails() {
        let mut rng = rng();
        let params = crate::SecurityParams::TEST;
        let aux = aux(&mut rng);

        let sk = libpaillier::DecryptionKey::random().unwrap();
        let key = libpaillier::EncryptionKey::from(&sk);
        let q = BigNumber::from(1_000_003u64);

        let b = BigNumber::from(5u64);
        let r = gen_inversible(key.n(), &mut rng);
        let c_b = crate::paillier::encrypt_with_nonce(&key, &b, r).unwrap();
        let shift = q.clone() << (params.t as usize + params.l as usize);
        let n1 = key.n() + BigNumber::one();
        let c = combine(&c_b, &BigNumber::one(), &n1, &shift, key.nn());

        let a = BigNumber::from(3u64);
        let alpha_witness = BigNumber::from(42u64);
        let c_a = combine(&c, &a, &n1, &alpha_witness, key.nn());

        let stmt = Statement { q, key, c, c_a };
        let witness = Witness { a, alpha: alpha_witness };

        let (commitment, mut proof) = compute_proof(b"sid", &aux, &witness, &stmt, &params, &mut rng);
        proof.z2 = &proof.z2 + BigNumber::one();
        assert!(verify_proof(b"sid", &aux, &stmt, &commitment, &proof, &params).is_err());
    }
}
