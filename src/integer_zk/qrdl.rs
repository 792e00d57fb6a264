//! `QRdl`: proof that `g = h^alpha mod N` (spec §4.3), the third and last
//! base-setup proof run once per MtA pair (alongside [`crate::integer_zk::r_p`]
//! and [`crate::integer_zk::qr`]).
//!
//! `t`-fold cut-and-choose: commit `a_i = h^{beta_i} mod N` for `beta_i`
//! sampled from a range `[0, 2^{s-1} * N)` wide enough to statistically
//! blind `alpha`; respond `z_i = beta_i` (bit 0) or `z_i = alpha + beta_i`
//! (bit 1, as a plain integer sum — the exponent group's order is
//! deliberately unknown to the verifier); verify `h^{z_i} = a_i * g^{e_i}
//! mod N`.

use rand_core::{CryptoRng, RngCore};

use crate::common::BigNumber;
use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "qrdl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub n: BigNumber,
    pub h: BigNumber,
    pub g: BigNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub alpha: BigNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub commitments: Vec<BigNumber>,
    pub responses: Vec<BigNumber>,
}

fn append_statement(t: &mut Transcript, stmt: &Statement) {
    t.append("n", &stmt.n.to_bytes());
    t.append("h", &stmt.h.to_bytes());
    t.append("g", &stmt.g.to_bytes());
}

/// Upper bound for the per-round blinding exponent `beta`: `2^{s-1} * N`
/// (spec §4.3).
fn beta_bound(n: &BigNumber, s: u32) -> BigNumber {
    (BigNumber::one() << (s - 1)) * n
}

pub fn compute_proof<R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &Witness,
    stmt: &Statement,
    reps: usize,
    s: u32,
    rng: &mut R,
) -> Proof {
    let bound = beta_bound(&stmt.n, s);

    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    append_statement(&mut transcript, stmt);

    let mut commitments = Vec::with_capacity(reps);
    let mut betas = Vec::with_capacity(reps);
    for _ in 0..reps {
        let beta = BigNumber::from_rng(&bound, rng);
        let a = stmt.h.modpow(&beta, &stmt.n);
        transcript.append("a", &a.to_bytes());
        commitments.push(a);
        betas.push(beta);
    }

    let mut responses = Vec::with_capacity(reps);
    for beta in betas.iter() {
        let bit = transcript.extract_bit("e");
        let z = if bit { beta + &witness.alpha } else { beta.clone() };
        responses.push(z);
    }

    Proof { commitments, responses }
}

pub fn verify_proof(sid: &[u8], stmt: &Statement, proof: &Proof, reps: usize) -> Result<(), InvalidProof> {
    if proof.commitments.len() != reps || proof.responses.len() != reps {
        return Err(InvalidProof::new(TAG, "round-count"));
    }

    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    append_statement(&mut transcript, stmt);

    for a in proof.commitments.iter() {
        transcript.append("a", &a.to_bytes());
    }

    for (a, z) in proof.commitments.iter().zip(proof.responses.iter()) {
        let bit = transcript.extract_bit("e");
        let lhs = stmt.h.modpow(z, &stmt.n);
        let rhs = if bit {
            a.modmul(&stmt.g, &stmt.n)
        } else {
            a.clone()
        };
        if lhs != rhs {
            return Err(InvalidProof::new(TAG, "exponent"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(22)
    }

    fn setup(rng: &mut impl RngCore) -> (Statement, Witness) {
        let n = BigNumber::from(11) * BigNumber::from(23);
        let h = BigNumber::from(4); // a small QR mod n, sufficient for this unit test
        let alpha = BigNumber::from(17);
        let g = h.modpow(&alpha, &n);
        (Statement { n, h, g }, Witness { alpha })
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let (stmt, witness) = setup(&mut rng);
        let proof = compute_proof(b"sid", &witness, &stmt, 32, 32, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &proof, 32).is_ok());
    }

    #[test]
    fn wrong_g_fails() {
        let mut rng = rng();
        let (mut stmt, witness) = setup(&mut rng);
        stmt.g = &stmt.g + BigNumber::one();
        let proof = compute_proof(b"sid", &witness, &stmt, 32, 32, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &proof, 32).is_err());
    }
}
