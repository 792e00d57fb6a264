//! `QR`: proof that `h` is a quadratic residue mod `N` (spec §4.3),
//! i.e. `h = h_sqrt^2 mod N` for some `h_sqrt` the prover knows. One of the
//! three base-setup proofs run once per MtA pair.
//!
//! Classic `t`-fold cut-and-choose: for each repetition the prover commits
//! to a fresh random square `a_i = r_i^2 mod N`, then on challenge bit `0`
//! opens `r_i` (proving knowledge of a square root of `a_i`) or on bit `1`
//! opens `r_i * h_sqrt mod N` (proving `a_i * h` is also a square, which
//! only holds if `h` itself is a square).

use rand_core::{CryptoRng, RngCore};

use crate::common::{gen_inversible, BigNumber};
use crate::error::InvalidProof;
use crate::transcript::Transcript;

const TAG: &str = "qr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub n: BigNumber,
    pub h: BigNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub h_sqrt: BigNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub commitments: Vec<BigNumber>,
    pub responses: Vec<BigNumber>,
}

fn append_statement(t: &mut Transcript, stmt: &Statement) {
    t.append("n", &stmt.n.to_bytes());
    t.append("h", &stmt.h.to_bytes());
}

pub fn compute_proof<R: RngCore + CryptoRng>(
    sid: &[u8],
    witness: &Witness,
    stmt: &Statement,
    reps: usize,
    rng: &mut R,
) -> Proof {
    let mut transcript = Transcript::new(TAG.as_bytes());
    transcript.append("sid", sid);
    append_statement(&mut transcript, stmt);

    let mut commitments = Vec::with_capacity(reps);
    let mut nonces = Vec::with_capacity(reps);
    for _ in 0..reps {
        let r = gen_inversible(&stmt.n, rng);
        let a = r.modmul(&r, &stmt.n);
        transcript.append("a", &a.to_bytes());
        commitments.push(a);
        nonces.push(r);
    }

    let mut responses = Vec::with_capacity(reps);
    for (r, _a) in nonces.iter().zip(commitments.iter()) {
        let bit = transcript.extract_bit("e");
        let z = if bit {
            r.modmul(&witness.h_sqrt, &stmt.n)
        } else {
            r.clone()
        };
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
        let lhs = z.modmul(z, &stmt.n);
        let rhs = if bit { a.modmul(&stmt.h, &stmt.n) } else { a.clone() };
        if lhs != rhs {
            return Err(InvalidProof::new(TAG, "square"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(21)
    }

    fn setup(rng: &mut impl RngCore) -> (Statement, Witness) {
        let n = BigNumber::from(11) * BigNumber::from(23);
        let h_sqrt = gen_inversible(&n, rng);
        let h = h_sqrt.modmul(&h_sqrt, &n);
        (Statement { n, h }, Witness { h_sqrt })
    }

    #[test]
    fn passing() {
        let mut rng = rng();
        let (stmt, witness) = setup(&mut rng);
        let proof = compute_proof(b"sid", &witness, &stmt, 32, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &proof, 32).is_ok());
    }

    #[test]
    fn non_residue_fails() {
        let mut rng = rng();
        let (mut stmt, witness) = setup(&mut rng);
        // h is no longer the square the witness claims.
        stmt.h = &stmt.h + BigNumber::one();
        let proof = compute_proof(b"sid", &witness, &stmt, 32, &mut rng);
        assert!(verify_proof(b"sid", &stmt, &proof, 32).is_err());
    }
}
