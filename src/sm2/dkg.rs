//! `n`-party distributed key generation for the SM2 scheme (spec §4.10
//! "DKG phase", grounded on `crtsm2/dkg.PkComProve`/`PkDeComVerify`).
//!
//! Structurally this is the [`crate::dkg`] two-party commit/decommit
//! exchange run twice and generalized from two participants to `n`: once
//! to build the joint SM2 signing key `Q = sum(Q_i)`, and once more,
//! independently, to build the joint ElGamal decryption key `T = sum(T_i)`
//! that the signing protocol uses as its accumulator public key. Each party
//! runs both in parallel against the same peer set, since they share the
//! same commit-then-reveal round structure and only the base point differs
//! (both use the curve generator here, but the two secrets and public
//! points are otherwise independent).

use generic_ec::{Curve, Point, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::error::ProtocolError;
use crate::group_zk::schnorr;

/// Round 1 (broadcast to all peers): both public points, each committed to
/// a proof of knowledge of its discrete log by a hash rather than revealed.
pub struct Round1Message<C: Curve> {
    pub q_i: Point<C>,
    pub q_commitment_hash: [u8; 32],
    pub t_i: Point<C>,
    pub t_commitment_hash: [u8; 32],
}

/// Round 2 (broadcast to all peers): the decommitted proofs.
pub struct Round2Message<C: Curve> {
    pub q_full_proof: schnorr::FullProof<C>,
    pub t_full_proof: schnorr::FullProof<C>,
}

/// One party's finished output (spec §3): its own shares of both joint
/// keys, ready to feed into [`crate::sm2::sign`].
pub struct SmKeyShare<C: Curve> {
    pub index: usize,
    pub n: usize,
    pub x_i: SecretScalar<C>,
    pub q_i: Point<C>,
    pub q: Point<C>,
    pub d_i: SecretScalar<C>,
    pub t_i: Point<C>,
    pub t: Point<C>,
}

fn statement<C: Curve>(pk: Point<C>) -> schnorr::Statement<C> {
    schnorr::Statement { base: Point::generator(), x: pk }
}

/// One participant's local state across the two DKG rounds.
pub struct Party<C: Curve> {
    sid: Vec<u8>,
    index: usize,
    n: usize,
    x_i: SecretScalar<C>,
    q_i: Point<C>,
    d_i: SecretScalar<C>,
    t_i: Point<C>,
    pending_q_proof: Option<schnorr::FullProof<C>>,
    pending_t_proof: Option<schnorr::FullProof<C>>,
}

impl<C: Curve> Party<C> {
    /// `index` is this party's 0-based position among `n` participants;
    /// both are needed only to size-check the broadcasts at [`Self::finalize`].
    pub fn new<R: RngCore + CryptoRng>(sid: &[u8], index: usize, n: usize, rng: &mut R) -> Self {
        let x_i = SecretScalar::<C>::random(rng);
        let q_i = Point::generator() * x_i.as_ref();
        let d_i = SecretScalar::<C>::random(rng);
        let t_i = Point::generator() * d_i.as_ref();
        Party {
            sid: sid.to_vec(),
            index,
            n,
            x_i,
            q_i,
            d_i,
            t_i,
            pending_q_proof: None,
            pending_t_proof: None,
        }
    }

    pub fn q_i(&self) -> Point<C> {
        self.q_i
    }

    pub fn t_i(&self) -> Point<C> {
        self.t_i
    }

    /// Produce round 1: commit to fresh proofs for both `Q_i` and `T_i`.
    pub fn round1<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Round1Message<C> {
        let (q_full, q_hash) = schnorr::prove_commit(&self.sid, &self.x_i, &statement(self.q_i), rng);
        let (t_full, t_hash) = schnorr::prove_commit(&self.sid, &self.d_i, &statement(self.t_i), rng);
        self.pending_q_proof = Some(q_full);
        self.pending_t_proof = Some(t_full);
        Round1Message { q_i: self.q_i, q_commitment_hash: q_hash, t_i: self.t_i, t_commitment_hash: t_hash }
    }

    /// Produce round 2: reveal both proofs, now that every peer has
    /// committed.
    #[instrument(skip_all, fields(index = self.index))]
    pub fn round2(&mut self) -> Result<Round2Message<C>, ProtocolError> {
        let q_full_proof = self
            .pending_q_proof
            .take()
            .ok_or(ProtocolError::StateMisuse("round2 called before round1"))?;
        let t_full_proof = self
            .pending_t_proof
            .take()
            .ok_or(ProtocolError::StateMisuse("round2 called before round1"))?;
        Ok(Round2Message { q_full_proof, t_full_proof })
    }

    /// Verify every peer's decommitment against its round-1 commitment
    /// (this party's own entry is skipped) and combine both joint keys.
    /// `commitments`/`reveals` must both be indexed the same way, by
    /// participant index, with length `n`. Consumes `self`, since the
    /// secret shares it holds move directly into the returned
    /// [`SmKeyShare`] rather than being cloned.
    #[instrument(skip_all, fields(index = self.index, n = self.n))]
    pub fn finalize(
        self,
        commitments: &[Round1Message<C>],
        reveals: &[Round2Message<C>],
    ) -> Result<SmKeyShare<C>, ProtocolError> {
        if commitments.len() != self.n || reveals.len() != self.n {
            return Err(ProtocolError::StateMisuse("participant count mismatch"));
        }

        for id in 0..self.n {
            if id == self.index {
                continue;
            }
            let c = &commitments[id];
            let r = &reveals[id];
            schnorr::decommit_verify(&self.sid, &statement(c.q_i), &c.q_commitment_hash, &r.q_full_proof).map_err(|e| {
                warn!(check = e.check, peer = id, "sm2 dkg: peer's Q decommitment rejected");
                e
            })?;
            schnorr::decommit_verify(&self.sid, &statement(c.t_i), &c.t_commitment_hash, &r.t_full_proof).map_err(|e| {
                warn!(check = e.check, peer = id, "sm2 dkg: peer's T decommitment rejected");
                e
            })?;
        }

        let mut q = commitments[0].q_i;
        let mut t = commitments[0].t_i;
        for c in &commitments[1..] {
            q = q + c.q_i;
            t = t + c.t_i;
        }

        debug!("sm2 dkg: party finalized both joint keys");
        Ok(SmKeyShare { index: self.index, n: self.n, x_i: self.x_i, q_i: self.q_i, q, d_i: self.d_i, t_i: self.t_i, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(200)
    }

    #[test]
    fn all_parties_agree_on_both_joint_keys() {
        let mut rng = rng();
        let n = 4;
        let sid = b"sm2-dkg-test";

        let mut parties: Vec<Party<C>> = (0..n).map(|i| Party::new(sid, i, n, &mut rng)).collect();
        let round1s: Vec<_> = parties.iter_mut().map(|p| p.round1(&mut rng)).collect();
        let round2s: Vec<_> = parties.iter_mut().map(|p| p.round2().unwrap()).collect();

        let shares: Vec<_> = parties.into_iter().map(|p| p.finalize(&round1s, &round2s).unwrap()).collect();

        let expected_q = shares.iter().fold(Point::<C>::generator() * generic_ec::Scalar::<C>::from(0), |acc, s| acc + s.q_i);
        let expected_t = shares.iter().fold(Point::<C>::generator() * generic_ec::Scalar::<C>::from(0), |acc, s| acc + s.t_i);

        for share in &shares {
            assert_eq!(share.q, expected_q);
            assert_eq!(share.t, expected_t);
        }
    }

    #[test]
    fn tampered_reveal_is_rejected() {
        let mut rng = rng();
        let n = 3;
        let sid = b"sm2-dkg-test";

        let mut parties: Vec<Party<C>> = (0..n).map(|i| Party::new(sid, i, n, &mut rng)).collect();
        let round1s: Vec<_> = parties.iter_mut().map(|p| p.round1(&mut rng)).collect();
        let mut round2s: Vec<_> = parties.iter_mut().map(|p| p.round2().unwrap()).collect();

        round2s[1].q_full_proof.proof.s = round2s[1].q_full_proof.proof.s + generic_ec::Scalar::<C>::from(1);

        let first = parties.remove(0);
        assert!(first.finalize(&round1s, &round2s).is_err());
    }
}
