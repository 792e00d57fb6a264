//! Two-party distributed key generation (spec §2 C8, §4.7): a four-message
//! commit/decommit Schnorr exchange so that neither party can bias the
//! joint public key by choosing its own share after seeing the other's.
//!
//! Party 1 moves first but under a hash commitment; Party 2 then reveals
//! its own proof in the clear (it cannot bias after Party 1 already
//! committed blind); Party 1 decommits; Party 2 verifies the decommitment
//! and both sides compute `pk_joint = pk_1 + pk_2`.
//!
//! Built entirely from [`crate::group_zk::schnorr`]'s commit/decommit
//! primitives — this module only sequences the four messages and threads
//! state between them.

use generic_ec::{Curve, Point, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::error::ProtocolError;
use crate::group_zk::schnorr;

/// Message 1 (Party 1 -> Party 2): Party 1's public key and a hash
/// commitment to its Schnorr proof of the matching secret key.
pub struct Round1Message<C: Curve> {
    pub pk: Point<C>,
    pub commitment_hash: [u8; 32],
}

/// Message 2 (Party 2 -> Party 1): Party 2's public key and its Schnorr
/// proof, revealed in the clear.
pub struct Round2Message<C: Curve> {
    pub pk: Point<C>,
    pub full_proof: schnorr::FullProof<C>,
}

/// Message 3 (Party 1 -> Party 2): Party 1's decommitment of message 1.
pub struct Round3Message<C: Curve> {
    pub full_proof: schnorr::FullProof<C>,
}

fn statement<C: Curve>(pk: Point<C>) -> schnorr::Statement<C> {
    schnorr::Statement { base: Point::generator(), x: pk }
}

/// A completed DKG output (spec §3: `(sk_i, pk_i, pk_peer, pk_joint)`),
/// created once and consumed by many presignatures ([`crate::sign_offline`]).
pub struct KeyShare<C: Curve> {
    pub sk: SecretScalar<C>,
    pub pk: Point<C>,
    pub pk_peer: Point<C>,
    pub pk_joint: Point<C>,
}

/// Party 1's side of the exchange.
pub struct Party1<C: Curve> {
    sid: Vec<u8>,
    sk: SecretScalar<C>,
    pk: Point<C>,
    pending_proof: Option<schnorr::FullProof<C>>,
}

impl<C: Curve> Party1<C> {
    pub fn new<R: RngCore + CryptoRng>(sid: &[u8], rng: &mut R) -> Self {
        let sk = SecretScalar::<C>::random(rng);
        let pk = Point::generator() * sk.as_ref();
        Party1 { sid: sid.to_vec(), sk, pk, pending_proof: None }
    }

    pub fn public_key(&self) -> Point<C> {
        self.pk
    }

    /// Produce message 1: commit to a fresh Schnorr proof of `sk`.
    pub fn round1<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Round1Message<C> {
        let (full, hash) = schnorr::prove_commit(&self.sid, &self.sk, &statement(self.pk), rng);
        self.pending_proof = Some(full);
        Round1Message { pk: self.pk, commitment_hash: hash }
    }

    /// Consume message 2, verify Party 2's proof, and produce message 3
    /// (the decommitment of message 1).
    #[instrument(skip_all)]
    pub fn round2(&mut self, peer: &Round2Message<C>) -> Result<Round3Message<C>, ProtocolError> {
        schnorr::verify_proof(&self.sid, &statement(peer.pk), &peer.full_proof.commitment, &peer.full_proof.proof).map_err(|e| {
            warn!(check = e.check, "dkg: party 2's schnorr proof rejected");
            e
        })?;
        let full_proof = self
            .pending_proof
            .take()
            .ok_or(ProtocolError::StateMisuse("round2 called before round1"))?;
        debug!("dkg: party 1 round2 complete");
        Ok(Round3Message { full_proof })
    }

    /// The joint public key, once Party 2's public key is known. Both
    /// parties call this with the other's key to arrive at the same value.
    pub fn joint_public_key(&self, peer_pk: Point<C>) -> Point<C> {
        self.pk + peer_pk
    }

    /// Package this party's output as a [`KeyShare`] once Party 2's public
    /// key is known (after [`Self::round2`] has verified Party 2's proof).
    pub fn into_key_share(self, peer_pk: Point<C>) -> KeyShare<C> {
        let pk_joint = self.pk + peer_pk;
        KeyShare { sk: self.sk, pk: self.pk, pk_peer: peer_pk, pk_joint }
    }
}

/// Party 2's side of the exchange.
pub struct Party2<C: Curve> {
    sid: Vec<u8>,
    sk: SecretScalar<C>,
    pk: Point<C>,
    peer_pk: Option<Point<C>>,
    peer_commitment_hash: Option<[u8; 32]>,
}

impl<C: Curve> Party2<C> {
    pub fn new<R: RngCore + CryptoRng>(sid: &[u8], rng: &mut R) -> Self {
        let sk = SecretScalar::<C>::random(rng);
        let pk = Point::generator() * sk.as_ref();
        Party2 { sid: sid.to_vec(), sk, pk, peer_pk: None, peer_commitment_hash: None }
    }

    pub fn public_key(&self) -> Point<C> {
        self.pk
    }

    /// Consume message 1 and produce message 2: Party 2's own proof, sent
    /// in the clear since Party 1 already committed before seeing it.
    pub fn round1<R: RngCore + CryptoRng>(&mut self, peer: &Round1Message<C>, rng: &mut R) -> Round2Message<C> {
        self.peer_pk = Some(peer.pk);
        self.peer_commitment_hash = Some(peer.commitment_hash);
        let (full_proof, _hash) = schnorr::prove_commit(&self.sid, &self.sk, &statement(self.pk), rng);
        Round2Message { pk: self.pk, full_proof }
    }

    /// Consume message 3, verify the decommitment against the hash received
    /// in message 1, and return the joint public key.
    #[instrument(skip_all)]
    pub fn finalize(&mut self, peer: &Round3Message<C>) -> Result<Point<C>, ProtocolError> {
        let peer_pk = self.peer_pk.ok_or(ProtocolError::StateMisuse("finalize called before round1"))?;
        let hash = self
            .peer_commitment_hash
            .ok_or(ProtocolError::StateMisuse("finalize called before round1"))?;
        schnorr::decommit_verify(&self.sid, &statement(peer_pk), &hash, &peer.full_proof).map_err(|e| {
            warn!(check = e.check, "dkg: party 1's decommitment rejected");
            e
        })?;
        debug!("dkg: party 2 finalize complete");
        Ok(self.pk + peer_pk)
    }

    /// Consume message 3 and package this party's output as a [`KeyShare`]
    /// in one step, instead of separately calling [`Self::finalize`].
    pub fn finalize_key_share(mut self, peer: &Round3Message<C>) -> Result<KeyShare<C>, ProtocolError> {
        let pk_joint = self.finalize(peer)?;
        let peer_pk = self.peer_pk.expect("finalize succeeded, so peer_pk is set");
        Ok(KeyShare { sk: self.sk, pk: self.pk, pk_peer: peer_pk, pk_joint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn both_parties_agree_on_the_joint_key() {
        let mut rng = rng();
        let sid = b"dkg-test";

        let mut p1 = Party1::<C>::new(sid, &mut rng);
        let mut p2 = Party2::<C>::new(sid, &mut rng);

        let m1 = p1.round1(&mut rng);
        let m2 = p2.round1(&m1, &mut rng);
        let m3 = p1.round2(&m2).expect("party 2's proof verifies");
        let joint_from_p2 = p2.finalize(&m3).expect("party 1's decommitment verifies");
        let joint_from_p1 = p1.joint_public_key(p2.public_key());

        assert_eq!(joint_from_p1, joint_from_p2);
        assert_eq!(joint_from_p1, p1.public_key() + p2.public_key());
    }

    #[test]
    fn tampered_decommitment_is_rejected() {
        let mut rng = rng();
        let sid = b"dkg-test";

        let mut p1 = Party1::<C>::new(sid, &mut rng);
        let mut p2 = Party2::<C>::new(sid, &mut rng);

        let m1 = p1.round1(&mut rng);
        let m2 = p2.round1(&m1, &mut rng);
        let mut m3 = p1.round2(&m2).expect("party 2's proof verifies");
        m3.full_proof.proof.s = m3.full_proof.proof.s + generic_ec::Scalar::<C>::from(1);

        assert!(p2.finalize(&m3).is_err());
    }
}
