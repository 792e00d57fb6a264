//! Two-party offline signing (spec §2 C9, §4.8): the four-message,
//! message-independent phase that produces a reusable presignature
//! `(r, k_i, x_i[, r_1])` consumed exactly once by [`crate::sign_online`].
//!
//! Generic over the MtA backend (spec §9 Design Notes: "a trait-object
//! approach is equally valid; generics give better inlining") via
//! [`crate::mta::MtaSender`]/[`crate::mta::MtaReceiver`] — the same `Bob`
//! and `Alice` types below run unmodified whether the caller wires up
//! [`crate::mta::paillier`] or [`crate::mta::ot`] as the backend.

use generic_ec::{Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::curve::CurveOrder;
use crate::dkg::KeyShare;
use crate::error::{InvalidProof, ProtocolError};
use crate::group_zk::schnorr;
use crate::mta::{MtaReceiver, MtaSender};

const TAG: &str = "sign_offline";

fn schnorr_statement<C: CurveOrder>(x: Point<C>) -> schnorr::Statement<C> {
    schnorr::Statement { base: Point::generator(), x }
}

/// Message 1 (Bob -> Alice): a hash commitment to Bob's Schnorr proof of
/// `k2`, plus the MtA round-1 message (Bob is the MtA receiver, input `k2`).
pub struct BobRound1<C: CurveOrder, MR: MtaReceiver<C>> {
    pub commitment_hash: [u8; 32],
    pub mta: MR::Round1,
}

/// Message 2 (Alice -> Bob): spec §4.8 `(Q1, r1, cc, π_k1, b)`.
pub struct AliceRound2<C: CurveOrder, MS: MtaSender<C>> {
    pub q1: Point<C>,
    /// The public statement of `π_k1` (`G^{k1}`) — the spec's abstraction
    /// folds this into `π_k1.Statement`; this crate's Schnorr proof keeps
    /// statement and proof separate (spec §4.2), so it travels alongside.
    pub k1_point: Point<C>,
    pub r1: Scalar<C>,
    pub cc: Scalar<C>,
    pub schnorr_k1: schnorr::Proof<C>,
    pub schnorr_k1_commitment: schnorr::Commitment<C>,
    pub mta: MS::Round2,
}

/// Message 3 (Bob -> Alice): the decommitment of message 1, i.e. Bob's
/// revealed `(G^{k2}, π_k2)`.
pub struct BobRound3<C: CurveOrder> {
    pub k2_point: Point<C>,
    pub full_proof: schnorr::FullProof<C>,
}

/// Alice's per-session presignature output: `(r, k1, x1, r1)` plus the
/// joint public key needed by [`crate::sign_online`]'s final verification.
///
/// `recovery_bit` is the oddness of the shared nonce point's y-coordinate
/// (spec §4.9's note on keeping `v` consistent with the compressed
/// encoding); it is captured here because the nonce point itself doesn't
/// survive into the online phase, only its x-coordinate `r`.
pub struct AlicePresig<C: CurveOrder> {
    pub r: Scalar<C>,
    pub k1: Scalar<C>,
    pub x1: Scalar<C>,
    pub r1: Scalar<C>,
    pub pk_joint: Point<C>,
    pub recovery_bit: bool,
}

/// Bob's per-session presignature output: `(r, k2, x2, r1)`.
pub struct BobPresig<C: CurveOrder> {
    pub r: Scalar<C>,
    pub k2: Scalar<C>,
    pub x2: Scalar<C>,
    pub r1: Scalar<C>,
    pub pk_joint: Point<C>,
    pub recovery_bit: bool,
}

struct AlicePending<C: CurveOrder> {
    x1: Scalar<C>,
    k1: Scalar<C>,
    r1: Scalar<C>,
    bob_commitment_hash: [u8; 32],
}

/// Alice's side of the offline phase (spec §4.8 steps 2 and 4).
pub struct Alice<C: CurveOrder, MS: MtaSender<C>> {
    sid: Vec<u8>,
    key_share: KeyShare<C>,
    mta: MS,
    pending: Option<AlicePending<C>>,
}

impl<C: CurveOrder, MS: MtaSender<C>> Alice<C, MS> {
    pub fn new(sid: &[u8], key_share: KeyShare<C>, mta: MS) -> Self {
        Alice { sid: sid.to_vec(), key_share, mta, pending: None }
    }

    /// Step 2: sample `(x1, k1, r1)`, run the MtA sender side against
    /// Bob's round-1 message, and fold the result into `cc`.
    #[instrument(skip_all)]
    pub fn round2<R: RngCore + CryptoRng, MR: MtaReceiver<C, Round1 = MS::Round1>>(
        &mut self,
        bob: BobRound1<C, MR>,
        rng: &mut R,
    ) -> Result<AliceRound2<C, MS>, ProtocolError> {
        let x1 = Scalar::<C>::random(rng);
        let k1 = Scalar::<C>::random(rng);
        let q1 = Point::generator() * x1;
        let k1_point = Point::generator() * k1;

        let mut k1_for_secret = k1;
        let k1_secret = SecretScalar::<C>::new(&mut k1_for_secret);
        let k1_stmt = schnorr_statement(k1_point);
        let (schnorr_k1_commitment, schnorr_k1) = schnorr::compute_proof(&self.sid, &k1_secret, &k1_stmt, rng);

        let (t_a, mta_round2) = self.mta.update(&self.sid, x1, bob.mta, rng)?;

        let r1 = Scalar::<C>::random(rng);
        let cc = r1 * x1 + t_a - *self.key_share.sk.as_ref();

        self.pending = Some(AlicePending { x1, k1, r1, bob_commitment_hash: bob.commitment_hash });
        debug!("offline signing round2 complete");

        Ok(AliceRound2 { q1, k1_point, r1, cc, schnorr_k1, schnorr_k1_commitment, mta: mta_round2 })
    }

    /// Step 4: verify Bob's decommitment, derive the shared nonce point,
    /// and extract `r`.
    #[instrument(skip_all)]
    pub fn round4(&mut self, bob: &BobRound3<C>) -> Result<AlicePresig<C>, ProtocolError> {
        let pending = self.pending.take().ok_or(ProtocolError::StateMisuse("round4 called before round2"))?;

        let stmt = schnorr_statement(bob.k2_point);
        schnorr::decommit_verify(&self.sid, &stmt, &pending.bob_commitment_hash, &bob.full_proof).map_err(|e| {
            warn!(check = e.check, "offline signing: bob's decommitment rejected");
            e
        })?;

        let r_point = (bob.k2_point + Point::generator() * pending.r1) * pending.k1;
        let r = crate::curve::x_coordinate(&r_point);
        let recovery_bit = crate::curve::y_is_odd(&r_point);
        debug!("offline signing round4 complete");

        Ok(AlicePresig {
            r,
            k1: pending.k1,
            x1: pending.x1,
            r1: pending.r1,
            pk_joint: self.key_share.pk_joint,
            recovery_bit,
        })
    }
}

/// Bob's side of the offline phase (spec §4.8 steps 1 and 3).
pub struct Bob<C: CurveOrder, MR: MtaReceiver<C>> {
    sid: Vec<u8>,
    key_share: KeyShare<C>,
    mta: MR,
    k2: Scalar<C>,
    k2_point: Point<C>,
    pending_proof: Option<schnorr::FullProof<C>>,
}

impl<C: CurveOrder, MR: MtaReceiver<C>> Bob<C, MR> {
    /// `k2` and `mta` must agree: `mta` is the MtA receiver already
    /// constructed with input `k2` (spec §4.8: "Bob (step1). Sample k2 ...
    /// Initiate MtA as receiver with input k2").
    pub fn new(sid: &[u8], key_share: KeyShare<C>, k2: Scalar<C>, mta: MR) -> Self {
        let k2_point = Point::generator() * k2;
        Bob { sid: sid.to_vec(), key_share, mta, k2, k2_point, pending_proof: None }
    }

    /// Step 1: commit to a Schnorr proof of `k2` and emit the MtA round-1
    /// message.
    #[instrument(skip_all)]
    pub fn round1<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Result<BobRound1<C, MR>, ProtocolError> {
        let mut k2_for_secret = self.k2;
        let witness = SecretScalar::<C>::new(&mut k2_for_secret);
        let stmt = schnorr_statement(self.k2_point);
        let (full_proof, commitment_hash) = schnorr::prove_commit(&self.sid, &witness, &stmt, rng);
        self.pending_proof = Some(full_proof);

        let mta = self.mta.init(&self.sid, rng)?;
        debug!("offline signing round1 complete");
        Ok(BobRound1 { commitment_hash, mta })
    }

    /// Step 3: complete the MtA exchange, check the commitment that binds
    /// Alice's share of `x1*k2` to her declared `cc`, verify her Schnorr
    /// proof of `k1`, derive `r`, and compute Bob's signing share `x2`.
    #[instrument(skip_all)]
    pub fn round3<MS: MtaSender<C, Round2 = MR::Round2>>(
        &mut self,
        alice: AliceRound2<C, MS>,
    ) -> Result<(BobRound3<C>, BobPresig<C>), ProtocolError> {
        let t_b = self.mta.multiply(&self.sid, alice.mta)?;

        let lhs = Point::generator() * (t_b + alice.cc);
        let rhs = alice.q1 * (self.k2 + alice.r1) - self.key_share.pk_peer;
        if lhs != rhs {
            warn!("offline signing: alice's mta-consistency check failed");
            return Err(ProtocolError::ProofFailure(InvalidProof::new(TAG, "mta-consistency")));
        }

        let k1_stmt = schnorr_statement(alice.k1_point);
        schnorr::verify_proof(&self.sid, &k1_stmt, &alice.schnorr_k1_commitment, &alice.schnorr_k1)?;

        let r_point = alice.k1_point * (self.k2 + alice.r1);
        let r = crate::curve::x_coordinate(&r_point);
        let recovery_bit = crate::curve::y_is_odd(&r_point);
        let x2 = *self.key_share.sk.as_ref() - (t_b + alice.cc);

        let full_proof = self
            .pending_proof
            .take()
            .ok_or(ProtocolError::StateMisuse("round3 called before round1"))?;

        debug!("offline signing round3 complete");

        Ok((
            BobRound3 { k2_point: self.k2_point, full_proof },
            BobPresig { r, k2: self.k2, x2, r1: alice.r1, pk_joint: self.key_share.pk_joint, recovery_bit },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dkg;
    use crate::mta::paillier as mta_paillier;
    use crate::safe_prime::RetryingSafePrimeProvider;
    use crate::SecurityParams;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(99)
    }

    fn run_dkg(rng: &mut impl RngCore) -> (KeyShare<C>, KeyShare<C>) {
        let sid = b"dkg";
        let mut p1 = dkg::Party1::<C>::new(sid, rng);
        let mut p2 = dkg::Party2::<C>::new(sid, rng);
        let m1 = p1.round1(rng);
        let m2 = p2.round1(&m1, rng);
        let m3 = p1.round2(&m2).unwrap();
        let alice_pk = p1.public_key();
        let bob_share = p2.finalize_key_share(&m3).unwrap();
        let alice_share = p1.into_key_share(p2.public_key());
        assert_eq!(alice_pk, alice_share.pk);
        (alice_share, bob_share)
    }

    #[test]
    fn produces_matching_r_on_both_sides() {
        let mut rng = rng();
        let (alice_share, bob_share) = run_dkg(&mut rng);
        let params = SecurityParams::TEST;
        let provider = RetryingSafePrimeProvider;

        let (alice_setup, alice_msg) = mta_paillier::generate_setup(b"setup-a", &provider, &params, &mut rng);
        let (bob_setup, bob_msg) = mta_paillier::generate_setup(b"setup-b", &provider, &params, &mut rng);
        let alice_aux_for_bob = mta_paillier::verify_setup(b"setup-a", &alice_msg, &params).unwrap();
        let bob_aux_for_alice = mta_paillier::verify_setup(b"setup-b", &bob_msg, &params).unwrap();

        let k2 = Scalar::<C>::random(&mut rng);
        let bob_pk = bob_setup.pk.clone();
        let bob_mta = mta_paillier::Receiver::<C>::new(bob_setup, alice_aux_for_bob, k2, params);
        let mut bob = Bob::new(b"sign", bob_share, k2, bob_mta);

        let alice_mta = mta_paillier::Sender::<C>::new(alice_setup.commitment.clone(), bob_pk, bob_aux_for_alice, params);
        let mut alice = Alice::new(b"sign", alice_share, alice_mta);

        let m1 = bob.round1(&mut rng).unwrap();
        let m2 = alice.round2(m1, &mut rng).unwrap();
        let (m3, bob_presig) = bob.round3(m2).unwrap();
        let alice_presig = alice.round4(&m3).unwrap();

        assert_eq!(alice_presig.r, bob_presig.r);
    }
}
