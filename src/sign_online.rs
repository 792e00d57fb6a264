//! Two-party online signing (spec §2 C10, §4.9): the two-message,
//! message-bound finalization that consumes a [`crate::sign_offline`]
//! presignature exactly once.
//!
//! Bob sends `s2`; Alice combines it with her own share, runs the standard
//! ECDSA verifier against `pk_joint` as a last-line defence (spec §7), and
//! only then hands back the signature.

use generic_ec::Scalar;
use tracing::{debug, instrument, warn};

use crate::curve::CurveOrder;
use crate::ecdsa_verify;
use crate::error::ProtocolError;
use crate::sign_offline::{AlicePresig, BobPresig};

/// Bob's single message: `s2 = (r*x2 + h) / (k2 + r1)`.
pub struct BobMessage<C: CurveOrder> {
    pub s2: Scalar<C>,
}

/// A finalized, third-party-verifiable ECDSA signature.
pub struct Signature<C: CurveOrder> {
    pub r: Scalar<C>,
    pub s: Scalar<C>,
    pub recovery_bit: bool,
}

/// Bob's step 1: fold the hashed message into his presignature share.
#[instrument(skip_all)]
pub fn bob_round1<C: CurveOrder>(presig: &BobPresig<C>, message_hash: Scalar<C>) -> Result<BobMessage<C>, ProtocolError> {
    let denom = presig.k2 + presig.r1;
    let denom_inv = denom
        .invert()
        .ok_or(ProtocolError::StateMisuse("k2 + r1 is zero"))?;
    let s2 = (presig.r * presig.x2 + message_hash) * denom_inv;
    debug!("online signing: bob emitted s2");
    Ok(BobMessage { s2 })
}

/// Alice's step 2: combine `s2` with her own share, verify the resulting
/// signature against `pk_joint`, and only then return it. Any ECDSA
/// verification failure aborts (spec §7: "a known tell for implementation
/// bugs or residual malice"), even though every intermediate proof in the
/// offline phase already passed.
#[instrument(skip_all)]
pub fn alice_round2<C: CurveOrder>(
    presig: &AlicePresig<C>,
    message_hash: Scalar<C>,
    bob: &BobMessage<C>,
) -> Result<Signature<C>, ProtocolError> {
    let k1_inv = presig
        .k1
        .invert()
        .ok_or(ProtocolError::StateMisuse("k1 is zero"))?;
    let s = presig.r * presig.x1 * bob.s2 * k1_inv;

    ecdsa_verify::verify(presig.pk_joint, message_hash, presig.r, s).map_err(|e| {
        warn!("online signing: emitted signature failed final ECDSA verification");
        e
    })?;

    debug!("online signing complete");
    Ok(Signature { r: presig.r, s, recovery_bit: presig.recovery_bit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::hash_to_scalar;
    use crate::dkg;
    use crate::mta::paillier as mta_paillier;
    use crate::safe_prime::RetryingSafePrimeProvider;
    use crate::sign_offline::{Alice, Bob};
    use crate::SecurityParams;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;
    use rand_core::RngCore;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(123)
    }

    #[test]
    fn offline_plus_online_produces_a_verifiable_signature() {
        let mut rng = rng();

        let sid = b"dkg";
        let mut p1 = dkg::Party1::<C>::new(sid, &mut rng);
        let mut p2 = dkg::Party2::<C>::new(sid, &mut rng);
        let m1 = p1.round1(&mut rng);
        let m2 = p2.round1(&m1, &mut rng);
        let m3 = p1.round2(&m2).unwrap();
        let bob_share = p2.finalize_key_share(&m3).unwrap();
        let alice_share = p1.into_key_share(p2.public_key());

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

        let off1 = bob.round1(&mut rng).unwrap();
        let off2 = alice.round2(off1, &mut rng).unwrap();
        let (off3, bob_presig) = bob.round3(off2).unwrap();
        let alice_presig = alice.round4(&off3).unwrap();

        let _ = rng.next_u32();
        let h: Scalar<C> = hash_to_scalar(b"test message");

        let bob_msg = bob_round1(&bob_presig, h).unwrap();
        let sig = alice_round2(&alice_presig, h, &bob_msg).unwrap();

        assert_eq!(sig.r, alice_presig.r);
        assert!(ecdsa_verify::verify(alice_presig.pk_joint, h, sig.r, sig.s).is_ok());
    }
}
