//! Multiplicative-to-additive (MtA) share conversion (spec §2 C6/C7): the
//! shared capability both the two-party ECDSA offline phase ([`crate::sign_offline`])
//! and the multi-party SM2 signing phase ([`crate::sm2::sign`]) build on, in
//! two interchangeable backends.
//!
//! Spec §9 Design Notes calls out that the source has SM2 importing this
//! capability from the two-party ECDSA package as a cyclic dependency
//! smell; here it is its own module that both depend on, belonging to
//! neither. The interface below follows that same design note's naming:
//! `init -> A`, `update(scalar, A) -> (scalar, B)`, `multiply(B) -> scalar`.
//!
//! * [`paillier`] — C6: Paillier-based MtA with the `R_PwR`/`R_AffRan`
//!   range proofs.
//! * [`ot`] — C7: DKLs-2018 OT-extension-based MtA with a gadget vector.

pub mod ot;
pub mod paillier;

use generic_ec::{Curve, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::ProtocolError;

/// The receiver's side of one MtA invocation: holds input `b` and the
/// one-time setup, emits the round-1 message (`init`), and later turns the
/// sender's round-2 message into its additive share `β` (`multiply`).
///
/// A trait over `&mut self` rather than `dyn`-unsafe consuming moves, so
/// both [`paillier::Receiver`] and [`ot::Receiver`] can implement it behind
/// a trait object where a caller wants dynamic dispatch between backends
/// (spec §9: "a trait-object approach is equally valid").
pub trait MtaReceiver<C: Curve> {
    type Round1;
    type Round2;

    fn init<R: RngCore + CryptoRng>(&mut self, sid: &[u8], rng: &mut R) -> Result<Self::Round1, ProtocolError>;

    fn multiply(&mut self, sid: &[u8], round2: Self::Round2) -> Result<Scalar<C>, ProtocolError>;
}

/// The sender's side of one MtA invocation: holds input `a`, consumes the
/// receiver's round-1 message, and emits both its own additive share `α`
/// and the round-2 message for the receiver.
pub trait MtaSender<C: Curve> {
    type Round1;
    type Round2;

    fn update<R: RngCore + CryptoRng>(
        &mut self,
        sid: &[u8],
        a: Scalar<C>,
        round1: Self::Round1,
        rng: &mut R,
    ) -> Result<(Scalar<C>, Self::Round2), ProtocolError>;
}
