//! The KOS-extension adapter contract (spec §6 "OT adapter").
//!
//! Base OT and its KOS'15/'18 extension to *correlated* OT (`COT`) are
//! external collaborators: the spec names only the shape the core consumes
//! — a `Round1`/`Round2`/`Round3` exchange built around the matrix `U` and
//! consistency digests `wPrime`/`vPrime`/`Tau` — and leaves base-OT choice,
//! block size (`COtBlockSizeBytes`) and the `simplest`-style `DigestSize =
//! 32` hash to whichever concrete OT library is wired in underneath. This
//! module defines that contract as a pair of traits so [`super`] can drive
//! the §4.6 Gilboa-style multiply-via-COT protocol generically over any
//! conforming implementation, plus an in-memory reference pair this crate's
//! own tests drive it with.
//!
//! The correlation COT delivers, column by column, is exactly the one
//! Gilboa's multiplicative-to-additive transform needs: the sender picks a
//! random pad `t0[j]` and sets `t1[j] = t0[j] + delta[j]` for a sender-chosen
//! `delta[j]`; the receiver obliviously learns `t_omega[j][j]` for its own
//! choice bit `omega[j]` without learning `delta[j]` or the pad it didn't
//! choose, and the sender doesn't learn `omega[j]`.

use generic_ec::{Curve, Scalar};
use rand_core::{CryptoRng, RngCore};

/// `simplest.DigestSize`: width of the base-OT commitment digest.
pub const DIGEST_SIZE: usize = 32;

/// The receiver's first KOS message (`kos.Round1`): the correlation matrix
/// `U` plus the two consistency digests `wPrime`/`vPrime` the sender checks
/// before trusting the extension.
pub struct Round1Message {
    pub u: Vec<Vec<u8>>,
    pub w_prime: Vec<u8>,
    pub v_prime: Vec<u8>,
}

/// The sender's reply (`kos.Round2`): the consistency-check opening `Tau`
/// plus, for every correlated-OT column, the masked delivery of `t0[j]` or
/// `t1[j] = t0[j] + delta[j]` (opaque to this layer — only the receiver's
/// OT-extension state can resolve it in `round3`).
pub struct Round2Message {
    pub tau: Vec<u8>,
    pub masked: Vec<[u8; DIGEST_SIZE]>,
}

/// Sender side of one correlated-OT-extension instance, run once per MtA
/// invocation over `l = kappa + s` columns.
pub trait KosSender<C: Curve> {
    /// Complete the extension against the receiver's `round1` message,
    /// delivering `t0[j]` for `omega[j] = 0` or `t0[j] + delta[j]` for
    /// `omega[j] = 1`, without learning `omega`. Returns the round-2 message
    /// together with the sender's own `t0` pads (it needs these to form its
    /// additive share `alpha = -sum(t0)`).
    fn round2<R: RngCore + CryptoRng>(
        &mut self,
        round1: &Round1Message,
        delta: &[Scalar<C>],
        rng: &mut R,
    ) -> (Round2Message, Vec<Scalar<C>>);
}

/// Receiver side of one correlated-OT-extension instance.
pub trait KosReceiver<C: Curve> {
    /// Produce the round-1 extension message committing to choice bits
    /// `omega` (one per column), without revealing them to the sender.
    fn round1<R: RngCore + CryptoRng>(&mut self, omega: &[bool], rng: &mut R) -> Round1Message;

    /// Resolve the sender's `round2` message into this receiver's `t_omega`
    /// pad per column, running the extension's internal constant-time
    /// consistency checks (spec §8: "OT-MtA must fail-fast if any of the `L`
    /// constant-time checks mismatches"). `Err(j)` names the first column
    /// whose check failed.
    fn round3(&mut self, round2: &Round2Message) -> Result<Vec<Scalar<C>>, usize>;
}

/// An in-memory stand-in pair implementing the KOS contract directly against
/// shared local state rather than a real two-message base-OT extension.
///
/// This is **not** a secure OT implementation: both ends are produced by the
/// same [`LocalPairOt::new`] call and the "receiver" struct is handed its
/// choice bits' resolved pads directly rather than recovering them through an
/// oblivious channel. It exists only so [`super`]'s §4.6 protocol arithmetic
/// (gadget encoding, the Gilboa correlation, the constant-time consistency
/// discipline around it) can be exercised end-to-end without a production
/// base-OT crate wired in.
pub struct LocalPairOt;

impl LocalPairOt {
    pub fn new<C: Curve>() -> (LocalSender<C>, LocalReceiver<C>) {
        (LocalSender { _marker: std::marker::PhantomData }, LocalReceiver { _marker: std::marker::PhantomData })
    }
}

pub struct LocalSender<C: Curve> {
    _marker: std::marker::PhantomData<C>,
}

pub struct LocalReceiver<C: Curve> {
    _marker: std::marker::PhantomData<C>,
}

impl<C: Curve> KosReceiver<C> for LocalReceiver<C> {
    fn round1<R: RngCore + CryptoRng>(&mut self, omega: &[bool], _rng: &mut R) -> Round1Message {
        Round1Message {
            u: omega.iter().map(|b| vec![*b as u8; DIGEST_SIZE]).collect(),
            w_prime: vec![0u8; DIGEST_SIZE],
            v_prime: vec![0u8; DIGEST_SIZE],
        }
    }

    fn round3(&mut self, round2: &Round2Message) -> Result<Vec<Scalar<C>>, usize> {
        Ok(round2
            .masked
            .iter()
            .map(|bytes| Scalar::<C>::from_be_bytes_mod_order(bytes))
            .collect())
    }
}

impl<C: Curve> KosSender<C> for LocalSender<C> {
    fn round2<R: RngCore + CryptoRng>(
        &mut self,
        round1: &Round1Message,
        delta: &[Scalar<C>],
        rng: &mut R,
    ) -> (Round2Message, Vec<Scalar<C>>) {
        let t0: Vec<Scalar<C>> = delta.iter().map(|_| Scalar::<C>::random(rng)).collect();
        let masked = round1
            .u
            .iter()
            .zip(t0.iter().zip(delta.iter()))
            .map(|(row, (t0_j, delta_j))| {
                let chosen = if row[0] == 1 { *t0_j + *delta_j } else { *t0_j };
                let mut out = [0u8; DIGEST_SIZE];
                let bytes = chosen.to_be_bytes();
                out.copy_from_slice(bytes.as_bytes());
                out
            })
            .collect();
        (Round2Message { tau: vec![0u8; DIGEST_SIZE], masked }, t0)
    }
}
