//! Error taxonomy shared by every sub-protocol in this crate.
//!
//! Proof objects (`group_zk`, `integer_zk`) return [`InvalidProof`]: a
//! boolean-shaped verdict with just enough information to name which
//! sub-check failed. Round functions (`dkg`, `sign_offline`, `sign_online`,
//! `mta`, `sm2`) return [`ProtocolError`], which wraps `InvalidProof` along
//! with the other ways a round can fail: a malformed setup, an adapter
//! (curve/Paillier/OT) returning an error, or the caller driving the state
//! machine out of order.

use thiserror::Error;

/// A single ZK sub-proof rejected verification.
///
/// Carries the name of the failing equality/range check so that callers can
/// log which sub-proof a misbehaving counterparty failed, without turning
/// this into a full transcript dump.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("proof {proof} failed check {check}")]
pub struct InvalidProof {
    /// Tag of the failing sub-proof, e.g. `"R_PwR"`, `"Schnorr"`, `"RSPDL"`.
    pub proof: &'static str,
    /// Which named check inside that sub-proof failed.
    pub check: &'static str,
}

impl InvalidProof {
    pub const fn new(proof: &'static str, check: &'static str) -> Self {
        InvalidProof { proof, check }
    }
}

/// Top-level error returned by every round function and MtA/DKG entry point.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The one-time base-setup proof for an MtA pair (`R_P`, `QR`, `QRdl`)
    /// was rejected. Fatal: the MtA pair must be recreated from scratch.
    #[error("mta setup rejected: {0}")]
    SetupFailure(#[source] InvalidProof),

    /// A per-round proof failed verification. Fatal for the current signing
    /// session; any reusable setup (MtA parameters, DKG output) remains
    /// valid and may be reused with a different counterparty.
    #[error("round proof rejected: {0}")]
    ProofFailure(#[source] InvalidProof),

    /// A response scalar fell outside its prescribed range. Reported
    /// distinctly from other proof failures because callers sometimes want
    /// to log or test range violations separately, but it is fatal exactly
    /// like `ProofFailure`.
    #[error("response out of range in proof {proof}: {detail}")]
    RangeViolation {
        proof: &'static str,
        detail: &'static str,
    },

    /// A constant-time consistency check in OT-MtA (§4.6) mismatched.
    #[error("ot-mta consistency check failed at index {index}")]
    OtConsistency { index: usize },

    /// The emitted signature failed the final ECDSA/SM2 verification. This
    /// is the last-line defence mentioned in spec §7: it fires even when
    /// every intermediate proof passed.
    #[error("emitted signature failed final verification")]
    SignatureVerificationFailed,

    /// The calling code invoked a round out of order, or invoked a
    /// consuming round twice. This is a programmer error in the caller, not
    /// a protocol failure; implementations should make it structurally
    /// impossible via consuming `self` where feasible, but state machines
    /// that can't fully enforce that (e.g. because they're driven by
    /// message arrival order) report it instead of panicking.
    #[error("state machine misuse: {0}")]
    StateMisuse(&'static str),

    /// The curve/Paillier/OT adapter returned an error; propagated
    /// verbatim from the adapter boundary.
    #[error("adapter error: {0}")]
    AdapterError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ProtocolError {
    pub fn adapter(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        ProtocolError::AdapterError(Box::new(e))
    }
}

impl From<InvalidProof> for ProtocolError {
    fn from(e: InvalidProof) -> Self {
        ProtocolError::ProofFailure(e)
    }
}
