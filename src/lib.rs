//! Two-party ECDSA and multi-party SM2 threshold signing, built from a
//! shared layer of Fiat–Shamir ZK arguments over hybrid (curve + Paillier +
//! RSA) groups and two interchangeable multiplicative-to-additive (MtA)
//! share-conversion backends.
//!
//! See `SPEC_FULL.md` in the repository root for the full module map; the
//! short version:
//!
//! - [`transcript`] / [`common`]: the Fiat–Shamir transcript and the
//!   integer-commitment primitive everything else is built from.
//! - [`group_zk`] / [`integer_zk`]: the individual ZK languages (Schnorr,
//!   Chaum–Pedersen, REG, RRE, RSPDL; `R_P`, `QR`, `QRdl`, `R_PwR`,
//!   `R_AffRan`).
//! - [`elgamal_exp`]: exponential ElGamal over the curve.
//! - [`mta`]: the `MtaSender`/`MtaReceiver` capability and its two
//!   backends (Paillier-based, OT-based).
//! - [`dkg`], [`sign_offline`], [`sign_online`]: the two-party ECDSA state
//!   machine.
//! - [`sm2`]: the multi-party SM2 state machine.

pub mod common;
pub mod curve;
pub mod error;
pub mod paillier;
pub mod safe_prime;
pub mod transcript;

pub mod elgamal_exp;
pub mod group_zk;
pub mod integer_zk;

pub mod mta;

pub mod dkg;
pub mod ecdsa_verify;
pub mod sign_offline;
pub mod sign_online;

pub mod sm2;

pub use common::BigNumber;
pub use error::{InvalidProof, ProtocolError};

/// Security parameters (spec §4.1): fixed at these values unless a test
/// needs to shrink them for speed. Every `Prove`/`Verify` entry point and
/// MtA round takes `&SecurityParams` rather than hard-coding module
/// constants, so alternate parameter sets stay possible without touching
/// the protocol code itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityParams {
    /// `t`: soundness error bits.
    pub t: u32,
    /// `l`: zero-knowledge slack bits.
    pub l: u32,
    /// `s`: statistical zero-knowledge slack for range proofs.
    pub s: u32,
    /// `m`: repetition count for `R_P`.
    pub m: u32,
    /// RSA/Paillier modulus size in bits.
    pub n_bits: usize,
}

impl SecurityParams {
    /// The parameters fixed by spec §4.1.
    pub const DEFAULT: SecurityParams = SecurityParams {
        t: 128,
        l: 80,
        s: 128,
        m: 80,
        n_bits: 2048,
    };

    /// A small parameter set for fast unit tests. Not secure; test-only.
    pub const TEST: SecurityParams = SecurityParams {
        t: 32,
        l: 16,
        s: 32,
        m: 8,
        n_bits: 512,
    };
}

impl Default for SecurityParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Computational security parameter for OT-based MtA (spec §4.6): `κ = 256`.
pub const KOS_KAPPA: usize = 256;
