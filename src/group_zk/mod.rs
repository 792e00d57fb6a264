//! Group-level ZK proofs over the curve (spec §2 C3, §4.2): Schnorr PoK of
//! discrete log (with a commit/decommit variant), Chaum–Pedersen
//! equal-discrete-log, ElGamal-exp plaintext knowledge (REG),
//! rerandomization (RRE), and scalar-product-with-DLog (RSPDL).
//!
//! All proofs in this module serialize points via their compressed affine
//! encoding (spec §4.2: "so that implementations on different curves
//! produce reproducible transcripts") and follow the same shape: a
//! `Statement`, an optional `Witness` (Schnorr and Chaum–Pedersen take
//! their witness as a bare `Scalar`/`SecretScalar` since there is only one),
//! a `Commitment` sampled by the prover, a `Challenge` derived from the
//! transcript, and a `Proof` of responses. Each submodule exposes both the
//! split `commit`/`challenge`/`prove`/`verify` interface (needed when a
//! caller must interleave these steps with other transcript activity, as
//! [`crate::dkg`] and [`crate::sign_offline`] do) and a one-shot
//! `compute_proof`/`verify_proof` pair that manages its own transcript.

pub mod chaum_pedersen;
pub mod reg;
pub mod rre;
pub mod rspdl;
pub mod schnorr;
