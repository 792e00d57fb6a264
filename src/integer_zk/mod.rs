//! Integer-level ZK proofs (spec §2 C4, §4.3): soundness proofs for the
//! RSA/Paillier moduli the Paillier-based MtA backend (§4.5) is built on,
//! plus the two Paillier-ciphertext range proofs that make the MtA
//! protocol itself sound.
//!
//! * [`r_p`] — `R_P`: `N` is the product of two safe primes (a Blum
//!   integer).
//! * [`qr`] — `QR`: `h` is a quadratic residue mod `N`.
//! * [`qrdl`] — `QRdl`: `g = h^alpha mod N`.
//! * [`r_pwr`] — `R_PwR`: a Paillier ciphertext encodes a value bounded by
//!   the curve order `q`.
//! * [`r_affran`] — `R_AffRan`: a Paillier ciphertext is an
//!   affine-randomised function of another, with bounded coefficients.
//!
//! `R_P`/`QR`/`QRdl` are run once per MtA setup (spec §3: "computed once
//! per key pair"), each proving soundness of one party's integer-commitment
//! parameters `(N, g, h)` to the other. `R_PwR`/`R_AffRan` run once per MtA
//! *invocation* and are the heart of the Paillier MtA exchange (§4.5).

pub mod qr;
pub mod qrdl;
pub mod r_affran;
pub mod r_p;
pub mod r_pwr;

use crate::common::BigNumber;

/// Integer-commitment public parameters `(N, g, h)` (spec §3): `N` an RSA
/// modulus of two safe primes, `h` a quadratic residue mod `N`, and `g =
/// h^alpha mod N` for a secret `alpha` only the params' owner knows. Used
/// as a statistically-hiding Pedersen-style commitment `Commit(g, h, a, b,
/// N) = g^a * h^b mod N` throughout this module (via
/// [`crate::common::combine`]).
///
/// A party proves these parameters sound once, via [`r_p`]/[`qr`]/[`qrdl`],
/// before a peer will rely on them as the verifier side of [`r_pwr`] or
/// [`r_affran`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentParams {
    pub n: BigNumber,
    pub g: BigNumber,
    pub h: BigNumber,
}
