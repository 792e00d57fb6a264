//! Multi-party SM2 threshold signing (spec §2 C11, §4.10): an `n`-party,
//! full-threshold scheme built from the same ZK argument suite as the
//! two-party protocols, plus one extra ingredient the two-party case never
//! needed — [`crate::elgamal_exp`] as a publicly verifiable, jointly
//! decryptable accumulator that lets `n` parties agree on a sum of secret
//! scalars without a trusted aggregator.
//!
//! [`dkg`] runs the two independent `n`-party key generations (the SM2
//! signing share `x_i` and the ElGamal decryption share `d_i`); [`sign`]
//! runs the eight-phase signing protocol grounded on `crtsm2/lnr18` in the
//! original source.

pub mod dkg;
pub mod sign;
