//! Paillier adapter (spec §6).
//!
//! The core only ever needs `NewSecretKey(p, q) -> sk`, `pk.Encrypt(m) ->
//! (c, r)`, `sk.Decrypt(c) -> m`, and the two moduli `N`, `N^2`. This module
//! is a thin layer over `libpaillier` that works in terms of
//! [`crate::common::BigNumber`] directly (rather than the raw byte buffers
//! `libpaillier`'s methods take), since every ZK module in this crate
//! already operates on `BigNumber`.

use crate::common::BigNumber;
use crate::error::ProtocolError;

pub use libpaillier::{Ciphertext, DecryptionKey, EncryptionKey, Nonce};

/// `N_BITS` from spec §4.1: the Paillier/RSA modulus size this crate
/// targets. Each prime is therefore `PAILLIER_PRIME_BITS` long.
pub const PAILLIER_PRIME_BITS: usize = 1024;

/// Build a Paillier secret key from a matched pair of safe primes (spec §3:
/// `p, q ≡ 3 (mod 4)`, `(p-1)/2, (q-1)/2` also prime).
pub fn new_secret_key(p: BigNumber, q: BigNumber) -> Result<DecryptionKey, ProtocolError> {
    DecryptionKey::with_primes_unchecked(&p, &q)
        .ok_or(ProtocolError::StateMisuse("paillier key generation failed for given primes"))
}

/// Encrypt a plaintext under `pk`, returning both ciphertext and the nonce
/// used (needed by every ZK module that proves properties of the
/// encryption).
pub fn encrypt(pk: &EncryptionKey, m: &BigNumber) -> Result<(Ciphertext, Nonce), ProtocolError> {
    pk.encrypt(m.to_bytes(), None)
        .ok_or(ProtocolError::StateMisuse("paillier encryption failed"))
}

/// Encrypt with caller-supplied randomness (used by ZK `commit` steps that
/// need to remember the nonce as part of the private commitment).
pub fn encrypt_with_nonce(
    pk: &EncryptionKey,
    m: &BigNumber,
    r: Nonce,
) -> Result<Ciphertext, ProtocolError> {
    pk.encrypt(m.to_bytes(), Some(r))
        .map(|(c, _)| c)
        .ok_or(ProtocolError::StateMisuse("paillier encryption failed"))
}

/// Decrypt `c` under `sk`, returning the plaintext as a non-negative
/// `BigNumber` less than `N`.
pub fn decrypt(sk: &DecryptionKey, c: &Ciphertext) -> Result<BigNumber, ProtocolError> {
    let bytes = sk
        .decrypt(c)
        .ok_or(ProtocolError::StateMisuse("paillier decryption failed"))?;
    Ok(BigNumber::from_slice(bytes))
}
