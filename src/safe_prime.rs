//! Safe-prime adapter (spec §6): `GenerateSafePrime(bits) -> p` where both
//! `p` and `(p-1)/2` are probable primes.
//!
//! Safe-prime generation is treated as an external collaborator (spec §1):
//! the core only needs the contract below, not a particular generator.
//! `SafePrimeProvider` is the trait a caller instantiates once (spec §9
//! Design Notes: this replaces the source's package-level OpenSSL function
//! pointers with an explicit, testable seam) and passes into the Paillier
//! MtA setup (§4.5) and the Paillier adapter's key generation.

use crate::common::BigNumber;
use rand_core::{CryptoRng, RngCore};

/// A source of safe primes of a given bit length.
pub trait SafePrimeProvider {
    /// Produce a prime `p` of exactly `bits` bits such that `(p-1)/2` is
    /// also prime.
    fn generate_safe_prime<R: RngCore + CryptoRng>(&self, bits: usize, rng: &mut R) -> BigNumber;

    /// Produce `n` safe primes. Spec §5 treats this as a future-style API
    /// whose production order is irrelevant — fan-out parallelism across
    /// calls is permitted; the default implementation is sequential, which
    /// is a valid (if not maximally parallel) instance of that contract.
    fn generate_safe_primes<R: RngCore + CryptoRng>(
        &self,
        bits: usize,
        n: usize,
        rng: &mut R,
    ) -> Vec<BigNumber> {
        (0..n).map(|_| self.generate_safe_prime(bits, rng)).collect()
    }
}

/// Reference provider: repeatedly sample a probable prime of the requested
/// bit length and retry until `(p-1)/2` is also a probable prime.
///
/// This is the literal retry-loop used by the original source's
/// `primes.go` (see `SPEC_FULL.md` §4), as opposed to a naive
/// generate-and-hope single attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetryingSafePrimeProvider;

impl SafePrimeProvider for RetryingSafePrimeProvider {
    fn generate_safe_prime<R: RngCore + CryptoRng>(&self, bits: usize, rng: &mut R) -> BigNumber {
        loop {
            let p = BigNumber::from_rng(&(BigNumber::one() << bits), rng) | BigNumber::one();
            let candidate = p | (BigNumber::one() << (bits - 1));
            if !candidate.is_prime() {
                continue;
            }
            let sophie_germain = (&candidate - BigNumber::one()) >> 1;
            if sophie_germain.is_prime() {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_safe_prime() {
        let provider = RetryingSafePrimeProvider;
        let mut rng = rand_core::OsRng;
        // Small bit length purely to keep the test fast; production use is
        // `PAILLIER_PRIME_BITS` (1024).
        let p = provider.generate_safe_prime(24, &mut rng);
        assert!(p.is_prime());
        let q = (&p - BigNumber::one()) >> 1;
        assert!(q.is_prime());
    }
}
