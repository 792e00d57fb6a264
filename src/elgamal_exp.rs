//! Exponential ElGamal over the curve (spec §4.4, component C5).
//!
//! Plaintexts live in the exponent: `Encrypt(m, r) = (G^r, ek^r * G^m)`.
//! This makes the scheme additively homomorphic in `m` (ciphertext
//! addition matches plaintext addition) but full decryption would require
//! solving a discrete log. The protocols that use this (SM2 signing, C11)
//! never need full decryption: they always compare [`semi_decrypt`] of a
//! ciphertext against `H^m'` for some expected `m'` they already hold.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

/// Public key `ek = base^d` for secret `d`, alongside the base point it was
/// derived from (defaults to the curve generator, but SM2 (§4.10) runs
/// several independent ElGamal instances over the same curve that all
/// share one base).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey<C: Curve> {
    pub g: Point<C>,
    pub ek: Point<C>,
}

/// A ciphertext `(U, V) = (G^r, ek^r * G^m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ciphertext<C: Curve> {
    pub u: Point<C>,
    pub v: Point<C>,
}

impl<C: Curve> std::ops::Add for Ciphertext<C> {
    type Output = Ciphertext<C>;
    fn add(self, rhs: Ciphertext<C>) -> Ciphertext<C> {
        Ciphertext {
            u: self.u + rhs.u,
            v: self.v + rhs.v,
        }
    }
}

impl<C: Curve> std::ops::Sub for Ciphertext<C> {
    type Output = Ciphertext<C>;
    fn sub(self, rhs: Ciphertext<C>) -> Ciphertext<C> {
        Ciphertext {
            u: self.u - rhs.u,
            v: self.v - rhs.v,
        }
    }
}

/// Derive a public key from a secret scalar and base point.
pub fn derive_public_key<C: Curve>(g: Point<C>, d: &SecretScalar<C>) -> PublicKey<C> {
    PublicKey { g, ek: g * d.as_ref() }
}

/// `Encrypt(m, r) = (G^r, ek^r * G^m)`.
pub fn encrypt<C: Curve>(pk: &PublicKey<C>, m: Scalar<C>, r: Scalar<C>) -> Ciphertext<C> {
    Ciphertext {
        u: pk.g * r,
        v: pk.ek * r + pk.g * m,
    }
}

/// Sample fresh randomness and encrypt `m` under `pk`, returning the
/// ciphertext and the randomness used (needed by [`crate::group_zk::reg`]
/// to prove the encryption relation).
pub fn encrypt_fresh<C: Curve, R: RngCore + CryptoRng>(
    pk: &PublicKey<C>,
    m: Scalar<C>,
    rng: &mut R,
) -> (Ciphertext<C>, Scalar<C>) {
    let r = Scalar::<C>::random(rng);
    (encrypt(pk, m, r), r)
}

/// `Rerandomize((U,V), s, r) = (U*s + G^r, V*s + ek^r)` (spec §4.4): scales
/// the ciphertext by `s` and re-blinds it with fresh randomness `r`. The
/// result still semi-decrypts to `H^{m*s}` given the original plaintext `m`
/// encrypted under `H = G`.
pub fn rerandomize<C: Curve>(pk: &PublicKey<C>, ct: &Ciphertext<C>, s: Scalar<C>, r: Scalar<C>) -> Ciphertext<C> {
    Ciphertext {
        u: ct.u * s + pk.g * r,
        v: ct.v * s + pk.ek * r,
    }
}

/// `SemiDecrypt((U,V)) = V - U*d`. Equals `G^m`; recovering `m` itself
/// would require solving a discrete log, so callers always compare this
/// against an expected `G^m'` rather than inverting it (spec §4.4).
pub fn semi_decrypt<C: Curve>(ct: &Ciphertext<C>, d: &SecretScalar<C>) -> Point<C> {
    ct.v - ct.u * d.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec_curves::rust_crypto::Secp256k1 as C;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(10)
    }

    #[test]
    fn semi_decrypt_recovers_plaintext_point() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let pk = derive_public_key(g, &d);

        let m = Scalar::<C>::from(42);
        let (ct, _) = encrypt_fresh(&pk, m, &mut rng);
        assert_eq!(semi_decrypt(&ct, &d), g * m);
    }

    #[test]
    fn rerandomize_preserves_semi_decryption_up_to_scale() {
        // property (8): SemiDecrypt(Rerand(c, s, r)) = SemiDecrypt(c) * s
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let pk = derive_public_key(g, &d);

        let m = Scalar::<C>::from(7);
        let (ct, _) = encrypt_fresh(&pk, m, &mut rng);

        let s = Scalar::<C>::from(3);
        let r = Scalar::<C>::random(&mut rng);
        let rerand = rerandomize(&pk, &ct, s, r);

        assert_eq!(semi_decrypt(&rerand, &d), semi_decrypt(&ct, &d) * s);
    }

    #[test]
    fn homomorphic_addition() {
        let mut rng = rng();
        let g = Point::<C>::generator();
        let d = SecretScalar::<C>::random(&mut rng);
        let pk = derive_public_key(g, &d);

        let m1 = Scalar::<C>::from(5);
        let m2 = Scalar::<C>::from(9);
        let (c1, _) = encrypt_fresh(&pk, m1, &mut rng);
        let (c2, _) = encrypt_fresh(&pk, m2, &mut rng);

        let sum = c1 + c2;
        assert_eq!(semi_decrypt(&sum, &d), g * (m1 + m2));
    }
}
