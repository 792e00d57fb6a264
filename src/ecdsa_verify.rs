//! Final ECDSA verifier (spec §6 "Final verifier", §9 supplement:
//! `crtsm2/verify`/`cetsm2/verify`).
//!
//! The last-line defence spec §7 demands: both [`crate::sign_online`]'s
//! two-message finalization and the 8th phase of [`crate::sm2::sign`] run
//! this check on the signature they are about to hand back, and abort with
//! [`ProtocolError::SignatureVerificationFailed`] if it fails — even though
//! every intermediate Fiat–Shamir proof already passed. A signature that
//! clears every sub-protocol proof but fails this check means an
//! implementation bug or a sufficiently clever malicious counterparty, not
//! a false negative to retry.

use generic_ec::{Curve, Point, Scalar};

use crate::curve::{self, CurveOrder};
use crate::error::{InvalidProof, ProtocolError};

const TAG: &str = "ecdsa-verify";

/// Standard ECDSA verification: given the joint public key, the
/// already-hashed message `h`, and a candidate `(r, s)`, recompute `R' =
/// G^{h*s^-1} + Q^{r*s^-1}` and check its x-coordinate matches `r`.
pub fn verify<C: CurveOrder>(pk: Point<C>, h: Scalar<C>, r: Scalar<C>, s: Scalar<C>) -> Result<(), ProtocolError> {
    if r.is_zero() || s.is_zero() {
        return Err(ProtocolError::ProofFailure(InvalidProof::new(TAG, "nonzero")));
    }
    let s_inv = s.invert().ok_or(ProtocolError::ProofFailure(InvalidProof::new(TAG, "s-invertible")))?;
    let u1 = h * s_inv;
    let u2 = r * s_inv;
    let r_point = Point::<C>::generator() * u1 + pk * u2;
    if r_point.is_zero() {
        return Err(ProtocolError::SignatureVerificationFailed);
    }
    let r_check = curve::x_coordinate(&r_point);
    if r_check == r {
        Ok(())
    } else {
        Err(ProtocolError::SignatureVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{hash_to_scalar, K256};
    use generic_ec::SecretScalar;

    fn rng() -> rand_chacha::ChaCha20Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha20Rng::seed_from_u64(77)
    }

    fn sign(sk: &SecretScalar<K256>, h: Scalar<K256>, rng: &mut impl rand_core::CryptoRng) -> (Scalar<K256>, Scalar<K256>) {
        use rand_core::RngCore;
        loop {
            let k = Scalar::<K256>::random(rng);
            let r_point = Point::<K256>::generator() * k;
            let r = curve::x_coordinate(&r_point);
            if r.is_zero() {
                continue;
            }
            let k_inv = match k.invert() {
                Some(v) => v,
                None => continue,
            };
            let s = k_inv * (h + r * sk.as_ref());
            if s.is_zero() {
                continue;
            }
            let _ = rng.next_u32();
            return (r, s);
        }
    }

    #[test]
    fn accepts_a_genuine_signature() {
        let mut rng = rng();
        let sk = SecretScalar::<K256>::random(&mut rng);
        let pk = Point::generator() * sk.as_ref();
        let h: Scalar<K256> = hash_to_scalar(b"test message");
        let (r, s) = sign(&sk, h, &mut rng);
        assert!(verify(pk, h, r, s).is_ok());
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let mut rng = rng();
        let sk = SecretScalar::<K256>::random(&mut rng);
        let pk = Point::generator() * sk.as_ref();
        let h: Scalar<K256> = hash_to_scalar(b"test message");
        let (r, s) = sign(&sk, h, &mut rng);
        let bad_s = s + Scalar::<K256>::from(1);
        assert!(verify(pk, h, r, bad_s).is_err());
    }

    #[test]
    fn rejects_zero_r_or_s() {
        let mut rng = rng();
        let sk = SecretScalar::<K256>::random(&mut rng);
        let pk = Point::generator() * sk.as_ref();
        let h: Scalar<K256> = hash_to_scalar(b"test message");
        assert!(verify(pk, h, Scalar::<K256>::from(0), Scalar::<K256>::from(1)).is_err());
        assert!(verify(pk, h, Scalar::<K256>::from(1), Scalar::<K256>::from(0)).is_err());
    }
}
