//! Curve adapter (spec §6): the two curves this crate's protocols are
//! exercised over, plus the handful of curve-level operations the core
//! needs beyond what `generic_ec::Curve` already provides — principally
//! extracting the affine x-coordinate of a point as a scalar, used to turn
//! the ECDSA/SM2 nonce point `R` into the signature component `r`.

use generic_ec::{Curve, Point, Scalar};

/// secp256k1, as used by the 2-party ECDSA protocols and the DKLs OT-MtA
/// test vectors.
pub type K256 = generic_ec_curves::rust_crypto::Secp256k1;

/// NIST P-256, the other curve the core is required to run over (spec §6).
pub type P256 = generic_ec_curves::rust_crypto::Secp256r1;

/// Extract the affine x-coordinate of `point` and reduce it modulo the
/// curve order, yielding the ECDSA/SM2 signature component `r`.
///
/// Implemented via the uncompressed SEC1 encoding (`04 || x || y`): the
/// x-coordinate is exactly the first half of the payload that follows the
/// one-byte tag. This mirrors the source's affine-encoding convention (spec
/// §4.9) and keeps the recovery bit `v` (derivable from the tag/odd-ness of
/// `y`) consistent with the bytes callers see on the wire.
pub fn x_coordinate<C: Curve>(point: &Point<C>) -> Scalar<C> {
    let uncompressed = point.to_bytes(false);
    let payload = &uncompressed.as_bytes()[1..];
    let half = payload.len() / 2;
    Scalar::<C>::from_be_bytes_mod_order(&payload[..half])
}

/// `true` if the affine y-coordinate of `point` is odd — the ECDSA/SM2
/// recovery bit `v`.
pub fn y_is_odd<C: Curve>(point: &Point<C>) -> bool {
    let compressed = point.to_bytes(true);
    compressed.as_bytes()[0] == 0x03
}

/// Hash an arbitrary message to a curve scalar, as required by ECDSA/SM2
/// signing (`h = Hash(m)` in spec §4.9, §4.10).
pub fn hash_to_scalar<C: Curve>(msg: &[u8]) -> Scalar<C> {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(msg);
    Scalar::<C>::from_be_bytes_mod_order(&digest)
}

/// The prime order of a curve's scalar field, as a [`crate::common::BigNumber`].
///
/// The integer-ZK range proofs (§4.3) and the MtA protocols (§4.5, §4.6)
/// treat the curve order `q` as a public bound on scalars — it has to leave
/// the scalar field and become a plain big integer to appear in Paillier
/// ciphertext exponents and Pedersen commitment exponents. `generic_ec`
/// doesn't expose the order directly, so this crate pins it per supported
/// curve (spec §6 names exactly `K256` and `P256`).
pub trait CurveOrder: Curve {
    const ORDER_BE_BYTES: [u8; 32];
}

impl CurveOrder for K256 {
    const ORDER_BE_BYTES: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ];
}

impl CurveOrder for P256 {
    const ORDER_BE_BYTES: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63,
        0x25, 0x51,
    ];
}

/// `q`, the curve's scalar field order, as a [`crate::common::BigNumber`].
pub fn order<C: CurveOrder>() -> crate::common::BigNumber {
    crate::common::BigNumber::from_slice(C::ORDER_BE_BYTES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use generic_ec::Scalar as S;

    #[test]
    fn x_coordinate_of_generator_is_stable() {
        let g = Point::<K256>::generator();
        let r1 = x_coordinate(&g);
        let r2 = x_coordinate(&g);
        assert_eq!(r1, r2);
    }

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a: S<K256> = hash_to_scalar(b"test message");
        let b: S<K256> = hash_to_scalar(b"test message");
        assert_eq!(a, b);
    }

    #[test]
    fn curve_orders_are_prime() {
        assert!(order::<K256>().is_prime());
        assert!(order::<P256>().is_prime());
    }
}
