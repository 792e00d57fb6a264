//! Shared integer helpers: the Pedersen-style commit primitive (spec §2 C2),
//! a CRT helper for composite-modulus square roots, and the small
//! [`BigNumber`] utility belt every ZK module in this crate builds on.

pub use libpaillier::unknown_order::BigNumber;

use rand_core::RngCore;

/// `Commit(g, h, a, b, m) = g^a * h^b mod m`.
///
/// This is the one Pedersen-style commitment used throughout the integer-ZK
/// layer (spec §2 C2, §4.3) and reused by the group-level Fiat–Shamir
/// responses that fold two exponents into one modular product.
pub fn combine(g: &BigNumber, a: &BigNumber, h: &BigNumber, b: &BigNumber, m: &BigNumber) -> BigNumber {
    g.modpow(a, m).modmul(&h.modpow(b, m), m)
}

/// Sample a uniformly random element of `(Z/n)*`, i.e. invertible mod `n`.
///
/// Used to pick Paillier encryption randomness and Pedersen blinding
/// factors that must be units.
pub fn gen_inversible<R: RngCore>(n: &BigNumber, rng: &mut R) -> BigNumber {
    loop {
        let r = BigNumber::from_rng(n, rng);
        if r.gcd(n) == BigNumber::one() {
            return r;
        }
    }
}

/// Convert a public, non-secret [`BigNumber`] into a curve scalar by
/// reducing it modulo the curve order.
///
/// Only ever applied to values that are already public proof elements
/// (spec §3: "constant-time byte serialization is *not* required" for
/// `BigNumber`, since these are public). Secret scalars flow through
/// `generic_ec::Scalar`/`SecretScalar` directly and never pass through this
/// conversion.
pub fn convert_scalar<C: generic_ec::Curve>(x: &BigNumber) -> generic_ec::Scalar<C> {
    let bytes = x.to_bytes();
    generic_ec::Scalar::<C>::from_be_bytes_mod_order(&bytes)
}

/// Jacobi symbol `(a / n)` for odd positive `n`, computed via the standard
/// quadratic-reciprocity recursion. `R_P` (§4.3) needs this to pick a
/// quadratic non-residue `w` with Jacobi symbol `-1` mod a Blum integer.
pub fn jacobi(a: &BigNumber, n: &BigNumber) -> i8 {
    let zero = BigNumber::zero();
    let one = BigNumber::one();
    let two = BigNumber::from(2);
    let three = BigNumber::from(3);
    let four = BigNumber::from(4);
    let eight = BigNumber::from(8);

    assert!(n > &zero && n.modulus(&two) == one, "jacobi: n must be odd positive");

    let mut a = a.nmod(n);
    let mut n = n.clone();
    let mut result: i8 = 1;

    while a != zero {
        while a.modulus(&two) == zero {
            a = a / &two;
            let r = n.modulus(&eight);
            if r == three || r == BigNumber::from(5) {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if a.modulus(&four) == three && n.modulus(&four) == three {
            result = -result;
        }
        a = a.nmod(&n);
    }

    if n == one {
        result
    } else {
        0
    }
}

/// Square root of `x` modulo a Blum prime `p` (`p ≡ 3 (mod 4)`): simply
/// `x^((p+1)/4) mod p`.
fn sqrt_mod_blum_prime(x: &BigNumber, p: &BigNumber) -> BigNumber {
    let exp = (p + BigNumber::one()) >> 2;
    x.modpow(&exp, p)
}

/// Combine square roots mod `p` and mod `q` into a square root mod `n = p*q`
/// via the Chinese Remainder Theorem, for `n` a Blum integer (both `p, q ≡ 3
/// (mod 4)`). Used by `R_P` (§4.3) to produce the fourth root witness, and
/// more generally whenever the integer-ZK layer needs a composite-modulus
/// square root and the factorization is known to the prover.
pub fn crt_sqrt_blum(x: &BigNumber, p: &BigNumber, q: &BigNumber) -> BigNumber {
    let n = p * q;
    let rp = sqrt_mod_blum_prime(&x.nmod(p), p);
    let rq = sqrt_mod_blum_prime(&x.nmod(q), q);
    crt_combine(&rp, p, &rq, q, &n)
}

/// Garner's CRT reconstruction: given `x ≡ xp (mod p)` and `x ≡ xq (mod q)`
/// with `gcd(p, q) = 1`, recover `x mod n` where `n = p*q`.
pub fn crt_combine(xp: &BigNumber, p: &BigNumber, xq: &BigNumber, q: &BigNumber, n: &BigNumber) -> BigNumber {
    let p_inv_mod_q = p.invert(q).expect("p invertible mod q for coprime p, q");
    let h = ((xq - xp) * p_inv_mod_q).nmod(q);
    (xp + &h * p).nmod(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobi_matches_known_values() {
        // (1001 / 9907) = -1, a textbook example.
        assert_eq!(jacobi(&BigNumber::from(1001), &BigNumber::from(9907)), -1);
        assert_eq!(jacobi(&BigNumber::from(5), &BigNumber::from(21)), 1);
        assert_eq!(jacobi(&BigNumber::from(2), &BigNumber::from(15)), 1);
    }

    #[test]
    fn crt_sqrt_roundtrip() {
        // p, q ≡ 3 mod 4
        let p = BigNumber::from(11);
        let q = BigNumber::from(19);
        let n = &p * &q;
        let x = BigNumber::from(25).modpow(&BigNumber::from(2), &n);
        let root = crt_sqrt_blum(&x, &p, &q);
        assert_eq!(root.modpow(&BigNumber::from(2), &n), x);
    }
}
