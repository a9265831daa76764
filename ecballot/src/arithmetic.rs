//! Modular arithmetic over a prime field: Legendre symbols, square roots (Tonelli–Shanks),
//! inverses, and scalar sampling.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// Compute the Legendre symbol (a/p) for an odd prime p.
///
/// Returns 1 if `a` is a non-zero quadratic residue, -1 if it is a non-residue and 0 if
/// `a` is divisible by `p`.
pub fn legendre_symbol(a: &BigUint, p: &BigUint) -> i8 {
    let exp = (p - 1u32) >> 1;
    let ls = a.modpow(&exp, p);
    if ls.is_zero() {
        0
    } else if ls == p - 1u32 {
        -1
    } else {
        1
    }
}

/// Compute a square root of `a` modulo the prime `p` using Tonelli–Shanks.
///
/// Returns 0 if `a` is zero or has no square root. Callers should only rely on the result
/// when `legendre_symbol(a, p) == 1`.
pub fn modular_sqrt(a: &BigUint, p: &BigUint) -> BigUint {
    let a = a % p;
    let two = BigUint::from(2u32);
    if *p == two {
        return a;
    }
    if a.is_zero() || legendre_symbol(&a, p) != 1 {
        return BigUint::zero();
    }

    // Fast path for p = 3 (mod 4)
    if p % 4u32 == BigUint::from(3u32) {
        let exp = (p + 1u32) >> 2;
        return a.modpow(&exp, p);
    }

    // Factor p-1 as s * 2^e with s odd
    let mut s = p - 1u32;
    let mut e = 0u32;
    while s.is_even() {
        s >>= 1;
        e += 1;
    }

    // Any quadratic non-residue will do
    let mut n = two;
    while legendre_symbol(&n, p) != -1 {
        n += 1u32;
    }

    let mut x = a.modpow(&((&s + 1u32) >> 1), p);
    let mut b = a.modpow(&s, p);
    let mut g = n.modpow(&s, p);
    let mut r = e;

    loop {
        // Least m such that b^(2^m) = 1
        let mut t = b.clone();
        let mut m = 0u32;
        while !t.is_one() {
            t = (&t * &t) % p;
            m += 1;
            if m == r {
                return BigUint::zero();
            }
        }
        if m == 0 {
            return x;
        }

        let mut gs = g.clone();
        for _ in 0..(r - m - 1) {
            gs = (&gs * &gs) % p;
        }
        g = (&gs * &gs) % p;
        x = (x * &gs) % p;
        b = (b * &g) % p;
        r = m;
    }
}

/// Multiplicative inverse of `a` modulo `m`, if it exists
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let a = BigInt::from(a % m);
    let modulus = BigInt::from(m.clone());
    let egcd = a.extended_gcd(&modulus);
    if !egcd.gcd.is_one() {
        return None;
    }
    Some(reduce(&egcd.x, m))
}

/// Reduce a signed integer into `[0, m)`
pub fn reduce(value: &BigInt, m: &BigUint) -> BigUint {
    let modulus = BigInt::from(m.clone());
    let (_, magnitude) = value.mod_floor(&modulus).into_parts();
    magnitude
}

/// Sample a scalar uniformly from `[1, q)` that is relatively prime to `q`.
///
/// `q` must be greater than 1.
pub fn random_coprime<R: Rng + ?Sized>(rng: &mut R, q: &BigUint) -> BigUint {
    let one = BigUint::one();
    loop {
        let candidate = rng.gen_biguint_range(&one, q);
        if candidate.gcd(q).is_one() {
            return candidate;
        }
    }
}
