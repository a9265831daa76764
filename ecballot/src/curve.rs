use crate::arithmetic::{legendre_symbol, mod_inverse, modular_sqrt, reduce};
use crate::serde_hex::biguint_hex;
use crate::*;
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Raw curve parameters as supplied by configuration: y² = x³ + ax + b over F_p, with a
/// group order `order` that annihilates every point used by the election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveParameters {
    pub a: BigInt,
    pub b: BigInt,
    pub p: BigUint,
    pub order: BigUint,
}

impl CurveParameters {
    pub fn new(a: BigInt, b: BigInt, p: BigUint, order: BigUint) -> Self {
        CurveParameters { a, b, p, order }
    }

    /// Parse decimal strings
    pub fn from_decimal(a: &str, b: &str, p: &str, order: &str) -> Result<Self, Error> {
        let bad = |name: &str| Error::Configuration(format!("curve parameter {} is not an integer", name));
        Ok(CurveParameters {
            a: BigInt::from_str(a.trim()).map_err(|_| bad("a"))?,
            b: BigInt::from_str(b.trim()).map_err(|_| bad("b"))?,
            p: BigUint::from_str(p.trim()).map_err(|_| bad("p"))?,
            order: BigUint::from_str(order.trim()).map_err(|_| bad("order"))?,
        })
    }

    /// The 160-bit curve used by legacy deployments
    pub fn legacy_160() -> Self {
        // The literals are valid decimal, so parsing cannot fail
        CurveParameters {
            a: BigInt::parse_bytes(b"1268133167195989090596625406312984755854486256116", 10)
                .unwrap_or_default(),
            b: BigInt::parse_bytes(b"386736940269827655214118852806596527602892573734", 10)
                .unwrap_or_default(),
            p: BigUint::parse_bytes(b"1461501637330902918203684832716283019655932542983", 10)
                .unwrap_or_default(),
            order: BigUint::parse_bytes(b"1461501637330902918203684149283858612734394057783", 10)
                .unwrap_or_default(),
        }
    }

    /// Build the curve these parameters describe
    pub fn curve(&self) -> Result<EllipticCurve, Error> {
        EllipticCurve::new(&self.a, &self.b, &self.p)
    }
}

/// A short-Weierstrass curve y² = x³ + ax + b over the prime field F_p.
///
/// `a` and `b` are stored reduced mod p. The curve is validated as non-singular at
/// construction and is immutable afterwards.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EllipticCurve {
    #[serde(with = "biguint_hex")]
    a: BigUint,

    #[serde(with = "biguint_hex")]
    b: BigUint,

    #[serde(with = "biguint_hex")]
    p: BigUint,
}

impl EllipticCurve {
    /// Create a new curve, rejecting singular parameters (4a³ + 27b² = 0 mod p).
    pub fn new(a: &BigInt, b: &BigInt, p: &BigUint) -> Result<Self, Error> {
        if *p <= BigUint::from(3u32) || p.is_even() {
            return Err(Error::Configuration(format!(
                "curve modulus {} is not an odd prime greater than 3",
                p
            )));
        }

        let a = reduce(a, p);
        let b = reduce(b, p);
        let discriminant = (4u32 * a.modpow(&BigUint::from(3u32), p) + 27u32 * (&b * &b)) % p;
        if discriminant.is_zero() {
            return Err(Error::Configuration(
                "singular curve: 4a^3 + 27b^2 = 0 (mod p)".to_string(),
            ));
        }

        Ok(EllipticCurve {
            a,
            b,
            p: p.clone(),
        })
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// x³ + ax + b (mod p)
    fn rhs(&self, x: &BigUint) -> BigUint {
        (x.modpow(&BigUint::from(3u32), &self.p) + &self.a * x + &self.b) % &self.p
    }

    /// True for the identity and for reduced points satisfying the curve equation
    pub fn is_on_curve(&self, point: &CurvePoint) -> bool {
        if point.is_identity() {
            return true;
        }
        let (x, y) = (point.x(), point.y());
        if *x >= self.p || *y >= self.p {
            return false;
        }
        (y * y) % &self.p == self.rhs(x)
    }

    pub fn negate(&self, point: &CurvePoint) -> CurvePoint {
        if point.is_identity() {
            return CurvePoint::identity();
        }
        let y = (&self.p - (point.y() % &self.p)) % &self.p;
        CurvePoint::new(point.x().clone(), y)
    }

    /// Add two points on the curve
    pub fn add(&self, first: &CurvePoint, second: &CurvePoint) -> Result<CurvePoint, CurveError> {
        if !self.is_on_curve(first) || !self.is_on_curve(second) {
            return Err(CurveError::NotOnCurve);
        }
        if first.is_identity() {
            return Ok(second.clone());
        }
        if second.is_identity() {
            return Ok(first.clone());
        }
        if *first == self.negate(second) {
            return Ok(CurvePoint::identity());
        }

        let p = &self.p;
        let (x1, y1) = (first.x(), first.y());
        let (x2, y2) = (second.x(), second.y());

        let (numerator, denominator) = if first != second {
            ((y2 + p - y1) % p, (x2 + p - x1) % p)
        } else {
            ((3u32 * x1 * x1 + &self.a) % p, (2u32 * y1) % p)
        };
        let inverse = mod_inverse(&denominator, p).ok_or(CurveError::NotInvertible)?;
        let lambda = (numerator * inverse) % p;

        let x3 = ((&lambda * &lambda) % p + 2u32 * p - x1 - x2) % p;
        let y3 = ((lambda * ((x1 + p - &x3) % p)) % p + p - y1) % p;
        Ok(CurvePoint::new(x3, y3))
    }

    pub fn subtract(
        &self,
        first: &CurvePoint,
        second: &CurvePoint,
    ) -> Result<CurvePoint, CurveError> {
        self.add(first, &self.negate(second))
    }

    /// Multiply a point by a non-negative scalar (double-and-add from the least significant bit)
    pub fn multiply(&self, k: &BigUint, point: &CurvePoint) -> Result<CurvePoint, CurveError> {
        if !self.is_on_curve(point) {
            return Err(CurveError::NotOnCurve);
        }

        let mut result = CurvePoint::identity();
        let mut temp = point.clone();
        let mut k = k.clone();
        while !k.is_zero() {
            if k.is_odd() {
                result = self.add(&result, &temp)?;
            }
            k >>= 1;
            if !k.is_zero() {
                temp = self.add(&temp, &temp)?;
            }
        }
        Ok(result)
    }

    /// Multiply a point by a signed scalar. Negative scalars multiply the negated point.
    pub fn scalar_multiply(&self, k: &BigInt, point: &CurvePoint) -> Result<CurvePoint, CurveError> {
        if k.sign() == Sign::Minus {
            self.multiply(k.magnitude(), &self.negate(point))
        } else {
            self.multiply(k.magnitude(), point)
        }
    }

    /// Pick a random finite point by rejection sampling on x.
    pub fn random_generator<R: Rng + ?Sized>(&self, rng: &mut R) -> CurvePoint {
        let one = BigUint::one();
        loop {
            let x = rng.gen_biguint_range(&one, &self.p);
            let y_squared = self.rhs(&x);
            if legendre_symbol(&y_squared, &self.p) == 1 {
                let y = modular_sqrt(&y_squared, &self.p);
                return CurvePoint::new(x, y);
            }
        }
    }
}

impl fmt::Debug for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "y^2 = x^3 + {}x + {} over F_{}", self.a, self.b, self.p)
    }
}
