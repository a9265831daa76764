use crate::serde_hex::biguint_hex;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A point on a short-Weierstrass curve, or the identity (point at infinity).
///
/// Points are immutable values created by curve operations. Whether a finite point lies on
/// a given curve is checked by `EllipticCurve::is_on_curve`, not stored.
#[derive(Serialize, Deserialize, Clone)]
pub struct CurvePoint {
    #[serde(with = "biguint_hex")]
    x: BigUint,

    #[serde(with = "biguint_hex")]
    y: BigUint,

    #[serde(default)]
    identity: bool,
}

impl CurvePoint {
    /// A finite point with the given affine coordinates
    pub fn new(x: BigUint, y: BigUint) -> Self {
        CurvePoint {
            x,
            y,
            identity: false,
        }
    }

    /// The identity element. Its coordinates are fixed at (0, 0).
    pub fn identity() -> Self {
        CurvePoint {
            x: BigUint::zero(),
            y: BigUint::zero(),
            identity: true,
        }
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }
}

// All identity points are equal regardless of their stored coordinates
impl PartialEq for CurvePoint {
    fn eq(&self, other: &Self) -> bool {
        match (self.identity, other.identity) {
            (true, true) => true,
            (false, false) => self.x == other.x && self.y == other.y,
            _ => false,
        }
    }
}

impl Eq for CurvePoint {}

impl Hash for CurvePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
        if !self.identity {
            self.x.hash(state);
            self.y.hash(state);
        }
    }
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.identity {
            write!(f, "CurvePoint(identity)")
        } else {
            write!(f, "CurvePoint({}, {})", self.x, self.y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality() {
        let odd_identity = CurvePoint {
            x: BigUint::from(5u32),
            y: BigUint::from(7u32),
            identity: true,
        };
        assert_eq!(CurvePoint::identity(), odd_identity);
        assert_ne!(
            CurvePoint::identity(),
            CurvePoint::new(BigUint::zero(), BigUint::zero())
        );

        let mut set = HashSet::new();
        set.insert(CurvePoint::identity());
        assert!(set.contains(&odd_identity));
    }

    #[test]
    fn test_finite_equality() {
        let a = CurvePoint::new(BigUint::from(1u32), BigUint::from(9166u32));
        let b = CurvePoint::new(BigUint::from(1u32), BigUint::from(9166u32));
        let c = CurvePoint::new(BigUint::from(1u32), BigUint::from(843u32));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{}", a), "CurvePoint(1, 9166)");
    }

    #[test]
    fn test_serde_roundtrip_identity() {
        let json = serde_json::to_string(&CurvePoint::identity()).unwrap();
        let point: CurvePoint = serde_json::from_str(&json).unwrap();
        assert!(point.is_identity());
    }
}
