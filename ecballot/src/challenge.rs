//! Fiat–Shamir challenge derivation for ballot proofs.
//!
//! The legacy function, `(Σ x^y mod p) mod p` reduced mod the group order, is kept as the
//! default for compatibility with ballots produced by earlier deployments. It is NOT
//! collision resistant: an attacker can search for commitment sequences that hit a chosen
//! challenge far more cheaply than for a real hash. New elections should prefer `Sha256`.
use crate::*;
use digest::Digest;
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::Sha256;

/// Deterministic map from the proof commitment sequence A[] ∥ B[] to a scalar mod `order`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeFunction {
    Legacy,
    Sha256,
}

impl Default for ChallengeFunction {
    fn default() -> Self {
        ChallengeFunction::Legacy
    }
}

impl std::str::FromStr for ChallengeFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ChallengeFunction::Legacy),
            "sha256" => Ok(ChallengeFunction::Sha256),
            other => Err(Error::Configuration(format!(
                "unknown challenge function {}",
                other
            ))),
        }
    }
}

impl ChallengeFunction {
    /// Compute the challenge over `a` followed by `b`.
    pub fn challenge(
        &self,
        a: &[CurvePoint],
        b: &[CurvePoint],
        p: &BigUint,
        order: &BigUint,
    ) -> BigUint {
        let points = a.iter().chain(b.iter());
        match self {
            ChallengeFunction::Legacy => {
                let mut sum = BigUint::zero();
                for point in points {
                    if point.is_identity() {
                        // Counted as (0, 0), and 0^0 = 1
                        sum += 1u32;
                    } else {
                        sum += point.x().modpow(point.y(), p);
                    }
                }
                (sum % p) % order
            }
            ChallengeFunction::Sha256 => {
                let mut hasher = Sha256::new();
                for point in points {
                    if point.is_identity() {
                        hasher.update(&[0u8]);
                        continue;
                    }
                    hasher.update(&[1u8]);
                    for coordinate in &[point.x(), point.y()] {
                        let bytes = coordinate.to_bytes_be();
                        hasher.update(&(bytes.len() as u32).to_be_bytes());
                        hasher.update(&bytes);
                    }
                }
                BigUint::from_bytes_be(&hasher.finalize()) % order
            }
        }
    }
}
