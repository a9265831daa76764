use crate::arithmetic::random_coprime;
use crate::serde_hex::biguint_hex;
use crate::*;
use num_bigint::BigUint;
use num_traits::{One, Pow};
use rand::{CryptoRng, Rng};

/// Inputs to `TallyAuthority::setup`
#[derive(Clone, Debug)]
pub struct ElectionConfig {
    /// Number of candidates N
    pub candidates: usize,

    /// Maximum number of ballots the election will accept
    pub max_voters: usize,

    pub curve: CurveParameters,

    pub challenge: ChallengeFunction,
}

impl ElectionConfig {
    pub fn new(candidates: usize, max_voters: usize, curve: CurveParameters) -> Self {
        ElectionConfig {
            candidates,
            max_voters,
            curve,
            challenge: ChallengeFunction::default(),
        }
    }

    pub fn with_challenge(mut self, challenge: ChallengeFunction) -> Self {
        self.challenge = challenge;
        self
    }

    /// Check the configuration and build its curve
    pub fn validate(&self) -> Result<EllipticCurve, Error> {
        if self.candidates == 0 {
            return Err(Error::Configuration(
                "an election needs at least one candidate".to_string(),
            ));
        }
        if self.max_voters == 0 {
            return Err(Error::Configuration(
                "an election needs at least one voter".to_string(),
            ));
        }
        if self.curve.order <= BigUint::one() {
            return Err(Error::Configuration(format!(
                "group order {} is too small",
                self.curve.order
            )));
        }

        let curve = self.curve.curve()?;

        // Each candidate's count is a digit in base (max_voters + 1); the largest
        // encoded tally must not wrap around the group order.
        let radix = BigUint::from(self.max_voters) + 1u32;
        if self.candidates as u64 > self.curve.order.bits()
            || Pow::pow(&radix, self.candidates) > self.curve.order
        {
            return Err(Error::Configuration(format!(
                "{} candidates with {} voters overflow a group of order {}",
                self.candidates, self.max_voters, self.curve.order
            )));
        }

        Ok(curve)
    }
}

/// The public key bundle published by a tally authority.
///
/// Voters need nothing else to build a ballot, and the authority verifies ballots against
/// exactly this value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElectionParameters {
    pub curve: EllipticCurve,

    /// Generator P
    pub generator: CurvePoint,

    /// Authority public point Q = d·P
    pub public_point: CurvePoint,

    #[serde(with = "biguint_hex")]
    pub order: BigUint,

    /// Per-candidate base points M[i] = (max_voters + 1)^i · P
    pub base_points: Vec<CurvePoint>,

    pub max_voters: usize,

    #[serde(default)]
    pub challenge: ChallengeFunction,
}

impl ElectionParameters {
    /// Derive fresh public parameters, returning them with the private scalar d.
    pub fn generate<R: Rng + CryptoRng + ?Sized>(
        rng: &mut R,
        config: &ElectionConfig,
    ) -> Result<(Self, BigUint), Error> {
        let curve = config.validate()?;
        let order = &config.curve.order;

        let generator = curve.random_generator(rng);
        if !curve.multiply(order, &generator)?.is_identity() {
            return Err(Error::Configuration(format!(
                "group order {} does not annihilate the generator",
                order
            )));
        }

        let secret = random_coprime(rng, order);
        let public_point = curve.multiply(&secret, &generator)?;

        let radix = BigUint::from(config.max_voters) + 1u32;
        let mut base_points = Vec::with_capacity(config.candidates);
        for i in 0..config.candidates {
            let exponent = radix.modpow(&BigUint::from(i), order);
            base_points.push(curve.multiply(&exponent, &generator)?);
        }

        let params = ElectionParameters {
            curve,
            generator,
            public_point,
            order: order.clone(),
            base_points,
            max_voters: config.max_voters,
            challenge: config.challenge,
        };
        Ok((params, secret))
    }

    /// Number of candidates N
    pub fn candidates(&self) -> usize {
        self.base_points.len()
    }

    /// Challenge for a proof commitment sequence under this election's challenge policy
    pub fn challenge_for(&self, a: &[CurvePoint], b: &[CurvePoint]) -> BigUint {
        self.challenge.challenge(a, b, self.curve.p(), &self.order)
    }

    /// Structural sanity check for parameters received from elsewhere
    pub fn check(&self) -> Result<(), Error> {
        if self.base_points.is_empty() {
            return Err(Error::Configuration("no candidate base points".to_string()));
        }
        let points = [&self.generator, &self.public_point];
        for point in points.iter().copied().chain(self.base_points.iter()) {
            if !self.curve.is_on_curve(point) {
                return Err(CurveError::NotOnCurve.into());
            }
        }
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        crate::serde_hex::from_bytes(bytes)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        crate::serde_hex::to_cbor(self)
    }
}
