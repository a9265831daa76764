use ecballot::{ChallengeFunction, CurveParameters, Error, MemStore};
use std::env::var;

pub struct Config {
    pub curve: CurveParameters,
    pub challenge: ChallengeFunction,
    pub key_bits: usize,
}

impl Config {
    /// Read `ECBALLOT_*` variables. Unset variables take their defaults.
    pub fn from_env() -> Result<Self, Error> {
        Config::from_lookup(|name| var(name).ok())
    }

    /// Build the configuration from any name → value lookup
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, Error> {
        let curve_vars = ["A", "B", "P", "ORDER"]
            .iter()
            .map(|name| lookup(&format!("ECBALLOT_CURVE_{}", name)))
            .collect::<Vec<_>>();

        let curve = match curve_vars.as_slice() {
            [Some(a), Some(b), Some(p), Some(order)] => {
                CurveParameters::from_decimal(a, b, p, order)?
            }
            [None, None, None, None] => CurveParameters::legacy_160(),
            _ => {
                return Err(Error::Configuration(
                    "set all of ECBALLOT_CURVE_A, _B, _P and _ORDER or none of them".to_string(),
                ))
            }
        };

        let challenge = match lookup("ECBALLOT_CHALLENGE") {
            Some(val) => val.parse()?,
            None => ChallengeFunction::default(),
        };

        let key_bits = match lookup("ECBALLOT_KEY_BITS") {
            Some(val) => val.trim().parse().map_err(|_| {
                Error::Configuration(format!("ECBALLOT_KEY_BITS is not a number: {}", val))
            })?,
            None => MemStore::DEFAULT_KEY_BITS,
        };

        Ok(Config {
            curve,
            challenge,
            key_bits,
        })
    }
}
