//! Wire encoding helpers: hex encodings for big integers, for use in `#[serde(with)]`,
//! and JSON / CBOR sniffing for published records.
use crate::Error;
use content_inspector::ContentType;
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn encode(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

fn decode(encoded: &str) -> Result<BigUint, String> {
    let bytes = hex::decode(encoded).map_err(|e| format!("{}", e))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Decode a record from either JSON or CBOR
pub(crate) fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    match content_inspector::inspect(bytes) {
        ContentType::UTF_8 => match serde_json::from_slice(bytes) {
            Ok(value) => Ok(value),
            // CBOR with no null bytes sniffs as text
            Err(e) => serde_cbor::from_slice(bytes).map_err(|_| e.into()),
        },
        ContentType::BINARY => Ok(serde_cbor::from_slice(bytes)?),
        _ => Err(Error::DeserializationUnknownFormat),
    }
}

/// Encode a record as CBOR
pub(crate) fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    serde_cbor::to_vec(value).map_err(Error::CBORSerialization)
}

/// A single big integer as a hex string
pub mod biguint_hex {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::decode(&encoded).map_err(de::Error::custom)
    }
}

/// A sequence of big integers as a list of hex strings
pub mod biguint_hex_vec {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(
        values: &Vec<BigUint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoded: Vec<String> = values.iter().map(super::encode).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigUint>, D::Error> {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|s| super::decode(s).map_err(de::Error::custom))
            .collect()
    }
}
