//! Serialization utilities for the JavaScript boundary

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a u128 as a decimal string.
///
/// Wei amounts routinely exceed JavaScript's 2^53-1 safe-integer range, so
/// they always cross the boundary as strings.
pub fn serialize_u128_as_string<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Deserialize a u128 that might arrive as a string or a number.
pub fn deserialize_u128_flexible<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum U128OrString {
        Number(u128),
        String(String),
    }

    match U128OrString::deserialize(deserializer)? {
        U128OrString::Number(n) => Ok(n),
        U128OrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
