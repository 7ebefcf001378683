//! Custom serde handling for epoch-millisecond fields
//!
//! The bridge hands 64-bit timestamps over as decimal strings (JavaScript numbers
//! lose precision past 2^53), while persisted records store them as plain numbers.
//! Deserialization accepts either form; serialization always writes a number.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum MillisRepr {
    Number(i64),
    Text(String),
}

fn parse_repr<E: serde::de::Error>(repr: MillisRepr) -> Result<i64, E> {
    match repr {
        MillisRepr::Number(millis) => Ok(millis),
        MillisRepr::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| E::custom(format!("invalid epoch milliseconds {:?}: {}", text, e))),
    }
}

/// Serialize an Option<i64> of epoch milliseconds
pub fn serialize<S>(millis: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match millis {
        Some(millis) => serializer.serialize_i64(*millis),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an Option<i64> from a number, a decimal string, or null
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<MillisRepr>::deserialize(deserializer)?
        .map(parse_repr)
        .transpose()
}
