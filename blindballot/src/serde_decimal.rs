//! Decimal-string serde for big integers.
//!
//! Protocol payloads carry big integers as base-10 strings. Small values may
//! also arrive as plain JSON numbers (the authority publishes toy-scale
//! parameters that way), so deserialization accepts both.

use num_bigint_dig::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = BigUint;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a base-10 integer as a string or number")
    }

    fn visit_str<E>(self, value: &str) -> Result<BigUint, E>
    where
        E: de::Error,
    {
        BigUint::from_str(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_u64<E>(self, value: u64) -> Result<BigUint, E>
    where
        E: de::Error,
    {
        Ok(BigUint::from(value))
    }
}

pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<BigUint>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.to_str_radix(10)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigUint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(OptionalDecimalVisitor)
    }

    struct OptionalDecimalVisitor;

    impl<'de> Visitor<'de> for OptionalDecimalVisitor {
        type Value = Option<BigUint>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "an optional base-10 integer as a string or number")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            super::deserialize(deserializer).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use num_bigint_dig::BigUint;
    use std::str::FromStr;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Payload {
        #[serde(with = "crate::serde_decimal")]
        value: BigUint,
    }

    #[test]
    fn round_trips_as_decimal_string() {
        let payload = Payload {
            value: BigUint::from_str("123456789012345678901234567890").unwrap(),
        };
        let encoded = serde_json::to_string(&payload).unwrap();
        assert_eq!(encoded, r#"{"value":"123456789012345678901234567890"}"#);
        assert_eq!(serde_json::from_str::<Payload>(&encoded).unwrap(), payload);
    }

    #[test]
    fn accepts_plain_json_numbers() {
        let payload: Payload = serde_json::from_str(r#"{"value":9973}"#).unwrap();
        assert_eq!(payload.value, BigUint::from(9973u32));
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(serde_json::from_str::<Payload>(r#"{"value":"not a number"}"#).is_err());
    }
}
