use crate::serde_decimal;
use num_bigint_dig::BigUint;

/// Authority-published public parameters, fetched once per session.
///
/// The wire carries no explicit tag; the two shapes are told apart by their
/// field names, so the enum is untagged. Which variant the authority
/// publishes also decides which blinding scheme the session runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PublicParameters {
    Rsa(RsaParameters),
    DiscreteLog(DiscreteLogParameters),
}

/// RSA modulus and public exponent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RsaParameters {
    #[serde(with = "serde_decimal")]
    pub n: BigUint,
    #[serde(with = "serde_decimal")]
    pub e: BigUint,
}

/// Prime modulus and generator, plus the authority's public value `y` when
/// the hash-based discrete-log scheme is in use.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DiscreteLogParameters {
    #[serde(with = "serde_decimal")]
    pub p: BigUint,
    #[serde(with = "serde_decimal")]
    pub g: BigUint,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_decimal::option"
    )]
    pub y: Option<BigUint>,
}
