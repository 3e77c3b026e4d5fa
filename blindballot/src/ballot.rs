use crate::arith;
use num_bigint_dig::BigUint;

/// A voter's selection, kept both as display text and as the canonical
/// integer used by all arithmetic.
///
/// The encoding is recomputed from the text on construction, so the same
/// text always maps to the same integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotChoice {
    text: String,
    encoded: BigUint,
}

impl BallotChoice {
    pub fn new(text: &str) -> Self {
        BallotChoice {
            text: text.to_string(),
            encoded: arith::encode_to_integer(text),
        }
    }

    /// Human-readable candidate label, for display and confirmation only.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The base-256 big-endian integer encoding of the text.
    pub fn encoded(&self) -> &BigUint {
        &self.encoded
    }
}
