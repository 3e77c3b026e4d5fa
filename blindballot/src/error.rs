use crate::*;

use thiserror::Error;

/// Arithmetic domain errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("blindballot: modulus must be greater than one")]
    InvalidModulus,

    #[error("blindballot: no modular inverse exists for the blinding factor")]
    NoInverse,
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("blindballot: arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("blindballot: identity must not be empty")]
    EmptyIdentity,

    #[error("blindballot: no candidate selected")]
    EmptyBallot,

    #[error("blindballot: step {attempted} attempted while the session is at step {current}")]
    StepOutOfOrder { attempted: Step, current: Step },

    #[error("blindballot: key exchange has not completed for this session")]
    KeyExchangeIncomplete,

    #[error("blindballot: blinding factor does not belong to the selected scheme")]
    MismatchedBlindingFactor,

    #[error("blindballot: authority rejected the request: {0}")]
    Authority(String),

    #[error("blindballot: tally service rejected the vote: {0}")]
    Tally(String),

    #[error("blindballot: network error: {0}")]
    Network(String),
}
