use std::io;
use thiserror::Error;

/// The only way a loan calculation fails. The reason is kept so callers can
/// log it, while users are shown a plain "Incorrect parameters".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("Incorrect parameters: {0}")]
    InvalidParameters(ParamFault),
}

impl LoanError {
    pub fn fault(&self) -> &ParamFault {
        match self {
            LoanError::InvalidParameters(fault) => fault,
        }
    }
}

impl From<ParamFault> for LoanError {
    fn from(fault: ParamFault) -> Self {
        LoanError::InvalidParameters(fault)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamFault {
    #[error("annual interest is required")]
    MissingInterest,

    #[error("calculation type is required")]
    MissingType,

    #[error("unknown calculation type '{0}', expected 'annuity' or 'diff'")]
    UnknownType(String),

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("periods must be at least one month")]
    ZeroPeriods,

    #[error("{field} is too large")]
    TooLarge { field: &'static str },

    #[error("the supplied values do not match any calculation")]
    UnsupportedCombination,

    #[error("a payment of {payment} never repays a principal of {principal}")]
    NonAmortizing { payment: f64, principal: f64 },

    #[error("payment schedule runs past the supported calendar range")]
    DateOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    #[error("at least one option is required")]
    Empty,

    #[error("options must not be blank")]
    Blank,

    #[error("option '{0}' is listed more than once")]
    Duplicate(String),

    #[error("an odd number of options is required, got {0}")]
    EvenCount(usize),
}

/// Failures of the interactive sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("input closed before the session finished")]
    InputClosed,
}
