use thiserror::Error;

pub type HnResult<T> = Result<T, HnError>;

/// Common denominator of the per-crate errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HnError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Malformed geometry: {what}")]
    Geometry { what: String },

    #[error("Network setup failed: {what}")]
    Setup { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
