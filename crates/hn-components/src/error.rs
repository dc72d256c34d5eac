//! Error types for component definitions.

use hn_core::HnError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown pipe type: {name}")]
    UnknownPipeType { name: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for HnError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => HnError::InvalidArg { what },
            ComponentError::InvalidArg { what } => HnError::InvalidArg { what },
            ComponentError::UnknownPipeType { name } => HnError::Setup {
                what: format!("unknown pipe type {name}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::UnknownPipeType {
            name: "KMR 7/9".into(),
        };
        assert!(err.to_string().contains("KMR 7/9"));
    }

    #[test]
    fn error_conversion() {
        let err: HnError = ComponentError::InvalidArg { what: "test" }.into();
        assert!(matches!(err, HnError::InvalidArg { .. }));
    }
}
