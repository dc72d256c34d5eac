use hn_graph::GraphError;
use thiserror::Error;

pub type NetgenResult<T> = Result<T, NetgenError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetgenError {
    /// Malformed geometry that makes the whole build impossible.
    #[error("geometry error: {0}")]
    Geometry(#[from] GraphError),

    #[error("invalid generation option {what}: {value}")]
    InvalidOption { what: &'static str, value: f64 },
}
