//! hn-core: stable foundation for heatnet.
//!
//! Contains:
//! - units (uom SI types + constructors, bar/celsius helpers, water constants)
//! - numeric (finiteness check, angle wrapping)
//! - ids (stable compact IDs for network objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HnError, HnResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
