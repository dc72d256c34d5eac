//! hn-components: element library for district-heating networks.
//!
//! Provides:
//! - The pipe catalog (standard types with inner diameter and roughness)
//! - Darcy-Weisbach friction for water-filled pipes
//! - Velocity envelopes and the mass-flow bounds they imply
//! - Heat consumer (house substation) and circulation pump definitions
//!
//! # Example
//!
//! ```
//! use hn_components::{PipeCatalog, VelocityEnvelope};
//!
//! let catalog = PipeCatalog::standard();
//! let pipe = catalog.get("KMR 100/250-2v").unwrap();
//! let bounds = VelocityEnvelope::default().bounds(pipe.inner_diameter());
//! assert!(bounds.min_kg_s < bounds.max_kg_s);
//! ```

pub mod catalog;
pub mod common;
pub mod consumer;
pub mod envelope;
pub mod error;
pub mod friction;
pub mod pump;

pub use catalog::{PipeCatalog, PipeType};
pub use consumer::HeatConsumer;
pub use envelope::{MassFlowBounds, VelocityEnvelope};
pub use error::{ComponentError, ComponentResult};
pub use friction::{friction_factor, pressure_drop_pa};
pub use pump::CirculationPump;
