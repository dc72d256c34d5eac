//! hn-graph: geometry and network-graph layer for heatnet.
//!
//! Provides:
//! - 2D geometry primitives (points, segments, perpendicular projection)
//! - The street layer and a weighted street graph with nearest-node index
//! - The pipe `Topology` and an incremental builder with validation
//!
//! # Example
//!
//! ```
//! use hn_graph::{PipeRole, Point, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new(PipeRole::Supply);
//! builder.add_pipe(Point::new(0.0, 0.0), Point::new(3.0, 0.0));
//! builder.add_pipe(Point::new(3.0, 0.0), Point::new(3.0, 4.0));
//! let topology = builder.build().unwrap();
//!
//! assert_eq!(topology.nodes().len(), 3);
//! assert_eq!(topology.pipes().len(), 2);
//! assert!(topology.is_connected());
//! ```

pub mod builder;
pub mod error;
pub mod geometry;
pub mod street;
pub mod topology;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::TopologyBuilder;
pub use error::{GraphError, GraphResult};
pub use geometry::{CoordKey, Point, Segment, offset_point};
pub use street::{StreetGraph, StreetLayer};
pub use topology::{Pipe, PipeRole, Topology, TopologyNode};
