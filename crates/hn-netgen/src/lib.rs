//! hn-netgen: pipe-network topology synthesis.
//!
//! Turns building and producer points plus a street layer into connected
//! supply and return networks:
//!
//! 1. project every point perpendicularly onto its nearest street segment
//! 2. route the street endpoints (Euclidean MST or A* over the street graph)
//! 3. stitch disconnected components and simplify the result
//! 4. repeat from offset points for the return side, then assemble layers
//!
//! # Example
//!
//! ```
//! use hn_graph::{Point, StreetLayer};
//! use hn_netgen::{ConnectionPoint, GenerationOptions, generate_network};
//!
//! let streets = StreetLayer::new(vec![vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]]).unwrap();
//! let points = vec![
//!     ConnectionPoint::producer("plant", Point::new(0.0, 10.0)),
//!     ConnectionPoint::consumer("house-1", Point::new(50.0, 10.0), 12_000.0),
//!     ConnectionPoint::consumer("house-2", Point::new(90.0, -10.0), 8_000.0),
//! ];
//!
//! let network = generate_network(&points, &streets, &GenerationOptions::default()).unwrap();
//! assert!(network.forward.topology.is_connected());
//! assert!(network.return_side.topology.is_connected());
//! assert_eq!(network.layers().len(), 4);
//! ```

pub mod astar;
pub mod components;
pub mod demand;
pub mod error;
pub mod generate;
pub mod mst;
pub mod points;
pub mod projector;
pub mod simplify;
mod work;

pub use astar::{PathOutcome, RoutingStats, astar_with_timeout, route_on_streets};
pub use components::{ReconcileReport, connect_components};
pub use demand::{ShortestPathTree, attribute_demand};
pub use error::{NetgenError, NetgenResult};
pub use generate::{
    Algorithm, GeneratedNetwork, GenerationOptions, LayerKind, LineFeature, NetworkLayer,
    ReturnOffset, SideNetwork, generate_network,
};
pub use mst::{minimum_spanning_tree, mst_segments, unique_points};
pub use points::{ConnectionPoint, PointRole};
pub use projector::{Projection, ProjectionSet, project_points};
pub use simplify::{SimplifyOptions, SimplifyReport, simplify};
