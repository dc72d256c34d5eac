//! Hydraulic-thermal state model seam.
//!
//! The simulation drives a [`HydraulicSolver`]: given the network and the
//! boundary conditions of one iteration it returns pressures, temperatures
//! and mass flows for every consumer, pipe and the pump. The solver itself is
//! pluggable; [`ReferenceSolver`] is a deterministic quadratic-loss model for
//! tree networks fed by one circulation pump.

pub mod boundary;
pub mod error;
pub mod network;
pub mod reference;
pub mod state;

pub use boundary::BoundaryConditions;
pub use error::{SolverError, SolverResult};
pub use network::{ConsumerSite, NetworkHandle};
pub use reference::ReferenceSolver;
pub use state::{ConsumerElement, ElementState, PipeElement, PumpElement};

/// External solver contract: a blocking, re-entrant function of network state.
pub trait HydraulicSolver {
    /// Short identifier, folded into run ids.
    fn name(&self) -> &str;

    /// Equilibrate the network for one set of boundary conditions.
    fn apply(
        &mut self,
        network: &NetworkHandle,
        boundary: &BoundaryConditions,
    ) -> SolverResult<ElementState>;
}
