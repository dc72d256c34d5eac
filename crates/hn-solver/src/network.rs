//! Read-only view of the supply network handed to a solver.

use hn_components::{CirculationPump, HeatConsumer, PipeType};
use hn_core::{NodeId, PipeId};
use hn_graph::{Point, Topology};
use hn_netgen::ShortestPathTree;

use crate::error::{SolverError, SolverResult};

/// A consumer placed on the network.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerSite {
    pub consumer: HeatConsumer,
    pub node: NodeId,
    /// Pipes from the pump to this consumer, pump side first.
    pub path: Vec<PipeId>,
    pub path_length_m: f64,
}

/// Network structure shared by every hour of a run.
///
/// Built once and never mutated; the orchestrator owns all writes to
/// boundary conditions.
#[derive(Debug, Clone)]
pub struct NetworkHandle {
    topology: Topology,
    producer: NodeId,
    pump: CirculationPump,
    pipe_types: Vec<PipeType>,
    sites: Vec<ConsumerSite>,
}

impl NetworkHandle {
    /// Place the pump and consumers on a forward topology, all pipes of one type.
    pub fn new(
        topology: Topology,
        producer: Point,
        pump: CirculationPump,
        consumers: Vec<(HeatConsumer, Point)>,
        pipe_type: &PipeType,
    ) -> SolverResult<Self> {
        let producer_node = topology
            .find_node(producer)
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("producer {} is not on the network", pump.name),
            })?;

        let tree = ShortestPathTree::new(&topology, &[producer_node]);
        let mut sites = Vec::with_capacity(consumers.len());
        for (consumer, point) in consumers {
            let node = topology
                .find_node(point)
                .ok_or_else(|| SolverError::ProblemSetup {
                    what: format!("consumer {} is not on the network", consumer.name),
                })?;
            let (Some(path), Some(path_length_m)) =
                (tree.path_to(&topology, node), tree.distance(node))
            else {
                return Err(SolverError::ProblemSetup {
                    what: format!("consumer {} is unreachable from the producer", consumer.name),
                });
            };
            sites.push(ConsumerSite {
                consumer,
                node,
                path,
                path_length_m,
            });
        }

        let pipe_types = vec![pipe_type.clone(); topology.pipes().len()];
        Ok(Self {
            topology,
            producer: producer_node,
            pump,
            pipe_types,
            sites,
        })
    }

    /// Override the per-pipe types, indexed by pipe id.
    pub fn with_pipe_types(mut self, pipe_types: Vec<PipeType>) -> SolverResult<Self> {
        if pipe_types.len() != self.topology.pipes().len() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "pipe type count mismatch: {} != {}",
                    pipe_types.len(),
                    self.topology.pipes().len()
                ),
            });
        }
        self.pipe_types = pipe_types;
        Ok(self)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn producer(&self) -> NodeId {
        self.producer
    }

    pub fn pump(&self) -> &CirculationPump {
        &self.pump
    }

    pub fn consumers(&self) -> &[ConsumerSite] {
        &self.sites
    }

    pub fn consumer_count(&self) -> usize {
        self.sites.len()
    }

    pub fn consumer_index(&self, name: &str) -> Option<usize> {
        self.sites.iter().position(|s| s.consumer.name == name)
    }

    pub fn pipe_type(&self, pipe: PipeId) -> Option<&PipeType> {
        self.pipe_types.get(pipe.idx())
    }
}
