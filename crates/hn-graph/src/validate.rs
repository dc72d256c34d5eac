//! Topology validation logic.

use hn_core::PipeId;

use crate::error::{GraphError, GraphResult};
use crate::topology::{Pipe, TopologyNode};

/// Validate the topology structure: references exist, no self loops, sane lengths.
pub(crate) fn validate_structure(nodes: &[TopologyNode], pipes: &[Pipe]) -> GraphResult<()> {
    for node in nodes {
        if !node.point.is_finite() {
            return Err(GraphError::NonFiniteCoordinate {
                what: "network node",
                x: node.point.x,
                y: node.point.y,
            });
        }
    }

    for pipe in pipes {
        for end in [pipe.from, pipe.to] {
            if end.idx() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    pipe: pipe.id,
                    node: end,
                });
            }
        }
        if pipe.from == pipe.to {
            return Err(GraphError::SelfLoop { pipe: pipe.id });
        }
        if !pipe.length_m.is_finite() || pipe.length_m <= 0.0 {
            return Err(GraphError::InvalidLength {
                pipe: pipe.id,
                length: pipe.length_m,
            });
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    nodes: &[TopologyNode],
    pipes: &[Pipe],
    node_pipe_offsets: &[usize],
    node_pipes: &[PipeId],
) -> GraphResult<()> {
    debug_assert_eq!(node_pipe_offsets.len(), nodes.len() + 1);

    for node in nodes {
        let idx = node.id.idx();
        let start = node_pipe_offsets[idx];
        let end = node_pipe_offsets[idx + 1];

        for &pipe_id in &node_pipes[start..end] {
            let Some(pipe) = pipes.get(pipe_id.idx()) else {
                return Err(GraphError::InconsistentAdjacency {
                    pipe: pipe_id,
                    node: node.id,
                });
            };
            if pipe.from != node.id && pipe.to != node.id {
                return Err(GraphError::InconsistentAdjacency {
                    pipe: pipe_id,
                    node: node.id,
                });
            }
        }
    }

    // Every pipe appears exactly twice (once per end)
    if node_pipes.len() != 2 * pipes.len() {
        return Err(GraphError::InconsistentAdjacency {
            pipe: pipes.first().map_or(PipeId::from_index(0), |p| p.id),
            node: nodes.first().map_or(hn_core::NodeId::from_index(0), |n| n.id),
        });
    }

    Ok(())
}
