//! Incremental topology builder.

use std::collections::{HashMap, HashSet};

use hn_core::{NodeId, PipeId};

use crate::error::GraphResult;
use crate::geometry::{CoordKey, Point, Segment};
use crate::topology::{Pipe, PipeRole, Topology, TopologyNode};
use crate::validate;

/// Builder for constructing a topology incrementally.
///
/// Nodes are identified by coordinate: adding a pipe whose end already exists
/// reuses that node. Zero-length and duplicate (undirected) pipes are skipped.
/// Call `build()` to validate and freeze into an immutable `Topology`.
#[derive(Debug)]
pub struct TopologyBuilder {
    role: PipeRole,
    nodes: Vec<TopologyNode>,
    pipes: Vec<Pipe>,
    by_key: HashMap<CoordKey, NodeId>,
    edges: HashSet<(NodeId, NodeId)>,
}

impl TopologyBuilder {
    /// Create a new empty builder; every pipe gets `role`.
    pub fn new(role: PipeRole) -> Self {
        Self {
            role,
            nodes: Vec::new(),
            pipes: Vec::new(),
            by_key: HashMap::new(),
            edges: HashSet::new(),
        }
    }

    /// Builder pre-filled from a segment list.
    pub fn from_segments(role: PipeRole, segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut builder = Self::new(role);
        for seg in segments {
            builder.add_pipe(seg.start, seg.end);
        }
        builder
    }

    /// Add (or look up) the node at `point`.
    pub fn add_node(&mut self, point: Point) -> NodeId {
        if let Some(&id) = self.by_key.get(&point.key()) {
            return id;
        }
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(TopologyNode { id, point });
        self.by_key.insert(point.key(), id);
        id
    }

    /// Add a pipe between two coordinates.
    ///
    /// Returns `None` if both ends collapse onto one node or the pipe already exists.
    pub fn add_pipe(&mut self, a: Point, b: Point) -> Option<PipeId> {
        let from = self.add_node(a);
        let to = self.add_node(b);
        if from == to {
            return None;
        }
        let key = if from < to { (from, to) } else { (to, from) };
        if !self.edges.insert(key) {
            return None;
        }
        let id = PipeId::from_usize(self.pipes.len());
        self.pipes.push(Pipe {
            id,
            from,
            to,
            length_m: self.nodes[from.idx()].point.distance(self.nodes[to.idx()].point),
            role: self.role,
        });
        Some(id)
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    /// Build and validate the topology.
    ///
    /// Nodes not touched by any pipe are dropped so the node set is exactly
    /// the pipe endpoints.
    pub fn build(self) -> GraphResult<Topology> {
        let (nodes, pipes) = Self::compact(self.nodes, self.pipes);

        validate::validate_structure(&nodes, &pipes)?;

        let (node_pipe_offsets, node_pipes) = Self::build_adjacency(&nodes, &pipes);

        validate::validate_adjacency(&nodes, &pipes, &node_pipe_offsets, &node_pipes)?;

        let by_key = nodes.iter().map(|n| (n.point.key(), n.id)).collect();

        Ok(Topology {
            role: self.role,
            nodes,
            pipes,
            node_pipe_offsets,
            node_pipes,
            by_key,
        })
    }

    /// Drop isolated nodes and renumber ids densely.
    fn compact(nodes: Vec<TopologyNode>, pipes: Vec<Pipe>) -> (Vec<TopologyNode>, Vec<Pipe>) {
        let mut used = vec![false; nodes.len()];
        for pipe in &pipes {
            used[pipe.from.idx()] = true;
            used[pipe.to.idx()] = true;
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; nodes.len()];
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            if used[node.id.idx()] {
                let id = NodeId::from_usize(kept.len());
                remap[node.id.idx()] = Some(id);
                kept.push(TopologyNode {
                    id,
                    point: node.point,
                });
            }
        }

        let pipes = pipes
            .into_iter()
            .filter_map(|p| {
                Some(Pipe {
                    from: remap[p.from.idx()]?,
                    to: remap[p.to.idx()]?,
                    ..p
                })
            })
            .collect();

        (kept, pipes)
    }

    /// Build compact adjacency lists: for each node, collect its incident pipes.
    fn build_adjacency(nodes: &[TopologyNode], pipes: &[Pipe]) -> (Vec<usize>, Vec<PipeId>) {
        let mut per_node: Vec<Vec<PipeId>> = vec![Vec::new(); nodes.len()];
        for pipe in pipes {
            per_node[pipe.from.idx()].push(pipe.id);
            per_node[pipe.to.idx()].push(pipe.id);
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}
