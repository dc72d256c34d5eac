//! Pipe network topology.

use std::collections::HashMap;

use hn_core::{NodeId, PipeId};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::geometry::{CoordKey, Point, Segment};

/// Role tag carried by every pipe of a network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeRole {
    /// Forward line: producer → consumers.
    Supply,
    /// Return line: consumers → producer.
    Return,
    /// Short pipe from a building or producer to its street endpoint.
    Connector,
}

impl PipeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PipeRole::Supply => "supply",
            PipeRole::Return => "return",
            PipeRole::Connector => "connector",
        }
    }
}

/// A network node: a unique coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyNode {
    pub id: NodeId,
    pub point: Point,
}

/// A straight pipe between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub id: PipeId,
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
    pub role: PipeRole,
}

impl Pipe {
    /// The node at the other end of this pipe, if `node` is one of its ends.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }
}

/// The full set of pipes of one network (forward or return).
///
/// Validated and immutable; built with [`crate::TopologyBuilder`].
/// Adjacency is stored compactly: node i's pipes are
/// `node_pipes[node_pipe_offsets[i]..node_pipe_offsets[i+1]]`.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) role: PipeRole,
    pub(crate) nodes: Vec<TopologyNode>,
    pub(crate) pipes: Vec<Pipe>,
    pub(crate) node_pipe_offsets: Vec<usize>,
    pub(crate) node_pipes: Vec<PipeId>,
    pub(crate) by_key: HashMap<CoordKey, NodeId>,
}

impl Topology {
    /// An empty network of the given role.
    pub fn empty(role: PipeRole) -> Self {
        Self {
            role,
            nodes: Vec::new(),
            pipes: Vec::new(),
            node_pipe_offsets: vec![0],
            node_pipes: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn role(&self) -> PipeRole {
        self.role
    }

    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TopologyNode> {
        self.nodes.get(id.idx())
    }

    pub fn pipe(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.get(id.idx())
    }

    pub fn point(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(|n| n.point)
    }

    /// Node sitting exactly on `p` (same coordinate key).
    pub fn find_node(&self, p: Point) -> Option<NodeId> {
        self.by_key.get(&p.key()).copied()
    }

    /// Pipes incident to a node.
    pub fn node_pipes(&self, node: NodeId) -> &[PipeId] {
        let idx = node.idx();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_pipe_offsets[idx];
        let end = self.node_pipe_offsets[idx + 1];
        &self.node_pipes[start..end]
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.node_pipes(node).len()
    }

    /// Neighbouring nodes reachable through one pipe.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_pipes(node)
            .iter()
            .filter_map(move |&p| self.pipes[p.idx()].other_end(node))
    }

    /// Pipe geometry as a segment from its `from` node to its `to` node.
    pub fn segment(&self, pipe: &Pipe) -> Segment {
        Segment::new(
            self.nodes[pipe.from.idx()].point,
            self.nodes[pipe.to.idx()].point,
        )
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.pipes.iter().map(|p| self.segment(p)).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.pipes.iter().map(|p| p.length_m).sum()
    }

    /// Connected components as node lists, ordered by their smallest node id.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let mut uf = UnionFind::<usize>::new(self.nodes.len());
        for pipe in &self.pipes {
            uf.union(pipe.from.idx(), pipe.to.idx());
        }
        let mut groups: Vec<Vec<NodeId>> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for node in &self.nodes {
            let root = uf.find(node.id.idx());
            let g = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(node.id);
        }
        groups
    }

    /// True when every node is reachable from every other (vacuously for empty).
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    /// True when the network contains no cycle (a forest).
    pub fn is_acyclic(&self) -> bool {
        self.pipes.len() + self.components().len() == self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TopologyBuilder;

    fn square(closed: bool) -> Topology {
        let mut b = TopologyBuilder::new(PipeRole::Supply);
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        for w in pts.windows(2) {
            b.add_pipe(w[0], w[1]);
        }
        if closed {
            b.add_pipe(pts[3], pts[0]);
        }
        b.build().unwrap()
    }

    #[test]
    fn open_square_is_tree() {
        let t = square(false);
        assert!(t.is_connected());
        assert!(t.is_acyclic());
        assert_eq!(t.total_length(), 3.0);
    }

    #[test]
    fn closed_square_has_cycle() {
        let t = square(true);
        assert!(t.is_connected());
        assert!(!t.is_acyclic());
    }

    #[test]
    fn degree_and_neighbors() {
        let t = square(false);
        let corner = t.find_node(Point::new(1.0, 0.0)).unwrap();
        assert_eq!(t.degree(corner), 2);
        let mut neigh: Vec<Point> = t.neighbors(corner).map(|n| t.nodes()[n.idx()].point).collect();
        neigh.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(neigh, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn disjoint_pipes_form_two_components() {
        let mut b = TopologyBuilder::new(PipeRole::Return);
        b.add_pipe(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        b.add_pipe(Point::new(5.0, 0.0), Point::new(6.0, 0.0));
        let t = b.build().unwrap();
        assert_eq!(t.components().len(), 2);
        assert!(!t.is_connected());
        assert_eq!(t.role(), PipeRole::Return);
    }

    #[test]
    fn empty_topology_is_trivially_connected() {
        let t = Topology::empty(PipeRole::Supply);
        assert!(t.is_connected());
        assert!(t.is_acyclic());
        assert!(t.is_empty());
    }
}
