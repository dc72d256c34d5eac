//! Mutable line network used while routing and simplifying.

use std::collections::HashMap;

use hn_graph::{CoordKey, Point, Segment};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::NodeIndexable;

/// Line network keyed by coordinate; nodes and edges may be removed.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkNet {
    graph: StableUnGraph<Point, ()>,
    by_key: HashMap<CoordKey, NodeIndex>,
}

impl WorkNet {
    pub(crate) fn from_segments<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> Self {
        let mut net = Self::default();
        for seg in segments {
            net.add_segment(*seg);
        }
        net
    }

    /// Node at `p`, created if missing.
    pub(crate) fn node(&mut self, p: Point) -> NodeIndex {
        if let Some(&n) = self.by_key.get(&p.key()) {
            return n;
        }
        let n = self.graph.add_node(p);
        self.by_key.insert(p.key(), n);
        n
    }

    pub(crate) fn find(&self, p: Point) -> Option<NodeIndex> {
        self.by_key.get(&p.key()).copied()
    }

    /// Add a line; zero-length and duplicate lines are ignored.
    pub(crate) fn add_segment(&mut self, seg: Segment) -> bool {
        let a = self.node(seg.start);
        let b = self.node(seg.end);
        self.connect(a, b)
    }

    pub(crate) fn connect(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub(crate) fn disconnect(&mut self, a: NodeIndex, b: NodeIndex) {
        if let Some(e) = self.graph.find_edge(a, b) {
            self.graph.remove_edge(e);
        }
    }

    pub(crate) fn has_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    pub(crate) fn remove_node(&mut self, n: NodeIndex) {
        if let Some(p) = self.graph.remove_node(n) {
            self.by_key.remove(&p.key());
        }
    }

    pub(crate) fn contains(&self, n: NodeIndex) -> bool {
        self.graph.contains_node(n)
    }

    pub(crate) fn point(&self, n: NodeIndex) -> Point {
        self.graph[n]
    }

    pub(crate) fn degree(&self, n: NodeIndex) -> usize {
        self.graph.edges(n).count()
    }

    pub(crate) fn neighbors(&self, n: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors(n).collect()
    }

    pub(crate) fn nodes(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    pub(crate) fn points(&self) -> Vec<Point> {
        self.graph.node_indices().map(|n| self.graph[n]).collect()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Current lines, in edge insertion order.
    pub(crate) fn segments(&self) -> Vec<Segment> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| Segment::new(self.graph[a], self.graph[b]))
            .collect()
    }

    /// Connected components, ordered by first node.
    pub(crate) fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut uf = UnionFind::<usize>::new(self.graph.node_bound());
        for e in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(e) {
                uf.union(a.index(), b.index());
            }
        }
        let mut groups: Vec<Vec<NodeIndex>> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for n in self.graph.node_indices() {
            let root = uf.find(n.index());
            let g = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(n);
        }
        groups
    }
}
