//! Street layer and the weighted street graph used for routing.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::error::{GraphError, GraphResult};
use crate::geometry::{CoordKey, Point, Segment};

/// R*-tree entry: a street node position tagged with its graph index.
type IndexedNode = GeomWithData<[f64; 2], NodeIndex>;

/// The imported street centerlines, one polyline per feature.
///
/// Read-only after construction. Construction is the only place where
/// malformed street geometry is rejected.
#[derive(Debug, Clone, Default)]
pub struct StreetLayer {
    lines: Vec<Vec<Point>>,
}

impl StreetLayer {
    /// Validate and wrap street polylines.
    pub fn new(lines: Vec<Vec<Point>>) -> GraphResult<Self> {
        for (i, line) in lines.iter().enumerate() {
            if line.len() < 2 {
                return Err(GraphError::DegenerateLine {
                    line: i,
                    vertices: line.len(),
                });
            }
            if let Some(bad) = line.iter().find(|p| !p.is_finite()) {
                return Err(GraphError::NonFiniteCoordinate {
                    what: "street line",
                    x: bad.x,
                    y: bad.y,
                });
            }
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Vec<Point>] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All street segments in input order (line by line, vertex by vertex).
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.lines
            .iter()
            .flat_map(|line| line.windows(2).map(|w| Segment::new(w[0], w[1])))
    }

    /// Nearest street segment to `p` and the distance to it.
    ///
    /// Ties resolve to the first segment achieving the strict minimum.
    /// Returns `None` for an empty layer.
    pub fn nearest_segment(&self, p: Point) -> Option<(Segment, f64)> {
        let mut best: Option<(Segment, f64)> = None;
        for seg in self.segments() {
            let d = seg.distance_to(p);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((seg, d)),
            }
        }
        best
    }

    /// Perpendicular foot of `p` on the nearest street segment.
    pub fn project(&self, p: Point) -> Option<Point> {
        self.nearest_segment(p).map(|(seg, _)| seg.closest_point(p))
    }
}

/// Street graph: street vertices as nodes, segments as edges weighted by length.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    graph: UnGraph<Point, f64>,
    index: RTree<IndexedNode>,
}

impl StreetGraph {
    /// Build the graph once from the street layer.
    ///
    /// Vertices shared between polylines become one node.
    pub fn from_layer(layer: &StreetLayer) -> Self {
        let mut graph: UnGraph<Point, f64> = UnGraph::new_undirected();
        let mut by_key: HashMap<CoordKey, NodeIndex> = HashMap::new();

        for seg in layer.segments() {
            let a = *by_key
                .entry(seg.start.key())
                .or_insert_with(|| graph.add_node(seg.start));
            let b = *by_key
                .entry(seg.end.key())
                .or_insert_with(|| graph.add_node(seg.end));
            if a == b || graph.find_edge(a, b).is_some() {
                continue;
            }
            graph.add_edge(a, b, seg.length());
        }

        let entries: Vec<IndexedNode> = graph
            .node_indices()
            .map(|ix| GeomWithData::new(graph[ix].into(), ix))
            .collect();
        let index = RTree::bulk_load(entries);

        Self { graph, index }
    }

    pub fn graph(&self) -> &UnGraph<Point, f64> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn position(&self, node: NodeIndex) -> Point {
        self.graph[node]
    }

    /// Nearest street node to `p` (O(log n) via the spatial index).
    pub fn nearest_node(&self, p: Point) -> Option<NodeIndex> {
        self.index.nearest_neighbor(&[p.x, p.y]).map(|entry| entry.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_layer() -> StreetLayer {
        StreetLayer::new(vec![
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)],
            vec![Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
        ])
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_and_non_finite_lines() {
        assert!(matches!(
            StreetLayer::new(vec![vec![Point::new(0.0, 0.0)]]),
            Err(GraphError::DegenerateLine { line: 0, vertices: 1 })
        ));
        assert!(matches!(
            StreetLayer::new(vec![vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)]]),
            Err(GraphError::NonFiniteCoordinate { .. })
        ));
    }

    #[test]
    fn nearest_segment_prefers_first_on_tie() {
        // Point equidistant from two parallel streets.
        let layer = StreetLayer::new(vec![
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            vec![Point::new(0.0, 10.0), Point::new(10.0, 10.0)],
        ])
        .unwrap();
        let (seg, d) = layer.nearest_segment(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(seg.start, Point::new(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_layer_projects_nothing() {
        let layer = StreetLayer::default();
        assert!(layer.project(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn graph_shares_junction_nodes() {
        let g = StreetGraph::from_layer(&grid_layer());
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn nearest_node_uses_spatial_index() {
        let g = StreetGraph::from_layer(&grid_layer());
        let n = g.nearest_node(Point::new(11.0, 9.0)).unwrap();
        assert_eq!(g.position(n), Point::new(10.0, 10.0));
    }
}
