//! Euclidean minimum spanning tree over a point set.

use std::collections::HashSet;

use hn_graph::{Point, Segment};
use petgraph::unionfind::UnionFind;

/// Drop duplicate coordinates, keeping first occurrences in order.
pub fn unique_points(points: impl IntoIterator<Item = Point>) -> Vec<Point> {
    let mut seen = HashSet::new();
    points.into_iter().filter(|p| seen.insert(p.key())).collect()
}

/// Kruskal over the complete graph of `points`.
///
/// Candidate edges are enumerated `(i, j)` with `i < j` and sorted stably by
/// length, so equal lengths resolve by insertion order. Returns index pairs.
pub fn minimum_spanning_tree(points: &[Point]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut edges = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push((points[i].distance(points[j]), i, j));
        }
    }
    edges.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut uf = UnionFind::<usize>::new(n);
    let mut tree = Vec::with_capacity(n - 1);
    for (_, i, j) in edges {
        if uf.union(i, j) {
            tree.push((i, j));
            if tree.len() == n - 1 {
                break;
            }
        }
    }
    tree
}

/// MST edges as line segments.
pub fn mst_segments(points: &[Point]) -> Vec<Segment> {
    minimum_spanning_tree(points)
        .into_iter()
        .map(|(i, j)| Segment::new(points[i], points[j]))
        .collect()
}
