//! Street-constrained routing: A* with a wall-clock timeout.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use hn_graph::{Point, Segment, StreetGraph};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

/// How often (in expansions) the deadline is checked.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Outcome of one path search. Neither failure is fatal to network generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    Found(Vec<NodeIndex>),
    NoPath,
    TimedOut,
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    estimate: f64,
    node: NodeIndex,
}

impl Eq for State {}

// Flip the ordering so the BinaryHeap pops the lowest estimate first.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest street path from `start` to `goal` with a Euclidean heuristic.
///
/// The search is abandoned with `TimedOut` once `timeout` has elapsed.
pub fn astar_with_timeout(
    streets: &StreetGraph,
    start: NodeIndex,
    goal: NodeIndex,
    timeout: Duration,
) -> PathOutcome {
    if start == goal {
        return PathOutcome::Found(vec![start]);
    }

    let deadline = Instant::now() + timeout;
    let graph = streets.graph();
    let target = streets.position(goal);
    let heuristic = |n: NodeIndex| streets.position(n).distance(target);

    let mut best: HashMap<NodeIndex, f64> = HashMap::new();
    let mut came_from: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut closed: HashSet<NodeIndex> = HashSet::new();
    let mut heap = BinaryHeap::new();

    best.insert(start, 0.0);
    heap.push(State {
        estimate: heuristic(start),
        node: start,
    });

    let mut expanded = 0usize;
    while let Some(State { node: u, .. }) = heap.pop() {
        if expanded % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
            return PathOutcome::TimedOut;
        }
        expanded += 1;

        if u == goal {
            let mut path = vec![goal];
            let mut cur = goal;
            while let Some(&prev) = came_from.get(&cur) {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return PathOutcome::Found(path);
        }
        if !closed.insert(u) {
            continue;
        }

        let g_u = best.get(&u).copied().unwrap_or(f64::INFINITY);
        for edge in graph.edges(u) {
            let v = if edge.source() == u {
                edge.target()
            } else {
                edge.source()
            };
            if closed.contains(&v) {
                continue;
            }
            let g_v = g_u + *edge.weight();
            if g_v < best.get(&v).copied().unwrap_or(f64::INFINITY) {
                best.insert(v, g_v);
                came_from.insert(v, u);
                heap.push(State {
                    estimate: g_v + heuristic(v),
                    node: v,
                });
            }
        }
    }

    PathOutcome::NoPath
}

/// Counters from a batch of street searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingStats {
    pub searches: usize,
    pub found: usize,
    pub no_path: usize,
    pub timed_out: usize,
}

/// Route every producer endpoint to every consumer endpoint along the streets.
///
/// Each endpoint also gets a stub line to its nearest street node so the
/// endpoint itself is part of the routed lines. Without producers, all
/// consumer pairs are routed. Failed searches are counted and skipped.
pub fn route_on_streets(
    streets: &StreetGraph,
    producers: &[Point],
    consumers: &[Point],
    timeout: Duration,
) -> (Vec<Segment>, RoutingStats) {
    let mut segments = Vec::new();
    let mut stats = RoutingStats::default();

    let pairs: Vec<(Point, Point)> = if producers.is_empty() {
        consumers
            .iter()
            .enumerate()
            .flat_map(|(i, &a)| consumers[i + 1..].iter().map(move |&b| (a, b)))
            .collect()
    } else {
        producers
            .iter()
            .flat_map(|&p| consumers.iter().map(move |&c| (p, c)))
            .collect()
    };

    let mut searched: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
    for (from, to) in pairs {
        let (Some(start), Some(goal)) = (streets.nearest_node(from), streets.nearest_node(to))
        else {
            continue;
        };
        let key = if start < goal { (start, goal) } else { (goal, start) };
        if !searched.insert(key) {
            continue;
        }

        stats.searches += 1;
        match astar_with_timeout(streets, start, goal, timeout) {
            PathOutcome::Found(path) => {
                stats.found += 1;
                segments.extend(
                    path.windows(2)
                        .map(|w| Segment::new(streets.position(w[0]), streets.position(w[1]))),
                );
            }
            PathOutcome::NoPath => {
                stats.no_path += 1;
                debug!(?from, ?to, "no street path between endpoints");
            }
            PathOutcome::TimedOut => {
                stats.timed_out += 1;
                warn!(?from, ?to, timeout_s = timeout.as_secs_f64(), "A* search timed out");
            }
        }
    }

    for &endpoint in producers.iter().chain(consumers) {
        if let Some(n) = streets.nearest_node(endpoint) {
            let node = streets.position(n);
            if node.key() != endpoint.key() {
                segments.push(Segment::new(endpoint, node));
            }
        }
    }

    debug!(?stats, lines = segments.len(), "street routing finished");
    (segments, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_graph::StreetLayer;

    /// A ladder: two parallel streets joined at both ends, plus a detached street.
    fn streets() -> StreetGraph {
        let layer = StreetLayer::new(vec![
            vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(100.0, 0.0)],
            vec![Point::new(0.0, 40.0), Point::new(100.0, 40.0)],
            vec![Point::new(0.0, 0.0), Point::new(0.0, 40.0)],
            vec![Point::new(100.0, 0.0), Point::new(100.0, 40.0)],
            vec![Point::new(500.0, 500.0), Point::new(510.0, 500.0)],
        ])
        .unwrap();
        StreetGraph::from_layer(&layer)
    }

    fn node_at(g: &StreetGraph, x: f64, y: f64) -> NodeIndex {
        g.nearest_node(Point::new(x, y)).unwrap()
    }

    #[test]
    fn finds_shortest_street_path() {
        let g = streets();
        let out = astar_with_timeout(
            &g,
            node_at(&g, 0.0, 40.0),
            node_at(&g, 50.0, 0.0),
            Duration::from_secs(5),
        );
        let PathOutcome::Found(path) = out else {
            panic!("expected a path, got {out:?}");
        };
        let pts: Vec<Point> = path.iter().map(|&n| g.position(n)).collect();
        assert_eq!(
            pts,
            vec![Point::new(0.0, 40.0), Point::new(0.0, 0.0), Point::new(50.0, 0.0)]
        );
    }

    #[test]
    fn disconnected_streets_report_no_path() {
        let g = streets();
        let out = astar_with_timeout(
            &g,
            node_at(&g, 0.0, 0.0),
            node_at(&g, 505.0, 500.0),
            Duration::from_secs(5),
        );
        assert_eq!(out, PathOutcome::NoPath);
    }

    #[test]
    fn zero_timeout_gives_up() {
        let g = streets();
        let out = astar_with_timeout(
            &g,
            node_at(&g, 0.0, 0.0),
            node_at(&g, 100.0, 40.0),
            Duration::ZERO,
        );
        assert_eq!(out, PathOutcome::TimedOut);
    }

    #[test]
    fn routing_counts_failures_and_adds_stubs() {
        let g = streets();
        let (segments, stats) = route_on_streets(
            &g,
            &[Point::new(10.0, 0.0)],
            &[Point::new(100.0, 20.0), Point::new(503.0, 500.0)],
            Duration::from_secs(5),
        );
        assert_eq!(stats.searches, 2);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.no_path, 1);
        // Stubs from each endpoint to its nearest street node.
        assert!(segments.contains(&Segment::new(Point::new(10.0, 0.0), Point::new(0.0, 0.0))));
        assert!(
            segments.contains(&Segment::new(Point::new(503.0, 500.0), Point::new(500.0, 500.0)))
        );
    }
}
