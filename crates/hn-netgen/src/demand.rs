//! Shortest-path trees over a generated network and heat-demand attribution.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hn_core::{NodeId, PipeId};
use hn_graph::{Point, Topology};
use tracing::debug;

#[derive(Copy, Clone, PartialEq)]
struct State {
    distance: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra tree rooted at one or more source nodes, weighted by pipe length.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    distance: Vec<f64>,
    via: Vec<Option<PipeId>>,
}

impl ShortestPathTree {
    pub fn new(topology: &Topology, sources: &[NodeId]) -> Self {
        let n = topology.nodes().len();
        let mut distance = vec![f64::INFINITY; n];
        let mut via = vec![None; n];
        let mut heap = BinaryHeap::new();

        for &s in sources {
            if s.idx() < n {
                distance[s.idx()] = 0.0;
                heap.push(State {
                    distance: 0.0,
                    node: s,
                });
            }
        }

        while let Some(State { distance: d, node }) = heap.pop() {
            if d > distance[node.idx()] {
                continue;
            }
            for &pipe_id in topology.node_pipes(node) {
                let pipe = &topology.pipes()[pipe_id.idx()];
                let Some(next) = pipe.other_end(node) else {
                    continue;
                };
                let candidate = d + pipe.length_m;
                if candidate < distance[next.idx()] {
                    distance[next.idx()] = candidate;
                    via[next.idx()] = Some(pipe_id);
                    heap.push(State {
                        distance: candidate,
                        node: next,
                    });
                }
            }
        }

        Self { distance, via }
    }

    /// Path length from the nearest source, `None` if unreachable.
    pub fn distance(&self, node: NodeId) -> Option<f64> {
        self.distance
            .get(node.idx())
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Pipes from the source to `node`, source side first.
    pub fn path_to(&self, topology: &Topology, node: NodeId) -> Option<Vec<PipeId>> {
        self.distance(node)?;
        let mut pipes = Vec::new();
        let mut cur = node;
        while let Some(pipe_id) = self.via[cur.idx()] {
            pipes.push(pipe_id);
            cur = topology.pipes()[pipe_id.idx()].other_end(cur)?;
        }
        pipes.reverse();
        Some(pipes)
    }
}

/// Heat demand carried by every pipe: the summed peak demand of all consumers
/// downstream of the sources along the shortest-path tree.
///
/// Consumers not on the network (or unreachable) contribute nothing.
pub fn attribute_demand(topology: &Topology, sources: &[Point], sinks: &[(Point, f64)]) -> Vec<f64> {
    let mut demand = vec![0.0; topology.pipes().len()];
    let roots: Vec<NodeId> = sources.iter().filter_map(|&p| topology.find_node(p)).collect();
    if roots.is_empty() {
        debug!("no source on the network, demand left unattributed");
        return demand;
    }

    let tree = ShortestPathTree::new(topology, &roots);
    for &(point, watts) in sinks {
        let path = topology
            .find_node(point)
            .and_then(|node| tree.path_to(topology, node));
        match path {
            Some(pipes) => {
                for pipe in pipes {
                    demand[pipe.idx()] += watts;
                }
            }
            None => debug!(?point, "consumer not reachable, demand not attributed"),
        }
    }
    demand
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_graph::{PipeRole, TopologyBuilder};

    /// Producer at the left end, consumers at (20,0) and (10,10).
    fn tee() -> Topology {
        let mut b = TopologyBuilder::new(PipeRole::Supply);
        b.add_pipe(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        b.add_pipe(Point::new(10.0, 0.0), Point::new(20.0, 0.0));
        b.add_pipe(Point::new(10.0, 0.0), Point::new(10.0, 10.0));
        b.build().unwrap()
    }

    #[test]
    fn paths_start_at_the_source() {
        let t = tee();
        let source = t.find_node(Point::new(0.0, 0.0)).unwrap();
        let tree = ShortestPathTree::new(&t, &[source]);
        let far = t.find_node(Point::new(20.0, 0.0)).unwrap();
        assert_eq!(tree.distance(far), Some(20.0));
        let path = tree.path_to(&t, far).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(t.pipes()[path[0].idx()].length_m, 10.0);
        assert!(tree.path_to(&t, source).unwrap().is_empty());
    }

    #[test]
    fn trunk_carries_all_downstream_demand() {
        let t = tee();
        let demand = attribute_demand(
            &t,
            &[Point::new(0.0, 0.0)],
            &[(Point::new(20.0, 0.0), 5_000.0), (Point::new(10.0, 10.0), 3_000.0)],
        );
        assert_eq!(demand, vec![8_000.0, 5_000.0, 3_000.0]);
    }

    #[test]
    fn missing_source_attributes_nothing() {
        let t = tee();
        let demand = attribute_demand(&t, &[Point::new(99.0, 99.0)], &[(Point::new(20.0, 0.0), 1.0)]);
        assert!(demand.iter().all(|&d| d == 0.0));
    }
}
