//! Network simplification: collinear merge, dangling pruning, street re-snapping.

use std::collections::HashSet;

use hn_graph::geometry::deflection;
use hn_graph::{CoordKey, Point, Segment, StreetLayer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{NetgenError, NetgenResult};
use crate::mst::mst_segments;
use crate::work::WorkNet;

/// Tunables for the simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    /// Maximum heading change (degrees) at a node for its two lines to merge.
    pub collinear_tolerance_deg: f64,
    /// Enable street re-snapping.
    pub resnap: bool,
    /// Lines whose midpoint is farther than this from a street are split (m).
    pub resnap_threshold_m: f64,
    pub max_resnap_iterations: usize,
    /// Nodes closer than this are merged after re-snapping (m).
    pub dedup_radius_m: f64,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            collinear_tolerance_deg: 10.0,
            resnap: false,
            resnap_threshold_m: 5.0,
            max_resnap_iterations: 1000,
            dedup_radius_m: 10.0,
        }
    }
}

impl SimplifyOptions {
    pub fn validate(&self) -> NetgenResult<()> {
        let checks = [
            ("collinear_tolerance_deg", self.collinear_tolerance_deg),
            ("resnap_threshold_m", self.resnap_threshold_m),
            ("dedup_radius_m", self.dedup_radius_m),
        ];
        for (what, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(NetgenError::InvalidOption { what, value });
            }
        }
        Ok(())
    }
}

/// What the simplifier did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    pub merged_nodes: usize,
    pub pruned_nodes: usize,
    pub splits: usize,
    pub resnap_iterations: usize,
    /// The split loop stopped at the iteration cap.
    pub resnap_capped: bool,
    /// Nodes merged away by deduplication before the MST rebuild.
    pub deduplicated: usize,
}

/// Simplify a line network while keeping every `protected` point attached.
///
/// Passes run in order: collinear merge and dangling pruning (together, to a
/// fixed point), then street re-snapping when enabled. If re-snapping split
/// anything, nodes are deduplicated, the network is rebuilt as an MST over the
/// remaining points, split once more and cleaned by the first two passes
/// again. Simplifying the output a second time changes nothing.
pub fn simplify(
    segments: &[Segment],
    protected: &[Point],
    streets: &StreetLayer,
    options: &SimplifyOptions,
) -> (Vec<Segment>, SimplifyReport) {
    let protected_keys: HashSet<CoordKey> = protected.iter().map(|p| p.key()).collect();
    let tolerance = options.collinear_tolerance_deg.to_radians();
    let guard = (options.resnap && !streets.is_empty()).then_some((streets, options.resnap_threshold_m));
    let mut report = SimplifyReport::default();

    let mut net = WorkNet::from_segments(segments);
    clean(&mut net, &protected_keys, tolerance, guard, &mut report);

    if let Some((streets, threshold)) = guard {
        split_until_on_street(&mut net, streets, threshold, options.max_resnap_iterations, &mut report);

        if report.splits > 0 {
            let mut points = net.points();
            points.extend_from_slice(protected);
            let unique = dedup_points(&points, &protected_keys, options.dedup_radius_m);
            report.deduplicated = points.len().saturating_sub(unique.len());

            net = WorkNet::from_segments(&mst_segments(&unique));
            split_until_on_street(
                &mut net,
                streets,
                threshold,
                options.max_resnap_iterations,
                &mut report,
            );
            clean(&mut net, &protected_keys, tolerance, guard, &mut report);
        }
    }

    debug!(?report, lines = net.edge_count(), "simplified network");
    (net.segments(), report)
}

/// Collinear merge and dangling pruning, repeated until neither changes anything.
fn clean(
    net: &mut WorkNet,
    protected: &HashSet<CoordKey>,
    tolerance_rad: f64,
    guard: Option<(&StreetLayer, f64)>,
    report: &mut SimplifyReport,
) {
    loop {
        let merged = merge_collinear(net, protected, tolerance_rad, guard);
        let pruned = prune_dangling(net, protected);
        report.merged_nodes += merged;
        report.pruned_nodes += pruned;
        if merged == 0 && pruned == 0 {
            break;
        }
    }
}

/// Replace a → b → c by a → c wherever b is an unprotected degree-2 node
/// and the heading change at b is below the tolerance.
///
/// With a street guard, a merge is refused if the merged line's midpoint
/// would lie farther than the threshold from the streets.
fn merge_collinear(
    net: &mut WorkNet,
    protected: &HashSet<CoordKey>,
    tolerance_rad: f64,
    guard: Option<(&StreetLayer, f64)>,
) -> usize {
    let mut merged = 0;
    loop {
        let mut changed = 0;
        for b in net.nodes() {
            if !net.contains(b) {
                continue;
            }
            let pb = net.point(b);
            if protected.contains(&pb.key()) {
                continue;
            }
            let neighbors = net.neighbors(b);
            let [a, c] = neighbors[..] else {
                continue;
            };
            if net.has_edge(a, c) {
                continue;
            }
            let (pa, pc) = (net.point(a), net.point(c));
            if deflection(pa, pb, pc) >= tolerance_rad {
                continue;
            }
            if let Some((streets, threshold)) = guard {
                let far = streets
                    .nearest_segment(pa.midpoint(pc))
                    .is_some_and(|(_, d)| d > threshold);
                if far {
                    continue;
                }
            }
            net.remove_node(b);
            net.connect(a, c);
            changed += 1;
        }
        if changed == 0 {
            break;
        }
        merged += changed;
    }
    merged
}

/// Iteratively remove unprotected nodes of degree ≤ 1.
fn prune_dangling(net: &mut WorkNet, protected: &HashSet<CoordKey>) -> usize {
    let mut pruned = 0;
    loop {
        let leaves: Vec<_> = net
            .nodes()
            .into_iter()
            .filter(|&n| net.degree(n) <= 1 && !protected.contains(&net.point(n).key()))
            .collect();
        if leaves.is_empty() {
            break;
        }
        pruned += leaves.len();
        for n in leaves {
            net.remove_node(n);
        }
    }
    pruned
}

/// Split every line whose midpoint is off-street at the midpoint's street foot.
fn split_until_on_street(
    net: &mut WorkNet,
    streets: &StreetLayer,
    threshold: f64,
    max_iterations: usize,
    report: &mut SimplifyReport,
) {
    let mut iteration = 0;
    loop {
        let mut changed = false;
        for seg in net.segments() {
            let mid = seg.midpoint();
            let Some((street, distance)) = streets.nearest_segment(mid) else {
                continue;
            };
            if distance <= threshold {
                continue;
            }
            let foot = street.closest_point(mid);
            if foot.key() == seg.start.key() || foot.key() == seg.end.key() {
                continue;
            }
            let (Some(a), Some(b)) = (net.find(seg.start), net.find(seg.end)) else {
                continue;
            };
            net.disconnect(a, b);
            let f = net.node(foot);
            net.connect(a, f);
            net.connect(f, b);
            report.splits += 1;
            changed = true;
        }

        iteration += 1;
        report.resnap_iterations += 1;
        if !changed {
            break;
        }
        if iteration >= max_iterations {
            report.resnap_capped = true;
            warn!(iterations = iteration, "street re-snapping hit the iteration cap");
            break;
        }
    }
    if report.splits > 0 {
        info!(splits = report.splits, "re-snapped lines onto streets");
    }
}

/// Merge points closer than `radius` into one representative.
///
/// A cluster containing a protected point collapses onto it (other protected
/// points in reach stay separate); otherwise onto the cluster centroid.
fn dedup_points(points: &[Point], protected: &HashSet<CoordKey>, radius: f64) -> Vec<Point> {
    let mut assigned = vec![false; points.len()];
    let mut reps = Vec::new();

    for i in 0..points.len() {
        if assigned[i] {
            continue;
        }
        let cluster: Vec<usize> = (i..points.len())
            .filter(|&j| !assigned[j] && points[i].distance(points[j]) < radius)
            .collect();
        let anchor = cluster
            .iter()
            .copied()
            .find(|&j| protected.contains(&points[j].key()));

        match anchor {
            Some(anchor) => {
                reps.push(points[anchor]);
                for &j in &cluster {
                    if j == anchor || !protected.contains(&points[j].key()) {
                        assigned[j] = true;
                    }
                }
            }
            None => {
                let members: Vec<Point> = cluster.iter().map(|&j| points[j]).collect();
                reps.extend(Point::centroid(&members));
                for &j in &cluster {
                    assigned[j] = true;
                }
            }
        }
    }

    crate::mst::unique_points(reps)
}
