//! Disjoint-component reconciliation after routing.

use std::collections::HashSet;

use hn_graph::{Point, Segment};
use tracing::{debug, info, warn};

use crate::work::WorkNet;

/// What `connect_components` changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Components without any relevant endpoint, removed.
    pub dropped_components: usize,
    /// Bridge lines added to join relevant components to the anchor.
    pub bridges: Vec<Segment>,
    /// Components that could not be bridged.
    pub warnings: Vec<String>,
}

/// Reduce a line set to one connected component spanning all `relevant` points.
///
/// Components that contain no relevant point are dropped. The largest relevant
/// component is the anchor; every other relevant component is joined to it by
/// one line between their closest pair of nodes. Relevant points not touched by
/// any line are treated as single-node components.
pub fn connect_components(
    segments: &[Segment],
    relevant: &[Point],
) -> (Vec<Segment>, ReconcileReport) {
    let mut net = WorkNet::from_segments(segments);
    for &p in relevant {
        net.node(p);
    }
    let relevant_keys: HashSet<_> = relevant.iter().map(|p| p.key()).collect();
    let mut report = ReconcileReport::default();

    let components = net.components();
    if components.len() <= 1 {
        return (net.segments(), report);
    }

    let mut keep = Vec::new();
    for component in components {
        let is_relevant = component
            .iter()
            .any(|&n| relevant_keys.contains(&net.point(n).key()));
        if is_relevant {
            keep.push(component);
        } else {
            report.dropped_components += 1;
            for n in component {
                net.remove_node(n);
            }
        }
    }
    if report.dropped_components > 0 {
        debug!(
            dropped = report.dropped_components,
            "dropped components without endpoints"
        );
    }

    // Largest first; ties keep the earlier component.
    let Some(anchor_pos) = keep
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
        .map(|(i, _)| i)
    else {
        return (net.segments(), report);
    };
    let anchor = keep.swap_remove(anchor_pos);

    for component in &keep {
        let mut best: Option<(f64, Point, Point)> = None;
        for &a in component {
            let pa = net.point(a);
            for &b in &anchor {
                let pb = net.point(b);
                let d = pa.distance(pb);
                if d.is_finite() && best.is_none_or(|(bd, _, _)| d < bd) {
                    best = Some((d, pa, pb));
                }
            }
        }
        match best {
            Some((_, from, to)) => {
                let bridge = Segment::new(from, to);
                net.add_segment(bridge);
                report.bridges.push(bridge);
            }
            None => {
                let msg = format!(
                    "component of {} nodes could not be bridged to the network",
                    component.len()
                );
                warn!("{msg}");
                report.warnings.push(msg);
            }
        }
    }

    info!(
        bridges = report.bridges.len(),
        dropped = report.dropped_components,
        "reconciled disconnected components"
    );
    (net.segments(), report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by))
    }

    fn is_connected(segments: &[Segment]) -> bool {
        WorkNet::from_segments(segments).components().len() <= 1
    }

    #[test]
    fn already_connected_is_unchanged() {
        let lines = vec![seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0)];
        let (out, report) = connect_components(&lines, &[Point::new(0.0, 0.0)]);
        assert_eq!(out, lines);
        assert!(report.bridges.is_empty());
    }

    #[test]
    fn irrelevant_component_is_dropped() {
        let lines = vec![seg(0.0, 0.0, 10.0, 0.0), seg(50.0, 50.0, 60.0, 50.0)];
        let (out, report) = connect_components(&lines, &[Point::new(0.0, 0.0)]);
        assert_eq!(out, vec![seg(0.0, 0.0, 10.0, 0.0)]);
        assert_eq!(report.dropped_components, 1);
    }

    #[test]
    fn relevant_component_bridged_at_closest_pair() {
        let lines = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 20.0, 0.0),
            seg(25.0, 5.0, 40.0, 5.0),
        ];
        let relevant = [Point::new(0.0, 0.0), Point::new(40.0, 5.0)];
        let (out, report) = connect_components(&lines, &relevant);
        assert_eq!(report.bridges, vec![seg(25.0, 5.0, 20.0, 0.0)]);
        assert!(is_connected(&out));
    }

    #[test]
    fn isolated_relevant_point_gets_bridged() {
        let lines = vec![seg(0.0, 0.0, 10.0, 0.0)];
        let relevant = [Point::new(0.0, 0.0), Point::new(12.0, 3.0)];
        let (out, report) = connect_components(&lines, &relevant);
        assert_eq!(report.bridges.len(), 1);
        assert!(out.contains(&seg(12.0, 3.0, 10.0, 0.0)));
    }
}
