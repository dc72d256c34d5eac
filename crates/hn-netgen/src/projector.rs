//! Endpoint projection: attach every point to its nearest street.

use hn_graph::{Point, Segment, StreetLayer};
use tracing::{debug, warn};

/// A point attached to the street layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Index of the point in the caller's input slice.
    pub index: usize,
    pub source: Point,
    /// Perpendicular foot on the nearest street segment (the street endpoint).
    pub foot: Point,
}

impl Projection {
    /// The connector line point → foot.
    pub fn connector(&self) -> Segment {
        Segment::new(self.source, self.foot)
    }
}

/// Result of projecting a point set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionSet {
    pub projections: Vec<Projection>,
    /// Input indices that could not be attached (empty street layer, bad geometry).
    pub unconnectable: Vec<usize>,
}

impl ProjectionSet {
    pub fn feet(&self) -> impl Iterator<Item = Point> + '_ {
        self.projections.iter().map(|p| p.foot)
    }

    pub fn get(&self, index: usize) -> Option<&Projection> {
        self.projections.iter().find(|p| p.index == index)
    }

    /// Points every `interval_m` along each connector no longer than
    /// `max_distance_m`, excluding both ends.
    pub fn connector_waypoints(&self, max_distance_m: f64, interval_m: f64) -> Vec<Point> {
        let mut out = Vec::new();
        for proj in &self.projections {
            let length = proj.source.distance(proj.foot);
            if length > max_distance_m || length < interval_m {
                continue;
            }
            let count = (length / interval_m) as usize;
            for i in 1..count {
                let t = i as f64 * interval_m / length;
                out.push(Point::new(
                    proj.source.x + t * (proj.foot.x - proj.source.x),
                    proj.source.y + t * (proj.foot.y - proj.source.y),
                ));
            }
        }
        out
    }
}

/// Project every point onto its nearest street segment.
///
/// Points that cannot be projected are reported in `unconnectable` and left
/// out of routing; this never fails as a whole.
pub fn project_points(points: &[Point], streets: &StreetLayer) -> ProjectionSet {
    let mut set = ProjectionSet::default();

    for (index, &source) in points.iter().enumerate() {
        if !source.is_finite() {
            warn!(index, x = source.x, y = source.y, "non-finite point geometry, excluded");
            set.unconnectable.push(index);
            continue;
        }
        match streets.project(source) {
            Some(foot) => set.projections.push(Projection {
                index,
                source,
                foot,
            }),
            None => {
                warn!(index, "no street segment to project onto, point excluded");
                set.unconnectable.push(index);
            }
        }
    }

    debug!(
        projected = set.projections.len(),
        unconnectable = set.unconnectable.len(),
        "projected connection points"
    );
    set
}
