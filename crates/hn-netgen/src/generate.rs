//! End-to-end network generation and layer assembly.

use std::time::Duration;

use hn_graph::{
    PipeRole, Point, Segment, StreetGraph, StreetLayer, Topology, TopologyBuilder, offset_point,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::astar::{RoutingStats, route_on_streets};
use crate::components::{ReconcileReport, connect_components};
use crate::demand::attribute_demand;
use crate::error::{NetgenError, NetgenResult};
use crate::mst::{mst_segments, unique_points};
use crate::points::ConnectionPoint;
use crate::projector::{Projection, ProjectionSet, project_points};
use crate::simplify::{SimplifyOptions, SimplifyReport, simplify};

/// Routing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Euclidean MST over the street endpoints.
    #[default]
    Mst,
    /// MST over the street endpoints plus waypoints along each connector.
    PreMst,
    /// MST, then re-snapped onto the streets and rebuilt.
    AdvancedMst,
    /// A* along the street graph, stitched and simplified.
    AStar,
}

/// Translation applied to every point before routing the return side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnOffset {
    pub distance_m: f64,
    pub angle_deg: f64,
}

impl Default for ReturnOffset {
    fn default() -> Self {
        Self {
            distance_m: 1.0,
            angle_deg: 0.0,
        }
    }
}

impl ReturnOffset {
    pub fn apply(&self, p: Point) -> Point {
        offset_point(p, self.distance_m, self.angle_deg)
    }
}

/// Connector waypoints fed to the MST by [`Algorithm::PreMst`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreMstOptions {
    /// Connectors longer than this get no waypoints (m).
    pub max_distance_m: f64,
    pub point_interval_m: f64,
}

impl Default for PreMstOptions {
    fn default() -> Self {
        Self {
            max_distance_m: 200.0,
            point_interval_m: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub algorithm: Algorithm,
    pub return_offset: ReturnOffset,
    /// Wall-clock budget per A* search, seconds.
    pub astar_timeout_s: f64,
    pub pre_mst: PreMstOptions,
    /// Simplifier tunables; `resnap` is decided by the algorithm.
    pub simplify: SimplifyOptions,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            return_offset: ReturnOffset::default(),
            astar_timeout_s: 10.0,
            pre_mst: PreMstOptions::default(),
            simplify: SimplifyOptions::default(),
        }
    }
}

impl GenerationOptions {
    pub fn validate(&self) -> NetgenResult<()> {
        let offset = self.return_offset;
        for (what, value) in [
            ("return_offset.distance_m", offset.distance_m),
            ("return_offset.angle_deg", offset.angle_deg),
            ("pre_mst.max_distance_m", self.pre_mst.max_distance_m),
        ] {
            if !value.is_finite() {
                return Err(NetgenError::InvalidOption { what, value });
            }
        }
        let interval = self.pre_mst.point_interval_m;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(NetgenError::InvalidOption {
                what: "pre_mst.point_interval_m",
                value: interval,
            });
        }
        if !self.astar_timeout_s.is_finite() || self.astar_timeout_s < 0.0 {
            return Err(NetgenError::InvalidOption {
                what: "astar_timeout_s",
                value: self.astar_timeout_s,
            });
        }
        self.simplify.validate()
    }

    fn astar_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.astar_timeout_s)
    }
}

/// One side (supply or return) of the generated network.
#[derive(Debug, Clone)]
pub struct SideNetwork {
    pub topology: Topology,
    /// Attributed heat demand per pipe (W), indexed by pipe id.
    pub demand_w: Vec<f64>,
    pub projections: ProjectionSet,
    pub routing: RoutingStats,
    pub reconcile: ReconcileReport,
    pub simplify: SimplifyReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Connectors,
    Forward,
    Return,
    Producers,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Connectors,
        LayerKind::Forward,
        LayerKind::Return,
        LayerKind::Producers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Connectors => "connectors",
            LayerKind::Forward => "forward",
            LayerKind::Return => "return",
            LayerKind::Producers => "producers",
        }
    }
}

/// A line with the attributes persisted per feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFeature {
    pub segment: Segment,
    pub length_m: f64,
    pub role: PipeRole,
    pub heat_demand_w: f64,
}

impl LineFeature {
    fn new(segment: Segment, role: PipeRole, heat_demand_w: f64) -> Self {
        Self {
            segment,
            length_m: segment.length(),
            role,
            heat_demand_w,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkLayer {
    pub kind: LayerKind,
    pub features: Vec<LineFeature>,
}

/// Everything produced by one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedNetwork {
    pub forward: SideNetwork,
    pub return_side: SideNetwork,
    /// Consumer point → its offset point (house substation).
    pub connectors: Vec<LineFeature>,
    /// Producer point → its offset point.
    pub producer_lines: Vec<LineFeature>,
}

impl GeneratedNetwork {
    /// Input indices that could not be attached on either side.
    pub fn unconnectable(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .forward
            .projections
            .unconnectable
            .iter()
            .chain(&self.return_side.projections.unconnectable)
            .copied()
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// The four persisted layers.
    pub fn layers(&self) -> Vec<NetworkLayer> {
        LayerKind::ALL
            .into_iter()
            .map(|kind| NetworkLayer {
                kind,
                features: match kind {
                    LayerKind::Connectors => self.connectors.clone(),
                    LayerKind::Forward => side_features(&self.forward),
                    LayerKind::Return => side_features(&self.return_side),
                    LayerKind::Producers => self.producer_lines.clone(),
                },
            })
            .collect()
    }
}

fn side_features(side: &SideNetwork) -> Vec<LineFeature> {
    side.topology
        .pipes()
        .iter()
        .map(|pipe| {
            LineFeature::new(
                side.topology.segment(pipe),
                pipe.role,
                side.demand_w.get(pipe.id.idx()).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

/// Generate supply and return networks for `points` along `streets`.
///
/// Points that cannot be attached are excluded and reported; only invalid
/// options or topology construction failures are errors.
pub fn generate_network(
    points: &[ConnectionPoint],
    streets: &StreetLayer,
    options: &GenerationOptions,
) -> NetgenResult<GeneratedNetwork> {
    options.validate()?;

    let street_graph =
        (options.algorithm == Algorithm::AStar).then(|| StreetGraph::from_layer(streets));

    let forward_sources: Vec<Point> = points.iter().map(|p| p.position).collect();
    let return_sources: Vec<Point> = forward_sources
        .iter()
        .map(|&p| options.return_offset.apply(p))
        .collect();

    let forward = build_side(
        points,
        &forward_sources,
        streets,
        street_graph.as_ref(),
        options,
        PipeRole::Supply,
    )?;
    let return_side = build_side(
        points,
        &return_sources,
        streets,
        street_graph.as_ref(),
        options,
        PipeRole::Return,
    )?;

    let mut connectors = Vec::new();
    let mut producer_lines = Vec::new();
    for (point, &offset) in points.iter().zip(&return_sources) {
        let line = Segment::new(point.position, offset);
        if point.is_producer() {
            producer_lines.push(LineFeature::new(line, PipeRole::Connector, 0.0));
        } else {
            connectors.push(LineFeature::new(line, PipeRole::Connector, point.peak_demand_w));
        }
    }

    info!(
        algorithm = ?options.algorithm,
        forward_pipes = forward.topology.pipes().len(),
        return_pipes = return_side.topology.pipes().len(),
        forward_length_m = forward.topology.total_length(),
        "generated network"
    );

    Ok(GeneratedNetwork {
        forward,
        return_side,
        connectors,
        producer_lines,
    })
}

fn build_side(
    points: &[ConnectionPoint],
    sources: &[Point],
    streets: &StreetLayer,
    street_graph: Option<&StreetGraph>,
    options: &GenerationOptions,
    role: PipeRole,
) -> NetgenResult<SideNetwork> {
    let projections = project_points(sources, streets);
    let feet = unique_points(projections.feet());

    let mut protected = feet.clone();
    let mut routing = RoutingStats::default();
    let mut reconcile = ReconcileReport::default();
    let routed = match (options.algorithm, street_graph) {
        (Algorithm::AStar, Some(graph)) => {
            let (producers, consumers): (Vec<&Projection>, Vec<&Projection>) = projections
                .projections
                .iter()
                .partition(|proj| points[proj.index].is_producer());
            let producers: Vec<Point> = producers.iter().map(|p| p.foot).collect();
            let consumers: Vec<Point> = consumers.iter().map(|p| p.foot).collect();
            let (lines, stats) =
                route_on_streets(graph, &producers, &consumers, options.astar_timeout());
            routing = stats;
            let (lines, report) = connect_components(&lines, &feet);
            reconcile = report;
            lines
        }
        (Algorithm::PreMst, _) => {
            let pre = options.pre_mst;
            let waypoints =
                projections.connector_waypoints(pre.max_distance_m, pre.point_interval_m);
            protected = unique_points(feet.iter().copied().chain(waypoints));
            mst_segments(&protected)
        }
        _ => mst_segments(&feet),
    };

    let simplify_options = SimplifyOptions {
        resnap: matches!(options.algorithm, Algorithm::AdvancedMst | Algorithm::AStar),
        ..options.simplify
    };
    let (lines, simplify_report) = simplify(&routed, &protected, streets, &simplify_options);

    let mut builder = TopologyBuilder::from_segments(role, lines);
    for proj in &projections.projections {
        builder.add_pipe(proj.source, proj.foot);
    }
    let topology = builder.build()?;

    let (producers, consumers): (Vec<&Projection>, Vec<&Projection>) = projections
        .projections
        .iter()
        .partition(|proj| points[proj.index].is_producer());
    let producer_sources: Vec<Point> = producers.iter().map(|p| p.source).collect();
    let sinks: Vec<(Point, f64)> = consumers
        .iter()
        .map(|p| (p.source, points[p.index].peak_demand_w))
        .collect();
    let demand_w = attribute_demand(&topology, &producer_sources, &sinks);

    Ok(SideNetwork {
        topology,
        demand_w,
        projections,
        routing,
        reconcile,
        simplify: simplify_report,
    })
}
