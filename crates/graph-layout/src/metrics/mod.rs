//! Layout quality metrics
//!
//! Every calculator reads the same [`MetricInput`] (graph, positions, sizes,
//! edge routes), fills its result fields in a single
//! [`MetricCalculator::calculate`] call and never fails: vertices without a
//! usable position or size are skipped, and only the positions metric reports
//! them.
//!
//! Positions are box centers: a vertex of size `(w, h)` at `(x, y)` covers
//! `[x - w/2, x + w/2] x [y - h/2, y + h/2]`.

mod area;
mod crossing;
mod overlap;
mod positions;

pub use area::LayoutAreaMetric;
pub use crossing::EdgeCrossingMetric;
pub use overlap::OverlapMetric;
pub use positions::PositionsMetric;

use crate::algorithm::{EdgeRoute, LayoutAlgorithm};
use crate::{NodeSizes, Point, QualityError, Rect};
use petgraph::visit::{EdgeRef, GraphBase, IntoEdgeReferences, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::hash::Hash;

/// A layout quality analyzer
pub trait MetricCalculator {
    /// Compute the metric, populating the calculator's result fields
    fn calculate(&mut self);
}

/// Read-only view of a (possibly partial) layout
pub struct MetricInput<'a, G, S>
where
    G: GraphBase,
{
    pub graph: G,
    pub positions: &'a HashMap<G::NodeId, Point>,
    pub sizes: &'a S,
    /// Routed edges; edges without a route are straight segments
    pub edge_routes: &'a HashMap<G::EdgeId, EdgeRoute>,
}

impl<G: GraphBase + Copy, S> Clone for MetricInput<'_, G, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GraphBase + Copy, S> Copy for MetricInput<'_, G, S> {}

impl<'a, G, S> MetricInput<'a, G, S>
where
    G: GraphBase + Copy,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(
        graph: G,
        positions: &'a HashMap<G::NodeId, Point>,
        sizes: &'a S,
        edge_routes: &'a HashMap<G::EdgeId, EdgeRoute>,
    ) -> Self {
        Self {
            graph,
            positions,
            sizes,
            edge_routes,
        }
    }

    /// Finite position of a vertex
    pub(crate) fn position(&self, node: G::NodeId) -> Option<Point> {
        self.positions.get(&node).copied().filter(|p| p.is_finite())
    }

    /// Bounding box of a vertex with a finite position and a finite,
    /// non-negative size
    pub(crate) fn vertex_box(&self, node: G::NodeId) -> Option<Rect> {
        let size = self
            .sizes
            .size(node)
            .filter(|s| s.is_finite() && s.x >= 0.0 && s.y >= 0.0)?;
        Some(Rect::from_center(self.position(node)?, size))
    }

    /// Polyline of an edge: its route when it has a usable one, otherwise the
    /// segment between its endpoints
    pub(crate) fn edge_geometry<R>(&self, edge: &R) -> Option<Vec<Point>>
    where
        R: EdgeRef<NodeId = G::NodeId, EdgeId = G::EdgeId>,
    {
        let route = self
            .edge_routes
            .get(&edge.id())
            .filter(|route| route.len() >= 2 && route.iter().all(|p| p.is_finite()));
        if let Some(route) = route {
            return Some(route.clone());
        }

        Some(vec![self.position(edge.source())?, self.position(edge.target())?])
    }
}

/// All layout metrics of one layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResults {
    pub positions_set: bool,

    pub overlap_count: usize,
    pub overlapped_area: f64,

    pub top_left: Point,
    pub bottom_right: Point,
    pub area: f64,
    pub ratio: f64,

    pub cross_count: usize,
    pub minimum_edge_length: f64,
    pub maximum_edge_length: f64,
    pub average_edge_length: f64,
}

impl LayoutResults {
    /// Run every calculator on `input`
    pub fn calculate<G, S>(input: MetricInput<'_, G, S>) -> Self
    where
        G: IntoNodeIdentifiers + IntoEdgeReferences,
        G::NodeId: Eq + Hash,
        G::EdgeId: Eq + Hash,
        S: NodeSizes<G::NodeId>,
    {
        let mut positions = PositionsMetric::new(input);
        positions.calculate();
        let mut overlap = OverlapMetric::new(input);
        overlap.calculate();
        let mut area = LayoutAreaMetric::new(input);
        area.calculate();
        let mut edges = EdgeCrossingMetric::new(input);
        edges.calculate();

        Self {
            positions_set: positions.positions_set(),
            overlap_count: overlap.overlap_count(),
            overlapped_area: overlap.overlapped_area(),
            top_left: area.top_left(),
            bottom_right: area.bottom_right(),
            area: area.area(),
            ratio: area.ratio(),
            cross_count: edges.cross_count(),
            minimum_edge_length: edges.minimum_edge_length(),
            maximum_edge_length: edges.maximum_edge_length(),
            average_edge_length: edges.average_edge_length(),
        }
    }

    /// Accept a layout with every position set, no overlap, and at most
    /// `max_crossings` edge crossings
    ///
    /// # Errors
    /// Returns the first failed criterion.
    pub fn check(&self, max_crossings: usize) -> Result<(), QualityError> {
        if !self.positions_set {
            return Err(QualityError::PositionsNotSet);
        }
        if self.overlap_count > 0 || self.overlapped_area > 0.0 {
            return Err(QualityError::Overlaps {
                count: self.overlap_count,
                area: self.overlapped_area,
            });
        }
        if self.cross_count > max_crossings {
            return Err(QualityError::TooManyCrossings {
                count: self.cross_count,
                max: max_crossings,
            });
        }
        Ok(())
    }
}

/// Score the current layout of an algorithm
///
/// Edge routes are used when the algorithm has the edge routing capability.
pub fn evaluate_layout<A, S>(algorithm: &A, sizes: &S) -> LayoutResults
where
    A: LayoutAlgorithm,
    A::Graph: IntoNodeIdentifiers + IntoEdgeReferences,
    S: NodeSizes<A::NodeId>,
{
    let no_routes = HashMap::new();
    let edge_routes = algorithm
        .as_edge_routing()
        .map_or(&no_routes, |routing| routing.edge_routes());

    LayoutResults::calculate(MetricInput::new(
        algorithm.graph(),
        algorithm.positions(),
        sizes,
        edge_routes,
    ))
}
