use super::{MetricCalculator, MetricInput};
use crate::{NodeSizes, Point, Rect};
use petgraph::visit::{GraphBase, IntoNodeIdentifiers};
use std::hash::Hash;
use tracing::debug;

/// Smallest axis-aligned box enclosing every vertex box, its area and its
/// aspect ratio
///
/// A layout without any placed vertex yields an empty box at the origin.
pub struct LayoutAreaMetric<'a, G, S>
where
    G: GraphBase,
{
    input: MetricInput<'a, G, S>,
    bounds: Rect,
    ratio: f64,
}

impl<'a, G, S> LayoutAreaMetric<'a, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(input: MetricInput<'a, G, S>) -> Self {
        Self {
            input,
            bounds: Rect::default(),
            ratio: 0.0,
        }
    }

    pub fn top_left(&self) -> Point {
        self.bounds.min
    }

    pub fn bottom_right(&self) -> Point {
        self.bounds.max
    }

    pub fn area(&self) -> f64 {
        self.bounds.area()
    }

    /// Width over height; infinite for a flat non-empty box, 0 for an empty one
    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl<G, S> MetricCalculator for LayoutAreaMetric<'_, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    fn calculate(&mut self) {
        let input = self.input;
        self.bounds = input
            .graph
            .node_identifiers()
            .filter_map(|node| input.vertex_box(node))
            .reduce(Rect::union)
            .unwrap_or_default();

        let (width, height) = (self.bounds.width(), self.bounds.height());
        self.ratio = if height > 0.0 {
            width / height
        } else if width > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        debug!(
            "Layout bounds {:?}, area {}, ratio {}",
            self.bounds,
            self.area(),
            self.ratio
        );
    }
}
