use super::{MetricCalculator, MetricInput};
use crate::{NodeSizes, Rect};
use petgraph::visit::{GraphBase, IntoNodeIdentifiers};
use std::hash::Hash;
use tracing::debug;

/// Counts vertex pairs whose boxes overlap, and the total overlapped area
///
/// Boxes that only touch do not overlap. Pairs are found with a sweep over
/// the boxes sorted by their left edge.
pub struct OverlapMetric<'a, G, S>
where
    G: GraphBase,
{
    input: MetricInput<'a, G, S>,
    overlap_count: usize,
    overlapped_area: f64,
}

impl<'a, G, S> OverlapMetric<'a, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(input: MetricInput<'a, G, S>) -> Self {
        Self {
            input,
            overlap_count: 0,
            overlapped_area: 0.0,
        }
    }

    /// Number of overlapping vertex pairs
    pub fn overlap_count(&self) -> usize {
        self.overlap_count
    }

    /// Sum of the intersection areas of all overlapping pairs
    pub fn overlapped_area(&self) -> f64 {
        self.overlapped_area
    }
}

impl<G, S> MetricCalculator for OverlapMetric<'_, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    fn calculate(&mut self) {
        let input = self.input;
        let mut boxes: Vec<Rect> = input
            .graph
            .node_identifiers()
            .filter_map(|node| input.vertex_box(node))
            .collect();
        boxes.sort_by(|a, b| a.min.x.total_cmp(&b.min.x));

        self.overlap_count = 0;
        self.overlapped_area = 0.0;
        for (i, a) in boxes.iter().enumerate() {
            // Boxes starting at or after a's right edge cannot overlap it
            for b in boxes[i + 1..].iter().take_while(|b| b.min.x < a.max.x) {
                let area = a.intersection_area(b);
                if area > 0.0 {
                    self.overlap_count += 1;
                    self.overlapped_area += area;
                }
            }
        }

        debug!(
            "{} overlapping pairs, overlapped area {}",
            self.overlap_count, self.overlapped_area
        );
    }
}
