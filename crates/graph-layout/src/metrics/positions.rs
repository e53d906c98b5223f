use super::{MetricCalculator, MetricInput};
use crate::NodeSizes;
use petgraph::visit::{GraphBase, IntoNodeIdentifiers};
use std::hash::Hash;
use tracing::debug;

/// Checks that every vertex of the graph has a finite position
pub struct PositionsMetric<'a, G, S>
where
    G: GraphBase,
{
    input: MetricInput<'a, G, S>,
    positions_set: bool,
}

impl<'a, G, S> PositionsMetric<'a, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(input: MetricInput<'a, G, S>) -> Self {
        Self {
            input,
            positions_set: true,
        }
    }

    /// Whether every vertex has a finite position
    pub fn positions_set(&self) -> bool {
        self.positions_set
    }
}

impl<G, S> MetricCalculator for PositionsMetric<'_, G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    fn calculate(&mut self) {
        let input = self.input;
        self.positions_set = input
            .graph
            .node_identifiers()
            .all(|node| input.position(node).is_some());
        debug!("Positions set: {}", self.positions_set);
    }
}
