use crate::algorithm::{progress, LayoutAlgorithm, LayoutContext};
use crate::iteration::{CancelToken, Observers};
use crate::sizes::require_sizes;
use crate::{LayoutError, LayoutOutcome, LayoutState, NodeSizes, Point, Vec2};
use petgraph::visit::{GraphBase, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::ControlFlow;

/// Configuration for the circular layout
#[derive(Debug, Clone)]
pub struct CircularLayout {
    /// Minimum gap between the boxes of neighbouring vertices on the circle
    pub spacing: f64,
}

impl Default for CircularLayout {
    fn default() -> Self {
        Self { spacing: 10.0 }
    }
}

/// Places vertices evenly on a circle centered on the origin, in graph order
///
/// The radius is chosen so that neighbouring boxes are at least `spacing`
/// apart along the chord. One iteration event per placed vertex.
pub struct CircularLayoutAlgorithm<G, S>
where
    G: GraphBase,
{
    ctx: LayoutContext<G>,
    sizes: S,
    parameters: CircularLayout,
}

impl<G, S> CircularLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(graph: G, sizes: S, parameters: CircularLayout) -> Self {
        Self {
            ctx: LayoutContext::new(graph),
            sizes,
            parameters,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.ctx.set_cancel_token(token);
        self
    }

    fn validate(&self) -> Result<HashMap<G::NodeId, Vec2>, LayoutError<G::NodeId>> {
        let spacing = self.parameters.spacing;
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(LayoutError::InvalidParameter(
                "spacing must be finite and non-negative",
            ));
        }
        require_sizes(self.ctx.graph(), &self.sizes)
    }

    fn run(&mut self, sizes: &HashMap<G::NodeId, Vec2>) -> ControlFlow<usize> {
        self.ctx.report(0.0, "placing vertices on a circle")?;

        let vertices: Vec<_> = self.ctx.graph().node_identifiers().collect();
        let count = vertices.len();
        let radius = circle_radius(sizes.values().copied(), count, self.parameters.spacing);

        for (i, &vertex) in vertices.iter().enumerate() {
            let angle = 2.0 * PI * i as f64 / count as f64;
            self.ctx
                .set_position(vertex, Point::new(radius * angle.cos(), radius * angle.sin()));
            self.ctx
                .report(progress(i + 1, count), format!("placed vertex {}", i + 1))?;
        }

        ControlFlow::Continue(())
    }
}

/// Radius at which `count` evenly spread boxes keep `spacing` between
/// neighbours
///
/// Neighbouring centers are one chord apart, so the chord must cover the
/// largest box diagonal plus the spacing.
pub(crate) fn circle_radius(sizes: impl Iterator<Item = Vec2>, count: usize, spacing: f64) -> f64 {
    if count < 2 {
        return 0.0;
    }

    let max_diagonal = sizes.map(Vec2::length).fold(0.0, f64::max);
    (max_diagonal + spacing) / (2.0 * (PI / count as f64).sin())
}

impl<G, S> LayoutAlgorithm for CircularLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    type NodeId = G::NodeId;
    type EdgeId = G::EdgeId;
    type Graph = G;
    type VertexInfo = ();
    type EdgeInfo = ();

    fn graph(&self) -> G {
        self.ctx.graph()
    }

    fn positions(&self) -> &HashMap<G::NodeId, Point> {
        self.ctx.positions()
    }

    fn state(&self) -> LayoutState {
        self.ctx.state()
    }

    fn observers_mut(&mut self) -> &mut Observers<G::NodeId, G::EdgeId> {
        self.ctx.observers_mut()
    }

    fn compute(&mut self) -> Result<LayoutOutcome, LayoutError<G::NodeId>> {
        self.ctx.begin()?;
        let sizes = self.validate().map_err(|e| self.ctx.fail(e))?;
        let run = self.run(&sizes);
        Ok(self.ctx.conclude(run, "circular layout done"))
    }
}
