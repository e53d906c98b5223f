mod crossings;
mod layers;
mod positions;

use crate::algorithm::{progress, EdgeRoute, EdgeRouting, LayoutAlgorithm, LayoutContext};
use crate::iteration::{CancelToken, Observers};
use crate::sizes::require_sizes;
use crate::{LayoutError, LayoutOutcome, LayoutState, NodeSizes, Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{EdgeRef, GraphBase, IntoEdgeReferences, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::ControlFlow;
use tracing::debug;

use crossings::minimize_crossings;
use layers::{acyclic_graph, assign_layers};
use positions::CoordinateAssignment;

/// Configuration for the layered (Sugiyama-style) layout
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    /// Horizontal and vertical margins between nodes
    pub margin: Vec2,

    /// Maximum iterations for crossing minimization
    pub max_crossing_iterations: usize,

    /// Maximum iterations for vertical position optimization
    pub max_position_iterations: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            margin: Vec2::new(20.0, 20.0),
            max_crossing_iterations: 10,
            max_position_iterations: 50,
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout with the given margin
    pub fn new(margin: Vec2) -> Self {
        Self {
            margin,
            ..Default::default()
        }
    }
}

/// Layer structure of a computed layout
#[derive(Debug, Clone)]
pub struct Layers<N>
where
    N: Copy + Ord + Hash,
{
    /// Acyclic copy of the graph the layers were computed from
    pub(crate) graph: DiGraphMap<N, ()>,

    /// Nodes organized into topological layers
    pub nodes: Vec<Vec<N>>,

    /// Number of crossings between consecutive layers (quality metric)
    pub crossings: usize,

    /// Number of edges reversed to break cycles
    pub reversed_edges: usize,
}

impl<N> Layers<N>
where
    N: Copy + Ord + Hash,
{
    /// Layer index of every node
    pub fn layer_of(&self) -> HashMap<N, usize> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, layer)| layer.iter().map(move |&node| (node, i)))
            .collect()
    }
}

/// Layered layout of one graph
///
/// Layers are columns laid out left to right. Iteration events carry each
/// vertex's layer index as vertex info. Edges are routed through the gaps
/// between columns.
pub struct LayeredLayoutAlgorithm<G, S>
where
    G: GraphBase,
    G::NodeId: Copy + Ord + Hash,
{
    ctx: LayoutContext<G, usize>,
    sizes: S,
    parameters: LayeredLayout,
    layers: Option<Layers<G::NodeId>>,
    edge_routes: HashMap<G::EdgeId, EdgeRoute>,
}

impl<G, S> LayeredLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Ord + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(graph: G, sizes: S, parameters: LayeredLayout) -> Self {
        Self {
            ctx: LayoutContext::new(graph),
            sizes,
            parameters,
            layers: None,
            edge_routes: HashMap::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.ctx.set_cancel_token(token);
        self
    }

    /// Layer structure, available once the layering phase ran
    pub fn layers(&self) -> Option<&Layers<G::NodeId>> {
        self.layers.as_ref()
    }

    fn validate(&self) -> Result<HashMap<G::NodeId, Vec2>, LayoutError<G::NodeId>> {
        let margin = self.parameters.margin;
        if !margin.is_finite() || margin.x < 0.0 || margin.y < 0.0 {
            return Err(LayoutError::InvalidParameter(
                "margins must be finite and non-negative",
            ));
        }
        require_sizes(self.ctx.graph(), &self.sizes)
    }

    fn run(&mut self, sizes: &HashMap<G::NodeId, Vec2>) -> ControlFlow<usize> {
        // Progress split: crossings up to 40%, positioning up to 95%
        const CROSSINGS_SHARE: f64 = 0.4;
        const POSITIONS_SHARE: f64 = 0.55;

        self.ctx.report(0.0, "assigning layers")?;

        let (graph, reversed_edges) = acyclic_graph(self.ctx.graph());
        let initial_layers = assign_layers(&graph);
        debug!(
            "Assigned {} layers, reversed {reversed_edges} edges",
            initial_layers.len()
        );

        let max_crossing_iterations = self.parameters.max_crossing_iterations;
        let ctx = &mut self.ctx;
        let (nodes, crossings) = minimize_crossings(
            &graph,
            initial_layers,
            max_crossing_iterations,
            |sweep, crossings| {
                let percent = progress(sweep, max_crossing_iterations) * CROSSINGS_SHARE;
                ctx.report(percent, format!("crossing sweep {sweep}: {crossings} crossings"))
            },
        )?;

        let layers = Layers {
            graph,
            nodes,
            crossings,
            reversed_edges,
        };
        let layer_of = layers.layer_of();

        let mut assignment =
            CoordinateAssignment::new(&layers.nodes, &layers.graph, sizes, self.parameters.margin);
        for (node, center) in assignment.centers() {
            self.ctx.set_position(node, center);
        }
        self.ctx.report_with_infos(
            CROSSINGS_SHARE * 100.0,
            "initial positions",
            Some(layer_of.clone()),
            None,
        )?;

        let max_position_iterations = self.parameters.max_position_iterations;
        for pass in 1..=max_position_iterations {
            let changed = assignment.step();
            for (node, center) in assignment.centers() {
                self.ctx.set_position(node, center);
            }

            let percent = CROSSINGS_SHARE * 100.0
                + progress(pass, max_position_iterations) * POSITIONS_SHARE;
            self.ctx.report_with_infos(
                percent,
                format!("position pass {pass}"),
                Some(layer_of.clone()),
                None,
            )?;

            if !changed {
                break;
            }
        }

        assignment.normalize();
        for (node, center) in assignment.centers() {
            self.ctx.set_position(node, center);
        }

        self.edge_routes = route_edges(
            self.ctx.graph(),
            self.ctx.positions(),
            &layer_of,
            |layer| assignment.column_bounds(layer),
            self.parameters.margin,
        );
        self.layers = Some(layers);

        ControlFlow::Continue(())
    }
}

/// Route every edge as a polyline through the column gaps
///
/// Edges between adjacent columns or inside one column are straight. Longer
/// edges leave the source horizontally into the gap next to it, run straight
/// to the gap next to the target, and enter the target horizontally.
fn route_edges<G, F>(
    graph: G,
    positions: &HashMap<G::NodeId, Point>,
    layer_of: &HashMap<G::NodeId, usize>,
    column_bounds: F,
    margin: Vec2,
) -> HashMap<G::EdgeId, EdgeRoute>
where
    G: IntoEdgeReferences,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    F: Fn(usize) -> (f64, f64),
{
    let half_gap = margin.x / 2.0;
    let mut routes = HashMap::new();

    for edge in graph.edge_references() {
        let (Some(&start), Some(&end)) = (positions.get(&edge.source()), positions.get(&edge.target()))
        else {
            continue;
        };
        let source_layer = layer_of.get(&edge.source()).copied().unwrap_or_default();
        let target_layer = layer_of.get(&edge.target()).copied().unwrap_or_default();

        let route = if target_layer > source_layer + 1 {
            let (_, source_right) = column_bounds(source_layer);
            let (target_left, _) = column_bounds(target_layer);
            vec![
                start,
                Point::new(source_right + half_gap, start.y),
                Point::new(target_left - half_gap, end.y),
                end,
            ]
        } else if source_layer > target_layer + 1 {
            let (source_left, _) = column_bounds(source_layer);
            let (_, target_right) = column_bounds(target_layer);
            vec![
                start,
                Point::new(source_left - half_gap, start.y),
                Point::new(target_right + half_gap, end.y),
                end,
            ]
        } else {
            vec![start, end]
        };

        routes.insert(edge.id(), route);
    }

    routes
}

impl<G, S> LayoutAlgorithm for LayeredLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Ord + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    type NodeId = G::NodeId;
    type EdgeId = G::EdgeId;
    type Graph = G;
    type VertexInfo = usize;
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

    fn observers_mut(&mut self) -> &mut Observers<G::NodeId, G::EdgeId, usize, ()> {
        self.ctx.observers_mut()
    }

    fn compute(&mut self) -> Result<LayoutOutcome, LayoutError<G::NodeId>> {
        self.ctx.begin()?;
        let sizes = self.validate().map_err(|e| self.ctx.fail(e))?;
        let run = self.run(&sizes);
        Ok(self.ctx.conclude(run, "layered layout done"))
    }

    fn as_edge_routing(&self) -> Option<&dyn EdgeRouting<G::EdgeId>> {
        Some(self)
    }
}

impl<G, S> EdgeRouting<G::EdgeId> for LayeredLayoutAlgorithm<G, S>
where
    G: GraphBase,
    G::NodeId: Copy + Ord + Hash,
{
    fn edge_routes(&self) -> &HashMap<G::EdgeId, EdgeRoute> {
        &self.edge_routes
    }
}
