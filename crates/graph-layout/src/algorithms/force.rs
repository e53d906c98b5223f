use crate::algorithm::{progress, LayoutAlgorithm, LayoutContext};
use crate::algorithms::circular::circle_radius;
use crate::iteration::{CancelToken, Observers};
use crate::sizes::require_sizes;
use crate::{LayoutError, LayoutOutcome, LayoutState, NodeSizes, Point, Vec2};
use petgraph::visit::{EdgeRef, GraphBase, IntoEdgeReferences, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::ControlFlow;
use tracing::debug;

/// Minimum distance used in force computations
const MIN_DISTANCE: f64 = 0.01;

/// Configuration for the force-directed (Fruchterman-Reingold) layout
#[derive(Debug, Clone)]
pub struct ForceDirectedLayout {
    /// Number of simulation steps
    pub iterations: usize,

    /// Distance at which attraction and repulsion balance. Defaults to twice
    /// the mean vertex diagonal.
    pub ideal_edge_length: Option<f64>,

    /// Largest displacement of the first step, cooled linearly to zero.
    /// Defaults to the ideal edge length.
    pub initial_temperature: Option<f64>,
}

impl Default for ForceDirectedLayout {
    fn default() -> Self {
        Self {
            iterations: 100,
            ideal_edge_length: None,
            initial_temperature: None,
        }
    }
}

/// Force-directed layout of one graph
///
/// Vertices start evenly spread on a circle, so runs are reproducible. Each
/// iteration event carries the displacement applied to every vertex as vertex
/// info and the current length of every edge as edge info.
pub struct ForceDirectedLayoutAlgorithm<G, S>
where
    G: GraphBase,
{
    ctx: LayoutContext<G, Vec2, f64>,
    sizes: S,
    parameters: ForceDirectedLayout,
}

impl<G, S> ForceDirectedLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(graph: G, sizes: S, parameters: ForceDirectedLayout) -> Self {
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
        let valid = |value: Option<f64>| value.map_or(true, |v| v.is_finite() && v > 0.0);

        if self.parameters.iterations == 0 {
            return Err(LayoutError::InvalidParameter(
                "at least one iteration is required",
            ));
        }
        if !valid(self.parameters.ideal_edge_length) {
            return Err(LayoutError::InvalidParameter(
                "ideal edge length must be finite and positive",
            ));
        }
        if !valid(self.parameters.initial_temperature) {
            return Err(LayoutError::InvalidParameter(
                "initial temperature must be finite and positive",
            ));
        }
        require_sizes(self.ctx.graph(), &self.sizes)
    }

    fn run(&mut self, sizes: &HashMap<G::NodeId, Vec2>) -> ControlFlow<usize> {
        let graph = self.ctx.graph();
        let vertices: Vec<G::NodeId> = graph.node_identifiers().collect();
        let index: HashMap<G::NodeId, usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let edges: Vec<(G::EdgeId, usize, usize)> = graph
            .edge_references()
            .filter_map(|e| Some((e.id(), *index.get(&e.source())?, *index.get(&e.target())?)))
            .collect();

        let count = vertices.len();
        let mean_diagonal = if count == 0 {
            0.0
        } else {
            sizes.values().map(|s| s.length()).sum::<f64>() / count as f64
        };
        let k = self.parameters.ideal_edge_length.unwrap_or(2.0 * mean_diagonal);
        let initial_temperature = self.parameters.initial_temperature.unwrap_or(k);
        debug!("Force-directed layout of {count} vertices, ideal length {k}");

        // Initial placement on a circle
        let radius = circle_radius(sizes.values().copied(), count, k);
        let mut positions: Vec<Point> = (0..count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / count as f64;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        for (&vertex, &position) in vertices.iter().zip(&positions) {
            self.ctx.set_position(vertex, position);
        }
        self.ctx.report(0.0, "initial placement")?;

        let iterations = self.parameters.iterations;
        for iteration in 1..=iterations {
            let temperature =
                initial_temperature * (1.0 - (iteration - 1) as f64 / iterations as f64);
            let forces = compute_forces(&positions, &edges, k);

            let mut applied = HashMap::with_capacity(count);
            for (i, force) in forces.into_iter().enumerate() {
                let displacement = limit_displacement(force, temperature);
                positions[i] = positions[i] + displacement;
                self.ctx.set_position(vertices[i], positions[i]);
                // Keep the local copy in sync with the sanitized position
                if let Some(&written) = self.ctx.positions().get(&vertices[i]) {
                    positions[i] = written;
                }
                applied.insert(vertices[i], displacement);
            }

            let edge_lengths = edges
                .iter()
                .map(|&(id, s, t)| (id, positions[s].distance(positions[t])))
                .collect();

            self.ctx.report_with_infos(
                progress(iteration, iterations),
                format!("iteration {iteration}, temperature {temperature:.2}"),
                Some(applied),
                Some(edge_lengths),
            )?;
        }

        ControlFlow::Continue(())
    }
}

/// Net Fruchterman-Reingold force on every vertex
fn compute_forces<E>(positions: &[Point], edges: &[(E, usize, usize)], k: f64) -> Vec<Vec2> {
    let mut forces = vec![Vec2::zero(); positions.len()];

    // Repulsion between every pair of vertices
    for i in 0..positions.len() {
        for j in i + 1..positions.len() {
            let (direction, distance) = separation(positions[i], positions[j], i + j);
            let force = direction.scale(k * k / distance);
            forces[i] += force;
            forces[j] -= force;
        }
    }

    // Attraction along edges
    for &(_, s, t) in edges {
        if s == t {
            continue;
        }
        let (direction, distance) = separation(positions[s], positions[t], s + t);
        let force = direction.scale(distance * distance / k);
        forces[s] -= force;
        forces[t] += force;
    }

    forces
}

/// Unit vector from `b` to `a` and their distance
///
/// Coincident points get a deterministic direction derived from `salt`.
fn separation(a: Point, b: Point, salt: usize) -> (Vec2, f64) {
    let delta = a - b;
    let length = delta.length();
    if length < MIN_DISTANCE || !length.is_finite() {
        let angle = salt as f64;
        return (Vec2::new(angle.cos(), angle.sin()), MIN_DISTANCE);
    }
    (delta.scale(1.0 / length), length)
}

/// Clamp a force to the current temperature; non-finite forces become zero
fn limit_displacement(force: Vec2, temperature: f64) -> Vec2 {
    let length = force.length();
    if !force.is_finite() || !length.is_finite() || length == 0.0 {
        return Vec2::zero();
    }
    force.scale(length.min(temperature) / length)
}

impl<G, S> LayoutAlgorithm for ForceDirectedLayoutAlgorithm<G, S>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    type NodeId = G::NodeId;
    type EdgeId = G::EdgeId;
    type Graph = G;
    type VertexInfo = Vec2;
    type EdgeInfo = f64;

    fn graph(&self) -> G {
        self.ctx.graph()
    }

    fn positions(&self) -> &HashMap<G::NodeId, Point> {
        self.ctx.positions()
    }

    fn state(&self) -> LayoutState {
        self.ctx.state()
    }

    fn observers_mut(&mut self) -> &mut Observers<G::NodeId, G::EdgeId, Vec2, f64> {
        self.ctx.observers_mut()
    }

    fn compute(&mut self) -> Result<LayoutOutcome, LayoutError<G::NodeId>> {
        self.ctx.begin()?;
        let sizes = self.validate().map_err(|e| self.ctx.fail(e))?;
        let run = self.run(&sizes);
        Ok(self.ctx.conclude(run, "force-directed layout done"))
    }
}
