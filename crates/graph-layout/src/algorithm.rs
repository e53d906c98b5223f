use crate::iteration::{CancelToken, IterationEvent, Observers};
use crate::{LayoutError, Point};
use petgraph::visit::GraphBase;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::ControlFlow;
use tracing::{debug, trace, warn};

/// Polyline geometry of one edge, including the points where it meets its
/// endpoints
pub type EdgeRoute = Vec<Point>;

/// Lifecycle of a layout algorithm instance
///
/// `Created -> Running -> {Completed | Aborted}`. A run rejected by
/// validation goes from `Running` to `Failed` before any iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutState {
    Created,
    Running,
    Completed,
    Aborted,
    Failed,
}

/// How a successful `compute` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    Completed,
    /// An observer aborted the snapshot with this iteration index
    Aborted { iteration: usize },
}

/// A layout strategy computing vertex positions for a graph
///
/// Implementations are single use: `compute` runs once, and further calls
/// fail with [`LayoutError::AlreadyComputed`] without touching the positions.
pub trait LayoutAlgorithm {
    /// The type used to identify nodes in the graph
    type NodeId: Copy + Eq + Hash + Debug;

    /// The type used to identify edges in the graph
    type EdgeId: Copy + Eq + Hash + Debug;

    /// Graph reference the algorithm lays out
    type Graph: GraphBase<NodeId = Self::NodeId, EdgeId = Self::EdgeId> + Copy;

    /// Auxiliary per-vertex information attached to iteration events
    type VertexInfo;

    /// Auxiliary per-edge information attached to iteration events
    type EdgeInfo;

    /// The graph being laid out, fixed for the lifetime of the instance
    fn graph(&self) -> Self::Graph;

    /// Current vertex positions (box centers)
    ///
    /// Observers see the same positions through
    /// [`IterationEvent::positions`] while the computation runs.
    fn positions(&self) -> &HashMap<Self::NodeId, Point>;

    fn state(&self) -> LayoutState;

    /// Observers receiving this instance's iteration events
    fn observers_mut(
        &mut self,
    ) -> &mut Observers<Self::NodeId, Self::EdgeId, Self::VertexInfo, Self::EdgeInfo>;

    /// Run the layout to completion or until an observer aborts it
    ///
    /// # Errors
    /// Returns a configuration error, before any iteration event is
    /// delivered, when the input cannot be laid out (e.g. missing vertex
    /// sizes), or when called more than once.
    fn compute(&mut self) -> Result<LayoutOutcome, LayoutError<Self::NodeId>>;

    /// The edge routing capability, for algorithms that route edges
    fn as_edge_routing(&self) -> Option<&dyn EdgeRouting<Self::EdgeId>> {
        None
    }
}

/// Capability of algorithms that also compute a polyline for each edge
pub trait EdgeRouting<E> {
    /// Routed edges, populated under the same timing rules as positions
    fn edge_routes(&self) -> &HashMap<E, EdgeRoute>;
}

/// Highest percentage an intermediate event can carry; 100 marks completion
pub const LAST_STEP_PERCENT: f64 = 99.9;

/// Completion percentage of `step` out of `total` steps
pub fn progress(step: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (step.min(total) as f64 / total as f64) * 100.0
    }
}

/// State shared by every layout algorithm: graph, positions, lifecycle and
/// observers
///
/// Concrete algorithms embed a context and route all position writes and
/// progress reports through it, which keeps iteration numbering consecutive,
/// progress monotonic and coordinates finite.
#[derive(Debug)]
pub struct LayoutContext<G, VI = (), EI = ()>
where
    G: GraphBase,
{
    graph: G,
    positions: HashMap<G::NodeId, Point>,
    state: LayoutState,
    observers: Observers<G::NodeId, G::EdgeId, VI, EI>,
    cancel: Option<CancelToken>,
    next_iteration: usize,
    last_percent: f64,
}

impl<G, VI, EI> LayoutContext<G, VI, EI>
where
    G: GraphBase + Copy,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
{
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            positions: HashMap::new(),
            state: LayoutState::Created,
            observers: Observers::new(),
            cancel: None,
            next_iteration: 0,
            last_percent: 0.0,
        }
    }

    pub fn graph(&self) -> G {
        self.graph
    }

    pub fn positions(&self) -> &HashMap<G::NodeId, Point> {
        &self.positions
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn observers_mut(&mut self) -> &mut Observers<G::NodeId, G::EdgeId, VI, EI> {
        &mut self.observers
    }

    /// Abort the run whenever `token` is set, in addition to snapshot aborts
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    /// Enter the running state
    ///
    /// # Errors
    /// Fails if the instance already left the created state.
    pub fn begin(&mut self) -> Result<(), LayoutError<G::NodeId>> {
        if self.state != LayoutState::Created {
            warn!("Layout computed again while {:?}", self.state);
            return Err(LayoutError::AlreadyComputed(self.state));
        }
        debug!("Layout started");
        self.state = LayoutState::Running;
        Ok(())
    }

    /// Record a validation failure and hand the error back
    pub fn fail(&mut self, error: LayoutError<G::NodeId>) -> LayoutError<G::NodeId> {
        warn!("Layout rejected: {error}");
        self.state = LayoutState::Failed;
        error
    }

    /// Write a vertex position, replacing non-finite components
    ///
    /// Non-finite components fall back to the vertex's previous position, or
    /// the origin. Writes outside the running state are ignored.
    pub fn set_position(&mut self, node: G::NodeId, position: Point) {
        if self.state != LayoutState::Running {
            warn!("Ignoring position write for {node:?} while {:?}", self.state);
            return;
        }

        let fallback = self.positions.get(&node).copied().unwrap_or_default();
        self.positions.insert(node, position.sanitized(fallback));
    }

    /// Report an iteration without auxiliary information
    pub fn report(&mut self, percent: f64, message: impl Into<String>) -> ControlFlow<usize> {
        self.report_with_infos(percent, message, None, None)
    }

    /// Deliver the next iteration event to the observers
    ///
    /// The percentage is clamped into `[previous, LAST_STEP_PERCENT]`: only
    /// [`finish`](Self::finish) reports 100. Returns `Break` with the iteration
    /// index when the event was aborted, after moving to the aborted state.
    /// The algorithm must stop working.
    pub fn report_with_infos(
        &mut self,
        percent: f64,
        message: impl Into<String>,
        vertex_infos: Option<HashMap<G::NodeId, VI>>,
        edge_infos: Option<HashMap<G::EdgeId, EI>>,
    ) -> ControlFlow<usize> {
        let percent = if percent.is_finite() {
            percent.min(LAST_STEP_PERCENT)
        } else {
            self.last_percent
        };
        self.deliver(percent, message, vertex_infos, edge_infos)
    }

    fn deliver(
        &mut self,
        percent: f64,
        message: impl Into<String>,
        vertex_infos: Option<HashMap<G::NodeId, VI>>,
        edge_infos: Option<HashMap<G::EdgeId, EI>>,
    ) -> ControlFlow<usize> {
        let iteration = self.next_iteration;
        self.next_iteration += 1;

        let percent = percent.max(self.last_percent).min(100.0);
        self.last_percent = percent;

        let mut aborted = false;
        if !self.observers.is_empty() {
            let mut event = IterationEvent::new(iteration, percent)
                .with_message(message)
                .with_positions(self.positions.clone());
            if let Some(infos) = vertex_infos {
                event = event.with_vertex_infos(infos);
            }
            if let Some(infos) = edge_infos {
                event = event.with_edge_infos(infos);
            }

            trace!("Delivering iteration {iteration} ({percent:.1}%)");
            aborted = self.observers.notify(&event);
        }

        if aborted || self.cancel.as_ref().is_some_and(CancelToken::is_aborted) {
            debug!("Layout aborted at iteration {iteration}");
            self.state = LayoutState::Aborted;
            ControlFlow::Break(iteration)
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Deliver the final 100% event and enter the completed state
    ///
    /// The work is done at that point, so an abort request on the final event
    /// does not change the outcome.
    pub fn finish(&mut self, message: impl Into<String>) -> LayoutOutcome {
        let _ = self.deliver(100.0, message, None, None);
        debug!(
            "Layout completed after {} iterations with {} positions",
            self.next_iteration,
            self.positions.len()
        );
        self.state = LayoutState::Completed;
        LayoutOutcome::Completed
    }

    /// Map the result of an algorithm's iteration loop to its outcome
    pub fn conclude(&mut self, run: ControlFlow<usize>, message: &str) -> LayoutOutcome {
        match run {
            ControlFlow::Continue(()) => self.finish(message),
            ControlFlow::Break(iteration) => LayoutOutcome::Aborted { iteration },
        }
    }
}
