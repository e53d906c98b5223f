//! Progress reporting and cooperative cancellation for layout computations
//!
//! A running algorithm delivers one [`IterationEvent`] per iteration to every
//! subscribed observer, synchronously and in iteration order. An observer
//! requests early termination by calling [`IterationEvent::abort`]; the
//! algorithm reads the flag right after delivery and stops.

use crate::Point;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag
///
/// Clones share the same flag, so a handle taken from a snapshot can be set
/// from another thread. Reads never observe a torn value.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the computation to stop as soon as possible
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Run-level abort flag that can be handed to an algorithm before `compute`
///
/// It is checked at the same points as the per-snapshot flag.
pub type CancelToken = AbortHandle;

/// One reported step of a running layout computation
///
/// `VI` and `EI` are the types of the optional per-vertex and per-edge
/// auxiliary information. Algorithms without auxiliary information use the
/// default `()`.
#[derive(Debug, Clone)]
pub struct IterationEvent<N, E, VI = (), EI = ()> {
    iteration: usize,
    status_in_percent: f64,
    message: String,
    positions: HashMap<N, Point>,
    vertex_infos: Option<HashMap<N, VI>>,
    edge_infos: Option<HashMap<E, EI>>,
    abort: AbortHandle,
}

impl<N, E, VI, EI> IterationEvent<N, E, VI, EI> {
    /// Create a snapshot with an empty message, no positions and no infos
    ///
    /// The percentage is clamped into `[0, 100]`.
    pub fn new(iteration: usize, status_in_percent: f64) -> Self {
        let status_in_percent = if status_in_percent.is_nan() {
            0.0
        } else {
            status_in_percent.clamp(0.0, 100.0)
        };

        Self {
            iteration,
            status_in_percent,
            message: String::new(),
            positions: HashMap::new(),
            vertex_infos: None,
            edge_infos: None,
            abort: AbortHandle::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_positions(mut self, positions: HashMap<N, Point>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_vertex_infos(mut self, infos: HashMap<N, VI>) -> Self {
        self.vertex_infos = Some(infos);
        self
    }

    pub fn with_edge_infos(mut self, infos: HashMap<E, EI>) -> Self {
        self.edge_infos = Some(infos);
        self
    }

    /// Index of this iteration, starting at 0
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Completion of the computation, in `[0, 100]`
    pub fn status_in_percent(&self) -> f64 {
        self.status_in_percent
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Vertex positions at the time of this iteration
    pub fn positions(&self) -> &HashMap<N, Point> {
        &self.positions
    }

    /// Request the algorithm to stop after this iteration
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Handle on this snapshot's abort flag
    pub fn abort_handle(&self) -> &AbortHandle {
        &self.abort
    }

    /// Drop the auxiliary information, keeping the base fields and abort flag
    pub fn into_base(self) -> IterationEvent<N, E> {
        IterationEvent {
            iteration: self.iteration,
            status_in_percent: self.status_in_percent,
            message: self.message,
            positions: self.positions,
            vertex_infos: None,
            edge_infos: None,
            abort: self.abort,
        }
    }
}

impl<N, E, VI, EI> IterationEvent<N, E, VI, EI>
where
    N: Eq + Hash,
    E: Eq + Hash,
{
    /// Auxiliary information for `vertex`, if any
    pub fn vertex_info(&self, vertex: &N) -> Option<&VI> {
        self.vertex_infos.as_ref()?.get(vertex)
    }

    /// Auxiliary information for `edge`, if any
    pub fn edge_info(&self, edge: &E) -> Option<&EI> {
        self.edge_infos.as_ref()?.get(edge)
    }
}

/// Identifies a subscription in [`Observers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer<N, E, VI, EI> = Box<dyn FnMut(&IterationEvent<N, E, VI, EI>) + Send>;

/// Registry of iteration observers
///
/// Observers are called in subscription order.
pub struct Observers<N, E, VI = (), EI = ()> {
    next_id: u64,
    entries: Vec<(ObserverId, Observer<N, E, VI, EI>)>,
}

impl<N, E, VI, EI> Default for Observers<N, E, VI, EI> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<N, E, VI, EI> fmt::Debug for Observers<N, E, VI, EI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<N, E, VI, EI> Observers<N, E, VI, EI> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&IterationEvent<N, E, VI, EI>) + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Remove a subscription, returns whether it was present
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != len
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every observer, then report whether it was aborted
    pub fn notify(&mut self, event: &IterationEvent<N, E, VI, EI>) -> bool {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
        event.is_aborted()
    }
}
