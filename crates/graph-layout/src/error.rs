use crate::{LayoutState, Vec2};
use std::fmt;
use thiserror::Error;

/// Errors that can occur before a layout computation starts iterating
///
/// All variants are configuration errors: they are reported before the first
/// iteration snapshot is delivered. Aborting a run is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError<N>
where
    N: fmt::Debug,
{
    /// No size was provided for a vertex that the algorithm needs to size
    #[error("no size provided for vertex {0:?}")]
    MissingSize(N),

    /// A size was provided but is not finite and strictly positive
    #[error("vertex {node:?} has invalid size {size:?}")]
    InvalidSize { node: N, size: Vec2 },

    /// An algorithm parameter violates its precondition
    #[error("invalid layout parameter: {0}")]
    InvalidParameter(&'static str),

    /// `compute` was called on an instance that is no longer in the created state
    #[error("layout can only be computed once (current state: {0:?})")]
    AlreadyComputed(LayoutState),
}

/// Layout quality check failures, see [`LayoutResults::check`](crate::metrics::LayoutResults::check)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QualityError {
    #[error("some vertices have no valid position")]
    PositionsNotSet,

    #[error("{count} vertex pairs overlap (total overlapped area {area})")]
    Overlaps { count: usize, area: f64 },

    #[error("{count} edge crossings exceed the allowed {max}")]
    TooManyCrossings { count: usize, max: usize },
}
