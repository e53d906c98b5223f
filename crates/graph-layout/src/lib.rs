//! Observable graph layout algorithms and layout quality metrics
//!
//! Algorithms work with any graph data structure implementing petgraph's
//! visitor traits. Each algorithm runs once through
//! [`LayoutAlgorithm::compute`], delivering numbered [`IterationEvent`]s to
//! its observers; any observer can abort the run by setting the event's
//! abort flag. The finished (or partial) layout is then scored by the
//! calculators of the [`metrics`] module.
//!
//! # Layout algorithms
//!
//! - [`LayeredLayoutAlgorithm`]: Sugiyama-style layered layout, with edge routing
//! - [`CircularLayoutAlgorithm`]: vertices evenly spread on a circle
//! - [`ForceDirectedLayoutAlgorithm`]: Fruchterman-Reingold spring embedder
//!
//! # Example
//!
//! ```
//! use graphshape_layout::{
//!     evaluate_layout, LayeredLayout, LayeredLayoutAlgorithm, LayoutAlgorithm, LayoutOutcome,
//!     Vec2,
//! };
//! use petgraph::graph::DiGraph;
//!
//! // Create a graph
//! let mut graph = DiGraph::<(), ()>::new();
//! let a = graph.add_node(());
//! let b = graph.add_node(());
//! let c = graph.add_node(());
//! graph.extend_with_edges([(a, b), (b, c), (a, c)]);
//!
//! // Provide node sizes
//! let sizes = |_node| Vec2::new(100.0, 50.0);
//!
//! let mut layout = LayeredLayoutAlgorithm::new(&graph, sizes, LayeredLayout::default());
//! layout.observers_mut().subscribe(|event| {
//!     println!("{}: {:.0}%", event.iteration(), event.status_in_percent());
//! });
//! assert_eq!(layout.compute(), Ok(LayoutOutcome::Completed));
//!
//! // Score the result
//! let results = evaluate_layout(&layout, &sizes);
//! assert!(results.check(0).is_ok());
//! ```

mod error;
mod geometry;
mod sizes;

pub mod algorithm;
pub mod algorithms;
pub mod iteration;
pub mod metrics;

// Re-export core types and traits
pub use algorithm::{
    progress, EdgeRoute, EdgeRouting, LayoutAlgorithm, LayoutContext, LayoutOutcome, LayoutState,
};
pub use error::{LayoutError, QualityError};
pub use geometry::{polyline_length, polyline_segments, Point, Rect, Segment, Vec2};
pub use iteration::{AbortHandle, CancelToken, IterationEvent, ObserverId, Observers};
pub use sizes::{uniform_sizes, NodeSizes, WithDefault};

// Re-export petgraph visitor traits for graph abstraction
pub use petgraph::visit::{EdgeRef, GraphBase, IntoEdgeReferences, IntoNodeIdentifiers};

// Re-export algorithm and metric types
pub use algorithms::{
    CircularLayout, CircularLayoutAlgorithm, ForceDirectedLayout, ForceDirectedLayoutAlgorithm,
    LayeredLayout, LayeredLayoutAlgorithm, Layers,
};
pub use metrics::{
    evaluate_layout, EdgeCrossingMetric, LayoutAreaMetric, LayoutResults, MetricCalculator,
    MetricInput, OverlapMetric, PositionsMetric,
};
