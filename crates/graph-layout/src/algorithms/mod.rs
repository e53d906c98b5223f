//! Layout strategies built on the [`LayoutAlgorithm`](crate::LayoutAlgorithm)
//! contract
//!
//! - [`LayeredLayoutAlgorithm`]: Sugiyama-style layered layout, with edge routing
//! - [`CircularLayoutAlgorithm`]: vertices evenly spread on a circle
//! - [`ForceDirectedLayoutAlgorithm`]: Fruchterman-Reingold spring embedder

pub mod circular;
pub mod force;
pub mod layered;

pub use circular::{CircularLayout, CircularLayoutAlgorithm};
pub use force::{ForceDirectedLayout, ForceDirectedLayoutAlgorithm};
pub use layered::{LayeredLayout, LayeredLayoutAlgorithm, Layers};
