use crate::{LayoutError, Vec2};
use petgraph::visit::IntoNodeIdentifiers;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for providing node sizes during layout computation and evaluation
pub trait NodeSizes<N> {
    /// Get the size of a node, `None` when the provider has no entry for it
    fn size(&self, node: N) -> Option<Vec2>;

    /// Substitute `default` for every node this provider has no entry for
    fn with_default(self, default: Vec2) -> WithDefault<Self>
    where
        Self: Sized,
    {
        WithDefault {
            inner: self,
            default,
        }
    }
}

// Blanket implementation for closures
impl<N, F> NodeSizes<N> for F
where
    F: Fn(N) -> Vec2,
{
    fn size(&self, node: N) -> Option<Vec2> {
        Some(self(node))
    }
}

// Implementation for HashMap
impl<N: Eq + Hash + Copy> NodeSizes<N> for HashMap<N, Vec2> {
    fn size(&self, node: N) -> Option<Vec2> {
        self.get(&node).copied()
    }
}

/// Size provider falling back to a constant, see [`NodeSizes::with_default`]
#[derive(Debug, Clone)]
pub struct WithDefault<S> {
    inner: S,
    default: Vec2,
}

impl<N, S> NodeSizes<N> for WithDefault<S>
where
    S: NodeSizes<N>,
{
    fn size(&self, node: N) -> Option<Vec2> {
        Some(self.inner.size(node).unwrap_or(self.default))
    }
}

/// Build a size map giving every vertex the same size
pub fn uniform_sizes<N, I>(vertices: I, size: Vec2) -> HashMap<N, Vec2>
where
    N: Eq + Hash,
    I: IntoIterator<Item = N>,
{
    vertices.into_iter().map(|vertex| (vertex, size)).collect()
}

/// Resolve the size of every vertex of `graph`
///
/// # Errors
/// Fails on the first vertex without a size, or with a size that is not
/// finite and strictly positive.
pub(crate) fn require_sizes<G, S>(
    graph: G,
    sizes: &S,
) -> Result<HashMap<G::NodeId, Vec2>, LayoutError<G::NodeId>>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Copy + Eq + Hash + Debug,
    S: NodeSizes<G::NodeId>,
{
    graph
        .node_identifiers()
        .map(|node| match sizes.size(node) {
            None => Err(LayoutError::MissingSize(node)),
            Some(size) if !size.is_valid_size() => Err(LayoutError::InvalidSize { node, size }),
            Some(size) => Ok((node, size)),
        })
        .collect()
}
