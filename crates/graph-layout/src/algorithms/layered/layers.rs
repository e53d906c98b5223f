use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{EdgeRef, IntoEdgeReferences, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;

/// Copy `graph` into a DAG
///
/// A depth-first search reverses every back edge, which breaks all cycles.
/// Self loops are dropped and parallel edges merged. Returns the DAG and the
/// number of reversed edges.
pub(crate) fn acyclic_graph<G>(graph: G) -> (DiGraphMap<G::NodeId, ()>, usize)
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Ord + Hash,
{
    let mut successors: HashMap<G::NodeId, Vec<G::NodeId>> = HashMap::new();
    for edge in graph.edge_references() {
        if edge.source() != edge.target() {
            successors.entry(edge.source()).or_default().push(edge.target());
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        OnStack,
        Done,
    }

    let mut dag = DiGraphMap::new();
    let mut marks: HashMap<G::NodeId, Mark> = HashMap::new();
    let mut reversed = 0;
    let no_successors = Vec::new();

    for root in graph.node_identifiers() {
        dag.add_node(root);
        if marks.contains_key(&root) {
            continue;
        }

        // Explicit stack of (node, index of the next successor to visit)
        marks.insert(root, Mark::OnStack);
        let mut stack = vec![(root, 0)];
        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let succs = successors.get(&node).unwrap_or(&no_successors);
            let Some(&succ) = succs.get(*next) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            *next += 1;

            match marks.get(&succ) {
                Some(Mark::OnStack) => {
                    dag.add_edge(succ, node, ());
                    reversed += 1;
                }
                Some(Mark::Done) => {
                    dag.add_edge(node, succ, ());
                }
                None => {
                    dag.add_edge(node, succ, ());
                    marks.insert(succ, Mark::OnStack);
                    stack.push((succ, 0));
                }
            }
        }
    }

    (dag, reversed)
}

/// Assign layers to nodes based on topological order
///
/// Uses a two-pass approach to minimize edge lengths:
/// - First pass: assign each node to the layer after its predecessors
/// - Second pass: move nodes closer to their successors when possible
///
/// Nodes inside a layer are sorted, so the result is deterministic.
pub(crate) fn assign_layers<N>(graph: &DiGraphMap<N, ()>) -> Vec<Vec<N>>
where
    N: Copy + Ord + Hash,
{
    // The graph is acyclic, the fallback order is never used in practice
    let topo_order = toposort(graph, None).unwrap_or_else(|_| graph.nodes().collect());
    let mut layer_map: HashMap<N, usize> = HashMap::new();

    // First pass: forward, assign each node to layer after its predecessors
    for &node in &topo_order {
        let max_pred_layer = graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| layer_map.get(&pred).unwrap_or(&0) + 1)
            .max()
            .unwrap_or(0);
        layer_map.insert(node, max_pred_layer);
    }

    // Second pass: backward, move nodes closer to their successors
    for &node in topo_order.iter().rev() {
        let layer = *layer_map.get(&node).unwrap_or(&0);
        let min_succ_layer = graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|succ| *layer_map.get(&succ).unwrap_or(&0))
            .min()
            .unwrap_or(0);

        if min_succ_layer > layer + 1 {
            layer_map.insert(node, min_succ_layer - 1);
        }
    }

    let Some(&max_layer) = layer_map.values().max() else {
        return Vec::new();
    };

    // Group nodes by layer
    let mut layers = vec![Vec::new(); max_layer + 1];
    for (node, &layer) in &layer_map {
        layers[layer].push(*node);
    }
    for layer in &mut layers {
        layer.sort();
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::is_cyclic_directed;
    use test_log::test;

    #[test]
    fn chain_gets_one_layer_per_node() {
        let graph = DiGraphMap::<u32, ()>::from_edges([(1, 2), (2, 3)]);
        let (dag, reversed) = acyclic_graph(&graph);
        assert_eq!(reversed, 0);
        assert_eq!(assign_layers(&dag), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn cycles_are_broken() {
        let graph = DiGraphMap::<u32, ()>::from_edges([(1, 2), (2, 3), (3, 1), (3, 3)]);
        let (dag, reversed) = acyclic_graph(&graph);
        assert_eq!(reversed, 1);
        assert!(!is_cyclic_directed(&dag));
        assert_eq!(dag.node_count(), 3);

        let layers = assign_layers(&dag);
        assert_eq!(layers.iter().map(Vec::len).sum::<usize>(), 3);
    }

    #[test]
    fn sources_move_next_to_their_successors() {
        // 4 only feeds 3, so it belongs to the layer right before 3
        let graph = DiGraphMap::<u32, ()>::from_edges([(1, 2), (2, 3), (4, 3)]);
        let (dag, _) = acyclic_graph(&graph);
        assert_eq!(assign_layers(&dag), vec![vec![1], vec![2, 4], vec![3]]);
    }

    #[test]
    fn empty_graph_has_no_layers() {
        let graph = DiGraphMap::<u32, ()>::new();
        let (dag, _) = acyclic_graph(&graph);
        assert!(assign_layers(&dag).is_empty());
    }
}
