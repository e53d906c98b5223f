use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;

/// Minimize edge crossings by swapping adjacent nodes in layers
///
/// Uses a greedy local search approach with multiple iterations. `on_sweep`
/// is called after every sweep over all layers with the sweep number and the
/// current crossing count, and may stop the search.
pub(crate) fn minimize_crossings<N, F>(
    graph: &DiGraphMap<N, ()>,
    mut layers: Vec<Vec<N>>,
    max_iterations: usize,
    mut on_sweep: F,
) -> ControlFlow<usize, (Vec<Vec<N>>, usize)>
where
    N: Copy + Ord + Hash,
    F: FnMut(usize, usize) -> ControlFlow<usize>,
{
    for sweep in 0..max_iterations {
        let mut improved = false;

        for layer_index in 0..layers.len() {
            let layer_len = layers[layer_index].len();
            for i in 0..layer_len.saturating_sub(1) {
                let crossings_before = crossings_around(graph, &layers, layer_index);
                layers[layer_index].swap(i, i + 1);
                let crossings_after = crossings_around(graph, &layers, layer_index);

                if crossings_after > crossings_before
                    || (crossings_after == crossings_before
                        && layers[layer_index][i] > layers[layer_index][i + 1])
                {
                    // Swap back if no improvement
                    layers[layer_index].swap(i, i + 1);
                } else {
                    improved = true;
                }
            }
        }

        on_sweep(sweep + 1, count_crossings(graph, &layers))?;

        if !improved {
            break;
        }
    }

    let crossings = count_crossings(graph, &layers);
    ControlFlow::Continue((layers, crossings))
}

/// Count the number of edge crossings between consecutive layers
pub(crate) fn count_crossings<N>(graph: &DiGraphMap<N, ()>, layers: &[Vec<N>]) -> usize
where
    N: Copy + Ord + Hash,
{
    layers
        .windows(2)
        .map(|pair| count_crossings_between(graph, &pair[0], &pair[1]))
        .sum()
}

/// Crossings on both sides of one layer, the only ones a swap inside it changes
fn crossings_around<N>(graph: &DiGraphMap<N, ()>, layers: &[Vec<N>], layer_index: usize) -> usize
where
    N: Copy + Ord + Hash,
{
    let above = match layer_index.checked_sub(1) {
        Some(prev) => count_crossings_between(graph, &layers[prev], &layers[layer_index]),
        None => 0,
    };
    let below = match layers.get(layer_index + 1) {
        Some(next) => count_crossings_between(graph, &layers[layer_index], next),
        None => 0,
    };
    above + below
}

fn count_crossings_between<N>(graph: &DiGraphMap<N, ()>, upper: &[N], lower: &[N]) -> usize
where
    N: Copy + Ord + Hash,
{
    let lower_index: HashMap<N, usize> = lower.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    // (upper position, lower position) of every edge between the two layers
    let edges: Vec<(usize, usize)> = upper
        .iter()
        .enumerate()
        .flat_map(|(i, &node)| {
            graph
                .neighbors_directed(node, Direction::Outgoing)
                .filter_map(|target| lower_index.get(&target).map(|&j| (i, j)))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut crossings = 0;
    for (k, &(u1, l1)) in edges.iter().enumerate() {
        for &(u2, l2) in &edges[k + 1..] {
            if u1 != u2 && l1 != l2 && (u1 < u2) != (l1 < l2) {
                crossings += 1;
            }
        }
    }

    crossings
}
