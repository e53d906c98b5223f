use crate::{Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Iterative coordinate assignment for layered nodes
///
/// Layers are laid out left to right as columns; inside a column nodes are
/// stacked vertically and pulled towards the barycenter of their successors.
/// Coordinates are tracked as top-left corners and exposed as centers.
pub(crate) struct CoordinateAssignment<'a, N> {
    layers: &'a [Vec<N>],
    graph: &'a DiGraphMap<N, ()>,
    sizes: &'a HashMap<N, Vec2>,
    margin: Vec2,
    corners: HashMap<N, Point>,
    /// Left edge and width of each layer's column
    columns: Vec<(f64, f64)>,
}

impl<'a, N> CoordinateAssignment<'a, N>
where
    N: Copy + Ord + Hash,
{
    /// Horizontal positioning and uniform initial vertical spacing
    pub(crate) fn new(
        layers: &'a [Vec<N>],
        graph: &'a DiGraphMap<N, ()>,
        sizes: &'a HashMap<N, Vec2>,
        margin: Vec2,
    ) -> Self {
        let mut assignment = Self {
            layers,
            graph,
            sizes,
            margin,
            corners: HashMap::new(),
            columns: Vec::with_capacity(layers.len()),
        };
        assignment.assign_horizontal_positions();
        assignment.initial_vertical_positioning();
        assignment
    }

    fn size(&self, node: N) -> Vec2 {
        self.sizes.get(&node).copied().unwrap_or_default()
    }

    fn corner(&self, node: N) -> Point {
        self.corners.get(&node).copied().unwrap_or_default()
    }

    /// Assign horizontal positions based on layers
    fn assign_horizontal_positions(&mut self) {
        let mut x = 0.0;
        for layer in self.layers {
            // Calculate the maximum width for the layer
            let layer_size = layer
                .iter()
                .map(|&node| self.size(node))
                .fold(Vec2::zero(), Vec2::max);

            for &node in layer {
                let node_size = self.size(node);
                self.corners
                    .insert(node, Point::new(x + (layer_size.x - node_size.x) / 2.0, 0.0));
            }
            self.columns.push((x, layer_size.x));
            x += layer_size.x + self.margin.x;
        }
    }

    /// Initial vertical positioning with uniform spacing
    fn initial_vertical_positioning(&mut self) {
        for layer in self.layers {
            let mut y = 0.0;
            for &node in layer {
                let height = self.size(node).y;
                if let Some(pos) = self.corners.get_mut(&node) {
                    pos.y = y;
                    y += self.margin.y + height;
                }
            }
        }
    }

    /// One barycenter pass over all layers, returns whether anything moved
    pub(crate) fn step(&mut self) -> bool {
        let layers = self.layers;
        let mut changed = false;

        for layer_idx in (0..layers.len().saturating_sub(1)).rev() {
            let layer = &layers[layer_idx];
            for &node in layer {
                let Some(new_y) = self.calculate_barycenter(node, &layers[layer_idx + 1])
                else {
                    continue;
                };

                let Some(pos) = self.corners.get_mut(&node) else {
                    continue;
                };

                if (new_y - pos.y).abs() > 0.1 {
                    pos.y = new_y;
                    changed = true;
                }
            }

            // Enforce minimum vertical distance between nodes
            let mut sorted_nodes: Vec<_> = layer.to_vec();
            sorted_nodes.sort_by(|&a, &b| {
                self.corner(a)
                    .y
                    .partial_cmp(&self.corner(b).y)
                    .unwrap_or(Ordering::Equal)
            });

            for pair in sorted_nodes.windows(2) {
                let (prev_node, curr_node) = (pair[0], pair[1]);
                let prev_bottom = self.corner(prev_node).y + self.size(prev_node).y;
                let min_top = prev_bottom + self.margin.y;
                let Some(curr) = self.corners.get_mut(&curr_node) else {
                    continue;
                };

                if curr.y < min_top {
                    curr.y = min_top;
                    changed = true;
                }
            }
        }

        changed
    }

    /// Calculate the barycenter (average position) of connected nodes
    fn calculate_barycenter(&self, node: N, next_layer: &[N]) -> Option<f64> {
        let mut sum_y = 0.0;
        let mut count = 0;

        for &next_node in next_layer {
            if self.graph.contains_edge(node, next_node) {
                if let Some(pos) = self.corners.get(&next_node) {
                    sum_y += pos.y + self.size(next_node).y / 2.0;
                    count += 1;
                }
            }
        }

        if count > 0 {
            Some((sum_y / count as f64) - self.size(node).y / 2.0)
        } else {
            None
        }
    }

    /// Normalize vertical positions to start from y=0
    pub(crate) fn normalize(&mut self) {
        let min_y = self
            .corners
            .values()
            .map(|pos| pos.y)
            .fold(f64::INFINITY, f64::min);
        if !min_y.is_finite() {
            return;
        }

        for pos in self.corners.values_mut() {
            pos.y -= min_y;
        }
    }

    /// Center of every node's box
    pub(crate) fn centers(&self) -> impl Iterator<Item = (N, Point)> + '_ {
        self.corners
            .iter()
            .map(|(&node, &corner)| (node, corner + self.size(node).scale(0.5)))
    }

    /// Left and right edges of the column of a layer
    pub(crate) fn column_bounds(&self, layer: usize) -> (f64, f64) {
        self.columns
            .get(layer)
            .map(|&(left, width)| (left, left + width))
            .unwrap_or_default()
    }
}
