use super::{MetricCalculator, MetricInput};
use crate::{polyline_length, polyline_segments, NodeSizes, Point, Rect};
use petgraph::visit::{EdgeRef, GraphBase, IntoEdgeReferences};
use std::hash::Hash;
use tracing::debug;

/// Placed geometry of one edge
struct EdgeShape<N> {
    source: N,
    target: N,
    points: Vec<Point>,
    bounds: Rect,
}

impl<N: Eq> EdgeShape<N> {
    fn shares_endpoint(&self, other: &Self) -> bool {
        self.source == other.source
            || self.source == other.target
            || self.target == other.source
            || self.target == other.target
    }

    /// Number of crossing segment pairs between two polylines
    fn crossings(&self, other: &Self) -> usize {
        if self.bounds.is_disjoint(&other.bounds) {
            return 0;
        }
        polyline_segments(&self.points)
            .map(|a| {
                polyline_segments(&other.points)
                    .filter(|b| a.crosses(b))
                    .count()
            })
            .sum()
    }
}

/// Counts edge crossings and computes edge length statistics
///
/// Edges are drawn along their route when one is given, otherwise as the
/// straight segment between their endpoints. Edges sharing an endpoint never
/// cross each other; routes are compared segment by segment.
///
/// Only intersections interior to both segments count: an edge passing
/// exactly through a bend point of another edge's route does not cross it.
pub struct EdgeCrossingMetric<'a, G, S>
where
    G: GraphBase,
{
    input: MetricInput<'a, G, S>,
    cross_count: usize,
    minimum_edge_length: f64,
    maximum_edge_length: f64,
    average_edge_length: f64,
}

impl<'a, G, S> EdgeCrossingMetric<'a, G, S>
where
    G: IntoEdgeReferences,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    pub fn new(input: MetricInput<'a, G, S>) -> Self {
        Self {
            input,
            cross_count: 0,
            minimum_edge_length: 0.0,
            maximum_edge_length: 0.0,
            average_edge_length: 0.0,
        }
    }

    pub fn cross_count(&self) -> usize {
        self.cross_count
    }

    pub fn minimum_edge_length(&self) -> f64 {
        self.minimum_edge_length
    }

    pub fn maximum_edge_length(&self) -> f64 {
        self.maximum_edge_length
    }

    pub fn average_edge_length(&self) -> f64 {
        self.average_edge_length
    }

    fn edge_shapes(&self) -> Vec<EdgeShape<G::NodeId>> {
        self.input
            .graph
            .edge_references()
            .filter_map(|edge| {
                let points = self.input.edge_geometry(&edge)?;
                let bounds = Rect::bounding(&points)?;
                Some(EdgeShape {
                    source: edge.source(),
                    target: edge.target(),
                    points,
                    bounds,
                })
            })
            .collect()
    }
}

impl<G, S> MetricCalculator for EdgeCrossingMetric<'_, G, S>
where
    G: IntoEdgeReferences,
    G::NodeId: Eq + Hash,
    G::EdgeId: Eq + Hash,
    S: NodeSizes<G::NodeId>,
{
    fn calculate(&mut self) {
        let shapes = self.edge_shapes();

        self.cross_count = 0;
        for (i, a) in shapes.iter().enumerate() {
            for b in &shapes[i + 1..] {
                if !a.shares_endpoint(b) {
                    self.cross_count += a.crossings(b);
                }
            }
        }

        let lengths: Vec<f64> = shapes.iter().map(|s| polyline_length(&s.points)).collect();
        if lengths.is_empty() {
            self.minimum_edge_length = 0.0;
            self.maximum_edge_length = 0.0;
            self.average_edge_length = 0.0;
        } else {
            self.minimum_edge_length = lengths.iter().copied().fold(f64::INFINITY, f64::min);
            self.maximum_edge_length = lengths.iter().copied().fold(0.0, f64::max);
            self.average_edge_length = lengths.iter().sum::<f64>() / lengths.len() as f64;
        }

        debug!(
            "{} edge crossings over {} edges, lengths min {} max {} avg {}",
            self.cross_count,
            lengths.len(),
            self.minimum_edge_length,
            self.maximum_edge_length,
            self.average_edge_length
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeRoute, Vec2};
    use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
    use std::collections::HashMap;
    use test_log::test;

    struct Fixture {
        graph: DiGraph<(), ()>,
        nodes: Vec<NodeIndex>,
        positions: HashMap<NodeIndex, Point>,
    }

    impl Fixture {
        fn new(points: &[(f64, f64)]) -> Self {
            let mut graph = DiGraph::new();
            let mut positions = HashMap::new();
            let nodes = points
                .iter()
                .map(|&(x, y)| {
                    let node = graph.add_node(());
                    positions.insert(node, Point::new(x, y));
                    node
                })
                .collect();
            Self {
                graph,
                nodes,
                positions,
            }
        }

        fn connect(&mut self, pairs: &[(usize, usize)]) -> Vec<EdgeIndex> {
            pairs
                .iter()
                .map(|&(s, t)| self.graph.add_edge(self.nodes[s], self.nodes[t], ()))
                .collect()
        }

        fn calculate(&self, routes: &HashMap<EdgeIndex, EdgeRoute>) -> (usize, f64, f64, f64) {
            let sizes = |_node| Vec2::new(1.0, 1.0);
            let mut metric = EdgeCrossingMetric::new(MetricInput::new(
                &self.graph,
                &self.positions,
                &sizes,
                routes,
            ));
            metric.calculate();
            (
                metric.cross_count(),
                metric.minimum_edge_length(),
                metric.maximum_edge_length(),
                metric.average_edge_length(),
            )
        }
    }

    fn square() -> Fixture {
        Fixture::new(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
    }

    #[test]
    fn square_cycle_has_no_crossing() {
        let mut square = square();
        square.connect(&[(0, 1), (1, 2), (2, 3), (3, 0)]);

        let (count, min, max, avg) = square.calculate(&HashMap::new());
        assert_eq!(count, 0);
        assert_eq!((min, max, avg), (10.0, 10.0, 10.0));
    }

    #[test]
    fn bowtie_cycle_crosses_once() {
        // 0 -> 2 and 1 -> 3 are the diagonals
        let mut bowtie = square();
        bowtie.connect(&[(0, 1), (1, 3), (3, 2), (2, 0)]);

        let (count, min, max, _) = bowtie.calculate(&HashMap::new());
        assert_eq!(count, 1);
        assert_eq!(min, 10.0);
        assert!((max - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn edges_sharing_an_endpoint_never_cross() {
        // Collinear and overlapping, but both start at vertex 0
        let mut fixture = Fixture::new(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        fixture.connect(&[(0, 1), (0, 2)]);

        let (count, ..) = fixture.calculate(&HashMap::new());
        assert_eq!(count, 0);
    }

    #[test]
    fn collinear_overlap_counts_once() {
        let mut fixture = Fixture::new(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.0), (15.0, 0.0)]);
        fixture.connect(&[(0, 1), (2, 3)]);

        let (count, ..) = fixture.calculate(&HashMap::new());
        assert_eq!(count, 1);
    }

    #[test]
    fn routes_replace_straight_segments() {
        let mut square = square();
        let edges = square.connect(&[(0, 2), (1, 3)]);
        assert_eq!(square.calculate(&HashMap::new()).0, 1);

        // Detour 0 -> 2 around the top-right corner
        let route = vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let routes = HashMap::from([(edges[0], route)]);
        let (count, min, max, _) = square.calculate(&routes);
        assert_eq!(count, 0);
        assert_eq!(max, 40.0);
        assert!((min - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn routes_are_tested_segment_by_segment() {
        let mut fixture = Fixture::new(&[(0.0, 0.0), (30.0, 0.0), (10.0, -10.0), (10.0, 10.0)]);
        let edges = fixture.connect(&[(0, 1), (2, 3)]);

        // Zigzag crossing the vertical edge x = 10 three times
        let route = vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 5.0),
            Point::new(0.0, 5.0),
            Point::new(30.0, 0.0),
        ];
        let routes = HashMap::from([(edges[0], route)]);
        let (count, ..) = fixture.calculate(&routes);
        assert_eq!(count, 3);
    }

    #[test]
    fn passing_through_a_bend_point_is_not_a_crossing() {
        let mut fixture = Fixture::new(&[(0.0, 0.0), (20.0, 0.0), (10.0, -10.0), (10.0, 10.0)]);
        let edges = fixture.connect(&[(0, 1), (2, 3)]);

        // Route of 0 -> 1 bends exactly on the straight edge 2 -> 3
        let route = vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0), Point::new(20.0, 0.0)];
        let routes = HashMap::from([(edges[0], route)]);
        let (count, ..) = fixture.calculate(&routes);
        assert_eq!(count, 0);
    }

    #[test]
    fn no_edges_report_zero_lengths() {
        let fixture = Fixture::new(&[(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(fixture.calculate(&HashMap::new()), (0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn edges_without_positions_are_skipped() {
        let mut fixture = Fixture::new(&[(0.0, 0.0), (10.0, 0.0)]);
        let lost = fixture.graph.add_node(());
        fixture.nodes.push(lost);
        fixture.connect(&[(0, 1), (0, 2)]);

        let (count, min, max, avg) = fixture.calculate(&HashMap::new());
        assert_eq!(count, 0);
        assert_eq!((min, max, avg), (10.0, 10.0, 10.0));
    }
}
