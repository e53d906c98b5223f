use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use graphshape_layout::{
    evaluate_layout, CancelToken, CircularLayout, CircularLayoutAlgorithm, ForceDirectedLayout,
    ForceDirectedLayoutAlgorithm, IntoEdgeReferences, IntoNodeIdentifiers, LayeredLayout,
    LayeredLayoutAlgorithm, LayoutAlgorithm, LayoutOutcome, LayoutResults, Vec2,
};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Layered,
    Circular,
    Force,
}

/// Lay out a generated graph and print its quality metrics
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Algorithm::Layered)]
    algorithm: Algorithm,

    /// Number of vertices of the generated graph
    #[arg(short, long, default_value_t = 50)]
    vertices: usize,

    /// Extra edges per vertex on top of the spanning chain
    #[arg(short, long, default_value_t = 1)]
    density: usize,

    /// Simulation steps of the force-directed layout
    #[arg(short, long, default_value_t = 100)]
    iterations: usize,

    /// Abort the layout once this iteration has been reported
    #[arg(long)]
    abort_after: Option<usize>,

    /// Cancel the layout after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Fail when the layout has more edge crossings than this
    #[arg(long)]
    max_crossings: Option<usize>,

    /// Width and height of every vertex box
    #[arg(long, default_value_t = 40.0)]
    vertex_size: f64,
}

/// Deterministic connected digraph: a chain plus `density` forward skips per
/// vertex
fn generate_graph(vertices: usize, density: usize) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(vertices, vertices * (density + 1));
    let nodes: Vec<_> = (0..vertices).map(|_| graph.add_node(())).collect();

    for (i, &node) in nodes.iter().enumerate() {
        if i + 1 < vertices {
            graph.add_edge(node, nodes[i + 1], ());
        }
        for k in 1..=density {
            let target = i + 2 + (i * 7 + k * 13) % 5;
            if target < vertices {
                graph.update_edge(node, nodes[target], ());
            }
        }
    }
    graph
}

fn run<A>(mut algorithm: A, args: &Args, size: Vec2) -> Result<(LayoutOutcome, LayoutResults)>
where
    A: LayoutAlgorithm<NodeId = NodeIndex, EdgeId = EdgeIndex>,
    A::Graph: IntoNodeIdentifiers + IntoEdgeReferences,
    A::VertexInfo: 'static,
    A::EdgeInfo: 'static,
{
    let abort_after = args.abort_after;
    algorithm.observers_mut().subscribe(move |event| {
        debug!(
            "#{} {:5.1}% {}",
            event.iteration(),
            event.status_in_percent(),
            event.message()
        );
        if abort_after.is_some_and(|last| event.iteration() >= last) {
            info!("Aborting at iteration {}", event.iteration());
            event.abort();
        }
    });

    let start = Instant::now();
    let outcome = algorithm.compute()?;
    info!("Layout {outcome:?} in {:?}", start.elapsed());

    let results = evaluate_layout(&algorithm, &|_node| size);
    Ok((outcome, results))
}

fn print_results(results: &LayoutResults) {
    println!("positions set:       {}", results.positions_set);
    println!("overlapping pairs:   {}", results.overlap_count);
    println!("overlapped area:     {:.2}", results.overlapped_area);
    println!(
        "bounds:              ({:.2}, {:.2}) - ({:.2}, {:.2})",
        results.top_left.x, results.top_left.y, results.bottom_right.x, results.bottom_right.y
    );
    println!("area:                {:.2}", results.area);
    println!("aspect ratio:        {:.3}", results.ratio);
    println!("edge crossings:      {}", results.cross_count);
    println!(
        "edge length:         min {:.2}, max {:.2}, avg {:.2}",
        results.minimum_edge_length, results.maximum_edge_length, results.average_edge_length
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let size = Vec2::new(args.vertex_size, args.vertex_size);
    let graph = generate_graph(args.vertices, args.density);
    info!(
        "Generated graph with {} vertices and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let token = CancelToken::new();
    if let Some(timeout) = args.timeout_ms {
        let token = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(timeout));
            warn!("Layout timed out after {timeout}ms");
            token.abort();
        });
    }

    let sizes = move |_node| size;
    let (outcome, results) = match args.algorithm {
        Algorithm::Layered => run(
            LayeredLayoutAlgorithm::new(&graph, sizes, LayeredLayout::default())
                .with_cancel_token(token),
            &args,
            size,
        )?,
        Algorithm::Circular => run(
            CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default())
                .with_cancel_token(token),
            &args,
            size,
        )?,
        Algorithm::Force => run(
            ForceDirectedLayoutAlgorithm::new(
                &graph,
                sizes,
                ForceDirectedLayout {
                    iterations: args.iterations,
                    ..Default::default()
                },
            )
            .with_cancel_token(token),
            &args,
            size,
        )?,
    };

    println!("outcome:             {outcome:?}");
    print_results(&results);

    if let Some(max_crossings) = args.max_crossings {
        if let Err(e) = results.check(max_crossings) {
            bail!("layout rejected: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn args(algorithm: Algorithm) -> Args {
        let name = format!("{algorithm:?}").to_lowercase();
        Args::parse_from(["graphshape-bench", "--algorithm", name.as_str()])
    }

    #[test]
    fn generated_graph_is_deterministic() {
        let a = generate_graph(30, 2);
        let b = generate_graph(30, 2);
        assert_eq!(a.node_count(), 30);
        assert!(a.edge_count() >= 29);
        assert_eq!(
            a.raw_edges().iter().map(|e| (e.source(), e.target())).collect::<Vec<_>>(),
            b.raw_edges().iter().map(|e| (e.source(), e.target())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn every_algorithm_completes() {
        let graph = generate_graph(12, 1);
        let size = Vec2::new(20.0, 20.0);
        let sizes = move |_node| size;

        let (outcome, results) = run(
            LayeredLayoutAlgorithm::new(&graph, sizes, LayeredLayout::default()),
            &args(Algorithm::Layered),
            size,
        )
        .unwrap();
        assert_eq!(outcome, LayoutOutcome::Completed);
        assert!(results.positions_set);

        let (outcome, results) = run(
            CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default()),
            &args(Algorithm::Circular),
            size,
        )
        .unwrap();
        assert_eq!(outcome, LayoutOutcome::Completed);
        assert_eq!(results.overlap_count, 0);
    }

    #[test]
    fn abort_after_stops_the_layout() {
        let graph = generate_graph(10, 1);
        let size = Vec2::new(20.0, 20.0);
        let args = Args::parse_from(["graphshape-bench", "--algorithm", "force", "--abort-after", "4"]);

        let (outcome, _) = run(
            ForceDirectedLayoutAlgorithm::new(&graph, move |_node| size, ForceDirectedLayout::default()),
            &args,
            size,
        )
        .unwrap();
        assert_eq!(outcome, LayoutOutcome::Aborted { iteration: 4 });
    }
}
