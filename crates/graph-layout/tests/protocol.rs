use graphshape_layout::{
    CancelToken, CircularLayout, CircularLayoutAlgorithm, ForceDirectedLayout,
    ForceDirectedLayoutAlgorithm, IterationEvent, LayeredLayout, LayeredLayoutAlgorithm,
    LayoutAlgorithm, LayoutError, LayoutOutcome, LayoutState, Vec2,
};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::sync::{Arc, Mutex};
use test_log::test;

type Graph = DiGraph<(), ()>;
type Event = IterationEvent<NodeIndex, EdgeIndex>;

/// Ladder of `rungs` squares with a few diagonals
fn sample_graph(rungs: usize) -> Graph {
    let mut graph = Graph::new();
    let top: Vec<_> = (0..rungs).map(|_| graph.add_node(())).collect();
    let bottom: Vec<_> = (0..rungs).map(|_| graph.add_node(())).collect();
    for i in 0..rungs {
        graph.add_edge(top[i], bottom[i], ());
        if i + 1 < rungs {
            graph.add_edge(top[i], top[i + 1], ());
            graph.add_edge(bottom[i], bottom[i + 1], ());
        }
        if i % 3 == 0 && i + 2 < rungs {
            graph.add_edge(top[i], bottom[i + 2], ());
        }
    }
    graph
}

fn sizes(_node: NodeIndex) -> Vec2 {
    Vec2::new(20.0, 10.0)
}

/// Record every event, stripped of its auxiliary information
fn record<A>(algorithm: &mut A) -> Arc<Mutex<Vec<Event>>>
where
    A: LayoutAlgorithm<NodeId = NodeIndex, EdgeId = EdgeIndex>,
    A::VertexInfo: Clone + 'static,
    A::EdgeInfo: Clone + 'static,
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    algorithm.observers_mut().subscribe(move |event| {
        sink.lock().unwrap().push(event.clone().into_base());
    });
    events
}

fn assert_complete_run(events: &[Event]) {
    assert!(!events.is_empty());
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.iteration(), i, "iterations are numbered from 0");
    }
    for pair in events.windows(2) {
        assert!(pair[0].status_in_percent() <= pair[1].status_in_percent());
    }
    assert_eq!(events.last().unwrap().status_in_percent(), 100.0);
}

fn run_to_completion<A>(mut algorithm: A, vertex_count: usize)
where
    A: LayoutAlgorithm<NodeId = NodeIndex, EdgeId = EdgeIndex>,
    A::VertexInfo: Clone + 'static,
    A::EdgeInfo: Clone + 'static,
{
    let events = record(&mut algorithm);
    assert_eq!(algorithm.compute(), Ok(LayoutOutcome::Completed));
    assert_eq!(algorithm.state(), LayoutState::Completed);
    assert_complete_run(&events.lock().unwrap());

    let last = events.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.positions().len(), vertex_count);
    assert_eq!(last.positions(), algorithm.positions());
}

#[test]
fn layered_progress_is_monotonic() {
    let graph = sample_graph(6);
    let layout = LayeredLayoutAlgorithm::new(&graph, sizes, LayeredLayout::default());
    run_to_completion(layout, graph.node_count());
}

#[test]
fn circular_progress_is_monotonic() {
    let graph = sample_graph(6);
    let layout = CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default());
    run_to_completion(layout, graph.node_count());
}

#[test]
fn force_directed_progress_is_monotonic() {
    let graph = sample_graph(6);
    let layout = ForceDirectedLayoutAlgorithm::new(
        &graph,
        sizes,
        ForceDirectedLayout {
            iterations: 20,
            ..Default::default()
        },
    );
    run_to_completion(layout, graph.node_count());
}

#[test]
fn abort_on_third_iteration_of_fifty() {
    let graph = sample_graph(4);
    let mut layout = ForceDirectedLayoutAlgorithm::new(
        &graph,
        sizes,
        ForceDirectedLayout {
            iterations: 50,
            ..Default::default()
        },
    );

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    layout.observers_mut().subscribe(move |event| {
        sink.lock()
            .unwrap()
            .push((event.iteration(), event.status_in_percent()));
        if event.iteration() == 3 {
            event.abort();
        }
    });

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 3 }));
    assert_eq!(layout.state(), LayoutState::Aborted);

    let delivered = delivered.lock().unwrap();
    let &(iteration, percent) = delivered.last().unwrap();
    assert_eq!(iteration, 3);
    assert!(percent < 100.0);
    assert_eq!(delivered.len(), 4);

    // The partial layout stays readable
    assert_eq!(layout.positions().len(), graph.node_count());
}

#[test]
fn abort_on_last_planned_step_stays_below_completion() {
    let mut graph = Graph::new();
    (0..3).for_each(|_| {
        graph.add_node(());
    });
    let mut layout = CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default());

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    layout.observers_mut().subscribe(move |event| {
        sink.lock().unwrap().push(event.status_in_percent());
        // Iteration 3 places the last vertex
        if event.iteration() == 3 {
            event.abort();
        }
    });

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 3 }));
    assert_eq!(layout.state(), LayoutState::Aborted);
    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 4);
    assert!(delivered.iter().all(|&percent| percent < 100.0));
}

#[test]
fn abort_is_seen_by_later_observers() {
    let graph = sample_graph(3);
    let mut layout = CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    layout.observers_mut().subscribe(|event| {
        if event.iteration() == 1 {
            event.abort();
        }
    });
    let sink = seen.clone();
    layout.observers_mut().subscribe(move |event| {
        sink.lock().unwrap().push((event.iteration(), event.is_aborted()));
    });

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 1 }));
    assert_eq!(*seen.lock().unwrap(), vec![(0, false), (1, true)]);
}

#[test]
fn abort_handle_can_be_set_from_another_thread() {
    let graph = sample_graph(5);
    let mut layout = ForceDirectedLayoutAlgorithm::new(
        &graph,
        sizes,
        ForceDirectedLayout {
            iterations: 50,
            ..Default::default()
        },
    );

    layout.observers_mut().subscribe(|event| {
        if event.iteration() == 2 {
            let handle = event.abort_handle().clone();
            std::thread::spawn(move || handle.abort()).join().unwrap();
        }
    });

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 2 }));
}

#[test]
fn cancel_token_stops_the_run() {
    let graph = sample_graph(5);
    let token = CancelToken::new();
    let mut layout =
        LayeredLayoutAlgorithm::new(&graph, sizes, LayeredLayout::default())
            .with_cancel_token(token.clone());

    let trigger = token.clone();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    layout.observers_mut().subscribe(move |event| {
        sink.lock().unwrap().push(event.iteration());
        if event.iteration() == 1 {
            trigger.abort();
        }
    });

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 1 }));
    assert_eq!(*events.lock().unwrap(), vec![0, 1]);
    assert!(token.is_aborted());
}

#[test]
fn cancel_token_set_before_compute_stops_after_first_iteration() {
    let graph = sample_graph(3);
    let token = CancelToken::new();
    token.abort();
    let mut layout =
        CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default()).with_cancel_token(token);

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Aborted { iteration: 0 }));
}

#[test]
fn compute_runs_once() {
    let graph = sample_graph(3);
    let mut layout = CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default());
    let events = record(&mut layout);

    layout.compute().unwrap();
    let positions = layout.positions().clone();
    let count = events.lock().unwrap().len();

    assert_eq!(
        layout.compute(),
        Err(LayoutError::AlreadyComputed(LayoutState::Completed))
    );
    assert_eq!(layout.positions(), &positions);
    assert_eq!(events.lock().unwrap().len(), count);
}

#[test]
fn unsubscribed_observer_is_not_called() {
    let graph = sample_graph(3);
    let mut layout = CircularLayoutAlgorithm::new(&graph, sizes, CircularLayout::default());
    let events = record(&mut layout);
    let aborter = layout.observers_mut().subscribe(|event| event.abort());

    assert!(layout.observers_mut().unsubscribe(aborter));
    assert!(!layout.observers_mut().unsubscribe(aborter));
    assert_eq!(layout.compute(), Ok(LayoutOutcome::Completed));
    assert_complete_run(&events.lock().unwrap());
}

#[test]
fn empty_graph_completes() {
    let graph = Graph::new();
    let mut layout = ForceDirectedLayoutAlgorithm::new(&graph, sizes, ForceDirectedLayout::default());
    let events = record(&mut layout);

    assert_eq!(layout.compute(), Ok(LayoutOutcome::Completed));
    assert!(layout.positions().is_empty());
    assert_complete_run(&events.lock().unwrap());
}

#[test]
fn independent_instances_run_on_separate_threads() {
    let graphs: Vec<Graph> = (3..7).map(sample_graph).collect();

    std::thread::scope(|scope| {
        for graph in &graphs {
            scope.spawn(move || {
                let mut layout = ForceDirectedLayoutAlgorithm::new(
                    graph,
                    sizes,
                    ForceDirectedLayout {
                        iterations: 10,
                        ..Default::default()
                    },
                );
                let events = record(&mut layout);
                assert_eq!(layout.compute(), Ok(LayoutOutcome::Completed));
                assert_complete_run(&events.lock().unwrap());
                assert_eq!(layout.positions().len(), graph.node_count());
            });
        }
    });
}
