//! Property-based tests for whole layout runs.

use proptest::prelude::*;

use tapir::{GraphInput, LayoutConfig, NodeInput, Session, layout};

fn coordinate() -> impl Strategy<Value = f64> {
    // Slightly outside the unit square too: starts are clamped, never rejected.
    prop_oneof![
        Just(0.0),
        Just(0.5),
        Just(1.0),
        (-20i32..=120).prop_map(|v| v as f64 / 100.0),
    ]
}

fn graph_strategy() -> impl Strategy<Value = GraphInput> {
    (1usize..12)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((coordinate(), coordinate()), n),
                prop::collection::vec((0..n, 0..n), 0..(2 * n)),
            )
        })
        .prop_map(|(coords, pairs)| GraphInput {
            nodes: coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| NodeInput {
                    id: format!("n{i}"),
                    x,
                    y,
                })
                .collect(),
            edges: pairs
                .into_iter()
                .map(|(a, b)| (format!("n{a}"), format!("n{b}")))
                .collect(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn output_is_in_the_unit_square_and_in_input_order(graph in graph_strategy()) {
        let out = layout(&graph, &LayoutConfig::default()).unwrap();
        prop_assert_eq!(out.len(), graph.nodes.len());
        for (p, n) in out.iter().zip(&graph.nodes) {
            prop_assert_eq!(&p.id, &n.id);
            prop_assert!((0.0..=1.0).contains(&p.x), "x out of range: {}", p.x);
            prop_assert!((0.0..=1.0).contains(&p.y), "y out of range: {}", p.y);
            prop_assert_eq!((p.x * 10_000.0).round() / 10_000.0, p.x);
        }
    }

    #[test]
    fn layouts_are_deterministic(graph in graph_strategy()) {
        let cfg = LayoutConfig::default();
        prop_assert_eq!(layout(&graph, &cfg).unwrap(), layout(&graph, &cfg).unwrap());
    }

    #[test]
    fn positions_stay_finite_and_inside_the_margins(graph in graph_strategy()) {
        let cfg = LayoutConfig::default();
        let mut session = Session::start(&graph, &cfg, ()).unwrap();
        while session.state().is_running() {
            session.tick();
            for n in session.simulation().nodes() {
                prop_assert!(n.x.is_finite() && n.y.is_finite());
                prop_assert!(n.x >= cfg.boundary_margin && n.x <= cfg.width - cfg.boundary_margin);
                prop_assert!(n.y >= cfg.boundary_margin && n.y <= cfg.height - cfg.boundary_margin);
            }
        }
    }
}
