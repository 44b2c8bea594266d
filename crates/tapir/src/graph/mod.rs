use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod adjacency;

pub use adjacency::{AdjacencyView, Connection};

/// Graph description as supplied by callers: fractional `[0,1]` coordinates and id pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl GraphInput {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A simulated node in pixel space.
///
/// `fx`/`fy` accumulate the velocity deltas produced by the forces during one tick and are
/// cleared by the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    fx: f64,
    fy: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: 0.0,
            fy: 0.0,
        }
    }

    pub fn add_force(&mut self, dx: f64, dy: f64) {
        self.fx += dx;
        self.fy += dy;
    }

    /// Force accumulated since the last integrator step.
    pub fn force(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }

    pub(crate) fn take_force(&mut self) -> (f64, f64) {
        let f = (self.fx, self.fy);
        self.fx = 0.0;
        self.fy = 0.0;
        f
    }
}

/// An edge resolved to node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Per-node degree over `edges`; self-loops are not counted.
pub fn edge_degrees(edges: &[Edge], node_count: usize) -> Vec<usize> {
    let mut degree = vec![0usize; node_count];
    for e in edges.iter().filter(|e| !e.is_self_loop()) {
        degree[e.source] += 1;
        degree[e.target] += 1;
    }
    degree
}

/// Validated graph model: nodes in input order, edges resolved to indices.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: FxHashMap<String, usize>,
    adjacency: AdjacencyView,
}

impl Graph {
    /// Validates `input` and scales its fractional coordinates to a `width` x `height` canvas.
    pub fn build(input: &GraphInput, width: f64, height: f64) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::with_capacity(input.nodes.len());
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        index.reserve(input.nodes.len());

        for (idx, n) in input.nodes.iter().enumerate() {
            if !(n.x.is_finite() && n.y.is_finite()) {
                return Err(Error::NonFiniteCoordinate {
                    id: n.id.clone(),
                    x: n.x,
                    y: n.y,
                });
            }
            if index.insert(n.id.clone(), idx).is_some() {
                return Err(Error::DuplicateNode { id: n.id.clone() });
            }
            nodes.push(Node::new(n.id.clone(), n.x * width, n.y * height));
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(input.edges.len());
        for (source, target) in &input.edges {
            let resolve = |id: &String| {
                index
                    .get(id.as_str())
                    .copied()
                    .ok_or_else(|| Error::MissingEndpoint {
                        from: source.clone(),
                        to: target.clone(),
                        missing: id.clone(),
                    })
            };
            let s = resolve(source)?;
            let t = resolve(target)?;
            edges.push(Edge {
                source: s,
                target: t,
            });
        }

        let adjacency = AdjacencyView::from_pairs(
            input
                .edges
                .iter()
                .map(|(s, t)| (s.as_str(), t.as_str())),
        );

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "graph model loaded"
        );

        Ok(Self {
            nodes,
            edges,
            index,
            adjacency,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn adjacency(&self) -> &AdjacencyView {
        &self.adjacency
    }

    /// Number of non-self-loop edges touching each node.
    pub fn degrees(&self) -> Vec<usize> {
        edge_degrees(&self.edges, self.nodes.len())
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::{Graph, GraphInput, NodeInput};
    use crate::error::Error;

    fn input(nodes: &[(&str, f64, f64)], edges: &[(&str, &str)]) -> GraphInput {
        GraphInput {
            nodes: nodes
                .iter()
                .map(|&(id, x, y)| NodeInput {
                    id: id.to_string(),
                    x,
                    y,
                })
                .collect(),
            edges: edges
                .iter()
                .map(|&(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }

    #[test]
    fn coordinates_are_scaled_to_pixels() {
        let g = Graph::build(&input(&[("a", 0.5, 0.25)], &[]), 800.0, 700.0).expect("graph");
        assert_eq!(g.nodes()[0].x, 400.0);
        assert_eq!(g.nodes()[0].y, 175.0);
        assert_eq!(g.nodes()[0].vx, 0.0);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = Graph::build(
            &input(&[("X", 0.1, 0.1)], &[("X", "Y")]),
            800.0,
            700.0,
        )
        .unwrap_err();
        match err {
            Error::MissingEndpoint { ref missing, .. } => assert_eq!(missing, "Y"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_validation());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Graph::build(
            &input(&[("a", 0.1, 0.1), ("a", 0.2, 0.2)], &[]),
            800.0,
            700.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateNode { ref id } if id == "a"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let err = Graph::build(&input(&[("a", f64::NAN, 0.1)], &[]), 800.0, 700.0).unwrap_err();
        assert!(matches!(err, Error::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn edges_resolve_to_input_indices() {
        let g = Graph::build(
            &input(
                &[("a", 0.1, 0.1), ("b", 0.2, 0.2), ("c", 0.3, 0.3)],
                &[("c", "a"), ("a", "b")],
            ),
            100.0,
            100.0,
        )
        .expect("graph");
        assert_eq!(g.edges()[0].source, 2);
        assert_eq!(g.edges()[0].target, 0);
        assert_eq!(g.index_of("b"), Some(1));
        assert_eq!(g.degrees(), vec![2, 1, 1]);
    }

    #[test]
    fn self_loops_do_not_count_toward_degree() {
        let g = Graph::build(
            &input(&[("a", 0.1, 0.1), ("b", 0.2, 0.2)], &[("a", "a"), ("a", "b")]),
            100.0,
            100.0,
        )
        .expect("graph");
        assert_eq!(g.degrees(), vec![1, 1]);
        assert!(g.adjacency().neighbors("a").unwrap().contains("a"));
    }

    #[test]
    fn input_parses_edge_pairs_from_json() {
        let g = GraphInput::from_json(
            r#"{ "nodes": [{ "id": "a", "x": 0.1, "y": 0.2 }], "edges": [["a", "a"]] }"#,
        )
        .expect("json");
        assert_eq!(g.edges, vec![("a".to_string(), "a".to_string())]);
    }
}
