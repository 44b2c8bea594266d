use crate::config::LayoutConfig;
use crate::graph::{Edge, Graph, Node, edge_degrees};

use super::{EPSILON, Force, separation_hint};

/// A resolved edge with its spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub rest_distance: f64,
    pub strength: f64,
    /// Share of each correction taken by the target: `deg(source) / (deg(source) + deg(target))`.
    /// The better-connected endpoint moves less.
    pub bias: f64,
}

/// Spring force pulling (or pushing) linked nodes towards their rest distance.
#[derive(Debug, Clone, Default)]
pub struct LinkForce {
    links: Vec<Link>,
}

impl LinkForce {
    /// Resolves `edges` into links. Self-loops carry no force and are dropped.
    pub fn new(edges: &[Edge], node_count: usize, rest_distance: f64, strength: f64) -> Self {
        Self::with_degrees(
            edges,
            &edge_degrees(edges, node_count),
            rest_distance,
            strength,
        )
    }

    /// Like [`LinkForce::new`] with precomputed node degrees (`degree[i]` for node `i`).
    pub fn with_degrees(
        edges: &[Edge],
        degree: &[usize],
        rest_distance: f64,
        strength: f64,
    ) -> Self {
        let links = edges
            .iter()
            .filter(|e| !e.is_self_loop())
            .map(|e| {
                let (ds, dt) = (degree[e.source] as f64, degree[e.target] as f64);
                Link {
                    source: e.source,
                    target: e.target,
                    rest_distance,
                    strength,
                    bias: ds / (ds + dt),
                }
            })
            .collect();
        Self { links }
    }

    pub fn from_graph(graph: &Graph, config: &LayoutConfig) -> Self {
        Self::with_degrees(
            graph.edges(),
            &graph.degrees(),
            config.link_distance,
            config.link_strength,
        )
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl Force for LinkForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        for link in &self.links {
            let (s, t) = (&nodes[link.source], &nodes[link.target]);
            let (mut dx, mut dy) = (t.x - s.x, t.y - s.y);
            let mut dist = (dx * dx + dy * dy).sqrt();
            if dist < EPSILON {
                (dx, dy) = separation_hint(link.source, link.target);
                dist = EPSILON;
            }

            let k = link.strength * alpha * (dist - link.rest_distance) / dist;
            let (fx, fy) = (dx * k, dy * k);
            nodes[link.target].add_force(-fx * link.bias, -fy * link.bias);
            nodes[link.source].add_force(fx * (1.0 - link.bias), fy * (1.0 - link.bias));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LinkForce;
    use crate::config::LayoutConfig;
    use crate::force::Force;
    use crate::graph::{Edge, Graph, GraphInput, Node};

    fn edge(source: usize, target: usize) -> Edge {
        Edge { source, target }
    }

    #[test]
    fn rest_distance_is_a_fixed_point() {
        let mut nodes = vec![Node::new("a", 100.0, 200.0), Node::new("b", 180.0, 200.0)];
        let mut force = LinkForce::new(&[edge(0, 1)], 2, 80.0, 1.0);
        force.apply(&mut nodes, 1.0);
        assert_eq!(nodes[0].force(), (0.0, 0.0));
        assert_eq!(nodes[1].force(), (0.0, 0.0));
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = vec![Node::new("a", 0.0, 0.0), Node::new("b", 100.0, 0.0)];
        let mut force = LinkForce::new(&[edge(0, 1)], 2, 80.0, 1.0);
        force.apply(&mut nodes, 1.0);
        // 20px of excess, split evenly between equal-degree endpoints.
        assert!((nodes[0].force().0 - 10.0).abs() < 1e-12);
        assert!((nodes[1].force().0 + 10.0).abs() < 1e-12);
    }

    #[test]
    fn hub_moves_less_than_leaf() {
        // Node 0 is a hub with three leaves.
        let mut nodes = vec![
            Node::new("hub", 0.0, 0.0),
            Node::new("a", 200.0, 0.0),
            Node::new("b", -80.0, 0.0),
            Node::new("c", 0.0, 80.0),
        ];
        let mut force = LinkForce::new(&[edge(0, 1), edge(0, 2), edge(0, 3)], 4, 80.0, 1.0);
        assert_eq!(force.links()[0].bias, 0.75);
        force.apply(&mut nodes, 1.0);
        let hub = nodes[0].force().0.abs();
        let leaf = nodes[1].force().0.abs();
        assert!(hub < leaf, "hub={hub} leaf={leaf}");
        assert!((hub + leaf - 120.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_endpoints_are_pushed_apart() {
        let mut nodes = vec![Node::new("a", 50.0, 50.0), Node::new("b", 50.0, 50.0)];
        let mut force = LinkForce::new(&[edge(0, 1)], 2, 80.0, 1.0);
        force.apply(&mut nodes, 1.0);
        let (ax, ay) = nodes[0].force();
        let (bx, by) = nodes[1].force();
        assert!(ax.is_finite() && ay.is_finite());
        assert!((ax + bx).abs() < 1e-9 && (ay + by).abs() < 1e-9);
        assert!(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt() > 79.0);
    }

    #[test]
    fn graph_degrees_drive_the_bias() {
        let input = GraphInput::from_json(
            r#"{"nodes": [
                {"id": "hub", "x": 0.5, "y": 0.5},
                {"id": "a", "x": 0.1, "y": 0.5},
                {"id": "b", "x": 0.9, "y": 0.5}
            ], "edges": [["hub", "a"], ["hub", "b"], ["a", "a"]]}"#,
        )
        .unwrap();
        let graph = Graph::build(&input, 800.0, 700.0).unwrap();
        let force = LinkForce::from_graph(&graph, &LayoutConfig::default());
        assert_eq!(force.links().len(), 2);
        assert_eq!(force.links()[0].bias, 2.0 / 3.0);
        assert_eq!(
            force.links(),
            LinkForce::new(graph.edges(), 3, 80.0, 1.0).links()
        );
    }

    #[test]
    fn self_loops_are_dropped() {
        let force = LinkForce::new(&[edge(0, 0), edge(0, 1)], 2, 80.0, 1.0);
        assert_eq!(force.links().len(), 1);
        assert_eq!(force.links()[0].bias, 0.5);
    }

    #[test]
    fn alpha_scales_the_correction() {
        let mut nodes = vec![Node::new("a", 0.0, 0.0), Node::new("b", 100.0, 0.0)];
        let mut force = LinkForce::new(&[edge(0, 1)], 2, 80.0, 1.0);
        force.apply(&mut nodes, 0.5);
        assert!((nodes[0].force().0 - 5.0).abs() < 1e-12);
    }
}
