use std::fmt;

use indexmap::IndexMap;

use crate::config::LayoutConfig;
use crate::graph::{Graph, Node};

mod center;
mod collide;
mod link;
mod many_body;

pub use center::CenterForce;
pub use collide::CollideForce;
pub use link::{Link, LinkForce};
pub use many_body::ManyBodyForce;

/// Distances below this are treated as coincident.
pub(crate) const EPSILON: f64 = 1e-6;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A force contributes a velocity delta per node per tick.
///
/// Implementations add into the node accumulators (`Node::add_force`) and must not touch
/// positions or velocities; the integrator folds the accumulated deltas in afterwards.
pub trait Force {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64);
}

/// Named, ordered set of forces applied every tick.
#[derive(Default)]
pub struct ForceRegistry {
    forces: IndexMap<String, Box<dyn Force>>,
}

impl fmt::Debug for ForceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.forces.keys()).finish()
    }
}

impl ForceRegistry {
    pub const LINK: &'static str = "link";
    pub const CHARGE: &'static str = "charge";
    pub const CENTER: &'static str = "center";
    pub const COLLISION: &'static str = "collision";

    pub fn new() -> Self {
        Self::default()
    }

    /// Link, many-body, center and collision forces configured from `config`.
    pub fn standard(graph: &Graph, config: &LayoutConfig) -> Self {
        let mut forces = Self::new();
        forces.insert(Self::LINK, LinkForce::from_graph(graph, config));
        forces.insert(Self::CHARGE, ManyBodyForce::from_config(config));
        forces.insert(Self::CENTER, CenterForce::from_config(config));
        forces.insert(Self::COLLISION, CollideForce::from_config(config));
        forces
    }

    /// Adds `force` under `name`, returning the force it replaced (which keeps its slot).
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        force: impl Force + 'static,
    ) -> Option<Box<dyn Force>> {
        self.forces.insert(name.into(), Box::new(force))
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Force>> {
        self.forces.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.forces.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        for force in self.forces.values_mut() {
            force.apply(nodes, alpha);
        }
    }
}

/// Tiny deterministic offset pointing from node `a` towards node `b`, used when the two sit
/// on exactly the same spot. `separation_hint(a, b) == -separation_hint(b, a)`.
pub(crate) fn separation_hint(a: usize, b: usize) -> (f64, f64) {
    let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
    let angle = (lo as f64 * 0.5 + hi as f64) * GOLDEN_ANGLE;
    (sign * EPSILON * angle.cos(), sign * EPSILON * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::{CenterForce, Force, ForceRegistry, separation_hint};
    use crate::graph::Node;

    struct Constant(f64);

    impl Force for Constant {
        fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
            for n in nodes {
                n.add_force(self.0 * alpha, 0.0);
            }
        }
    }

    #[test]
    fn forces_compose_by_summation() {
        let mut registry = ForceRegistry::new();
        registry.insert("a", Constant(1.0));
        registry.insert("b", Constant(2.0));
        let mut nodes = vec![Node::new("n", 0.0, 0.0)];
        registry.apply(&mut nodes, 0.5);
        assert_eq!(nodes[0].force(), (1.5, 0.0));
    }

    #[test]
    fn replacing_a_force_keeps_its_position() {
        let mut registry = ForceRegistry::new();
        registry.insert("a", Constant(1.0));
        registry.insert("b", Constant(1.0));
        assert!(registry.insert("a", CenterForce::new(0.0, 0.0, 1.0)).is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.remove("a").is_some());
        assert!(!registry.contains("a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn separation_hint_is_antisymmetric_and_tiny() {
        for (a, b) in [(0, 1), (3, 7), (12, 2)] {
            let (x1, y1) = separation_hint(a, b);
            let (x2, y2) = separation_hint(b, a);
            assert_eq!((x1, y1), (-x2, -y2));
            let len = (x1 * x1 + y1 * y1).sqrt();
            assert!((len - super::EPSILON).abs() < 1e-12);
        }
        assert_ne!(separation_hint(0, 1), separation_hint(0, 2));
    }
}
