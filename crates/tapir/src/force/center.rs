use crate::config::LayoutConfig;
use crate::graph::Node;

use super::Force;

/// Nudges every node by the same amount so the centroid drifts towards a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterForce {
    x: f64,
    y: f64,
    strength: f64,
}

impl CenterForce {
    pub fn new(x: f64, y: f64, strength: f64) -> Self {
        Self { x, y, strength }
    }

    /// Targets the canvas centre.
    pub fn from_config(config: &LayoutConfig) -> Self {
        let (x, y) = config.center();
        Self::new(x, y, config.center_strength)
    }

    pub fn target(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl Force for CenterForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        if nodes.is_empty() {
            return;
        }
        let n = nodes.len() as f64;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let k = self.strength * alpha;
        let (dx, dy) = ((self.x - sx / n) * k, (self.y - sy / n) * k);
        for node in nodes {
            node.add_force(dx, dy);
        }
    }
}
