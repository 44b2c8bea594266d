use crate::config::LayoutConfig;
use crate::graph::Node;

use super::{Force, separation_hint};

/// Separates overlapping circles of a fixed radius.
///
/// Each tick resolves only `strength` of an overlap (further scaled by alpha), so collisions
/// settle over several ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollideForce {
    radius: f64,
    strength: f64,
}

impl CollideForce {
    pub fn new(radius: f64, strength: f64) -> Self {
        Self { radius, strength }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.collision_radius, config.collision_strength)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Force for CollideForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        let reach = 2.0 * self.radius;
        if reach <= 0.0 || self.strength == 0.0 {
            return;
        }
        let reach2 = reach * reach;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                // Points from j towards i.
                let (mut dx, mut dy) = (nodes[i].x - nodes[j].x, nodes[i].y - nodes[j].y);
                let mut l = dx * dx + dy * dy;
                if l >= reach2 {
                    continue;
                }
                if l == 0.0 {
                    (dx, dy) = separation_hint(j, i);
                    l = dx * dx + dy * dy;
                }
                let dist = l.sqrt();
                // Equal radii: each side takes half of the correction.
                let k = (reach - dist) / dist * self.strength * alpha * 0.5;
                nodes[i].add_force(dx * k, dy * k);
                nodes[j].add_force(-dx * k, -dy * k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CollideForce;
    use crate::force::Force;
    use crate::graph::Node;

    #[test]
    fn overlapping_pair_is_pushed_apart() {
        let mut nodes = vec![Node::new("a", 0.0, 0.0), Node::new("b", 40.0, 0.0)];
        let mut force = CollideForce::new(30.0, 0.85);
        force.apply(&mut nodes, 1.0);
        // 20px overlap, 85% resolved, split evenly.
        assert!((nodes[0].force().0 + 8.5).abs() < 1e-12);
        assert!((nodes[1].force().0 - 8.5).abs() < 1e-12);
    }

    #[test]
    fn separated_pair_is_untouched() {
        let mut nodes = vec![Node::new("a", 0.0, 0.0), Node::new("b", 60.0, 0.0)];
        let mut force = CollideForce::new(30.0, 0.85);
        force.apply(&mut nodes, 1.0);
        assert_eq!(nodes[0].force(), (0.0, 0.0));
        assert_eq!(nodes[1].force(), (0.0, 0.0));
    }

    #[test]
    fn coincident_pair_separates_deterministically() {
        let run = || {
            let mut nodes = vec![Node::new("a", 10.0, 10.0), Node::new("b", 10.0, 10.0)];
            CollideForce::new(30.0, 0.85).apply(&mut nodes, 1.0);
            (nodes[0].force(), nodes[1].force())
        };
        let (a, b) = run();
        assert_eq!(run(), (a, b));
        assert!(a.0.is_finite() && a.1.is_finite());
        let gap = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
        assert!((gap - 51.0).abs() < 1e-3, "gap={gap}");
    }

    #[test]
    fn zero_radius_disables_collisions() {
        let mut nodes = vec![Node::new("a", 0.0, 0.0), Node::new("b", 0.0, 0.0)];
        CollideForce::new(0.0, 0.85).apply(&mut nodes, 1.0);
        assert_eq!(nodes[0].force(), (0.0, 0.0));
    }
}
