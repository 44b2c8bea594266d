use crate::config::LayoutConfig;
use crate::graph::Node;
use crate::quadtree::{CellId, QuadTree};

use super::{Force, separation_hint};

/// Pairwise charge between all nodes, approximated with a Barnes-Hut quadtree.
///
/// A cell is treated as a single point at its centre of mass once
/// `cell_width / distance < theta`; otherwise its children are visited. Larger `theta` values
/// open fewer cells and trade accuracy for speed.
#[derive(Debug, Clone)]
pub struct ManyBodyForce {
    strength: f64,
    theta2: f64,
    distance_min2: f64,
    distance_max2: f64,
    charges: Vec<f64>,
    tree: QuadTree,
    stack: Vec<CellId>,
}

impl ManyBodyForce {
    pub fn new(strength: f64, theta: f64) -> Self {
        Self {
            strength,
            theta2: theta * theta,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
            charges: Vec::new(),
            tree: QuadTree::new(),
            stack: Vec::new(),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.charge_strength, config.theta)
            .with_distance_range(config.charge_distance_min, config.charge_distance_max)
    }

    /// Floors pair distances at `min` and ignores pairs further apart than `max`.
    pub fn with_distance_range(mut self, min: f64, max: Option<f64>) -> Self {
        self.distance_min2 = min * min;
        self.distance_max2 = max.map_or(f64::INFINITY, |m| m * m);
        self
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// The quadtree built during the last `apply`.
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        if self.charges.len() != nodes.len() {
            self.charges = vec![self.strength; nodes.len()];
        }
        self.tree.rebuild(nodes, &self.charges);

        let (theta2, min2, max2) = (self.theta2, self.distance_min2, self.distance_max2);
        let tree = &self.tree;
        let charges = &self.charges;
        let stack = &mut self.stack;

        for i in 0..nodes.len() {
            let (xi, yi) = (nodes[i].x, nodes[i].y);
            let (mut fx, mut fy) = (0.0, 0.0);

            tree.visit(stack, |id, cell| {
                if cell.charge() == 0.0 {
                    return false;
                }
                let (cx, cy) = cell.centroid();
                let (dx, dy) = (cx - xi, cy - yi);
                let l = dx * dx + dy * dy;
                let w = cell.size();

                // Far enough away: the whole cell acts as one point.
                if w * w / theta2 < l {
                    if l < max2 {
                        let l = if l < min2 { (min2 * l).sqrt() } else { l };
                        let k = cell.charge() * alpha / l;
                        fx += dx * k;
                        fy += dy * k;
                    }
                    return false;
                }
                if !cell.is_leaf() {
                    return true;
                }
                if l >= max2 {
                    return false;
                }

                for j in tree.bucket(id) {
                    if j == i {
                        continue;
                    }
                    let (xj, yj) = tree.point(j);
                    let (mut dx, mut dy) = (xj - xi, yj - yi);
                    let mut l = dx * dx + dy * dy;
                    if l == 0.0 {
                        (dx, dy) = separation_hint(i, j);
                        l = dx * dx + dy * dy;
                    }
                    if l < min2 {
                        l = (min2 * l).sqrt();
                    }
                    let k = charges[j] * alpha / l;
                    fx += dx * k;
                    fy += dy * k;
                }
                false
            });

            nodes[i].add_force(fx, fy);
        }
    }
}
