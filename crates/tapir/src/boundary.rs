use crate::graph::Node;

/// Axis-aligned box nodes are clamped into after every step.
///
/// Only positions are clamped; a node pressed against an edge keeps its velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Boundary {
    /// `[margin, width - margin] x [margin, height - margin]`. A margin wider than half the
    /// canvas collapses that axis onto its midpoint.
    pub fn new(width: f64, height: f64, margin: f64) -> Self {
        let axis = |len: f64| {
            if 2.0 * margin <= len {
                (margin, len - margin)
            } else {
                (len / 2.0, len / 2.0)
            }
        };
        let (min_x, max_x) = axis(width);
        let (min_y, max_y) = axis(height);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn clamp(&self, nodes: &mut [Node]) {
        for n in nodes {
            n.x = n.x.clamp(self.min_x, self.max_x);
            n.y = n.y.clamp(self.min_y, self.max_y);
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}
