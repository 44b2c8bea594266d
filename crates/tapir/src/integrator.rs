use crate::graph::Node;

/// Folds accumulated forces into velocities and advances positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    /// Velocity multiplier applied after the forces are added.
    pub velocity_decay: f64,
}

impl Integrator {
    pub fn new(velocity_decay: f64) -> Self {
        Self { velocity_decay }
    }

    /// `v = (v + force) * velocity_decay; p += v * dt`, then clears the accumulators.
    pub fn step(&self, nodes: &mut [Node], dt: f64) {
        for n in nodes {
            let (fx, fy) = n.take_force();
            n.vx = (n.vx + fx) * self.velocity_decay;
            n.vy = (n.vy + fy) * self.velocity_decay;
            if !(n.vx.is_finite() && n.vy.is_finite()) {
                n.vx = 0.0;
                n.vy = 0.0;
            }
            n.x += n.vx * dt;
            n.y += n.vy * dt;
        }
    }
}
