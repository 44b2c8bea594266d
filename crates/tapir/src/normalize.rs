use serde::{Deserialize, Serialize};

use crate::graph::Node;

/// A node position in the unit square, rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Rounds to four decimal digits, the precision contract of normalized output.
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Maps pixel positions onto `[0,1]`, in node order.
pub fn normalize(nodes: &[Node], width: f64, height: f64) -> Vec<NormalizedPosition> {
    nodes
        .iter()
        .map(|n| NormalizedPosition {
            id: n.id.clone(),
            x: round4(n.x / width).clamp(0.0, 1.0),
            y: round4(n.y / height).clamp(0.0, 1.0),
        })
        .collect()
}
