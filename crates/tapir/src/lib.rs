#![forbid(unsafe_code)]

//! Headless force-directed graph layout.
//!
//! `tapir` turns a graph description (nodes with fractional start positions plus id pairs)
//! into a stable 2D layout by simulating link springs, Barnes-Hut many-body repulsion, a
//! centering pull and circle collisions until the alpha schedule cools down. Results are
//! reported in the unit square, rounded to four decimals.

pub mod boundary;
pub mod config;
pub mod convergence;
pub mod error;
pub mod force;
pub mod graph;
pub mod integrator;
pub mod normalize;
pub mod quadtree;
pub mod session;
pub mod simulation;

pub use config::{ConfigWarning, LayoutConfig};
pub use convergence::{Phase, SimulationState, StopReason};
pub use error::{Error, Result};
pub use force::{CenterForce, CollideForce, Force, ForceRegistry, LinkForce, ManyBodyForce};
pub use graph::{AdjacencyView, Connection, Graph, GraphInput, Node, NodeInput};
pub use normalize::{NormalizedPosition, normalize};
pub use session::{Callbacks, LayoutObserver, Session};
pub use simulation::{PixelPosition, Simulation, Snapshot};

/// Headless entry point: runs a layout to convergence and returns the normalized positions.
pub fn layout(input: &GraphInput, config: &LayoutConfig) -> Result<Vec<NormalizedPosition>> {
    let mut session = Session::start(input, config, ())?;
    session.run_to_end();
    Ok(session.positions().map(<[_]>::to_vec).unwrap_or_default())
}
