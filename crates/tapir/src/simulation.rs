use std::time::Instant;

use serde::Serialize;

use crate::boundary::Boundary;
use crate::config::{ConfigWarning, LayoutConfig};
use crate::convergence::{Convergence, Phase, SimulationState, StopReason};
use crate::force::ForceRegistry;
use crate::graph::{Graph, Node};
use crate::integrator::Integrator;
use crate::normalize::{NormalizedPosition, normalize};

/// Pixel-space position of one node inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelPosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Immutable copy of the layout at a tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub alpha: f64,
    pub positions: Vec<PixelPosition>,
}

/// The force-directed layout engine for a single graph.
///
/// The simulation owns node state and forces but not the run state: `tick` takes a
/// [`SimulationState`] and returns the advanced one, so independent runs never share ambient
/// flags.
#[derive(Debug)]
pub struct Simulation {
    nodes: Vec<Node>,
    forces: ForceRegistry,
    integrator: Integrator,
    boundary: Boundary,
    convergence: Convergence,
    config: LayoutConfig,
    warnings: Vec<ConfigWarning>,
}

impl Simulation {
    /// Builds a simulation with the standard link, charge, center and collision forces.
    pub fn new(graph: Graph, config: &LayoutConfig) -> Self {
        let (config, warnings) = config.sanitize();
        let forces = ForceRegistry::standard(&graph, &config);
        Self::assemble(graph, config, warnings, forces)
    }

    /// Builds a simulation with a caller-supplied force set.
    pub fn with_forces(graph: Graph, config: &LayoutConfig, forces: ForceRegistry) -> Self {
        let (config, warnings) = config.sanitize();
        Self::assemble(graph, config, warnings, forces)
    }

    fn assemble(
        graph: Graph,
        config: LayoutConfig,
        warnings: Vec<ConfigWarning>,
        forces: ForceRegistry,
    ) -> Self {
        let boundary = Boundary::new(config.width, config.height, config.boundary_margin);
        let mut nodes = graph.into_nodes();
        boundary.clamp(&mut nodes);
        Self {
            nodes,
            forces,
            integrator: Integrator::new(config.velocity_decay),
            boundary,
            convergence: Convergence::from_config(&config),
            config,
            warnings,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The sanitized configuration in effect.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Parameters that were clamped while sanitizing the configuration.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn forces(&self) -> &ForceRegistry {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn convergence(&self) -> &Convergence {
        &self.convergence
    }

    /// One physics step at the given alpha: forces, integration, boundary clamp.
    pub fn step(&mut self, alpha: f64) {
        self.forces.apply(&mut self.nodes, alpha);
        self.integrator.step(&mut self.nodes, 1.0);
        self.boundary.clamp(&mut self.nodes);
    }

    /// Advances a running state by one tick.
    ///
    /// Non-running states are returned unchanged. A timed run past its deadline stops without
    /// stepping.
    pub fn tick(&mut self, state: SimulationState, now: Instant) -> SimulationState {
        if !state.is_running() {
            return state;
        }
        if self.convergence.deadline_passed(&state, now) {
            return SimulationState {
                phase: Phase::Stopped(StopReason::Deadline),
                ..state
            };
        }

        self.step(state.alpha);
        let state = self.convergence.cool(state);
        tracing::trace!(tick = state.tick_count, alpha = state.alpha, "tick");
        state
    }

    /// Zeroes all velocities, e.g. before re-running from the current positions.
    pub fn settle(&mut self) {
        for n in &mut self.nodes {
            n.vx = 0.0;
            n.vy = 0.0;
        }
    }

    pub fn snapshot(&self, state: &SimulationState) -> Snapshot {
        Snapshot {
            tick: state.tick_count,
            alpha: state.alpha,
            positions: self
                .nodes
                .iter()
                .map(|n| PixelPosition {
                    id: n.id.clone(),
                    x: n.x,
                    y: n.y,
                })
                .collect(),
        }
    }

    pub fn normalized(&self) -> Vec<NormalizedPosition> {
        normalize(&self.nodes, self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Simulation;
    use crate::config::LayoutConfig;
    use crate::convergence::{Phase, SimulationState, StopReason};
    use crate::force::{ForceRegistry, LinkForce};
    use crate::graph::{Graph, GraphInput, NodeInput};

    fn graph(nodes: &[(&str, f64, f64)], edges: &[(&str, &str)]) -> Graph {
        let input = GraphInput {
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
        };
        Graph::build(&input, 800.0, 700.0).expect("graph")
    }

    #[test]
    fn tick_counts_and_cools() {
        let mut sim = Simulation::new(graph(&[("a", 0.2, 0.2)], &[]), &LayoutConfig::default());
        let now = Instant::now();
        let state = sim.tick(SimulationState::running(), now);
        assert_eq!(state.tick_count, 1);
        assert!(state.alpha < 1.0);
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn idle_state_is_not_advanced() {
        let mut sim = Simulation::new(graph(&[("a", 0.2, 0.2)], &[]), &LayoutConfig::default());
        let before = sim.nodes()[0].clone();
        let state = sim.tick(SimulationState::idle(), Instant::now());
        assert_eq!(state, SimulationState::idle());
        assert_eq!(sim.nodes()[0], before);
    }

    #[test]
    fn expired_deadline_stops_without_stepping() {
        let mut sim = Simulation::new(graph(&[("a", 0.2, 0.2)], &[]), &LayoutConfig::default());
        let start = Instant::now();
        let state = SimulationState::running_until(start + Duration::from_millis(5));
        let state = sim.tick(state, start + Duration::from_millis(5));
        assert_eq!(state.phase, Phase::Stopped(StopReason::Deadline));
        assert_eq!(state.tick_count, 0);
    }

    #[test]
    fn initial_positions_are_clamped_into_the_boundary() {
        let sim = Simulation::new(graph(&[("a", 0.0, 1.2)], &[]), &LayoutConfig::default());
        assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (30.0, 670.0));
    }

    #[test]
    fn custom_force_sets_are_honoured() {
        let g = graph(&[("a", 0.4, 0.5), ("b", 0.5, 0.5)], &[("a", "b")]);
        let cfg = LayoutConfig::default();
        let mut forces = ForceRegistry::new();
        forces.insert(ForceRegistry::LINK, LinkForce::from_graph(&g, &cfg));
        let mut sim = Simulation::with_forces(g, &cfg, forces);
        // 80px apart at rest distance: a link-only simulation does not move.
        sim.step(1.0);
        assert_eq!(sim.nodes()[0].x, 320.0);
        assert_eq!(sim.nodes()[1].x, 400.0);
    }

    #[test]
    fn sanitize_warnings_are_kept() {
        let cfg = LayoutConfig {
            collision_radius: -1.0,
            ..Default::default()
        };
        let sim = Simulation::new(graph(&[("a", 0.5, 0.5)], &[]), &cfg);
        assert_eq!(sim.warnings().len(), 1);
        assert_eq!(sim.config().collision_radius, 0.0);
    }

    #[test]
    fn snapshot_is_a_detached_copy() {
        let mut sim = Simulation::new(
            graph(&[("a", 0.5, 0.5), ("b", 0.5, 0.5)], &[]),
            &LayoutConfig::default(),
        );
        let state = SimulationState::running();
        let snap = sim.snapshot(&state);
        sim.tick(state, Instant::now());
        assert_eq!(snap.positions[0].x, 400.0);
        assert_ne!(sim.nodes()[0].x, snap.positions[0].x);
    }
}
