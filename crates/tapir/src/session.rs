use std::time::Instant;

use crate::config::{ConfigWarning, LayoutConfig};
use crate::convergence::{Phase, SimulationState};
use crate::error::Result;
use crate::graph::{Connection, Graph, GraphInput};
use crate::normalize::NormalizedPosition;
use crate::simulation::{Simulation, Snapshot};

/// Receives the engine's output. Every method defaults to a no-op.
pub trait LayoutObserver {
    /// Called once after the graph is loaded.
    fn connections_changed(&mut self, _connections: &[Connection]) {}

    /// Called whenever a run terminates (converged or stopped).
    fn positions_changed(&mut self, _positions: &[NormalizedPosition]) {}

    /// Called after every tick when [`LayoutObserver::wants_ticks`] is true.
    fn tick(&mut self, _snapshot: &Snapshot) {}

    fn wants_ticks(&self) -> bool {
        false
    }
}

impl LayoutObserver for () {}

type ConnectionsFn = Box<dyn FnMut(&[Connection])>;
type PositionsFn = Box<dyn FnMut(&[NormalizedPosition])>;
type TickFn = Box<dyn FnMut(&Snapshot)>;

/// Closure-backed observer.
#[derive(Default)]
pub struct Callbacks {
    on_connections_change: Option<ConnectionsFn>,
    on_optimized_positions_change: Option<PositionsFn>,
    on_tick: Option<TickFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connections_change(mut self, f: impl FnMut(&[Connection]) + 'static) -> Self {
        self.on_connections_change = Some(Box::new(f));
        self
    }

    pub fn on_optimized_positions_change(
        mut self,
        f: impl FnMut(&[NormalizedPosition]) + 'static,
    ) -> Self {
        self.on_optimized_positions_change = Some(Box::new(f));
        self
    }

    pub fn on_tick(mut self, f: impl FnMut(&Snapshot) + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }
}

impl LayoutObserver for Callbacks {
    fn connections_changed(&mut self, connections: &[Connection]) {
        if let Some(f) = self.on_connections_change.as_mut() {
            f(connections);
        }
    }

    fn positions_changed(&mut self, positions: &[NormalizedPosition]) {
        if let Some(f) = self.on_optimized_positions_change.as_mut() {
            f(positions);
        }
    }

    fn tick(&mut self, snapshot: &Snapshot) {
        if let Some(f) = self.on_tick.as_mut() {
            f(snapshot);
        }
    }

    fn wants_ticks(&self) -> bool {
        self.on_tick.is_some()
    }
}

/// Drives one simulation: start, tick-by-tick stepping, stop and timed re-runs.
///
/// A single external driver calls [`Session::tick`] (e.g. from a frame callback); nothing
/// else mutates node state. Observers only ever see copies taken at tick boundaries.
pub struct Session<O: LayoutObserver = ()> {
    sim: Simulation,
    state: SimulationState,
    connections: Vec<Connection>,
    positions: Option<Vec<NormalizedPosition>>,
    warnings: Vec<ConfigWarning>,
    observer: O,
}

impl<O: LayoutObserver> Session<O> {
    /// Validates and loads `input`, reports its connections and enters `Running`.
    ///
    /// Validation failures are returned before any tick runs and before the observer hears
    /// anything.
    pub fn start(input: &GraphInput, config: &LayoutConfig, mut observer: O) -> Result<Self> {
        let (config, warnings) = config.sanitize();
        let graph = Graph::build(input, config.width, config.height)?;
        let connections = graph.adjacency().connections();
        observer.connections_changed(&connections);

        let sim = Simulation::new(graph, &config);
        tracing::debug!(
            nodes = sim.nodes().len(),
            width = config.width,
            height = config.height,
            "layout run started"
        );
        Ok(Self {
            sim,
            state: SimulationState::running(),
            connections,
            positions: None,
            warnings,
            observer,
        })
    }

    pub fn tick(&mut self) -> Phase {
        self.tick_at(Instant::now())
    }

    /// Advances one tick as of `now`; returns the phase afterwards.
    pub fn tick_at(&mut self, now: Instant) -> Phase {
        if !self.state.is_running() {
            return self.state.phase;
        }
        let before = self.state.tick_count;
        self.state = self.sim.tick(self.state, now);
        if self.state.tick_count != before && self.observer.wants_ticks() {
            let snapshot = self.sim.snapshot(&self.state);
            self.observer.tick(&snapshot);
        }
        if self.state.phase.is_terminal() {
            self.finish();
        }
        self.state.phase
    }

    /// Ticks until the current run terminates.
    pub fn run_to_end(&mut self) -> Phase {
        while self.state.is_running() {
            self.tick();
        }
        self.state.phase
    }

    /// Stops the current run and publishes its positions. Safe to call repeatedly.
    pub fn stop(&mut self) -> bool {
        if !self.state.stop() {
            return false;
        }
        self.finish();
        true
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Starts a timed re-run from the current positions with `alpha = 1`.
    ///
    /// A run still in flight is stopped first, without publishing its partial result.
    pub fn reset_at(&mut self, now: Instant) {
        if self.state.stop() {
            tracing::debug!(tick = self.state.tick_count, "run interrupted by reset");
        }
        self.sim.settle();
        self.state = SimulationState::running_until(now + self.sim.config().rerun_duration());
        tracing::debug!(
            duration_ms = self.sim.config().rerun_duration_ms,
            "layout re-run started"
        );
    }

    fn finish(&mut self) {
        let positions = self.sim.normalized();
        tracing::info!(
            phase = ?self.state.phase,
            ticks = self.state.tick_count,
            alpha = self.state.alpha,
            "layout run finished"
        );
        self.observer.positions_changed(&positions);
        self.positions = Some(positions);
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sim.snapshot(&self.state)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The last published normalized positions, if any run has terminated.
    pub fn positions(&self) -> Option<&[NormalizedPosition]> {
        self.positions.as_deref()
    }

    /// Configuration values that were clamped when the session started.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }
}
