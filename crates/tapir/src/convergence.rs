use std::time::Instant;

use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` (or an implicit stop before a reset) was requested.
    Requested,
    /// A timed run reached its wall-clock deadline.
    Deadline,
}

/// Lifecycle of a run: `Idle -> Running -> {Converged | Stopped}`.
///
/// The terminal phases stay visible until the next (re)start puts the state back into
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Converged,
    Stopped(StopReason),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Converged | Phase::Stopped(_))
    }
}

/// Explicit per-run state, threaded through `Simulation::tick` by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub alpha: f64,
    pub tick_count: u64,
    pub phase: Phase,
    /// Wall-clock cut-off of a timed run.
    pub deadline: Option<Instant>,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SimulationState {
    pub fn idle() -> Self {
        Self {
            alpha: 1.0,
            tick_count: 0,
            phase: Phase::Idle,
            deadline: None,
        }
    }

    /// Fresh run until convergence.
    pub fn running() -> Self {
        Self {
            phase: Phase::Running,
            ..Self::idle()
        }
    }

    /// Fresh run that also stops at `deadline`.
    pub fn running_until(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::running()
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Stops a running state; a no-op otherwise. Returns whether anything changed.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = Phase::Stopped(StopReason::Requested);
        true
    }
}

/// The alpha ("temperature") schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub alpha_min: f64,
    pub alpha_decay: f64,
}

impl Convergence {
    pub fn new(alpha_min: f64, alpha_decay: f64) -> Self {
        Self {
            alpha_min,
            alpha_decay,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.alpha_min, config.alpha_decay)
    }

    /// Whether a timed run has run out of wall-clock time at `now`.
    pub fn deadline_passed(&self, state: &SimulationState, now: Instant) -> bool {
        state.deadline.is_some_and(|d| now >= d)
    }

    /// Records one finished tick: decays alpha and converges once it drops below `alpha_min`.
    pub fn cool(&self, mut state: SimulationState) -> SimulationState {
        state.tick_count += 1;
        state.alpha *= 1.0 - self.alpha_decay;
        if state.alpha < self.alpha_min {
            state.phase = Phase::Converged;
        }
        state
    }

    /// Number of ticks a run from `alpha = 1` takes to converge.
    pub fn ticks_to_converge(&self) -> u64 {
        let mut state = SimulationState::running();
        while state.is_running() {
            state = self.cool(state);
        }
        state.tick_count
    }
}
