use crate::config::{NonFinitePolicy, SimulationConfig};
use crate::integrator::Rk4Integrator;
use crate::state::State;
use crate::trajectory::{Snapshot, TrajectoryBuffer};

/// Report of one `advance` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    pub requested: usize,
    pub applied: usize,
    /// Set when the non-finite guard stopped integration. Stays set on later
    /// calls until `reset`.
    pub halted: bool,
}

/// Per-frame driver: owns the live state, the integrator and the trajectory.
///
/// There is a single steady state (running). `advance` and `reset` are the
/// only mutations; callers that share a `Simulation` across event sources
/// must serialize them behind one lock.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    integrator: Rk4Integrator,
    current: State,
    buffer: TrajectoryBuffer,
    ticks: u64,
    steps: u64,
    halted: bool,
}

impl Simulation {
    /// Fresh run: `current` is the initial condition and the buffer holds
    /// exactly that one point.
    pub fn new(config: SimulationConfig) -> Self {
        let integrator = Rk4Integrator::new(config.params(), config.time_step);
        let initial = config.initial_state;
        let buffer = TrajectoryBuffer::seeded(config.buffer_capacity, initial);
        Self {
            config,
            integrator,
            current: initial,
            buffer,
            ticks: 0,
            steps: 0,
            halted: false,
        }
    }

    /// Perform `steps` integration steps in sequence, appending each new
    /// state to the trajectory.
    pub fn advance(&mut self, steps: usize) -> Advance {
        let mut applied = 0;
        for _ in 0..steps {
            if self.halted {
                break;
            }
            let next = self.integrator.step(self.current);
            if self.config.non_finite == NonFinitePolicy::Halt && !next.is_finite() {
                self.halted = true;
                break;
            }
            self.current = next;
            self.buffer.append(next);
            applied += 1;
        }
        self.steps += applied as u64;
        Advance {
            requested: steps,
            applied,
            halted: self.halted,
        }
    }

    /// Back to the initial condition with a one-point trajectory.
    pub fn reset(&mut self) {
        self.current = self.config.initial_state;
        self.buffer.clear_and_seed(self.current);
        self.ticks = 0;
        self.steps = 0;
        self.halted = false;
    }

    /// Timer callback: advance one frame's worth of steps. The caller
    /// redraws afterwards.
    pub fn on_tick(&mut self) -> Advance {
        self.ticks += 1;
        self.advance(self.config.steps_per_tick)
    }

    /// Pointer-click callback.
    pub fn on_primary_click(&mut self) {
        self.reset();
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.buffer.snapshot()
    }

    pub fn current(&self) -> State {
        self.current
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn buffer(&self) -> &TrajectoryBuffer {
        &self.buffer
    }

    /// `on_tick` calls since the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Integration steps since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time since the last reset.
    pub fn sim_time(&self) -> f64 {
        self.steps as f64 * self.config.time_step
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
