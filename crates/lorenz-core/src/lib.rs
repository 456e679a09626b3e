//! Lorenz attractor trajectory engine.
//!
//! Advances the Lorenz system with a fixed-step RK4 integrator, keeps the
//! most recent points in a bounded FIFO trajectory, and exposes the
//! per-frame `on_tick` / `on_primary_click` / `snapshot` contract plus the
//! coordinate and color mapping a renderer needs.
//!
//! Zero I/O: windowing, timers and drawing belong to the caller.

pub mod config;
pub mod constants;
pub mod integrator;
pub mod render;
pub mod simulation;
pub mod state;
pub mod trajectory;

pub use config::{ConfigError, LorenzParams, NonFinitePolicy, Rounding, SimulationConfig};
pub use constants::{
    BETA, BUFFER_CAPACITY, INITIAL_STATE, RHO, SCALE, SIGMA, STEPS_PER_TICK, TIME_STEP,
};
pub use integrator::Rk4Integrator;
pub use render::{Projection, Rgb, ScreenPoint, Segment, Viewport};
pub use simulation::{Advance, Simulation};
pub use state::{State, TrajectoryPoint};
pub use trajectory::{Snapshot, TrajectoryBuffer};
