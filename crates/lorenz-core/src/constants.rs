/// Prandtl number σ of the classic chaotic regime
pub const SIGMA: f64 = 10.0;

/// Rayleigh number ρ of the classic chaotic regime
pub const RHO: f64 = 28.0;

/// Geometric factor β = 8/3
pub const BETA: f64 = 8.0 / 3.0;

/// Fixed RK4 time step Δt
pub const TIME_STEP: f64 = 0.01;

/// Trajectory points retained before FIFO eviction starts
pub const BUFFER_CAPACITY: usize = 10_000;

/// Integration steps performed per external tick
pub const STEPS_PER_TICK: usize = 5;

/// Linear phase-space to pixel scale factor
pub const SCALE: f64 = 15.0;

/// Deterministic starting point, used at startup and on every reset
pub const INITIAL_STATE: [f64; 3] = [0.1, 0.0, 0.0];

/// Green channel of the trajectory gradient, held constant
pub const GRADIENT_GREEN: f32 = 0.5;
