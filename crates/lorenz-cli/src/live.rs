//! Real-time host for the simulation: a timer source calls `on_tick` and
//! redraws, a click source calls `on_primary_click`. Both run as separate
//! tasks and go through one mutex, so a frame never sees a half-applied
//! advance or reset.

use std::sync::Arc;
use std::time::Duration;

use lorenz_core::{Projection, ScreenPoint, Simulation, State, Viewport};
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::time::MissedTickBehavior;

/// What the headless frame sink saw on one redraw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameSummary {
    pub frame: u64,
    pub tick: u64,
    pub points: usize,
    pub segments: usize,
    pub head: State,
    pub head_px: ScreenPoint,
    pub halted: bool,
}

#[derive(Clone)]
pub struct LiveSimulation {
    state: Arc<Mutex<LiveState>>,
}

struct LiveState {
    sim: Simulation,
    projection: Projection,
    frames: u64,
    clicks: u64,
}

impl LiveState {
    /// Walk every segment of the current trajectory the way a painter
    /// would, and summarize the frame.
    fn redraw(&mut self) -> FrameSummary {
        self.frames += 1;
        let snapshot = self.sim.snapshot();
        let segments = self.projection.segments(snapshot).count();
        let head = self.sim.current();
        FrameSummary {
            frame: self.frames,
            tick: self.sim.ticks(),
            points: snapshot.len(),
            segments,
            head,
            head_px: self.projection.project(head),
            halted: self.sim.is_halted(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub interval: Duration,
    pub max_ticks: Option<u64>,
    pub print_frames: bool,
}

/// Totals for the whole run, independent of resets.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunReport {
    pub ticks: u64,
    pub frames: u64,
    pub clicks: u64,
}

impl LiveSimulation {
    pub fn new(sim: Simulation, viewport: &Viewport) -> Self {
        let projection = Projection::new(viewport, sim.config());
        Self {
            state: Arc::new(Mutex::new(LiveState {
                sim,
                projection,
                frames: 0,
                clicks: 0,
            })),
        }
    }

    /// Timer callback: advance one tick, then redraw.
    pub async fn tick(&self) -> FrameSummary {
        let mut state = self.state.lock().await;
        let was_halted = state.sim.is_halted();
        let advance = state.sim.on_tick();
        if advance.halted && !was_halted {
            tracing::warn!(
                "non-finite state, integration halted after {} of {} steps; click to reset",
                advance.applied,
                advance.requested
            );
        }
        state.redraw()
    }

    /// Input callback: primary click resets the trajectory.
    pub async fn click(&self) {
        let mut state = self.state.lock().await;
        state.sim.on_primary_click();
        state.clicks += 1;
        tracing::info!("reset to initial condition (click {})", state.clicks);
    }

    /// Read access for reporting. Holds the lock for the duration of `f`.
    pub async fn with_simulation<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.sim)
    }

    /// Drive ticks at the configured cadence while `clicks` delivers resets,
    /// until the tick limit or a shutdown signal.
    pub async fn run(&self, opts: RunOptions, clicks: mpsc::Receiver<()>) -> RunReport {
        let click_task = tokio::spawn(forward_clicks(self.clone(), clicks));

        let mut interval = tokio::time::interval(opts.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        let mut ticks = 0u64;
        tracing::info!(
            "running at {} ms per tick{}",
            opts.interval.as_millis(),
            opts.max_ticks
                .map(|n| format!(", stopping after {n} ticks"))
                .unwrap_or_default()
        );

        loop {
            if opts.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let frame = self.tick().await;
                    ticks += 1;
                    tracing::debug!(
                        "frame {} tick {}: {} points",
                        frame.frame,
                        frame.tick,
                        frame.points
                    );
                    if opts.print_frames {
                        match serde_json::to_string(&frame) {
                            Ok(line) => println!("{line}"),
                            Err(e) => tracing::error!("failed to encode frame: {e}"),
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        click_task.abort();
        let state = self.state.lock().await;
        RunReport {
            ticks,
            frames: state.frames,
            clicks: state.clicks,
        }
    }
}

async fn forward_clicks(live: LiveSimulation, mut clicks: mpsc::Receiver<()>) {
    while clicks.recv().await.is_some() {
        live.click().await;
    }
    tracing::debug!("click source closed");
}

/// Lines on stdin act as primary clicks. Reads on a plain thread so a
/// pending read never holds up process exit.
pub fn stdin_clicks() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.blocking_send(()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("stdin read failed: {e}");
                    break;
                }
            }
        }
    });
    rx
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
