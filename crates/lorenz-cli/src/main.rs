mod config;
mod live;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lorenz_core::{Projection, Simulation, State};

use crate::config::AppConfig;
use crate::live::{LiveSimulation, RunOptions};

#[derive(Parser)]
#[command(name = "lorenz", about = "Real-time Lorenz attractor trajectory engine")]
struct Cli {
    /// Config file (TOML). Falls back to $LORENZ_CONFIG, then defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the real-time tick loop; each line on stdin is a click (reset)
    Run {
        /// Stop after this many ticks (default: until Ctrl-C / SIGTERM)
        #[arg(long)]
        ticks: Option<u64>,

        /// Override ticker.interval_ms
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Print one JSON line per rendered frame
        #[arg(long)]
        frames: bool,
    },

    /// Advance a number of ticks as fast as possible and print statistics
    Step {
        #[arg(long, default_value_t = 1)]
        ticks: u64,
    },

    /// Advance, then emit the final frame's segments as JSON lines
    Trace {
        #[arg(long, default_value_t = 1)]
        ticks: u64,

        /// Emit every Nth segment
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match &cli.command {
        Commands::Run {
            ticks,
            interval_ms,
            frames,
        } => cmd_run(&config, *ticks, *interval_ms, *frames).await,
        Commands::Step { ticks } => cmd_step(&config, *ticks),
        Commands::Trace { ticks, every } => cmd_trace(&config, *ticks, *every),
        Commands::Config => cmd_config(&config),
    }
}

fn fmt_state(s: State) -> String {
    format!("[{:.6}, {:.6}, {:.6}]", s.x, s.y, s.z)
}

fn print_stats(sim: &Simulation) {
    let snapshot = sim.snapshot();
    println!("points:   {}", snapshot.len());
    println!("ticks:    {}", sim.ticks());
    println!("steps:    {}", sim.steps());
    println!("sim_time: {:.3}", sim.sim_time());
    if let (Some(first), Some(last)) = (snapshot.first(), snapshot.last()) {
        println!("first:    {}", fmt_state(first));
        println!("last:     {}", fmt_state(last));
    }
    println!("halted:   {}", sim.is_halted());
}

async fn cmd_run(
    config: &AppConfig,
    ticks: Option<u64>,
    interval_ms: Option<u64>,
    frames: bool,
) -> Result<()> {
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.ticker.interval_ms));
    let live = LiveSimulation::new(Simulation::new(config.simulation.clone()), &config.viewport);

    let report = live
        .run(
            RunOptions {
                interval,
                max_ticks: ticks,
                print_frames: frames,
            },
            live::stdin_clicks(),
        )
        .await;

    tracing::info!(
        "stopped after {} ticks, {} frames, {} clicks",
        report.ticks,
        report.frames,
        report.clicks
    );
    if !frames {
        live.with_simulation(print_stats).await;
    }
    Ok(())
}

fn cmd_step(config: &AppConfig, ticks: u64) -> Result<()> {
    let mut sim = Simulation::new(config.simulation.clone());
    for _ in 0..ticks {
        sim.on_tick();
    }
    if sim.is_halted() {
        tracing::warn!("integration halted on a non-finite state");
    }
    print_stats(&sim);
    Ok(())
}

fn cmd_trace(config: &AppConfig, ticks: u64, every: u64) -> Result<()> {
    use std::io::Write;

    let mut sim = Simulation::new(config.simulation.clone());
    for _ in 0..ticks {
        sim.on_tick();
    }
    let projection = Projection::new(&config.viewport, sim.config());

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for segment in projection.segments(sim.snapshot()).step_by(every as usize) {
        let line = serde_json::to_string(&segment).context("failed to encode segment")?;
        writeln!(out, "{line}").context("failed to write segment")?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn cmd_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
