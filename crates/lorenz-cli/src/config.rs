use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use lorenz_core::{SimulationConfig, Viewport};
use serde::{Deserialize, Serialize};

/// Env var naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "LORENZ_CONFIG";

/// External timer cadence. Not part of the core: the core only sees ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TickerConfig {
    pub interval_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        // ~60 frames per second
        Self { interval_ms: 16 }
    }
}

/// Startup configuration, one TOML table per concern.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub viewport: Viewport,
    pub ticker: TickerConfig,
}

impl AppConfig {
    /// Resolve the config source: explicit path, then `LORENZ_CONFIG`, then
    /// built-in defaults. A named file that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map(Path::to_path_buf).or_else(|| {
            std::env::var(CONFIG_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });

        let Some(path) = path else {
            tracing::debug!("no config file given, using defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.viewport.validate()?;
        if self.ticker.interval_ms == 0 {
            bail!("ticker.interval_ms must be at least 1");
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}
