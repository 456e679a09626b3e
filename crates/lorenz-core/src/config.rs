use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BETA, BUFFER_CAPACITY, RHO, SCALE, SIGMA, STEPS_PER_TICK, TIME_STEP};
use crate::state::State;

/// What the driver does when a step produces a NaN or infinite component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Commit the step anyway. The buffer carries the bad point until reset.
    #[default]
    Propagate,
    /// Drop the step and stop advancing until the next reset.
    Halt,
}

/// How projected coordinates are snapped to whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round half away from zero.
    #[default]
    Nearest,
    /// Truncate toward zero, like an integer cast.
    Truncate,
}

impl Rounding {
    pub fn apply(self, v: f64) -> i64 {
        match self {
            Rounding::Nearest => v.round() as i64,
            Rounding::Truncate => v.trunc() as i64,
        }
    }
}

/// Lorenz field coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: SIGMA,
            rho: RHO,
            beta: BETA,
        }
    }
}

/// Immutable run configuration, passed into the core at construction.
///
/// Every field defaults to the classic values, so a partial TOML table only
/// needs to name what it overrides. Unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    pub time_step: f64,
    pub buffer_capacity: usize,
    pub steps_per_tick: usize,
    pub scale: f64,
    pub initial_state: State,
    pub non_finite: NonFinitePolicy,
    pub rounding: Rounding,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sigma: SIGMA,
            rho: RHO,
            beta: BETA,
            time_step: TIME_STEP,
            buffer_capacity: BUFFER_CAPACITY,
            steps_per_tick: STEPS_PER_TICK,
            scale: SCALE,
            initial_state: State::default(),
            non_finite: NonFinitePolicy::default(),
            rounding: Rounding::default(),
        }
    }
}

impl SimulationConfig {
    pub fn params(&self) -> LorenzParams {
        LorenzParams {
            sigma: self.sigma,
            rho: self.rho,
            beta: self.beta,
        }
    }

    /// Check the values the core cannot run with.
    ///
    /// `steps_per_tick = 0` is accepted: ticks then only request a redraw.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("sigma", self.sigma),
            ("rho", self.rho),
            ("beta", self.beta),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "time_step",
                value: self.time_step,
            });
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "scale",
                value: self.scale,
            });
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.initial_state.is_finite() {
            return Err(ConfigError::InitialState(self.initial_state));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NotFinite { field: &'static str, value: f64 },
    NotPositive { field: &'static str, value: f64 },
    ZeroCapacity,
    InitialState(State),
    Viewport(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFinite { field, value } => {
                write!(f, "{field} must be finite, got {value}")
            }
            ConfigError::NotPositive { field, value } => {
                write!(f, "{field} must be finite and > 0, got {value}")
            }
            ConfigError::ZeroCapacity => write!(f, "buffer_capacity must be at least 1"),
            ConfigError::InitialState(s) => write!(
                f,
                "initial_state must be finite, got [{}, {}, {}]",
                s.x, s.y, s.z
            ),
            ConfigError::Viewport(msg) => write!(f, "invalid viewport: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_regime() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.sigma, 10.0);
        assert_eq!(cfg.rho, 28.0);
        assert_eq!(cfg.beta, 8.0 / 3.0);
        assert_eq!(cfg.time_step, 0.01);
        assert_eq!(cfg.buffer_capacity, 10_000);
        assert_eq!(cfg.steps_per_tick, 5);
        assert_eq!(cfg.scale, 15.0);
        assert_eq!(cfg.initial_state, State::new(0.1, 0.0, 0.0));
        assert_eq!(cfg.non_finite, NonFinitePolicy::Propagate);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let cfg: SimulationConfig =
            serde_json::from_str(r#"{"rho": 99.96, "steps_per_tick": 1}"#).unwrap();
        assert_eq!(cfg.rho, 99.96);
        assert_eq!(cfg.steps_per_tick, 1);
        assert_eq!(cfg.sigma, 10.0);
        assert_eq!(cfg.buffer_capacity, 10_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_json::from_str::<SimulationConfig>(r#"{"gamma": 1.0}"#).unwrap_err();
        assert!(err.to_string().contains("gamma"), "{err}");
    }

    #[test]
    fn test_policy_names() {
        let cfg: SimulationConfig =
            serde_json::from_str(r#"{"non_finite": "halt", "rounding": "truncate"}"#).unwrap();
        assert_eq!(cfg.non_finite, NonFinitePolicy::Halt);
        assert_eq!(cfg.rounding, Rounding::Truncate);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_step = SimulationConfig {
            time_step: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_step.validate(),
            Err(ConfigError::NotPositive {
                field: "time_step",
                ..
            })
        ));

        let bad_capacity = SimulationConfig {
            buffer_capacity: 0,
            ..Default::default()
        };
        assert_eq!(bad_capacity.validate(), Err(ConfigError::ZeroCapacity));

        let bad_sigma = SimulationConfig {
            sigma: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad_sigma.validate(),
            Err(ConfigError::NotFinite { field: "sigma", .. })
        ));

        let bad_start = SimulationConfig {
            initial_state: State::new(f64::INFINITY, 0.0, 0.0),
            ..Default::default()
        };
        assert!(matches!(
            bad_start.validate(),
            Err(ConfigError::InitialState(_))
        ));
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(Rounding::Nearest.apply(1.5), 2);
        assert_eq!(Rounding::Nearest.apply(-1.5), -2);
        assert_eq!(Rounding::Nearest.apply(1.49), 1);
        assert_eq!(Rounding::Truncate.apply(1.99), 1);
        assert_eq!(Rounding::Truncate.apply(-1.99), -1);
    }
}
