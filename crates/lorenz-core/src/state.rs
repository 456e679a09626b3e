use serde::{Deserialize, Serialize};

use crate::constants::INITIAL_STATE;

/// Instantaneous position of the system in phase space.
///
/// Serialized as a plain `[x, y, z]` array so configuration files can write
/// `initial_state = [0.1, 0.0, 0.0]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One stored tick of the trajectory. Points are copies, never aliases of
/// the driver's live state.
pub type TrajectoryPoint = State;

impl State {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// `self + h * k`, componentwise.
    pub fn offset(self, k: Self, h: f64) -> Self {
        Self {
            x: self.x + h * k.x,
            y: self.y + h * k.y,
            z: self.z + h * k.z,
        }
    }

    /// True when no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::from(INITIAL_STATE)
    }
}

impl From<[f64; 3]> for State {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<State> for [f64; 3] {
    fn from(s: State) -> Self {
        s.to_array()
    }
}
