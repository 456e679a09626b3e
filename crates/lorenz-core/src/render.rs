//! Screen-space mapping consumed by an external renderer.
//!
//! The projection is a 2-D slice, not a camera: x maps to the horizontal
//! axis, z to the vertical axis (screen y grows downward), and y is dropped.
//! Segment colors depend only on buffer index, so once the trajectory is at
//! capacity the gradient scrolls as old points are evicted.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Rounding, SimulationConfig};
use crate::constants::GRADIENT_GREEN;
use crate::state::TrajectoryPoint;
use crate::trajectory::Snapshot;

/// Drawing surface geometry. The projection center sits in the middle of
/// the area inside the margin, pushed down by `vertical_bias` so the
/// attractor's lobes (z roughly 0..50) stay on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    pub width: i64,
    pub height: i64,
    pub margin: i64,
    pub vertical_bias: i64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            margin: 50,
            vertical_bias: 350,
        }
    }
}

impl Viewport {
    /// Pixel offset of phase-space (0, 0), using integer division.
    /// Saturates rather than overflowing on an unvalidated viewport.
    pub fn offset(&self) -> (i64, i64) {
        let twice = self.margin.saturating_mul(2);
        let inner_w = self.width.saturating_sub(twice);
        let inner_h = self.height.saturating_sub(twice);
        (
            self.margin.saturating_add(inner_w / 2),
            self.margin
                .saturating_add(inner_h / 2)
                .saturating_add(self.vertical_bias),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.margin < 0 {
            return Err(ConfigError::Viewport(format!(
                "margin must be >= 0, got {}",
                self.margin
            )));
        }
        let Some(twice) = self.margin.checked_mul(2) else {
            return Err(ConfigError::Viewport(format!(
                "margin {} is too large",
                self.margin
            )));
        };
        if self.width <= twice || self.height <= twice {
            return Err(ConfigError::Viewport(format!(
                "{}x{} leaves no drawable area inside a {} px margin",
                self.width, self.height, self.margin
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i64,
    pub y: i64,
}

/// Normalized color, each channel in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Gradient color for endpoint `index` of `len` points: red rises with
    /// the index, blue falls, green is fixed.
    pub fn gradient(index: usize, len: usize) -> Self {
        let ratio = if len == 0 {
            0.0
        } else {
            index as f32 / len as f32
        };
        Self {
            r: ratio,
            g: GRADIENT_GREEN,
            b: 1.0 - ratio,
        }
    }

    /// 8-bit channels, `(v * 255 + 0.5)` truncated.
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

/// One connected line piece of a rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: Rgb,
}

/// Phase-space to pixel mapping for one viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub offset_x: i64,
    pub offset_y: i64,
    pub scale: f64,
    pub rounding: Rounding,
}

impl Projection {
    pub fn new(viewport: &Viewport, config: &SimulationConfig) -> Self {
        let (offset_x, offset_y) = viewport.offset();
        Self {
            offset_x,
            offset_y,
            scale: config.scale,
            rounding: config.rounding,
        }
    }

    /// Pixel position of `p`. Diverged or non-finite components pin to the
    /// `i64` range instead of overflowing; NaN maps to the offset itself.
    pub fn project(&self, p: TrajectoryPoint) -> ScreenPoint {
        ScreenPoint {
            x: self
                .offset_x
                .saturating_add(self.rounding.apply(p.x * self.scale)),
            y: self
                .offset_y
                .saturating_sub(self.rounding.apply(p.z * self.scale)),
        }
    }

    /// Segments `(p[i-1], p[i])` for `i in 1..len`, colored by `i / len`.
    pub fn segments<'a>(self, snapshot: Snapshot<'a>) -> impl Iterator<Item = Segment> + 'a {
        let len = snapshot.len();
        snapshot.pairs().map(move |(i, prev, curr)| Segment {
            index: i,
            from: self.project(prev),
            to: self.project(curr),
            color: Rgb::gradient(i, len),
        })
    }
}
