//! Falling motion with wraparound.
//!
//! Every animated instance drops by a fixed amount each frame. Once it passes
//! the floor it is put back at the ceiling in a single step, with no
//! interpolation across the jump.
//!
//! ```
//! use raindrops::fall::{step, FallConfig};
//!
//! let cfg = FallConfig::default();
//! assert_eq!(step(-9.95, &cfg), 10.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fall speed and vertical bounds shared by all animated instances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    /// Distance subtracted from the vertical position every frame.
    pub fall_speed: f32,
    /// Positions strictly below this value wrap.
    pub floor_y: f32,
    /// Position a wrapped instance is reset to.
    pub ceiling_y: f32,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            fall_speed: 0.1,
            floor_y: -10.0,
            ceiling_y: 10.0,
        }
    }
}

impl FallConfig {
    /// Check that the fall actually moves downward between sane bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fall_speed.is_finite() && self.fall_speed > 0.0) {
            return Err(ConfigError::invalid(
                "fall.fall_speed",
                format!("must be a positive number, got {}", self.fall_speed),
            ));
        }
        if !(self.floor_y.is_finite() && self.ceiling_y.is_finite()) {
            return Err(ConfigError::invalid("fall", "bounds must be finite"));
        }
        if self.floor_y >= self.ceiling_y {
            return Err(ConfigError::invalid(
                "fall.floor_y",
                format!(
                    "must be below ceiling_y ({} >= {})",
                    self.floor_y, self.ceiling_y
                ),
            ));
        }
        Ok(())
    }
}

/// The only phase an animated instance is ever in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallPhase {
    #[default]
    Falling,
}

/// Outcome of a single animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub y: f32,
    pub wrapped: bool,
}

/// Advance one vertical position by one frame.
#[inline]
pub fn advance(y: f32, cfg: &FallConfig) -> Step {
    let next = y - cfg.fall_speed;
    if next < cfg.floor_y {
        Step {
            y: cfg.ceiling_y,
            wrapped: true,
        }
    } else {
        Step {
            y: next,
            wrapped: false,
        }
    }
}

/// Advance one vertical position by one frame, discarding the wrap flag.
#[inline]
pub fn step(y: f32, cfg: &FallConfig) -> f32 {
    advance(y, cfg).y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_without_wrap() {
        let cfg = FallConfig::default();
        assert_relative_eq!(step(5.0, &cfg), 4.9, epsilon = 1e-6);
    }

    #[test]
    fn test_step_wraps_to_ceiling_not_floor() {
        let cfg = FallConfig::default();
        let s = advance(-9.95, &cfg);
        assert!(s.wrapped);
        assert_eq!(s.y, 10.0);
    }

    #[test]
    fn test_exactly_on_floor_does_not_wrap() {
        let cfg = FallConfig {
            fall_speed: 0.5,
            floor_y: -1.0,
            ceiling_y: 1.0,
        };
        let s = advance(-0.5, &cfg);
        assert!(!s.wrapped);
        assert_eq!(s.y, -1.0);
    }

    #[test]
    fn test_k_steps_follow_linear_fall_then_wrap_once() {
        let cfg = FallConfig::default();
        let p0 = 3.0_f32;
        let mut y = p0;
        let mut wraps = 0;
        for k in 1..=400 {
            let s = advance(y, &cfg);
            if s.wrapped {
                wraps += 1;
                assert_eq!(s.y, cfg.ceiling_y);
                if wraps == 1 {
                    // The first crossing happens when p0 - 0.1k would drop below -10.
                    assert!(p0 - 0.1 * k as f32 <= cfg.floor_y + 1e-3);
                }
            } else if wraps == 0 {
                assert_relative_eq!(s.y, p0 - 0.1 * k as f32, epsilon = 1e-3);
            }
            assert!(s.y >= cfg.floor_y);
            y = s.y;
        }
        // 400 frames * 0.1 = 40 units of travel across a 20 unit span.
        assert_eq!(wraps, 2);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let cfg = FallConfig {
            fall_speed: 0.1,
            floor_y: 10.0,
            ceiling_y: -10.0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_speed() {
        let cfg = FallConfig {
            fall_speed: 0.0,
            ..FallConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(FallConfig::default().validate().is_ok());
    }
}
