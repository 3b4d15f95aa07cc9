//! Configuration for the fireworks scheduler.
//!
//! A [`FireworksConfig`] can be built in code with the `with_*` methods or
//! loaded from JSON. Every field has a default, so a config file only needs
//! the values it changes:
//!
//! ```json
//! {
//!     "mode": "accumulator",
//!     "projection": "Orthographic",
//!     "frustum_size": 20.0,
//!     "shell": { "fade": { "kind": "time_ratio", "lifetime": 4.0 } }
//! }
//! ```
//!
//! Two effect styles are carried side by side because the two launch modes
//! use different burst shapes and fade clocks:
//!
//! | Mode | Style | Patterns | Fade |
//! |------|-------|----------|------|
//! | [`LaunchMode::Interval`] | [`rocket`](FireworksConfig::rocket) | burst family | fixed decrement per step |
//! | [`LaunchMode::Accumulator`] | [`shell`](FireworksConfig::shell) | launch family | time ratio |

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::ProjectionKind;
use crate::error::ConfigError;
use crate::material::BlendMode;
use crate::pattern::{Pattern, PatternFamily};

/// When new fireworks are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// A wall-clock timer fires every [`interval`](FireworksConfig::interval)
    /// seconds and launches a small random batch.
    #[default]
    Interval,
    /// One launch whenever `now - last_launch >= launch_duration`; the last
    /// launch time then snaps to `floor(now)`.
    Accumulator,
}

/// How a burst's opacity falls over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FadePolicy {
    /// Subtract a constant every step.
    FixedDecrement {
        /// Opacity removed per step.
        per_step: f32,
    },
    /// `max(1 - (now - launch) / lifetime, 0)`.
    TimeRatio {
        /// Seconds from launch until fully transparent.
        lifetime: f32,
    },
}

impl FadePolicy {
    /// Opacity after one step.
    pub fn next(&self, current: f32, now: f32, launched_at: f32) -> f32 {
        match *self {
            FadePolicy::FixedDecrement { per_step } => current - per_step,
            FadePolicy::TimeRatio { lifetime } => (1.0 - (now - launched_at) / lifetime).max(0.0),
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        match *self {
            FadePolicy::FixedDecrement { per_step } if !(per_step > 0.0) => {
                Err(ConfigError::invalid(field, "per_step must be positive"))
            }
            FadePolicy::TimeRatio { lifetime } if !(lifetime > 0.0) => {
                Err(ConfigError::invalid(field, "lifetime must be positive"))
            }
            _ => Ok(()),
        }
    }
}

/// Shape and motion of one kind of firework.
///
/// Fields missing from JSON take the [`EffectStyle::rocket`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectStyle {
    /// Family to draw random patterns from.
    pub family: PatternFamily,
    /// Fixed pattern, or `None` to pick one at random per effect.
    pub pattern: Option<Pattern>,
    /// Particles per burst.
    pub particle_count: usize,
    /// Fraction of velocity applied per step.
    pub speed_control: f32,
    /// Per-axis factor applied to generated velocities.
    pub velocity_multiplier: [f32; 3],
    /// Subtracted from vertical velocity every step.
    pub vertical_decay: f32,
    /// Optional gravity (units/s^2). Off unless set.
    pub gravity: Option<f32>,
    /// Opacity clock.
    pub fade: FadePolicy,
    /// Point size, or `None` for the projection default.
    pub point_size: Option<f32>,
    /// Blend mode of the burst.
    pub blend: BlendMode,
}

impl EffectStyle {
    /// Rising sprite that bursts into a disk or sphere and fades by a fixed
    /// step.
    pub fn rocket() -> Self {
        Self {
            family: PatternFamily::Burst,
            pattern: None,
            particle_count: 250,
            speed_control: 0.65,
            velocity_multiplier: [0.08, 0.08, 0.01],
            vertical_decay: 0.0005,
            gravity: None,
            fade: FadePolicy::FixedDecrement { per_step: 0.0025 },
            point_size: None,
            blend: BlendMode::Alpha,
        }
    }

    /// Additive shell with launch family patterns that fades over five
    /// seconds.
    pub fn shell() -> Self {
        Self {
            family: PatternFamily::Launch,
            pattern: None,
            particle_count: 300,
            speed_control: 0.5,
            velocity_multiplier: [1.0, 1.0, 1.0],
            vertical_decay: 0.0,
            gravity: None,
            fade: FadePolicy::TimeRatio { lifetime: 5.0 },
            point_size: Some(15.0),
            blend: BlendMode::Additive,
        }
    }

    /// Use a fixed pattern.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Set the particle count.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the fade policy.
    pub fn with_fade(mut self, fade: FadePolicy) -> Self {
        self.fade = fade;
        self
    }

    /// Enable the gravity term.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = Some(gravity);
        self
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.speed_control >= 0.0) {
            return Err(ConfigError::invalid(field, "speed_control must not be negative"));
        }
        if let Some(size) = self.point_size {
            if !(size > 0.0) {
                return Err(ConfigError::invalid(field, "point_size must be positive"));
            }
        }
        self.fade.validate(field)
    }
}

impl Default for EffectStyle {
    fn default() -> Self {
        Self::rocket()
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Admission policy.
    pub mode: LaunchMode,
    /// Accumulator mode: seconds between launches.
    pub launch_duration: f32,
    /// Interval mode: timer period in seconds.
    pub interval: f32,
    /// Interval mode: inclusive `[min, max]` launches per timer fire.
    pub launches_per_fire: [u32; 2],
    /// Projection for cameras built from this config with
    /// [`ViewCamera::new`](crate::ViewCamera::new). The scheduler itself
    /// follows the projection of the camera it is given.
    pub projection: ProjectionKind,
    /// Initial orthographic frustum height.
    pub frustum_size: f32,
    /// Frustum height at which burst radii are unscaled.
    pub reference_frustum: f32,
    /// Distance from the camera at which unprojected targets are placed.
    pub launch_distance: f32,
    /// Height rockets start from.
    pub floor_height: f32,
    /// Seconds from launch to detonation.
    pub ascent_duration: f32,
    /// Base particle speed per unit of frustum height.
    pub speed_factor: f32,
    /// Burst family radius.
    pub explosion_radius: f32,
    /// Style used in interval mode.
    pub rocket: EffectStyle,
    /// Style used in accumulator mode.
    pub shell: EffectStyle,
    /// Base colors for launch family bursts.
    pub palette: Vec<[f32; 3]>,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            mode: LaunchMode::Interval,
            launch_duration: 1.0,
            interval: 1.0,
            launches_per_fire: [1, 2],
            projection: ProjectionKind::Perspective,
            frustum_size: 10.0,
            reference_frustum: 10.0,
            launch_distance: 8.0,
            floor_height: -4.0,
            ascent_duration: 1.0,
            speed_factor: 0.004,
            explosion_radius: 0.6,
            rocket: EffectStyle::rocket(),
            shell: EffectStyle::shell(),
            palette: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl FireworksConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FireworksConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded fireworks config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.launch_duration > 0.0) {
            return Err(ConfigError::invalid("launch_duration", "must be positive"));
        }
        if !(self.interval > 0.0) {
            return Err(ConfigError::invalid("interval", "must be positive"));
        }
        let [min, max] = self.launches_per_fire;
        if min > max || max == 0 {
            return Err(ConfigError::invalid(
                "launches_per_fire",
                format!("expected 0 <= min <= max with max > 0, got [{}, {}]", min, max),
            ));
        }
        if !(self.frustum_size > 0.0) {
            return Err(ConfigError::invalid("frustum_size", "must be positive"));
        }
        if !(self.reference_frustum > 0.0) {
            return Err(ConfigError::invalid("reference_frustum", "must be positive"));
        }
        if !(self.ascent_duration > 0.0) {
            return Err(ConfigError::invalid("ascent_duration", "must be positive"));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::invalid("palette", "needs at least one color"));
        }
        self.rocket.validate("rocket")?;
        self.shell.validate("shell")
    }

    /// Style of fireworks launched in the current mode.
    pub fn active_style(&self) -> &EffectStyle {
        match self.mode {
            LaunchMode::Interval => &self.rocket,
            LaunchMode::Accumulator => &self.shell,
        }
    }

    /// Set the launch mode.
    pub fn with_mode(mut self, mode: LaunchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the accumulator launch duration.
    pub fn with_launch_duration(mut self, seconds: f32) -> Self {
        self.launch_duration = seconds;
        self
    }

    /// Set the interval timer period.
    pub fn with_interval(mut self, seconds: f32) -> Self {
        self.interval = seconds;
        self
    }

    /// Set how many fireworks each timer fire launches.
    pub fn with_launches_per_fire(mut self, min: u32, max: u32) -> Self {
        self.launches_per_fire = [min, max];
        self
    }

    /// Set the camera projection and initial frustum height.
    pub fn with_projection(mut self, projection: ProjectionKind, frustum_size: f32) -> Self {
        self.projection = projection;
        self.frustum_size = frustum_size;
        self
    }

    /// Set the ascent duration.
    pub fn with_ascent_duration(mut self, seconds: f32) -> Self {
        self.ascent_duration = seconds;
        self
    }

    /// Replace the rocket style.
    pub fn with_rocket(mut self, style: EffectStyle) -> Self {
        self.rocket = style;
        self
    }

    /// Replace the shell style.
    pub fn with_shell(mut self, style: EffectStyle) -> Self {
        self.shell = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        FireworksConfig::default().validate().unwrap();
        assert_eq!(FireworksConfig::default().active_style(), &EffectStyle::rocket());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FireworksConfig::from_json_str(
            r#"{
                "mode": "accumulator",
                "projection": "Orthographic",
                "frustum_size": 20.0,
                "shell": { "fade": { "kind": "time_ratio", "lifetime": 4.0 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.mode, LaunchMode::Accumulator);
        assert_eq!(config.projection, ProjectionKind::Orthographic);
        assert_eq!(config.frustum_size, 20.0);
        assert_eq!(config.shell.fade, FadePolicy::TimeRatio { lifetime: 4.0 });
        assert_eq!(config.shell.particle_count, EffectStyle::rocket().particle_count);
        assert_eq!(config.launch_duration, 1.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = FireworksConfig::new()
            .with_mode(LaunchMode::Accumulator)
            .with_rocket(EffectStyle::rocket().with_pattern(Pattern::Spherical));
        let json = config.to_json().unwrap();
        assert_eq!(FireworksConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = FireworksConfig::new().with_launch_duration(0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "launch_duration", .. }));

        let err = FireworksConfig::new().with_launches_per_fire(3, 1).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "launches_per_fire", .. }));

        let style = EffectStyle::rocket().with_fade(FadePolicy::TimeRatio { lifetime: 0.0 });
        let err = FireworksConfig::new().with_rocket(style).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rocket", .. }));
    }

    #[test]
    fn test_fade_policies() {
        let fixed = FadePolicy::FixedDecrement { per_step: 0.25 };
        assert_eq!(fixed.next(1.0, 100.0, 0.0), 0.75);

        let ratio = FadePolicy::TimeRatio { lifetime: 5.0 };
        assert_eq!(ratio.next(1.0, 2.5, 0.0), 0.5);
        assert_eq!(ratio.next(0.5, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = FireworksConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
