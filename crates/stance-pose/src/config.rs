use serde::Deserialize;
use std::fmt;

use crate::filter::ConfidenceMode;

/// Minimum joint confidence in normal operation
pub const DEFAULT_THRESHOLD: f32 = 0.3;
/// Minimum joint confidence while debug mode is on
pub const DEBUG_THRESHOLD: f32 = 0.1;

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config io error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// The two operating points of the joint filter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ConfidenceThresholds {
    #[serde(default = "default_normal")]
    pub normal: f32,
    #[serde(default = "default_debug")]
    pub debug: f32,
}

fn default_normal() -> f32 { DEFAULT_THRESHOLD }
fn default_debug() -> f32 { DEBUG_THRESHOLD }

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            normal: default_normal(),
            debug: default_debug(),
        }
    }
}

impl ConfidenceThresholds {
    pub fn for_mode(&self, mode: ConfidenceMode) -> f32 {
        match mode {
            ConfidenceMode::Normal => self.normal,
            ConfidenceMode::Debug => self.debug,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("normal", self.normal), ("debug", self.debug)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} threshold {value} outside [0, 1]"
                )));
            }
        }
        if self.debug > self.normal {
            return Err(ConfigError::Invalid(format!(
                "debug threshold {} must not exceed normal threshold {}",
                self.debug, self.normal
            )));
        }
        Ok(())
    }
}

/// Empirical classifier constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ClassifierTuning {
    /// Knees must sit this far below the hips (normalized units) to count as a squat
    #[serde(default = "default_squat_margin")]
    pub squat_margin: f32,
    /// Accuracy points lost per degree of deviation from the ideal angle
    #[serde(default = "default_angle_slope")]
    pub angle_slope: f32,
    /// Half-width in degrees of the "good form" band around the ideal angle
    #[serde(default = "default_form_band")]
    pub form_band: f32,
    #[serde(default = "default_pushup_ideal_elbow")]
    pub pushup_ideal_elbow: f32,
    #[serde(default = "default_plank_ideal_body_line")]
    pub plank_ideal_body_line: f32,
    /// Torso counts as horizontal when its horizontal span is at least this
    /// multiple of its vertical span
    #[serde(default = "default_horizontal_ratio")]
    pub horizontal_ratio: f32,
}

fn default_squat_margin() -> f32 { 0.05 }
fn default_angle_slope() -> f32 { 2.0 }
fn default_form_band() -> f32 { 15.0 }
fn default_pushup_ideal_elbow() -> f32 { 90.0 }
fn default_plank_ideal_body_line() -> f32 { 180.0 }
fn default_horizontal_ratio() -> f32 { 1.0 }

impl Default for ClassifierTuning {
    fn default() -> Self {
        Self {
            squat_margin: default_squat_margin(),
            angle_slope: default_angle_slope(),
            form_band: default_form_band(),
            pushup_ideal_elbow: default_pushup_ideal_elbow(),
            plank_ideal_body_line: default_plank_ideal_body_line(),
            horizontal_ratio: default_horizontal_ratio(),
        }
    }
}

impl ClassifierTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("squat_margin", self.squat_margin, 0.0, 1.0),
            ("angle_slope", self.angle_slope, 0.0, 100.0),
            ("form_band", self.form_band, 0.0, 180.0),
            ("pushup_ideal_elbow", self.pushup_ideal_elbow, 0.0, 180.0),
            ("plank_ideal_body_line", self.plank_ideal_body_line, 0.0, 180.0),
            ("horizontal_ratio", self.horizontal_ratio, 0.0, f32::MAX),
        ];
        for (name, value, min, max) in checks {
            if !value.is_finite() || value < min || value > max {
                return Err(ConfigError::Invalid(format!(
                    "{name} = {value} outside [{min}, {max}]"
                )));
            }
        }
        Ok(())
    }
}
