use serde::Deserialize;
use stance_pose::{ClassifierTuning, ConfidenceThresholds, ConfigError, ExerciseKind};
use std::fs;
use std::path::Path;

/// Configuration for a [`PipelineCoordinator`](crate::PipelineCoordinator).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    thresholds: ConfidenceThresholds,
    #[serde(default)]
    tuning: ClassifierTuning,
    /// Start in debug mode (lowered confidence threshold)
    #[serde(default)]
    debug: bool,
    /// Exercise selected at startup
    #[serde(default)]
    exercise: Option<ExerciseKind>,
}

impl PipelineConfig {
    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_tuning(mut self, tuning: ClassifierTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_exercise(mut self, exercise: ExerciseKind) -> Self {
        self.exercise = Some(exercise);
        self
    }

    pub fn thresholds(&self) -> ConfidenceThresholds {
        self.thresholds
    }

    pub fn tuning(&self) -> ClassifierTuning {
        self.tuning
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.exercise
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.tuning.validate()
    }
}
