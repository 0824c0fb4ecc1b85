use stance_pose::ConfigError;
use std::fmt;

/// Failure reported by a pose estimation backend for one frame.
#[derive(Debug)]
pub enum EstimatorError {
    Backend(String),
    InvalidFrame(String),
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorError::Backend(msg) => write!(f, "estimator backend error: {msg}"),
            EstimatorError::InvalidFrame(msg) => write!(f, "invalid frame: {msg}"),
        }
    }
}

impl std::error::Error for EstimatorError {}

#[derive(Debug)]
pub enum PipelineError {
    Thread(String),
    Channel(String),
    Config(ConfigError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Thread(msg) => write!(f, "thread error: {msg}"),
            PipelineError::Channel(msg) => write!(f, "channel error: {msg}"),
            PipelineError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Thread(err.to_string())
    }
}
