//! Capture, estimation and publication loop for the pose overlay.
//!
//! A capture thread pulls frames from a [`FrameSource`] and hands them to a
//! single worker thread through a capacity-1 channel. The worker runs the
//! [`PoseEstimator`], filters and classifies the joints, and publishes a
//! [`PoseState`] to any number of subscribers. Frames arriving while an
//! estimation is in flight are dropped.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod frame;
pub mod state;
pub mod traits;

pub use config::PipelineConfig;
pub use coordinator::{PipelineCoordinator, SubmitOutcome, Submitter, CAPTURE_JOIN_GRACE};
pub use error::{EstimatorError, PipelineError};
pub use frame::Frame;
pub use state::{PipelineStats, PoseState};
pub use traits::{FrameSource, PoseEstimator};
