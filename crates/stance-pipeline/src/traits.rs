use stance_pose::RawPose;

use crate::{EstimatorError, Frame};

/// Producer of video frames, driven from the capture thread.
pub trait FrameSource: Send {
    /// Block until the next frame is available. `None` ends the stream.
    ///
    /// The capture thread only sees shutdown between calls, so a call that
    /// never returns leaves that thread detached after the coordinator drops.
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<Frame> + Send,
{
    fn next_frame(&mut self) -> Option<Frame> {
        self()
    }
}

/// Body-pose estimation backend.
///
/// Runs on the pipeline's worker thread and may block. `Ok(None)` means the
/// frame contained no person.
pub trait PoseEstimator: Send {
    fn estimate(&mut self, frame: &Frame) -> Result<Option<RawPose>, EstimatorError>;
}

impl<F> PoseEstimator for F
where
    F: FnMut(&Frame) -> Result<Option<RawPose>, EstimatorError> + Send,
{
    fn estimate(&mut self, frame: &Frame) -> Result<Option<RawPose>, EstimatorError> {
        self(frame)
    }
}
