use stance_base::Vec2;
use stance_pose::{DetectedPose, JointName, PoseFrame};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Observable pipeline output, replaced wholesale on every publish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseState {
    pub is_detecting: bool,
    pub current_pose: DetectedPose,
    /// Filtered joints in normalized coordinates
    pub frame: PoseFrame,
    /// Submission sequence of the frame that produced this state, 0 if none
    pub sequence: u64,
}

impl PoseState {
    pub(crate) fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn detecting() -> Self {
        Self {
            is_detecting: true,
            ..Self::default()
        }
    }

    /// Normalized joint positions, before any screen projection
    pub fn key_points(&self) -> HashMap<JointName, Vec2<f32>> {
        self.frame.positions()
    }
}

/// Snapshot of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub submitted: u64,
    pub accepted: u64,
    pub dropped_busy: u64,
    pub dropped_stopped: u64,
    pub estimator_failures: u64,
    pub published: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub submitted: AtomicU64,
    pub accepted: AtomicU64,
    pub dropped_busy: AtomicU64,
    pub dropped_stopped: AtomicU64,
    pub estimator_failures: AtomicU64,
    pub published: AtomicU64,
    pub discarded: AtomicU64,
}

impl StatsCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStats {
        let read = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        PipelineStats {
            submitted: read(&self.submitted),
            accepted: read(&self.accepted),
            dropped_busy: read(&self.dropped_busy),
            dropped_stopped: read(&self.dropped_stopped),
            estimator_failures: read(&self.estimator_failures),
            published: read(&self.published),
            discarded: read(&self.discarded),
        }
    }
}
