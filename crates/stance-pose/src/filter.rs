use std::collections::HashMap;

use crate::types::{Joint, JointName, PoseFrame, RawPose};

/// Which confidence threshold the filter runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceMode {
    #[default]
    Normal,
    /// Lowered threshold that surfaces near-miss detections
    Debug,
}

impl ConfidenceMode {
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            ConfidenceMode::Debug
        } else {
            ConfidenceMode::Normal
        }
    }
}

/// Keep only joints whose confidence is at or above `threshold`.
///
/// Every frame is filtered on its own; nothing carries over between calls.
/// Joints with a non-finite position are dropped, and when the estimator
/// reports the same joint twice the more confident report wins.
pub fn filter_joints(raw: &RawPose, threshold: f32) -> PoseFrame {
    let mut kept: HashMap<JointName, Joint> = HashMap::new();

    for joint in &raw.joints {
        if !(joint.confidence >= threshold) || !joint.position.is_finite() {
            continue;
        }
        match kept.get(&joint.name) {
            Some(existing) if existing.confidence >= joint.confidence => {}
            _ => {
                kept.insert(joint.name, *joint);
            }
        }
    }

    kept.into_values().collect()
}

/// Filter an optional observation; `None` is treated as "all joints below threshold".
pub fn filter_observation(raw: Option<&RawPose>, threshold: f32) -> PoseFrame {
    match raw {
        Some(raw) => filter_joints(raw, threshold),
        None => PoseFrame::empty(),
    }
}
