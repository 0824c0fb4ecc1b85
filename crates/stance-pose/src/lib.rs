//! Pose classification and overlay projection for guided workouts.
//!
//! Everything in this crate is a pure function of its inputs: joints are
//! filtered, classified against the selected exercise in normalized
//! coordinates, and projected to screen space only for rendering.

pub mod angle;
pub mod classifier;
pub mod config;
pub mod exercise;
pub mod filter;
pub mod projector;
pub mod skeleton;
pub mod types;

pub use angle::{angle_score, form_feedback, joint_angle};
pub use classifier::classify;
pub use config::{ClassifierTuning, ConfidenceThresholds, ConfigError};
pub use exercise::{ExerciseDefinition, ExerciseKind, EXERCISES};
pub use filter::{filter_joints, ConfidenceMode};
pub use projector::{
    NormalizedYAxis, Orientation, OverlayProjector, ProjectedBone, SafeAreaInsets, ScreenPoint,
    SurfaceSize,
};
pub use skeleton::{BoneGroup, SkeletonConnection, SKELETON_CONNECTIONS};
pub use types::{
    DetectedPose, FormFeedback, Joint, JointName, PoseFrame, PoseLabel, RawPose, JOINT_COUNT,
};
