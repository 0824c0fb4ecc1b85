use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::classifier::{classify_plank, classify_pushup, classify_squat};
use crate::config::ClassifierTuning;
use crate::types::{DetectedPose, JointName, PoseFrame, PoseLabel};

use JointName::*;

/// Supported workout types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    Plank,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [ExerciseKind::Squat, ExerciseKind::Pushup, ExerciseKind::Plank];

    pub fn definition(self) -> &'static ExerciseDefinition {
        match self {
            ExerciseKind::Squat => &EXERCISES[0],
            ExerciseKind::Pushup => &EXERCISES[1],
            ExerciseKind::Plank => &EXERCISES[2],
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.definition().name)
    }
}

impl FromStr for ExerciseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.definition().name == wanted)
            .ok_or_else(|| format!("unknown exercise: {s}"))
    }
}

/// Per-exercise classification entry.
pub struct ExerciseDefinition {
    pub kind: ExerciseKind,
    /// Label reported when the target pose is detected
    pub label: PoseLabel,
    pub name: &'static str,
    pub required_joints: &'static [JointName],
    /// Minimum number of `required_joints` that must be visible
    pub min_joints: usize,
    pub classifier: fn(&PoseFrame, &ClassifierTuning) -> DetectedPose,
}

impl fmt::Debug for ExerciseDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseDefinition")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("required_joints", &self.required_joints)
            .field("min_joints", &self.min_joints)
            .finish()
    }
}

impl ExerciseDefinition {
    /// Number of required joints present in `frame`
    pub fn visible_joints(&self, frame: &PoseFrame) -> usize {
        self.required_joints
            .iter()
            .filter(|name| frame.contains(**name))
            .count()
    }
}

pub static EXERCISES: [ExerciseDefinition; 3] = [
    ExerciseDefinition {
        kind: ExerciseKind::Squat,
        label: PoseLabel::Squat,
        name: "squat",
        required_joints: &[LeftShoulder, RightShoulder, LeftHip, RightHip, LeftKnee, RightKnee],
        min_joints: 3,
        classifier: classify_squat,
    },
    ExerciseDefinition {
        kind: ExerciseKind::Pushup,
        label: PoseLabel::Pushup,
        name: "pushup",
        required_joints: &[
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
        ],
        min_joints: 4,
        classifier: classify_pushup,
    },
    ExerciseDefinition {
        kind: ExerciseKind::Plank,
        label: PoseLabel::Plank,
        name: "plank",
        required_joints: &[LeftShoulder, RightShoulder, LeftHip, RightHip, LeftAnkle, RightAnkle],
        min_joints: 3,
        classifier: classify_plank,
    },
];
