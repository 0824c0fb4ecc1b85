use stance_base::Vec2;
use std::collections::HashMap;
use std::fmt;

/// Number of named joints reported by the estimator (COCO body layout)
pub const JOINT_COUNT: usize = 17;

/// Named anatomical joints, indexed in COCO order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointName {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl JointName {
    pub const ALL: [JointName; JOINT_COUNT] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "left_eye",
            JointName::RightEye => "right_eye",
            JointName::LeftEar => "left_ear",
            JointName::RightEar => "right_ear",
            JointName::LeftShoulder => "left_shoulder",
            JointName::RightShoulder => "right_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::RightElbow => "right_elbow",
            JointName::LeftWrist => "left_wrist",
            JointName::RightWrist => "right_wrist",
            JointName::LeftHip => "left_hip",
            JointName::RightHip => "right_hip",
            JointName::LeftKnee => "left_knee",
            JointName::RightKnee => "right_knee",
            JointName::LeftAnkle => "left_ankle",
            JointName::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<JointName> for usize {
    fn from(name: JointName) -> usize {
        name as usize
    }
}

impl TryFrom<usize> for JointName {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        JointName::ALL.get(value).copied().ok_or_else(|| {
            format!(
                "Invalid joint index: {}. Must be in range 0-{}.",
                value,
                JOINT_COUNT - 1
            )
        })
    }
}

/// A single joint with normalized 2D position and confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub name: JointName,
    /// Position in the estimator's normalized frame, `[0,1] x [0,1]`
    pub position: Vec2<f32>,
    /// Confidence in `[0,1]`
    pub confidence: f32,
}

impl Joint {
    pub fn new(name: JointName, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name,
            position: Vec2::new(x, y),
            confidence,
        }
    }
}

/// Unfiltered estimator output for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPose {
    pub joints: Vec<Joint>,
}

impl RawPose {
    pub fn new(joints: Vec<Joint>) -> Self {
        Self { joints }
    }
}

/// Filtered joints for one video frame, keyed by name.
///
/// Built once per frame by the joint filter and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    joints: HashMap<JointName, Joint>,
}

impl PoseFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: JointName) -> Option<&Joint> {
        self.joints.get(&name)
    }

    pub fn position(&self, name: JointName) -> Option<Vec2<f32>> {
        self.joints.get(&name).map(|joint| joint.position)
    }

    pub fn contains(&self, name: JointName) -> bool {
        self.joints.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    /// Normalized positions of all retained joints
    pub fn positions(&self) -> HashMap<JointName, Vec2<f32>> {
        self.joints
            .iter()
            .map(|(name, joint)| (*name, joint.position))
            .collect()
    }
}

impl FromIterator<Joint> for PoseFrame {
    fn from_iter<I: IntoIterator<Item = Joint>>(iter: I) -> Self {
        Self {
            joints: iter.into_iter().map(|joint| (joint.name, joint)).collect(),
        }
    }
}

/// Discrete pose verdict for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoseLabel {
    #[default]
    Unknown,
    Standing,
    Squat,
    Pushup,
    Plank,
}

impl PoseLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PoseLabel::Unknown => "unknown",
            PoseLabel::Standing => "standing",
            PoseLabel::Squat => "squat",
            PoseLabel::Pushup => "pushup",
            PoseLabel::Plank => "plank",
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form verdict for angle-scored exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormFeedback {
    TooShallow,
    TooDeep,
    GoodForm,
}

impl FormFeedback {
    pub fn message(self) -> &'static str {
        match self {
            FormFeedback::TooShallow => "Too shallow - go lower",
            FormFeedback::TooDeep => "Too deep - come up a little",
            FormFeedback::GoodForm => "Good form!",
        }
    }
}

/// Classifier verdict: label plus accuracy in `[0,1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectedPose {
    pub label: PoseLabel,
    pub accuracy: f32,
    /// Measured joint angle in degrees, for angle-scored exercises
    pub angle: Option<f32>,
    pub feedback: Option<FormFeedback>,
}

impl DetectedPose {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn new(label: PoseLabel, accuracy: f32) -> Self {
        Self {
            label,
            accuracy: if accuracy.is_finite() {
                accuracy.clamp(0.0, 1.0)
            } else {
                0.0
            },
            angle: None,
            feedback: None,
        }
    }

    pub fn with_form(mut self, angle: f32, feedback: FormFeedback) -> Self {
        self.angle = Some(angle);
        self.feedback = Some(feedback);
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.label == PoseLabel::Unknown
    }
}
