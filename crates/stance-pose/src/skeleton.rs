use crate::types::JointName;

use JointName::*;

/// Body region a bone belongs to, used for overlay colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneGroup {
    Face,
    Torso,
    Arm,
    Leg,
}

/// A pair of joints drawn as one bone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonConnection {
    pub from: JointName,
    pub to: JointName,
    pub group: BoneGroup,
}

const fn bone(from: JointName, to: JointName, group: BoneGroup) -> SkeletonConnection {
    SkeletonConnection { from, to, group }
}

/// Bones of the COCO 17-joint body
pub const SKELETON_CONNECTIONS: [SkeletonConnection; 16] = [
    bone(LeftEar, LeftEye, BoneGroup::Face),
    bone(LeftEye, Nose, BoneGroup::Face),
    bone(Nose, RightEye, BoneGroup::Face),
    bone(RightEye, RightEar, BoneGroup::Face),
    bone(LeftShoulder, RightShoulder, BoneGroup::Torso),
    bone(LeftShoulder, LeftHip, BoneGroup::Torso),
    bone(RightShoulder, RightHip, BoneGroup::Torso),
    bone(LeftHip, RightHip, BoneGroup::Torso),
    bone(LeftShoulder, LeftElbow, BoneGroup::Arm),
    bone(LeftElbow, LeftWrist, BoneGroup::Arm),
    bone(RightShoulder, RightElbow, BoneGroup::Arm),
    bone(RightElbow, RightWrist, BoneGroup::Arm),
    bone(LeftHip, LeftKnee, BoneGroup::Leg),
    bone(LeftKnee, LeftAnkle, BoneGroup::Leg),
    bone(RightHip, RightKnee, BoneGroup::Leg),
    bone(RightKnee, RightAnkle, BoneGroup::Leg),
];
