use stance_pose::{DetectedPose, FormFeedback, Joint, JointName, PoseFrame, PoseLabel, JOINT_COUNT};

#[test]
fn test_joint_count() {
    assert_eq!(JOINT_COUNT, 17);
    assert_eq!(JointName::ALL.len(), JOINT_COUNT);
}

#[test]
fn test_joint_name_index_roundtrip() {
    for (index, name) in JointName::ALL.iter().enumerate() {
        assert_eq!(usize::from(*name), index);
        assert_eq!(JointName::try_from(index).unwrap(), *name);
    }
}

#[test]
fn test_joint_name_try_from_invalid() {
    assert!(JointName::try_from(17).is_err());
    assert!(JointName::try_from(100).is_err());
}

#[test]
fn test_joint_name_display() {
    assert_eq!(JointName::LeftShoulder.to_string(), "left_shoulder");
    assert_eq!(JointName::RightAnkle.to_string(), "right_ankle");
}

#[test]
fn test_pose_frame_from_joints() {
    let frame: PoseFrame = [
        Joint::new(JointName::LeftHip, 0.4, 0.5, 0.9),
        Joint::new(JointName::RightHip, 0.6, 0.5, 0.8),
    ]
    .into_iter()
    .collect();

    assert_eq!(frame.len(), 2);
    assert!(frame.contains(JointName::LeftHip));
    assert!(!frame.contains(JointName::Nose));
    assert_eq!(frame.get(JointName::RightHip).unwrap().confidence, 0.8);

    let positions = frame.positions();
    assert_eq!(positions[&JointName::LeftHip].x, 0.4);
}

#[test]
fn test_empty_pose_frame() {
    let frame = PoseFrame::empty();
    assert!(frame.is_empty());
    assert!(frame.positions().is_empty());
    assert!(frame.position(JointName::Nose).is_none());
}

#[test]
fn test_detected_pose_unknown_default() {
    let pose = DetectedPose::unknown();
    assert_eq!(pose.label, PoseLabel::Unknown);
    assert_eq!(pose.accuracy, 0.0);
    assert!(pose.is_unknown());
    assert!(pose.feedback.is_none());
}

#[test]
fn test_detected_pose_clamps_accuracy() {
    assert_eq!(DetectedPose::new(PoseLabel::Squat, 1.5).accuracy, 1.0);
    assert_eq!(DetectedPose::new(PoseLabel::Squat, -0.2).accuracy, 0.0);
    assert_eq!(DetectedPose::new(PoseLabel::Squat, f32::NAN).accuracy, 0.0);
}

#[test]
fn test_detected_pose_with_form() {
    let pose = DetectedPose::new(PoseLabel::Pushup, 0.8).with_form(95.0, FormFeedback::GoodForm);
    assert_eq!(pose.angle, Some(95.0));
    assert_eq!(pose.feedback, Some(FormFeedback::GoodForm));
    assert_eq!(FormFeedback::GoodForm.message(), "Good form!");
}

#[test]
fn test_pose_label_display() {
    assert_eq!(PoseLabel::Unknown.to_string(), "unknown");
    assert_eq!(PoseLabel::Standing.to_string(), "standing");
    assert_eq!(PoseLabel::Plank.to_string(), "plank");
}
