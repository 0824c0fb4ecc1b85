use stance_base::Vec2;

use crate::angle::{angle_score, form_feedback, joint_angle};
use crate::config::ClassifierTuning;
use crate::exercise::ExerciseDefinition;
use crate::types::{DetectedPose, JointName, PoseFrame, PoseLabel};

use JointName::*;

/// Classify a filtered frame against the selected exercise.
///
/// Never fails: an empty frame, or one with fewer than the exercise's minimum
/// visible joints, yields `(unknown, 0.0)`.
pub fn classify(
    frame: &PoseFrame,
    exercise: &ExerciseDefinition,
    tuning: &ClassifierTuning,
) -> DetectedPose {
    let visible = exercise.visible_joints(frame);
    if frame.is_empty() || visible < exercise.min_joints {
        log::trace!(
            "{}: {} of {} required joints visible, need {}",
            exercise.name,
            visible,
            exercise.required_joints.len(),
            exercise.min_joints
        );
        return DetectedPose::unknown();
    }
    (exercise.classifier)(frame, tuning)
}

/// Squat vs. standing from knee height relative to hip height.
///
/// Normalized Y grows downward, so knees below the hips by more than
/// `squat_margin` read as a squat. Accuracy is the mean confidence of the
/// visible key joints.
pub fn classify_squat(frame: &PoseFrame, tuning: &ClassifierTuning) -> DetectedPose {
    let (Some(hip), Some(knee)) = (
        mean_position(frame, &[LeftHip, RightHip]),
        mean_position(frame, &[LeftKnee, RightKnee]),
    ) else {
        return DetectedPose::unknown();
    };

    let label = if knee.y > hip.y + tuning.squat_margin {
        PoseLabel::Squat
    } else {
        PoseLabel::Standing
    };

    let confidence = mean_confidence(
        frame,
        &[LeftShoulder, RightShoulder, LeftHip, RightHip, LeftKnee, RightKnee],
    );
    DetectedPose::new(label, confidence)
}

/// Push-up form from the elbow angle, scored against the ideal bend.
pub fn classify_pushup(frame: &PoseFrame, tuning: &ClassifierTuning) -> DetectedPose {
    if !torso_is_horizontal(frame, tuning.horizontal_ratio) {
        return DetectedPose::unknown();
    }

    let angles = [
        side_angle(frame, LeftShoulder, LeftElbow, &[LeftWrist]),
        side_angle(frame, RightShoulder, RightElbow, &[RightWrist]),
    ];
    let Some(elbow) = mean(angles.into_iter().flatten()) else {
        return DetectedPose::unknown();
    };

    scored(PoseLabel::Pushup, elbow, tuning.pushup_ideal_elbow, tuning)
}

/// Plank form from the shoulder-hip-ankle body line.
///
/// Falls back to the knee on a side whose ankle is not visible.
pub fn classify_plank(frame: &PoseFrame, tuning: &ClassifierTuning) -> DetectedPose {
    if !torso_is_horizontal(frame, tuning.horizontal_ratio) {
        return DetectedPose::unknown();
    }

    let angles = [
        side_angle(frame, LeftShoulder, LeftHip, &[LeftAnkle, LeftKnee]),
        side_angle(frame, RightShoulder, RightHip, &[RightAnkle, RightKnee]),
    ];
    let Some(body_line) = mean(angles.into_iter().flatten()) else {
        return DetectedPose::unknown();
    };

    scored(PoseLabel::Plank, body_line, tuning.plank_ideal_body_line, tuning)
}

fn scored(label: PoseLabel, measured: f32, ideal: f32, tuning: &ClassifierTuning) -> DetectedPose {
    let score = angle_score(measured, ideal, tuning.angle_slope);
    DetectedPose::new(label, score / 100.0)
        .with_form(measured, form_feedback(measured, ideal, tuning.form_band))
}

/// Angle at `vertex` using the first visible candidate as the distal joint.
fn side_angle(
    frame: &PoseFrame,
    proximal: JointName,
    vertex: JointName,
    distal: &[JointName],
) -> Option<f32> {
    let distal = distal.iter().find_map(|name| frame.position(*name))?;
    joint_angle(frame.position(proximal)?, frame.position(vertex)?, distal)
}

/// Shoulder-to-hip span is wider than it is tall.
fn torso_is_horizontal(frame: &PoseFrame, ratio: f32) -> bool {
    let (Some(shoulder), Some(hip)) = (
        mean_position(frame, &[LeftShoulder, RightShoulder]),
        mean_position(frame, &[LeftHip, RightHip]),
    ) else {
        return false;
    };
    let span = shoulder.abs_diff(hip);
    span.x >= ratio * span.y
}

fn mean_position(frame: &PoseFrame, names: &[JointName]) -> Option<Vec2<f32>> {
    let points: Vec<Vec2<f32>> = names.iter().filter_map(|name| frame.position(*name)).collect();
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec2::zero(), |acc, p| acc + *p);
    Some(sum / points.len() as f32)
}

fn mean_confidence(frame: &PoseFrame, names: &[JointName]) -> f32 {
    mean(names.iter().filter_map(|name| frame.get(*name)).map(|j| j.confidence)).unwrap_or(0.0)
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f32)
}
