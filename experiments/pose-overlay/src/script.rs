use stance_pipeline::{EstimatorError, Frame, PoseEstimator};
use stance_pose::{Joint, JointName, RawPose};
use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use JointName::*;

/// Seconds spent on each scripted exercise before moving to the next
pub const PHASE_SECS: f32 = 6.0;
/// One repetition per this many seconds
pub const REP_SECS: f32 = 2.0;

/// Which movement the script is acting out at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    Squat,
    Pushup,
    Plank,
}

impl ScriptPhase {
    pub fn at(elapsed: f32) -> Self {
        match (elapsed / PHASE_SECS) as u64 % 3 {
            0 => ScriptPhase::Squat,
            1 => ScriptPhase::Pushup,
            _ => ScriptPhase::Plank,
        }
    }
}

/// Repetition depth in `[0, 1]`, 0 at the top of each rep
pub fn rep_depth(elapsed: f32) -> f32 {
    0.5 - 0.5 * (elapsed / REP_SECS * TAU).cos()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One side of the body; the far side is offset slightly to read as depth.
fn side(joints: &mut Vec<Joint>, names: [JointName; 6], points: [(f32, f32); 6], offset: f32) {
    for (name, (x, y)) in names.into_iter().zip(points) {
        joints.push(Joint::new(name, x + offset, y + offset * 0.5, 0.9));
    }
}

const LEFT: [JointName; 6] = [LeftShoulder, LeftElbow, LeftWrist, LeftHip, LeftKnee, LeftAnkle];
const RIGHT: [JointName; 6] = [RightShoulder, RightElbow, RightWrist, RightHip, RightKnee, RightAnkle];

/// Synthetic pose at `elapsed` seconds, normalized with Y growing downward.
pub fn scripted_pose(elapsed: f32) -> RawPose {
    let depth = rep_depth(elapsed);
    let mut joints = Vec::with_capacity(17);

    match ScriptPhase::at(elapsed) {
        ScriptPhase::Squat => {
            let hip_y = lerp(0.55, 0.70, depth);
            let shoulder_y = lerp(0.30, 0.45, depth);
            for (names, x) in [(LEFT, 0.42), (RIGHT, 0.58)] {
                let outward = if x < 0.5 { -0.04 } else { 0.04 };
                side(
                    &mut joints,
                    names,
                    [
                        (x, shoulder_y),
                        (x + outward, shoulder_y + 0.12),
                        (x + outward, shoulder_y + 0.22),
                        (x + outward * 0.5, hip_y),
                        (x + outward * depth, 0.72),
                        (x, 0.92),
                    ],
                    0.0,
                );
            }
            joints.push(Joint::new(Nose, 0.5, shoulder_y - 0.10, 0.6));
            joints.push(Joint::new(LeftEye, 0.48, shoulder_y - 0.12, 0.6));
            joints.push(Joint::new(RightEye, 0.52, shoulder_y - 0.12, 0.6));
        }
        ScriptPhase::Pushup => {
            let shoulder_y = lerp(0.50, 0.64, depth);
            let elbow_x = lerp(0.30, 0.20, depth);
            for (names, offset) in [(LEFT, 0.0), (RIGHT, 0.01)] {
                side(
                    &mut joints,
                    names,
                    [
                        (0.30, shoulder_y),
                        (elbow_x, lerp(0.62, 0.66, depth)),
                        (0.30, 0.74),
                        (0.55, lerp(0.56, 0.66, depth)),
                        (0.70, lerp(0.62, 0.69, depth)),
                        (0.85, 0.72),
                    ],
                    offset,
                );
            }
            joints.push(Joint::new(Nose, 0.20, shoulder_y - 0.02, 0.5));
        }
        ScriptPhase::Plank => {
            let sag = 0.06 * depth;
            for (names, offset) in [(LEFT, 0.0), (RIGHT, 0.01)] {
                side(
                    &mut joints,
                    names,
                    [
                        (0.30, 0.56),
                        (0.30, 0.66),
                        (0.20, 0.74),
                        (0.55, 0.62 + sag),
                        (0.70, 0.67),
                        (0.85, 0.72),
                    ],
                    offset,
                );
            }
            joints.push(Joint::new(Nose, 0.20, 0.55, 0.5));
        }
    }

    // A flickering low-confidence ankle only survives the debug threshold
    if let Some(ankle) = joints.iter_mut().find(|j| j.name == RightAnkle) {
        ankle.confidence = if depth > 0.5 { 0.2 } else { 0.9 };
    }

    RawPose::new(joints)
}

/// Estimator that replays the scripted workout with a fixed inference latency.
pub struct ScriptedEstimator {
    started: Instant,
    latency: Duration,
}

impl ScriptedEstimator {
    pub fn new(latency: Duration) -> Self {
        Self {
            started: Instant::now(),
            latency,
        }
    }
}

impl PoseEstimator for ScriptedEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Option<RawPose>, EstimatorError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(EstimatorError::InvalidFrame(format!(
                "{}x{}",
                frame.width, frame.height
            )));
        }
        thread::sleep(self.latency);
        let elapsed = frame.captured_at.duration_since(self.started).as_secs_f32();
        Ok(Some(scripted_pose(elapsed)))
    }
}
