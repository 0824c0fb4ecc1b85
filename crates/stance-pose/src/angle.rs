//! Joint angle math.
//!
//! Angles are measured in degrees at the middle joint of a triplet using the
//! dot product: `cos(theta) = (A-B).(C-B) / (|A-B| |C-B|)`.

use stance_base::Vec2;

use crate::types::FormFeedback;

/// Segments shorter than this are treated as coincident points.
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Angle at `vertex` between `proximal` and `distal`, in degrees `[0, 180]`.
///
/// Returns `None` when either segment has zero length, since no angle is
/// defined there. The cosine is clamped to `[-1, 1]` before `acos` so
/// rounding drift on collinear points cannot produce NaN.
pub fn joint_angle(proximal: Vec2<f32>, vertex: Vec2<f32>, distal: Vec2<f32>) -> Option<f32> {
    let v1 = proximal - vertex;
    let v2 = distal - vertex;

    let mag1 = v1.length();
    let mag2 = v2.length();
    if !(mag1 > MIN_SEGMENT_LENGTH) || !(mag2 > MIN_SEGMENT_LENGTH) {
        return None;
    }

    let cos_angle = (v1.dot(v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees();
    degrees.is_finite().then_some(degrees)
}

/// Linear 0-100 score: `max(0, 100 - slope * |measured - ideal|)`.
pub fn angle_score(measured: f32, ideal: f32, slope: f32) -> f32 {
    (100.0 - slope * (measured - ideal).abs()).clamp(0.0, 100.0)
}

/// Feedback band around the ideal angle.
///
/// Above `ideal + band` the movement did not bend far enough, below
/// `ideal - band` it bent too far.
pub fn form_feedback(measured: f32, ideal: f32, band: f32) -> FormFeedback {
    if measured > ideal + band {
        FormFeedback::TooShallow
    } else if measured < ideal - band {
        FormFeedback::TooDeep
    } else {
        FormFeedback::GoodForm
    }
}
