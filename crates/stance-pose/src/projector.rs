//! Normalized-to-screen projection for the skeleton overlay.
//!
//! The estimator's axes are fixed to the sensor, so on a portrait surface the
//! feed may arrive rotated by 90 degrees. The projector picks between a direct
//! and a swapped mapping per frame and compensates for the safe-area insets
//! that navigation chrome takes from the top and bottom of the surface.
//!
//! Projection is a render-time concern only; classification never sees its
//! output.

use stance_base::Vec2;
use std::collections::HashMap;

use crate::skeleton::SkeletonConnection;
use crate::types::{JointName, PoseFrame};

/// A joint position in device points
pub type ScreenPoint = Vec2<f32>;

/// One bone in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBone {
    pub connection: SkeletonConnection,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

/// Render surface size in device points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Vertical space consumed by system chrome
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SafeAreaInsets {
    pub top: f32,
    pub bottom: f32,
}

impl SafeAreaInsets {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }
}

/// Mapping from the estimator's normalized axes to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Direct,
    /// Axes rotated by 90 degrees
    Swapped,
}

/// Direction of the estimator's normalized Y axis relative to the screen.
///
/// Fixed once per estimator backend. `Up` flips Y during projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizedYAxis {
    #[default]
    Up,
    Down,
}

/// Projects one frame's joints for a given surface and inset configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayProjector {
    surface: SurfaceSize,
    insets: SafeAreaInsets,
    y_axis: NormalizedYAxis,
}

impl OverlayProjector {
    pub fn new(surface: SurfaceSize, insets: SafeAreaInsets) -> Self {
        Self {
            surface,
            insets,
            y_axis: NormalizedYAxis::default(),
        }
    }

    pub fn with_y_axis(mut self, y_axis: NormalizedYAxis) -> Self {
        self.y_axis = y_axis;
        self
    }

    pub fn y_axis(&self) -> NormalizedYAxis {
        self.y_axis
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn insets(&self) -> SafeAreaInsets {
        self.insets
    }

    /// Surface height left between the top and bottom insets, never negative.
    pub fn adjusted_height(&self) -> f32 {
        (self.surface.height - self.insets.top - self.insets.bottom).max(0.0)
    }

    /// Decide whether `frame` needs the swapped mapping.
    ///
    /// With both shoulders visible, a portrait surface whose shoulders are
    /// further apart vertically than horizontally is swapped. Without both
    /// shoulders, a portrait surface alone implies a swap.
    pub fn orientation(&self, frame: &PoseFrame) -> Orientation {
        let portrait = self.surface.is_portrait();
        let shoulders = frame
            .position(JointName::LeftShoulder)
            .zip(frame.position(JointName::RightShoulder));

        let swapped = match shoulders {
            Some((left, right)) => {
                let separation = left.abs_diff(right);
                portrait && separation.y > separation.x
            }
            None => portrait,
        };

        if swapped {
            Orientation::Swapped
        } else {
            Orientation::Direct
        }
    }

    /// Map one normalized point into screen space.
    ///
    /// The swapped mapping is a fixed 90 degree rotation and keeps the
    /// skeleton's handedness whatever the Y convention; only the direct
    /// mapping follows [`NormalizedYAxis`].
    pub fn project_point(&self, normalized: Vec2<f32>, orientation: Orientation) -> ScreenPoint {
        let adjusted_height = self.adjusted_height();
        match orientation {
            Orientation::Swapped => Vec2::new(
                (1.0 - normalized.y) * self.surface.width,
                normalized.x * adjusted_height + self.insets.top,
            ),
            Orientation::Direct => {
                let y = match self.y_axis {
                    NormalizedYAxis::Up => 1.0 - normalized.y,
                    NormalizedYAxis::Down => normalized.y,
                };
                Vec2::new(normalized.x * self.surface.width, y * adjusted_height + self.insets.top)
            }
        }
    }

    /// Project every joint of `frame`.
    ///
    /// Joints missing from the frame are absent from the result; nothing is
    /// substituted for them.
    pub fn project(&self, frame: &PoseFrame) -> HashMap<JointName, ScreenPoint> {
        let orientation = self.orientation(frame);
        frame
            .iter()
            .map(|joint| (joint.name, self.project_point(joint.position, orientation)))
            .filter(|(_, point)| point.is_finite())
            .collect()
    }

    /// Project the bones whose two endpoints are both present.
    ///
    /// Each projected bone carries its connection so the renderer can color
    /// it by group.
    pub fn project_connections(
        &self,
        connections: &[SkeletonConnection],
        frame: &PoseFrame,
    ) -> Vec<ProjectedBone> {
        let points = self.project(frame);
        connections
            .iter()
            .filter_map(|bone| {
                Some(ProjectedBone {
                    connection: *bone,
                    from: *points.get(&bone.from)?,
                    to: *points.get(&bone.to)?,
                })
            })
            .collect()
    }
}
