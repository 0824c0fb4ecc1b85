use stance_pipeline::PoseState;
use stance_pose::{BoneGroup, FormFeedback, OverlayProjector, ScreenPoint, SKELETON_CONNECTIONS};

pub const BACKGROUND: u32 = 0x0020_2020;
pub const JOINT_COLOR: u32 = 0x00FF_FFFF;
pub const JOINT_RADIUS: i32 = 4;
/// Height of the accuracy bar along the top inset
pub const BAR_HEIGHT: usize = 8;

pub fn bone_color(group: BoneGroup) -> u32 {
    match group {
        BoneGroup::Face => 0x0000_FFFF,
        BoneGroup::Torso => 0x0000_FF00,
        BoneGroup::Arm => 0x00FF_FF00,
        BoneGroup::Leg => 0x00FF_00FF,
    }
}

pub fn feedback_color(feedback: Option<FormFeedback>) -> u32 {
    match feedback {
        Some(FormFeedback::GoodForm) | None => 0x0000_C000,
        Some(FormFeedback::TooShallow) => 0x00FF_A000,
        Some(FormFeedback::TooDeep) => 0x00E0_2020,
    }
}

/// Fill the whole buffer with one color
pub fn clear(buf: &mut [u32], color: u32) {
    buf.iter_mut().for_each(|pixel| *pixel = color);
}

/// Plot one pixel, ignoring coordinates outside the buffer
pub fn put_pixel(buf: &mut [u32], width: usize, height: usize, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }
    buf[y as usize * width + x as usize] = color;
}

/// Bresenham line, clipped per pixel
pub fn draw_line(
    buf: &mut [u32],
    width: usize,
    height: usize,
    from: (i32, i32),
    to: (i32, i32),
    color: u32,
) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let step_x = if x < to.0 { 1 } else { -1 };
    let step_y = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(buf, width, height, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
}

pub fn fill_circle(
    buf: &mut [u32],
    width: usize,
    height: usize,
    center: (i32, i32),
    radius: i32,
    color: u32,
) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(buf, width, height, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Fill the rectangle `[x, x + w) x [y, y + h)`, clipped to the buffer
pub fn fill_rect(
    buf: &mut [u32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: u32,
) {
    for row in y..(y + h).min(height) {
        let start = row * width + x.min(width);
        let end = row * width + (x + w).min(width);
        buf[start..end].fill(color);
    }
}

/// Round to pixels, clamped to one buffer span beyond each edge.
fn to_pixel(point: ScreenPoint, width: usize, height: usize) -> (i32, i32) {
    let clamp = |value: f32, span: usize| {
        let span = span.min(i32::MAX as usize / 4) as f32;
        value.round().clamp(-span, 2.0 * span) as i32
    };
    (clamp(point.x, width), clamp(point.y, height))
}

/// Draw the published skeleton and an accuracy bar for the current verdict.
///
/// Bones with a missing endpoint are skipped.
pub fn draw_overlay(
    buf: &mut [u32],
    width: usize,
    height: usize,
    projector: &OverlayProjector,
    state: &PoseState,
) {
    for bone in projector.project_connections(&SKELETON_CONNECTIONS, &state.frame) {
        draw_line(
            buf,
            width,
            height,
            to_pixel(bone.from, width, height),
            to_pixel(bone.to, width, height),
            bone_color(bone.connection.group),
        );
    }

    let points = projector.project(&state.frame);
    for point in points.values() {
        fill_circle(buf, width, height, to_pixel(*point, width, height), JOINT_RADIUS, JOINT_COLOR);
    }

    if !state.current_pose.is_unknown() {
        let bar = (state.current_pose.accuracy * width as f32).round() as usize;
        let color = feedback_color(state.current_pose.feedback);
        fill_rect(buf, width, height, 0, 0, bar, BAR_HEIGHT, color);
    }
}
