mod draw;
mod script;

use draw::{BACKGROUND, clear, draw_overlay, fill_rect};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use script::ScriptedEstimator;
use stance_pipeline::{Frame, PipelineConfig, PipelineCoordinator, PoseState};
use stance_pose::{ExerciseKind, NormalizedYAxis, OverlayProjector, SafeAreaInsets, SurfaceSize};
use std::env;
use std::thread;
use std::time::Duration;

const WIDTH: usize = 360;
const HEIGHT: usize = 640;
/// Simulated status bar and home indicator
const INSET_TOP: usize = 24;
const INSET_BOTTOM: usize = 16;
const INSET_COLOR: u32 = 0x0010_1010;
const CAPTURE_INTERVAL: Duration = Duration::from_millis(33);
const ESTIMATOR_LATENCY: Duration = Duration::from_millis(60);

fn init_logging() -> std::io::Result<()> {
    match env::var("STANCE_LOG_DIR") {
        Ok(dir) => stance_base::init_file_logger(dir),
        Err(_) => {
            stance_base::init_stdout_logger();
            Ok(())
        }
    }
}

fn load_config() -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match env::var("STANCE_CONFIG") {
        Ok(path) => {
            log::info!("loading config from {}", path);
            Ok(PipelineConfig::load(path)?)
        }
        Err(_) => Ok(PipelineConfig::default().with_exercise(ExerciseKind::Squat)),
    }
}

fn title(state: &PoseState, pipeline: &PipelineCoordinator) -> String {
    let exercise = pipeline
        .exercise()
        .map_or("none".to_string(), |kind| kind.to_string());
    let mut title = format!("Pose Overlay [{}]", exercise);

    if !state.is_detecting {
        title.push_str(" - stopped (SPACE to start)");
        return title;
    }

    title.push_str(&format!(
        " - {} {:.0}%",
        state.current_pose.label,
        state.current_pose.accuracy * 100.0
    ));
    if let Some(feedback) = state.current_pose.feedback {
        title.push_str(&format!(" - {}", feedback.message()));
    }
    if pipeline.debug() {
        title.push_str(" [debug]");
    }
    title
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;
    let config = load_config()?;

    log::info!("surface {}x{}, insets {}/{}", WIDTH, HEIGHT, INSET_TOP, INSET_BOTTOM);
    log::info!("controls: SPACE start/stop, D debug, 1-3 exercise, 0 none, ESC exit");

    let mut pipeline =
        PipelineCoordinator::new(ScriptedEstimator::new(ESTIMATOR_LATENCY), config)?;
    pipeline.attach_source(|| {
        thread::sleep(CAPTURE_INTERVAL);
        Some(Frame::blank(WIDTH as u32, HEIGHT as u32))
    })?;
    let state_rx = pipeline.subscribe();
    pipeline.start();

    let projector = OverlayProjector::new(
        SurfaceSize::new(WIDTH as f32, HEIGHT as f32),
        SafeAreaInsets::new(INSET_TOP as f32, INSET_BOTTOM as f32),
    )
    .with_y_axis(NormalizedYAxis::Down);

    let mut window = Window::new("Pose Overlay", WIDTH, HEIGHT, WindowOptions::default())?;
    window.set_target_fps(30);

    let mut buf = vec![0u32; WIDTH * HEIGHT];
    let mut last_title = String::new();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            if pipeline.is_running() {
                pipeline.stop();
            } else {
                pipeline.start();
            }
        }
        if window.is_key_pressed(Key::D, KeyRepeat::No) {
            pipeline.set_debug(!pipeline.debug());
        }
        for (key, exercise) in [
            (Key::Key0, None),
            (Key::Key1, Some(ExerciseKind::Squat)),
            (Key::Key2, Some(ExerciseKind::Pushup)),
            (Key::Key3, Some(ExerciseKind::Plank)),
        ] {
            if window.is_key_pressed(key, KeyRepeat::No) {
                pipeline.set_exercise(exercise);
            }
        }

        let state = state_rx.borrow().clone();

        clear(&mut buf, BACKGROUND);
        fill_rect(&mut buf, WIDTH, HEIGHT, 0, 0, WIDTH, INSET_TOP, INSET_COLOR);
        fill_rect(&mut buf, WIDTH, HEIGHT, 0, HEIGHT - INSET_BOTTOM, WIDTH, INSET_BOTTOM, INSET_COLOR);
        draw_overlay(&mut buf, WIDTH, HEIGHT, &projector, &state);

        let next_title = title(&state, &pipeline);
        if next_title != last_title {
            window.set_title(&next_title);
            last_title = next_title;
        }

        window.update_with_buffer(&buf, WIDTH, HEIGHT)?;
    }

    let stats = pipeline.stats();
    log::info!(
        "exiting: {} frames submitted, {} estimated, {} dropped busy, {} published",
        stats.submitted,
        stats.accepted,
        stats.dropped_busy,
        stats.published
    );
    Ok(())
}
