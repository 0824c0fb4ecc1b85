use stance_pipeline::{
    EstimatorError, Frame, PipelineConfig, PipelineCoordinator, PipelineError, PoseState,
    SubmitOutcome, CAPTURE_JOIN_GRACE,
};
use stance_pose::{ConfidenceThresholds, ExerciseKind, Joint, JointName, PoseLabel, RawPose};
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use JointName::*;

const TIMEOUT: Duration = Duration::from_secs(2);

fn squat_pose(confidence: f32) -> RawPose {
    RawPose::new(vec![
        Joint::new(LeftShoulder, 0.4, 0.2, confidence),
        Joint::new(RightShoulder, 0.6, 0.2, confidence),
        Joint::new(LeftHip, 0.4, 0.5, confidence),
        Joint::new(RightHip, 0.6, 0.5, confidence),
        Joint::new(LeftKnee, 0.4, 0.6, confidence),
        Joint::new(RightKnee, 0.6, 0.6, confidence),
    ])
}

fn frame() -> Frame {
    Frame::blank(4, 4)
}

/// Estimator that blocks on each frame until the test releases it.
fn gated_estimator(
    pose: RawPose,
) -> (
    impl FnMut(&Frame) -> Result<Option<RawPose>, EstimatorError> + Send + 'static,
    std_mpsc::Sender<()>,
) {
    let (gate_tx, gate_rx) = std_mpsc::channel::<()>();
    let estimator = move |_frame: &Frame| -> Result<Option<RawPose>, EstimatorError> {
        gate_rx
            .recv()
            .map_err(|e| EstimatorError::Backend(e.to_string()))?;
        Ok(Some(pose.clone()))
    };
    (estimator, gate_tx)
}

fn instant_estimator(
    pose: RawPose,
) -> impl FnMut(&Frame) -> Result<Option<RawPose>, EstimatorError> + Send + 'static {
    move |_frame: &Frame| Ok(Some(pose.clone()))
}

async fn next_state(rx: &mut watch::Receiver<PoseState>) -> PoseState {
    timeout(TIMEOUT, rx.changed())
        .await
        .expect("timed out waiting for a published state")
        .expect("state channel closed");
    rx.borrow_and_update().clone()
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(TIMEOUT, async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

#[tokio::test]
async fn test_new_pipeline_is_stopped_and_idle() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();

    assert!(!pipeline.is_running());
    assert!(!pipeline.is_busy());
    let state = pipeline.state();
    assert!(!state.is_detecting);
    assert!(state.current_pose.is_unknown());
    assert!(state.frame.is_empty());
}

#[tokio::test]
async fn test_submit_while_stopped_is_dropped() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();

    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Stopped);
    let stats = pipeline.stats();
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.dropped_stopped, 1);
    assert_eq!(stats.accepted, 0);
}

#[tokio::test]
async fn test_start_and_stop_publish_transitions() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    let mut rx = pipeline.subscribe();

    pipeline.start();
    assert!(pipeline.is_running());
    let state = next_state(&mut rx).await;
    assert!(state.is_detecting);
    assert!(state.current_pose.is_unknown());

    // Second start is a no-op
    pipeline.start();
    assert!(!rx.has_changed().unwrap());

    pipeline.stop();
    assert!(!pipeline.is_running());
    let state = next_state(&mut rx).await;
    assert!(!state.is_detecting);
    assert!(state.frame.is_empty());
}

#[tokio::test]
async fn test_frames_dropped_while_estimation_in_flight() {
    let (estimator, gate) = gated_estimator(squat_pose(0.9));
    let pipeline = PipelineCoordinator::new(
        estimator,
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);
    assert!(pipeline.is_busy());
    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::DroppedBusy);
    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::DroppedBusy);

    gate.send(()).unwrap();
    let state = next_state(&mut rx).await;
    assert!(state.is_detecting);
    assert_eq!(state.sequence, 1);
    assert_eq!(state.current_pose.label, PoseLabel::Squat);
    assert!(!pipeline.is_busy());

    let stats = pipeline.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.dropped_busy, 2);
    assert_eq!(stats.published, 1);

    // Exactly one result for the accepted frame
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_result_after_stop_is_discarded() {
    let (estimator, gate) = gated_estimator(squat_pose(0.9));
    let pipeline = PipelineCoordinator::new(
        estimator,
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();

    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);
    pipeline.stop();
    gate.send(()).unwrap();

    wait_until(|| pipeline.stats().discarded == 1).await;
    let state = pipeline.state();
    assert!(!state.is_detecting);
    assert!(state.current_pose.is_unknown());
    assert!(state.frame.is_empty());
    assert_eq!(pipeline.stats().published, 0);
}

#[tokio::test]
async fn test_restart_discards_previous_session_result() {
    let (estimator, gate) = gated_estimator(squat_pose(0.9));
    let pipeline = PipelineCoordinator::new(
        estimator,
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();
    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);

    pipeline.stop();
    pipeline.start();
    gate.send(()).unwrap();

    wait_until(|| pipeline.stats().discarded == 1).await;
    let state = pipeline.state();
    assert!(state.is_detecting);
    assert_eq!(state.sequence, 0);
    assert!(state.current_pose.is_unknown());
}

#[tokio::test]
async fn test_estimator_failure_is_treated_as_no_person() {
    let estimator = |_frame: &Frame| -> Result<Option<RawPose>, EstimatorError> {
        Err(EstimatorError::Backend("model not loaded".to_string()))
    };
    let pipeline = PipelineCoordinator::new(
        estimator,
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);
    let state = next_state(&mut rx).await;
    assert!(state.is_detecting);
    assert!(state.frame.is_empty());
    assert!(state.current_pose.is_unknown());
    assert_eq!(pipeline.stats().estimator_failures, 1);

    // The pipeline keeps accepting frames afterwards
    assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);
    next_state(&mut rx).await;
    assert_eq!(pipeline.stats().estimator_failures, 2);
}

#[tokio::test]
async fn test_no_person_publishes_empty_frame() {
    let estimator = |_frame: &Frame| -> Result<Option<RawPose>, EstimatorError> { Ok(None) };
    let pipeline = PipelineCoordinator::new(
        estimator,
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    pipeline.submit(frame()).unwrap();
    let state = next_state(&mut rx).await;
    assert!(state.frame.is_empty());
    assert!(state.key_points().is_empty());
    assert!(state.current_pose.is_unknown());
    assert_eq!(pipeline.stats().estimator_failures, 0);
}

#[tokio::test]
async fn test_without_exercise_pose_is_unknown() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    pipeline.submit(frame()).unwrap();
    let state = next_state(&mut rx).await;
    assert_eq!(state.frame.len(), 6);
    assert!(state.current_pose.is_unknown());
}

#[tokio::test]
async fn test_exercise_change_applies_to_next_frame() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    pipeline.submit(frame()).unwrap();
    assert!(next_state(&mut rx).await.current_pose.is_unknown());

    pipeline.set_exercise(Some(ExerciseKind::Squat));
    assert_eq!(pipeline.exercise(), Some(ExerciseKind::Squat));
    pipeline.submit(frame()).unwrap();
    assert_eq!(next_state(&mut rx).await.current_pose.label, PoseLabel::Squat);

    // Upright torso is not a push-up
    pipeline.set_exercise(Some(ExerciseKind::Pushup));
    pipeline.submit(frame()).unwrap();
    assert!(next_state(&mut rx).await.current_pose.is_unknown());
}

#[tokio::test]
async fn test_debug_mode_lowers_confidence_threshold() {
    let pipeline = PipelineCoordinator::new(
        instant_estimator(squat_pose(0.2)),
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    pipeline.submit(frame()).unwrap();
    let state = next_state(&mut rx).await;
    assert!(state.frame.is_empty());
    assert!(state.current_pose.is_unknown());

    pipeline.set_debug(true);
    assert!(pipeline.debug());
    pipeline.submit(frame()).unwrap();
    let state = next_state(&mut rx).await;
    assert_eq!(state.frame.len(), 6);
    assert_eq!(state.current_pose.label, PoseLabel::Squat);
    assert!((state.current_pose.accuracy - 0.2).abs() < 1e-5);

    pipeline.set_debug(false);
    pipeline.submit(frame()).unwrap();
    assert!(next_state(&mut rx).await.frame.is_empty());
}

#[tokio::test]
async fn test_published_sequences_increase() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    pipeline.start();
    let mut rx = pipeline.subscribe();

    let mut sequences = Vec::new();
    for _ in 0..3 {
        assert_eq!(pipeline.submit(frame()).unwrap(), SubmitOutcome::Accepted);
        sequences.push(next_state(&mut rx).await.sequence);
    }
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_attached_source_runs_until_exhausted() {
    let mut pipeline = PipelineCoordinator::new(
        instant_estimator(squat_pose(0.9)),
        PipelineConfig::default().with_exercise(ExerciseKind::Squat),
    )
    .unwrap();
    pipeline.start();

    let mut remaining = 5;
    pipeline
        .attach_source(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            std::thread::sleep(Duration::from_millis(10));
            Some(frame())
        })
        .unwrap();

    wait_until(|| {
        let stats = pipeline.stats();
        stats.submitted == 5 && stats.published == stats.accepted
    })
    .await;

    let stats = pipeline.stats();
    assert!(stats.accepted >= 1);
    assert_eq!(stats.accepted + stats.dropped_busy, 5);
    assert_eq!(pipeline.state().current_pose.label, PoseLabel::Squat);
}

#[tokio::test]
async fn test_drop_detaches_source_blocked_in_next_frame() {
    let mut pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    pipeline.start();

    // The source blocks until the test drops `release`
    let (release, blocked) = std_mpsc::channel::<Frame>();
    pipeline.attach_source(move || blocked.recv().ok()).unwrap();

    let started = Instant::now();
    drop(pipeline);
    let elapsed = started.elapsed();

    assert!(elapsed >= CAPTURE_JOIN_GRACE);
    assert!(elapsed < TIMEOUT, "drop took {:?}", elapsed);
    drop(release);
}

#[tokio::test]
async fn test_submitter_outlives_coordinator() {
    let pipeline =
        PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), PipelineConfig::default())
            .unwrap();
    pipeline.start();
    let submitter = pipeline.submitter();

    drop(pipeline);
    assert_eq!(submitter.submit(frame()).unwrap(), SubmitOutcome::Stopped);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = PipelineConfig::default().with_thresholds(ConfidenceThresholds {
        normal: 1.5,
        debug: 0.1,
    });
    let result = PipelineCoordinator::new(instant_estimator(squat_pose(0.9)), config);

    match result {
        Err(PipelineError::Config(_)) => {}
        other => panic!("Expected PipelineError::Config, got {:?}", other.map(|_| ())),
    }
}
