use stance_pose::filter::filter_observation;
use stance_pose::{
    classify, ClassifierTuning, ConfidenceMode, ConfidenceThresholds, DetectedPose, ExerciseKind,
    PoseFrame,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

use crate::state::StatsCounters;
use crate::{
    Frame, FrameSource, PipelineConfig, PipelineError, PipelineStats, PoseEstimator, PoseState,
};

/// How long dropping the coordinator waits for capture threads before detaching them
pub const CAPTURE_JOIN_GRACE: Duration = Duration::from_millis(250);

/// What happened to a frame handed to [`Submitter::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued for estimation
    Accepted,
    /// An estimation was already in flight; the frame was dropped
    DroppedBusy,
    /// The pipeline is stopped; the frame was dropped
    Stopped,
}

struct Job {
    frame: Frame,
    sequence: u64,
    session: u64,
}

struct Shared {
    running: AtomicBool,
    /// Incremented by every start(); results from older sessions are discarded
    session: AtomicU64,
    in_flight: AtomicBool,
    shutdown: AtomicBool,
    debug: AtomicBool,
    exercise: Mutex<Option<ExerciseKind>>,
    next_sequence: AtomicU64,
    thresholds: ConfidenceThresholds,
    tuning: ClassifierTuning,
    stats: StatsCounters,
    /// Taken on shutdown so the worker's receiver closes
    frame_tx: Mutex<Option<mpsc::Sender<Job>>>,
    state_tx: watch::Sender<PoseState>,
    /// Serializes publishing against start/stop transitions
    transition: Mutex<()>,
}

impl Shared {
    fn exercise(&self) -> Option<ExerciseKind> {
        *self.exercise.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, job_session: u64, sequence: u64, pose: DetectedPose, frame: PoseFrame) {
        let _transition = self.transition.lock().unwrap_or_else(|e| e.into_inner());

        if !self.running.load(Ordering::Acquire) || self.session.load(Ordering::Acquire) != job_session {
            StatsCounters::bump(&self.stats.discarded);
            log::debug!("discarding result for frame {} from stopped session {}", sequence, job_session);
            return;
        }

        self.state_tx.send_replace(PoseState {
            is_detecting: true,
            current_pose: pose,
            frame,
            sequence,
        });
        StatsCounters::bump(&self.stats.published);
    }
}

/// Clears the in-flight flag when the job finishes, including by panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cloneable handle for pushing frames into the pipeline from any thread.
#[derive(Clone)]
pub struct Submitter {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("running", &self.shared.running.load(Ordering::Relaxed))
            .field("in_flight", &self.shared.in_flight.load(Ordering::Relaxed))
            .finish()
    }
}

impl Submitter {
    /// Offer a frame for estimation.
    ///
    /// At most one estimation is in flight; a frame arriving while one is
    /// pending is dropped rather than queued.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Channel` if the worker thread has exited.
    pub fn submit(&self, frame: Frame) -> Result<SubmitOutcome, PipelineError> {
        let shared = &self.shared;
        StatsCounters::bump(&shared.stats.submitted);

        if !shared.running.load(Ordering::Acquire) {
            StatsCounters::bump(&shared.stats.dropped_stopped);
            return Ok(SubmitOutcome::Stopped);
        }

        if shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            StatsCounters::bump(&shared.stats.dropped_busy);
            if shared.debug.load(Ordering::Relaxed) {
                log::debug!("frame dropped, estimation in flight");
            }
            return Ok(SubmitOutcome::DroppedBusy);
        }

        let job = Job {
            frame,
            sequence: shared.next_sequence.fetch_add(1, Ordering::Relaxed) + 1,
            session: shared.session.load(Ordering::Acquire),
        };

        let sender = shared.frame_tx.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = sender.as_ref() else {
            shared.in_flight.store(false, Ordering::Release);
            return Err(PipelineError::Channel("pipeline is shut down".to_string()));
        };

        match sender.try_send(job) {
            Ok(()) => {
                StatsCounters::bump(&shared.stats.accepted);
                Ok(SubmitOutcome::Accepted)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Worker still holds a queued job
                StatsCounters::bump(&shared.stats.dropped_busy);
                Ok(SubmitOutcome::DroppedBusy)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                shared.in_flight.store(false, Ordering::Release);
                Err(PipelineError::Channel("worker thread has exited".to_string()))
            }
        }
    }

    fn is_shut_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }
}

/// Owns the capture -> estimate -> filter -> classify loop and the observable state.
///
/// State machine: `Stopped -> Running -> Stopped`. All control methods take
/// `&self` and may be called from any thread at any time.
pub struct PipelineCoordinator {
    submitter: Submitter,
    worker: Option<JoinHandle<()>>,
    capture: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for PipelineCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("running", &self.is_running())
            .field("exercise", &self.exercise())
            .field("debug", &self.debug())
            .field("capture_threads", &self.capture.len())
            .finish()
    }
}

impl PipelineCoordinator {
    /// Create a stopped pipeline and spawn its worker thread.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` if the configuration is invalid, or
    /// `PipelineError::Thread` if the worker thread cannot be spawned.
    pub fn new<E>(estimator: E, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        E: PoseEstimator + 'static,
    {
        config.validate()?;

        let (frame_tx, frame_rx) = mpsc::channel::<Job>(1);
        let (state_tx, _) = watch::channel(PoseState::idle());

        let shared = Arc::new(Shared {
            running: AtomicBool::new(false),
            session: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            debug: AtomicBool::new(config.debug()),
            exercise: Mutex::new(config.exercise()),
            next_sequence: AtomicU64::new(0),
            thresholds: config.thresholds(),
            tuning: config.tuning(),
            stats: StatsCounters::default(),
            frame_tx: Mutex::new(Some(frame_tx)),
            state_tx,
            transition: Mutex::new(()),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("pose-worker".to_string())
            .spawn(move || run_worker(worker_shared, estimator, frame_rx))?;

        log::debug!(
            "pose pipeline created (thresholds {:?}, exercise {:?})",
            config.thresholds(),
            config.exercise()
        );

        Ok(Self {
            submitter: Submitter { shared },
            worker: Some(worker),
            capture: Vec::new(),
        })
    }

    fn shared(&self) -> &Shared {
        &self.submitter.shared
    }

    /// Transition Stopped -> Running. No-op when already running.
    pub fn start(&self) {
        let shared = self.shared();
        let _transition = shared.transition.lock().unwrap_or_else(|e| e.into_inner());
        if shared.running.load(Ordering::Acquire) {
            return;
        }
        let session = shared.session.fetch_add(1, Ordering::AcqRel) + 1;
        shared.running.store(true, Ordering::Release);
        shared.state_tx.send_replace(PoseState::detecting());
        log::info!("pose pipeline started (session {})", session);
    }

    /// Transition Running -> Stopped. No-op when already stopped.
    ///
    /// An estimation still in flight runs to completion but its result is
    /// discarded.
    pub fn stop(&self) {
        let shared = self.shared();
        let _transition = shared.transition.lock().unwrap_or_else(|e| e.into_inner());
        if !shared.running.load(Ordering::Acquire) {
            return;
        }
        shared.running.store(false, Ordering::Release);
        shared.state_tx.send_replace(PoseState::idle());
        log::info!("pose pipeline stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared().running.load(Ordering::Acquire)
    }

    /// True while an estimation is in flight
    pub fn is_busy(&self) -> bool {
        self.shared().in_flight.load(Ordering::Acquire)
    }

    /// Select the exercise used from the next processed frame on.
    pub fn set_exercise(&self, exercise: Option<ExerciseKind>) {
        *self.shared().exercise.lock().unwrap_or_else(|e| e.into_inner()) = exercise;
        match exercise {
            Some(kind) => log::info!("exercise set to {}", kind),
            None => log::info!("exercise cleared"),
        }
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.shared().exercise()
    }

    /// Toggle debug mode, which lowers the joint confidence threshold.
    pub fn set_debug(&self, debug: bool) {
        let previous = self.shared().debug.swap(debug, Ordering::AcqRel);
        if previous != debug {
            log::info!(
                "debug mode {} (confidence threshold {})",
                if debug { "on" } else { "off" },
                self.shared().thresholds.for_mode(ConfidenceMode::from_debug(debug))
            );
        }
    }

    pub fn debug(&self) -> bool {
        self.shared().debug.load(Ordering::Acquire)
    }

    /// Subscribe to state updates. `changed()` on the receiver signals a new publish.
    pub fn subscribe(&self) -> watch::Receiver<PoseState> {
        self.shared().state_tx.subscribe()
    }

    /// Current published state
    pub fn state(&self) -> PoseState {
        self.shared().state_tx.borrow().clone()
    }

    pub fn stats(&self) -> PipelineStats {
        self.shared().stats.snapshot()
    }

    /// Handle for hosts that push frames themselves
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Offer one frame; see [`Submitter::submit`].
    pub fn submit(&self, frame: Frame) -> Result<SubmitOutcome, PipelineError> {
        self.submitter.submit(frame)
    }

    /// Spawn a capture thread that pulls frames from `source` until it ends
    /// or the coordinator is dropped.
    ///
    /// Shutdown is checked between frames. On drop the thread gets
    /// [`CAPTURE_JOIN_GRACE`] to return from `next_frame` and is detached
    /// after that.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Thread` if the capture thread cannot be spawned.
    pub fn attach_source<S>(&mut self, mut source: S) -> Result<(), PipelineError>
    where
        S: FrameSource + 'static,
    {
        let submitter = self.submitter();
        let handle = thread::Builder::new()
            .name("pose-capture".to_string())
            .spawn(move || {
                while !submitter.is_shut_down() {
                    let Some(frame) = source.next_frame() else {
                        log::debug!("frame source ended");
                        break;
                    };
                    if let Err(e) = submitter.submit(frame) {
                        log::warn!("capture thread stopping: {}", e);
                        break;
                    }
                }
                log::debug!("capture thread exiting");
            })?;
        self.capture.push(handle);
        Ok(())
    }
}

impl Drop for PipelineCoordinator {
    fn drop(&mut self) {
        self.stop();

        let shared = self.shared();
        shared.shutdown.store(true, Ordering::Release);
        // Closing the sender ends the worker's receive loop
        drop(shared.frame_tx.lock().unwrap_or_else(|e| e.into_inner()).take());

        let deadline = Instant::now() + CAPTURE_JOIN_GRACE;
        for handle in self.capture.drain(..) {
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                // Still blocked in next_frame; it exits after the source returns
                log::warn!("detaching capture thread blocked in its frame source");
            }
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn run_worker<E: PoseEstimator>(shared: Arc<Shared>, mut estimator: E, mut frame_rx: mpsc::Receiver<Job>) {
    while let Some(job) = frame_rx.blocking_recv() {
        let in_flight = InFlight(&shared.in_flight);

        let raw = match estimator.estimate(&job.frame) {
            Ok(raw) => raw,
            Err(e) => {
                StatsCounters::bump(&shared.stats.estimator_failures);
                log::warn!("pose estimation failed for frame {}: {}", job.sequence, e);
                None
            }
        };

        // Mode and exercise are read once per frame
        let debug = shared.debug.load(Ordering::Acquire);
        let threshold = shared.thresholds.for_mode(ConfidenceMode::from_debug(debug));
        let frame = filter_observation(raw.as_ref(), threshold);
        let pose = match shared.exercise() {
            Some(kind) => classify(&frame, kind.definition(), &shared.tuning),
            None => DetectedPose::unknown(),
        };

        if debug {
            log::debug!(
                "frame {}: {} joints >= {:.2}, {} ({:.2})",
                job.sequence,
                frame.len(),
                threshold,
                pose.label,
                pose.accuracy
            );
        }

        // Estimation is done; the next frame may be accepted while we publish
        drop(in_flight);
        shared.publish(job.session, job.sequence, pose, frame);
    }
    log::debug!("pose worker exiting");
}
