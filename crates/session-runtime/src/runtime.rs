//! Session actor
//!
//! One task owns the [`SessionState`]. It selects over three sources:
//! lifecycle commands, the single pending session timer (post-rep pause
//! or breathing phase), and pose frames. Timers live inside the task,
//! so stopping the task cancels them and nothing can touch the state
//! after teardown.

use crate::settings::RuntimeConfig;
use crate::view::{SessionEvent, SessionView};
use crate::RuntimeError;
use exercise_session::{Schedule, SessionError, SessionState, StageMachine, MAX_PHASE_MS};
use pose_landmarks::{Normalizer, RawLandmarks};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

/// One message from the pose detector
#[derive(Debug, Clone)]
pub enum PoseInput {
    /// Keypoints for the detected body
    Detection(RawLandmarks),
    /// Frame processed but nobody detected
    NoDetection,
    /// Camera or model could not be initialized
    DetectorFailed(String),
}

enum Command {
    SkipCalibration(oneshot::Sender<Result<(), SessionError>>),
    Snapshot(oneshot::Sender<SessionView>),
    Stop,
}

/// Control handle for a running session
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<SessionView>,
}

/// Frame input and event output of a running session
pub struct SessionChannels {
    /// Pose detector side; clone it for each frame producer
    pub frames: mpsc::Sender<PoseInput>,
    /// Rendering side
    pub events: mpsc::Receiver<SessionEvent>,
}

impl SessionHandle {
    /// Leave calibration now, without the hands-up hold
    pub async fn skip_calibration(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SkipCalibration(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)??;
        Ok(())
    }

    /// Current projection, reflecting every input processed so far
    pub async fn snapshot(&self) -> Result<SessionView, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Tear the session down, cancelling any pending timer
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        self.send(Command::Stop).await
    }

    /// Wait for the session task to end and return its final projection
    pub async fn join(self) -> Result<SessionView, RuntimeError> {
        self.task.await.map_err(|e| RuntimeError::Task(e.to_string()))
    }

    /// Whether the session task is still running
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    async fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

/// Session actor state
pub struct SessionRuntime {
    machine: StageMachine,
    normalizer: Normalizer,
    state: SessionState,
    frames: mpsc::Receiver<PoseInput>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<SessionEvent>,
    /// `Completed` / `Failed` events waiting for buffer space
    outbox: VecDeque<SessionEvent>,
    timer: Option<(Instant, Schedule)>,
    frames_open: bool,
    completion_sent: bool,
}

impl SessionRuntime {
    /// Start a session in calibration on the current tokio runtime
    pub fn spawn(config: RuntimeConfig) -> (SessionHandle, SessionChannels) {
        let (frame_tx, frame_rx) = mpsc::channel(config.buffers.frames);
        let (command_tx, command_rx) = mpsc::channel(config.buffers.commands);
        let (event_tx, event_rx) = mpsc::channel(config.buffers.events);

        let runtime = Self {
            machine: StageMachine::new(config.session),
            normalizer: Normalizer::new(config.normalizer),
            state: SessionState::new(),
            frames: frame_rx,
            commands: command_rx,
            events: event_tx,
            outbox: VecDeque::new(),
            timer: None,
            frames_open: true,
            completion_sent: false,
        };

        let task = tokio::spawn(runtime.run());
        let handle = SessionHandle {
            commands: command_tx,
            task,
        };
        let channels = SessionChannels {
            frames: frame_tx,
            events: event_rx,
        };
        (handle, channels)
    }

    async fn run(mut self) -> SessionView {
        info!("Starting guided session");
        self.publish();

        loop {
            // Only polled while a timer is armed.
            let deadline = self.timer.map(|(at, _)| at).unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::SkipCalibration(reply)) => {
                        let result = self.machine.skip_calibration(&mut self.state);
                        if result.is_ok() {
                            self.publish();
                        }
                        let _ = reply.send(result);
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.view());
                    }
                    Some(Command::Stop) | None => {
                        info!("Session stopped in {}", self.state.stage());
                        break;
                    }
                },

                permit = self.events.clone().reserve_owned(), if !self.outbox.is_empty() => match permit {
                    Ok(permit) => {
                        if let Some(event) = self.outbox.pop_front() {
                            permit.send(event);
                        }
                    }
                    Err(_) => {
                        debug!("Event consumer gone, discarding {} events", self.outbox.len());
                        self.outbox.clear();
                    }
                },

                _ = sleep_until(deadline), if self.timer.is_some() => {
                    self.on_timer();
                }

                input = self.frames.recv(), if self.frames_open => match input {
                    Some(input) => self.on_input(input),
                    None => {
                        debug!("Pose source closed");
                        self.frames_open = false;
                    }
                },
            }
        }

        self.timer = None;
        while let Some(event) = self.outbox.pop_front() {
            if self.events.try_send(event).is_err() {
                trace!("Dropping {} undelivered events on stop", self.outbox.len() + 1);
                break;
            }
        }
        self.view()
    }

    fn on_input(&mut self, input: PoseInput) {
        match input {
            PoseInput::Detection(raw) => {
                let frame = match self.normalizer.normalize(&raw) {
                    Ok(frame) => Some(frame),
                    Err(e) => {
                        trace!("Skipping frame: {}", e);
                        None
                    }
                };
                let outcome = self.machine.step(&mut self.state, frame.as_ref());
                trace!("Step: {:?}", outcome.event);
                if let Some(schedule) = outcome.schedule {
                    self.arm(schedule);
                }
            }
            PoseInput::NoDetection => {
                self.machine.step(&mut self.state, None);
            }
            PoseInput::DetectorFailed(reason) => {
                if self.state.fault().is_some() {
                    return;
                }
                warn!("Detector failed, freezing session: {}", reason);
                self.machine.fail_detector(&mut self.state, reason.clone());
                self.timer = None;
                self.publish();
                self.outbox.push_back(SessionEvent::Failed(reason));
                return;
            }
        }
        self.publish();
        self.notify_completion();
    }

    fn on_timer(&mut self) {
        let Some((_, schedule)) = self.timer.take() else {
            return;
        };

        let next = match schedule {
            Schedule::Advance(_) => self.machine.complete_advance(&mut self.state),
            Schedule::BreathingPhase(_) => self.machine.advance_breathing(&mut self.state),
        };
        if let Some(next) = next {
            self.arm(next);
        }

        self.publish();
        self.notify_completion();
    }

    fn arm(&mut self, schedule: Schedule) {
        let delay = match schedule {
            Schedule::Advance(d) | Schedule::BreathingPhase(d) => d,
        };
        let delay = delay.min(Duration::from_millis(MAX_PHASE_MS));
        debug!("Arming {:?}", schedule);
        self.timer = Some((Instant::now() + delay, schedule));
    }

    fn view(&self) -> SessionView {
        SessionView::from_state(&self.state, self.machine.config())
    }

    fn publish(&self) {
        // Views are derived state; a slow consumer only misses intermediate ones.
        // Held back while a lifecycle event is queued so it is never overtaken.
        if !self.outbox.is_empty() {
            trace!("Lifecycle event pending, dropping view");
            return;
        }
        if let Err(mpsc::error::TrySendError::Full(_)) =
            self.events.try_send(SessionEvent::Updated(self.view()))
        {
            trace!("Event buffer full, dropping view");
        }
    }

    fn notify_completion(&mut self) {
        if self.completion_sent || !self.state.is_completed() {
            return;
        }
        self.completion_sent = true;
        let summary = self.state.summary();
        info!("Session completed with score {}", summary.score);
        self.outbox.push_back(SessionEvent::Completed(summary));
    }
}
