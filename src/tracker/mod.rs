use crate::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS};
use crate::error::AppError;
use crate::models::NewUsageRecord;
use crate::platform::{ActiveWindow, ForegroundProbe};
use crate::safe_lock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Destination for completed foreground intervals
pub trait RecordSink: Send + Sync {
    fn record(&self, interval: NewUsageRecord) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
struct FocusedInterval {
    window: ActiveWindow,
    started_at: Instant,
}

/// Which window currently has focus and since when.
///
/// Lives only as long as the tracker; the interval in progress at shutdown
/// is never recorded.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    current: Option<FocusedInterval>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_window(&self) -> Option<&ActiveWindow> {
        self.current.as_ref().map(|c| &c.window)
    }

    /// Feed one observation; returns the interval that ended if focus moved to another app.
    ///
    /// The returned record describes the previous window, with the title it
    /// had on the last tick before the transition.
    pub fn observe(&mut self, window: ActiveWindow, now: Instant) -> Option<NewUsageRecord> {
        let Some(current) = self.current.as_mut() else {
            self.current = Some(FocusedInterval {
                window,
                started_at: now,
            });
            return None;
        };

        if current.window.identity() == window.identity() {
            current.window = window;
            return None;
        }

        let elapsed = now.saturating_duration_since(current.started_at);
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let finished = std::mem::replace(
            current,
            FocusedInterval {
                window,
                started_at: now,
            },
        );

        Some(NewUsageRecord::new(
            &finished.window.app_name,
            &finished.window.window_title,
            finished.window.identity(),
            duration_ms,
        ))
    }
}

type ProbeResult = Result<Option<ActiveWindow>, AppError>;

struct WorkerChannels {
    requests: Sender<()>,
    replies: Receiver<ProbeResult>,
}

fn spawn_worker(probe: Arc<dyn ForegroundProbe>) -> Result<WorkerChannels, AppError> {
    let (request_tx, request_rx) = mpsc::channel::<()>();
    let (reply_tx, reply_rx) = mpsc::channel();

    thread::Builder::new()
        .name("pulse-probe".into())
        .spawn(move || {
            for () in request_rx {
                if reply_tx.send(probe.active_window()).is_err() {
                    break;
                }
            }
        })?;

    Ok(WorkerChannels {
        requests: request_tx,
        replies: reply_rx,
    })
}

/// Runs the probe on one long-lived helper thread and gives up on a call after `timeout`.
///
/// At most one probe call is outstanding at any time. While a call that
/// timed out has not answered yet, requests fail with `ProbeBusy` without
/// reaching the probe. A worker whose thread died is replaced on the next request.
pub struct ProbeWorker {
    probe: Arc<dyn ForegroundProbe>,
    timeout: Duration,
    channels: Option<WorkerChannels>,
    awaiting_reply: bool,
}

impl ProbeWorker {
    pub fn new(probe: Arc<dyn ForegroundProbe>, timeout: Duration) -> Self {
        Self {
            probe,
            timeout,
            channels: None,
            awaiting_reply: false,
        }
    }

    pub fn query(&mut self) -> ProbeResult {
        let channels = match self.channels.take() {
            Some(channels) => channels,
            None => spawn_worker(Arc::clone(&self.probe))?,
        };

        if self.awaiting_reply {
            match channels.replies.try_recv() {
                // Late answer to a call that already timed out
                Ok(_late) => self.awaiting_reply = false,
                Err(TryRecvError::Empty) => {
                    self.channels = Some(channels);
                    return Err(AppError::ProbeBusy);
                }
                Err(TryRecvError::Disconnected) => return Err(self.worker_gone()),
            }
        }

        if channels.requests.send(()).is_err() {
            return Err(self.worker_gone());
        }

        let outcome = match channels.replies.recv_timeout(self.timeout) {
            Ok(answer) => answer,
            Err(RecvTimeoutError::Timeout) => {
                self.awaiting_reply = true;
                Err(AppError::ProbeTimeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
            Err(RecvTimeoutError::Disconnected) => return Err(self.worker_gone()),
        };
        self.channels = Some(channels);
        outcome
    }

    fn worker_gone(&mut self) -> AppError {
        self.awaiting_reply = false;
        AppError::Probe("probe thread exited without an answer".into())
    }
}

/// Performs one sampling step at a time; owned by the tracker thread.
pub struct Sampler {
    probe: ProbeWorker,
    sink: Arc<dyn RecordSink>,
    state: TrackerState,
}

impl Sampler {
    pub fn new(probe: Arc<dyn ForegroundProbe>, sink: Arc<dyn RecordSink>, probe_timeout: Duration) -> Self {
        Self {
            probe: ProbeWorker::new(probe, probe_timeout),
            sink,
            state: TrackerState::new(),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Probe the foreground window and record the interval that ended, if any
    pub fn step(&mut self) -> Option<NewUsageRecord> {
        let observed = self.probe.query();
        self.step_with(observed, Instant::now())
    }

    /// Apply an already-obtained probe result observed at `now`.
    ///
    /// Probe failures and sink errors are logged and never propagated.
    pub fn step_with(&mut self, observed: ProbeResult, now: Instant) -> Option<NewUsageRecord> {
        let window = match observed {
            Ok(Some(window)) => window,
            Ok(None) => {
                log::debug!("No foreground window, skipping tick");
                return None;
            }
            Err(e) => {
                log::debug!("Skipping tick: {e}");
                return None;
            }
        };

        let completed = self.state.observe(window, now)?;
        if let Err(e) = self.sink.record(completed.clone()) {
            log::error!("Failed to record {} interval, it is lost: {e}", completed.app);
        }
        Some(completed)
    }
}

pub struct TrackerService {
    config: TrackerConfig,
    running: Arc<AtomicBool>,
    probe: Arc<dyn ForegroundProbe>,
    sink: Arc<dyn RecordSink>,
    stop_tx: Mutex<Option<Sender<()>>>,
}

impl TrackerService {
    pub fn new(probe: Arc<dyn ForegroundProbe>, sink: Arc<dyn RecordSink>, config: TrackerConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            probe,
            sink,
            stop_tx: Mutex::new(None),
        }
    }

    /// Spawn the polling thread with fresh tracker state
    pub fn start(&self) -> Result<thread::JoinHandle<()>, AppError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AppError::InvalidInput {
                field: "tracker",
                reason: "already running".into(),
            });
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        *safe_lock(&self.stop_tx, "Tracker stop handle") = Some(stop_tx);

        let poll_interval = self.config.poll_interval;
        let mut sampler = Sampler::new(
            Arc::clone(&self.probe),
            Arc::clone(&self.sink),
            self.config.probe_timeout,
        );

        let spawned = thread::Builder::new()
            .name("pulse-tracker".into())
            .spawn(move || {
                log::info!(
                    "Starting active window tracker ({} ms interval)",
                    poll_interval.as_millis()
                );
                loop {
                    match stop_rx.recv_timeout(poll_interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            sampler.step();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::info!("Active window tracker stopped");
            });

        spawned.map_err(|e| {
            self.running.store(false, Ordering::SeqCst);
            AppError::Io(e)
        })
    }

    /// Ask the polling thread to exit; it does so without waiting for the next tick.
    ///
    /// Only `stop` clears the running flag, so a restart is not undone by
    /// the previous thread winding down.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        safe_lock(&self.stop_tx, "Tracker stop handle").take();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
