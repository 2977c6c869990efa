use {
    crate::{CaptureError, CaptureKind, Frame, ProcessingCoordinator, ReadyGate, ResultSink},
    std::{
        fmt,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread::{self, JoinHandle},
        time::Duration,
    },
};

const WORKER_THREAD_NAME: &str = "processing-worker";

/// The processing step run on every pulled frame.
pub trait FrameProcessor: Send + 'static {
    type Output: Send + 'static;

    fn process(&mut self, frame: &Frame) -> Self::Output;
}

impl<F, R> FrameProcessor for F
where
    F: FnMut(&Frame) -> R + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn process(&mut self, frame: &Frame) -> R {
        self(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Created => write!(f, "created"),
            WorkerState::Running => write!(f, "running"),
            WorkerState::Stopping => write!(f, "stopping"),
            WorkerState::Stopped => write!(f, "stopped"),
        }
    }
}

// opens the exit gate however the loop ends, panics included
struct ExitSignal(ReadyGate);

impl Drop for ExitSignal {
    fn drop(&mut self) {
        self.0.open();
    }
}

/// Runs the pull loop: request a frame, process it, publish the result.
///
/// There is never more than one request in flight, since the next one is
/// only issued after the previous result was published.
pub struct ProcessingWorker {
    coordinator: Arc<ProcessingCoordinator>,
    kind: CaptureKind,
    join_timeout: Duration,
    state: WorkerState,
    running: Arc<AtomicBool>,
    exited: ReadyGate,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for ProcessingWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingWorker")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("join_timeout", &self.join_timeout)
            .finish()
    }
}

impl ProcessingWorker {
    pub fn new(
        coordinator: Arc<ProcessingCoordinator>,
        kind: CaptureKind,
        join_timeout: Duration,
    ) -> Self {
        Self {
            coordinator,
            kind,
            join_timeout,
            state: WorkerState::Created,
            running: Arc::new(AtomicBool::new(false)),
            exited: ReadyGate::new(),
            thread: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Whether the loop thread has exited.
    pub fn has_exited(&self) -> bool {
        self.exited.is_open()
    }

    /// Spawn the loop thread. Only valid once, from `Created`.
    pub fn start<P, S>(&mut self, mut processor: P, sink: S) -> Result<(), CaptureError>
    where
        P: FrameProcessor,
        S: ResultSink<P::Output>,
    {
        if self.state != WorkerState::Created {
            return Err(CaptureError::CommandFailure(format!(
                "cannot start processing worker while {}",
                self.state
            )));
        }

        self.running.store(true, Ordering::Release);
        let coordinator = self.coordinator.clone();
        let running = self.running.clone();
        let exit = ExitSignal(self.exited.clone());
        let kind = self.kind;

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _exit = exit;
                log::info!("processing worker: pulling {}s", kind);
                let mut processed = 0u64;
                while running.load(Ordering::Acquire) {
                    let frame = match coordinator.request_frame(kind) {
                        Ok(frame) => frame,
                        Err(CaptureError::Cancelled) => break,
                        Err(CaptureError::Timeout(after)) => {
                            log::warn!("processing worker: no {} within {:?}, asking again", kind, after);
                            continue;
                        }
                        Err(error) => {
                            log::error!("processing worker: frame request failed: {}", error);
                            break;
                        }
                    };
                    if !running.load(Ordering::Acquire) {
                        log::debug!("processing worker: stopping, dropping frame {}", frame.tag());
                        break;
                    }
                    let result = processor.process(&frame);
                    sink.publish(result);
                    processed += 1;
                }
                log::info!("processing worker: stopped after {} frames", processed);
            });

        match thread {
            Ok(thread) => {
                self.thread = Some(thread);
                self.state = WorkerState::Running;
                Ok(())
            }
            Err(error) => {
                self.running.store(false, Ordering::Release);
                self.state = WorkerState::Stopped;
                Err(error.into())
            }
        }
    }

    /// Stop the loop and wait for it to exit, at most for the join timeout.
    ///
    /// A request blocked in the coordinator is cancelled. If the processing
    /// step itself outlasts the timeout the thread is detached and `Timeout`
    /// is returned; the worker counts as stopped either way.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        match self.state {
            WorkerState::Stopped => return Ok(()),
            WorkerState::Created => {
                self.state = WorkerState::Stopped;
                return Ok(());
            }
            WorkerState::Running | WorkerState::Stopping => {}
        }

        self.state = WorkerState::Stopping;
        self.running.store(false, Ordering::Release);
        self.coordinator.cancel();

        let result = self.exited.wait(Some(self.join_timeout));
        match &result {
            Ok(()) => {
                if let Some(thread) = self.thread.take() {
                    if thread.join().is_err() {
                        log::error!("processing worker thread panicked");
                    }
                }
            }
            Err(_) => {
                log::error!(
                    "processing worker did not exit within {:?}, detaching",
                    self.join_timeout
                );
                self.thread = None;
            }
        }
        self.state = WorkerState::Stopped;
        result
    }
}

impl Drop for ProcessingWorker {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::warn!("processing worker: {}", error);
        }
    }
}
