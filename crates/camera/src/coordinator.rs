use {
    crate::{CaptureError, CaptureKind, Frame, FrameSink, Tag},
    std::{
        sync::{
            Arc, Condvar, Mutex,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
};

// longest a cancel can go unnoticed while the owner is not ready yet
const READY_POLL: Duration = Duration::from_millis(20);

/// Anything that can queue a one-shot capture for a destination.
pub trait CaptureRequester: Send + Sync {
    /// Block until requests can be accepted, for at most `timeout` if given.
    fn wait_ready(&self, _timeout: Option<Duration>) -> Result<(), CaptureError> {
        Ok(())
    }

    fn request(
        &self,
        kind: CaptureKind,
        destination: Arc<dyn FrameSink>,
        tag: Tag,
    ) -> Result<(), CaptureError>;
}

#[derive(Debug, Default)]
struct SlotState {
    frame: Option<Frame>,
    cancelled: bool,
}

/// Single-frame mailbox. A new frame overwrites an unread one; reading clears it.
#[derive(Debug, Default)]
pub struct PendingSlot {
    state: Mutex<SlotState>,
    arrived: Condvar,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` and wake one waiter.
    pub fn put(&self, frame: Frame) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = state.frame.replace(frame) {
            log::debug!("pending frame {} overwritten before pickup", previous.tag());
        }
        self.arrived.notify_one();
    }

    /// Take the unread frame, if any, without waiting.
    pub fn take(&self) -> Option<Frame> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .frame
            .take()
    }

    pub fn has_pending(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .frame
            .is_some()
    }

    /// Wake every waiter with `Cancelled`. Permanent for this slot.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.cancelled = true;
        self.arrived.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).cancelled
    }

    /// Block until a frame tagged `tag` is stored.
    ///
    /// Frames with any other tag are answers to earlier requests and are
    /// discarded, including one that arrived before this request was made.
    /// Only a pending frame with the matching tag is consumed without waiting.
    pub fn wait_for(&self, tag: Tag, timeout: Option<Duration>) -> Result<Frame, CaptureError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if state.cancelled {
                return Err(CaptureError::Cancelled);
            }
            if let Some(frame) = state.frame.take() {
                if frame.tag() == tag {
                    return Ok(frame);
                }
                log::debug!("discarding stale frame {} while waiting for {}", frame.tag(), tag);
                continue;
            }
            state = match deadline {
                None => self.arrived.wait(state).unwrap_or_else(|e| e.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(CaptureError::Timeout(timeout.unwrap_or_default()));
                    }
                    self.arrived
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
            };
        }
    }
}

impl FrameSink for PendingSlot {
    fn deliver(&self, frame: Frame) {
        self.put(frame);
    }
}

/// Turns the owner's push delivery into a blocking pull.
pub struct ProcessingCoordinator {
    requester: Arc<dyn CaptureRequester>,
    slot: Arc<PendingSlot>,
    next_tag: AtomicU64,
    frame_timeout: Option<Duration>,
}

impl std::fmt::Debug for ProcessingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingCoordinator")
            .field("slot", &self.slot)
            .field("next_tag", &self.next_tag)
            .field("frame_timeout", &self.frame_timeout)
            .finish()
    }
}

impl ProcessingCoordinator {
    pub fn new(requester: Arc<dyn CaptureRequester>, frame_timeout: Option<Duration>) -> Self {
        Self {
            requester,
            slot: Arc::new(PendingSlot::new()),
            next_tag: AtomicU64::new(1),
            frame_timeout,
        }
    }

    /// Request one capture of `kind` and block until it arrives.
    ///
    /// Blocks first on the owner's readiness barrier, then on the pending
    /// slot for at most the frame timeout. Returns `Cancelled` once `cancel`
    /// has been called, also while still waiting for readiness.
    pub fn request_frame(&self, kind: CaptureKind) -> Result<Frame, CaptureError> {
        loop {
            if self.slot.is_cancelled() {
                return Err(CaptureError::Cancelled);
            }
            match self.requester.wait_ready(Some(READY_POLL)) {
                Ok(()) => break,
                Err(CaptureError::Timeout(_)) => continue,
                Err(error) => return Err(error),
            }
        }
        let tag = Tag(self.next_tag.fetch_add(1, Ordering::Relaxed));
        let destination: Arc<dyn FrameSink> = self.slot.clone();
        self.requester.request(kind, destination, tag)?;
        self.slot.wait_for(tag, self.frame_timeout)
    }

    /// Store a delivered frame and wake the waiting requester.
    pub fn frame_arrived(&self, frame: Frame) {
        self.slot.put(frame);
    }

    /// The unread frame, if any.
    pub fn take_pending(&self) -> Option<Frame> {
        self.slot.take()
    }

    pub fn has_pending(&self) -> bool {
        self.slot.has_pending()
    }

    /// Interrupt a blocked `request_frame` and refuse further requests.
    pub fn cancel(&self) {
        self.slot.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.slot.is_cancelled()
    }
}
