use {
    crate::CaptureError,
    std::{
        sync::{Arc, Condvar, Mutex},
        time::{Duration, Instant},
    },
};

/// A one-way gate. Threads block in `wait` until some thread calls `open`;
/// after that `wait` never blocks again.
#[derive(Debug, Clone, Default)]
pub struct ReadyGate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate and wake every waiter. Opening twice is harmless.
    pub fn open(&self) {
        let (lock, cond) = &*self.inner;
        let mut open = lock.lock().unwrap_or_else(|e| e.into_inner());
        *open = true;
        cond.notify_all();
    }

    pub fn is_open(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until the gate opens, or until `timeout` elapses if one is given.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<(), CaptureError> {
        let (lock, cond) = &*self.inner;
        let mut open = lock.lock().unwrap_or_else(|e| e.into_inner());
        let deadline = timeout.map(|t| Instant::now() + t);
        while !*open {
            open = match deadline {
                None => cond.wait(open).unwrap_or_else(|e| e.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(CaptureError::Timeout(timeout.unwrap_or_default()));
                    }
                    cond.wait_timeout(open, deadline - now)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
            };
        }
        Ok(())
    }
}
