use {
    crate::{CaptureError, CaptureKind, Frame, FrameSink, Tag},
    base::Vec2,
    std::sync::Arc,
};

/// Where a one-shot capture should be delivered.
#[derive(Clone)]
pub struct Registration {
    pub destination: Arc<dyn FrameSink>,
    pub tag: Tag,
}

impl Registration {
    pub fn new(destination: Arc<dyn FrameSink>, tag: Tag) -> Self {
        Self { destination, tag }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("destination", &"<dyn FrameSink>")
            .field("tag", &self.tag)
            .finish()
    }
}

/// Adapts one hardware delivery into a tagged `Frame` for a registered destination.
///
/// The registration is consumed by the first delivery. A delivery without a
/// registration or without a known resolution is dropped.
#[derive(Debug)]
pub struct CaptureCallback {
    kind: CaptureKind,
    resolution: Option<Vec2<usize>>,
    registration: Option<Registration>,
}

impl CaptureCallback {
    pub fn new(kind: CaptureKind) -> Self {
        Self {
            kind,
            resolution: None,
            registration: None,
        }
    }

    pub fn preview() -> Self {
        Self::new(CaptureKind::PreviewFrame)
    }

    pub fn picture() -> Self {
        Self::new(CaptureKind::Picture)
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// The size the device was configured to deliver for this kind.
    pub fn set_resolution(&mut self, resolution: Option<Vec2<usize>>) {
        self.resolution = resolution;
    }

    pub fn resolution(&self) -> Option<Vec2<usize>> {
        self.resolution
    }

    /// Set the one-shot target, replacing any earlier one.
    pub fn register(&mut self, registration: Registration) {
        if let Some(previous) = self.registration.replace(registration) {
            log::debug!("{} registration {} replaced before delivery", self.kind, previous.tag);
        }
    }

    pub fn clear(&mut self) {
        self.registration = None;
    }

    pub fn is_armed(&self) -> bool {
        self.registration.is_some()
    }

    /// Deliver `bytes` to the registered destination and disarm.
    ///
    /// Returns the tag that was delivered, or `StaleCallback` if nothing was
    /// registered or no resolution is known.
    pub fn fire(&mut self, bytes: Vec<u8>) -> Result<Tag, CaptureError> {
        let Some(resolution) = self.resolution else {
            return Err(CaptureError::StaleCallback(self.kind));
        };
        let Some(Registration { destination, tag }) = self.registration.take() else {
            return Err(CaptureError::StaleCallback(self.kind));
        };
        destination.deliver(Frame::new(
            self.kind,
            bytes,
            resolution.x,
            resolution.y,
            tag,
        ));
        Ok(tag)
    }
}
