use {
    crate::{CaptureError, owner::Command},
    base::Vec2,
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    tokio::sync::mpsc,
};

/// A display target the camera draws its live preview into.
///
/// Clones share one validity flag, so destroying any clone invalidates all of them.
#[derive(Debug, Clone)]
pub struct Surface {
    id: u64,
    size: Vec2<usize>,
    destroyed: Arc<AtomicBool>,
}

impl Surface {
    pub fn new(id: u64, size: Vec2<usize>) -> Self {
        Self {
            id,
            size,
            destroyed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Size of the surface in pixels, used as the target for size selection.
    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    /// Mark the surface as gone. Further submissions with it are rejected.
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
    }

    pub fn is_valid(&self) -> bool {
        !self.destroyed.load(Ordering::Acquire) && self.size.area() > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusMode {
    Auto,
    Infinity,
    Macro,
    Fixed,
    Edof,
    ContinuousVideo,
    ContinuousPicture,
}

/// What a device supports, read once after it is opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    pub preview_sizes: Vec<Vec2<usize>>,
    pub picture_sizes: Vec<Vec2<usize>>,
    pub default_preview_size: Option<Vec2<usize>>,
    pub default_picture_size: Option<Vec2<usize>>,
    pub focus_modes: Vec<FocusMode>,
}

/// Parameters applied to an open device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSettings {
    pub preview_size: Vec2<usize>,
    pub picture_size: Vec2<usize>,
    pub focus_mode: Option<FocusMode>,
}

/// Acquires physical camera devices.
pub trait CameraDriver: Send {
    /// Open camera `id`. The returned handle reports captures through `events`.
    ///
    /// Fails with `CaptureError::DeviceUnavailable` when no such device exists.
    fn open(&mut self, id: u32, events: HardwareEvents)
    -> Result<Box<dyn CameraHandle>, CaptureError>;
}

/// An open camera. Only the owner thread ever calls into a handle.
pub trait CameraHandle: Send {
    fn capabilities(&self) -> Capabilities;
    fn bind_surface(&mut self, surface: &Surface) -> Result<(), CaptureError>;
    fn configure(&mut self, settings: &DeviceSettings) -> Result<(), CaptureError>;
    fn start_preview(&mut self) -> Result<(), CaptureError>;
    fn stop_preview(&mut self) -> Result<(), CaptureError>;
    /// Ask for the next preview frame, reported once via `HardwareEvents::preview_frame`.
    fn request_one_shot_frame(&mut self) -> Result<(), CaptureError>;
    /// Start a full-resolution capture, reported via `HardwareEvents::picture_taken`.
    /// The live preview pauses until the owner resumes it.
    fn capture_picture(&mut self) -> Result<(), CaptureError>;
    fn release(&mut self);
}

#[derive(Debug)]
pub(crate) enum HardwareEvent {
    PreviewFrame(Vec<u8>),
    PictureTaken(Vec<u8>),
}

/// Channel from a driver back into the owner's command queue.
///
/// Drivers may call this from any thread. The event is queued behind every
/// command submitted before it and handled on the owner thread.
#[derive(Debug, Clone)]
pub struct HardwareEvents {
    sender: mpsc::UnboundedSender<Command>,
}

impl HardwareEvents {
    pub(crate) fn new(sender: mpsc::UnboundedSender<Command>) -> Self {
        Self { sender }
    }

    /// Report preview frame data. Returns false once the owner has shut down.
    pub fn preview_frame(&self, bytes: Vec<u8>) -> bool {
        self.post(HardwareEvent::PreviewFrame(bytes))
    }

    /// Report a completed picture. Returns false once the owner has shut down.
    pub fn picture_taken(&self, bytes: Vec<u8>) -> bool {
        self.post(HardwareEvent::PictureTaken(bytes))
    }

    fn post(&self, event: HardwareEvent) -> bool {
        if self.sender.send(Command::Hardware(event)).is_err() {
            log::debug!("hardware event after owner shutdown, dropped");
            return false;
        }
        true
    }
}
