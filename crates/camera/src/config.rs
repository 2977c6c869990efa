use crate::{CaptureKind, FocusMode};
use std::time::Duration;

// smallest preview size worth processing (a typical low-end screen)
const DEFAULT_MIN_PIXELS: usize = 480 * 320;

const DEFAULT_MAX_ASPECT_DISTORTION: f64 = 0.15;

const DEFAULT_FRAME_TIMEOUT_MS: u64 = 2000;

const DEFAULT_WORKER_JOIN_TIMEOUT_MS: u64 = 500;

/// Configuration for a capture session.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    camera_id: u32,
    min_pixels: usize,
    max_aspect_distortion: f64,
    focus_preference: Vec<FocusMode>,
    ready_timeout: Option<Duration>,
    frame_timeout: Option<Duration>,
    worker_join_timeout: Duration,
    request_kind: CaptureKind,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            camera_id: 0,
            min_pixels: DEFAULT_MIN_PIXELS,
            max_aspect_distortion: DEFAULT_MAX_ASPECT_DISTORTION,
            focus_preference: vec![FocusMode::Infinity],
            ready_timeout: None,
            frame_timeout: Some(Duration::from_millis(DEFAULT_FRAME_TIMEOUT_MS)),
            worker_join_timeout: Duration::from_millis(DEFAULT_WORKER_JOIN_TIMEOUT_MS),
            request_kind: CaptureKind::PreviewFrame,
        }
    }
}

impl CameraConfig {
    /// Set the id of the camera to open.
    pub fn with_camera_id(mut self, camera_id: u32) -> Self {
        self.camera_id = camera_id;
        self
    }

    /// Set the minimum pixel count a preview or picture size must have.
    pub fn with_min_pixels(mut self, min_pixels: usize) -> Self {
        self.min_pixels = min_pixels;
        self
    }

    /// Set how far a size's aspect ratio may stray from the surface's.
    pub fn with_max_aspect_distortion(mut self, max_aspect_distortion: f64) -> Self {
        self.max_aspect_distortion = max_aspect_distortion;
        self
    }

    /// Set the focus modes to try, most preferred first.
    pub fn with_focus_preference(mut self, focus_preference: Vec<FocusMode>) -> Self {
        self.focus_preference = focus_preference;
        self
    }

    /// Bound the wait for the owner loop to become ready. `None` waits forever.
    pub fn with_ready_timeout(mut self, ready_timeout: Option<Duration>) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    /// Bound a single frame request. `None` waits until delivery or cancellation.
    pub fn with_frame_timeout(mut self, frame_timeout: Option<Duration>) -> Self {
        self.frame_timeout = frame_timeout;
        self
    }

    /// Set how long stopping the worker waits for its thread to exit.
    pub fn with_worker_join_timeout(mut self, worker_join_timeout: Duration) -> Self {
        self.worker_join_timeout = worker_join_timeout;
        self
    }

    /// Set which capture kind the processing worker pulls.
    pub fn with_request_kind(mut self, request_kind: CaptureKind) -> Self {
        self.request_kind = request_kind;
        self
    }

    // Getters
    pub fn camera_id(&self) -> u32 {
        self.camera_id
    }

    pub fn min_pixels(&self) -> usize {
        self.min_pixels
    }

    pub fn max_aspect_distortion(&self) -> f64 {
        self.max_aspect_distortion
    }

    pub fn focus_preference(&self) -> &[FocusMode] {
        &self.focus_preference
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout
    }

    pub fn frame_timeout(&self) -> Option<Duration> {
        self.frame_timeout
    }

    pub fn worker_join_timeout(&self) -> Duration {
        self.worker_join_timeout
    }

    pub fn request_kind(&self) -> CaptureKind {
        self.request_kind
    }
}
