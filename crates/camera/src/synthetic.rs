use {
    crate::{
        CameraDriver, CameraHandle, Capabilities, CaptureError, DeviceSettings, FocusMode,
        HardwareEvents, Surface,
    },
    base::Vec2,
    std::{thread, time::Duration},
};

/// Draw an 8-bit luma test pattern: a horizontal ramp with a bright square
/// that moves with `phase`.
pub fn test_pattern(size: Vec2<usize>, phase: usize) -> Vec<u8> {
    let (width, height) = (size.x, size.y);
    let mut bytes = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return bytes;
    }
    let side = (width.min(height) / 4).max(1);
    let left = (phase * 7) % (width - side + 1);
    let top = (phase * 3) % (height - side + 1);
    for y in 0..height {
        for x in 0..width {
            let inside = (left..left + side).contains(&x) && (top..top + side).contains(&y);
            bytes[y * width + x] = if inside {
                255
            } else {
                (x * 128 / width) as u8
            };
        }
    }
    bytes
}

/// A camera that exists only in memory.
///
/// Captures are delivered from short-lived threads after a delay, the way a
/// real device reports them from its own context.
#[derive(Debug, Clone)]
pub struct SyntheticDriver {
    capabilities: Capabilities,
    frame_delay: Duration,
    picture_delay: Duration,
    available: bool,
}

impl Default for SyntheticDriver {
    fn default() -> Self {
        Self {
            capabilities: Capabilities {
                preview_sizes: vec![
                    Vec2::new(320, 240),
                    Vec2::new(640, 480),
                    Vec2::new(800, 600),
                    Vec2::new(1280, 720),
                ],
                picture_sizes: vec![
                    Vec2::new(1280, 720),
                    Vec2::new(1600, 1200),
                    Vec2::new(1920, 1080),
                ],
                default_preview_size: Some(Vec2::new(640, 480)),
                default_picture_size: Some(Vec2::new(1280, 720)),
                focus_modes: vec![FocusMode::Auto, FocusMode::Infinity, FocusMode::Fixed],
            },
            frame_delay: Duration::from_millis(33),
            picture_delay: Duration::from_millis(150),
            available: true,
        }
    }
}

impl SyntheticDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    pub fn with_picture_delay(mut self, picture_delay: Duration) -> Self {
        self.picture_delay = picture_delay;
        self
    }

    /// A driver whose camera can never be opened.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }
}

impl CameraDriver for SyntheticDriver {
    fn open(
        &mut self,
        id: u32,
        events: HardwareEvents,
    ) -> Result<Box<dyn CameraHandle>, CaptureError> {
        if !self.available || id != 0 {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no synthetic camera {id}"
            )));
        }
        log::info!("synthetic camera {} opened", id);
        Ok(Box::new(SyntheticCamera {
            events,
            capabilities: self.capabilities.clone(),
            frame_delay: self.frame_delay,
            picture_delay: self.picture_delay,
            surface: None,
            settings: None,
            previewing: false,
            frame_pending: false,
            phase: 0,
        }))
    }
}

struct SyntheticCamera {
    events: HardwareEvents,
    capabilities: Capabilities,
    frame_delay: Duration,
    picture_delay: Duration,
    surface: Option<u64>,
    settings: Option<DeviceSettings>,
    previewing: bool,
    // a frame requested while a picture had the preview paused
    frame_pending: bool,
    phase: usize,
}

impl SyntheticCamera {
    fn settings(&self) -> Result<&DeviceSettings, CaptureError> {
        self.settings
            .as_ref()
            .ok_or_else(|| CaptureError::Device("synthetic camera is not configured".to_string()))
    }

    fn dispatch_frame(&mut self) -> Result<(), CaptureError> {
        let size = self.settings()?.preview_size;
        self.phase += 1;
        let bytes = test_pattern(size, self.phase);
        let events = self.events.clone();
        let delay = self.frame_delay;
        thread::Builder::new()
            .name("synthetic-frame".to_string())
            .spawn(move || {
                thread::sleep(delay);
                events.preview_frame(bytes);
            })?;
        Ok(())
    }
}

impl CameraHandle for SyntheticCamera {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    fn bind_surface(&mut self, surface: &Surface) -> Result<(), CaptureError> {
        self.surface = Some(surface.id());
        Ok(())
    }

    fn configure(&mut self, settings: &DeviceSettings) -> Result<(), CaptureError> {
        if self.previewing {
            return Err(CaptureError::Device(
                "cannot configure while previewing".to_string(),
            ));
        }
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CaptureError> {
        if self.surface.is_none() {
            return Err(CaptureError::Device("no surface bound".to_string()));
        }
        self.settings()?;
        self.previewing = true;
        if self.frame_pending {
            self.frame_pending = false;
            self.dispatch_frame()?;
        }
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CaptureError> {
        self.previewing = false;
        self.frame_pending = false;
        Ok(())
    }

    fn request_one_shot_frame(&mut self) -> Result<(), CaptureError> {
        if self.previewing {
            self.dispatch_frame()
        } else {
            self.frame_pending = true;
            Ok(())
        }
    }

    fn capture_picture(&mut self) -> Result<(), CaptureError> {
        let size = self.settings()?.picture_size;
        self.previewing = false;
        self.phase += 1;
        let bytes = test_pattern(size, self.phase);
        let events = self.events.clone();
        let delay = self.picture_delay;
        thread::Builder::new()
            .name("synthetic-picture".to_string())
            .spawn(move || {
                thread::sleep(delay);
                events.picture_taken(bytes);
            })?;
        Ok(())
    }

    fn release(&mut self) {
        self.previewing = false;
        self.frame_pending = false;
        self.settings = None;
        self.surface = None;
        log::info!("synthetic camera released");
    }
}
