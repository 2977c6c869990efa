#![allow(dead_code)]

use {
    base::Vec2,
    camera::{
        CameraConfig, CameraDriver, CameraHandle, Capabilities, CaptureError, DeviceSettings,
        FocusMode, HardwareEvents, Surface,
    },
    std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
        thread,
        time::Duration,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(u32),
    Bind(u64),
    Configure(DeviceSettings),
    StartPreview,
    StopPreview,
    RequestFrame,
    CapturePicture,
    Release,
}

/// Every driver call, in the order the owner made it.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Delivery {
    /// Report from inside the driver call, on the owner thread.
    Immediate,
    /// Report from another thread after a delay.
    Delayed(Duration),
    Never,
}

fn deliver(delivery: Delivery, report: impl FnOnce() + Send + 'static) {
    match delivery {
        Delivery::Immediate => report(),
        Delivery::Delayed(delay) => {
            thread::spawn(move || {
                thread::sleep(delay);
                report();
            });
        }
        Delivery::Never => {}
    }
}

pub fn stub_capabilities() -> Capabilities {
    Capabilities {
        preview_sizes: vec![Vec2::new(4, 3), Vec2::new(8, 6)],
        picture_sizes: vec![Vec2::new(8, 6)],
        default_preview_size: Some(Vec2::new(4, 3)),
        default_picture_size: Some(Vec2::new(8, 6)),
        focus_modes: vec![FocusMode::Auto, FocusMode::Infinity],
    }
}

/// A scripted driver that records every call into a `CallLog`.
#[derive(Debug, Clone)]
pub struct StubDriver {
    log: CallLog,
    capabilities: Capabilities,
    frame_bytes: Vec<u8>,
    picture_bytes: Vec<u8>,
    frame_delivery: Delivery,
    picture_delivery: Delivery,
    available: bool,
    panic_on_start: bool,
    // shared by every handle the driver opens
    panic_on_configure: Arc<AtomicBool>,
}

impl StubDriver {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            capabilities: stub_capabilities(),
            frame_bytes: vec![0x10, 0x20],
            picture_bytes: vec![0xAA; 4],
            frame_delivery: Delivery::Immediate,
            picture_delivery: Delivery::Immediate,
            available: true,
            panic_on_start: false,
            panic_on_configure: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_frame_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.frame_bytes = bytes;
        self
    }

    pub fn with_frame_delivery(mut self, delivery: Delivery) -> Self {
        self.frame_delivery = delivery;
        self
    }

    pub fn with_picture_delivery(mut self, delivery: Delivery) -> Self {
        self.picture_delivery = delivery;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Panic inside the first `start_preview` call.
    pub fn panicking_on_start(mut self) -> Self {
        self.panic_on_start = true;
        self
    }

    /// Panic inside the first `configure` call of any handle.
    pub fn panicking_on_configure(self) -> Self {
        self.panic_on_configure.store(true, Ordering::SeqCst);
        self
    }
}

impl CameraDriver for StubDriver {
    fn open(
        &mut self,
        id: u32,
        events: HardwareEvents,
    ) -> Result<Box<dyn CameraHandle>, CaptureError> {
        self.log.push(Call::Open(id));
        if !self.available {
            return Err(CaptureError::DeviceUnavailable("stub camera missing".to_string()));
        }
        Ok(Box::new(StubCamera {
            driver: self.clone(),
            events,
        }))
    }
}

struct StubCamera {
    driver: StubDriver,
    events: HardwareEvents,
}

impl CameraHandle for StubCamera {
    fn capabilities(&self) -> Capabilities {
        self.driver.capabilities.clone()
    }

    fn bind_surface(&mut self, surface: &Surface) -> Result<(), CaptureError> {
        self.driver.log.push(Call::Bind(surface.id()));
        Ok(())
    }

    fn configure(&mut self, settings: &DeviceSettings) -> Result<(), CaptureError> {
        if self.driver.panic_on_configure.swap(false, Ordering::SeqCst) {
            panic!("stub driver failed to configure");
        }
        self.driver.log.push(Call::Configure(settings.clone()));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CaptureError> {
        if self.driver.panic_on_start {
            self.driver.panic_on_start = false;
            panic!("stub driver exploded");
        }
        self.driver.log.push(Call::StartPreview);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CaptureError> {
        self.driver.log.push(Call::StopPreview);
        Ok(())
    }

    fn request_one_shot_frame(&mut self) -> Result<(), CaptureError> {
        self.driver.log.push(Call::RequestFrame);
        let events = self.events.clone();
        let bytes = self.driver.frame_bytes.clone();
        deliver(self.driver.frame_delivery, move || {
            events.preview_frame(bytes);
        });
        Ok(())
    }

    fn capture_picture(&mut self) -> Result<(), CaptureError> {
        self.driver.log.push(Call::CapturePicture);
        let events = self.events.clone();
        let bytes = self.driver.picture_bytes.clone();
        deliver(self.driver.picture_delivery, move || {
            events.picture_taken(bytes);
        });
        Ok(())
    }

    fn release(&mut self) {
        self.driver.log.push(Call::Release);
    }
}

pub fn surface() -> Surface {
    Surface::new(1, Vec2::new(4, 3))
}

pub fn config() -> CameraConfig {
    CameraConfig::default()
        .with_min_pixels(0)
        .with_frame_timeout(Some(Duration::from_secs(2)))
}

pub fn settings(preview: Vec2<usize>) -> DeviceSettings {
    DeviceSettings {
        preview_size: preview,
        picture_size: Vec2::new(8, 6),
        focus_mode: Some(FocusMode::Infinity),
    }
}
