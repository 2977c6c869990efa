use {
    crate::{
        CameraConfig, CameraDriver, CameraHandle, CaptureCallback, CaptureError, CaptureKind,
        CaptureRequester, DeviceSettings, FrameSink, HardwareEvents, ReadyGate, Registration,
        ResourceState, Surface, Tag,
        device::HardwareEvent,
        selection::{choose_focus_mode, choose_size},
        state::{Effect, Operation, holds_handle, transition},
    },
    std::{
        panic::{self, AssertUnwindSafe},
        sync::Arc,
        thread::{self, JoinHandle},
        time::Duration,
    },
    tokio::sync::{mpsc, oneshot},
};

const OWNER_THREAD_NAME: &str = "camera-owner";

pub(crate) enum Command {
    OpenAndInit(Surface),
    Reconfigure(Surface),
    StartPreview,
    StopPreview,
    RequestFrame(Registration),
    RequestPicture(Registration),
    Close,
    QueryState(oneshot::Sender<ResourceState>),
    Hardware(HardwareEvent),
    Quit,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::OpenAndInit(_) => "open",
            Command::Reconfigure(_) => "reconfigure",
            Command::StartPreview => "start-preview",
            Command::StopPreview => "stop-preview",
            Command::RequestFrame(_) => "request-frame",
            Command::RequestPicture(_) => "request-picture",
            Command::Close => "close",
            Command::QueryState(_) => "query-state",
            Command::Hardware(HardwareEvent::PreviewFrame(_)) => "preview-frame-event",
            Command::Hardware(HardwareEvent::PictureTaken(_)) => "picture-event",
            Command::Quit => "quit",
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command({})", self.name())
    }
}

/// Cloneable submission side of a `ResourceOwner`.
///
/// Every `submit_*` call first waits for the owner loop to become ready, then
/// enqueues one command and returns. Commands run in submission order on the
/// owner thread. An `Ok` return means the command was queued, not that it
/// succeeded; results arrive only through the supplied destinations.
#[derive(Debug, Clone)]
pub struct OwnerHandle {
    sender: mpsc::UnboundedSender<Command>,
    ready: ReadyGate,
    ready_timeout: Option<Duration>,
}

impl OwnerHandle {
    fn submit(&self, command: Command) -> Result<(), CaptureError> {
        self.ready.wait(self.ready_timeout)?;
        self.sender
            .send(command)
            .map_err(|_| CaptureError::Channel("camera owner has stopped".to_string()))
    }

    fn check_surface(surface: &Surface) -> Result<(), CaptureError> {
        if surface.is_valid() {
            Ok(())
        } else {
            log::warn!("rejecting surface {}: missing or destroyed", surface.id());
            Err(CaptureError::InvalidSurface)
        }
    }

    /// Whether the owner loop is accepting commands.
    pub fn is_ready(&self) -> bool {
        self.ready.is_open()
    }

    /// Open the device, bind it to `surface` and apply the preferred sizes.
    /// A no-op if the device is already open.
    pub fn submit_open_and_init(&self, surface: &Surface) -> Result<(), CaptureError> {
        Self::check_surface(surface)?;
        self.submit(Command::OpenAndInit(surface.clone()))
    }

    /// Follow a surface change: stop the preview, rebind and reconfigure for
    /// the new surface, and start the preview again.
    pub fn submit_surface_changed(&self, surface: &Surface) -> Result<(), CaptureError> {
        Self::check_surface(surface)?;
        self.submit(Command::StopPreview)?;
        self.submit(Command::Reconfigure(surface.clone()))?;
        self.submit(Command::StartPreview)
    }

    pub fn submit_start_preview(&self) -> Result<(), CaptureError> {
        self.submit(Command::StartPreview)
    }

    /// Stop the live feed. Outstanding frame and picture registrations are dropped.
    pub fn submit_stop_preview(&self) -> Result<(), CaptureError> {
        self.submit(Command::StopPreview)
    }

    /// Deliver the next preview frame to `destination`, once.
    /// Dropped if the preview is not running when the command executes.
    pub fn submit_request_frame(
        &self,
        destination: Arc<dyn FrameSink>,
        tag: Tag,
    ) -> Result<(), CaptureError> {
        self.submit(Command::RequestFrame(Registration::new(destination, tag)))
    }

    /// Take a full-resolution picture and deliver it to `destination`, once.
    /// The preview resumes automatically when the picture completes.
    pub fn submit_request_picture(
        &self,
        destination: Arc<dyn FrameSink>,
        tag: Tag,
    ) -> Result<(), CaptureError> {
        self.submit(Command::RequestPicture(Registration::new(destination, tag)))
    }

    /// Stop the preview if needed and release the device. Idempotent.
    pub fn submit_close(&self) -> Result<(), CaptureError> {
        self.submit(Command::Close)
    }

    /// Current resource state, as seen after every command submitted before this call.
    ///
    /// Blocks the calling thread; do not call from inside an async task.
    pub fn state(&self) -> Result<ResourceState, CaptureError> {
        let (reply, response) = oneshot::channel();
        self.submit(Command::QueryState(reply))?;
        response
            .blocking_recv()
            .map_err(|_| CaptureError::Channel("camera owner dropped state query".to_string()))
    }
}

impl CaptureRequester for OwnerHandle {
    fn wait_ready(&self, timeout: Option<Duration>) -> Result<(), CaptureError> {
        self.ready.wait(timeout)
    }

    fn request(
        &self,
        kind: CaptureKind,
        destination: Arc<dyn FrameSink>,
        tag: Tag,
    ) -> Result<(), CaptureError> {
        match kind {
            CaptureKind::PreviewFrame => self.submit_request_frame(destination, tag),
            CaptureKind::Picture => self.submit_request_picture(destination, tag),
        }
    }
}

/// Owns the camera on a dedicated thread and serializes every operation on it.
pub struct ResourceOwner {
    handle: OwnerHandle,
    pending: Option<OwnerLoop>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ResourceOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceOwner")
            .field("ready", &self.handle.is_ready())
            .field("started", &self.pending.is_none())
            .field("thread", &self.thread.is_some())
            .finish()
    }
}

impl ResourceOwner {
    /// Create an owner for `driver`. Nothing runs until `start`.
    pub fn new(driver: Box<dyn CameraDriver>, config: CameraConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let ready = ReadyGate::new();
        let handle = OwnerHandle {
            sender: sender.clone(),
            ready: ready.clone(),
            ready_timeout: config.ready_timeout(),
        };
        let owner_loop = OwnerLoop {
            driver,
            device: None,
            state: ResourceState::Closed,
            surface: None,
            preview_callback: CaptureCallback::preview(),
            picture_callback: CaptureCallback::picture(),
            events: HardwareEvents::new(sender),
            receiver,
            ready,
            config,
        };
        Self {
            handle,
            pending: Some(owner_loop),
            thread: None,
        }
    }

    pub fn handle(&self) -> &OwnerHandle {
        &self.handle
    }

    /// Spawn the command loop thread. Calling it again is a logged no-op.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        let Some(owner_loop) = self.pending.take() else {
            log::warn!("camera owner already started");
            return Ok(());
        };
        let thread = thread::Builder::new()
            .name(OWNER_THREAD_NAME.to_string())
            .spawn(move || owner_loop.run())?;
        self.thread = Some(thread);
        Ok(())
    }

    /// Stop the command loop after it has run every command queued so far.
    /// A device that is still open is released on the way out.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        if self.handle.sender.send(Command::Quit).is_err() {
            log::debug!("camera owner loop already gone");
        }
        if thread.join().is_err() {
            log::error!("camera owner thread panicked");
        }
    }
}

impl Drop for ResourceOwner {
    fn drop(&mut self) {
        self.stop();
    }
}

struct OwnerLoop {
    driver: Box<dyn CameraDriver>,
    device: Option<Box<dyn CameraHandle>>,
    state: ResourceState,
    surface: Option<Surface>,
    preview_callback: CaptureCallback,
    picture_callback: CaptureCallback,
    events: HardwareEvents,
    receiver: mpsc::UnboundedReceiver<Command>,
    ready: ReadyGate,
    config: CameraConfig,
}

impl OwnerLoop {
    fn run(mut self) {
        self.ready.open();
        log::info!("camera owner: command loop ready");

        while let Some(command) = self.receiver.blocking_recv() {
            if let Command::Quit = command {
                break;
            }
            let name = command.name();
            // driver panics are contained to the command that raised them
            match panic::catch_unwind(AssertUnwindSafe(|| self.execute(command))) {
                Ok(Ok(())) => {}
                Ok(Err(CaptureError::StaleCallback(kind))) => {
                    log::debug!("camera owner: got {} callback, but no destination registered", kind);
                }
                Ok(Err(error)) => {
                    let failure = CaptureError::CommandFailure(format!("{name}: {error}"));
                    log::error!("camera owner: {}", failure);
                }
                Err(_) => {
                    log::error!("camera owner: {} panicked, continuing with next command", name);
                    if self.state == ResourceState::Opening {
                        // the open never finished, nothing may keep the half-open handle
                        self.release_device();
                    }
                }
            }
        }

        if holds_handle(self.state) {
            log::info!("camera owner: releasing device on shutdown");
            if let Err(error) = self.apply(Operation::Close, None) {
                log::error!("camera owner: close on shutdown failed: {}", error);
            }
        }
        log::info!("camera owner: command loop stopped");
    }

    fn execute(&mut self, command: Command) -> Result<(), CaptureError> {
        match command {
            Command::OpenAndInit(surface) => {
                if holds_handle(self.state) {
                    log::warn!("camera owner: open while already open, ignoring");
                    return Ok(());
                }
                self.surface = Some(surface);
                self.apply(Operation::Open, None)
            }
            Command::Reconfigure(surface) => {
                self.surface = Some(surface);
                self.apply(Operation::Reconfigure, None)
            }
            Command::StartPreview => self.apply(Operation::StartPreview, None),
            Command::StopPreview => self.apply(Operation::StopPreview, None),
            Command::RequestFrame(registration) => {
                self.apply(Operation::RequestFrame, Some(registration))
            }
            Command::RequestPicture(registration) => {
                self.apply(Operation::RequestPicture, Some(registration))
            }
            Command::Close => self.apply(Operation::Close, None),
            Command::QueryState(reply) => {
                if reply.send(self.state).is_err() {
                    log::debug!("camera owner: state query caller went away");
                }
                Ok(())
            }
            Command::Hardware(HardwareEvent::PreviewFrame(bytes)) => {
                let tag = self.preview_callback.fire(bytes)?;
                log::debug!("camera owner: delivered preview frame {}", tag);
                Ok(())
            }
            Command::Hardware(HardwareEvent::PictureTaken(bytes)) => {
                // the capture paused the live feed; resume before handing the picture on
                let resumed = self.apply(Operation::PictureTaken, None);
                let tag = self.picture_callback.fire(bytes)?;
                log::debug!("camera owner: delivered picture {}", tag);
                resumed
            }
            Command::Quit => Ok(()),
        }
    }

    fn apply(
        &mut self,
        operation: Operation,
        mut registration: Option<Registration>,
    ) -> Result<(), CaptureError> {
        let Some(transition) = transition(self.state, operation) else {
            match operation {
                Operation::RequestFrame | Operation::RequestPicture => {
                    log::debug!(
                        "camera owner: {:?} dropped while {}",
                        operation,
                        self.state
                    );
                }
                _ => log::debug!("camera owner: {:?} is a no-op while {}", operation, self.state),
            }
            return Ok(());
        };

        if let Some(via) = transition.via {
            self.state = via;
        }

        for effect in transition.effects {
            if let Err(error) = self.run_effect(*effect, &mut registration) {
                if transition.to == ResourceState::Closed {
                    // teardown is best effort, the handle is released regardless
                    log::warn!("camera owner: {:?} failed during close: {}", effect, error);
                    continue;
                }
                if transition.from == ResourceState::Closed {
                    self.release_device();
                }
                return Err(error);
            }
        }

        if transition.from != transition.to {
            log::info!("camera owner: {} -> {}", transition.from, transition.to);
        }
        self.state = transition.to;
        Ok(())
    }

    fn device_mut(&mut self) -> Result<&mut Box<dyn CameraHandle>, CaptureError> {
        self.device
            .as_mut()
            .ok_or_else(|| CaptureError::Device("no device handle".to_string()))
    }

    fn run_effect(
        &mut self,
        effect: Effect,
        registration: &mut Option<Registration>,
    ) -> Result<(), CaptureError> {
        match effect {
            Effect::Acquire => {
                let device = self
                    .driver
                    .open(self.config.camera_id(), self.events.clone())?;
                self.device = Some(device);
            }
            Effect::BindSurface => {
                let surface = match &self.surface {
                    Some(surface) if surface.is_valid() => surface.clone(),
                    _ => return Err(CaptureError::InvalidSurface),
                };
                self.device_mut()?.bind_surface(&surface)?;
            }
            Effect::Configure => self.configure()?,
            Effect::StartPreview | Effect::ResumePreview => {
                self.device_mut()?.start_preview()?;
                self.state = ResourceState::Previewing;
            }
            Effect::StopPreview => {
                self.device_mut()?.stop_preview()?;
                self.state = ResourceState::Idle;
            }
            Effect::ClearRegistrations => {
                self.preview_callback.clear();
                self.picture_callback.clear();
            }
            Effect::RegisterFrame => {
                let registration = registration.take().ok_or_else(|| {
                    CaptureError::CommandFailure("frame request without destination".to_string())
                })?;
                self.preview_callback.register(registration);
                if let Err(error) = self.device_mut()?.request_one_shot_frame() {
                    self.preview_callback.clear();
                    return Err(error);
                }
            }
            Effect::TriggerPicture => {
                let registration = registration.take().ok_or_else(|| {
                    CaptureError::CommandFailure("picture request without destination".to_string())
                })?;
                self.picture_callback.register(registration);
                if let Err(error) = self.device_mut()?.capture_picture() {
                    self.picture_callback.clear();
                    return Err(error);
                }
            }
            Effect::Release => self.release_device(),
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<(), CaptureError> {
        let target = self
            .surface
            .as_ref()
            .map(|surface| surface.size())
            .ok_or(CaptureError::InvalidSurface)?;
        let capabilities = self.device_mut()?.capabilities();

        let preview_size = choose_size(
            &capabilities.preview_sizes,
            target,
            self.config.min_pixels(),
            self.config.max_aspect_distortion(),
            capabilities.default_preview_size,
        )
        .ok_or_else(|| CaptureError::Device("no usable preview size".to_string()))?;
        let picture_size = choose_size(
            &capabilities.picture_sizes,
            target,
            self.config.min_pixels(),
            self.config.max_aspect_distortion(),
            capabilities.default_picture_size,
        )
        .ok_or_else(|| CaptureError::Device("no usable picture size".to_string()))?;
        let focus_mode = choose_focus_mode(&capabilities.focus_modes, self.config.focus_preference());

        let settings = DeviceSettings {
            preview_size,
            picture_size,
            focus_mode,
        };
        log::info!(
            "camera owner: surface {}, preview {}, picture {}, focus {:?}",
            target,
            preview_size,
            picture_size,
            focus_mode
        );
        self.device_mut()?.configure(&settings)?;

        self.preview_callback.set_resolution(Some(preview_size));
        self.picture_callback.set_resolution(Some(picture_size));
        Ok(())
    }

    fn release_device(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
        }
        self.preview_callback.clear();
        self.picture_callback.clear();
        self.preview_callback.set_resolution(None);
        self.picture_callback.set_resolution(None);
        self.state = ResourceState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::SyntheticDriver};

    #[test]
    fn test_abandoned_state_query_keeps_loop_running() {
        let mut owner = ResourceOwner::new(Box::new(SyntheticDriver::new()), CameraConfig::default());
        owner.start().unwrap();

        let (reply, response) = oneshot::channel();
        drop(response);
        owner.handle().submit(Command::QueryState(reply)).unwrap();

        assert_eq!(owner.handle().state().unwrap(), ResourceState::Closed);
        owner.stop();
    }
}
