use {
    crate::{
        CameraConfig, CameraDriver, CaptureError, CaptureRequester, FrameProcessor, OwnerHandle,
        ProcessingCoordinator, ProcessingWorker, ResourceOwner, ResultSink, Surface, WorkerState,
    },
    std::sync::Arc,
};

/// A running capture pipeline: the camera owner plus one processing worker.
///
/// Dropping a session stops it.
#[derive(Debug)]
pub struct Session {
    owner: ResourceOwner,
    coordinator: Arc<ProcessingCoordinator>,
    worker: ProcessingWorker,
    stopped: bool,
}

impl Session {
    /// Start the owner, open the camera on `surface`, start the preview and
    /// start pulling frames through `processor` into `results`.
    pub fn start<P, S>(
        driver: Box<dyn CameraDriver>,
        surface: &Surface,
        config: CameraConfig,
        processor: P,
        results: S,
    ) -> Result<Self, CaptureError>
    where
        P: FrameProcessor,
        S: ResultSink<P::Output>,
    {
        let mut owner = ResourceOwner::new(driver, config.clone());
        owner.start()?;
        owner.handle().submit_open_and_init(surface)?;
        owner.handle().submit_start_preview()?;

        let requester: Arc<dyn CaptureRequester> = Arc::new(owner.handle().clone());
        let coordinator = Arc::new(ProcessingCoordinator::new(requester, config.frame_timeout()));
        let mut worker = ProcessingWorker::new(
            coordinator.clone(),
            config.request_kind(),
            config.worker_join_timeout(),
        );
        worker.start(processor, results)?;
        log::info!("session started on surface {} ({})", surface.id(), surface.size());

        Ok(Self {
            owner,
            coordinator,
            worker,
            stopped: false,
        })
    }

    /// Submission handle for the camera owner, for pictures and preview control.
    pub fn owner(&self) -> &OwnerHandle {
        self.owner.handle()
    }

    pub fn coordinator(&self) -> &Arc<ProcessingCoordinator> {
        &self.coordinator
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    /// The display surface changed size or was recreated.
    pub fn surface_changed(&self, surface: &Surface) -> Result<(), CaptureError> {
        self.owner.handle().submit_surface_changed(surface)
    }

    /// Stop the worker, close the camera and stop the owner loop, in that order.
    ///
    /// Returns the worker's shutdown result. Calling it again does nothing.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let worker = self.worker.stop();
        if let Err(error) = self.owner.handle().submit_close() {
            log::warn!("session: close not submitted: {}", error);
        }
        self.owner.stop();
        log::info!("session stopped");
        worker
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::warn!("session: {}", error);
        }
    }
}
