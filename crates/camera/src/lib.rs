//! Exclusive camera access shared by a UI, a camera owner and a processing worker.
//!
//! `ResourceOwner` holds the device on its own thread and runs every operation
//! from an ordered command queue. `ProcessingCoordinator` turns one-shot frame
//! deliveries into a blocking pull, which `ProcessingWorker` runs in a loop,
//! publishing each processed result to a `ResultSink`. `Session` wires the
//! three together.

pub mod callback;
pub mod config;
pub mod coordinator;
pub mod device;
pub mod error;
pub mod frame;
pub mod owner;
pub mod ready;
pub mod selection;
pub mod session;
pub mod sink;
pub mod state;
pub mod synthetic;
pub mod worker;

pub use callback::{CaptureCallback, Registration};
pub use config::CameraConfig;
pub use coordinator::{CaptureRequester, PendingSlot, ProcessingCoordinator};
pub use device::{
    CameraDriver, CameraHandle, Capabilities, DeviceSettings, FocusMode, HardwareEvents, Surface,
};
pub use error::CaptureError;
pub use frame::{CaptureKind, Frame, Tag};
pub use owner::{OwnerHandle, ResourceOwner};
pub use ready::ReadyGate;
pub use selection::{choose_focus_mode, choose_size};
pub use session::Session;
pub use sink::{FrameSink, ResultSink, SessionEvent};
pub use state::{ResourceState, Transition, transition};
pub use synthetic::SyntheticDriver;
pub use worker::{FrameProcessor, ProcessingWorker, WorkerState};
