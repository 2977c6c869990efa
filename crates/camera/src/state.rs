//! The resource lifecycle as one table.
//!
//! Every legal (state, operation) pair maps to the state it ends in and the
//! ordered side effects the owner performs on the way. Pairs that are not
//! listed are no-ops. Stopping the preview always clears the one-shot
//! registrations, so a late hardware callback finds nothing to deliver to.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// No device handle is held.
    Closed,
    /// The device is being acquired and configured.
    Opening,
    /// The device is open and configured, the live feed is stopped.
    Idle,
    /// The live feed is running.
    Previewing,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Closed => write!(f, "closed"),
            ResourceState::Opening => write!(f, "opening"),
            ResourceState::Idle => write!(f, "idle"),
            ResourceState::Previewing => write!(f, "previewing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Reconfigure,
    StartPreview,
    StopPreview,
    RequestFrame,
    RequestPicture,
    /// The hardware finished a picture capture.
    PictureTaken,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Open the physical device.
    Acquire,
    BindSurface,
    /// Select and apply preview size, picture size and focus mode.
    Configure,
    StartPreview,
    StopPreview,
    /// Drop both one-shot registrations.
    ClearRegistrations,
    /// Arm the preview callback and ask the device for one frame.
    RegisterFrame,
    /// Arm the picture callback and start a full-resolution capture.
    TriggerPicture,
    /// Restart the live feed paused by a picture capture.
    ResumePreview,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ResourceState,
    /// State held while the effects run, if it differs from `from`.
    pub via: Option<ResourceState>,
    pub to: ResourceState,
    pub effects: &'static [Effect],
}

const OPEN: &[Effect] = &[Effect::Acquire, Effect::BindSurface, Effect::Configure];
const RECONFIGURE: &[Effect] = &[Effect::BindSurface, Effect::Configure];
const RECONFIGURE_LIVE: &[Effect] = &[
    Effect::StopPreview,
    Effect::ClearRegistrations,
    Effect::BindSurface,
    Effect::Configure,
];
const START: &[Effect] = &[Effect::StartPreview];
const STOP: &[Effect] = &[Effect::StopPreview, Effect::ClearRegistrations];
const FRAME: &[Effect] = &[Effect::RegisterFrame];
const PICTURE: &[Effect] = &[Effect::TriggerPicture];
const RESUME: &[Effect] = &[Effect::ResumePreview];
const CLOSE_IDLE: &[Effect] = &[Effect::ClearRegistrations, Effect::Release];
const CLOSE_LIVE: &[Effect] = &[
    Effect::StopPreview,
    Effect::ClearRegistrations,
    Effect::Release,
];

/// Look up what `operation` does in `state`. `None` means it is a no-op.
pub fn transition(state: ResourceState, operation: Operation) -> Option<Transition> {
    use self::{Operation as Op, ResourceState as S};

    let (via, to, effects) = match (state, operation) {
        (S::Closed, Op::Open | Op::Reconfigure) => (Some(S::Opening), S::Idle, OPEN),
        (S::Idle, Op::Reconfigure) => (None, S::Idle, RECONFIGURE),
        (S::Previewing, Op::Reconfigure) => (None, S::Idle, RECONFIGURE_LIVE),
        (S::Idle, Op::StartPreview) => (None, S::Previewing, START),
        (S::Previewing, Op::StopPreview) => (None, S::Idle, STOP),
        (S::Previewing, Op::RequestFrame) => (None, S::Previewing, FRAME),
        (S::Previewing, Op::RequestPicture) => (None, S::Previewing, PICTURE),
        (S::Previewing, Op::PictureTaken) => (None, S::Previewing, RESUME),
        (S::Idle, Op::Close) => (None, S::Closed, CLOSE_IDLE),
        (S::Previewing, Op::Close) => (None, S::Closed, CLOSE_LIVE),
        _ => return None,
    };

    Some(Transition {
        from: state,
        via,
        to,
        effects,
    })
}

/// Whether a state holds a device handle.
pub fn holds_handle(state: ResourceState) -> bool {
    !matches!(state, ResourceState::Closed)
}
