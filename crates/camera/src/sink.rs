use {
    crate::{CaptureKind, Frame},
    tokio::sync::mpsc,
};

/// Destination of a one-shot capture.
///
/// Called on the owner thread, so implementations must not block.
pub trait FrameSink: Send + Sync {
    fn deliver(&self, frame: Frame);
}

/// Receives finished processing results.
pub trait ResultSink<R>: Send + 'static {
    fn publish(&self, result: R);
}

/// Messages for the UI-facing side of a session.
#[derive(Debug, Clone)]
pub enum SessionEvent<R> {
    PreviewCaptured(Frame),
    PictureReady(Frame),
    ResultReady(R),
}

impl FrameSink for mpsc::UnboundedSender<Frame> {
    fn deliver(&self, frame: Frame) {
        if self.send(frame).is_err() {
            log::debug!("frame receiver closed, dropping frame");
        }
    }
}

impl<R: Send + 'static> FrameSink for mpsc::UnboundedSender<SessionEvent<R>> {
    fn deliver(&self, frame: Frame) {
        let event = match frame.kind() {
            CaptureKind::PreviewFrame => SessionEvent::PreviewCaptured(frame),
            CaptureKind::Picture => SessionEvent::PictureReady(frame),
        };
        if self.send(event).is_err() {
            log::debug!("session receiver closed, dropping frame");
        }
    }
}

impl<R: Send + 'static> ResultSink<R> for mpsc::UnboundedSender<SessionEvent<R>> {
    fn publish(&self, result: R) {
        if self.send(SessionEvent::ResultReady(result)).is_err() {
            log::debug!("session receiver closed, dropping result");
        }
    }
}
