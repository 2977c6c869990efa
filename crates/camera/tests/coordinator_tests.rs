use {
    camera::{
        CaptureError, CaptureKind, CaptureRequester, Frame, FrameSink, ProcessingCoordinator, Tag,
    },
    std::{
        sync::{Arc, Mutex, mpsc},
        thread,
        time::{Duration, Instant},
    },
};

/// How the fake owner answers a request.
#[derive(Clone, Copy)]
enum Reply {
    /// Deliver before `request` returns, so delivery outruns the wait.
    Inline,
    /// Deliver from another thread after a delay.
    After(Duration),
    Never,
    Fail,
}

struct FakeRequester {
    reply: Reply,
    requests: Mutex<Vec<(CaptureKind, Tag)>>,
}

impl FakeRequester {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }
}

fn frame_for(kind: CaptureKind, tag: Tag) -> Frame {
    Frame::new(kind, vec![tag.0 as u8, 0xFF], 4, 3, tag)
}

impl CaptureRequester for FakeRequester {
    fn request(
        &self,
        kind: CaptureKind,
        destination: Arc<dyn FrameSink>,
        tag: Tag,
    ) -> Result<(), CaptureError> {
        self.requests.lock().unwrap().push((kind, tag));
        match self.reply {
            Reply::Inline => destination.deliver(frame_for(kind, tag)),
            Reply::After(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    destination.deliver(frame_for(kind, tag));
                });
            }
            Reply::Never => {}
            Reply::Fail => return Err(CaptureError::Channel("owner gone".to_string())),
        }
        Ok(())
    }
}

fn coordinator(requester: &Arc<FakeRequester>, timeout: Option<Duration>) -> ProcessingCoordinator {
    ProcessingCoordinator::new(requester.clone(), timeout)
}

#[test]
fn test_request_frame_returns_delivered_frame() {
    let requester = FakeRequester::new(Reply::Inline);
    let coordinator = coordinator(&requester, Some(Duration::from_secs(1)));

    let frame = coordinator.request_frame(CaptureKind::PreviewFrame).unwrap();
    let (kind, tag) = requester.requests.lock().unwrap()[0];
    assert_eq!(kind, CaptureKind::PreviewFrame);
    assert_eq!(frame, frame_for(kind, tag));
    assert!(!coordinator.has_pending());
}

#[test]
fn test_request_frame_waits_for_delayed_delivery() {
    let requester = FakeRequester::new(Reply::After(Duration::from_millis(40)));
    let coordinator = coordinator(&requester, Some(Duration::from_secs(2)));

    let frame = coordinator.request_frame(CaptureKind::Picture).unwrap();
    assert_eq!(frame.kind(), CaptureKind::Picture);
}

#[test]
fn test_each_request_gets_a_fresh_tag() {
    let requester = FakeRequester::new(Reply::Inline);
    let coordinator = coordinator(&requester, Some(Duration::from_secs(1)));

    let first = coordinator.request_frame(CaptureKind::PreviewFrame).unwrap();
    let second = coordinator.request_frame(CaptureKind::PreviewFrame).unwrap();
    assert_ne!(first.tag(), second.tag());
    assert_eq!(requester.requests.lock().unwrap().len(), 2);
}

#[test]
fn test_second_arrival_overwrites_pending_frame() {
    let requester = FakeRequester::new(Reply::Never);
    let coordinator = coordinator(&requester, None);

    coordinator.frame_arrived(frame_for(CaptureKind::PreviewFrame, Tag(1)));
    coordinator.frame_arrived(frame_for(CaptureKind::PreviewFrame, Tag(2)));

    let pending = coordinator.take_pending().unwrap();
    assert_eq!(pending.tag(), Tag(2));
    assert!(coordinator.take_pending().is_none());
}

#[test]
fn test_request_frame_times_out_without_delivery() {
    let requester = FakeRequester::new(Reply::Never);
    let coordinator = coordinator(&requester, Some(Duration::from_millis(50)));

    let start = Instant::now();
    let result = coordinator.request_frame(CaptureKind::PreviewFrame);
    assert!(matches!(result, Err(CaptureError::Timeout(_))));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_late_answer_to_timed_out_request_stays_pending() {
    let requester = FakeRequester::new(Reply::After(Duration::from_millis(80)));
    let coordinator = coordinator(&requester, Some(Duration::from_millis(20)));

    assert!(matches!(
        coordinator.request_frame(CaptureKind::PreviewFrame),
        Err(CaptureError::Timeout(_))
    ));
    thread::sleep(Duration::from_millis(150));
    assert!(coordinator.has_pending());
}

#[test]
fn test_stale_pending_frame_is_skipped() {
    let requester = FakeRequester::new(Reply::After(Duration::from_millis(30)));
    let coordinator = coordinator(&requester, Some(Duration::from_secs(1)));

    coordinator.frame_arrived(frame_for(CaptureKind::PreviewFrame, Tag(99)));
    let frame = coordinator.request_frame(CaptureKind::PreviewFrame).unwrap();
    assert_eq!(frame.tag(), Tag(1));
    assert!(!coordinator.has_pending());
}

#[test]
fn test_requester_error_is_returned() {
    let requester = FakeRequester::new(Reply::Fail);
    let coordinator = coordinator(&requester, None);

    let result = coordinator.request_frame(CaptureKind::PreviewFrame);
    assert!(matches!(result, Err(CaptureError::Channel(_))));
}

#[test]
fn test_cancel_interrupts_blocked_request() {
    let requester = FakeRequester::new(Reply::Never);
    let coordinator = Arc::new(coordinator(&requester, None));
    let (done_tx, done_rx) = mpsc::channel();

    let waiter = {
        let coordinator = coordinator.clone();
        thread::spawn(move || {
            let result = coordinator.request_frame(CaptureKind::PreviewFrame);
            done_tx.send(matches!(result, Err(CaptureError::Cancelled))).unwrap();
        })
    };

    thread::sleep(Duration::from_millis(30));
    assert!(done_rx.try_recv().is_err());
    coordinator.cancel();
    assert!(done_rx.recv_timeout(Duration::from_secs(1)).unwrap());
    waiter.join().unwrap();

    // cancellation is permanent and skips the requester
    assert!(matches!(
        coordinator.request_frame(CaptureKind::PreviewFrame),
        Err(CaptureError::Cancelled)
    ));
    assert_eq!(requester.requests.lock().unwrap().len(), 1);
}
