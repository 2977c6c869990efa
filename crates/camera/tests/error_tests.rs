use {
    camera::{CaptureError, CaptureKind},
    std::{io, time::Duration},
};

#[test]
fn test_from_io_error() {
    let io_err = io::Error::new(io::ErrorKind::Other, "thread spawn failed");
    let err: CaptureError = io_err.into();

    match err {
        CaptureError::Device(msg) => assert!(msg.contains("thread spawn failed")),
        _ => panic!("Expected CaptureError::Device variant"),
    }
}

#[test]
fn test_error_display() {
    let err = CaptureError::DeviceUnavailable("camera 3".to_string());
    assert!(err.to_string().contains("camera 3"));

    let err = CaptureError::StaleCallback(CaptureKind::Picture);
    assert!(err.to_string().contains("picture"));

    let err = CaptureError::Timeout(Duration::from_millis(500));
    assert!(err.to_string().contains("500ms"));

    assert_eq!(CaptureError::InvalidSurface.to_string(), "invalid surface");
    assert_eq!(CaptureError::Cancelled.to_string(), "cancelled");
}

#[test]
fn test_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(CaptureError::Channel("closed".to_string()));
    assert!(err.to_string().contains("closed"));
}
