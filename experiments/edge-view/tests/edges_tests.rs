use {
    base::Vec2,
    camera::{CaptureKind, Frame, FrameProcessor, Tag},
    edge_view::{EdgeDetector, blur, encode_png, gradient},
};

/// Dark left half, bright right half.
fn step(size: Vec2<usize>) -> Vec<u8> {
    (0..size.area())
        .map(|i| if i % size.x >= size.x / 2 { 200 } else { 10 })
        .collect()
}

#[test]
fn test_flat_image_has_no_edges() {
    let size = Vec2::new(8, 8);
    let edges = EdgeDetector::default().detect(&vec![128; size.area()], size);
    assert_eq!(edges.size, size);
    assert_eq!(edges.edge_count(), 0);
}

#[test]
fn test_vertical_step_is_found() {
    let size = Vec2::new(10, 6);
    let edges = EdgeDetector::new(64, false).detect(&step(size), size);

    for y in 1..5 {
        assert_eq!(edges.data[y * 10 + 4], 255, "row {y}");
        assert_eq!(edges.data[y * 10 + 5], 255, "row {y}");
        assert_eq!(edges.data[y * 10 + 1], 0, "row {y}");
        assert_eq!(edges.data[y * 10 + 8], 0, "row {y}");
    }
}

#[test]
fn test_gradient_border_is_zero() {
    let size = Vec2::new(6, 4);
    let magnitude = gradient(&step(size), size);
    assert!(magnitude[..6].iter().all(|m| *m == 0));
    assert!(magnitude[18..].iter().all(|m| *m == 0));
}

#[test]
fn test_blur_keeps_flat_regions() {
    let size = Vec2::new(5, 5);
    let flat = vec![90; 25];
    assert_eq!(blur(&flat, size), flat);
}

#[test]
fn test_chroma_bytes_are_ignored() {
    let size = Vec2::new(10, 6);
    let mut bytes = step(size);
    bytes.extend(std::iter::repeat_n(255, size.area() / 2));

    let mut detector = EdgeDetector::new(64, false);
    let frame = Frame::new(CaptureKind::PreviewFrame, bytes, 10, 6, Tag(1));
    let from_frame = detector.process(&frame);
    assert_eq!(from_frame, detector.detect(&step(size), size));
}

#[test]
fn test_short_frame_gives_blank_map() {
    let size = Vec2::new(4, 4);
    let edges = EdgeDetector::default().detect(&[1, 2, 3], size);
    assert_eq!(edges.data, vec![0; 16]);
}

#[test]
fn test_encode_png_signature() {
    let png = encode_png(Vec2::new(4, 2), &[0, 255, 0, 255, 255, 0, 255, 0]).unwrap();
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
}
