use {
    base::Vec2,
    camera::{Frame, FrameProcessor},
    crates_image::ImageEncoder,
};

/// Binary edge image: 255 on an edge, 0 elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
}

impl EdgeMap {
    pub fn blank(size: Vec2<usize>) -> Self {
        Self {
            size,
            data: vec![0; size.area()],
        }
    }

    pub fn edge_count(&self) -> usize {
        self.data.iter().filter(|v| **v != 0).count()
    }
}

/// 3x3 box blur, borders copied through.
pub fn blur(luma: &[u8], size: Vec2<usize>) -> Vec<u8> {
    let (w, h) = (size.x, size.y);
    let mut out = luma.to_vec();
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let mut sum = 0u32;
            for dy in 0..3 {
                for dx in 0..3 {
                    sum += luma[(y + dy - 1) * w + x + dx - 1] as u32;
                }
            }
            out[y * w + x] = (sum / 9) as u8;
        }
    }
    out
}

/// Sobel gradient magnitude, clamped to 0..=255. The one pixel border is 0.
pub fn gradient(luma: &[u8], size: Vec2<usize>) -> Vec<u8> {
    let (w, h) = (size.x, size.y);
    let mut out = vec![0u8; w * h];
    let at = |x: usize, y: usize| luma[y * w + x] as i32;
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let gx = at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x, y - 1)
                - at(x + 1, y - 1);
            let magnitude = ((gx * gx + gy * gy) as f64).sqrt();
            out[y * w + x] = magnitude.min(255.0) as u8;
        }
    }
    out
}

/// Finds edges in the luma plane of a frame.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    threshold: u8,
    smooth: bool,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self {
            threshold: 64,
            smooth: true,
        }
    }
}

impl EdgeDetector {
    pub fn new(threshold: u8, smooth: bool) -> Self {
        Self { threshold, smooth }
    }

    /// Detect edges in `luma`, a `size.x * size.y` plane. Extra bytes (chroma) are ignored.
    pub fn detect(&self, luma: &[u8], size: Vec2<usize>) -> EdgeMap {
        let Some(plane) = luma.get(..size.area()) else {
            log::warn!(
                "frame too short for {}: {} bytes, expected {}",
                size,
                luma.len(),
                size.area()
            );
            return EdgeMap::blank(size);
        };
        let smoothed;
        let plane = if self.smooth {
            smoothed = blur(plane, size);
            &smoothed[..]
        } else {
            plane
        };
        let data = gradient(plane, size)
            .into_iter()
            .map(|m| if m >= self.threshold { 255 } else { 0 })
            .collect();
        EdgeMap { size, data }
    }
}

impl FrameProcessor for EdgeDetector {
    type Output = EdgeMap;

    fn process(&mut self, frame: &Frame) -> EdgeMap {
        self.detect(frame.bytes(), Vec2::new(frame.width(), frame.height()))
    }
}

/// Encode an 8-bit grayscale plane as PNG.
pub fn encode_png(size: Vec2<usize>, luma: &[u8]) -> Result<Vec<u8>, crates_image::ImageError> {
    let mut buffer = Vec::new();
    let encoder = crates_image::codecs::png::PngEncoder::new(&mut buffer);
    encoder.write_image(
        luma,
        size.x as u32,
        size.y as u32,
        crates_image::ExtendedColorType::L8,
    )?;
    Ok(buffer)
}
