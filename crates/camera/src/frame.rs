use std::fmt;

/// The two capture kinds a camera can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// The next frame of the continuous low-resolution stream.
    PreviewFrame,
    /// A one-shot full-resolution capture.
    Picture,
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::PreviewFrame => write!(f, "preview frame"),
            CaptureKind::Picture => write!(f, "picture"),
        }
    }
}

/// Opaque identifier that ties a delivered frame to the request that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u64);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw sample data captured by the hardware, tagged with its request.
///
/// Immutable once constructed. Ownership moves from the capture callback to
/// the destination; nothing copies the bytes in transit.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    kind: CaptureKind,
    bytes: Vec<u8>,
    width: usize,
    height: usize,
    tag: Tag,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tag", &self.tag)
            .finish()
    }
}

impl Frame {
    pub fn new(kind: CaptureKind, bytes: Vec<u8>, width: usize, height: usize, tag: Tag) -> Self {
        Self {
            kind,
            bytes,
            width,
            height,
            tag,
        }
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Take the sample data out of the frame.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
