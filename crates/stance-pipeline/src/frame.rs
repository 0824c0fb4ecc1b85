use std::time::Instant;

/// An opaque captured video frame.
///
/// The pipeline never inspects the pixels itself; they are handed to the
/// estimator unchanged.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Pixel data in whatever layout the estimator expects
    pub data: Vec<u8>,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
            captured_at: Instant::now(),
        }
    }

    /// Frame with no pixel data, for sources that drive synthetic estimators
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, Vec::new())
    }
}
