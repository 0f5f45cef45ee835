//! Frame acquisition

use crate::{CameraError, VideoFrame};

/// Source of decoded frames, one at a time
///
/// `Err(CameraError::Exhausted)` ends the stream; any other error is a
/// single failed read.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError> {
        (**self).next_frame()
    }
}
