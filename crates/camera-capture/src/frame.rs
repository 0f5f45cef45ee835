//! Video frame types and processing

use crate::CameraError;
use image::codecs::jpeg::JpegEncoder;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Result<Self, CameraError> {
        let expected = (width as usize) * (height as usize) * 3;
        if data.len() != expected {
            return Err(CameraError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        })
    }

    /// Black frame of the given size
    pub fn blank(width: u32, height: u32, sequence: u32) -> Self {
        Self {
            data: vec![0; (width as usize) * (height as usize) * 3],
            width,
            height,
            timestamp_ns: 0,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Mirror the frame left-to-right in place (selfie view)
    pub fn mirror(&mut self) {
        let row_len = self.width as usize * 3;
        if row_len == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(row_len) {
            let (mut left, mut right) = (0usize, self.width as usize - 1);
            while left < right {
                for c in 0..3 {
                    row.swap(left * 3 + c, right * 3 + c);
                }
                left += 1;
                right -= 1;
            }
        }
    }

    /// Encode the frame as JPEG
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CameraError> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode(
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> VideoFrame {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        VideoFrame::new(data, width, height, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = VideoFrame::new(vec![0; 10], 4, 4, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            CameraError::BufferSize {
                expected: 48,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_mirror_swaps_columns() {
        let mut frame = gradient(3, 2);
        frame.mirror();
        assert_eq!(frame.get_pixel(0, 0), Some([2, 0, 0]));
        assert_eq!(frame.get_pixel(1, 1), Some([1, 1, 0]));
        assert_eq!(frame.get_pixel(2, 1), Some([0, 1, 0]));
    }

    #[test]
    fn test_get_pixel_out_of_bounds() {
        let frame = VideoFrame::blank(2, 2, 0);
        assert_eq!(frame.get_pixel(2, 0), None);
    }

    #[test]
    fn test_encode_jpeg_produces_jfif() {
        let frame = gradient(8, 8);
        let jpeg = frame.encode_jpeg(80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
