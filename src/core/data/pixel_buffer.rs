use std::error::Error;
use std::fmt;

use crate::core::data::colour::Colour;

const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum PixelBufferError {
    PixelOutsideBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for PixelBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelOutsideBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "pixel ({}, {}) outside of {}x{} buffer",
                    x, y, width, height
                )
            }
            Self::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "buffer size {} does not match expected size {}",
                    actual, expected
                )
            }
        }
    }
}

impl Error for PixelBufferError {}

/// RGB byte buffer for one rendered frame, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let total_bytes = width as usize * height as usize * BYTES_PER_PIXEL;

        Self {
            width,
            height,
            buffer: vec![0; total_bytes],
        }
    }

    pub fn from_data(width: u32, height: u32, buffer: Vec<u8>) -> Result<Self, PixelBufferError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if buffer.len() != expected {
            return Err(PixelBufferError::SizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) -> Result<(), PixelBufferError> {
        if x >= self.width || y >= self.height {
            return Err(PixelBufferError::PixelOutsideBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let index = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.buffer[index] = colour.r;
        self.buffer[index + 1] = colour.g;
        self.buffer[index + 2] = colour.b;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_zeroed_buffer() {
        let buffer = PixelBuffer::new(10, 10);

        assert_eq!(buffer.buffer().len(), 300); // 10 * 10 * 3
        assert!(buffer.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_data_valid() {
        let data: Vec<u8> = vec![
            255, 0, 0, // (0,0) red
            0, 255, 0, // (1,0) green
            0, 0, 255, // (0,1) blue
            255, 255, 0, // (1,1) yellow
        ];

        let buffer = PixelBuffer::from_data(2, 2, data.clone()).unwrap();
        assert_eq!(buffer.buffer(), &data[..]);
    }

    #[test]
    fn test_from_data_wrong_size() {
        let result = PixelBuffer::from_data(2, 2, vec![255, 0, 0]);

        assert_eq!(
            result.unwrap_err(),
            PixelBufferError::SizeMismatch {
                expected: 12,
                actual: 3
            }
        );
    }

    #[test]
    fn test_set_pixel_writes_rgb_triple() {
        let mut buffer = PixelBuffer::new(3, 3);
        buffer
            .set_pixel(1, 1, Colour { r: 255, g: 10, b: 20 })
            .unwrap();

        assert_eq!(buffer.buffer()[12], 255);
        assert_eq!(buffer.buffer()[13], 10);
        assert_eq!(buffer.buffer()[14], 20);
    }

    #[test]
    fn test_set_pixel_corners() {
        let mut buffer = PixelBuffer::new(3, 3);
        buffer.set_pixel(0, 0, Colour { r: 1, g: 2, b: 3 }).unwrap();
        buffer.set_pixel(2, 2, Colour { r: 7, g: 8, b: 9 }).unwrap();

        assert_eq!(&buffer.buffer()[0..3], &[1, 2, 3]);
        assert_eq!(&buffer.buffer()[24..27], &[7, 8, 9]);
    }

    #[test]
    fn test_set_pixel_outside_bounds() {
        let mut buffer = PixelBuffer::new(3, 3);
        let result = buffer.set_pixel(3, 1, Colour::BLACK);

        assert_eq!(
            result.unwrap_err(),
            PixelBufferError::PixelOutsideBounds {
                x: 3,
                y: 1,
                width: 3,
                height: 3
            }
        );
    }
}
