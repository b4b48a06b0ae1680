use image::imageops::FilterType;

use crate::error::LivenessError;

/// Longest side, in pixels, a decoded frame is downsized to by default.
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 2048;

/// A single captured image as interleaved 8-bit RGB, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    rgb: Vec<u8>,
}

impl Frame {
    /// Wraps an interleaved RGB buffer of `width * height * 3` bytes.
    pub fn new(width: usize, height: usize, rgb: Vec<u8>) -> Result<Self, LivenessError> {
        let want = width * height * 3;
        if rgb.len() != want {
            return Err(LivenessError::BufferSize {
                width,
                height,
                got: rgb.len(),
                want,
            });
        }
        Ok(Self { width, height, rgb })
    }

    /// Decodes an encoded image (PNG, JPEG) and downsizes it so that its
    /// longest side is at most `max_size`, keeping the aspect ratio.
    /// A `max_size` of 0 disables downsizing.
    pub fn decode(bytes: &[u8], max_size: usize) -> Result<Self, LivenessError> {
        let mut img = image::load_from_memory(bytes)?;

        let (w, h) = (img.width() as usize, img.height() as usize);
        let longest = w.max(h);
        if max_size > 0 && longest > max_size {
            let scale = max_size as f64 / longest as f64;
            let nw = ((w as f64 * scale) as u32).max(1);
            let nh = ((h as f64 * scale) as u32).max(1);
            tracing::debug!(from_w = w, from_h = h, to_w = nw, to_h = nh, "downsizing frame");
            img = img.resize_exact(nw, nh, FilterType::Triangle);
        }

        let rgb = img.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        Self::new(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved RGB bytes.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// True if the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Luma plane using the ITU-R BT.601 weights, rounded to 8 bits.
    pub fn grayscale(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .map(|px| {
                let y = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}
