use std::sync::Arc;

use crate::app::SizeF;

/// A decoded RGBA8 image. Cloning shares the pixel buffer, so textures can
/// be stored in components and passed between scenes freely.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Texture {
    /// Wraps a tightly packed RGBA8 buffer. The buffer length must be
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> SizeF {
        SizeF::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the texel at (x, y); `None` outside the image.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let texel = &self.pixels[offset..offset + 4];
        Some([texel[0], texel[1], texel[2], texel[3]])
    }
}
