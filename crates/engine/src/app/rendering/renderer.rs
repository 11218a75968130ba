use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::SpriteBatch;

const CLEAR_COLOR: [u8; 4] = [18, 20, 26, 255];

/// CPU framebuffer presenter. Owns the `pixels` surface; per-frame drawing
/// happens through a `SpriteBatch` borrowed from `frame_batch`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        for chunk in self.pixels.frame_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
    }

    pub fn frame_batch(&mut self) -> SpriteBatch<'_> {
        let width = self.width;
        let height = self.height;
        SpriteBatch::new(self.pixels.frame_mut(), width, height)
    }

    pub fn present(&mut self) -> Result<(), Error> {
        self.pixels.render()
    }
}
