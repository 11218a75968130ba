use tracing::warn;

use crate::app::math::{RectF, Transform2, Vec2};
use crate::content::Texture;

use super::glyphs::{glyph_for, GLYPH_HEIGHT, GLYPH_WIDTH};

const TEXT_SCALE: i32 = 2;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;

/// A scoped draw pass over one RGBA frame. `begin`/`end` bracket the pass
/// and must not be nested; sprite draws between them go through the active
/// world-to-screen transform, text draws bypass it (HUD space).
pub struct SpriteBatch<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    transform: Transform2,
    open: bool,
}

impl<'a> SpriteBatch<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            transform: Transform2::IDENTITY,
            open: false,
        }
    }

    pub fn begin(&mut self, transform: Option<Transform2>) {
        if self.open {
            warn!("sprite batch begin while a pass is already open; call ignored");
            return;
        }
        self.transform = transform.unwrap_or(Transform2::IDENTITY);
        self.open = true;
    }

    pub fn end(&mut self) {
        if !self.open {
            warn!("sprite batch end without a matching begin");
            return;
        }
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Blits `source` (or the full texture) with its top-left corner at the
    /// world-space `position`, scaled by the active transform. Nearest
    /// neighbor sampling; zero-alpha texels are skipped.
    pub fn draw_texture(&mut self, texture: &Texture, position: Vec2, source: Option<RectF>) {
        if !self.open {
            warn!("sprite batch draw outside a begin/end pass; draw ignored");
            return;
        }
        let source = source.unwrap_or_else(|| {
            RectF::new(0.0, 0.0, texture.width() as f32, texture.height() as f32)
        });
        if source.width <= 0.0 || source.height <= 0.0 {
            return;
        }

        let scale = self.transform.scale;
        let top_left = self.transform.apply(position);
        let dest_width = (source.width * scale).round().max(1.0) as i32;
        let dest_height = (source.height * scale).round().max(1.0) as i32;
        let left = top_left.x.round() as i32;
        let top = top_left.y.round() as i32;

        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = (left + dest_width).min(self.width as i32);
        let draw_bottom = (top + dest_height).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let inv_scale = source.width / dest_width as f32;
        let inv_scale_y = source.height / dest_height as f32;
        for out_y in draw_top..draw_bottom {
            let src_y = source.y + (out_y - top) as f32 * inv_scale_y;
            let src_y = src_y.floor().max(0.0) as u32;
            for out_x in draw_left..draw_right {
                let src_x = source.x + (out_x - left) as f32 * inv_scale;
                let src_x = src_x.floor().max(0.0) as u32;
                let Some(texel) = texture.texel(src_x, src_y) else {
                    continue;
                };
                if texel[3] == 0 {
                    continue;
                }
                write_pixel_rgba(self.frame, self.width, out_x, out_y, texel);
            }
        }
    }

    /// Draws text at a screen-space position with the 3x5 glyph font,
    /// ignoring the active transform.
    pub fn draw_text(&mut self, text: &str, screen_position: Vec2, color: [u8; 4]) {
        if !self.open {
            warn!("sprite batch draw outside a begin/end pass; draw ignored");
            return;
        }
        let mut x = screen_position.x.round() as i32;
        let y = screen_position.y.round() as i32;
        for ch in text.chars() {
            let glyph = glyph_for(ch);
            for (row_index, row_bits) in glyph.rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                        continue;
                    }
                    for sy in 0..TEXT_SCALE {
                        for sx in 0..TEXT_SCALE {
                            write_pixel_rgba(
                                self.frame,
                                self.width,
                                x + col * TEXT_SCALE + sx,
                                y + row_index as i32 * TEXT_SCALE + sy,
                                color,
                            );
                        }
                    }
                }
            }
            x += GLYPH_ADVANCE;
        }
    }

    pub fn text_line_height() -> i32 {
        (GLYPH_HEIGHT + 2) * TEXT_SCALE
    }

    pub fn text_width(text: &str) -> i32 {
        text.chars().count() as i32 * GLYPH_ADVANCE
    }
}

fn write_pixel_rgba(frame: &mut [u8], width: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= width as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(slot) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    slot.copy_from_slice(&color);
}
