//! RGBA canvas that frames are composited onto.
//!
//! Blits overwrite: source pixels, alpha included, replace the destination.
//! Nothing is blended.

use std::path::Path;

use image::RgbaImage;

use crate::error::Result;
use crate::timeline::{Blit, Frame};

const BYTES_PER_PIXEL: usize = 4;

/// Load a sprite sheet from any supported image file.
pub fn load_sprite(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn clear(&mut self) {
        self.image.fill(0);
    }

    /// Copy one region of `sprite` onto the canvas.
    ///
    /// The region is clipped to both images, so unvalidated blits never
    /// panic; they just draw less.
    pub fn blit(&mut self, sprite: &RgbaImage, b: &Blit) {
        let w = b
            .w
            .min(sprite.width().saturating_sub(b.sx))
            .min(self.width().saturating_sub(b.dx)) as usize;
        let h = b
            .h
            .min(sprite.height().saturating_sub(b.sy))
            .min(self.height().saturating_sub(b.dy)) as usize;
        if w == 0 || h == 0 {
            return;
        }

        let src_stride = sprite.width() as usize * BYTES_PER_PIXEL;
        let dst_stride = self.width() as usize * BYTES_PER_PIXEL;
        let row_bytes = w * BYTES_PER_PIXEL;
        let src: &[u8] = sprite;
        let dst: &mut [u8] = &mut self.image;

        for row in 0..h {
            let s = (b.sy as usize + row) * src_stride + b.sx as usize * BYTES_PER_PIXEL;
            let d = (b.dy as usize + row) * dst_stride + b.dx as usize * BYTES_PER_PIXEL;
            dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
        }
    }

    /// Apply every blit of `frame` in order.
    pub fn apply(&mut self, sprite: &RgbaImage, frame: &Frame) {
        for b in &frame.blit {
            self.blit(sprite, b);
        }
    }
}
