//! Bounds checks of a timeline against its sprite sheet.

use tracing::warn;

use crate::error::{AnimError, Result};
use crate::timeline::{Blit, Timeline};

impl Timeline {
    /// Check that every blit reads inside a `sprite_w × sprite_h` sheet and
    /// writes inside the canvas. Returns the canvas size.
    ///
    /// Zero-sized blits are accepted. Frames whose blits cover more than the
    /// canvas (overlaps) are legal and only logged.
    pub fn validate(&self, sprite_w: u32, sprite_h: u32) -> Result<(u32, u32)> {
        let (canvas_w, canvas_h) = self.canvas_size()?;
        let canvas_area = canvas_w as u64 * canvas_h as u64;

        for (fi, frame) in self.frames.iter().enumerate() {
            for (bi, blit) in frame.blit.iter().enumerate() {
                check_blit(blit, sprite_w, sprite_h, canvas_w, canvas_h).map_err(|reason| {
                    AnimError::InvalidBlit { frame: fi, blit: bi, reason }
                })?;
            }

            let area = frame.blitted_area();
            if area > canvas_area {
                warn!(frame = fi, area, canvas_area, "Frame blits more pixels than the canvas holds");
            }
        }

        Ok((canvas_w, canvas_h))
    }
}

fn check_blit(
    b: &Blit,
    sprite_w: u32,
    sprite_h: u32,
    canvas_w: u32,
    canvas_h: u32,
) -> std::result::Result<(), String> {
    if b.is_empty() {
        return Ok(());
    }
    if !fits(b.sx, b.w, sprite_w) || !fits(b.sy, b.h, sprite_h) {
        return Err(format!(
            "source {}x{}+{}+{} outside sprite sheet {sprite_w}x{sprite_h}",
            b.w, b.h, b.sx, b.sy
        ));
    }
    if !fits(b.dx, b.w, canvas_w) || !fits(b.dy, b.h, canvas_h) {
        return Err(format!(
            "destination {}x{}+{}+{} outside canvas {canvas_w}x{canvas_h}",
            b.w, b.h, b.dx, b.dy
        ));
    }
    Ok(())
}

fn fits(origin: u32, len: u32, bound: u32) -> bool {
    origin as u64 + len as u64 <= bound as u64
}
