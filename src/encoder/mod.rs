// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Encoder: turns a sequence of full screenshots into a sprite sheet plus a
//! blit timeline.
//!
//! ```text
//! frame 0 ─────────────────────────────► full-canvas blit, sheet origin
//! frame n ──diff(frame n-1)──► regions ─┬─ same pixels as frame 0 there ─► reuse frame-0 area
//!                                       ├─ seen before                   ─► reuse that slot
//!                                       └─ new                           ─► shelf-packed slot
//! ```
//!
//! Sheet layout: frame 0 occupies the top `width × height` block, new regions
//! follow on shelves below it, tallest first.

pub mod diff;
pub mod packer;

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use tracing::{debug, info};

use crate::canvas;
use crate::config::EncoderConfig;
use crate::error::{AnimError, Result};
use crate::timeline::{Blit, Frame, Timeline};

use self::diff::Rect;
use self::packer::ShelfPacker;

#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Unchanged gaps up to this many pixels are merged into one region.
    pub max_gap: u32,
    /// Append a frame that restores frame 0.
    pub loop_reset: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self { max_gap: 4, loop_reset: false }
    }
}

impl From<&EncoderConfig> for EncoderOptions {
    fn from(cfg: &EncoderConfig) -> Self {
        Self { max_gap: cfg.max_gap, loop_reset: cfg.loop_reset }
    }
}

/// One input screenshot and how long to show it.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub image: RgbaImage,
    pub delay: u32,
}

/// Encoder output.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub sprite: RgbaImage,
    pub timeline: Timeline,
}

/// Deduplication key: region size plus raw RGBA bytes.
#[derive(PartialEq, Eq, Hash)]
struct RegionKey {
    w: u32,
    h: u32,
    pixels: Vec<u8>,
}

/// A blit whose sheet position is only known after packing.
struct Patch {
    frame: usize,
    blit: usize,
    region: usize,
}

pub fn encode(frames: &[SourceFrame], options: &EncoderOptions) -> Result<Encoded> {
    let first = frames
        .first()
        .ok_or_else(|| AnimError::Encode("no input frames".into()))?;
    let (width, height) = first.image.dimensions();
    if width == 0 || height == 0 {
        return Err(AnimError::Encode("frames must not be empty images".into()));
    }
    for (i, f) in frames.iter().enumerate() {
        if f.image.dimensions() != (width, height) {
            return Err(AnimError::Encode(format!(
                "frame {i} is {}x{}, expected {width}x{height}",
                f.image.width(),
                f.image.height()
            )));
        }
    }

    let mut out = vec![Frame { delay: first.delay, blit: vec![Blit::new(0, 0, width, height, 0, 0)] }];
    let mut pending: Vec<RgbaImage> = Vec::new();
    let mut by_content: HashMap<RegionKey, usize> = HashMap::new();
    let mut patches = Vec::new();
    let mut reused = 0usize;

    for (n, pair) in frames.windows(2).enumerate() {
        let frame_idx = n + 1;
        let cur = &pair[1].image;
        let mut blits = Vec::new();

        for rect in diff::changed_regions(&pair[0].image, cur, options.max_gap) {
            if same_pixels(&first.image, cur, rect) {
                blits.push(Blit::new(rect.x, rect.y, rect.w, rect.h, rect.x, rect.y));
                reused += 1;
                continue;
            }

            let region = imageops::crop_imm(cur, rect.x, rect.y, rect.w, rect.h).to_image();
            let key = RegionKey { w: rect.w, h: rect.h, pixels: region.as_raw().clone() };
            let region_idx = match by_content.entry(key) {
                Entry::Occupied(e) => {
                    reused += 1;
                    *e.get()
                }
                Entry::Vacant(e) => {
                    pending.push(region);
                    *e.insert(pending.len() - 1)
                }
            };

            patches.push(Patch { frame: frame_idx, blit: blits.len(), region: region_idx });
            blits.push(Blit::new(0, 0, rect.w, rect.h, rect.x, rect.y));
        }

        debug!(frame = frame_idx, regions = blits.len(), "Frame diffed");
        out.push(Frame { delay: pair[1].delay, blit: blits });
    }

    if options.loop_reset && frames.len() > 1 {
        let last = &frames[frames.len() - 1].image;
        let blit = diff::changed_regions(last, &first.image, options.max_gap)
            .into_iter()
            .map(|r| Blit::new(r.x, r.y, r.w, r.h, r.x, r.y))
            .collect();
        out.push(Frame { delay: first.delay, blit });
    }

    let mut packer = ShelfPacker::new(width);
    packer.place(width, height);
    let mut order: Vec<usize> = (0..pending.len()).collect();
    order.sort_by_key(|&i| Reverse((pending[i].height(), pending[i].width())));
    let mut positions = vec![(0u32, 0u32); pending.len()];
    for i in order {
        positions[i] = packer.place(pending[i].width(), pending[i].height());
    }

    let mut sprite = RgbaImage::new(packer.width(), packer.height());
    imageops::replace(&mut sprite, &first.image, 0, 0);
    for (region, &(x, y)) in pending.iter().zip(&positions) {
        imageops::replace(&mut sprite, region, x as i64, y as i64);
    }

    for p in patches {
        let (x, y) = positions[p.region];
        let blit = &mut out[p.frame].blit[p.blit];
        blit.sx = x;
        blit.sy = y;
    }

    info!(
        frames = out.len(),
        unique_regions = pending.len(),
        reused,
        sheet_width = sprite.width(),
        sheet_height = sprite.height(),
        "Timeline encoded"
    );

    Ok(Encoded { sprite, timeline: Timeline::new(out) })
}

/// Load screenshots from disk, all with the same delay.
pub fn load_frames(paths: &[PathBuf], delay: u32) -> Result<Vec<SourceFrame>> {
    paths
        .iter()
        .map(|p| Ok(SourceFrame { image: canvas::load_sprite(p)?, delay }))
        .collect()
}

/// Write `<name>_packed.png` and `<name>_anim.js` (variable `<name>_timeline`)
/// into `dir`. Returns both paths.
pub fn write_outputs(encoded: &Encoded, dir: &Path, name: &str) -> Result<(PathBuf, PathBuf)> {
    // Build the script first so a bad name leaves nothing behind.
    let script = encoded.timeline.to_script(&format!("{name}_timeline"))?;

    std::fs::create_dir_all(dir)?;
    let sprite_path = dir.join(format!("{name}_packed.png"));
    let script_path = dir.join(format!("{name}_anim.js"));

    encoded.sprite.save(&sprite_path)?;
    std::fs::write(&script_path, script)?;

    info!(sprite = ?sprite_path, script = ?script_path, "Encoder output written");
    Ok((sprite_path, script_path))
}

fn same_pixels(a: &RgbaImage, b: &RgbaImage, rect: Rect) -> bool {
    let stride = a.width() as usize * 4;
    let a: &[u8] = a.as_raw();
    let b: &[u8] = b.as_raw();
    (rect.y as usize..(rect.y + rect.h) as usize).all(|y| {
        let start = y * stride + rect.x as usize * 4;
        let end = start + rect.w as usize * 4;
        a[start..end] == b[start..end]
    })
}
