// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Export: write a played-back timeline to ordinary image files.
//!
//! * one PNG per frame plus `manifest.json` with the delays
//! * the final reference image
//! * an animated GIF

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::Delay;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::player::Player;

pub const MANIFEST_FILE: &str = "manifest.json";

/// One entry of `manifest.json`.
#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub file: String,
    pub delay: u32,
}

/// Write every frame to `out_dir/frame_NNN.png` plus a manifest.
///
/// Returns the number of frames written.
pub fn export_frames(player: &mut Player, out_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(out_dir)?;
    player.rewind();

    let mut manifest = Vec::with_capacity(player.len());
    for frame in player.by_ref() {
        let file = format!("frame_{:03}.png", frame.index);
        frame.image.save(out_dir.join(&file))?;
        debug!(frame = frame.index, file = %file, "Frame exported");
        manifest.push(ManifestEntry { file, delay: frame.delay.as_millis() as u32 });
    }

    let mut out = BufWriter::new(File::create(out_dir.join(MANIFEST_FILE))?);
    serde_json::to_writer_pretty(&mut out, &manifest)?;
    out.flush()?;

    info!(frames = manifest.len(), output = ?out_dir, "Frames exported");
    Ok(manifest.len())
}

/// Write the canvas after the last frame to `path`.
pub fn export_final(player: &mut Player, path: &Path) -> Result<()> {
    let image = player.render_final()?;
    image.save(path)?;
    info!(output = ?path, width = image.width(), height = image.height(), "Final image written");
    Ok(())
}

/// Encode the whole timeline as an animated GIF. `repeat == 0` loops forever.
///
/// Returns the number of frames written.
pub fn export_gif(player: &mut Player, path: &Path, repeat: u16) -> Result<usize> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(if repeat == 0 { Repeat::Infinite } else { Repeat::Finite(repeat) })?;

    player.rewind();
    let mut count = 0;
    for frame in player.by_ref() {
        let delay = Delay::from_numer_denom_ms(frame.delay.as_millis() as u32, 1);
        encoder.encode_frame(image::Frame::from_parts(frame.image, 0, 0, delay))?;
        count += 1;
    }

    info!(frames = count, output = ?path, "GIF written");
    Ok(count)
}
