// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Timeline model: an ordered list of frames, each a delay plus blits.
//!
//! ## Wire format
//!
//! ```text
//! name_timeline = [
//!   {"delay": 1000, "blit": [[sx, sy, w, h, dx, dy], ...]},
//!   ...
//! ]
//! ```
//!
//! Every blit copies the `w × h` region at `(sx, sy)` of the sprite sheet to
//! `(dx, dy)` on the canvas. The first blit of frame 0 targets the origin and
//! its size is the canvas size.

pub mod script;
pub mod validate;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnimError, Result};

pub use script::Script;

/// One rectangular copy from the sprite sheet onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 6]", into = "[u32; 6]")]
pub struct Blit {
    pub sx: u32,
    pub sy: u32,
    pub w: u32,
    pub h: u32,
    pub dx: u32,
    pub dy: u32,
}

impl Blit {
    pub const fn new(sx: u32, sy: u32, w: u32, h: u32, dx: u32, dy: u32) -> Self {
        Self { sx, sy, w, h, dx, dy }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl From<[u32; 6]> for Blit {
    fn from([sx, sy, w, h, dx, dy]: [u32; 6]) -> Self {
        Self { sx, sy, w, h, dx, dy }
    }
}

impl From<Blit> for [u32; 6] {
    fn from(b: Blit) -> Self {
        [b.sx, b.sy, b.w, b.h, b.dx, b.dy]
    }
}

/// A single animation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Display time in milliseconds after this frame has been applied.
    pub delay: u32,
    /// Blits applied in order; later blits overwrite earlier ones.
    pub blit: Vec<Blit>,
}

impl Frame {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay as u64)
    }

    /// Sum of the areas of all blits in this frame.
    pub fn blitted_area(&self) -> u64 {
        self.blit.iter().map(Blit::area).sum()
    }
}

/// Ordered frame sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub frames: Vec<Frame>,
}

/// Summary figures for `blitanim info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStats {
    pub frames: usize,
    pub blits: usize,
    pub canvas: Option<(u32, u32)>,
    pub total_duration: Duration,
    pub max_frame_area: u64,
    /// Smallest sprite sheet (width, height) that covers every source rect.
    pub sprite_extent: (u64, u64),
}

impl Timeline {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Parse a bare JSON array or a `name = [...]` script.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(script::parse(text)?.timeline)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render as `var = [...]`, the form documentation pages load.
    pub fn to_script(&self, variable: &str) -> Result<String> {
        script::write(self, variable)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Canvas size as defined by the first blit of frame 0.
    pub fn canvas_size(&self) -> Result<(u32, u32)> {
        let first = self.frames.first().ok_or(AnimError::EmptyTimeline)?;
        match first.blit.first() {
            Some(b) if b.dx == 0 && b.dy == 0 && !b.is_empty() => Ok((b.w, b.h)),
            _ => Err(AnimError::NoCanvas),
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(Frame::delay).sum()
    }

    pub fn stats(&self) -> TimelineStats {
        let blits = self.frames.iter().flat_map(|f| f.blit.iter());
        let sprite_extent = blits.fold((0u64, 0u64), |(w, h), b| {
            (w.max(b.sx as u64 + b.w as u64), h.max(b.sy as u64 + b.h as u64))
        });
        TimelineStats {
            frames: self.frames.len(),
            blits: self.frames.iter().map(|f| f.blit.len()).sum(),
            canvas: self.canvas_size().ok(),
            total_duration: self.total_duration(),
            max_frame_area: self.frames.iter().map(Frame::blitted_area).max().unwrap_or(0),
            sprite_extent,
        }
    }
}
