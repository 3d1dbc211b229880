// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Frame-by-frame replay of a timeline over its sprite sheet.
//!
//! Frames are deltas: each one only blits what changed. Producing frame `n`
//! therefore means applying frames `0..=n` in order onto the same canvas.

use std::path::Path;
use std::time::Duration;

use image::RgbaImage;
use tracing::debug;

use crate::canvas::{self, Canvas};
use crate::error::{AnimError, Result};
use crate::timeline::{script, Timeline};

/// Canvas snapshot after a frame was applied.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub index: usize,
    pub delay: Duration,
    pub image: RgbaImage,
}

/// Validated timeline + sprite sheet, with the canvas being drawn on.
pub struct Player {
    timeline: Timeline,
    sprite: RgbaImage,
    canvas: Canvas,
    next: usize,
}

impl Player {
    /// Validate `timeline` against `sprite` and allocate the canvas.
    pub fn new(timeline: Timeline, sprite: RgbaImage) -> Result<Self> {
        let (w, h) = timeline.validate(sprite.width(), sprite.height())?;
        debug!(frames = timeline.len(), width = w, height = h, "Player ready");
        Ok(Self { timeline, sprite, canvas: Canvas::new(w, h), next: 0 })
    }

    /// Load a timeline script and its sprite sheet from disk.
    pub fn open(timeline_path: &Path, sprite_path: &Path) -> Result<Self> {
        let script = script::load(timeline_path)?;
        let sprite = canvas::load_sprite(sprite_path)?;
        Self::new(script.timeline, sprite)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn sprite(&self) -> &RgbaImage {
        &self.sprite
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Index of the frame the iterator yields next.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Clear the canvas and restart from frame 0.
    pub fn rewind(&mut self) {
        self.canvas.clear();
        self.next = 0;
    }

    /// Replay frames `0..=index` and return the resulting canvas.
    /// Iteration continues from `index + 1`.
    pub fn render_until(&mut self, index: usize) -> Result<RgbaImage> {
        if index >= self.timeline.len() {
            return Err(AnimError::Playback(format!(
                "frame {index} out of range (timeline has {} frames)",
                self.timeline.len()
            )));
        }
        self.rewind();
        for frame in &self.timeline.frames[..=index] {
            self.canvas.apply(&self.sprite, frame);
        }
        self.next = index + 1;
        Ok(self.canvas.image().clone())
    }

    /// The reference image: the canvas after every frame has been applied.
    pub fn render_final(&mut self) -> Result<RgbaImage> {
        let last = self.timeline.len().checked_sub(1).ok_or(AnimError::EmptyTimeline)?;
        self.render_until(last)
    }
}

impl Iterator for Player {
    type Item = RenderedFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.timeline.frames.get(self.next)?;
        self.canvas.apply(&self.sprite, frame);

        let rendered = RenderedFrame {
            index: self.next,
            delay: frame.delay(),
            image: self.canvas.image().clone(),
        };
        self.next += 1;
        Some(rendered)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.timeline.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
