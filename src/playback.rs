// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Real-time playback: present a frame, hold it for its delay, repeat.
//!
//! ```text
//! Player ──frame──► FrameSink::present ──► sleep(delay / speed)
//!    ▲                                          │
//!    └──── rewind on loop ◄──────────────────────┘
//!                                   shutdown (watch) cancels the sleep
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{AnimError, Result};
use crate::player::{Player, RenderedFrame};

/// Timing options for [`run`].
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Passes over the timeline; 0 loops until shutdown.
    pub loops: u32,
    /// Delays are divided by this factor.
    pub speed: f64,
    /// Floor for the wait between frames.
    pub min_delay: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self { loops: 1, speed: 1.0, min_delay: Duration::ZERO }
    }
}

impl PlaybackOptions {
    fn validate(&self) -> Result<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(AnimError::Playback(format!("invalid speed {}", self.speed)));
        }
        Ok(())
    }

    /// Time to hold a frame with the given nominal delay.
    ///
    /// Saturates at `Duration::MAX` for speeds so small the scaled delay
    /// no longer fits.
    pub fn hold_time(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
            .max(self.min_delay)
    }
}

/// Destination for presented frames.
pub trait FrameSink {
    fn present(&mut self, frame: &RenderedFrame) -> Result<()>;
}

/// Logs one line per frame.
#[derive(Debug, Default)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn present(&mut self, frame: &RenderedFrame) -> Result<()> {
        info!(
            frame = frame.index,
            delay_ms = frame.delay.as_millis() as u64,
            "Frame presented"
        );
        Ok(())
    }
}

/// Rewrites a single PNG file on every frame (live preview).
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for FileSink {
    fn present(&mut self, frame: &RenderedFrame) -> Result<()> {
        // Write then rename so viewers never see a half-written file.
        let tmp = self.path.with_extension("partial.png");
        frame.image.save(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(frame = frame.index, path = ?self.path, "Preview updated");
        Ok(())
    }
}

/// Live position of a running playback.
#[derive(Debug, Clone, Default)]
pub struct PlaybackStatus {
    pub frame: usize,
    pub loops_completed: u32,
    pub running: bool,
}

/// Shared handle for observing playback from another task while [`run`]
/// holds the player.
pub type SharedStatus = Arc<RwLock<PlaybackStatus>>;

/// Outcome of [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames_presented: u64,
    pub loops_completed: u32,
    pub cancelled: bool,
}

/// Play `player` into `sink` until the requested loops are done or
/// `shutdown` turns `true`.
pub async fn run<S: FrameSink>(
    player: &mut Player,
    options: &PlaybackOptions,
    sink: &mut S,
    status: &SharedStatus,
    mut shutdown: watch::Receiver<bool>,
) -> Result<PlaybackSummary> {
    options.validate()?;

    let mut summary = PlaybackSummary::default();
    status.write().running = true;
    info!(
        frames = player.len(),
        loops = options.loops,
        speed = options.speed,
        "Playback started"
    );

    'outer: loop {
        player.rewind();
        while let Some(frame) = player.next() {
            if *shutdown.borrow() {
                summary.cancelled = true;
                break 'outer;
            }

            if let Err(e) = sink.present(&frame) {
                status.write().running = false;
                return Err(e);
            }
            summary.frames_presented += 1;
            status.write().frame = frame.index;

            if wait_or_shutdown(options.hold_time(frame.delay), &mut shutdown).await {
                summary.cancelled = true;
                break 'outer;
            }
        }

        summary.loops_completed += 1;
        status.write().loops_completed = summary.loops_completed;
        if options.loops != 0 && summary.loops_completed >= options.loops {
            break;
        }
    }

    status.write().running = false;
    info!(
        frames = summary.frames_presented,
        loops = summary.loops_completed,
        cancelled = summary.cancelled,
        "Playback finished"
    );
    Ok(summary)
}

/// Sleep for `wait`; returns `true` if shutdown was requested meanwhile.
async fn wait_or_shutdown(wait: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(wait);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) => {
                    if *shutdown.borrow_and_update() {
                        return true;
                    }
                }
                // Sender gone: nobody can cancel any more.
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}
