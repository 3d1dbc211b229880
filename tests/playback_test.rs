//! Real-time playback tests: looping, cancellation and sinks.

use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use parking_lot::RwLock;
use tempfile::TempDir;
use tokio::sync::watch;

use blitanim::error::{AnimError, Result};
use blitanim::playback::{self, FileSink, FrameSink, PlaybackOptions, PlaybackStatus, SharedStatus};
use blitanim::player::{Player, RenderedFrame};
use blitanim::timeline::{Blit, Frame, Timeline};

#[derive(Default)]
struct CollectSink {
    indices: Vec<usize>,
}

impl FrameSink for CollectSink {
    fn present(&mut self, frame: &RenderedFrame) -> Result<()> {
        self.indices.push(frame.index);
        Ok(())
    }
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn present(&mut self, _frame: &RenderedFrame) -> Result<()> {
        Err(AnimError::Playback("display gone".into()))
    }
}

fn player(delay: u32) -> Player {
    let sprite = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 60, y as u8 * 60, 0, 255]));
    let timeline = Timeline::new(vec![
        Frame { delay, blit: vec![Blit::new(0, 0, 4, 2, 0, 0)] },
        Frame { delay, blit: vec![Blit::new(0, 2, 4, 1, 0, 0)] },
        Frame { delay, blit: vec![Blit::new(0, 3, 2, 1, 2, 1)] },
    ]);
    Player::new(timeline, sprite).expect("player")
}

fn status() -> SharedStatus {
    Arc::new(RwLock::new(PlaybackStatus::default()))
}

fn options(loops: u32) -> PlaybackOptions {
    PlaybackOptions { loops, ..PlaybackOptions::default() }
}

#[tokio::test]
async fn test_plays_requested_loops() {
    let mut player = player(1);
    let mut sink = CollectSink::default();
    let status = status();
    let (_tx, rx) = watch::channel(false);

    let summary = playback::run(&mut player, &options(2), &mut sink, &status, rx)
        .await
        .expect("run");

    assert_eq!(summary.frames_presented, 6);
    assert_eq!(summary.loops_completed, 2);
    assert!(!summary.cancelled);
    assert_eq!(sink.indices, vec![0, 1, 2, 0, 1, 2]);

    let st = status.read();
    assert!(!st.running);
    assert_eq!(st.frame, 2);
    assert_eq!(st.loops_completed, 2);
}

#[tokio::test]
async fn test_shutdown_cancels_endless_playback() {
    let mut player = player(60_000);
    let mut sink = CollectSink::default();
    let status = status();
    let (tx, rx) = watch::channel(false);

    // Observe the status while frame 0 is being held, then stop.
    let observer = {
        let status = status.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let seen = status.read().clone();
            tx.send(true).expect("send shutdown");
            seen
        })
    };

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        playback::run(&mut player, &options(0), &mut sink, &status, rx),
    )
    .await
    .expect("playback should stop on shutdown")
    .expect("run");

    let seen = observer.await.expect("observer task");
    assert!(seen.running);
    assert_eq!(seen.frame, 0);
    assert_eq!(seen.loops_completed, 0);

    assert!(summary.cancelled);
    assert_eq!(summary.frames_presented, 1);
    assert_eq!(summary.loops_completed, 0);
    assert!(!status.read().running);
}

#[tokio::test]
async fn test_dropped_shutdown_sender_does_not_cancel() {
    let mut player = player(1);
    let mut sink = CollectSink::default();
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let summary = playback::run(&mut player, &options(1), &mut sink, &status(), rx)
        .await
        .expect("run");
    assert!(!summary.cancelled);
    assert_eq!(summary.frames_presented, 3);
}

#[tokio::test]
async fn test_sink_error_stops_playback() {
    let mut player = player(1);
    let status = status();
    let (_tx, rx) = watch::channel(false);

    let result = playback::run(&mut player, &options(1), &mut FailingSink, &status, rx).await;
    assert!(matches!(result, Err(AnimError::Playback(_))));
    assert!(!status.read().running);
}

#[tokio::test]
async fn test_invalid_speed_is_rejected() {
    let mut player = player(1);
    let (_tx, rx) = watch::channel(false);
    let opts = PlaybackOptions { speed: 0.0, ..options(1) };

    let result = playback::run(&mut player, &opts, &mut CollectSink::default(), &status(), rx).await;
    assert!(matches!(result, Err(AnimError::Playback(_))));
}

#[test]
fn test_hold_time_applies_speed_and_floor() {
    let opts = PlaybackOptions { loops: 1, speed: 2.0, min_delay: Duration::from_millis(100) };
    assert_eq!(opts.hold_time(Duration::from_millis(1000)), Duration::from_millis(500));
    assert_eq!(opts.hold_time(Duration::from_millis(50)), Duration::from_millis(100));
    assert_eq!(opts.hold_time(Duration::ZERO), Duration::from_millis(100));
}

#[test]
fn test_hold_time_saturates_for_tiny_speed() {
    let opts = PlaybackOptions { speed: 1e-20, ..options(1) };
    assert_eq!(opts.hold_time(Duration::from_millis(1000)), Duration::MAX);
    assert_eq!(opts.hold_time(Duration::ZERO), Duration::ZERO);

    let opts = PlaybackOptions { speed: f64::MIN_POSITIVE, ..options(1) };
    assert_eq!(opts.hold_time(Duration::from_millis(1)), Duration::MAX);
}

#[tokio::test]
async fn test_file_sink_leaves_last_frame_on_disk() {
    let dir: TempDir = tempfile::tempdir().expect("create tempdir");
    let preview = dir.path().join("live.png");
    let mut player = player(1);
    let expected = player.render_final().expect("final");

    let (_tx, rx) = watch::channel(false);
    let mut sink = FileSink::new(&preview);
    playback::run(&mut player, &options(1), &mut sink, &status(), rx)
        .await
        .expect("run");

    let on_disk = image::open(&preview).expect("open preview").to_rgba8();
    assert_eq!(on_disk, expected);
    assert!(!dir.path().join("live.partial.png").exists());
}
