//! blitanim: sprite-sheet blit animations
//!
//! Usage:
//!   blitanim info     b_anim.js
//!   blitanim validate b_anim.js --sprite b_packed.png
//!   blitanim render   b_anim.js --frame 3 -o frame3.png
//!   blitanim export   b_anim.js -o frames/
//!   blitanim gif      b_anim.js -o b.gif
//!   blitanim play     b_anim.js --preview live.png
//!   blitanim encode   shots/*.png --name b -o out/

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blitanim::config::Config;
use blitanim::encoder::{self, EncoderOptions};
use blitanim::export;
use blitanim::playback::{self, FileSink, LogSink, PlaybackStatus, SharedStatus};
use blitanim::player::Player;
use blitanim::timeline::script;

const STATUS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "blitanim", about = "Sprite-sheet blit animations", version)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print timeline statistics.
    Info {
        timeline: PathBuf,
    },
    /// Check every blit against the sprite sheet and the canvas.
    Validate {
        timeline: PathBuf,
        /// Sprite sheet; defaults to `<name>_packed.png` next to `<name>_anim.js`.
        #[arg(long)]
        sprite: Option<PathBuf>,
    },
    /// Render a single frame to PNG.
    Render {
        timeline: PathBuf,
        #[arg(long)]
        sprite: Option<PathBuf>,
        /// Frame index; defaults to the last frame.
        #[arg(long)]
        frame: Option<usize>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write every frame as PNG plus a delay manifest.
    Export {
        timeline: PathBuf,
        #[arg(long)]
        sprite: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert to an animated GIF.
    Gif {
        timeline: PathBuf,
        #[arg(long)]
        sprite: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Play in real time until done or CTRL+C.
    Play {
        timeline: PathBuf,
        #[arg(long)]
        sprite: Option<PathBuf>,
        /// Keep this PNG updated with the current frame.
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Override the configured loop count (0 = forever).
        #[arg(long)]
        loops: Option<u32>,
    },
    /// Build a sprite sheet and timeline from full screenshots.
    Encode {
        /// Input images, in playback order.
        #[arg(required = true)]
        frames: Vec<PathBuf>,
        /// Base name: writes `<name>_packed.png` and `<name>_anim.js`.
        #[arg(long)]
        name: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Delay per frame in milliseconds (overrides config).
        #[arg(long)]
        delay: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to load config");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let result = match cli.command {
        Command::Info { timeline } => run_info(&timeline),
        Command::Validate { timeline, sprite } => run_validate(&timeline, sprite),
        Command::Render { timeline, sprite, frame, output } => {
            run_render(&timeline, sprite, frame, &output)
        }
        Command::Export { timeline, sprite, output } => run_export(&timeline, sprite, &output),
        Command::Gif { timeline, sprite, output } => {
            run_gif(&timeline, sprite, &output, cfg.export.gif_repeat)
        }
        Command::Play { timeline, sprite, preview, loops } => {
            run_play(&cfg, &timeline, sprite, preview, loops).await
        }
        Command::Encode { frames, name, output, delay } => {
            run_encode(&cfg, &frames, &name, &output, delay)
        }
    };

    if let Err(e) = result {
        error!(error = %format!("{e:#}"), "Command failed");
        std::process::exit(1);
    }
}

/// `--sprite` if given, else `<name>_packed.png` beside `<name>_anim.js`.
fn resolve_sprite(timeline: &Path, sprite: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = sprite {
        return Ok(path);
    }
    let stem = timeline.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match stem.strip_suffix("_anim") {
        Some(name) => Ok(timeline.with_file_name(format!("{name}_packed.png"))),
        None => bail!("cannot derive sprite sheet for {timeline:?}; pass --sprite"),
    }
}

fn open_player(timeline: &Path, sprite: Option<PathBuf>) -> anyhow::Result<Player> {
    let sprite = resolve_sprite(timeline, sprite)?;
    Player::open(timeline, &sprite)
        .with_context(|| format!("loading {timeline:?} with sprite sheet {sprite:?}"))
}

fn run_info(timeline: &Path) -> anyhow::Result<()> {
    let script = script::load(timeline).with_context(|| format!("reading {timeline:?}"))?;
    let stats = script.timeline.stats();

    println!("=== Timeline ===");
    println!("Variable    : {}", script.variable.as_deref().unwrap_or("-"));
    println!("Frames      : {}", stats.frames);
    println!("Blits       : {}", stats.blits);
    match stats.canvas {
        Some((w, h)) => println!("Canvas      : {w}x{h}"),
        None => println!("Canvas      : undefined (frame 0 has no origin blit)"),
    }
    println!("Duration    : {:.3} s", stats.total_duration.as_secs_f64());
    println!("Max area    : {} px per frame", stats.max_frame_area);
    println!(
        "Sprite read : {}x{} (minimum sheet size)",
        stats.sprite_extent.0, stats.sprite_extent.1
    );
    Ok(())
}

fn run_validate(timeline: &Path, sprite: Option<PathBuf>) -> anyhow::Result<()> {
    let player = open_player(timeline, sprite)?;
    let (w, h) = player.canvas_size();
    println!("OK: {} frames, canvas {w}x{h}", player.len());
    Ok(())
}

fn run_render(
    timeline: &Path,
    sprite: Option<PathBuf>,
    frame: Option<usize>,
    output: &Path,
) -> anyhow::Result<()> {
    let mut player = open_player(timeline, sprite)?;
    let index = frame.unwrap_or(player.len().saturating_sub(1));
    let image = player.render_until(index)?;
    image.save(output).with_context(|| format!("writing {output:?}"))?;
    info!(frame = index, output = ?output, "Frame rendered");
    Ok(())
}

fn run_export(timeline: &Path, sprite: Option<PathBuf>, output: &Path) -> anyhow::Result<()> {
    let mut player = open_player(timeline, sprite)?;
    let count = export::export_frames(&mut player, output)?;
    println!("Exported {count} frames to {}", output.display());
    Ok(())
}

fn run_gif(
    timeline: &Path,
    sprite: Option<PathBuf>,
    output: &Path,
    repeat: u16,
) -> anyhow::Result<()> {
    let mut player = open_player(timeline, sprite)?;
    let count = export::export_gif(&mut player, output, repeat)
        .with_context(|| format!("writing {output:?}"))?;
    println!("Wrote {count} frames to {}", output.display());
    Ok(())
}

async fn run_play(
    cfg: &Config,
    timeline: &Path,
    sprite: Option<PathBuf>,
    preview: Option<PathBuf>,
    loops: Option<u32>,
) -> anyhow::Result<()> {
    let mut player = open_player(timeline, sprite)?;
    let mut options = cfg.playback.options();
    if let Some(n) = loops {
        options.loops = n;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        // Wait for CTRL+C.
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received CTRL+C, stopping playback…");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Signal error"),
        }
    });

    let status: SharedStatus = Arc::new(RwLock::new(PlaybackStatus::default()));
    let reporter = tokio::spawn(report_status(status.clone(), STATUS_INTERVAL));

    let result = match preview {
        Some(path) => {
            let mut sink = FileSink::new(path);
            playback::run(&mut player, &options, &mut sink, &status, shutdown_rx).await
        }
        None => playback::run(&mut player, &options, &mut LogSink, &status, shutdown_rx).await,
    };
    reporter.abort();
    let summary = result?;

    let last = status.read().clone();
    println!(
        "Presented {} frames over {} loop(s), stopped at frame {}{}",
        summary.frames_presented,
        summary.loops_completed,
        last.frame,
        if summary.cancelled { " (interrupted)" } else { "" }
    );
    Ok(())
}

/// Log the playback position every `every` while playback runs.
async fn report_status(status: SharedStatus, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let s = status.read().clone();
        if s.running {
            info!(frame = s.frame, loops = s.loops_completed, "Playing");
        }
    }
}

fn run_encode(
    cfg: &Config,
    frames: &[PathBuf],
    name: &str,
    output: &Path,
    delay: Option<u32>,
) -> anyhow::Result<()> {
    // Fail before decoding any input if the name cannot become a variable.
    script::check_variable(&format!("{name}_timeline"))
        .with_context(|| format!("--name {name:?} must be a valid identifier"))?;

    let sources = encoder::load_frames(frames, delay.unwrap_or(cfg.encoder.delay_ms))
        .context("loading input frames")?;
    let encoded = encoder::encode(&sources, &EncoderOptions::from(&cfg.encoder))?;
    let (sprite, script) = encoder::write_outputs(&encoded, output, name)?;
    println!("Sprite sheet : {}", sprite.display());
    println!("Timeline     : {}", script.display());
    Ok(())
}
