//! Canvas compositing and frame replay tests.

use std::path::Path;

use image::{Rgba, RgbaImage};

use blitanim::canvas::Canvas;
use blitanim::error::AnimError;
use blitanim::player::Player;
use blitanim::timeline::{script, Blit, Frame, Timeline};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 4x4 sheet: rows 0-1 red, row 2 green, row 3 blue with a transparent
/// pixel at (3, 3).
fn sprite() -> RgbaImage {
    RgbaImage::from_fn(4, 4, |x, y| match (x, y) {
        (3, 3) => CLEAR,
        (_, 0 | 1) => RED,
        (_, 2) => GREEN,
        _ => BLUE,
    })
}

/// Unique colour per pixel so any misplaced copy shows up.
fn gradient_sprite(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255]))
}

fn timeline() -> Timeline {
    Timeline::new(vec![
        Frame { delay: 100, blit: vec![Blit::new(0, 0, 4, 2, 0, 0)] },
        Frame { delay: 200, blit: vec![Blit::new(0, 2, 2, 1, 2, 1)] },
        Frame { delay: 300, blit: vec![Blit::new(0, 3, 4, 1, 0, 0), Blit::new(0, 2, 1, 1, 3, 0)] },
    ])
}

#[test]
fn test_frames_apply_in_order() {
    let mut player = Player::new(timeline(), sprite()).expect("player");
    assert_eq!(player.canvas_size(), (4, 2));

    let frames: Vec<_> = player.by_ref().collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames.iter().map(|f| f.delay.as_millis()).collect::<Vec<_>>(),
        vec![100, 200, 300]
    );

    let f0 = &frames[0].image;
    assert!(f0.pixels().all(|p| *p == RED));

    let f1 = &frames[1].image;
    assert_eq!(*f1.get_pixel(1, 1), RED);
    assert_eq!(*f1.get_pixel(2, 1), GREEN);
    assert_eq!(*f1.get_pixel(3, 1), GREEN);
    assert_eq!(*f1.get_pixel(2, 0), RED);

    // Later blits overwrite earlier ones within a frame.
    let f2 = &frames[2].image;
    assert_eq!(*f2.get_pixel(0, 0), BLUE);
    assert_eq!(*f2.get_pixel(3, 0), GREEN);
    assert_eq!(*f2.get_pixel(2, 1), GREEN);

    assert!(player.next().is_none());
}

#[test]
fn test_blit_overwrites_alpha_without_blending() {
    let mut canvas = Canvas::new(4, 1);
    let sheet = sprite();
    canvas.blit(&sheet, &Blit::new(0, 0, 4, 1, 0, 0));
    canvas.blit(&sheet, &Blit::new(3, 3, 1, 1, 0, 0));

    assert_eq!(*canvas.image().get_pixel(0, 0), CLEAR);
    assert_eq!(*canvas.image().get_pixel(1, 0), RED);
}

#[test]
fn test_blit_clips_out_of_range_regions() {
    let mut canvas = Canvas::new(3, 3);
    let sheet = sprite();

    canvas.blit(&sheet, &Blit::new(2, 2, 10, 10, 1, 1));
    assert_eq!(*canvas.image().get_pixel(1, 1), GREEN);
    assert_eq!(*canvas.image().get_pixel(2, 1), GREEN);
    assert_eq!(*canvas.image().get_pixel(1, 2), BLUE);
    assert_eq!(*canvas.image().get_pixel(0, 0), CLEAR);

    // Entirely outside either image: nothing happens.
    canvas.blit(&sheet, &Blit::new(9, 9, 2, 2, 0, 0));
    canvas.blit(&sheet, &Blit::new(0, 0, 2, 2, 3, 3));
    assert_eq!(*canvas.image().get_pixel(0, 0), CLEAR);
}

#[test]
fn test_render_until_matches_iteration() {
    let mut player = Player::new(timeline(), sprite()).expect("player");
    let iterated: Vec<_> = player.by_ref().map(|f| f.image).collect();

    for (i, expected) in iterated.iter().enumerate() {
        assert_eq!(&player.render_until(i).expect("render"), expected, "frame {i}");
        assert_eq!(player.position(), i + 1);
    }

    assert_eq!(&player.render_final().expect("final"), iterated.last().expect("last"));
}

#[test]
fn test_render_until_out_of_range() {
    let mut player = Player::new(timeline(), sprite()).expect("player");
    assert!(matches!(player.render_until(3), Err(AnimError::Playback(_))));
}

#[test]
fn test_rewind_restarts_from_transparent_canvas() {
    let mut player = Player::new(timeline(), sprite()).expect("player");
    let first_pass: Vec<_> = player.by_ref().map(|f| f.image).collect();
    player.rewind();
    let second_pass: Vec<_> = player.by_ref().map(|f| f.image).collect();
    assert_eq!(first_pass, second_pass);
}

#[test]
fn test_player_rejects_invalid_timeline() {
    let small = RgbaImage::new(2, 2);
    assert!(matches!(
        Player::new(timeline(), small),
        Err(AnimError::InvalidBlit { frame: 0, blit: 0, .. })
    ));
    assert!(matches!(
        Player::new(Timeline::default(), sprite()),
        Err(AnimError::EmptyTimeline)
    ));
}

#[test]
fn test_fixture_replay_reaches_reference_image() {
    let script = script::load(Path::new("tests/fixtures/b_anim.js")).expect("fixture");
    let mut player = Player::new(script.timeline, gradient_sprite(652, 1486)).expect("player");

    let mut last = None;
    let mut count = 0;
    for frame in player.by_ref() {
        assert_eq!(frame.index, count);
        assert_eq!(frame.image.dimensions(), (652, 418));
        count += 1;
        last = Some(frame.image);
    }
    assert_eq!(count, 9);

    // The fixture ends on a full-canvas blit of the first image.
    let reference = player.render_final().expect("final");
    assert_eq!(Some(&reference), last.as_ref());
    assert_eq!(reference, player.render_until(0).expect("frame 0"));
}
