//! Changed-region detection between two equally sized frames.
//!
//! Rows that differ are grouped into horizontal bands; inside a band the
//! differing columns are split into runs, and each run is shrunk to the rows
//! that actually changed in it. Gaps of up to `max_gap` unchanged pixels are
//! absorbed rather than starting a new band or run.
//!
//! Bands are row-disjoint and runs within a band column-disjoint, so the
//! returned rectangles never overlap.

use image::RgbaImage;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Rectangles covering every pixel that differs between `prev` and `cur`.
///
/// Both images must have the same dimensions.
pub fn changed_regions(prev: &RgbaImage, cur: &RgbaImage, max_gap: u32) -> Vec<Rect> {
    debug_assert_eq!(prev.dimensions(), cur.dimensions());
    let (width, height) = cur.dimensions();
    let row_bytes = width as usize * 4;
    let a: &[u8] = prev;
    let b: &[u8] = cur;

    let row_changed: Vec<bool> = (0..height as usize)
        .map(|y| a[y * row_bytes..(y + 1) * row_bytes] != b[y * row_bytes..(y + 1) * row_bytes])
        .collect();

    let differs = |x: usize, y: usize| {
        let i = y * row_bytes + x * 4;
        a[i..i + 4] != b[i..i + 4]
    };

    let mut rects = Vec::new();
    for (y0, y1) in runs(&row_changed, max_gap) {
        let col_changed: Vec<bool> = (0..width as usize)
            .map(|x| (y0..=y1).any(|y| row_changed[y] && differs(x, y)))
            .collect();

        for (x0, x1) in runs(&col_changed, max_gap) {
            let changed_in_run = |y: &usize| (x0..=x1).any(|x| differs(x, *y));
            let (Some(top), Some(bottom)) = (
                (y0..=y1).find(changed_in_run),
                (y0..=y1).rev().find(changed_in_run),
            ) else {
                continue;
            };
            rects.push(Rect {
                x: x0 as u32,
                y: top as u32,
                w: (x1 - x0 + 1) as u32,
                h: (bottom - top + 1) as u32,
            });
        }
    }
    rects
}

/// Inclusive index ranges of `true` runs, merging gaps of at most `max_gap`.
fn runs(flags: &[bool], max_gap: u32) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f) {
        current = match current {
            Some((start, end)) if i - end - 1 <= max_gap as usize => Some((start, i)),
            Some(run) => {
                out.push(run);
                Some((i, i))
            }
            None => Some((i, i)),
        };
    }
    out.extend(current);
    out
}
