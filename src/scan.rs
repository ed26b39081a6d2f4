// SPDX: CC0-1.0

//! Pixel-resolution zero-crossing detection.
//!
//! Every pixel is sampled at four corners in math-space. A pixel is on the curve when the
//! samples do not share one strict sign. NaN satisfies neither `> 0` nor `< 0`, so a single
//! undefined corner next to defined ones also counts as a crossing; only a pixel whose
//! corners are all NaN is skipped. This over-reports near poles and domain boundaries
//! (`1/x` paints the column at `x = 0`), which is accepted.

use crate::{eval::Evaluator, viewport::Viewport, Number, Point};
use core::convert::Infallible;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// every corner is NaN
    Undefined,
    Positive,
    Negative,
    /// mixed signs, zeros, or some NaN: painted
    Crossing,
}

impl Cell {
    pub fn classify(samples: [Number; 4]) -> Self {
        if samples.iter().all(|v| v.is_nan()) {
            Self::Undefined
        } else if samples.iter().all(|v| *v > 0.0) {
            Self::Positive
        } else if samples.iter().all(|v| *v < 0.0) {
            Self::Negative
        } else {
            Self::Crossing
        }
    }

    #[inline]
    pub const fn on_curve(&self) -> bool {
        matches!(self, Self::Crossing)
    }
}

/// Math-space corners of pixel `(px, py)`, counterclockwise from its origin corner.
pub fn corners(viewport: &Viewport, px: u32, py: u32) -> [Point<Number>; 4] {
    let scale = viewport.scale();
    let Point { x, y } = viewport.pixel_to_math(Point {
        x: Number::from(px),
        y: Number::from(py),
    });
    [
        Point { x, y },
        Point { x: x + scale, y },
        Point {
            x: x + scale,
            y: y + scale,
        },
        Point { x, y: y + scale },
    ]
}

pub fn sample(evaluator: &Evaluator, viewport: &Viewport, px: u32, py: u32) -> [Number; 4] {
    corners(viewport, px, py).map(|p| evaluator.eval(p))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub visited: u64,
    pub painted: u64,
    pub undefined: u64,
}

/// Visit every pixel in row-major order and hand the on-curve ones to `paint`. Stops at the
/// first paint error.
pub fn scan<P, E>(evaluator: &Evaluator, viewport: &Viewport, mut paint: P) -> Result<ScanStats, E>
where
    P: FnMut(u32, u32) -> Result<(), E>,
{
    let mut stats = ScanStats::default();
    for py in 0..viewport.height() {
        for px in 0..viewport.width() {
            stats.visited += 1;
            match Cell::classify(sample(evaluator, viewport, px, py)) {
                Cell::Undefined => stats.undefined += 1,
                Cell::Positive | Cell::Negative => {}
                Cell::Crossing => {
                    stats.painted += 1;
                    paint(px, py)?;
                }
            }
        }
    }
    Ok(stats)
}

/// [`scan`] for painters that cannot fail.
pub fn scan_infallible<P>(evaluator: &Evaluator, viewport: &Viewport, mut paint: P) -> ScanStats
where
    P: FnMut(u32, u32),
{
    match scan::<_, Infallible>(evaluator, viewport, |x, y| {
        paint(x, y);
        Ok(())
    }) {
        Ok(stats) => stats,
        Err(never) => match never {},
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PixelMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.index(x, y).map_or(false, |idx| self.cells[idx])
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = on;
        }
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|on| **on).count()
    }

    /// Painted pixels in row-major order.
    pub fn painted(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(move |(idx, _)| ((idx % width) as u32, (idx / width) as u32))
    }
}

pub fn scan_mask(evaluator: &Evaluator, viewport: &Viewport) -> (PixelMask, ScanStats) {
    let mut mask = PixelMask::new(viewport.width(), viewport.height());
    let stats = scan_infallible(evaluator, viewport, |x, y| mask.set(x, y, true));
    (mask, stats)
}
