// SPDX: CC0-1.0

use crate::{
    eval::Evaluator,
    scan::{self, PixelMask, ScanStats},
    viewport::Viewport,
    Number,
};
use std::time::Instant;

pub type Rgb = [u8; 3];

pub const BACKGROUND: Rgb = [0xff, 0xff, 0xff];
pub const GRID: Rgb = [0xdd, 0xdd, 0xdd];
pub const AXIS: Rgb = [0x00, 0x00, 0x00];
pub const CURVE: Rgb = [0xff, 0x00, 0x00];

/// Distance between grid lines, in pixels.
pub const GRID_SPACING: Number = 50.0;

/// Raster target of a fixed size. Painting outside of it is a no-op.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgb);
    fn paint(&mut self, x: u32, y: u32, color: Rgb);
}

impl Surface for image::RgbImage {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn clear(&mut self, color: Rgb) {
        for p in self.pixels_mut() {
            *p = image::Rgb(color);
        }
    }

    fn paint(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width() && y < self.height() {
            self.put_pixel(x, y, image::Rgb(color));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// A grid line and the math coordinate it marks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub axis: Axis,
    /// column for [`Axis::X`], row for [`Axis::Y`]
    pub pixel: u32,
    pub value: Number,
}

impl Tick {
    pub fn label(&self) -> String {
        format!("{:.2}", self.value)
    }
}

fn axis_ticks(axis: Axis, origin: Number, extent: u32, scale: Number) -> Vec<Tick> {
    // grid lines sit at origin + k * spacing; keep the k whose line lands on the canvas
    let first = (-origin / GRID_SPACING).ceil();
    let last = ((Number::from(extent) - 1.0 - origin) / GRID_SPACING).floor();
    if !(first <= last) {
        return Vec::new();
    }

    // bounded by the canvas even when float rounding at huge offsets leaves k stuck
    let steps = (last - first).min(Number::from(extent) / GRID_SPACING + 1.0) as u64;
    let mut ret = Vec::new();
    for i in 0..=steps {
        let k = first + i as Number;
        let at = origin + k * GRID_SPACING;
        let pos = at.round();
        // lines before the origin stop short of the canvas edge
        if (0.0..Number::from(extent)).contains(&pos) && (k >= 0.0 || at > 0.0) {
            let offset = k * GRID_SPACING * scale;
            ret.push(Tick {
                axis,
                pixel: pos as u32,
                value: match axis {
                    Axis::X => offset,
                    // rows below the origin are negative
                    Axis::Y => 0.0 - offset,
                },
            });
        }
    }
    ret
}

/// Grid lines every [`GRID_SPACING`] pixels, walking out from the origin in both
/// directions. Vertical lines (x ticks) come first.
pub fn ticks(viewport: &Viewport) -> Vec<Tick> {
    let center = viewport.center();
    let mut ret = axis_ticks(Axis::X, center.x, viewport.width(), viewport.scale());
    ret.extend(axis_ticks(
        Axis::Y,
        center.y,
        viewport.height(),
        viewport.scale(),
    ));
    ret
}

fn vline<S: Surface + ?Sized>(surface: &mut S, x: u32, color: Rgb) {
    let (_, height) = surface.size();
    for y in 0..height {
        surface.paint(x, y, color);
    }
}

fn hline<S: Surface + ?Sized>(surface: &mut S, y: u32, color: Rgb) {
    let (width, _) = surface.size();
    for x in 0..width {
        surface.paint(x, y, color);
    }
}

pub fn draw_grid<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) {
    for tick in ticks(viewport) {
        match tick.axis {
            Axis::X => vline(surface, tick.pixel, GRID),
            Axis::Y => hline(surface, tick.pixel, GRID),
        }
    }
}

/// Axes through the origin, skipped while the origin is panned off-canvas.
pub fn draw_axes<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) {
    let center = viewport.center();
    let (width, height) = surface.size();
    let col = center.x.round();
    let row = center.y.round();
    if (0.0..Number::from(height)).contains(&row) {
        hline(surface, row as u32, AXIS);
    }
    if (0.0..Number::from(width)).contains(&col) {
        vline(surface, col as u32, AXIS);
    }
}

const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;
/// Distance from a tick label's center to the axis it sits beside.
const LABEL_OFFSET: i64 = 10;

// rows top to bottom, high bit on the left
fn glyph(chr: char) -> Option<[u8; 5]> {
    Some(match chr {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        _ => return None,
    })
}

fn paint_signed<S: Surface + ?Sized>(surface: &mut S, x: i64, y: i64, color: Rgb) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        surface.paint(x, y, color);
    }
}

/// Draw `text` centered on `(cx, cy)` in a 3x5 pixel font. Only digits, `-` and `.` have
/// glyphs; anything else is left blank.
pub fn draw_text<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    cx: i64,
    cy: i64,
    color: Rgb,
) {
    let advance = GLYPH_WIDTH + 1;
    let width = text.chars().count() as i64 * advance - 1;
    let left = cx - width / 2;
    let top = cy - GLYPH_HEIGHT / 2;
    for (i, chr) in text.chars().enumerate() {
        let Some(rows) = glyph(chr) else {
            continue;
        };
        let x0 = left + i as i64 * advance;
        for (dy, &bits) in rows.iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                if bits & (0b100_u8 >> dx) != 0 {
                    paint_signed(surface, x0 + dx, top + dy as i64, color);
                }
            }
        }
    }
}

/// Tick labels below the x axis and left of the y axis, following the origin even when it
/// is off the canvas.
pub fn draw_labels<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) {
    let center = viewport.center();
    // keeps the offset arithmetic below from overflowing
    let limit = 1e12;
    let cx = center.x.round().clamp(-limit, limit) as i64;
    let cy = center.y.round().clamp(-limit, limit) as i64;
    for tick in ticks(viewport) {
        let (x, y) = match tick.axis {
            Axis::X => (i64::from(tick.pixel), cy + LABEL_OFFSET),
            Axis::Y => (cx - LABEL_OFFSET, i64::from(tick.pixel)),
        };
        draw_text(surface, &tick.label(), x, y, AXIS);
    }
}

/// Everything but the curve: background, grid, axes and tick labels.
pub fn draw_decorations<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) {
    surface.clear(BACKGROUND);
    draw_grid(surface, viewport);
    draw_axes(surface, viewport);
    draw_labels(surface, viewport);
}

/// Clear and draw the decorations, then scan the curve on top.
pub fn redraw<S: Surface + ?Sized>(
    evaluator: &Evaluator,
    viewport: &Viewport,
    surface: &mut S,
) -> ScanStats {
    draw_decorations(surface, viewport);

    let started = Instant::now();
    let stats = scan::scan_infallible(evaluator, viewport, |x, y| surface.paint(x, y, CURVE));
    tracing::debug!(
        expr = evaluator.src(),
        visited = stats.visited,
        painted = stats.painted,
        undefined = stats.undefined,
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "scan finished"
    );
    stats
}

/// Downsample a mask to `cols` x `rows` characters; a cell shows `#` if any pixel in it
/// is painted.
pub fn preview(mask: &PixelMask, cols: u32, rows: u32) -> String {
    let cols = cols.clamp(1, mask.width().max(1));
    let rows = rows.clamp(1, mask.height().max(1));
    let mut cells = vec![false; cols as usize * rows as usize];
    for (x, y) in mask.painted() {
        let cx = (u64::from(x) * u64::from(cols) / u64::from(mask.width())) as usize;
        let cy = (u64::from(y) * u64::from(rows) / u64::from(mask.height())) as usize;
        cells[cy * cols as usize + cx] = true;
    }

    let mut ret = String::with_capacity(cells.len() + rows as usize);
    for row in cells.chunks(cols as usize) {
        ret.extend(row.iter().map(|on| if *on { '#' } else { '.' }));
        ret.push('\n');
    }
    ret
}
