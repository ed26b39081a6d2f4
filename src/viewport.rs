// SPDX: CC0-1.0

use crate::{Number, Point};
use core::{fmt, str::FromStr};

pub const DEFAULT_SCALE: Number = 0.04;
pub const DEFAULT_SIZE: [u32; 2] = [600, 600];

// 9/10 * 10/9 == 1, so opposite gestures undo each other
pub const ZOOM_IN: Number = 9.0 / 10.0;
pub const ZOOM_OUT: Number = 10.0 / 9.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomDir {
    In,
    Out,
}

impl ZoomDir {
    /// Scrolling down (positive delta) zooms out.
    pub fn from_wheel(delta_y: Number) -> Self {
        if delta_y > 0.0 {
            Self::Out
        } else {
            Self::In
        }
    }

    pub const fn factor(&self) -> Number {
        match self {
            Self::In => ZOOM_IN,
            Self::Out => ZOOM_OUT,
        }
    }
}

impl FromStr for ZoomDir {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" | "+" => Ok(Self::In),
            "out" | "-" => Ok(Self::Out),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportErr {
    Scale(Number),
    Center(Point<Number>),
    EmptyCanvas,
}

impl fmt::Display for ViewportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale(scale) => write!(f, "scale must be positive and finite, but is {scale}"),
            Self::Center(Point { x, y }) => {
                write!(f, "center must be finite, but is ({x}, {y})")
            }
            Self::EmptyCanvas => write!(f, "canvas must be at least 1x1 pixels"),
        }
    }
}

impl std::error::Error for ViewportErr {}

/// Maps pixels to math-space. `center` is the pixel position of the math origin and
/// `scale` is math units per pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: Number,
    center: Point<Number>,
    width: u32,
    height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        let [width, height] = DEFAULT_SIZE;
        Self {
            scale: DEFAULT_SCALE,
            center: Point {
                x: Number::from(width) / 2.0,
                y: Number::from(height) / 2.0,
            },
            width,
            height,
        }
    }
}

fn check_scale(scale: Number) -> Result<Number, ViewportErr> {
    if scale > 0.0 && scale.is_normal() {
        Ok(scale)
    } else {
        Err(ViewportErr::Scale(scale))
    }
}

fn check_center(center: Point<Number>) -> Result<Point<Number>, ViewportErr> {
    if center.x.is_finite() && center.y.is_finite() {
        Ok(center)
    } else {
        Err(ViewportErr::Center(center))
    }
}

impl Viewport {
    pub fn new(
        scale: Number,
        center: Point<Number>,
        width: u32,
        height: u32,
    ) -> Result<Self, ViewportErr> {
        if width == 0 || height == 0 {
            return Err(ViewportErr::EmptyCanvas);
        }
        Ok(Self {
            scale: check_scale(scale)?,
            center: check_center(center)?,
            width,
            height,
        })
    }

    /// Origin centered on a canvas of the given size.
    pub fn centered(scale: Number, width: u32, height: u32) -> Result<Self, ViewportErr> {
        let center = Point {
            x: Number::from(width) / 2.0,
            y: Number::from(height) / 2.0,
        };
        Self::new(scale, center, width, height)
    }

    pub const fn scale(&self) -> Number {
        self.scale
    }

    pub const fn center(&self) -> Point<Number> {
        self.center
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn set_center(&mut self, center: Point<Number>) -> Result<(), ViewportErr> {
        self.center = check_center(center)?;
        Ok(())
    }

    #[inline]
    pub fn pixel_to_math(&self, p: Point<Number>) -> Point<Number> {
        Point {
            x: (p.x - self.center.x) * self.scale,
            // screen y grows downward
            y: (self.center.y - p.y) * self.scale,
        }
    }

    #[inline]
    pub fn math_to_pixel(&self, p: Point<Number>) -> Point<Number> {
        Point {
            x: p.x / self.scale + self.center.x,
            y: self.center.y - p.y / self.scale,
        }
    }

    /// Moves the origin by a screen-space delta.
    pub fn pan(&mut self, delta: Point<Number>) -> Result<(), ViewportErr> {
        self.set_center(Point {
            x: self.center.x + delta.x,
            y: self.center.y + delta.y,
        })
    }

    /// Zooms about the current origin, never the cursor. Refuses to leave the range of
    /// normal floats; returns whether the scale changed.
    pub fn zoom(&mut self, dir: ZoomDir) -> bool {
        match check_scale(self.scale * dir.factor()) {
            Ok(scale) => {
                self.scale = scale;
                true
            }
            Err(_) => false,
        }
    }

    /// Math-space bounds of the canvas, as `(top left, bottom right)`.
    pub fn bounds(&self) -> (Point<Number>, Point<Number>) {
        (
            self.pixel_to_math(Point { x: 0.0, y: 0.0 }),
            self.pixel_to_math(Point {
                x: Number::from(self.width),
                y: Number::from(self.height),
            }),
        )
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("scale", &self.scale)
            .field("center x", &self.center.x)
            .field("center y", &self.center.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
