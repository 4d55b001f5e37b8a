//! Pixel storage and the integer geometry used to address it
//!
//! Buffers are row-major `ndarray` grids indexed `(row, col)`, while the public
//! API speaks in signed `(x, y)` coordinates so that causal offsets can step
//! past the origin without wrapping. Every coordinate check is exclusive on the
//! far edge of both axes.

use crate::io::error::{Result, invalid_buffer};
use ndarray::Array2;
use std::fmt;

/// Packed RGBA color; equality is exact per channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Fully transparent black, the background of every fresh buffer
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    /// Build a color from all four channels
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self([red, green, blue, alpha])
    }

    /// Build a fully opaque color
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self([red, green, blue, u8::MAX])
    }

    /// Build a fully opaque grey
    pub const fn grey(level: u8) -> Self {
        Self::opaque(level, level, level)
    }

    /// Red channel
    pub const fn red(self) -> u8 {
        self.0[0]
    }

    /// Green channel
    pub const fn green(self) -> u8 {
        self.0[1]
    }

    /// Blue channel
    pub const fn blue(self) -> u8 {
        self.0[2]
    }

    /// Alpha channel
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }

    /// True when the alpha channel is zero
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// Integer mean of the three color channels, ignoring alpha
    pub const fn luma(self) -> u8 {
        ((self.red() as u16 + self.green() as u16 + self.blue() as u16) / 3) as u8
    }

    /// Channel-wise integer mean of two colors, alpha included
    #[must_use]
    pub fn mean(self, other: Self) -> Self {
        let mut channels = [0u8; 4];
        for ((out, &a), &b) in channels.iter_mut().zip(&self.0).zip(&other.0) {
            *out = ((u16::from(a) + u16::from(b)) / 2) as u8;
        }
        Self(channels)
    }
}

impl From<[u8; 4]> for Color {
    fn from(channels: [u8; 4]) -> Self {
        Self(channels)
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Integer pixel coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Point {
    /// Create a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by a relative offset
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle; `x`/`y` inclusive, `x + width`/`y + height` exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from its origin and size
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight rectangle spanning two inclusive corners
    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x + 1,
            height: max.y - min.y + 1,
        }
    }

    /// First column past the right edge
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// First row past the bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Number of pixels covered
    pub const fn area(&self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Test whether a point lies inside the rectangle
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Test whether two rectangles share at least one pixel
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle covering both inputs
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let min = Point::new(self.x.min(other.x), self.y.min(other.y));
        let max = Point::new(
            self.right().max(other.right()) - 1,
            self.bottom().max(other.bottom()) - 1,
        );
        Self::from_corners(min, max)
    }

    /// All covered points in raster order (top-to-bottom, left-to-right)
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (left, right) = (self.x, self.right());
        (self.y..self.bottom()).flat_map(move |y| (left..right).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Owned width×height grid of RGBA colors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Array2<Color>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer
    ///
    /// # Errors
    ///
    /// Returns `InvalidBuffer` when either dimension is zero or exceeds the
    /// signed coordinate range
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Allocate a buffer with every pixel set to `color`
    ///
    /// # Errors
    ///
    /// Returns `InvalidBuffer` when either dimension is zero or exceeds the
    /// signed coordinate range
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: Array2::from_elem((height, width), color),
        })
    }

    /// Wrap row-major pixel data
    ///
    /// # Errors
    ///
    /// Returns `InvalidBuffer` when the dimensions are invalid or do not match
    /// the number of pixels supplied
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self> {
        check_dimensions(width, height)?;
        let supplied = pixels.len();
        let pixels = Array2::from_shape_vec((height, width), pixels).map_err(|e| {
            invalid_buffer(
                width,
                height,
                &format!("expected {} pixels, got {supplied} ({e})", width * height),
            )
        })?;
        Ok(Self { pixels })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Rectangle covering the whole buffer
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Test whether a coordinate addresses a pixel
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Read a pixel, `None` outside the buffer
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y)
            .and_then(|index| self.pixels.get(index))
            .copied()
    }

    /// Alpha of a pixel; coordinates outside the buffer read as transparent
    pub fn alpha(&self, x: i32, y: i32) -> u8 {
        self.get(x, y).map_or(0, Color::alpha)
    }

    /// Write a pixel, returning false when the coordinate is outside the buffer
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match self.index(x, y).and_then(|index| self.pixels.get_mut(index)) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }

    /// Count pixels with non-zero alpha
    pub fn opaque_count(&self) -> usize {
        self.pixels.iter().filter(|c| !c.is_transparent()).count()
    }

    /// Every pixel with its coordinate, in raster order
    pub fn enumerate(&self) -> impl Iterator<Item = (Point, Color)> + '_ {
        self.pixels
            .indexed_iter()
            .map(|((row, col), &color)| (Point::new(col as i32, row as i32), color))
    }

    /// Read-only view of the underlying grid, indexed `(row, col)`
    pub const fn pixels(&self) -> &Array2<Color> {
        &self.pixels
    }

    /// Copy out the pixels under `rect`
    ///
    /// # Errors
    ///
    /// Returns `InvalidBuffer` if the rectangle is empty or leaves the buffer
    pub fn crop(&self, rect: Rect) -> Result<Self> {
        let inside = rect.area() > 0
            && self.contains(rect.x, rect.y)
            && self.contains(rect.right() - 1, rect.bottom() - 1);
        if !inside {
            return Err(invalid_buffer(
                rect.width.max(0) as usize,
                rect.height.max(0) as usize,
                &format!(
                    "crop {rect} leaves {}x{} buffer",
                    self.width(),
                    self.height()
                ),
            ));
        }

        let mut cropped = Self::new(rect.width as usize, rect.height as usize)?;
        for point in rect.points() {
            if let Some(color) = self.get(point.x, point.y) {
                cropped.set(point.x - rect.x, point.y - rect.y, color);
            }
        }
        Ok(cropped)
    }

    /// Nearest-neighbour enlargement by an integer factor
    ///
    /// # Errors
    ///
    /// Returns `InvalidBuffer` when the factor is zero or the result would
    /// exceed the coordinate range
    pub fn upscale(&self, factor: usize) -> Result<Self> {
        let width = self.width().saturating_mul(factor);
        let height = self.height().saturating_mul(factor);
        let mut scaled = Self::new(width, height)?;
        for ((row, col), pixel) in scaled.pixels.indexed_iter_mut() {
            if let Some(&source) = self.pixels.get((row / factor, col / factor)) {
                *pixel = source;
            }
        }
        Ok(scaled)
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let col = usize::try_from(x).ok()?;
        let row = usize::try_from(y).ok()?;
        (col < self.width() && row < self.height()).then_some((row, col))
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(invalid_buffer(width, height, &"dimensions must be positive"));
    }
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(invalid_buffer(
            width,
            height,
            &"dimensions exceed the coordinate range",
        ));
    }
    Ok(())
}
