//! Mapping from the normalized template space to canvas space.
//!
//! Canvas rectangles produced here are center-origin: `center_x`/`center_y` locate the middle
//! of the rectangle, the way frames are positioned on the render surface.
//!
//! # Example
//! ```
//! use collager::{find_template, to_canvas_rect, FitPolicy, Size};
//!
//! let cell = find_template("Single").unwrap().cells[0];
//! let rect = to_canvas_rect(&cell, Size::new(800.0, 600.0), 50.0, FitPolicy::Stretch);
//! assert_eq!((rect.center_x, rect.center_y), (400.0, 300.0));
//! assert_eq!((rect.width, rect.height), (700.0, 500.0));
//! ```
use std::fmt;
use std::str::FromStr;

use tracing::*;

use crate::{CollageError, NormalizedCell};

/// Side length of the square template space.
pub const BASE_SIZE: f64 = 400.0;
/// Margin kept free around a collage on the canvas, in canvas pixels.
pub const DEFAULT_MARGIN: f64 = 50.0;

const BASE_CENTER: f64 = BASE_SIZE / 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Creates a size, rejecting non-finite or non-positive extents.
    ///
    /// # Example
    /// ```
    /// use collager::Size;
    ///
    /// assert!(Size::try_new(800.0, 600.0).is_ok());
    /// assert!(Size::try_new(0.0, 600.0).is_err());
    /// ```
    pub fn try_new(width: f64, height: f64) -> Result<Self, CollageError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            error!("Invalid dimensions: width={}, height={}", width, height);
            return Err(CollageError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Per-axis normalized-to-canvas scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// A center-origin rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanvasRect {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub const fn new(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Shrinks both extents by `amount`, keeping the center. Extents never go below zero.
    ///
    /// # Example
    /// ```
    /// use collager::CanvasRect;
    ///
    /// let rect = CanvasRect::new(100.0, 100.0, 200.0, 200.0).shrink(50.0);
    /// assert_eq!(rect, CanvasRect::new(100.0, 100.0, 150.0, 150.0));
    /// assert_eq!(rect.shrink(1000.0).width, 0.0);
    /// ```
    pub fn shrink(self, amount: f64) -> Self {
        Self {
            width: (self.width - amount).max(0.0),
            height: (self.height - amount).max(0.0),
            ..self
        }
    }

    /// Moves the rectangle by `offset`.
    pub fn translate(self, offset: Point) -> Self {
        Self {
            center_x: self.center_x + offset.x,
            center_y: self.center_y + offset.y,
            ..self
        }
    }

    /// The same rectangle as a top-left-origin box.
    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.center_x - self.width / 2.0,
            self.center_y - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

/// A top-left-origin box in canvas coordinates, as returned by bounding-box queries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Removes `amount` from every side, clamping extents at zero around the center.
    pub fn inset(&self, amount: f64) -> Self {
        let center = self.center();
        let width = (self.width - 2.0 * amount).max(0.0);
        let height = (self.height - 2.0 * amount).max(0.0);
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// The same box as a center-origin rectangle.
    pub fn to_canvas_rect(&self) -> CanvasRect {
        let center = self.center();
        CanvasRect::new(center.x, center.y, self.width, self.height)
    }
}

/// How the template square is fitted into the available canvas area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FitPolicy {
    /// Scale each axis independently so the grid fills the available area.
    #[default]
    Stretch,
    /// Scale uniformly by the smaller axis factor and center the result.
    Contain,
}

/// Resolved normalized-to-canvas mapping for one canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Transform {
    /// Computes the mapping for `canvas`, leaving `margin` free on every side.
    ///
    /// An available area smaller than zero (margin larger than half the canvas) collapses to
    /// a zero scale rather than inverting the grid.
    pub fn new(canvas: Size, margin: f64, fit: FitPolicy) -> Self {
        let available_width = (canvas.width - 2.0 * margin).max(0.0);
        let available_height = (canvas.height - 2.0 * margin).max(0.0);
        let scale_x = available_width / BASE_SIZE;
        let scale_y = available_height / BASE_SIZE;

        let transform = match fit {
            FitPolicy::Stretch => Self {
                scale_x,
                scale_y,
                offset_x: margin,
                offset_y: margin,
            },
            FitPolicy::Contain => {
                let scale = scale_x.min(scale_y);
                let content = BASE_SIZE * scale;
                Self {
                    scale_x: scale,
                    scale_y: scale,
                    offset_x: (canvas.width - content) / 2.0,
                    offset_y: (canvas.height - content) / 2.0,
                }
            }
        };
        trace!("Transform for canvas {} ({:?}): {:?}", canvas, fit, transform);
        transform
    }

    pub fn scale(&self) -> Scale {
        Scale {
            x: self.scale_x,
            y: self.scale_y,
        }
    }

    /// Where the center of the template square lands on the canvas.
    pub fn origin(&self) -> Point {
        Point::new(
            self.offset_x + BASE_CENTER * self.scale_x,
            self.offset_y + BASE_CENTER * self.scale_y,
        )
    }

    /// Maps a normalized cell to its canvas rectangle.
    pub fn to_canvas_rect(&self, cell: &NormalizedCell) -> CanvasRect {
        let width = cell.width * self.scale_x;
        let height = cell.height * self.scale_y;
        CanvasRect::new(
            cell.left * self.scale_x + self.offset_x + width / 2.0,
            cell.top * self.scale_y + self.offset_y + height / 2.0,
            width,
            height,
        )
    }

    /// Maps a normalized cell to a rectangle relative to the template center, which is the
    /// local origin of a collage group.
    pub fn to_group_local(&self, cell: &NormalizedCell) -> CanvasRect {
        let (cx, cy) = cell.center();
        CanvasRect::new(
            (cx - BASE_CENTER) * self.scale_x,
            (cy - BASE_CENTER) * self.scale_y,
            cell.width * self.scale_x,
            cell.height * self.scale_y,
        )
    }

    /// The full template square on the canvas.
    pub fn content_rect(&self) -> CanvasRect {
        self.to_canvas_rect(&NormalizedCell::new(0.0, 0.0, BASE_SIZE, BASE_SIZE))
    }
}

/// Maps `cell` to a center-origin canvas rectangle.
pub fn to_canvas_rect(
    cell: &NormalizedCell,
    canvas: Size,
    margin: f64,
    fit: FitPolicy,
) -> CanvasRect {
    Transform::new(canvas, margin, fit).to_canvas_rect(cell)
}

/// Preset canvas formats offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CanvasFormat {
    Square,
    Portrait,
    Landscape,
    Story,
}

impl CanvasFormat {
    pub const ALL: [CanvasFormat; 4] = [
        CanvasFormat::Square,
        CanvasFormat::Portrait,
        CanvasFormat::Landscape,
        CanvasFormat::Story,
    ];

    pub fn size(self) -> Size {
        match self {
            CanvasFormat::Square => Size::new(600.0, 600.0),
            CanvasFormat::Portrait => Size::new(480.0, 600.0),
            CanvasFormat::Landscape => Size::new(600.0, 315.0),
            CanvasFormat::Story => Size::new(360.0, 640.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CanvasFormat::Square => "Square (1:1)",
            CanvasFormat::Portrait => "Portrait (4:5)",
            CanvasFormat::Landscape => "Landscape (1.91:1)",
            CanvasFormat::Story => "Story (9:16)",
        }
    }
}

impl FromStr for CanvasFormat {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(CanvasFormat::Square),
            "portrait" => Ok(CanvasFormat::Portrait),
            "landscape" => Ok(CanvasFormat::Landscape),
            "story" => Ok(CanvasFormat::Story),
            _ => Err(CollageError::UnknownCanvasFormat(s.to_string())),
        }
    }
}
