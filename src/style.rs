//! Colors and border styles shared by the engine and render surfaces.
use std::fmt;
use std::str::FromStr;

use image::Rgba;
use smallvec::{smallvec, SmallVec};

use crate::CollageError;

/// Default fill of a freshly created frame.
pub const DEFAULT_FRAME_FILL: Color = Color::rgb(0xf8, 0xf9, 0xfa);
/// Default, subtle border color of a freshly created frame.
pub const DEFAULT_BORDER_COLOR: Color = Color::rgb(0xde, 0xe2, 0xe6);

/// Dash lengths alternating on/off. Empty means a solid line.
pub type DashPattern = SmallVec<[f64; 4]>;

/// An sRGB color with alpha.
///
/// # Example
/// ```
/// use collager::Color;
///
/// let red: Color = "#f00".parse().unwrap();
/// assert_eq!(red, Color::rgb(255, 0, 0));
/// assert_eq!(red.to_string(), "#ff0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.r, color.g, color.b, color.a])
    }
}

impl FromStr for Color {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let invalid = || CollageError::InvalidColor(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize, len: usize| -> Result<u8, CollageError> {
            let digits = &hex[i * len..(i + 1) * len];
            let value = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            Ok(if len == 1 { value * 17 } else { value })
        };
        match hex.len() {
            3 => Ok(Color::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Color::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Color::rgba(
                channel(0, 2)?,
                channel(1, 2)?,
                channel(2, 2)?,
                channel(3, 2)?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Line style of a frame border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// The dash pattern a border of this style is drawn with.
    ///
    /// # Example
    /// ```
    /// use collager::BorderStyle;
    ///
    /// assert!(BorderStyle::Solid.dash_pattern().is_empty());
    /// assert_eq!(BorderStyle::Dashed.dash_pattern().as_slice(), &[10.0, 5.0]);
    /// ```
    pub fn dash_pattern(self) -> DashPattern {
        match self {
            BorderStyle::Solid => SmallVec::new(),
            BorderStyle::Dashed => smallvec![10.0, 5.0],
            BorderStyle::Dotted => smallvec![2.0, 4.0],
        }
    }
}

impl FromStr for BorderStyle {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            _ => Err(CollageError::InvalidBorderStyle(s.to_string())),
        }
    }
}
