use super::*;

/// Placement of collages on the canvas.
///
/// # Example
/// ```
/// use collager::{FitPolicy, LayoutConfig};
///
/// let config = LayoutConfig::default();
/// assert_eq!(config.margin, 50.0);
/// assert_eq!(config.fit, FitPolicy::Stretch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutConfig {
    /// Free space kept on every side of the canvas (default: 50)
    pub margin: f64,
    /// How the template square is fitted into the remaining area (default: stretch)
    pub fit: FitPolicy,
}

impl LayoutConfig {
    /// Creates a new `LayoutConfig`. A negative margin is treated as zero.
    ///
    /// # Example
    /// ```
    /// use collager::{FitPolicy, LayoutConfig};
    ///
    /// let config = LayoutConfig::new(-10.0, FitPolicy::Contain);
    /// assert_eq!(config.margin, 0.0);
    /// ```
    pub fn new(margin: f64, fit: FitPolicy) -> Self {
        Self {
            margin: margin.max(0.0),
            fit,
        }
    }

    pub(crate) fn transform(&self, canvas: Size) -> Transform {
        Transform::new(canvas, self.margin, self.fit)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::new(DEFAULT_MARGIN, FitPolicy::Stretch)
    }
}

/// The last-applied group-wide style of a collage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollageConfig {
    /// Gap carved out of every cell, in canvas pixels
    pub spacing: f64,
    /// Corner radius of every cell
    pub roundness: f64,
    pub border_width: f64,
    pub border_color: Color,
    pub border_style: BorderStyle,
    /// Fill drawn behind all cells, visible through the gaps
    pub background_color: Option<Color>,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            spacing: 0.0,
            roundness: 0.0,
            border_width: 1.0,
            border_color: DEFAULT_BORDER_COLOR,
            border_style: BorderStyle::Solid,
            background_color: None,
        }
    }
}

impl CollageConfig {
    /// Returns this config with every field named in `delta` replaced.
    ///
    /// # Example
    /// ```
    /// use collager::{CollageConfig, SettingsDelta};
    ///
    /// let config = CollageConfig::default().merge(&SettingsDelta::new().spacing(10.0));
    /// let config = config.merge(&SettingsDelta::new().roundness(4.0));
    /// assert_eq!((config.spacing, config.roundness), (10.0, 4.0));
    /// ```
    pub fn merge(&self, delta: &SettingsDelta) -> Self {
        Self {
            spacing: delta.spacing.map_or(self.spacing, non_negative),
            roundness: delta.roundness.map_or(self.roundness, non_negative),
            border_width: delta.border_width.map_or(self.border_width, non_negative),
            border_color: delta.border_color.unwrap_or(self.border_color),
            border_style: delta.border_style.unwrap_or(self.border_style),
            background_color: delta.background_color.or(self.background_color),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// A partial settings change. Fields left as `None` keep their previous value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SettingsDelta {
    pub spacing: Option<f64>,
    pub roundness: Option<f64>,
    pub border_width: Option<f64>,
    pub border_color: Option<Color>,
    pub border_style: Option<BorderStyle>,
    pub background_color: Option<Color>,
}

impl SettingsDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn roundness(mut self, roundness: f64) -> Self {
        self.roundness = Some(roundness);
        self
    }

    pub fn border_width(mut self, width: f64) -> Self {
        self.border_width = Some(width);
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn border_style(mut self, style: BorderStyle) -> Self {
        self.border_style = Some(style);
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merge_from(&mut self, other: &SettingsDelta) {
        self.spacing = other.spacing.or(self.spacing);
        self.roundness = other.roundness.or(self.roundness);
        self.border_width = other.border_width.or(self.border_width);
        self.border_color = other.border_color.or(self.border_color);
        self.border_style = other.border_style.or(self.border_style);
        self.background_color = other.background_color.or(self.background_color);
    }

    /// Drops every field that `other` sets.
    pub fn clear_fields_set_in(&mut self, other: &SettingsDelta) {
        if other.spacing.is_some() {
            self.spacing = None;
        }
        if other.roundness.is_some() {
            self.roundness = None;
        }
        if other.border_width.is_some() {
            self.border_width = None;
        }
        if other.border_color.is_some() {
            self.border_color = None;
        }
        if other.border_style.is_some() {
            self.border_style = None;
        }
        if other.background_color.is_some() {
            self.background_color = None;
        }
    }
}

/// Which frames a settings change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every frame of the group; the change is stored in the group config.
    Group,
    /// One frame, as a local override. The group config is left alone.
    Frame(Handle),
}
