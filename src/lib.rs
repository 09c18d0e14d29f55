//! This crate lays out photo collages from grid templates.
//! Templates live in a normalized 400×400 space and are mapped onto any canvas size; collages
//! can then be restyled (spacing, roundness, borders, background) any number of times without
//! their geometry drifting, and images attached to a cell stay cover-fitted and clipped to it.
//!
//! Rendering is delegated to a [`RenderSurface`]. [`Scene`] is an in-memory implementation.
//!
//! # Example
//! ```
//! use collager::*;
//!
//! let mut compositor = Compositor::new(Scene::new(Size::new(800.0, 600.0)));
//! let group = compositor.instantiate(find_template("Split Vertical").unwrap());
//! compositor.apply_settings(group, &SettingsDelta::new().spacing(10.0).roundness(5.0));
//!
//! let frame = compositor.collage(group).unwrap().cells[0].handle;
//! let image = compositor.import_image_size(Size::new(1000.0, 500.0));
//! let fit = compositor.attach_image(image, frame).unwrap();
//! assert!(fit.image_rect.height >= fit.inner.height);
//! ```

pub mod collage;
pub mod geometry;
pub mod scene;
pub mod style;
pub mod surface;
pub mod template;

/// Debug helpers for writing a scene preview to disk.
///
/// # Example
/// ```no_run
/// use collager::*;
///
/// let mut compositor = Compositor::new(Scene::new(CanvasFormat::Square.size()));
/// compositor.instantiate(find_template("Six Grid").unwrap());
///
/// debug::save_scene_preview(compositor.surface(), "collage.png", &drawing::PreviewConfig::default())
///     .unwrap();
/// ```
#[cfg(feature = "debug")]
pub mod debug;
/// Rasterizes a [`Scene`] for previews. Feature-gated under `drawing`.
///
/// The main components of this module are:
/// - [`drawing::PreviewConfig`]: canvas color and stroke rendering switches.
/// - [`drawing::Drawable`]: implemented by types that can be drawn on an image.
#[cfg(feature = "drawing")]
pub mod drawing;

pub use collage::*;
pub use geometry::*;
pub use scene::*;
pub use style::*;
pub use surface::*;
pub use template::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollageError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown canvas format: {0}")]
    UnknownCanvasFormat(String),

    #[error("Invalid border style: {0}")]
    InvalidBorderStyle(String),

    #[error("Invalid canvas dimensions: width={width}, height={height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("Failed to convert image: {0}")]
    ImageConversionError(String),
}
