//! This module provides functionality for rasterizing a [`Scene`] into an image.
//! It is feature-gated under the `drawing` feature and requires the `image` and `imageproc` crates.
//!
//! Corner radii are not rendered; frames and clips are drawn as plain rectangles.
//!
//! # Examples
//!
//! ```rust
//! use collager::{drawing::*, find_template, Compositor, Scene, Size};
//!
//! let mut compositor = Compositor::new(Scene::new(Size::new(200.0, 100.0)));
//! compositor.instantiate(find_template("Four Grid").unwrap());
//!
//! let preview = render_scene(compositor.surface(), &PreviewConfig::default()).unwrap();
//! assert_eq!(preview.dimensions(), (200, 100));
//! ```

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use tracing::*;

use crate::{BoundingBox, CollageError, Color, Handle, NodeKind, RectStyle, RenderSurface, Scene};

/// Configuration for rendering scene previews.
///
/// # Examples
///
/// ```
/// use collager::drawing::PreviewConfig;
/// use image::Rgba;
///
/// let config = PreviewConfig {
///     canvas_color: Rgba([0, 0, 0, 255]),
///     ..PreviewConfig::default()
/// };
/// assert!(config.draw_strokes);
/// ```
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Color of the canvas behind every primitive.
    pub canvas_color: Rgba<u8>,
    /// Fill used for images that carry no pixels.
    pub image_placeholder: Rgba<u8>,
    /// Draw rectangle borders, honoring dash patterns.
    pub draw_strokes: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            canvas_color: Rgba([255, 255, 255, 255]),
            image_placeholder: Rgba([173, 181, 189, 255]),
            draw_strokes: true,
        }
    }
}

/// Trait for types that can be drawn on an image.
pub trait Drawable {
    /// Draws the object on the provided image using the given configuration.
    ///
    /// # Errors
    /// Returns [`CollageError`] if drawing fails.
    fn draw(&self, image: &mut RgbaImage, config: &PreviewConfig) -> Result<(), CollageError>;
}

impl Drawable for Scene {
    fn draw(&self, image: &mut RgbaImage, config: &PreviewConfig) -> Result<(), CollageError> {
        for &handle in self.display_list() {
            draw_node(self, handle, image, config);
        }
        Ok(())
    }
}

/// Renders `scene` onto a fresh image the size of its canvas.
pub fn render_scene(scene: &Scene, config: &PreviewConfig) -> Result<RgbaImage, CollageError> {
    let size = scene.canvas_size();
    let (width, height) = (size.width.round(), size.height.round());
    if !(width >= 1.0 && height >= 1.0) {
        return Err(CollageError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }
    let mut image = RgbaImage::from_pixel(width as u32, height as u32, config.canvas_color);
    scene.draw(&mut image, config)?;
    Ok(image)
}

fn draw_node(scene: &Scene, handle: Handle, image: &mut RgbaImage, config: &PreviewConfig) {
    let Some(node) = scene.node(handle) else {
        return;
    };
    match node.kind {
        NodeKind::Group { .. } => {
            for &child in &node.children {
                draw_node(scene, child, image, config);
            }
        }
        NodeKind::Rect => {
            let Some(rect) = scene.absolute_rect(handle) else {
                return;
            };
            draw_rect(image, &rect.to_bounding_box(), &node.style, config);
        }
        NodeKind::Image { .. } => {
            let (Some(rect), clip) = (
                scene.absolute_rect(handle),
                node.clip.and_then(|clip| scene.absolute_rect(clip)),
            ) else {
                return;
            };
            let bounds = rect.to_bounding_box();
            let visible = clip.map_or(bounds, |clip| clip.to_bounding_box());
            match scene.pixels(handle) {
                Some(pixels) => blit(image, pixels, &bounds, &visible),
                None => {
                    if let Some(area) = intersect(&bounds, &visible).and_then(|b| to_rect(&b)) {
                        draw_filled_rect_mut(image, area, config.image_placeholder);
                    }
                }
            }
        }
    }
}

fn draw_rect(
    image: &mut RgbaImage,
    bounds: &BoundingBox,
    style: &RectStyle,
    config: &PreviewConfig,
) {
    if let (Some(fill), Some(rect)) = (style.fill, to_rect(bounds)) {
        if fill.a > 0 {
            draw_filled_rect_mut(image, rect, Rgba::from(fill));
        }
    }
    let Some(stroke) = style.stroke else {
        return;
    };
    if !config.draw_strokes || style.stroke_width <= 0.0 {
        return;
    }
    // Strokes are centered on the rectangle edge.
    let outer = bounds.inset(-style.stroke_width / 2.0);
    // Rings past the center of the box only repaint it.
    let max_rings = (outer.width.min(outer.height) / 2.0).ceil();
    let thickness = style.stroke_width.round().min(max_rings).max(1.0) as i32;
    // Rings with all four sides off the image are invisible.
    let hidden = (-outer.left)
        .min(-outer.top)
        .min(outer.right() - image.width() as f64)
        .min(outer.bottom() - image.height() as f64)
        .floor()
        .clamp(0.0, thickness as f64) as i32;
    for step in hidden..thickness {
        let ring = outer.inset(step as f64);
        if style.dash.is_empty() {
            if let Some(rect) = to_rect(&ring) {
                draw_hollow_rect_mut(image, rect, Rgba::from(stroke));
            }
        } else {
            draw_dashed_ring(image, &ring, &style.dash, stroke);
        }
    }
}

fn draw_dashed_ring(image: &mut RgbaImage, ring: &BoundingBox, dash: &[f64], color: Color) {
    let corners = [
        (ring.left, ring.top),
        (ring.right(), ring.top),
        (ring.right(), ring.bottom()),
        (ring.left, ring.bottom()),
    ];
    let period: f64 = dash.iter().sum();
    if period <= 0.0 {
        return;
    }
    for i in 0..corners.len() {
        let (x0, y0) = corners[i];
        let (x1, y1) = corners[(i + 1) % corners.len()];
        let length = (x1 - x0).hypot(y1 - y0);
        let mut at = 0.0;
        let mut index = 0;
        while at < length {
            let segment = dash[index % dash.len()];
            let end = (at + segment).min(length);
            if index % 2 == 0 {
                let a = at / length;
                let b = end / length;
                draw_line_segment_mut(
                    image,
                    ((x0 + (x1 - x0) * a) as f32, (y0 + (y1 - y0) * a) as f32),
                    ((x0 + (x1 - x0) * b) as f32, (y0 + (y1 - y0) * b) as f32),
                    Rgba::from(color),
                );
            }
            at = end;
            index += 1;
        }
    }
}

/// Draws `pixels` scaled to `bounds`, keeping only the part inside `visible`.
fn blit(image: &mut RgbaImage, pixels: &RgbaImage, bounds: &BoundingBox, visible: &BoundingBox) {
    let (width, height) = (bounds.width.round(), bounds.height.round());
    if width < 1.0 || height < 1.0 {
        return;
    }
    let Some(area) = intersect(bounds, visible) else {
        trace!("Image at {:?} is fully clipped", bounds);
        return;
    };
    let scaled = imageops::resize(pixels, width as u32, height as u32, FilterType::Triangle);
    let (left, top) = (bounds.left.round() as i64, bounds.top.round() as i64);
    let x_end = (area.right().round() as i64).min(image.width() as i64);
    let y_end = (area.bottom().round() as i64).min(image.height() as i64);
    let x_range = area.left.round().max(0.0) as i64..x_end;
    let y_range = area.top.round().max(0.0) as i64..y_end;
    for y in y_range {
        for x in x_range.clone() {
            let (sx, sy) = (x - left, y - top);
            if sx < 0 || sy < 0 || sx >= scaled.width() as i64 || sy >= scaled.height() as i64 {
                continue;
            }
            let source = *scaled.get_pixel(sx as u32, sy as u32);
            if source[3] > 0 {
                image.put_pixel(x as u32, y as u32, source);
            }
        }
    }
}

fn intersect(a: &BoundingBox, b: &BoundingBox) -> Option<BoundingBox> {
    let left = a.left.max(b.left);
    let top = a.top.max(b.top);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    (right > left && bottom > top).then(|| BoundingBox::new(left, top, right - left, bottom - top))
}

fn to_rect(bounds: &BoundingBox) -> Option<Rect> {
    let width = bounds.width.round();
    let height = bounds.height.round();
    if !(width >= 1.0 && height >= 1.0) {
        return None;
    }
    Some(
        Rect::at(bounds.left.round() as i32, bounds.top.round() as i32)
            .of_size(width as u32, height as u32),
    )
}
