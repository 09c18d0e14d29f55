//! The rendering collaborator the collage engine draws through.
//!
//! The engine never touches pixels. It creates rectangles, groups them, clips images and asks
//! for bounding boxes through [`RenderSurface`]. [`crate::Scene`] is the in-memory
//! implementation used by the CLI and tests; a host application implements the trait over its
//! own scene graph.
use crate::{BoundingBox, CanvasRect, Color, DashPattern, Size};

slotmap::new_key_type! {
    /// Identifies a primitive on a render surface.
    pub struct Handle;
}

/// Visual attributes of a rectangle primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct RectStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    /// Keep the border thickness constant when the primitive is scaled.
    pub stroke_uniform: bool,
    pub dash: DashPattern,
    pub corner_radius: f64,
    pub selectable: bool,
    /// Whether the primitive receives pointer events.
    pub evented: bool,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            stroke_uniform: true,
            dash: DashPattern::new(),
            corner_radius: 0.0,
            selectable: true,
            evented: true,
        }
    }
}

/// Options for [`RenderSurface::create_group`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupOptions {
    /// Canvas position of the group's local origin. Children keep their canvas placement and
    /// are stored relative to this point.
    pub origin: crate::Point,
    /// Let pointer events target individual children instead of the whole group.
    pub sub_target_check: bool,
}

/// A partial update for [`RenderSurface::set_props`]. `None` leaves the attribute untouched.
///
/// Geometry is expressed in the coordinate space of the primitive's parent: group-local for
/// children, canvas space for top-level primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsPatch {
    pub geometry: Option<CanvasRect>,
    pub fill: Option<Option<Color>>,
    pub stroke: Option<Option<Color>>,
    pub stroke_width: Option<f64>,
    pub dash: Option<DashPattern>,
    pub corner_radius: Option<f64>,
    /// Uniform scale applied to an image's natural size.
    pub scale: Option<f64>,
    pub evented: Option<bool>,
}

impl PropsPatch {
    pub fn geometry(mut self, geometry: CanvasRect) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn fill(mut self, fill: Option<Color>) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn stroke(mut self, stroke: Option<Color>) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn dash(mut self, dash: DashPattern) -> Self {
        self.dash = Some(dash);
        self
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Everything the collage engine needs from a scene graph.
///
/// Implementations are expected to be cheap to call; the engine calls them once or twice per
/// cell per operation. Unknown handles must be ignored, never panic.
pub trait RenderSurface {
    /// Current canvas size.
    fn canvas_size(&self) -> Size;

    /// Changes the canvas size. Primitives keep their positions.
    fn set_canvas_size(&mut self, size: Size);

    /// Creates a rectangle primitive, not yet placed on the surface.
    fn create_rect(&mut self, geometry: CanvasRect, style: &RectStyle) -> Handle;

    /// Creates an image primitive of the given natural (decoded) size.
    fn create_image(&mut self, natural_size: Size) -> Handle;

    /// Groups `children`, whose geometry is given in canvas space.
    fn create_group(&mut self, children: &[Handle], options: &GroupOptions) -> Handle;

    /// Inserts `child` into `group` at `index` of its child order; geometry is group-local.
    fn insert_child(&mut self, group: Handle, child: Handle, index: usize);

    /// Merges `patch` into the primitive's attributes. No implicit re-layout happens.
    fn set_props(&mut self, handle: Handle, patch: &PropsPatch);

    /// Rendered bounds in canvas coordinates, stroke included.
    fn bounding_box(&self, handle: Handle) -> Option<BoundingBox>;

    /// Clips `image` to the rectangle `clip`, which is positioned in canvas coordinates.
    fn clip_image(&mut self, image: Handle, clip: Handle);

    /// Places a top-level primitive on the surface.
    fn add(&mut self, handle: Handle);

    /// Removes a primitive and its children from the surface and frees them.
    fn remove(&mut self, handle: Handle);

    /// Whether the primitive is currently placed on the surface.
    fn is_placed(&self, handle: Handle) -> bool;

    /// Moves a top-level primitive so its origin sits at the canvas center.
    fn center(&mut self, handle: Handle);

    fn set_active(&mut self, handle: Option<Handle>);

    fn active(&self) -> Option<Handle>;

    fn request_redraw(&mut self);
}
