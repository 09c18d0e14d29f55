use std::fmt;

use super::*;

/// Stable identity of a frame, used by images to find their cell across re-layouts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameId(Uuid);

impl FrameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a FrameId from a u128 (useful for tests).
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", &self.0.to_string()[..8])
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A frame of a collage as seen from its group: surface handle plus identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef {
    pub handle: Handle,
    pub id: FrameId,
}

/// One cell of a collage.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    /// The group owning this frame for its whole lifetime.
    pub group: Handle,
    /// Position in the group's cell order, matching the template cell index.
    pub index: usize,
    /// Settings applied to this frame alone, layered over the group config.
    pub overrides: SettingsDelta,
}

/// The on-canvas composite built from a template.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageGroup {
    /// Frames in template cell order.
    pub cells: SmallVecCells<FrameRef>,
    /// Deep copy of the template taken at creation; the baseline of every re-layout.
    pub original_template: GridTemplate,
    pub config: CollageConfig,
    /// Normalized-to-canvas scale at creation time. Informational only.
    pub base_scale: Scale,
    pub layout: LayoutConfig,
    /// Backing rectangle carrying the background color, once one was set.
    pub background: Option<Handle>,
}

impl CollageGroup {
    pub fn frame_index(&self, handle: Handle) -> Option<usize> {
        self.cells.iter().position(|frame| frame.handle == handle)
    }

    pub fn frame_by_id(&self, id: FrameId) -> Option<FrameRef> {
        self.cells.iter().find(|frame| frame.id == id).copied()
    }
}

/// An image primitive known to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedImage {
    /// Frame the image is synchronized with. `None` once detached or before attaching.
    pub parent_frame_id: Option<FrameId>,
    pub natural_size: Size,
    /// Clip rectangle, created on first attach.
    pub clip: Option<Handle>,
}

impl AttachedImage {
    pub fn is_attached(&self) -> bool {
        self.parent_frame_id.is_some()
    }
}

/// What a surface handle means to the collage engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Frame(Frame),
    CollageGroup(CollageGroup),
    PlainShape,
    AttachedImage(AttachedImage),
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Frame(_) => "frame",
            Primitive::CollageGroup(_) => "collage group",
            Primitive::PlainShape => "plain shape",
            Primitive::AttachedImage(_) => "image",
        }
    }
}
