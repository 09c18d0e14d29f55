//! The collage engine: instantiating templates, re-deriving cell geometry under settings
//! changes, and keeping attached images clipped to their cells.
//!
//! All state the engine adds on top of the render surface lives in a [`Compositor`], keyed
//! by surface [`Handle`]. Callers pass the handle of the group or frame they mean; nothing
//! is discovered by scanning the canvas.
mod attach;
mod config;
mod instantiate;
mod primitive;
mod settings;

pub use attach::{cover_fit, CoverFit};
pub use config::*;
pub use primitive::*;

use slotmap::SecondaryMap;
use smallvec::SmallVec;
use tracing::*;
use uuid::Uuid;

use crate::{
    BorderStyle, Color, FitPolicy, GridTemplate, Handle, RenderSurface, Scale, Size, Transform,
    DEFAULT_BORDER_COLOR, DEFAULT_MARGIN,
};

// Most templates have at most eight cells
const DEFAULT_CELLS_INLINE: usize = 8;

/// A type alias for SmallVec sized for the cells of a typical template.
pub type SmallVecCells<T> = SmallVec<[T; DEFAULT_CELLS_INLINE]>;

/// Owns a render surface and the collage metadata attached to its primitives.
///
/// # Example
/// ```
/// use collager::{find_template, Compositor, Scene, SettingsDelta, Size};
///
/// let mut compositor = Compositor::new(Scene::new(Size::new(800.0, 600.0)));
/// let group = compositor.instantiate(find_template("Four Grid").unwrap());
/// compositor.apply_settings(group, &SettingsDelta::new().spacing(10.0));
///
/// let collage = compositor.collage(group).unwrap();
/// assert_eq!(collage.cells.len(), 4);
/// assert_eq!(collage.config.spacing, 10.0);
/// ```
pub struct Compositor<S: RenderSurface> {
    surface: S,
    layout: LayoutConfig,
    primitives: SecondaryMap<Handle, Primitive>,
}

impl<S: RenderSurface> Compositor<S> {
    /// Creates a compositor with the default [`LayoutConfig`].
    pub fn new(surface: S) -> Self {
        Self::with_layout(surface, LayoutConfig::default())
    }

    pub fn with_layout(surface: S, layout: LayoutConfig) -> Self {
        Self {
            surface,
            layout,
            primitives: SecondaryMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface. Geometry of collage frames must not be edited through it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    pub fn primitive(&self, handle: Handle) -> Option<&Primitive> {
        self.primitives.get(handle)
    }

    pub fn collage(&self, group: Handle) -> Option<&CollageGroup> {
        match self.primitives.get(group)? {
            Primitive::CollageGroup(collage) => Some(collage),
            _ => None,
        }
    }

    pub fn frame(&self, handle: Handle) -> Option<&Frame> {
        match self.primitives.get(handle)? {
            Primitive::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn image(&self, handle: Handle) -> Option<&AttachedImage> {
        match self.primitives.get(handle)? {
            Primitive::AttachedImage(image) => Some(image),
            _ => None,
        }
    }

    /// Marks a surface primitive the engine did not create as a plain shape.
    pub fn register_shape(&mut self, handle: Handle) {
        self.primitives.insert(handle, Primitive::PlainShape);
    }

    /// Images currently synchronized with the frame `id`.
    pub fn images_of(&self, id: FrameId) -> SmallVecCells<Handle> {
        self.primitives
            .iter()
            .filter_map(|(handle, primitive)| match primitive {
                Primitive::AttachedImage(image) if image.parent_frame_id == Some(id) => {
                    Some(handle)
                }
                _ => None,
            })
            .collect()
    }

    /// The group style with the frame's own overrides layered on top.
    pub fn resolved_config(&self, frame: Handle) -> Option<CollageConfig> {
        let frame = self.frame(frame)?;
        let collage = self.collage(frame.group)?;
        Some(collage.config.merge(&frame.overrides))
    }

    /// Resolves the active selection to the collage group it belongs to.
    ///
    /// A convenience for UI code; every engine operation takes explicit handles.
    pub fn active_collage(&self) -> Option<Handle> {
        let active = self.surface.active()?;
        match self.primitives.get(active)? {
            Primitive::CollageGroup(_) => Some(active),
            Primitive::Frame(frame) => Some(frame.group),
            Primitive::AttachedImage(image) => {
                let id = image.parent_frame_id?;
                self.primitives.iter().find_map(|(handle, primitive)| match primitive {
                    Primitive::CollageGroup(collage) if collage.frame_by_id(id).is_some() => {
                        Some(handle)
                    }
                    _ => None,
                })
            }
            Primitive::PlainShape => None,
        }
    }

    /// Changes the canvas size. Collages keep their geometry until the next settings change
    /// or [`Compositor::relayout`], which rederive it from the new size.
    pub fn resize_canvas(&mut self, size: Size) {
        debug!("Resizing canvas to {}", size);
        self.surface.set_canvas_size(size);
        self.surface.request_redraw();
    }

    /// Re-centers a collage on the current canvas and re-derives all its frames.
    pub fn relayout(&mut self, group: Handle) {
        if self.collage(group).is_none() {
            debug!("Ignoring relayout of non-collage {:?}", group);
            return;
        }
        self.surface.center(group);
        self.apply_settings_scoped(group, &SettingsDelta::default(), Scope::Group);
    }

    /// Drops a frame's local overrides so it follows the group config again.
    pub fn reset_frame(&mut self, frame: Handle) {
        let Some(Primitive::Frame(state)) = self.primitives.get_mut(frame) else {
            debug!("Ignoring reset of non-frame {:?}", frame);
            return;
        };
        state.overrides = SettingsDelta::default();
        let group = state.group;
        self.apply_settings_scoped(group, &SettingsDelta::default(), Scope::Frame(frame));
    }

    /// Removes a collage with its frames and the images synchronized with them.
    ///
    /// Images that were detached from their frame stay on the surface.
    pub fn remove_collage(&mut self, group: Handle) {
        let Some(Primitive::CollageGroup(collage)) = self.primitives.remove(group) else {
            debug!("Ignoring removal of non-collage {:?}", group);
            return;
        };
        for frame in collage.cells.iter() {
            for image in self.images_of(frame.id) {
                if let Some(Primitive::AttachedImage(state)) = self.primitives.remove(image) {
                    if let Some(clip) = state.clip {
                        self.surface.remove(clip);
                    }
                }
                self.surface.remove(image);
            }
            self.primitives.remove(frame.handle);
        }
        if let Some(background) = collage.background {
            self.primitives.remove(background);
        }
        self.surface.remove(group);
        debug!(
            "Removed collage {:?} with {} frames",
            group,
            collage.cells.len()
        );
        self.surface.request_redraw();
    }
}
