//! An in-memory [`RenderSurface`].
//!
//! Primitives live in a slotmap arena. Top-level primitives are positioned in canvas space;
//! children of a group are positioned relative to the group's origin. Rectangles are
//! center-origin and their bounding boxes include half the stroke on every side.
use image::RgbaImage;
use slotmap::{SecondaryMap, SlotMap};
use tracing::*;

use crate::{
    BoundingBox, CanvasRect, GroupOptions, Handle, Point, PropsPatch, RectStyle, RenderSurface,
    Size,
};

/// What a scene node draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Rect,
    Image { natural: Size },
    Group { sub_target_check: bool },
}

/// A primitive stored in a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Center-origin rectangle in the parent's coordinate space. For groups only the center is
    /// meaningful; it is the group's local origin.
    pub geometry: CanvasRect,
    pub style: RectStyle,
    /// Uniform scale of an image's natural size.
    pub scale: f64,
    pub parent: Option<Handle>,
    pub children: Vec<Handle>,
    /// Rectangle, in canvas space, outside of which the node is not drawn.
    pub clip: Option<Handle>,
}

impl Node {
    fn new(kind: NodeKind, geometry: CanvasRect, style: RectStyle) -> Self {
        Self {
            kind,
            geometry,
            style,
            scale: 1.0,
            parent: None,
            children: Vec::new(),
            clip: None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// Whether pointer events may target the children of this group individually.
    pub fn sub_target_check(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Group {
                sub_target_check: true
            }
        )
    }
}

/// A scene graph kept entirely in memory.
///
/// # Example
/// ```
/// use collager::{CanvasRect, Point, RectStyle, RenderSurface, Scene, Size};
///
/// let mut scene = Scene::new(Size::new(200.0, 100.0));
/// let rect = scene.create_rect(CanvasRect::new(50.0, 50.0, 20.0, 20.0), &RectStyle::default());
/// scene.add(rect);
///
/// assert_eq!(scene.target_at(Point::new(55.0, 45.0)), Some(rect));
/// assert_eq!(scene.target_at(Point::new(150.0, 50.0)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Scene {
    size: Size,
    nodes: SlotMap<Handle, Node>,
    /// Top-level primitives, bottom first.
    display_list: Vec<Handle>,
    pixels: SecondaryMap<Handle, RgbaImage>,
    active: Option<Handle>,
    redraws: usize,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            nodes: SlotMap::with_key(),
            display_list: Vec::new(),
            pixels: SecondaryMap::new(),
            active: None,
            redraws: 0,
        }
    }

    pub fn node(&self, handle: Handle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn display_list(&self) -> &[Handle] {
        &self.display_list
    }

    /// How many redraws were requested so far.
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    /// Attaches decoded pixels to an image node, used when drawing previews.
    pub fn set_pixels(&mut self, image: Handle, pixels: RgbaImage) {
        if self.nodes.contains_key(image) {
            self.pixels.insert(image, pixels);
        }
    }

    pub fn pixels(&self, image: Handle) -> Option<&RgbaImage> {
        self.pixels.get(image)
    }

    /// Canvas position of a node's local origin.
    fn absolute_origin(&self, handle: Handle) -> Option<Point> {
        let node = self.nodes.get(handle)?;
        let parent = match node.parent {
            Some(parent) => self.absolute_origin(parent)?,
            None => Point::new(0.0, 0.0),
        };
        Some(Point::new(
            parent.x + node.geometry.center_x,
            parent.y + node.geometry.center_y,
        ))
    }

    /// The node's rectangle in canvas space, stroke excluded.
    pub fn absolute_rect(&self, handle: Handle) -> Option<CanvasRect> {
        let node = self.nodes.get(handle)?;
        let center = self.absolute_origin(handle)?;
        Some(CanvasRect::new(
            center.x,
            center.y,
            node.geometry.width,
            node.geometry.height,
        ))
    }

    fn detach(&mut self, handle: Handle) {
        let parent = self.nodes.get_mut(handle).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(parent)) {
            parent.children.retain(|child| *child != handle);
        }
        self.display_list.retain(|top| *top != handle);
    }

    /// The topmost evented primitive under `point`.
    ///
    /// Groups with sub-target checks resolve to the child under the point, or to the group
    /// itself when only its gaps or non-evented children are hit.
    pub fn target_at(&self, point: Point) -> Option<Handle> {
        self.display_list
            .iter()
            .rev()
            .find_map(|&handle| self.hit(handle, point))
    }

    fn hit(&self, handle: Handle, point: Point) -> Option<Handle> {
        let node = self.nodes.get(handle)?;
        if !node.style.evented || !self.bounding_box(handle)?.contains(point) {
            return None;
        }
        if let Some(clip) = node.clip {
            if !self.absolute_rect(clip)?.to_bounding_box().contains(point) {
                return None;
            }
        }
        if node.sub_target_check() {
            let child = node
                .children
                .iter()
                .rev()
                .find_map(|&child| self.hit(child, point));
            return child.or(Some(handle));
        }
        Some(handle)
    }
}

impl RenderSurface for Scene {
    fn canvas_size(&self) -> Size {
        self.size
    }

    fn set_canvas_size(&mut self, size: Size) {
        self.size = size;
    }

    fn create_rect(&mut self, geometry: CanvasRect, style: &RectStyle) -> Handle {
        self.nodes
            .insert(Node::new(NodeKind::Rect, geometry, style.clone()))
    }

    fn create_image(&mut self, natural_size: Size) -> Handle {
        let geometry = CanvasRect::new(
            natural_size.width / 2.0,
            natural_size.height / 2.0,
            natural_size.width,
            natural_size.height,
        );
        self.nodes.insert(Node::new(
            NodeKind::Image {
                natural: natural_size,
            },
            geometry,
            RectStyle::default(),
        ))
    }

    fn create_group(&mut self, children: &[Handle], options: &GroupOptions) -> Handle {
        let origin = options.origin;
        let group = self.nodes.insert(Node::new(
            NodeKind::Group {
                sub_target_check: options.sub_target_check,
            },
            CanvasRect::new(origin.x, origin.y, 0.0, 0.0),
            RectStyle::default(),
        ));
        for &child in children {
            let Some(rect) = self.absolute_rect(child) else {
                warn!("Skipping unknown group child {:?}", child);
                continue;
            };
            self.detach(child);
            if let Some(node) = self.nodes.get_mut(child) {
                node.geometry = rect.translate(Point::new(-origin.x, -origin.y));
                node.parent = Some(group);
            }
            if let Some(node) = self.nodes.get_mut(group) {
                node.children.push(child);
            }
        }
        group
    }

    fn insert_child(&mut self, group: Handle, child: Handle, index: usize) {
        let is_group = self.nodes.get(group).is_some_and(Node::is_group);
        if !is_group || !self.nodes.contains_key(child) || group == child {
            warn!("Cannot insert {:?} into {:?}", child, group);
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(group);
        }
        if let Some(node) = self.nodes.get_mut(group) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
    }

    fn set_props(&mut self, handle: Handle, patch: &PropsPatch) {
        let Some(node) = self.nodes.get_mut(handle) else {
            trace!("set_props on unknown {:?}", handle);
            return;
        };
        if let Some(geometry) = patch.geometry {
            node.geometry = geometry;
        }
        if let Some(fill) = patch.fill {
            node.style.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            node.style.stroke = stroke;
        }
        if let Some(width) = patch.stroke_width {
            node.style.stroke_width = width;
        }
        if let Some(dash) = &patch.dash {
            node.style.dash = dash.clone();
        }
        if let Some(radius) = patch.corner_radius {
            node.style.corner_radius = radius;
        }
        if let Some(evented) = patch.evented {
            node.style.evented = evented;
        }
        if let Some(scale) = patch.scale {
            node.scale = scale;
        }
        if let NodeKind::Image { natural } = node.kind {
            node.geometry.width = natural.width * node.scale;
            node.geometry.height = natural.height * node.scale;
        }
    }

    fn bounding_box(&self, handle: Handle) -> Option<BoundingBox> {
        let node = self.nodes.get(handle)?;
        match node.kind {
            NodeKind::Group { .. } => {
                let origin = self.absolute_origin(handle)?;
                node.children
                    .iter()
                    .filter_map(|&child| self.bounding_box(child))
                    .reduce(|a, b| a.union(&b))
                    .or(Some(BoundingBox::new(origin.x, origin.y, 0.0, 0.0)))
            }
            NodeKind::Rect => {
                let rect = self.absolute_rect(handle)?.to_bounding_box();
                match node.style.stroke {
                    Some(_) if node.style.stroke_width > 0.0 => {
                        Some(rect.inset(-node.style.stroke_width / 2.0))
                    }
                    _ => Some(rect),
                }
            }
            NodeKind::Image { .. } => Some(self.absolute_rect(handle)?.to_bounding_box()),
        }
    }

    fn clip_image(&mut self, image: Handle, clip: Handle) {
        if !self.nodes.contains_key(clip) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(image) {
            node.clip = Some(clip);
        }
    }

    fn add(&mut self, handle: Handle) {
        match self.nodes.get(handle) {
            Some(node) if node.parent.is_none() => {
                if !self.display_list.contains(&handle) {
                    self.display_list.push(handle);
                }
            }
            Some(_) => warn!("Cannot add child primitive {:?} at top level", handle),
            None => trace!("add of unknown {:?}", handle),
        }
    }

    fn remove(&mut self, handle: Handle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);
        let mut pending = vec![handle];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
            }
            self.pixels.remove(next);
            if self.active == Some(next) {
                self.active = None;
            }
        }
    }

    fn is_placed(&self, handle: Handle) -> bool {
        match self.nodes.get(handle) {
            Some(Node {
                parent: Some(parent),
                ..
            }) => self.is_placed(*parent),
            Some(_) => self.display_list.contains(&handle),
            None => false,
        }
    }

    fn center(&mut self, handle: Handle) {
        let center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        if let Some(node) = self.nodes.get_mut(handle) {
            if node.parent.is_none() {
                node.geometry.center_x = center.x;
                node.geometry.center_y = center.y;
            }
        }
    }

    fn set_active(&mut self, handle: Option<Handle>) {
        self.active = handle.filter(|handle| self.nodes.contains_key(*handle));
    }

    fn active(&self) -> Option<Handle> {
        self.active
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}
