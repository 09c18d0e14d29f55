use image::{DynamicImage, GenericImageView};

use super::*;
use crate::{BoundingBox, CanvasRect, PropsPatch, RectStyle};

/// Placement of an image covering a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the natural image size.
    pub scale: f64,
    /// The frame's bounds without its border; also the clip rectangle.
    pub inner: BoundingBox,
    /// Where the scaled image lands, centered on `inner`.
    pub image_rect: CanvasRect,
}

/// Computes how an image of `natural` size covers a frame whose stroke-inclusive bounds are
/// `frame_box`.
///
/// The image is scaled uniformly until it covers the inner bounds on both axes, then centered.
/// Returns `None` for an image without area.
///
/// # Example
/// ```
/// use collager::{cover_fit, BoundingBox, Size};
///
/// let fit = cover_fit(Size::new(1000.0, 500.0), BoundingBox::new(0.0, 0.0, 302.0, 202.0), 2.0)
///     .unwrap();
/// assert_eq!(fit.scale, 0.4);
/// assert_eq!((fit.image_rect.width, fit.image_rect.height), (400.0, 200.0));
/// assert_eq!((fit.inner.width, fit.inner.height), (300.0, 200.0));
/// ```
pub fn cover_fit(natural: Size, frame_box: BoundingBox, stroke_width: f64) -> Option<CoverFit> {
    if !(natural.width > 0.0 && natural.height > 0.0) {
        return None;
    }
    let inner = frame_box.inset(stroke_width.max(0.0) / 2.0);
    let scale = (inner.width / natural.width).max(inner.height / natural.height);
    let center = inner.center();
    Some(CoverFit {
        scale,
        inner,
        image_rect: CanvasRect::new(
            center.x,
            center.y,
            natural.width * scale,
            natural.height * scale,
        ),
    })
}

fn clip_style(roundness: f64) -> RectStyle {
    RectStyle {
        fill: None,
        stroke: None,
        stroke_width: 0.0,
        corner_radius: roundness,
        selectable: false,
        evented: false,
        ..RectStyle::default()
    }
}

impl<S: RenderSurface> Compositor<S> {
    /// Creates an image primitive for a decoded image. It is not attached to any frame yet.
    pub fn import_image(&mut self, image: &DynamicImage) -> Handle {
        let (width, height) = image.dimensions();
        self.import_image_size(Size::new(width as f64, height as f64))
    }

    /// Creates an image primitive of the given natural size.
    pub fn import_image_size(&mut self, natural_size: Size) -> Handle {
        let handle = self.surface.create_image(natural_size);
        self.primitives.insert(
            handle,
            Primitive::AttachedImage(AttachedImage {
                parent_frame_id: None,
                natural_size,
                clip: None,
            }),
        );
        debug!("Imported image {:?} of size {}", handle, natural_size);
        handle
    }

    /// Fits `image` into `frame`, clips it to the frame's inner bounds and keeps it
    /// synchronized with the frame from now on.
    ///
    /// An image previously attached to the same frame stays on the surface but is no longer
    /// synchronized. Returns `None`, changing nothing, when `frame` is not a collage frame,
    /// `image` was not imported, or the image cannot be placed because it or the frame has
    /// no area.
    ///
    /// # Example
    /// ```
    /// use collager::{find_template, Compositor, RenderSurface, Scene, Size};
    ///
    /// let mut compositor = Compositor::new(Scene::new(Size::new(800.0, 600.0)));
    /// let group = compositor.instantiate(find_template("Single").unwrap());
    /// let frame = compositor.collage(group).unwrap().cells[0].handle;
    /// let image = compositor.import_image_size(Size::new(1400.0, 500.0));
    ///
    /// let fit = compositor.attach_image(image, frame).unwrap();
    /// assert_eq!(fit.scale, 1.0);
    /// assert_eq!(compositor.surface().active(), Some(image));
    /// ```
    pub fn attach_image(&mut self, image: Handle, frame: Handle) -> Option<CoverFit> {
        let Some(frame_id) = self.frame(frame).map(|state| state.id) else {
            debug!("Cannot attach image to non-frame {:?}", frame);
            return None;
        };
        if self.image(image).is_none() {
            debug!("Cannot attach unknown image {:?}", image);
            return None;
        }

        let fit = self.place_image(image, frame)?;
        for previous in self.images_of(frame_id) {
            if previous == image {
                continue;
            }
            if let Some(Primitive::AttachedImage(state)) = self.primitives.get_mut(previous) {
                debug!("Detaching image {:?} from frame {}", previous, frame_id);
                state.parent_frame_id = None;
            }
        }
        if let Some(Primitive::AttachedImage(state)) = self.primitives.get_mut(image) {
            state.parent_frame_id = Some(frame_id);
        }
        if !self.surface.is_placed(image) {
            self.surface.add(image);
        }
        self.surface.set_active(Some(image));
        self.surface.request_redraw();
        debug!(
            "Attached image {:?} to frame {} at scale {}",
            image, frame_id, fit.scale
        );
        Some(fit)
    }

    /// Re-fits `image` to the current bounds of `frame` and updates its clip rectangle.
    pub(crate) fn place_image(&mut self, image: Handle, frame: Handle) -> Option<CoverFit> {
        let config = self.resolved_config(frame)?;
        let Some(frame_box) = self.surface.bounding_box(frame) else {
            warn!("Frame {:?} has no bounds on the surface", frame);
            return None;
        };
        let Some(Primitive::AttachedImage(state)) = self.primitives.get(image) else {
            return None;
        };
        let Some(fit) = cover_fit(state.natural_size, frame_box, config.border_width) else {
            warn!("Image {:?} has no area, not placing it", image);
            return None;
        };
        let clip = state.clip;
        trace!("Placing image {:?}: {:?}", image, fit);

        self.surface.set_props(
            image,
            &PropsPatch::default()
                .geometry(fit.image_rect)
                .scale(fit.scale),
        );

        let clip_rect = fit.inner.to_canvas_rect();
        let clip = match clip {
            Some(clip) => {
                self.surface.set_props(
                    clip,
                    &PropsPatch::default()
                        .geometry(clip_rect)
                        .corner_radius(config.roundness),
                );
                clip
            }
            None => {
                let clip = self
                    .surface
                    .create_rect(clip_rect, &clip_style(config.roundness));
                if let Some(Primitive::AttachedImage(state)) = self.primitives.get_mut(image) {
                    state.clip = Some(clip);
                }
                clip
            }
        };
        self.surface.clip_image(image, clip);
        Some(fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_template, Scene};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn compositor() -> Compositor<Scene> {
        Compositor::new(Scene::new(Size::new(800.0, 600.0)))
    }

    #[test]
    fn cover_fit_overflows_the_long_axis() {
        // 300x200 inner bounds behind a 1px border.
        let fit = cover_fit(
            Size::new(1000.0, 500.0),
            BoundingBox::new(99.5, 49.5, 301.0, 201.0),
            1.0,
        )
        .unwrap();
        assert_eq!(fit.scale, 0.4);
        assert_eq!(fit.inner, BoundingBox::new(100.0, 50.0, 300.0, 200.0));
        assert_eq!(fit.image_rect, CanvasRect::new(250.0, 150.0, 400.0, 200.0));
    }

    #[test]
    fn cover_fit_rejects_empty_images() {
        let frame = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(cover_fit(Size::new(0.0, 10.0), frame, 1.0), None);
        assert_eq!(cover_fit(Size::new(10.0, f64::NAN), frame, 1.0), None);
    }

    #[test]
    fn attach_clips_to_inner_bounds_in_canvas_space() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        let frame = compositor.collage(group).unwrap().cells[1].handle;
        let image = compositor.import_image_size(Size::new(1000.0, 500.0));

        let fit = compositor.attach_image(image, frame).unwrap();

        let frame_box = compositor.surface().bounding_box(frame).unwrap();
        assert_eq!(fit.inner, frame_box.inset(0.5));

        let clip = compositor.image(image).unwrap().clip.unwrap();
        let scene = compositor.surface();
        let clip_node = scene.node(clip).unwrap();
        assert_eq!(clip_node.style.stroke_width, 0.0);
        assert_eq!(clip_node.style.stroke, None);
        assert!(!clip_node.style.evented);
        assert_eq!(scene.absolute_rect(clip), Some(fit.inner.to_canvas_rect()));
        assert_eq!(scene.node(image).unwrap().clip, Some(clip));
        assert_eq!(scene.display_list(), &[group, image]);
    }

    #[test]
    fn attach_records_parent_frame() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Four Grid").unwrap());
        let frame = compositor.collage(group).unwrap().cells[3];
        let image = compositor.import_image_size(Size::new(64.0, 64.0));

        assert!(!compositor.image(image).unwrap().is_attached());
        compositor.attach_image(image, frame.handle);

        assert_eq!(
            compositor.image(image).unwrap().parent_frame_id,
            Some(frame.id)
        );
        assert_eq!(compositor.images_of(frame.id).as_slice(), &[image]);
        assert_eq!(compositor.active_collage(), Some(group));
    }

    #[test]
    fn reattaching_detaches_previous_image() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Single").unwrap());
        let frame = compositor.collage(group).unwrap().cells[0];
        let first = compositor.import_image_size(Size::new(100.0, 100.0));
        let second = compositor.import_image_size(Size::new(200.0, 100.0));

        compositor.attach_image(first, frame.handle);
        compositor.attach_image(second, frame.handle);

        assert_eq!(compositor.image(first).unwrap().parent_frame_id, None);
        assert!(compositor.surface().is_placed(first));
        assert_eq!(compositor.images_of(frame.id).as_slice(), &[second]);
    }

    #[test]
    fn failed_attach_keeps_previous_image() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Single").unwrap());
        let frame = compositor.collage(group).unwrap().cells[0];
        let good = compositor.import_image_size(Size::new(100.0, 100.0));
        let empty = compositor.import_image_size(Size::new(0.0, 0.0));
        compositor.attach_image(good, frame.handle);
        let redraws = compositor.surface().redraw_count();

        assert_eq!(compositor.attach_image(empty, frame.handle), None);

        assert_eq!(
            compositor.image(good).unwrap().parent_frame_id,
            Some(frame.id)
        );
        assert_eq!(compositor.image(empty).unwrap().parent_frame_id, None);
        assert_eq!(compositor.images_of(frame.id).as_slice(), &[good]);
        assert_eq!(compositor.surface().redraw_count(), redraws);
        assert_eq!(compositor.surface().active(), Some(good));
    }

    #[test]
    fn moving_an_image_between_frames() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Horizontal").unwrap());
        let cells = compositor.collage(group).unwrap().cells.clone();
        let image = compositor.import_image_size(Size::new(300.0, 300.0));

        compositor.attach_image(image, cells[0].handle);
        compositor.attach_image(image, cells[1].handle);

        assert!(compositor.images_of(cells[0].id).is_empty());
        assert_eq!(compositor.images_of(cells[1].id).as_slice(), &[image]);
        assert_eq!(compositor.surface().display_list().len(), 2);
    }

    #[test]
    fn attach_rejects_non_frames() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Single").unwrap());
        let image = compositor.import_image_size(Size::new(10.0, 10.0));
        let redraws = compositor.surface().redraw_count();

        assert_eq!(compositor.attach_image(image, group), None);
        assert_eq!(compositor.attach_image(group, group), None);
        assert_eq!(compositor.surface().redraw_count(), redraws);
        assert!(!compositor.surface().is_placed(image));
    }

    #[test]
    fn settings_change_refits_attached_image() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        let frame = compositor.collage(group).unwrap().cells[0].handle;
        let image = compositor.import_image_size(Size::new(500.0, 500.0));
        compositor.attach_image(image, frame);

        compositor.apply_settings(
            group,
            &crate::SettingsDelta::new().spacing(40.0).border_width(6.0).roundness(15.0),
        );

        let frame_box = compositor.surface().bounding_box(frame).unwrap();
        let inner = frame_box.inset(3.0);
        let clip = compositor.image(image).unwrap().clip.unwrap();
        let scene = compositor.surface();
        assert_eq!(scene.absolute_rect(clip), Some(inner.to_canvas_rect()));
        assert_eq!(scene.node(clip).unwrap().style.corner_radius, 15.0);
        let image_box = scene.bounding_box(image).unwrap();
        assert!(image_box.width >= inner.width - 1e-9);
        assert!(image_box.height >= inner.height - 1e-9);
    }

    #[test]
    fn frame_edit_refits_attached_image() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        let cells = compositor.collage(group).unwrap().cells.clone();
        let image = compositor.import_image_size(Size::new(500.0, 500.0));
        compositor.attach_image(image, cells[0].handle);
        let before = compositor.surface().bounding_box(cells[0].handle).unwrap();

        compositor.apply_settings(
            cells[0].handle,
            &crate::SettingsDelta::new().spacing(30.0).border_width(4.0),
        );

        let frame_box = compositor.surface().bounding_box(cells[0].handle).unwrap();
        assert!(frame_box.width < before.width);
        let inner = frame_box.inset(2.0);
        let clip = compositor.image(image).unwrap().clip.unwrap();
        let scene = compositor.surface();
        assert_eq!(scene.absolute_rect(clip), Some(inner.to_canvas_rect()));
        let image_box = scene.bounding_box(image).unwrap();
        assert!(image_box.width >= inner.width - 1e-9);
        assert!(image_box.height >= inner.height - 1e-9);
    }

    #[test]
    fn detached_image_is_left_alone() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Single").unwrap());
        let frame = compositor.collage(group).unwrap().cells[0].handle;
        let first = compositor.import_image_size(Size::new(100.0, 100.0));
        let second = compositor.import_image_size(Size::new(100.0, 100.0));
        compositor.attach_image(first, frame);
        compositor.attach_image(second, frame);
        let before = compositor.surface().bounding_box(first);

        compositor.apply_settings(group, &crate::SettingsDelta::new().spacing(100.0));

        assert_eq!(compositor.surface().bounding_box(first), before);
        assert_ne!(compositor.surface().bounding_box(second), before);
    }

    #[test]
    fn import_uses_decoded_dimensions() {
        let mut compositor = compositor();
        let decoded = DynamicImage::new_rgba8(12, 34);
        let image = compositor.import_image(&decoded);
        assert_eq!(
            compositor.image(image).unwrap().natural_size,
            Size::new(12.0, 34.0)
        );
    }

    proptest! {
        #[test]
        fn cover_fit_never_under_covers(
            image_w in 1.0f64..4000.0,
            image_h in 1.0f64..4000.0,
            frame_w in 0.0f64..2000.0,
            frame_h in 0.0f64..2000.0,
            stroke in 0.0f64..20.0,
        ) {
            let fit = cover_fit(
                Size::new(image_w, image_h),
                BoundingBox::new(10.0, 20.0, frame_w, frame_h),
                stroke,
            ).unwrap();
            let tolerance = 1e-9 * (1.0 + fit.inner.width.max(fit.inner.height));
            prop_assert!(fit.image_rect.width >= fit.inner.width - tolerance);
            prop_assert!(fit.image_rect.height >= fit.inner.height - tolerance);
            // One axis fits exactly.
            let exact_w = (fit.image_rect.width - fit.inner.width).abs() <= tolerance;
            let exact_h = (fit.image_rect.height - fit.inner.height).abs() <= tolerance;
            prop_assert!(exact_w || exact_h);
            prop_assert_eq!(fit.image_rect.center(), fit.inner.center());
        }
    }
}
