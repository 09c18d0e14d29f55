use super::*;
use crate::{CanvasRect, NormalizedCell, PropsPatch, RectStyle};

/// Group-local geometry of a cell: a pure function of the template cell, the live transform
/// and the resolved config.
pub(crate) fn frame_geometry(
    cell: &NormalizedCell,
    transform: &Transform,
    config: &CollageConfig,
) -> CanvasRect {
    transform.to_group_local(cell).shrink(config.spacing)
}

fn frame_patch(geometry: CanvasRect, config: &CollageConfig) -> PropsPatch {
    PropsPatch::default()
        .geometry(geometry)
        .corner_radius(config.roundness)
        .stroke(Some(config.border_color))
        .stroke_width(config.border_width)
        .dash(config.border_style.dash_pattern())
}

impl<S: RenderSurface> Compositor<S> {
    /// Applies a settings change to a collage group or to one of its frames.
    ///
    /// The scope follows from what `target` is: a group handle edits every frame and the
    /// group config, a frame handle edits that frame alone. Anything else is ignored.
    ///
    /// # Example
    /// ```
    /// use collager::{find_template, Compositor, Scene, SettingsDelta, Size};
    ///
    /// let mut compositor = Compositor::new(Scene::new(Size::new(800.0, 600.0)));
    /// let group = compositor.instantiate(find_template("Split Vertical").unwrap());
    /// let second = compositor.collage(group).unwrap().cells[1].handle;
    ///
    /// compositor.apply_settings(second, &SettingsDelta::new().roundness(12.0));
    /// assert_eq!(compositor.resolved_config(second).unwrap().roundness, 12.0);
    /// assert_eq!(compositor.collage(group).unwrap().config.roundness, 0.0);
    /// ```
    pub fn apply_settings(&mut self, target: Handle, delta: &SettingsDelta) {
        let (group, scope) = match self.primitives.get(target) {
            Some(Primitive::CollageGroup(_)) => (target, Scope::Group),
            Some(Primitive::Frame(frame)) => (frame.group, Scope::Frame(target)),
            Some(other) => {
                debug!("Ignoring settings for {} {:?}", other.kind(), target);
                return;
            }
            None => {
                debug!("Ignoring settings for unknown primitive {:?}", target);
                return;
            }
        };
        self.apply_settings_scoped(group, delta, scope);
    }

    /// Applies a settings change to `group` within `scope`.
    ///
    /// Every affected frame is re-derived from the group's original template and the live
    /// canvas size, never from its current rectangle, so repeated edits cannot drift. Images
    /// attached to an affected frame are re-fitted to its new bounds.
    ///
    /// A group-scope change merges into the group config and clears, in every frame's
    /// overrides, the fields it names. A frame-scope change merges into that frame's overrides
    /// only; background color is group-wide and ignored there.
    pub fn apply_settings_scoped(&mut self, group: Handle, delta: &SettingsDelta, scope: Scope) {
        let canvas = self.surface.canvas_size();
        let Some(Primitive::CollageGroup(collage)) = self.primitives.get_mut(group) else {
            debug!("Ignoring settings for {:?}: no collage metadata", group);
            return;
        };
        debug!("Applying {:?} to {:?} in scope {:?}", delta, group, scope);

        let targets: SmallVecCells<usize> = match scope {
            Scope::Group => {
                collage.config = collage.config.merge(delta);
                (0..collage.cells.len()).collect()
            }
            Scope::Frame(frame) => match collage.frame_index(frame) {
                Some(index) => SmallVecCells::from_elem(index, 1),
                None => {
                    warn!("Frame {:?} is not a cell of collage {:?}, skipping", frame, group);
                    return;
                }
            },
        };

        let transform = collage.layout.transform(canvas);
        let config = collage.config.clone();
        let work: SmallVecCells<(FrameRef, NormalizedCell)> = targets
            .iter()
            .filter_map(|&index| {
                let frame = collage.cells.get(index)?;
                let cell = collage.original_template.cells.get(index)?;
                Some((*frame, *cell))
            })
            .collect();

        let mut frame_delta = delta.clone();
        if let Scope::Frame(_) = scope {
            if frame_delta.background_color.take().is_some() {
                debug!("Background color applies to whole collages only");
            }
        }

        for (frame, cell) in work {
            let Some(Primitive::Frame(state)) = self.primitives.get_mut(frame.handle) else {
                warn!("Frame {} of collage {:?} has no metadata, skipping", frame.id, group);
                continue;
            };
            match scope {
                Scope::Group => state.overrides.clear_fields_set_in(&frame_delta),
                Scope::Frame(_) => state.overrides.merge_from(&frame_delta),
            }
            let resolved = config.merge(&state.overrides);
            let geometry = frame_geometry(&cell, &transform, &resolved);
            trace!("Frame {} -> {:?}", frame.id, geometry);
            self.surface
                .set_props(frame.handle, &frame_patch(geometry, &resolved));
            self.resync_images(frame);
        }

        if scope == Scope::Group {
            self.sync_background(group, &transform, config.background_color);
        }
        self.surface.request_redraw();
    }

    /// Creates or refreshes the backing rectangle that shows the background color.
    fn sync_background(&mut self, group: Handle, transform: &Transform, color: Option<Color>) {
        let Some(color) = color else {
            return;
        };
        let Some(Primitive::CollageGroup(collage)) = self.primitives.get(group) else {
            return;
        };
        let content = transform.content_rect();
        let geometry = CanvasRect::new(0.0, 0.0, content.width, content.height);

        match collage.background {
            Some(background) => {
                self.surface.set_props(
                    background,
                    &PropsPatch::default().geometry(geometry).fill(Some(color)),
                );
            }
            None => {
                let background = self.surface.create_rect(
                    geometry,
                    &RectStyle {
                        fill: Some(color),
                        selectable: false,
                        evented: false,
                        ..RectStyle::default()
                    },
                );
                self.surface.insert_child(group, background, 0);
                self.primitives.insert(background, Primitive::PlainShape);
                if let Some(Primitive::CollageGroup(collage)) = self.primitives.get_mut(group) {
                    collage.background = Some(background);
                }
                debug!("Added background {:?} to collage {:?}", background, group);
            }
        }
    }

    /// Re-fits every image synchronized with `frame` to the frame's current bounds.
    fn resync_images(&mut self, frame: FrameRef) {
        let images = self.images_of(frame.id);
        if images.is_empty() {
            trace!("No images attached to frame {}", frame.id);
            return;
        }
        for image in images {
            self.place_image(image, frame.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_template, Point, Scene};
    use pretty_assertions::assert_eq;

    fn compositor() -> Compositor<Scene> {
        Compositor::new(Scene::new(Size::new(800.0, 600.0)))
    }

    fn frame_rects(compositor: &Compositor<Scene>, group: Handle) -> Vec<CanvasRect> {
        compositor
            .collage(group)
            .unwrap()
            .cells
            .iter()
            .map(|frame| compositor.surface().node(frame.handle).unwrap().geometry)
            .collect()
    }

    #[test]
    fn spacing_shrinks_around_the_same_center() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Four Grid").unwrap());
        let before = frame_rects(&compositor, group);

        compositor.apply_settings(group, &SettingsDelta::new().spacing(20.0));
        let after = frame_rects(&compositor, group);

        for (b, a) in before.iter().zip(&after) {
            assert!((b.center_x - a.center_x).abs() < 1e-9);
            assert!((b.center_y - a.center_y).abs() < 1e-9);
            assert!((b.width - 20.0 - a.width).abs() < 1e-9);
            assert!((b.height - 20.0 - a.height).abs() < 1e-9);
        }
    }

    #[test]
    fn frames_are_positioned_relative_to_group_origin() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        compositor.apply_settings(group, &SettingsDelta::new());
        let rects = frame_rects(&compositor, group);
        // (97.5 - 200) * 1.75 and (302.5 - 200) * 1.75
        assert!((rects[0].center_x + 179.375).abs() < 1e-9);
        assert!((rects[1].center_x - 179.375).abs() < 1e-9);
        assert_eq!(rects[0].center_y, 0.0);
    }

    #[test]
    fn border_style_and_roundness_reach_every_frame() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Three H-Split").unwrap());
        compositor.apply_settings(
            group,
            &SettingsDelta::new()
                .roundness(6.0)
                .border_width(4.0)
                .border_color(Color::rgb(255, 0, 0))
                .border_style(BorderStyle::Dotted),
        );
        for frame in compositor.collage(group).unwrap().cells.clone() {
            let style = &compositor.surface().node(frame.handle).unwrap().style;
            assert_eq!(style.corner_radius, 6.0);
            assert_eq!(style.stroke_width, 4.0);
            assert_eq!(style.stroke, Some(Color::rgb(255, 0, 0)));
            assert_eq!(style.dash.as_slice(), &[2.0, 4.0]);
        }
    }

    #[test]
    fn frame_override_survives_unrelated_group_edit() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        let first = compositor.collage(group).unwrap().cells[0].handle;

        compositor.apply_settings(first, &SettingsDelta::new().roundness(9.0).spacing(30.0));
        compositor.apply_settings(group, &SettingsDelta::new().spacing(10.0));

        let resolved = compositor.resolved_config(first).unwrap();
        assert_eq!(resolved.roundness, 9.0);
        assert_eq!(resolved.spacing, 10.0);
        assert_eq!(
            compositor.frame(first).unwrap().overrides,
            SettingsDelta::new().roundness(9.0)
        );
    }

    #[test]
    fn reset_frame_follows_group_again() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        compositor.apply_settings(group, &SettingsDelta::new().spacing(10.0));
        let baseline = frame_rects(&compositor, group);
        let first = compositor.collage(group).unwrap().cells[0].handle;

        compositor.apply_settings(first, &SettingsDelta::new().spacing(80.0));
        assert_ne!(frame_rects(&compositor, group)[0], baseline[0]);

        compositor.reset_frame(first);
        assert_eq!(frame_rects(&compositor, group), baseline);
        assert!(compositor.frame(first).unwrap().overrides.is_empty());
    }

    #[test]
    fn background_is_a_non_evented_backing_rect() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Split Vertical").unwrap());
        compositor.apply_settings(
            group,
            &SettingsDelta::new()
                .spacing(20.0)
                .background_color(Color::rgb(0, 0, 255)),
        );

        let background = compositor.collage(group).unwrap().background.unwrap();
        let scene = compositor.surface();
        let node = scene.node(group).unwrap();
        assert_eq!(node.children[0], background);
        assert_eq!(node.children.len(), 3);
        let style = &scene.node(background).unwrap().style;
        assert_eq!(style.fill, Some(Color::rgb(0, 0, 255)));
        assert!(!style.evented);

        let bounds = scene.bounding_box(background).unwrap();
        assert_eq!((bounds.width, bounds.height), (700.0, 500.0));

        // The gap between the two cells hits the group, not the background.
        assert_eq!(scene.target_at(Point::new(400.0, 300.0)), Some(group));
        // Inside a cell, the cell is targeted.
        let first = compositor.collage(group).unwrap().cells[0].handle;
        assert_eq!(scene.target_at(Point::new(200.0, 300.0)), Some(first));
    }

    #[test]
    fn background_is_reused_on_later_edits() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Four Grid").unwrap());
        compositor.apply_settings(group, &SettingsDelta::new().background_color(Color::rgb(1, 1, 1)));
        compositor.apply_settings(group, &SettingsDelta::new().background_color(Color::rgb(2, 2, 2)));

        let collage = compositor.collage(group).unwrap();
        let background = collage.background.unwrap();
        let node = compositor.surface().node(group).unwrap();
        assert_eq!(node.children.len(), collage.cells.len() + 1);
        assert_eq!(
            compositor.surface().node(background).unwrap().style.fill,
            Some(Color::rgb(2, 2, 2))
        );
    }

    #[test]
    fn background_is_ignored_for_single_frame_edits() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Four Grid").unwrap());
        let frame = compositor.collage(group).unwrap().cells[2].handle;
        compositor.apply_settings(frame, &SettingsDelta::new().background_color(Color::rgb(9, 9, 9)));

        assert!(compositor.collage(group).unwrap().background.is_none());
        assert!(compositor.frame(frame).unwrap().overrides.is_empty());
    }

    #[test]
    fn non_collage_targets_are_ignored() {
        let mut compositor = compositor();
        let shape = compositor
            .surface_mut()
            .create_rect(CanvasRect::new(10.0, 10.0, 5.0, 5.0), &RectStyle::default());
        compositor.register_shape(shape);
        let redraws = compositor.surface().redraw_count();

        compositor.apply_settings(shape, &SettingsDelta::new().spacing(10.0));
        compositor.apply_settings_scoped(shape, &SettingsDelta::new().spacing(10.0), Scope::Group);

        assert_eq!(compositor.surface().redraw_count(), redraws);
        assert_eq!(
            compositor.surface().node(shape).unwrap().geometry,
            CanvasRect::new(10.0, 10.0, 5.0, 5.0)
        );
    }

    #[test]
    fn foreign_frame_scope_is_skipped() {
        let mut compositor = compositor();
        let a = compositor.instantiate(find_template("Split Vertical").unwrap());
        let b = compositor.instantiate(find_template("Split Vertical").unwrap());
        let foreign = compositor.collage(b).unwrap().cells[0].handle;
        let before = frame_rects(&compositor, a);

        compositor.apply_settings_scoped(a, &SettingsDelta::new().spacing(40.0), Scope::Frame(foreign));

        assert_eq!(frame_rects(&compositor, a), before);
        assert!(compositor.frame(foreign).unwrap().overrides.is_empty());
    }
}
