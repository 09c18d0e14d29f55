use super::*;
use crate::{GroupOptions, RectStyle, DEFAULT_FRAME_FILL};

/// Style of a freshly created frame under `config`.
pub(crate) fn frame_style(config: &CollageConfig) -> RectStyle {
    RectStyle {
        fill: Some(DEFAULT_FRAME_FILL),
        stroke: Some(config.border_color),
        stroke_width: config.border_width,
        stroke_uniform: true,
        dash: config.border_style.dash_pattern(),
        corner_radius: config.roundness,
        selectable: true,
        evented: true,
    }
}

impl<S: RenderSurface> Compositor<S> {
    /// Builds a collage from `template` on the current canvas and places it on the surface.
    ///
    /// The new group is centered, becomes the active selection, and keeps a deep copy of the
    /// template as its layout baseline. An empty template yields an empty group.
    ///
    /// # Example
    /// ```
    /// use collager::{find_template, Compositor, RenderSurface, Scene, Size};
    ///
    /// let mut compositor = Compositor::new(Scene::new(Size::new(800.0, 600.0)));
    /// let group = compositor.instantiate(find_template("Split Vertical").unwrap());
    ///
    /// assert_eq!(compositor.surface().active(), Some(group));
    /// let first = compositor.collage(group).unwrap().cells[0].handle;
    /// let bounds = compositor.surface().bounding_box(first).unwrap();
    /// assert_eq!(bounds.height, 501.0); // 500 plus the 1px border
    /// ```
    pub fn instantiate(&mut self, template: &GridTemplate) -> Handle {
        let canvas = self.surface.canvas_size();
        let layout = self.layout;
        let transform = layout.transform(canvas);
        let config = CollageConfig::default();
        let style = frame_style(&config);
        debug!(
            "Instantiating template {} on canvas {} with {:?}",
            template, canvas, layout
        );

        let cells: SmallVecCells<FrameRef> = template
            .cells
            .iter()
            .map(|cell| {
                let rect = transform.to_canvas_rect(cell).shrink(config.spacing);
                trace!("Cell {:?} -> {:?}", cell, rect);
                FrameRef {
                    handle: self.surface.create_rect(rect, &style),
                    id: FrameId::new(),
                }
            })
            .collect();

        let children: SmallVecCells<Handle> = cells.iter().map(|frame| frame.handle).collect();
        let group = self.surface.create_group(
            &children,
            &GroupOptions {
                origin: transform.origin(),
                sub_target_check: true,
            },
        );

        for (index, frame) in cells.iter().enumerate() {
            self.primitives.insert(
                frame.handle,
                Primitive::Frame(Frame {
                    id: frame.id,
                    group,
                    index,
                    overrides: SettingsDelta::default(),
                }),
            );
        }
        self.primitives.insert(
            group,
            Primitive::CollageGroup(CollageGroup {
                cells,
                original_template: template.snapshot(),
                config,
                base_scale: transform.scale(),
                layout,
                background: None,
            }),
        );

        self.surface.add(group);
        self.surface.center(group);
        self.surface.set_active(Some(group));
        self.surface.request_redraw();
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_template, Scene, CATALOG};
    use pretty_assertions::assert_eq;

    fn compositor() -> Compositor<Scene> {
        Compositor::new(Scene::new(Size::new(800.0, 600.0)))
    }

    #[test]
    fn frames_follow_template_order() {
        let mut compositor = compositor();
        let template = find_template("Six Grid").unwrap();
        let group = compositor.instantiate(template);
        let collage = compositor.collage(group).unwrap();

        assert_eq!(collage.cells.len(), template.cells.len());
        for (index, frame_ref) in collage.cells.iter().enumerate() {
            let frame = compositor.frame(frame_ref.handle).unwrap();
            assert_eq!(frame.index, index);
            assert_eq!(frame.group, group);
            assert_eq!(frame.id, frame_ref.id);
        }
    }

    #[test]
    fn frame_ids_are_unique() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Six Grid").unwrap());
        let collage = compositor.collage(group).unwrap();
        for (i, a) in collage.cells.iter().enumerate() {
            for b in collage.cells.iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn records_template_snapshot_and_scale() {
        let mut compositor = compositor();
        let group = compositor.instantiate(&CATALOG[3]);
        let collage = compositor.collage(group).unwrap();
        assert_eq!(collage.original_template, CATALOG[3]);
        assert!(matches!(
            collage.original_template.cells,
            std::borrow::Cow::Owned(_)
        ));
        assert_eq!(collage.base_scale, Scale { x: 1.75, y: 1.25 });
        assert_eq!(collage.config, CollageConfig::default());
    }

    #[test]
    fn frames_get_default_style() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Single").unwrap());
        let frame = compositor.collage(group).unwrap().cells[0].handle;
        let node = compositor.surface().node(frame).unwrap();
        assert_eq!(node.style.fill, Some(DEFAULT_FRAME_FILL));
        assert_eq!(node.style.stroke_width, 1.0);
        assert!(node.style.stroke_uniform);
        assert!(node.style.selectable);
    }

    #[test]
    fn group_is_placed_centered_and_active() {
        let mut compositor = compositor();
        let group = compositor.instantiate(find_template("Four Grid").unwrap());
        let scene = compositor.surface();
        assert_eq!(scene.display_list(), &[group]);
        assert_eq!(scene.active(), Some(group));
        assert_eq!(scene.redraw_count(), 1);
        let bounds = scene.bounding_box(group).unwrap();
        assert!((bounds.center().x - 400.0).abs() < 1e-9);
        assert!((bounds.center().y - 300.0).abs() < 1e-9);
        assert!(scene.node(group).unwrap().sub_target_check());
    }

    #[test]
    fn empty_template_yields_empty_group() {
        let mut compositor = compositor();
        let group = compositor.instantiate(&GridTemplate::new("Empty", Vec::new()));
        let collage = compositor.collage(group).unwrap();
        assert!(collage.cells.is_empty());
        assert!(compositor.surface().node(group).unwrap().children.is_empty());
    }
}
