use super::{ElementId, UiTree};
use crate::error::LayoutError;
use crate::ui::{FrameInput, InputTracker};

/// Owns a tree and drives it one frame at a time.
#[derive(Default)]
pub struct Viewport {
    tree: UiTree,
    input: InputTracker,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_tree(UiTree::new(width, height))
    }

    pub fn with_tree(tree: UiTree) -> Self {
        Self {
            tree,
            input: InputTracker::default(),
        }
    }

    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.tree.set_viewport_size(width, height);
    }

    /// One tick: settle dirty layout, poll pointer and keys, then resolve
    /// the arbitration group.
    ///
    /// A layout that failed to converge is reported after input has still
    /// been processed against the best-effort geometry.
    pub fn update(&mut self, frame: FrameInput) -> Result<(), LayoutError> {
        let _span = tracing::trace_span!("viewport_update", time = frame.time).entered();
        self.input.advance(frame, self.tree.viewport_size());
        let settled = self.tree.clean_dirty_roots();

        for id in self.interactive_elements() {
            self.tree.poll_element(id, &self.input);
        }
        self.tree.deliver_keys(&self.input);
        self.tree.resolve_group();
        settled
    }

    /// Active elements that listen for anything, in pre-order per root.
    fn interactive_elements(&self) -> Vec<ElementId> {
        self.tree
            .roots()
            .iter()
            .flat_map(|root| self.tree.descendants(*root))
            .filter(|id| {
                self.tree
                    .element(*id)
                    .is_some_and(|element| !element.events.is_empty() || element.is_scrollable())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use crate::{Anchor, ElementId, EventKind, FrameInput, KeyInput, MouseButtons};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(ElementId, EventKind)>>>;

    fn listen(viewport: &mut Viewport, id: ElementId, kinds: &[EventKind], log: &Log) {
        for kind in kinds {
            let log = log.clone();
            viewport.tree_mut().add_event(id, *kind, move |event| {
                log.borrow_mut().push((event.target, event.kind));
            });
        }
    }

    fn kinds_for(log: &Log, id: ElementId) -> Vec<EventKind> {
        log.borrow()
            .iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, kind)| *kind)
            .collect()
    }

    /// 200x200 window with a centred 100x100 panel.
    fn single_button() -> (Viewport, ElementId) {
        let mut viewport = Viewport::new(200.0, 200.0);
        let tree = viewport.tree_mut();
        let button = tree.create_panel();
        tree.scale(button, 100.0, 100.0);
        tree.anchor_to(button, Anchor::Center);
        (viewport, button)
    }

    fn click(viewport: &mut Viewport, time: f64, x: f32, y: f32) {
        viewport
            .update(FrameInput::at(time, x, y).with_buttons(MouseButtons::LEFT))
            .unwrap();
        viewport.update(FrameInput::at(time + 0.05, x, y)).unwrap();
    }

    #[test]
    fn hover_and_click_sequence() {
        let (mut viewport, button) = single_button();
        let log = Log::default();
        use EventKind::*;
        listen(&mut viewport, button, &[Enter, Exit, Down, Up, Click, Miss], &log);

        viewport.update(FrameInput::at(0.0, 5.0, 5.0)).unwrap();
        assert!(log.borrow().is_empty());
        click(&mut viewport, 0.1, 100.0, 100.0);
        let hovered = |viewport: &Viewport| {
            viewport.tree().element(button).unwrap().interaction().is_hovered()
        };
        assert!(hovered(&viewport));
        viewport.update(FrameInput::at(0.3, 5.0, 5.0)).unwrap();
        assert!(!hovered(&viewport));
        assert_eq!(kinds_for(&log, button), vec![Enter, Down, Up, Click, Exit]);
    }

    #[test]
    fn press_outside_is_a_miss() {
        let (mut viewport, button) = single_button();
        let log = Log::default();
        listen(&mut viewport, button, &[EventKind::Miss, EventKind::Click], &log);
        click(&mut viewport, 0.0, 5.0, 5.0);
        assert_eq!(kinds_for(&log, button), vec![EventKind::Miss]);
    }

    #[test]
    fn grouped_overlap_clicks_only_the_top_element() {
        let mut viewport = Viewport::new(200.0, 200.0);
        let tree = viewport.tree_mut();
        let ids = [0.0, 2.0].map(|depth| {
            let id = tree.create_panel();
            tree.scale(id, 100.0, 100.0);
            tree.anchor_to(id, Anchor::Center);
            tree.set_z(id, depth);
            tree.set_group(id, true);
            id
        });
        let log = Log::default();
        for id in ids {
            listen(&mut viewport, id, &[EventKind::Enter, EventKind::Click], &log);
        }
        click(&mut viewport, 0.0, 100.0, 100.0);
        assert_eq!(kinds_for(&log, ids[0]), vec![EventKind::Enter]);
        assert_eq!(kinds_for(&log, ids[1]), vec![EventKind::Enter, EventKind::Click]);
    }

    #[test]
    fn ungrouped_overlap_clicks_both() {
        let mut viewport = Viewport::new(200.0, 200.0);
        let tree = viewport.tree_mut();
        let ids = [0.0, 2.0].map(|depth| {
            let id = tree.create_panel();
            tree.scale(id, 100.0, 100.0);
            tree.anchor_to(id, Anchor::Center);
            tree.set_z(id, depth);
            id
        });
        let log = Log::default();
        for id in ids {
            listen(&mut viewport, id, &[EventKind::Click], &log);
        }
        click(&mut viewport, 0.0, 100.0, 100.0);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn clipped_region_is_not_hoverable() {
        let mut viewport = Viewport::new(200.0, 200.0);
        let tree = viewport.tree_mut();
        let frame = tree.create_panel();
        tree.scale(frame, 40.0, 40.0);
        let wide = tree.create_panel();
        tree.add_child(frame, wide).unwrap();
        tree.scale(wide, 150.0, 20.0);
        let log = Log::default();
        listen(&mut viewport, wide, &[EventKind::Enter], &log);

        // Inside `wide` but right of the 40px frame.
        viewport.update(FrameInput::at(0.0, 100.0, 10.0)).unwrap();
        assert!(log.borrow().is_empty());
        viewport.update(FrameInput::at(0.1, 20.0, 10.0)).unwrap();
        assert_eq!(kinds_for(&log, wide), vec![EventKind::Enter]);
    }

    #[test]
    fn wheel_scrolls_panel_under_cursor() {
        let mut viewport = Viewport::new(200.0, 200.0);
        let tree = viewport.tree_mut();
        let list = tree.create_panel();
        tree.scale(list, 50.0, 50.0);
        let tall = tree.create_panel();
        tree.add_child(list, tall).unwrap();
        tree.scale(tall, 50.0, 200.0);
        viewport.update(FrameInput::at(0.0, 10.0, 10.0)).unwrap();

        viewport
            .update(FrameInput::at(0.1, 10.0, 10.0).with_scroll(0.0, -1.0))
            .unwrap();
        let scroll = |viewport: &Viewport| {
            viewport.tree().element(list).unwrap().panel().unwrap().scroll()
        };
        let speed = viewport.tree().config().default_scroll_speed;
        assert_eq!(scroll(&viewport), Vec2::new(0.0, speed));

        viewport.update(FrameInput::at(0.2, 10.0, 10.0)).unwrap();
        let top = viewport.tree().world_bounds(tall).unwrap().max.y;
        assert_eq!(top, 100.0 + speed);
    }

    #[test]
    fn drag_suppresses_click() {
        let (mut viewport, button) = single_button();
        let log = Log::default();
        use EventKind::*;
        listen(&mut viewport, button, &[DragStart, DragEnd, Click], &log);
        viewport
            .update(FrameInput::at(0.0, 100.0, 100.0).with_buttons(MouseButtons::LEFT))
            .unwrap();
        viewport
            .update(FrameInput::at(0.1, 130.0, 100.0).with_buttons(MouseButtons::LEFT))
            .unwrap();
        viewport.update(FrameInput::at(0.2, 130.0, 100.0)).unwrap();
        assert_eq!(kinds_for(&log, button), vec![DragStart, DragEnd]);
    }

    #[test]
    fn quick_second_click_is_a_double_click() {
        let (mut viewport, button) = single_button();
        let log = Log::default();
        listen(&mut viewport, button, &[EventKind::Click, EventKind::DoubleClick], &log);
        click(&mut viewport, 0.0, 100.0, 100.0);
        click(&mut viewport, 0.1, 100.0, 100.0);
        click(&mut viewport, 5.0, 100.0, 100.0);
        assert_eq!(
            kinds_for(&log, button),
            vec![
                EventKind::Click,
                EventKind::Click,
                EventKind::DoubleClick,
                EventKind::Click,
            ]
        );
    }

    #[test]
    fn keys_go_to_focus() {
        let (mut viewport, button) = single_button();
        let keys = Rc::new(RefCell::new(Vec::new()));
        let sink = keys.clone();
        viewport.tree_mut().add_event(button, EventKind::KeyDown, move |event| {
            sink.borrow_mut().extend(event.payload.key.clone());
        });
        viewport
            .update(FrameInput::at(0.0, 0.0, 0.0).with_key(KeyInput::down("a")))
            .unwrap();
        assert!(keys.borrow().is_empty());

        viewport.tree_mut().set_focus(Some(button));
        viewport
            .update(FrameInput::at(0.1, 0.0, 0.0).with_key(KeyInput::down("b")))
            .unwrap();
        assert_eq!(*keys.borrow(), vec!["b"]);
    }

    #[test]
    fn resize_relayouts_stretched_roots() {
        let mut viewport = Viewport::new(200.0, 100.0);
        let root = viewport.tree_mut().create_panel();
        viewport.tree_mut().anchor_to(root, Anchor::StretchCenter);
        viewport.update(FrameInput::default()).unwrap();
        assert_eq!(
            viewport.tree().world_bounds(root).unwrap().size(),
            Vec2::new(200.0, 100.0)
        );
        viewport.set_size(300.0, 50.0);
        viewport.update(FrameInput::default()).unwrap();
        assert_eq!(
            viewport.tree().world_bounds(root).unwrap().size(),
            Vec2::new(300.0, 50.0)
        );
    }
}
