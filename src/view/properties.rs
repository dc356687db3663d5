use super::{DirtyKind, ElementId, LabelData, PanelData, UiTree, approx_eq, vec2_approx_eq};
use crate::style::{
    Anchor, ContentFit, Edges, Layout, LayoutFn, LayoutScope, Overflow, Positioning,
    ScrollDirection,
};
use glam::Vec2;
use std::rc::Rc;

// Setters used by style application. Each is a no-op when the value is
// (approximately) unchanged, otherwise it tags the element.
impl UiTree {
    pub fn layout(&self, id: ElementId) -> Option<&Layout> {
        self.elements.get(id).map(|element| &element.layout)
    }

    fn update_layout(
        &mut self,
        id: ElementId,
        kind: DirtyKind,
        update: impl FnOnce(&mut Layout) -> bool,
    ) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if update(&mut element.layout) {
            self.set_dirty(id, kind);
        }
    }

    fn update_panel(
        &mut self,
        id: ElementId,
        kind: DirtyKind,
        update: impl FnOnce(&mut PanelData) -> bool,
    ) {
        let Some(panel) = self.elements.get_mut(id).and_then(|e| e.panel_mut()) else {
            return;
        };
        if update(panel) {
            self.set_dirty(id, kind);
        }
    }

    fn update_label(
        &mut self,
        id: ElementId,
        kind: DirtyKind,
        update: impl FnOnce(&mut LabelData) -> bool,
    ) {
        let Some(label) = self.elements.get_mut(id).and_then(|e| e.label_mut()) else {
            return;
        };
        if update(label) {
            self.set_dirty(id, kind);
        }
    }

    pub fn set_offset(&mut self, id: ElementId, x: f32, y: f32) {
        let offset = Vec2::new(x, y);
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if vec2_approx_eq(layout.offset, offset) {
                return false;
            }
            layout.offset = offset;
            true
        });
    }

    pub fn set_inner_offset(&mut self, id: ElementId, inner: Edges) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.inner_offset.approx_eq(&inner) {
                return false;
            }
            layout.inner_offset = inner;
            true
        });
    }

    pub fn set_local_inner_offset(&mut self, id: ElementId, inner: Edges) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.local_inner_offset.approx_eq(&inner) {
                return false;
            }
            layout.local_inner_offset = inner;
            true
        });
    }

    pub fn set_stretch(&mut self, id: ElementId, stretch: Edges) {
        self.update_layout(id, DirtyKind::Resize, |layout| {
            if layout.stretch.approx_eq(&stretch) {
                return false;
            }
            layout.stretch = stretch;
            true
        });
    }

    /// Stretch margins as fractions of the current parent (or viewport) size.
    pub fn set_stretch_ratio(&mut self, id: ElementId, ratio: Edges) {
        let frame = match self.parent(id).and_then(|parent| self.elements.get(parent)) {
            Some(parent) => parent.transform.scale,
            None => self.viewport_size,
        };
        let stretch = Edges::new(
            frame.x * ratio.left,
            frame.y * ratio.top,
            frame.x * ratio.right,
            frame.y * ratio.bottom,
        );
        self.set_stretch(id, stretch);
    }

    pub fn set_inset(&mut self, id: ElementId, inset: Edges) {
        self.update_layout(id, DirtyKind::Resize, |layout| {
            if layout.inset.approx_eq(&inset) {
                return false;
            }
            layout.inset = inset;
            true
        });
    }

    /// Keeps the content size: the pixel size grows or shrinks by the
    /// padding delta.
    pub fn set_padding(&mut self, id: ElementId, padding: Edges) {
        self.update_layout(id, DirtyKind::Resize, |layout| {
            if layout.padding.approx_eq(&padding) {
                return false;
            }
            let delta = Vec2::new(
                padding.horizontal() - layout.padding.horizontal(),
                padding.vertical() - layout.padding.vertical(),
            );
            layout.padding = padding;
            layout.pixel_size = (layout.pixel_size + delta).max(Vec2::ZERO);
            true
        });
    }

    pub fn set_margin(&mut self, id: ElementId, margin: Edges) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.margin.approx_eq(&margin) {
                return false;
            }
            layout.margin = margin;
            true
        });
    }

    pub fn set_border(&mut self, id: ElementId, border: Edges) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.border.approx_eq(&border) {
                return false;
            }
            layout.border = border;
            true
        });
    }

    /// Sets the content size; padding is added on top.
    pub fn scale(&mut self, id: ElementId, width: f32, height: f32) {
        self.update_layout(id, DirtyKind::Resize, |layout| {
            let size = Vec2::new(
                width + layout.padding.horizontal(),
                height + layout.padding.vertical(),
            )
            .max(Vec2::ZERO);
            if vec2_approx_eq(layout.pixel_size, size) {
                return false;
            }
            layout.pixel_size = size;
            true
        });
    }

    pub fn scale_width(&mut self, id: ElementId, width: f32) {
        let Some(height) = self.layout(id).map(|layout| layout.content_size().y) else {
            return;
        };
        self.scale(id, width, height);
    }

    pub fn scale_height(&mut self, id: ElementId, height: f32) {
        let Some(width) = self.layout(id).map(|layout| layout.content_size().x) else {
            return;
        };
        self.scale(id, width, height);
    }

    pub fn set_z(&mut self, id: ElementId, z: f32) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if approx_eq(layout.z, z) {
                return false;
            }
            layout.z = z;
            true
        });
    }

    pub fn anchor_to(&mut self, id: ElementId, anchor: Anchor) {
        self.update_layout(id, DirtyKind::Generated, |layout| {
            if layout.anchor == anchor {
                return false;
            }
            layout.anchor = anchor;
            true
        });
    }

    pub fn set_positioning(&mut self, id: ElementId, positioning: Positioning) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.positioning == positioning {
                return false;
            }
            layout.positioning = positioning;
            // The parent rewrites this on its next flow.
            layout.row_offset = Vec2::ZERO;
            true
        });
    }

    pub fn add_layout_function(
        &mut self,
        id: ElementId,
        function: impl Fn(&mut LayoutScope<'_>) + 'static,
    ) {
        let function: LayoutFn = Rc::new(function);
        self.update_layout(id, DirtyKind::Layout, |layout| {
            layout.functions.push(function);
            true
        });
    }

    pub fn clear_layout_functions(&mut self, id: ElementId) {
        self.update_layout(id, DirtyKind::Layout, |layout| {
            if layout.functions.is_empty() {
                return false;
            }
            layout.functions.clear();
            true
        });
    }

    pub fn set_content_fit(&mut self, id: ElementId, fit: ContentFit) {
        self.update_panel(id, DirtyKind::Resize, |panel| {
            if panel.content_fit == fit {
                return false;
            }
            panel.content_fit = fit;
            true
        });
    }

    pub fn set_overflow(&mut self, id: ElementId, overflow: Overflow) {
        self.update_panel(id, DirtyKind::Generated, |panel| {
            if panel.overflow == overflow {
                return false;
            }
            panel.overflow = overflow;
            true
        });
    }

    pub fn set_scroll_direction(&mut self, id: ElementId, direction: ScrollDirection) {
        self.update_panel(id, DirtyKind::Layout, |panel| {
            if panel.scroll_direction == direction {
                return false;
            }
            panel.scroll_direction = direction;
            true
        });
    }

    pub fn set_scroll_speed(&mut self, id: ElementId, speed: f32) {
        if let Some(panel) = self.elements.get_mut(id).and_then(|e| e.panel_mut()) {
            panel.scroll_speed = speed;
        }
    }

    /// Requests an absolute scroll position, clamped once the panel next flows.
    pub fn scroll_to(&mut self, id: ElementId, x: Option<f32>, y: Option<f32>) {
        self.update_panel(id, DirtyKind::Layout, |panel| {
            if x.is_none() && y.is_none() {
                return false;
            }
            if x.is_some() {
                panel.requested_scroll_x = x;
            }
            if y.is_some() {
                panel.requested_scroll_y = y;
            }
            true
        });
    }

    /// Relative scroll, as produced by the wheel.
    pub(crate) fn scroll_by(&mut self, id: ElementId, wheel: Vec2) -> bool {
        let Some(panel) = self.elements.get_mut(id).and_then(|e| e.panel_mut()) else {
            return false;
        };
        if !panel.is_scrollable() {
            return false;
        }
        let mut next = panel.scroll;
        if panel.scrolls_x() {
            next.x = (next.x - wheel.x * panel.scroll_speed).clamp(0.0, panel.max_scroll.x);
        }
        if panel.scrolls_y() {
            next.y = (next.y - wheel.y * panel.scroll_speed).clamp(0.0, panel.max_scroll.y);
        }
        if vec2_approx_eq(next, panel.scroll) {
            return false;
        }
        panel.scroll = next;
        self.set_dirty(id, DirtyKind::Layout);
        true
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        let text = text.into();
        self.update_label(id, DirtyKind::Generated, |label| {
            if label.text == text {
                return false;
            }
            label.text = text;
            true
        });
    }

    pub fn set_font_size(&mut self, id: ElementId, font_size: f32) {
        self.update_label(id, DirtyKind::Generated, |label| {
            if approx_eq(label.style.font_size, font_size) {
                return false;
            }
            label.style.font_size = font_size;
            true
        });
    }

    pub fn set_line_height(&mut self, id: ElementId, line_height: f32) {
        self.update_label(id, DirtyKind::Generated, |label| {
            if approx_eq(label.style.line_height, line_height) {
                return false;
            }
            label.style.line_height = line_height;
            true
        });
    }

    /// Auto-sized labels take their measured size during the parent's flow.
    pub fn set_auto_size(&mut self, id: ElementId, auto_size: bool) {
        self.update_label(id, DirtyKind::Resize, |label| {
            if label.auto_size == auto_size {
                return false;
            }
            label.auto_size = auto_size;
            true
        });
    }
}
