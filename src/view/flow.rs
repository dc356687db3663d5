use super::{DirtyKind, ElementId, ElementKind, UiTree, approx_eq, vec2_approx_eq};
use crate::style::{Anchor, ContentFit, Edges, Positioning};
use glam::Vec2;

/// A statically positioned child as seen by the row packer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FlowItem {
    pub(crate) size: Vec2,
    pub(crate) margin: Edges,
}

impl FlowItem {
    fn outer_width(&self) -> f32 {
        self.size.x + self.margin.horizontal()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FlowRow {
    /// Indices into the packed item slice.
    pub(crate) members: Vec<usize>,
    pub(crate) width: f32,
    content_height: f32,
    max_margin_top: f32,
    max_margin_bottom: f32,
}

impl FlowRow {
    fn push(&mut self, index: usize, item: &FlowItem) {
        self.members.push(index);
        self.width += item.outer_width();
        self.content_height = self.content_height.max(item.size.y);
        self.max_margin_top = self.max_margin_top.max(item.margin.top);
        self.max_margin_bottom = self.max_margin_bottom.max(item.margin.bottom);
    }

    pub(crate) fn height(&self) -> f32 {
        self.content_height + self.max_margin_top + self.max_margin_bottom
    }
}

/// Greedy first-fit: an item opens a new row when it would push a
/// non-empty row past `area_width`.
pub(crate) fn pack_rows(items: &[FlowItem], area_width: f32) -> Vec<FlowRow> {
    let mut rows: Vec<FlowRow> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let open_new = match rows.last() {
            None => true,
            Some(row) => !row.members.is_empty() && row.width + item.outer_width() > area_width,
        };
        if open_new {
            rows.push(FlowRow::default());
        }
        if let Some(row) = rows.last_mut() {
            row.push(index, item);
        }
    }
    rows
}

/// Where an absolutely positioned child attaches: the container corner
/// implied by its anchor, inside the container's inner offset and frame.
fn corner_offset(anchor: Anchor, inner: Edges, frame: Edges) -> Vec2 {
    let x = if anchor.is_left() {
        inner.left + frame.left
    } else if anchor.is_right() {
        inner.right + frame.right
    } else {
        0.0
    };
    let y = if anchor.is_top() {
        inner.top + frame.top
    } else if anchor.is_bottom() {
        inner.bottom + frame.bottom
    } else {
        0.0
    };
    Vec2::new(x, y)
}

impl UiTree {
    /// Container step run right after an element resolves: row-flow of its
    /// children, content-fit of its own size and scroll range upkeep.
    /// Labels have nothing to do here.
    pub(crate) fn post_layout(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let ElementKind::Panel(panel) = &element.kind else {
            return;
        };
        let layout = &element.layout;
        let frame = layout.frame();
        let inner = layout.inner_offset();
        let own_anchor = layout.anchor;
        let pixel_size = layout.pixel_size;
        let area_width = (pixel_size.x - frame.horizontal()).max(0.0);
        let fit = panel.content_fit;
        let scroll = panel.scroll;
        let children = element.children.clone();

        let mut flowing: Vec<ElementId> = Vec::new();
        let mut items: Vec<FlowItem> = Vec::new();
        for child in children {
            let Some(kid) = self.elements.get(child) else {
                continue;
            };
            if !kid.active {
                continue;
            }
            let child_layout = &kid.layout;
            match child_layout.positioning {
                Positioning::Absolute => {
                    let offset = corner_offset(child_layout.anchor, inner, frame);
                    self.set_row_offset(child, offset);
                }
                positioning if positioning.participates_in_flow() => {
                    let margin = child_layout.margin;
                    let size = self.flow_size(child, area_width);
                    flowing.push(child);
                    items.push(FlowItem { size, margin });
                }
                _ => {}
            }
        }

        let rows = pack_rows(&items, area_width);
        let origin = Vec2::new(frame.left - scroll.x, frame.top - scroll.y);
        let mut y = origin.y;
        for row in &rows {
            let mut x = origin.x;
            for &index in &row.members {
                let item = &items[index];
                let offset = Vec2::new(x + item.margin.left, y + row.max_margin_top);
                self.set_row_offset(flowing[index], offset);
                x += item.outer_width();
            }
            y += row.height();
        }

        let widest = rows.iter().map(|row| row.width).fold(0.0, f32::max);
        let flowed_height: f32 = rows.iter().map(FlowRow::height).sum();
        let content = Vec2::new(
            widest + frame.horizontal(),
            flowed_height + frame.vertical(),
        );
        let size = self.fit_content(id, fit, own_anchor, pixel_size, content);
        self.update_scroll_range(id, content, size);
    }

    fn set_row_offset(&mut self, id: ElementId, offset: Vec2) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if vec2_approx_eq(element.layout.row_offset, offset) {
            return;
        }
        element.layout.row_offset = offset;
        self.set_dirty(id, DirtyKind::Layout);
    }

    /// Applies content-fit on the axes the element's own anchor does not
    /// already stretch. Returns the resulting pixel size.
    fn fit_content(
        &mut self,
        id: ElementId,
        fit: ContentFit,
        anchor: Anchor,
        pixel_size: Vec2,
        content: Vec2,
    ) -> Vec2 {
        let mut fitted = pixel_size;
        if fit.contains(ContentFit::WIDTH) && !anchor.stretches_horizontally() {
            fitted.x = content.x.max(1.0);
        }
        if fit.contains(ContentFit::HEIGHT) && !anchor.stretches_vertically() {
            fitted.y = content.y.max(1.0);
        }
        if vec2_approx_eq(fitted, pixel_size) {
            return pixel_size;
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.layout.pixel_size = fitted;
        }
        self.set_dirty(id, DirtyKind::Resize);
        fitted
    }

    /// Recomputes the scroll range from the flowed extent, re-clamps the
    /// current scroll and applies pending `scroll_to` requests.
    fn update_scroll_range(&mut self, id: ElementId, content: Vec2, size: Vec2) {
        let Some(panel) = self.elements.get_mut(id).and_then(|e| e.panel_mut()) else {
            return;
        };
        let max_scroll = Vec2::new(
            if panel.scrolls_x() { (content.x - size.x).max(0.0) } else { 0.0 },
            if panel.scrolls_y() { (content.y - size.y).max(0.0) } else { 0.0 },
        );
        let range_changed = !vec2_approx_eq(panel.max_scroll, max_scroll);
        panel.max_scroll = max_scroll;

        let mut scroll = panel.scroll.clamp(Vec2::ZERO, max_scroll);
        if let Some(x) = panel.requested_scroll_x.take() {
            scroll.x = x.clamp(0.0, max_scroll.x);
        }
        if let Some(y) = panel.requested_scroll_y.take() {
            scroll.y = y.clamp(0.0, max_scroll.y);
        }
        let scroll_changed = !approx_eq(scroll.x, panel.scroll.x) || !approx_eq(scroll.y, panel.scroll.y);
        panel.scroll = scroll;

        if range_changed {
            self.set_dirty(id, DirtyKind::Generated);
        } else if scroll_changed {
            self.set_dirty(id, DirtyKind::Layout);
        }
    }
}
