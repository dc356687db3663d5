use super::{ElementId, Rect, UiTree};
use crate::style::Overflow;

impl UiTree {
    /// Recomputes `id`'s clip rect and pushes it down its subtree.
    ///
    /// Roots clip to their own bounds. Everything else clips to its parent's
    /// bounds, one level only. A parent with visible overflow hands down its
    /// own clip instead. Disconnected elements are left alone.
    pub fn generate_scissor(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        if element.scissor_disconnected {
            return;
        }
        let rect = match element.parent.and_then(|parent| self.elements.get(parent)) {
            None => element.world_bounds(),
            Some(parent) => match parent.panel().map(|panel| panel.overflow) {
                Some(Overflow::Visible) => parent.scissor,
                _ => parent.world_bounds(),
            },
        };
        self.push_scissor(id, rect);
    }

    /// Writes `rect` onto `id` and every non-disconnected descendant.
    /// Stops early where the rect is already in place.
    pub fn push_scissor(&mut self, id: ElementId, rect: Rect) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(element) = self.elements.get_mut(next) else {
                continue;
            };
            if element.scissor_disconnected || element.scissor == rect {
                continue;
            }
            element.scissor = rect;
            stack.extend(element.children.iter().copied());
        }
    }

    /// Exempts `id` from ancestor clipping for good (dropdowns, modals).
    /// It stays parented for layout and starts over with an unbounded clip.
    pub fn disconnect_parent_scissor(&mut self, id: ElementId) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.scissor_disconnected = true;
        element.scissor = Rect::UNBOUNDED;
    }

    pub fn scissor(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(id).map(|element| element.scissor)
    }
}
