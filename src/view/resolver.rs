use super::{DirtyKind, ElementId, UiTree, vec2_approx_eq};
use crate::config::trace_layout_enabled;
use crate::style::{Anchor, Layout, LayoutFn, LayoutScope};
use glam::{Vec2, Vec3};

/// Keeps every child strictly in front of its parent.
pub const CHILD_Z_EPSILON: f32 = 0.01;

/// Position and size of a floating element, relative to the centre of a
/// frame of size `frame`.
fn floating_placement(layout: &Layout, frame: Vec2) -> (Vec2, Vec2) {
    let size = layout.pixel_size;
    let half_frame = frame * 0.5;
    let half = size * 0.5;
    let offset = layout.offset + layout.row_offset + layout.inner_nudge();
    let anchor = layout.anchor;

    let x = if anchor.is_left() {
        -half_frame.x + half.x + offset.x
    } else if anchor.is_right() {
        half_frame.x - half.x - offset.x
    } else {
        offset.x
    };
    let y = if anchor.is_top() {
        half_frame.y - half.y - offset.y
    } else if anchor.is_bottom() {
        -half_frame.y + half.y + offset.y
    } else {
        -offset.y
    };
    (Vec2::new(x, y), size)
}

/// Stretch anchors derive size from the stretch margins. On the axis an
/// edge anchor does not stretch, the far margin is the fixed extent.
fn stretch_placement(layout: &Layout, frame: Vec2) -> (Vec2, Vec2) {
    let stretch = layout.stretch;
    let (width, height) = (frame.x, frame.y);

    // Measured from the frame's left edge.
    let (size_x, center_x) = match layout.anchor {
        Anchor::StretchLeft => (stretch.right, stretch.left + stretch.right * 0.5),
        Anchor::StretchRight => (stretch.left, width - stretch.left * 0.5 - stretch.right),
        _ => {
            let size = width - stretch.horizontal();
            (size, stretch.left + size * 0.5)
        }
    };
    // Measured from the frame's bottom edge.
    let (size_y, center_y) = match layout.anchor {
        Anchor::StretchTop => (stretch.bottom, height - stretch.bottom * 0.5 - stretch.top),
        Anchor::StretchBottom => (stretch.top, stretch.bottom + stretch.top * 0.5),
        _ => {
            let size = height - stretch.vertical();
            (size, stretch.bottom + size * 0.5)
        }
    };

    let inset = layout.inset;
    let size = Vec2::new(
        (size_x - inset.horizontal()).max(0.0),
        (size_y - inset.vertical()).max(0.0),
    );
    let position = Vec2::new(
        center_x - width * 0.5 + (inset.left - inset.right) * 0.5 + layout.offset.x,
        center_y - height * 0.5 + (inset.bottom - inset.top) * 0.5 - layout.offset.y,
    );
    (position, size)
}

impl UiTree {
    /// Recomputes `id`'s transform from its layout and its parent's current
    /// transform (the viewport for roots). Stretch anchors also write the
    /// derived size back into the layout and tag the element `Resize` when
    /// it changed.
    pub fn resolve(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let parent = element
            .parent
            .and_then(|parent| self.elements.get(parent))
            .map(|parent| (parent.transform.world_position, parent.transform.scale));
        let parent_size = parent.map(|(_, size)| size);
        self.run_layout_functions(id, parent_size);

        let frame = parent_size.unwrap_or(self.viewport_size);
        let origin = parent.map_or(Vec3::ZERO, |(position, _)| position);
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        let layout = &mut element.layout;
        let before = layout.pixel_size;
        let (local, size) = if layout.anchor.is_stretch() {
            stretch_placement(layout, frame)
        } else {
            floating_placement(layout, frame)
        };
        layout.pixel_size = size;
        let resized = !vec2_approx_eq(before, size);

        let local_z = match parent {
            Some(_) => CHILD_Z_EPSILON + layout.z,
            None => layout.z,
        };
        let transform = &mut element.transform;
        transform.position = local.extend(local_z);
        transform.world_position = origin + transform.position;
        transform.scale = size;

        if trace_layout_enabled() {
            tracing::trace!(
                ?id,
                anchor = ?element.layout.anchor,
                world = ?element.transform.world_position,
                size = ?size,
                "resolved element"
            );
        }
        // The parent flowed this element at its old size earlier in the pass.
        if resized {
            self.set_dirty(id, DirtyKind::Resize);
        }
    }

    /// Runs attached layout functions. A size change tags the element
    /// `Resize` so the scheduler takes another pass.
    fn run_layout_functions(&mut self, id: ElementId, parent_size: Option<Vec2>) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if element.layout.functions.is_empty() {
            return;
        }
        let functions: Vec<LayoutFn> = element.layout.functions.clone();
        let before = element.layout.pixel_size;
        for function in &functions {
            let mut scope = LayoutScope::new(&mut element.layout, parent_size);
            function(&mut scope);
        }
        let changed = !vec2_approx_eq(before, element.layout.pixel_size);
        if changed {
            self.set_dirty(id, DirtyKind::Resize);
        }
    }
}
