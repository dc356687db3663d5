use super::{Anchor, Positioning};
use crate::view::approx_eq;
use bitflags::bitflags;
use glam::Vec2;
use std::fmt;
use std::rc::Rc;

/// Left/top/right/bottom quadruple used for padding, margins, borders,
/// stretch margins, inner offsets and insets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn approx_eq(&self, other: &Self) -> bool {
        approx_eq(self.left, other.left)
            && approx_eq(self.top, other.top)
            && approx_eq(self.right, other.right)
            && approx_eq(self.bottom, other.bottom)
    }
}

impl std::ops::Add for Edges {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

bitflags! {
    /// Axes a container derives from its children after row-flow.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ContentFit: u8 {
        const WIDTH = 0b01;
        const HEIGHT = 0b10;
        const BOTH = Self::WIDTH.bits() | Self::HEIGHT.bits();
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ScrollDirection: u8 {
        const VERTICAL = 0b01;
        const HORIZONTAL = 0b10;
        const BOTH = Self::VERTICAL.bits() | Self::HORIZONTAL.bits();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// Clips children and scrolls along the enabled directions.
    #[default]
    Scroll,
    /// Children inherit this element's own clip instead of its bounds.
    Visible,
    Hidden,
}

/// Callback run before anchor resolution, typically for sizes relative to
/// the parent.
pub type LayoutFn = Rc<dyn Fn(&mut LayoutScope<'_>)>;

pub struct LayoutScope<'a> {
    layout: &'a mut Layout,
    parent_size: Option<Vec2>,
}

impl<'a> LayoutScope<'a> {
    pub(crate) fn new(layout: &'a mut Layout, parent_size: Option<Vec2>) -> Self {
        Self {
            layout,
            parent_size,
        }
    }

    pub fn layout(&self) -> &Layout {
        &*self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut *self.layout
    }

    /// Pixel size of the parent, `None` on a root.
    pub fn parent_size(&self) -> Option<Vec2> {
        self.parent_size
    }

    pub fn set_pixel_size(&mut self, width: f32, height: f32) {
        self.layout.pixel_size = Vec2::new(width.max(0.0), height.max(0.0));
    }

    pub fn set_width_percent(&mut self, percent: f32) {
        if let Some(parent) = self.parent_size {
            self.layout.pixel_size.x = (parent.x * percent).max(0.0);
        }
    }

    pub fn set_height_percent(&mut self, percent: f32) {
        if let Some(parent) = self.parent_size {
            self.layout.pixel_size.y = (parent.y * percent).max(0.0);
        }
    }
}

/// Per-element layout intent plus the flow offset written back by the
/// container.
#[derive(Clone)]
pub struct Layout {
    pub(crate) anchor: Anchor,
    pub(crate) positioning: Positioning,
    pub(crate) offset: Vec2,
    pub(crate) row_offset: Vec2,
    pub(crate) inner_offset: Edges,
    pub(crate) local_inner_offset: Edges,
    pub(crate) stretch: Edges,
    pub(crate) inset: Edges,
    pub(crate) padding: Edges,
    pub(crate) margin: Edges,
    pub(crate) border: Edges,
    pub(crate) z: f32,
    pub(crate) pixel_size: Vec2,
    pub(crate) functions: Vec<LayoutFn>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            anchor: Anchor::TopLeft,
            positioning: Positioning::Static,
            offset: Vec2::ZERO,
            row_offset: Vec2::ZERO,
            inner_offset: Edges::ZERO,
            local_inner_offset: Edges::ZERO,
            stretch: Edges::ZERO,
            inset: Edges::ZERO,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            border: Edges::ZERO,
            z: 0.0,
            pixel_size: Vec2::ONE,
            functions: Vec::new(),
        }
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("anchor", &self.anchor)
            .field("positioning", &self.positioning)
            .field("offset", &self.offset)
            .field("row_offset", &self.row_offset)
            .field("pixel_size", &self.pixel_size)
            .field("z", &self.z)
            .field("functions", &self.functions.len())
            .finish()
    }
}

impl Layout {
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Offset assigned by the parent's row-flow or corner snap.
    pub fn row_offset(&self) -> Vec2 {
        self.row_offset
    }

    /// Combined inner offset, shared plus local.
    pub fn inner_offset(&self) -> Edges {
        self.inner_offset + self.local_inner_offset
    }

    pub fn local_inner_offset(&self) -> Edges {
        self.local_inner_offset
    }

    pub fn stretch(&self) -> Edges {
        self.stretch
    }

    pub fn inset(&self) -> Edges {
        self.inset
    }

    pub fn padding(&self) -> Edges {
        self.padding
    }

    pub fn margin(&self) -> Edges {
        self.margin
    }

    pub fn border(&self) -> Edges {
        self.border
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn pixel_size(&self) -> Vec2 {
        self.pixel_size
    }

    pub fn content_size(&self) -> Vec2 {
        Vec2::new(
            self.pixel_size.x - self.padding.horizontal(),
            self.pixel_size.y - self.padding.vertical(),
        )
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Inward nudge from the inner offset. Static elements ignore it.
    pub(crate) fn inner_nudge(&self) -> Vec2 {
        if self.positioning == Positioning::Static {
            return Vec2::ZERO;
        }
        let inner = self.inner_offset();
        let x = if self.anchor.is_left() {
            inner.left
        } else if self.anchor.is_right() {
            inner.right
        } else {
            inner.left - inner.right
        };
        let y = if self.anchor.is_top() {
            inner.top
        } else if self.anchor.is_bottom() {
            inner.bottom
        } else {
            inner.top - inner.bottom
        };
        Vec2::new(x, y)
    }

    /// Padding plus border on every side: the area children never flow into.
    pub(crate) fn frame(&self) -> Edges {
        self.padding + self.border
    }
}

#[cfg(test)]
mod tests {
    use super::{Edges, Layout, LayoutScope};
    use crate::{Anchor, Positioning};
    use glam::Vec2;

    #[test]
    fn inner_offset_sums_shared_and_local_parts() {
        let mut layout = Layout::default();
        layout.inner_offset = Edges::new(1.0, 2.0, 3.0, 4.0);
        layout.local_inner_offset = Edges::all(1.0);
        assert_eq!(layout.inner_offset(), Edges::new(2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn static_elements_ignore_inner_offset() {
        let mut layout = Layout::default();
        layout.inner_offset = Edges::new(5.0, 6.0, 7.0, 8.0);
        assert_eq!(layout.inner_nudge(), Vec2::ZERO);

        layout.positioning = Positioning::Relative;
        assert_eq!(layout.inner_nudge(), Vec2::new(5.0, 6.0));

        layout.anchor = Anchor::BottomRight;
        assert_eq!(layout.inner_nudge(), Vec2::new(7.0, 8.0));

        layout.anchor = Anchor::Center;
        assert_eq!(layout.inner_nudge(), Vec2::new(-2.0, -2.0));
    }

    #[test]
    fn percent_helpers_are_noops_without_parent() {
        let mut layout = Layout::default();
        layout.pixel_size = Vec2::new(10.0, 10.0);
        let mut scope = LayoutScope::new(&mut layout, None);
        scope.set_width_percent(0.5);
        scope.set_height_percent(0.5);
        assert_eq!(layout.pixel_size, Vec2::new(10.0, 10.0));

        let mut scope = LayoutScope::new(&mut layout, Some(Vec2::new(200.0, 80.0)));
        scope.set_width_percent(0.5);
        scope.set_height_percent(0.25);
        assert_eq!(layout.pixel_size, Vec2::new(100.0, 20.0));
    }

    #[test]
    fn content_size_excludes_padding() {
        let mut layout = Layout::default();
        layout.pixel_size = Vec2::new(40.0, 30.0);
        layout.padding = Edges::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(layout.content_size(), Vec2::new(34.0, 22.0));
    }
}
