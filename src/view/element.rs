use super::{DirtyOrigin, Rect, TextLine, TextStyle, Transform};
use crate::style::{ContentFit, Layout, Overflow, ScrollDirection};
use crate::ui::{EventHandlers, Interaction};
use glam::Vec2;
use smol_str::SmolStr;

slotmap::new_key_type! {
    /// Stable handle into a [`super::UiTree`]. Destroyed handles never alias new elements.
    pub struct ElementId;
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanelData {
    pub(crate) content_fit: ContentFit,
    pub(crate) overflow: Overflow,
    pub(crate) scroll_direction: ScrollDirection,
    pub(crate) scroll_speed: f32,
    pub(crate) scroll: Vec2,
    pub(crate) max_scroll: Vec2,
    pub(crate) requested_scroll_x: Option<f32>,
    pub(crate) requested_scroll_y: Option<f32>,
}

impl PanelData {
    pub(crate) fn new(scroll_speed: f32) -> Self {
        Self {
            content_fit: ContentFit::empty(),
            overflow: Overflow::Scroll,
            scroll_direction: ScrollDirection::VERTICAL,
            scroll_speed,
            scroll: Vec2::ZERO,
            max_scroll: Vec2::ZERO,
            requested_scroll_x: None,
            requested_scroll_y: None,
        }
    }

    pub fn content_fit(&self) -> ContentFit {
        self.content_fit
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.scroll_direction
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    /// Current scroll, positive values move content left and up.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn max_scroll(&self) -> Vec2 {
        self.max_scroll
    }

    pub fn is_scrollable(&self) -> bool {
        self.overflow == Overflow::Scroll && !self.scroll_direction.is_empty()
    }

    pub(crate) fn scrolls_x(&self) -> bool {
        self.overflow == Overflow::Scroll && self.scroll_direction.contains(ScrollDirection::HORIZONTAL)
    }

    pub(crate) fn scrolls_y(&self) -> bool {
        self.overflow == Overflow::Scroll && self.scroll_direction.contains(ScrollDirection::VERTICAL)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelData {
    pub(crate) text: String,
    pub(crate) style: TextStyle,
    pub(crate) auto_size: bool,
    pub(crate) lines: Vec<TextLine>,
}

impl LabelData {
    pub(crate) fn new(text: String) -> Self {
        Self {
            text,
            style: TextStyle::default(),
            auto_size: true,
            lines: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn auto_size(&self) -> bool {
        self.auto_size
    }

    /// Wrapped lines from the last stabilization.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    Panel(PanelData),
    Label(LabelData),
}

pub struct Element {
    pub(crate) name: Option<SmolStr>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) active: bool,
    pub(crate) transform: Transform,
    pub(crate) layout: Layout,
    pub(crate) dirty: Option<DirtyOrigin>,
    pub(crate) scissor: Rect,
    pub(crate) scissor_disconnected: bool,
    pub(crate) grouped: bool,
    pub(crate) events: EventHandlers,
    pub(crate) interaction: Interaction,
    pub(crate) kind: ElementKind,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, dirty: DirtyOrigin) -> Self {
        Self {
            name: None,
            parent: None,
            children: Vec::new(),
            active: true,
            transform: Transform::default(),
            layout: Layout::default(),
            dirty: Some(dirty),
            scissor: Rect::UNBOUNDED,
            scissor_disconnected: false,
            grouped: false,
            events: EventHandlers::default(),
            interaction: Interaction::default(),
            kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn dirty(&self) -> Option<DirtyOrigin> {
        self.dirty
    }

    pub fn scissor(&self) -> Rect {
        self.scissor
    }

    pub fn is_scissor_disconnected(&self) -> bool {
        self.scissor_disconnected
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn panel(&self) -> Option<&PanelData> {
        match &self.kind {
            ElementKind::Panel(panel) => Some(panel),
            ElementKind::Label(_) => None,
        }
    }

    pub fn label(&self) -> Option<&LabelData> {
        match &self.kind {
            ElementKind::Label(label) => Some(label),
            ElementKind::Panel(_) => None,
        }
    }

    pub fn world_bounds(&self) -> Rect {
        self.transform.world_bounds()
    }

    pub(crate) fn panel_mut(&mut self) -> Option<&mut PanelData> {
        match &mut self.kind {
            ElementKind::Panel(panel) => Some(panel),
            ElementKind::Label(_) => None,
        }
    }

    pub(crate) fn label_mut(&mut self) -> Option<&mut LabelData> {
        match &mut self.kind {
            ElementKind::Label(label) => Some(label),
            ElementKind::Panel(_) => None,
        }
    }

    pub(crate) fn is_scrollable(&self) -> bool {
        self.panel().is_some_and(PanelData::is_scrollable)
    }
}
