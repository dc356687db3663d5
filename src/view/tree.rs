use super::{
    DirtyKind, DirtyOrigin, Element, ElementId, ElementKind, EstimatedMetrics, FontMetrics,
    LabelData, PanelData, Rect,
};
use crate::ui::Group;
use crate::{LayoutConfig, LayoutError};
use glam::Vec2;
use slotmap::SlotMap;
use smol_str::SmolStr;

/// Arena owning every element of one window.
///
/// Children are owned through handle lists, parents are plain back handles,
/// so nothing here forms an ownership cycle.
pub struct UiTree {
    pub(crate) elements: SlotMap<ElementId, Element>,
    pub(crate) roots: Vec<ElementId>,
    pub(crate) viewport_size: Vec2,
    pub(crate) group: Group,
    pub(crate) config: LayoutConfig,
    pub(crate) metrics: Box<dyn FontMetrics>,
}

impl Default for UiTree {
    fn default() -> Self {
        Self::with_config(LayoutConfig::global().clone())
    }
}

impl UiTree {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut tree = Self::default();
        tree.viewport_size = Vec2::new(viewport_width, viewport_height);
        tree
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            elements: SlotMap::with_key(),
            roots: Vec::new(),
            viewport_size: Vec2::ZERO,
            group: Group::default(),
            config,
            metrics: Box::new(EstimatedMetrics),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    /// Window resize: every root re-resolves against the new bounds.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width, height);
        if super::vec2_approx_eq(self.viewport_size, size) {
            return;
        }
        self.viewport_size = size;
        for root in self.roots.clone() {
            self.set_dirty(root, DirtyKind::Resize);
        }
    }

    pub fn create_panel(&mut self) -> ElementId {
        let panel = PanelData::new(self.config.default_scroll_speed);
        self.insert_root(ElementKind::Panel(panel))
    }

    pub fn create_label(&mut self, text: impl Into<String>) -> ElementId {
        self.insert_root(ElementKind::Label(LabelData::new(text.into())))
    }

    fn insert_root(&mut self, kind: ElementKind) -> ElementId {
        let id = self
            .elements
            .insert(Element::new(kind, DirtyOrigin::Own(DirtyKind::Generated)));
        self.roots.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|element| element.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map_or(&[], |element| element.children.as_slice())
    }

    pub fn world_bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(id).map(Element::world_bounds)
    }

    /// Topmost ancestor of `id` (itself when it is a root).
    pub fn root_of(&self, id: ElementId) -> Option<ElementId> {
        let mut current = id;
        self.elements.get(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    pub fn is_ancestor(&self, ancestor: ElementId, of: ElementId) -> bool {
        let mut current = self.parent(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Active elements under `root` in depth-first pre-order, `root` first.
    /// Inactive elements hide their whole subtree.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if !element.active {
                continue;
            }
            order.push(id);
            stack.extend(element.children.iter().rev().copied());
        }
        order
    }

    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), LayoutError> {
        let index = self.children(parent).len();
        self.insert_child(parent, child, index)
    }

    /// Attaches `child` under `parent` at `index` (clamped), detaching it
    /// from wherever it lived before.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
        index: usize,
    ) -> Result<(), LayoutError> {
        if !self.contains(parent) {
            return Err(LayoutError::UnknownElement(parent));
        }
        if !self.contains(child) {
            return Err(LayoutError::UnknownElement(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(LayoutError::CyclicParent { parent, child });
        }
        self.unlink(child);

        let parent_grouped = match self.elements.get_mut(parent) {
            Some(element) => {
                let index = index.min(element.children.len());
                element.children.insert(index, child);
                element.grouped
            }
            None => return Err(LayoutError::UnknownElement(parent)),
        };
        if let Some(element) = self.elements.get_mut(child) {
            element.parent = Some(parent);
        }
        if parent_grouped {
            self.set_group(child, true);
        }
        self.set_dirty(parent, DirtyKind::Generated);
        Ok(())
    }

    /// Turns `id` into a root again.
    pub fn detach(&mut self, id: ElementId) -> Result<(), LayoutError> {
        if !self.contains(id) {
            return Err(LayoutError::UnknownElement(id));
        }
        if self.parent(id).is_none() {
            return Ok(());
        }
        self.unlink(id);
        if let Some(element) = self.elements.get_mut(id) {
            element.layout.row_offset = Vec2::ZERO;
        }
        self.roots.push(id);
        self.set_dirty(id, DirtyKind::Generated);
        Ok(())
    }

    fn unlink(&mut self, id: ElementId) {
        match self.parent(id) {
            Some(parent) => {
                if let Some(element) = self.elements.get_mut(parent) {
                    element.children.retain(|child| *child != id);
                }
                if let Some(element) = self.elements.get_mut(id) {
                    element.parent = None;
                }
                self.set_dirty(parent, DirtyKind::Generated);
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    /// Destroys `id` and its whole subtree, dropping any pending group
    /// requests and focus that point into it.
    pub fn destroy(&mut self, id: ElementId) -> Result<(), LayoutError> {
        if !self.contains(id) {
            return Err(LayoutError::UnknownElement(id));
        }
        self.unlink(id);
        let mut doomed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.remove(next) {
                stack.extend(element.children.iter().copied());
                doomed.push(next);
            }
        }
        self.group.forget(&doomed);
        tracing::debug!(?id, removed = doomed.len(), "destroyed element subtree");
        Ok(())
    }

    pub fn activate(&mut self, id: ElementId) {
        self.set_active(id, true);
    }

    pub fn deactivate(&mut self, id: ElementId) {
        self.set_active(id, false);
    }

    fn set_active(&mut self, id: ElementId, active: bool) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if element.active == active {
            return;
        }
        element.active = active;
        element.interaction = Default::default();
        let parent = element.parent;
        self.set_dirty(parent.unwrap_or(id), DirtyKind::Generated);
    }

    pub fn set_name(&mut self, id: ElementId, name: impl Into<SmolStr>) {
        if let Some(element) = self.elements.get_mut(id) {
            element.name = Some(name.into());
        }
    }

    /// First element in `root`'s subtree (pre-order, inactive included)
    /// carrying `name`.
    pub fn find_by_name(&self, root: ElementId, name: &str) -> Option<ElementId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let element = self.elements.get(id)?;
            if element.name.as_deref() == Some(name) {
                return Some(id);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        None
    }

    /// Routes `id`'s events (and its subtree's) through the arbitration group.
    pub fn set_group(&mut self, id: ElementId, grouped: bool) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.get_mut(next) {
                element.grouped = grouped;
                stack.extend(element.children.iter().copied());
            }
        }
    }
}
