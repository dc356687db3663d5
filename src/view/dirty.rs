use super::{ElementId, UiTree};
use crate::LayoutError;

/// What part of an element's computed state is stale, in increasing priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirtyKind {
    Layout,
    Resize,
    Generated,
    ReGenerated,
    ColorChange,
    Scissor,
}

impl DirtyKind {
    fn always_overwrites(self) -> bool {
        matches!(self, Self::Generated | Self::ReGenerated)
    }
}

/// Dirty tag plus where it came from: the element itself, or an ancestor
/// pushing its own tag down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirtyOrigin {
    Own(DirtyKind),
    Parent(DirtyKind),
}

impl DirtyOrigin {
    pub fn kind(self) -> DirtyKind {
        match self {
            Self::Own(kind) | Self::Parent(kind) => kind,
        }
    }

    pub fn is_own(self) -> bool {
        matches!(self, Self::Own(_))
    }

    /// Whether `incoming` may replace `current`.
    ///
    /// An element's own tag is never downgraded by something its parent
    /// pushed, except that Generated/ReGenerated always land.
    pub fn accepts(current: Option<Self>, incoming: Self) -> bool {
        let Some(current) = current else {
            return true;
        };
        if incoming.kind().always_overwrites() {
            return true;
        }
        match (current, incoming) {
            (Self::Parent(_), Self::Own(_)) => true,
            (Self::Own(_), Self::Parent(_)) => false,
            (Self::Own(old), Self::Own(new)) | (Self::Parent(old), Self::Parent(new)) => new > old,
        }
    }
}

impl UiTree {
    /// Tags `id` and pushes a parent-originated tag down to every
    /// descendant that accepts it.
    pub fn set_dirty(&mut self, id: ElementId, kind: DirtyKind) {
        self.tag_dirty(id, DirtyOrigin::Own(kind));
    }

    fn tag_dirty(&mut self, id: ElementId, origin: DirtyOrigin) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if !DirtyOrigin::accepts(element.dirty, origin) {
            return;
        }
        element.dirty = Some(origin);
        let children = element.children.clone();
        for child in children {
            self.tag_dirty(child, DirtyOrigin::Parent(origin.kind()));
        }
    }

    pub fn dirty(&self, id: ElementId) -> Option<DirtyOrigin> {
        self.elements.get(id).and_then(|element| element.dirty)
    }

    pub fn is_clean(&self, id: ElementId) -> bool {
        self.dirty(id).is_none()
    }

    /// Any active element under `root` carrying a tag.
    pub fn subtree_dirty(&self, root: ElementId) -> bool {
        self.descendants(root).into_iter().any(|id| !self.is_clean(id))
    }

    /// ReGenerated needs a second visit, so it only decays to Generated.
    fn clear_dirty(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(id) {
            element.dirty = match element.dirty {
                Some(origin) if origin.kind() == DirtyKind::ReGenerated => {
                    Some(DirtyOrigin::Own(DirtyKind::Generated))
                }
                _ => None,
            };
        }
    }

    /// Stabilizes the whole tree containing `id`.
    ///
    /// Walks every active element from the topmost ancestor in pre-order,
    /// clearing, resolving and flowing each one, and repeats until a full
    /// pass leaves no element tagged. Afterwards scissors are regenerated
    /// and labels re-wrapped. Hitting the configured round cap still does
    /// that final step, then reports the elements that never settled.
    pub fn clean_tree(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let root = self.root_of(id).ok_or(LayoutError::UnknownElement(id))?;
        let _span = tracing::debug_span!("clean_tree", ?root).entered();
        let order = self.descendants(root);
        let max_rounds = self.config.max_stabilization_rounds.max(1);

        let mut rounds = 0;
        let mut settled = false;
        while rounds < max_rounds {
            rounds += 1;
            for &node in &order {
                self.clear_dirty(node);
                self.resolve(node);
                self.post_layout(node);
            }
            if order.iter().all(|node| self.is_clean(*node)) {
                settled = true;
                break;
            }
            tracing::debug!(round = rounds, "layout pass left dirty elements");
        }

        for &node in &order {
            self.generate_scissor(node);
        }
        for &node in &order {
            self.render_label(node);
        }

        if settled {
            tracing::debug!(rounds, elements = order.len(), "layout stabilized");
            return Ok(());
        }
        let unsettled: Vec<ElementId> = order
            .iter()
            .copied()
            .filter(|node| !self.is_clean(*node))
            .collect();
        tracing::warn!(
            ?root,
            rounds,
            unsettled = unsettled.len(),
            "layout did not converge"
        );
        Err(LayoutError::DidNotConverge {
            root,
            rounds,
            unsettled,
        })
    }

    /// Stabilizes every root whose subtree holds a dirty tag. All roots are
    /// processed even if one fails; the last failure is returned.
    pub fn clean_dirty_roots(&mut self) -> Result<(), LayoutError> {
        let mut result = Ok(());
        for root in self.roots.clone() {
            if !self.subtree_dirty(root) {
                continue;
            }
            if let Err(err) = self.clean_tree(root) {
                result = Err(err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{DirtyKind, DirtyOrigin};
    use crate::{Edges, LayoutConfig, LayoutError, UiTree};
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn own_tag_is_not_overwritten_by_lower_parent_tag() {
        let current = Some(DirtyOrigin::Own(DirtyKind::Resize));
        assert!(!DirtyOrigin::accepts(current, DirtyOrigin::Parent(DirtyKind::Layout)));
        assert!(!DirtyOrigin::accepts(current, DirtyOrigin::Parent(DirtyKind::Scissor)));
        assert!(DirtyOrigin::accepts(current, DirtyOrigin::Parent(DirtyKind::Generated)));
        assert!(DirtyOrigin::accepts(current, DirtyOrigin::Own(DirtyKind::Generated)));
        assert!(!DirtyOrigin::accepts(current, DirtyOrigin::Own(DirtyKind::Layout)));
    }

    #[test]
    fn own_tag_replaces_parent_tag() {
        let current = Some(DirtyOrigin::Parent(DirtyKind::Scissor));
        assert!(DirtyOrigin::accepts(current, DirtyOrigin::Own(DirtyKind::Layout)));
        assert!(DirtyOrigin::accepts(None, DirtyOrigin::Parent(DirtyKind::Layout)));
    }

    #[test]
    fn generated_reaches_every_descendant() {
        let mut tree = UiTree::new(200.0, 200.0);
        let root = tree.create_panel();
        let a = tree.create_panel();
        let b = tree.create_panel();
        let c = tree.create_label("deep");
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        tree.clean_tree(root).unwrap();
        assert!(tree.descendants(root).iter().all(|id| tree.is_clean(*id)));

        tree.set_dirty(b, DirtyKind::Resize);
        tree.set_dirty(a, DirtyKind::Generated);
        assert_eq!(tree.dirty(a), Some(DirtyOrigin::Own(DirtyKind::Generated)));
        assert_eq!(tree.dirty(b), Some(DirtyOrigin::Parent(DirtyKind::Generated)));
        assert_eq!(tree.dirty(c), Some(DirtyOrigin::Parent(DirtyKind::Generated)));
        assert!(tree.is_clean(root));
    }

    #[test]
    fn clean_tree_is_idempotent() {
        let mut tree = UiTree::new(400.0, 300.0);
        let root = tree.create_panel();
        tree.scale(root, 300.0, 200.0);
        tree.set_padding(root, Edges::all(4.0));
        let left = tree.create_panel();
        let right = tree.create_label("hello world");
        let stretch = tree.create_panel();
        tree.add_child(root, left).unwrap();
        tree.add_child(root, right).unwrap();
        tree.add_child(root, stretch).unwrap();
        tree.scale(left, 60.0, 40.0);
        tree.anchor_to(stretch, crate::Anchor::StretchBottom);
        tree.set_stretch(stretch, Edges::new(5.0, 20.0, 5.0, 5.0));

        tree.clean_tree(root).unwrap();
        let snapshot: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .filter_map(|id| tree.element(id).map(|e| (*e.transform(), e.scissor())))
            .collect();

        tree.clean_tree(root).unwrap();
        let again: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .filter_map(|id| tree.element(id).map(|e| (*e.transform(), e.scissor())))
            .collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn stretch_child_ahead_of_flowed_sibling_settles_in_one_call() {
        let mut tree = UiTree::new(400.0, 300.0);
        let root = tree.create_panel();
        tree.scale(root, 300.0, 200.0);
        let stretch = tree.create_panel();
        let sibling = tree.create_panel();
        tree.add_child(root, stretch).unwrap();
        tree.add_child(root, sibling).unwrap();
        tree.anchor_to(stretch, crate::Anchor::StretchCenter);
        tree.set_stretch(stretch, Edges::all(10.0));
        tree.scale(sibling, 60.0, 40.0);

        tree.clean_tree(root).unwrap();
        let first = *tree.element(sibling).unwrap().transform();
        assert_eq!(
            tree.element(stretch).unwrap().transform().scale(),
            Vec2::new(280.0, 180.0)
        );
        // 280 + 60 overflows the 300px row, so the sibling wraps below.
        assert_eq!(
            tree.element(sibling).unwrap().layout().row_offset(),
            Vec2::new(0.0, 180.0)
        );

        tree.clean_tree(root).unwrap();
        assert_eq!(*tree.element(sibling).unwrap().transform(), first);
    }

    #[test]
    fn diverging_layout_function_hits_round_cap() {
        let config = LayoutConfig {
            max_stabilization_rounds: 5,
            ..LayoutConfig::default()
        };
        let mut tree = UiTree::with_config(config);
        tree.set_viewport_size(100.0, 100.0);
        let root = tree.create_panel();
        let flipper = tree.create_panel();
        tree.add_child(root, flipper).unwrap();
        let calls = Rc::new(Cell::new(0_u32));
        let counter = calls.clone();
        tree.add_layout_function(flipper, move |scope| {
            counter.set(counter.get() + 1);
            let width = if counter.get() % 2 == 0 { 10.0 } else { 20.0 };
            scope.set_pixel_size(width, 10.0);
        });

        let err = tree.clean_tree(root).unwrap_err();
        match err {
            LayoutError::DidNotConverge {
                root: failed_root,
                rounds,
                unsettled,
            } => {
                assert_eq!(failed_root, root);
                assert_eq!(rounds, 5);
                assert_eq!(unsettled, vec![flipper]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(calls.get(), 5);
        // Scissors are still produced from the last state.
        let scissor = tree.element(flipper).map(|e| e.scissor());
        assert_eq!(scissor.map(|r| r.size()), Some(Vec2::ONE));
    }

    #[test]
    fn regenerated_takes_an_extra_pass() {
        let mut tree = UiTree::new(100.0, 100.0);
        let root = tree.create_panel();
        tree.clean_tree(root).unwrap();
        tree.set_dirty(root, DirtyKind::ReGenerated);
        tree.clear_dirty(root);
        assert_eq!(tree.dirty(root), Some(DirtyOrigin::Own(DirtyKind::Generated)));
        tree.clean_tree(root).unwrap();
        assert!(tree.is_clean(root));
    }
}
