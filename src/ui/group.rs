use super::{EventKind, EventPayload};
use crate::view::{ElementId, UiTree};
use bitflags::bitflags;

bitflags! {
    /// Exclusive kinds still up for grabs during one resolution pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct ExclusiveKinds: u8 {
        const CLICK = 1 << 0;
        const DOWN = 1 << 1;
        const UP = 1 << 2;
        const SCROLL = 1 << 3;
        const DOUBLE_CLICK = 1 << 4;
        const RIGHT_CLICK = 1 << 5;
    }
}

impl ExclusiveKinds {
    fn of(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Click => Some(Self::CLICK),
            EventKind::Down => Some(Self::DOWN),
            EventKind::Up => Some(Self::UP),
            EventKind::Scroll => Some(Self::SCROLL),
            EventKind::DoubleClick => Some(Self::DOUBLE_CLICK),
            EventKind::RightClick => Some(Self::RIGHT_CLICK),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EventRequest {
    target: ElementId,
    kind: EventKind,
    seq: u64,
    payload: EventPayload,
}

/// Mailbox for events raised by grouped elements during one tick. The
/// queue is drained by [`UiTree::resolve_group`].
#[derive(Clone, Debug, Default)]
pub struct Group {
    requests: Vec<EventRequest>,
    next_seq: u64,
    focus: Option<ElementId>,
}

impl Group {
    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    pub fn focus(&self) -> Option<ElementId> {
        self.focus
    }

    pub(crate) fn push(&mut self, target: ElementId, kind: EventKind, payload: EventPayload) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.requests.push(EventRequest {
            target,
            kind,
            seq,
            payload,
        });
    }

    pub(crate) fn forget(&mut self, ids: &[ElementId]) {
        self.requests.retain(|request| !ids.contains(&request.target));
        if self.focus.is_some_and(|focus| ids.contains(&focus)) {
            self.focus = None;
        }
    }

    fn take(&mut self) -> Vec<EventRequest> {
        self.next_seq = 0;
        std::mem::take(&mut self.requests)
    }
}

impl UiTree {
    pub fn request_event(&mut self, id: ElementId, kind: EventKind) {
        self.request_event_with(id, kind, EventPayload::default());
    }

    pub(crate) fn request_event_with(&mut self, id: ElementId, kind: EventKind, payload: EventPayload) {
        if self.contains(id) {
            self.group.push(id, kind, payload);
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.group.pending()
    }

    /// Delivers the queued requests, topmost first.
    ///
    /// Informational kinds reach every requester. An exclusive kind goes to
    /// the first requester that can actually handle it and is then closed
    /// for the rest of the pass. Equal depths favour the later request.
    /// Requests raised by handlers during the pass wait for the next one.
    pub fn resolve_group(&mut self) {
        let mut requests = self.group.take();
        if requests.is_empty() {
            return;
        }
        let depth = |tree: &UiTree, id: ElementId| {
            tree.elements
                .get(id)
                .map_or(f32::NEG_INFINITY, |element| element.transform.world_z())
        };
        requests.sort_by(|a, b| {
            depth(self, b.target)
                .total_cmp(&depth(self, a.target))
                .then_with(|| b.seq.cmp(&a.seq))
        });

        let mut open = ExclusiveKinds::all();
        for request in requests {
            if !self.contains(request.target) {
                continue;
            }
            if let Some(flag) = ExclusiveKinds::of(request.kind) {
                if !open.contains(flag) || !self.has_handlers(request.target, request.kind) {
                    continue;
                }
                open.remove(flag);
                tracing::debug!(target_id = ?request.target, kind = ?request.kind, "group granted exclusive event");
            }
            self.execute_event(request.target, request.kind, request.payload);
        }
    }

    /// Moves keyboard focus. The old holder gets `Miss`, the new one
    /// `Click`. Re-focusing the current holder skips the `Miss` but still
    /// clicks it.
    pub fn set_focus(&mut self, id: Option<ElementId>) {
        let id = id.filter(|id| self.contains(*id));
        let previous = self.group.focus;
        self.group.focus = id;
        if let Some(previous) = previous.filter(|previous| Some(*previous) != id) {
            self.execute_event(previous, EventKind::Miss, EventPayload::default());
        }
        if let Some(next) = id {
            self.execute_event(next, EventKind::Click, EventPayload::default());
        }
    }

    pub fn focus(&self) -> Option<ElementId> {
        self.group.focus()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ElementId, EventKind, UiTree};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(&'static str, EventKind)>>>;

    fn record(tree: &mut UiTree, id: ElementId, name: &'static str, kind: EventKind, log: &Log) {
        let log = log.clone();
        tree.add_event(id, kind, move |event| {
            log.borrow_mut().push((name, event.kind));
        });
    }

    fn stacked(depths: &[f32]) -> (UiTree, Vec<ElementId>) {
        let mut tree = UiTree::new(200.0, 200.0);
        let ids = depths
            .iter()
            .map(|depth| {
                let id = tree.create_panel();
                tree.scale(id, 50.0, 50.0);
                tree.set_z(id, *depth);
                tree.set_group(id, true);
                id
            })
            .collect::<Vec<_>>();
        tree.clean_dirty_roots().unwrap();
        (tree, ids)
    }

    #[test]
    fn topmost_handler_wins_exclusive_event() {
        let (mut tree, ids) = stacked(&[0.0, 1.0]);
        let log = Log::default();
        for (id, name) in ids.iter().zip(["low", "high"]) {
            record(&mut tree, *id, name, EventKind::Click, &log);
            record(&mut tree, *id, name, EventKind::Enter, &log);
        }
        for id in &ids {
            tree.emit(*id, EventKind::Enter);
            tree.emit(*id, EventKind::Click);
        }
        assert_eq!(tree.pending_requests(), 4);
        assert!(log.borrow().is_empty());

        tree.resolve_group();
        let log = log.borrow();
        assert_eq!(log.iter().filter(|(_, kind)| *kind == EventKind::Click).count(), 1);
        assert!(log.contains(&("high", EventKind::Click)));
        assert!(log.contains(&("high", EventKind::Enter)));
        assert!(log.contains(&("low", EventKind::Enter)));
        assert_eq!(tree.pending_requests(), 0);
    }

    #[test]
    fn later_request_wins_on_equal_depth() {
        let (mut tree, ids) = stacked(&[0.5, 0.5]);
        let log = Log::default();
        record(&mut tree, ids[0], "first", EventKind::Click, &log);
        record(&mut tree, ids[1], "second", EventKind::Click, &log);
        tree.request_event(ids[0], EventKind::Click);
        tree.request_event(ids[1], EventKind::Click);
        tree.resolve_group();
        assert_eq!(*log.borrow(), vec![("second", EventKind::Click)]);
    }

    #[test]
    fn requester_without_handler_does_not_consume() {
        let (mut tree, ids) = stacked(&[0.0, 1.0]);
        let log = Log::default();
        record(&mut tree, ids[0], "low", EventKind::Click, &log);
        tree.request_event(ids[0], EventKind::Click);
        tree.request_event(ids[1], EventKind::Click);
        tree.resolve_group();
        assert_eq!(*log.borrow(), vec![("low", EventKind::Click)]);
    }

    #[test]
    fn focus_change_sends_miss_then_click_and_refocus_clicks_again() {
        let (mut tree, ids) = stacked(&[0.0, 0.0]);
        let log = Log::default();
        for (id, name) in ids.iter().zip(["a", "b"]) {
            record(&mut tree, *id, name, EventKind::Click, &log);
            record(&mut tree, *id, name, EventKind::Miss, &log);
        }
        tree.set_focus(Some(ids[0]));
        tree.set_focus(Some(ids[0]));
        tree.set_focus(Some(ids[1]));
        assert_eq!(tree.focus(), Some(ids[1]));
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", EventKind::Click),
                ("a", EventKind::Click),
                ("a", EventKind::Miss),
                ("b", EventKind::Click),
            ]
        );
    }

    #[test]
    fn focus_from_own_click_handler_is_not_reentered() {
        let (mut tree, ids) = stacked(&[0.0]);
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        tree.add_event(ids[0], EventKind::Click, move |event| {
            *counter.borrow_mut() += 1;
            event.tree.set_focus(Some(event.target));
        });
        tree.request_event(ids[0], EventKind::Click);
        tree.resolve_group();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(tree.focus(), Some(ids[0]));
    }

    #[test]
    fn destroy_drops_requests_and_focus() {
        let (mut tree, ids) = stacked(&[0.0, 1.0]);
        tree.set_focus(Some(ids[1]));
        tree.request_event(ids[1], EventKind::Enter);
        tree.request_event(ids[0], EventKind::Enter);
        tree.destroy(ids[1]).unwrap();
        assert_eq!(tree.pending_requests(), 1);
        assert_eq!(tree.focus(), None);
    }

    #[test]
    fn requests_from_handlers_wait_for_next_pass() {
        let (mut tree, ids) = stacked(&[0.0]);
        let target = ids[0];
        tree.add_event(target, EventKind::Enter, move |event| {
            event.tree.request_event(target, EventKind::Change);
        });
        tree.request_event(target, EventKind::Enter);
        tree.resolve_group();
        assert_eq!(tree.pending_requests(), 1);
        tree.resolve_group();
        assert_eq!(tree.pending_requests(), 0);
    }
}
