use crate::view::{ElementId, UiTree};
use glam::Vec2;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Enter,
    Exit,
    Move,
    Down,
    Up,
    Click,
    DoubleClick,
    RightClick,
    Scroll,
    Miss,
    DragStart,
    DragEnd,
    KeyDown,
    KeyUp,
    Change,
    Submit,
}

impl EventKind {
    /// Exclusive kinds reach at most one element per tick through a group.
    pub fn is_exclusive(self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::Down
                | Self::Up
                | Self::Scroll
                | Self::DoubleClick
                | Self::RightClick
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

fn next_handler_id() -> HandlerId {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    HandlerId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Input that accompanied an event when it was produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventPayload {
    /// Cursor in world space.
    pub pointer: Vec2,
    pub scroll: Vec2,
    pub key: Option<SmolStr>,
}

pub struct UiEvent<'a> {
    pub tree: &'a mut UiTree,
    pub target: ElementId,
    pub kind: EventKind,
    pub payload: EventPayload,
}

impl fmt::Debug for UiEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiEvent")
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .finish()
    }
}

#[derive(Clone)]
pub struct EventHandler {
    id: HandlerId,
    handler: Rc<RefCell<dyn FnMut(&mut UiEvent<'_>)>>,
}

impl EventHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&mut UiEvent<'_>) + 'static,
    {
        Self {
            id: next_handler_id(),
            handler: Rc::new(RefCell::new(handler)),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// A handler that is already running further up the stack is skipped.
    pub fn call(&self, event: &mut UiEvent<'_>) -> bool {
        match self.handler.try_borrow_mut() {
            Ok(mut handler) => {
                (handler)(event);
                true
            }
            Err(_) => {
                tracing::warn!(
                    handler = self.id.0,
                    kind = ?event.kind,
                    "skipping re-entrant event handler"
                );
                false
            }
        }
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventHandlers {
    by_kind: FxHashMap<EventKind, Vec<EventHandler>>,
}

impl EventHandlers {
    pub fn add(&mut self, kind: EventKind, handler: EventHandler) -> HandlerId {
        let id = handler.id();
        self.by_kind.entry(kind).or_default().push(handler);
        id
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for handlers in self.by_kind.values_mut() {
            let before = handlers.len();
            handlers.retain(|handler| handler.id() != id);
            removed |= handlers.len() != before;
        }
        self.by_kind.retain(|_, handlers| !handlers.is_empty());
        removed
    }

    pub fn handlers(&self, kind: EventKind) -> &[EventHandler] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn has(&self, kind: EventKind) -> bool {
        !self.handlers(kind).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

impl UiTree {
    pub fn add_event<F>(&mut self, id: ElementId, kind: EventKind, handler: F) -> Option<HandlerId>
    where
        F: FnMut(&mut UiEvent<'_>) + 'static,
    {
        let element = self.elements.get_mut(id)?;
        Some(element.events.add(kind, EventHandler::new(handler)))
    }

    pub fn remove_event(&mut self, id: ElementId, handler: HandlerId) -> bool {
        self.elements
            .get_mut(id)
            .is_some_and(|element| element.events.remove(handler))
    }

    /// Registered callbacks, plus the built-in wheel handling of scrollable
    /// panels.
    pub fn has_handlers(&self, id: ElementId, kind: EventKind) -> bool {
        let Some(element) = self.elements.get(id) else {
            return false;
        };
        element.events.has(kind) || (kind == EventKind::Scroll && element.is_scrollable())
    }

    /// Runs `id`'s callbacks for `kind` right now, bypassing any group.
    pub fn execute_event(&mut self, id: ElementId, kind: EventKind, payload: EventPayload) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let handlers = element.events.handlers(kind).to_vec();
        if kind == EventKind::Scroll {
            self.scroll_by(id, payload.scroll);
        }
        for handler in handlers {
            if !self.contains(id) {
                break;
            }
            let mut event = UiEvent {
                tree: &mut *self,
                target: id,
                kind,
                payload: payload.clone(),
            };
            handler.call(&mut event);
        }
    }

    /// Grouped elements queue the event for end-of-tick arbitration,
    /// everything else runs it immediately.
    pub fn dispatch(&mut self, id: ElementId, kind: EventKind, payload: EventPayload) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        if element.grouped {
            self.request_event_with(id, kind, payload);
        } else {
            self.execute_event(id, kind, payload);
        }
    }

    /// Application-level events such as Change or Submit.
    pub fn emit(&mut self, id: ElementId, kind: EventKind) {
        self.dispatch(id, kind, EventPayload::default());
    }
}
