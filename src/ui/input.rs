use super::{EventKind, EventPayload};
use crate::view::{ElementId, UiTree};
use bitflags::bitflags;
use glam::Vec2;
use smol_str::SmolStr;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
    }
}

/// Pointer as the host window reports it: pixels, origin top-left, y down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub buttons: MouseButtons,
    /// Wheel delta for this frame, positive y away from the user.
    pub scroll: Vec2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: SmolStr,
    pub pressed: bool,
}

impl KeyInput {
    pub fn down(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
        }
    }

    pub fn up(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            pressed: false,
        }
    }
}

/// Everything the host hands over for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub pointer: PointerState,
    pub keys: Vec<KeyInput>,
    /// Seconds on a monotonic clock.
    pub time: f64,
}

impl FrameInput {
    pub fn at(time: f64, x: f32, y: f32) -> Self {
        Self {
            pointer: PointerState {
                position: Vec2::new(x, y),
                ..PointerState::default()
            },
            keys: Vec::new(),
            time,
        }
    }

    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.pointer.buttons = buttons;
        self
    }

    pub fn with_scroll(mut self, x: f32, y: f32) -> Self {
        self.pointer.scroll = Vec2::new(x, y);
        self
    }

    pub fn with_key(mut self, key: KeyInput) -> Self {
        self.keys.push(key);
        self
    }
}

/// Frame-over-frame pointer state, reduced to edges.
#[derive(Clone, Debug, Default)]
pub struct InputTracker {
    previous: PointerState,
    current: PointerState,
    keys: Vec<KeyInput>,
    time: f64,
    cursor: Vec2,
    primed: bool,
}

impl InputTracker {
    pub fn advance(&mut self, frame: FrameInput, viewport_size: Vec2) {
        self.previous = if self.primed {
            self.current
        } else {
            PointerState {
                position: frame.pointer.position,
                ..PointerState::default()
            }
        };
        self.primed = true;
        self.current = frame.pointer;
        self.keys = frame.keys;
        self.time = frame.time;
        self.cursor = Vec2::new(
            self.current.position.x - viewport_size.x * 0.5,
            viewport_size.y * 0.5 - self.current.position.y,
        );
    }

    /// Cursor in world space: origin at the window centre, y up.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn keys(&self) -> &[KeyInput] {
        &self.keys
    }

    pub fn scroll(&self) -> Vec2 {
        self.current.scroll
    }

    pub fn moved(&self) -> bool {
        self.current.position != self.previous.position
    }

    pub fn pressed(&self, button: MouseButtons) -> bool {
        self.current.buttons.contains(button) && !self.previous.buttons.contains(button)
    }

    pub fn released(&self, button: MouseButtons) -> bool {
        !self.current.buttons.contains(button) && self.previous.buttons.contains(button)
    }

    pub fn held(&self, button: MouseButtons) -> bool {
        self.current.buttons.contains(button)
    }

    fn payload(&self) -> EventPayload {
        EventPayload {
            pointer: self.cursor,
            scroll: self.current.scroll,
            key: None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InteractionFlags: u8 {
        const HOVERED = 1 << 0;
        const PRESSED = 1 << 1;
        const DRAGGING = 1 << 2;
    }
}

/// Per-element pointer state carried between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Interaction {
    pub(crate) flags: InteractionFlags,
    pub(crate) press_origin: Vec2,
    pub(crate) last_click: Option<f64>,
}

impl Interaction {
    pub fn flags(&self) -> InteractionFlags {
        self.flags
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(InteractionFlags::HOVERED)
    }

    pub fn is_pressed(&self) -> bool {
        self.flags.contains(InteractionFlags::PRESSED)
    }

    pub fn is_dragging(&self) -> bool {
        self.flags.contains(InteractionFlags::DRAGGING)
    }
}

impl UiTree {
    /// Turns this frame's pointer edges into events for `id` and
    /// dispatches the ones it can handle.
    pub(crate) fn poll_element(&mut self, id: ElementId, input: &InputTracker) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let cursor = input.cursor();
        let inside = element.world_bounds().contains(cursor) && element.scissor.contains(cursor);
        let mut state = element.interaction;
        let mut events = Vec::new();

        let was_hovered = state.is_hovered();
        if inside && !was_hovered {
            state.flags.insert(InteractionFlags::HOVERED);
            events.push(EventKind::Enter);
        } else if !inside && was_hovered {
            state.flags.remove(InteractionFlags::HOVERED);
            events.push(EventKind::Exit);
        } else if inside && input.moved() {
            events.push(EventKind::Move);
        }

        if input.pressed(MouseButtons::LEFT) {
            if inside {
                state.flags.insert(InteractionFlags::PRESSED);
                state.press_origin = cursor;
                events.push(EventKind::Down);
            } else {
                events.push(EventKind::Miss);
            }
        }
        if input.pressed(MouseButtons::RIGHT) && inside {
            events.push(EventKind::RightClick);
        }

        if state.is_pressed()
            && !state.is_dragging()
            && input.held(MouseButtons::LEFT)
            && cursor.distance(state.press_origin) > self.config.drag_threshold_px
        {
            state.flags.insert(InteractionFlags::DRAGGING);
            events.push(EventKind::DragStart);
        }

        if input.released(MouseButtons::LEFT) {
            if inside {
                events.push(EventKind::Up);
            }
            if state.is_dragging() {
                events.push(EventKind::DragEnd);
            } else if state.is_pressed() && inside {
                events.push(EventKind::Click);
                let now = input.time();
                match state.last_click {
                    Some(last) if now - last <= self.config.double_click_secs => {
                        events.push(EventKind::DoubleClick);
                        state.last_click = None;
                    }
                    _ => state.last_click = Some(now),
                }
            }
            state.flags.remove(InteractionFlags::PRESSED | InteractionFlags::DRAGGING);
        }

        if inside && input.scroll() != Vec2::ZERO {
            events.push(EventKind::Scroll);
        }

        if let Some(element) = self.elements.get_mut(id) {
            element.interaction = state;
        }
        for kind in events {
            if self.has_handlers(id, kind) {
                self.dispatch(id, kind, input.payload());
            }
        }
    }

    /// Key edges go to whatever holds focus.
    pub(crate) fn deliver_keys(&mut self, input: &InputTracker) {
        let Some(focus) = self.focus() else {
            return;
        };
        for key in input.keys() {
            let kind = if key.pressed {
                EventKind::KeyDown
            } else {
                EventKind::KeyUp
            };
            let payload = EventPayload {
                key: Some(key.key.clone()),
                ..input.payload()
            };
            self.dispatch(focus, kind, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameInput, InputTracker, MouseButtons};
    use glam::Vec2;

    #[test]
    fn cursor_is_converted_to_world_space() {
        let mut input = InputTracker::default();
        input.advance(FrameInput::at(0.0, 0.0, 0.0), Vec2::new(200.0, 100.0));
        assert_eq!(input.cursor(), Vec2::new(-100.0, 50.0));
        input.advance(FrameInput::at(0.1, 150.0, 75.0), Vec2::new(200.0, 100.0));
        assert_eq!(input.cursor(), Vec2::new(50.0, -25.0));
    }

    #[test]
    fn button_edges_last_one_frame() {
        let mut input = InputTracker::default();
        let size = Vec2::splat(100.0);
        input.advance(FrameInput::at(0.0, 10.0, 10.0), size);
        assert!(!input.moved());

        input.advance(FrameInput::at(0.1, 10.0, 10.0).with_buttons(MouseButtons::LEFT), size);
        assert!(input.pressed(MouseButtons::LEFT));
        input.advance(FrameInput::at(0.2, 12.0, 10.0).with_buttons(MouseButtons::LEFT), size);
        assert!(!input.pressed(MouseButtons::LEFT));
        assert!(input.held(MouseButtons::LEFT));
        assert!(input.moved());
        input.advance(FrameInput::at(0.3, 12.0, 10.0), size);
        assert!(input.released(MouseButtons::LEFT));
        assert!(!input.pressed(MouseButtons::RIGHT));
    }
}
