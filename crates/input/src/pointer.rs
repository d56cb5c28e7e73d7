//! Mouse to pointer translation.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{BoardLayout, PointerEvent, Position};

/// Tracks the left button so drags and releases can be reported.
///
/// A press must land on the board to start a drag. Drags report each newly
/// entered cell once. A release anywhere ends the drag.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    pressed: bool,
    last: Option<Position>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn handle_mouse_event(
        &mut self,
        event: MouseEvent,
        layout: &BoardLayout,
    ) -> Option<PointerEvent> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let pos = layout.hit(event.column, event.row)?;
                self.pressed = true;
                self.last = Some(pos);
                Some(PointerEvent::Down(pos))
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed => {
                let pos = layout.hit(event.column, event.row)?;
                if self.last == Some(pos) {
                    return None;
                }
                self.last = Some(pos);
                Some(PointerEvent::Enter(pos))
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressed => {
                self.reset();
                Some(PointerEvent::Up)
            }
            _ => None,
        }
    }

    /// Forget any press, e.g. when a round ends mid-drag.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.last = None;
    }
}
