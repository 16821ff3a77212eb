//! Device sample normalization

use tracing::trace;

use super::key::KeyCode;
use super::state::InputState;
use crate::desktop::Desktop;
use crate::error::Result;
use crate::event::{InputEvent, Modifiers, SpecialKind};
use crate::geometry::Point;
use crate::target::PointerButton;

/// Collects device samples, maintains [`InputState`] and queues input events
///
/// Device adapters call the sample methods as input arrives; once per frame
/// the host moves the produced events into the desktop with
/// [`flush_into`](Self::flush_into).
pub struct InputCollector {
    state: InputState,
    events: Vec<InputEvent>,
}

impl InputCollector {
    /// Creates a new input collector
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            events: Vec::new(),
        }
    }

    /// Sets the timestamp stamped on subsequently produced events
    pub fn set_time(&mut self, time: u64) {
        self.state.time = time;
    }

    fn push(&mut self, event: InputEvent) {
        trace!(?event, "collected input event");
        self.events.push(event);
    }

    fn modifiers(&self) -> Modifiers {
        self.state.keyboard.modifiers
    }

    fn refresh_modifiers(&mut self) {
        let keyboard = &self.state.keyboard;
        let down = |keys: [KeyCode; 2]| keys.iter().any(|&key| keyboard.key(key).is_down());

        let mut modifiers = Modifiers::empty();
        modifiers.set(
            Modifiers::SHIFT,
            down([KeyCode::LEFT_SHIFT, KeyCode::RIGHT_SHIFT]),
        );
        modifiers.set(Modifiers::CTRL, down([KeyCode::LEFT_CTRL, KeyCode::RIGHT_CTRL]));
        modifiers.set(Modifiers::ALT, down([KeyCode::LEFT_ALT, KeyCode::RIGHT_ALT]));
        modifiers.set(Modifiers::META, down([KeyCode::LEFT_META, KeyCode::RIGHT_META]));
        self.state.keyboard.modifiers = modifiers;
    }

    /// Key went down (or auto-repeated)
    ///
    /// Produces a key stroke for every non-modifier key, plus the desktop
    /// command bound to Escape, Enter and Tab.
    pub fn key_down(&mut self, key: KeyCode) -> Result<()> {
        let index = key.index()?;
        let slot = self.state.keyboard.key_mut(index);
        *slot = slot.press();
        self.refresh_modifiers();

        if key.is_shift() || key.is_ctrl() || key.is_alt() || key.is_meta() {
            return Ok(());
        }

        let modifiers = self.modifiers();
        let time = self.state.time;
        self.push(InputEvent::key_stroke(key, modifiers, time));

        let special = match key {
            KeyCode::ESCAPE => Some(SpecialKind::Cancel),
            KeyCode::ENTER => Some(SpecialKind::Confirm),
            KeyCode::TAB if modifiers.option1() => Some(SpecialKind::FocusPrevious),
            KeyCode::TAB => Some(SpecialKind::FocusNext),
            _ => None,
        };
        if let Some(kind) = special {
            self.push(InputEvent::special(kind, modifiers, time));
        }
        Ok(())
    }

    pub fn key_up(&mut self, key: KeyCode) -> Result<()> {
        let index = key.index()?;
        let slot = self.state.keyboard.key_mut(index);
        *slot = slot.release();
        self.refresh_modifiers();
        Ok(())
    }

    /// Translated character input
    ///
    /// With Ctrl or Alt held the character becomes a hot key. Control
    /// characters are dropped; their keys already produced key strokes.
    pub fn character(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let modifiers = self.modifiers();
        let time = self.state.time;
        if modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            self.push(InputEvent::hot_key(ch, modifiers, time));
        } else {
            self.push(InputEvent::character(ch, modifiers, time));
        }
    }

    /// Pointer moved to an absolute desktop position
    pub fn mouse_moved(&mut self, position: Point) {
        let from = self.state.mouse.position;
        if from == position {
            return;
        }
        self.state.mouse.delta = self.state.mouse.delta + (position - from);
        self.state.mouse.position = position;
        let event = InputEvent::pointer_move(from, position, self.modifiers(), self.state.time);
        self.push(event);
    }

    pub fn mouse_button(&mut self, button: PointerButton, pressed: bool) {
        let buttons = &mut self.state.mouse.buttons;
        let slot = match button {
            PointerButton::Primary => &mut buttons.primary,
            PointerButton::Secondary => &mut buttons.secondary,
        };
        *slot = if pressed { slot.press() } else { slot.release() };

        let primary = button == PointerButton::Primary;
        let event = InputEvent::pointer_button(pressed, primary, self.modifiers(), self.state.time);
        self.push(event);
    }

    pub fn wheel(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        self.state.mouse.wheel += delta;
        self.state.mouse.wheel_position += delta;
        let event = InputEvent::wheel(delta, self.modifiers(), self.state.time);
        self.push(event);
    }

    /// Absolute joystick axis values
    pub fn joystick_axes(&mut self, axes: Point) {
        self.state.joystick.axes = axes;
    }

    /// Desktop command not tied to a key, e.g. from a gamepad
    pub fn special(&mut self, kind: SpecialKind) {
        let event = InputEvent::special(kind, self.modifiers(), self.state.time);
        self.push(event);
    }

    /// Takes the events produced since the last call
    pub fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queues the produced events on the desktop, in arrival order
    pub fn flush_into(&mut self, desktop: &mut Desktop) {
        for event in self.take_events() {
            desktop.add_event(event);
        }
    }

    /// Advance to next frame (transitions edge states to steady states)
    pub fn advance_frame(&mut self) {
        self.state.advance_frame();
    }

    /// Get current input state
    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Borrow state mutably
    pub fn state_mut(&mut self) -> &mut InputState {
        &mut self.state
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::event::InputEventKind;
    use crate::input::ButtonState;

    fn kinds(collector: &mut InputCollector) -> Vec<InputEventKind> {
        collector
            .take_events()
            .into_iter()
            .map(|event| event.kind)
            .collect()
    }

    #[test]
    fn test_modifier_keys_update_state_without_strokes() {
        let mut collector = InputCollector::new();
        collector.key_down(KeyCode::LEFT_CTRL).unwrap();
        assert!(collector.take_events().is_empty());
        assert_eq!(collector.state().keyboard.modifiers, Modifiers::CTRL);

        collector.character('s');
        let events = collector.take_events();
        assert_eq!(events[0].kind, InputEventKind::HotKey { ch: 's' });
        assert_eq!(events[0].modifiers, Modifiers::CTRL);

        collector.key_up(KeyCode::LEFT_CTRL).unwrap();
        collector.character('s');
        assert_eq!(kinds(&mut collector), vec![InputEventKind::Character { ch: 's' }]);
    }

    #[test]
    fn test_tab_with_shift_focuses_previous() {
        let mut collector = InputCollector::new();
        collector.key_down(KeyCode::RIGHT_SHIFT).unwrap();
        collector.key_down(KeyCode::TAB).unwrap();
        assert_eq!(
            kinds(&mut collector),
            vec![
                InputEventKind::KeyStroke { key: KeyCode::TAB },
                InputEventKind::Special {
                    kind: SpecialKind::FocusPrevious
                },
            ]
        );
    }

    #[test]
    fn test_invalid_key_code() {
        let mut collector = InputCollector::new();
        assert_eq!(
            collector.key_down(KeyCode(300)),
            Err(InputError::InvalidKeyCode(300))
        );
        assert!(collector.take_events().is_empty());
    }

    #[test]
    fn test_pointer_samples_accumulate_deltas() {
        let mut collector = InputCollector::new();
        collector.set_time(16);
        collector.mouse_moved(Point::new(10, 5));
        collector.mouse_moved(Point::new(12, 5));
        collector.mouse_moved(Point::new(12, 5));
        collector.wheel(2);
        collector.mouse_button(PointerButton::Primary, true);
        collector.mouse_button(PointerButton::Primary, false);

        let state = collector.state();
        assert_eq!(state.mouse.delta, Point::new(12, 5));
        assert_eq!(state.mouse.wheel_position, 2);
        assert_eq!(state.mouse.buttons.primary, ButtonState::Tapped);

        let events = collector.take_events();
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|event| event.time == 16));

        collector.advance_frame();
        assert_eq!(collector.state().mouse.delta, Point::ZERO);
        assert_eq!(collector.state().mouse.wheel_position, 2);
    }
}
