//! Queued input events
//!
//! Events are produced by device adapters (usually through the
//! [`InputCollector`](crate::input::InputCollector)), queued on the
//! [`Desktop`] and executed one after the other during
//! [`Desktop::process_events`].

use std::fmt;

use bitflags::bitflags;

use crate::desktop::Desktop;
use crate::geometry::Point;
use crate::input::KeyCode;

bitflags! {
    /// Modifier flags carried by every event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Option 1 (shift)
        const SHIFT = 1 << 0;
        /// Option 2 (control)
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

impl Modifiers {
    pub fn option1(self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn option2(self) -> bool {
        self.contains(Self::CTRL)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, label) in [
            (Self::CTRL, "Ctrl+"),
            (Self::ALT, "Alt+"),
            (Self::SHIFT, "Shift+"),
            (Self::META, "Meta+"),
        ] {
            if self.contains(flag) {
                f.write_str(label)?;
            }
        }
        Ok(())
    }
}

/// Desktop-level commands that are not tied to a particular key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// Escape: aborts drags, closes the topmost popup
    Cancel,
    Confirm,
    FocusNext,
    FocusPrevious,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEventKind {
    PointerButton { pressed: bool, primary: bool },
    PointerMove { from: Point, to: Point },
    PointerWheel { delta: i32 },
    Character { ch: char },
    HotKey { ch: char },
    KeyStroke { key: KeyCode },
    Special { kind: SpecialKind },
}

/// A timestamped input command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub modifiers: Modifiers,
    /// Frame-relative timestamp in milliseconds
    pub time: u64,
}

impl InputEvent {
    pub fn new(kind: InputEventKind, modifiers: Modifiers, time: u64) -> Self {
        Self {
            kind,
            modifiers,
            time,
        }
    }

    pub fn pointer_button(pressed: bool, primary: bool, modifiers: Modifiers, time: u64) -> Self {
        Self::new(
            InputEventKind::PointerButton { pressed, primary },
            modifiers,
            time,
        )
    }

    pub fn pointer_move(from: Point, to: Point, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::PointerMove { from, to }, modifiers, time)
    }

    pub fn wheel(delta: i32, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::PointerWheel { delta }, modifiers, time)
    }

    pub fn character(ch: char, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::Character { ch }, modifiers, time)
    }

    pub fn hot_key(ch: char, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::HotKey { ch }, modifiers, time)
    }

    pub fn key_stroke(key: KeyCode, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::KeyStroke { key }, modifiers, time)
    }

    pub fn special(kind: SpecialKind, modifiers: Modifiers, time: u64) -> Self {
        Self::new(InputEventKind::Special { kind }, modifiers, time)
    }

    /// Applies this event to the desktop's dispatch state
    pub fn execute(self, desktop: &mut Desktop) {
        let modifiers = self.modifiers;
        let time = self.time;
        match self.kind {
            InputEventKind::PointerButton {
                pressed: true,
                primary: true,
            } => desktop.primary_press(modifiers, time),
            InputEventKind::PointerButton {
                pressed: false,
                primary: true,
            } => desktop.primary_release(modifiers, time),
            InputEventKind::PointerButton {
                pressed: true,
                primary: false,
            } => desktop.secondary_press(modifiers, time),
            InputEventKind::PointerButton {
                pressed: false,
                primary: false,
            } => desktop.secondary_release(modifiers, time),
            InputEventKind::PointerMove { from, to } => {
                desktop.pointer_moved(from, to, modifiers, time)
            }
            InputEventKind::PointerWheel { delta } => desktop.wheel(delta, modifiers),
            InputEventKind::Character { ch } => desktop.character(ch, modifiers, time),
            InputEventKind::HotKey { ch } => desktop.hot_key(ch, modifiers, time),
            InputEventKind::KeyStroke { key } => desktop.key_stroke(key, modifiers, time),
            InputEventKind::Special { kind } => desktop.special(kind, modifiers, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_flags() {
        let modifiers = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(modifiers.option1());
        assert!(modifiers.option2());
        assert!(!Modifiers::ALT.option1());
        assert_eq!(modifiers.to_string(), "Ctrl+Shift+");
    }

    #[test]
    fn test_constructors() {
        let event = InputEvent::pointer_button(true, false, Modifiers::empty(), 12);
        assert_eq!(
            event.kind,
            InputEventKind::PointerButton {
                pressed: true,
                primary: false
            }
        );
        assert_eq!(event.time, 12);
    }
}
