//! Raw input state

use super::key::{KEY_CODE_COUNT, KeyCode};
use crate::event::Modifiers;
use crate::geometry::Point;

/// Raw input state snapshot for a single frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub mouse: MouseState,
    pub keyboard: KeyboardState,
    pub joystick: JoystickState,
    /// Frame-relative timestamp in milliseconds
    pub time: u64,
}

/// Mouse input state
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    /// Desktop coordinates
    pub position: Point,
    /// Movement accumulated this frame
    pub delta: Point,
    /// Wheel movement accumulated this frame
    pub wheel: i32,
    /// Sum of all wheel movement since startup
    pub wheel_position: i32,
    pub buttons: MouseButtons,
}

/// State of the two pointer button channels
#[derive(Debug, Clone, Default)]
pub struct MouseButtons {
    pub primary: ButtonState,
    pub secondary: ButtonState,
}

/// Button press state with edge detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    /// Pressed this frame (edge)
    JustPressed,
    /// Held down (multiple frames)
    Pressed,
    /// Released this frame (edge)
    JustReleased,
    /// Pressed and released within the same frame (both edges)
    Tapped,
}

impl ButtonState {
    /// Advance state for next frame (transitions edges to steady states)
    pub fn advance(self) -> Self {
        match self {
            Self::JustPressed => Self::Pressed,
            Self::JustReleased | Self::Tapped => Self::Released,
            state => state,
        }
    }

    /// State after a press sample arrives this frame
    pub fn press(self) -> Self {
        match self {
            Self::JustPressed | Self::Pressed => self,
            _ => Self::JustPressed,
        }
    }

    /// State after a release sample arrives this frame
    pub fn release(self) -> Self {
        match self {
            Self::JustPressed => Self::Tapped,
            Self::Pressed => Self::JustReleased,
            state => state,
        }
    }

    /// Returns true if button is currently down (just pressed or held)
    pub fn is_down(self) -> bool {
        matches!(self, Self::JustPressed | Self::Pressed)
    }

    /// Returns true if button was pressed this frame
    pub fn is_just_pressed(self) -> bool {
        matches!(self, Self::JustPressed | Self::Tapped)
    }

    /// Returns true if button was released this frame
    pub fn is_just_released(self) -> bool {
        matches!(self, Self::JustReleased | Self::Tapped)
    }
}

/// Keyboard input state
#[derive(Debug, Clone)]
pub struct KeyboardState {
    keys: Box<[ButtonState]>,
    pub modifiers: Modifiers,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            keys: vec![ButtonState::Released; KEY_CODE_COUNT].into_boxed_slice(),
            modifiers: Modifiers::empty(),
        }
    }
}

impl KeyboardState {
    /// State of a key; codes outside the key space read as released
    pub fn key(&self, key: KeyCode) -> ButtonState {
        key.index()
            .map(|index| self.keys[index])
            .unwrap_or_default()
    }

    pub(crate) fn key_at(&self, index: usize) -> ButtonState {
        self.keys[index]
    }

    pub(crate) fn key_mut(&mut self, index: usize) -> &mut ButtonState {
        &mut self.keys[index]
    }

    fn advance(&mut self) {
        for key in self.keys.iter_mut() {
            *key = key.advance();
        }
    }
}

/// Joystick axes, absolute values as reported by the device
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    pub axes: Point,
    pub previous: Point,
}

impl JoystickState {
    /// Axis change since the previous frame
    pub fn delta(&self) -> Point {
        self.axes - self.previous
    }
}

impl InputState {
    /// Creates a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all button states for next frame
    pub fn advance_frame(&mut self) {
        self.mouse.buttons.primary = self.mouse.buttons.primary.advance();
        self.mouse.buttons.secondary = self.mouse.buttons.secondary.advance();
        self.keyboard.advance();

        // Clear per-frame state
        self.mouse.delta = Point::ZERO;
        self.mouse.wheel = 0;
        self.joystick.previous = self.joystick.axes;
    }
}
