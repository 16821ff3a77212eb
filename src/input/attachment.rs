//! Bindings from physical input sources to logical event numbers

use super::key::{KEY_CODE_COUNT, KeyCode};
use crate::error::{InputError, Result};

/// Remapping policy of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentType {
    #[default]
    None,
    /// factor × milliseconds held, every frame the key is down
    KeyHold,
    /// factor once on the press edge
    KeyPress,
    /// factor on the press edge, then again at the key-repeat rate
    KeyPressRepeat,
    /// factor once on the release edge
    KeyRelease,
    /// factor on the press edge and again on the release edge
    KeyPressRelease,
    /// quantity set to factor × absolute axis value
    AxisPosition,
    /// factor × axis delta
    AxisMovement,
}

impl AttachmentType {
    pub fn is_key_type(self) -> bool {
        matches!(
            self,
            Self::KeyHold
                | Self::KeyPress
                | Self::KeyPressRepeat
                | Self::KeyRelease
                | Self::KeyPressRelease
        )
    }

    pub fn is_axis_type(self) -> bool {
        matches!(self, Self::AxisPosition | Self::AxisMovement)
    }
}

/// Analog input channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    MouseX,
    MouseY,
    MouseWheel,
    JoystickX,
    JoystickY,
}

/// Physical source an attachment is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Key(KeyCode),
    Axis(Axis),
}

/// Binding of one input source to an event number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputAttachment {
    pub kind: AttachmentType,
    pub event_number: usize,
    pub factor: i32,
}

impl InputAttachment {
    pub const NONE: InputAttachment = InputAttachment {
        kind: AttachmentType::None,
        event_number: 0,
        factor: 0,
    };

    pub const fn new(kind: AttachmentType, event_number: usize, factor: i32) -> Self {
        Self {
            kind,
            event_number,
            factor,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == AttachmentType::None
    }
}

/// One attachment per key code plus one per axis
///
/// Attaching to a source silently replaces what was bound there.
#[derive(Debug, Clone)]
pub struct InputAttachmentSet {
    keys: Box<[InputAttachment]>,
    mouse_x: InputAttachment,
    mouse_y: InputAttachment,
    mouse_wheel: InputAttachment,
    joystick_x: InputAttachment,
    joystick_y: InputAttachment,
}

impl Default for InputAttachmentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InputAttachmentSet {
    pub fn new() -> Self {
        Self {
            keys: vec![InputAttachment::NONE; KEY_CODE_COUNT].into_boxed_slice(),
            mouse_x: InputAttachment::NONE,
            mouse_y: InputAttachment::NONE,
            mouse_wheel: InputAttachment::NONE,
            joystick_x: InputAttachment::NONE,
            joystick_y: InputAttachment::NONE,
        }
    }

    pub fn key(&self, key: KeyCode) -> Result<InputAttachment> {
        Ok(self.keys[key.index()?])
    }

    pub(crate) fn key_at(&self, index: usize) -> InputAttachment {
        self.keys[index]
    }

    pub fn axis(&self, axis: Axis) -> InputAttachment {
        *self.axis_slot(axis)
    }

    pub fn get(&self, source: InputSource) -> Result<InputAttachment> {
        match source {
            InputSource::Key(key) => self.key(key),
            InputSource::Axis(axis) => Ok(self.axis(axis)),
        }
    }

    /// Binds a key; only key policies (or `None`) are accepted
    pub fn set_key(&mut self, key: KeyCode, attachment: InputAttachment) -> Result<()> {
        let index = key.index()?;
        if attachment.kind.is_axis_type() {
            return Err(InputError::AttachmentKindMismatch {
                input: InputSource::Key(key),
                kind: attachment.kind,
            });
        }
        self.keys[index] = attachment;
        Ok(())
    }

    /// Binds an axis; only axis policies (or `None`) are accepted
    pub fn set_axis(&mut self, axis: Axis, attachment: InputAttachment) -> Result<()> {
        if attachment.kind.is_key_type() {
            return Err(InputError::AttachmentKindMismatch {
                input: InputSource::Axis(axis),
                kind: attachment.kind,
            });
        }
        *self.axis_slot_mut(axis) = attachment;
        Ok(())
    }

    pub fn set(&mut self, source: InputSource, attachment: InputAttachment) -> Result<()> {
        match source {
            InputSource::Key(key) => self.set_key(key, attachment),
            InputSource::Axis(axis) => self.set_axis(axis, attachment),
        }
    }

    pub fn attach_key(
        &mut self,
        event_number: usize,
        key: KeyCode,
        kind: AttachmentType,
        factor: i32,
    ) -> Result<()> {
        self.set_key(key, InputAttachment::new(kind, event_number, factor))
    }

    pub fn attach_axis_move(&mut self, event_number: usize, axis: Axis, factor: i32) {
        *self.axis_slot_mut(axis) =
            InputAttachment::new(AttachmentType::AxisMovement, event_number, factor);
    }

    pub fn attach_axis_position(&mut self, event_number: usize, axis: Axis, factor: i32) {
        *self.axis_slot_mut(axis) =
            InputAttachment::new(AttachmentType::AxisPosition, event_number, factor);
    }

    pub fn detach_key(&mut self, key: KeyCode) -> Result<()> {
        self.set_key(key, InputAttachment::NONE)
    }

    pub fn detach_axis(&mut self, axis: Axis) {
        *self.axis_slot_mut(axis) = InputAttachment::NONE;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Highest event number any binding refers to
    pub fn highest_event_number(&self) -> Option<usize> {
        self.keys
            .iter()
            .chain([
                &self.mouse_x,
                &self.mouse_y,
                &self.mouse_wheel,
                &self.joystick_x,
                &self.joystick_y,
            ])
            .filter(|attachment| !attachment.is_none())
            .map(|attachment| attachment.event_number)
            .max()
    }

    fn axis_slot(&self, axis: Axis) -> &InputAttachment {
        match axis {
            Axis::MouseX => &self.mouse_x,
            Axis::MouseY => &self.mouse_y,
            Axis::MouseWheel => &self.mouse_wheel,
            Axis::JoystickX => &self.joystick_x,
            Axis::JoystickY => &self.joystick_y,
        }
    }

    fn axis_slot_mut(&mut self, axis: Axis) -> &mut InputAttachment {
        match axis {
            Axis::MouseX => &mut self.mouse_x,
            Axis::MouseY => &mut self.mouse_y,
            Axis::MouseWheel => &mut self.mouse_wheel,
            Axis::JoystickX => &mut self.joystick_x,
            Axis::JoystickY => &mut self.joystick_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_is_empty() {
        let set = InputAttachmentSet::new();
        assert!(set.key(KeyCode::W).unwrap().is_none());
        assert!(set.axis(Axis::JoystickY).is_none());
        assert_eq!(set.highest_event_number(), None);
    }

    #[test]
    fn test_attach_replaces_previous_binding() {
        let mut set = InputAttachmentSet::new();
        set.attach_key(3, KeyCode::W, AttachmentType::KeyHold, 1)
            .unwrap();
        set.attach_key(7, KeyCode::W, AttachmentType::KeyPress, -2)
            .unwrap();
        assert_eq!(
            set.key(KeyCode::W).unwrap(),
            InputAttachment::new(AttachmentType::KeyPress, 7, -2)
        );
        assert_eq!(set.highest_event_number(), Some(7));
    }

    #[test]
    fn test_invalid_key_code_is_rejected() {
        let mut set = InputAttachmentSet::new();
        let err = set
            .attach_key(0, KeyCode(300), AttachmentType::KeyPress, 1)
            .unwrap_err();
        assert_eq!(err, InputError::InvalidKeyCode(300));
        assert!(set.key(KeyCode(300)).is_err());
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut set = InputAttachmentSet::new();
        assert!(matches!(
            set.attach_key(0, KeyCode::A, AttachmentType::AxisMovement, 1),
            Err(InputError::AttachmentKindMismatch { .. })
        ));
        assert!(matches!(
            set.set_axis(
                Axis::MouseX,
                InputAttachment::new(AttachmentType::KeyHold, 0, 1)
            ),
            Err(InputError::AttachmentKindMismatch { .. })
        ));
    }

    #[test]
    fn test_axis_bindings() {
        let mut set = InputAttachmentSet::new();
        set.attach_axis_move(2, Axis::MouseX, 3);
        set.attach_axis_position(9, Axis::JoystickY, -1);
        assert_eq!(set.axis(Axis::MouseX).kind, AttachmentType::AxisMovement);
        assert_eq!(
            set.get(InputSource::Axis(Axis::JoystickY)).unwrap(),
            InputAttachment::new(AttachmentType::AxisPosition, 9, -1)
        );
        set.detach_axis(Axis::JoystickY);
        assert_eq!(set.highest_event_number(), Some(2));
    }
}
