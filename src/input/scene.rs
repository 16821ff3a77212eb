//! Per-scene control remapping

use super::attachment::{AttachmentType, Axis, InputAttachmentSet};
use super::key::KeyCode;
use crate::error::Result;

/// A game scene with its own attachment layer over the global bindings
///
/// Any source bound here (type other than `None`) shadows the global binding
/// for as long as this scene is the active one; detaching reveals the global
/// binding again.
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    attachments: InputAttachmentSet,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: InputAttachmentSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attachments(&self) -> &InputAttachmentSet {
        &self.attachments
    }

    pub fn attach_key(
        &mut self,
        event_number: usize,
        key: KeyCode,
        kind: AttachmentType,
        factor: i32,
    ) -> Result<()> {
        self.attachments.attach_key(event_number, key, kind, factor)
    }

    pub fn detach_key(&mut self, key: KeyCode) -> Result<()> {
        self.attachments.detach_key(key)
    }

    pub fn attach_mouse_x_move(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_move(event_number, Axis::MouseX, factor);
    }

    pub fn attach_mouse_y_move(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_move(event_number, Axis::MouseY, factor);
    }

    pub fn attach_mouse_x_position(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_position(event_number, Axis::MouseX, factor);
    }

    pub fn attach_mouse_y_position(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_position(event_number, Axis::MouseY, factor);
    }

    pub fn attach_mouse_wheel(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_move(event_number, Axis::MouseWheel, factor);
    }

    pub fn attach_joystick_x_move(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_move(event_number, Axis::JoystickX, factor);
    }

    pub fn attach_joystick_y_move(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_move(event_number, Axis::JoystickY, factor);
    }

    pub fn attach_joystick_x_position(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_position(event_number, Axis::JoystickX, factor);
    }

    pub fn attach_joystick_y_position(&mut self, event_number: usize, factor: i32) {
        self.attachments
            .attach_axis_position(event_number, Axis::JoystickY, factor);
    }

    pub fn detach_axis(&mut self, axis: Axis) {
        self.attachments.detach_axis(axis);
    }
}
