//! Event quantities and the global attachment set

use tracing::{debug, trace};

use super::attachment::{AttachmentType, Axis, InputAttachment, InputAttachmentSet, InputSource};
use super::key::{KEY_CODE_COUNT, KeyCode};
use super::scene::Scene;
use super::state::{ButtonState, InputState};
use crate::config::KeyRepeatConfig;
use crate::error::Result;

/// Registry of event quantities fed by device state through attachments
///
/// A quantity is "activity since the last poll": [`get_event_quantity`]
/// hands it out and resets it to zero. Scene attachments shadow global ones
/// whenever their type is not `None`.
///
/// [`get_event_quantity`]: InputManager::get_event_quantity
#[derive(Debug)]
pub struct InputManager {
    quantities: Vec<i64>,
    global: InputAttachmentSet,
    held: Box<[bool]>,
    /// Milliseconds each key has been held, for key repeat
    held_ms: Box<[u64]>,
    repeat: KeyRepeatConfig,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_repeat(KeyRepeatConfig::default())
    }

    pub fn with_repeat(repeat: KeyRepeatConfig) -> Self {
        Self {
            quantities: Vec::new(),
            global: InputAttachmentSet::new(),
            held: vec![false; KEY_CODE_COUNT].into_boxed_slice(),
            held_ms: vec![0; KEY_CODE_COUNT].into_boxed_slice(),
            repeat,
        }
    }

    // =========================================================================
    // Quantities
    // =========================================================================

    pub fn event_count(&self) -> usize {
        self.quantities.len()
    }

    /// Grows the quantity table to hold at least `count` events
    pub fn ensure_event_count(&mut self, count: usize) {
        if count > self.quantities.len() {
            trace!(from = self.quantities.len(), to = count, "growing event quantities");
            self.quantities.resize(count, 0);
        }
    }

    /// Returns the accumulated quantity and resets it to zero
    pub fn get_event_quantity(&mut self, event_number: usize) -> i64 {
        std::mem::take(self.slot(event_number))
    }

    /// Returns the accumulated quantity without consuming it
    pub fn peek_event_quantity(&self, event_number: usize) -> i64 {
        self.quantities.get(event_number).copied().unwrap_or(0)
    }

    pub fn add_event_quantity(&mut self, event_number: usize, amount: i64) {
        let slot = self.slot(event_number);
        *slot = slot.saturating_add(amount);
    }

    pub fn set_event_quantity(&mut self, event_number: usize, value: i64) {
        *self.slot(event_number) = value;
    }

    /// Zeroes every quantity, e.g. when a scene is switched
    pub fn reset_quantities(&mut self) {
        self.quantities.fill(0);
    }

    fn slot(&mut self, event_number: usize) -> &mut i64 {
        self.ensure_event_count(event_number + 1);
        &mut self.quantities[event_number]
    }

    // =========================================================================
    // Global attachments
    // =========================================================================

    pub fn global_attachments(&self) -> &InputAttachmentSet {
        &self.global
    }

    pub fn attach_key_global(
        &mut self,
        event_number: usize,
        key: KeyCode,
        kind: AttachmentType,
        factor: i32,
    ) -> Result<()> {
        self.global.attach_key(event_number, key, kind, factor)?;
        self.ensure_event_count(event_number + 1);
        debug!(event_number, ?key, ?kind, factor, "attached key globally");
        Ok(())
    }

    pub fn detach_key_global(&mut self, key: KeyCode) -> Result<()> {
        self.global.detach_key(key)
    }

    pub fn attach_mouse_x_move_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_move_global(event_number, Axis::MouseX, factor);
    }

    pub fn attach_mouse_y_move_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_move_global(event_number, Axis::MouseY, factor);
    }

    pub fn attach_mouse_x_position_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_position_global(event_number, Axis::MouseX, factor);
    }

    pub fn attach_mouse_y_position_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_position_global(event_number, Axis::MouseY, factor);
    }

    pub fn attach_mouse_wheel_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_move_global(event_number, Axis::MouseWheel, factor);
    }

    pub fn attach_joystick_x_move_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_move_global(event_number, Axis::JoystickX, factor);
    }

    pub fn attach_joystick_y_move_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_move_global(event_number, Axis::JoystickY, factor);
    }

    pub fn attach_joystick_x_position_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_position_global(event_number, Axis::JoystickX, factor);
    }

    pub fn attach_joystick_y_position_global(&mut self, event_number: usize, factor: i32) {
        self.attach_axis_position_global(event_number, Axis::JoystickY, factor);
    }

    pub fn attach_axis_move_global(&mut self, event_number: usize, axis: Axis, factor: i32) {
        self.global.attach_axis_move(event_number, axis, factor);
        self.ensure_event_count(event_number + 1);
    }

    pub fn attach_axis_position_global(&mut self, event_number: usize, axis: Axis, factor: i32) {
        self.global.attach_axis_position(event_number, axis, factor);
        self.ensure_event_count(event_number + 1);
    }

    pub fn detach_axis_global(&mut self, axis: Axis) {
        self.global.detach_axis(axis);
    }

    /// Scene attachment when bound, otherwise the global one
    pub fn effective_attachment(
        &self,
        scene: Option<&Scene>,
        source: InputSource,
    ) -> Result<InputAttachment> {
        if let Some(scene) = scene {
            let attachment = scene.attachments().get(source)?;
            if !attachment.is_none() {
                return Ok(attachment);
            }
        }
        self.global.get(source)
    }

    /// Whether a key was down during the last update
    pub fn is_key_held(&self, key: KeyCode) -> Result<bool> {
        Ok(self.held[key.index()?])
    }

    // =========================================================================
    // Per-frame accumulation
    // =========================================================================

    /// Accumulates quantities from this frame's device state
    pub fn update(&mut self, state: &InputState, scene: Option<&Scene>, elapsed_ms: u64) {
        self.update_filtered(state, scene, elapsed_ms, &[]);
    }

    /// Like [`update`](Self::update), but keys consumed by widgets this frame
    /// produce no edge-triggered quantities
    pub fn update_filtered(
        &mut self,
        state: &InputState,
        scene: Option<&Scene>,
        elapsed_ms: u64,
        captured: &[KeyCode],
    ) {
        if let Some(highest) = scene.and_then(|scene| scene.attachments().highest_event_number()) {
            self.ensure_event_count(highest + 1);
        }

        for index in 0..KEY_CODE_COUNT {
            let button = state.keyboard.key_at(index);
            let held_before = self.held_ms[index];
            self.held[index] = button.is_down();
            self.held_ms[index] = match button {
                ButtonState::JustPressed => 0,
                ButtonState::Pressed => held_before + elapsed_ms,
                _ => 0,
            };

            let attachment = match scene.map(|scene| scene.attachments().key_at(index)) {
                Some(attachment) if !attachment.is_none() => attachment,
                _ => self.global.key_at(index),
            };
            if attachment.is_none() {
                continue;
            }
            let key = KeyCode(index as u16);
            let edges_allowed = !captured.contains(&key);
            let held_after = self.held_ms[index];
            self.apply_key(
                attachment,
                button,
                edges_allowed,
                held_before,
                held_after,
                elapsed_ms,
            );
        }

        let mouse = &state.mouse;
        let joystick = &state.joystick;
        let joystick_delta = joystick.delta();
        let axes = [
            (Axis::MouseX, mouse.delta.x, mouse.position.x),
            (Axis::MouseY, mouse.delta.y, mouse.position.y),
            (Axis::MouseWheel, mouse.wheel, mouse.wheel_position),
            (Axis::JoystickX, joystick_delta.x, joystick.axes.x),
            (Axis::JoystickY, joystick_delta.y, joystick.axes.y),
        ];
        for (axis, delta, position) in axes {
            let attachment = match scene.map(|scene| scene.attachments().axis(axis)) {
                Some(attachment) if !attachment.is_none() => attachment,
                _ => self.global.axis(axis),
            };
            self.apply_axis(attachment, delta, position);
        }
    }

    fn apply_key(
        &mut self,
        attachment: InputAttachment,
        button: ButtonState,
        edges_allowed: bool,
        held_before: u64,
        held_after: u64,
        elapsed_ms: u64,
    ) {
        let factor = i64::from(attachment.factor);
        let event = attachment.event_number;
        match attachment.kind {
            AttachmentType::KeyHold => {
                if button.is_down() {
                    self.add_event_quantity(event, factor * elapsed_ms as i64);
                }
            }
            AttachmentType::KeyPress => {
                if edges_allowed && button.is_just_pressed() {
                    self.add_event_quantity(event, factor);
                }
            }
            AttachmentType::KeyRelease => {
                if edges_allowed && button.is_just_released() {
                    self.add_event_quantity(event, factor);
                }
            }
            AttachmentType::KeyPressRelease => {
                if edges_allowed && button.is_just_pressed() {
                    self.add_event_quantity(event, factor);
                }
                if edges_allowed && button.is_just_released() {
                    self.add_event_quantity(event, factor);
                }
            }
            AttachmentType::KeyPressRepeat => {
                if !edges_allowed {
                    return;
                }
                if button.is_just_pressed() {
                    self.add_event_quantity(event, factor);
                } else if button == ButtonState::Pressed {
                    let repeats = self.repeat.repeats_between(held_before, held_after);
                    if repeats > 0 {
                        self.add_event_quantity(event, factor * repeats as i64);
                    }
                }
            }
            AttachmentType::None | AttachmentType::AxisPosition | AttachmentType::AxisMovement => {}
        }
    }

    fn apply_axis(&mut self, attachment: InputAttachment, delta: i32, position: i32) {
        let factor = i64::from(attachment.factor);
        match attachment.kind {
            AttachmentType::AxisMovement if delta != 0 => {
                self.add_event_quantity(attachment.event_number, factor * i64::from(delta));
            }
            AttachmentType::AxisPosition => {
                self.set_event_quantity(attachment.event_number, factor * i64::from(position));
            }
            _ => {}
        }
    }
}
