//! Event target capability
//!
//! Every dispatchable node (desktop root, windows, popups, client areas,
//! fields) implements [`EventTarget`]. All handlers have default bodies so a
//! widget only overrides what it reacts to. Nodes live in a [`TargetTree`]
//! arena and are addressed by generational [`TargetId`]s; dispatch code only
//! ever talks to the trait.
//!
//! # Dispatch order
//!
//! ```text
//! press / release / click / double-click / context-click:
//!     root → ... → parent → hit target        (outermost first, all notified)
//!
//! wheel / key stroke / character / hot key / special:
//!     hit or focus target → parent → ... → root  (until consumed)
//! ```

mod listener;
mod tree;

use std::any::Any;

use slotmap::new_key_type;

use crate::desktop::DraggingSurrogate;
use crate::event::{Modifiers, SpecialKind};
use crate::geometry::Point;
use crate::input::KeyCode;

pub use listener::{CloseListener, DropListener, KeyListener, Listeners, PointerListener};
pub use tree::{TargetNode, TargetTree};

new_key_type! {
    /// Handle to a node in the [`TargetTree`]
    pub struct TargetId;
}

/// Which pointer button channel a gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Pointer shape hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerType {
    #[default]
    Arrow,
    Hand,
    Text,
    Move,
    DropAllowed,
    DropDenied,
}

/// Answer of an "about to change" callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Proceed,
    /// Abort the pending transition
    Veto,
}

impl Verdict {
    pub fn is_veto(self) -> bool {
        matches!(self, Verdict::Veto)
    }
}

/// Pointer button gesture delivered to a target and its ancestors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Innermost target of the gesture (the hit or press target)
    pub target: TargetId,
    /// Desktop position of the pointer
    pub position: Point,
    /// Position relative to the receiving node's origin
    pub local: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Frame-relative timestamp in milliseconds
    pub time: u64,
}

/// Mouse wheel movement routed to the target under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub target: TargetId,
    pub position: Point,
    pub local: Point,
    pub delta: i32,
    pub modifiers: Modifiers,
}

/// Keyboard input routed along the focus chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    /// Physical key for key strokes
    pub key: Option<KeyCode>,
    /// Translated character for character and hot-key input
    pub character: Option<char>,
    pub modifiers: Modifiers,
    pub time: u64,
}

/// Completed drop of a dragged target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEvent {
    pub dragged: TargetId,
    pub drop_target: TargetId,
    pub position: Point,
    /// Position relative to the drop target's origin
    pub local: Point,
}

/// Capability interface of every node that can receive dispatched input
///
/// Handlers returning `bool` report whether the input was consumed.
pub trait EventTarget {
    /// Name of this target for debugging
    fn name(&self) -> &str {
        "target"
    }

    /// Whether this node claims a position that no child claimed
    ///
    /// Transparent nodes (returning false) let hits fall through to
    /// whatever lies underneath.
    fn accepts_hit(&self, _local: Point) -> bool {
        true
    }

    /// Whether this node can hold keyboard focus
    fn accepts_focus(&self) -> bool {
        false
    }

    fn pointer_type(&self) -> PointerType {
        PointerType::Arrow
    }

    /// Tooltip text shown while hovering
    fn tooltip(&self) -> Option<&str> {
        None
    }

    fn on_press(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_release(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_click(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_double_click(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_context_click(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    /// Asked once per press after the pointer left the drag threshold
    ///
    /// Returning a surrogate starts a drag-and-drop gesture.
    fn on_drag_start(&mut self, _start: Point) -> Option<Box<dyn DraggingSurrogate>> {
        None
    }

    /// Pointer moved while pressed on a target that declined to drag
    fn on_drag_move(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    /// Whether a dragged target may be dropped at `local`
    fn accepts_drop(&self, _dragged: TargetId, _local: Point) -> bool {
        false
    }

    fn on_dropped(&mut self, _event: &DropEvent) {}

    /// Pointer entered (`true`) or left (`false`) this target
    fn on_hover(&mut self, _hovering: bool, _position: Point) {}

    fn on_wheel(&mut self, _event: &WheelEvent) -> bool {
        false
    }

    fn on_focus_changed(&mut self, _focused: bool) {}

    /// Notification preceding every key event delivered to the focus target
    fn on_any_key(&mut self, _event: &KeyEvent) {}

    fn on_key_stroke(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn on_character(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn on_hot_key(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn on_special(&mut self, _kind: SpecialKind, _event: &KeyEvent) -> bool {
        false
    }

    /// Asked before a popup closes; a veto keeps it open
    fn on_closing(&mut self) -> Verdict {
        Verdict::Proceed
    }

    /// The popup was dismissed
    fn on_cancel(&mut self) {}

    /// Allows downcasting to concrete widget types
    fn as_any(&self) -> &dyn Any;

    /// Mutable version of as_any
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Root of every desktop tree
///
/// Transparent to hits so presses on bare desktop space resolve to no
/// target, while still acting as the fallback drop target.
#[derive(Debug, Default)]
pub struct DesktopRoot;

impl EventTarget for DesktopRoot {
    fn name(&self) -> &str {
        "desktop"
    }

    fn accepts_hit(&self, _local: Point) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
