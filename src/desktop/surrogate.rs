//! Drag-and-drop surrogates

use crate::geometry::Point;
use crate::target::{DropEvent, EventTarget, PointerType, TargetId};

/// Transient stand-in for a target being dragged
///
/// Returned by [`EventTarget::on_drag_start`] and owned by the desktop until
/// the gesture ends. Exactly one of `on_dropped` / `on_canceled` is called
/// before the surrogate is dropped.
pub trait DraggingSurrogate {
    /// Where the surrogate is drawn relative to the pointer
    fn offset(&self) -> Point {
        Point::ZERO
    }

    /// Pointer shown while hovering a target that accepts the drop
    fn supporting_pointer_type(&self) -> PointerType {
        PointerType::DropAllowed
    }

    /// Pointer shown while hovering a target that refuses the drop
    fn unsupporting_pointer_type(&self) -> PointerType {
        PointerType::DropDenied
    }

    /// Whether `dragged` may be dropped on `drop_target` at `local`
    ///
    /// Defaults to asking the drop target itself.
    fn supports_dropping(
        &self,
        dragged: TargetId,
        _drop_target: TargetId,
        target: &dyn EventTarget,
        local: Point,
    ) -> bool {
        target.accepts_drop(dragged, local)
    }

    fn on_drag_move(&mut self, _position: Point) {}

    fn on_dropped(&mut self, _event: &DropEvent) {}

    fn on_canceled(&mut self) {}
}

/// Surrogate that only tracks where it is and lets drop targets decide
#[derive(Debug, Clone, Default)]
pub struct BasicSurrogate {
    pub offset: Point,
    pub position: Point,
    pub supporting: PointerType,
    pub unsupporting: PointerType,
}

impl BasicSurrogate {
    pub fn new(offset: Point) -> Self {
        Self {
            offset,
            position: Point::ZERO,
            supporting: PointerType::DropAllowed,
            unsupporting: PointerType::DropDenied,
        }
    }
}

impl DraggingSurrogate for BasicSurrogate {
    fn offset(&self) -> Point {
        self.offset
    }

    fn supporting_pointer_type(&self) -> PointerType {
        self.supporting
    }

    fn unsupporting_pointer_type(&self) -> PointerType {
        self.unsupporting
    }

    fn on_drag_move(&mut self, position: Point) {
        self.position = position;
    }
}
