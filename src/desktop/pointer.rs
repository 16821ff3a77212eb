//! Pointer button, drag-and-drop and wheel dispatch

use tracing::{debug, trace};

use super::{Desktop, DraggingSurrogate, PointerCall};
use crate::event::Modifiers;
use crate::geometry::Point;
use crate::target::{DropEvent, PointerButton, PointerEvent, TargetId, WheelEvent};

impl Desktop {
    pub(crate) fn primary_press(&mut self, modifiers: Modifiers, time: u64) {
        if let Some(secondary) = self.secondary_press_target.take() {
            debug!(?secondary, "primary press cancels secondary press");
            self.deliver_pointer(
                secondary,
                PointerCall::Release,
                PointerButton::Secondary,
                modifiers,
                time,
            );
            return;
        }

        let hit = self.tree.target_at(self.pointer);
        self.dragging_tested = false;
        self.dragged = false;
        self.cancel_popups_above(hit);

        // The popup walk may have destroyed the hit target
        let Some(target) = hit.filter(|&id| self.tree.contains(id)) else {
            self.primary_press_target = None;
            self.primary_press_time = None;
            return;
        };

        debug!(?target, position = ?self.pointer, "primary press");
        self.primary_press_target = Some(target);
        self.deliver_pointer(
            target,
            PointerCall::Press,
            PointerButton::Primary,
            modifiers,
            time,
        );
        self.focus_chain_of(target);

        let double_click = self.primary_press_time.is_some_and(|previous| {
            time.saturating_sub(previous) < self.config.double_click_delay_ms
                && self
                    .pointer
                    .within(self.primary_press_position, self.config.drag_start_distance)
        });
        if double_click && self.tree.contains(target) {
            debug!(?target, "double click");
            self.deliver_pointer(
                target,
                PointerCall::DoubleClick,
                PointerButton::Primary,
                modifiers,
                time,
            );
        }

        self.primary_press_time = Some(time);
        self.primary_press_position = self.pointer;
    }

    pub(crate) fn primary_release(&mut self, modifiers: Modifiers, time: u64) {
        let Some(target) = self.primary_press_target else {
            return;
        };

        self.deliver_pointer(
            target,
            PointerCall::Release,
            PointerButton::Primary,
            modifiers,
            time,
        );

        let hit = self.tree.target_at(self.pointer);
        let clicked = hit == Some(target)
            && self.primary_press_time.is_some()
            && self.dragging_surrogate.is_none()
            && !self.dragged;
        if clicked {
            debug!(?target, "click");
            self.deliver_pointer(
                target,
                PointerCall::Click,
                PointerButton::Primary,
                modifiers,
                time,
            );
        }

        if let Some(surrogate) = self.dragging_surrogate.take() {
            let drop_target = hit.unwrap_or_else(|| self.tree.root());
            self.finish_drop(surrogate, target, drop_target);
        }

        self.primary_press_target = None;
        self.dragging_tested = false;
        self.update_hover();
        self.update_pointer_type();
    }

    fn finish_drop(
        &mut self,
        mut surrogate: Box<dyn DraggingSurrogate>,
        dragged: TargetId,
        drop_target: TargetId,
    ) {
        if !self.supports_dropping(surrogate.as_ref(), dragged, drop_target) {
            debug!(?dragged, ?drop_target, "drop refused");
            surrogate.on_canceled();
            return;
        }
        let Ok(origin) = self.tree.absolute_origin(drop_target) else {
            surrogate.on_canceled();
            return;
        };

        let event = DropEvent {
            dragged,
            drop_target,
            position: self.pointer,
            local: self.pointer - origin,
        };
        debug!(?dragged, ?drop_target, "dropped");
        surrogate.on_dropped(&event);
        if let Some(node) = self.tree.node_mut(drop_target) {
            node.target.on_dropped(&event);
            node.listeners
                .notify_drop(|listener| listener.on_dropped(drop_target, &event));
        }
    }

    pub(crate) fn secondary_press(&mut self, modifiers: Modifiers, time: u64) {
        if let Some(primary) = self.primary_press_target.take() {
            debug!(?primary, "secondary press cancels primary press");
            self.cancel_dragging();
            self.dragging_tested = false;
            self.deliver_pointer(
                primary,
                PointerCall::Release,
                PointerButton::Primary,
                modifiers,
                time,
            );
            self.update_pointer_type();
            return;
        }
        if self.secondary_press_target.is_some() {
            return;
        }

        let hit = self.tree.target_at(self.pointer);
        self.cancel_popups_above(hit);
        let Some(target) = hit.filter(|&id| self.tree.contains(id)) else {
            return;
        };

        debug!(?target, position = ?self.pointer, "secondary press");
        self.secondary_press_target = Some(target);
        self.deliver_pointer(
            target,
            PointerCall::Press,
            PointerButton::Secondary,
            modifiers,
            time,
        );
    }

    pub(crate) fn secondary_release(&mut self, modifiers: Modifiers, time: u64) {
        let Some(target) = self.secondary_press_target.take() else {
            return;
        };

        self.deliver_pointer(
            target,
            PointerCall::Release,
            PointerButton::Secondary,
            modifiers,
            time,
        );
        if self.tree.target_at(self.pointer) == Some(target) {
            debug!(?target, "context click");
            self.deliver_pointer(
                target,
                PointerCall::ContextClick,
                PointerButton::Secondary,
                modifiers,
                time,
            );
        }
    }

    pub(crate) fn pointer_moved(&mut self, from: Point, to: Point, modifiers: Modifiers, time: u64) {
        trace!(?from, ?to, "pointer moved");
        self.pointer = to;

        match self.primary_press_target {
            Some(target) => self.drag_moved(target, modifiers, time),
            None if self.secondary_press_target.is_none() => self.update_hover(),
            None => {}
        }

        self.update_pointer_type();
    }

    fn drag_moved(&mut self, target: TargetId, modifiers: Modifiers, time: u64) {
        if !self.dragging_tested {
            if self
                .pointer
                .within(self.primary_press_position, self.config.drag_start_distance)
            {
                return;
            }
            self.dragging_tested = true;
            let start = self.primary_press_position;
            let surrogate = self
                .tree
                .target_mut(target)
                .and_then(|target| target.on_drag_start(start));
            if surrogate.is_some() {
                debug!(?target, "drag started");
                self.dragged = true;
                self.close_tooltip();
            }
            self.dragging_surrogate = surrogate;
        }

        let position = self.pointer;
        if let Some(surrogate) = self.dragging_surrogate.as_mut() {
            surrogate.on_drag_move(position);
            return;
        }

        let Ok(origin) = self.tree.absolute_origin(target) else {
            return;
        };
        let event = PointerEvent {
            target,
            position,
            local: position - origin,
            button: PointerButton::Primary,
            modifiers,
            time,
        };
        if let Some(target) = self.tree.target_mut(target) {
            target.on_drag_move(&event);
        }
    }

    /// Aborts the active drag-and-drop gesture, if any
    ///
    /// The press itself stays outstanding, so the following release is
    /// delivered but produces neither a click nor a drop.
    pub fn cancel_dragging(&mut self) -> bool {
        let Some(mut surrogate) = self.dragging_surrogate.take() else {
            return false;
        };
        debug!(dragged = ?self.primary_press_target, "drag canceled");
        surrogate.on_canceled();
        self.update_pointer_type();
        true
    }

    pub(crate) fn wheel(&mut self, delta: i32, modifiers: Modifiers) {
        let Some(hit) = self.tree.target_at(self.pointer) else {
            return;
        };
        let position = self.pointer;
        let consumer = self.bubble(hit, |_, node, local| {
            let event = WheelEvent {
                target: hit,
                position,
                local,
                delta,
                modifiers,
            };
            node.target.on_wheel(&event)
        });
        trace!(?hit, ?consumer, delta, "wheel");
    }
}
