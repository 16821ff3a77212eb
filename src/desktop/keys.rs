//! Keyboard focus, key routing and hot keys

use std::fmt;

use tracing::{debug, trace};

use super::Desktop;
use crate::error::{InputError, Result};
use crate::event::{Modifiers, SpecialKind};
use crate::input::KeyCode;
use crate::target::{KeyEvent, KeyListener, TargetId, TargetNode};

/// Character plus modifiers identifying a keyboard shortcut
///
/// The character is stored lowercased so `Ctrl+S` and `Ctrl+Shift+s` only
/// differ by their modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKey {
    pub ch: char,
    pub modifiers: Modifiers,
}

impl HotKey {
    pub fn new(ch: char, modifiers: Modifiers) -> Self {
        Self {
            ch: ch.to_lowercase().next().unwrap_or(ch),
            modifiers,
        }
    }
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifiers, self.ch.to_uppercase())
    }
}

#[derive(Debug, Clone, Copy)]
enum KeyCall {
    Stroke,
    Character,
    HotKey,
}

impl KeyCall {
    fn invoke(self, node: &mut TargetNode, id: TargetId, event: &KeyEvent) -> bool {
        let consumed = match self {
            Self::Stroke => node.target.on_key_stroke(event),
            Self::Character => node.target.on_character(event),
            Self::HotKey => node.target.on_hot_key(event),
        };
        node.listeners
            .notify_key(|listener: &mut (dyn KeyListener + 'static)| match self {
                Self::Stroke => listener.on_key_stroke(id, event),
                Self::Character => listener.on_character(id, event),
                Self::HotKey => listener.on_hot_key(id, event),
            });
        consumed
    }
}

impl Desktop {
    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus(&self) -> Option<TargetId> {
        self.focus
    }

    /// Moves keyboard focus, notifying the old and new focus targets
    pub fn set_focus(&mut self, focus: Option<TargetId>) -> Result<()> {
        if let Some(id) = focus
            && !self.tree.contains(id)
        {
            return Err(InputError::UnknownTarget(id));
        }
        if focus == self.focus {
            return Ok(());
        }

        if let Some(old) = self.focus
            && let Some(target) = self.tree.target_mut(old)
        {
            target.on_focus_changed(false);
        }
        self.focus = focus;
        if let Some(new) = focus
            && let Some(target) = self.tree.target_mut(new)
        {
            target.on_focus_changed(true);
        }
        debug!(?focus, "focus changed");
        Ok(())
    }

    /// Focuses the innermost focusable node of `target`'s chain, if any
    pub(crate) fn focus_chain_of(&mut self, target: TargetId) {
        let focusable = self.tree.ancestors(target).into_iter().find(|&id| {
            self.tree
                .target(id)
                .is_some_and(|target| target.accepts_focus())
        });
        if let Some(id) = focusable {
            let result = self.set_focus(Some(id));
            self.tolerate("focus press target", result);
        }
    }

    /// Cycles focus through visible focusable targets in tree order
    pub fn focus_next(&mut self) {
        let order = self.tree.focus_order();
        if order.is_empty() {
            return;
        }
        let index = self
            .focus
            .and_then(|focus| order.iter().position(|&id| id == focus))
            .map(|i| i + 1)
            .unwrap_or(0);
        let result = self.set_focus(Some(order[index % order.len()]));
        self.tolerate("focus next", result);
    }

    pub fn focus_previous(&mut self) {
        let order = self.tree.focus_order();
        if order.is_empty() {
            return;
        }
        let index = match self
            .focus
            .and_then(|focus| order.iter().position(|&id| id == focus))
        {
            Some(0) | None => order.len() - 1,
            Some(i) => i - 1,
        };
        let result = self.set_focus(Some(order[index]));
        self.tolerate("focus previous", result);
    }

    // =========================================================================
    // Hot keys
    // =========================================================================

    pub fn register_hot_key(&mut self, hot_key: HotKey, target: TargetId) -> Result<()> {
        if !self.tree.contains(target) {
            return Err(InputError::UnknownTarget(target));
        }
        if self.hot_keys.contains_key(&hot_key) {
            return Err(InputError::DuplicateHotKey(hot_key));
        }
        debug!(%hot_key, ?target, "hot key registered");
        self.hot_keys.insert(hot_key, target);
        Ok(())
    }

    pub fn unregister_hot_key(&mut self, hot_key: HotKey) -> Option<TargetId> {
        self.hot_keys.remove(&hot_key)
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Delivers a key event along the focus chain until a node consumes it
    fn route_key(&mut self, call: KeyCall, event: KeyEvent) -> Option<TargetId> {
        let start = self.focus.unwrap_or_else(|| self.tree.root());
        if let Some(target) = self.tree.target_mut(start) {
            target.on_any_key(&event);
        }
        self.bubble(start, |id, node, _| call.invoke(node, id, &event))
    }

    pub(crate) fn key_stroke(&mut self, key: KeyCode, modifiers: Modifiers, time: u64) {
        let event = KeyEvent {
            key: Some(key),
            character: None,
            modifiers,
            time,
        };
        let consumer = self.route_key(KeyCall::Stroke, event);
        trace!(?key, ?consumer, "key stroke");
        if consumer.is_some() {
            self.consumed_keys.push(key);
        }
    }

    pub(crate) fn character(&mut self, ch: char, modifiers: Modifiers, time: u64) {
        let event = KeyEvent {
            key: None,
            character: Some(ch),
            modifiers,
            time,
        };
        let consumer = self.route_key(KeyCall::Character, event);
        trace!(?ch, ?consumer, "character");
    }

    pub(crate) fn hot_key(&mut self, ch: char, modifiers: Modifiers, time: u64) {
        let hot_key = HotKey::new(ch, modifiers);
        let event = KeyEvent {
            key: None,
            character: Some(ch),
            modifiers,
            time,
        };

        if let Some(&target) = self.hot_keys.get(&hot_key)
            && let Some(node) = self.tree.node_mut(target)
        {
            debug!(%hot_key, ?target, "registered hot key");
            KeyCall::HotKey.invoke(node, target, &event);
            return;
        }

        let consumer = self.route_key(KeyCall::HotKey, event);
        trace!(%hot_key, ?consumer, "unregistered hot key");
    }

    pub(crate) fn special(&mut self, kind: SpecialKind, modifiers: Modifiers, time: u64) {
        if kind == SpecialKind::Cancel {
            if self.cancel_dragging() {
                return;
            }
            // The hover tooltip never counts as the topmost popup
            self.close_tooltip();
            if let Some(&popup) = self.popups.last() {
                let result = self.cancel_popup(popup).map(|_| ());
                self.tolerate("cancel topmost popup", result);
                return;
            }
        }

        let event = KeyEvent {
            key: None,
            character: None,
            modifiers,
            time,
        };
        let start = self.focus.unwrap_or_else(|| self.tree.root());
        let consumer = self.bubble(start, |_, node, _| node.target.on_special(kind, &event));
        trace!(?kind, ?consumer, "special");
        if consumer.is_some() {
            return;
        }

        match kind {
            SpecialKind::FocusNext => self.focus_next(),
            SpecialKind::FocusPrevious => self.focus_previous(),
            SpecialKind::Cancel | SpecialKind::Confirm => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::DispatchConfig;
    use crate::event::InputEvent;
    use crate::geometry::{Point, Rect, Size};
    use crate::target::EventTarget;

    #[derive(Default)]
    struct Field {
        focusable: bool,
        focused: bool,
        consume: bool,
        typed: String,
        strokes: Vec<KeyCode>,
        any_keys: usize,
        hot_keys: usize,
        specials: Vec<SpecialKind>,
    }

    impl EventTarget for Field {
        fn accepts_focus(&self) -> bool {
            self.focusable
        }

        fn on_focus_changed(&mut self, focused: bool) {
            self.focused = focused;
        }

        fn on_any_key(&mut self, _event: &KeyEvent) {
            self.any_keys += 1;
        }

        fn on_key_stroke(&mut self, event: &KeyEvent) -> bool {
            self.strokes.extend(event.key);
            self.consume
        }

        fn on_character(&mut self, event: &KeyEvent) -> bool {
            self.typed.extend(event.character);
            self.consume
        }

        fn on_hot_key(&mut self, _event: &KeyEvent) -> bool {
            self.hot_keys += 1;
            true
        }

        fn on_special(&mut self, kind: SpecialKind, _event: &KeyEvent) -> bool {
            self.specials.push(kind);
            self.consume
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Typed(String);

    impl KeyListener for Typed {
        fn on_character(&mut self, _node: TargetId, event: &KeyEvent) {
            self.0.extend(event.character);
        }
    }

    struct Form {
        desktop: Desktop,
        window: TargetId,
        first: TargetId,
        second: TargetId,
    }

    fn form() -> Form {
        let mut desktop = Desktop::new(Size::new(640, 480), DispatchConfig::default());
        let root = desktop.root();
        let window = desktop
            .insert(
                root,
                Field {
                    consume: true,
                    ..Default::default()
                },
                Rect::new(0, 0, 300, 300),
            )
            .unwrap();
        let field = || Field {
            focusable: true,
            ..Default::default()
        };
        let first = desktop
            .insert(window, field(), Rect::new(10, 10, 100, 20))
            .unwrap();
        let second = desktop
            .insert(window, field(), Rect::new(10, 40, 100, 20))
            .unwrap();
        Form {
            desktop,
            window,
            first,
            second,
        }
    }

    fn field(desktop: &Desktop, id: TargetId) -> &Field {
        desktop.tree().get_as::<Field>(id).unwrap()
    }

    #[test]
    fn test_press_focuses_innermost_focusable() {
        let Form {
            mut desktop,
            second,
            ..
        } = form();
        desktop.warp_pointer(Point::new(20, 45));
        desktop.add_event(InputEvent::pointer_button(true, true, Modifiers::empty(), 0));
        desktop.process_events();
        assert_eq!(desktop.focus(), Some(second));
        assert!(field(&desktop, second).focused);
    }

    #[test]
    fn test_characters_bubble_until_consumed() {
        let Form {
            mut desktop,
            window,
            first,
            ..
        } = form();
        let typed = Rc::new(RefCell::new(Typed::default()));
        desktop.tree_mut().listeners_mut(first).unwrap().add_key(&typed);
        desktop.set_focus(Some(first)).unwrap();

        desktop.add_event(InputEvent::character('h', Modifiers::empty(), 0));
        desktop.add_event(InputEvent::key_stroke(KeyCode::A, Modifiers::empty(), 0));
        let report = desktop.process_events();

        assert_eq!(field(&desktop, first).typed, "h");
        assert_eq!(field(&desktop, first).any_keys, 2);
        // The window consumed both after the field declined
        assert_eq!(field(&desktop, window).typed, "h");
        assert_eq!(field(&desktop, window).any_keys, 0);
        assert_eq!(typed.borrow().0, "h");
        assert_eq!(report.consumed_keys, vec![KeyCode::A]);
    }

    #[test]
    fn test_hot_key_registration() {
        let Form {
            mut desktop,
            second,
            first,
            ..
        } = form();
        let save = HotKey::new('S', Modifiers::CTRL);
        assert_eq!(save.to_string(), "Ctrl+S");
        desktop.register_hot_key(save, second).unwrap();
        assert_eq!(
            desktop.register_hot_key(save, first),
            Err(InputError::DuplicateHotKey(save))
        );

        desktop.set_focus(Some(first)).unwrap();
        desktop.add_event(InputEvent::hot_key('s', Modifiers::CTRL, 0));
        desktop.process_events();
        assert_eq!(field(&desktop, second).hot_keys, 1);
        assert_eq!(field(&desktop, first).hot_keys, 0);

        // Removing the target drops its registration
        desktop.remove_target(second).unwrap();
        assert_eq!(desktop.unregister_hot_key(save), None);
    }

    #[test]
    fn test_focus_cycling_wraps() {
        let Form {
            mut desktop,
            first,
            second,
            ..
        } = form();
        let next = || InputEvent::special(SpecialKind::FocusNext, Modifiers::empty(), 0);
        let previous = || InputEvent::special(SpecialKind::FocusPrevious, Modifiers::empty(), 0);

        desktop.add_event(next());
        desktop.process_events();
        assert_eq!(desktop.focus(), Some(first));

        desktop.focus_next();
        assert_eq!(desktop.focus(), Some(second));
        desktop.focus_next();
        assert_eq!(desktop.focus(), Some(first));
        desktop.focus_previous();
        assert_eq!(desktop.focus(), Some(second));
        assert!(!field(&desktop, first).focused);

        // Window consumes specials bubbling from the focused field
        desktop.add_event(previous());
        desktop.process_events();
        assert_eq!(desktop.focus(), Some(second));
        assert_eq!(field(&desktop, second).specials, vec![SpecialKind::FocusPrevious]);
    }

    #[test]
    fn test_cancel_closes_topmost_popup() {
        let Form { mut desktop, .. } = form();
        let popup = desktop
            .open_popup(Field::default(), Rect::new(400, 400, 10, 10))
            .unwrap();
        desktop.add_event(InputEvent::special(SpecialKind::Cancel, Modifiers::empty(), 0));
        desktop.process_events();
        assert!(!desktop.tree().contains(popup));
        assert!(desktop.popups().is_empty());
    }

    #[test]
    fn test_set_focus_rejects_unknown_target() {
        let Form {
            mut desktop, first, ..
        } = form();
        desktop.remove_target(first).unwrap();
        assert_eq!(
            desktop.set_focus(Some(first)),
            Err(InputError::UnknownTarget(first))
        );
    }

    struct Tipped;

    impl EventTarget for Tipped {
        fn tooltip(&self) -> Option<&str> {
            Some("Delete")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_cancel_skips_hover_tooltip() {
        let Form {
            mut desktop,
            window,
            first,
            ..
        } = form();
        let tipped = desktop
            .insert(window, Tipped, Rect::new(10, 70, 50, 20))
            .unwrap();
        desktop.set_focus(Some(first)).unwrap();
        let cancel = || InputEvent::special(SpecialKind::Cancel, Modifiers::empty(), 0);
        let move_to =
            |from: Point, to: Point| InputEvent::pointer_move(from, to, Modifiers::empty(), 0);

        desktop.add_event(move_to(Point::ZERO, Point::new(20, 75)));
        desktop.process_events();
        assert_eq!(desktop.hovered(), Some(tipped));
        assert!(desktop.tooltip().is_some());

        desktop.add_event(cancel());
        desktop.process_events();
        assert_eq!(desktop.tooltip(), None);
        assert_eq!(field(&desktop, window).specials, vec![SpecialKind::Cancel]);

        // A menu under a fresh tooltip is the one Escape closes
        let menu = desktop
            .open_popup(Field::default(), Rect::new(400, 400, 10, 10))
            .unwrap();
        desktop.add_event(move_to(Point::new(20, 75), Point::new(620, 300)));
        desktop.add_event(move_to(Point::new(620, 300), Point::new(20, 75)));
        desktop.process_events();
        assert!(desktop.tooltip().is_some());

        desktop.add_event(cancel());
        desktop.process_events();
        assert!(!desktop.tree().contains(menu));
        assert!(desktop.popups().is_empty());
        assert_eq!(field(&desktop, window).specials, vec![SpecialKind::Cancel]);
    }
}
