//! Typed listener registries attached to event targets
//!
//! Listeners are weak observers: a target never keeps a listener alive, and
//! registries prune dead entries whenever they fan out.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{DropEvent, KeyEvent, PointerEvent, TargetId, Verdict};

/// Observer of pointer button gestures on a target
pub trait PointerListener {
    fn on_press(&mut self, _node: TargetId, _event: &PointerEvent) {}
    fn on_release(&mut self, _node: TargetId, _event: &PointerEvent) {}
    fn on_click(&mut self, _node: TargetId, _event: &PointerEvent) {}
    fn on_double_click(&mut self, _node: TargetId, _event: &PointerEvent) {}
    fn on_context_click(&mut self, _node: TargetId, _event: &PointerEvent) {}
}

/// Observer of keyboard input delivered to a target
pub trait KeyListener {
    fn on_key_stroke(&mut self, _node: TargetId, _event: &KeyEvent) {}
    fn on_character(&mut self, _node: TargetId, _event: &KeyEvent) {}
    fn on_hot_key(&mut self, _node: TargetId, _event: &KeyEvent) {}
}

/// Observer of completed drops onto a target
pub trait DropListener {
    fn on_dropped(&mut self, node: TargetId, event: &DropEvent);
}

/// Observer of popup dismissal, with veto power over the close
pub trait CloseListener {
    fn on_closing(&mut self, _popup: TargetId) -> Verdict {
        Verdict::Proceed
    }

    fn on_canceled(&mut self, _popup: TargetId) {}
}

struct Registry<T: ?Sized> {
    entries: Vec<Weak<RefCell<T>>>,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> Registry<T> {
    fn push(&mut self, listener: Weak<RefCell<T>>) {
        self.entries.push(listener);
    }

    fn live(&mut self) -> Vec<Rc<RefCell<T>>> {
        self.entries.retain(|weak| weak.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    fn notify(&mut self, mut f: impl FnMut(&mut T)) {
        for listener in self.live() {
            f(&mut *listener.borrow_mut());
        }
    }

    /// Asks listeners in registration order; the first veto wins
    fn ask(&mut self, mut f: impl FnMut(&mut T) -> Verdict) -> Verdict {
        for listener in self.live() {
            if f(&mut *listener.borrow_mut()).is_veto() {
                return Verdict::Veto;
            }
        }
        Verdict::Proceed
    }

    fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// All listener registries of one target
#[derive(Default)]
pub struct Listeners {
    pointer: Registry<dyn PointerListener>,
    key: Registry<dyn KeyListener>,
    drop: Registry<dyn DropListener>,
    close: Registry<dyn CloseListener>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("pointer", &self.pointer.len())
            .field("key", &self.key.len())
            .field("drop", &self.drop.len())
            .field("close", &self.close.len())
            .finish()
    }
}

impl Listeners {
    pub fn add_pointer<L: PointerListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        let strong: Rc<RefCell<dyn PointerListener>> = listener.clone();
        self.pointer.push(Rc::downgrade(&strong));
    }

    pub fn add_key<L: KeyListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        let strong: Rc<RefCell<dyn KeyListener>> = listener.clone();
        self.key.push(Rc::downgrade(&strong));
    }

    pub fn add_drop<L: DropListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        let strong: Rc<RefCell<dyn DropListener>> = listener.clone();
        self.drop.push(Rc::downgrade(&strong));
    }

    pub fn add_close<L: CloseListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        let strong: Rc<RefCell<dyn CloseListener>> = listener.clone();
        self.close.push(Rc::downgrade(&strong));
    }

    /// Number of live listeners across all registries
    pub fn len(&self) -> usize {
        self.pointer.len() + self.key.len() + self.drop.len() + self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn notify_pointer(&mut self, f: impl FnMut(&mut (dyn PointerListener + 'static))) {
        self.pointer.notify(f);
    }

    pub(crate) fn notify_key(&mut self, f: impl FnMut(&mut (dyn KeyListener + 'static))) {
        self.key.notify(f);
    }

    pub(crate) fn notify_drop(&mut self, f: impl FnMut(&mut (dyn DropListener + 'static))) {
        self.drop.notify(f);
    }

    pub(crate) fn notify_close(&mut self, f: impl FnMut(&mut (dyn CloseListener + 'static))) {
        self.close.notify(f);
    }

    pub(crate) fn ask_close(
        &mut self,
        f: impl FnMut(&mut (dyn CloseListener + 'static)) -> Verdict,
    ) -> Verdict {
        self.close.ask(f)
    }
}
