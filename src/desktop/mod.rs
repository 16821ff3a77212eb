//! Desktop dispatch state
//!
//! The [`Desktop`] owns the target tree, the per-frame event queue and the
//! state of in-flight gestures: press targets, the drag surrogate, popups,
//! hover, focus and hot keys. It is an ordinary value passed to whoever
//! runs the frame; nothing here is global.
//!
//! # Frame
//!
//! ```text
//! add_event() / EventSender::send()  (any time)
//!           ↓
//! process_events()   drain queue → InputEvent::execute() one by one
//!           ↓
//! FrameReport        consumed key strokes for the quantity layer
//! ```

mod keys;
mod pointer;
mod popup;
mod surrogate;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::event::{InputEvent, Modifiers};
use crate::geometry::{Point, Rect, Size};
use crate::input::KeyCode;
use crate::target::{
    EventTarget, PointerButton, PointerEvent, PointerListener, PointerType, TargetId, TargetNode,
    TargetTree,
};

pub use keys::HotKey;
pub use popup::Tooltip;
pub use surrogate::{BasicSurrogate, DraggingSurrogate};

/// Outcome of one [`Desktop::process_events`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of events executed
    pub executed: usize,
    /// Keys whose strokes a widget consumed this frame
    pub consumed_keys: Vec<KeyCode>,
}

/// Thread-safe handle for queueing events from worker threads
///
/// Events sent here are moved into the desktop queue at the start of the
/// next [`Desktop::process_events`]; workers never touch dispatch state.
#[derive(Clone, Default)]
pub struct EventSender {
    deferred: Arc<Mutex<Vec<InputEvent>>>,
}

impl EventSender {
    pub fn send(&self, event: InputEvent) {
        self.deferred.lock().push(event);
    }

    fn drain(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.deferred.lock())
    }
}

/// Pointer-style handlers, delivered outermost ancestor first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerCall {
    Press,
    Release,
    Click,
    DoubleClick,
    ContextClick,
}

impl PointerCall {
    fn invoke(self, target: &mut dyn EventTarget, event: &PointerEvent) -> bool {
        match self {
            Self::Press => target.on_press(event),
            Self::Release => target.on_release(event),
            Self::Click => target.on_click(event),
            Self::DoubleClick => target.on_double_click(event),
            Self::ContextClick => target.on_context_click(event),
        }
    }

    fn notify(self, listener: &mut dyn PointerListener, node: TargetId, event: &PointerEvent) {
        match self {
            Self::Press => listener.on_press(node, event),
            Self::Release => listener.on_release(node, event),
            Self::Click => listener.on_click(node, event),
            Self::DoubleClick => listener.on_double_click(node, event),
            Self::ContextClick => listener.on_context_click(node, event),
        }
    }
}

/// Owner of all input dispatch state for one running session
pub struct Desktop {
    tree: TargetTree,
    config: DispatchConfig,
    queue: VecDeque<InputEvent>,
    sender: EventSender,

    pointer: Point,
    pointer_type: PointerType,

    primary_press_target: Option<TargetId>,
    secondary_press_target: Option<TargetId>,
    dragging_surrogate: Option<Box<dyn DraggingSurrogate>>,
    /// The drag threshold was crossed during the current primary press
    dragging_tested: bool,
    /// A surrogate existed at some point during the current primary press
    dragged: bool,
    primary_press_time: Option<u64>,
    primary_press_position: Point,

    /// Open popups, oldest first
    popups: Vec<TargetId>,
    tooltip: Option<TargetId>,
    hovered: Option<TargetId>,
    focus: Option<TargetId>,
    hot_keys: HashMap<HotKey, TargetId>,

    consumed_keys: Vec<KeyCode>,
    last_events: Vec<String>,
}

impl Desktop {
    /// Creates a desktop of the given size with a transparent root
    pub fn new(size: Size, config: DispatchConfig) -> Self {
        Self::with_tree(TargetTree::new(size), config)
    }

    pub fn with_tree(tree: TargetTree, config: DispatchConfig) -> Self {
        Self {
            tree,
            config,
            queue: VecDeque::new(),
            sender: EventSender::default(),
            pointer: Point::ZERO,
            pointer_type: PointerType::default(),
            primary_press_target: None,
            secondary_press_target: None,
            dragging_surrogate: None,
            dragging_tested: false,
            dragged: false,
            primary_press_time: None,
            primary_press_position: Point::ZERO,
            popups: Vec::new(),
            tooltip: None,
            hovered: None,
            focus: None,
            hot_keys: HashMap::new(),
            consumed_keys: Vec::new(),
            last_events: Vec::new(),
        }
    }

    // =========================================================================
    // Tree
    // =========================================================================

    pub fn tree(&self) -> &TargetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TargetTree {
        &mut self.tree
    }

    pub fn root(&self) -> TargetId {
        self.tree.root()
    }

    /// Adds a target as the topmost child of `parent`
    pub fn insert(
        &mut self,
        parent: TargetId,
        target: impl EventTarget + 'static,
        bounds: Rect,
    ) -> Result<TargetId> {
        self.tree.insert(parent, target, bounds)
    }

    /// Destroys a target and its descendants, releasing dispatch references
    pub fn remove_target(&mut self, id: TargetId) -> Result<()> {
        let removed = self.tree.remove_subtree(id)?;
        for removed_id in removed {
            self.release_references(removed_id);
        }
        Ok(())
    }

    /// Forgets every piece of dispatch state that refers to `id`
    pub(crate) fn release_references(&mut self, id: TargetId) {
        if self.primary_press_target == Some(id) {
            debug!(?id, "releasing destroyed primary press target");
            self.cancel_dragging();
            self.primary_press_target = None;
            self.dragging_tested = false;
        }
        if self.secondary_press_target == Some(id) {
            self.secondary_press_target = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.focus == Some(id) {
            self.focus = None;
        }
        if self.tooltip == Some(id) {
            self.tooltip = None;
        }
        self.popups.retain(|&popup| popup != id);
        self.hot_keys.retain(|_, target| *target != id);
    }

    // =========================================================================
    // Queue
    // =========================================================================

    pub fn add_event(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Handle for queueing events from other threads
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Executes every queued event in FIFO order
    ///
    /// Events queued while this runs wait for the next call.
    pub fn process_events(&mut self) -> FrameReport {
        self.last_events.clear();
        self.consumed_keys.clear();

        self.queue.extend(self.sender.drain());
        let events = std::mem::take(&mut self.queue);
        let executed = events.len();

        for event in events {
            trace!(?event, "executing input event");
            self.last_events.push(format!("{:?}", event.kind));
            event.execute(self);
        }

        debug_assert!(
            self.dragging_surrogate.is_none() || self.primary_press_target.is_some(),
            "drag surrogate without a primary press"
        );

        FrameReport {
            executed,
            consumed_keys: std::mem::take(&mut self.consumed_keys),
        }
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DispatchConfig) {
        self.config = config;
    }

    pub fn pointer_position(&self) -> Point {
        self.pointer
    }

    /// Moves the pointer without generating hover or drag activity
    pub fn warp_pointer(&mut self, position: Point) {
        self.pointer = position;
    }

    pub fn pointer_type(&self) -> PointerType {
        self.pointer_type
    }

    pub fn primary_press_target(&self) -> Option<TargetId> {
        self.primary_press_target
    }

    pub fn secondary_press_target(&self) -> Option<TargetId> {
        self.secondary_press_target
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_surrogate.is_some()
    }

    pub fn dragging_surrogate(&self) -> Option<&dyn DraggingSurrogate> {
        self.dragging_surrogate.as_deref()
    }

    pub fn hovered(&self) -> Option<TargetId> {
        self.hovered
    }

    pub fn tooltip(&self) -> Option<TargetId> {
        self.tooltip
    }

    /// Events executed during the last [`process_events`](Self::process_events)
    pub fn debug_last_events(&self) -> &[String] {
        &self.last_events
    }

    // =========================================================================
    // Delivery helpers
    // =========================================================================

    /// Delivers a pointer gesture to `target` and all its ancestors,
    /// outermost first; returns whether any of them consumed it
    pub(crate) fn deliver_pointer(
        &mut self,
        target: TargetId,
        call: PointerCall,
        button: PointerButton,
        modifiers: Modifiers,
        time: u64,
    ) -> bool {
        let position = self.pointer;
        let chain = self.tree.ancestors(target);
        trace!(?target, ?call, depth = chain.len(), "delivering pointer gesture");

        let mut consumed = false;
        for &node_id in chain.iter().rev() {
            let Ok(origin) = self.tree.absolute_origin(node_id) else {
                continue;
            };
            let Some(node) = self.tree.node_mut(node_id) else {
                continue;
            };
            let event = PointerEvent {
                target,
                position,
                local: position - origin,
                button,
                modifiers,
                time,
            };
            consumed |= call.invoke(node.target.as_mut(), &event);
            node.listeners
                .notify_pointer(|listener| call.notify(listener, node_id, &event));
        }
        consumed
    }

    /// Walks from `start` towards the root until `visit` consumes
    ///
    /// `visit` receives the node, its id and the pointer position relative
    /// to the node. Returns the consuming node.
    pub(crate) fn bubble(
        &mut self,
        start: TargetId,
        mut visit: impl FnMut(TargetId, &mut TargetNode, Point) -> bool,
    ) -> Option<TargetId> {
        for node_id in self.tree.ancestors(start) {
            let Ok(origin) = self.tree.absolute_origin(node_id) else {
                continue;
            };
            let local = self.pointer - origin;
            let Some(node) = self.tree.node_mut(node_id) else {
                continue;
            };
            if visit(node_id, node, local) {
                return Some(node_id);
            }
        }
        None
    }

    // =========================================================================
    // Hover and pointer shape
    // =========================================================================

    /// Re-resolves the target under the pointer and updates hover state
    fn update_hover(&mut self) {
        let under = self.tree.target_at(self.pointer);
        if under == self.hovered {
            return;
        }
        let position = self.pointer;

        if let Some(old) = self.hovered.take()
            && let Some(target) = self.tree.target_mut(old)
        {
            target.on_hover(false, position);
        }
        self.close_tooltip();

        self.hovered = under;
        let Some(new) = under else {
            return;
        };
        if let Some(target) = self.tree.target_mut(new) {
            target.on_hover(true, position);
        }
        let text = self
            .tree
            .target(new)
            .and_then(|target| target.tooltip())
            .map(str::to_owned);
        if let Some(text) = text {
            self.open_tooltip(text);
        }
    }

    /// Whether the active surrogate may drop onto whatever is under the pointer
    fn drop_supported_at_pointer(&self) -> bool {
        let (Some(surrogate), Some(dragged)) =
            (self.dragging_surrogate.as_deref(), self.primary_press_target)
        else {
            return false;
        };
        let drop_target = self
            .tree
            .target_at(self.pointer)
            .unwrap_or_else(|| self.tree.root());
        self.supports_dropping(surrogate, dragged, drop_target)
    }

    fn supports_dropping(
        &self,
        surrogate: &dyn DraggingSurrogate,
        dragged: TargetId,
        drop_target: TargetId,
    ) -> bool {
        let (Ok(origin), Some(target)) = (
            self.tree.absolute_origin(drop_target),
            self.tree.target(drop_target),
        ) else {
            return false;
        };
        surrogate.supports_dropping(dragged, drop_target, target, self.pointer - origin)
    }

    /// Recomputes the pointer shape hint
    pub(crate) fn update_pointer_type(&mut self) {
        let pointer_type = match self.dragging_surrogate.as_deref() {
            Some(surrogate) => {
                if self.drop_supported_at_pointer() {
                    surrogate.supporting_pointer_type()
                } else {
                    surrogate.unsupporting_pointer_type()
                }
            }
            None => self
                .tree
                .target_at(self.pointer)
                .and_then(|id| self.tree.target(id))
                .map(|target| target.pointer_type())
                .unwrap_or_default(),
        };
        if pointer_type != self.pointer_type {
            trace!(?pointer_type, "pointer type changed");
            self.pointer_type = pointer_type;
        }
    }

    /// Logs a programmer error that release builds tolerate
    pub(crate) fn tolerate(&self, context: &str, result: Result<()>) {
        if let Err(err) = result {
            warn!(%err, context, "ignoring input error");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Block;

    impl EventTarget for Block {
        fn pointer_type(&self) -> PointerType {
            PointerType::Hand
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Order {
        seen: Vec<TargetId>,
    }

    impl PointerListener for Order {
        fn on_press(&mut self, node: TargetId, _event: &PointerEvent) {
            self.seen.push(node);
        }
    }

    #[test]
    fn test_deliver_pointer_runs_outermost_first_with_local_coordinates() {
        let mut desktop = Desktop::new(Size::new(640, 480), DispatchConfig::default());
        let root = desktop.root();
        let window = desktop.insert(root, Block, Rect::new(100, 50, 200, 200)).unwrap();
        let button = desktop.insert(window, Block, Rect::new(10, 10, 40, 20)).unwrap();

        let order = Rc::new(RefCell::new(Order::default()));
        for id in [root, window, button] {
            desktop.tree_mut().listeners_mut(id).unwrap().add_pointer(&order);
        }

        desktop.warp_pointer(Point::new(115, 65));
        desktop.deliver_pointer(
            button,
            PointerCall::Press,
            PointerButton::Primary,
            Modifiers::empty(),
            0,
        );
        assert_eq!(order.borrow().seen, vec![root, window, button]);
    }

    #[test]
    fn test_sender_events_are_processed_next_frame() {
        let mut desktop = Desktop::new(Size::new(640, 480), DispatchConfig::default());
        let sender = desktop.sender();
        let worker = std::thread::spawn(move || {
            sender.send(InputEvent::wheel(1, Modifiers::empty(), 0));
        });
        worker.join().unwrap();

        assert_eq!(desktop.pending_events(), 0);
        let report = desktop.process_events();
        assert_eq!(report.executed, 1);
        assert_eq!(desktop.debug_last_events().len(), 1);
        assert_eq!(desktop.process_events().executed, 0);
    }

    #[test]
    fn test_pointer_type_follows_target_under_pointer() {
        let mut desktop = Desktop::new(Size::new(640, 480), DispatchConfig::default());
        let root = desktop.root();
        desktop.insert(root, Block, Rect::new(0, 0, 10, 10)).unwrap();

        desktop.warp_pointer(Point::new(5, 5));
        desktop.update_pointer_type();
        assert_eq!(desktop.pointer_type(), PointerType::Hand);

        desktop.warp_pointer(Point::new(50, 50));
        desktop.update_pointer_type();
        assert_eq!(desktop.pointer_type(), PointerType::Arrow);
    }

    #[test]
    fn test_remove_target_releases_references() {
        let mut desktop = Desktop::new(Size::new(640, 480), DispatchConfig::default());
        let root = desktop.root();
        let window = desktop.insert(root, Block, Rect::new(0, 0, 100, 100)).unwrap();
        let child = desktop.insert(window, Block, Rect::new(0, 0, 10, 10)).unwrap();

        desktop.warp_pointer(Point::new(5, 5));
        desktop.add_event(InputEvent::pointer_button(true, true, Modifiers::empty(), 0));
        desktop.process_events();
        assert_eq!(desktop.primary_press_target(), Some(child));

        desktop.remove_target(window).unwrap();
        assert_eq!(desktop.primary_press_target(), None);
        assert!(!desktop.tree().contains(child));

        // The orphaned release is ignored
        desktop.add_event(InputEvent::pointer_button(false, true, Modifiers::empty(), 10));
        assert_eq!(desktop.process_events().executed, 1);
    }
}
