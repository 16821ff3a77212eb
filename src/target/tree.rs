//! Arena of event targets with index-based parent links

use slotmap::SlotMap;
use tracing::trace;

use super::{DesktopRoot, EventTarget, Listeners, TargetId};
use crate::error::{InputError, Result};
use crate::geometry::{Point, Rect, Size};

/// A target plus its place in the tree
pub struct TargetNode {
    pub(crate) target: Box<dyn EventTarget>,
    pub(crate) parent: Option<TargetId>,
    pub(crate) children: Vec<TargetId>,
    /// Origin relative to the parent, plus size
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) listeners: Listeners,
}

impl TargetNode {
    fn new(target: Box<dyn EventTarget>, parent: Option<TargetId>, bounds: Rect) -> Self {
        Self {
            target,
            parent,
            children: Vec::new(),
            bounds,
            visible: true,
            listeners: Listeners::default(),
        }
    }

    pub fn target(&self) -> &dyn EventTarget {
        self.target.as_ref()
    }

    pub fn parent(&self) -> Option<TargetId> {
        self.parent
    }

    pub fn children(&self) -> &[TargetId] {
        &self.children
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Tree of event targets rooted at the desktop
///
/// Children are ordered back to front: the last child is drawn on top and
/// wins hit tests.
pub struct TargetTree {
    nodes: SlotMap<TargetId, TargetNode>,
    root: TargetId,
}

impl TargetTree {
    /// Creates a tree whose root is a transparent [`DesktopRoot`]
    pub fn new(size: Size) -> Self {
        Self::with_root(Box::new(DesktopRoot), size)
    }

    pub fn with_root(root: Box<dyn EventTarget>, size: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let bounds = Rect::new(0, 0, size.width, size.height);
        let root = nodes.insert(TargetNode::new(root, None, bounds));
        Self { nodes, root }
    }

    pub fn root(&self) -> TargetId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Adds `target` as the topmost child of `parent`
    pub fn insert(
        &mut self,
        parent: TargetId,
        target: impl EventTarget + 'static,
        bounds: Rect,
    ) -> Result<TargetId> {
        self.insert_boxed(parent, Box::new(target), bounds)
    }

    pub fn insert_boxed(
        &mut self,
        parent: TargetId,
        target: Box<dyn EventTarget>,
        bounds: Rect,
    ) -> Result<TargetId> {
        if !self.nodes.contains_key(parent) {
            return Err(InputError::UnknownTarget(parent));
        }
        let name = target.name().to_string();
        let id = self
            .nodes
            .insert(TargetNode::new(target, Some(parent), bounds));
        self.nodes[parent].children.push(id);
        trace!(?id, ?parent, name, "inserted event target");
        Ok(id)
    }

    /// Detaches `id` and its descendants, returning every removed id
    ///
    /// Only the desktop may call this, so that dispatch state referring to
    /// the removed targets is released in the same step.
    pub(crate) fn remove_subtree(&mut self, id: TargetId) -> Result<Vec<TargetId>> {
        if id == self.root {
            return Err(InputError::RootTarget);
        }
        let parent = self
            .nodes
            .get(id)
            .ok_or(InputError::UnknownTarget(id))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&child| child != id);
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
                removed.push(next);
            }
        }
        Ok(removed)
    }

    pub fn node(&self, id: TargetId) -> Option<&TargetNode> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: TargetId) -> Option<&mut TargetNode> {
        self.nodes.get_mut(id)
    }

    pub fn target(&self, id: TargetId) -> Option<&dyn EventTarget> {
        self.nodes.get(id).map(|node| node.target.as_ref())
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut (dyn EventTarget + 'static)> {
        self.nodes.get_mut(id).map(|node| node.target.as_mut())
    }

    /// Downcasts a target to its concrete widget type
    pub fn get_as<T: 'static>(&self, id: TargetId) -> Option<&T> {
        self.target(id)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: 'static>(&mut self, id: TargetId) -> Option<&mut T> {
        self.target_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn parent(&self, id: TargetId) -> Option<TargetId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Origin relative to the parent's coordinate space
    pub fn origin(&self, id: TargetId) -> Result<Point> {
        self.nodes
            .get(id)
            .map(|node| node.bounds.origin())
            .ok_or(InputError::UnknownTarget(id))
    }

    /// Origin in desktop coordinates
    pub fn absolute_origin(&self, id: TargetId) -> Result<Point> {
        let mut origin = Point::ZERO;
        let mut current = Some(id);
        while let Some(next) = current {
            let node = self.nodes.get(next).ok_or(InputError::UnknownTarget(next))?;
            origin = origin + node.bounds.origin();
            current = node.parent;
        }
        Ok(origin)
    }

    pub fn set_bounds(&mut self, id: TargetId, bounds: Rect) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(InputError::UnknownTarget(id))?;
        node.bounds = bounds;
        Ok(())
    }

    pub fn set_visible(&mut self, id: TargetId, visible: bool) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(InputError::UnknownTarget(id))?;
        node.visible = visible;
        Ok(())
    }

    pub fn listeners_mut(&mut self, id: TargetId) -> Result<&mut Listeners> {
        self.nodes
            .get_mut(id)
            .map(|node| &mut node.listeners)
            .ok_or(InputError::UnknownTarget(id))
    }

    /// `id` followed by its parents up to the root
    pub fn ancestors(&self, id: TargetId) -> Vec<TargetId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id).map(|_| id);
        while let Some(next) = current {
            chain.push(next);
            current = self.nodes.get(next).and_then(|node| node.parent);
        }
        chain
    }

    /// True when `ancestor` is `id` itself or one of its parents
    pub fn is_ancestor_or_self(&self, ancestor: TargetId, id: TargetId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.parent(next);
        }
        false
    }

    /// Most specific visible target claiming a desktop position
    pub fn target_at(&self, position: Point) -> Option<TargetId> {
        self.hit(self.root, position)
    }

    fn hit(&self, id: TargetId, position: Point) -> Option<TargetId> {
        let node = self.nodes.get(id)?;
        if !node.visible || !node.bounds.contains(position) {
            return None;
        }
        let local = position - node.bounds.origin();
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.hit(child, local))
            .or_else(|| node.target.accepts_hit(local).then_some(id))
    }

    /// Focusable, visible targets in depth-first tree order
    pub fn focus_order(&self) -> Vec<TargetId> {
        let mut order = Vec::new();
        self.collect_focusable(self.root, &mut order);
        order
    }

    fn collect_focusable(&self, id: TargetId, order: &mut Vec<TargetId>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        if node.target.accepts_focus() {
            order.push(id);
        }
        for &child in &node.children {
            self.collect_focusable(child, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    #[derive(Default)]
    struct Panel {
        focusable: bool,
        transparent: bool,
    }

    impl EventTarget for Panel {
        fn accepts_hit(&self, _local: Point) -> bool {
            !self.transparent
        }

        fn accepts_focus(&self) -> bool {
            self.focusable
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn tree() -> (TargetTree, TargetId, TargetId) {
        let mut tree = TargetTree::new(Size::new(800, 600));
        let window = tree
            .insert(tree.root(), Panel::default(), Rect::new(100, 100, 200, 200))
            .unwrap();
        let button = tree
            .insert(window, Panel::default(), Rect::new(10, 10, 50, 20))
            .unwrap();
        (tree, window, button)
    }

    #[test]
    fn test_hit_resolves_most_specific_child() {
        let (tree, window, button) = tree();
        assert_eq!(tree.target_at(Point::new(115, 115)), Some(button));
        assert_eq!(tree.target_at(Point::new(250, 250)), Some(window));
        // Bare desktop is transparent
        assert_eq!(tree.target_at(Point::new(5, 5)), None);
        assert_eq!(tree.target_at(Point::new(900, 5)), None);
    }

    #[test]
    fn test_hidden_and_transparent_nodes_fall_through() {
        let (mut tree, window, button) = tree();
        tree.set_visible(button, false).unwrap();
        assert_eq!(tree.target_at(Point::new(115, 115)), Some(window));

        let overlay = tree
            .insert(
                window,
                Panel {
                    transparent: true,
                    ..Default::default()
                },
                Rect::new(0, 0, 200, 200),
            )
            .unwrap();
        assert_eq!(tree.target_at(Point::new(150, 150)), Some(window));
        assert!(tree.contains(overlay));
    }

    #[test]
    fn test_topmost_child_wins() {
        let (mut tree, window, _button) = tree();
        let cover = tree
            .insert(window, Panel::default(), Rect::new(0, 0, 100, 100))
            .unwrap();
        assert_eq!(tree.target_at(Point::new(115, 115)), Some(cover));
    }

    #[test]
    fn test_ancestors_and_origin() {
        let (tree, window, button) = tree();
        assert_eq!(tree.ancestors(button), vec![button, window, tree.root()]);
        assert_eq!(tree.absolute_origin(button).unwrap(), Point::new(110, 110));
        assert!(tree.is_ancestor_or_self(window, button));
        assert!(tree.is_ancestor_or_self(button, button));
        assert!(!tree.is_ancestor_or_self(button, window));
    }

    #[test]
    fn test_remove_subtree_invalidates_ids() {
        let (mut tree, window, button) = tree();
        let removed = tree.remove_subtree(window).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!tree.contains(button));
        assert!(tree.ancestors(button).is_empty());
        assert!(tree.node(tree.root()).unwrap().children().is_empty());

        // Stale handles stay stale even after the slot is reused
        let fresh = tree
            .insert(tree.root(), Panel::default(), Rect::new(0, 0, 10, 10))
            .unwrap();
        assert_ne!(fresh, window);
        assert!(matches!(
            tree.absolute_origin(window),
            Err(InputError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let (mut tree, _, _) = tree();
        let root = tree.root();
        assert_eq!(tree.remove_subtree(root), Err(InputError::RootTarget));
    }

    #[test]
    fn test_focus_order_is_depth_first() {
        let mut tree = TargetTree::new(Size::new(800, 600));
        let focusable = || Panel {
            focusable: true,
            ..Default::default()
        };
        let a = tree
            .insert(tree.root(), focusable(), Rect::new(0, 0, 100, 100))
            .unwrap();
        let a1 = tree.insert(a, focusable(), Rect::new(0, 0, 10, 10)).unwrap();
        let b = tree
            .insert(tree.root(), focusable(), Rect::new(100, 0, 100, 100))
            .unwrap();
        assert_eq!(tree.focus_order(), vec![a, a1, b]);

        tree.set_visible(a, false).unwrap();
        assert_eq!(tree.focus_order(), vec![b]);
    }

    #[test]
    fn test_downcast() {
        let (tree, window, _) = tree();
        assert!(tree.get_as::<Panel>(window).is_some());
        assert!(tree.get_as::<DesktopRoot>(window).is_none());
    }
}
