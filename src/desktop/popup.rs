//! Popups and the ancestry cancellation rule

use std::any::Any;

use tracing::debug;

use super::Desktop;
use crate::error::{InputError, Result};
use crate::geometry::{Point, Rect};
use crate::target::{EventTarget, TargetId, Verdict};

const TOOLTIP_CHAR_WIDTH: i32 = 7;
const TOOLTIP_PADDING: i32 = 8;
const TOOLTIP_HEIGHT: i32 = 18;

/// Transient text popup shown next to the pointer
///
/// Hit-transparent, so it never steals the hover it was opened for.
#[derive(Debug, Clone)]
pub struct Tooltip {
    pub text: String,
}

impl EventTarget for Tooltip {
    fn name(&self) -> &str {
        "tooltip"
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

impl Desktop {
    /// Open popups, oldest first
    pub fn popups(&self) -> &[TargetId] {
        &self.popups
    }

    /// Shows `target` as a popup on top of everything else
    pub fn open_popup(
        &mut self,
        target: impl EventTarget + 'static,
        bounds: Rect,
    ) -> Result<TargetId> {
        self.open_popup_boxed(Box::new(target), bounds)
    }

    pub fn open_popup_boxed(
        &mut self,
        target: Box<dyn EventTarget>,
        bounds: Rect,
    ) -> Result<TargetId> {
        let root = self.tree.root();
        let id = self.tree.insert_boxed(root, target, bounds)?;
        self.popups.push(id);
        debug!(?id, open = self.popups.len(), "popup opened");
        Ok(id)
    }

    /// Closes a popup unless the popup or one of its close listeners vetoes
    pub fn cancel_popup(&mut self, popup: TargetId) -> Result<Verdict> {
        if !self.popups.contains(&popup) {
            return Err(InputError::UnknownTarget(popup));
        }
        let node = self
            .tree
            .node_mut(popup)
            .ok_or(InputError::UnknownTarget(popup))?;

        let verdict = match node.target.on_closing() {
            Verdict::Veto => Verdict::Veto,
            Verdict::Proceed => node
                .listeners
                .ask_close(|listener| listener.on_closing(popup)),
        };
        if verdict.is_veto() {
            debug!(?popup, "popup close vetoed");
            return Ok(Verdict::Veto);
        }

        node.target.on_cancel();
        node.listeners
            .notify_close(|listener| listener.on_canceled(popup));
        debug!(?popup, "popup canceled");
        self.remove_target(popup)?;
        Ok(Verdict::Proceed)
    }

    /// Cancels every popup newer than the newest one containing `hit`
    ///
    /// With no hit target all popups are canceled. A vetoed close stops the
    /// walk, leaving older popups open.
    pub(crate) fn cancel_popups_above(&mut self, hit: Option<TargetId>) {
        let snapshot = self.popups.clone();
        for popup in snapshot.into_iter().rev() {
            if !self.tree.contains(popup) {
                continue;
            }
            if hit.is_some_and(|hit| self.tree.is_ancestor_or_self(popup, hit)) {
                break;
            }
            match self.cancel_popup(popup) {
                Ok(Verdict::Veto) => break,
                Ok(Verdict::Proceed) => {}
                Err(err) => self.tolerate("cancel popup", Err(err)),
            }
        }
    }

    pub(crate) fn open_tooltip(&mut self, text: String) {
        let [dx, dy] = self.config.tooltip_offset;
        let position = self.pointer + Point::new(dx, dy);
        let width = text.chars().count() as i32 * TOOLTIP_CHAR_WIDTH + TOOLTIP_PADDING;
        let bounds = Rect::new(position.x, position.y, width, TOOLTIP_HEIGHT);

        match self.open_popup(Tooltip { text }, bounds) {
            Ok(id) => self.tooltip = Some(id),
            Err(err) => self.tolerate("open tooltip", Err(err)),
        }
    }

    pub(crate) fn close_tooltip(&mut self) {
        let Some(tooltip) = self.tooltip.take() else {
            return;
        };
        if self.tree.contains(tooltip) {
            let result = self.cancel_popup(tooltip).map(|_| ());
            self.tolerate("close tooltip", result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::DispatchConfig;
    use crate::event::{InputEvent, Modifiers};
    use crate::geometry::Size;
    use crate::target::CloseListener;

    #[derive(Default)]
    struct Menu {
        veto: bool,
        canceled: bool,
    }

    impl EventTarget for Menu {
        fn on_closing(&mut self) -> Verdict {
            if self.veto {
                Verdict::Veto
            } else {
                Verdict::Proceed
            }
        }

        fn on_cancel(&mut self) {
            self.canceled = true;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Hover(&'static str);

    impl EventTarget for Hover {
        fn tooltip(&self) -> Option<&str> {
            Some(self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Closes(Vec<TargetId>);

    impl CloseListener for Closes {
        fn on_canceled(&mut self, popup: TargetId) {
            self.0.push(popup);
        }
    }

    fn desktop() -> Desktop {
        Desktop::new(Size::new(640, 480), DispatchConfig::default())
    }

    #[test]
    fn test_press_inside_popup_keeps_it_and_older() {
        let mut desktop = desktop();
        let menu = desktop
            .open_popup(Menu::default(), Rect::new(0, 0, 100, 100))
            .unwrap();
        let submenu = desktop
            .open_popup(Menu::default(), Rect::new(100, 0, 100, 100))
            .unwrap();
        let item = desktop
            .insert(menu, Menu::default(), Rect::new(0, 0, 100, 20))
            .unwrap();

        desktop.cancel_popups_above(Some(item));
        assert_eq!(desktop.popups(), &[menu]);
        assert!(!desktop.tree().contains(submenu));
    }

    #[test]
    fn test_no_hit_cancels_all_and_notifies() {
        let mut desktop = desktop();
        let menu = desktop
            .open_popup(Menu::default(), Rect::new(0, 0, 100, 100))
            .unwrap();
        let closes = Rc::new(RefCell::new(Closes::default()));
        desktop.tree_mut().listeners_mut(menu).unwrap().add_close(&closes);

        desktop.warp_pointer(Point::new(600, 400));
        desktop.add_event(InputEvent::pointer_button(true, true, Modifiers::empty(), 0));
        desktop.process_events();

        assert!(desktop.popups().is_empty());
        assert_eq!(closes.borrow().0, vec![menu]);
    }

    #[test]
    fn test_veto_keeps_popup_and_stops_walk() {
        let mut desktop = desktop();
        let older = desktop
            .open_popup(Menu::default(), Rect::new(0, 0, 50, 50))
            .unwrap();
        let sticky = desktop
            .open_popup(
                Menu {
                    veto: true,
                    ..Default::default()
                },
                Rect::new(50, 0, 50, 50),
            )
            .unwrap();
        let newest = desktop
            .open_popup(Menu::default(), Rect::new(100, 0, 50, 50))
            .unwrap();

        desktop.cancel_popups_above(None);
        assert_eq!(desktop.popups(), &[older, sticky]);
        assert!(!desktop.tree().contains(newest));
        assert!(!desktop.tree().get_as::<Menu>(sticky).unwrap().canceled);
        assert_eq!(desktop.cancel_popup(sticky), Ok(Verdict::Veto));
    }

    #[test]
    fn test_hover_opens_and_closes_tooltip() {
        let mut desktop = desktop();
        let root = desktop.root();
        let button = desktop
            .insert(root, Hover("Save"), Rect::new(0, 0, 50, 20))
            .unwrap();

        desktop.add_event(InputEvent::pointer_move(
            Point::new(300, 300),
            Point::new(10, 10),
            Modifiers::empty(),
            0,
        ));
        desktop.process_events();
        assert_eq!(desktop.hovered(), Some(button));
        let tooltip = desktop.tooltip().unwrap();
        let node = desktop.tree().node(tooltip).unwrap();
        assert_eq!(node.bounds(), Rect::new(10, 30, 36, 18));
        assert_eq!(desktop.tree().get_as::<Tooltip>(tooltip).unwrap().text, "Save");

        desktop.add_event(InputEvent::pointer_move(
            Point::new(10, 10),
            Point::new(300, 300),
            Modifiers::empty(),
            10,
        ));
        desktop.process_events();
        assert_eq!(desktop.hovered(), None);
        assert_eq!(desktop.tooltip(), None);
        assert!(!desktop.tree().contains(tooltip));
        assert!(desktop.popups().is_empty());
    }

    #[test]
    fn test_cancel_popup_rejects_plain_targets() {
        let mut desktop = desktop();
        let root = desktop.root();
        let panel = desktop
            .insert(root, Menu::default(), Rect::new(0, 0, 50, 50))
            .unwrap();

        assert_eq!(
            desktop.cancel_popup(panel),
            Err(InputError::UnknownTarget(panel))
        );
        assert!(desktop.tree().contains(panel));
        assert!(!desktop.tree().get_as::<Menu>(panel).unwrap().canceled);
    }
}
