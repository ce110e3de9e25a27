use super::{MenuGroup, MenuNode};
use crate::call::DigitSink;
use crate::event::{EventSender, SessionEvent};
use anyhow::{bail, Result};
use std::sync::Arc;

/// Traversal cursor over a static IVR menu tree.
///
/// Holds the currently displayed sibling group plus back/forward history
/// stacks. Selecting an option with children descends into it and emits the
/// option's DTMF digits through the [`DigitSink`] seam; back/forward rewind
/// the display only and never re-signal the remote IVR, whose own menu
/// position is not rewound by a local undo.
///
/// One navigator per active call session, driven synchronously from the
/// presentation layer. A `MenuChanged` event is broadcast whenever the
/// displayed group changes.
pub struct MenuNavigator {
    current: MenuGroup,
    back: Vec<MenuGroup>,
    forward: Vec<MenuGroup>,
    sink: Arc<dyn DigitSink>,
    event_sender: EventSender,
}

impl MenuNavigator {
    pub fn new(root: &Arc<MenuNode>, sink: Arc<dyn DigitSink>, event_sender: EventSender) -> Self {
        Self {
            current: root.children.clone(),
            back: Vec::new(),
            forward: Vec::new(),
            sink,
            event_sender,
        }
    }

    /// The sibling group currently on display, in selection order.
    pub fn current_options(&self) -> &[Arc<MenuNode>] {
        &self.current
    }

    pub fn option_at(&self, index: usize) -> Option<Arc<MenuNode>> {
        self.current.get(index).cloned()
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Select one of the currently displayed options.
    ///
    /// The option's digits are always handed to the call layer (unless
    /// empty). If the option has children the display descends into them,
    /// recording the outgoing group on the back stack and discarding any
    /// forward history; a leaf leaves the display untouched.
    ///
    /// Passing a node that is not part of the current group is a contract
    /// violation: it means presentation and navigator state have diverged.
    pub fn select_option(&mut self, option: &Arc<MenuNode>) -> Result<()> {
        if !self.current.iter().any(|n| Arc::ptr_eq(n, option)) {
            bail!(
                "option '{}' is not part of the current menu group",
                option.title
            );
        }
        if !option.digit.is_empty() {
            self.sink.send_digit(&option.digit);
        }
        if !option.children.is_empty() {
            let previous = std::mem::replace(&mut self.current, option.children.clone());
            self.back.push(previous);
            self.forward.clear();
            self.notify_changed();
        }
        Ok(())
    }

    /// Return to the previously displayed group. Safe no-op when there is
    /// no history; never transmits digits.
    pub fn go_back(&mut self) {
        if let Some(previous) = self.back.pop() {
            let current = std::mem::replace(&mut self.current, previous);
            self.forward.push(current);
            self.notify_changed();
        }
    }

    /// Redo a group undone by [`go_back`](Self::go_back). Safe no-op when
    /// there is no forward history; never transmits digits.
    pub fn go_forward(&mut self) {
        if let Some(next) = self.forward.pop() {
            let current = std::mem::replace(&mut self.current, next);
            self.back.push(current);
            self.notify_changed();
        }
    }

    fn notify_changed(&self) {
        let _ = self.event_sender.send(SessionEvent::MenuChanged(
            crate::get_timestamp(),
            self.current.len(),
        ));
    }
}
