use std::time::Duration;

use tracing::{debug, trace, warn};

use super::state::{PopupMenuState, Visibility};
use crate::config::{auto_hide_duration, Config};
use crate::document::{Display, Document, ElementId, Tag};
use crate::error::{DocumentError, PopupMenuError};
use crate::host::{Orientation, PopupHost, PopupSignal};
use crate::input::is_dismiss_key;
use crate::scheduler::{ManualScheduler, Scheduler, TimerKind, TimerToken};

/// Input a host forwards to a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// Pointer moved over `target`
    PointerMove { target: ElementId },
    /// Pointer entered the box of `menu`
    PointerEnter { menu: ElementId },
    /// Pointer left the box of `menu`
    PointerLeave { menu: ElementId },
    /// Click anywhere in the document
    DocumentClick,
    /// Key press anywhere in the document
    DocumentKey { keycode: u32 },
}

/// Interaction controller for one popup menu tree
///
/// Owns the popup's element tree and drives it from pointer, document and
/// timer events:
/// - hovering an item highlights the chain from the root down to it and
///   expands its submenu, collapsing every other branch
/// - leaving the whole popup arms an auto-hide countdown
/// - clicks and Escape anywhere in the document ask the host to close it
///
/// The popup never hides itself. It sends [`PopupSignal::Cancel`] and waits
/// for the host to call [`PopupMenu::set_hidden`].
pub struct PopupMenu<H: PopupHost, S: Scheduler> {
    document: Document,
    root: ElementId,
    popup_id: String,
    auto_hide_delay: Option<Duration>,
    active_class: String,
    state: PopupMenuState,
    host: H,
    scheduler: S,
}

impl<H: PopupHost, S: Scheduler> PopupMenu<H, S> {
    // === Construction ===

    /// Create a hidden popup rooted at the list `root`
    ///
    /// `auto_hide_delay` is in milliseconds; a negative value disables
    /// auto-hide.
    pub fn new(
        document: Document,
        root: ElementId,
        host: H,
        scheduler: S,
        auto_hide_delay: i64,
    ) -> Result<Self, PopupMenuError> {
        let Some(popup_id) = document.dom_id(root).map(str::to_string) else {
            return Err(PopupMenuError::MissingRoot(root));
        };
        if !document.has_tag(root, Tag::List) {
            return Err(PopupMenuError::RootNotAList(root));
        }

        debug!(
            "creating popup {} with auto_hide_delay={}ms",
            popup_id, auto_hide_delay
        );
        Ok(Self {
            document,
            root,
            popup_id,
            auto_hide_delay: auto_hide_duration(auto_hide_delay),
            active_class: "active".to_string(),
            state: PopupMenuState::new(),
            host,
            scheduler,
        })
    }

    pub fn with_config(
        document: Document,
        root: ElementId,
        host: H,
        scheduler: S,
        config: &Config,
    ) -> Result<Self, PopupMenuError> {
        Ok(Self::new(document, root, host, scheduler, config.auto_hide_delay)?
            .with_active_class(config.active_class.clone()))
    }

    pub fn with_active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    // === Accessors ===

    pub fn popup_id(&self) -> &str {
        &self.popup_id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn state(&self) -> &PopupMenuState {
        &self.state
    }

    pub fn auto_hide_delay(&self) -> Option<Duration> {
        self.auto_hide_delay
    }

    pub fn active_class(&self) -> &str {
        &self.active_class
    }

    pub fn is_hidden(&self) -> bool {
        self.state.is_hidden()
    }

    /// Pointer is over the root menu or any submenu
    pub fn is_entered(&self) -> bool {
        self.state.entered()
    }

    pub fn current(&self) -> Option<ElementId> {
        self.state.current()
    }

    pub fn is_active(&self, item: ElementId) -> bool {
        self.document.has_class(item, &self.active_class)
    }

    // === Visibility ===

    /// Show or hide the popup, resetting all interaction state either way
    pub fn set_hidden(&mut self, hidden: bool) {
        debug!("popup {} set_hidden({})", self.popup_id, hidden);
        self.cancel_hide_timer();
        self.state.reset_hover();

        if hidden {
            let cleared = self.document.style_mut(self.root).map(|style| {
                style.position = None;
                style.display = Display::Unset;
                style.left = None;
                style.top = None;
            });
            log_document_error(cleared);
            self.detach_document_listeners();
            self.state.set_visibility(Visibility::Hidden);
        } else {
            // The click that opened the popup must not close it: listeners
            // come back on the next tick.
            self.detach_document_listeners();
            match self.scheduler.schedule(TimerKind::AttachListeners, Duration::ZERO) {
                Ok(token) => self.state.set_attach_timer(token),
                Err(err) => warn!("popup {}: cannot defer listener attachment: {err}", self.popup_id),
            }
            log_document_error(self.document.set_display(self.root, Display::Block));
            self.state.set_visibility(Visibility::Shown);
        }

        self.set_others_inactive(self.root, None);
    }

    /// Show the popup for `widget`; placing it is up to the caller
    pub fn popup_at(&mut self, widget: ElementId) {
        debug!("popup {} requested at widget {}", self.popup_id, widget);
        self.set_hidden(false);
    }

    // === Event Handling ===

    pub fn handle_event(&mut self, event: MenuEvent) {
        match event {
            MenuEvent::PointerMove { target } => self.handle_pointer_move(target),
            MenuEvent::PointerEnter { menu } => self.handle_pointer_enter(menu),
            MenuEvent::PointerLeave { menu } => self.handle_pointer_leave(menu),
            MenuEvent::DocumentClick => self.handle_document_click(),
            MenuEvent::DocumentKey { keycode } => self.handle_document_key(keycode),
        }
    }

    /// Expand the item under the pointer and collapse everything else
    pub fn handle_pointer_move(&mut self, target: ElementId) {
        if self.state.is_hidden() || !self.is_within_tracked_menu(target) {
            return;
        }

        let Some(node) = self.document.ancestors(target).find(|&id| {
            self.document.has_tag(id, Tag::Item) || self.document.has_tag(id, Tag::List)
        }) else {
            return;
        };

        // Over the menu itself, between items
        if !self.document.has_tag(node, Tag::Item) {
            return;
        }
        if self.state.current() == Some(node) {
            return;
        }

        trace!("popup {}: hovering item {}", self.popup_id, node);
        self.state.set_current(Some(node));
        self.set_active(node, true);

        if let Some(submenu) = self.submenu(node) {
            self.show_submenu(submenu);
        }

        self.set_others_inactive(self.root, Some(node));
    }

    pub fn handle_pointer_enter(&mut self, menu: ElementId) {
        if self.state.is_hidden() || !self.is_tracked_menu(menu) {
            return;
        }
        self.state.set_entered(true);
        self.cancel_hide_timer();
    }

    pub fn handle_pointer_leave(&mut self, menu: ElementId) {
        if self.state.is_hidden() || !self.is_tracked_menu(menu) {
            return;
        }
        self.state.set_entered(false);
        self.cancel_hide_timer();

        if let Some(delay) = self.auto_hide_delay {
            match self.scheduler.schedule(TimerKind::AutoHide, delay) {
                Ok(token) => self.state.set_hide_timer(token),
                Err(err) => warn!("popup {}: cannot arm auto-hide: {err}", self.popup_id),
            }
        }
    }

    pub fn handle_document_click(&mut self) {
        if self.state.listening() {
            self.do_hide();
        }
    }

    /// `keycode` is an evdev keycode; hosts receiving DOM key codes convert
    /// them with [`crate::input::from_dom_key_code`]
    pub fn handle_document_key(&mut self, keycode: u32) {
        if self.state.listening() && is_dismiss_key(keycode) {
            self.do_hide();
        }
    }

    /// Deliver a fired timer; tokens no longer pending are ignored
    pub fn on_timer(&mut self, token: TimerToken) {
        if self.state.hide_timer() == Some(token) {
            self.state.take_hide_timer();
            debug!("popup {}: auto-hide delay elapsed", self.popup_id);
            self.do_hide();
        } else if self.state.attach_timer() == Some(token) {
            self.state.take_attach_timer();
            self.attach_document_listeners();
        } else {
            trace!("popup {}: ignoring stale {}", self.popup_id, token);
        }
    }

    // === Submenus ===

    /// Submenu owned by `item`, discovered and bound on first call
    ///
    /// A submenu is the item's last child when that child is a list.
    pub fn submenu(&mut self, item: ElementId) -> Option<ElementId> {
        if let Some(submenu) = self.state.submenu_of(item) {
            return Some(submenu);
        }

        let candidate = self.document.last_child(item)?;
        if !self.document.has_tag(candidate, Tag::List) {
            return None;
        }

        trace!("popup {}: bound submenu {} to item {}", self.popup_id, candidate, item);
        self.state.bind_submenu(item, candidate);
        Some(candidate)
    }

    /// Make the path from `menu` down to `target` the only active one
    ///
    /// Items that do not lead to `target` are deactivated and their
    /// submenus collapsed. Items on the path other than `target` keep their
    /// styling and are descended into. With no target, every item below
    /// `menu` is deactivated and collapsed.
    pub fn set_others_inactive(&mut self, menu: ElementId, target: Option<ElementId>) {
        let items: Vec<ElementId> = self
            .document
            .children(menu)
            .iter()
            .copied()
            .filter(|&child| self.document.has_tag(child, Tag::Item))
            .collect();

        for item in items {
            if !self.leads_to(item, target) {
                self.set_active(item, false);
                if let Some(submenu) = self.submenu(item) {
                    self.collapse(submenu);
                }
            } else if Some(item) != target {
                if let Some(submenu) = self.submenu(item) {
                    self.set_others_inactive(submenu, target);
                }
            }
        }
    }

    /// Hide `menu`, deactivating its items and collapsing every submenu
    /// bound below it
    ///
    /// Promoted submenus live in the outer container rather than inside
    /// their owner's list, so each one is hidden explicitly.
    fn collapse(&mut self, menu: ElementId) {
        let items: Vec<ElementId> = self
            .document
            .children(menu)
            .iter()
            .copied()
            .filter(|&child| self.document.has_tag(child, Tag::Item))
            .collect();

        for item in items {
            self.set_active(item, false);
            if let Some(submenu) = self.state.submenu_of(item) {
                self.collapse(submenu);
            }
        }
        log_document_error(self.document.set_display(menu, Display::None));
    }

    /// `item` is `target` or an ancestor item of it through submenu ownership
    fn leads_to(&self, item: ElementId, target: Option<ElementId>) -> bool {
        let mut cursor = target;
        while let Some(candidate) = cursor {
            if candidate == item {
                return true;
            }
            cursor = self
                .document
                .parent(candidate)
                .and_then(|menu| self.state.parent_item_of(menu));
        }
        false
    }

    fn show_submenu(&mut self, submenu: ElementId) {
        let Some(parent_item) = self.state.parent_item_of(submenu) else {
            return;
        };
        log_document_error(self.document.set_display(submenu, Display::Block));

        // Promoted once to the popup's outer container so it floats above
        // the surrounding content. Never moved back.
        if self.document.parent(submenu) == Some(parent_item) {
            match self.document.parent(self.root) {
                Some(container) => {
                    log_document_error(self.document.append_child(container, submenu));
                    debug!("popup {}: promoted submenu {}", self.popup_id, submenu);
                }
                None => trace!("popup {}: root is detached, submenu {} stays nested", self.popup_id, submenu),
            }
        }

        let offset = -self
            .document
            .style(submenu)
            .map(|style| style.padding_top)
            .unwrap_or_default();
        self.host.position_at_widget(
            &mut self.document,
            submenu,
            parent_item,
            Orientation::Horizontal,
            offset,
        );

        self.set_others_inactive(submenu, None);
    }

    // === Internals ===

    fn do_hide(&mut self) {
        debug!("popup {}: requesting close", self.popup_id);
        self.host.emit(&self.popup_id, PopupSignal::Cancel);
    }

    fn set_active(&mut self, item: ElementId, active: bool) {
        log_document_error(self.document.toggle_class(item, &self.active_class, active));
    }

    fn cancel_hide_timer(&mut self) {
        if let Some(token) = self.state.take_hide_timer() {
            self.scheduler.cancel(token);
        }
    }

    fn attach_document_listeners(&mut self) {
        if !self.state.listening() {
            self.host.subscribe_document_listeners(&self.popup_id);
            self.state.set_listening(true);
        }
    }

    fn detach_document_listeners(&mut self) {
        if let Some(token) = self.state.take_attach_timer() {
            self.scheduler.cancel(token);
        }
        if self.state.listening() {
            self.host.unsubscribe_document_listeners(&self.popup_id);
            self.state.set_listening(false);
        }
    }

    fn is_tracked_menu(&self, menu: ElementId) -> bool {
        menu == self.root || self.state.parent_item_of(menu).is_some()
    }

    /// Pointer events bubble up to the handlers bound on tracked menus
    fn is_within_tracked_menu(&self, target: ElementId) -> bool {
        self.document
            .ancestors(target)
            .any(|id| self.is_tracked_menu(id))
    }
}

impl<H: PopupHost> PopupMenu<H, ManualScheduler> {
    /// Advance the virtual clock by `by`, firing every timer that falls due
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some((token, _)) = self.scheduler.pop_due(until) {
            self.on_timer(token);
        }
        self.scheduler.set_now(until);
    }
}

fn log_document_error(result: Result<(), DocumentError>) {
    if let Err(err) = result {
        warn!("popup menu document write failed: {err}");
    }
}
