use std::collections::HashMap;

use crate::document::ElementId;
use crate::scheduler::TimerToken;

/// Whether the popup is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Shown,
}

/// State for PopupMenu
///
/// Pure state management - no document writes, no host calls.
/// Tracks hover, pending timers and the submenu side tables.
#[derive(Debug, Clone, Default)]
pub struct PopupMenuState {
    visibility: Visibility,

    /// Pointer is somewhere over the root menu or one of its submenus
    entered: bool,

    /// Item last handled by hover tracking
    current: Option<ElementId>,

    /// Pending auto-hide countdown
    hide_timer: Option<TimerToken>,

    /// Pending next-tick attachment of the document listeners
    attach_timer: Option<TimerToken>,

    /// Document click/key listeners are attached
    listening: bool,

    /// item -> its submenu, filled on first discovery
    submenus: HashMap<ElementId, ElementId>,

    /// submenu -> the item owning it
    parent_items: HashMap<ElementId, ElementId>,
}

impl PopupMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Getters ===

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    pub fn entered(&self) -> bool {
        self.entered
    }

    pub fn current(&self) -> Option<ElementId> {
        self.current
    }

    pub fn hide_timer(&self) -> Option<TimerToken> {
        self.hide_timer
    }

    pub fn attach_timer(&self) -> Option<TimerToken> {
        self.attach_timer
    }

    pub fn listening(&self) -> bool {
        self.listening
    }

    pub fn submenu_of(&self, item: ElementId) -> Option<ElementId> {
        self.submenus.get(&item).copied()
    }

    pub fn parent_item_of(&self, submenu: ElementId) -> Option<ElementId> {
        self.parent_items.get(&submenu).copied()
    }

    pub fn bound_submenu_count(&self) -> usize {
        self.submenus.len()
    }

    // === State Mutations ===

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn set_entered(&mut self, entered: bool) {
        self.entered = entered;
    }

    pub fn set_current(&mut self, current: Option<ElementId>) {
        self.current = current;
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn set_hide_timer(&mut self, token: TimerToken) {
        self.hide_timer = Some(token);
    }

    pub fn take_hide_timer(&mut self) -> Option<TimerToken> {
        self.hide_timer.take()
    }

    pub fn set_attach_timer(&mut self, token: TimerToken) {
        self.attach_timer = Some(token);
    }

    pub fn take_attach_timer(&mut self) -> Option<TimerToken> {
        self.attach_timer.take()
    }

    /// Record `submenu` as owned by `item`, in both directions
    pub fn bind_submenu(&mut self, item: ElementId, submenu: ElementId) {
        self.submenus.insert(item, submenu);
        self.parent_items.insert(submenu, item);
    }

    /// Forget hover tracking; bindings and timers are left alone
    pub fn reset_hover(&mut self) {
        self.entered = false;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Tag};

    #[test]
    fn test_state_creation() {
        let state = PopupMenuState::new();

        assert!(state.is_hidden());
        assert!(!state.entered());
        assert_eq!(state.current(), None);
        assert_eq!(state.hide_timer(), None);
        assert!(!state.listening());
    }

    #[test]
    fn test_submenu_binding_is_bidirectional() {
        let mut doc = Document::new();
        let item = doc.create_element(Tag::Item, "item");
        let submenu = doc.create_element(Tag::List, "submenu");

        let mut state = PopupMenuState::new();
        assert_eq!(state.submenu_of(item), None);

        state.bind_submenu(item, submenu);
        assert_eq!(state.submenu_of(item), Some(submenu));
        assert_eq!(state.parent_item_of(submenu), Some(item));
        assert_eq!(state.parent_item_of(item), None);
        assert_eq!(state.bound_submenu_count(), 1);
    }

    #[test]
    fn test_timers_are_taken_once() {
        let mut state = PopupMenuState::new();
        let token = TimerToken::from_raw(4);

        state.set_hide_timer(token);
        assert_eq!(state.take_hide_timer(), Some(token));
        assert_eq!(state.take_hide_timer(), None);
    }

    #[test]
    fn test_reset_hover() {
        let mut doc = Document::new();
        let item = doc.create_element(Tag::Item, "item");

        let mut state = PopupMenuState::new();
        state.set_entered(true);
        state.set_current(Some(item));
        state.reset_hover();

        assert!(!state.entered());
        assert_eq!(state.current(), None);
    }
}
