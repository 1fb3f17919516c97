//! Collaborators a popup controller talks to
//!
//! The controller never places elements on screen and never closes itself.
//! Both concerns belong to the application embedding it, reached through
//! [`PopupHost`].

use std::collections::BTreeSet;

use crate::document::{Document, ElementId};

/// Axis along which a submenu is placed next to its reference element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Notification sent from a popup to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupSignal {
    /// The popup asks to be closed
    Cancel,
}

pub trait PopupHost {
    /// Place `target` adjacent to `reference` along `orientation`, shifted by `offset`
    fn position_at_widget(
        &mut self,
        document: &mut Document,
        target: ElementId,
        reference: ElementId,
        orientation: Orientation,
        offset: f32,
    );

    /// Deliver a signal from the popup identified by `popup_id`
    fn emit(&mut self, popup_id: &str, signal: PopupSignal);

    /// Start routing document-wide clicks and key presses to `popup_id`
    fn subscribe_document_listeners(&mut self, popup_id: &str);

    /// Stop routing document-wide events to `popup_id`
    fn unsubscribe_document_listeners(&mut self, popup_id: &str);
}

/// Document listener subscriptions for a host serving several popups
///
/// Each popup subscribes and unsubscribes on its own; dispatching a
/// document event yields only the popups currently listening.
#[derive(Debug, Clone, Default)]
pub struct DocumentListeners {
    subscribed: BTreeSet<String>,
}

impl DocumentListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `popup_id` was already subscribed
    pub fn subscribe(&mut self, popup_id: &str) -> bool {
        self.subscribed.insert(popup_id.to_string())
    }

    /// Returns false if `popup_id` was not subscribed
    pub fn unsubscribe(&mut self, popup_id: &str) -> bool {
        self.subscribed.remove(popup_id)
    }

    pub fn is_subscribed(&self, popup_id: &str) -> bool {
        self.subscribed.contains(popup_id)
    }

    /// Popups that should receive a document event, in id order
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.subscribed.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_subscriptions() {
        let mut listeners = DocumentListeners::new();
        assert!(listeners.subscribe("file-menu"));
        assert!(listeners.subscribe("edit-menu"));
        assert!(!listeners.subscribe("file-menu"));

        assert!(listeners.unsubscribe("file-menu"));
        assert!(!listeners.unsubscribe("file-menu"));

        assert!(!listeners.is_subscribed("file-menu"));
        assert!(listeners.is_subscribed("edit-menu"));
        assert_eq!(listeners.recipients().collect::<Vec<_>>(), vec!["edit-menu"]);
    }
}
