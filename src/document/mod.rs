//! Arena-backed element tree
//!
//! The popup controller never owns rendering: it only reads the structure
//! of the menu elements and flips classes and inline style on them. This
//! module is the minimal tree those operations need.
//!
//! ```diagram
//! Container            (popup's outer container, receives promoted submenus)
//! └── List  #popup     (root menu)
//!     ├── Item  A
//!     ├── Item  B
//!     │   ├── Label
//!     │   └── List     (submenu, always the item's last child)
//!     └── Item  C
//! ```

mod builder;

use std::collections::BTreeSet;
use std::fmt;

pub use builder::{MenuDocumentBuilder, MenuHandles};

use crate::error::DocumentError;

/// Handle to an element stored in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural role of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A list container: the root menu or a submenu
    List,
    /// One entry of a list
    Item,
    /// Text-bearing decoration inside an item
    Label,
    /// Generic block, e.g. the popup's outer container
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// No inline value, layout defaults apply
    #[default]
    Unset,
    Block,
    None,
}

/// Inline `position`, set by whoever places an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Containing block for absolutely placed descendants
    Relative,
    /// Placed at `left`/`top` within the nearest relative ancestor
    Absolute,
}

/// Inline style of an element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub display: Display,
    pub position: Option<Position>,
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub padding_top: f32,
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    id: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: BTreeSet<String>,
    style: Style,
    text: Option<String>,
}

impl Element {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// The element tree shared between the host and a popup controller
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    mutations: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: Tag, id: impl Into<String>) -> ElementId {
        let element_id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag,
            id: id.into(),
            parent: None,
            children: Vec::new(),
            classes: BTreeSet::new(),
            style: Style::default(),
            text: None,
        });
        self.mutations += 1;
        element_id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.elements.len()
    }

    /// Look an element up by its string id
    pub fn find(&self, dom_id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|element| element.id == dom_id)
            .map(ElementId)
    }

    pub fn tag(&self, id: ElementId) -> Option<Tag> {
        self.get(id).map(Element::tag)
    }

    pub fn has_tag(&self, id: ElementId, tag: Tag) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(Element::parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn last_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id).last().copied()
    }

    pub fn dom_id(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(Element::id)
    }

    pub fn style(&self, id: ElementId) -> Option<&Style> {
        self.get(id).map(Element::style)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|element| element.has_class(class))
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(Element::text)
    }

    /// Total number of writes applied to the tree so far
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Walk from `id` (inclusive) up to the tree root
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// True when `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DocumentError> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::Cycle { parent, child });
        }
        self.detach(child)?;
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
        self.mutations += 1;
        Ok(())
    }

    /// Remove `id` from its parent's child list, keeping its own subtree
    pub fn detach(&mut self, id: ElementId) -> Result<(), DocumentError> {
        self.check(id)?;
        if let Some(parent) = self.elements[id.0].parent.take() {
            self.elements[parent.0].children.retain(|child| *child != id);
            self.mutations += 1;
        }
        Ok(())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), DocumentError> {
        self.check(id)?;
        self.elements[id.0].text = Some(text.into());
        self.mutations += 1;
        Ok(())
    }

    /// Add or remove a class, mirroring `classList.toggle(class, on)`
    pub fn toggle_class(&mut self, id: ElementId, class: &str, on: bool) -> Result<(), DocumentError> {
        self.check(id)?;
        let classes = &mut self.elements[id.0].classes;
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
        self.mutations += 1;
        Ok(())
    }

    pub fn style_mut(&mut self, id: ElementId) -> Result<&mut Style, DocumentError> {
        self.check(id)?;
        self.mutations += 1;
        Ok(&mut self.elements[id.0].style)
    }

    pub fn set_display(&mut self, id: ElementId, display: Display) -> Result<(), DocumentError> {
        self.style_mut(id)?.display = display;
        Ok(())
    }

    fn check(&self, id: ElementId) -> Result<(), DocumentError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(DocumentError::UnknownElement(id))
        }
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_reparent() {
        let mut doc = Document::new();
        let outer = doc.create_element(Tag::Container, "outer");
        let list = doc.create_element(Tag::List, "list");
        let item = doc.create_element(Tag::Item, "item");
        doc.append_child(outer, list).unwrap();
        doc.append_child(list, item).unwrap();

        assert_eq!(doc.parent(item), Some(list));
        assert_eq!(doc.last_child(list), Some(item));
        assert_eq!(doc.ancestors(item).collect::<Vec<_>>(), vec![item, list, outer]);

        doc.append_child(outer, item).unwrap();
        assert_eq!(doc.parent(item), Some(outer));
        assert!(doc.children(list).is_empty());
        assert_eq!(doc.children(outer), &[list, item]);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut doc = Document::new();
        let a = doc.create_element(Tag::List, "a");
        let b = doc.create_element(Tag::Item, "b");
        doc.append_child(a, b).unwrap();

        assert!(matches!(
            doc.append_child(b, a),
            Err(DocumentError::Cycle { .. })
        ));
        assert!(matches!(
            doc.append_child(a, a),
            Err(DocumentError::Cycle { .. })
        ));
    }

    #[test]
    fn test_unknown_element() {
        let mut doc = Document::new();
        let ghost = ElementId(7);
        assert!(matches!(
            doc.toggle_class(ghost, "active", true),
            Err(DocumentError::UnknownElement(id)) if id == ghost
        ));
        assert!(doc.children(ghost).is_empty());
        assert_eq!(doc.ancestors(ghost).count(), 0);
    }

    #[test]
    fn test_every_write_is_counted() {
        let mut doc = Document::new();
        let item = doc.create_element(Tag::Item, "item");
        let before = doc.mutation_count();

        doc.toggle_class(item, "active", true).unwrap();
        doc.toggle_class(item, "active", true).unwrap();
        doc.set_display(item, Display::Block).unwrap();

        assert_eq!(doc.mutation_count(), before + 3);
        assert!(doc.has_class(item, "active"));
        assert_eq!(doc.find("item"), Some(item));
    }
}
