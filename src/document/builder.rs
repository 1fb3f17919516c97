use std::collections::HashMap;

use super::{Display, Document, ElementId, Position, Tag};
use crate::error::DocumentError;
use crate::menu_item::{MenuItem, MenuItemKind};

/// Handles into a document produced by [`MenuDocumentBuilder`]
#[derive(Debug, Clone)]
pub struct MenuHandles {
    /// Outer container, parent of the root list
    pub container: ElementId,
    /// Root list of the popup
    pub root: ElementId,
    /// Item element per label
    pub items: HashMap<String, ElementId>,
    /// Submenu list per label of its parent item
    pub submenus: HashMap<String, ElementId>,
}

impl MenuHandles {
    pub fn item(&self, label: &str) -> Option<ElementId> {
        self.items.get(label).copied()
    }

    pub fn submenu(&self, label: &str) -> Option<ElementId> {
        self.submenus.get(label).copied()
    }
}

/// Builds the list/item tree a popup controller expects
///
/// Each item is a `Tag::Item` holding a `Tag::Label`; an item with children
/// gets a `Tag::List` as its last child, hidden until expanded.
pub struct MenuDocumentBuilder {
    popup_id: String,
    padding_top: f32,
    next_item: usize,
}

impl MenuDocumentBuilder {
    pub fn new(popup_id: impl Into<String>) -> Self {
        Self {
            popup_id: popup_id.into(),
            padding_top: 0.0,
            next_item: 0,
        }
    }

    /// Top padding applied to every list
    pub fn with_padding_top(mut self, padding_top: f32) -> Self {
        self.padding_top = padding_top;
        self
    }

    pub fn build(mut self, items: &[MenuItem]) -> Result<(Document, MenuHandles), DocumentError> {
        let mut document = Document::new();
        let container = document.create_element(Tag::Container, format!("{}-container", self.popup_id));
        document.style_mut(container)?.position = Some(Position::Relative);
        let root = document.create_element(Tag::List, self.popup_id.clone());
        document.style_mut(root)?.padding_top = self.padding_top;
        document.append_child(container, root)?;

        let mut handles = MenuHandles {
            container,
            root,
            items: HashMap::new(),
            submenus: HashMap::new(),
        };
        self.append_items(&mut document, &mut handles, root, items)?;
        Ok((document, handles))
    }

    fn append_items(
        &mut self,
        document: &mut Document,
        handles: &mut MenuHandles,
        list: ElementId,
        items: &[MenuItem],
    ) -> Result<(), DocumentError> {
        for item in items {
            let item_id = format!("{}-item-{}", self.popup_id, self.next_item);
            self.next_item += 1;

            let element = document.create_element(Tag::Item, item_id.clone());
            document.append_child(list, element)?;
            if !item.is_enabled() {
                document.toggle_class(element, "disabled", true)?;
            }

            match item.kind() {
                MenuItemKind::Separator => {
                    document.toggle_class(element, "separator", true)?;
                }
                MenuItemKind::Action { label, .. } => {
                    self.append_label(document, element, &item_id, label)?;
                    handles.items.insert(label.clone(), element);
                }
                MenuItemKind::Submenu { label, items } => {
                    self.append_label(document, element, &item_id, label)?;
                    handles.items.insert(label.clone(), element);

                    let submenu = document.create_element(Tag::List, format!("{item_id}-menu"));
                    {
                        let style = document.style_mut(submenu)?;
                        style.padding_top = self.padding_top;
                        style.display = Display::None;
                    }
                    document.append_child(element, submenu)?;
                    handles.submenus.insert(label.clone(), submenu);
                    self.append_items(document, handles, submenu, items)?;
                }
            }
        }
        Ok(())
    }

    fn append_label(
        &self,
        document: &mut Document,
        item: ElementId,
        item_id: &str,
        label: &str,
    ) -> Result<(), DocumentError> {
        let element = document.create_element(Tag::Label, format!("{item_id}-label"));
        document.set_text(element, label)?;
        document.append_child(item, element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submenu_is_last_child() {
        let items = vec![
            MenuItem::action("A"),
            MenuItem::submenu("B", vec![MenuItem::action("B1"), MenuItem::action("B2")]),
            MenuItem::separator(),
            MenuItem::action("C").disabled(),
        ];
        let (doc, handles) = MenuDocumentBuilder::new("popup")
            .with_padding_top(4.0)
            .build(&items)
            .unwrap();

        assert_eq!(doc.parent(handles.root), Some(handles.container));
        assert_eq!(doc.children(handles.root).len(), 4);
        assert_eq!(doc.dom_id(handles.root), Some("popup"));

        let b = handles.item("B").unwrap();
        let b_menu = handles.submenu("B").unwrap();
        assert_eq!(doc.last_child(b), Some(b_menu));
        assert_eq!(doc.style(b_menu).unwrap().display, Display::None);
        assert_eq!(doc.style(b_menu).unwrap().padding_top, 4.0);
        assert_eq!(doc.parent(handles.item("B2").unwrap()), Some(b_menu));

        let a = handles.item("A").unwrap();
        let a_label = doc.last_child(a).unwrap();
        assert!(doc.has_tag(a_label, Tag::Label));
        assert_eq!(doc.text(a_label), Some("A"));
        assert_eq!(doc.text(a), None);
        assert_eq!(
            doc.style(handles.container).unwrap().position,
            Some(Position::Relative)
        );
        assert!(doc.has_class(handles.item("C").unwrap(), "disabled"));
        assert!(doc.has_class(doc.children(handles.root)[2], "separator"));
    }
}
