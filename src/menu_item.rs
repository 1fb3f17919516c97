/// Type of menu entry
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItemKind {
    Action { label: String },
    Submenu {
        label: String,
        items: Vec<MenuItem>,
    },
    Separator,
}

/// Description of one menu entry, used to build the element tree
///
/// Pure data. Whether an entry is highlighted is never stored here: the
/// controller derives it from the active chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub kind: MenuItemKind,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(kind: MenuItemKind) -> Self {
        Self {
            kind,
            enabled: true,
        }
    }

    pub fn action(label: impl Into<String>) -> Self {
        Self::new(MenuItemKind::Action { label: label.into() })
    }

    pub fn separator() -> Self {
        Self::new(MenuItemKind::Separator)
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self::new(MenuItemKind::Submenu {
            label: label.into(),
            items,
        })
    }

    // === Getters ===

    pub fn kind(&self) -> &MenuItemKind {
        &self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, MenuItemKind::Separator)
    }

    pub fn has_submenu(&self) -> bool {
        matches!(self.kind, MenuItemKind::Submenu { .. })
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            MenuItemKind::Action { label, .. } => Some(label),
            MenuItemKind::Submenu { label, .. } => Some(label),
            MenuItemKind::Separator => None,
        }
    }

    pub fn submenu_items(&self) -> Option<&[MenuItem]> {
        match &self.kind {
            MenuItemKind::Submenu { items, .. } => Some(items),
            _ => None,
        }
    }

    // === Builder API ===

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for MenuItem {
    fn default() -> Self {
        Self::separator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_item() {
        let item = MenuItem::action("Copy");

        assert_eq!(item.label(), Some("Copy"));
        assert!(!item.has_submenu());
        assert!(item.is_enabled());
    }

    #[test]
    fn test_separator() {
        let item = MenuItem::separator();

        assert!(item.is_separator());
        assert_eq!(item.label(), None);
    }

    #[test]
    fn test_submenu() {
        let item = MenuItem::submenu(
            "File",
            vec![MenuItem::action("New"), MenuItem::action("Open")],
        );

        assert!(item.has_submenu());
        assert_eq!(item.label(), Some("File"));
        assert_eq!(item.submenu_items().unwrap().len(), 2);
    }

    #[test]
    fn test_disabled() {
        let item = MenuItem::action("Paste").disabled();
        assert!(!item.is_enabled());
    }
}
