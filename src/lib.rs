pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod input;
pub mod menu_item;
pub mod popup_menu;
pub mod scheduler;

pub use config::Config;
pub use document::{
    Display, Document, ElementId, MenuDocumentBuilder, MenuHandles, Position, Style, Tag,
};
pub use error::{ConfigError, DocumentError, PopupMenuError, SchedulerError};
pub use host::{DocumentListeners, Orientation, PopupHost, PopupSignal};
pub use menu_item::{MenuItem, MenuItemKind};
pub use popup_menu::{MenuEvent, PopupMenu, PopupMenuState, Visibility};
pub use scheduler::{CalloopScheduler, ManualScheduler, Scheduler, TimerKind, TimerToken};
