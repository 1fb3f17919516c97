mod controller;
mod state;

pub use controller::{MenuEvent, PopupMenu};
pub use state::{PopupMenuState, Visibility};
