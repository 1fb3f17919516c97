//! Keyboard input constants
//!
//! Key presses reach a popup as **Linux kernel keycodes** (evdev scancodes),
//! the raw `u32` a Wayland `wl_keyboard::key` event carries before XKB
//! translation. Hosts fed by another source must translate to these codes.
//!
//! Keycode source: Linux kernel `<linux/input-event-codes.h>`

/// Linux kernel keycode constants (evdev scancodes)
pub mod keycodes {
    /// Escape key (scancode 1)
    pub const ESC: u32 = 1;

    /// Enter/Return key (scancode 28)
    pub const ENTER: u32 = 28;

    /// Tab key (scancode 15)
    pub const TAB: u32 = 15;

    /// Space bar (scancode 57)
    pub const SPACE: u32 = 57;
}

/// Translate a DOM `KeyboardEvent.keyCode` to the matching evdev keycode
///
/// Only the keys a popup reacts to are mapped.
pub fn from_dom_key_code(key_code: u32) -> Option<u32> {
    match key_code {
        27 => Some(keycodes::ESC),
        13 => Some(keycodes::ENTER),
        9 => Some(keycodes::TAB),
        32 => Some(keycodes::SPACE),
        _ => None,
    }
}

/// True for the key that dismisses a popup
pub fn is_dismiss_key(keycode: u32) -> bool {
    keycode == keycodes::ESC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_keys() {
        assert_eq!(keycodes::ESC, 1);
        assert_eq!(keycodes::ENTER, 28);
    }

    #[test]
    fn test_only_escape_dismisses() {
        assert!(is_dismiss_key(keycodes::ESC));
        assert!(!is_dismiss_key(keycodes::ENTER));
        assert!(!is_dismiss_key(keycodes::SPACE));
    }

    #[test]
    fn test_dom_escape_maps_to_evdev() {
        assert_eq!(from_dom_key_code(27), Some(keycodes::ESC));
        assert!(from_dom_key_code(27).is_some_and(is_dismiss_key));
        assert_eq!(from_dom_key_code(13), Some(keycodes::ENTER));
        assert_eq!(from_dom_key_code(65), None);
    }
}
