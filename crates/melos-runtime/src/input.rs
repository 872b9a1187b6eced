//! Keyboard mapping for the frame loop's built-in actions.
//!
//! The runtime reacts to exactly three chords: modifier + force-quit ends
//! the loop, modifier + fullscreen toggles borderless-windowed, and the
//! fullscreen key alone toggles exclusive fullscreen. Everything else is
//! left to components.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A decoded key, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    F11,
    LeftShift,
    /// Any printable key.
    Char(char),
}

// ---------------------------------------------------------------------------
// KeyAction
// ---------------------------------------------------------------------------

/// A built-in action resolved from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the frame loop.
    ForceQuit,
    /// Toggle exclusive fullscreen.
    ToggleFullscreen,
    /// Toggle borderless-windowed.
    ToggleBorderless,
}

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

/// Bindings for the built-in actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    /// Held key that arms the chorded actions.
    pub modifier: Key,
    /// With the modifier held: leave the loop.
    pub force_quit: Key,
    /// Toggles fullscreen; with the modifier held, borderless instead.
    pub toggle_fullscreen: Key,
}

impl Keymap {
    /// Resolve a pressed key to a built-in action, if any.
    pub fn action_for(&self, pressed: Key, modifier_down: bool) -> Option<KeyAction> {
        if modifier_down {
            if pressed == self.force_quit {
                return Some(KeyAction::ForceQuit);
            }
            if pressed == self.toggle_fullscreen {
                return Some(KeyAction::ToggleBorderless);
            }
        } else if pressed == self.toggle_fullscreen {
            return Some(KeyAction::ToggleFullscreen);
        }
        None
    }
}

impl Default for Keymap {
    /// LeftShift chord, Escape to quit, F11 for fullscreen.
    fn default() -> Self {
        Self {
            modifier: Key::LeftShift,
            force_quit: Key::Escape,
            toggle_fullscreen: Key::F11,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_quit_requires_the_modifier() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.action_for(Key::Escape, true),
            Some(KeyAction::ForceQuit)
        );
        assert_eq!(keymap.action_for(Key::Escape, false), None);
    }

    #[test]
    fn fullscreen_key_depends_on_the_modifier() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.action_for(Key::F11, false),
            Some(KeyAction::ToggleFullscreen)
        );
        assert_eq!(
            keymap.action_for(Key::F11, true),
            Some(KeyAction::ToggleBorderless)
        );
    }

    #[test]
    fn unbound_keys_resolve_to_nothing() {
        let keymap = Keymap::default();
        assert_eq!(keymap.action_for(Key::Char('q'), true), None);
        assert_eq!(keymap.action_for(Key::Char('q'), false), None);
    }
}
