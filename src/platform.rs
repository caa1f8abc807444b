//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Modifier for form shortcuts
/// - macOS: SUPER (Cmd key), Ctrl also accepted
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Whether `modifiers` hold the platform shortcut key
pub fn is_shortcut(modifiers: KeyModifiers) -> bool {
    modifiers.contains(SHORTCUT_MODIFIER) || modifiers.contains(KeyModifiers::CONTROL)
}

/// Prefix shown in status-bar hints
#[cfg(target_os = "macos")]
pub const SHORTCUT_PREFIX: &str = "Cmd+";

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_PREFIX: &str = "^";

/// Hint label for a shortcut letter, e.g. `^S` or `Cmd+S`
pub fn shortcut_label(key: char) -> String {
    format!("{SHORTCUT_PREFIX}{}", key.to_ascii_uppercase())
}
