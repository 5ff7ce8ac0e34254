//! Type-safe key bindings for the scroller widget.
//!
//! Bindings pair one or more key presses with help text and can be disabled at
//! runtime. Components describe their bindings in a key map struct and expose
//! them through the [`KeyMap`] trait so help bars can render them.
//!
//! ### Example
//! ```rust
//! use bubbletea_scroller::key::{self, Binding};
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let left = Binding::new(vec![KeyCode::Left, KeyCode::Char('h')])
//!     .with_help("←/h", "step left");
//!
//! let msg = KeyMsg { key: KeyCode::Char('h'), modifiers: KeyModifiers::NONE };
//! assert!(left.matches(&msg));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key code of the press.
    pub code: KeyCode,
    /// Modifier keys held during the press.
    pub mods: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, mods): (KeyCode, KeyModifiers)) -> Self {
        Self { code, mods }
    }
}

/// Help text for a binding: the key label and what it does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short label for the key(s), e.g. `"←/h"`.
    pub key: String,
    /// Short description of the action, e.g. `"step left"`.
    pub desc: String,
}

/// A key binding: the presses that trigger it, its help text, and whether it
/// is currently enabled.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from a list of key presses.
    ///
    /// Accepts anything convertible to [`KeyPress`], so plain `KeyCode`s and
    /// `(KeyCode, KeyModifiers)` tuples both work.
    pub fn new<P: Into<KeyPress>>(keys: Vec<P>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help label and description shown for this binding.
    pub fn with_help(mut self, key: &str, desc: &str) -> Self {
        self.help = Help {
            key: key.to_string(),
            desc: desc.to_string(),
        };
        self
    }

    /// Disables or enables the binding.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns the help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns true when the binding should react to input and appear in help.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Reports whether the given key message triggers this binding.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled()
            && self
                .keys
                .iter()
                .any(|kp| kp.code == msg.key && kp.mods == msg.modifiers)
    }
}

/// Option applied by [`new_binding`].
pub enum BindingOpt {
    /// Sets the binding's key presses.
    Keys(Vec<KeyPress>),
    /// Sets the binding's help text.
    HelpText(Help),
    /// Sets the binding's disabled state.
    Disabled(bool),
}

/// Creates a binding from a list of options, Go-bubbles style.
///
/// ```rust
/// use bubbletea_scroller::key::{new_binding, with_keys, with_help};
/// use crossterm::event::KeyCode;
///
/// let b = new_binding(vec![
///     with_keys(vec![KeyCode::Right, KeyCode::Char('l')]),
///     with_help("→/l", "step right"),
/// ]);
/// assert!(b.enabled());
/// ```
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        match opt {
            BindingOpt::Keys(keys) => binding.keys = keys,
            BindingOpt::HelpText(help) => binding.help = help,
            BindingOpt::Disabled(disabled) => binding.disabled = disabled,
        }
    }
    binding
}

/// Option setting the key presses of a binding.
pub fn with_keys<P: Into<KeyPress>>(keys: Vec<P>) -> BindingOpt {
    BindingOpt::Keys(keys.into_iter().map(Into::into).collect())
}

/// Option setting the help text of a binding.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    BindingOpt::HelpText(Help {
        key: key.to_string(),
        desc: desc.to_string(),
    })
}

/// Option disabling a binding.
pub fn with_disabled(disabled: bool) -> BindingOpt {
    BindingOpt::Disabled(disabled)
}

/// Reports whether the message triggers the given binding.
pub fn matches_binding(msg: &KeyMsg, binding: &Binding) -> bool {
    binding.matches(msg)
}

/// Reports whether the message triggers any of the given bindings.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

/// Trait implemented by component key maps so help views can list bindings.
pub trait KeyMap {
    /// Bindings shown in the compact, single-line help view.
    fn short_help(&self) -> Vec<&Binding>;
    /// Binding columns shown in the expanded help view.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_matches_any_listed_key() {
        let b = Binding::new(vec![KeyCode::Left, KeyCode::Char('h')]);
        assert!(b.matches(&key(KeyCode::Left)));
        assert!(b.matches(&key(KeyCode::Char('h'))));
        assert!(!b.matches(&key(KeyCode::Right)));
    }

    #[test]
    fn test_modifiers_must_match() {
        let b = Binding::new(vec![(KeyCode::Char('l'), KeyModifiers::CONTROL)]);
        assert!(!b.matches(&key(KeyCode::Char('l'))));
        assert!(b.matches(&KeyMsg {
            key: KeyCode::Char('l'),
            modifiers: KeyModifiers::CONTROL,
        }));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let b = Binding::new(vec![KeyCode::Right]).with_disabled(true);
        assert!(!b.enabled());
        assert!(!b.matches(&key(KeyCode::Right)));
    }

    #[test]
    fn test_functional_constructors() {
        let b = new_binding(vec![
            with_keys(vec![KeyCode::Right, KeyCode::Char('l')]),
            with_help("→/l", "step right"),
        ]);
        assert_eq!(b.help().key, "→/l");
        assert!(matches_binding(&key(KeyCode::Char('l')), &b));
        assert!(matches(&key(KeyCode::Right), &[&b]));
    }
}
