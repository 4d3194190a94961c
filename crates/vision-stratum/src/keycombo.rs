//! Key-combo parsing: split modifiers from the main key, map known special
//! keys to their System Events key-code names (spec.md §4.C6).
//!
//! Modifier-only combos are not supported — a primary key is always
//! required (spec.md §9 open question).

use crate::errors::VisionError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modifier {
    Command,
    Option,
    Shift,
    Control,
}

impl Modifier {
    /// The `using:` clause token System Events expects.
    pub fn as_using_token(&self) -> &'static str {
        match self {
            Modifier::Command => "command down",
            Modifier::Option => "option down",
            Modifier::Shift => "shift down",
            Modifier::Control => "control down",
        }
    }
}

#[derive(Clone, Debug)]
pub enum KeyTarget {
    /// A printable key issued as a keystroke.
    Keystroke(String),
    /// A named special key issued as a numeric key code.
    KeyCode(u16),
}

#[derive(Clone, Debug)]
pub struct ParsedKeyCombo {
    pub modifiers: Vec<Modifier>,
    pub target: KeyTarget,
}

fn parse_modifier(token: &str) -> Option<Modifier> {
    match token.to_ascii_lowercase().as_str() {
        "cmd" | "command" | "meta" => Some(Modifier::Command),
        "option" | "opt" | "alt" => Some(Modifier::Option),
        "shift" => Some(Modifier::Shift),
        "control" | "ctrl" => Some(Modifier::Control),
        _ => None,
    }
}

/// Maps a named special key to its System Events key code. Covers tab,
/// return, escape, delete, space, arrow keys, and F1–F12.
fn special_key_code(name: &str) -> Option<u16> {
    match name.to_ascii_lowercase().as_str() {
        "tab" => Some(48),
        "return" | "enter" => Some(36),
        "escape" | "esc" => Some(53),
        "delete" | "backspace" => Some(51),
        "space" => Some(49),
        "left" | "arrowleft" => Some(123),
        "right" | "arrowright" => Some(124),
        "down" | "arrowdown" => Some(125),
        "up" | "arrowup" => Some(126),
        "f1" => Some(122),
        "f2" => Some(120),
        "f3" => Some(99),
        "f4" => Some(118),
        "f5" => Some(96),
        "f6" => Some(97),
        "f7" => Some(98),
        "f8" => Some(100),
        "f9" => Some(101),
        "f10" => Some(109),
        "f11" => Some(103),
        "f12" => Some(111),
        _ => None,
    }
}

/// Parses a combo like `"cmd+shift+p"` or `"return"` into its modifier set
/// and primary key target. A combo with only modifiers (no primary key) is
/// rejected — `key_combo` requires a primary key (spec.md §9).
pub fn parse(combo: &str) -> Result<ParsedKeyCombo, VisionError> {
    let tokens: Vec<&str> = combo.split('+').map(str::trim).filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return Err(VisionError::InvalidKeyCombo(
            combo.to_string(),
            "empty combo".to_string(),
        ));
    }

    let mut modifiers = Vec::new();
    let mut primary: Option<&str> = None;
    for token in &tokens {
        if let Some(modifier) = parse_modifier(token) {
            modifiers.push(modifier);
        } else if primary.is_none() {
            primary = Some(token);
        } else {
            return Err(VisionError::InvalidKeyCombo(
                combo.to_string(),
                format!("multiple non-modifier keys (\"{primary:?}\" and \"{token}\")"),
            ));
        }
    }

    let primary = primary.ok_or_else(|| {
        VisionError::InvalidKeyCombo(
            combo.to_string(),
            "modifier-only combos are not supported; a primary key is required".to_string(),
        )
    })?;

    let target = if let Some(code) = special_key_code(primary) {
        KeyTarget::KeyCode(code)
    } else {
        KeyTarget::Keystroke(primary.to_string())
    };

    Ok(ParsedKeyCombo { modifiers, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_and_printable_key() {
        let parsed = parse("cmd+shift+p").unwrap();
        assert_eq!(parsed.modifiers, vec![Modifier::Command, Modifier::Shift]);
        match parsed.target {
            KeyTarget::Keystroke(ref s) => assert_eq!(s, "p"),
            _ => panic!("expected a keystroke target"),
        }
    }

    #[test]
    fn maps_special_keys_to_key_codes() {
        let parsed = parse("return").unwrap();
        assert!(parsed.modifiers.is_empty());
        assert!(matches!(parsed.target, KeyTarget::KeyCode(36)));
    }

    #[test]
    fn rejects_modifier_only_combos() {
        let err = parse("cmd+shift").unwrap_err();
        assert!(matches!(err, VisionError::InvalidKeyCombo(_, _)));
    }

    #[test]
    fn rejects_empty_combo() {
        assert!(parse("").is_err());
    }
}
