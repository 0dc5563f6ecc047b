//! DOM key names to CDP key event fields.

/// CDP modifier bit for a modifier key name, if it is one.
pub(crate) fn modifier_bit(key: &str) -> Option<i32> {
    match key {
        "Alt" => Some(1),
        "Control" => Some(2),
        "Meta" => Some(4),
        "Shift" => Some(8),
        _ => None,
    }
}

/// Windows virtual key code Chrome needs to perform a key's default action.
pub(crate) fn virtual_key_code(key: &str) -> Option<i64> {
    let code = match key {
        "Backspace" => 8,
        "Tab" => 9,
        "Enter" | "NumpadEnter" => 13,
        "Shift" => 16,
        "Control" => 17,
        "Alt" => 18,
        "Pause" => 19,
        "Escape" => 27,
        " " => 32,
        "PageUp" => 33,
        "PageDown" => 34,
        "End" => 35,
        "Home" => 36,
        "ArrowLeft" => 37,
        "ArrowUp" => 38,
        "ArrowRight" => 39,
        "ArrowDown" => 40,
        "PrintScreen" => 44,
        "Insert" => 45,
        "Delete" => 46,
        "Meta" => 91,
        "ContextMenu" => 93,
        "NumpadMultiply" => 106,
        "NumpadAdd" => 107,
        "NumpadSubtract" => 109,
        "NumpadDecimal" => 110,
        "NumpadDivide" => 111,
        "ScrollLock" => 145,
        _ => {
            if let Some(digit) = key.strip_prefix("Numpad").and_then(|d| d.parse::<i64>().ok()) {
                return (0..=9).contains(&digit).then_some(96 + digit);
            }
            if let Some(n) = key.strip_prefix('F').and_then(|n| n.parse::<i64>().ok()) {
                return (1..=12).contains(&n).then_some(111 + n);
            }
            let mut chars = key.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    Some(i64::from(u32::from(c.to_ascii_uppercase())))
                }
                _ => None,
            };
        }
    };
    Some(code)
}

/// Text a key inserts when no modifier other than Shift is held.
pub(crate) fn key_text(key: &str, modifiers: i32) -> Option<String> {
    if modifiers & !8 != 0 {
        return None;
    }
    match key {
        "Enter" | "NumpadEnter" => Some("\r".to_string()),
        _ if key.chars().count() == 1 => Some(key.to_string()),
        _ => None,
    }
}
