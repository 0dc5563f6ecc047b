//! Keyboard input in xdotool notation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

/// Translate an xdotool key name to the DOM `key` value the page expects.
///
/// Lookup is case-insensitive; unknown names pass through unchanged.
pub fn translate_key(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "return" | "enter" => "Enter",
        "tab" => "Tab",
        "backspace" => "Backspace",
        "up" => "ArrowUp",
        "down" => "ArrowDown",
        "left" => "ArrowLeft",
        "right" => "ArrowRight",
        "space" => "Space",
        "ctrl" | "control" => "Control",
        "alt" => "Alt",
        "shift" => "Shift",
        "meta" | "command" | "cmd" | "windows" => "Meta",
        "esc" | "escape" => "Escape",
        "kp_enter" => "NumpadEnter",
        "kp_multiply" => "NumpadMultiply",
        "kp_add" => "NumpadAdd",
        "kp_subtract" => "NumpadSubtract",
        "kp_decimal" => "NumpadDecimal",
        "kp_divide" => "NumpadDivide",
        "page_down" => "PageDown",
        "page_up" => "PageUp",
        "home" => "Home",
        "end" => "End",
        "insert" => "Insert",
        "delete" => "Delete",
        "shift_l" => "ShiftLeft",
        "shift_r" => "ShiftRight",
        "control_l" => "ControlLeft",
        "control_r" => "ControlRight",
        "alt_l" => "AltLeft",
        "alt_r" => "AltRight",
        "audiovolumemute" => "AudioVolumeMute",
        "audiovolumedown" => "AudioVolumeDown",
        "audiovolumeup" => "AudioVolumeUp",
        "print" => "PrintScreen",
        "scroll_lock" => "ScrollLock",
        "pause" => "Pause",
        "menu" => "ContextMenu",
        other => {
            if let Some(digit) = other.strip_prefix("kp_") {
                if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) {
                    return format!("Numpad{}", digit);
                }
            }
            let function_key = other
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n));
            if let Some(n) = function_key {
                return format!("F{}", n);
            }
            return key.to_string();
        }
    };
    mapped.to_string()
}

#[derive(Debug, Deserialize)]
struct KeyPressParams {
    text: String,
}

pub struct KeyPressAction {
    definition: ActionDefinition,
}

impl KeyPressAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "A string of keys to press in xdotool syntax, for example \"a\", \"Return\", \"alt+Tab\", \"ctrl+s\", \"Up\", \"KP_0\" (for the numpad 0 key). Separate keys with spaces to press them one after another."
                }
            },
            "required": ["text"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "keyPress",
                "Press a key or a combination of keys on the keyboard",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for KeyPressAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for KeyPressAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: KeyPressParams = parse_params(params)?;
        let text = params.text.trim();
        if text.is_empty() {
            return Err(ActionError::InvalidParameters(
                "text must name at least one key".to_string(),
            ));
        }

        if text.contains('+') {
            let keys: Vec<String> = text
                .split('+')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(translate_key)
                .collect();
            debug!("Pressing chord {:?}", keys);

            if let Some((last, held)) = keys.split_last() {
                for key in held {
                    ctx.page.key_down(key).await?;
                }
                ctx.page.press_key(last).await?;
                for key in held.iter().rev() {
                    ctx.page.key_up(key).await?;
                }
            }
        } else {
            for key in text.split_whitespace().map(translate_key) {
                ctx.page.press_key(&key).await?;
            }
        }

        Ok(ActionOutcome::success(format!(
            "Pressed key \"{}\"",
            params.text
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let text = params.get("text")?.as_str()?;
        Some(format!("Press key \"{}\"", text))
    }
}
