//! Scroll the viewport by one screen.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    fn script(self) -> &'static str {
        match self {
            Direction::Up => "window.scrollBy(0, -window.innerHeight)",
            Direction::Down => "window.scrollBy(0, window.innerHeight)",
            Direction::Left => "window.scrollBy(-window.innerWidth, 0)",
            Direction::Right => "window.scrollBy(window.innerWidth, 0)",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrollParams {
    direction: Direction,
}

pub struct ScrollAction {
    definition: ActionDefinition,
}

impl ScrollAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "direction": {
                    "type": "string",
                    "enum": ["up", "down", "left", "right"],
                    "description": "The direction to scroll."
                }
            },
            "required": ["direction"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "scroll",
                "Scroll in a specific direction in the browser",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for ScrollAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for ScrollAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: ScrollParams = parse_params(params)?;
        ctx.page.evaluate(params.direction.script()).await?;
        Ok(ActionOutcome::success(format!(
            "Scrolled {}",
            params.direction.as_str()
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let direction = params.get("direction")?.as_str()?;
        Some(format!("Scroll {}", direction))
    }
}
