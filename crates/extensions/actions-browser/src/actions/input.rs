//! Type text into an input element.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use webhands_dom::resolve_live;
use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
    substitute_variables,
};

use super::unresolved;

const FILL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct InputTextParams {
    index: u32,
    text: String,
}

pub struct InputTextAction {
    definition: ActionDefinition,
}

impl InputTextAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "index": {
                    "type": "number",
                    "description": "The index of the element to input text."
                },
                "text": {
                    "type": "string",
                    "description": "The text to input."
                }
            },
            "required": ["index", "text"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "inputText",
                "Input text into a input interactive element",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for InputTextAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for InputTextAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: InputTextParams = parse_params(params)?;

        let locator = match resolve_live(ctx.page.as_ref(), &ctx.dom_state, params.index).await {
            Ok(locator) => locator,
            Err(err) => return unresolved(err),
        };

        // Placeholders are expanded here only; messages keep the model's text.
        let value = substitute_variables(&params.text, &ctx.variables);
        debug!("Filling {}", locator);
        ctx.page.fill(&locator, &value, FILL_TIMEOUT).await?;

        Ok(ActionOutcome::success(format!(
            "Inputted text \"{}\" into element with index {}",
            params.text, params.index
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let index = params.get("index")?;
        let text = params.get("text")?.as_str()?;
        Some(format!(
            "Input text \"{}\" into element at index {}",
            text, index
        ))
    }
}
