//! Pick an option from a dropdown.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use webhands_dom::resolve_live;
use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

use super::unresolved;

const SELECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct SelectOptionParams {
    index: u32,
    text: String,
}

pub struct SelectOptionAction {
    definition: ActionDefinition,
}

impl SelectOptionAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "index": {
                    "type": "number",
                    "description": "The index of the element to select an option."
                },
                "text": {
                    "type": "string",
                    "description": "The text of the option to select."
                }
            },
            "required": ["index", "text"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "selectOption",
                "Select an option from a dropdown element",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for SelectOptionAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for SelectOptionAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: SelectOptionParams = parse_params(params)?;

        let locator = match resolve_live(ctx.page.as_ref(), &ctx.dom_state, params.index).await {
            Ok(locator) => locator,
            Err(err) => return unresolved(err),
        };

        ctx.page
            .select_option(&locator, &params.text, SELECT_TIMEOUT)
            .await?;

        Ok(ActionOutcome::success(format!(
            "Selected option \"{}\" from element with index {}",
            params.text, params.index
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let index = params.get("index")?;
        let text = params.get("text")?.as_str()?;
        Some(format!(
            "Select option \"{}\" from element at index {}",
            text, index
        ))
    }
}
