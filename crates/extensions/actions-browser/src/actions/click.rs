//! Click an element by its highlight index.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use webhands_dom::{DEFAULT_STABLE_TIMEOUT, resolve_live, wait_for_stable};
use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

use super::unresolved;

#[derive(Debug, Deserialize)]
struct ClickParams {
    index: u32,
}

pub struct ClickElementAction {
    definition: ActionDefinition,
    stable_timeout: Duration,
}

impl ClickElementAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "index": {
                    "type": "number",
                    "description": "The index of the element to click."
                }
            },
            "required": ["index"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "clickElement",
                "Click on an element identified by its index",
            )
            .with_params_schema(schema),
            stable_timeout: DEFAULT_STABLE_TIMEOUT,
        }
    }

    /// How long to wait for the element to become visible, enabled and still.
    pub fn with_stable_timeout(mut self, timeout: Duration) -> Self {
        self.stable_timeout = timeout;
        self
    }
}

impl Default for ClickElementAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for ClickElementAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: ClickParams = parse_params(params)?;

        let locator = match resolve_live(ctx.page.as_ref(), &ctx.dom_state, params.index).await {
            Ok(locator) => locator,
            Err(err) => return unresolved(err),
        };

        if !wait_for_stable(ctx.page.as_ref(), &locator, self.stable_timeout).await? {
            warn!("Element {} did not settle before clicking", params.index);
            return Ok(ActionOutcome::failure(format!(
                "Element with index {} was not visible, enabled and stable within {}ms",
                params.index,
                self.stable_timeout.as_millis()
            )));
        }

        debug!("Clicking {}", locator);
        ctx.page.click(&locator).await?;

        Ok(ActionOutcome::success(format!(
            "Clicked element with index {}",
            params.index
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let index = params.get("index")?;
        Some(format!("Click element at index {}", index))
    }
}
