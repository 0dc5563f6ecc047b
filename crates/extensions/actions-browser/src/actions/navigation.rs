//! URL navigation and history actions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

fn no_params() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": [],
        "additionalProperties": false
    })
}

#[derive(Debug, Deserialize)]
struct GoToUrlParams {
    url: String,
}

/// Navigate the page to a URL.
pub struct GoToUrlAction {
    definition: ActionDefinition,
}

impl GoToUrlAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL you want to navigate to."
                }
            },
            "required": ["url"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "goToUrl",
                "Navigate to a specific URL in the browser",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for GoToUrlAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for GoToUrlAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: GoToUrlParams = parse_params(params)?;
        debug!("Navigating to {}", params.url);
        ctx.page.goto(&params.url).await?;
        Ok(ActionOutcome::success(format!("Navigated to {}", params.url)))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let url = params.get("url")?.as_str()?;
        Some(format!("Navigate to URL: {}", url))
    }
}

/// Go back in session history.
pub struct PageBackAction {
    definition: ActionDefinition,
}

impl PageBackAction {
    pub fn new() -> Self {
        Self {
            definition: ActionDefinition::new(
                "pageBack",
                "Navigate back to the previous page in the browser history",
            )
            .with_params_schema(no_params()),
        }
    }
}

impl Default for PageBackAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for PageBackAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, _params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        ctx.page.go_back().await?;
        Ok(ActionOutcome::success("Navigated back to the previous page"))
    }

    fn pprint(&self, _params: &Value) -> Option<String> {
        Some("Navigate back to previous page".to_string())
    }
}

/// Go forward in session history.
pub struct PageForwardAction {
    definition: ActionDefinition,
}

impl PageForwardAction {
    pub fn new() -> Self {
        Self {
            definition: ActionDefinition::new(
                "pageForward",
                "Navigate forward to the next page in the browser history",
            )
            .with_params_schema(no_params()),
        }
    }
}

impl Default for PageForwardAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for PageForwardAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, _params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        ctx.page.go_forward().await?;
        Ok(ActionOutcome::success("Navigated forward to the next page"))
    }

    fn pprint(&self, _params: &Value) -> Option<String> {
        Some("Navigate forward to next page".to_string())
    }
}

/// Reload the current page.
pub struct RefreshPageAction {
    definition: ActionDefinition,
}

impl RefreshPageAction {
    pub fn new() -> Self {
        Self {
            definition: ActionDefinition::new(
                "refreshPage",
                "Refresh a webpage. Refreshing a webpage is usually a good way if you need to reset the state on a page. Take care since every thing you did on that page will be reset.",
            )
            .with_params_schema(no_params()),
        }
    }
}

impl Default for RefreshPageAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for RefreshPageAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, _params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        ctx.page.reload().await?;
        Ok(ActionOutcome::success("Succesfully refreshed a page."))
    }

    fn pprint(&self, _params: &Value) -> Option<String> {
        Some("Refresh current page".to_string())
    }
}
