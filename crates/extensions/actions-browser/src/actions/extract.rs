//! Ask the model to pull information out of the current page.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, CompletionRequest,
    ContentPart, Message, parse_params,
};

use crate::markdown::page_markdown;

/// Rough characters-per-token ratio used to fit page text into the budget.
const TOKENS_PER_CHAR: f64 = 0.75;

const TRUNCATION_NOTICE: &str = "\n[Content truncated due to length]";

#[derive(Debug, Deserialize)]
struct ExtractParams {
    objective: String,
}

pub struct ExtractAction {
    definition: ActionDefinition,
}

impl ExtractAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "objective": {
                    "type": "string",
                    "description": "The goal of the extraction."
                }
            },
            "required": ["objective"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "extract",
                "Extract content from the page according to the objective, e.g. product prices, contact information, article text, table data, or specific metadata fields",
            )
            .with_params_schema(schema),
        }
    }

    async fn extract(&self, objective: &str, ctx: &ActionContext) -> Result<String, ActionError> {
        let markdown = page_markdown(ctx.page.as_ref()).await?;
        let screenshot = ctx.page.screenshot().await?;

        let max_chars = (ctx.token_limit as f64 / TOKENS_PER_CHAR).floor() as usize;
        let content = truncate(&markdown, max_chars);

        if let Some(dir) = &ctx.debug_dir {
            write_debug_files(dir, &screenshot, &content).await;
        }

        let prompt = format!(
            "Extract the following information from the page according to this objective: \"{}\"\n\nPage content:\n{}\nHere is as screenshot of the page:\n",
            objective, content
        );
        let request = CompletionRequest::new(vec![Message::user_parts(vec![
            ContentPart::text(prompt),
            ContentPart::image_base64("image/png", screenshot),
        ])]);

        let response = ctx.llm.complete(request).await?;
        Ok(response.text())
    }
}

impl Default for ExtractAction {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(markdown: &str, max_chars: usize) -> String {
    match markdown.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &markdown[..cut], TRUNCATION_NOTICE),
        None => markdown.to_string(),
    }
}

async fn write_debug_files(dir: &Path, screenshot: &str, markdown: &str) {
    match STANDARD.decode(screenshot) {
        Ok(png) => {
            if let Err(e) = tokio::fs::write(dir.join("extract-screenshot.png"), png).await {
                warn!("Failed to write extract screenshot: {}", e);
            }
        }
        Err(e) => warn!("Screenshot is not valid base64: {}", e),
    }
    if let Err(e) = tokio::fs::write(dir.join("extract-markdown-content.md"), markdown).await {
        warn!("Failed to write extract markdown: {}", e);
    }
}

#[async_trait]
impl Action for ExtractAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: ExtractParams = parse_params(params)?;
        debug!("Extracting with objective: {}", params.objective);

        match self.extract(&params.objective, ctx).await {
            Ok(content) if content.is_empty() => {
                Ok(ActionOutcome::failure("No content extracted from page."))
            }
            Ok(content) => Ok(ActionOutcome::success(format!(
                "Extracted content from page:\n{}",
                content
            ))),
            Err(e) => Ok(ActionOutcome::failure(format!(
                "Failed to extract content: {}",
                e
            ))),
        }
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let objective = params.get("objective")?.as_str()?;
        Some(format!(
            "Extract content from page with objective: \"{}\"",
            objective
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedLlm, RecordingPage, context};
    use webhands_protocols::{ImageSource, MessageContent};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 10), "abcdef");
        assert_eq!(
            truncate("abcdef", 4),
            "abcd\n[Content truncated due to length]"
        );
        assert_eq!(
            truncate("héllo", 2),
            "hé\n[Content truncated due to length]"
        );
    }

    #[tokio::test]
    async fn test_extract_sends_markdown_and_screenshot() {
        let page = RecordingPage::new();
        *page.evaluate_result.lock() = json!("# Prices\n\nMilk $2");
        let llm = CannedLlm::answering("Milk costs $2");
        let ctx = context(page, vec![], llm.clone());

        let outcome = ExtractAction::new()
            .run(json!({"objective": "milk price"}), &ctx)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Extracted content from page:\nMilk costs $2");

        let requests = llm.requests.lock();
        let MessageContent::Parts(parts) = &requests[0].messages[0].content else {
            panic!("expected multimodal message");
        };
        match &parts[0] {
            ContentPart::Text { text } => {
                assert!(text.starts_with(
                    "Extract the following information from the page according to this objective: \"milk price\""
                ));
                assert!(text.contains("Page content:\n# Prices\n\nMilk $2\n"));
            }
            other => panic!("unexpected part {:?}", other),
        }
        match &parts[1] {
            ContentPart::Image {
                source: ImageSource::Base64 { media_type, data },
            } => {
                assert_eq!(media_type, "image/png");
                assert_eq!(data, "iVBORw0KGgo=");
            }
            other => panic!("unexpected part {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_truncates_to_token_budget() {
        let page = RecordingPage::new();
        *page.evaluate_result.lock() = json!("x".repeat(100));
        let llm = CannedLlm::answering("ok");
        let ctx = context(page, vec![], llm.clone()).with_token_limit(30);

        ExtractAction::new()
            .run(json!({"objective": "anything"}), &ctx)
            .await
            .unwrap();

        let text = llm.requests.lock()[0].messages[0].text();
        let expected = format!("Page content:\n{}\n[Content truncated due to length]\n", "x".repeat(40));
        assert!(text.contains(&expected), "{}", text);
    }

    #[tokio::test]
    async fn test_empty_answer_is_failure() {
        let ctx = context(RecordingPage::new(), vec![], CannedLlm::answering(""));
        let outcome = ExtractAction::new()
            .run(json!({"objective": "anything"}), &ctx)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No content extracted from page.");
    }

    #[tokio::test]
    async fn test_model_error_is_reported() {
        let ctx = context(RecordingPage::new(), vec![], CannedLlm::failing("connection reset"));
        let outcome = ExtractAction::new()
            .run(json!({"objective": "anything"}), &ctx)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Failed to extract content: "));
        assert!(outcome.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_debug_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let page = RecordingPage::new();
        *page.evaluate_result.lock() = json!("# Title");
        let ctx = context(page, vec![], CannedLlm::answering("done"))
            .with_debug_dir(dir.path().to_path_buf());

        ExtractAction::new()
            .run(json!({"objective": "title"}), &ctx)
            .await
            .unwrap();

        let md = std::fs::read_to_string(dir.path().join("extract-markdown-content.md")).unwrap();
        assert_eq!(md, "# Title");
        let png = std::fs::read(dir.path().join("extract-screenshot.png")).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}
