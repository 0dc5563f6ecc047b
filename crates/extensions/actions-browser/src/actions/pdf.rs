//! Answer a question about a PDF document.

use std::time::Duration;

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

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PdfParams {
    pdf_url: String,
    prompt: String,
}

/// Downloads a PDF and hands it to the model as a document part.
pub struct PdfAction {
    definition: ActionDefinition,
    http: reqwest::Client,
}

impl PdfAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "pdfUrl": {
                    "type": "string",
                    "description": "The URL of the PDF to analyze."
                },
                "prompt": {
                    "type": "string",
                    "description": "The prompt/question to ask about the PDF."
                }
            },
            "required": ["pdfUrl", "prompt"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new("analyzePdf", "Analyze a PDF using a prompt")
                .with_params_schema(schema),
            http: reqwest::Client::new(),
        }
    }

    /// `Ok(None)` when the server answered with something other than a PDF.
    async fn download(&self, url: &str) -> Result<Option<Vec<u8>>, reqwest::Error> {
        let response = self.http.get(url).timeout(DOWNLOAD_TIMEOUT).send().await?;
        let is_pdf = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("pdf"));

        if !response.status().is_success() || !is_pdf {
            warn!(
                "PDF download from {} returned {} ({})",
                url,
                response.status(),
                if is_pdf { "pdf" } else { "not a pdf" }
            );
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

impl Default for PdfAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for PdfAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: PdfParams = parse_params(params)?;

        let pdf = match self.download(&params.pdf_url).await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => return Ok(ActionOutcome::failure("Could not retrieve PDF file.")),
            Err(e) => {
                return Ok(ActionOutcome::failure(format!(
                    "Failed to download PDF: {}",
                    e
                )));
            }
        };
        debug!("Downloaded {} bytes from {}", pdf.len(), params.pdf_url);

        let request = CompletionRequest::new(vec![Message::user_parts(vec![
            ContentPart::text(params.prompt),
            ContentPart::document("application/pdf", STANDARD.encode(&pdf)),
        ])]);
        let response = ctx.llm.complete(request).await?;

        let text = response.text();
        if text.is_empty() {
            Ok(ActionOutcome::success("No response text returned."))
        } else {
            Ok(ActionOutcome::success(text))
        }
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let url = params.get("pdfUrl")?.as_str()?;
        let prompt = params.get("prompt")?.as_str()?;
        Some(format!("Analyze PDF at URL: {} with prompt: {}", url, prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedLlm, RecordingPage, context};
    use webhands_protocols::MessageContent;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(content_type: &str, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", content_type)
                    .set_body_bytes(b"%PDF-1.4".to_vec()),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_pdf_sent_as_document() {
        let server = serve("application/pdf", 200).await;
        let llm = CannedLlm::answering("Revenue grew 10%");
        let ctx = context(RecordingPage::new(), vec![], llm.clone());

        let outcome = PdfAction::new()
            .run(
                json!({"pdfUrl": format!("{}/report.pdf", server.uri()), "prompt": "Summarize"}),
                &ctx,
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Revenue grew 10%");

        let requests = llm.requests.lock();
        let MessageContent::Parts(parts) = &requests[0].messages[0].content else {
            panic!("expected multimodal message");
        };
        assert_eq!(parts[0], ContentPart::text("Summarize"));
        assert_eq!(
            parts[1],
            ContentPart::document("application/pdf", STANDARD.encode(b"%PDF-1.4"))
        );
    }

    #[tokio::test]
    async fn test_non_pdf_response() {
        let server = serve("text/html", 200).await;
        let ctx = context(RecordingPage::new(), vec![], CannedLlm::answering("x"));

        let outcome = PdfAction::new()
            .run(
                json!({"pdfUrl": format!("{}/report.pdf", server.uri()), "prompt": "Summarize"}),
                &ctx,
            )
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Could not retrieve PDF file.");
    }

    #[tokio::test]
    async fn test_download_failure() {
        let ctx = context(RecordingPage::new(), vec![], CannedLlm::answering("x"));
        let outcome = PdfAction::new()
            .run(
                json!({"pdfUrl": "http://127.0.0.1:1/report.pdf", "prompt": "Summarize"}),
                &ctx,
            )
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Failed to download PDF: "));
    }

    #[tokio::test]
    async fn test_empty_answer() {
        let server = serve("application/pdf", 200).await;
        let ctx = context(RecordingPage::new(), vec![], CannedLlm::answering(""));

        let outcome = PdfAction::new()
            .run(
                json!({"pdfUrl": format!("{}/report.pdf", server.uri()), "prompt": "Summarize"}),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(outcome.message, "No response text returned.");
    }

    #[test]
    fn test_pprint() {
        assert_eq!(
            PdfAction::new()
                .pprint(&json!({"pdfUrl": "https://x/a.pdf", "prompt": "Summarize"}))
                .as_deref(),
            Some("Analyze PDF at URL: https://x/a.pdf with prompt: Summarize")
        );
    }
}
