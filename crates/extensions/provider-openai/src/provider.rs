//! OpenAI provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use webhands_protocols::{
    CompletionRequest, CompletionResponse, LLMProvider, OutputSchema, ProviderError,
    StructuredOutputMethod,
};

use crate::api::{ApiErrorBody, ApiRequest, ApiResponse};
use crate::converter::{convert_messages, forced_tool, json_schema_format};
use crate::parser::{parse_function_call, parse_native, parse_response};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI chat completions provider.
pub struct OpenAIProvider {
    api_key: String,
    api_url: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: chat_url(DEFAULT_BASE_URL),
            model: model.into(),
            temperature: None,
            client: reqwest::Client::new(),
        }
    }

    /// Point at an OpenAI-compatible API (`{base_url}/chat/completions`).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_url = chat_url(base_url);
        self
    }

    /// Default sampling temperature, used when a request sets none.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: convert_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature.or(self.temperature),
            tools: Vec::new(),
            tool_choice: None,
            response_format: None,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<ApiResponse, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(api_request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), &text, retry_after));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(REQUEST_TIMEOUT.as_secs())
    } else {
        ProviderError::Network(err.to_string())
    }
}

fn map_status_error(status: u16, body: &str, retry_after: Option<u64>) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => ProviderError::AuthenticationFailed(message),
        429 => ProviderError::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(0),
        },
        400 | 404 | 422 => ProviderError::InvalidRequest(message),
        _ => ProviderError::ApiError { status, message },
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request);
        let response = self.send_request(&api_request).await?;
        parse_response(response)
    }

    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: &OutputSchema,
        method: StructuredOutputMethod,
    ) -> Result<Value, ProviderError> {
        let mut api_request = self.build_request(&request);
        debug!("Structured completion {} via {:?}", schema.name, method);

        match method {
            StructuredOutputMethod::Native => {
                api_request.response_format = Some(json_schema_format(schema));
                let response = self.send_request(&api_request).await?;
                parse_native(&response)
            }
            StructuredOutputMethod::FunctionCalling => {
                let (tool, choice) = forced_tool(schema);
                api_request.tools = vec![tool];
                api_request.tool_choice = Some(choice);
                let response = self.send_request(&api_request).await?;
                parse_function_call(&response, &schema.name)
            }
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
