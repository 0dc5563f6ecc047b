//! LLM provider trait definition.

use async_trait::async_trait;
use serde_json::Value;

use super::{CompletionRequest, CompletionResponse, OutputSchema, StructuredOutputMethod};
use crate::error::ProviderError;

/// Core trait for LLM providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Free-form completion.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;

    /// Completion whose answer is a JSON value matching `schema`.
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: &OutputSchema,
        method: StructuredOutputMethod,
    ) -> Result<Value, ProviderError>;

    fn structured_output_method(&self) -> StructuredOutputMethod {
        StructuredOutputMethod::for_model(self.model())
    }
}
