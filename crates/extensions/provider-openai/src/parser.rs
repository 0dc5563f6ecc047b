//! Turning API responses into protocol values.

use serde_json::Value;

use webhands_protocols::{CompletionResponse, Message, ProviderError, Usage};

use crate::api::{ApiResponse, Choice};

fn first_choice(response: &ApiResponse) -> Result<&Choice, ProviderError> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ProviderError::ContentFiltered(
            "completion stopped by the content filter".to_string(),
        ));
    }
    if let Some(refusal) = &choice.message.refusal {
        return Err(ProviderError::ContentFiltered(refusal.clone()));
    }
    Ok(choice)
}

/// Free-form completion.
pub fn parse_response(response: ApiResponse) -> Result<CompletionResponse, ProviderError> {
    let text = first_choice(&response)?
        .message
        .content
        .clone()
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: response.id,
        model: response.model,
        message: Message::assistant(text),
        usage,
    })
}

/// JSON object carried in the message content (`json_schema` mode).
pub fn parse_native(response: &ApiResponse) -> Result<Value, ProviderError> {
    let content = first_choice(response)?
        .message
        .content
        .as_deref()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no content".to_string()))?;

    serde_json::from_str(content)
        .map_err(|e| ProviderError::InvalidResponse(format!("content is not valid JSON: {}", e)))
}

/// Arguments of the forced function call.
pub fn parse_function_call(response: &ApiResponse, name: &str) -> Result<Value, ProviderError> {
    let choice = first_choice(response)?;
    let call = choice
        .message
        .tool_calls
        .iter()
        .find(|c| c.function.name == name)
        .ok_or_else(|| {
            ProviderError::InvalidResponse(format!("model did not call function {}", name))
        })?;

    serde_json::from_str(&call.function.arguments).map_err(|e| {
        ProviderError::InvalidResponse(format!("function arguments are not valid JSON: {}", e))
    })
}
