//! Message conversion for the OpenAI API.

use webhands_protocols::{
    ContentPart as ProtoContentPart, Message, MessageContent, MessageRole, OutputSchema,
};

use crate::api::{
    ApiMessage, ApiTool, ContentPart, FileData, FunctionDef, ImageUrl, JsonSchemaFormat,
    MessageContent as ApiMessageContent, ResponseFormat, ToolChoice, ToolChoiceFunction,
};

/// Convert protocol messages to OpenAI API format.
pub fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
    messages.iter().map(convert_message).collect()
}

fn convert_message(msg: &Message) -> ApiMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };

    let content = match &msg.content {
        MessageContent::Text(text) => ApiMessageContent::Text(text.clone()),
        MessageContent::Parts(parts) => ApiMessageContent::Parts(convert_parts(parts)),
    };

    ApiMessage {
        role: role.to_string(),
        content,
        name: msg.name.clone(),
    }
}

fn convert_parts(parts: &[ProtoContentPart]) -> Vec<ContentPart> {
    parts
        .iter()
        .map(|part| match part {
            ProtoContentPart::Text { text } => ContentPart::Text { text: text.clone() },
            ProtoContentPart::Image { source } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: source.to_url(),
                    detail: None,
                },
            },
            ProtoContentPart::Document { media_type, data } => ContentPart::File {
                file: FileData {
                    filename: document_filename(media_type),
                    file_data: format!("data:{};base64,{}", media_type, data),
                },
            },
        })
        .collect()
}

fn document_filename(media_type: &str) -> String {
    let extension = media_type.rsplit('/').next().unwrap_or("bin");
    format!("document.{}", extension)
}

/// `response_format` for native structured output.
pub fn json_schema_format(schema: &OutputSchema) -> ResponseFormat {
    ResponseFormat {
        format_type: "json_schema".to_string(),
        json_schema: Some(JsonSchemaFormat {
            name: schema.name.clone(),
            description: schema.description.clone(),
            schema: schema.schema.clone(),
            strict: true,
        }),
    }
}

/// A single function tool carrying the schema, and the choice that forces it.
pub fn forced_tool(schema: &OutputSchema) -> (ApiTool, ToolChoice) {
    let tool = ApiTool {
        tool_type: "function".to_string(),
        function: FunctionDef {
            name: schema.name.clone(),
            description: schema.description.clone(),
            parameters: schema.schema.clone(),
        },
    };
    let choice = ToolChoice {
        choice_type: "function".to_string(),
        function: ToolChoiceFunction {
            name: schema.name.clone(),
        },
    };
    (tool, choice)
}
