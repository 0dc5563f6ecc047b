//! Conversation assembly for one step.
//!
//! [`build_step_messages`] is pure: the same inputs always give the same
//! messages in the same order.

use webhands_protocols::dom::DomState;
use webhands_protocols::task::{AgentStep, Variable};
use webhands_protocols::types::{ContentPart, Message};

/// Everything the model sees for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub system_prompt: &'a str,
    pub goal: &'a str,
    pub url: &'a str,
    pub variables: &'a [Variable],
    pub steps: &'a [AgentStep],
    pub dom_state: &'a DomState,
}

pub fn build_step_messages(input: StepInput<'_>) -> Vec<Message> {
    let mut messages = vec![
        Message::system(input.system_prompt),
        Message::user(format!("=== Final Goal ===\n{}\n", input.goal)),
        Message::user(format!("=== Current URL ===\n{}\n", input.url)),
        Message::user(format!(
            "=== Variables ===\n{}\n",
            variable_lines(input.variables)
        )),
    ];

    if !input.steps.is_empty() {
        messages.push(Message::user("=== Previous Actions ===\n"));
        for step in input.steps {
            let output = serde_json::to_string(&step.agent_output).unwrap_or_default();
            messages.push(Message::assistant(output));
            for outcome in &step.action_outputs {
                messages.push(Message::user(outcome.feedback()));
            }
        }
    }

    messages.push(Message::user(format!(
        "=== Elements ===\n{}\n",
        input.dom_state.dom_text
    )));

    let metrics = &input.dom_state.metrics;
    let mut parts = vec![ContentPart::text("=== Page Screenshot ===\n")];
    if let Some(screenshot) = &input.dom_state.screenshot {
        parts.push(ContentPart::image_base64("image/png", screenshot.clone()));
    }
    parts.push(ContentPart::text(format!(
        "=== Page State ===\nPixels above: {}\nPixels below: {}\n",
        metrics.pixels_above(),
        metrics.pixels_below()
    )));
    messages.push(Message::user_parts(parts));

    messages
}

fn variable_lines(variables: &[Variable]) -> String {
    variables
        .iter()
        .map(|v| format!("{} - {}", v.placeholder(), v.description))
        .collect::<Vec<_>>()
        .join("\n")
}
