//! `userInteraction`: lets the model ask the person at the terminal.

use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use serde::Deserialize;
use serde_json::{Value, json};

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

use crate::console::Console;

/// Answers questions on behalf of the user.
#[async_trait]
pub(crate) trait Prompter: Send + Sync {
    async fn input(&self, message: &str) -> io::Result<String>;
    async fn password(&self, message: &str) -> io::Result<String>;
    async fn select(&self, message: &str, choices: &[String]) -> io::Result<String>;
    async fn confirm(&self, message: &str) -> io::Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Kind {
    Password,
    TextInput,
    Select,
    Confirm,
}

#[derive(Debug, Deserialize)]
struct InteractionParams {
    message: String,
    kind: Kind,
    #[serde(default)]
    choices: Option<Vec<String>>,
}

pub(crate) struct UserInteractionAction {
    definition: ActionDefinition,
    prompter: Arc<dyn Prompter>,
}

impl UserInteractionAction {
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        Self {
            definition: ActionDefinition::new(
                "userInteraction",
                "Action to request input from the user during task execution. Use this when \
                 you need to collect information from the user such as text input, password, \
                 selection from choices, or confirmation. The response will be returned to \
                 continue the workflow.",
            )
            .with_params_schema(json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "A message to provide to the user. Make it friendly and ask them for a suitable response. Keep it short and between 1-2 sentences if possible."
                    },
                    "kind": {
                        "type": "string",
                        "enum": ["password", "text_input", "select", "confirm"],
                        "description": "The kind of response that is expected from the user. If you can't find a suitable option, then respond with confirm."
                    },
                    "choices": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "If you select choices as the kind option, then what options should be offered to the user."
                    }
                },
                "required": ["message", "kind"]
            })),
            prompter,
        }
    }

    async fn ask(&self, params: InteractionParams) -> io::Result<ActionOutcome> {
        let message = params.message.as_str();
        Ok(match params.kind {
            Kind::TextInput => {
                let answer = self.prompter.input(message).await?;
                ActionOutcome::success(format!("User responded with the text: \"{}\"", answer))
            }
            Kind::Confirm => {
                let answer = self.prompter.confirm(message).await?;
                ActionOutcome::success(format!("User responded with \"{}\"", answer))
            }
            Kind::Password => {
                let answer = self.prompter.password(message).await?;
                ActionOutcome::success(format!("User responded with password: {}", answer))
            }
            Kind::Select => match params.choices.as_deref() {
                Some(choices) if !choices.is_empty() => {
                    let answer = self.prompter.select(message, choices).await?;
                    ActionOutcome::success(format!("User selected the choice: {}", answer))
                }
                _ => ActionOutcome::failure(
                    "For choices kind of user interaction, an array of choices is required.",
                ),
            },
        })
    }
}

#[async_trait]
impl Action for UserInteractionAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: InteractionParams = parse_params(params)?;
        self.ask(params)
            .await
            .map_err(|e| ActionError::ExecutionFailed(format!("Failed to read user input: {}", e)))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        params
            .get("message")
            .and_then(Value::as_str)
            .map(|m| format!("Asking the user: {}", m))
    }
}

/// Line-based prompts on the terminal.
pub(crate) struct TerminalPrompter {
    console: Console,
}

impl TerminalPrompter {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    async fn ask_line(&self, prompt: &str) -> io::Result<String> {
        print!("{} {} ", "?".green().bold(), prompt.bold());
        io::stdout().flush()?;
        self.console
            .read_line()
            .await
            .map(|line| line.trim().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn input(&self, message: &str) -> io::Result<String> {
        loop {
            let answer = self.ask_line(message).await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("{}", "An answer is required.".yellow());
        }
    }

    async fn password(&self, message: &str) -> io::Result<String> {
        println!(
            "{}",
            "Providing passwords to LLMs can be dangerous. Passwords are passed in plain-text \
             to the LLM and can be read by other people."
                .red()
        );
        self.ask_line(message).await
    }

    async fn select(&self, message: &str, choices: &[String]) -> io::Result<String> {
        println!("{} {}", "?".green().bold(), message.bold());
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice);
        }
        loop {
            let answer = self.ask_line("Choice number:").await?;
            if let Some(choice) = pick_choice(&answer, choices) {
                return Ok(choice.to_string());
            }
            println!("{}", "Please enter one of the listed numbers.".yellow());
        }
    }

    async fn confirm(&self, message: &str) -> io::Result<bool> {
        loop {
            let answer = self.ask_line(&format!("{} (y/n)", message)).await?;
            if let Some(yes) = parse_yes_no(&answer) {
                return Ok(yes);
            }
        }
    }
}

fn pick_choice<'a>(answer: &str, choices: &'a [String]) -> Option<&'a str> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).map(String::as_str);
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(answer))
        .map(String::as_str)
}

pub(crate) fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
