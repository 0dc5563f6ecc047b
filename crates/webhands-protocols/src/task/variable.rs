//! Named variables substituted into text inputs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<([^<>]+)>>").expect("placeholder regex"));

/// A value the model can reference as `<<key>>` without seeing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    pub description: String,
}

impl Variable {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    pub fn placeholder(&self) -> String {
        format!("<<{}>>", self.key)
    }
}

/// Replace every `<<key>>` of a known variable with its value.
///
/// Placeholders with no matching variable are left untouched, and
/// substituted values are never scanned again.
pub fn substitute_variables(text: &str, variables: &[Variable]) -> String {
    if variables.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            variables
                .iter()
                .find(|var| var.key == caps[1])
                .map(|var| var.value.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
