//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The first error as a [`ConfigError`], if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_agent(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_llm(config, &mut result);
        Self::validate_retry(config, &mut result);
        result
    }

    fn validate_agent(config: &Config, result: &mut ValidationResult) {
        if config.agent.max_steps == Some(0) {
            result.add_warning(ValidationWarning::new(
                "agent.max_steps",
                "max_steps of 0 means no step limit",
            ));
        }

        if config.agent.token_limit == 0 {
            result.add_error(ValidationError::new(
                "agent.token_limit",
                "token_limit must be greater than 0",
            ));
        }

        if config.agent.settle_delay_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "agent.settle_delay_ms",
                "settle delay is over a minute, tasks will be very slow",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if let Some(endpoint) = &config.browser.endpoint {
            let ok = ["http://", "https://", "ws://", "wss://"]
                .iter()
                .any(|scheme| endpoint.starts_with(scheme));
            if !ok {
                result.add_error(ValidationError::new(
                    "browser.endpoint",
                    "endpoint must start with http://, https://, ws:// or wss://",
                ));
            }
        }

        if config.browser.viewport_width == 0 || config.browser.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport",
                "viewport dimensions must be greater than 0",
            ));
        }

        if config.browser.endpoint.is_none() && !config.browser.launch {
            result.add_warning(ValidationWarning::new(
                "browser.launch",
                format!(
                    "launch is disabled, a browser must already listen on port {}",
                    config.browser.debug_port
                ),
            ));
        }
    }

    fn validate_llm(config: &Config, result: &mut ValidationResult) {
        if config.llm.provider != "openai" {
            result.add_error(ValidationError::new(
                "llm.provider",
                format!("unsupported provider '{}', expected 'openai'", config.llm.provider),
            ));
        }

        let url = &config.llm.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "llm.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if let Some(t) = config.llm.temperature {
            if !(0.0..=2.0).contains(&t) {
                result.add_error(ValidationError::new(
                    "llm.temperature",
                    "temperature must be between 0 and 2",
                ));
            }
        }

        if config.llm.api_key.is_none() {
            result.add_warning(ValidationWarning::new(
                "llm.api_key",
                "API key is not set, OPENAI_API_KEY will be used",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.attempts == 0 {
            result.add_error(ValidationError::new(
                "retry.attempts",
                "attempts must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
