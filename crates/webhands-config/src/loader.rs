//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Directory under the home directory holding config and logs.
pub const APP_DIR: &str = ".webhands";

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        config.expand_paths();
        Ok(config)
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// `~/.webhands/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        Self::app_dir().map(|dir| dir.join("config.toml"))
    }

    /// `~/.webhands`.
    pub fn app_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(APP_DIR))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.agent.token_limit, 128_000);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [agent]
            max_steps = 20
            debug = true
            debug_dir = "/tmp/webhands-debug"
            settle_delay_ms = 500
            stop_on_complete = true
            viewport_only = true

            [browser]
            endpoint = "http://127.0.0.1:9333"
            headless = true

            [llm]
            model = "gpt-4.1-mini"
            api_key = "sk-test"
            temperature = 0.2

            [actions]
            pdf_analysis = true

            [retry]
            attempts = 5
            base_delay_ms = 250
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.agent.max_steps, Some(20));
        assert!(config.agent.debug);
        assert_eq!(config.agent.settle_delay_ms, 500);
        assert!(config.agent.stop_on_complete);
        assert!(config.agent.viewport_only);
        assert_eq!(config.browser.endpoint.as_deref(), Some("http://127.0.0.1:9333"));
        assert!(config.browser.headless);
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert!(config.actions.pdf_analysis);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]").unwrap();
        writeln!(file, "max_steps = 7").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.agent.max_steps, Some(7));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_explicit_missing() {
        let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/webhands.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: unique test-only variable
        unsafe {
            std::env::set_var("WEBHANDS_TEST_CONFIG_KEY", "sk-from-env");
        }
        let config = ConfigLoader::load_str(
            "[llm]\napi_key = \"${WEBHANDS_TEST_CONFIG_KEY}\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-from-env"));
        unsafe {
            std::env::remove_var("WEBHANDS_TEST_CONFIG_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_WEBHANDS_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        assert_eq!(ConfigLoader::expand_env_vars(content).unwrap(), content);
    }

    #[test]
    fn test_tilde_paths_expanded() {
        let config = ConfigLoader::load_str("[agent]\ndebug_dir = \"~/wh-debug\"\n").unwrap();
        let dir = config.agent.debug_dir.to_string_lossy().to_string();
        assert!(!dir.starts_with('~'));
        assert!(dir.ends_with("/wh-debug"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
    }

    #[test]
    fn test_default_path() {
        if let Some(path) = ConfigLoader::default_path() {
            assert!(path.ends_with(".webhands/config.toml"));
        }
    }
}
