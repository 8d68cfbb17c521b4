use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

const CONFIG_FILE: &str = ".repo-mentor.toml";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-5-mini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .repo-mentor.toml. All fields are
/// optional; credentials fall back to environment variables, so the tool
/// works with zero config on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to the GITHUB_TOKEN env var.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// API key for the chat-completion endpoint. If None, falls back to
    /// the OPENAI_API_KEY env var.
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    pub base_url: Option<String>,

    /// Model identifier sent with every completion request.
    pub model: Option<String>,
}

impl Config {
    /// Load configuration from .repo-mentor.toml in the current directory,
    /// or defaults if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to the GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    /// Resolve the LLM API key: config file value takes precedence,
    /// falls back to the OPENAI_API_KEY env var.
    pub fn llm_api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn llm_base_url(&self) -> String {
        self.llm
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
    }

    pub fn llm_model(&self) -> String {
        self.llm
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm_base_url(), DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm_model(), DEFAULT_LLM_MODEL);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
token = "ghp_abc"

[llm]
api_key = "sk-test"
base_url = "https://llm.example.com/v1"
model = "gpt-4o-mini"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm_base_url(), "https://llm.example.com/v1");
        assert_eq!(config.llm_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[github]\ntoken = \"ghp_abc\"\n").unwrap();
        assert_eq!(config.llm_base_url(), DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm_model(), DEFAULT_LLM_MODEL);
    }
}
