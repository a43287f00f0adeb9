use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Optional per-project settings file, looked up at the project root.
pub const SETTINGS_FILE: &str = "modernizer.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            other => Err(format!(
                "unknown provider '{other}' (expected 'anthropic' or 'openai')"
            )),
        }
    }
}

/// Top-level `modernizer.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
}

/// `[llm]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Provider,
    pub model: String,
    /// Sampling temperature, 0.0..=1.0
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport-level retries per request
    pub max_retries: u32,
    /// Override for the provider's API endpoint base
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-5-20250929".to_string(),
            temperature: 0.0,
            max_tokens: 64_000,
            max_retries: 3,
            base_url: None,
            anthropic_api_key: None,
            openai_api_key: None,
        }
    }
}

impl LlmSettings {
    /// Key for the selected provider, if configured.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::OpenAi => self.openai_api_key.as_deref(),
        }
    }

    pub fn has_any_api_key(&self) -> bool {
        self.anthropic_api_key.is_some() || self.openai_api_key.is_some()
    }
}

impl Settings {
    /// Defaults, then `modernizer.toml` under `project_root`, then the
    /// process environment.
    pub fn load(project_root: &Path) -> Result<Self> {
        Self::load_with_env(project_root, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(
        project_root: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let path = project_root.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        settings.apply_env(|key| env(key).filter(|v| !v.trim().is_empty()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&contents).map_err(|e| Error::Config {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let llm = &mut self.llm;
        if let Some(provider) = env("MODERNIZER_LLM_PROVIDER") {
            llm.provider = provider.parse().map_err(|message| Error::InvalidSetting {
                key: "MODERNIZER_LLM_PROVIDER",
                message,
            })?;
        }
        if let Some(model) = env("MODERNIZER_LLM_MODEL") {
            llm.model = model;
        }
        if let Some(temperature) = env("MODERNIZER_LLM_TEMPERATURE") {
            llm.temperature = temperature
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| Error::InvalidSetting {
                    key: "MODERNIZER_LLM_TEMPERATURE",
                    message: e.to_string(),
                })?;
        }
        if let Some(base_url) = env("MODERNIZER_LLM_BASE_URL") {
            llm.base_url = Some(base_url);
        }
        if let Some(key) = env("ANTHROPIC_API_KEY") {
            llm.anthropic_api_key = Some(key);
        }
        if let Some(key) = env("OPENAI_API_KEY") {
            llm.openai_api_key = Some(key);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(Error::InvalidSetting {
                key: "llm.temperature",
                message: format!("{} is outside 0.0..=1.0", self.llm.temperature),
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::InvalidSetting {
                key: "llm.model",
                message: "model must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
