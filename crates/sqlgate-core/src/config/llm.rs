//! Translation backend configuration.
//!
//! `LLM_TYPE` picks one backend; only that backend's fields are read.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported translation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    /// Local Ollama server.
    #[default]
    Ollama,
    /// LM Studio's OpenAI-compatible server.
    LmStudio,
    /// Anthropic Claude.
    Claude,
    /// OpenAI chat completions.
    OpenAi,
    /// Google Gemini.
    Gemini,
}

impl LlmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmType::Ollama => "ollama",
            LlmType::LmStudio => "lmstudio",
            LlmType::Claude => "claude",
            LlmType::OpenAi => "openai",
            LlmType::Gemini => "gemini",
        }
    }
}

impl FromStr for LlmType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmType::Ollama),
            "lmstudio" => Ok(LlmType::LmStudio),
            "claude" => Ok(LlmType::Claude),
            "openai" => Ok(LlmType::OpenAi),
            "gemini" => Ok(LlmType::Gemini),
            _ => Err(ConfigError::UnknownLlmType(s.to_string())),
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw backend options, as given by the operator.
#[derive(Clone)]
pub struct LlmConfig {
    /// Backend identifier (`LLM_TYPE`), validated by [`LlmConfig::backend`].
    pub llm_type: String,

    pub ollama_host: String,
    pub ollama_model: String,

    pub lmstudio_base_url: String,
    pub lmstudio_model: String,

    pub claude_model: String,
    pub anthropic_api_key: Option<String>,

    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_api_key: Option<String>,

    pub gemini_model: String,
    pub gemini_api_key: Option<String>,

    /// Per-request timeout for backend calls, in seconds.
    pub timeout_secs: u64,
}

/// A fully resolved backend selection.
#[derive(Clone, PartialEq, Eq)]
pub enum LlmBackend {
    Ollama {
        host: String,
        model: String,
    },
    LmStudio {
        base_url: String,
        model: String,
    },
    Claude {
        api_key: String,
        model: String,
    },
    OpenAi {
        base_url: String,
        api_key: String,
        model: String,
    },
    Gemini {
        api_key: String,
        model: String,
    },
}

impl LlmBackend {
    pub fn llm_type(&self) -> LlmType {
        match self {
            LlmBackend::Ollama { .. } => LlmType::Ollama,
            LlmBackend::LmStudio { .. } => LlmType::LmStudio,
            LlmBackend::Claude { .. } => LlmType::Claude,
            LlmBackend::OpenAi { .. } => LlmType::OpenAi,
            LlmBackend::Gemini { .. } => LlmType::Gemini,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmBackend::Ollama { model, .. }
            | LlmBackend::LmStudio { model, .. }
            | LlmBackend::Claude { model, .. }
            | LlmBackend::OpenAi { model, .. }
            | LlmBackend::Gemini { model, .. } => model,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::default().as_str().to_string(),
            ollama_host: default_ollama_host(),
            ollama_model: default_ollama_model(),
            lmstudio_base_url: default_lmstudio_base_url(),
            lmstudio_model: default_lmstudio_model(),
            claude_model: default_claude_model(),
            anthropic_api_key: None,
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            openai_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl LlmConfig {
    /// Parse `llm_type` and pick out the selected backend's settings.
    pub fn backend(&self) -> Result<LlmBackend, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "LLM_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let backend = match self.llm_type.parse::<LlmType>()? {
            LlmType::Ollama => LlmBackend::Ollama {
                host: self.ollama_host.clone(),
                model: self.ollama_model.clone(),
            },
            LlmType::LmStudio => LlmBackend::LmStudio {
                base_url: self.lmstudio_base_url.clone(),
                model: self.lmstudio_model.clone(),
            },
            LlmType::Claude => LlmBackend::Claude {
                api_key: required_key(&self.anthropic_api_key, "ANTHROPIC_API_KEY", "Claude")?,
                model: self.claude_model.clone(),
            },
            LlmType::OpenAi => LlmBackend::OpenAi {
                base_url: self.openai_base_url.clone(),
                api_key: required_key(&self.openai_api_key, "OPENAI_API_KEY", "OpenAI")?,
                model: self.openai_model.clone(),
            },
            LlmType::Gemini => LlmBackend::Gemini {
                api_key: required_key(&self.gemini_api_key, "GEMINI_API_KEY", "Gemini")?,
                model: self.gemini_model.clone(),
            },
        };
        Ok(backend)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn required_key(
    value: &Option<String>,
    key: &'static str,
    backend: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(ConfigError::MissingApiKey { key, backend })
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("LlmConfig")
            .field("llm_type", &self.llm_type)
            .field("ollama_host", &self.ollama_host)
            .field("ollama_model", &self.ollama_model)
            .field("lmstudio_base_url", &self.lmstudio_base_url)
            .field("lmstudio_model", &self.lmstudio_model)
            .field("claude_model", &self.claude_model)
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmBackend::Ollama { host, model } => f
                .debug_struct("Ollama")
                .field("host", host)
                .field("model", model)
                .finish(),
            LlmBackend::LmStudio { base_url, model } => f
                .debug_struct("LmStudio")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            LlmBackend::Claude { model, .. } => f
                .debug_struct("Claude")
                .field("api_key", &"***")
                .field("model", model)
                .finish(),
            LlmBackend::OpenAi { base_url, model, .. } => f
                .debug_struct("OpenAi")
                .field("base_url", base_url)
                .field("api_key", &"***")
                .field("model", model)
                .finish(),
            LlmBackend::Gemini { model, .. } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("model", model)
                .finish(),
        }
    }
}

// Default value functions
pub fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

pub fn default_ollama_model() -> String {
    "codellama".to_string()
}

pub fn default_lmstudio_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

pub fn default_lmstudio_model() -> String {
    "local-model".to_string()
}

pub fn default_claude_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

pub fn default_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_ollama() {
        let backend = LlmConfig::default().backend().unwrap();
        assert_eq!(
            backend,
            LlmBackend::Ollama {
                host: "http://localhost:11434".to_string(),
                model: "codellama".to_string(),
            }
        );
    }

    #[test]
    fn test_llm_type_parsing_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<LlmType>().unwrap(), LlmType::OpenAi);
        assert_eq!(" lmstudio ".parse::<LlmType>().unwrap(), LlmType::LmStudio);
        assert_eq!(
            "mistral".parse::<LlmType>(),
            Err(ConfigError::UnknownLlmType("mistral".to_string()))
        );
    }

    #[test]
    fn test_claude_requires_api_key() {
        let config = LlmConfig {
            llm_type: "claude".to_string(),
            ..Default::default()
        };
        let err = config.backend().unwrap_err();
        assert_eq!(err.to_string(), "ANTHROPIC_API_KEY required for Claude");
    }

    #[test]
    fn test_openai_and_gemini_require_api_keys() {
        let config = LlmConfig {
            llm_type: "openai".to_string(),
            openai_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.backend(),
            Err(ConfigError::MissingApiKey {
                key: "OPENAI_API_KEY",
                backend: "OpenAI"
            })
        );

        let config = LlmConfig {
            llm_type: "gemini".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.backend(),
            Err(ConfigError::MissingApiKey {
                key: "GEMINI_API_KEY",
                backend: "Gemini"
            })
        );
    }

    #[test]
    fn test_backend_with_key() {
        let config = LlmConfig {
            llm_type: "claude".to_string(),
            anthropic_api_key: Some("sk-ant-test".to_string()),
            ..Default::default()
        };
        let backend = config.backend().unwrap();
        assert_eq!(backend.llm_type(), LlmType::Claude);
        assert_eq!(backend.model(), "claude-3-5-sonnet-20241022");
        assert!(!format!("{:?}", backend).contains("sk-ant-test"));
    }

    #[test]
    fn test_llm_type_serialization() {
        let json = serde_json::to_string(&LlmType::LmStudio).unwrap();
        assert_eq!(json, "\"lmstudio\"");
    }
}
