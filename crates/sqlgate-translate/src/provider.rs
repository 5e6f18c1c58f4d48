//! Chat-completion backends.
//!
//! Each variant knows its endpoint, request body and where the reply text
//! lives in the response. Selection happens once, from configuration.

use crate::error::TranslationError;
use crate::prompt::{ChatMessage, Prompt};
use serde_json::{Value, json};
use sqlgate_core::{LlmBackend, LlmType};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upper bound on generated tokens for backends that require one.
const MAX_TOKENS: u32 = 1024;

/// Response bodies longer than this are cut in error messages.
const ERROR_BODY_LIMIT: usize = 512;

/// A configured chat backend.
#[derive(Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama's native `/api/chat`.
    Ollama { host: String, model: String },
    /// LM Studio's OpenAI-compatible server. No key.
    LmStudio { base_url: String, model: String },
    /// Anthropic Messages API.
    Claude {
        base_url: String,
        api_key: String,
        model: String,
    },
    /// OpenAI Chat Completions.
    OpenAi {
        base_url: String,
        api_key: String,
        model: String,
    },
    /// Google Gemini `generateContent`.
    Gemini {
        base_url: String,
        api_key: String,
        model: String,
    },
}

impl From<&LlmBackend> for LlmProvider {
    fn from(backend: &LlmBackend) -> Self {
        match backend {
            LlmBackend::Ollama { host, model } => LlmProvider::Ollama {
                host: host.clone(),
                model: model.clone(),
            },
            LlmBackend::LmStudio { base_url, model } => LlmProvider::LmStudio {
                base_url: base_url.clone(),
                model: model.clone(),
            },
            LlmBackend::Claude { api_key, model } => LlmProvider::Claude {
                base_url: ANTHROPIC_API_URL.to_string(),
                api_key: api_key.clone(),
                model: model.clone(),
            },
            LlmBackend::OpenAi {
                base_url,
                api_key,
                model,
            } => LlmProvider::OpenAi {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                model: model.clone(),
            },
            LlmBackend::Gemini { api_key, model } => LlmProvider::Gemini {
                base_url: GEMINI_API_URL.to_string(),
                api_key: api_key.clone(),
                model: model.clone(),
            },
        }
    }
}

impl LlmProvider {
    pub fn llm_type(&self) -> LlmType {
        match self {
            LlmProvider::Ollama { .. } => LlmType::Ollama,
            LlmProvider::LmStudio { .. } => LlmType::LmStudio,
            LlmProvider::Claude { .. } => LlmType::Claude,
            LlmProvider::OpenAi { .. } => LlmType::OpenAi,
            LlmProvider::Gemini { .. } => LlmType::Gemini,
        }
    }

    /// Name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Ollama { .. } => "Ollama",
            LlmProvider::LmStudio { .. } => "LM Studio",
            LlmProvider::Claude { .. } => "Claude",
            LlmProvider::OpenAi { .. } => "OpenAI",
            LlmProvider::Gemini { .. } => "Gemini",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmProvider::Ollama { model, .. }
            | LlmProvider::LmStudio { model, .. }
            | LlmProvider::Claude { model, .. }
            | LlmProvider::OpenAi { model, .. }
            | LlmProvider::Gemini { model, .. } => model,
        }
    }

    /// Endpoint for a chat request.
    pub fn endpoint(&self) -> String {
        match self {
            LlmProvider::Ollama { host, .. } => {
                format!("{}/api/chat", host.trim_end_matches('/'))
            }
            LlmProvider::LmStudio { base_url, .. } | LlmProvider::OpenAi { base_url, .. } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            LlmProvider::Claude { base_url, .. } => {
                format!("{}/v1/messages", base_url.trim_end_matches('/'))
            }
            LlmProvider::Gemini {
                base_url, model, ..
            } => format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        }
    }

    /// JSON body for `prompt`.
    pub fn request_body(&self, prompt: &Prompt) -> Value {
        match self {
            LlmProvider::Ollama { model, .. } => json!({
                "model": model,
                "messages": openai_messages(prompt),
                "stream": false,
            }),
            LlmProvider::LmStudio { model, .. } | LlmProvider::OpenAi { model, .. } => json!({
                "model": model,
                "messages": openai_messages(prompt),
                "temperature": 0,
            }),
            LlmProvider::Claude { model, .. } => json!({
                "model": model,
                "max_tokens": MAX_TOKENS,
                "system": prompt.system,
                "messages": prompt.messages,
            }),
            LlmProvider::Gemini { .. } => {
                let contents: Vec<Value> = prompt
                    .messages
                    .iter()
                    .map(|m| {
                        let role = if m.role == "assistant" { "model" } else { "user" };
                        json!({ "role": role, "parts": [{ "text": m.content }] })
                    })
                    .collect();
                json!({
                    "systemInstruction": { "parts": [{ "text": prompt.system }] },
                    "contents": contents,
                    "generationConfig": { "temperature": 0 },
                })
            }
        }
    }

    /// Pick the reply text out of a successful response body.
    pub fn parse_reply(&self, body: &Value) -> Option<String> {
        let text = match self {
            LlmProvider::Ollama { .. } => body
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str()),
            LlmProvider::LmStudio { .. } | LlmProvider::OpenAi { .. } => body
                .get("choices")
                .and_then(|c| c.as_array())
                .and_then(|arr| arr.first())
                .and_then(|choice| choice.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str()),
            LlmProvider::Claude { .. } => body
                .get("content")
                .and_then(|c| c.as_array())
                .and_then(|blocks| {
                    blocks
                        .iter()
                        .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                })
                .and_then(|b| b.get("text"))
                .and_then(|t| t.as_str()),
            LlmProvider::Gemini { .. } => body
                .get("candidates")
                .and_then(|c| c.as_array())
                .and_then(|arr| arr.first())
                .and_then(|cand| cand.get("content"))
                .and_then(|content| content.get("parts"))
                .and_then(|p| p.as_array())
                .and_then(|parts| parts.first())
                .and_then(|part| part.get("text"))
                .and_then(|t| t.as_str()),
        };
        text.map(|s| s.to_string())
    }

    /// Send `prompt` and return the raw reply text.
    pub async fn complete(
        &self,
        client: &reqwest::Client,
        prompt: &Prompt,
    ) -> Result<String, TranslationError> {
        let backend = self.name();
        let url = self.endpoint();
        let body = self.request_body(prompt);

        let request = client.post(&url).json(&body);
        let request = match self {
            LlmProvider::Ollama { .. } | LlmProvider::LmStudio { .. } => request,
            LlmProvider::OpenAi { api_key, .. } => request.bearer_auth(api_key),
            LlmProvider::Claude { api_key, .. } => request
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            LlmProvider::Gemini { api_key, .. } => request.header("x-goog-api-key", api_key),
        };

        tracing::debug!(backend, model = self.model(), url = %url, "Sending translation request");

        let resp = request
            .send()
            .await
            .map_err(|source| TranslationError::Request { backend, source })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| TranslationError::Request { backend, source })?;

        if !status.is_success() {
            return Err(TranslationError::Backend {
                backend,
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&bytes), ERROR_BODY_LIMIT),
            });
        }

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| TranslationError::MalformedResponse {
                backend,
                reason: e.to_string(),
            })?;

        self.parse_reply(&value)
            .ok_or_else(|| TranslationError::MalformedResponse {
                backend,
                reason: "no reply text in response".to_string(),
            })
    }
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("backend", &self.name())
            .field("endpoint", &self.endpoint())
            .field("model", &self.model())
            .finish()
    }
}

/// System message followed by the conversation, OpenAI/Ollama style.
fn openai_messages(prompt: &Prompt) -> Vec<Value> {
    let mut messages = Vec::with_capacity(prompt.messages.len() + 1);
    messages.push(json!({ "role": "system", "content": prompt.system }));
    messages.extend(
        prompt
            .messages
            .iter()
            .map(|ChatMessage { role, content }| json!({ "role": role, "content": content })),
    );
    messages
}

fn truncate(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            system: "sys".into(),
            messages: vec![
                ChatMessage::user("q1"),
                ChatMessage::assistant("a1"),
                ChatMessage::user("q2"),
            ],
        }
    }

    #[test]
    fn test_from_backend() {
        let provider = LlmProvider::from(&LlmBackend::Claude {
            api_key: "sk-ant".into(),
            model: "claude-3-5-sonnet-20241022".into(),
        });
        assert_eq!(provider.endpoint(), "https://api.anthropic.com/v1/messages");
        assert_eq!(provider.llm_type(), LlmType::Claude);

        let provider = LlmProvider::from(&LlmBackend::Ollama {
            host: "http://localhost:11434/".into(),
            model: "codellama".into(),
        });
        assert_eq!(provider.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_gemini_endpoint_has_no_key() {
        let provider = LlmProvider::from(&LlmBackend::Gemini {
            api_key: "secret-key".into(),
            model: "gemini-1.5-flash".into(),
        });
        let url = provider.endpoint();
        assert!(url.ends_with("/models/gemini-1.5-flash:generateContent"));
        assert!(!url.contains("secret-key"));
        assert!(!format!("{:?}", provider).contains("secret-key"));
    }

    #[test]
    fn test_openai_body() {
        let provider = LlmProvider::OpenAi {
            base_url: "https://api.openai.com/v1".into(),
            api_key: "k".into(),
            model: "gpt-4o-mini".into(),
        };
        let body = provider.request_body(&prompt());
        assert_eq!(body["model"], "gpt-4o-mini");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[3]["content"], "q2");
    }

    #[test]
    fn test_claude_body_keeps_system_separate() {
        let provider = LlmProvider::Claude {
            base_url: ANTHROPIC_API_URL.into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        let body = provider.request_body(&prompt());
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["max_tokens"], MAX_TOKENS);
    }

    #[test]
    fn test_gemini_body_roles() {
        let provider = LlmProvider::Gemini {
            base_url: GEMINI_API_URL.into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        let body = provider.request_body(&prompt());
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
    }

    #[test]
    fn test_parse_replies() {
        let ollama = LlmProvider::Ollama {
            host: "h".into(),
            model: "m".into(),
        };
        assert_eq!(
            ollama.parse_reply(&json!({"message": {"role": "assistant", "content": "SELECT 1"}})),
            Some("SELECT 1".to_string())
        );

        let openai = LlmProvider::LmStudio {
            base_url: "b".into(),
            model: "m".into(),
        };
        assert_eq!(
            openai.parse_reply(&json!({"choices": [{"message": {"content": "SELECT 2"}}]})),
            Some("SELECT 2".to_string())
        );

        let claude = LlmProvider::Claude {
            base_url: "b".into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        assert_eq!(
            claude.parse_reply(&json!({"content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "SELECT 3"}
            ]})),
            Some("SELECT 3".to_string())
        );

        let gemini = LlmProvider::Gemini {
            base_url: "b".into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        assert_eq!(
            gemini.parse_reply(&json!({"candidates": [{"content": {"parts": [{"text": "SELECT 4"}]}}]})),
            Some("SELECT 4".to_string())
        );
        assert_eq!(gemini.parse_reply(&json!({"candidates": []})), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééé", 3), "é...");
    }
}
