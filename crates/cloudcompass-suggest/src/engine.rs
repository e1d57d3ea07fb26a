use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use cloudcompass_core::AiSettings;

use crate::SuggestError;

/// A hosted text model: system prompt + user message in, text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, SuggestError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, SuggestError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(SuggestError::UnknownProvider(other.to_string())),
    }
}

/// [`Generator`] backed by the provider named in the user's AI settings.
pub struct LlmEngine {
    settings: AiSettings,
}

impl LlmEngine {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Generator for LlmEngine {
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, SuggestError> {
        let backend = map_backend(&self.settings.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .system(system);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }

        let llm = builder
            .build()
            .map_err(|e| SuggestError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(user_msg).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| SuggestError::Chat(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(SuggestError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map_to_backends() {
        for p in ["openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek"] {
            assert!(map_backend(p).is_ok(), "{p}");
        }
    }

    #[tokio::test]
    async fn unknown_provider_fails_before_any_request() {
        let engine = LlmEngine::new(AiSettings {
            provider: "bedrock".into(),
            api_key: "k".into(),
            model: "m".into(),
        });
        let err = engine.generate("sys", "hi").await.unwrap_err();
        assert!(matches!(err, SuggestError::UnknownProvider(p) if p == "bedrock"));
    }
}
