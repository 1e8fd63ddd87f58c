use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use kismet_core::AiSettings;

use crate::GenerateError;

fn map_backend(provider: &str) -> Result<LLMBackend, GenerateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GenerateError::UnknownProvider(other.to_string())),
    }
}

/// One chat round trip. Returns the raw text of the reply.
pub async fn complete(settings: &AiSettings, system: &str, user_msg: &str) -> Result<String, GenerateError> {
    if !settings.is_configured() {
        return Err(GenerateError::NotConfigured);
    }
    let backend = map_backend(&settings.provider)?;

    let mut builder = LLMBuilder::new()
        .backend(backend)
        .model(&settings.model)
        .system(system);

    if !settings.api_key.is_empty() {
        builder = builder.api_key(&settings.api_key);
    }

    let llm = builder
        .build()
        .map_err(|e| GenerateError::Backend(format!("build LLM: {e}")))?;

    let messages = vec![ChatMessage::user().content(user_msg).build()];

    let response = llm
        .chat(&messages)
        .await
        .map_err(|e| GenerateError::Backend(format!("chat: {e}")))?;

    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerateError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map() {
        for p in ["openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek"] {
            assert!(map_backend(p).is_ok(), "{p}");
        }
        assert!(matches!(map_backend("gemini"), Err(GenerateError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn unconfigured_settings_fail_fast() {
        let err = complete(&AiSettings::default(), "s", "u").await.unwrap_err();
        assert!(matches!(err, GenerateError::NotConfigured));
    }
}
