use anyhow::{Context, Result};
use async_openai::{Client, config::OpenAIConfig};

use crate::question::QuestionError;

use super::secrets::{ApiKeySource, load_api_key};

/// Build an OpenAI client from the configured key, failing fast with
/// [`QuestionError::BackendUnavailable`] when no key is present. Called once
/// at the start of the interactive flow, before any question is requested.
pub fn ensure_client() -> Result<Client<OpenAIConfig>> {
    let lookup = load_api_key()?;
    let Some(key) = lookup.api_key else {
        return Err(QuestionError::BackendUnavailable.into());
    };
    Ok(initialize_client(&key))
}

/// Verify the configured key by listing models, reporting where the key came
/// from. Backs `quizzer llm --test`.
pub async fn test_configured_api_key() -> Result<ApiKeySource> {
    let lookup = load_api_key()?;
    let (Some(key), Some(source)) = (lookup.api_key, lookup.source) else {
        return Err(QuestionError::BackendUnavailable.into());
    };
    let client = initialize_client(&key);
    healthcheck_client(&client).await?;
    Ok(source)
}

fn initialize_client(api_key: &str) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new().with_api_key(api_key);
    Client::with_config(config)
}

async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with OpenAI")?;
    Ok(())
}
