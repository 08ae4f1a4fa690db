use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ClientError;

const SERVICE: &str = "summarization backend";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Chat-completions client for an OpenRouter-compatible endpoint.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenRouterClient {
    #[must_use]
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Sends one completion request and returns the first choice's content.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ClientError> {
        if self.api_key.is_empty() {
            return Err(ClientError::Unavailable {
                service: SERVICE,
                status: None,
                message: "API key not configured".to_string(),
            });
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
        };

        debug!("Requesting completion from model {}", self.model);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::bad_status(SERVICE, status, body));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ClientError::Unavailable {
                service: SERVICE,
                status: None,
                message: "No completion in response".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_response_parsing() {
        let json = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "condensed"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;

        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        let first = parsed.choices.into_iter().next().unwrap();
        assert_eq!(first.message.content, "condensed");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let client = OpenRouterClient::new(
            Client::new(),
            "https://openrouter.ai/api/v1",
            "",
            "some/model",
            Duration::from_secs(5),
        );

        let err = client.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable { .. }));
    }
}
