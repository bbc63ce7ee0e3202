//! HTTP scoring backends.
//!
//! - `HttpScoringBackend`: POST `{title, body}`, reply body is the bare number
//! - `ChatCompletionBackend`: asks a chat-completions endpoint for the number

use super::traits::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

const SYSTEM_PROMPT: &str = "You assess the credibility of news articles. \
Reply with a single number between 0 and 1 and nothing else.";

/// Plain scoring service.
pub struct HttpScoringBackend {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    title: &'a str,
    body: &'a str,
}

impl HttpScoringBackend {
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

fn authorized(request: reqwest::RequestBuilder, api_key: &Option<String>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

#[async_trait]
impl ScoringBackend for HttpScoringBackend {
    async fn raw_score(&self, title: &str, body: &str) -> Result<String, ScoringError> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&ScoreRequest { title, body });
        let response = authorized(request, &self.api_key)
            .send()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoringError::Transport(format!(
                "scorer returned {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))
    }
}

/// Chat-completions scoring.
pub struct ChatCompletionBackend {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatCompletionBackend {
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    fn prompt(title: &str, body: &str) -> String {
        format!(
            "Assess the credibility of this news article.\n\
             Title: \"{}\"\n\
             Content: \"{}\"\n\n\
             Rate it from 0 (completely false) to 1 (completely credible). \
             Respond with the number only.",
            title, body
        )
    }
}

#[async_trait]
impl ScoringBackend for ChatCompletionBackend {
    async fn raw_score(&self, title: &str, body: &str) -> Result<String, ScoringError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::prompt(title, body),
                },
            ],
            temperature: 0.1,
        };

        let builder = self.client.post(self.endpoint.clone()).json(&request);
        let response = authorized(builder, &self.api_key)
            .send()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoringError::Transport(format!(
                "chat endpoint returned {}",
                response.status()
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoringError::Malformed(e.to_string()))?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ScoringError::Malformed("no choices in reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_plain_backend_posts_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/score"))
            .and(body_json(serde_json::json!({"title": "A", "body": "B"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.9"))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/score", server.uri())).unwrap();
        let backend = HttpScoringBackend::new(reqwest::Client::new(), endpoint, None);
        assert_eq!(backend.raw_score("A", "B").await.unwrap(), "0.9");
    }

    #[tokio::test]
    async fn test_plain_backend_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/score", server.uri())).unwrap();
        let backend = HttpScoringBackend::new(reqwest::Client::new(), endpoint, None);
        assert!(matches!(
            backend.raw_score("A", "B").await,
            Err(ScoringError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_backend_extracts_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": " 0.35\n"}}]
            })))
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/v1/chat/completions", server.uri())).unwrap();
        let backend = ChatCompletionBackend::new(
            reqwest::Client::new(),
            endpoint,
            Some("secret".to_string()),
            "gpt-4o-mini".to_string(),
        );
        let raw = backend.raw_score("A", "B").await.unwrap();
        assert_eq!(parse_score(&raw).unwrap().value(), 0.35);
    }

    #[tokio::test]
    async fn test_chat_backend_without_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/v1/chat/completions", server.uri())).unwrap();
        let backend =
            ChatCompletionBackend::new(reqwest::Client::new(), endpoint, None, "m".to_string());
        assert!(matches!(
            backend.raw_score("A", "B").await,
            Err(ScoringError::Malformed(_))
        ));
    }
}
