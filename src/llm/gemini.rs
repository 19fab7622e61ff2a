//! Google Gemini `generateContent` client

use super::LanguageModel;
use crate::config::LlmSettings;
use crate::engines::EngineRequest;
use crate::network::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini REST client
pub struct Gemini {
    client: HttpClient,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl Gemini {
    /// Create a client; `None` when the settings carry no API key
    pub fn from_settings(settings: &LlmSettings, client: HttpClient) -> Option<Self> {
        let api_key = settings.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs_f64(settings.timeout.clamp(1.0, 120.0)),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }

    fn parse_answer(text: &str) -> Result<String> {
        let body: GenerateResponse =
            serde_json::from_str(text).context("Failed to parse Gemini response")?;

        let answer: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if answer.trim().is_empty() {
            match body.prompt_feedback {
                Some(feedback) => anyhow::bail!("Gemini returned no text: {}", feedback),
                None => anyhow::bail!("Gemini returned no text"),
            }
        }
        Ok(answer)
    }
}

#[async_trait]
impl LanguageModel for Gemini {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let request = EngineRequest::post_json(self.endpoint(), serde_json::to_value(&body)?)
            .header("x-goog-api-key", self.api_key.clone());

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await
            .context("Failed to call Gemini API")?;
        response.error_for_status()?;

        Self::parse_answer(&response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> LlmSettings {
        LlmSettings {
            api_key: Some("g-key".to_string()),
            base_url: base_url.to_string(),
            timeout: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_key_no_client() {
        let client = HttpClient::new().unwrap();
        assert!(Gemini::from_settings(&LlmSettings::default(), client.clone()).is_none());
        let blank = LlmSettings {
            api_key: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(Gemini::from_settings(&blank, client).is_none());
    }

    #[test]
    fn test_endpoint() {
        let gemini = Gemini::from_settings(&settings("https://x.test/v1beta/"), HttpClient::new().unwrap())
            .unwrap();
        assert_eq!(
            gemini.endpoint(),
            "https://x.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_parse_answer_joins_parts() {
        let text = r#"{"candidates": [{"content": {"parts": [{"text": "casa rural "}, {"text": "sierra"}], "role": "model"}}]}"#;
        assert_eq!(Gemini::parse_answer(text).unwrap(), "casa rural sierra");
    }

    #[test]
    fn test_parse_blocked_answer() {
        let text = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = Gemini::parse_answer(text).unwrap_err().to_string();
        assert!(err.contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "cortijo sierra de cazorla"}]}}]
            })))
            .mount(&server)
            .await;

        let gemini = Gemini::from_settings(&settings(&server.uri()), HttpClient::new().unwrap())
            .unwrap();
        let answer = gemini.generate("hola").await.unwrap();
        assert_eq!(answer, "cortijo sierra de cazorla");
    }

    #[tokio::test]
    async fn test_generate_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .mount(&server)
            .await;

        let gemini = Gemini::from_settings(&settings(&server.uri()), HttpClient::new().unwrap())
            .unwrap();
        assert!(gemini.generate("hola").await.is_err());
    }
}
