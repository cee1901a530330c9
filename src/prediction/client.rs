use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::error::PredictionError;
use super::prompt::build_prompt;
use super::response::{parse_response, GenerateContentResponse};
use super::types::PredictionRecord;
use super::PredictionSource;
use crate::board::Board;
use crate::config::GeminiConfig;
use crate::selection::Mode;

/// Client for the Gemini `generateContent` endpoint with Google Search grounding.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        // No local timeout: the call either completes or fails on the transport's terms.
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve the `generateContent` URL for the configured model.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", base, model)
    }

    /// One request, no retry.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, PredictionError> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(body_len = text.len(), "Gemini response received");
        parse_response(&text)
    }
}

/// Request body: the prompt, the search tool, and a JSON-only response.
pub fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt }]
            }
        ],
        "tools": [{ "google_search": {} }],
        "generationConfig": {
            "responseMimeType": "application/json"
        }
    })
}

impl PredictionSource for GeminiClient {
    async fn predict(
        &self,
        board: Board,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<PredictionRecord, PredictionError> {
        if date > today {
            return Err(PredictionError::FutureDate(date));
        }
        let mode = Mode::for_date(date, today);
        let prompt = build_prompt(board, date, mode);

        let record = self.generate(&prompt).await?.into_record()?;
        info!(
            board = board.label(),
            %date,
            ?mode,
            thousands = record.thousands.len(),
            sources = record.sources.len(),
            "Prediction parsed"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, model: &str) -> GeminiClient {
        GeminiClient::new(&GeminiConfig {
            api_key: "test-key".into(),
            model: model.into(),
            base_url: base_url.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_resolution() {
        let c = client(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-3-flash-preview",
        );
        assert_eq!(
            c.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );

        let c = client("http://localhost:8080/v1beta", "models/gemini-pro");
        assert_eq!(
            c.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_enables_search_and_json() {
        let body = request_body("analise Bahia");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "analise Bahia");
        assert!(body["tools"][0].get("google_search").is_some());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_future_date_rejected_before_any_request() {
        // Unroutable base URL: reaching the network would surface a transport error instead.
        let c = client("http://127.0.0.1:9", "gemini-3-flash-preview");
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let err = c.predict(Board::Bahia, tomorrow, today).await.unwrap_err();
        assert!(matches!(err, PredictionError::FutureDate(d) if d == tomorrow));
    }

    #[tokio::test]
    async fn test_transport_failure_is_classified() {
        let c = client("http://127.0.0.1:9", "gemini-3-flash-preview");
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let err = c.predict(Board::Bahia, today, today).await.unwrap_err();
        assert!(matches!(err, PredictionError::Transport(_)));
    }
}
