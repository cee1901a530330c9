use serde::Deserialize;

use super::error::PredictionError;
use super::types::{Citation, PredictionRecord};

/// Shown when a grounding chunk has no title.
pub const PLACEHOLDER_TITLE: &str = "Fonte de Dados";
/// Shown when a grounding chunk has no URI.
pub const PLACEHOLDER_URI: &str = "#";

/// The slice of the `generateContent` response body the bot reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate: its non-thought text parts, concatenated.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Web references the model grounded its answer on, in the order given.
    pub fn citations(&self) -> Vec<Citation> {
        let Some(metadata) = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };

        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .map(|web| Citation {
                title: web
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
                uri: web
                    .uri
                    .clone()
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_URI.to_string()),
            })
            .collect()
    }

    /// Parse the answer text as a prediction and attach the citations.
    ///
    /// A missing answer is parsed as `{}`, which fails on the required fields.
    pub fn into_record(self) -> Result<PredictionRecord, PredictionError> {
        let text = self.text().unwrap_or_else(|| "{}".to_string());
        let mut record: PredictionRecord =
            serde_json::from_str(&text).map_err(PredictionError::Payload)?;
        record.sources = self.citations();
        Ok(record)
    }
}

/// Decode a raw response body.
pub fn parse_response(body: &str) -> Result<GenerateContentResponse, PredictionError> {
    serde_json::from_str(body).map_err(PredictionError::Envelope)
}
