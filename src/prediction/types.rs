use serde::Deserialize;

/// The model's answer for one (board, date) pair, plus the sources it cited.
///
/// Field names on the wire follow the JSON shape requested in the prompt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionRecord {
    /// Four-digit numbers, highest priority first.
    pub thousands: Vec<String>,
    pub hundreds: Vec<String>,
    pub tens: Vec<String>,
    /// Animal group names.
    pub groups: Vec<String>,
    pub reasoning: String,
    #[serde(rename = "delayedNumbers")]
    pub delayed_numbers: Vec<DelayedNumber>,
    /// Filled from grounding metadata, never from the JSON body.
    #[serde(skip_deserializing, default)]
    pub sources: Vec<Citation>,
}

/// A number or group that has not come out for a while.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DelayedNumber {
    pub number: String,
    /// Draws elapsed since it last came out.
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}
