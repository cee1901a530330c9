use chrono::NaiveDate;

/// The one message users ever see when a prediction fails.
pub const FAILURE_MESSAGE: &str =
    "O robô encontrou uma instabilidade nos dados. Verifique sua conexão e tente novamente.";

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider envelope: {0}")]
    Envelope(serde_json::Error),
    #[error("malformed prediction payload: {0}")]
    Payload(serde_json::Error),
    #[error("reference date {0} is in the future")]
    FutureDate(NaiveDate),
}

impl PredictionError {
    /// Every variant collapses to the same user-facing text.
    pub fn user_message(&self) -> &'static str {
        FAILURE_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_share_user_message() {
        let payload = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let errors = [
            PredictionError::Status {
                status: 500,
                body: "boom".into(),
            },
            PredictionError::Payload(payload),
            PredictionError::FutureDate(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()),
        ];
        for err in &errors {
            assert_eq!(err.user_message(), FAILURE_MESSAGE);
        }
    }
}
