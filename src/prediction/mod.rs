pub mod client;
pub mod error;
pub mod prompt;
pub mod response;
pub mod types;

use std::future::Future;

use chrono::NaiveDate;

use crate::board::Board;

pub use client::GeminiClient;
pub use error::PredictionError;
pub use types::{Citation, PredictionRecord};

/// Anything that can turn a (board, reference date) pair into a prediction.
pub trait PredictionSource: Send + Sync {
    fn predict(
        &self,
        board: Board,
        date: NaiveDate,
        today: NaiveDate,
    ) -> impl Future<Output = Result<PredictionRecord, PredictionError>> + Send;
}
