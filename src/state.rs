use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::AppConfig;
use crate::prediction::GeminiClient;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<Analyzer<GeminiClient>>,
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
