use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, Utc};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Brasília time.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Everything the bot reads from the environment, resolved once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub gemini: GeminiConfig,
    pub utc_offset: FixedOffset,
    pub partner_links: Vec<PartnerLink>,
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Promotional outbound link shown next to results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerLink {
    pub name: String,
    pub url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let discord_token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
        let guild_id = dotenv::var("DISCORD_GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let api_key = dotenv::var("GEMINI_API_KEY")
            .or_else(|_| dotenv::var("API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
            .context("GEMINI_API_KEY (or API_KEY) required")?;
        let model = dotenv::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            dotenv::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let offset_hours = match dotenv::var("JB_UTC_OFFSET_HOURS") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("Invalid JB_UTC_OFFSET_HOURS: {}", raw))?,
            Err(_) => DEFAULT_UTC_OFFSET_HOURS,
        };
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .with_context(|| format!("JB_UTC_OFFSET_HOURS out of range: {}", offset_hours))?;

        let partner_links = parse_partner_links(&dotenv::var("JB_PARTNER_LINKS").unwrap_or_default());

        Ok(Self {
            discord_token,
            guild_id,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
            },
            utc_offset,
            partner_links,
        })
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }
}

/// Parse `Name|url,Name|url`. Malformed entries are skipped.
pub fn parse_partner_links(raw: &str) -> Vec<PartnerLink> {
    raw.split(',')
        .filter_map(|entry| {
            let (name, url) = entry.split_once('|')?;
            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || !(url.starts_with("https://") || url.starts_with("http://")) {
                return None;
            }
            Some(PartnerLink {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}
