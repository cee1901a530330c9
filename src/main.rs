mod analysis;
mod board;
mod commands;
mod config;
mod prediction;
mod render;
mod selection;
mod state;

use std::sync::Arc;
use std::time::Instant;

use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tracing::{error, info, Level};

use analysis::{Analyzer, SESSION_IDLE_TIMEOUT, SESSION_SWEEP_INTERVAL};
use config::AppConfig;
use prediction::GeminiClient;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Load env
    let _ = dotenv::dotenv();
    let config = Arc::new(AppConfig::from_env()?);
    let guild_id = config.guild_id.map(serenity::GuildId::new);

    // Init prediction client; the credential is handed over here and nowhere else
    let gemini = Arc::new(GeminiClient::new(&config.gemini)?);
    info!(model = %config.gemini.model, "Gemini client initialized");

    if !config.partner_links.is_empty() {
        info!(count = config.partner_links.len(), "Partner links configured");
    }

    let app_state = AppState {
        config: config.clone(),
        analyzer: Arc::new(Analyzer::new(gemini)),
    };

    // Sweep idle sessions
    let sweeper = app_state.analyzer.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            sweeper.evict_idle(Instant::now(), SESSION_IDLE_TIMEOUT).await;
        }
    });

    let intents = serenity::GatewayIntents::GUILDS;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::jb()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                info!("Registering {} top-level command(s):", commands.len());
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        gid,
                    )
                    .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    )
                    .await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting Robô JB...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
