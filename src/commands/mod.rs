mod data;
mod loteria;
mod painel;
mod present;
mod refazer;

use crate::state::Context;

/// Robô JB - análise preditiva do Jogo do Bicho
#[poise::command(
    slash_command,
    subcommands(
        "loteria::loteria",
        "data::data",
        "painel::painel",
        "refazer::refazer"
    )
)]
pub async fn jb(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}
