use crate::commands::present;
use crate::state::Context;
use tracing::info;

/// Repete a última análise (mesma banca e data)
#[poise::command(slash_command)]
pub async fn refazer(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let Some(request) = ctx.data().analyzer.retry(ctx.author().id.get()).await
    else {
        ctx.send(
            poise::CreateReply::default()
                .content("Nenhuma banca selecionada ainda. Use `/jb loteria` primeiro.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    info!(
        user = ctx.author().name,
        board = request.board.label(),
        generation = request.generation,
        "Manual retry"
    );
    present::run(ctx, request).await
}
