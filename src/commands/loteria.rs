use crate::board::Board;
use crate::commands::present;
use crate::state::Context;
use tracing::info;

/// Escolhe a banca e analisa a data de referência atual
#[poise::command(slash_command)]
pub async fn loteria(
    ctx: Context<'_>,
    #[description = "Banca a analisar"] banca: Board,
) -> Result<(), anyhow::Error> {
    let today = ctx.data().config.today();
    let request = ctx
        .data()
        .analyzer
        .select_board(ctx.author().id.get(), banca, today)
        .await;

    info!(
        user = ctx.author().name,
        board = banca.label(),
        date = %request.date,
        mode = ?request.mode(),
        "Analysis requested"
    );

    present::run(ctx, request).await
}
