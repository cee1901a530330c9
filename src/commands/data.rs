use crate::commands::present;
use crate::state::Context;
use tracing::info;

/// Define a data de referência (hoje = tempo real, passado = backtest)
#[poise::command(slash_command)]
pub async fn data(
    ctx: Context<'_>,
    #[description = "AAAA-MM-DD, DD/MM/AAAA ou \"hoje\""] referencia: String,
) -> Result<(), anyhow::Error> {
    let today = ctx.data().config.today();
    let user = ctx.author().id.get();

    match ctx
        .data()
        .analyzer
        .change_date(user, &referencia, today)
        .await
    {
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(e.to_string())
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Ok(None) => {
            let view = ctx.data().analyzer.snapshot(user).await;
            let date = view.selection.reference_date(today);
            ctx.say(format!(
                "Data de referência: **{}**. Escolha uma banca com `/jb loteria`.",
                date.format("%d/%m/%Y")
            ))
            .await?;
            Ok(())
        }
        Ok(Some(request)) => {
            info!(
                user = ctx.author().name,
                board = request.board.label(),
                date = %request.date,
                mode = ?request.mode(),
                "Date changed, re-running analysis"
            );
            present::run(ctx, request).await
        }
    }
}
