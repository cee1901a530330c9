use crate::analysis::Outcome;
use crate::commands::present::{embed, partner_buttons};
use crate::render;
use crate::state::Context;

/// Mostra o painel atual (introdução, análise em andamento, erro ou resultado)
#[poise::command(slash_command)]
pub async fn painel(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let data = ctx.data();
    let today = data.config.today();
    let view = data.analyzer.snapshot(ctx.author().id.get()).await;

    // Results are shown for the pair they were fetched for, not the live selection.
    let panel = match (&view.request, &view.outcome) {
        (Some(request), Some(Outcome::Success(record))) => {
            render::results(request.board, request.date, request.mode(), record)
        }
        (Some(request), Some(Outcome::Loading)) => {
            render::loading(request.board, request.date, request.mode())
        }
        (_, Some(Outcome::Failure(message))) => render::failure_summary(message),
        _ => render::intro(
            view.selection.reference_date(today),
            view.selection.mode(today),
            &data.config.partner_links,
        ),
    };

    let mut reply = poise::CreateReply::default().embed(embed(&panel));
    if let Some(row) = partner_buttons(&data.config.partner_links) {
        reply = reply.components(vec![row]);
    }
    ctx.send(reply).await?;
    Ok(())
}
