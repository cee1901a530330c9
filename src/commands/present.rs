use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::analysis::{AnalysisRequest, Settled};
use crate::config::PartnerLink;
use crate::render::{self, Panel};
use crate::state::Context;

/// How long the buttons under a dashboard stay live.
const BUTTON_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Discord allows five buttons per row; link buttons share one row.
const MAX_PARTNER_BUTTONS: usize = 5;

pub fn embed(panel: &Panel) -> serenity::CreateEmbed {
    let panel = panel.clone().fit();
    let mut embed = serenity::CreateEmbed::new()
        .title(&panel.title)
        .description(&panel.description)
        .colour(panel.color);
    for field in &panel.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &panel.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }
    embed
}

/// Outbound promotional links as a row of link buttons.
pub fn partner_buttons(links: &[PartnerLink]) -> Option<serenity::CreateActionRow> {
    if links.is_empty() {
        return None;
    }
    let buttons = links
        .iter()
        .take(MAX_PARTNER_BUTTONS)
        .map(|link| serenity::CreateButton::new_link(&link.url).label(&link.name))
        .collect();
    Some(serenity::CreateActionRow::Buttons(buttons))
}

fn loading_panel(request: &AnalysisRequest) -> Panel {
    render::loading(request.board, request.date, request.mode())
}

fn ephemeral(text: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    )
}

/// Show the loading card, run the analysis, and replace the card with the result.
///
/// The result card keeps listening for its buttons. On success: "Copiar Todas" and
/// one copy button per thousand. On failure: "Reconectar IA", which re-runs the
/// same (board, date) pair in place.
pub async fn run(ctx: Context<'_>, mut request: AnalysisRequest) -> Result<(), anyhow::Error> {
    let data = ctx.data();
    let ctx_id = ctx.id();
    let copy_id = format!("{}copy", ctx_id);
    let retry_id = format!("{}retry", ctx_id);
    let milhar_prefix = format!("{}milhar", ctx_id);
    let partner_row = partner_buttons(&data.config.partner_links);

    let handle = ctx
        .send(poise::CreateReply::default().embed(embed(&loading_panel(&request))))
        .await?;

    loop {
        let settled = data.analyzer.execute(&request).await;

        let mut rows = Vec::new();
        let mut copy_text = None;
        let mut targets = Vec::new();
        let panel = match settled {
            Settled::Success(record) => {
                rows.push(serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&copy_id)
                        .label("📋 Copiar Todas")
                        .style(serenity::ButtonStyle::Success),
                ]));
                targets = render::copy_targets(&record);
                if !targets.is_empty() {
                    rows.push(serenity::CreateActionRow::Buttons(
                        targets
                            .iter()
                            .enumerate()
                            .map(|(i, number)| {
                                serenity::CreateButton::new(format!("{}{}", milhar_prefix, i))
                                    .label(format!("📋 {}", number))
                                    .style(serenity::ButtonStyle::Secondary)
                            })
                            .collect(),
                    ));
                }
                rows.extend(partner_row.clone());
                copy_text = Some(render::copy_all(&record));
                render::results(request.board, request.date, request.mode(), &record)
            }
            Settled::Failure(message) => {
                rows.push(serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&retry_id)
                        .label("RECONECTAR IA")
                        .style(serenity::ButtonStyle::Danger),
                ]));
                render::failure(&message)
            }
            Settled::Superseded => render::superseded(),
        };

        handle
            .edit(
                ctx,
                poise::CreateReply::default()
                    .embed(embed(&panel))
                    .components(rows.clone()),
            )
            .await?;

        // Superseded cards have nothing to wait for.
        if rows.is_empty() {
            return Ok(());
        }

        let next = loop {
            let prefix = ctx_id.to_string();
            let Some(press) = serenity::ComponentInteractionCollector::new(ctx)
                .filter(move |press| press.data.custom_id.starts_with(&prefix))
                .timeout(BUTTON_TIMEOUT)
                .await
            else {
                break None;
            };

            if press.data.custom_id == copy_id {
                let text = copy_text.clone().unwrap_or_default();
                debug!(user = press.user.name, "Copied thousands");
                press
                    .create_response(
                        ctx.serenity_context(),
                        ephemeral(render::copied(&text)),
                    )
                    .await?;
                continue;
            }

            let picked = press
                .data
                .custom_id
                .strip_prefix(&milhar_prefix)
                .and_then(|i| i.parse::<usize>().ok())
                .and_then(|i| targets.get(i));
            if let Some(number) = picked {
                debug!(user = press.user.name, number = %number, "Copied thousand");
                press
                    .create_response(ctx.serenity_context(), ephemeral(render::copied(number)))
                    .await?;
                continue;
            }

            if press.data.custom_id != retry_id {
                continue;
            }
            if press.user.id != ctx.author().id {
                press
                    .create_response(
                        ctx.serenity_context(),
                        ephemeral("Só quem abriu este painel pode refazer a análise."),
                    )
                    .await?;
                continue;
            }

            let Some(next) = data.analyzer.retry(press.user.id.get()).await else {
                press
                    .create_response(
                        ctx.serenity_context(),
                        ephemeral("Nenhuma banca selecionada. Use `/jb loteria`."),
                    )
                    .await?;
                continue;
            };

            info!(
                user = press.user.name,
                board = next.board.label(),
                generation = next.generation,
                "Retry from dashboard"
            );
            press
                .create_response(
                    ctx.serenity_context(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(embed(&loading_panel(&next)))
                            .components(vec![]),
                    ),
                )
                .await?;
            break Some(next);
        };

        match next {
            Some(next) => request = next,
            None => {
                debug!(ctx_id, "Dashboard buttons expired");
                // Keep the card, drop the action buttons.
                handle
                    .edit(
                        ctx,
                        poise::CreateReply::default()
                            .embed(embed(&panel))
                            .components(partner_row.clone().into_iter().collect()),
                    )
                    .await?;
                return Ok(());
            }
        }
    }
}
