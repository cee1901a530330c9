//! Dashboard rendering.
//!
//! Everything here is pure: it turns a selection and an outcome into [`Panel`]s,
//! which the command layer converts into Discord embeds.

use chrono::NaiveDate;

use crate::board::Board;
use crate::config::PartnerLink;
use crate::prediction::{Citation, PredictionRecord};
use crate::selection::Mode;

pub const GREEN: u32 = 0x22c55e;
pub const YELLOW: u32 = 0xeab308;
pub const RED: u32 = 0xef4444;
pub const SLATE: u32 = 0x64748b;

/// Discord caps embed field values at 1024 characters.
const FIELD_LIMIT: usize = 1024;
/// Discord caps embed descriptions at 4096 characters.
const DESCRIPTION_LIMIT: usize = 4096;
/// Discord caps the title, description, field and footer text of one embed at 6000 characters combined.
const EMBED_LIMIT: usize = 6000;
/// Copy buttons carry the number itself; Discord caps labels at 80 characters.
const COPY_LABEL_LIMIT: usize = 20;
/// Discord allows five buttons per action row.
const MAX_COPY_BUTTONS: usize = 5;
/// Stands in for an empty field; Discord rejects empty field values.
const EMPTY: &str = "—";
/// Citation titles longer than this are cut and suffixed with "...".
pub const CITATION_TITLE_LIMIT: usize = 30;

pub const DISCLAIMER: &str = "Aviso: Este robô é uma ferramenta de auxílio estatístico. \
Não garantimos ganhos financeiros. Jogue com moderação.";

const POWERED_BY: &str = "ROBÔ JB DINHO · Powered by Gemini Analysis Engine";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub description: String,
    pub fields: Vec<PanelField>,
    pub color: u32,
    pub footer: Option<String>,
}

impl Panel {
    fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        let description: String = description.into();
        Self {
            title: title.into(),
            description: clamp(&description, DESCRIPTION_LIMIT),
            fields: Vec::new(),
            color,
            footer: None,
        }
    }

    fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value: String = value.into();
        let value = if value.trim().is_empty() {
            EMPTY.to_string()
        } else {
            clamp(&value, FIELD_LIMIT)
        };
        self.fields.push(PanelField {
            name: name.into(),
            value,
            inline,
        });
        self
    }

    fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    /// Characters Discord counts against [`EMBED_LIMIT`].
    pub fn char_count(&self) -> usize {
        self.title.chars().count()
            + self.description.chars().count()
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
            + self.footer.as_deref().map_or(0, |f| f.chars().count())
    }

    /// Cut the longest text blocks until the whole panel fits in one embed.
    pub fn fit(mut self) -> Self {
        while self.char_count() > EMBED_LIMIT {
            let excess = self.char_count() - EMBED_LIMIT;
            let longest = std::iter::once(&mut self.description)
                .chain(self.fields.iter_mut().map(|f| &mut f.value))
                .max_by_key(|text| text.chars().count());
            let Some(text) = longest else { break };
            let len = text.chars().count();
            if len <= 4 {
                break;
            }
            *text = clamp(text, len.saturating_sub(excess).max(4));
        }
        self
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
pub fn clamp(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn mode_badge(mode: Mode) -> &'static str {
    match mode {
        Mode::RealTime => "🟢 Análise em Tempo Real",
        Mode::Backtest => "🟡 Modo Backtest",
    }
}

/// One-line description of what the analyzer will do for `date`.
pub fn status_line(mode: Mode, date: NaiveDate) -> String {
    match mode {
        Mode::RealTime => "Buscando os resultados mais recentes de hoje nos sites Resultado Fácil e Deu no Poste.".to_string(),
        Mode::Backtest => format!(
            "Simulando análise estatística para o dia {}.",
            display_date(date)
        ),
    }
}

/// Idle view: nothing selected yet.
pub fn intro(date: NaiveDate, mode: Mode, partners: &[PartnerLink]) -> Panel {
    let mut panel = Panel::new(
        "ESTRATÉGIA CIENTÍFICA PARA O JOGO DO BICHO",
        "O Robô do Dinho analisa milhares de resultados para encontrar os padrões mais quentes do dia.\n\
         Escolha uma banca com `/jb loteria` e, se quiser, uma data passada com `/jb data`.",
        GREEN,
    )
    .field(
        "Data de Referência",
        format!("{} · {}", display_date(date), mode_badge(mode)),
        false,
    )
    .field("Status do Analisador", status_line(mode, date), false)
    .field(
        "📅 HISTÓRICO FLEXÍVEL",
        "Selecione datas passadas para validar a assertividade do robô e entender os ciclos de atraso.",
        true,
    )
    .field(
        "🔍 BUSCA SEMÂNTICA",
        "O robô lê os resultados do 'Resultado Fácil' e 'Deu no Poste' como um humano, mas com velocidade de processador.",
        true,
    )
    .field(
        "⚡ PONTOS DE ATRASO",
        "Milhares e centenas que não aparecem há tempos entram no radar prioritário da análise estatística.",
        true,
    );

    if !partners.is_empty() {
        panel = panel.field("Parceiros", partner_list(partners), false);
    }
    panel.footer(DISCLAIMER)
}

pub fn loading(board: Board, date: NaiveDate, mode: Mode) -> Panel {
    let headline = match mode {
        Mode::RealTime => "Processando Tempo Real...",
        Mode::Backtest => "Reconstruindo Histórico...",
    };
    Panel::new(
        headline.to_uppercase(),
        format!(
            "⏳ Consultando base de dados: {} {} | {}",
            board.icon(),
            board.label(),
            date.format("%Y-%m-%d")
        ),
        GREEN,
    )
    .footer(mode_badge(mode))
}

/// Error card. The retry control is attached by the caller.
pub fn failure(message: &str) -> Panel {
    Panel::new(
        "⚠️ CONEXÃO INTERROMPIDA",
        format!(
            "{}.\nPode haver falta de dados para a data ou loteria escolhida.",
            message.trim_end_matches('.')
        ),
        RED,
    )
    .footer("Use o botão abaixo ou /jb refazer para tentar novamente.")
}

/// Error card for `/jb painel`, which carries no buttons.
pub fn failure_summary(message: &str) -> Panel {
    failure(message).footer("Use /jb refazer para tentar novamente.")
}

/// Shown in place of a result that arrived after a newer request was made.
pub fn superseded() -> Panel {
    Panel::new(
        "Análise substituída",
        "Uma consulta mais recente foi iniciada; este resultado foi descartado. Use `/jb painel` para ver o estado atual.",
        SLATE,
    )
}

pub fn results(board: Board, date: NaiveDate, mode: Mode, record: &PredictionRecord) -> Panel {
    let mut description = String::new();
    if mode == Mode::Backtest {
        description.push_str(&format!(
            "⚠️ **MODO TESTE DE EFICÁCIA:** sugestões geradas com base apenas nos dados anteriores a {}.\n\n",
            display_date(date)
        ));
    }
    description.push_str("**Parecer do Analista IA**\n");
    description.push_str(&record.reasoning);

    Panel::new(
        format!(
            "{} Alvos para o Próximo Horário: {}",
            board.icon(),
            board.label()
        ),
        description,
        if mode == Mode::Backtest { YELLOW } else { GREEN },
    )
    .field("🎯 Milhares Sugeridas", thousands_lines(record), false)
    .field("Centenas com Maior Ciclo", badge_row(&record.hundreds), true)
    .field("Dezenas Estratégicas", badge_row(&record.tens), true)
    .field("🐾 Bichos Sugeridos (Cercado)", badge_row(&record.groups), false)
    .field("Monitor de Atrasos", delay_table(record), false)
    .field(
        "Evidências de Grounding (Resultado Fácil / Deu no Poste)",
        citation_links(&record.sources),
        false,
    )
    .footer(format!("{} · {}", mode_badge(mode), POWERED_BY))
}

fn thousands_lines(record: &PredictionRecord) -> String {
    if record.thousands.is_empty() {
        return EMPTY.to_string();
    }
    record
        .thousands
        .iter()
        .enumerate()
        .map(|(i, number)| format!("`{}` · Prioridade {}", number, i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn badge_row(items: &[String]) -> String {
    if items.is_empty() {
        return EMPTY.to_string();
    }
    items
        .iter()
        .map(|item| format!("`{}`", item))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per delayed entry: number/group and how many draws it has been out.
pub fn delay_table(record: &PredictionRecord) -> String {
    if record.delayed_numbers.is_empty() {
        return "Nenhum atraso informado.".to_string();
    }
    record
        .delayed_numbers
        .iter()
        .map(|d| format!("`{}` — {} sorteios atrasados", d.number, d.days))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn citation_links(sources: &[Citation]) -> String {
    if sources.is_empty() {
        return "Nenhuma fonte informada.".to_string();
    }
    // Whole links only: a link cut in half renders as garbage.
    let mut out = String::new();
    for source in sources {
        let line = format!("• [{}]({})\n", short_title(&source.title), source.uri);
        if out.len() + line.len() > FIELD_LIMIT {
            break;
        }
        out.push_str(&line);
    }
    out.trim_end().to_string()
}

fn short_title(title: &str) -> String {
    if title.chars().count() <= CITATION_TITLE_LIMIT {
        return title.to_string();
    }
    let kept: String = title.chars().take(CITATION_TITLE_LIMIT).collect();
    format!("{}...", kept)
}

fn partner_list(partners: &[PartnerLink]) -> String {
    partners
        .iter()
        .map(|p| format!("[{}]({})", p.name, p.url))
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Text put on the "clipboard" by "Copiar Todas": the thousands in display order.
pub fn copy_all(record: &PredictionRecord) -> String {
    record.thousands.join(", ")
}

/// Labels for the per-number copy buttons, in display order, one row's worth.
pub fn copy_targets(record: &PredictionRecord) -> Vec<String> {
    record
        .thousands
        .iter()
        .filter(|n| !n.trim().is_empty())
        .take(MAX_COPY_BUTTONS)
        .map(|n| clamp(n, COPY_LABEL_LIMIT))
        .collect()
}

/// Ephemeral reply standing in for a clipboard write.
pub fn copied(text: &str) -> String {
    let text = if text.is_empty() { EMPTY } else { text };
    format!("Copiado! ✅\n```\n{}\n```", text)
}
