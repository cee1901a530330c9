use chrono::NaiveDate;

use crate::board::Board;
use crate::selection::Mode;

/// Result sites the model is told to search, as (name, domain).
pub const RESULT_SITES: [(&str, &str); 2] = [
    ("Resultado Fácil", "resultadofacil.com.br"),
    ("Deu no Poste", "deunoposte.com.br"),
];

/// Draws without a hit before a number counts as "delayed".
pub const DELAY_THRESHOLD_DRAWS: u32 = 30;

/// Window, in days, for the recurring-tens analysis.
pub const TREND_WINDOW_DAYS: u32 = 3;

/// Build the instruction sent to the model for one (board, date) pair.
pub fn build_prompt(board: Board, date: NaiveDate, mode: Mode) -> String {
    let date = date.format("%Y-%m-%d");
    let sites = RESULT_SITES
        .iter()
        .map(|(name, domain)| format!("\"{}\" ({})", name, domain))
        .collect::<Vec<_>>()
        .join(" e ");

    let mode_instruction = match mode {
        Mode::RealTime => "MODO REAL-TIME: Analise os resultados de hoje até o momento para prever o próximo sorteio.".to_string(),
        Mode::Backtest => format!(
            "MODO BACKTEST: Analise APENAS os dados que existiam ANTES de {date} para sugerir o que seria jogado NAQUELA DATA específica."
        ),
    };

    format!(
        r#"Atue como um Engenheiro Estatístico Sênior especializado em loterias brasileiras (Jogo do Bicho).
Seu objetivo é prever as Milhares (4 dígitos) MAIS PROVÁVEIS de saírem no PRÓXIMO HORÁRIO da loteria "{board}" para o dia {date}.

DIRETRIZES TÉCNICAS:
1. FONTE DE DADOS: Use a busca do Google para extrair o histórico COMPLETO de resultados recentes nos sites {sites}.
2. ANÁLISE DE ATRASO: Identifique milhares, centenas, dezenas e grupos que não aparecem há mais de {delay} sorteios. Estes são candidatos "quentes".
3. ANÁLISE DE FREQUÊNCIA: Identifique o "comportamento da banca" - quais dezenas estão saindo repetidamente nos últimos {trend} dias.
4. PREVISÃO DO PRÓXIMO HORÁRIO: Com base no histórico do dia {date} (ou dos dias anteriores se for o primeiro horário do dia), calcule as 5 melhores milhares para o próximo horário disponível.

{mode_instruction}

REQUISITOS DE SAÍDA (JSON):
- thousands: Array de 5 strings (ex: "1234") com as milhares mais prováveis, em ordem de prioridade.
- hundreds: Array de 5 strings (ex: "234") derivadas das milhares sugeridas.
- tens: Array de 5 strings (ex: "34") focando na cabeça (1º prêmio).
- groups: Array de 3 nomes de bichos (ex: "Avestruz").
- reasoning: Explicação técnica de por que estas milhares foram escolhidas (ex: "A milhar 4567 não sai há 12 sorteios e a dezena 67 está em ciclo de retorno").
- delayedNumbers: Array de até 5 objetos {{"number": string, "days": number}} com os mais atrasados encontrados.

Retorne APENAS o JSON estruturado."#,
        board = board.label(),
        date = date,
        sites = sites,
        delay = DELAY_THRESHOLD_DRAWS,
        trend = TREND_WINDOW_DAYS,
        mode_instruction = mode_instruction,
    )
}
