use chrono::NaiveDate;

use crate::board::Board;

/// Whether an analysis looks at live results or replays a past day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reference date is today: analyze today's draws so far, predict the next one.
    RealTime,
    /// Reference date is in the past: only information that existed before it counts.
    Backtest,
}

impl Mode {
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            Mode::RealTime
        } else {
            Mode::Backtest
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Data inválida: `{0}`. Use AAAA-MM-DD, DD/MM/AAAA ou \"hoje\".")]
    Unparseable(String),
    #[error("A data de referência {} está no futuro.", .0.format("%d/%m/%Y"))]
    Future(NaiveDate),
}

/// Board and reference date chosen by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub board: Option<Board>,
    /// `None` follows the calendar: the reference date is always "today".
    pub pinned_date: Option<NaiveDate>,
}

impl Selection {
    pub fn reference_date(&self, today: NaiveDate) -> NaiveDate {
        self.pinned_date.unwrap_or(today)
    }

    pub fn mode(&self, today: NaiveDate) -> Mode {
        Mode::for_date(self.reference_date(today), today)
    }
}

/// Parse a user-typed reference date.
///
/// Returns `Ok(None)` for "today" (follow the calendar), `Ok(Some(date))` for a
/// pinned date. Dates after `today` are rejected.
pub fn parse_reference_date(
    input: &str,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, SelectionError> {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("hoje")
        || trimmed.eq_ignore_ascii_case("today")
    {
        return Ok(None);
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| SelectionError::Unparseable(trimmed.to_string()))?;

    if date > today {
        return Err(SelectionError::Future(date));
    }
    if date == today {
        return Ok(None);
    }
    Ok(Some(date))
}
