use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::prediction::{PredictionRecord, PredictionSource};
use crate::selection::{parse_reference_date, Mode, Selection, SelectionError};

/// Sessions untouched for this long are dropped by [`Analyzer::evict_idle`].
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// State of the single result slot of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loading,
    Success(PredictionRecord),
    Failure(String),
}

/// How a finished call ended up, from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    Success(PredictionRecord),
    Failure(String),
    /// A newer request was started in the same session; this result was dropped.
    Superseded,
}

/// One started analysis. `generation` identifies it within its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub user: u64,
    pub board: Board,
    pub date: NaiveDate,
    pub today: NaiveDate,
    pub generation: u64,
}

impl AnalysisRequest {
    pub fn mode(&self) -> Mode {
        Mode::for_date(self.date, self.today)
    }
}

/// Read-only copy of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub selection: Selection,
    /// The request the outcome belongs to; `None` until the first analysis starts.
    pub request: Option<AnalysisRequest>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug)]
struct Session {
    selection: Selection,
    request: Option<AnalysisRequest>,
    outcome: Option<Outcome>,
    generation: u64,
    touched: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            selection: Selection::default(),
            request: None,
            outcome: None,
            generation: 0,
            touched: Instant::now(),
        }
    }

    /// Mark a new call for `board` at `date` as in flight.
    fn start(&mut self, user: u64, board: Board, date: NaiveDate, today: NaiveDate) -> AnalysisRequest {
        self.generation += 1;
        self.outcome = Some(Outcome::Loading);
        self.touched = Instant::now();
        let request = AnalysisRequest {
            user,
            board,
            date,
            today,
            generation: self.generation,
        };
        self.request = Some(request.clone());
        request
    }
}

/// Per-user selection state and the prediction calls it triggers.
pub struct Analyzer<S> {
    source: Arc<S>,
    sessions: RwLock<HashMap<u64, Session>>,
}

impl<S: PredictionSource> Analyzer<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Select a board and start an analysis for it at the current reference date.
    pub async fn select_board(&self, user: u64, board: Board, today: NaiveDate) -> AnalysisRequest {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_insert_with(Session::new);
        session.selection.board = Some(board);
        let date = session.selection.reference_date(today);
        let request = session.start(user, board, date, today);
        debug!(user, board = board.label(), generation = request.generation, "Board selected");
        request
    }

    /// Change the reference date. Starts an analysis when a board is already selected.
    pub async fn change_date(
        &self,
        user: u64,
        input: &str,
        today: NaiveDate,
    ) -> Result<Option<AnalysisRequest>, SelectionError> {
        let pinned = parse_reference_date(input, today)?;
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_insert_with(Session::new);
        session.selection.pinned_date = pinned;
        session.touched = Instant::now();
        let date = session.selection.reference_date(today);
        let board = session.selection.board;
        Ok(board.map(|board| session.start(user, board, date, today)))
    }

    /// Re-issue the last request of the session with the same (board, date) pair.
    ///
    /// The pair is the one originally sent, even if the calendar day has turned since.
    pub async fn retry(&self, user: u64) -> Option<AnalysisRequest> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user)?;
        let last = session.request.clone()?;
        Some(session.start(user, last.board, last.date, last.today))
    }

    /// Run the call for `request` and store its result if it is still the latest.
    ///
    /// The session lock is not held while the provider is working.
    pub async fn execute(&self, request: &AnalysisRequest) -> Settled {
        let result = self
            .source
            .predict(request.board, request.date, request.today)
            .await;

        let (settled, outcome) = match result {
            Ok(record) => (Settled::Success(record.clone()), Outcome::Success(record)),
            Err(e) => {
                warn!(
                    user = request.user,
                    board = request.board.label(),
                    date = %request.date,
                    error = %e,
                    "Prediction failed"
                );
                let message = e.user_message().to_string();
                (Settled::Failure(message.clone()), Outcome::Failure(message))
            }
        };

        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&request.user) else {
            return Settled::Superseded;
        };
        if session.generation != request.generation {
            info!(
                user = request.user,
                generation = request.generation,
                latest = session.generation,
                "Dropping stale prediction"
            );
            return Settled::Superseded;
        }

        session.outcome = Some(outcome);
        session.touched = Instant::now();
        settled
    }

    pub async fn snapshot(&self, user: u64) -> SessionView {
        let sessions = self.sessions.read().await;
        match sessions.get(&user) {
            Some(session) => SessionView {
                selection: session.selection.clone(),
                request: session.request.clone(),
                outcome: session.outcome.clone(),
            },
            None => SessionView {
                selection: Selection::default(),
                request: None,
                outcome: None,
            },
        }
    }

    /// Drop sessions idle for at least `max_idle` as of `now`. Sessions with a call
    /// in flight are kept. Returns how many were removed.
    pub async fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            matches!(session.outcome, Some(Outcome::Loading))
                || now.saturating_duration_since(session.touched) < max_idle
        });
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Evicted idle sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::error::FAILURE_MESSAGE;
    use crate::prediction::types::DelayedNumber;
    use crate::prediction::PredictionError;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_record(reasoning: &str) -> PredictionRecord {
        PredictionRecord {
            thousands: vec!["1234", "5678", "9012", "3456", "7890"]
                .into_iter()
                .map(String::from)
                .collect(),
            hundreds: vec!["234", "678", "012", "456", "890"]
                .into_iter()
                .map(String::from)
                .collect(),
            tens: vec!["34", "78", "12", "56", "90"]
                .into_iter()
                .map(String::from)
                .collect(),
            groups: vec!["Avestruz".into(), "Tigre".into(), "Leão".into()],
            reasoning: reasoning.to_string(),
            delayed_numbers: vec![DelayedNumber {
                number: "4567".into(),
                days: 12,
            }],
            sources: vec![],
        }
    }

    /// Records every call; succeeds unless `fail` is set.
    #[derive(Default)]
    struct Scripted {
        calls: Mutex<Vec<(Board, NaiveDate)>>,
        fail: bool,
    }

    impl PredictionSource for Scripted {
        async fn predict(
            &self,
            board: Board,
            date: NaiveDate,
            _today: NaiveDate,
        ) -> Result<PredictionRecord, PredictionError> {
            self.calls.lock().unwrap().push((board, date));
            if self.fail {
                let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                return Err(PredictionError::Payload(err));
            }
            Ok(sample_record(board.label()))
        }
    }

    /// Each call waits until the test releases it, so completion order is controlled.
    #[derive(Default)]
    struct Gated {
        gates: Mutex<HashMap<Board, oneshot::Receiver<()>>>,
    }

    impl Gated {
        fn gate(&self, board: Board) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(board, rx);
            tx
        }
    }

    impl PredictionSource for Gated {
        async fn predict(
            &self,
            board: Board,
            _date: NaiveDate,
            _today: NaiveDate,
        ) -> Result<PredictionRecord, PredictionError> {
            let rx = self.gates.lock().unwrap().remove(&board);
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok(sample_record(board.label()))
        }
    }

    #[tokio::test]
    async fn test_select_board_triggers_one_request_per_board() {
        let today = day(2026, 10, 18);
        for board in Board::ALL {
            let source = Arc::new(Scripted::default());
            let analyzer = Analyzer::new(source.clone());

            let request = analyzer.select_board(7, board, today).await;
            assert_eq!(request.board, board);
            assert_eq!(request.date, today);
            assert_eq!(request.mode(), Mode::RealTime);
            assert_eq!(
                analyzer.snapshot(7).await.outcome,
                Some(Outcome::Loading)
            );

            analyzer.execute(&request).await;
            assert_eq!(*source.calls.lock().unwrap(), vec![(board, today)]);
        }
    }

    #[tokio::test]
    async fn test_success_populates_outcome() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));
        let request = analyzer.select_board(1, Board::Bahia, today).await;

        let settled = analyzer.execute(&request).await;
        let expected = sample_record("Bahia");
        assert_eq!(settled, Settled::Success(expected.clone()));
        assert_eq!(
            analyzer.snapshot(1).await.outcome,
            Some(Outcome::Success(expected))
        );
    }

    #[tokio::test]
    async fn test_failure_surfaces_fixed_message_only() {
        let today = day(2026, 10, 18);
        let source = Arc::new(Scripted {
            fail: true,
            ..Default::default()
        });
        let analyzer = Analyzer::new(source);
        let request = analyzer.select_board(1, Board::Nacional, today).await;

        let settled = analyzer.execute(&request).await;
        assert_eq!(settled, Settled::Failure(FAILURE_MESSAGE.to_string()));
        assert_eq!(
            analyzer.snapshot(1).await.outcome,
            Some(Outcome::Failure(FAILURE_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_date_change_retriggers_with_selected_board() {
        let today = day(2026, 10, 18);
        let source = Arc::new(Scripted::default());
        let analyzer = Analyzer::new(source.clone());

        let first = analyzer.select_board(1, Board::Lotep, today).await;
        analyzer.execute(&first).await;

        let second = analyzer
            .change_date(1, "2026-10-10", today)
            .await
            .unwrap()
            .expect("board already selected");
        assert_eq!(second.board, Board::Lotep);
        assert_eq!(second.date, day(2026, 10, 10));
        assert_eq!(second.mode(), Mode::Backtest);
        analyzer.execute(&second).await;

        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(Board::Lotep, today), (Board::Lotep, day(2026, 10, 10))]
        );
    }

    #[tokio::test]
    async fn test_date_change_without_board_only_records_date() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));

        let request = analyzer.change_date(1, "01/10/2026", today).await.unwrap();
        assert!(request.is_none());

        let view = analyzer.snapshot(1).await;
        assert_eq!(view.selection.board, None);
        assert_eq!(view.selection.reference_date(today), day(2026, 10, 1));
        assert_eq!(view.outcome, None);

        let request = analyzer.select_board(1, Board::Popular, today).await;
        assert_eq!(request.date, day(2026, 10, 1));
    }

    #[tokio::test]
    async fn test_future_date_rejected_and_selection_kept() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));
        analyzer.select_board(1, Board::Bahia, today).await;

        let err = analyzer.change_date(1, "2026-12-25", today).await.unwrap_err();
        assert_eq!(err, SelectionError::Future(day(2026, 12, 25)));
        assert_eq!(
            analyzer.snapshot(1).await.selection.reference_date(today),
            today
        );
    }

    #[tokio::test]
    async fn test_retry_reissues_same_pair() {
        let today = day(2026, 10, 18);
        let source = Arc::new(Scripted::default());
        let analyzer = Analyzer::new(source.clone());

        assert!(analyzer.retry(1).await.is_none());

        analyzer.change_date(1, "2026-10-05", today).await.unwrap();
        assert!(analyzer.retry(1).await.is_none());

        let first = analyzer.select_board(1, Board::RioDeJaneiro, today).await;
        let again = analyzer.retry(1).await.unwrap();
        assert_eq!((again.board, again.date), (first.board, first.date));
        assert_eq!(again.generation, first.generation + 1);
    }

    #[tokio::test]
    async fn test_retry_after_midnight_keeps_original_date() {
        let today = day(2026, 10, 18);
        let source = Arc::new(Scripted {
            fail: true,
            ..Default::default()
        });
        let analyzer = Analyzer::new(source.clone());

        let first = analyzer.select_board(1, Board::Bahia, today).await;
        analyzer.execute(&first).await;

        // The day turns before the user presses retry.
        let again = analyzer.retry(1).await.unwrap();
        assert_eq!((again.board, again.date), (Board::Bahia, today));
        assert_eq!(again.mode(), Mode::RealTime);
        analyzer.execute(&again).await;

        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(Board::Bahia, today), (Board::Bahia, today)]
        );
    }

    #[tokio::test]
    async fn test_snapshot_keeps_request_of_outcome() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));

        let request = analyzer.select_board(1, Board::Lotep, today).await;
        analyzer.execute(&request).await;

        let view = analyzer.snapshot(1).await;
        assert_eq!(view.request, Some(request));
        // Rendering the next day must still show the day the result was fetched for.
        assert_eq!(view.request.unwrap().date, today);
        assert_ne!(view.selection.reference_date(day(2026, 10, 19)), today);
    }

    #[tokio::test]
    async fn test_evict_idle_drops_settled_sessions_only() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));

        let done = analyzer.select_board(1, Board::Bahia, today).await;
        analyzer.execute(&done).await;
        analyzer.select_board(2, Board::Nacional, today).await;

        let now = Instant::now();
        assert_eq!(analyzer.evict_idle(now, SESSION_IDLE_TIMEOUT).await, 0);

        let later = now + SESSION_IDLE_TIMEOUT + Duration::from_secs(1);
        assert_eq!(analyzer.evict_idle(later, SESSION_IDLE_TIMEOUT).await, 1);
        assert_eq!(analyzer.snapshot(1).await.outcome, None);
        assert_eq!(
            analyzer.snapshot(2).await.outcome,
            Some(Outcome::Loading)
        );
    }

    #[tokio::test]
    async fn test_stale_response_is_not_applied() {
        let today = day(2026, 10, 18);
        let source = Arc::new(Gated::default());
        let analyzer = Arc::new(Analyzer::new(source.clone()));

        let release_slow = source.gate(Board::Bahia);
        let slow = analyzer.select_board(1, Board::Bahia, today).await;
        let slow_task = {
            let analyzer = analyzer.clone();
            tokio::spawn(async move { analyzer.execute(&slow).await })
        };

        let fresh = analyzer.select_board(1, Board::SaoPaulo, today).await;
        let fresh_settled = analyzer.execute(&fresh).await;
        assert_eq!(fresh_settled, Settled::Success(sample_record("São Paulo")));

        release_slow.send(()).unwrap();
        assert_eq!(slow_task.await.unwrap(), Settled::Superseded);

        assert_eq!(
            analyzer.snapshot(1).await.outcome,
            Some(Outcome::Success(sample_record("São Paulo")))
        );
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let today = day(2026, 10, 18);
        let analyzer = Analyzer::new(Arc::new(Scripted::default()));

        let a = analyzer.select_board(1, Board::Bahia, today).await;
        let b = analyzer.select_board(2, Board::Nacional, today).await;
        assert_eq!(analyzer.execute(&a).await, Settled::Success(sample_record("Bahia")));
        assert_eq!(analyzer.execute(&b).await, Settled::Success(sample_record("Nacional")));
        assert_eq!(analyzer.snapshot(3).await.outcome, None);
    }
}
