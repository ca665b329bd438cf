//! Single owner of every displayed monetary figure.
//!
//! The [`Coordinator`] keeps the authoritative [`Snapshot`] and mediates every
//! refresh against the [`RemoteLedger`]. Views never mutate state directly;
//! they call an operation and observe the replaced snapshot through
//! [`Coordinator::subscribe`].
//!
//! Each refresh takes a [`Ticket`] for its field group before going to the
//! ledger. On completion the result is committed only if no newer ticket was
//! issued for that group in the meantime and the login session is unchanged.
//! Superseded results are dropped and counted in
//! [`Coordinator::stale_discards`].

use std::sync::Arc;

use api_types::transaction::TransactionType;
use tokio::sync::{Mutex, broadcast, watch};

use crate::{
    currency::{Currency, ExchangeRate},
    error::{Result, TrackerError},
    ledger::{LedgerError, LedgerResult, RemoteLedger},
    period::{PeriodKey, PeriodSelector},
};

mod sequence;
mod snapshot;

pub use sequence::FieldGroup;
pub use snapshot::{
    Aggregates, ListQuery, ReportFilter, SessionPhase, Snapshot, TransactionList,
};

use sequence::{Sequences, Ticket};

const NOTICE_CAPACITY: usize = 32;

/// What happened to the result of a single field group refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result replaced the group in the snapshot.
    Applied,
    /// A newer refresh or a logout superseded this one; the result was dropped.
    Discarded,
    /// Nothing was requested because no session is active.
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeSource {
    Refresh(FieldGroup),
    Submission,
    Advice,
}

/// User-visible message about a failed remote call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub source: NoticeSource,
    pub message: String,
}

struct State {
    phase: SessionPhase,
    periods: PeriodSelector,
    filter: ReportFilter,
    history_open: bool,
    sequences: Sequences,
    stale_discards: u64,
}

impl State {
    fn summary_query(&self) -> ListQuery {
        ListQuery {
            kind: self.filter.kind,
            category: None,
            period: self.periods.report,
        }
    }

    fn history_query(&self) -> ListQuery {
        ListQuery {
            kind: self.filter.kind,
            category: self.filter.category,
            period: self.filter.history_period,
        }
    }
}

pub struct Coordinator {
    ledger: Arc<dyn RemoteLedger>,
    state: Mutex<State>,
    snapshot: watch::Sender<Arc<Snapshot>>,
    notices: broadcast::Sender<Notice>,
}

impl Coordinator {
    /// Both period selectors start on the current month.
    pub fn new(ledger: Arc<dyn RemoteLedger>) -> Self {
        Self::with_periods(ledger, PeriodSelector::default())
    }

    pub fn with_periods(ledger: Arc<dyn RemoteLedger>, periods: PeriodSelector) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            ledger,
            state: Mutex::new(State {
                phase: SessionPhase::LoggedOut,
                periods,
                filter: ReportFilter::new(TransactionType::All, periods.report),
                history_open: false,
                sequences: Sequences::default(),
                stale_discards: 0,
            }),
            snapshot,
            notices,
        }
    }

    pub(crate) fn ledger(&self) -> &Arc<dyn RemoteLedger> {
        &self.ledger
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub async fn periods(&self) -> PeriodSelector {
        self.state.lock().await.periods
    }

    pub async fn filter(&self) -> ReportFilter {
        self.state.lock().await.filter
    }

    pub async fn is_history_open(&self) -> bool {
        self.state.lock().await.history_open
    }

    /// Number of refresh results dropped because they were superseded.
    pub async fn stale_discards(&self) -> u64 {
        self.state.lock().await.stale_discards
    }

    /// Maps the identity provider's signal onto the login triggers.
    pub async fn on_auth_changed(&self, authenticated: bool) -> Result<()> {
        if authenticated {
            self.on_login_established().await
        } else {
            self.on_login_cleared().await;
            Ok(())
        }
    }

    /// Initial load of a login session.
    ///
    /// Fetches the exchange rate, the dashboard aggregates for the dashboard
    /// period, the all-time report aggregates and the unfiltered report list,
    /// concurrently. The session becomes [`SessionPhase::Ready`] once all of
    /// them have settled, even if some failed; the first failure is returned.
    /// Calling it again within the same session does nothing.
    pub async fn on_login_established(&self) -> Result<()> {
        let (epoch, rate, dashboard, report, list) = {
            let mut state = self.state.lock().await;
            if state.phase.is_active() {
                tracing::debug!("login already established, skipping initial load");
                return Ok(());
            }

            state.phase = SessionPhase::Loading;
            state.filter.kind = TransactionType::All;
            state.filter.category = None;
            self.publish(|snapshot| snapshot.phase = SessionPhase::Loading);

            let dashboard_period = state.periods.dashboard;
            let list_query = state.summary_query();
            let seqs = &mut state.sequences;
            (
                seqs.epoch(),
                seqs.issue(FieldGroup::ExchangeRate),
                (seqs.issue(FieldGroup::Dashboard), dashboard_period),
                seqs.issue(FieldGroup::Report),
                (seqs.issue(FieldGroup::ReportList), list_query),
            )
        };

        tracing::info!("loading financial state");
        let (rate, dashboard, report, list) = tokio::join!(
            self.load_exchange_rate(rate),
            self.load_dashboard(dashboard.0, dashboard.1),
            self.load_report(report, PeriodKey::AllTime),
            self.load_report_list(list.0, list.1),
        );

        {
            let mut state = self.state.lock().await;
            if state.sequences.epoch() == epoch {
                state.phase = SessionPhase::Ready;
                self.publish(|snapshot| snapshot.phase = SessionPhase::Ready);
            }
        }

        first_error([rate, dashboard, report, list])
    }

    /// Drops the session: zero figures, empty lists, no exchange rate.
    ///
    /// Every refresh still in flight is discarded when it lands.
    pub async fn on_login_cleared(&self) {
        let mut state = self.state.lock().await;
        state.sequences.next_epoch();
        state.phase = SessionPhase::LoggedOut;
        state.history_open = false;
        self.publish(|snapshot| *snapshot = Snapshot::logged_out(snapshot.currency.selected));
    }

    pub async fn set_dashboard_period(&self, period: PeriodKey) -> Result<RefreshOutcome> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.periods.dashboard = period;
            if !state.phase.is_active() {
                return Ok(RefreshOutcome::Skipped);
            }
            state.sequences.issue(FieldGroup::Dashboard)
        };
        self.load_dashboard(ticket, period).await
    }

    /// Refreshes the report aggregates and the report list for `period`.
    pub async fn set_report_period(&self, period: PeriodKey) -> Result<()> {
        let (report, list, query) = {
            let mut state = self.state.lock().await;
            state.periods.report = period;
            if !state.phase.is_active() {
                return Ok(());
            }
            let query = state.summary_query();
            (
                state.sequences.issue(FieldGroup::Report),
                state.sequences.issue(FieldGroup::ReportList),
                query,
            )
        };

        let (report, list) = tokio::join!(
            self.load_report(report, period),
            self.load_report_list(list, query),
        );
        first_error([report, list])
    }

    /// Replaces the filter and refreshes the report list, plus the history
    /// list while the history view is open.
    pub async fn set_report_filter(&self, filter: ReportFilter) -> Result<()> {
        let (list, history) = {
            let mut state = self.state.lock().await;
            state.filter = filter;
            if !state.phase.is_active() {
                return Ok(());
            }
            let list = (
                state.sequences.issue(FieldGroup::ReportList),
                state.summary_query(),
            );
            let history = if state.history_open {
                Some((
                    state.sequences.issue(FieldGroup::History),
                    state.history_query(),
                ))
            } else {
                None
            };
            (list, history)
        };

        let history = async {
            match history {
                Some((ticket, query)) => self.load_history(ticket, query).await,
                None => Ok(RefreshOutcome::Skipped),
            }
        };
        let (list, history) = tokio::join!(self.load_report_list(list.0, list.1), history);
        first_error([list, history])
    }

    /// Re-reads the report list for the current filter kind and report period.
    pub async fn refresh_report_list(&self) -> Result<RefreshOutcome> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return Ok(RefreshOutcome::Skipped);
            }
            (
                state.sequences.issue(FieldGroup::ReportList),
                state.summary_query(),
            )
        };
        self.load_report_list(ticket, query).await
    }

    pub async fn open_history(&self) -> Result<RefreshOutcome> {
        self.state.lock().await.history_open = true;
        self.refresh_history().await
    }

    pub async fn close_history(&self) {
        self.state.lock().await.history_open = false;
    }

    /// Re-reads the history list for the full filter (kind, category and
    /// history period).
    pub async fn refresh_history(&self) -> Result<RefreshOutcome> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return Ok(RefreshOutcome::Skipped);
            }
            (
                state.sequences.issue(FieldGroup::History),
                state.history_query(),
            )
        };
        self.load_history(ticket, query).await
    }

    /// Reflects freshly written transactions: dashboard for the dashboard
    /// period, all-time report aggregates and the report list for the
    /// current filter. One refresh per group.
    pub async fn on_transactions_committed(&self) -> Result<()> {
        let (dashboard, report, list) = {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return Ok(());
            }
            let dashboard_period = state.periods.dashboard;
            let list_query = state.summary_query();
            (
                (state.sequences.issue(FieldGroup::Dashboard), dashboard_period),
                state.sequences.issue(FieldGroup::Report),
                (state.sequences.issue(FieldGroup::ReportList), list_query),
            )
        };

        let (dashboard, report, list) = tokio::join!(
            self.load_dashboard(dashboard.0, dashboard.1),
            self.load_report(report, PeriodKey::AllTime),
            self.load_report_list(list.0, list.1),
        );
        first_error([dashboard, report, list])
    }

    pub async fn set_currency(&self, currency: Currency) {
        let _state = self.state.lock().await;
        self.publish(|snapshot| snapshot.currency.selected = currency);
    }

    /// Asks the ledger for advice on the report figures, formatted in the
    /// selected currency.
    pub async fn request_advice(&self) -> Result<String> {
        let snapshot = self.snapshot();
        if !snapshot.phase.is_active() {
            return Err(LedgerError::Unauthorized.into());
        }
        let currency = snapshot.currency;
        if !currency.selected.is_base() && currency.exchange_rate.is_none() {
            return Err(TrackerError::RateUnavailable);
        }

        let income = currency.display(snapshot.report.income);
        let expense = currency.display(snapshot.report.expense);
        let balance = currency.display(snapshot.report.balance);
        match self.ledger.advice(&income, &expense, &balance).await {
            Ok(advice) => Ok(advice),
            Err(err) => {
                tracing::warn!("advice request failed: {err}");
                self.notify(NoticeSource::Advice, format!("Could not get advice: {err}"));
                Err(err.into())
            }
        }
    }

    pub(crate) fn notify(&self, source: NoticeSource, message: String) {
        // No receivers is fine; notices are best effort.
        let _ = self.notices.send(Notice { source, message });
    }

    /// Replaces the snapshot with an updated copy.
    ///
    /// Callers hold the state lock, which serializes writers.
    fn publish(&self, update: impl FnOnce(&mut Snapshot)) {
        let mut next = Snapshot::clone(&self.snapshot.borrow());
        update(&mut next);
        self.snapshot.send_replace(Arc::new(next));
    }

    async fn commit<T>(
        &self,
        ticket: Ticket,
        result: LedgerResult<T>,
        apply: impl FnOnce(&mut Snapshot, T),
    ) -> Result<RefreshOutcome> {
        let mut state = self.state.lock().await;
        if !state.sequences.is_current(ticket) {
            state.stale_discards += 1;
            tracing::debug!(
                "discarded stale {} result (seq {}, latest {})",
                ticket.group,
                ticket.seq,
                state.sequences.latest(ticket.group)
            );
            return Ok(RefreshOutcome::Discarded);
        }

        match result {
            Ok(value) => {
                self.publish(|snapshot| apply(snapshot, value));
                Ok(RefreshOutcome::Applied)
            }
            Err(err) => {
                drop(state);
                tracing::warn!("failed to refresh {}: {err}", ticket.group);
                self.notify(
                    NoticeSource::Refresh(ticket.group),
                    format!("Could not load {}: {err}", ticket.group),
                );
                Err(err.into())
            }
        }
    }

    async fn fetch_aggregates(&self, period: PeriodKey) -> LedgerResult<Aggregates> {
        let (balance, income, expense) = tokio::try_join!(
            self.ledger.balance(period),
            self.ledger.income(period),
            self.ledger.expense(period),
        )?;
        Ok(Aggregates {
            period,
            balance,
            income,
            expense,
        })
    }

    async fn load_dashboard(&self, ticket: Ticket, period: PeriodKey) -> Result<RefreshOutcome> {
        let result = self.fetch_aggregates(period).await;
        self.commit(ticket, result, |snapshot, aggregates| {
            snapshot.dashboard = aggregates;
        })
        .await
    }

    async fn load_report(&self, ticket: Ticket, period: PeriodKey) -> Result<RefreshOutcome> {
        let result = self.fetch_aggregates(period).await;
        self.commit(ticket, result, |snapshot, aggregates| {
            snapshot.report = aggregates;
        })
        .await
    }

    async fn load_report_list(&self, ticket: Ticket, query: ListQuery) -> Result<RefreshOutcome> {
        let result = match query.kind {
            TransactionType::All => self.ledger.report_by_month(query.period).await,
            TransactionType::Income => self.ledger.income_report(query.period).await,
            TransactionType::Expense => self.ledger.expense_report(query.period).await,
        };
        self.commit(ticket, result, move |snapshot, transactions| {
            snapshot.report_transactions = TransactionList {
                query,
                transactions,
            };
        })
        .await
    }

    async fn load_history(&self, ticket: Ticket, query: ListQuery) -> Result<RefreshOutcome> {
        let result = self
            .ledger
            .filtered_transactions(query.kind, query.category, query.period)
            .await;
        self.commit(ticket, result, move |snapshot, transactions| {
            snapshot.history_transactions = TransactionList {
                query,
                transactions,
            };
        })
        .await
    }

    async fn load_exchange_rate(&self, ticket: Ticket) -> Result<RefreshOutcome> {
        let result = self.ledger.exchange_rate().await.and_then(|rate| {
            ExchangeRate::new(rate)
                .ok_or_else(|| LedgerError::InvalidResponse(format!("exchange rate {rate}")))
        });
        self.commit(ticket, result, |snapshot, rate| {
            snapshot.currency.exchange_rate = Some(rate);
        })
        .await
    }
}

/// Every refresh has already run; report the first failure, if any.
fn first_error<const N: usize>(results: [Result<RefreshOutcome>; N]) -> Result<()> {
    results.into_iter().find_map(Result::err).map_or(Ok(()), Err)
}
