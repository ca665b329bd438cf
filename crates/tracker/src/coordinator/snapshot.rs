use api_types::{
    Category,
    transaction::{Transaction, TransactionType},
};

use crate::{
    currency::{Currency, CurrencyState},
    period::PeriodKey,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    LoggedOut,
    /// Authenticated, initial load in flight.
    Loading,
    /// Initial load finished (successfully or not).
    Ready,
}

impl SessionPhase {
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::LoggedOut)
    }
}

/// Balance, income and expense for one period.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aggregates {
    /// Period that produced the figures.
    pub period: PeriodKey,
    pub balance: f64,
    pub income: f64,
    pub expense: f64,
}

/// Query that produced a transaction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub kind: TransactionType,
    pub category: Option<Category>,
    pub period: PeriodKey,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionList {
    pub query: ListQuery,
    pub transactions: Vec<Transaction>,
}

impl TransactionList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// User selection for the report list and the history view.
///
/// The report list follows `kind` over the report period; the history view
/// additionally narrows by `category` over `history_period`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportFilter {
    pub kind: TransactionType,
    pub category: Option<Category>,
    pub history_period: PeriodKey,
}

impl ReportFilter {
    /// All categories of `kind`, with the history view on `history_period`.
    #[must_use]
    pub fn new(kind: TransactionType, history_period: PeriodKey) -> Self {
        Self {
            kind,
            category: None,
            history_period,
        }
    }

    /// The same filter with only the kind replaced.
    #[must_use]
    pub fn with_kind(self, kind: TransactionType) -> Self {
        Self { kind, ..self }
    }
}

/// Everything the views render, published as one immutable value.
///
/// A snapshot is only ever replaced as a whole, so a subscriber never sees
/// fields of one group coming from two different requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub phase: SessionPhase,
    pub dashboard: Aggregates,
    pub report: Aggregates,
    pub report_transactions: TransactionList,
    pub history_transactions: TransactionList,
    pub currency: CurrencyState,
}

impl Snapshot {
    /// The logged-out state: zero figures, empty lists, no exchange rate.
    #[must_use]
    pub fn logged_out(selected: Currency) -> Self {
        Self {
            currency: CurrencyState {
                selected,
                exchange_rate: None,
            },
            ..Self::default()
        }
    }

    /// Formats a ledger amount in the selected currency.
    #[must_use]
    pub fn display(&self, amount: f64) -> String {
        self.currency.display(amount)
    }
}
