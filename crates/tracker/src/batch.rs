//! Client-side accumulation of transactions before one bulk write.

use api_types::{
    Category,
    transaction::{BatchAccepted, TransactionBatch},
};
use chrono::NaiveDate;

use crate::{
    coordinator::{Coordinator, NoticeSource},
    currency::{Currency, CurrencyState},
    error::{Result, TrackerError},
};

/// A not yet submitted transaction.
///
/// `amount` is expressed in the currency selected at submission time.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDraft {
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub is_income: bool,
    pub date: NaiveDate,
}

impl TransactionDraft {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: Category,
        is_income: bool,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            category,
            is_income,
            date,
        }
    }

    /// Builds a draft from raw form input.
    pub fn parse(
        amount: &str,
        currency: Currency,
        description: &str,
        category: &str,
        is_income: bool,
        date: NaiveDate,
    ) -> Result<Self> {
        let category = Category::from_wire(category)
            .ok_or_else(|| TrackerError::Validation(format!("unknown category '{category}'")))?;
        Ok(Self::new(
            parse_amount(amount, currency)?,
            description.trim(),
            category,
            is_income,
            date,
        ))
    }

    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TrackerError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(TrackerError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if !self.category.allowed_for(self.is_income) {
            let kind = if self.is_income { "income" } else { "expense" };
            return Err(TrackerError::Validation(format!(
                "category '{}' is not valid for {kind}",
                self.category
            )));
        }
        Ok(())
    }

    /// Nanoseconds since the epoch at UTC midnight of `date`.
    fn timestamp(&self) -> Result<u64> {
        self.date
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
            .and_then(|nanos| u64::try_from(nanos).ok())
            .ok_or_else(|| TrackerError::Validation(format!("date out of range: {}", self.date)))
    }
}

/// Parses a user-typed amount.
///
/// Rupiah accepts whole numbers only, dollars up to two decimals (`.` or
/// `,` as separator). The result must be strictly positive.
pub fn parse_amount(input: &str, currency: Currency) -> Result<f64> {
    let invalid = || TrackerError::Validation(format!("invalid amount '{}'", input.trim()));

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::Validation("empty amount".to_string()));
    }

    let normalized = trimmed.replace(',', ".");
    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (normalized.as_str(), None),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if let Some(fraction) = fraction {
        let max = usize::from(currency.minor_units());
        if fraction.is_empty() || fraction.len() > max || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(TrackerError::Validation(format!(
                "{} amounts accept at most {max} decimal places",
                currency.code()
            )));
        }
    }

    let amount: f64 = normalized.parse().map_err(|_| invalid())?;
    if amount <= 0.0 {
        return Err(TrackerError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

/// Ordered list of drafts awaiting one bulk submission.
#[derive(Debug, Default)]
pub struct TransactionBatchBuilder {
    pending: Vec<TransactionDraft>,
}

impl TransactionBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TransactionDraft] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Appends a draft after validating it. Insertion order is kept.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<()> {
        draft.validate()?;
        self.pending.push(draft);
        Ok(())
    }

    /// Removes the draft at `index`; an out of range index does nothing.
    pub fn remove(&mut self, index: usize) -> Option<TransactionDraft> {
        (index < self.pending.len()).then(|| self.pending.remove(index))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// The wire batch for the pending drafts, amounts converted to rupiah.
    pub fn to_batch(&self, currency: &CurrencyState) -> Result<TransactionBatch> {
        let mut batch = TransactionBatch::default();
        for draft in &self.pending {
            batch.amounts.push(currency.to_ledger_amount(draft.amount)?);
            batch.descriptions.push(draft.description.clone());
            batch.categories.push(draft.category);
            batch.is_incomes.push(draft.is_income);
            batch.timestamps.push(draft.timestamp()?);
        }
        Ok(batch)
    }

    /// Sends every pending draft in one ledger write.
    ///
    /// On success the batch is cleared and the coordinator refreshes the
    /// figures affected by the write; a failing refresh is reported through
    /// the coordinator's notices and does not fail the submission. On
    /// failure the batch is left untouched so it can be retried.
    pub async fn submit(&mut self, coordinator: &Coordinator) -> Result<BatchAccepted> {
        if self.pending.is_empty() {
            return Err(TrackerError::EmptyBatch);
        }

        let currency = coordinator.snapshot().currency;
        let batch = self.to_batch(&currency)?;
        let accepted = match coordinator.ledger().add_transactions(batch).await {
            Ok(accepted) => accepted,
            Err(err) => {
                tracing::warn!("failed to record transactions: {err}");
                coordinator.notify(
                    NoticeSource::Submission,
                    format!("Could not record transactions: {err}"),
                );
                return Err(err.into());
            }
        };

        tracing::info!("recorded {} transactions", accepted.added);
        self.pending.clear();

        if let Err(err) = coordinator.on_transactions_committed().await {
            tracing::warn!("refresh after recording failed: {err}");
        }
        Ok(accepted)
    }
}
