use std::collections::HashMap;

use api_types::{
    Category,
    transaction::{BatchAccepted, FilterQuery, Transaction, TransactionBatch, TransactionType},
};

pub use error::EngineError;
pub use period::{MonthBucket, Period};

pub mod advice;
mod error;
mod period;

type ResultEngine<T> = Result<T, EngineError>;

/// In-memory ledger holding one book of transactions per principal.
///
/// Reads never fail for an unknown principal: a caller without a book simply
/// sees an empty one.
#[derive(Debug)]
pub struct Ledger {
    books: HashMap<String, Book>,
    exchange_rate: f64,
}

#[derive(Debug, Default)]
struct Book {
    entries: Vec<Entry>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    transaction: Transaction,
    bucket: MonthBucket,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Rupiah for one US dollar.
    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    /// Appends every entry of the batch to the principal's book.
    ///
    /// The batch is validated as a whole before anything is stored, so a
    /// rejected batch leaves the book untouched.
    pub fn add_transactions(
        &mut self,
        principal: &str,
        batch: TransactionBatch,
    ) -> ResultEngine<BatchAccepted> {
        if !batch.is_aligned() {
            return Err(EngineError::InvalidBatch(
                "all input arrays must have the same length".to_string(),
            ));
        }
        if batch.is_empty() {
            return Err(EngineError::InvalidBatch(
                "no transactions provided".to_string(),
            ));
        }
        if let Some(amount) = batch
            .amounts
            .iter()
            .find(|amount| !amount.is_finite() || **amount < 0.0)
        {
            return Err(EngineError::InvalidBatch(format!(
                "amount must be a non-negative number, got {amount}"
            )));
        }

        let mut staged = Vec::with_capacity(batch.len());
        for &timestamp in &batch.timestamps {
            staged.push(period::bucket_and_date(timestamp)?);
        }

        let book = self.books.entry(principal.to_string()).or_default();
        let added = batch.len();
        let TransactionBatch {
            amounts,
            descriptions,
            categories,
            is_incomes,
            timestamps,
        } = batch;

        let rows = amounts
            .into_iter()
            .zip(descriptions)
            .zip(categories)
            .zip(is_incomes)
            .zip(timestamps)
            .zip(staged);
        for (((((amount, description), category), is_income), timestamp), (bucket, date)) in rows
        {
            let transaction = Transaction {
                id: book.next_id,
                amount,
                description,
                is_income,
                timestamp,
                date,
                category,
            };
            book.next_id += 1;
            book.entries.push(Entry {
                transaction,
                bucket,
            });
        }

        tracing::debug!("added {added} transactions for {principal}");
        Ok(BatchAccepted {
            added,
            message: format!("Added {added} transactions successfully"),
        })
    }

    /// Income minus expense over the period.
    pub fn balance(&self, principal: &str, period: Period) -> f64 {
        normalize(self.income(principal, period) - self.expense(principal, period))
    }

    pub fn income(&self, principal: &str, period: Period) -> f64 {
        self.sum(principal, period, TransactionType::Income)
    }

    pub fn expense(&self, principal: &str, period: Period) -> f64 {
        self.sum(principal, period, TransactionType::Expense)
    }

    /// Every transaction of the period, in insertion order.
    pub fn report(&self, principal: &str, period: Period) -> Vec<Transaction> {
        self.select(principal, period, TransactionType::All, None)
    }

    pub fn income_report(&self, principal: &str, period: Period) -> Vec<Transaction> {
        self.select(principal, period, TransactionType::Income, None)
    }

    pub fn expense_report(&self, principal: &str, period: Period) -> Vec<Transaction> {
        self.select(principal, period, TransactionType::Expense, None)
    }

    /// Transactions matching type, optional category and period.
    pub fn filtered(&self, principal: &str, query: &FilterQuery) -> ResultEngine<Vec<Transaction>> {
        let period = Period::parse(&query.year_month)?;
        Ok(self.select(principal, period, query.transaction_type, query.category))
    }

    fn entries<'a>(
        &'a self,
        principal: &str,
        period: Period,
        kind: TransactionType,
        category: Option<Category>,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.books
            .get(principal)
            .into_iter()
            .flat_map(|book| book.entries.iter())
            .filter(move |entry| {
                period.contains(entry.bucket)
                    && kind.matches(entry.transaction.is_income)
                    && category.is_none_or(|category| entry.transaction.category == category)
            })
            .map(|entry| &entry.transaction)
    }

    fn select(
        &self,
        principal: &str,
        period: Period,
        kind: TransactionType,
        category: Option<Category>,
    ) -> Vec<Transaction> {
        self.entries(principal, period, kind, category)
            .cloned()
            .collect()
    }

    fn sum(&self, principal: &str, period: Period, kind: TransactionType) -> f64 {
        normalize(
            self.entries(principal, period, kind, None)
                .map(|tx| tx.amount)
                .sum(),
        )
    }
}

/// Turns `-0.0` into `0.0` so empty sums never render with a sign.
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Builder for [`Ledger`].
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    exchange_rate: Option<f64>,
}

impl LedgerBuilder {
    /// Rupiah for one US dollar served by the ledger. Must be positive.
    pub fn exchange_rate(mut self, rate: f64) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    pub fn build(self) -> ResultEngine<Ledger> {
        let exchange_rate = self.exchange_rate.unwrap_or(DEFAULT_EXCHANGE_RATE);
        if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
            return Err(EngineError::InvalidRate(format!(
                "must be positive, got {exchange_rate}"
            )));
        }
        Ok(Ledger {
            books: HashMap::new(),
            exchange_rate,
        })
    }
}

pub const DEFAULT_EXCHANGE_RATE: f64 = 16_000.0;
