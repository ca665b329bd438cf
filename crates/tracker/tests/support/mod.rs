#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use api_types::{
    Category,
    transaction::{BatchAccepted, Transaction, TransactionBatch, TransactionType},
};
use async_trait::async_trait;
use tokio::sync::oneshot;
use tracker::{Coordinator, LedgerError, LedgerResult, PeriodKey, PeriodSelector, RemoteLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    AddTransactions,
    Balance,
    Income,
    Expense,
    ReportByMonth,
    IncomeReport,
    ExpenseReport,
    Filtered,
    ExchangeRate,
    Advice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub period: Option<PeriodKey>,
}

struct Gate {
    call: Call,
    release: oneshot::Sender<()>,
}

#[derive(Default)]
struct Script {
    hold: bool,
    gates: Vec<Gate>,
    calls: Vec<Call>,
    failing: HashSet<Op>,
    aggregates: HashMap<PeriodKey, (f64, f64, f64)>,
    reports: HashMap<(Op, PeriodKey), Vec<Transaction>>,
    rate: f64,
    batches: Vec<TransactionBatch>,
}

/// In-memory ledger whose answers are scripted by the test.
///
/// While held, every call parks on a oneshot gate until the test releases
/// it, which lets a test resolve concurrent calls in any order.
pub struct ScriptedLedger {
    script: Mutex<Script>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script {
                rate: 15_000.0,
                ..Script::default()
            }),
        })
    }

    pub fn hold(&self) {
        self.script.lock().unwrap().hold = true;
    }

    pub fn fail(&self, op: Op) {
        self.script.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.script.lock().unwrap().failing.remove(&op);
    }

    pub fn set_rate(&self, rate: f64) {
        self.script.lock().unwrap().rate = rate;
    }

    pub fn set_aggregates(&self, period: PeriodKey, balance: f64, income: f64, expense: f64) {
        self.script
            .lock()
            .unwrap()
            .aggregates
            .insert(period, (balance, income, expense));
    }

    pub fn set_report(&self, op: Op, period: PeriodKey, transactions: Vec<Transaction>) {
        self.script
            .lock()
            .unwrap()
            .reports
            .insert((op, period), transactions);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| call.op == op).count()
    }

    pub fn batches(&self) -> Vec<TransactionBatch> {
        self.script.lock().unwrap().batches.clone()
    }

    pub fn parked(&self) -> usize {
        self.script.lock().unwrap().gates.len()
    }

    /// Releases every parked call matching `pred`; returns how many.
    pub fn release(&self, pred: impl Fn(&Call) -> bool) -> usize {
        let mut script = self.script.lock().unwrap();
        let (matching, rest): (Vec<_>, Vec<_>) =
            script.gates.drain(..).partition(|gate| pred(&gate.call));
        script.gates = rest;
        let released = matching.len();
        for gate in matching {
            let _ = gate.release.send(());
        }
        released
    }

    pub fn release_period(&self, period: PeriodKey) -> usize {
        self.release(|call| call.period == Some(period))
    }

    pub fn release_op(&self, op: Op) -> usize {
        self.release(|call| call.op == op)
    }

    /// Waits until at least `n` calls are parked.
    pub async fn parked_at_least(&self, n: usize) {
        while self.parked() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, op: Op, period: Option<PeriodKey>) -> LedgerResult<()> {
        let call = Call { op, period };
        let gate = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(call);
            if script.hold {
                let (release, wait) = oneshot::channel();
                script.gates.push(Gate { call, release });
                Some(wait)
            } else {
                None
            }
        };
        if let Some(wait) = gate {
            let _ = wait.await;
        }

        if self.script.lock().unwrap().failing.contains(&op) {
            return Err(LedgerError::Server {
                status: 500,
                message: format!("{op:?} unavailable"),
            });
        }
        Ok(())
    }

    async fn aggregate(&self, op: Op, period: PeriodKey) -> LedgerResult<f64> {
        self.enter(op, Some(period)).await?;
        let (balance, income, expense) = self
            .script
            .lock()
            .unwrap()
            .aggregates
            .get(&period)
            .copied()
            .unwrap_or_default();
        Ok(match op {
            Op::Balance => balance,
            Op::Income => income,
            _ => expense,
        })
    }

    async fn report(&self, op: Op, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.enter(op, Some(period)).await?;
        Ok(self
            .script
            .lock()
            .unwrap()
            .reports
            .get(&(op, period))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl RemoteLedger for ScriptedLedger {
    async fn add_transactions(&self, batch: TransactionBatch) -> LedgerResult<BatchAccepted> {
        self.enter(Op::AddTransactions, None).await?;
        let added = batch.len();
        self.script.lock().unwrap().batches.push(batch);
        Ok(BatchAccepted {
            added,
            message: format!("Added {added} transactions successfully"),
        })
    }

    async fn balance(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate(Op::Balance, period).await
    }

    async fn income(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate(Op::Income, period).await
    }

    async fn expense(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate(Op::Expense, period).await
    }

    async fn report_by_month(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.report(Op::ReportByMonth, period).await
    }

    async fn income_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.report(Op::IncomeReport, period).await
    }

    async fn expense_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.report(Op::ExpenseReport, period).await
    }

    async fn filtered_transactions(
        &self,
        _kind: TransactionType,
        _category: Option<Category>,
        period: PeriodKey,
    ) -> LedgerResult<Vec<Transaction>> {
        self.report(Op::Filtered, period).await
    }

    async fn exchange_rate(&self) -> LedgerResult<f64> {
        self.enter(Op::ExchangeRate, None).await?;
        Ok(self.script.lock().unwrap().rate)
    }

    async fn advice(&self, income: &str, expenses: &str, balance: &str) -> LedgerResult<String> {
        self.enter(Op::Advice, None).await?;
        Ok(format!("income {income}, expenses {expenses}, balance {balance}"))
    }
}

pub const JAN: PeriodKey = PeriodKey::Month {
    year: 2024,
    month: 1,
};
pub const FEB: PeriodKey = PeriodKey::Month {
    year: 2024,
    month: 2,
};
pub const MAR: PeriodKey = PeriodKey::Month {
    year: 2024,
    month: 3,
};

pub fn transaction(id: u64, amount: f64, description: &str, is_income: bool) -> Transaction {
    Transaction {
        id,
        amount,
        description: description.to_string(),
        is_income,
        timestamp: 1_709_251_200 * 1_000_000_000,
        date: "2024-03-01 00:00:00".to_string(),
        category: if is_income {
            Category::Salary
        } else {
            Category::Other
        },
    }
}

/// Coordinator on March 2024 for both selectors.
pub fn coordinator(ledger: &Arc<ScriptedLedger>) -> Coordinator {
    Coordinator::with_periods(ledger.clone(), PeriodSelector::starting_at(MAR))
}
