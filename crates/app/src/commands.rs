use std::sync::Arc;

use api_types::{Category, transaction::TransactionType};
use chrono::{Local, NaiveDate};
use tracker::{
    Aggregates, Coordinator, Currency, HttpLedger, PeriodKey, ReportFilter, Snapshot,
    TransactionBatchBuilder, TransactionDraft, TransactionList,
};

use crate::{
    config::{AppConfig, DashboardArgs, DisplayArgs, HistoryArgs, RecordArgs, ReportArgs},
    error::{AppError, Result},
};

/// Connects to the ledger and runs the login load.
///
/// A partially failed load is logged and the command goes on with whatever
/// was loaded.
async fn session(config: &AppConfig, currency: Currency) -> Result<Coordinator> {
    let ledger = HttpLedger::new(&config.base_url, &config.principal)?;
    let coordinator = Coordinator::new(Arc::new(ledger));
    coordinator.set_currency(currency).await;

    if let Err(err) = coordinator
        .on_auth_changed(!config.principal.trim().is_empty())
        .await
    {
        tracing::warn!("initial load incomplete: {err}");
    }
    Ok(coordinator)
}

fn period_or_current(month: Option<&str>) -> Result<PeriodKey> {
    match month {
        Some(month) => Ok(month.parse()?),
        None => Ok(PeriodKey::current()),
    }
}

fn period_label(period: PeriodKey) -> String {
    if period.is_all_time() {
        "all time".to_string()
    } else {
        period.to_string()
    }
}

fn print_aggregates(title: &str, snapshot: &Snapshot, aggregates: &Aggregates) {
    println!("{title} ({})", period_label(aggregates.period));
    println!("  Balance: {}", snapshot.display(aggregates.balance));
    println!("  Income:  {}", snapshot.display(aggregates.income));
    println!("  Expense: {}", snapshot.display(aggregates.expense));
}

fn print_transactions(snapshot: &Snapshot, list: &TransactionList) {
    if list.is_empty() {
        println!("  (no transactions)");
        return;
    }
    for tx in &list.transactions {
        let sign = if tx.is_income { '+' } else { '-' };
        println!(
            "  {}  {sign}{}  {}  [{}]",
            tx.date,
            snapshot.display(tx.amount),
            tx.description,
            tx.category.label()
        );
    }
}

pub async fn dashboard(config: &AppConfig, args: DashboardArgs) -> Result<()> {
    let coordinator = session(config, args.display.currency.into()).await?;
    let period = period_or_current(args.month.as_deref())?;
    coordinator.set_dashboard_period(period).await?;

    let snapshot = coordinator.snapshot();
    print_aggregates("Dashboard", &snapshot, &snapshot.dashboard);
    Ok(())
}

pub async fn report(config: &AppConfig, args: ReportArgs) -> Result<()> {
    let coordinator = session(config, args.display.currency.into()).await?;
    let period = period_or_current(args.month.as_deref())?;
    let filter = coordinator.filter().await.with_kind(args.kind.into());
    coordinator.set_report_filter(filter).await?;
    coordinator.set_report_period(period).await?;

    let snapshot = coordinator.snapshot();
    print_aggregates("Report", &snapshot, &snapshot.report);
    println!(
        "Transactions ({}, {})",
        kind_label(snapshot.report_transactions.query.kind),
        period_label(snapshot.report_transactions.query.period)
    );
    print_transactions(&snapshot, &snapshot.report_transactions);
    Ok(())
}

pub async fn history(config: &AppConfig, args: HistoryArgs) -> Result<()> {
    let coordinator = session(config, args.display.currency.into()).await?;
    let category = args
        .category
        .as_deref()
        .map(|raw| {
            Category::from_wire(raw).ok_or_else(|| {
                tracker::TrackerError::Validation(format!("unknown category '{raw}'"))
            })
        })
        .transpose()?;
    let filter = ReportFilter {
        kind: args.kind.into(),
        category,
        history_period: period_or_current(args.month.as_deref())?,
    };
    coordinator.set_report_filter(filter).await?;
    coordinator.open_history().await?;

    let snapshot = coordinator.snapshot();
    println!(
        "History ({}, {})",
        period_label(filter.history_period),
        category.map_or("all categories", Category::label)
    );
    print_transactions(&snapshot, &snapshot.history_transactions);
    Ok(())
}

pub async fn record(config: &AppConfig, args: RecordArgs) -> Result<()> {
    let currency = args.currency.into();
    let today = Local::now().date_naive();

    let mut builder = TransactionBatchBuilder::new();
    for raw in &args.entries {
        builder.add(parse_entry(raw, currency, today)?)?;
    }

    let coordinator = session(config, currency).await?;
    let accepted = builder.submit(&coordinator).await?;
    println!("{}", accepted.message);

    let snapshot = coordinator.snapshot();
    print_aggregates("Dashboard", &snapshot, &snapshot.dashboard);
    Ok(())
}

pub async fn advice(config: &AppConfig, args: DisplayArgs) -> Result<()> {
    let coordinator = session(config, args.currency.into()).await?;
    println!("{}", coordinator.request_advice().await?);
    Ok(())
}

/// Parses `AMOUNT:DESCRIPTION:CATEGORY:income|expense[:YYYY-MM-DD]`.
fn parse_entry(raw: &str, currency: Currency, today: NaiveDate) -> Result<TransactionDraft> {
    let invalid = |reason: &str| AppError::Entry {
        entry: raw.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let (amount, description, category, kind, date) = match parts.as_slice() {
        [amount, description, category, kind] => (*amount, *description, *category, *kind, None),
        [amount, description, category, kind, date] => {
            (*amount, *description, *category, *kind, Some(*date))
        }
        _ => return Err(invalid("expected 4 or 5 ':' separated fields")),
    };

    let is_income = match kind.to_ascii_lowercase().as_str() {
        "income" => true,
        "expense" => false,
        _ => return Err(invalid("type must be 'income' or 'expense'")),
    };
    let date = match date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| invalid("date must be YYYY-MM-DD"))?,
        None => today,
    };

    Ok(TransactionDraft::parse(
        amount,
        currency,
        description,
        category,
        is_income,
        date,
    )?)
}

fn kind_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::All => "all",
        TransactionType::Income => "income",
        TransactionType::Expense => "expense",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn entry_without_date_uses_today() {
        let draft = parse_entry("45000:Coffee:foods_drinks:expense", Currency::Idr, today()).unwrap();
        assert_eq!(draft.amount, 45_000.0);
        assert_eq!(draft.category, Category::FoodsDrinks);
        assert!(!draft.is_income);
        assert_eq!(draft.date, today());
    }

    #[test]
    fn entry_with_date_and_dollars() {
        let draft =
            parse_entry("12.50:Book:shopping:expense:2024-03-02", Currency::Usd, today()).unwrap();
        assert_eq!(draft.amount, 12.5);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(parse_entry("45000:Coffee", Currency::Idr, today()).is_err());
        assert!(parse_entry("45000:Coffee:foods_drinks:gift", Currency::Idr, today()).is_err());
        assert!(parse_entry("45000:Coffee:crypto:expense", Currency::Idr, today()).is_err());
        assert!(parse_entry("45000:Coffee:snacks:expense:03/02", Currency::Idr, today()).is_err());
    }
}
