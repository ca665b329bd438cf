use api_types::transaction::TransactionType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracker::Currency;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Identity forwarded to the ledger; empty means anonymous.
    pub principal: String,
    pub level: String,
    pub bind: String,
    pub port: u16,
    /// Rupiah per dollar served by `serve`.
    pub exchange_rate: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            principal: String::new(),
            level: "info".to_string(),
            bind: "127.0.0.1".to_string(),
            port: 3000,
            exchange_rate: engine::DEFAULT_EXCHANGE_RATE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "finance_tracker", about = "Personal income and expense tracker")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override ledger base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override principal sent to the ledger.
    #[arg(long, global = true)]
    principal: Option<String>,
    /// Override log level.
    #[arg(long, global = true)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the reference ledger service.
    Serve,
    /// Balance, income and expense for a month.
    Dashboard(DashboardArgs),
    /// Report figures and transactions for a month.
    Report(ReportArgs),
    /// Filtered transaction history.
    History(HistoryArgs),
    /// Record a batch of transactions.
    Record(RecordArgs),
    /// Ask for advice on the all-time figures.
    Advice(DisplayArgs),
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    #[arg(long, value_enum, default_value_t = CurrencyArg::Idr)]
    pub currency: CurrencyArg,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// `YYYY-MM`; defaults to the current month.
    #[arg(long)]
    pub month: Option<String>,
    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// `YYYY-MM`, or an empty string for all time; defaults to the current month.
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,
    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// `YYYY-MM`, or an empty string for all time; defaults to the current month.
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,
    /// Category wire name (e.g. `foods_drinks`).
    #[arg(long)]
    pub category: Option<String>,
    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// `AMOUNT:DESCRIPTION:CATEGORY:income|expense[:YYYY-MM-DD]`, repeatable.
    #[arg(long = "entry", required = true)]
    pub entries: Vec<String>,
    /// Currency the amounts are typed in.
    #[arg(long, value_enum, default_value_t = CurrencyArg::Idr)]
    pub currency: CurrencyArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CurrencyArg {
    Idr,
    Usd,
}

impl From<CurrencyArg> for Currency {
    fn from(value: CurrencyArg) -> Self {
        match value {
            CurrencyArg::Idr => Currency::Idr,
            CurrencyArg::Usd => Currency::Usd,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    All,
    Income,
    Expense,
}

impl From<KindArg> for TransactionType {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::All => TransactionType::All,
            KindArg::Income => TransactionType::Income,
            KindArg::Expense => TransactionType::Expense,
        }
    }
}

/// Parses the command line and layers defaults, the config file,
/// `FINANCE_TRACKER_*` environment variables and CLI overrides.
pub fn load() -> Result<(AppConfig, Command)> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINANCE_TRACKER"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(principal) = cli.principal {
        settings.principal = principal;
    }
    if let Some(level) = cli.level {
        settings.level = level;
    }

    Ok((settings, cli.command))
}
