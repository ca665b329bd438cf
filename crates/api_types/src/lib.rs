use serde::{Deserialize, Serialize};

/// Transaction category.
///
/// Serialized with the snake_case names the ledger stores
/// (`salary`, `side_job`, `foods_drinks`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    SideJob,
    Bonus,
    Honorarium,
    Snacks,
    FoodsDrinks,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Salary,
        Self::SideJob,
        Self::Bonus,
        Self::Honorarium,
        Self::Snacks,
        Self::FoodsDrinks,
        Self::Shopping,
        Self::Other,
    ];

    /// Returns the canonical category string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::SideJob => "side_job",
            Self::Bonus => "bonus",
            Self::Honorarium => "honorarium",
            Self::Snacks => "snacks",
            Self::FoodsDrinks => "foods_drinks",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::SideJob => "Side Job",
            Self::Bonus => "Bonus",
            Self::Honorarium => "Honorarium",
            Self::Snacks => "Snacks",
            Self::FoodsDrinks => "Foods & Drinks",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }

    /// Whether the category can be recorded for an income (`true`) or an
    /// expense (`false`) entry. `Other` fits both.
    pub fn allowed_for(self, is_income: bool) -> bool {
        match self {
            Self::Salary | Self::SideJob | Self::Bonus | Self::Honorarium => is_income,
            Self::Snacks | Self::FoodsDrinks | Self::Shopping => !is_income,
            Self::Other => true,
        }
    }

    /// Parses a wire name, ignoring ASCII case and surrounding whitespace.
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod ledger {
    use super::*;

    /// Period scope of an aggregate or report query.
    ///
    /// `year_month` is `YYYY-MM`; the empty string means "all time".
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PeriodQuery {
        pub year_month: String,
    }

    /// A single numeric summary (balance, income or expense).
    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Aggregate {
        pub value: f64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExchangeRateResponse {
        /// Rupiah for one US dollar.
        pub rate: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AdviceRequest {
        pub total_income: String,
        pub total_expenses: String,
        pub balance: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AdviceResponse {
        pub advice: String,
    }
}

pub mod transaction {
    use super::*;

    /// A transaction as accepted and stored by the ledger.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Transaction {
        /// Assigned by the ledger on acceptance.
        pub id: u64,
        pub amount: f64,
        pub description: String,
        pub is_income: bool,
        /// Nanoseconds since the Unix epoch.
        pub timestamp: u64,
        /// `YYYY-MM-DD HH:MM:SS`, UTC.
        pub date: String,
        pub category: Category,
    }

    /// Bulk write request.
    ///
    /// The five sequences are parallel: entry `i` is made of the `i`-th
    /// element of each of them. The ledger rejects batches whose sequences
    /// differ in length or are empty.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct TransactionBatch {
        pub amounts: Vec<f64>,
        pub descriptions: Vec<String>,
        pub categories: Vec<Category>,
        pub is_incomes: Vec<bool>,
        pub timestamps: Vec<u64>,
    }

    impl TransactionBatch {
        pub fn len(&self) -> usize {
            self.amounts.len()
        }

        pub fn is_empty(&self) -> bool {
            self.amounts.is_empty()
        }

        /// Returns `true` when every parallel sequence has the same length.
        pub fn is_aligned(&self) -> bool {
            let len = self.amounts.len();
            self.descriptions.len() == len
                && self.categories.len() == len
                && self.is_incomes.len() == len
                && self.timestamps.len() == len
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BatchAccepted {
        pub added: usize,
        pub message: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<Transaction>,
    }

    /// Type filter of the transaction history query.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        #[default]
        All,
        Income,
        Expense,
    }

    impl TransactionType {
        pub fn matches(self, is_income: bool) -> bool {
            match self {
                Self::All => true,
                Self::Income => is_income,
                Self::Expense => !is_income,
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct FilterQuery {
        pub transaction_type: TransactionType,
        /// `None` matches every category.
        pub category: Option<Category>,
        /// `YYYY-MM`, or empty for all time.
        pub year_month: String,
    }
}
