//! Financial advice composed from the figures the client displays.
//!
//! The client sends its report totals already formatted in the currency the
//! user is looking at (`Rp. 1.250.000` or `$ 78.13`), so the figures are
//! parsed back before comparing them.

use api_types::ledger::AdviceRequest;

use crate::{EngineError, ResultEngine};

/// Share of income above which spending is flagged as high.
const HIGH_SPENDING_RATIO: f64 = 0.8;

/// Composes the advice text for the given totals.
pub fn compose(request: &AdviceRequest) -> ResultEngine<String> {
    let income = parse_display_amount(&request.total_income)?;
    let expenses = parse_display_amount(&request.total_expenses)?;
    let balance = parse_display_amount(&request.balance)?;

    let mut advice = format!(
        "Total income {}, total expenses {}, current balance {}.",
        request.total_income.trim(),
        request.total_expenses.trim(),
        request.balance.trim()
    );

    if income <= 0.0 && expenses <= 0.0 {
        advice.push_str(
            " No transactions recorded yet: start by logging your income and daily spending so trends become visible.",
        );
        return Ok(advice);
    }

    if expenses > income {
        advice.push_str(
            " You are spending more than you earn. Review the largest expense categories and set a monthly cap for non-essentials such as snacks and shopping.",
        );
    } else if expenses > income * HIGH_SPENDING_RATIO {
        advice.push_str(
            " Your expenses take most of your income. Aim to keep spending under 80% of income and move the difference into savings at the start of each month.",
        );
    } else {
        advice.push_str(
            " Your spending is under control. Consider building an emergency fund of three to six months of expenses and investing part of the surplus.",
        );
    }

    if balance < 0.0 {
        advice.push_str(" Your balance is negative: prioritise paying it back before new discretionary purchases.");
    }

    Ok(advice)
}

/// Parses a display amount back into a number.
///
/// Rupiah amounts use `.` as thousands separator and `,` as decimal mark;
/// dollar amounts use `.` as decimal mark.
fn parse_display_amount(raw: &str) -> ResultEngine<f64> {
    let trimmed = raw.trim();
    let missing = || EngineError::Advice(format!("unreadable amount: {trimmed:?}"));

    let (rest, rupiah) = if let Some(rest) = trimmed.strip_prefix("Rp.") {
        (rest, true)
    } else if let Some(rest) = trimmed.strip_prefix("Rp") {
        (rest, true)
    } else if let Some(rest) = trimmed.strip_prefix('$') {
        (rest, false)
    } else {
        (trimmed, false)
    };

    let rest = rest.trim().trim_start_matches('+');
    if rest.is_empty() {
        return Err(missing());
    }

    let normalized = if rupiah {
        rest.replace('.', "").replace(',', ".")
    } else {
        rest.replace(',', "")
    };

    normalized.parse::<f64>().map_err(|_| missing())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(income: &str, expenses: &str, balance: &str) -> AdviceRequest {
        AdviceRequest {
            total_income: income.to_string(),
            total_expenses: expenses.to_string(),
            balance: balance.to_string(),
        }
    }

    #[test]
    fn parses_rupiah_and_dollar_amounts() {
        assert_eq!(parse_display_amount("Rp. 1.250.000").unwrap(), 1_250_000.0);
        assert_eq!(parse_display_amount("Rp. -2.000").unwrap(), -2_000.0);
        assert_eq!(parse_display_amount("$ 78.13").unwrap(), 78.13);
        assert!(parse_display_amount("Loading...").is_err());
    }

    #[test]
    fn overspending_is_flagged() {
        let advice = compose(&request("Rp. 1.000", "Rp. 2.000", "Rp. -1.000")).unwrap();
        assert!(advice.contains("spending more than you earn"));
        assert!(advice.contains("balance is negative"));
    }

    #[test]
    fn healthy_budget_suggests_saving() {
        let advice = compose(&request("$ 100.00", "$ 20.00", "$ 80.00")).unwrap();
        assert!(advice.contains("under control"));
    }

    #[test]
    fn placeholder_figures_are_rejected() {
        let err = compose(&request("Loading...", "Loading...", "Loading...")).unwrap_err();
        assert!(matches!(err, EngineError::Advice(_)));
    }
}
