//! Display currencies and the amount converter.
//!
//! The ledger stores every amount in rupiah (the base currency). The user may
//! look at the figures in US dollars (the secondary currency), in which case
//! amounts are divided by the exchange rate fetched once per login session.
//!
//! ```rust
//! use tracker::currency::{convert, Currency, CurrencyState, ExchangeRate};
//!
//! let base = CurrencyState::default();
//! assert_eq!(convert(1_000_000.0, &base), "Rp. 1.000.000");
//!
//! let usd = CurrencyState {
//!     selected: Currency::Usd,
//!     exchange_rate: ExchangeRate::new(15_000.0),
//! };
//! assert_eq!(convert(1_000_000.0, &usd), "$ 66.67");
//! ```

use num_format::{Locale, ToFormattedString as _};

use crate::error::TrackerError;

/// Shown in place of a secondary-currency amount while the rate is unset.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Currency {
    /// Indonesian rupiah, the ledger's native unit.
    #[default]
    Idr,
    /// US dollar.
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Idr => "IDR",
            Currency::Usd => "USD",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Idr => "Rp.",
            Currency::Usd => "$",
        }
    }

    /// Number of fraction digits accepted on input and shown on output.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Idr => 0,
            Currency::Usd => 2,
        }
    }

    /// Returns `true` for the ledger's native unit.
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(self, Currency::Idr)
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = TrackerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IDR" => Ok(Currency::Idr),
            "USD" => Ok(Currency::Usd),
            other => Err(TrackerError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Rupiah for one US dollar. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Returns `None` for zero, negative or non-finite rates, which are
    /// treated as unset.
    #[must_use]
    pub fn new(rate: f64) -> Option<Self> {
        (rate.is_finite() && rate > 0.0).then_some(Self(rate))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Selected display currency plus the rate needed to render it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurrencyState {
    pub selected: Currency,
    pub exchange_rate: Option<ExchangeRate>,
}

impl CurrencyState {
    /// Formats a ledger amount for display. See [`convert`].
    #[must_use]
    pub fn display(&self, amount: f64) -> String {
        convert(amount, self)
    }

    /// Converts an amount typed in the selected currency into ledger units.
    ///
    /// Fails with [`TrackerError::RateUnavailable`] when the selected
    /// currency needs a rate that has not been fetched yet.
    pub fn to_ledger_amount(&self, amount: f64) -> Result<f64, TrackerError> {
        if self.selected.is_base() {
            return Ok(amount);
        }
        let rate = self.exchange_rate.ok_or(TrackerError::RateUnavailable)?;
        Ok(amount * rate.get())
    }
}

/// Renders a ledger amount in the selected currency.
///
/// - base: rounded to whole rupiah with `.` thousands grouping
///   (`Rp. 1.000.000`);
/// - secondary with a rate: `amount / rate` rounded to two decimals
///   (`$ 66.67`);
/// - secondary without a rate: [`LOADING_PLACEHOLDER`].
///
/// Non-finite amounts render as the placeholder as well, never as `NaN`.
#[must_use]
pub fn convert(amount: f64, state: &CurrencyState) -> String {
    if !amount.is_finite() {
        return LOADING_PLACEHOLDER.to_string();
    }

    match state.selected {
        Currency::Idr => format_base(amount),
        Currency::Usd => match state.exchange_rate {
            Some(rate) => format_secondary(amount / rate.get()),
            None => LOADING_PLACEHOLDER.to_string(),
        },
    }
}

fn format_base(amount: f64) -> String {
    let rounded = amount.round() as i64;
    format!(
        "{} {}",
        Currency::Idr.symbol(),
        rounded.to_formatted_string(&Locale::id)
    )
}

fn format_secondary(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    // Avoid printing "-0.00" for tiny negative amounts.
    let value = if cents == 0.0 { 0.0 } else { cents / 100.0 };
    format!("{} {value:.2}", Currency::Usd.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(rate: Option<f64>) -> CurrencyState {
        CurrencyState {
            selected: Currency::Usd,
            exchange_rate: rate.and_then(ExchangeRate::new),
        }
    }

    #[test]
    fn base_uses_dot_grouping_without_decimals() {
        let base = CurrencyState::default();
        assert_eq!(convert(1_000_000.0, &base), "Rp. 1.000.000");
        assert_eq!(convert(999.6, &base), "Rp. 1.000");
        assert_eq!(convert(0.0, &base), "Rp. 0");
        assert_eq!(convert(-25_000.0, &base), "Rp. -25.000");
    }

    #[test]
    fn secondary_divides_and_rounds_to_cents() {
        assert_eq!(convert(1_000_000.0, &usd(Some(15_000.0))), "$ 66.67");
        assert_eq!(convert(15_000.0, &usd(Some(15_000.0))), "$ 1.00");
        assert_eq!(convert(-1.0, &usd(Some(15_000.0))), "$ 0.00");
    }

    #[test]
    fn secondary_without_rate_is_placeholder() {
        assert_eq!(convert(1_000_000.0, &usd(None)), LOADING_PLACEHOLDER);
    }

    #[test]
    fn invalid_rates_are_treated_as_unset() {
        assert!(ExchangeRate::new(0.0).is_none());
        assert!(ExchangeRate::new(-15_000.0).is_none());
        assert!(ExchangeRate::new(f64::NAN).is_none());
        assert_eq!(convert(10.0, &usd(Some(0.0))), LOADING_PLACEHOLDER);
    }

    #[test]
    fn non_finite_amount_never_renders_nan() {
        let base = CurrencyState::default();
        assert_eq!(convert(f64::NAN, &base), LOADING_PLACEHOLDER);
    }

    #[test]
    fn ledger_amount_conversion() {
        assert_eq!(CurrencyState::default().to_ledger_amount(5.0).unwrap(), 5.0);
        assert_eq!(
            usd(Some(15_000.0)).to_ledger_amount(2.5).unwrap(),
            37_500.0
        );
        assert!(matches!(
            usd(None).to_ledger_amount(2.5),
            Err(TrackerError::RateUnavailable)
        ));
    }

    #[test]
    fn currency_codes_parse() {
        assert_eq!(Currency::try_from("usd").unwrap(), Currency::Usd);
        assert!(Currency::try_from("eur").is_err());
    }
}
