//! # Currency Module
//!
//! Formatting, parsing and tax for monetary amounts.
//!
//! ## Local Currency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  XAF (CFA Franc, shown as FCFA)                                         │
//! │                                                                         │
//! │  No minor unit in everyday use: prices are whole francs.               │
//! │    4000        → "4,000 FCFA"                                           │
//! │    1250000     → "1,250,000 FCFA"                                       │
//! │                                                                         │
//! │  Any other ISO code keeps two decimals and the code as suffix:         │
//! │    1234.5 EUR  → "1,234.50 EUR"                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are `f64` because inventory quantities are fractional (2.5 m³ of
//! sand) and totals are `quantity × price`. Rounding happens only when a
//! value is formatted for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// ISO 4217 code of the local currency.
pub const XAF: &str = "XAF";

/// Display symbol of the local currency.
pub const FCFA_SYMBOL: &str = "FCFA";

// =============================================================================
// Currency
// =============================================================================

/// A currency as configured for the installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Currency {
    /// ISO 4217 code, e.g. "XAF".
    pub code: String,
    /// Human-readable name, e.g. "CFA Franc".
    pub name: String,
    /// Display symbol, e.g. "FCFA".
    pub symbol: String,
}

impl Currency {
    /// The CFA Franc.
    pub fn xaf() -> Self {
        Currency {
            code: XAF.to_string(),
            name: "CFA Franc".to_string(),
            symbol: FCFA_SYMBOL.to_string(),
        }
    }

    /// Formats `amount` in this currency.
    pub fn format(&self, amount: f64) -> String {
        format_currency(amount, &self.code)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::xaf()
    }
}

// =============================================================================
// Formatting and Parsing
// =============================================================================

/// Formats an amount for display.
///
/// ## Example
/// ```rust
/// use cbpm_core::currency::format_currency;
///
/// assert_eq!(format_currency(1_250_000.0, "XAF"), "1,250,000 FCFA");
/// assert_eq!(format_currency(1234.5, "EUR"), "1,234.50 EUR");
/// ```
pub fn format_currency(amount: f64, currency_code: &str) -> String {
    if currency_code.eq_ignore_ascii_case(XAF) {
        format!("{} {}", group_thousands(amount, 0), FCFA_SYMBOL)
    } else {
        format!("{} {}", group_thousands(amount, 2), currency_code)
    }
}

/// Parses a displayed amount back into a number.
///
/// Everything except digits, `.` and `,` is dropped, then the `,` thousands
/// separators are removed. The sign is dropped with the other symbols.
///
/// ## Example
/// ```rust
/// use cbpm_core::currency::parse_currency;
///
/// assert_eq!(parse_currency("1,250,000 FCFA"), Some(1_250_000.0));
/// assert_eq!(parse_currency("FCFA"), None);
/// ```
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    cleaned.parse::<f64>().ok()
}

/// Renders `amount` with `decimals` places and `,` between thousands groups.
fn group_thousands(amount: f64, decimals: usize) -> String {
    let digits = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    let shows_nonzero = digits.chars().any(|c| c.is_ascii_digit() && c != '0');
    if amount.is_sign_negative() && shows_nonzero {
        grouped.push('-');
    }

    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 && ch.is_ascii_digit() {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    grouped
}

// =============================================================================
// Tax
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1925 bps = 19.25% (Cameroon VAT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage. Negative input clamps to zero.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

/// Result of [`calculate_tax`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown {
    pub subtotal: f64,
    pub tax_amount: f64,
    /// Rate as a percentage (19.25, not 1925).
    pub tax_rate: f64,
    pub total: f64,
}

/// Computes tax on a pre-tax amount.
///
/// ## Example
/// ```rust
/// use cbpm_core::currency::{calculate_tax, TaxRate};
///
/// let tax = calculate_tax(10_000.0, TaxRate::from_percentage(19.25));
/// assert_eq!(tax.tax_amount, 1925.0);
/// assert_eq!(tax.total, 11_925.0);
/// ```
pub fn calculate_tax(amount: f64, rate: TaxRate) -> TaxBreakdown {
    let tax_rate = rate.percentage();
    let tax_amount = amount * (tax_rate / 100.0);

    TaxBreakdown {
        subtotal: amount,
        tax_amount,
        tax_rate,
        total: amount + tax_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
