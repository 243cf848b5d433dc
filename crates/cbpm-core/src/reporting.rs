//! # Reporting
//!
//! Aggregates inventory lines and transactions into summaries for the
//! dashboard and the exports.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::datetime::{self, DEFAULT_DATE_FORMAT};
use crate::types::{InventoryLine, Transaction};

/// Category name for lines with no category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// =============================================================================
// Periods
// =============================================================================

/// Standard report windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl ReportPeriod {
    pub const fn days(&self) -> i64 {
        match self {
            ReportPeriod::Daily => 1,
            ReportPeriod::Weekly => 7,
            ReportPeriod::Monthly => 30,
            ReportPeriod::Quarterly => 90,
            ReportPeriod::Yearly => 365,
        }
    }
}

// =============================================================================
// Inventory Report
// =============================================================================

/// Count and value of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategorySummary {
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryReport {
    pub total_items: usize,
    /// Σ quantity × price
    pub total_value: f64,
    /// Lines below the low-stock threshold, in input order.
    pub low_stock_items: Vec<InventoryLine>,
    pub categories: BTreeMap<String, CategorySummary>,
    pub generated_at: NaiveDateTime,
}

/// Summarizes inventory lines, stamped with the current time.
pub fn inventory_report(lines: &[InventoryLine]) -> InventoryReport {
    inventory_report_at(lines, datetime::now())
}

/// [`inventory_report`] with an explicit generation time.
pub fn inventory_report_at(lines: &[InventoryLine], generated_at: NaiveDateTime) -> InventoryReport {
    let mut categories: BTreeMap<String, CategorySummary> = BTreeMap::new();

    for line in lines {
        let name = line
            .category
            .map(|c| c.as_str())
            .unwrap_or(UNKNOWN_CATEGORY);
        let summary = categories.entry(name.to_string()).or_default();
        summary.count += 1;
        summary.value += line.value();
    }

    InventoryReport {
        total_items: lines.len(),
        total_value: lines.iter().map(InventoryLine::value).sum(),
        low_stock_items: lines.iter().filter(|l| l.is_low_stock()).cloned().collect(),
        categories,
        generated_at,
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, TS)]
#[ts(export)]
pub struct DailySales {
    /// dd/mm/YYYY
    pub date: String,
    pub count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub period_days: i64,
    /// dd/mm/YYYY
    pub start_date: String,
    /// dd/mm/YYYY
    pub end_date: String,
    pub total_transactions: usize,
    pub total_revenue: f64,
    /// 0 when there are no transactions.
    pub average_transaction: f64,
    /// Oldest day first. Serialized as an object keyed by dd/mm/YYYY,
    /// `{"30/03/2025": {"count": 2, "revenue": 1500.0}}`, in the same order.
    #[serde(with = "daily_breakdown")]
    #[ts(type = "Record<string, { count: number, revenue: number }>")]
    pub daily_sales: Vec<DailySales>,
}

impl SalesReport {
    /// Looks up a day by its dd/mm/YYYY key.
    pub fn day(&self, date: &str) -> Option<&DailySales> {
        self.daily_sales.iter().find(|d| d.date == date)
    }
}

/// Summarizes the transactions of the trailing `period_days` ending now.
pub fn sales_report(transactions: &[Transaction], period_days: i64) -> SalesReport {
    sales_report_at(transactions, period_days, datetime::now())
}

/// [`sales_report`] with an explicit end of window.
///
/// The window is `[now - period_days, now]`, both ends included. Rows whose
/// date cannot be parsed are skipped.
///
/// ## Example
/// ```rust
/// use cbpm_core::reporting::sales_report_at;
/// use cbpm_core::datetime::parse_date;
///
/// let now = parse_date("2025-03-31 18:00:00").unwrap();
/// let report = sales_report_at(&[], 30, now);
///
/// assert_eq!(report.start_date, "01/03/2025");
/// assert_eq!(report.end_date, "31/03/2025");
/// assert_eq!(report.average_transaction, 0.0);
/// ```
pub fn sales_report_at(
    transactions: &[Transaction],
    period_days: i64,
    now: NaiveDateTime,
) -> SalesReport {
    let start = datetime::days_before(now, period_days);

    let in_window: Vec<(NaiveDateTime, &Transaction)> = transactions
        .iter()
        .filter_map(|tx| tx.parsed_date().map(|date| (date, tx)))
        .filter(|(date, _)| *date >= start && *date <= now)
        .collect();

    let mut by_day: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for (date, tx) in &in_window {
        let day = by_day.entry(date.date()).or_insert((0, 0.0));
        day.0 += 1;
        day.1 += tx.total_amount;
    }

    let total_transactions = in_window.len();
    let total_revenue: f64 = in_window.iter().map(|(_, tx)| tx.total_amount).sum();
    let average_transaction = if total_transactions == 0 {
        0.0
    } else {
        total_revenue / total_transactions as f64
    };

    SalesReport {
        period_days,
        start_date: datetime::format_date(&start, DEFAULT_DATE_FORMAT),
        end_date: datetime::format_date(&now, DEFAULT_DATE_FORMAT),
        total_transactions,
        total_revenue,
        average_transaction,
        daily_sales: by_day
            .into_iter()
            .map(|(date, (count, revenue))| DailySales {
                date: date.format(DEFAULT_DATE_FORMAT).to_string(),
                count,
                revenue,
            })
            .collect(),
    }
}

/// Per-day breakdown as a date-keyed map, keeping the vector's order.
mod daily_breakdown {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    use super::DailySales;

    #[derive(Serialize, Deserialize)]
    struct DayTotals {
        count: usize,
        revenue: f64,
    }

    pub fn serialize<S: Serializer>(days: &[DailySales], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(days.len()))?;
        for day in days {
            map.serialize_entry(
                &day.date,
                &DayTotals {
                    count: day.count,
                    revenue: day.revenue,
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<DailySales>, D::Error> {
        deserializer.deserialize_map(DaysVisitor)
    }

    struct DaysVisitor;

    impl<'de> Visitor<'de> for DaysVisitor {
        type Value = Vec<DailySales>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of date to daily totals")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut days = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((date, totals)) = access.next_entry::<String, DayTotals>()? {
                days.push(DailySales {
                    date,
                    count: totals.count,
                    revenue: totals.revenue,
                });
            }
            Ok(days)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
