use rust_decimal::Decimal;
use std::str::FromStr;

use super::AccountEntryWithDetails;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

impl SummaryTotals {
    pub fn new(income: Decimal, expenses: Decimal) -> Self {
        Self {
            income,
            expenses,
            balance: income - expenses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSummary {
    pub entries: Vec<AccountEntryWithDetails>,
    pub totals: SummaryTotals,
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("Invalid month '{s}', expected YYYY-MM"))?;
        let year: i32 = y
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid year in '{s}'"))?;
        let month: u32 = m
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid month in '{s}'"))?;
        Self::new(year, month).ok_or_else(|| anyhow::anyhow!("Month out of range in '{s}'"))
    }
}
