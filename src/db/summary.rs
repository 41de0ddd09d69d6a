use super::query::entry_where;
use super::records::from_minor_units;
use super::Database;
use crate::error::{classify, LedgerError, Rejection, Result, StorageContext};
use crate::models::*;

impl Database {
    // ── Aggregation ───────────────────────────────────────────

    /// Income, expense and balance over the filtered entries, summed by
    /// SQLite in one statement. No matching rows gives all zeros.
    pub(crate) fn summary_totals(&self, filter: &EntryFilter) -> Result<SummaryTotals> {
        let w = entry_where(filter);
        let sql = format!(
            "SELECT
                COALESCE(SUM(CASE WHEN ae.transaction_type = 'INCOME' THEN ae.amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN ae.transaction_type = 'EXPENSE' THEN ae.amount ELSE 0 END), 0)
             FROM account_entries ae
             WHERE 1=1{}",
            w.clause
        );
        let (income, expenses): (i64, i64) = self
            .conn
            .query_row(&sql, w.params_ref().as_slice(), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg == "integer overflow" => {
                    LedgerError::Rejected(Rejection::InvalidAmount(
                        "sum of matching entries".to_string(),
                    ))
                }
                e => classify(e, "summarize entries"),
            })?;
        Ok(SummaryTotals::new(
            from_minor_units(income),
            from_minor_units(expenses),
        ))
    }

    pub(crate) fn filtered_summary(&self, filter: &EntryFilter) -> Result<FilteredSummary> {
        Ok(FilteredSummary {
            entries: self.get_all_entries(filter)?,
            totals: self.summary_totals(filter)?,
        })
    }

    /// Months that have at least one entry, most recent first. Dates are
    /// divided as reals so instants before 1970 floor to the right second.
    pub(crate) fn distinct_year_months(&self) -> Result<Vec<YearMonth>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT DISTINCT strftime('%Y-%m', transaction_date / 1000.0, 'unixepoch') AS ym
                 FROM account_entries
                 WHERE ym IS NOT NULL
                 ORDER BY ym DESC",
            )
            .storage("prepare year-months")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .storage("load year-months")?;
        let mut months = Vec::new();
        for ym in rows {
            let ym = ym.storage("decode year-month")?;
            match ym.parse::<YearMonth>() {
                Ok(m) => months.push(m),
                Err(e) => log::warn!("skipping unreadable month '{ym}': {e}"),
            }
        }
        Ok(months)
    }

    /// Years that have at least one entry, most recent first.
    pub(crate) fn distinct_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT DISTINCT CAST(strftime('%Y', transaction_date / 1000.0, 'unixepoch') AS INTEGER) AS y
                 FROM account_entries
                 WHERE y IS NOT NULL
                 ORDER BY y DESC",
            )
            .storage("prepare years")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, i32>(0))
            .storage("load years")?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode years")
    }
}
