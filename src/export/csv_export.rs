use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::db::Database;
use crate::models::{millis_to_date, AccountEntryWithDetails, EntryFilter};

const HEADER: [&str; 11] = [
    "id",
    "date",
    "title",
    "description",
    "amount",
    "entry_type",
    "transaction_type",
    "category",
    "party",
    "bank",
    "attachments",
];

/// Write every entry matching `filter` to a CSV file at `path`.
/// Returns the number of entries written.
pub(crate) fn export_entries_csv(db: &Database, filter: &EntryFilter, path: &Path) -> Result<usize> {
    let entries = db
        .get_all_entries(filter)
        .context("Failed to load entries for export")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_entries(file, &entries)?;
    log::info!("exported {count} entries to {}", path.display());
    Ok(count)
}

pub(crate) fn write_entries<W: Write>(out: W, entries: &[AccountEntryWithDetails]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)
        .context("Failed to write CSV header")?;
    for details in entries {
        wtr.write_record(row(details))
            .context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(entries.len())
}

fn row(details: &AccountEntryWithDetails) -> [String; 11] {
    let e = &details.entry;
    let date = millis_to_date(e.transaction_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    [
        e.id.map(|id| id.to_string()).unwrap_or_default(),
        date,
        e.title.clone(),
        e.description.clone().unwrap_or_default(),
        format!("{:.2}", e.amount),
        e.entry_type.to_string(),
        e.transaction_type.to_string(),
        details.category.name.clone(),
        details
            .party
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        details
            .bank
            .as_ref()
            .map(|b| b.name.clone())
            .unwrap_or_default(),
        details.attachments.len().to_string(),
    ]
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
