mod attachment;
mod bank;
mod category;
mod entry;
mod filter;
mod party;
mod period;
mod summary;

pub use attachment::Attachment;
pub use bank::Bank;
pub use category::{Category, CategoryFilter};
pub use entry::{AccountEntry, AccountEntryWithDetails, EntryType, SearchedEntry, TransactionType};
pub use filter::{EntryFilter, Page, PageRequest, SortOption};
pub use party::Party;
pub use period::{date_to_millis, millis_to_date, now_millis, Period};
pub use summary::{FilteredSummary, SummaryTotals, YearMonth};

#[cfg(test)]
mod tests;
