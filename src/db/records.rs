//! Stored-row shapes and the conversions between them and the domain
//! models. Everything here is pure: the only "effect" is stamping
//! `created_at`/`updated_at` from the `now` the caller passes in.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::Rejection;
use crate::models::*;

impl ToSql for EntryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EntryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        EntryType::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown entry type '{s}'").into()))
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        TransactionType::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown transaction type '{s}'").into()))
    }
}

/// A row is new when its identity has not been assigned yet.
pub(crate) fn is_new(id: Option<i64>) -> bool {
    matches!(id, None | Some(0))
}

/// (created_at, updated_at) for a write happening at `now`.
fn stamps(id: Option<i64>, created_at: i64, now: i64) -> (i64, i64) {
    if is_new(id) {
        (now, now)
    } else {
        (created_at, now)
    }
}

pub(crate) fn to_minor_units(amount: Decimal) -> Result<i64, Rejection> {
    amount
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|d| d.to_i64())
        .ok_or_else(|| Rejection::InvalidAmount(amount.to_string()))
}

pub(crate) fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

fn col(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}")
}

// ── Party ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartyRecord {
    pub(crate) party_id: Option<i64>,
    pub(crate) name: String,
    pub(crate) contact_number: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl PartyRecord {
    pub(crate) const COLUMNS: &'static str =
        "party_id, name, contact_number, description, address, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            party_id: row.get(col(prefix, "party_id").as_str())?,
            name: row.get(col(prefix, "name").as_str())?,
            contact_number: row.get(col(prefix, "contact_number").as_str())?,
            description: row.get(col(prefix, "description").as_str())?,
            address: row.get(col(prefix, "address").as_str())?,
            created_at: row.get(col(prefix, "created_at").as_str())?,
            updated_at: row.get(col(prefix, "updated_at").as_str())?,
        })
    }

    pub(crate) fn from_domain(party: &Party, now: i64) -> Self {
        let (created_at, updated_at) = stamps(party.id, party.created_at, now);
        Self {
            party_id: party.id.filter(|id| *id != 0),
            name: party.name.clone(),
            contact_number: party.contact_number.clone(),
            description: party.description.clone(),
            address: party.address.clone(),
            created_at,
            updated_at,
        }
    }
}

impl From<PartyRecord> for Party {
    fn from(r: PartyRecord) -> Self {
        Party {
            id: r.party_id,
            name: r.name,
            contact_number: r.contact_number,
            description: r.description,
            address: r.address,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Category ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryRecord {
    pub(crate) category_id: Option<i64>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) transaction_type: Option<TransactionType>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl CategoryRecord {
    pub(crate) const COLUMNS: &'static str =
        "category_id, name, description, transaction_type, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            category_id: row.get(col(prefix, "category_id").as_str())?,
            name: row.get(col(prefix, "name").as_str())?,
            description: row.get(col(prefix, "description").as_str())?,
            transaction_type: row.get(col(prefix, "transaction_type").as_str())?,
            created_at: row.get(col(prefix, "created_at").as_str())?,
            updated_at: row.get(col(prefix, "updated_at").as_str())?,
        })
    }

    pub(crate) fn from_domain(category: &Category, now: i64) -> Self {
        let (created_at, updated_at) = stamps(category.id, category.created_at, now);
        Self {
            category_id: category.id.filter(|id| *id != 0),
            name: category.name.clone(),
            description: category.description.clone(),
            transaction_type: category.transaction_type,
            created_at,
            updated_at,
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Category {
            id: r.category_id,
            name: r.name,
            description: r.description,
            transaction_type: r.transaction_type,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Bank ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BankRecord {
    pub(crate) bank_id: Option<i64>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl BankRecord {
    pub(crate) const COLUMNS: &'static str = "bank_id, name, description, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            bank_id: row.get(col(prefix, "bank_id").as_str())?,
            name: row.get(col(prefix, "name").as_str())?,
            description: row.get(col(prefix, "description").as_str())?,
            created_at: row.get(col(prefix, "created_at").as_str())?,
            updated_at: row.get(col(prefix, "updated_at").as_str())?,
        })
    }

    pub(crate) fn from_domain(bank: &Bank, now: i64) -> Self {
        let (created_at, updated_at) = stamps(bank.id, bank.created_at, now);
        Self {
            bank_id: bank.id.filter(|id| *id != 0),
            name: bank.name.clone(),
            description: bank.description.clone(),
            created_at,
            updated_at,
        }
    }
}

impl From<BankRecord> for Bank {
    fn from(r: BankRecord) -> Self {
        Bank {
            id: r.bank_id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Account entry ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryRecord {
    pub(crate) entry_id: Option<i64>,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    /// Hundredths of the currency unit.
    pub(crate) amount: i64,
    pub(crate) entry_type: EntryType,
    pub(crate) transaction_type: TransactionType,
    pub(crate) transaction_date: i64,
    pub(crate) fk_party_id: Option<i64>,
    pub(crate) fk_category_id: i64,
    pub(crate) fk_bank_id: Option<i64>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl EntryRecord {
    pub(crate) const COLUMNS: &'static str = "entry_id, title, description, amount, entry_type, \
         transaction_type, transaction_date, fk_party_id, fk_category_id, fk_bank_id, \
         created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Self> {
        Ok(Self {
            entry_id: row.get(col(prefix, "entry_id").as_str())?,
            title: row.get(col(prefix, "title").as_str())?,
            description: row.get(col(prefix, "description").as_str())?,
            amount: row.get(col(prefix, "amount").as_str())?,
            entry_type: row.get(col(prefix, "entry_type").as_str())?,
            transaction_type: row.get(col(prefix, "transaction_type").as_str())?,
            transaction_date: row.get(col(prefix, "transaction_date").as_str())?,
            fk_party_id: row.get(col(prefix, "fk_party_id").as_str())?,
            fk_category_id: row.get(col(prefix, "fk_category_id").as_str())?,
            fk_bank_id: row.get(col(prefix, "fk_bank_id").as_str())?,
            created_at: row.get(col(prefix, "created_at").as_str())?,
            updated_at: row.get(col(prefix, "updated_at").as_str())?,
        })
    }

    pub(crate) fn from_domain(entry: &AccountEntry, now: i64) -> Result<Self, Rejection> {
        let (created_at, updated_at) = stamps(entry.id, entry.created_at, now);
        Ok(Self {
            entry_id: entry.id.filter(|id| *id != 0),
            title: entry.title.clone(),
            description: entry.description.clone(),
            amount: to_minor_units(entry.amount)?,
            entry_type: entry.entry_type,
            transaction_type: entry.transaction_type,
            transaction_date: entry.transaction_date,
            fk_party_id: entry.party_id,
            fk_category_id: entry.category_id,
            fk_bank_id: entry.bank_id,
            created_at,
            updated_at,
        })
    }
}

impl From<EntryRecord> for AccountEntry {
    fn from(r: EntryRecord) -> Self {
        AccountEntry {
            id: r.entry_id,
            title: r.title,
            description: r.description,
            amount: from_minor_units(r.amount),
            entry_type: r.entry_type,
            transaction_type: r.transaction_type,
            transaction_date: r.transaction_date,
            category_id: r.fk_category_id,
            party_id: r.fk_party_id,
            bank_id: r.fk_bank_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Attachment ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttachmentRecord {
    pub(crate) attachment_id: Option<i64>,
    pub(crate) fk_entry_id: i64,
    pub(crate) file_path: String,
    pub(crate) file_name: Option<String>,
    pub(crate) mime_type: Option<String>,
    pub(crate) uploaded_at: Option<i64>,
    pub(crate) created_at: i64,
}

impl AttachmentRecord {
    pub(crate) const COLUMNS: &'static str =
        "attachment_id, fk_entry_id, file_path, file_name, mime_type, uploaded_at, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            attachment_id: row.get("attachment_id")?,
            fk_entry_id: row.get("fk_entry_id")?,
            file_path: row.get("file_path")?,
            file_name: row.get("file_name")?,
            mime_type: row.get("mime_type")?,
            uploaded_at: row.get("uploaded_at")?,
            created_at: row.get("created_at")?,
        })
    }

    pub(crate) fn from_domain(attachment: &Attachment, now: i64) -> Self {
        let created_at = if is_new(attachment.id) {
            now
        } else {
            attachment.created_at
        };
        Self {
            attachment_id: attachment.id.filter(|id| *id != 0),
            fk_entry_id: attachment.entry_id,
            file_path: attachment.file_path.clone(),
            file_name: attachment.file_name.clone(),
            mime_type: attachment.mime_type.clone(),
            uploaded_at: attachment.uploaded_at,
            created_at,
        }
    }
}

impl From<AttachmentRecord> for Attachment {
    fn from(r: AttachmentRecord) -> Self {
        Attachment {
            id: r.attachment_id,
            entry_id: r.fk_entry_id,
            file_path: r.file_path,
            file_name: r.file_name,
            mime_type: r.mime_type,
            uploaded_at: r.uploaded_at,
            created_at: r.created_at,
        }
    }
}

// ── Joined projections ────────────────────────────────────────

/// One row of the entry/category/party/bank join. Attachments are loaded
/// separately and merged by the caller.
pub(crate) struct EntryDetailsRecord {
    pub(crate) entry: EntryRecord,
    pub(crate) category: CategoryRecord,
    pub(crate) party: Option<PartyRecord>,
    pub(crate) bank: Option<BankRecord>,
}

impl EntryDetailsRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let party_id: Option<i64> = row.get("party_party_id")?;
        let bank_id: Option<i64> = row.get("bank_bank_id")?;
        Ok(Self {
            entry: EntryRecord::from_row(row, "")?,
            category: CategoryRecord::from_row(row, "category_")?,
            party: party_id
                .map(|_| PartyRecord::from_row(row, "party_"))
                .transpose()?,
            bank: bank_id
                .map(|_| BankRecord::from_row(row, "bank_"))
                .transpose()?,
        })
    }

    pub(crate) fn into_details(self, attachments: Vec<Attachment>) -> AccountEntryWithDetails {
        AccountEntryWithDetails {
            entry: self.entry.into(),
            category: self.category.into(),
            party: self.party.map(Party::from),
            bank: self.bank.map(Bank::from),
            attachments,
        }
    }
}
