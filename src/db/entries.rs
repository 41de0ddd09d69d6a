use rusqlite::{params, OptionalExtension};

use super::query::{entry_where, fts_match_expression, order_by, ENTRY_DETAILS_SELECT};
use super::records::{EntryDetailsRecord, EntryRecord};
use super::{not_found, Database};
use crate::error::{LedgerError, Rejection, Result, StorageContext};
use crate::models::*;

impl Database {
    // ── Account entries ───────────────────────────────────────

    pub(crate) fn insert_entry(&self, entry: &AccountEntry) -> Result<i64> {
        let rec = EntryRecord::from_domain(entry, now_millis())?;
        self.check_references(&rec)?;
        self.conn
            .execute(
                "INSERT INTO account_entries (entry_id, title, description, amount, entry_type,
                    transaction_type, transaction_date, fk_party_id, fk_category_id, fk_bank_id,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    rec.entry_id,
                    rec.title,
                    rec.description,
                    rec.amount,
                    rec.entry_type,
                    rec.transaction_type,
                    rec.transaction_date,
                    rec.fk_party_id,
                    rec.fk_category_id,
                    rec.fk_bank_id,
                    rec.created_at,
                    rec.updated_at,
                ],
            )
            .storage("insert entry")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Rewrite every field of an existing entry except `created_at`.
    pub(crate) fn update_entry(&self, entry: &AccountEntry) -> Result<()> {
        let rec = EntryRecord::from_domain(entry, now_millis())?;
        self.check_references(&rec)?;
        let changed = self
            .conn
            .execute(
                "UPDATE account_entries
                 SET title = ?1, description = ?2, amount = ?3, entry_type = ?4,
                     transaction_type = ?5, transaction_date = ?6, fk_party_id = ?7,
                     fk_category_id = ?8, fk_bank_id = ?9, updated_at = ?10
                 WHERE entry_id = ?11",
                params![
                    rec.title,
                    rec.description,
                    rec.amount,
                    rec.entry_type,
                    rec.transaction_type,
                    rec.transaction_date,
                    rec.fk_party_id,
                    rec.fk_category_id,
                    rec.fk_bank_id,
                    rec.updated_at,
                    rec.entry_id,
                ],
            )
            .storage("update entry")?;
        if changed == 0 {
            return Err(not_found("entry", entry.id));
        }
        Ok(())
    }

    /// Delete an entry together with its attachments.
    pub(crate) fn delete_entry(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM account_entries WHERE entry_id = ?1", params![id])
            .storage("delete entry")?;
        if deleted == 0 {
            return Err(not_found("entry", Some(id)));
        }
        Ok(())
    }

    fn check_references(&self, rec: &EntryRecord) -> Result<()> {
        let checks = [
            ("category", "categories", "category_id", Some(rec.fk_category_id)),
            ("party", "parties", "party_id", rec.fk_party_id),
            ("bank", "banks", "bank_id", rec.fk_bank_id),
        ];
        for (kind, table, column, id) in checks {
            let Some(id) = id else { continue };
            let exists: bool = self
                .conn
                .query_row(
                    &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {column} = ?1)"),
                    params![id],
                    |row| row.get(0),
                )
                .storage("check entry references")?;
            if !exists {
                return Err(LedgerError::Rejected(Rejection::MissingReference { kind, id }));
            }
        }
        Ok(())
    }

    pub(crate) fn get_entry(&self, id: i64) -> Result<Option<AccountEntry>> {
        let sql = format!(
            "SELECT {} FROM account_entries WHERE entry_id = ?1",
            EntryRecord::COLUMNS
        );
        let rec = self
            .conn
            .query_row(&sql, params![id], |row| EntryRecord::from_row(row, ""))
            .optional()
            .storage("load entry")?;
        Ok(rec.map(AccountEntry::from))
    }

    pub(crate) fn get_entry_with_details(
        &self,
        id: i64,
    ) -> Result<Option<AccountEntryWithDetails>> {
        let sql = format!("{ENTRY_DETAILS_SELECT} WHERE ae.entry_id = ?1");
        let rec = self
            .conn
            .query_row(&sql, params![id], EntryDetailsRecord::from_row)
            .optional()
            .storage("load entry details")?;
        let Some(rec) = rec else {
            return Ok(None);
        };
        let attachments = self.get_attachments_for_entry(id)?;
        Ok(Some(rec.into_details(attachments)))
    }

    /// One page of entries matching `filter`, in the filter's sort order.
    pub(crate) fn get_entries(
        &self,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<AccountEntryWithDetails>> {
        let items = self.load_details(filter, Some(page))?;
        Ok(Page {
            items,
            offset: page.offset,
            limit: page.limit,
        })
    }

    /// Every entry matching `filter`, unpaged.
    pub(crate) fn get_all_entries(
        &self,
        filter: &EntryFilter,
    ) -> Result<Vec<AccountEntryWithDetails>> {
        self.load_details(filter, None)
    }

    pub(crate) fn count_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let w = entry_where(filter);
        let sql = format!("SELECT COUNT(*) FROM account_entries ae WHERE 1=1{}", w.clause);
        let count: i64 = self
            .conn
            .query_row(&sql, w.params_ref().as_slice(), |row| row.get(0))
            .storage("count entries")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Lazily walk the pages of `filter`, `page_size` entries at a time.
    pub(crate) fn entry_pages(&self, filter: EntryFilter, page_size: u32) -> EntryPager<'_> {
        EntryPager {
            db: self,
            filter,
            next: Some(PageRequest::first(page_size)),
        }
    }

    fn load_details(
        &self,
        filter: &EntryFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<AccountEntryWithDetails>> {
        let w = entry_where(filter);
        let mut sql = format!("{ENTRY_DETAILS_SELECT} WHERE 1=1{}", w.clause);
        sql.push_str(order_by(filter.sort));
        if let Some(p) = page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", p.limit, p.offset));
        }
        log::debug!("entry query with {} filters: {}", filter.count(), sql);

        let mut stmt = self.conn.prepare(&sql).storage("prepare entries")?;
        let rows = stmt
            .query_map(w.params_ref().as_slice(), EntryDetailsRecord::from_row)
            .storage("load entries")?;
        let records = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode entries")?;

        let ids: Vec<i64> = records.iter().filter_map(|r| r.entry.entry_id).collect();
        let mut attachments = self.attachments_for_entries(&ids)?;
        Ok(records
            .into_iter()
            .map(|rec| {
                let files = rec
                    .entry
                    .entry_id
                    .and_then(|id| attachments.remove(&id))
                    .unwrap_or_default();
                rec.into_details(files)
            })
            .collect())
    }

    /// Full-text search over entry titles and descriptions. Every word must
    /// match the start of some indexed word, ignoring case.
    pub(crate) fn search_entries(&self, text: &str) -> Result<Vec<SearchedEntry>> {
        let Some(expr) = fts_match_expression(text) else {
            return Ok(Vec::new());
        };
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ae.*, c.name AS category_name
                 FROM account_entries_fts
                 JOIN account_entries ae ON ae.entry_id = account_entries_fts.rowid
                 JOIN categories c ON c.category_id = ae.fk_category_id
                 WHERE account_entries_fts MATCH ?1
                 ORDER BY ae.transaction_date DESC, ae.entry_id DESC",
            )
            .storage("prepare search")?;
        let rows = stmt
            .query_map(params![expr], |row| {
                Ok(SearchedEntry {
                    entry: EntryRecord::from_row(row, "")?.into(),
                    category_name: row.get("category_name")?,
                })
            })
            .storage("search entries")?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode search results")
    }
}

/// Iterator over consecutive pages of a filtered entry query. Ends after
/// the first short page; an empty result yields nothing.
pub(crate) struct EntryPager<'a> {
    db: &'a Database,
    filter: EntryFilter,
    next: Option<PageRequest>,
}

impl Iterator for EntryPager<'_> {
    type Item = Result<Page<AccountEntryWithDetails>>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = self.next.take()?;
        match self.db.get_entries(&self.filter, request) {
            Ok(page) => {
                self.next = page.next_offset().map(|_| request.next());
                (!page.is_empty()).then_some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
