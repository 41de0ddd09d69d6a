use rusqlite::{params, OptionalExtension};

use super::query::like_pattern;
use super::records::BankRecord;
use super::{name_conflict, not_found, Database};
use crate::error::{Result, StorageContext};
use crate::models::{now_millis, Bank, Page, PageRequest};

impl Database {
    // ── Banks ─────────────────────────────────────────────────

    pub(crate) fn insert_bank(&self, bank: &Bank) -> Result<i64> {
        let rec = BankRecord::from_domain(bank, now_millis());
        self.conn
            .execute(
                "INSERT INTO banks (bank_id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rec.bank_id,
                    rec.name,
                    rec.description,
                    rec.created_at,
                    rec.updated_at,
                ],
            )
            .map_err(|e| name_conflict(e, "bank", &rec.name, "insert bank"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_bank(&self, bank: &Bank) -> Result<()> {
        let rec = BankRecord::from_domain(bank, now_millis());
        let changed = self
            .conn
            .execute(
                "UPDATE banks SET name = ?1, description = ?2, updated_at = ?3 WHERE bank_id = ?4",
                params![rec.name, rec.description, rec.updated_at, rec.bank_id],
            )
            .map_err(|e| name_conflict(e, "bank", &rec.name, "update bank"))?;
        if changed == 0 {
            return Err(not_found("bank", bank.id));
        }
        Ok(())
    }

    /// Delete a bank, detaching it from its entries. Returns how many
    /// entries were detached.
    pub(crate) fn delete_bank(&mut self, id: i64) -> Result<usize> {
        let tx = self.conn.transaction().storage("begin delete bank")?;
        let detached: usize = tx
            .query_row(
                "SELECT COUNT(*) FROM account_entries WHERE fk_bank_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .storage("count bank entries")?;
        let deleted = tx
            .execute("DELETE FROM banks WHERE bank_id = ?1", params![id])
            .storage("delete bank")?;
        if deleted == 0 {
            return Err(not_found("bank", Some(id)));
        }
        tx.commit().storage("commit delete bank")?;
        log::debug!("deleted bank {id}, detached {detached} entries");
        Ok(detached)
    }

    pub(crate) fn get_bank_by_id(&self, id: i64) -> Result<Option<Bank>> {
        let sql = format!("SELECT {} FROM banks WHERE bank_id = ?1", BankRecord::COLUMNS);
        let rec = self
            .conn
            .query_row(&sql, params![id], |row| BankRecord::from_row(row, ""))
            .optional()
            .storage("load bank")?;
        Ok(rec.map(Bank::from))
    }

    pub(crate) fn get_banks(&self, query: &str, page: PageRequest) -> Result<Page<Bank>> {
        let sql = format!(
            "SELECT {} FROM banks
             WHERE (?1 = '' OR name LIKE ?2 ESCAPE '\\')
             ORDER BY created_at DESC, bank_id DESC
             LIMIT ?3 OFFSET ?4",
            BankRecord::COLUMNS
        );
        let query = query.trim();
        let mut stmt = self.conn.prepare(&sql).storage("prepare banks")?;
        let rows = stmt
            .query_map(
                params![query, like_pattern(query), page.limit, page.offset],
                |row| BankRecord::from_row(row, ""),
            )
            .storage("load banks")?;
        let items = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode banks")?;
        Ok(Page {
            items: items.into_iter().map(Bank::from).collect(),
            offset: page.offset,
            limit: page.limit,
        })
    }
}
