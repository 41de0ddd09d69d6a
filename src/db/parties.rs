use rusqlite::{params, OptionalExtension};

use super::query::like_pattern;
use super::records::PartyRecord;
use super::{not_found, Database};
use crate::error::{Result, StorageContext};
use crate::models::{now_millis, Page, PageRequest, Party};

impl Database {
    // ── Parties ───────────────────────────────────────────────

    pub(crate) fn insert_party(&self, party: &Party) -> Result<i64> {
        let rec = PartyRecord::from_domain(party, now_millis());
        self.conn
            .execute(
                "INSERT INTO parties (party_id, name, contact_number, description, address, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    rec.party_id,
                    rec.name,
                    rec.contact_number,
                    rec.description,
                    rec.address,
                    rec.created_at,
                    rec.updated_at,
                ],
            )
            .storage("insert party")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_party(&self, party: &Party) -> Result<()> {
        let rec = PartyRecord::from_domain(party, now_millis());
        let changed = self
            .conn
            .execute(
                "UPDATE parties
                 SET name = ?1, contact_number = ?2, description = ?3, address = ?4, updated_at = ?5
                 WHERE party_id = ?6",
                params![
                    rec.name,
                    rec.contact_number,
                    rec.description,
                    rec.address,
                    rec.updated_at,
                    rec.party_id,
                ],
            )
            .storage("update party")?;
        if changed == 0 {
            return Err(not_found("party", party.id));
        }
        Ok(())
    }

    /// Delete a party. Entries that referenced it keep existing with no
    /// party; the number of such entries is returned.
    pub(crate) fn delete_party(&mut self, id: i64) -> Result<usize> {
        let tx = self.conn.transaction().storage("begin delete party")?;
        let detached: usize = tx
            .query_row(
                "SELECT COUNT(*) FROM account_entries WHERE fk_party_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .storage("count party entries")?;
        let deleted = tx
            .execute("DELETE FROM parties WHERE party_id = ?1", params![id])
            .storage("delete party")?;
        if deleted == 0 {
            return Err(not_found("party", Some(id)));
        }
        tx.commit().storage("commit delete party")?;
        log::debug!("deleted party {id}, detached {detached} entries");
        Ok(detached)
    }

    pub(crate) fn get_party_by_id(&self, id: i64) -> Result<Option<Party>> {
        let sql = format!("SELECT {} FROM parties WHERE party_id = ?1", PartyRecord::COLUMNS);
        let rec = self
            .conn
            .query_row(&sql, params![id], |row| PartyRecord::from_row(row, ""))
            .optional()
            .storage("load party")?;
        Ok(rec.map(Party::from))
    }

    /// Parties whose name contains `query` (case-insensitive), newest first.
    pub(crate) fn get_parties(&self, query: &str, page: PageRequest) -> Result<Page<Party>> {
        let sql = format!(
            "SELECT {} FROM parties
             WHERE (?1 = '' OR name LIKE ?2 ESCAPE '\\')
             ORDER BY created_at DESC, party_id DESC
             LIMIT ?3 OFFSET ?4",
            PartyRecord::COLUMNS
        );
        let query = query.trim();
        let mut stmt = self.conn.prepare(&sql).storage("prepare parties")?;
        let rows = stmt
            .query_map(
                params![query, like_pattern(query), page.limit, page.offset],
                |row| PartyRecord::from_row(row, ""),
            )
            .storage("load parties")?;
        let items = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode parties")?;
        Ok(Page {
            items: items.into_iter().map(Party::from).collect(),
            offset: page.offset,
            limit: page.limit,
        })
    }
}
