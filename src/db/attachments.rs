use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use super::records::AttachmentRecord;
use super::{not_found, Database};
use crate::error::{
    classify, is_foreign_key_violation, LedgerError, Rejection, Result, StorageContext,
};
use crate::models::{now_millis, Attachment};

const UPSERT_ATTACHMENT: &str =
    "INSERT INTO attachments (attachment_id, fk_entry_id, file_path, file_name, mime_type, uploaded_at, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(attachment_id) DO UPDATE SET
        fk_entry_id = excluded.fk_entry_id,
        file_path = excluded.file_path,
        file_name = excluded.file_name,
        mime_type = excluded.mime_type,
        uploaded_at = excluded.uploaded_at";

impl Database {
    // ── Attachments ───────────────────────────────────────────

    pub(crate) fn insert_attachment(&self, attachment: &Attachment) -> Result<i64> {
        let rec = AttachmentRecord::from_domain(attachment, now_millis());
        self.conn
            .execute(
                UPSERT_ATTACHMENT,
                params![
                    rec.attachment_id,
                    rec.fk_entry_id,
                    rec.file_path,
                    rec.file_name,
                    rec.mime_type,
                    rec.uploaded_at,
                    rec.created_at,
                ],
            )
            .map_err(|e| missing_entry(e, rec.fk_entry_id))?;
        Ok(rec.attachment_id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    /// Insert or replace a batch of attachments in one transaction.
    /// Returns the stored ids in input order.
    pub(crate) fn upsert_attachments(&mut self, attachments: &[Attachment]) -> Result<Vec<i64>> {
        let now = now_millis();
        let tx = self.conn.transaction().storage("begin attachments")?;
        let mut ids = Vec::with_capacity(attachments.len());
        {
            let mut stmt = tx.prepare(UPSERT_ATTACHMENT).storage("prepare attachments")?;
            for attachment in attachments {
                let rec = AttachmentRecord::from_domain(attachment, now);
                stmt.execute(params![
                    rec.attachment_id,
                    rec.fk_entry_id,
                    rec.file_path,
                    rec.file_name,
                    rec.mime_type,
                    rec.uploaded_at,
                    rec.created_at,
                ])
                .map_err(|e| missing_entry(e, rec.fk_entry_id))?;
                ids.push(rec.attachment_id.unwrap_or_else(|| tx.last_insert_rowid()));
            }
        }
        tx.commit().storage("commit attachments")?;
        log::debug!("upserted {} attachments", ids.len());
        Ok(ids)
    }

    pub(crate) fn get_attachment(&self, id: i64) -> Result<Option<Attachment>> {
        let sql = format!(
            "SELECT {} FROM attachments WHERE attachment_id = ?1",
            AttachmentRecord::COLUMNS
        );
        let rec = self
            .conn
            .query_row(&sql, params![id], AttachmentRecord::from_row)
            .optional()
            .storage("load attachment")?;
        Ok(rec.map(Attachment::from))
    }

    pub(crate) fn get_attachments_for_entry(&self, entry_id: i64) -> Result<Vec<Attachment>> {
        Ok(self
            .attachments_for_entries(&[entry_id])?
            .remove(&entry_id)
            .unwrap_or_default())
    }

    /// Attachments grouped by entry id, each group ordered by id.
    pub(crate) fn attachments_for_entries(
        &self,
        entry_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Attachment>>> {
        let mut grouped: HashMap<i64, Vec<Attachment>> = HashMap::new();
        if entry_ids.is_empty() {
            return Ok(grouped);
        }
        let placeholders: String = (0..entry_ids.len())
            .map(|i| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "SELECT {} FROM attachments WHERE fk_entry_id IN ({placeholders})
             ORDER BY attachment_id",
            AttachmentRecord::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql).storage("prepare attachments")?;
        let rows = stmt
            .query_map(params_from_iter(entry_ids.iter()), AttachmentRecord::from_row)
            .storage("load attachments")?;
        for rec in rows {
            let rec = rec.storage("decode attachment")?;
            grouped
                .entry(rec.fk_entry_id)
                .or_default()
                .push(Attachment::from(rec));
        }
        Ok(grouped)
    }

    pub(crate) fn delete_attachment(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM attachments WHERE attachment_id = ?1", params![id])
            .storage("delete attachment")?;
        if deleted == 0 {
            return Err(not_found("attachment", Some(id)));
        }
        Ok(())
    }

    /// Delete every attachment in `ids`; unknown ids are skipped. Returns
    /// the number removed.
    pub(crate) fn delete_attachments(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders: String = (0..ids.len())
            .map(|i| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!("DELETE FROM attachments WHERE attachment_id IN ({placeholders})");
        self.conn
            .execute(&sql, params_from_iter(ids.iter()))
            .storage("delete attachments")
    }
}

fn missing_entry(err: rusqlite::Error, entry_id: i64) -> LedgerError {
    if is_foreign_key_violation(&err) {
        LedgerError::Rejected(Rejection::MissingReference {
            kind: "entry",
            id: entry_id,
        })
    } else {
        classify(err, "store attachment")
    }
}
