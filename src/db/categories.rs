use rusqlite::{params, OptionalExtension};

use super::query::like_pattern;
use super::records::CategoryRecord;
use super::{name_conflict, not_found, Database};
use crate::error::{classify, is_foreign_key_violation, LedgerError, Rejection, Result, StorageContext};
use crate::models::{now_millis, Category, CategoryFilter, Page, PageRequest};

impl Database {
    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, category: &Category) -> Result<i64> {
        let rec = CategoryRecord::from_domain(category, now_millis());
        self.conn
            .execute(
                "INSERT INTO categories (category_id, name, description, transaction_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    rec.category_id,
                    rec.name,
                    rec.description,
                    rec.transaction_type,
                    rec.created_at,
                    rec.updated_at,
                ],
            )
            .map_err(|e| name_conflict(e, "category", &rec.name, "insert category"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_category(&self, category: &Category) -> Result<()> {
        let rec = CategoryRecord::from_domain(category, now_millis());
        let changed = self
            .conn
            .execute(
                "UPDATE categories
                 SET name = ?1, description = ?2, transaction_type = ?3, updated_at = ?4
                 WHERE category_id = ?5",
                params![
                    rec.name,
                    rec.description,
                    rec.transaction_type,
                    rec.updated_at,
                    rec.category_id,
                ],
            )
            .map_err(|e| name_conflict(e, "category", &rec.name, "update category"))?;
        if changed == 0 {
            return Err(not_found("category", category.id));
        }
        Ok(())
    }

    /// Delete an unused category. A category still referenced by any entry
    /// is left in place and the call is rejected.
    pub(crate) fn delete_category(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction().storage("begin delete category")?;
        let entries: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM account_entries WHERE fk_category_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .storage("count category entries")?;
        if entries > 0 {
            log::warn!("refusing to delete category {id}: {entries} entries reference it");
            return Err(LedgerError::Rejected(Rejection::CategoryInUse {
                category_id: id,
                entries,
            }));
        }
        let deleted = tx
            .execute("DELETE FROM categories WHERE category_id = ?1", params![id])
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    LedgerError::Rejected(Rejection::CategoryInUse {
                        category_id: id,
                        entries,
                    })
                } else {
                    classify(e, "delete category")
                }
            })?;
        if deleted == 0 {
            return Err(not_found("category", Some(id)));
        }
        tx.commit().storage("commit delete category")?;
        Ok(())
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE category_id = ?1",
            CategoryRecord::COLUMNS
        );
        let rec = self
            .conn
            .query_row(&sql, params![id], |row| CategoryRecord::from_row(row, ""))
            .optional()
            .storage("load category")?;
        Ok(rec.map(Category::from))
    }

    /// The category with exactly this name, ignoring case. A case-exact
    /// match wins over others that differ only in case.
    pub(crate) fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM categories
             WHERE name = ?1 COLLATE NOCASE
             ORDER BY name = ?1 DESC, category_id
             LIMIT 1",
            CategoryRecord::COLUMNS
        );
        let rec = self
            .conn
            .query_row(&sql, params![name.trim()], |row| CategoryRecord::from_row(row, ""))
            .optional()
            .storage("load category by name")?;
        Ok(rec.map(Category::from))
    }

    /// Categories matching the name substring and, when given, exactly the
    /// transaction type. Newest first.
    pub(crate) fn get_categories(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Page<Category>> {
        let sql = format!(
            "SELECT {} FROM categories
             WHERE (?1 = '' OR name LIKE ?2 ESCAPE '\\')
               AND (?3 IS NULL OR transaction_type = ?3)
             ORDER BY created_at DESC, category_id DESC
             LIMIT ?4 OFFSET ?5",
            CategoryRecord::COLUMNS
        );
        let query = filter.query.trim();
        let mut stmt = self.conn.prepare(&sql).storage("prepare categories")?;
        let rows = stmt
            .query_map(
                params![
                    query,
                    like_pattern(query),
                    filter.transaction_type,
                    page.limit,
                    page.offset
                ],
                |row| CategoryRecord::from_row(row, ""),
            )
            .storage("load categories")?;
        let items = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .storage("decode categories")?;
        Ok(Page {
            items: items.into_iter().map(Category::from).collect(),
            offset: page.offset,
            limit: page.limit,
        })
    }
}
