use rusqlite::types::ToSql;

use crate::models::{EntryFilter, SortOption};

/// Entry joined with its category, and with party and bank when present.
/// Joined columns carry a `category_`/`party_`/`bank_` prefix so records
/// can be decoded by name.
pub(crate) const ENTRY_DETAILS_SELECT: &str = "SELECT
    ae.entry_id, ae.title, ae.description, ae.amount, ae.entry_type,
    ae.transaction_type, ae.transaction_date, ae.fk_party_id,
    ae.fk_category_id, ae.fk_bank_id, ae.created_at, ae.updated_at,
    c.category_id AS category_category_id, c.name AS category_name,
    c.description AS category_description,
    c.transaction_type AS category_transaction_type,
    c.created_at AS category_created_at, c.updated_at AS category_updated_at,
    p.party_id AS party_party_id, p.name AS party_name,
    p.contact_number AS party_contact_number, p.description AS party_description,
    p.address AS party_address,
    p.created_at AS party_created_at, p.updated_at AS party_updated_at,
    b.bank_id AS bank_bank_id, b.name AS bank_name,
    b.description AS bank_description,
    b.created_at AS bank_created_at, b.updated_at AS bank_updated_at
 FROM account_entries ae
 JOIN categories c ON c.category_id = ae.fk_category_id
 LEFT JOIN parties p ON p.party_id = ae.fk_party_id
 LEFT JOIN banks b ON b.bank_id = ae.fk_bank_id";

/// SQL fragment plus its positional parameters.
pub(crate) struct SqlWhere {
    pub(crate) clause: String,
    pub(crate) params: Vec<Box<dyn ToSql>>,
}

impl SqlWhere {
    fn new() -> Self {
        Self {
            clause: String::new(),
            params: Vec::new(),
        }
    }

    fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    fn push(&mut self, sql: &str, value: Box<dyn ToSql>) {
        self.clause
            .push_str(&format!(" AND {sql} ?{}", self.next_placeholder()));
        self.params.push(value);
    }

    fn push_in(&mut self, column: &str, ids: &[i64]) {
        if ids.is_empty() {
            return;
        }
        let start = self.next_placeholder();
        let placeholders: String = (0..ids.len())
            .map(|i| format!("?{}", start + i))
            .collect::<Vec<_>>()
            .join(",");
        self.clause
            .push_str(&format!(" AND {column} IN ({placeholders})"));
        for id in ids {
            self.params.push(Box::new(*id));
        }
    }

    pub(crate) fn params_ref(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// `AND …` conditions over the `ae` alias for every active filter field.
pub(crate) fn entry_where(filter: &EntryFilter) -> SqlWhere {
    let mut w = SqlWhere::new();

    if let Some(id) = filter.category_id {
        w.push("ae.fk_category_id =", Box::new(id));
    }
    if let Some(id) = filter.party_id {
        w.push("ae.fk_party_id =", Box::new(id));
    }
    if let Some(id) = filter.bank_id {
        w.push("ae.fk_bank_id =", Box::new(id));
    }
    w.push_in("ae.fk_category_id", &filter.category_ids);
    w.push_in("ae.fk_party_id", &filter.party_ids);
    w.push_in("ae.fk_bank_id", &filter.bank_ids);
    if let Some(t) = filter.entry_type {
        w.push("ae.entry_type =", Box::new(t));
    }
    if let Some(t) = filter.transaction_type {
        w.push("ae.transaction_type =", Box::new(t));
    }
    if let Some(start) = filter.start_date {
        w.push("ae.transaction_date >=", Box::new(start));
    }
    if let Some(end) = filter.end_date {
        w.push("ae.transaction_date <=", Box::new(end));
    }
    if let Some(q) = filter.title_query.as_deref() {
        w.clause.push_str(&format!(
            " AND ae.title LIKE ?{} ESCAPE '\\'",
            w.next_placeholder()
        ));
        w.params.push(Box::new(like_pattern(q)));
    }

    w
}

pub(crate) fn order_by(sort: SortOption) -> &'static str {
    match sort {
        SortOption::NewestFirst => " ORDER BY ae.transaction_date DESC, ae.entry_id DESC",
        SortOption::OldestFirst => " ORDER BY ae.transaction_date ASC, ae.entry_id ASC",
        SortOption::AmountHighLow => {
            " ORDER BY ae.amount DESC, ae.transaction_date DESC, ae.entry_id DESC"
        }
        SortOption::AmountLowHigh => {
            " ORDER BY ae.amount ASC, ae.transaction_date DESC, ae.entry_id DESC"
        }
    }
}

/// `%needle%` with LIKE wildcards in `needle` matched literally.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// FTS5 MATCH expression requiring every token as a prefix, or `None`
/// when the text has no tokens.
pub(crate) fn fts_match_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|token| format!("\"{}\"*", token.replace('"', "\"\"")))
        .collect();
    (!terms.is_empty()).then(|| terms.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_conditions() {
        let w = entry_where(&EntryFilter::default());
        assert!(w.clause.is_empty());
        assert!(w.params.is_empty());
    }

    #[test]
    fn test_placeholders_are_sequential() {
        let filter = EntryFilter {
            party_id: Some(2),
            category_ids: vec![1, 4, 9],
            ..EntryFilter::between(10, 20)
        };
        let w = entry_where(&filter);
        assert_eq!(w.params.len(), 6);
        assert!(w.clause.contains("ae.fk_party_id = ?1"));
        assert!(w.clause.contains("ae.fk_category_id IN (?2,?3,?4)"));
        assert!(w.clause.contains("ae.transaction_date >= ?5"));
        assert!(w.clause.contains("ae.transaction_date <= ?6"));
    }

    #[test]
    fn test_empty_id_set_is_no_restriction() {
        let filter = EntryFilter {
            bank_ids: vec![],
            ..EntryFilter::default()
        };
        assert!(!entry_where(&filter).clause.contains("IN"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rent"), "%rent%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_fts_expression() {
        assert_eq!(fts_match_expression("   "), None);
        assert_eq!(
            fts_match_expression("coffee beans").as_deref(),
            Some("\"coffee\"* \"beans\"*")
        );
        assert_eq!(
            fts_match_expression("say\"hi").as_deref(),
            Some("\"say\"\"hi\"*")
        );
    }
}
