use super::TransactionType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    /// Transaction type new entries in this category default to.
    pub transaction_type: Option<TransactionType>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Category {
    pub fn new(name: String) -> Self {
        let now = super::now_millis();
        Self {
            id: None,
            name,
            description: None,
            transaction_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Narrowing for category listings: name substring plus default type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub query: String,
    pub transaction_type: Option<TransactionType>,
}
