use rust_decimal::Decimal;

use super::{Attachment, Bank, Category, Party};

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Cash,
    Bank,
    Other,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Bank => "BANK",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "BANK" => Some(Self::Bank),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [EntryType] {
        &[Self::Cash, Self::Bank, Self::Other]
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            "TRANSFER" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn all() -> &'static [TransactionType] {
        &[Self::Income, Self::Expense, Self::Transfer]
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger transaction.
///
/// The sign of `amount` is not interpreted by storage; income versus
/// expense is carried by `transaction_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub entry_type: EntryType,
    pub transaction_type: TransactionType,
    /// Epoch milliseconds.
    pub transaction_date: i64,
    pub category_id: i64,
    pub party_id: Option<i64>,
    pub bank_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AccountEntry {
    pub fn new(
        title: String,
        amount: Decimal,
        entry_type: EntryType,
        transaction_type: TransactionType,
        category_id: i64,
    ) -> Self {
        let now = super::now_millis();
        Self {
            id: None,
            title,
            description: None,
            amount,
            entry_type,
            transaction_type,
            transaction_date: now,
            category_id,
            party_id: None,
            bank_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// An entry joined with everything it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntryWithDetails {
    pub entry: AccountEntry,
    pub category: Category,
    pub party: Option<Party>,
    pub bank: Option<Bank>,
    pub attachments: Vec<Attachment>,
}

/// Full-text search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchedEntry {
    pub entry: AccountEntry,
    pub category_name: String,
}
