use super::{EntryType, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    NewestFirst,
    OldestFirst,
    AmountHighLow,
    AmountLowHigh,
}

impl SortOption {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "newest" | "newestfirst" => Some(Self::NewestFirst),
            "oldest" | "oldestfirst" => Some(Self::OldestFirst),
            "amountdesc" | "amounthighlow" => Some(Self::AmountHighLow),
            "amountasc" | "amountlowhigh" => Some(Self::AmountLowHigh),
            _ => None,
        }
    }
}

/// Every field narrows the result; `None` (or an empty id set) means
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub category_id: Option<i64>,
    pub party_id: Option<i64>,
    pub bank_id: Option<i64>,
    pub category_ids: Vec<i64>,
    pub party_ids: Vec<i64>,
    pub bank_ids: Vec<i64>,
    pub entry_type: Option<EntryType>,
    pub transaction_type: Option<TransactionType>,
    /// Inclusive, epoch milliseconds.
    pub start_date: Option<i64>,
    /// Inclusive, epoch milliseconds.
    pub end_date: Option<i64>,
    pub title_query: Option<String>,
    pub sort: SortOption,
}

impl EntryFilter {
    pub fn between(start_date: i64, end_date: i64) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, query: &str) -> Self {
        let trimmed = query.trim();
        self.title_query = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Number of active narrowing criteria (sort order is not counted).
    pub fn count(&self) -> usize {
        [
            self.category_id.is_some(),
            self.party_id.is_some(),
            self.bank_id.is_some(),
            !self.category_ids.is_empty(),
            !self.party_ids.is_empty(),
            !self.bank_ids.is_empty(),
            self.entry_type.is_some(),
            self.transaction_type.is_some(),
            self.start_date.is_some(),
            self.end_date.is_some(),
            self.title_query.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn first(limit: u32) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// Where the following page starts, or `None` if this one was short.
    pub fn next_offset(&self) -> Option<u32> {
        let len = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        (len >= self.limit).then(|| self.offset.saturating_add(len))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
