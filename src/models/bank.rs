#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Bank {
    pub fn new(name: String) -> Self {
        let now = super::now_millis();
        Self {
            id: None,
            name,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
