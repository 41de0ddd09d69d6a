/// A counterparty (payer or payee) an entry can be linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: Option<i64>,
    pub name: String,
    pub contact_number: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Party {
    pub fn new(name: String) -> Self {
        let now = super::now_millis();
        Self {
            id: None,
            name,
            contact_number: None,
            description: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_contact(mut self, contact_number: Option<String>) -> Self {
        self.contact_number = contact_number;
        self
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
