use serde::{Deserialize, Serialize};

/// Read-side projection of a platform account. User CRUD is owned by the
/// wider platform; this service only resolves appointment relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub last_name: String,
    /// An account may have no resolvable address
    pub email: Option<String>,
    pub role: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}
