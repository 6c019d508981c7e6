use serde::{Deserialize, Serialize};

/// The signed-in caller, passed explicitly into every operation that needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: uuid::Uuid,
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: uuid::Uuid) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }
}
