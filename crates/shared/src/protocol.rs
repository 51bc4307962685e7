use serde::{Deserialize, Serialize};

use crate::domain::Category;

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

impl DeleteAck {
    pub fn deleted() -> Self {
        Self {
            message: "Deleted".to_string(),
        }
    }
}
