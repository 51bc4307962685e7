use std::str::FromStr;

use shared::{domain::Category, protocol::NewExpense};
use thiserror::Error;

/// Draft state for an expense that has not been submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntryForm {
    pub title: String,
    pub amount: String,
    pub category: String,
}

impl Default for PendingEntryForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            amount: String::new(),
            category: Category::default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Amount,
    Category,
}

#[derive(Debug, Error)]
#[error("unknown form field {0:?} (expected title, amount or category)")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(FormField::Title),
            "amount" => Ok(FormField::Amount),
            "category" => Ok(FormField::Category),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("amount {0:?} is not a finite number")]
pub struct InvalidAmount(pub String);

impl PendingEntryForm {
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Title => self.title = value,
            FormField::Amount => self.amount = value,
            FormField::Category => self.category = value,
        }
    }

    /// Presence check only; the amount is parsed in [`Self::to_new_expense`].
    pub fn is_submittable(&self) -> bool {
        !self.title.is_empty() && !self.amount.is_empty()
    }

    pub fn to_new_expense(&self) -> Result<NewExpense, InvalidAmount> {
        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| InvalidAmount(self.amount.clone()))?;

        Ok(NewExpense {
            title: self.title.clone(),
            amount,
            category: Category::from(self.category.as_str()),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
