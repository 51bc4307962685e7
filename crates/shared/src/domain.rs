use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ExpenseId);

/// Spending category. The four named variants are the ones a view offers;
/// the service stores whatever text it is given, so anything else lands in
/// `Other` rather than failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Food,
    Travel,
    Shopping,
    Bills,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        let known = Category::KNOWN
            .into_iter()
            .find(|known| known.as_str() == value);
        known.unwrap_or(Category::Other(value))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: f64,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_match_exactly() {
        assert_eq!(Category::from("Travel"), Category::Travel);
        assert_eq!(Category::from("Bills"), Category::Bills);
        assert_eq!(Category::from("Food"), Category::Food);
        assert_eq!(Category::from("travel"), Category::Other("travel".into()));
    }

    #[test]
    fn category_text_survives_decode_and_encode() {
        for raw in [" food ", "food", "Food"] {
            let json = serde_json::json!({ "id": 3, "title": "Snack", "amount": 1.0, "category": raw });
            let expense: Expense = serde_json::from_value(json).expect("decode");
            assert_eq!(expense.category.as_str(), raw);
            let encoded = serde_json::to_value(&expense).expect("encode");
            assert_eq!(encoded["category"], raw);
        }
    }

    #[test]
    fn unknown_category_is_kept_verbatim() {
        let category = Category::from("Gifts");
        assert_eq!(category, Category::Other("Gifts".into()));
        assert_eq!(String::from(category), "Gifts");
    }

    #[test]
    fn expense_decodes_from_service_json() {
        let expense: Expense = serde_json::from_str(
            r#"{"id":1,"title":"Coffee","amount":4.5,"category":"Food"}"#,
        )
        .expect("decode");
        assert_eq!(expense.id, ExpenseId(1));
        assert_eq!(expense.category, Category::Food);
        assert_eq!(expense.amount, 4.5);
    }

    #[test]
    fn integer_amounts_decode_as_numbers() {
        let expense: Expense = serde_json::from_str(
            r#"{"id":2,"title":"Bus","amount":2,"category":"Travel"}"#,
        )
        .expect("decode");
        assert_eq!(expense.amount, 2.0);
    }
}
