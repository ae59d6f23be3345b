//! The closed set of expense categories.
//!
//! Categories arrive as free text from forms and from the AI assistant. Forms
//! are parsed strictly with [Category::from_str], while assistant output is
//! coerced with [Category::coerce] so that a chatty model still yields a
//! usable category.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The classification of an expense.
///
/// The variant order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Eating out, coffee, takeaways.
    Food,
    /// Public transport, fuel, taxis.
    Transport,
    /// Movies, concerts, games.
    Entertainment,
    /// Supermarket shopping.
    Groceries,
    /// Power, water, internet.
    Utilities,
    /// Rent or mortgage payments.
    Rent,
    /// Anything else.
    Other,
}

/// The error returned when text does not name a known category.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a known category")]
pub struct UnknownCategory(pub String);

impl Category {
    /// Every category in canonical order.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Groceries,
        Category::Utilities,
        Category::Rent,
        Category::Other,
    ];

    /// The display name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Groceries => "Groceries",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Other => "Other",
        }
    }

    /// Map arbitrary text, typically a language model's answer, onto a category.
    ///
    /// Tries an exact match, then a case-insensitive match, then picks the
    /// first category (in canonical order) whose name appears in the text.
    /// Falls back to [Category::Other].
    pub fn coerce(raw: &str) -> Category {
        let trimmed = raw.trim();

        if let Ok(category) = trimmed.parse() {
            return category;
        }

        let lowercase = trimmed.to_lowercase();

        Category::ALL
            .into_iter()
            .find(|category| category.as_str().to_lowercase() == lowercase)
            .or_else(|| {
                Category::ALL
                    .into_iter()
                    .find(|category| lowercase.contains(&category.as_str().to_lowercase()))
            })
            .unwrap_or(Category::Other)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
