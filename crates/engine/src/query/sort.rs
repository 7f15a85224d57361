//! Record ordering
//!
//! Sorting is stable. Two numeric values compare by magnitude; everything
//! else compares as text with an accent-folding collation:
//!
//! 1. primary: NFD-decomposed, combining marks removed, lowercased
//!    (`"Álvaro"` and `"alvaro"` tie, and both sort before `"Bruno"`)
//! 2. secondary: lowercased with accents kept (`"pena"` < `"peña"`)
//! 3. tertiary: raw text
//!
//! A missing or `null` field sorts as the empty string.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::filter::field_text;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// One sort key: a field and a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field to sort by
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl Sort {
    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Compare two record views on the sort field, honouring direction
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Stable in-place sort of `(view, item)` pairs
    pub(crate) fn apply<T>(&self, rows: &mut [(Value, T)]) {
        rows.sort_by(|(a, _), (b, _)| self.compare(a, b));
    }
}

/// Compare two optional field values
///
/// Numbers compare numerically and sort before every other value. Anything
/// else, missing included, compares by its collated text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collate(&field_text(a), &field_text(b)),
    }
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// Accent-folding text comparison
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Primary collation key: base letters only, lowercased
pub fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
