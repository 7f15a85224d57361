//! Record filtering
//!
//! A [`Filter`] is a list of [`Predicate`]s combined with AND. An empty
//! filter matches every record.
//!
//! | Predicate | Matches when |
//! |-----------|--------------|
//! | `Equals` | field is present and equal to the value |
//! | `Matches` | field, rendered as text (missing = `""`), matches the pattern |
//! | `AnyOf` | at least one branch filter matches |
//! | `Unsatisfiable` | never; stands in for shapes the engine does not understand |
//!
//! Numbers compare by value, so `1` equals `1.0`.
//!
//! ## OR branches
//!
//! Each `AnyOf` branch is itself a filter. Under [`OrSemantics::AllFields`]
//! a branch matches when all of its conditions match. Under
//! [`OrSemantics::FirstField`] only the branch's first condition is looked
//! at, which is how filters behaved in the admin panel's original store;
//! it silently ignores the rest of a multi-field branch and is kept only for
//! callers that depend on it.
//!
//! ## Loosely-typed filters
//!
//! [`Filter::from_json`] accepts the shape collaborators send over the wire:
//!
//! ```text
//! { "status": "active",
//!   "name":   { "$regex": "^ma", "$options": "i" },
//!   "$or":    [ { "service": "Netflix" }, { "service": "Spotify" } ] }
//! ```
//!
//! Unrecognized condition shapes become `Unsatisfiable` instead of errors.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Key that introduces an OR group in a JSON filter
pub const OR_KEY: &str = "$or";

/// How the branches of an OR group are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrSemantics {
    /// A branch matches when all of its conditions match
    #[default]
    AllFields,
    /// A branch matches when its first condition matches
    FirstField,
}

/// Compiled regular-expression condition
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern` with JavaScript-style `flags`
    ///
    /// `i`, `m` and `s` map to case-insensitive, multi-line and
    /// dot-matches-newline. `g`, `u` and `y` are accepted and ignored.
    /// Any other flag is an error.
    pub fn new(pattern: &str, flags: &str) -> Result<Self, String> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'u' | 'y' => {}
                other => return Err(format!("unsupported regex flag '{}'", other)),
            }
        }
        let regex = builder.build().map_err(|e| e.to_string())?;
        Ok(Pattern {
            source: pattern.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Pattern source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flags as given
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Test a string against the pattern
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

/// A single boolean test over a record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals value
    Equals {
        /// Field name
        field: String,
        /// Expected value
        value: Value,
    },
    /// Field text matches pattern
    Matches {
        /// Field name
        field: String,
        /// Compiled pattern
        pattern: Pattern,
    },
    /// At least one branch matches
    AnyOf {
        /// Branch filters
        branches: Vec<Filter>,
        /// How each branch is evaluated
        semantics: OrSemantics,
    },
    /// Never matches
    Unsatisfiable {
        /// What was not understood
        reason: String,
    },
}

impl Predicate {
    /// Evaluate against a record's JSON object view
    pub fn evaluate(&self, record: &Value) -> bool {
        match self {
            Predicate::Equals { field, value } => record
                .get(field)
                .is_some_and(|actual| values_equal(actual, value)),
            Predicate::Matches { field, pattern } => {
                pattern.is_match(&field_text(record.get(field)))
            }
            Predicate::AnyOf {
                branches,
                semantics,
            } => branches.iter().any(|branch| match semantics {
                OrSemantics::AllFields => branch.matches(record),
                OrSemantics::FirstField => branch
                    .conditions
                    .first()
                    .is_some_and(|first| first.evaluate(record)),
            }),
            Predicate::Unsatisfiable { .. } => false,
        }
    }
}

/// AND-combination of predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Predicate>,
}

impl Filter {
    /// Create an empty filter (matches all)
    pub fn new() -> Self {
        Filter::default()
    }

    /// Add an equality condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Predicate::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add a pattern condition
    ///
    /// A pattern that fails to compile adds an unsatisfiable condition.
    pub fn regex(mut self, field: impl Into<String>, pattern: &str, flags: &str) -> Self {
        let field = field.into();
        let predicate = match Pattern::new(pattern, flags) {
            Ok(pattern) => Predicate::Matches { field, pattern },
            Err(reason) => unsatisfiable(format!("field '{}': {}", field, reason)),
        };
        self.conditions.push(predicate);
        self
    }

    /// Add an OR group whose branches must match in full
    pub fn any_of(self, branches: Vec<Filter>) -> Self {
        self.any_of_with(branches, OrSemantics::AllFields)
    }

    /// Add an OR group with explicit branch semantics
    pub fn any_of_with(mut self, branches: Vec<Filter>, semantics: OrSemantics) -> Self {
        if semantics == OrSemantics::FirstField {
            for branch in branches.iter().filter(|b| b.len() > 1) {
                warn!(
                    target: "clientdb::query",
                    ignored = branch.len() - 1,
                    "OR branch has several conditions; first-field semantics evaluates only the first"
                );
            }
        }
        self.conditions.push(Predicate::AnyOf {
            branches,
            semantics,
        });
        self
    }

    /// Add an arbitrary predicate
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.conditions.push(predicate);
        self
    }

    /// Check whether a record's JSON view passes every condition
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|c| c.evaluate(record))
    }

    /// Conditions in insertion order
    pub fn conditions(&self) -> &[Predicate] {
        &self.conditions
    }

    /// Check if filter is empty (matches all)
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Get the number of top-level conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Build a filter from its loosely-typed JSON form
    ///
    /// `null` is the empty filter. A value that is not an object yields a
    /// filter that matches nothing.
    pub fn from_json(value: &Value, semantics: OrSemantics) -> Filter {
        let object = match value {
            Value::Null => return Filter::new(),
            Value::Object(object) => object,
            other => {
                return Filter::new().and(unsatisfiable(format!(
                    "filter must be an object, got {}",
                    json_type(other)
                )))
            }
        };

        let mut filter = Filter::new();
        for (key, condition) in object {
            filter = if key == OR_KEY {
                match condition {
                    Value::Array(items) => {
                        let branches = items
                            .iter()
                            .map(|item| Filter::from_json(item, semantics))
                            .collect();
                        filter.any_of_with(branches, semantics)
                    }
                    other => filter.and(unsatisfiable(format!(
                        "'{}' expects an array, got {}",
                        OR_KEY,
                        json_type(other)
                    ))),
                }
            } else {
                filter.and(parse_condition(key, condition))
            };
        }
        filter
    }
}

fn parse_condition(field: &str, condition: &Value) -> Predicate {
    let Value::Object(body) = condition else {
        return Predicate::Equals {
            field: field.to_string(),
            value: condition.clone(),
        };
    };

    let (pattern, flags) = match (body.get("$regex"), body.get("pattern")) {
        (Some(Value::String(p)), _) => (p, body.get("$options")),
        (None, Some(Value::String(p))) => (p, body.get("flags")),
        _ => {
            return unsatisfiable(format!(
                "field '{}': unrecognized condition {}",
                field, condition
            ))
        }
    };
    let flags = match flags {
        None | Some(Value::Null) => "",
        Some(Value::String(f)) => f.as_str(),
        Some(other) => {
            return unsatisfiable(format!(
                "field '{}': regex flags must be a string, got {}",
                field,
                json_type(other)
            ))
        }
    };

    match Pattern::new(pattern, flags) {
        Ok(pattern) => Predicate::Matches {
            field: field.to_string(),
            pattern,
        },
        Err(reason) => unsatisfiable(format!("field '{}': {}", field, reason)),
    }
}

fn unsatisfiable(reason: String) -> Predicate {
    warn!(target: "clientdb::query", reason = %reason, "Filter condition can never match");
    Predicate::Unsatisfiable { reason }
}

/// Equality with numeric values compared by magnitude
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

/// Text a pattern is tested against
pub(crate) fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
