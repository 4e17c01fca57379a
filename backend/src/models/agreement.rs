//! Agreement model
//!
//! An agreement maps issue names to issue-specific term sets. Term values
//! are plain JSON-shaped data: numbers, booleans, strings, or nested maps.
//! Both engines read agreements but never mutate them.
//!
//! # Example
//!
//! ```rust
//! use agreement_simulator_core_rs::models::{Agreement, TermValue};
//!
//! let agreement = Agreement::new()
//!     .with_term("resupply_SOP", [("standoff_nm", TermValue::from(5.0))])
//!     .with_term("communication_protocol", [("hotline", TermValue::from(true))]);
//!
//! assert_eq!(agreement.term_count(), 2);
//! assert_eq!(agreement.number("resupply_SOP.standoff_nm"), Some(5.0));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value inside a term set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Nested(BTreeMap<String, TermValue>),
}

impl TermValue {
    /// Numeric reading: numbers pass through, booleans become 1.0 / 0.0
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TermValue::Number(n) => Some(*n),
            TermValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            TermValue::Text(_) | TermValue::Nested(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TermValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by flag-style term effects
    pub fn is_truthy(&self) -> bool {
        match self {
            TermValue::Bool(b) => *b,
            TermValue::Number(n) => *n != 0.0,
            TermValue::Text(s) => !s.is_empty(),
            TermValue::Nested(map) => !map.is_empty(),
        }
    }
}

impl From<f64> for TermValue {
    fn from(value: f64) -> Self {
        TermValue::Number(value)
    }
}

impl From<i64> for TermValue {
    fn from(value: i64) -> Self {
        TermValue::Number(value as f64)
    }
}

impl From<bool> for TermValue {
    fn from(value: bool) -> Self {
        TermValue::Bool(value)
    }
}

impl From<&str> for TermValue {
    fn from(value: &str) -> Self {
        TermValue::Text(value.to_string())
    }
}

impl From<String> for TermValue {
    fn from(value: String) -> Self {
        TermValue::Text(value)
    }
}

/// Field name → value for one issue
pub type TermSet = BTreeMap<String, TermValue>;

/// Field that switches a whole term set off when set to `false`
pub const ENABLED_FIELD: &str = "enabled";

/// Ordered mapping from issue name to term set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Agreement {
    terms: BTreeMap<String, TermSet>,
}

impl Agreement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add (or replace) one issue's term set
    pub fn with_term<K, V, I>(mut self, issue: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<TermValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.insert_term(
            issue,
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn insert_term(&mut self, issue: impl Into<String>, terms: TermSet) {
        self.terms.insert(issue.into(), terms);
    }

    pub fn term(&self, issue: &str) -> Option<&TermSet> {
        self.terms.get(issue)
    }

    /// True if the issue is present and not switched off via `enabled: false`
    pub fn has_term(&self, issue: &str) -> bool {
        match self.terms.get(issue) {
            Some(set) => !matches!(set.get(ENABLED_FIELD), Some(TermValue::Bool(false))),
            None => false,
        }
    }

    /// Number of top-level issues
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Look up a value by dotted path: `issue.field[.nested...]`
    ///
    /// A bare issue name has no scalar value and returns `None`.
    pub fn get(&self, path: &str) -> Option<&TermValue> {
        let mut segments = path.split('.');
        let issue = segments.next()?;
        let field = segments.next()?;

        let mut current = self.terms.get(issue)?.get(field)?;
        for segment in segments {
            match current {
                TermValue::Nested(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Numeric reading of a path (booleans as 1.0 / 0.0)
    pub fn number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(TermValue::as_number)
    }
}
