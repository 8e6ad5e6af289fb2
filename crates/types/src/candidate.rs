//! Autocomplete candidates discovered from a workflow.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully qualified input reference, `"<component>.<input>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(component: &str, input: &str) -> Self {
        Self(format!("{component}.{input}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Candidate {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Suggested bounds for a candidate. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsHint {
    pub low: Option<String>,
    pub high: Option<String>,
}

impl BoundsHint {
    /// Build a hint from raw declaration values.
    ///
    /// Falsy values (null, false, zero, empty string) count as absent.
    pub fn from_values(low: Option<&Value>, high: Option<&Value>) -> Self {
        Self {
            low: low.and_then(truthy_text),
            high: high.and_then(truthy_text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(number) => match number.as_f64() {
            Some(float) if float == 0.0 || float.is_nan() => None,
            _ => Some(number.to_string()),
        },
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Candidates and bounds gathered by one discovery pass.
///
/// The set only grows: entries are appended and never removed, so partial
/// results from concurrent fetches can be merged in any order. Every
/// (component, input) pair keeps its own entry, even when two components
/// share a short name and therefore spell the same candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
    hints: Vec<BoundsHint>,
    // Position of the first entry spelled this way.
    first: IndexMap<Candidate, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate and its hint.
    pub fn push(&mut self, candidate: Candidate, hint: BoundsHint) {
        let position = self.candidates.len();
        self.first.entry(candidate.clone()).or_insert(position);
        self.candidates.push(candidate);
        self.hints.push(hint);
    }

    /// Append every entry of another set, preserving its order.
    pub fn extend(&mut self, other: CandidateSet) {
        for (candidate, hint) in other.candidates.into_iter().zip(other.hints) {
            self.push(candidate, hint);
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Bounds hint for a candidate. A repeated candidate answers with the
    /// hint of its first entry.
    pub fn bounds_for(&self, candidate: &str) -> Option<&BoundsHint> {
        self.first.get(candidate).and_then(|&position| self.hints.get(position))
    }

    /// Entries in discovery order, repeats included.
    pub fn entries(&self) -> impl Iterator<Item = (&Candidate, &BoundsHint)> {
        self.candidates.iter().zip(&self.hints)
    }

    /// Candidates matching a typed token, best matches first.
    ///
    /// Prefix matches rank above substring matches; within a rank the
    /// discovery order is kept. Matching ignores ASCII case. An empty token
    /// matches everything.
    pub fn matching(&self, token: &str) -> Vec<&Candidate> {
        let needle = token.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return self.candidates.iter().collect();
        }
        let mut prefix = Vec::new();
        let mut contains = Vec::new();
        for candidate in &self.candidates {
            let haystack = candidate.as_str().to_ascii_lowercase();
            if haystack.starts_with(&needle) {
                prefix.push(candidate);
            } else if haystack.contains(&needle) {
                contains.push(candidate);
            }
        }
        prefix.extend(contains);
        prefix
    }
}
