//! Shared type definitions for the parameter panel.
//!
//! Rows pushed by the remote model service, discovery results used for
//! autocomplete, and the transient values that flow from the add dialog into
//! the command builder all live here so the engine, API client and TUI agree
//! on one shape.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod candidate;
pub mod workflow;

pub use candidate::{BoundsHint, Candidate, CandidateSet};
pub use workflow::{ComponentDetail, ComponentRef, InputDescriptor};

/// A single parameter binding as reported by the remote service.
///
/// Numeric attributes are kept as text: the panel displays them and passes
/// them back verbatim, it never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Target input reference, or a comma-joined list for a parameter group.
    #[serde(deserialize_with = "deserialize_target")]
    pub target: String,
    #[serde(default, deserialize_with = "deserialize_numeric_text")]
    pub low: Option<String>,
    #[serde(default, deserialize_with = "deserialize_numeric_text")]
    pub high: Option<String>,
    #[serde(default, deserialize_with = "deserialize_numeric_text")]
    pub scaler: Option<String>,
    #[serde(default, deserialize_with = "deserialize_numeric_text")]
    pub adder: Option<String>,
    /// Optional alias the service stores the parameter under.
    #[serde(default, deserialize_with = "deserialize_numeric_text")]
    pub name: Option<String>,
}

impl Parameter {
    /// Key used to address this parameter in remove and edit commands.
    ///
    /// This is the alias when one is set, otherwise the target. For groups
    /// the result may itself be a comma-joined key.
    pub fn identity(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.target,
        }
    }

    /// Returns true when the target names more than one input.
    pub fn is_group(&self) -> bool {
        self.target.contains(',')
    }

    /// Current text of a row attribute, if any.
    pub fn field(&self, field: ParameterField) -> Option<&str> {
        match field {
            ParameterField::Low => self.low.as_deref(),
            ParameterField::High => self.high.as_deref(),
            ParameterField::Scaler => self.scaler.as_deref(),
            ParameterField::Adder => self.adder.as_deref(),
            ParameterField::Name => self.name.as_deref(),
        }
    }
}

/// Row attributes that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterField {
    Low,
    High,
    Scaler,
    Adder,
    Name,
}

impl ParameterField {
    pub const ALL: [ParameterField; 5] = [Self::Low, Self::High, Self::Scaler, Self::Adder, Self::Name];

    /// Attribute name as understood by the remote interpreter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Scaler => "scaler",
            Self::Adder => "adder",
            Self::Name => "name",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six raw fields collected by the add dialog, in submission order.
///
/// Values are kept exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterForm {
    pub target: String,
    pub low: String,
    pub high: String,
    pub scaler: String,
    pub adder: String,
    pub name: String,
}

/// Transient add request consumed once by the command builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCommand {
    /// Ordered, trimmed target members. More than one member forms a group.
    pub targets: Vec<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub scaler: Option<String>,
    pub adder: Option<String>,
    pub name: Option<String>,
}

impl PendingCommand {
    /// Split a raw target specification into trimmed members.
    ///
    /// Empty members (for example from a trailing comma) are dropped.
    pub fn split_targets(target: &str) -> Vec<String> {
        target
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build a pending command from raw dialog fields.
    ///
    /// Empty strings become `None`; everything else is kept verbatim.
    pub fn from_form(form: ParameterForm) -> Self {
        fn optional(value: String) -> Option<String> {
            if value.is_empty() { None } else { Some(value) }
        }
        Self {
            targets: Self::split_targets(&form.target),
            low: optional(form.low),
            high: optional(form.high),
            scaler: optional(form.scaler),
            adder: optional(form.adder),
            name: optional(form.name),
        }
    }

    pub fn is_group(&self) -> bool {
        self.targets.len() > 1
    }
}

/// Severity for user-visible notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

fn deserialize_numeric_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

fn deserialize_target<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    // Groups may arrive either pre-joined or as a list of member references.
    match Value::deserialize(deserializer)? {
        Value::Array(members) => Ok(members
            .into_iter()
            .filter_map(value_to_text)
            .collect::<Vec<_>>()
            .join(",")),
        other => Ok(value_to_text(other).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_accepts_numbers_and_strings() {
        let json = r#"{"target": "comp1.x", "low": 0, "high": "10.5", "scaler": null, "name": ""}"#;
        let parameter: Parameter = serde_json::from_str(json).expect("deserialize Parameter");
        assert_eq!(parameter.target, "comp1.x");
        assert_eq!(parameter.low.as_deref(), Some("0"));
        assert_eq!(parameter.high.as_deref(), Some("10.5"));
        assert!(parameter.scaler.is_none());
        assert!(parameter.adder.is_none());
        assert!(parameter.name.is_none());
        assert_eq!(parameter.identity(), "comp1.x");
    }

    #[test]
    fn group_target_list_is_comma_joined() {
        let json = r#"{"target": ["a.x", "a.y"], "name": "grp1"}"#;
        let parameter: Parameter = serde_json::from_str(json).expect("deserialize group");
        assert_eq!(parameter.target, "a.x,a.y");
        assert!(parameter.is_group());
        assert_eq!(parameter.identity(), "grp1");
    }

    #[test]
    fn unnamed_group_identity_is_joined_target() {
        let parameter = Parameter {
            target: "a.x,a.y".into(),
            ..Default::default()
        };
        assert_eq!(parameter.identity(), "a.x,a.y");
    }

    #[test]
    fn split_targets_trims_and_drops_empty_members() {
        assert_eq!(PendingCommand::split_targets(" a.x , a.y "), vec!["a.x", "a.y"]);
        assert_eq!(PendingCommand::split_targets("a.x,"), vec!["a.x"]);
        assert!(PendingCommand::split_targets("  ").is_empty());
    }

    #[test]
    fn pending_command_keeps_values_verbatim() {
        let form = ParameterForm {
            target: "comp1.x".into(),
            low: " 0 ".into(),
            high: "ten".into(),
            ..Default::default()
        };
        let pending = PendingCommand::from_form(form);
        assert_eq!(pending.targets, vec!["comp1.x"]);
        assert_eq!(pending.low.as_deref(), Some(" 0 "));
        assert_eq!(pending.high.as_deref(), Some("ten"));
        assert!(pending.scaler.is_none());
        assert!(!pending.is_group());
    }

    #[test]
    fn parameter_field_parse_is_case_insensitive() {
        assert_eq!(ParameterField::parse("Low"), Some(ParameterField::Low));
        assert_eq!(ParameterField::parse(" adder "), Some(ParameterField::Adder));
        assert_eq!(ParameterField::parse("target"), None);
    }
}
