//! Typed parameter commands and their text serialization.
//!
//! [`CommandBuilder`] turns user input into a [`ParameterCommand`]; the
//! command renders itself into the exact text the remote interpreter
//! expects via [`ParameterCommand::to_command_text`]. Building is pure: no
//! I/O and no validation of the values being passed through.

use std::fmt;

use paramdeck_types::{ParameterField, PendingCommand};
use serde::Serialize;

/// How empty-looking numeric options are treated when building an add command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FalsyPolicy {
    /// Only empty text counts as absent; `0` is emitted.
    #[default]
    TextPresence,
    /// Empty text and anything that parses as numeric zero count as absent.
    ZeroIsAbsent,
}

impl FalsyPolicy {
    /// Returns the value when the clause should be emitted.
    fn keep(self, value: Option<String>) -> Option<String> {
        let value = value?;
        if value.is_empty() {
            return None;
        }
        match self {
            Self::TextPresence => Some(value),
            Self::ZeroIsAbsent => match value.trim().parse::<f64>() {
                Ok(number) if number == 0.0 => None,
                _ => Some(value),
            },
        }
    }
}

/// A state mutation understood by the remote interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterCommand {
    AddParameter {
        targets: Vec<String>,
        low: Option<String>,
        high: Option<String>,
        scaler: Option<String>,
        adder: Option<String>,
        name: Option<String>,
    },
    RemoveParameter {
        identity: String,
    },
    ClearParameters,
    SetField {
        parameter: String,
        field: ParameterField,
        value: String,
    },
}

impl ParameterCommand {
    /// Render the command against the entity that owns the parameters.
    pub fn to_command_text(&self, entity_path: &str) -> String {
        CommandText {
            command: self,
            entity_path,
        }
        .to_string()
    }

    /// Short human-readable description for activity logs.
    pub fn summary(&self) -> String {
        match self {
            Self::AddParameter { targets, name, .. } => match name {
                Some(name) => format!("add {} as '{}'", targets.join(", "), name),
                None => format!("add {}", targets.join(", ")),
            },
            Self::RemoveParameter { identity } => format!("remove {identity}"),
            Self::ClearParameters => "clear all parameters".to_string(),
            Self::SetField { parameter, field, value } => format!("set {parameter}.{field} = {value}"),
        }
    }
}

/// Display adapter pairing a command with its owning entity path.
pub struct CommandText<'a> {
    pub command: &'a ParameterCommand,
    pub entity_path: &'a str,
}

impl fmt::Display for CommandText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity_path;
        match self.command {
            ParameterCommand::AddParameter {
                targets,
                low,
                high,
                scaler,
                adder,
                name,
            } => {
                write!(f, "{entity}.add_parameter(")?;
                if targets.len() > 1 {
                    f.write_str("(")?;
                    for target in targets {
                        write!(f, "'{target}',")?;
                    }
                    f.write_str(")")?;
                } else {
                    write!(f, "'{}'", targets.first().map(String::as_str).unwrap_or_default())?;
                }
                for (label, value) in [("low", low), ("high", high), ("scaler", scaler), ("adder", adder)] {
                    if let Some(value) = value {
                        write!(f, ",{label}={value}")?;
                    }
                }
                if let Some(name) = name {
                    write!(f, ",name='{name}'")?;
                }
                f.write_str(");")
            }
            // Group keys are stored unquoted on the remote side.
            ParameterCommand::RemoveParameter { identity } if identity.contains(',') => {
                write!(f, "{entity}.remove_parameter(({identity}));")
            }
            ParameterCommand::RemoveParameter { identity } => write!(f, "{entity}.remove_parameter(\"{identity}\");"),
            ParameterCommand::ClearParameters => write!(f, "{entity}.clear_parameters();"),
            ParameterCommand::SetField { parameter, field, value } => write!(f, "{entity}.{parameter}.{field}={value}"),
        }
    }
}

/// Builds [`ParameterCommand`]s from user input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder {
    policy: FalsyPolicy,
}

impl CommandBuilder {
    pub fn new(policy: FalsyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FalsyPolicy {
        self.policy
    }

    /// Build an add command from a pending request.
    pub fn add(&self, pending: PendingCommand) -> ParameterCommand {
        ParameterCommand::AddParameter {
            targets: pending.targets,
            low: self.policy.keep(pending.low),
            high: self.policy.keep(pending.high),
            scaler: self.policy.keep(pending.scaler),
            adder: self.policy.keep(pending.adder),
            name: pending.name.filter(|name| !name.is_empty()),
        }
    }

    /// Build an add command from a raw target specification.
    ///
    /// `target` may list several comma-separated inputs to form a group.
    pub fn add_from_text(
        &self,
        target: &str,
        low: Option<&str>,
        high: Option<&str>,
        scaler: Option<&str>,
        adder: Option<&str>,
        name: Option<&str>,
    ) -> ParameterCommand {
        self.add(PendingCommand {
            targets: PendingCommand::split_targets(target),
            low: low.map(str::to_string),
            high: high.map(str::to_string),
            scaler: scaler.map(str::to_string),
            adder: adder.map(str::to_string),
            name: name.map(str::to_string),
        })
    }

    pub fn remove(&self, identity: &str) -> ParameterCommand {
        ParameterCommand::RemoveParameter {
            identity: identity.to_string(),
        }
    }

    pub fn clear(&self) -> ParameterCommand {
        ParameterCommand::ClearParameters
    }

    /// Assign a raw value to one attribute of an existing parameter.
    pub fn set_field(&self, parameter: &str, field: ParameterField, value: &str) -> ParameterCommand {
        ParameterCommand::SetField {
            parameter: parameter.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(command: ParameterCommand) -> String {
        command.to_command_text("path")
    }

    #[test]
    fn add_omits_absent_clauses_in_fixed_order() {
        let builder = CommandBuilder::default();
        assert_eq!(
            text(builder.add_from_text("comp1.x", None, Some(""), Some("2"), None, Some("alias"))),
            "path.add_parameter('comp1.x',scaler=2,name='alias');"
        );
        assert_eq!(
            text(builder.add_from_text("comp1.x", Some("-1"), Some("1"), Some("2"), Some("3"), None)),
            "path.add_parameter('comp1.x',low=-1,high=1,scaler=2,adder=3);"
        );
        assert_eq!(text(builder.add_from_text("comp1.x", None, None, None, None, Some(""))), "path.add_parameter('comp1.x');");
    }

    #[test]
    fn zero_policy_drops_zero_like_values() {
        let builder = CommandBuilder::new(FalsyPolicy::ZeroIsAbsent);
        assert_eq!(
            text(builder.add_from_text("comp1.x", Some("0"), Some("0.0"), Some("1e-3"), Some("-0"), None)),
            "path.add_parameter('comp1.x',scaler=1e-3);"
        );
        let builder = CommandBuilder::new(FalsyPolicy::TextPresence);
        assert_eq!(
            text(builder.add_from_text("comp1.x", Some("0"), None, None, Some("0.0"), None)),
            "path.add_parameter('comp1.x',low=0,adder=0.0);"
        );
    }

    #[test]
    fn values_pass_through_unvalidated() {
        let builder = CommandBuilder::default();
        assert_eq!(
            text(builder.add_from_text("comp1.x", Some(" ten "), None, None, None, None)),
            "path.add_parameter('comp1.x',low= ten );"
        );
        assert_eq!(text(builder.set_field("p1", ParameterField::High, "1+1")), "path.p1.high=1+1");
    }

    #[test]
    fn group_targets_become_tuple_literal() {
        let builder = CommandBuilder::default();
        assert_eq!(
            text(builder.add_from_text("a.x ,  b.y,c.z", None, None, None, None, None)),
            "path.add_parameter(('a.x','b.y','c.z',));"
        );
    }

    #[test]
    fn remove_quotes_single_and_keeps_group_literal() {
        let builder = CommandBuilder::default();
        assert_eq!(text(builder.remove("a.x")), "path.remove_parameter(\"a.x\");");
        assert_eq!(text(builder.remove("a.x, a.y")), "path.remove_parameter((a.x, a.y));");
    }

    #[test]
    fn clear_is_constant() {
        let builder = CommandBuilder::default();
        assert_eq!(text(builder.clear()), text(builder.clear()));
        assert_eq!(text(builder.clear()), "path.clear_parameters();");
    }

    #[test]
    fn summaries_are_readable() {
        let builder = CommandBuilder::default();
        assert_eq!(builder.add_from_text("a.x,a.y", None, None, None, None, Some("g")).summary(), "add a.x, a.y as 'g'");
        assert_eq!(builder.remove("g").summary(), "remove g");
        assert_eq!(builder.set_field("g", ParameterField::Low, "3").summary(), "set g.low = 3");
    }
}
