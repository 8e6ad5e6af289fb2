use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use paramdeck_api::{ModelClient, ModelService, ServiceConfig};
use paramdeck_engine::{CandidateScanner, CommandBuilder, FalsyPolicy, ParameterCommand};
use paramdeck_tui::PanelConfig;
use paramdeck_types::ParameterField;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Inspect and edit the parameters of a remote optimization model entity.
///
/// Without a subcommand the interactive panel opens.
#[derive(Debug, Parser)]
#[command(name = "paramdeck", version, about)]
struct Cli {
    /// Path of the entity that owns the parameters, e.g. `top.driver`.
    #[arg(long, global = true, default_value = "driver")]
    entity: String,

    /// Model service base URL; overrides PARAMDECK_API_BASE.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Open the panel without in-place cell editing.
    #[arg(long, global = true)]
    read_only: bool,

    /// Treat numeric zero like an empty value when building add commands.
    #[arg(long, global = true)]
    zero_is_absent: bool,

    /// Print the command that would be sent instead of sending it.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a parameter; comma-separated targets form a group.
    Add(AddArgs),
    /// Remove a parameter by name, or by target when it has none.
    Remove { identity: String },
    /// Remove every parameter.
    Clear,
    /// Assign one field of an existing parameter.
    Set {
        name: String,
        #[arg(value_parser = parse_field)]
        field: ParameterField,
        value: String,
    },
    /// List the inputs discoverable in the entity's workflow.
    Candidates,
    /// Print the current parameters as JSON.
    List,
}

#[derive(Debug, Args)]
struct AddArgs {
    target: String,
    #[arg(long, allow_hyphen_values = true)]
    low: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    high: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    scaler: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    adder: Option<String>,
    #[arg(long)]
    name: Option<String>,
}

fn parse_field(value: &str) -> Result<ParameterField, String> {
    ParameterField::parse(value).ok_or_else(|| {
        let known: Vec<&str> = ParameterField::ALL.iter().map(ParameterField::as_str).collect();
        format!("unknown field '{value}', expected one of: {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let policy = if cli.zero_is_absent {
        FalsyPolicy::ZeroIsAbsent
    } else {
        FalsyPolicy::TextPresence
    };
    let builder = CommandBuilder::new(policy);

    let Some(command) = cli.command else {
        init_panel_tracing()?;
        let service = connect(cli.base_url.as_deref())?;
        let config = PanelConfig {
            editable: !cli.read_only,
            policy,
            refresh_interval: refresh_interval(),
            ..PanelConfig::new(cli.entity)
        };
        return paramdeck_tui::run(config, service).await;
    };

    init_tracing();
    let mutation = match command {
        Command::Add(args) => builder.add_from_text(
            &args.target,
            args.low.as_deref(),
            args.high.as_deref(),
            args.scaler.as_deref(),
            args.adder.as_deref(),
            args.name.as_deref(),
        ),
        Command::Remove { identity } => builder.remove(&identity),
        Command::Clear => builder.clear(),
        Command::Set { name, field, value } => builder.set_field(&name, field, &value),
        Command::Candidates => return print_candidates(connect(cli.base_url.as_deref())?, &cli.entity).await,
        Command::List => return print_parameters(connect(cli.base_url.as_deref())?, &cli.entity).await,
    };
    if let ParameterCommand::AddParameter { targets, .. } = &mutation
        && targets.is_empty()
    {
        anyhow::bail!("add needs at least one non-empty target");
    }

    let text = mutation.to_command_text(&cli.entity);
    if cli.dry_run {
        let out = serde_json::json!({
            "entity": cli.entity,
            "command": mutation,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let service = connect(cli.base_url.as_deref())?;
    service
        .issue_command(&text)
        .await
        .with_context(|| format!("failed to {}", mutation.summary()))?;
    info!(command = %text, "command sent");
    println!("{text}");
    Ok(())
}

fn connect(base_url: Option<&str>) -> Result<Arc<dyn ModelService>> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }
    Ok(Arc::new(ModelClient::new(config)?))
}

async fn print_candidates(service: Arc<dyn ModelService>, entity: &str) -> Result<()> {
    let outcome = CandidateScanner::new(service)
        .scan(entity)
        .await
        .with_context(|| format!("candidate discovery failed for '{entity}'"))?;
    for (candidate, hint) in outcome.candidates.entries() {
        let low = hint.low.as_deref().unwrap_or("-");
        let high = hint.high.as_deref().unwrap_or("-");
        println!("{candidate}\tlow={low}\thigh={high}");
    }
    if !outcome.report.failed.is_empty() {
        warn!(failed = ?outcome.report.failed, "some components could not be described");
    }
    Ok(())
}

async fn print_parameters(service: Arc<dyn ModelService>, entity: &str) -> Result<()> {
    let rows = service
        .fetch_parameters(entity)
        .await
        .with_context(|| format!("could not fetch parameters for '{entity}'"))?;
    match rows {
        Some(rows) => println!("{}", serde_json::to_string_pretty(&rows)?),
        None => warn!(entity, "service returned no parameter data"),
    }
    Ok(())
}

fn refresh_interval() -> Duration {
    match env::var("PARAMDECK_REFRESH_SECS") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(value = %raw, "ignoring invalid PARAMDECK_REFRESH_SECS");
                PanelConfig::DEFAULT_REFRESH_INTERVAL
            }
        },
        Err(_) => PanelConfig::DEFAULT_REFRESH_INTERVAL,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// One-shot subcommands log to stderr so stdout stays machine-readable.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The panel owns the terminal, so its logs go to a file.
fn init_panel_tracing() -> Result<()> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn log_path() -> PathBuf {
    if let Ok(path) = env::var("PARAMDECK_LOG_PATH")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("paramdeck")
        .join("paramdeck.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_parses_field_names() {
        let cli = Cli::try_parse_from(["paramdeck", "--entity", "top.driver", "set", "p1", "High", "1e3"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Command::Set { field: ParameterField::High, ref value, .. }) if value == "1e3"
        ));
        assert!(Cli::try_parse_from(["paramdeck", "set", "p1", "target", "1"]).is_err());
    }

    #[test]
    fn add_accepts_negative_bounds_and_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["paramdeck", "add", "comp1.x", "--low", "-5", "--dry-run"]).expect("parse");
        assert!(cli.dry_run);
        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.low.as_deref(), Some("-5"));
    }

    #[test]
    fn no_subcommand_opens_the_panel() {
        let cli = Cli::try_parse_from(["paramdeck", "--read-only"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.read_only);
    }
}
