//! # Command Execution Layer
//!
//! Translates [`Effect`]s into [`Cmd`]s and runs them. This is the only
//! place the panel talks to the model service: state updates stay pure, and
//! every network call is spawned here and reports back as a [`Msg`].
//!
//! Submission is fire-and-forget from the panel's point of view. A failed
//! command is logged and noted in the activity log; the rows only change
//! when the parameter feed delivers a new snapshot.

use std::sync::Arc;

use paramdeck_api::ModelService;
use paramdeck_engine::{CandidateScanner, FeedRefresher};
use tokio::task::{JoinHandle, spawn};
use tracing::{debug, info, warn};

use crate::app::{App, Effect, Msg};

/// Side-effectful work derived from effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Send rendered command text to the interpreter.
    Issue { text: String, summary: String },
    /// Discover candidates for the dialog of `generation`.
    Scan { generation: u64, workflow_path: String },
    /// Ask the feed for a snapshot now.
    Refresh,
}

/// Handles shared by every spawned command.
#[derive(Clone)]
pub struct ExecContext {
    service: Arc<dyn ModelService>,
    scanner: CandidateScanner,
    refresher: FeedRefresher,
}

impl ExecContext {
    pub fn new(service: Arc<dyn ModelService>, refresher: FeedRefresher) -> Self {
        Self {
            scanner: CandidateScanner::new(Arc::clone(&service)),
            service,
            refresher,
        }
    }
}

/// Convert effects into commands, rendering command text against the
/// panel's entity. `Effect::Quit` is handled by the runtime and skipped.
pub fn from_effects(app: &App, effects: Vec<Effect>) -> Vec<Cmd> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::IssueCommand(command) => Some(Cmd::Issue {
                text: command.to_command_text(app.controller.entity()),
                summary: command.summary(),
            }),
            Effect::ScanCandidates {
                generation,
                workflow_path,
            } => Some(Cmd::Scan {
                generation,
                workflow_path,
            }),
            Effect::RefreshParameters => Some(Cmd::Refresh),
            Effect::Quit => None,
        })
        .collect()
}

/// Spawn every command; each task resolves to the message it reports.
pub fn run_cmds(ctx: &ExecContext, commands: Vec<Cmd>) -> Vec<JoinHandle<Msg>> {
    let mut pending = Vec::with_capacity(commands.len());
    for command in commands {
        match command {
            Cmd::Issue { text, summary } => pending.push(spawn(issue(ctx.clone(), text, summary))),
            Cmd::Scan {
                generation,
                workflow_path,
            } => pending.push(spawn(scan(ctx.scanner.clone(), generation, workflow_path))),
            Cmd::Refresh => ctx.refresher.refresh(),
        }
    }
    pending
}

/// Effects straight to spawned tasks.
pub fn run_from_effects(app: &App, ctx: &ExecContext, effects: Vec<Effect>) -> Vec<JoinHandle<Msg>> {
    run_cmds(ctx, from_effects(app, effects))
}

async fn issue(ctx: ExecContext, text: String, summary: String) -> Msg {
    debug!(command = %text, "issuing command");
    match ctx.service.issue_command(&text).await {
        Ok(()) => {
            info!(command = %text, "command accepted");
            ctx.refresher.refresh();
            Msg::CommandSettled { summary, error: None }
        }
        Err(error) => {
            warn!(command = %text, %error, "command rejected");
            Msg::CommandSettled {
                summary,
                error: Some(error.to_string()),
            }
        }
    }
}

async fn scan(scanner: CandidateScanner, generation: u64, workflow_path: String) -> Msg {
    let result = scanner.scan(&workflow_path).await.map_err(|error| {
        warn!(workflow = %workflow_path, %error, "candidate scan failed");
        error.to_string()
    });
    Msg::ScanFinished { generation, result }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use paramdeck_engine::ParameterFeed;
    use paramdeck_engine::memory::InMemoryModel;
    use paramdeck_types::{ComponentDetail, ComponentRef, InputDescriptor};

    use super::*;
    use crate::app::PanelConfig;

    #[test]
    fn effects_render_against_the_panel_entity() {
        let app = App::new(PanelConfig::new("top.driver"));
        let commands = from_effects(
            &app,
            vec![
                Effect::IssueCommand(app.controller.builder().clear()),
                Effect::Quit,
                Effect::RefreshParameters,
            ],
        );
        assert_eq!(
            commands,
            vec![
                Cmd::Issue {
                    text: "top.driver.clear_parameters();".into(),
                    summary: "clear all parameters".into(),
                },
                Cmd::Refresh,
            ]
        );
    }

    #[tokio::test]
    async fn issued_commands_reach_the_service_and_settle() {
        let model = Arc::new(InMemoryModel::default().with_rows(Some(Vec::new())));
        let service: Arc<dyn ModelService> = model.clone();
        let (feed, _updates) = ParameterFeed::spawn(Arc::clone(&service), "top.driver".into(), Duration::from_secs(3600));
        let ctx = ExecContext::new(service, feed.refresher());

        let handles = run_cmds(
            &ctx,
            vec![Cmd::Issue {
                text: "top.driver.clear_parameters();".into(),
                summary: "clear all parameters".into(),
            }],
        );
        for handle in handles {
            let msg = handle.await.expect("task joins");
            assert!(matches!(msg, Msg::CommandSettled { error: None, .. }));
        }
        assert_eq!(model.issued(), vec!["top.driver.clear_parameters();".to_string()]);
    }

    #[tokio::test]
    async fn rejected_commands_settle_with_an_error() {
        let model = Arc::new(InMemoryModel::default().rejecting_commands());
        let service: Arc<dyn ModelService> = model;
        let (feed, _updates) = ParameterFeed::spawn(Arc::clone(&service), "d".into(), Duration::from_secs(3600));
        let ctx = ExecContext::new(service, feed.refresher());

        let mut handles = run_cmds(
            &ctx,
            vec![Cmd::Issue {
                text: "d.clear_parameters();".into(),
                summary: "clear all parameters".into(),
            }],
        );
        let msg = handles.remove(0).await.expect("task joins");
        assert!(matches!(msg, Msg::CommandSettled { error: Some(_), .. }));
    }

    #[tokio::test]
    async fn scans_report_their_generation() {
        let model = InMemoryModel::default()
            .with_workflow("top", vec![ComponentRef::Path("top.comp1".into())])
            .with_component(
                "top.comp1",
                ComponentDetail {
                    inputs: Some(vec![InputDescriptor {
                        name: "x".into(),
                        low: None,
                        high: None,
                    }]),
                },
            );
        let service: Arc<dyn ModelService> = Arc::new(model);
        let (feed, _updates) = ParameterFeed::spawn(Arc::clone(&service), "top".into(), Duration::from_secs(3600));
        let ctx = ExecContext::new(service, feed.refresher());

        let mut handles = run_cmds(
            &ctx,
            vec![Cmd::Scan {
                generation: 7,
                workflow_path: "top".into(),
            }],
        );
        let Msg::ScanFinished { generation, result } = handles.remove(0).await.expect("task joins") else {
            panic!("expected a scan result");
        };
        assert_eq!(generation, 7);
        let outcome = result.expect("scan succeeds");
        assert_eq!(outcome.candidates.candidates()[0].as_str(), "comp1.x");
    }
}
