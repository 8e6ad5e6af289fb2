//! Application state and message handling for the parameter panel.
//!
//! [`App`] owns every piece of UI state. Asynchronous results come back as
//! [`Msg`]s through [`App::update`]; anything that needs I/O leaves as an
//! [`Effect`] for the command layer in `cmd`.

use std::time::Duration;

use paramdeck_engine::{CommandBuilder, FalsyPolicy, FeedUpdate, ParameterCommand, ScanOutcome};
use paramdeck_types::Severity;
use tracing::debug;

use crate::controller::{PanelController, ScanDelivery};
use crate::ui::components::activity::ActivityLog;
use crate::ui::components::parameters::ParameterTableState;
use crate::ui::theme::{self, Theme};

/// Settings the panel is started with.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Path of the entity whose parameters are shown (for example a driver).
    pub entity: String,
    /// Whether table cells can be edited in place.
    pub editable: bool,
    pub policy: FalsyPolicy,
    /// How often the parameter feed polls when not nudged.
    pub refresh_interval: Duration,
}

impl PanelConfig {
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            editable: true,
            policy: FalsyPolicy::default(),
            refresh_interval: Self::DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Results delivered back into the UI loop.
#[derive(Debug, Clone)]
pub enum Msg {
    Feed(FeedUpdate),
    ScanFinished {
        generation: u64,
        result: Result<ScanOutcome, String>,
    },
    CommandSettled {
        summary: String,
        error: Option<String>,
    },
    /// A spawned task panicked or was aborted.
    TaskFailed(String),
    Tick,
    Resize(u16, u16),
}

/// Side effects requested by components and the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    IssueCommand(ParameterCommand),
    ScanCandidates { generation: u64, workflow_path: String },
    RefreshParameters,
    Quit,
}

/// Connection state of the parameter feed, shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Waiting,
    Live,
    /// The service answered without a row list.
    NoData,
    Unreachable(String),
}

pub struct App {
    pub config: PanelConfig,
    pub theme: Box<dyn Theme>,
    pub table: ParameterTableState,
    pub controller: PanelController,
    pub activity: ActivityLog,
    pub feed_status: FeedStatus,
    /// True while spawned commands or scans are outstanding.
    pub executing: bool,
    pub throbber_idx: usize,
}

impl App {
    pub fn new(config: PanelConfig) -> Self {
        let table = ParameterTableState::new(config.entity.clone(), config.editable);
        let controller = PanelController::new(config.entity.clone(), CommandBuilder::new(config.policy));
        Self {
            config,
            theme: theme::load(),
            table,
            controller,
            activity: ActivityLog::default(),
            feed_status: FeedStatus::default(),
            executing: false,
            throbber_idx: 0,
        }
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Feed(FeedUpdate::Rows(rows)) => {
                let status = if rows.is_some() { FeedStatus::Live } else { FeedStatus::NoData };
                if let Some(notice) = self.table.load_data(rows)
                    && self.feed_status != FeedStatus::NoData
                {
                    self.activity.push(Severity::Warning, notice);
                }
                self.feed_status = status;
            }
            Msg::Feed(FeedUpdate::Unreachable(error)) => {
                if !matches!(self.feed_status, FeedStatus::Unreachable(_)) {
                    self.activity.push(Severity::Error, format!("model service unreachable: {error}"));
                }
                self.feed_status = FeedStatus::Unreachable(error);
            }
            Msg::ScanFinished { generation, result } => match self.controller.apply_scan(generation, result) {
                ScanDelivery::Applied(report) => {
                    if !report.failed.is_empty() {
                        self.activity.push(
                            Severity::Warning,
                            format!("skipped {} of {} components: {}", report.failed.len(), report.components, report.failed.join(", ")),
                        );
                    }
                }
                ScanDelivery::Failed(message) => {
                    self.activity.push(Severity::Error, format!("candidate discovery failed: {message}"));
                }
                ScanDelivery::Discarded => {}
            },
            Msg::CommandSettled { summary, error } => match error {
                Some(error) => self.activity.push(Severity::Error, format!("{summary} failed: {error}")),
                None => self.activity.push(Severity::Success, format!("sent: {summary}")),
            },
            Msg::TaskFailed(error) => self.activity.push(Severity::Error, format!("background task failed: {error}")),
            Msg::Tick => {
                if self.executing {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER.len();
                }
            }
            Msg::Resize(width, height) => debug!(width, height, "terminal resized"),
        }
        Vec::new()
    }

    /// Spinner frame for the header while work is outstanding.
    pub fn throbber(&self) -> Option<&'static str> {
        self.executing.then(|| THROBBER[self.throbber_idx % THROBBER.len()])
    }
}

const THROBBER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
