//! Panel orchestration: add, clear and the lifecycle of the add dialog.
//!
//! The controller owns the single dialog slot and the scan generation
//! counter. Every add request bumps the generation, so a scan result is
//! applied only to the dialog that asked for it; anything else is dropped.

use paramdeck_engine::{CommandBuilder, ParameterCommand, ScanOutcome, ScanReport};
use paramdeck_types::PendingCommand;
use tracing::debug;

use crate::app::Effect;
use crate::ui::components::parameters::{DialogEvent, ParameterDialog};

/// What happened to a finished scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDelivery {
    /// Installed into the open dialog.
    Applied(ScanReport),
    /// The dialog it was meant for is gone.
    Discarded,
    /// The workflow listing failed; the dialog stays usable without
    /// suggestions.
    Failed(String),
}

#[derive(Debug)]
pub struct PanelController {
    entity: String,
    builder: CommandBuilder,
    dialog: Option<ParameterDialog>,
    scan_generation: u64,
}

impl PanelController {
    pub fn new(entity: impl Into<String>, builder: CommandBuilder) -> Self {
        Self {
            entity: entity.into(),
            builder,
            dialog: None,
            scan_generation: 0,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog(&self) -> Option<&ParameterDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut ParameterDialog> {
        self.dialog.as_mut()
    }

    /// Open the add dialog and start a fresh candidate scan.
    ///
    /// Ignored while a dialog is already open.
    pub fn request_add(&mut self) -> Vec<Effect> {
        if self.dialog.is_some() {
            debug!("add requested while the dialog is open; ignoring");
            return Vec::new();
        }
        self.scan_generation += 1;
        self.dialog = Some(ParameterDialog::new(self.scan_generation));
        vec![Effect::ScanCandidates {
            generation: self.scan_generation,
            workflow_path: self.entity.clone(),
        }]
    }

    pub fn request_clear(&self) -> Vec<Effect> {
        vec![Effect::IssueCommand(self.builder.clear())]
    }

    /// Forward a command produced elsewhere (table delete or cell edit).
    pub fn submit(&self, command: Option<ParameterCommand>) -> Vec<Effect> {
        command.map(Effect::IssueCommand).into_iter().collect()
    }

    /// Consume the dialog's terminal event and drop the dialog.
    pub fn settle_dialog(&mut self, event: DialogEvent) -> Vec<Effect> {
        self.dialog = None;
        match event {
            DialogEvent::Submitted(form) => {
                let pending = PendingCommand::from_form(form);
                if pending.targets.is_empty() {
                    debug!("dialog submitted without usable targets; nothing to send");
                    return Vec::new();
                }
                vec![Effect::IssueCommand(self.builder.add(pending))]
            }
            DialogEvent::Cancelled => Vec::new(),
        }
    }

    /// Route a finished scan to the dialog of the same generation.
    pub fn apply_scan(&mut self, generation: u64, result: Result<ScanOutcome, String>) -> ScanDelivery {
        let Some(dialog) = self.dialog.as_mut().filter(|dialog| dialog.generation() == generation && dialog.is_open()) else {
            debug!(generation, current = self.scan_generation, "discarding stale scan result");
            return ScanDelivery::Discarded;
        };
        match result {
            Ok(outcome) => {
                dialog.set_candidates(outcome.candidates);
                ScanDelivery::Applied(outcome.report)
            }
            Err(message) => {
                dialog.set_discovery_failed(message.clone());
                ScanDelivery::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use paramdeck_engine::FalsyPolicy;
    use paramdeck_types::{BoundsHint, Candidate, CandidateSet, ParameterForm};

    use super::*;
    use crate::ui::components::parameters::Discovery;

    fn controller() -> PanelController {
        PanelController::new("top.driver", CommandBuilder::new(FalsyPolicy::TextPresence))
    }

    fn outcome() -> ScanOutcome {
        let mut candidates = CandidateSet::new();
        candidates.push(Candidate::new("comp1", "x"), BoundsHint::default());
        ScanOutcome {
            candidates,
            report: ScanReport {
                components: 1,
                failed: Vec::new(),
            },
        }
    }

    #[test]
    fn add_opens_one_dialog_and_scans_the_entity_workflow() {
        let mut controller = controller();
        let effects = controller.request_add();
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScanCandidates { generation: 1, workflow_path }] if workflow_path == "top.driver"
        ));
        assert!(controller.is_dialog_open());
        assert!(controller.request_add().is_empty());
    }

    #[test]
    fn scan_results_reach_only_their_own_dialog() {
        let mut controller = controller();
        controller.request_add();
        assert_eq!(
            controller.settle_dialog(DialogEvent::Cancelled),
            Vec::new()
        );
        controller.request_add();

        assert_eq!(controller.apply_scan(1, Ok(outcome())), ScanDelivery::Discarded);
        assert_eq!(
            controller.dialog().map(|dialog| dialog.discovery().clone()),
            Some(Discovery::Pending)
        );
        assert!(matches!(controller.apply_scan(2, Ok(outcome())), ScanDelivery::Applied(_)));
        assert!(matches!(controller.dialog().map(ParameterDialog::discovery), Some(Discovery::Ready(_))));
    }

    #[test]
    fn results_after_close_are_discarded() {
        let mut controller = controller();
        controller.request_add();
        controller.settle_dialog(DialogEvent::Cancelled);
        assert_eq!(controller.apply_scan(1, Err("boom".into())), ScanDelivery::Discarded);
    }

    #[test]
    fn failed_scan_leaves_the_dialog_usable() {
        let mut controller = controller();
        controller.request_add();
        assert_eq!(controller.apply_scan(1, Err("offline".into())), ScanDelivery::Failed("offline".into()));
        assert!(controller.dialog().is_some_and(ParameterDialog::is_open));
    }

    #[test]
    fn submitted_form_becomes_one_add_command() {
        let mut controller = controller();
        controller.request_add();
        let effects = controller.settle_dialog(DialogEvent::Submitted(ParameterForm {
            target: "comp1.x".into(),
            low: "0".into(),
            high: "10".into(),
            ..Default::default()
        }));
        let [Effect::IssueCommand(command)] = effects.as_slice() else {
            panic!("expected one command, got {effects:?}");
        };
        assert_eq!(
            command.to_command_text("path"),
            "path.add_parameter('comp1.x',low=0,high=10);"
        );
        assert!(!controller.is_dialog_open());
    }

    #[test]
    fn clear_issues_the_constant_command() {
        let controller = controller();
        assert_eq!(
            controller.request_clear(),
            vec![Effect::IssueCommand(ParameterCommand::ClearParameters)]
        );
    }
}
