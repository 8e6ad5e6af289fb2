//! State machine behind the add-parameter dialog.
//!
//! A dialog is created `Open` for one candidate scan generation and ends in
//! exactly one terminal phase. `confirm` and `cancel` each hand back a
//! [`DialogEvent`] the first time they succeed and `None` afterwards, so the
//! controller observes a single outcome per dialog. The controller drops the
//! dialog once it has that outcome; nothing from it outlives the interaction.

use paramdeck_types::{CandidateSet, ParameterForm};

use crate::ui::components::common::TextInputState;

/// Upper bound on suggestions shown below the target field.
pub const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Open,
    Submitted,
    Cancelled,
}

/// Progress of the candidate scan feeding this dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Pending,
    Ready(CandidateSet),
    Failed(String),
}

/// Terminal outcome reported to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Submitted(ParameterForm),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogField {
    Target,
    Low,
    High,
    Scaler,
    Adder,
    Name,
}

impl DialogField {
    pub const ALL: [DialogField; 6] = [Self::Target, Self::Low, Self::High, Self::Scaler, Self::Adder, Self::Name];

    pub fn label(self) -> &'static str {
        match self {
            Self::Target => "Target",
            Self::Low => "Low",
            Self::High => "High",
            Self::Scaler => "Scaler",
            Self::Adder => "Adder",
            Self::Name => "Name",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug)]
pub struct ParameterDialog {
    generation: u64,
    phase: DialogPhase,
    discovery: Discovery,
    inputs: [TextInputState; 6],
    focus: DialogField,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
    error: Option<String>,
}

impl ParameterDialog {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            phase: DialogPhase::Open,
            discovery: Discovery::Pending,
            inputs: Default::default(),
            focus: DialogField::Target,
            suggestions: Vec::new(),
            highlighted: None,
            error: None,
        }
    }

    /// Scan generation this dialog accepts candidates from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == DialogPhase::Open
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// Install the candidates found by this dialog's scan.
    pub fn set_candidates(&mut self, candidates: CandidateSet) {
        if !self.is_open() {
            return;
        }
        self.discovery = Discovery::Ready(candidates);
        self.refresh_suggestions();
    }

    pub fn set_discovery_failed(&mut self, message: String) {
        if self.is_open() {
            self.discovery = Discovery::Failed(message);
        }
    }

    pub fn focused(&self) -> DialogField {
        self.focus
    }

    pub fn focus(&mut self, field: DialogField) {
        self.focus = field;
        self.refresh_suggestions();
    }

    pub fn focus_next(&mut self) {
        self.focus(self.focus.next());
    }

    pub fn focus_previous(&mut self) {
        self.focus(self.focus.previous());
    }

    pub fn input(&self, field: DialogField) -> &TextInputState {
        &self.inputs[field.index()]
    }

    /// Validation message from the last rejected confirm, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Apply an edit to the focused field.
    pub fn edit(&mut self, apply: impl FnOnce(&mut TextInputState)) {
        if !self.is_open() {
            return;
        }
        apply(&mut self.inputs[self.focus.index()]);
        self.error = None;
        if self.focus == DialogField::Target {
            self.refresh_suggestions();
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(index) => (index + 1) % self.suggestions.len(),
            None => 0,
        });
    }

    pub fn highlight_previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.highlighted = Some(match self.highlighted {
            Some(0) | None => last,
            Some(index) => index - 1,
        });
    }

    pub fn highlight(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.highlighted = Some(index);
        }
    }

    /// Portion of the target text currently being completed: everything
    /// after the last comma, without leading whitespace.
    pub fn target_token(&self) -> &str {
        let target = self.input(DialogField::Target).input();
        let start = target.rfind(',').map_or(0, |comma| comma + 1);
        target[start..].trim_start()
    }

    /// Commit the highlighted suggestion into the target field.
    ///
    /// Empty low/high fields are pre-filled from the candidate's bounds
    /// hint. Returns false when nothing was highlighted.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(candidate) = self.highlighted.and_then(|index| self.suggestions.get(index)).cloned() else {
            return false;
        };
        let target = &mut self.inputs[DialogField::Target.index()];
        let kept = target.input().rfind(',').map_or(0, |comma| comma + 1);
        let mut text = target.input()[..kept].to_string();
        text.push_str(&candidate);
        target.set_input(text);

        if let Discovery::Ready(candidates) = &self.discovery
            && let Some(hint) = candidates.bounds_for(&candidate)
        {
            let fills = [(DialogField::Low, &hint.low), (DialogField::High, &hint.high)];
            for (field, bound) in fills {
                let input = &mut self.inputs[field.index()];
                if let Some(bound) = bound
                    && input.input().is_empty()
                {
                    input.set_input(bound.clone());
                }
            }
        }
        self.suggestions.clear();
        self.highlighted = None;
        true
    }

    /// Finish the dialog with the six fields exactly as typed.
    ///
    /// A blank target keeps the dialog open with a validation message.
    pub fn confirm(&mut self) -> Option<DialogEvent> {
        if !self.is_open() {
            return None;
        }
        if self.input(DialogField::Target).is_blank() {
            self.error = Some("a target is required".to_string());
            self.focus(DialogField::Target);
            return None;
        }
        self.phase = DialogPhase::Submitted;
        let [target, low, high, scaler, adder, name] = &mut self.inputs;
        let form = ParameterForm {
            target: target.take(),
            low: low.take(),
            high: high.take(),
            scaler: scaler.take(),
            adder: adder.take(),
            name: name.take(),
        };
        self.release();
        Some(DialogEvent::Submitted(form))
    }

    pub fn cancel(&mut self) -> Option<DialogEvent> {
        if !self.is_open() {
            return None;
        }
        self.phase = DialogPhase::Cancelled;
        self.inputs = Default::default();
        self.release();
        Some(DialogEvent::Cancelled)
    }

    fn release(&mut self) {
        self.discovery = Discovery::Pending;
        self.suggestions.clear();
        self.highlighted = None;
    }

    fn refresh_suggestions(&mut self) {
        self.highlighted = None;
        self.suggestions.clear();
        if self.focus != DialogField::Target {
            return;
        }
        let Discovery::Ready(candidates) = &self.discovery else {
            return;
        };
        let token = self.target_token();
        let mut suggestions: Vec<String> = Vec::new();
        // Components sharing a short name spell the same candidate; list it once.
        for candidate in candidates.matching(token) {
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
            if candidate.as_str() != token && !suggestions.iter().any(|seen| seen == candidate.as_str()) {
                suggestions.push(candidate.as_str().to_string());
            }
        }
        self.suggestions = suggestions;
    }
}

#[cfg(test)]
mod tests {
    use paramdeck_types::{BoundsHint, Candidate};

    use super::*;

    fn candidates() -> CandidateSet {
        let mut set = CandidateSet::new();
        set.push(
            Candidate::new("comp1", "x"),
            BoundsHint {
                low: Some("-5".into()),
                high: Some("5".into()),
            },
        );
        set.push(Candidate::new("comp1", "y"), BoundsHint::default());
        set.push(Candidate::new("comp2", "x"), BoundsHint::default());
        set
    }

    fn type_text(dialog: &mut ParameterDialog, text: &str) {
        for c in text.chars() {
            dialog.edit(|input| input.insert_char(c));
        }
    }

    #[test]
    fn opens_in_discovering_state() {
        let dialog = ParameterDialog::new(3);
        assert_eq!(dialog.generation(), 3);
        assert!(dialog.is_open());
        assert_eq!(dialog.discovery(), &Discovery::Pending);
        assert!(dialog.suggestions().is_empty());
    }

    #[test]
    fn suggestions_follow_the_token_after_the_last_comma() {
        let mut dialog = ParameterDialog::new(1);
        dialog.set_candidates(candidates());
        assert_eq!(dialog.suggestions().len(), 3);

        type_text(&mut dialog, "comp1.x, comp2");
        assert_eq!(dialog.target_token(), "comp2");
        assert_eq!(dialog.suggestions(), ["comp2.x"]);
    }

    #[test]
    fn repeated_spellings_are_suggested_once() {
        let mut set = candidates();
        set.push(Candidate::new("comp2", "x"), BoundsHint::default());
        let mut dialog = ParameterDialog::new(1);
        dialog.set_candidates(set);
        type_text(&mut dialog, "comp2");
        assert_eq!(dialog.suggestions(), ["comp2.x"]);
    }

    #[test]
    fn accepting_a_suggestion_keeps_earlier_members_and_prefills_bounds() {
        let mut dialog = ParameterDialog::new(1);
        dialog.set_candidates(candidates());
        type_text(&mut dialog, "comp2.x,comp1.");
        dialog.highlight_next();
        assert_eq!(dialog.highlighted(), Some(0));
        assert!(dialog.accept_suggestion());

        assert_eq!(dialog.input(DialogField::Target).input(), "comp2.x,comp1.x");
        assert_eq!(dialog.input(DialogField::Low).input(), "-5");
        assert_eq!(dialog.input(DialogField::High).input(), "5");
        assert!(dialog.suggestions().is_empty());
    }

    #[test]
    fn prefill_never_overwrites_typed_bounds() {
        let mut dialog = ParameterDialog::new(1);
        dialog.set_candidates(candidates());
        dialog.focus(DialogField::Low);
        type_text(&mut dialog, "0");
        dialog.focus(DialogField::Target);
        type_text(&mut dialog, "comp1.");
        dialog.highlight(0);
        assert!(dialog.accept_suggestion());
        assert_eq!(dialog.input(DialogField::Low).input(), "0");
        assert_eq!(dialog.input(DialogField::High).input(), "5");
    }

    #[test]
    fn confirm_emits_the_form_once() {
        let mut dialog = ParameterDialog::new(1);
        type_text(&mut dialog, " a.x , a.y ");
        dialog.focus(DialogField::Name);
        type_text(&mut dialog, "grp1");

        let event = dialog.confirm();
        assert_eq!(
            event,
            Some(DialogEvent::Submitted(ParameterForm {
                target: " a.x , a.y ".into(),
                name: "grp1".into(),
                ..Default::default()
            }))
        );
        assert_eq!(dialog.phase(), DialogPhase::Submitted);
        assert_eq!(dialog.confirm(), None);
        assert_eq!(dialog.cancel(), None);
    }

    #[test]
    fn blank_target_keeps_dialog_open() {
        let mut dialog = ParameterDialog::new(1);
        dialog.focus(DialogField::Low);
        type_text(&mut dialog, "1");
        assert_eq!(dialog.confirm(), None);
        assert!(dialog.is_open());
        assert_eq!(dialog.focused(), DialogField::Target);
        assert!(dialog.error().is_some());
    }

    #[test]
    fn cancel_is_terminal_and_ignores_late_candidates() {
        let mut dialog = ParameterDialog::new(1);
        assert_eq!(dialog.cancel(), Some(DialogEvent::Cancelled));
        assert_eq!(dialog.phase(), DialogPhase::Cancelled);
        dialog.set_candidates(candidates());
        assert_eq!(dialog.discovery(), &Discovery::Pending);
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut dialog = ParameterDialog::new(1);
        dialog.focus_previous();
        assert_eq!(dialog.focused(), DialogField::Name);
        dialog.focus_next();
        assert_eq!(dialog.focused(), DialogField::Target);
    }
}
