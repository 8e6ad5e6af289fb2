//! Candidate discovery for the add-parameter dialog.
//!
//! A scan fetches one workflow listing, then every listed component's
//! description concurrently, and turns each declared input into an
//! autocomplete candidate with advisory bounds. All component fetches are
//! joined before the scan returns, so callers always see a complete set.

use std::sync::Arc;

use futures_util::{StreamExt, stream::FuturesUnordered};
use paramdeck_api::{ModelService, ServiceError};
use paramdeck_types::{BoundsHint, Candidate, CandidateSet, ComponentDetail};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not load workflow '{path}': {source}")]
    Workflow {
        path: String,
        #[source]
        source: ServiceError,
    },
}

/// Bookkeeping for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Components listed by the workflow.
    pub components: usize,
    /// Paths of components whose description could not be fetched.
    pub failed: Vec<String>,
}

/// Result of a completed scan. Owned by exactly one dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub candidates: CandidateSet,
    pub report: ScanReport,
}

/// Walks a remote workflow to build autocomplete candidates.
#[derive(Clone)]
pub struct CandidateScanner {
    service: Arc<dyn ModelService>,
}

impl CandidateScanner {
    pub fn new(service: Arc<dyn ModelService>) -> Self {
        Self { service }
    }

    /// Run one discovery pass over the workflow at `workflow_path`.
    ///
    /// Fails only when the workflow listing itself cannot be fetched. A
    /// component whose description fails is logged and skipped.
    pub async fn scan(&self, workflow_path: &str) -> Result<ScanOutcome, ScanError> {
        let components = self
            .service
            .get_workflow(workflow_path)
            .await
            .map_err(|source| ScanError::Workflow {
                path: workflow_path.to_string(),
                source,
            })?;
        debug!(workflow = workflow_path, components = components.len(), "workflow listing received");

        let service = self.service.as_ref();
        let mut pending: FuturesUnordered<_> = components
            .iter()
            .enumerate()
            .map(|(index, component)| async move { (index, service.get_component(component.path()).await) })
            .collect();

        // Completions arrive in any order; each lands in its component's slot.
        let mut slots: Vec<Option<CandidateSet>> = (0..components.len()).map(|_| None).collect();
        let mut report = ScanReport {
            components: components.len(),
            failed: Vec::new(),
        };
        while let Some((index, result)) = pending.next().await {
            let Some(component) = components.get(index) else {
                continue;
            };
            match result {
                Ok(detail) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(candidates_for(component.short_name(), &detail));
                    }
                }
                Err(error) => {
                    warn!(component = component.path(), %error, "component description unavailable; skipping");
                    report.failed.push(component.path().to_string());
                }
            }
        }

        let mut candidates = CandidateSet::new();
        for set in slots.into_iter().flatten() {
            candidates.extend(set);
        }
        info!(
            workflow = workflow_path,
            candidates = candidates.len(),
            failed = report.failed.len(),
            "candidate scan completed"
        );
        Ok(ScanOutcome { candidates, report })
    }
}

/// Candidates contributed by one component.
///
/// A component without an input listing contributes nothing.
pub fn candidates_for(short_name: &str, detail: &ComponentDetail) -> CandidateSet {
    let mut set = CandidateSet::new();
    for input in detail.inputs.iter().flatten() {
        set.push(
            Candidate::new(short_name, &input.name),
            BoundsHint::from_values(input.low.as_ref(), input.high.as_ref()),
        );
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryModel;
    use paramdeck_types::{ComponentRef, InputDescriptor};
    use serde_json::json;

    fn input(name: &str, low: Option<serde_json::Value>, high: Option<serde_json::Value>) -> InputDescriptor {
        InputDescriptor {
            name: name.to_string(),
            low,
            high,
        }
    }

    fn model() -> InMemoryModel {
        InMemoryModel::default()
            .with_workflow(
                "top.driver",
                vec![
                    ComponentRef::Path("top.comp1".into()),
                    ComponentRef::Described {
                        pathname: "top.sub.comp2".into(),
                    },
                    ComponentRef::Path("top.bare".into()),
                ],
            )
            .with_component(
                "top.comp1",
                ComponentDetail {
                    inputs: Some(vec![input("x", Some(json!(-50)), Some(json!(50))), input("y", None, None)]),
                },
            )
            .with_component(
                "top.sub.comp2",
                ComponentDetail {
                    inputs: Some(vec![input("z", Some(json!(0)), Some(json!("")))]),
                },
            )
            .with_component("top.bare", ComponentDetail { inputs: None })
    }

    #[tokio::test]
    async fn scan_yields_one_candidate_per_input_in_workflow_order() {
        let scanner = CandidateScanner::new(Arc::new(model()));
        let outcome = scanner.scan("top.driver").await.expect("scan succeeds");
        let names: Vec<&str> = outcome.candidates.candidates().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["comp1.x", "comp1.y", "comp2.z"]);

        let x = outcome.candidates.bounds_for("comp1.x").expect("bounds for comp1.x");
        assert_eq!((x.low.as_deref(), x.high.as_deref()), (Some("-50"), Some("50")));
        assert!(outcome.candidates.bounds_for("comp1.y").expect("bounds for comp1.y").is_empty());
        assert!(outcome.candidates.bounds_for("comp2.z").expect("bounds for comp2.z").is_empty());
        assert_eq!(outcome.report.components, 3);
        assert!(outcome.report.failed.is_empty());
    }

    #[tokio::test]
    async fn failed_component_is_skipped() {
        let model = model().with_failing_component("top.comp1");
        let scanner = CandidateScanner::new(Arc::new(model));
        let outcome = scanner.scan("top.driver").await.expect("scan degrades gracefully");
        let names: Vec<&str> = outcome.candidates.candidates().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["comp2.z"]);
        assert_eq!(outcome.report.failed, vec!["top.comp1".to_string()]);
    }

    #[tokio::test]
    async fn colliding_short_names_keep_one_candidate_per_input() {
        let model = InMemoryModel::default()
            .with_workflow(
                "top.driver",
                vec![ComponentRef::Path("top.a.comp".into()), ComponentRef::Path("top.b.comp".into())],
            )
            .with_component(
                "top.a.comp",
                ComponentDetail {
                    inputs: Some(vec![input("x", Some(json!(1)), None)]),
                },
            )
            .with_component(
                "top.b.comp",
                ComponentDetail {
                    inputs: Some(vec![input("x", None, Some(json!(9)))]),
                },
            );
        let outcome = CandidateScanner::new(Arc::new(model)).scan("top.driver").await.expect("scan succeeds");

        assert_eq!(outcome.report.components, 2);
        assert_eq!(outcome.candidates.len(), 2);
        let entries: Vec<(&str, Option<&str>, Option<&str>)> = outcome
            .candidates
            .entries()
            .map(|(candidate, hint)| (candidate.as_str(), hint.low.as_deref(), hint.high.as_deref()))
            .collect();
        assert_eq!(entries, vec![("comp.x", Some("1"), None), ("comp.x", None, Some("9"))]);
    }

    #[tokio::test]
    async fn missing_workflow_reports_error() {
        let scanner = CandidateScanner::new(Arc::new(model()));
        let error = scanner.scan("top.nowhere").await.expect_err("workflow lookup fails");
        assert!(matches!(error, ScanError::Workflow { ref path, .. } if path == "top.nowhere"));
    }

    #[test]
    fn component_without_inputs_contributes_nothing() {
        assert!(candidates_for("bare", &ComponentDetail::default()).is_empty());
    }
}
