//! Workflow and component descriptors returned by the remote model service.
//!
//! Only the parts the candidate scanner needs are modelled; unknown keys are
//! ignored so richer payloads deserialize cleanly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a workflow listing.
///
/// Services report either a bare dotted path or an object carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentRef {
    Path(String),
    Described { pathname: String },
}

impl ComponentRef {
    /// Full dotted path used to fetch the component's description.
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Described { pathname } => pathname,
        }
    }

    /// Last path segment; candidates are reported relative to the workflow.
    pub fn short_name(&self) -> &str {
        let path = self.path();
        path.rsplit('.').next().unwrap_or(path)
    }
}

/// A component's declared interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDetail {
    /// Declared inputs. Absent for components without an input listing.
    #[serde(rename = "Inputs", default)]
    pub inputs: Option<Vec<InputDescriptor>>,
}

/// One declared input of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub name: String,
    #[serde(default)]
    pub low: Option<Value>,
    #[serde(default)]
    pub high: Option<Value>,
}
