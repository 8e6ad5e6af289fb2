//! In-memory [`ModelService`] double.
//!
//! Serves fixed workflow listings, component descriptions and parameter rows,
//! and records every issued command. Only compiled for tests or with the
//! `test-stubs` feature.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use paramdeck_api::{ModelService, ServiceError};
use paramdeck_types::{ComponentDetail, ComponentRef, Parameter};

#[derive(Debug, Default)]
pub struct InMemoryModel {
    workflows: HashMap<String, Vec<ComponentRef>>,
    components: HashMap<String, ComponentDetail>,
    failing_components: HashSet<String>,
    rows: Mutex<Option<Vec<Parameter>>>,
    issued: Mutex<Vec<String>>,
    reject_commands: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryModel {
    pub fn with_workflow(mut self, path: &str, components: Vec<ComponentRef>) -> Self {
        self.workflows.insert(path.to_string(), components);
        self
    }

    pub fn with_component(mut self, path: &str, detail: ComponentDetail) -> Self {
        self.components.insert(path.to_string(), detail);
        self
    }

    pub fn with_failing_component(mut self, path: &str) -> Self {
        self.failing_components.insert(path.to_string());
        self
    }

    pub fn with_rows(self, rows: Option<Vec<Parameter>>) -> Self {
        *lock(&self.rows) = rows;
        self
    }

    pub fn rejecting_commands(mut self) -> Self {
        self.reject_commands = true;
        self
    }

    /// Replace the rows served by later `fetch_parameters` calls.
    pub fn set_rows(&self, rows: Option<Vec<Parameter>>) {
        *lock(&self.rows) = rows;
    }

    /// Commands received so far, in arrival order.
    pub fn issued(&self) -> Vec<String> {
        lock(&self.issued).clone()
    }
}

#[async_trait::async_trait]
impl ModelService for InMemoryModel {
    async fn issue_command(&self, command: &str) -> Result<(), ServiceError> {
        if self.reject_commands {
            return Err(ServiceError::Unavailable("command interpreter offline".into()));
        }
        lock(&self.issued).push(command.to_string());
        Ok(())
    }

    async fn get_workflow(&self, path: &str) -> Result<Vec<ComponentRef>, ServiceError> {
        self.workflows
            .get(path)
            .cloned()
            .ok_or_else(|| ServiceError::Unavailable(format!("no workflow at {path}")))
    }

    async fn get_component(&self, path: &str) -> Result<ComponentDetail, ServiceError> {
        if self.failing_components.contains(path) {
            return Err(ServiceError::Unavailable(format!("component {path} failed to load")));
        }
        self.components
            .get(path)
            .cloned()
            .ok_or_else(|| ServiceError::Unavailable(format!("no component at {path}")))
    }

    async fn fetch_parameters(&self, _entity: &str) -> Result<Option<Vec<Parameter>>, ServiceError> {
        Ok(lock(&self.rows).clone())
    }
}
