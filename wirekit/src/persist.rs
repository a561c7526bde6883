//! Diagram Persistence
//!
//! The external save/load collaborator of the engine. The store treats it
//! as fire-and-forget: mutations persist best-effort, failures are
//! logged, and the in-memory diagram stays authoritative until the next
//! successful save.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::{validate_diagram, ValidationReport, WirekitError};
use crate::schema::Diagram;

/// Save/load contract for diagram snapshots.
#[async_trait]
pub trait DiagramPersistence: Send + Sync {
    /// Load a project's diagram, `None` when the service has no snapshot.
    async fn load(&self, project_id: &str) -> Result<Option<Diagram>, WirekitError>;

    /// Persist a whole snapshot; returns the stored (versioned) copy.
    async fn save(&self, project_id: &str, diagram: &Diagram) -> Result<Diagram, WirekitError>;

    /// Ask the service to validate a snapshot.
    async fn validate(
        &self,
        project_id: &str,
        diagram: &Diagram,
    ) -> Result<ValidationReport, WirekitError>;
}

/// HTTP-backed persistence client.
pub struct HttpPersistence {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPersistence {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, project_id: &str, tail: &str) -> String {
        format!(
            "{}/projects/{}/diagram{}",
            self.base_url.trim_end_matches('/'),
            project_id,
            tail
        )
    }
}

#[async_trait]
impl DiagramPersistence for HttpPersistence {
    async fn load(&self, project_id: &str) -> Result<Option<Diagram>, WirekitError> {
        let response = self.client.get(self.url(project_id, "")).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json().await?))
    }

    async fn save(&self, project_id: &str, diagram: &Diagram) -> Result<Diagram, WirekitError> {
        let response = self
            .client
            .put(self.url(project_id, ""))
            .json(diagram)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn validate(
        &self,
        project_id: &str,
        diagram: &Diagram,
    ) -> Result<ValidationReport, WirekitError> {
        let response = self
            .client
            .post(self.url(project_id, "/validate"))
            .json(diagram)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// In-memory persistence for tests and offline use.
#[derive(Default)]
pub struct MemoryPersistence {
    snapshots: RwLock<HashMap<String, Diagram>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self, project_id: &str) -> Option<Diagram> {
        self.snapshots.read().await.get(project_id).cloned()
    }
}

#[async_trait]
impl DiagramPersistence for MemoryPersistence {
    async fn load(&self, project_id: &str) -> Result<Option<Diagram>, WirekitError> {
        Ok(self.snapshots.read().await.get(project_id).cloned())
    }

    async fn save(&self, project_id: &str, diagram: &Diagram) -> Result<Diagram, WirekitError> {
        let mut stored = diagram.clone();
        stored.metadata.version += 1;
        self.snapshots
            .write()
            .await
            .insert(project_id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn validate(
        &self,
        _project_id: &str,
        diagram: &Diagram,
    ) -> Result<ValidationReport, WirekitError> {
        Ok(validate_diagram(diagram))
    }
}
