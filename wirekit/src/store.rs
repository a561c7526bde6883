//! Diagram Store
//!
//! Owns the mutable diagram for one project: add/update/delete of
//! components and connections, cascade deletion, the duplicate-wire
//! guard, and on-the-fly synthesis of components for connection
//! endpoints that have not been placed yet. Every mutation bumps
//! `updated_at` and schedules a best-effort background save; a failed
//! save is logged and never rolls back the in-memory state.

use std::sync::Arc;

use crate::factory::build_component;
use crate::graph::{links_equal, refresh_connected_flags, resolved_link};
use crate::ids::{IdGenerator, UuidIds};
use crate::persist::DiagramPersistence;
use crate::resolver::resolve_pin;
use crate::schema::{
    Component, Connection, Diagram, Material, Point, WireKind,
};
use crate::suggestion::{Suggestion, SuggestionAction};

/// Partial update for a connection; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ConnectionUpdate {
    pub wire_type: Option<WireKind>,
    pub wire_color: Option<String>,
    pub label: Option<Option<String>>,
    pub validated: Option<bool>,
    pub error: Option<Option<String>>,
}

/// Partial update for a component; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ComponentUpdate {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub position: Option<Point>,
}

/// The mutable diagram aggregate for one project.
pub struct DiagramStore {
    project_id: String,
    diagram: Option<Diagram>,
    ids: Arc<dyn IdGenerator>,
    persistence: Option<Arc<dyn DiagramPersistence>>,
}

impl DiagramStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            diagram: None,
            ids: Arc::new(UuidIds),
            persistence: None,
        }
    }

    /// Replace the id generator (deterministic ids in tests).
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Attach a persistence collaborator for background saves.
    pub fn with_persistence(mut self, persistence: Arc<dyn DiagramPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn id_generator(&self) -> Arc<dyn IdGenerator> {
        Arc::clone(&self.ids)
    }

    /// Adopt a loaded snapshot as the current diagram.
    pub fn set_diagram(&mut self, diagram: Diagram) {
        self.diagram = Some(diagram);
    }

    /// Replace the local diagram wholesale when a fresher remote snapshot
    /// is observed (last write wins; no merge).
    pub fn sync_from_remote(&mut self, remote: Diagram) -> bool {
        let fresher = match &self.diagram {
            Some(local) => remote.metadata.updated_at > local.metadata.updated_at,
            None => true,
        };
        if fresher {
            tracing::info!(
                project = %self.project_id,
                "adopting fresher remote diagram snapshot"
            );
            self.diagram = Some(remote);
        }
        fresher
    }

    /// Add a placed component. Creates the diagram on first use;
    /// re-adding an existing id overwrites in place.
    pub fn add_component(&mut self, component: Component) {
        let diagram = self.ensure_diagram();
        match diagram.components.iter_mut().find(|c| c.id == component.id) {
            Some(existing) => *existing = component,
            None => diagram.components.push(component),
        }
        diagram.touch();
        self.schedule_save();
    }

    /// Add a connection, synthesizing endpoint components as needed.
    ///
    /// On a fresh project the whole materials palette is placed at once,
    /// so the first drawn wire lands on a fully populated canvas; with an
    /// existing diagram only the missing endpoints are synthesized.
    /// Endpoint pins are resolved before storing. Returns `false` when an
    /// equivalent wire (in either direction) already exists.
    pub fn add_connection(&mut self, mut conn: Connection, materials: &[Material]) -> bool {
        if self.diagram.is_none() {
            let mut diagram = Diagram::new(
                format!("diagram-{}", self.project_id),
                "Wiring Diagram",
            );
            for (index, material) in materials.iter().enumerate() {
                diagram.components.push(build_component(material, index, None));
            }
            self.diagram = Some(diagram);
        }
        let from_id = conn.from_component.clone();
        let to_id = conn.to_component.clone();
        self.ensure_endpoint(&from_id, materials);
        self.ensure_endpoint(&to_id, materials);

        let diagram = self.ensure_diagram();

        if let Some(from) = diagram.find_component(&conn.from_component) {
            conn.from_pin = resolve_pin(&conn.from_pin, &from.pins);
        }
        if let Some(to) = diagram.find_component(&conn.to_component) {
            conn.to_pin = resolve_pin(&conn.to_pin, &to.pins);
        }

        if let Some(link) = resolved_link(diagram, &conn) {
            let duplicate = diagram.connections.iter().any(|existing| {
                resolved_link(diagram, existing)
                    .is_some_and(|other| links_equal(&other, &link))
            });
            if duplicate {
                tracing::debug!(connection = %conn.id, "ignoring duplicate connection");
                return false;
            }
        }

        diagram.connections.push(conn);
        refresh_connected_flags(diagram);
        diagram.touch();
        self.schedule_save();
        true
    }

    /// Apply a normalized AI suggestion. Dismissed suggestions and ones
    /// without actionable data are no-ops.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion, materials: &[Material]) -> bool {
        if suggestion.action == SuggestionAction::Dismiss {
            return false;
        }
        if let Some(data) = &suggestion.connection {
            let mut conn = Connection::new(
                self.ids.next(),
                &data.from_component,
                &data.from_pin,
                &data.to_component,
                &data.to_pin,
                data.wire_type,
            );
            if let Some(color) = &data.wire_color {
                conn.wire_color = color.clone();
            }
            conn.label = data.label.clone();
            return self.add_connection(conn, materials);
        }
        if let Some(data) = &suggestion.component {
            if let Some(material) = materials.iter().find(|m| m.id == data.material_id) {
                let index = self
                    .diagram
                    .as_ref()
                    .map(|d| d.components.len())
                    .unwrap_or(0);
                let preset = data.pins.clone().map(crate::factory::PinPreset::Names);
                self.add_component(build_component(material, index, preset));
                return true;
            }
            tracing::debug!(
                material = %data.material_id,
                "component suggestion references unknown material"
            );
        }
        false
    }

    pub fn update_connection(&mut self, id: &str, update: ConnectionUpdate) -> bool {
        let Some(diagram) = self.diagram.as_mut() else {
            return false;
        };
        let Some(conn) = diagram.connections.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(wire_type) = update.wire_type {
            conn.wire_type = wire_type;
        }
        if let Some(color) = update.wire_color {
            conn.wire_color = color;
        }
        if let Some(label) = update.label {
            conn.label = label;
        }
        if let Some(validated) = update.validated {
            conn.validated = validated;
        }
        if let Some(error) = update.error {
            conn.error = error;
        }
        diagram.touch();
        self.schedule_save();
        true
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        let Some(diagram) = self.diagram.as_mut() else {
            return false;
        };
        let before = diagram.connections.len();
        diagram.connections.retain(|c| c.id != id);
        let removed = diagram.connections.len() != before;
        if removed {
            refresh_connected_flags(diagram);
            diagram.touch();
            self.schedule_save();
        }
        removed
    }

    /// Remove a component and cascade-delete every connection that
    /// references it.
    pub fn delete_component(&mut self, id: &str) -> bool {
        let Some(diagram) = self.diagram.as_mut() else {
            return false;
        };
        let before = diagram.components.len();
        diagram.components.retain(|c| c.id != id);
        if diagram.components.len() == before {
            return false;
        }
        diagram
            .connections
            .retain(|c| c.from_component != id && c.to_component != id);
        refresh_connected_flags(diagram);
        diagram.touch();
        self.schedule_save();
        true
    }

    pub fn update_component(&mut self, id: &str, update: ComponentUpdate) -> bool {
        let Some(diagram) = self.diagram.as_mut() else {
            return false;
        };
        let Some(comp) = diagram.components.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            comp.name = name;
        }
        if let Some(kind) = update.kind {
            comp.kind = kind.to_lowercase();
        }
        if let Some(position) = update.position {
            comp.position = position;
        }
        diagram.touch();
        self.schedule_save();
        true
    }

    /// Persist the current diagram immediately.
    pub async fn save_now(&self) -> Result<(), crate::core::WirekitError> {
        let (Some(diagram), Some(persistence)) = (&self.diagram, &self.persistence) else {
            return Ok(());
        };
        persistence.save(&self.project_id, diagram).await?;
        Ok(())
    }

    fn ensure_diagram(&mut self) -> &mut Diagram {
        self.diagram.get_or_insert_with(|| {
            Diagram::new(format!("diagram-{}", self.project_id), "Wiring Diagram")
        })
    }

    /// Synthesize a missing endpoint component: from its material when
    /// the palette knows it, otherwise a minimal placeholder.
    fn ensure_endpoint(&mut self, component_id: &str, materials: &[Material]) {
        let diagram = self.ensure_diagram();
        if diagram.find_component(component_id).is_some() {
            return;
        }
        let index = diagram.components.len();
        let component = match materials.iter().find(|m| m.id == component_id) {
            Some(material) => build_component(material, index, None),
            None => {
                tracing::debug!(
                    component = component_id,
                    "synthesizing placeholder for unknown component"
                );
                let placeholder = Material {
                    id: component_id.to_string(),
                    ..Default::default()
                };
                build_component(&placeholder, index, None)
            }
        };
        diagram.components.push(component);
    }

    /// Best-effort background save; failures are logged as `save_error`
    /// and the in-memory diagram stays the source of truth.
    fn schedule_save(&self) {
        let (Some(diagram), Some(persistence)) = (&self.diagram, &self.persistence) else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime available, skipping background save");
            return;
        };
        let diagram = diagram.clone();
        let persistence = Arc::clone(persistence);
        let project = self.project_id.clone();
        handle.spawn(async move {
            if let Err(e) = persistence.save(&project, &diagram).await {
                tracing::warn!(project = %project, error = %e, "save_error: diagram save failed");
            }
        });
    }
}
