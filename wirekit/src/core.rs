//! Core error type and diagram validation.
//!
//! Validation implements the persistence service's validate contract:
//! referential checks over a diagram snapshot producing a report of
//! errors and warnings, never a panic. A connection referencing a
//! missing component is an `invalid_connection` error; rendering skips
//! it rather than crashing.

use serde::{Deserialize, Serialize};

use crate::graph::{links_equal, resolved_link};
use crate::schema::Diagram;

#[derive(Debug, thiserror::Error)]
pub enum WirekitError {
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for WirekitError {
    fn from(e: reqwest::Error) -> Self {
        WirekitError::Persistence(e.to_string())
    }
}

/// One finding from a validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Stable machine code, e.g. `invalid_connection`.
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// Result of validating one diagram snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn total_findings(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}

/// Validate a diagram: referential integrity of connections, duplicate
/// wires, and components placed with no pins.
pub fn validate_diagram(diagram: &Diagram) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for conn in &diagram.connections {
        for endpoint in [&conn.from_component, &conn.to_component] {
            if diagram.find_component(endpoint).is_none() {
                errors.push(ValidationIssue {
                    code: "invalid_connection".to_string(),
                    message: format!(
                        "connection {} references missing component {}",
                        conn.id, endpoint
                    ),
                    connection: Some(conn.id.clone()),
                    component: Some(endpoint.clone()),
                });
            }
        }
    }

    let links: Vec<_> = diagram
        .connections
        .iter()
        .map(|c| (c.id.clone(), resolved_link(diagram, c)))
        .collect();
    for (i, (id, link)) in links.iter().enumerate() {
        let Some(link) = link else { continue };
        let dup = links[..i].iter().any(|(_, earlier)| {
            earlier.as_ref().is_some_and(|e| links_equal(e, link))
        });
        if dup {
            warnings.push(ValidationIssue {
                code: "duplicate_connection".to_string(),
                message: format!("connection {id} duplicates an earlier wire"),
                connection: Some(id.clone()),
                component: None,
            });
        }
    }

    for comp in &diagram.components {
        if comp.pins.is_empty() {
            warnings.push(ValidationIssue {
                code: "empty_component".to_string(),
                message: format!("component {} has no pins", comp.id),
                connection: None,
                component: Some(comp.id.clone()),
            });
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Component, Connection, Pin, PinKind, Point, WireKind};

    fn two_part_diagram() -> Diagram {
        let mut d = Diagram::new("d", "test");
        for id in ["a", "b"] {
            d.components.push(Component {
                id: id.to_string(),
                name: id.to_uppercase(),
                kind: "sensor".to_string(),
                position: Point::default(),
                pins: vec![
                    Pin::new("vcc", "VCC", PinKind::Power),
                    Pin::new("gnd", "GND", PinKind::Ground),
                ],
            });
        }
        d
    }

    #[test]
    fn test_valid_diagram() {
        let mut d = two_part_diagram();
        d.connections.push(Connection::new("c1", "a", "vcc", "b", "vcc", WireKind::Power));
        let report = validate_diagram(&d);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_missing_component_is_invalid_connection() {
        let mut d = two_part_diagram();
        d.connections.push(Connection::new("c1", "a", "vcc", "ghost", "vcc", WireKind::Power));
        let report = validate_diagram(&d);
        assert!(!report.is_valid);
        assert_eq!(report.errors[0].code, "invalid_connection");
        assert_eq!(report.errors[0].connection.as_deref(), Some("c1"));
    }

    #[test]
    fn test_reversed_duplicate_flagged() {
        let mut d = two_part_diagram();
        d.connections.push(Connection::new("c1", "a", "vcc", "b", "vcc", WireKind::Power));
        d.connections.push(Connection::new("c2", "b", "vcc", "a", "vcc", WireKind::Power));
        let report = validate_diagram(&d);
        assert!(report.is_valid);
        assert_eq!(report.warnings[0].code, "duplicate_connection");
        assert_eq!(report.warnings[0].connection.as_deref(), Some("c2"));
    }
}
