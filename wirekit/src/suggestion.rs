//! AI Suggestion Normalization
//!
//! The suggestion service emits two payload generations: the legacy
//! `{type, details, action}` shape and the current `{id, title,
//! description, action, connectionData, componentData, confidence}`
//! shape. Both are deserialized at this boundary and normalized once
//! into a single [`Suggestion`] before anything reaches the store.

use serde::{Deserialize, Serialize};

use crate::core::WirekitError;
use crate::schema::WireKind;

/// What the user chose to do with a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Accept,
    Dismiss,
}

/// A suggested connection, endpoint pins as authored by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSuggestion {
    pub from_component: String,
    pub from_pin: String,
    pub to_component: String,
    pub to_pin: String,
    pub wire_type: WireKind,
    pub wire_color: Option<String>,
    pub label: Option<String>,
}

/// A suggested component placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSuggestion {
    pub material_id: String,
    pub pins: Option<Vec<String>>,
}

/// Normalized suggestion, the only shape the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action: SuggestionAction,
    pub connection: Option<ConnectionSuggestion>,
    pub component: Option<ComponentSuggestion>,
    pub confidence: f64,
}

/// Raw wire union of both payload generations.
///
/// The current shape requires `id` and `title`, the legacy shape
/// requires `type` and `details`, so the untagged match is unambiguous.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawSuggestion {
    Current {
        id: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        action: Option<String>,
        #[serde(rename = "connectionData", default)]
        connection_data: Option<RawConnectionData>,
        #[serde(rename = "componentData", default)]
        component_data: Option<RawComponentData>,
        #[serde(default)]
        confidence: Option<f64>,
    },
    Legacy {
        #[serde(rename = "type")]
        kind: String,
        details: serde_json::Value,
        #[serde(default)]
        action: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnectionData {
    pub from_component: String,
    #[serde(default)]
    pub from_pin: String,
    pub to_component: String,
    #[serde(default)]
    pub to_pin: String,
    #[serde(default)]
    pub wire_type: Option<String>,
    #[serde(default)]
    pub wire_color: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponentData {
    #[serde(alias = "materialId", alias = "componentId")]
    pub material_id: String,
    #[serde(default)]
    pub pins: Option<Vec<String>>,
}

/// Parse either payload generation from JSON and normalize it.
pub fn parse_suggestion(value: serde_json::Value) -> Result<Suggestion, WirekitError> {
    let raw: RawSuggestion = serde_json::from_value(value)?;
    Ok(normalize(raw))
}

/// Collapse a raw payload into the internal shape.
pub fn normalize(raw: RawSuggestion) -> Suggestion {
    match raw {
        RawSuggestion::Current {
            id,
            title,
            description,
            action,
            connection_data,
            component_data,
            confidence,
        } => Suggestion {
            id,
            title,
            description,
            action: parse_action(action.as_deref()),
            connection: connection_data.map(normalize_connection),
            component: component_data.map(|c| ComponentSuggestion {
                material_id: c.material_id,
                pins: c.pins,
            }),
            confidence: confidence.unwrap_or(0.5),
        },
        RawSuggestion::Legacy { kind, details, action } => {
            let connection = if kind.eq_ignore_ascii_case("connection") {
                legacy_connection(&details)
            } else {
                None
            };
            let component = if kind.eq_ignore_ascii_case("component") {
                legacy_component(&details)
            } else {
                None
            };
            Suggestion {
                id: format!("legacy-{}", kind.to_lowercase()),
                title: kind.clone(),
                description: details
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                action: parse_action(action.as_deref()),
                connection,
                component,
                confidence: 0.5,
            }
        }
    }
}

fn parse_action(action: Option<&str>) -> SuggestionAction {
    match action {
        Some(a) if a.eq_ignore_ascii_case("dismiss") || a.eq_ignore_ascii_case("reject") => {
            SuggestionAction::Dismiss
        }
        _ => SuggestionAction::Accept,
    }
}

fn normalize_connection(data: RawConnectionData) -> ConnectionSuggestion {
    ConnectionSuggestion {
        from_component: data.from_component,
        from_pin: data.from_pin,
        to_component: data.to_component,
        to_pin: data.to_pin,
        wire_type: parse_wire_kind(data.wire_type.as_deref()),
        wire_color: data.wire_color,
        label: data.label,
    }
}

/// Legacy detail objects spell endpoint keys several ways.
fn legacy_connection(details: &serde_json::Value) -> Option<ConnectionSuggestion> {
    let from = detail_str(details, &["fromComponent", "from_component", "from"])?;
    let to = detail_str(details, &["toComponent", "to_component", "to"])?;
    Some(ConnectionSuggestion {
        from_component: from,
        from_pin: detail_str(details, &["fromPin", "from_pin"]).unwrap_or_default(),
        to_component: to,
        to_pin: detail_str(details, &["toPin", "to_pin"]).unwrap_or_default(),
        wire_type: parse_wire_kind(
            detail_str(details, &["wireType", "wire_type"]).as_deref(),
        ),
        wire_color: detail_str(details, &["wireColor", "wire_color"]),
        label: detail_str(details, &["label"]),
    })
}

fn legacy_component(details: &serde_json::Value) -> Option<ComponentSuggestion> {
    let material_id =
        detail_str(details, &["materialId", "material_id", "componentId", "id"])?;
    let pins = details.get("pins").and_then(|v| {
        v.as_array().map(|a| {
            a.iter()
                .filter_map(|p| p.as_str().map(str::to_string))
                .collect()
        })
    });
    Some(ComponentSuggestion { material_id, pins })
}

fn detail_str(details: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| details.get(*k))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn parse_wire_kind(raw: Option<&str>) -> WireKind {
    match raw.map(str::to_lowercase).as_deref() {
        Some("power") => WireKind::Power,
        Some("ground") => WireKind::Ground,
        Some("analog") => WireKind::Analog,
        Some("digital") => WireKind::Digital,
        Some("data") | None => WireKind::Data,
        Some(other) => {
            tracing::debug!(wire_type = other, "unknown wire type, defaulting to data");
            WireKind::Data
        }
    }
}
