//! Wiring Diagram Data Model
//!
//! Serde shapes for pins, components, connections and the diagram
//! aggregate. These structs are the persisted wire format: a diagram
//! snapshot serializes to the same JSON the persistence service stores,
//! and must round-trip losslessly — including endpoint pin names that do
//! not (yet) match a real pin id on the referenced component.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Absolute canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Offset from a component's center, used for pin layout and wire anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PinOffset {
    pub x: f64,
    pub y: f64,
}

impl PinOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Electrical role of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    Power,
    Ground,
    Digital,
    Analog,
    Input,
    Output,
}

/// A named, typed terminal on a component.
///
/// `id` is lowercase and stable once assigned; `position` is relative to
/// the component's own body, not absolute canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PinKind,
    pub position: PinOffset,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
}

impl Pin {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PinKind) -> Self {
        let id = id.into();
        Self {
            id: id.to_lowercase(),
            name: name.into(),
            kind,
            position: PinOffset::default(),
            connected: false,
            voltage: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = PinOffset::new(x, y);
        self
    }

    pub fn with_voltage(mut self, voltage: f64) -> Self {
        self.voltage = Some(voltage);
        self
    }
}

/// Nominal component body width on the canvas, in pixels.
pub const COMPONENT_WIDTH: f64 = 120.0;

/// Minimum component body height, in pixels.
pub const COMPONENT_MIN_HEIGHT: f64 = 80.0;

/// Vertical spacing between successive pins on one side.
pub const PIN_SPACING: f64 = 20.0;

/// A placed instance of a material on the wiring canvas.
///
/// `id` equals the id of the material it was created from (components are
/// 1:1 with placed materials); `position` is the body's top-left corner in
/// absolute canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Point,
    pub pins: Vec<Pin>,
}

impl Component {
    /// Body size derived from the pin count: pins sit on the left/right
    /// edges, so height grows with the longer side.
    pub fn body_size(&self) -> (f64, f64) {
        let per_side = self.pins.len().div_ceil(2);
        let height = (per_side as f64 * PIN_SPACING + 2.0 * PIN_SPACING)
            .max(COMPONENT_MIN_HEIGHT);
        (COMPONENT_WIDTH, height)
    }

    /// Center of the component body in absolute canvas coordinates.
    pub fn center(&self) -> Point {
        let (w, h) = self.body_size();
        Point::new(self.position.x + w / 2.0, self.position.y + h / 2.0)
    }

    pub fn find_pin(&self, pin_id: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == pin_id)
    }

    /// Absolute canvas position of a pin (body center plus pin offset).
    pub fn pin_position(&self, pin: &Pin) -> Point {
        let c = self.center();
        Point::new(c.x + pin.position.x, c.y + pin.position.y)
    }
}

/// Wire classification for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    Power,
    Ground,
    Data,
    Analog,
    Digital,
}

/// Default color for freshly drawn wires.
pub const DEFAULT_WIRE_COLOR: &str = "#000000";

/// A wire between two (component, pin) endpoints.
///
/// `from_pin`/`to_pin` hold the pin names as authored — by a user gesture
/// or an AI suggestion — and may not literally match a pin id on the
/// referenced component. They are resolved lazily at render/route time and
/// are never rewritten in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from_component: String,
    pub from_pin: String,
    pub to_component: String,
    pub to_pin: String,
    pub wire_type: WireKind,
    pub wire_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        from_component: impl Into<String>,
        from_pin: impl Into<String>,
        to_component: impl Into<String>,
        to_pin: impl Into<String>,
        wire_type: WireKind,
    ) -> Self {
        Self {
            id: id.into(),
            from_component: from_component.into(),
            from_pin: from_pin.into(),
            to_component: to_component.into(),
            to_pin: to_pin.into(),
            wire_type,
            wire_color: DEFAULT_WIRE_COLOR.to_string(),
            label: None,
            validated: false,
            error: None,
        }
    }
}

/// Snapshot metadata; `updated_at` is bumped on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

impl DiagramMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

/// The full graph of components and connections for one project.
///
/// Single root aggregate; owned exclusively by the [`DiagramStore`] and
/// persisted as a whole snapshot, never as an event log.
///
/// [`DiagramStore`]: crate::store::DiagramStore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: String,
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    pub metadata: DiagramMetadata,
}

impl Diagram {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            connections: Vec::new(),
            metadata: DiagramMetadata::new(title),
        }
    }

    pub fn find_component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn find_connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Refresh `updated_at` after a mutation.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

/// Free-form specification map carried by a material version.
///
/// Insertion order is preserved so that pin extraction is deterministic
/// and stable across runs for the same stored material.
pub type Requirements = IndexMap<String, serde_json::Value>;

/// Spec fields of one material version, as supplied by the materials
/// provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSpecs {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_reference: Option<String>,
    /// Pre-declared pin names, when the material already carries a pinout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialVersion {
    pub specs: MaterialSpecs,
}

/// A material record from the materials provider (external collaborator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub current_version: MaterialVersion,
    #[serde(default)]
    pub quantity: u32,
}

impl Material {
    pub fn specs(&self) -> &MaterialSpecs {
        &self.current_version.specs
    }
}
