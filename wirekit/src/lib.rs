//! Wirekit - wiring diagram engine
//!
//! This library models electronic components, their pins, and the wires
//! between them, together with the algorithms a wiring canvas needs:
//! inferring a component's pinout from free-form specification text,
//! resolving fuzzy pin names from AI suggestions to concrete pins, and
//! routing wires as non-overlapping orthogonal paths.
//!
//! # Quick Start
//!
//! ```
//! use wirekit::{DiagramStore, Connection, WireKind, RoutingContext, route_all};
//!
//! let mut store = DiagramStore::new("project-1");
//! let materials = vec![];
//! store.add_connection(
//!     Connection::new("c1", "mcu", "5V", "sensor", "VCC", WireKind::Power),
//!     &materials,
//! );
//!
//! let mut routing = RoutingContext::new();
//! for (id, path) in route_all(&mut routing, store.diagram().unwrap()) {
//!     println!("{id}: {path}");
//! }
//! ```
//!
//! # Features
//!
//! - **Pin extraction**: keyword heuristics plus board templates
//! - **Pin resolution**: total fuzzy matching, never fails
//! - **Smart routing**: shared occupancy grid, candidate strategies
//! - **Diagram store**: cascade deletes, duplicate guard, async saves

pub mod canvas;
pub mod core;
pub mod extractor;
pub mod factory;
pub mod graph;
pub mod ids;
pub mod persist;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod store;
pub mod suggestion;

// Re-export main types
pub use self::core::{validate_diagram, ValidationIssue, ValidationReport, WirekitError};
pub use extractor::extract_pins;
pub use factory::{build_component, PinPreset};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use persist::{DiagramPersistence, HttpPersistence, MemoryPersistence};
pub use resolver::resolve_pin;
pub use router::{route_all, route_connection, RoutingContext};
pub use schema::{
    Component, Connection, Diagram, DiagramMetadata, Material, MaterialSpecs, Pin,
    PinKind, Point, WireKind,
};
pub use store::{ComponentUpdate, ConnectionUpdate, DiagramStore};
pub use suggestion::{parse_suggestion, Suggestion, SuggestionAction};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        build_component, extract_pins, resolve_pin, route_all, validate_diagram,
        Component, Connection, Diagram, DiagramStore, Material, Pin, PinKind, Point,
        RoutingContext, ValidationReport, WireKind, WirekitError,
    };
}
