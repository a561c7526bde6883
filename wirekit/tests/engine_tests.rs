//! End-to-end tests for the wiring engine: extraction, resolution,
//! store mutations and routing working together.

use std::sync::Arc;

use wirekit::prelude::*;
use wirekit::ids::SequentialIds;
use wirekit::router::route_connection;
use wirekit::schema::{MaterialSpecs, MaterialVersion, Requirements};

fn material(id: &str, kind: &str, reqs: &[(&str, &str)]) -> Material {
    let mut requirements = Requirements::new();
    for (k, v) in reqs {
        requirements.insert(k.to_string(), serde_json::json!(v));
    }
    Material {
        id: id.to_string(),
        current_version: MaterialVersion {
            specs: MaterialSpecs {
                name: id.to_uppercase(),
                kind: kind.to_string(),
                requirements,
                product_reference: None,
                pins: None,
            },
        },
        quantity: 1,
    }
}

fn palette() -> Vec<Material> {
    vec![
        material("mcu", "arduino", &[("voltage", "5V")]),
        material("temp", "sensor", &[("interface", "I2C")]),
        material("screen", "oled display", &[]),
    ]
}

fn store() -> DiagramStore {
    DiagramStore::new("proj").with_ids(Arc::new(SequentialIds::default()))
}

#[test]
fn i2c_sensor_extracts_bus_and_rails() {
    let mat = material("temp", "sensor", &[("interface", "I2C")]);
    let pins = extract_pins(mat.specs(), None);

    assert_eq!(pins.iter().filter(|p| p.id == "sda").count(), 1);
    assert_eq!(pins.iter().filter(|p| p.id == "scl").count(), 1);
    assert!(pins.iter().any(|p| p.id == "vcc" && p.kind == PinKind::Power));
    assert!(pins.iter().any(|p| p.id == "gnd" && p.kind == PinKind::Ground));
}

#[test]
fn extraction_is_total_and_deterministic() {
    for mat in [
        material("a", "", &[]),
        material("b", "frobnicator", &[("weight", "12g")]),
        material("c", "esp32", &[("pins", "not a number gpio")]),
    ] {
        let first = extract_pins(mat.specs(), None);
        let second = extract_pins(mat.specs(), None);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}

#[test]
fn resolver_lands_on_real_pins_for_any_token() {
    let pins = extract_pins(material("mcu", "arduino", &[]).specs(), None);
    for token in ["5V", "D7", "power", "GND", "i2c_data", "???"] {
        let resolved = resolve_pin(token, &pins);
        assert!(
            pins.iter().any(|p| p.id == resolved),
            "token {token:?} resolved to {resolved:?}"
        );
    }
}

#[test]
fn resolver_prefers_exact_matches() {
    let pins = extract_pins(material("mcu", "arduino", &[]).specs(), None);
    assert_eq!(resolve_pin("d13", &pins), "d13");
    assert_eq!(resolve_pin("A3", &pins), "a3");
}

#[test]
fn first_wire_places_full_palette() {
    let mut store = store();
    let added = store.add_connection(
        Connection::new("c1", "mcu", "5V", "temp", "VCC", WireKind::Power),
        &palette(),
    );
    assert!(added);

    let diagram = store.diagram().unwrap();
    assert_eq!(diagram.components.len(), 3);
    assert_eq!(diagram.connections.len(), 1);
    assert!(diagram.find_component("screen").is_some());
}

#[test]
fn duplicate_wire_is_silently_ignored() {
    let mut store = store();
    let materials = palette();
    store.add_connection(
        Connection::new("c1", "mcu", "5V", "temp", "VCC", WireKind::Power),
        &materials,
    );
    // Same unordered endpoints, opposite direction, different spelling.
    store.add_connection(
        Connection::new("c2", "temp", "vcc", "mcu", "5v", WireKind::Power),
        &materials,
    );
    assert_eq!(store.diagram().unwrap().connections.len(), 1);
}

#[test]
fn deleting_component_cascades_connections() {
    let mut store = store();
    let materials = palette();
    for (id, from, fpin, to, tpin) in [
        ("c1", "mcu", "5v", "temp", "vcc"),
        ("c2", "mcu", "gnd", "temp", "gnd"),
        ("c3", "mcu", "3v3", "screen", "vcc"),
        ("c4", "screen", "gnd", "mcu", "gnd"),
        ("c5", "temp", "sda", "screen", "sda"),
    ] {
        store.add_connection(
            Connection::new(id, from, fpin, to, tpin, WireKind::Data),
            &materials,
        );
    }
    assert_eq!(store.diagram().unwrap().connections.len(), 5);

    store.delete_component("screen");

    let diagram = store.diagram().unwrap();
    assert_eq!(diagram.components.len(), 2);
    assert_eq!(diagram.connections.len(), 2);
    assert!(validate_diagram(diagram).is_valid);
}

#[test]
fn routing_skips_connections_with_missing_endpoints() {
    let mut store = store();
    store.add_connection(
        Connection::new("c1", "mcu", "5v", "temp", "vcc", WireKind::Power),
        &palette(),
    );
    let mut diagram = store.diagram().unwrap().clone();
    diagram.connections.push(Connection::new(
        "ghost-wire", "mcu", "5v", "ghost", "vcc", WireKind::Power,
    ));

    let report = validate_diagram(&diagram);
    assert!(!report.is_valid);
    assert_eq!(report.errors[0].code, "invalid_connection");

    let mut ctx = RoutingContext::new();
    let routed = route_all(&mut ctx, &diagram);
    assert_eq!(routed.len(), 1);
    assert_eq!(routed[0].0, "c1");
}

#[test]
fn routed_paths_start_and_end_on_pins() {
    let mut store = store();
    let materials = palette();
    store.add_connection(
        Connection::new("c1", "mcu", "5v", "temp", "vcc", WireKind::Power),
        &materials,
    );
    store.add_connection(
        Connection::new("c2", "mcu", "gnd", "screen", "gnd", WireKind::Ground),
        &materials,
    );

    let diagram = store.diagram().unwrap();
    let mut ctx = RoutingContext::new();
    for (id, path) in route_all(&mut ctx, diagram) {
        assert!(path.starts_with('M'), "path for {id} must be a valid SVG polyline");
        assert!(path.contains('L'));
    }
}

#[test]
fn rerouting_after_component_move_reuses_context() {
    let mut store = store();
    let materials = palette();
    store.add_connection(
        Connection::new("c1", "mcu", "d0", "temp", "sda", WireKind::Data),
        &materials,
    );

    let mut ctx = RoutingContext::new();
    let before = route_all(&mut ctx, store.diagram().unwrap());

    store.update_component(
        "temp",
        wirekit::ComponentUpdate {
            position: Some(Point::new(600.0, 400.0)),
            ..Default::default()
        },
    );
    let after = route_all(&mut ctx, store.diagram().unwrap());

    assert_eq!(before.len(), after.len());
    assert_ne!(before[0].1, after[0].1);
}

#[test]
fn suggestion_payloads_flow_into_the_store() {
    let mut store = store();
    let materials = palette();

    let current = wirekit::parse_suggestion(serde_json::json!({
        "id": "s1",
        "title": "Power the sensor",
        "action": "accept",
        "connectionData": {
            "fromComponent": "mcu",
            "fromPin": "5V",
            "toComponent": "temp",
            "toPin": "power"
        },
        "confidence": 0.9
    }))
    .unwrap();
    assert!(store.apply_suggestion(&current, &materials));

    let legacy = wirekit::parse_suggestion(serde_json::json!({
        "type": "connection",
        "details": {
            "from": "mcu",
            "from_pin": "gnd",
            "to": "screen",
            "to_pin": "ground",
            "wire_type": "ground"
        }
    }))
    .unwrap();
    assert!(store.apply_suggestion(&legacy, &materials));

    let diagram = store.diagram().unwrap();
    assert_eq!(diagram.connections.len(), 2);
    // Stored endpoints are resolved against real pins.
    for conn in &diagram.connections {
        let from = diagram.find_component(&conn.from_component).unwrap();
        assert!(from.find_pin(&conn.from_pin).is_some());
    }
}

#[test]
fn second_wire_avoids_first_wires_cells() {
    use wirekit::schema::{Component, Pin, PinOffset};

    let pin_at = |id: &str, x: f64| {
        let mut p = Pin::new(id, id.to_uppercase(), PinKind::Digital);
        p.position = PinOffset::new(x, 0.0);
        p
    };
    let comp = |id: &str, x: f64, y: f64, pin: Pin| Component {
        id: id.to_string(),
        name: id.to_uppercase(),
        kind: "part".to_string(),
        position: Point::new(x, y),
        pins: vec![pin],
    };

    let a1 = comp("a1", 80.0, 60.0, pin_at("out", 60.0));
    let b1 = comp("b1", 280.0, 60.0, pin_at("in", -60.0));
    let a2 = comp("a2", -80.0, 60.0, pin_at("out", 60.0));
    let b2 = comp("b2", 440.0, 60.0, pin_at("in", -60.0));

    let mut ctx = RoutingContext::new();
    let first = route_connection(&mut ctx, "w1", (&a1, &a1.pins[0]), (&b1, &b1.pins[0]));
    let second = route_connection(&mut ctx, "w2", (&a2, &a2.pins[0]), (&b2, &b2.pins[0]));

    // The second wire spans the first one's row and must detour.
    assert_ne!(first, second);
    assert!(second.matches('L').count() > first.matches('L').count());
}
