//! Pin Extraction
//!
//! Derives a named, typed, positioned pin list for a component from a
//! material's free-form specification text. Extraction is a pure function
//! of the specs: keyword scans over the requirements map first (pin
//! counts, bus interfaces, supply rails), then type-specific fallback
//! templates for common boards and parts, then a minimal generic pinout.
//!
//! Never fails: unknown or malformed specs degrade to the generic
//! fallback, logged at debug level only.

mod templates;

pub use templates::apply_type_template;

use crate::schema::{
    MaterialSpecs, Pin, PinKind, PinOffset, COMPONENT_WIDTH, PIN_SPACING,
};

/// Caps on synthesized pin counts, matching common board limits.
const MAX_DIGITAL: usize = 14;
const MAX_ANALOG: usize = 8;
const MAX_GPIO: usize = 10;

/// Keys that describe pin counts.
const PIN_COUNT_KEYS: &[&str] = &["pin", "gpio"];

/// Keys that describe bus interfaces.
const INTERFACE_KEYS: &[&str] = &["interface", "communication"];

/// Keys that describe supply requirements.
const SUPPLY_KEYS: &[&str] = &["voltage", "power", "supply"];

/// Extract a pin list from a material's specs.
///
/// `kind_hint` overrides the specs' own type token when the caller
/// already classified the component. The returned list preserves
/// insertion order across extraction steps and is never empty.
pub fn extract_pins(specs: &MaterialSpecs, kind_hint: Option<&str>) -> Vec<Pin> {
    let mut pins = Vec::new();

    for (key, value) in &specs.requirements {
        let key = key.to_lowercase();
        let text = value_text(value).to_lowercase();

        if contains_any(&key, PIN_COUNT_KEYS) {
            extract_pin_counts(&text, &mut pins);
        }
        if contains_any(&key, INTERFACE_KEYS) {
            // Multiple keys matching the same protocol append the set
            // again; callers see the duplicates the stored spec implies.
            extract_interfaces(&text, &mut pins);
        }
        if contains_any(&key, SUPPLY_KEYS) {
            extract_supply_rails(&text, &mut pins);
        }
    }

    let kind = kind_hint
        .map(str::to_string)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| component_kind_token(specs));
    apply_type_template(&kind, specs, &mut pins);

    if pins.is_empty() {
        tracing::debug!(
            material = %specs.name,
            "no pins inferred from specs, using generic fallback"
        );
        pins.push(Pin::new("vcc", "VCC", PinKind::Power));
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
        pins.push(Pin::new("signal", "SIGNAL", PinKind::Digital));
    }

    layout_pins(&mut pins);
    pins
}

/// Classification token for template selection: explicit type first, then
/// the product reference, then the material name.
fn component_kind_token(specs: &MaterialSpecs) -> String {
    if !specs.kind.is_empty() {
        return specs.kind.to_lowercase();
    }
    if let Some(reference) = &specs.product_reference {
        if !reference.is_empty() {
            return reference.to_lowercase();
        }
    }
    specs.name.to_lowercase()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Flatten a requirement value to searchable text.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Scan `"<N> digital"`-style phrases and synthesize that many pins.
fn extract_pin_counts(text: &str, pins: &mut Vec<Pin>) {
    if let Some(n) = count_before(text, "digital") {
        for i in 0..n.min(MAX_DIGITAL) {
            pins.push(Pin::new(format!("d{i}"), format!("D{i}"), PinKind::Digital));
        }
    }
    if let Some(n) = count_before(text, "analog") {
        for i in 0..n.min(MAX_ANALOG) {
            pins.push(Pin::new(format!("a{i}"), format!("A{i}"), PinKind::Analog));
        }
    }
    if let Some(n) = count_before(text, "gpio") {
        for i in 0..n.min(MAX_GPIO) {
            pins.push(Pin::new(
                format!("gpio{i}"),
                format!("GPIO{i}"),
                PinKind::Digital,
            ));
        }
    }
}

/// Find `<number>` immediately preceding a token that starts with `word`,
/// e.g. "14 digital pins" -> 14.
fn count_before(text: &str, word: &str) -> Option<usize> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .collect();
    tokens.windows(2).find_map(|w| {
        if w[1].starts_with(word) {
            w[0].parse::<usize>().ok()
        } else {
            None
        }
    })
}

/// Append fixed pin sets for bus protocols named in the value text.
fn extract_interfaces(text: &str, pins: &mut Vec<Pin>) {
    if text.contains("i2c") {
        pins.push(Pin::new("sda", "SDA", PinKind::Digital));
        pins.push(Pin::new("scl", "SCL", PinKind::Digital));
    }
    if text.contains("spi") {
        pins.push(Pin::new("mosi", "MOSI", PinKind::Digital));
        pins.push(Pin::new("miso", "MISO", PinKind::Digital));
        pins.push(Pin::new("sck", "SCK", PinKind::Digital));
        pins.push(Pin::new("ss", "SS", PinKind::Digital));
    }
    if text.contains("uart") || text.contains("serial") {
        pins.push(Pin::new("tx", "TX", PinKind::Output));
        pins.push(Pin::new("rx", "RX", PinKind::Input));
    }
}

/// Append supply rails; VCC/GND whenever a supply key is present, plus
/// voltage-specific rails named in the value text.
fn extract_supply_rails(text: &str, pins: &mut Vec<Pin>) {
    if !has_pin(pins, "vcc") {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power));
    }
    if !has_pin(pins, "gnd") {
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
    }
    if (text.contains("3.3v") || text.contains("3v3")) && !has_pin(pins, "3v3") {
        pins.push(Pin::new("3v3", "3V3", PinKind::Power).with_voltage(3.3));
    }
    if text.contains("5v") && !has_pin(pins, "5v") {
        pins.push(Pin::new("5v", "5V", PinKind::Power).with_voltage(5.0));
    }
}

pub(crate) fn has_pin(pins: &[Pin], id: &str) -> bool {
    pins.iter().any(|p| p.id == id)
}

pub(crate) fn has_kind(pins: &[Pin], kind: PinKind) -> bool {
    pins.iter().any(|p| p.kind == kind)
}

/// Assign body-relative positions: pins alternate left/right edge in
/// insertion order, at fixed vertical spacing, centered on the body.
fn layout_pins(pins: &mut [Pin]) {
    let per_side = pins.len().div_ceil(2);
    let top = -((per_side.saturating_sub(1)) as f64) * PIN_SPACING / 2.0;
    for (i, pin) in pins.iter_mut().enumerate() {
        let x = if i % 2 == 0 {
            -COMPONENT_WIDTH / 2.0
        } else {
            COMPONENT_WIDTH / 2.0
        };
        let y = top + (i / 2) as f64 * PIN_SPACING;
        pin.position = PinOffset::new(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Requirements;

    fn specs_with(kind: &str, reqs: &[(&str, &str)]) -> MaterialSpecs {
        let mut requirements = Requirements::new();
        for (k, v) in reqs {
            requirements.insert(k.to_string(), serde_json::json!(v));
        }
        MaterialSpecs {
            name: "test part".to_string(),
            kind: kind.to_string(),
            requirements,
            product_reference: None,
            pins: None,
        }
    }

    #[test]
    fn test_count_before() {
        assert_eq!(count_before("14 digital pins, 6 analog inputs", "digital"), Some(14));
        assert_eq!(count_before("14 digital pins, 6 analog inputs", "analog"), Some(6));
        assert_eq!(count_before("plenty of digital pins", "digital"), None);
    }

    #[test]
    fn test_digital_count_capped() {
        let specs = specs_with("", &[("pins", "54 digital pins")]);
        let pins = extract_pins(&specs, None);
        let digital = pins.iter().filter(|p| p.id.starts_with('d')).count();
        assert_eq!(digital, 14);
    }

    #[test]
    fn test_i2c_sensor_scenario() {
        // Interface key + sensor template: exactly one SDA/SCL pair plus rails.
        let specs = specs_with("sensor", &[("interface", "I2C")]);
        let pins = extract_pins(&specs, None);

        assert_eq!(pins.iter().filter(|p| p.id == "sda").count(), 1);
        assert_eq!(pins.iter().filter(|p| p.id == "scl").count(), 1);
        assert!(pins.iter().all(|p| {
            p.id != "sda" && p.id != "scl" || p.kind == PinKind::Digital
        }));
        assert!(has_pin(&pins, "vcc"));
        assert!(has_pin(&pins, "gnd"));
    }

    #[test]
    fn test_interface_duplicates_preserved_across_keys() {
        // Two requirement keys both naming I2C append the set twice.
        let specs = specs_with(
            "",
            &[("interface", "I2C"), ("communication", "I2C bus")],
        );
        let pins = extract_pins(&specs, None);
        assert_eq!(pins.iter().filter(|p| p.id == "sda").count(), 2);
    }

    #[test]
    fn test_supply_rails() {
        let specs = specs_with("", &[("voltage", "3.3V or 5V supported")]);
        let pins = extract_pins(&specs, None);
        assert!(has_pin(&pins, "vcc"));
        assert!(has_pin(&pins, "gnd"));
        assert!(has_pin(&pins, "3v3"));
        assert!(has_pin(&pins, "5v"));
        let rail = pins.iter().find(|p| p.id == "3v3").unwrap();
        assert_eq!(rail.voltage, Some(3.3));
    }

    #[test]
    fn test_generic_fallback_never_empty() {
        let specs = specs_with("", &[]);
        let pins = extract_pins(&specs, None);
        assert_eq!(
            pins.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["vcc", "gnd", "signal"]
        );
    }

    #[test]
    fn test_deterministic() {
        let specs = specs_with(
            "arduino",
            &[("pins", "14 digital, 6 analog"), ("voltage", "5v")],
        );
        let first = extract_pins(&specs, None);
        let second = extract_pins(&specs, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_layout_alternates_sides() {
        let specs = specs_with("", &[("pins", "4 digital")]);
        let pins = extract_pins(&specs, None);
        assert!(pins[0].position.x < 0.0);
        assert!(pins[1].position.x > 0.0);
        assert_eq!(pins[0].position.y, pins[1].position.y);
        assert_eq!(pins[2].position.y - pins[0].position.y, PIN_SPACING);
    }
}
