//! Type-Specific Pin Templates
//!
//! Fallback pinouts for common boards and parts, applied after the
//! text-driven extraction steps. Each template only fills pin families
//! the text scan left empty, so an explicit "6 analog inputs" requirement
//! wins over the Arduino default of A0-A5.

use crate::schema::{MaterialSpecs, Pin, PinKind};

use super::{has_kind, has_pin};

/// Tokens classifying a material as an Arduino-style board.
const ARDUINO_TOKENS: &[&str] = &["arduino", "uno", "mega", "nano"];

/// Tokens classifying a material as an ESP32-style module.
const ESP_TOKENS: &[&str] = &["esp32", "esp8266", "esp"];

const DISPLAY_TOKENS: &[&str] = &["display", "oled", "lcd", "screen"];

const BATTERY_TOKENS: &[&str] = &["battery", "power"];

/// GPIO numbers exposed on a typical ESP32 devkit.
const ESP32_GPIOS: &[u8] = &[0, 2, 4, 5, 12, 13, 14, 15, 16, 17, 18, 19, 21, 22, 23];

/// Apply the fallback template matching `kind`, filling only pin families
/// not already populated by the text-driven steps.
pub fn apply_type_template(kind: &str, specs: &MaterialSpecs, pins: &mut Vec<Pin>) {
    if matches_any(kind, ARDUINO_TOKENS) {
        apply_arduino(pins);
    } else if matches_any(kind, ESP_TOKENS) {
        apply_esp32(pins);
    } else if kind.contains("sensor") {
        apply_sensor(specs, pins);
    } else if matches_any(kind, DISPLAY_TOKENS) {
        apply_display(pins);
    } else if kind.contains("relay") {
        apply_relay(pins);
    } else if matches_any(kind, BATTERY_TOKENS) {
        apply_battery(pins);
    }
}

fn matches_any(kind: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| kind.contains(t))
}

fn apply_arduino(pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Digital) {
        for i in 0..14 {
            pins.push(Pin::new(format!("d{i}"), format!("D{i}"), PinKind::Digital));
        }
    }
    if !has_kind(pins, PinKind::Analog) {
        for i in 0..6 {
            pins.push(Pin::new(format!("a{i}"), format!("A{i}"), PinKind::Analog));
        }
    }
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power).with_voltage(5.0));
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
        pins.push(Pin::new("3v3", "3V3", PinKind::Power).with_voltage(3.3));
        pins.push(Pin::new("reset", "RESET", PinKind::Input));
    }
}

fn apply_esp32(pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Digital) {
        for n in ESP32_GPIOS {
            pins.push(Pin::new(
                format!("gpio{n}"),
                format!("GPIO{n}"),
                PinKind::Digital,
            ));
        }
    }
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power).with_voltage(3.3));
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
        pins.push(Pin::new("3v3", "3V3", PinKind::Power).with_voltage(3.3));
        pins.push(Pin::new("en", "EN", PinKind::Input));
    }
}

/// Generic sensor: rails plus a data pin, analog or digital out depending
/// on what the requirements text mentions.
fn apply_sensor(specs: &MaterialSpecs, pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power));
    }
    if !has_kind(pins, PinKind::Ground) {
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
    }
    let has_signal = pins.iter().any(|p| {
        matches!(
            p.kind,
            PinKind::Digital | PinKind::Analog | PinKind::Input | PinKind::Output
        )
    });
    if !has_signal {
        pins.push(Pin::new("data", "DATA", PinKind::Digital));
        let text = requirements_text(specs);
        if text.contains("analog") {
            pins.push(Pin::new("aout", "AOUT", PinKind::Analog));
        }
        if text.contains("digital") {
            pins.push(Pin::new("dout", "DOUT", PinKind::Output));
        }
    }
}

fn apply_display(pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power));
    }
    if !has_kind(pins, PinKind::Ground) {
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
    }
    // I2C is the default display interface.
    if !has_pin(pins, "sda") {
        pins.push(Pin::new("sda", "SDA", PinKind::Digital));
    }
    if !has_pin(pins, "scl") {
        pins.push(Pin::new("scl", "SCL", PinKind::Digital));
    }
}

fn apply_relay(pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("vcc", "VCC", PinKind::Power));
    }
    if !has_kind(pins, PinKind::Ground) {
        pins.push(Pin::new("gnd", "GND", PinKind::Ground));
    }
    if !has_pin(pins, "in") {
        pins.push(Pin::new("in", "IN", PinKind::Input));
    }
    if !has_pin(pins, "com") {
        pins.push(Pin::new("com", "COM", PinKind::Output));
        pins.push(Pin::new("no", "NO", PinKind::Output));
    }
}

fn apply_battery(pins: &mut Vec<Pin>) {
    if !has_kind(pins, PinKind::Power) {
        pins.push(Pin::new("positive", "+", PinKind::Power));
    }
    if !has_kind(pins, PinKind::Ground) {
        pins.push(Pin::new("negative", "-", PinKind::Ground));
    }
}

fn requirements_text(specs: &MaterialSpecs) -> String {
    let mut out = String::new();
    for (key, value) in &specs.requirements {
        out.push_str(&key.to_lowercase());
        out.push(' ');
        match value {
            serde_json::Value::String(s) => out.push_str(&s.to_lowercase()),
            other => out.push_str(&other.to_string().to_lowercase()),
        }
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Requirements;

    fn empty_specs() -> MaterialSpecs {
        MaterialSpecs::default()
    }

    #[test]
    fn test_arduino_template() {
        let mut pins = Vec::new();
        apply_type_template("arduino uno", &empty_specs(), &mut pins);
        assert!(pins.iter().any(|p| p.id == "d13"));
        assert!(pins.iter().any(|p| p.id == "a5"));
        assert!(pins.iter().any(|p| p.id == "reset"));
    }

    #[test]
    fn test_arduino_respects_existing_digital() {
        let mut pins = vec![Pin::new("d0", "D0", PinKind::Digital)];
        apply_type_template("arduino", &empty_specs(), &mut pins);
        assert_eq!(pins.iter().filter(|p| p.kind == PinKind::Digital).count(), 1);
        // Analog and power families were still missing and get filled.
        assert!(pins.iter().any(|p| p.id == "a0"));
        assert!(pins.iter().any(|p| p.id == "vcc"));
    }

    #[test]
    fn test_sensor_analog_out() {
        let mut specs = empty_specs();
        let mut reqs = Requirements::new();
        reqs.insert("output".to_string(), serde_json::json!("analog 0-3.3V"));
        specs.requirements = reqs;

        let mut pins = Vec::new();
        apply_type_template("temperature sensor", &specs, &mut pins);
        assert!(pins.iter().any(|p| p.id == "aout" && p.kind == PinKind::Analog));
    }

    #[test]
    fn test_relay_contacts() {
        let mut pins = Vec::new();
        apply_type_template("relay module", &empty_specs(), &mut pins);
        let ids: Vec<_> = pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["vcc", "gnd", "in", "com", "no"]);
    }

    #[test]
    fn test_battery_polarity() {
        let mut pins = Vec::new();
        apply_type_template("battery pack", &empty_specs(), &mut pins);
        assert_eq!(pins[0].id, "positive");
        assert_eq!(pins[1].id, "negative");
        assert_eq!(pins[1].kind, PinKind::Ground);
    }
}
