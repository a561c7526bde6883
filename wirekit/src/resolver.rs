//! Pin Name Resolution
//!
//! Maps an arbitrary suggested pin token — from an AI suggestion or a
//! stored connection — to the id of a real pin on a concrete component.
//! Resolution is a total function: exact match, then alias lookup, then
//! keyword type inference, then a type-priority fallback. A mis-typed
//! suggestion can therefore never block rendering, only mis-route
//! visually.

use crate::schema::{Pin, PinKind};

/// Alias table: canonical pin id -> synonym substrings. A canonical id is
/// only eligible when a pin with that exact id exists on the component.
const PIN_ALIASES: &[(&str, &[&str])] = &[
    ("vcc", &["vcc", "vdd", "power", "supply", "5v", "3v3", "3.3v", "vin", "v+"]),
    ("gnd", &["gnd", "ground", "vss", "0v", "v-"]),
    ("positive", &["positive", "+", "pos", "anode", "vcc", "power"]),
    ("negative", &["negative", "-", "neg", "cathode", "gnd", "ground"]),
    ("sda", &["sda", "i2c_sda", "i2c_data"]),
    ("scl", &["scl", "i2c_scl", "i2c_clock", "clk"]),
    ("gpio1", &["gpio1", "io1", "d1", "pin_1"]),
    ("gpio2", &["gpio2", "io2", "d2", "pin_2"]),
    ("gpio3", &["gpio3", "io3", "d3", "pin_3"]),
    ("gpio4", &["gpio4", "io4", "d4", "pin_4"]),
    ("data", &["data", "signal", "sig", "dout", "out"]),
    ("pin1", &["pin1", "p1"]),
    ("pin2", &["pin2", "p2"]),
];

/// Words implying a power pin.
const POWER_WORDS: &[&str] = &["power", "vcc", "3v", "5v", "positive", "+", "vin", "v+"];

/// Words implying a ground pin.
const GROUND_WORDS: &[&str] = &["ground", "gnd", "negative", "v-", "0v", "-"];

/// Words implying a data or signal pin (analog/input/output kinds).
const SIGNAL_WORDS: &[&str] = &["data", "signal", "analog", "adc", "sense", "aout", "dout", "tx", "rx"];

/// Words implying a general digital/control pin.
const CONTROL_WORDS: &[&str] = &["gpio", "digital", "control", "io", "pin"];

/// Resolve a suggested pin token against a component's real pin list.
///
/// Always returns a string: the id of some pin in `pins`, or — only when
/// `pins` is empty — the original token unchanged.
pub fn resolve_pin(suggested: &str, pins: &[Pin]) -> String {
    // 1. Exact id or display-name match.
    if let Some(pin) = pins.iter().find(|p| p.id == suggested || p.name == suggested) {
        return pin.id.clone();
    }

    let lower = suggested.to_lowercase();

    // 2. Alias table, gated on the canonical pin actually existing.
    for (canonical, aliases) in PIN_ALIASES {
        if !pins.iter().any(|p| p.id == *canonical) {
            continue;
        }
        if aliases.iter().any(|alias| alias_matches(&lower, alias)) {
            tracing::debug!(suggested, resolved = canonical, "pin resolved via alias table");
            return (*canonical).to_string();
        }
    }

    // 3. Keyword type inference.
    if contains_any(&lower, POWER_WORDS) {
        if let Some(pin) = first_of_kind(pins, &[PinKind::Power]) {
            return pin.id.clone();
        }
    }
    if contains_any(&lower, GROUND_WORDS) {
        if let Some(pin) = first_of_kind(pins, &[PinKind::Ground]) {
            return pin.id.clone();
        }
    }
    if contains_any(&lower, SIGNAL_WORDS) {
        if let Some(pin) =
            first_of_kind(pins, &[PinKind::Analog, PinKind::Input, PinKind::Output])
        {
            return pin.id.clone();
        }
    }
    if contains_any(&lower, CONTROL_WORDS) {
        if let Some(pin) = first_of_kind(pins, &[PinKind::Digital]) {
            return pin.id.clone();
        }
    }

    // 4. Type-priority fallback, then the first pin outright.
    for kinds in [
        [PinKind::Power],
        [PinKind::Ground],
        [PinKind::Digital],
        [PinKind::Analog],
    ] {
        if let Some(pin) = first_of_kind(pins, &kinds) {
            tracing::debug!(suggested, resolved = %pin.id, "pin resolved via type fallback");
            return pin.id.clone();
        }
    }
    if let Some(pin) = pins.first() {
        return pin.id.clone();
    }
    suggested.to_string()
}

/// Alias match test: equality, containment either way, or a partial
/// prefix match on the parts of a compound `_`-separated alias.
fn alias_matches(suggested: &str, alias: &str) -> bool {
    if suggested == alias || suggested.contains(alias) || alias.contains(suggested) {
        return true;
    }
    if alias.contains('_') {
        return alias.split('_').any(|part| {
            !part.is_empty() && (suggested.starts_with(part) || part.starts_with(suggested))
        });
    }
    false
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn first_of_kind<'a>(pins: &'a [Pin], kinds: &[PinKind]) -> Option<&'a Pin> {
    pins.iter().find(|p| kinds.contains(&p.kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(id: &str, name: &str, kind: PinKind) -> Pin {
        Pin::new(id, name, kind)
    }

    #[test]
    fn test_exact_id_match() {
        let pins = vec![pin("vcc", "VCC", PinKind::Power), pin("gnd", "GND", PinKind::Ground)];
        assert_eq!(resolve_pin("gnd", &pins), "gnd");
    }

    #[test]
    fn test_exact_name_match() {
        let pins = vec![pin("d13", "D13", PinKind::Digital)];
        assert_eq!(resolve_pin("D13", &pins), "d13");
    }

    #[test]
    fn test_alias_requires_canonical_pin() {
        // "5V" aliases to vcc, but only when a vcc pin exists.
        let with_vcc = vec![pin("vcc", "VCC", PinKind::Power)];
        assert_eq!(resolve_pin("5V", &with_vcc), "vcc");

        let without = vec![pin("negative", "-", PinKind::Ground)];
        assert_ne!(resolve_pin("5V", &without), "vcc");
    }

    #[test]
    fn test_compound_alias_partial_match() {
        let pins = vec![pin("sda", "SDA", PinKind::Digital), pin("scl", "SCL", PinKind::Digital)];
        assert_eq!(resolve_pin("i2c", &pins), "sda");
    }

    #[test]
    fn test_ground_type_fallback() {
        // "gnd" is an alias of the "negative" canonical pin.
        let pins = vec![pin("negative", "-", PinKind::Ground)];
        assert_eq!(resolve_pin("GND", &pins), "negative");
    }

    #[test]
    fn test_unmatched_falls_back_by_type_priority() {
        let pins = vec![
            pin("aout", "AOUT", PinKind::Analog),
            pin("vcc", "VCC", PinKind::Power),
        ];
        assert_eq!(resolve_pin("mystery", &pins), "vcc");
    }

    #[test]
    fn test_first_pin_when_no_priority_kind() {
        let pins = vec![pin("en", "EN", PinKind::Input)];
        assert_eq!(resolve_pin("zzz", &pins), "en");
    }

    #[test]
    fn test_empty_list_returns_token() {
        assert_eq!(resolve_pin("whatever", &[]), "whatever");
    }

    #[test]
    fn test_total_over_arbitrary_tokens() {
        let pins = vec![
            pin("vcc", "VCC", PinKind::Power),
            pin("gnd", "GND", PinKind::Ground),
            pin("d0", "D0", PinKind::Digital),
        ];
        for token in ["", "!!!", "GPIO_99", "power rail", "データ"] {
            let resolved = resolve_pin(token, &pins);
            assert!(pins.iter().any(|p| p.id == resolved), "token {token:?}");
        }
    }
}
