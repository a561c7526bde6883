//! Component Factory
//!
//! Builds a positioned [`Component`] from a material record and a
//! placement index. Pin resolution priority: explicit preset (full pin
//! objects, then raw names), the material's own declared pinout, inferred
//! pins from the spec text, and finally the generic fallback inside the
//! extractor. Deterministic for identical inputs.

use crate::extractor::extract_pins;
use crate::schema::{
    Component, Material, MaterialSpecs, Pin, PinKind, PinOffset, Point, COMPONENT_WIDTH,
    PIN_SPACING,
};

/// Placement grid geometry: 3 columns, fixed spacing, fixed origin.
const GRID_COLUMNS: usize = 3;
const GRID_COLUMN_SPACING: f64 = 150.0;
const GRID_ROW_SPACING: f64 = 100.0;
const GRID_ORIGIN_X: f64 = 150.0;
const GRID_ORIGIN_Y: f64 = 100.0;

/// Externally supplied pin list, bypassing inference.
#[derive(Debug, Clone, PartialEq)]
pub enum PinPreset {
    /// Force a component with no pins at all.
    Empty,
    /// Raw pin names, normalized into pins with a kind inferred from the
    /// name.
    Names(Vec<String>),
    /// Fully-formed pins, used verbatim.
    Pins(Vec<Pin>),
}

/// Canvas position for the `index`-th placed component.
pub fn placement_position(index: usize) -> Point {
    let col = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;
    Point::new(
        GRID_ORIGIN_X + col as f64 * GRID_COLUMN_SPACING,
        GRID_ORIGIN_Y + row as f64 * GRID_ROW_SPACING,
    )
}

/// Build a component for a material placed at `index`.
///
/// The component id equals the material id: components are 1:1 with
/// placed materials, and re-placing the same material overwrites rather
/// than duplicates.
pub fn build_component(
    material: &Material,
    index: usize,
    preset: Option<PinPreset>,
) -> Component {
    let specs = material.specs();
    let pins = match preset {
        Some(PinPreset::Empty) => Vec::new(),
        Some(PinPreset::Pins(pins)) => pins,
        Some(PinPreset::Names(names)) => pins_from_names(&names),
        None => match declared_pins(specs) {
            Some(declared) => pins_from_names(&declared),
            None => extract_pins(specs, None),
        },
    };

    let name = if specs.name.is_empty() {
        material.id.clone()
    } else {
        specs.name.clone()
    };

    Component {
        id: material.id.clone(),
        name,
        kind: specs.kind.to_lowercase(),
        position: placement_position(index),
        pins,
    }
}

/// Declared pinout: the specs' own `pins` field first, then a string
/// array stored under the `pins` requirement key. A textual `pins`
/// requirement ("14 digital pins") is not a declaration and stays with
/// the extractor.
fn declared_pins(specs: &MaterialSpecs) -> Option<Vec<String>> {
    if let Some(declared) = &specs.pins {
        if !declared.is_empty() {
            return Some(declared.clone());
        }
    }
    let names: Vec<String> = specs
        .requirements
        .get("pins")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Normalize raw pin names into typed pins, alternating sides in order.
fn pins_from_names(names: &[String]) -> Vec<Pin> {
    let per_side = names.len().div_ceil(2);
    let top = -((per_side.saturating_sub(1)) as f64) * PIN_SPACING / 2.0;
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let x = if i % 2 == 0 {
                -COMPONENT_WIDTH / 2.0
            } else {
                COMPONENT_WIDTH / 2.0
            };
            let mut pin = Pin::new(name.to_lowercase(), name.clone(), kind_from_name(name));
            pin.position = PinOffset::new(x, top + (i / 2) as f64 * PIN_SPACING);
            pin
        })
        .collect()
}

/// Small name -> kind lookup used for string presets.
fn kind_from_name(name: &str) -> PinKind {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "gnd" | "ground" | "-" | "v-" | "negative" => return PinKind::Ground,
        "vcc" | "3v3" | "5v" | "vin" | "+" | "positive" | "v+" | "power" => {
            return PinKind::Power
        }
        _ => {}
    }
    if lower.starts_with('a') {
        PinKind::Analog
    } else {
        PinKind::Digital
    }
}
