//! Route a persisted diagram snapshot and print the wire paths.

use wirekit::prelude::*;

fn main() -> Result<(), WirekitError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "examples/diagram.json".to_string());

    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Cannot read {path}: {e}");
            eprintln!("Usage: cargo run --example route_diagram [path/to/diagram.json]");
            std::process::exit(1);
        }
    };
    let diagram: Diagram = serde_json::from_str(&json)?;

    let report = validate_diagram(&diagram);
    println!("Diagram: {} ({} findings)", diagram.metadata.title, report.total_findings());
    for issue in report.errors.iter().chain(&report.warnings) {
        println!("  [{}] {}", issue.code, issue.message);
    }

    let mut ctx = RoutingContext::new();
    for (id, svg) in route_all(&mut ctx, &diagram) {
        println!("{id}: {svg}");
    }
    Ok(())
}
