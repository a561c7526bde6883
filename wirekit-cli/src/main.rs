//! Wirekit CLI - validate, route and inspect wiring diagram snapshots
//! from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use wirekit::prelude::*;

#[derive(Parser)]
#[command(name = "wirekit")]
#[command(about = "Wiring diagram validation and routing tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a diagram snapshot
    Check {
        /// Path to a diagram JSON snapshot
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Also fail (exit non-zero) on warnings
        #[arg(long)]
        strict: bool,
    },

    /// Route every connection of a diagram and print the wire paths
    Route {
        /// Path to a diagram JSON snapshot
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Infer the pin list for a material record
    Pins {
        /// Path to a material JSON record
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripting
    Json,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check { file, format, strict } => handle_check(&file, format, strict),
        Commands::Route { file, format } => handle_route(&file, format),
        Commands::Pins { file, format } => handle_pins(&file, format),
    };

    process::exit(exit_code);
}

fn read_diagram(path: &Path) -> Result<Diagram, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid diagram JSON: {e}"))
}

fn handle_check(path: &Path, format: OutputFormat, strict: bool) -> i32 {
    let diagram = match read_diagram(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    let report = validate_diagram(&diagram);
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return 2;
            }
        },
        OutputFormat::Human => {
            println!(
                "{}: {} components, {} connections",
                diagram.metadata.title,
                diagram.components.len(),
                diagram.connections.len()
            );
            for issue in &report.errors {
                println!("  error [{}] {}", issue.code, issue.message);
            }
            for issue in &report.warnings {
                println!("  warning [{}] {}", issue.code, issue.message);
            }
            if report.is_valid {
                println!("Diagram is valid ({} warnings)", report.warnings.len());
            } else {
                println!("Diagram is invalid ({} errors)", report.errors.len());
            }
        }
    }

    if !report.is_valid || (strict && !report.warnings.is_empty()) {
        1
    } else {
        0
    }
}

fn handle_route(path: &Path, format: OutputFormat) -> i32 {
    let diagram = match read_diagram(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    let mut ctx = RoutingContext::new();
    let routed = route_all(&mut ctx, &diagram);

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = routed
                .into_iter()
                .map(|(id, svg)| (id, serde_json::Value::String(svg)))
                .collect();
            match serde_json::to_string_pretty(&map) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return 2;
                }
            }
        }
        OutputFormat::Human => {
            for (id, svg) in &routed {
                println!("{id}: {svg}");
            }
            println!(
                "Routed {} of {} connections",
                routed.len(),
                diagram.connections.len()
            );
        }
    }
    0
}

fn handle_pins(path: &Path, format: OutputFormat) -> i32 {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", path.display());
            return 2;
        }
    };
    let material: Material = match serde_json::from_str(&json) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: invalid material JSON: {e}");
            return 2;
        }
    };

    let pins = extract_pins(material.specs(), None);
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&pins) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return 2;
            }
        },
        OutputFormat::Human => {
            println!("{} ({} pins)", material.id, pins.len());
            for pin in &pins {
                println!("  {:<10} {:?}", pin.id, pin.kind);
            }
        }
    }
    0
}
