//! flatiron-inspect: Quick look at how a JSON document will tabulate
//!
//! Reports the string-encoding depth, the document shape, row/column counts
//! for both transformations, and a sampled schema preview.
//!
//! Usage:
//!   # Read from file, output to stdout
//!   flatiron-inspect data.json
//!
//!   # Read from stdin with compact output
//!   echo '{"id": 1}' | flatiron-inspect --compact

use anyhow::{Context, Result};
use clap::Parser;
use flatiron::table::{expand_to_table, flatten, infer_schema};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{stdin, Read};

#[derive(Parser, Debug)]
#[command(name = "flatiron-inspect")]
#[command(about = "Report how a JSON document will tabulate", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Number of top-level elements to sample for the schema preview
    #[arg(long, default_value_t = 50)]
    sample: usize,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut text = String::new();
    if let Some(path) = &args.input {
        File::open(path)
            .with_context(|| format!("Failed to open {path}"))?
            .read_to_string(&mut text)
            .context("Failed to read input")?;
    } else {
        stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    }

    let depth = flatiron::encoding_depth(&text);
    let value = flatiron::parse(&text)?;

    let flat = flatten(&value);
    let expanded = expand_to_table(&value);
    let preview = infer_schema(&value, args.sample);

    let report = json!({
        "encoding_depth": depth,
        "shape": shape_of(&value),
        "flatten": { "rows": flat.rows.len(), "columns": flat.schema.len() },
        "table": { "rows": expanded.rows.len(), "columns": expanded.schema.len() },
        "schema_preview": preview,
    });

    let output = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{output}");

    Ok(())
}

fn shape_of(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(_) => String::from("boolean"),
        Value::Number(_) => String::from("number"),
        Value::String(_) => String::from("string"),
        Value::Array(items) => format!("array[{}]", items.len()),
        Value::Object(map) => format!("object[{} keys]", map.len()),
    }
}
