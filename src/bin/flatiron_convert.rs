//! flatiron-convert: Turn arbitrary JSON into spreadsheet-ready tables
//!
//! Usage:
//!   # Read from file, CSV to stdout
//!   flatiron-convert data.json
//!
//!   # Read from stdin, render an HTML table
//!   echo '{"id": 1, "tags": ["a", "b"]}' | flatiron-convert --format html
//!
//!   # One row per nested array item instead of indexed columns
//!   flatiron-convert --table orders.json
//!
//!   # Process NDJSON, write the result to a file
//!   flatiron-convert --ndjson events.jsonl --format csv --output out.csv

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use flatiron::export::{to_csv, to_html};
use flatiron::table::{expand_to_table, FlattenConfig, Flattener};
use flatiron::FlattenResult;
use serde_json::Value;
use std::fs::File;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "flatiron-convert")]
#[command(about = "Convert arbitrary JSON into spreadsheet-ready tables", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON; each record becomes its own table,
    /// separated by a blank line in the output
    #[arg(long)]
    ndjson: bool,

    /// Expand nested arrays into extra rows instead of indexed columns
    #[arg(long)]
    table: bool,

    /// Output format: csv, html or json (rows as NDJSON)
    #[arg(long, default_value = "csv")]
    format: String,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// How many levels of array-of-objects to expand into columns
    /// (flatten mode, default: 1)
    #[arg(long)]
    max_array_depth: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut content = Vec::new();
    if let Some(path) = &args.input {
        File::open(path)
            .with_context(|| format!("Failed to open {path}"))?
            .read_to_end(&mut content)
            .context("Failed to read input")?;
    } else {
        std::io::stdin()
            .read_to_end(&mut content)
            .context("Failed to read stdin")?;
    }

    let rendered = if args.ndjson {
        convert_ndjson(&content, &args)?
    } else {
        let value = parse_content(&content)?;
        render(&transform(&value, &args), &args.format)?
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {path}"))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Parse a whole document: SIMD fast path for plain JSON, defensive parser
/// fallback for diagnostics and string-encoded payloads.
fn parse_content(content: &[u8]) -> Result<Value> {
    // simd-json mutates its buffer, so the fast path works on a copy and the
    // original bytes stay available for the fallback.
    let mut simd_buf = content.to_vec();
    if let Ok(owned) = simd_json::to_owned_value(&mut simd_buf) {
        // String results may be encoded payloads; those take the slow path.
        if !matches!(owned, simd_json::OwnedValue::String(_)) {
            let json_str = simd_json::to_string(&owned)?;
            return serde_json::from_str(&json_str).context("Failed to convert parsed JSON");
        }
    }

    let text = String::from_utf8_lossy(content);
    Ok(flatiron::parse(&text)?)
}

fn convert_ndjson(content: &[u8], args: &Args) -> Result<String> {
    let text = String::from_utf8_lossy(content);
    let mut sections = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = flatiron::parse(line)
            .with_context(|| format!("Invalid JSON on line {}", number + 1))?;
        sections.push(render(&transform(&value, args), &args.format)?);
    }

    if sections.is_empty() {
        eprintln!("Warning: no JSON records found in input");
    }

    Ok(sections.join("\n\n"))
}

fn transform(value: &Value, args: &Args) -> FlattenResult {
    if args.table {
        expand_to_table(value)
    } else {
        let mut config = FlattenConfig::default();
        if let Some(depth) = args.max_array_depth {
            config.max_array_depth = depth;
        }
        Flattener::new(config).flatten(value)
    }
}

fn render(result: &FlattenResult, format: &str) -> Result<String> {
    match format {
        "csv" => Ok(to_csv(&result.rows, &result.schema)),
        "html" => Ok(to_html(&result.rows, &result.schema)),
        "json" => {
            let mut lines = Vec::with_capacity(result.rows.len());
            for row in &result.rows {
                lines.push(serde_json::to_string(row).context("Failed to serialize row")?);
            }
            Ok(lines.join("\n"))
        }
        other => bail!("Unknown output format: {other} (expected csv, html or json)"),
    }
}
