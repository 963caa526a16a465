//! Basic Conversion Example
//!
//! This example demonstrates the most basic usage of cashiif:
//! converting a POS cash sales export to an IIF ledger using default settings.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_conversion -- cash_sales.xlsx cash_sales.iif
//! ```

use cashiif::{ConverterBuilder, IIF_FILE_NAME};
use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = std::env::args()
        .nth(1)
        .ok_or("Usage: basic_conversion <input.xlsx> [output.iif]")?;

    let output_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| IIF_FILE_NAME.to_string());

    println!("Converting {} to {}...", input_path, output_path);

    // Create a converter with default settings
    let converter = ConverterBuilder::new().build()?;

    let input = File::open(&input_path).map_err(|e| {
        eprintln!("Error: Could not open input file '{}'", input_path);
        eprintln!("  {}", e);
        e
    })?;

    let output = File::create(&output_path).map_err(|e| {
        eprintln!("Error: Could not create output file '{}'", output_path);
        eprintln!("  {}", e);
        e
    })?;

    let report = converter.convert(input, output)?;

    println!(
        "Conversion completed: {} records written, {} rows skipped",
        report.records.len(),
        report.dropped.len()
    );
    println!("Output written to: {}", output_path);

    Ok(())
}
