//! CLI Tool Example
//!
//! This example demonstrates how to build a command-line tool
//! using cashiif for converting POS cash sales exports to IIF.
//!
//! Set `RUST_LOG=debug` to see which rows were skipped and why.

use cashiif::{
    CashIifError, ColumnMapping, ConversionReport, ConverterBuilder, LedgerLabels, SheetSelector,
    DEFAULT_PREVIEW_ROWS, IIF_FILE_NAME,
};
use std::fs::File;
use std::io::{self, Write};
use std::process;

struct Options {
    input_path: String,
    output_path: String,
    builder: ConverterBuilder,
    show_report: bool,
}

fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let options = parse_args(&args).unwrap_or_else(|e| {
        handle_error(e);
        process::exit(1);
    });
    let use_stdout = options.output_path == "-";

    match convert_excel(&options, use_stdout) {
        Ok(report) => {
            if !use_stdout {
                println!(
                    "Conversion completed: {} -> {} ({} records, {} rows dropped)",
                    options.input_path,
                    options.output_path,
                    report.records.len(),
                    report.dropped.len()
                );
                print_preview(&report);
            }
            if options.show_report {
                match report.to_json() {
                    Ok(json) => eprintln!("{}", json),
                    Err(e) => handle_error(e),
                }
            }
        }
        Err(e) => {
            handle_error(e);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <input.xlsx> [output.iif|-] [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  --sheet-index <n>     Select sheet by index (0-based)");
    eprintln!("  --sheet-name <name>   Select sheet by name");
    eprintln!("  --skip-rows <n>       Number of leading rows to skip (default: 16)");
    eprintln!("  --mapping <file>      Column mapping JSON");
    eprintln!("  --labels <file>       Ledger labels JSON");
    eprintln!("  --marker <phrase>     Summary marker phrase (default: \"Total Amount for\")");
    eprintln!("  --report              Print the conversion report as JSON to stderr");
    eprintln!("\nExamples:");
    eprintln!("  {} cash_sales.xlsx", program);
    eprintln!("  {} cash_sales.xlsx july.iif --sheet-name \"Cash Sales\"", program);
    eprintln!("  {} cash_sales.xlsx - --report", program);
}

fn parse_args(args: &[String]) -> Result<Options, CashIifError> {
    let mut options = Options {
        input_path: args[1].clone(),
        output_path: IIF_FILE_NAME.to_string(),
        builder: ConverterBuilder::new(),
        show_report: false,
    };

    let mut i = 2;
    if let Some(path) = args.get(2).filter(|a| !a.starts_with("--")) {
        options.output_path = path.clone();
        i = 3;
    }

    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--report" {
            options.show_report = true;
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| CashIifError::Config(format!("{} requires a value", flag)))?;
        options.builder = match flag {
            "--sheet-index" => {
                let index = value.parse::<usize>().map_err(|_| {
                    CashIifError::Config(format!("Invalid sheet index: {}", value))
                })?;
                options.builder.with_sheet_selector(SheetSelector::Index(index))
            }
            "--sheet-name" => options
                .builder
                .with_sheet_selector(SheetSelector::Name(value.clone())),
            "--skip-rows" => {
                let rows = value.parse::<u32>().map_err(|_| {
                    CashIifError::Config(format!("Invalid row count: {}", value))
                })?;
                options.builder.with_skip_rows(rows)
            }
            "--mapping" => {
                let json = std::fs::read_to_string(value)?;
                options.builder.with_column_mapping(ColumnMapping::from_json(&json)?)
            }
            "--labels" => {
                let json = std::fs::read_to_string(value)?;
                options.builder.with_labels(LedgerLabels::from_json(&json)?)
            }
            "--marker" => options.builder.with_marker_phrase(value.clone()),
            _ => {
                return Err(CashIifError::Config(format!("Unknown option: {}", flag)));
            }
        };
        i += 2;
    }

    Ok(options)
}

fn convert_excel(options: &Options, use_stdout: bool) -> Result<ConversionReport, CashIifError> {
    let converter = options.builder.clone().build()?;

    let input = File::open(&options.input_path)?;

    if use_stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let report = converter.convert(input, &mut handle)?;
        handle.flush()?;
        Ok(report)
    } else {
        // 変換に失敗した場合に空のファイルを残さないよう、先にメモリ上で変換する
        let table = converter.read_table(input)?;
        let report = converter.convert_table(&table)?;
        let mut output = File::create(&options.output_path)?;
        output.write_all(report.output.as_bytes())?;
        Ok(report)
    }
}

fn print_preview(report: &ConversionReport) {
    for record in report.preview(DEFAULT_PREVIEW_ROWS) {
        println!(
            "  {}  till {:<4} bill {:<8} {:>12}",
            record.sale_date.format("%m/%d/%Y %H:%M:%S"),
            record.till_number,
            record.bill_number,
            cashiif::format_amount(record.amount)
        );
    }
    if report.records.len() > DEFAULT_PREVIEW_ROWS {
        println!("  ... and {} more", report.records.len() - DEFAULT_PREVIEW_ROWS);
    }
    for dropped in &report.dropped {
        eprintln!("  skipped row {}: {}", dropped.row, dropped.reason);
    }
}

fn handle_error(error: CashIifError) {
    match error {
        CashIifError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        CashIifError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid Excel file or may be corrupted.");
        }
        CashIifError::Json(json_err) => {
            eprintln!("Configuration JSON Error: {}", json_err);
            eprintln!("Please check the mapping or labels file.");
        }
        CashIifError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet selection, column mapping or labels.");
        }
        CashIifError::InputFormat(msg) => {
            eprintln!("Input Format Error: {}", msg);
            eprintln!("The sheet does not look like a cash sales export.");
        }
        CashIifError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
            eprintln!("The file violates security constraints (e.g., file size limit).");
        }
    }
}
