//! tabload CLI - load uploaded tables of uncertain format and write CSV

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabload::prelude::*;
use tabload::{expand_schedule, LineTerminator, Loaded, ScheduleColumns};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabload")]
#[command(
    author,
    version,
    about = "Load CSV and Excel uploads of uncertain format and convert them to CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file and write it out as CSV (stdout or file)
    Convert {
        #[command(flatten)]
        load: LoadArgs,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prefix the output with a UTF-8 byte-order mark
        #[arg(long)]
        bom: bool,

        /// End lines with CRLF instead of LF
        #[arg(long)]
        crlf: bool,
    },

    /// Show the first rows of a file and how it was read
    Preview {
        #[command(flatten)]
        load: LoadArgs,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,

        /// Print rows as JSON objects instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// List the worksheets of a workbook
    Sheets {
        /// Input workbook (xlsx, xlsm, xls)
        input: PathBuf,
    },

    /// Add active week numbers and class dates to an exported class schedule
    Schedule {
        #[command(flatten)]
        load: LoadArgs,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column holding the week pattern
        #[arg(long, default_value = "Week Pattern")]
        pattern_column: String,

        /// Column holding the start date
        #[arg(long, default_value = "Ngày bắt đầu")]
        start_column: String,

        /// Column holding the day of week (2 = Monday ... 8 = Sunday)
        #[arg(long, default_value = "Thứ")]
        day_column: String,
    },
}

/// Input file and loading hints shared by the loading commands
#[derive(Args)]
struct LoadArgs {
    /// Input file (csv, xlsx, xlsm, xls)
    input: PathBuf,

    /// CSV delimiter hint: "," ";" "\t", or comma/semicolon/tab
    #[arg(short, long, env = "TABLOAD_DELIMITER")]
    delimiter: Option<Delimiter>,

    /// CSV encoding hint, e.g. utf-8, utf-8-sig, latin-1, windows-1252
    #[arg(short, long, env = "TABLOAD_ENCODING")]
    encoding: Option<String>,

    /// Worksheet to read: 0-based index or name (default: first)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Rows to discard before the header row
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Type CSV fields as numbers and booleans
    #[arg(long)]
    infer_types: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            load,
            output,
            bom,
            crlf,
        } => convert(&load, output.as_deref(), bom, crlf),
        Commands::Preview { load, rows, json } => preview(&load, rows, json),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Schedule {
            load,
            output,
            pattern_column,
            start_column,
            day_column,
        } => schedule(
            &load,
            output.as_deref(),
            &ScheduleColumns {
                week_pattern: pattern_column,
                start_date: start_column,
                day_of_week: day_column,
            },
        ),
    }
}

/// Log to stderr, filtered by TABLOAD_LOG, then RUST_LOG, default warn
fn init_logging() {
    let filter = EnvFilter::try_from_env("TABLOAD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load(args: &LoadArgs) -> Result<Loaded> {
    let kind = FileKind::from_path(&args.input)?;
    let bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;

    let mut request = LoadRequest::new(&bytes, kind)
        .skip_rows(args.skip_rows)
        .infer_types(args.infer_types);
    if let Some(delimiter) = args.delimiter {
        request = request.delimiter(delimiter);
    }
    if let Some(encoding) = &args.encoding {
        request = request.encoding(encoding.as_str());
    }
    if let Some(sheet) = &args.sheet {
        request = request.sheet(SheetSelector::parse(sheet));
    }

    TabularLoader::new()
        .load_detailed(&request)
        .with_context(|| format!("Failed to load '{}'", args.input.display()))
}

fn write_csv(table: &Table, output: Option<&Path>, options: &CsvWriteOptions) -> Result<()> {
    let bytes = CsvWriter::to_bytes(table, options).context("Failed to serialize CSV")?;

    if let Some(output_path) = output {
        fs::write(output_path, &bytes)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} rows to '{}'",
            table.row_count(),
            output_path.display()
        );
    } else {
        io::stdout()
            .write_all(&bytes)
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn convert(args: &LoadArgs, output: Option<&Path>, bom: bool, crlf: bool) -> Result<()> {
    let loaded = load(args)?;
    let options = CsvWriteOptions {
        byte_order_mark: bom,
        line_terminator: if crlf {
            LineTerminator::CRLF
        } else {
            LineTerminator::LF
        },
        ..Default::default()
    };
    write_csv(&loaded.table, output, &options)
}

fn preview(args: &LoadArgs, rows: usize, json: bool) -> Result<()> {
    let loaded = load(args)?;
    let table = &loaded.table;

    match loaded.candidate {
        Some(candidate) => eprintln!(
            "Read as {} after {} rejected attempts",
            candidate,
            loaded.rejected.len()
        ),
        None => eprintln!("Read worksheet"),
    }
    eprintln!("{} columns, {} rows", table.column_count(), table.row_count());

    let mut stdout = io::stdout();
    if json {
        let head: Vec<Row<'_>> = table.rows().take(rows).collect();
        serde_json::to_writer_pretty(&mut stdout, &head).context("Failed to write JSON")?;
        writeln!(stdout)?;
    } else {
        let head = Table::from_rows(
            table.columns().to_vec(),
            table.records().iter().take(rows).cloned().collect(),
        )?;
        CsvWriter::write(&head, &mut stdout, &CsvWriteOptions::default())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let kind = FileKind::from_path(input)?;
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;

    let names = TabularLoader::new()
        .sheet_names(&bytes, kind)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in names.iter().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}

fn schedule(args: &LoadArgs, output: Option<&Path>, columns: &ScheduleColumns) -> Result<()> {
    let mut table = load(args)?.table;
    expand_schedule(&mut table, columns).context("Failed to expand schedule")?;
    write_csv(&table, output, &CsvWriteOptions::default())
}
