//! tabex CLI: export tables to delimited text, Feather, Parquet, Avro or a
//! native dump.

mod job;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use tabex_core::FormatDescriptor;
use tabex_exec::{ExportError, TableExporter};

use crate::job::JobFile;

#[derive(Parser)]
#[command(name = "tabex")]
#[command(about = "Export tabular data to text, columnar, row-serialized or dump files", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG is used otherwise)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a table
    Export(ExportArgs),

    /// Run every export check without writing anything
    Validate(ExportArgs),

    /// Print the contents of a file written by `tabex export`
    Inspect {
        /// File to read; the decoder is picked by extension
        path: PathBuf,

        /// Maximum rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args, Debug, Default)]
struct ExportArgs {
    /// YAML job file; the flags below override its fields
    #[arg(short, long)]
    job: Option<PathBuf>,

    /// Source table (csv/txt/tsv, or any format tabex writes)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination file, or root directory when partitioning
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv, txt, feather, parquet, avro or dump
    #[arg(short, long)]
    format: Option<String>,

    /// Partition columns, outermost first
    #[arg(long, value_delimiter = ',')]
    partition_by: Vec<String>,

    /// Compression codec for feather, parquet or avro output
    #[arg(long)]
    compression: Option<String>,

    /// Field delimiter for text output
    #[arg(long)]
    delimiter: Option<char>,

    /// Field delimiter of a text source
    #[arg(long)]
    source_delimiter: Option<char>,

    /// The text source has no header record
    #[arg(long)]
    no_headers: bool,

    /// Parse text source cells into numbers where possible
    #[arg(long)]
    infer: bool,

    /// Replace an existing destination
    #[arg(long)]
    overwrite: bool,

    /// File name used inside partition directories
    #[arg(long)]
    file_stem: Option<String>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("read error: {0}")]
    Read(#[from] tabex_io::Error),

    #[error("invalid option: {0}")]
    Option(#[from] tabex_core::Error),

    #[error("job file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::Export(e) => e.suggestions(),
            CliError::Read(e) => e.suggestions(),
            CliError::Option(e) => e.suggestions(),
            CliError::Usage(_) => vec!["Run `tabex help export` for the accepted flags".into()],
            _ => vec![],
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::Validate(args) => validate_export(args).map(|()| println!("✓ Export is valid")),
        Commands::Inspect { path, limit } => inspect(&path, limit),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        for s in e.suggestions() {
            eprintln!("  hint: {}", s);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn format_from_name(name: &str) -> Result<FormatDescriptor, CliError> {
    match name.to_ascii_lowercase().as_str() {
        "csv" => Ok(FormatDescriptor::csv()),
        "txt" | "tsv" => Ok(FormatDescriptor::txt()),
        "feather" | "arrow" => Ok(FormatDescriptor::feather()),
        "parquet" => Ok(FormatDescriptor::parquet()),
        "avro" => Ok(FormatDescriptor::avro()),
        "dump" => Ok(FormatDescriptor::dump()),
        other => Err(CliError::Usage(format!(
            "unknown format '{}' (expected csv, txt, feather, parquet, avro or dump)",
            other
        ))),
    }
}

/// Merge the job file (if any) with command-line overrides.
fn resolve_job(args: ExportArgs) -> Result<JobFile, CliError> {
    let mut job = match &args.job {
        Some(path) => JobFile::load(path)?,
        None => {
            let missing = |flag: &str| CliError::Usage(format!("--{} is required without --job", flag));
            JobFile {
                source: args.input.clone().ok_or_else(|| missing("input"))?,
                destination: args.output.clone().ok_or_else(|| missing("output"))?,
                overwrite: false,
                has_headers: true,
                source_delimiter: None,
                infer: false,
                file_stem: None,
                format: format_from_name(args.format.as_deref().ok_or_else(|| missing("format"))?)?,
            }
        }
    };

    if let Some(input) = args.input {
        job.source = input;
    }
    if let Some(output) = args.output {
        job.destination = output;
    }
    if args.job.is_some() {
        if let Some(name) = &args.format {
            job.format = format_from_name(name)?;
        }
    }
    if !args.partition_by.is_empty() {
        job.format = job.format.with_partition_by(args.partition_by);
    }
    if let Some(codec) = args.compression {
        job.format = job.format.with_compression(codec);
    }
    if let Some(c) = args.delimiter {
        match &mut job.format {
            FormatDescriptor::DelimitedText { delimiter, .. } => *delimiter = c,
            other => {
                return Err(CliError::Usage(format!(
                    "--delimiter only applies to text output, not {}",
                    other.name()
                )))
            }
        }
    }
    if args.source_delimiter.is_some() {
        job.source_delimiter = args.source_delimiter;
    }
    if args.file_stem.is_some() {
        job.file_stem = args.file_stem;
    }
    job.has_headers &= !args.no_headers;
    job.infer |= args.infer;
    job.overwrite |= args.overwrite;
    Ok(job)
}

fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let job = resolve_job(args)?;
    let table = job.load_source()?;
    tracing::debug!(
        source = %job.source.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded source"
    );

    let exporter = TableExporter::new(job.options());
    let report = exporter.export(&table, &job.destination, &job.format)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn validate_export(args: ExportArgs) -> Result<(), CliError> {
    print!("{}", describe_plan(args)?);
    Ok(())
}

/// Plan the export (no writes) and render the summary `validate` prints.
fn describe_plan(args: ExportArgs) -> Result<String, CliError> {
    use std::fmt::Write;

    let job = resolve_job(args)?;
    let table = job.load_source()?;
    let plan = TableExporter::new(job.options()).plan(&table, &job.destination, &job.format)?;

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Export Plan");
    let _ = writeln!(out, "===========");
    let _ = writeln!(out, "Format:      {}", job.format.name());
    let _ = writeln!(out, "Destination: {}", plan.target().display());
    let _ = writeln!(out, "Rows:        {}", table.num_rows());
    if plan.is_partitioned() {
        let _ = writeln!(out, "Partitions:  {}", plan.groups().len());
        for group in plan.groups() {
            let label = group.label().unwrap_or_default();
            let _ = writeln!(out, "  {} ({} rows)", label, group.row_ids.len());
        }
    }
    if let Some(schema) = plan.schema() {
        let _ = writeln!(out, "Schema:");
        for field in &schema.fields {
            let null = if field.nullable { "" } else { " not null" };
            let _ = writeln!(out, "  {}: {}{}", field.name, field.data_type, null);
        }
    }
    Ok(out)
}

fn inspect(path: &std::path::Path, limit: usize) -> Result<(), CliError> {
    let table = tabex_io::read_any(path)?;
    print!("{}", render_table(&table, limit));
    Ok(())
}

/// Tab-separated preview of the first `limit` rows plus a size footer.
fn render_table(table: &tabex_core::Table, limit: usize) -> String {
    let mut lines = vec![table.columns.join("\t")];
    for row in table.rows.iter().take(limit) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        lines.push(cells.join("\t"));
    }
    if table.num_rows() > limit {
        lines.push(format!("... {} more rows", table.num_rows() - limit));
    }
    lines.push(format!("({} rows, {} columns)", table.num_rows(), table.num_columns()));
    lines.join("\n") + "\n"
}
