//! customer-etl CLI - Load customer shopping CSV data into PostgreSQL
//!
//! ```bash
//! customer-etl load data/customer_shopping_behavior.csv    # Full ETL into table "customer"
//! customer-etl load input.csv --table customer_2024       # Custom destination table
//! customer-etl transform input.csv -o out.json            # Transform only, no database
//! customer-etl transform input.csv --format csv           # Cleaned CSV to stdout
//! ```
//!
//! Database settings come from `DB_USER`, `DB_PASSWORD`, `DB_HOST`,
//! `DB_PORT` and `DB_NAME` (a `.env` file is loaded if present).

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use customer_etl::{
    logging, pipeline, DbConfig, Dataset, PipelineError, PostgresSink, ReadOptions, RunOptions,
    DEFAULT_TABLE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const DEFAULT_INPUT: &str = "data/customer_shopping_behavior.csv";

#[derive(Parser)]
#[command(name = "customer-etl")]
#[command(about = "Clean customer shopping CSV data and load it into PostgreSQL", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → transform → replace PostgreSQL table
    Load {
        /// Input CSV file
        #[arg(default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Destination table (replaced on every run)
        #[arg(short, long, default_value = DEFAULT_TABLE)]
        table: String,

        /// CSV delimiter (default: ',')
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Read and transform only; print or save the result
    Transform {
        /// Input CSV file
        #[arg(default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// CSV delimiter (default: ',')
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Load {
            input,
            table,
            delimiter,
        } => cmd_load(&input, table, delimiter).await,

        Commands::Transform {
            input,
            output,
            format,
            delimiter,
        } => cmd_transform(&input, output.as_deref(), format, delimiter),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn read_options(delimiter: Option<char>) -> Result<ReadOptions, PipelineError> {
    Ok(delimiter
        .map(ReadOptions::with_delimiter)
        .transpose()?
        .unwrap_or_default())
}

async fn cmd_load(
    input: &Path,
    table: String,
    delimiter: Option<char>,
) -> Result<(), PipelineError> {
    // Configuration problems are fatal before any stage runs
    let config = DbConfig::from_env()?;
    info!(host = %config.host, port = config.port, database = %config.name, "Loaded database configuration");

    let options = RunOptions {
        table,
        read: read_options(delimiter)?,
    };
    let mut sink = PostgresSink::new(&config);
    let report = pipeline::run(input, &options, &mut sink).await?;

    info!(
        run_id = %report.run_id,
        rows = report.rows_written,
        table = %report.table,
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Done"
    );
    Ok(())
}

fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    delimiter: Option<char>,
) -> Result<(), PipelineError> {
    let dataset = pipeline::prepare(input, read_options(delimiter)?)?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&dataset.to_records())
            .map_err(|e| PipelineError::Output(e.to_string()))?,
        OutputFormat::Csv => render_csv(&dataset)?,
    };
    write_output(&rendered, output)
}

fn render_csv(dataset: &Dataset) -> Result<String, PipelineError> {
    let output_err = |e: &dyn std::fmt::Display| PipelineError::Output(e.to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(dataset.column_names())
        .map_err(|e| output_err(&e))?;
    for row in 0..dataset.row_count() {
        writer
            .write_record(dataset.columns().iter().map(|c| c.values[row].to_string()))
            .map_err(|e| output_err(&e))?;
    }
    let bytes = writer.into_inner().map_err(|e| output_err(&e))?;
    String::from_utf8(bytes).map_err(|e| output_err(&e))
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), PipelineError> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(|e| PipelineError::Output(e.to_string()))?;
            info!(path = %p.display(), "Output written");
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
