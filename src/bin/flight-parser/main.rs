mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgGroup, Parser};

use flight_schedule::config::OutputOptions;
use flight_schedule::ingestion::{
    CompositeObserver, FileObserver, IngestionObserver, IngestionOptions, IngestionRequest,
    IngestionSource, TracingObserver, load_records_from_path,
};
use flight_schedule::output::{save_errors, save_query_results, save_records};
use flight_schedule::query::{QueryEngine, load_queries_from_path};
use flight_schedule::types::FlightDataSet;

#[derive(Parser)]
#[command(
    name = "flight-parser",
    version,
    about = "Flight schedule parser and query tool"
)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "directory", "json"])))]
struct Cli {
    /// Parse a single CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Parse all CSV files in a folder
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Load an existing JSON database instead of parsing
    #[arg(short, long)]
    json: Option<PathBuf>,

    /// Output JSON file for valid flights
    #[arg(short, long, default_value = "db.json")]
    output: PathBuf,

    /// Output file for the error log
    #[arg(long, default_value = "errors.txt")]
    errors: PathBuf,

    /// Execute queries from a JSON file
    #[arg(short, long)]
    query: Option<PathBuf>,

    /// Directory for query result files
    #[arg(long, default_value = ".")]
    results_dir: PathBuf,

    /// Also append per-file ingestion events to this log file
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Parse directory files in parallel
    #[arg(long)]
    parallel: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let outputs = OutputOptions {
        records_path: cli.output.clone(),
        errors_path: cli.errors.clone(),
        ..OutputOptions::default()
    }
    .with_results_dir(&cli.results_dir);

    let database = match (&cli.json, &cli.input, &cli.directory) {
        (Some(db), _, _) => {
            println!("Loading existing database from {}", db.display());
            load_records_from_path(db).with_context(|| format!("loading database {}", db.display()))?
        }
        (None, input, directory) => {
            let source = match (input, directory) {
                (Some(file), _) => {
                    println!("Parsing CSV file: {}", file.display());
                    IngestionSource::File(file.clone())
                }
                (None, Some(dir)) => {
                    println!("Parsing CSV files in directory: {}", dir.display());
                    IngestionSource::Directory(dir.clone())
                }
                (None, None) => unreachable!("clap requires one source argument"),
            };
            let observer = ingestion_observer(cli.event_log.as_deref())?;
            ingest(source, cli.parallel, observer, &outputs)?
        }
    };

    if let Some(query_path) = &cli.query {
        println!("Executing queries from {}", query_path.display());
        let queries = load_queries_from_path(query_path)
            .with_context(|| format!("loading queries {}", query_path.display()))?;

        let results = QueryEngine::new(database.records()).execute_queries(&queries);

        let path = outputs.results_path(chrono::Local::now().naive_local());
        save_query_results(&path, &results)
            .with_context(|| format!("writing query results {}", path.display()))?;
        println!("Query execution complete. Results saved to {}", path.display());
    }

    Ok(())
}

fn ingestion_observer(event_log: Option<&Path>) -> anyhow::Result<Arc<dyn IngestionObserver>> {
    let Some(path) = event_log else {
        return Ok(Arc::new(TracingObserver));
    };
    let file = FileObserver::create(path).with_context(|| format!("opening event log {}", path.display()))?;
    Ok(Arc::new(
        CompositeObserver::default()
            .with(Arc::new(TracingObserver))
            .with(Arc::new(file)),
    ))
}

fn ingest(
    source: IngestionSource,
    parallel: bool,
    observer: Arc<dyn IngestionObserver>,
    outputs: &OutputOptions,
) -> anyhow::Result<FlightDataSet> {
    let request = IngestionRequest {
        source,
        options: IngestionOptions {
            parallel,
            observer: Some(observer),
            ..IngestionOptions::default()
        },
    };
    let report = request.run()?;

    save_records(&outputs.records_path, report.records.records())
        .with_context(|| format!("writing {}", outputs.records_path.display()))?;
    println!(
        "Saved {} valid flights to {}",
        report.valid_count(),
        outputs.records_path.display()
    );

    save_errors(&outputs.errors_path, &report.rejections)
        .with_context(|| format!("writing {}", outputs.errors_path.display()))?;
    println!(
        "Saved {} errors to {}",
        report.error_count(),
        outputs.errors_path.display()
    );

    println!("Parsing complete: {}", report.summary());
    Ok(report.records)
}
