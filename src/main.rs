//! Beegen CLI - export a repository model as documents and a SQLite database

use beegen::config::load_config;
use beegen::pipeline::{self, ExportOptions, ExportSummary};
use beegen::ui::{self, Icons};
use beegen::{Backend, Error};
use clap::Parser;
use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when the model path is not a directory
const EXIT_INVALID_MODEL_PATH: u8 = 9;

#[derive(Parser)]
#[command(name = "beegen")]
#[command(version)]
#[command(about = "Export a typed model graph as JSON documents and a SQLite database")]
#[command(long_about = r#"
Beegen walks every object of the first model in a repository and writes:
  • bee/objects.json and bee/associations.json
  • bee/<model>.db with GenObjects, GenProperties, GenAssociations, GenModel

Example usage:
  beegen ./models/sales
  beegen ./models/sales --backend sqlite --catalog
"#)]
struct Cli {
    /// Model directory containing repository.json
    model_dir: PathBuf,

    /// Back end to run (repeatable; default: all)
    #[arg(short, long = "backend", value_name = "BACKEND")]
    backends: Vec<Backend>,

    /// Output folder inside the model directory
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Indent the JSON documents
    #[arg(long)]
    pretty: bool,

    /// Also write the schema catalog tables to the database
    #[arg(long)]
    catalog: bool,

    /// Config file (default: ./beegen.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            ui::error("Invalid configuration.");
            ui::error_detail(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    ui::header(&format!("Beegen {}", beegen::VERSION));
    ui::info("Model", &options.model_dir.display().to_string());

    let mut observer = ui::CliObserver::new();
    let result = pipeline::run_with(&options, &mut observer);
    observer.finish();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e @ Error::InvalidModelPath(_)) => {
            ui::error(e.stage());
            ExitCode::from(EXIT_INVALID_MODEL_PATH)
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Defaults, then the config file, then command-line flags
fn build_options(cli: &Cli) -> anyhow::Result<ExportOptions> {
    let mut options = ExportOptions::new(&cli.model_dir);

    if let Some(config) = load_config(cli.config.as_deref())? {
        config.apply_to(&mut options);
    }

    if let Some(dir) = &cli.output_dir {
        options.output_folder = dir.clone();
    }
    if !cli.backends.is_empty() {
        options.backends = cli.backends.clone();
    }
    options.pretty |= cli.pretty;
    options.catalog |= cli.catalog;
    Ok(options)
}

fn report_error(e: &Error) {
    ui::error(e.stage());
    ui::error_detail(&e.to_string());
    let mut source = e.source();
    while let Some(cause) = source {
        ui::error_detail(&format!("caused by: {}", cause));
        source = cause.source();
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    ui::info("Model", &summary.model_name);
    ui::info("Schema", &summary.schema_version);
    println!("{}", summary.counts);
    println!("{}", ui::summary_table(summary));

    for report in &summary.reports {
        let icon = match report.backend {
            Backend::Json => Icons::FILE,
            Backend::Sqlite => Icons::DATABASE,
        };
        for path in &report.paths {
            ui::output_file(icon, &path.display().to_string());
        }
    }

    ui::timing(&format!("{:.2?}", summary.elapsed));
    ui::success("Export complete");
}
