//! Export pipeline
//!
//! validate path → connect → open model → prepare destinations → open
//! exporters → traverse → export. Exporters are opened before the
//! traversal so an unusable destination fails before any model work.

use crate::destination::{Destination, DEFAULT_OUTPUT_DIR};
use crate::export::{Backend, ExportContext, ExportReport, Exporter, JsonExporter, SqliteExporter};
use crate::extract::Extractor;
use crate::local::LocalRepository;
use crate::record::{ExportCounts, ModelMetadata};
use crate::schema::TypeSchema;
use crate::session::ModelSession;
use crate::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What to export and where.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub model_dir: PathBuf,
    /// Folder created inside `model_dir`
    pub output_folder: String,
    pub backends: Vec<Backend>,
    pub pretty: bool,
    pub catalog: bool,
}

impl ExportOptions {
    /// Both back ends into the default folder
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            output_folder: DEFAULT_OUTPUT_DIR.to_string(),
            backends: Backend::all().to_vec(),
            pretty: false,
            catalog: false,
        }
    }

    /// Selected back ends, first occurrence order, no repeats
    pub fn selected_backends(&self) -> Vec<Backend> {
        let mut selected = Vec::new();
        for backend in &self.backends {
            if !selected.contains(backend) {
                selected.push(*backend);
            }
        }
        selected
    }
}

/// Pipeline stages, reported as they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Prepare,
    Extract,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Connect => "Connecting to repository",
            Stage::Prepare => "Preparing destination",
            Stage::Extract => "Extracting model",
            Stage::Write => "Writing exports",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives pipeline progress. Every method defaults to doing nothing.
pub trait PipelineObserver {
    fn stage(&mut self, _stage: Stage) {}

    fn objects(&mut self, _done: usize, _total: usize) {}
}

impl PipelineObserver for () {}

/// Result of one successful run.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub model_name: String,
    pub schema_version: String,
    pub counts: ExportCounts,
    pub reports: Vec<ExportReport>,
    pub elapsed: Duration,
}

/// Export the first model of the repository in `options.model_dir`
pub fn run(options: &ExportOptions) -> Result<ExportSummary> {
    run_with(options, &mut ())
}

/// [`run`] with progress reporting
pub fn run_with(options: &ExportOptions, observer: &mut dyn PipelineObserver) -> Result<ExportSummary> {
    let start = Instant::now();
    let destination = Destination::for_model(&options.model_dir, &options.output_folder)?;

    observer.stage(Stage::Connect);
    let repository = LocalRepository::connect(&options.model_dir)?;
    let model = repository.open_first()?;
    tracing::info!("Opened model {} ({} objects)", model.name(), model.len());

    let mut summary = export_model(&model, repository.schema(), &destination, options, observer)?;
    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Export an already open model session
pub fn export_model(
    session: &dyn ModelSession,
    schema: &dyn TypeSchema,
    destination: &Destination,
    options: &ExportOptions,
    observer: &mut dyn PipelineObserver,
) -> Result<ExportSummary> {
    let start = Instant::now();

    observer.stage(Stage::Prepare);
    let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();
    for backend in options.selected_backends() {
        let exporter: Box<dyn Exporter> = match backend {
            Backend::Json => {
                let dir = destination.prepare_documents()?;
                Box::new(JsonExporter::create(&dir, options.pretty)?)
            }
            Backend::Sqlite => {
                let path = destination.prepare_database(session.name())?;
                Box::new(SqliteExporter::create(&path, options.catalog)?)
            }
        };
        tracing::debug!("Opened {} exporter", exporter.backend());
        exporters.push(exporter);
    }

    observer.stage(Stage::Extract);
    let extraction = Extractor::new(session, schema).run_with_progress(|done, total| observer.objects(done, total))?;

    observer.stage(Stage::Write);
    let metadata = ModelMetadata::new(session.name(), schema.version());
    let context = ExportContext {
        extraction: &extraction,
        metadata: &metadata,
        schema,
    };
    let reports = exporters
        .into_iter()
        .map(|exporter| exporter.export(&context))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Exported {} in {:?}", metadata.name, start.elapsed());
    Ok(ExportSummary {
        model_name: metadata.name.clone(),
        schema_version: metadata.schema_version.clone(),
        counts: extraction.counts,
        reports,
        elapsed: start.elapsed(),
    })
}
