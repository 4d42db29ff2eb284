use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    compose::template::preflight_template,
    foundation::{
        core::PixelSize,
        error::{FramerError, FramerResult},
    },
    pipeline::job::{FramingPipeline, ScreenshotJob},
};

/// Expands an input pattern into candidate files.
pub trait InputResolver: Send + Sync {
    /// Files matching `pattern`, in discovery order. An empty result is not an error.
    fn resolve(&self, pattern: &str) -> Vec<PathBuf>;
}

/// [`InputResolver`] backed by filesystem glob expansion. Directories are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobResolver;

impl InputResolver for GlobResolver {
    fn resolve(&self, pattern: &str) -> Vec<PathBuf> {
        match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("skipping unreadable match: {e}");
                        None
                    }
                })
                .filter(|p| p.is_file())
                .collect(),
            Err(e) => {
                tracing::debug!("'{pattern}' is not a valid glob ({e}); trying it as a path");
                Vec::new()
            }
        }
    }
}

static GLOB_RESOLVER: GlobResolver = GlobResolver;

/// Scheduling knobs for [`BatchRunner`].
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Run jobs on a rayon pool instead of one after another.
    pub parallel: bool,
    /// Worker threads for parallel mode; rayon's default when `None`.
    pub threads: Option<usize>,
}

/// One failed job.
#[derive(Debug)]
pub struct JobFailure {
    pub input: PathBuf,
    pub error: FramerError,
}

/// Outcome of a batch, in discovery order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of files framed.
    pub succeeded: usize,
    /// Written output files.
    pub outputs: Vec<PathBuf>,
    pub failed: Vec<JobFailure>,
}

/// Serializable digest of a [`BatchReport`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FailureSummary {
    pub input: PathBuf,
    pub error: String,
}

impl BatchReport {
    /// Fold one job outcome into the report.
    ///
    /// Per-file failures are logged and kept. Failures that would repeat for every remaining job
    /// (a broken template) are returned instead, ending the batch.
    pub fn record(&mut self, job: &ScreenshotJob, outcome: FramerResult<PixelSize>) -> FramerResult<()> {
        match outcome {
            Ok(_) => {
                self.succeeded += 1;
                self.outputs.push(job.output.clone());
                Ok(())
            }
            Err(err) if err.is_batch_fatal() => Err(err),
            Err(err) => {
                let error = match err {
                    FramerError::Job { source, .. } => *source,
                    other => other,
                };
                tracing::error!("error processing {}: {error}", job.input.display());
                self.failed.push(JobFailure {
                    input: job.input.clone(),
                    error,
                });
                Ok(())
            }
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.succeeded,
            failed: self.failed.len(),
            outputs: self.outputs.clone(),
            failures: self
                .failed
                .iter()
                .map(|f| FailureSummary {
                    input: f.input.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Resolve `pattern` to input files.
///
/// When the resolver finds nothing, `pattern` itself is accepted if it names an existing file
/// (shells often expand globs before we see them).
pub fn resolve_inputs(resolver: &dyn InputResolver, pattern: &str) -> FramerResult<Vec<PathBuf>> {
    let files = resolver.resolve(pattern);
    if !files.is_empty() {
        return Ok(files);
    }
    let literal = Path::new(pattern);
    if literal.is_file() {
        return Ok(vec![literal.to_path_buf()]);
    }
    Err(FramerError::no_matching_input(pattern))
}

/// `<output_dir>/<input stem>-framed.png`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_string());
    output_dir.join(format!("{stem}-framed.png"))
}

/// Applies a [`FramingPipeline`] to every file matched by a pattern.
pub struct BatchRunner<'a> {
    pipeline: FramingPipeline<'a>,
    resolver: &'a dyn InputResolver,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    /// Sequential runner resolving inputs with [`GlobResolver`].
    pub fn new(pipeline: FramingPipeline<'a>) -> Self {
        Self {
            pipeline,
            resolver: &GLOB_RESOLVER,
            options: BatchOptions::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn InputResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Frame every file matching `pattern` into `output_dir`.
    ///
    /// Aborts before writing anything when the frame is unknown, its template is broken, or the
    /// pattern matches nothing. Afterwards, per-file failures are collected in the report and do
    /// not stop the remaining files. A template defect surfacing mid-batch ends it with an error;
    /// in parallel mode every job has already run by then, so the outputs written are logged
    /// before the error is returned.
    #[tracing::instrument(skip(self, output_dir), fields(output_dir = %output_dir.display()))]
    pub fn run_all(
        &self,
        pattern: &str,
        output_dir: &Path,
        frame_name: &str,
    ) -> FramerResult<BatchReport> {
        let frame = self.pipeline.registry().lookup(frame_name)?;
        preflight_template(&frame.template)?;

        let inputs = resolve_inputs(self.resolver, pattern)?;
        std::fs::create_dir_all(output_dir).map_err(|e| FramerError::io(output_dir, e))?;
        tracing::info!("found {} screenshot(s)", inputs.len());

        let jobs: Vec<ScreenshotJob> = inputs
            .into_iter()
            .map(|input| ScreenshotJob {
                output: output_path_for(&input, output_dir),
                input,
                frame: frame_name.to_string(),
            })
            .collect();
        warn_on_shared_outputs(&jobs);

        let mut report = BatchReport::default();
        if self.options.parallel {
            let pool = build_thread_pool(self.options.threads)?;
            let pipeline = self.pipeline;
            let outcomes: Vec<FramerResult<PixelSize>> =
                pool.install(|| jobs.par_iter().map(|job| pipeline.run(job)).collect());
            let (completed, fatal) = fold_completed(&jobs, outcomes);
            if let Some(err) = fatal {
                for output in &completed.outputs {
                    tracing::warn!("written before the batch aborted: {}", output.display());
                }
                return Err(err);
            }
            report = completed;
        } else {
            for job in &jobs {
                report.record(job, self.pipeline.run(job))?;
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "done"
        );
        Ok(report)
    }
}

/// Fold outcomes of jobs that have all already run.
///
/// Every outcome is recorded, including those after a batch-fatal failure; the first such
/// failure comes back next to the report.
fn fold_completed(
    jobs: &[ScreenshotJob],
    outcomes: Vec<FramerResult<PixelSize>>,
) -> (BatchReport, Option<FramerError>) {
    let mut report = BatchReport::default();
    let mut fatal = None;
    for (job, outcome) in jobs.iter().zip(outcomes) {
        if let Err(err) = report.record(job, outcome)
            && fatal.is_none()
        {
            fatal = Some(err);
        }
    }
    (report, fatal)
}

fn warn_on_shared_outputs(jobs: &[ScreenshotJob]) {
    let mut seen = HashSet::new();
    for job in jobs {
        if !seen.insert(&job.output) {
            tracing::warn!(
                "{} maps to an output already claimed by another input: {}",
                job.input.display(),
                job.output.display()
            );
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> FramerResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(FramerError::Other(anyhow::anyhow!(
            "batch 'threads' must be >= 1 when set"
        )));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FramerError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/batch.rs"]
mod tests;
