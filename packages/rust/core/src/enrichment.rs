//! Sequential enrichment driver.
//!
//! Iterates over the chunked design export in strict order, compiling one
//! prompt per chunk that embeds the previous iteration's full output, and
//! replacing the accumulated code wholesale with each model response.
//! Order is a correctness requirement, not a default: every prompt says
//! "this is part i of N, building on the prior result", so reordering or
//! parallelizing would silently discard enrichments.

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use figforge_chunker::{Chunk, chunk_document};
use figforge_generation::{ContentPart, GenerationClient};
use figforge_shared::{FigforgeError, ImageAttachment, Result};

/// Slot names the driver fills on every iteration, in addition to the
/// caller's static auxiliary context.
const SLOT_ITERATION_NUMBER: &str = "iteration_number";
const SLOT_PART_NUMBER: &str = "part_number";
const SLOT_TOTAL_PARTS: &str = "total_parts";
const SLOT_CURRENT_CODE: &str = "current_code";
const SLOT_DESIGN_CHUNK: &str = "design_chunk";

/// Every slot the driver injects itself. Templates may additionally
/// reference any key of the caller's auxiliary context.
pub const DRIVER_SLOTS: &[&str] = &[
    SLOT_ITERATION_NUMBER,
    SLOT_PART_NUMBER,
    SLOT_TOTAL_PARTS,
    SLOT_CURRENT_CODE,
    SLOT_DESIGN_CHUNK,
];

/// Options for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Model identifier passed through to the generation client. Opaque.
    pub model_id: String,
    /// Chunker granularity for the design export.
    pub max_lines_per_chunk: usize,
    /// Enrichment prompt template (opaque text with named slots).
    pub template: String,
    /// Static slot values applied to every iteration (theme reference,
    /// token mappings, and so on).
    pub auxiliary_context: HashMap<String, String>,
    /// Upper bound on each generation call.
    pub call_timeout: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every iteration succeeded.
    Completed,
    /// Iteration `iteration` failed; no later iteration was attempted.
    Failed { iteration: usize, error: String },
    /// Cancellation was observed, either at an iteration boundary or by
    /// abandoning an in-flight generation call.
    Canceled,
}

/// Terminal, caller-visible outcome of an enrichment run.
///
/// Always carries a usable code artifact: the fully enriched result on
/// success, or the output of the last completed iteration (the seed, if
/// none completed) on failure or cancellation.
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    /// The accumulated code artifact.
    pub code: String,
    /// Number of iterations that completed successfully.
    pub iterations_completed: usize,
    /// Total number of iterations the run would perform (the chunk count).
    pub total_iterations: usize,
    /// How the run ended.
    pub status: RunStatus,
}

impl EnrichmentOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }
}

/// Per-iteration progress callbacks. Observational only — implementations
/// never affect control flow or state.
pub trait EnrichmentProgress: Send + Sync {
    /// An iteration is about to compile its prompt and call the model.
    fn iteration_started(&self, current: usize, total: usize);
    /// An iteration's response has replaced the current code.
    fn iteration_completed(&self, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl EnrichmentProgress for SilentProgress {
    fn iteration_started(&self, _current: usize, _total: usize) {}
    fn iteration_completed(&self, _current: usize, _total: usize) {}
}

/// Run the chunked enrichment loop to completion or first failure.
///
/// Chunks the document, then for each chunk in ascending order: compiles
/// the iteration prompt (auxiliary context + counters + current code +
/// chunk), invokes the generation client with the reference images and
/// the prompt, and on success replaces the current code with the
/// response. The first failure halts the loop; the outcome keeps the
/// last-known-good code.
///
/// Returns `Err` only for [`FigforgeError::InvalidInput`] from chunking —
/// nothing has started at that point, so there is no partial result.
/// Every mid-run failure is reported through [`RunStatus::Failed`] on an
/// `Ok` outcome.
#[instrument(skip_all, fields(model = %options.model_id))]
pub async fn run_enrichment(
    client: &dyn GenerationClient,
    options: &EnrichOptions,
    document: &str,
    seed_code: &str,
    reference_images: &[ImageAttachment],
    progress: &dyn EnrichmentProgress,
    cancel: &CancellationToken,
) -> Result<EnrichmentOutcome> {
    let chunks = chunk_document(document, options.max_lines_per_chunk)?;
    let total = chunks.len();

    info!(chunks = total, "starting enrichment run");

    let image_parts: Vec<ContentPart> = reference_images.iter().map(ContentPart::from).collect();
    let mut code = seed_code.to_string();

    for chunk in &chunks {
        if cancel.is_cancelled() {
            warn!(iteration = chunk.index, "cancellation observed, stopping");
            return Ok(EnrichmentOutcome {
                code,
                iterations_completed: chunk.index - 1,
                total_iterations: total,
                status: RunStatus::Canceled,
            });
        }

        progress.iteration_started(chunk.index, total);

        match run_iteration(client, options, &image_parts, &code, chunk, cancel).await {
            Ok(response) => {
                code = response;
                progress.iteration_completed(chunk.index, total);
            }
            Err(FigforgeError::Canceled) => {
                warn!(iteration = chunk.index, "cancellation abandoned in-flight call");
                return Ok(EnrichmentOutcome {
                    code,
                    iterations_completed: chunk.index - 1,
                    total_iterations: total,
                    status: RunStatus::Canceled,
                });
            }
            Err(e) => {
                warn!(iteration = chunk.index, error = %e, "iteration failed, halting run");
                return Ok(EnrichmentOutcome {
                    code,
                    iterations_completed: chunk.index - 1,
                    total_iterations: total,
                    status: RunStatus::Failed {
                        iteration: chunk.index,
                        error: e.to_string(),
                    },
                });
            }
        }
    }

    info!(iterations = total, "enrichment run complete");

    Ok(EnrichmentOutcome {
        code,
        iterations_completed: total,
        total_iterations: total,
        status: RunStatus::Completed,
    })
}

/// One prompt-compile + model-call cycle for a single chunk.
///
/// Cancellation mid-call abandons the in-flight request and surfaces
/// [`FigforgeError::Canceled`]; the caller keeps the last completed code.
async fn run_iteration(
    client: &dyn GenerationClient,
    options: &EnrichOptions,
    image_parts: &[ContentPart],
    current_code: &str,
    chunk: &Chunk,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut slots = options.auxiliary_context.clone();
    slots.insert(SLOT_ITERATION_NUMBER.into(), chunk.index.to_string());
    slots.insert(SLOT_PART_NUMBER.into(), chunk.index.to_string());
    slots.insert(SLOT_TOTAL_PARTS.into(), chunk.total.to_string());
    slots.insert(SLOT_CURRENT_CODE.into(), current_code.to_string());
    slots.insert(SLOT_DESIGN_CHUNK.into(), chunk.text.clone());

    let prompt = figforge_prompt::compile(&options.template, &slots)?;

    let mut parts: Vec<ContentPart> = image_parts.to_vec();
    parts.push(ContentPart::Text(prompt));

    tokio::select! {
        _ = cancel.cancelled() => Err(FigforgeError::Canceled),
        result = tokio::time::timeout(options.call_timeout, client.generate(&parts, &options.model_id)) => {
            match result {
                Ok(result) => result,
                Err(_) => Err(FigforgeError::Generation(format!(
                    "generation call exceeded {:?} timeout",
                    options.call_timeout
                ))),
            }
        }
    }
}
