//! Pipeline orchestration for figforge.
//!
//! Two entry points:
//! - [`generate::run_generation`] — the one-shot step that produces the
//!   seed code artifact from the design images and project context.
//! - [`enrichment::run_enrichment`] — the sequential, chunked enrichment
//!   driver that refines the seed code against the full design export.

pub mod enrichment;
pub mod generate;

pub use enrichment::{
    DRIVER_SLOTS, EnrichOptions, EnrichmentOutcome, EnrichmentProgress, RunStatus, SilentProgress,
    run_enrichment,
};
pub use generate::run_generation;
pub use tokio_util::sync::CancellationToken;
