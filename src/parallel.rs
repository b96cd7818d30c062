//! Parallel processing support for ferro-effect
//!
//! Annotates many variants at once using rayon. Enable with the `parallel`
//! feature. Each variant is independent, so a failing input only affects
//! its own slot in the output.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_effect::parallel::{annotate_batch, BatchStats};
//! use ferro_effect::{MockProvider, VariantAnnotator, VariantInput};
//!
//! let provider = MockProvider::with_test_data();
//! let annotator = VariantAnnotator::new(&provider, &provider);
//!
//! let inputs = vec![
//!     VariantInput::new().loc("1:61").var("sub(G->A)"),
//!     VariantInput::new().loc("1:65").var("del(1)"),
//!     VariantInput::new().loc("1:61").var("bogus"),
//! ];
//!
//! let results = annotate_batch(&annotator, &inputs);
//! let stats = BatchStats::from_results(&results);
//! assert_eq!(stats.errors, 1);
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::annotator::VariantAnnotator;
use crate::effect::Effect;
use crate::error::FerroError;
use crate::reference::{SequenceAccessor, TranscriptIndex};
use crate::variant::{VariantInput, VariantSpec};

pub use crate::config::ParallelConfig;

/// Annotate multiple variant descriptions in parallel
///
/// Returns a vector of results, one for each input.
/// Order is preserved.
pub fn annotate_batch<S, T>(
    annotator: &VariantAnnotator<S, T>,
    inputs: &[VariantInput],
) -> Vec<Result<Vec<Effect>, FerroError>>
where
    S: SequenceAccessor + Sync,
    T: TranscriptIndex + Sync,
{
    inputs
        .par_iter()
        .map(|input| annotator.annotate_variant(input))
        .collect()
}

/// Annotate multiple parsed variants in parallel
///
/// Returns a vector of results, one for each variant.
/// Order is preserved.
pub fn annotate_specs_parallel<S, T>(
    annotator: &VariantAnnotator<S, T>,
    variants: &[VariantSpec],
) -> Vec<Result<Vec<Effect>, FerroError>>
where
    S: SequenceAccessor + Sync,
    T: TranscriptIndex + Sync,
{
    variants
        .par_iter()
        .map(|v| annotator.annotate(v))
        .collect()
}

/// Annotate in parallel with explicit chunking and thread count
///
/// Inputs are processed `chunk_size` at a time on a dedicated pool when
/// `num_threads` is non-zero, on the global pool otherwise.
pub fn annotate_batch_with_config<S, T>(
    annotator: &VariantAnnotator<S, T>,
    inputs: &[VariantInput],
    config: &ParallelConfig,
) -> Result<Vec<Result<Vec<Effect>, FerroError>>, FerroError>
where
    S: SequenceAccessor + Sync,
    T: TranscriptIndex + Sync,
{
    let chunk_size = config.chunk_size.max(1);
    let run = || -> Vec<Result<Vec<Effect>, FerroError>> {
        inputs
            .par_chunks(chunk_size)
            .flat_map_iter(|chunk| chunk.iter().map(|input| annotator.annotate_variant(input)))
            .collect()
    };

    if config.num_threads == 0 {
        return Ok(run());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
        .map_err(|e| FerroError::Config { msg: e.to_string() })?;
    log::debug!(
        "annotating {} variants on {} threads",
        inputs.len(),
        config.num_threads
    );
    Ok(pool.install(run))
}

/// Statistics from a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Total items processed
    pub total: usize,
    /// Successfully processed
    pub success: usize,
    /// Failed to process
    pub errors: usize,
}

impl BatchStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count successes and failures in a batch result
    pub fn from_results<R>(results: &[Result<R, FerroError>]) -> Self {
        let success = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            success,
            errors: results.len() - success,
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}
