//! Reference collaborator traits
//!
//! The annotator reads from two collaborators: a genome that returns bases
//! for a 1-based inclusive range, and an index of transcript models that can
//! be queried by genomic region.

use crate::error::FerroError;
use crate::reference::transcript::TranscriptModel;

/// Read-only access to reference genome sequence
///
/// Implementations might include:
/// - MockProvider for testing
/// - FastaAccessor for indexed FASTA files
pub trait SequenceAccessor {
    /// Get the bases of `chrom` from `start` to `end`
    ///
    /// # Arguments
    ///
    /// * `chrom` - Chromosome name
    /// * `start` - 1-based start position (inclusive)
    /// * `end` - 1-based end position (inclusive)
    ///
    /// Returns an empty string when `end < start`. Bases are upper-case.
    fn get(&self, chrom: &str, start: u64, end: u64) -> Result<String, FerroError>;

    /// Check if the genome has a sequence for `chrom`
    fn has_chromosome(&self, chrom: &str) -> bool;

    /// Length of a chromosome, when known
    fn chromosome_length(&self, _chrom: &str) -> Option<u64> {
        None
    }
}

/// Lookup of transcript models by genomic region
pub trait TranscriptIndex {
    /// Transcripts on `chrom` whose span intersects `[start, end]`
    ///
    /// Results come in a stable order (transcript start, then insertion
    /// order) so repeated queries return identical lists.
    fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel>;

    /// Check if any transcript is annotated on `chrom`
    fn has_chromosome(&self, chrom: &str) -> bool;
}

impl<T: SequenceAccessor + ?Sized> SequenceAccessor for &T {
    fn get(&self, chrom: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get(chrom, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        (**self).has_chromosome(chrom)
    }

    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        (**self).chromosome_length(chrom)
    }
}

/// Blanket implementation for boxed trait objects
impl SequenceAccessor for Box<dyn SequenceAccessor + Send + Sync> {
    fn get(&self, chrom: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get(chrom, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        (**self).has_chromosome(chrom)
    }

    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        (**self).chromosome_length(chrom)
    }
}

impl<T: TranscriptIndex + ?Sized> TranscriptIndex for &T {
    fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        (**self).overlapping(chrom, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        (**self).has_chromosome(chrom)
    }
}

/// Blanket implementation for boxed trait objects
impl TranscriptIndex for Box<dyn TranscriptIndex + Send + Sync> {
    fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        (**self).overlapping(chrom, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        (**self).has_chromosome(chrom)
    }
}
