//! Reference data abstraction
//!
//! Provides the genome and transcript-index traits the annotator reads from,
//! plus in-memory, FASTA and gene-model-file implementations.

pub mod fasta;
pub mod loader;
pub mod mock;
pub mod provider;
pub mod transcript;

pub use fasta::FastaAccessor;
pub use loader::{load_gene_models, load_gene_models_as, GeneModelFormat, TranscriptDb};
pub use mock::MockProvider;
pub use provider::{SequenceAccessor, TranscriptIndex};
pub use transcript::{Exon, Region, Strand, TranscriptModel};
