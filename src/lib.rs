// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-effect: variant effect classification
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Classifies the consequence of a substitution, insertion, deletion or
//! copy-number change on every transcript it touches, and summarizes the
//! per-transcript effects into severity-ranked labels.
//!
//! # Example
//!
//! ```
//! use ferro_effect::{worst_effect, EffectKind, MockProvider, VariantAnnotator, VariantInput};
//!
//! // A small synthetic genome with a handful of transcripts
//! let provider = MockProvider::with_test_data();
//! let annotator = VariantAnnotator::new(&provider, &provider);
//!
//! // Delete one base inside the coding sequence of GENEP
//! let input = VariantInput::new().loc("1:65").var("del(1)");
//! let effects = annotator.annotate_variant(&input).unwrap();
//!
//! assert_eq!(worst_effect(&effects), Some(EffectKind::FrameShift));
//! println!("{}", effects[0]);
//! ```

pub mod annotator;
pub mod codon;
pub mod config;
pub mod effect;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reference;
pub mod variant;

// Re-export commonly used types
pub use annotator::{annotate_variant, VariantAnnotator};
pub use codon::CodonTable;
pub use config::{AnnotatorConfig, ParallelConfig};
pub use effect::{
    effects_description, gene_effects, worst_effect, AlleleEffects, Effect, EffectGroup,
    EffectKind,
};
pub use error::FerroError;
pub use reference::{
    FastaAccessor, MockProvider, SequenceAccessor, Strand, TranscriptDb, TranscriptIndex,
    TranscriptModel,
};
pub use variant::{VariantInput, VariantKind, VariantSpec};

/// Result type alias for ferro-effect operations
pub type Result<T> = std::result::Result<T, FerroError>;
