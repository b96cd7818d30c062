//! Variant annotator
//!
//! Finds the transcripts a variant can touch and classifies the variant
//! against each of them. Every call returns at least one effect: a variant
//! touching no transcript is `intergenic`, one on a chromosome the reference
//! does not know is `unk_chr`.
//!
//! # Example
//!
//! ```
//! use ferro_effect::{EffectKind, MockProvider, VariantAnnotator, VariantInput};
//!
//! let provider = MockProvider::with_test_data();
//! let annotator = VariantAnnotator::new(&provider, &provider);
//!
//! let input = VariantInput::new().loc("1:61").var("sub(G->A)");
//! let effects = annotator.annotate_variant(&input).unwrap();
//! assert_eq!(effects[0].effect, EffectKind::Missense);
//! assert_eq!(effects[0].aa_change.as_deref(), Some("Gly->Glu"));
//! ```

use crate::codon::{is_mitochondrial, CodonTable};
use crate::config::AnnotatorConfig;
use crate::effect::{classify, effects_description, AnnotationRequest, Effect, EffectKind};
use crate::error::FerroError;
use crate::reference::{SequenceAccessor, TranscriptIndex, TranscriptModel};
use crate::variant::{VariantInput, VariantKind, VariantSpec};

/// Annotates variants against a genome and a transcript index
pub struct VariantAnnotator<S: SequenceAccessor, T: TranscriptIndex> {
    genome: S,
    transcripts: T,
    config: AnnotatorConfig,
}

impl<S: SequenceAccessor, T: TranscriptIndex> VariantAnnotator<S, T> {
    /// Create an annotator with the default configuration
    pub fn new(genome: S, transcripts: T) -> Self {
        Self::with_config(genome, transcripts, AnnotatorConfig::default())
    }

    /// Create an annotator with custom configuration
    pub fn with_config(genome: S, transcripts: T, config: AnnotatorConfig) -> Self {
        Self {
            genome,
            transcripts,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Get the genome
    pub fn genome(&self) -> &S {
        &self.genome
    }

    /// Promoter length used on `chrom` (always 0 on mitochondrial chromosomes)
    pub fn promoter_len(&self, chrom: &str) -> u64 {
        if is_mitochondrial(chrom) {
            0
        } else {
            self.config.promoter_len
        }
    }

    /// Parse a variant description and annotate it
    pub fn annotate_variant(&self, input: &VariantInput) -> Result<Vec<Effect>, FerroError> {
        let variant = input.parse(&self.genome)?;
        let effects = self.annotate(&variant)?;
        if log::log_enabled!(log::Level::Debug) {
            if let Some((worst, genes, transcripts)) = effects_description(&effects) {
                log::debug!("{}: {} [{}] [{}]", variant, worst, genes, transcripts);
            }
        }
        Ok(effects)
    }

    /// Annotate a parsed variant
    ///
    /// Effects come in the order the transcript index returns transcripts.
    pub fn annotate(&self, variant: &VariantSpec) -> Result<Vec<Effect>, FerroError> {
        if variant.is_no_mutation() {
            return Ok(vec![Effect::new(EffectKind::NoMutation)]);
        }

        let chrom = variant.chrom.as_str();
        if !self.transcripts.has_chromosome(chrom) && !self.genome.has_chromosome(chrom) {
            log::debug!("{}: chromosome not in the reference", variant);
            return Ok(vec![Effect::new(EffectKind::UnknownChromosome)]);
        }

        if variant.kind.is_cnv() {
            return Ok(self.annotate_cnv(
                chrom,
                variant.pos,
                variant.pos_last,
                variant.kind == VariantKind::CopyNumberGain,
            ));
        }

        if !self.transcripts.has_chromosome(chrom) {
            return Ok(vec![Effect::new(EffectKind::Intergenic)]);
        }

        let code = CodonTable::for_chromosome(chrom);
        let promoter_len = self.promoter_len(chrom);
        let mut effects = Vec::new();
        for transcript in self.candidates(variant, promoter_len) {
            let request = AnnotationRequest::new(
                &self.genome,
                code,
                promoter_len,
                variant,
                transcript,
            );
            if let Some(effect) = classify(&request)? {
                effects.push(effect);
            }
        }

        if effects.is_empty() {
            effects.push(Effect::new(EffectKind::Intergenic));
        }
        Ok(effects)
    }

    /// Transcripts whose span, widened by the promoter length, reaches the
    /// variant
    fn candidates(&self, variant: &VariantSpec, promoter_len: u64) -> Vec<&TranscriptModel> {
        let pos = variant.pos;
        let ref_last = variant.ref_position_last();
        self.transcripts
            .overlapping(
                &variant.chrom,
                pos.saturating_sub(promoter_len),
                ref_last.max(pos).saturating_add(promoter_len),
            )
            .into_iter()
            .filter(|tm| {
                pos <= tm.tx.1.saturating_add(promoter_len)
                    && ref_last.saturating_add(promoter_len) >= tm.tx.0
            })
            .collect()
    }

    /// Transcripts whose span intersects `start..=end`
    fn spanning(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        self.transcripts
            .overlapping(chrom, start, end)
            .into_iter()
            .filter(|tm| tm.tx.0 <= end && start <= tm.tx.1)
            .collect()
    }

    /// One effect of `kind` per transcript whose span intersects
    /// `start..=end`, each carrying the region length
    ///
    /// A region hitting no transcript yields a single gene-less effect.
    pub fn annotate_region(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        kind: EffectKind,
    ) -> Vec<Effect> {
        let length = end.saturating_sub(start) + 1;
        let mut effects: Vec<Effect> = self
            .spanning(chrom, start, end)
            .into_iter()
            .map(|tm| Effect {
                length: Some(length),
                ..Effect::for_transcript(kind, tm)
            })
            .collect();

        if effects.is_empty() {
            effects.push(Effect {
                length: Some(length),
                ..Effect::new(kind)
            });
        }
        effects
    }

    /// Annotate a copy-number change over `start..=end`
    ///
    /// Every transcript touched is reported as `unknown`, or as `CNV+`/`CNV-`
    /// when typed CNV effects are enabled.
    pub fn annotate_cnv(&self, chrom: &str, start: u64, end: u64, gain: bool) -> Vec<Effect> {
        if self.config.typed_cnv_effects {
            let kind = if gain {
                EffectKind::CnvGain
            } else {
                EffectKind::CnvLoss
            };
            return self.annotate_region(chrom, start, end, kind);
        }
        if self.spanning(chrom, start, end).is_empty() {
            return vec![Effect::new(EffectKind::Intergenic)];
        }
        self.annotate_region(chrom, start, end, EffectKind::Unknown)
            .into_iter()
            .map(|e| Effect { length: None, ..e })
            .collect()
    }
}

/// Build a one-off annotator and annotate a single variant
pub fn annotate_variant<T: TranscriptIndex, S: SequenceAccessor>(
    transcripts: T,
    genome: S,
    input: &VariantInput,
    promoter_len: u64,
) -> Result<Vec<Effect>, FerroError> {
    let config = AnnotatorConfig::default().with_promoter_len(promoter_len);
    VariantAnnotator::with_config(genome, transcripts, config).annotate_variant(input)
}
