//! Variant effect kinds and the per-transcript effect record.
//!
//! Every annotated transcript yields one [`Effect`]. The effect kind is a
//! closed enum with a fixed severity ranking, used by the summaries in
//! [`summary`] to pick the worst consequence of a variant.
//!
//! # Example
//!
//! ```
//! use ferro_effect::effect::{EffectGroup, EffectKind, Impact};
//!
//! let kind = EffectKind::from_name("splice-site").unwrap();
//! assert!(kind.severity() > EffectKind::Missense.severity());
//! assert!(kind.in_group(EffectGroup::Lgds));
//! assert_eq!(kind.impact(), Impact::High);
//! ```

pub mod coding;
pub mod intron;
pub mod region;
pub mod request;
pub mod summary;

pub use region::classify;
pub use request::AnnotationRequest;
pub use summary::{
    effects_description, gene_effects, lgd_gene_effects, simplify_effects, sort_effects,
    transcript_effects, worst_effect, AlleleEffects, EffectGene, EffectTranscript,
};

use crate::error::FerroError;
use crate::reference::{Strand, TranscriptModel};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Consequence of a variant on one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Copy-number gain touching a gene (`CNV+`).
    CnvGain,
    /// Copy-number loss touching a gene (`CNV-`).
    CnvLoss,
    /// Change in the anticodon of a tRNA gene.
    TRnaAnticodon,
    /// Variant covering the whole transcript.
    All,
    /// Within 2bp of a coding exon/intron boundary.
    SpliceSite,
    /// Indel shifting the reading frame.
    FrameShift,
    /// Substitution introducing a stop codon.
    Nonsense,
    /// In-frame indel introducing a stop codon.
    NoFrameShiftNewStop,
    /// Start codon destroyed.
    NoStart,
    /// Stop codon destroyed.
    NoEnd,
    /// Amino acid substitution.
    Missense,
    /// In-frame indel.
    NoFrameShift,
    /// Coding change of undetermined consequence.
    Cds,
    /// Codon change keeping the amino acid.
    Synonymous,
    /// Codon change involving an untranslatable codon.
    CodingUnknown,
    /// Regulatory region.
    Regulatory,
    /// 3' untranslated region.
    Utr3,
    /// 5' untranslated region.
    Utr5,
    /// Intron between coding exons.
    Intron,
    /// Exon of a non-coding transcript.
    NonCoding,
    /// Intron inside the 5' UTR.
    Utr5Intron,
    /// Intron inside the 3' UTR.
    Utr3Intron,
    /// Upstream of the transcript, within the promoter length.
    Promoter,
    /// Intron of a non-coding transcript.
    NonCodingIntron,
    /// Transcript hit but the consequence cannot be determined.
    Unknown,
    /// No transcript hit.
    Intergenic,
    /// Reference and alternate alleles are identical.
    NoMutation,
    /// Chromosome missing from both the genome and the transcript index.
    UnknownChromosome,
}

impl EffectKind {
    /// All effect kinds, most severe first.
    pub const ALL: [EffectKind; 28] = [
        EffectKind::CnvGain,
        EffectKind::CnvLoss,
        EffectKind::TRnaAnticodon,
        EffectKind::All,
        EffectKind::SpliceSite,
        EffectKind::FrameShift,
        EffectKind::Nonsense,
        EffectKind::NoFrameShiftNewStop,
        EffectKind::NoStart,
        EffectKind::NoEnd,
        EffectKind::Missense,
        EffectKind::NoFrameShift,
        EffectKind::Cds,
        EffectKind::Synonymous,
        EffectKind::CodingUnknown,
        EffectKind::Regulatory,
        EffectKind::Utr3,
        EffectKind::Utr5,
        EffectKind::Intron,
        EffectKind::NonCoding,
        EffectKind::Utr5Intron,
        EffectKind::Utr3Intron,
        EffectKind::Promoter,
        EffectKind::NonCodingIntron,
        EffectKind::Unknown,
        EffectKind::Intergenic,
        EffectKind::NoMutation,
        EffectKind::UnknownChromosome,
    ];

    /// Canonical effect name, e.g. `"splice-site"` or `"5'UTR"`.
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::CnvGain => "CNV+",
            EffectKind::CnvLoss => "CNV-",
            EffectKind::TRnaAnticodon => "tRNA:ANTICODON",
            EffectKind::All => "all",
            EffectKind::SpliceSite => "splice-site",
            EffectKind::FrameShift => "frame-shift",
            EffectKind::Nonsense => "nonsense",
            EffectKind::NoFrameShiftNewStop => "no-frame-shift-newStop",
            EffectKind::NoStart => "noStart",
            EffectKind::NoEnd => "noEnd",
            EffectKind::Missense => "missense",
            EffectKind::NoFrameShift => "no-frame-shift",
            EffectKind::Cds => "CDS",
            EffectKind::Synonymous => "synonymous",
            EffectKind::CodingUnknown => "coding_unknown",
            EffectKind::Regulatory => "regulatory",
            EffectKind::Utr3 => "3'UTR",
            EffectKind::Utr5 => "5'UTR",
            EffectKind::Intron => "intron",
            EffectKind::NonCoding => "non-coding",
            EffectKind::Utr5Intron => "5'UTR-intron",
            EffectKind::Utr3Intron => "3'UTR-intron",
            EffectKind::Promoter => "promoter",
            EffectKind::NonCodingIntron => "non-coding-intron",
            EffectKind::Unknown => "unknown",
            EffectKind::Intergenic => "intergenic",
            EffectKind::NoMutation => "no-mutation",
            EffectKind::UnknownChromosome => "unk_chr",
        }
    }

    /// Parse a canonical effect name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Severity rank; higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            EffectKind::CnvGain | EffectKind::CnvLoss => 35,
            EffectKind::TRnaAnticodon => 30,
            EffectKind::All => 24,
            EffectKind::SpliceSite => 23,
            EffectKind::FrameShift => 22,
            EffectKind::Nonsense => 21,
            EffectKind::NoFrameShiftNewStop => 20,
            EffectKind::NoStart => 19,
            EffectKind::NoEnd => 18,
            EffectKind::Missense => 17,
            EffectKind::NoFrameShift => 16,
            EffectKind::Cds => 15,
            EffectKind::Synonymous => 14,
            EffectKind::CodingUnknown => 13,
            EffectKind::Regulatory => 12,
            EffectKind::Utr3 => 11,
            EffectKind::Utr5 => 10,
            EffectKind::Intron => 9,
            EffectKind::NonCoding => 8,
            EffectKind::Utr5Intron => 7,
            EffectKind::Utr3Intron => 6,
            EffectKind::Promoter => 5,
            EffectKind::NonCodingIntron => 4,
            EffectKind::Unknown => 3,
            EffectKind::Intergenic => 2,
            EffectKind::NoMutation => 1,
            EffectKind::UnknownChromosome => 0,
        }
    }

    /// Closest Sequence Ontology term.
    pub fn so_term(&self) -> &'static str {
        match self {
            EffectKind::CnvGain => "copy_number_gain",
            EffectKind::CnvLoss => "copy_number_loss",
            EffectKind::TRnaAnticodon => "non_coding_transcript_exon_variant",
            EffectKind::All => "transcript_ablation",
            EffectKind::SpliceSite => "splice_site_variant",
            EffectKind::FrameShift => "frameshift_variant",
            EffectKind::Nonsense | EffectKind::NoFrameShiftNewStop => "stop_gained",
            EffectKind::NoStart => "start_lost",
            EffectKind::NoEnd => "stop_lost",
            EffectKind::Missense => "missense_variant",
            EffectKind::NoFrameShift => "inframe_indel",
            EffectKind::Cds | EffectKind::CodingUnknown => "coding_sequence_variant",
            EffectKind::Synonymous => "synonymous_variant",
            EffectKind::Regulatory => "regulatory_region_variant",
            EffectKind::Utr3 => "3_prime_UTR_variant",
            EffectKind::Utr5 => "5_prime_UTR_variant",
            EffectKind::Intron
            | EffectKind::Utr5Intron
            | EffectKind::Utr3Intron
            | EffectKind::NonCodingIntron => "intron_variant",
            EffectKind::NonCoding => "non_coding_transcript_exon_variant",
            EffectKind::Promoter => "upstream_gene_variant",
            EffectKind::Intergenic => "intergenic_variant",
            EffectKind::NoMutation => "no_sequence_alteration",
            EffectKind::Unknown | EffectKind::UnknownChromosome => "sequence_variant",
        }
    }

    /// Impact bucket.
    pub fn impact(&self) -> Impact {
        match self {
            EffectKind::CnvGain
            | EffectKind::CnvLoss
            | EffectKind::All
            | EffectKind::SpliceSite
            | EffectKind::FrameShift
            | EffectKind::Nonsense
            | EffectKind::NoFrameShiftNewStop
            | EffectKind::NoStart
            | EffectKind::NoEnd => Impact::High,

            EffectKind::TRnaAnticodon
            | EffectKind::Missense
            | EffectKind::NoFrameShift
            | EffectKind::Cds => Impact::Moderate,

            EffectKind::Synonymous | EffectKind::CodingUnknown => Impact::Low,

            _ => Impact::Modifier,
        }
    }

    /// Check membership in a named effect group.
    pub fn in_group(&self, group: EffectGroup) -> bool {
        group.members().contains(self)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EffectKind {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| FerroError::UnknownEffect {
            name: s.to_string(),
        })
    }
}

impl Serialize for EffectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EffectKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        EffectKind::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown effect '{}'", name)))
    }
}

/// Variant impact level (VEP-style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Impact {
    /// Modifier - minimal predicted impact.
    Modifier,
    /// Low impact.
    Low,
    /// Moderate impact.
    Moderate,
    /// High impact (likely deleterious).
    High,
}

impl Impact {
    /// Get the impact as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Moderate => "MODERATE",
            Impact::Low => "LOW",
            Impact::Modifier => "MODIFIER",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const LGDS: &[EffectKind] = &[
    EffectKind::Nonsense,
    EffectKind::FrameShift,
    EffectKind::SpliceSite,
    EffectKind::NoFrameShiftNewStop,
];

const NONSYNONYMOUS: &[EffectKind] = &[
    EffectKind::Nonsense,
    EffectKind::FrameShift,
    EffectKind::SpliceSite,
    EffectKind::NoFrameShiftNewStop,
    EffectKind::Missense,
    EffectKind::NoFrameShift,
    EffectKind::NoStart,
    EffectKind::NoEnd,
    EffectKind::Cds,
];

const CODING: &[EffectKind] = &[
    EffectKind::Nonsense,
    EffectKind::FrameShift,
    EffectKind::SpliceSite,
    EffectKind::NoFrameShiftNewStop,
    EffectKind::Missense,
    EffectKind::NoFrameShift,
    EffectKind::NoStart,
    EffectKind::NoEnd,
    EffectKind::Cds,
    EffectKind::Synonymous,
];

const INTRONS: &[EffectKind] = &[
    EffectKind::Intron,
    EffectKind::NonCodingIntron,
    EffectKind::Utr5Intron,
    EffectKind::Utr3Intron,
];

const UTRS: &[EffectKind] = &[
    EffectKind::Utr3,
    EffectKind::Utr5,
    EffectKind::Utr5Intron,
    EffectKind::Utr3Intron,
];

const CNVS: &[EffectKind] = &[EffectKind::CnvGain, EffectKind::CnvLoss];

/// Named sets of effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectGroup {
    /// Likely gene-disrupting effects (also known as LoF).
    Lgds,
    Nonsynonymous,
    Coding,
    Introns,
    Utrs,
    Cnvs,
}

impl EffectGroup {
    /// Effect kinds in this group.
    pub fn members(&self) -> &'static [EffectKind] {
        match self {
            EffectGroup::Lgds => LGDS,
            EffectGroup::Nonsynonymous => NONSYNONYMOUS,
            EffectGroup::Coding => CODING,
            EffectGroup::Introns => INTRONS,
            EffectGroup::Utrs => UTRS,
            EffectGroup::Cnvs => CNVS,
        }
    }

    /// Look a group up by name, case-insensitively (`"LGDs"`, `"LoF"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lgds" | "lof" => Some(EffectGroup::Lgds),
            "nonsynonymous" => Some(EffectGroup::Nonsynonymous),
            "coding" => Some(EffectGroup::Coding),
            "introns" => Some(EffectGroup::Introns),
            "utrs" => Some(EffectGroup::Utrs),
            "cnvs" => Some(EffectGroup::Cnvs),
            _ => None,
        }
    }
}

/// Effect of a variant on one transcript
///
/// Which optional fields are set depends on the effect family: coding
/// effects carry protein positions, intronic effects carry intron indices
/// and distances, UTR effects carry the distance to the coding region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub effect: EffectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<Strand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prot_pos: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prot_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aa_change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_aa: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_aa: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub which_intron: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_many_introns: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_from_coding: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_from_acceptor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_from_donor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intron_length: Option<i64>,
    /// Region length for CNVs, transcript length for non-coding effects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrna_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrna_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_from_5utr: Option<i64>,
}

impl Effect {
    /// An effect not tied to any transcript
    pub fn new(effect: EffectKind) -> Self {
        Self {
            effect,
            gene: None,
            transcript_id: None,
            strand: None,
            prot_pos: None,
            prot_length: None,
            aa_change: None,
            ref_aa: None,
            alt_aa: None,
            which_intron: None,
            how_many_introns: None,
            dist_from_coding: None,
            dist_from_acceptor: None,
            dist_from_donor: None,
            intron_length: None,
            length: None,
            mrna_length: None,
            mrna_position: None,
            dist_from_5utr: None,
        }
    }

    /// An effect naming the gene, transcript and strand of `tm`
    ///
    /// The transcript's display name is preferred over its id when set.
    pub fn for_transcript(effect: EffectKind, tm: &TranscriptModel) -> Self {
        Self {
            gene: Some(tm.gene.clone()),
            transcript_id: Some(tm.tr_name.clone().unwrap_or_else(|| tm.transcript_id.clone())),
            strand: Some(tm.strand),
            ..Self::new(effect)
        }
    }

    /// Severity of this effect's kind
    pub fn severity(&self) -> u8 {
        self.effect.severity()
    }

    /// Render the per-transcript detail string
    ///
    /// Pieces are concatenated in a fixed order: protein length for
    /// start/stop loss and whole-transcript hits, `which/how_many` and
    /// `[dist]` for introns, `pos/len` and `(aa_change)` for coding
    /// changes, the UTR distance, the transcript length and the promoter
    /// distance. Absent values print as `None`.
    pub fn details(&self) -> String {
        use EffectKind::*;
        let kind = self.effect;
        let mut out = String::new();

        if matches!(kind, NoStart | NoEnd | Cds | All) {
            out.push_str(&opt(self.prot_length));
        }
        if kind.in_group(EffectGroup::Introns) {
            out.push_str(&format!(
                "{}/{}",
                opt(self.which_intron),
                opt(self.how_many_introns)
            ));
            out.push_str(&format!("[{}]", opt(self.dist_from_coding)));
        }
        if matches!(
            kind,
            NoFrameShift
                | NoFrameShiftNewStop
                | FrameShift
                | SpliceSite
                | Synonymous
                | Missense
                | Nonsense
                | CodingUnknown
        ) {
            out.push_str(&format!("{}/{}", opt(self.prot_pos), opt(self.prot_length)));
        }
        if matches!(
            kind,
            NoFrameShift | NoFrameShiftNewStop | Missense | Nonsense | CodingUnknown
        ) {
            out.push_str(&format!("({})", self.aa_change.as_deref().unwrap_or("None")));
        }
        match kind {
            NoMutation => out.push_str("no-mutation"),
            Utr5 | Utr3 => out.push_str(&opt(self.dist_from_coding)),
            NonCoding | Unknown | TRnaAnticodon => out.push_str(&opt(self.length)),
            Promoter => out.push_str(&opt(self.dist_from_5utr)),
            _ => {}
        }
        out
    }
}

fn opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.transcript_id.as_deref().unwrap_or("None"),
            self.gene.as_deref().unwrap_or("None"),
            self.effect,
            self.details()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EffectKind::from_name("5'UTR"), Some(EffectKind::Utr5));
        assert_eq!(EffectKind::from_name("bogus"), None);
        assert!("bogus".parse::<EffectKind>().is_err());
    }

    #[test]
    fn test_severity_order_of_all() {
        let severities: Vec<u8> = EffectKind::ALL.iter().map(|k| k.severity()).collect();
        assert!(severities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(EffectKind::SpliceSite.severity(), 23);
        assert_eq!(EffectKind::UnknownChromosome.severity(), 0);
    }

    #[test]
    fn test_groups() {
        assert!(EffectKind::FrameShift.in_group(EffectGroup::Lgds));
        assert!(!EffectKind::Missense.in_group(EffectGroup::Lgds));
        assert!(EffectKind::Missense.in_group(EffectGroup::Nonsynonymous));
        assert!(EffectKind::Synonymous.in_group(EffectGroup::Coding));
        assert!(!EffectKind::Synonymous.in_group(EffectGroup::Nonsynonymous));
        assert!(EffectKind::Utr5Intron.in_group(EffectGroup::Introns));
        assert!(EffectKind::Utr5Intron.in_group(EffectGroup::Utrs));
        assert_eq!(EffectGroup::from_name("LoF"), Some(EffectGroup::Lgds));
        assert_eq!(EffectGroup::from_name("CNVs"), Some(EffectGroup::Cnvs));
        assert_eq!(EffectGroup::from_name("x"), None);
    }

    #[test]
    fn test_so_terms_and_impact() {
        assert_eq!(EffectKind::Nonsense.so_term(), "stop_gained");
        assert_eq!(EffectKind::Utr5.so_term(), "5_prime_UTR_variant");
        assert_eq!(EffectKind::FrameShift.impact(), Impact::High);
        assert_eq!(EffectKind::Missense.impact(), Impact::Moderate);
        assert_eq!(EffectKind::Synonymous.impact(), Impact::Low);
        assert_eq!(EffectKind::Intron.impact(), Impact::Modifier);
        assert!(Impact::High > Impact::Modifier);
    }

    #[test]
    fn test_details() {
        let mut e = Effect::new(EffectKind::Missense);
        e.prot_pos = Some(5);
        e.prot_length = Some(15);
        e.aa_change = Some("Thr->Ala".to_string());
        assert_eq!(e.details(), "5/15(Thr->Ala)");

        let mut e = Effect::new(EffectKind::Intron);
        e.which_intron = Some(1);
        e.how_many_introns = Some(2);
        e.dist_from_coding = Some(4);
        assert_eq!(e.details(), "1/2[4]");

        let mut e = Effect::new(EffectKind::FrameShift);
        e.prot_pos = Some(2);
        e.prot_length = Some(15);
        assert_eq!(e.details(), "2/15");

        let mut e = Effect::new(EffectKind::NoStart);
        e.prot_length = Some(15);
        assert_eq!(e.details(), "15");

        assert_eq!(Effect::new(EffectKind::NoMutation).details(), "no-mutation");
        assert_eq!(Effect::new(EffectKind::Intergenic).details(), "");
        assert_eq!(Effect::new(EffectKind::Promoter).details(), "None");
    }

    #[test]
    fn test_serde_by_name() {
        let mut e = Effect::new(EffectKind::Utr5);
        e.dist_from_coding = Some(3);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"effect":"5'UTR","dist_from_coding":3}"#);
        let back: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
