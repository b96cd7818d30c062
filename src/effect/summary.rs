//! Reducing per-transcript effects to summary labels
//!
//! Effects are ranked by [`EffectKind::severity`]. Sorting is stable, so at
//! equal severity the effect seen first wins.
//!
//! # Example
//!
//! ```
//! use ferro_effect::effect::{effects_description, Effect, EffectKind};
//!
//! let mut missense = Effect::new(EffectKind::Missense);
//! missense.gene = Some("GENEP".to_string());
//! missense.transcript_id = Some("TXP1".to_string());
//! missense.prot_pos = Some(4);
//! missense.prot_length = Some(15);
//! missense.aa_change = Some("Gly->Glu".to_string());
//!
//! let (worst, genes, transcripts) = effects_description(&[missense]).unwrap();
//! assert_eq!(worst, "missense");
//! assert_eq!(genes, "GENEP:missense");
//! assert_eq!(transcripts, "TXP1:GENEP:missense:4/15(Gly->Glu)");
//! ```

use crate::effect::{Effect, EffectGroup, EffectKind};
use crate::error::FerroError;
use std::fmt;
use std::str::FromStr;

const NONE: &str = "None";

fn none_if_literal(value: &str) -> Option<String> {
    if value.is_empty() || value == NONE {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_kind(name: &str) -> Result<EffectKind, FerroError> {
    EffectKind::from_name(name).ok_or_else(|| FerroError::UnknownEffect {
        name: name.to_string(),
    })
}

/// Effects ordered from most to least severe, ties in input order
pub fn sort_effects(effects: &[Effect]) -> Vec<&Effect> {
    let mut sorted: Vec<&Effect> = effects.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.severity()));
    sorted
}

/// Most severe effect kind, `None` for an empty list
pub fn worst_effect(effects: &[Effect]) -> Option<EffectKind> {
    effects
        .iter()
        .fold(None, |worst: Option<&Effect>, e| match worst {
            Some(w) if w.severity() >= e.severity() => Some(w),
            _ => Some(e),
        })
        .map(|e| e.effect)
}

/// A gene symbol paired with the effect it received, `SYMBOL:effect`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectGene {
    pub symbol: Option<String>,
    pub effect: EffectKind,
}

impl EffectGene {
    pub fn new(symbol: Option<String>, effect: EffectKind) -> Self {
        Self { symbol, effect }
    }

    // Placeholder used for intergenic and no-mutation summaries.
    fn placeholder(kind: EffectKind) -> Self {
        Self::new(Some(kind.name().to_string()), kind)
    }
}

impl fmt::Display for EffectGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{}:{}", symbol, self.effect),
            None => write!(f, "{}", self.effect),
        }
    }
}

impl FromStr for EffectGene {
    type Err = FerroError;

    /// Parse `SYMBOL:effect` or a bare `effect`
    ///
    /// `tRNA:ANTICODON` contains a colon, so the whole string is tried as an
    /// effect name before splitting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(kind) = EffectKind::from_name(s) {
            return Ok(Self::new(None, kind));
        }
        let (symbol, effect) = s.split_once(':').ok_or_else(|| FerroError::UnknownEffect {
            name: s.to_string(),
        })?;
        Ok(Self::new(
            Some(symbol.trim().to_string()),
            parse_kind(effect.trim())?,
        ))
    }
}

/// One transcript's effect, `transcript:gene:effect:details`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectTranscript {
    pub transcript_id: Option<String>,
    pub gene: Option<String>,
    pub effect: EffectKind,
    pub details: String,
}

impl EffectTranscript {
    fn placeholder(kind: EffectKind) -> Self {
        Self {
            transcript_id: Some(kind.name().to_string()),
            gene: Some(kind.name().to_string()),
            effect: kind,
            details: kind.name().to_string(),
        }
    }
}

impl From<&Effect> for EffectTranscript {
    fn from(effect: &Effect) -> Self {
        Self {
            transcript_id: effect.transcript_id.clone(),
            gene: effect.gene.clone(),
            effect: effect.effect,
            details: effect.details(),
        }
    }
}

impl fmt::Display for EffectTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.transcript_id.as_deref().unwrap_or(NONE),
            self.gene.as_deref().unwrap_or(NONE),
            self.effect,
            self.details
        )
    }
}

impl FromStr for EffectTranscript {
    type Err = FerroError;

    /// Parse `transcript:gene:effect:details`
    ///
    /// Details never contain a colon, so the effect is everything between
    /// the second colon and the last one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || FerroError::UnknownEffect {
            name: s.to_string(),
        };
        let mut head = s.splitn(3, ':');
        let transcript_id = head.next().ok_or_else(malformed)?;
        let gene = head.next().ok_or_else(malformed)?;
        let rest = head.next().ok_or_else(malformed)?;
        let (effect, details) = rest.rsplit_once(':').ok_or_else(malformed)?;
        Ok(Self {
            transcript_id: none_if_literal(transcript_id.trim()),
            gene: none_if_literal(gene.trim()),
            effect: parse_kind(effect.trim())?,
            details: details.trim().to_string(),
        })
    }
}

/// Worst effect per gene, grouped by severity tier then by gene
///
/// Within a tier each run of effects on the same gene contributes its first
/// effect. Lists whose worst effect is intergenic or no-mutation collapse to
/// a single placeholder entry.
pub fn gene_effects(effects: &[Effect]) -> Vec<EffectGene> {
    let sorted = sort_effects(effects);
    let Some(worst) = sorted.first() else {
        return Vec::new();
    };
    if matches!(worst.effect, EffectKind::Intergenic | EffectKind::NoMutation) {
        return vec![EffectGene::placeholder(worst.effect)];
    }

    let mut result = Vec::new();
    let mut previous: Option<(u8, Option<&str>)> = None;
    for effect in sorted {
        let key = (effect.severity(), effect.gene.as_deref());
        if previous != Some(key) {
            result.push(EffectGene::new(effect.gene.clone(), effect.effect));
            previous = Some(key);
        }
    }
    result
}

/// Every transcript's effect in input order
pub fn transcript_effects(effects: &[Effect]) -> Vec<EffectTranscript> {
    match worst_effect(effects) {
        None => Vec::new(),
        Some(kind @ (EffectKind::Intergenic | EffectKind::NoMutation)) => {
            vec![EffectTranscript::placeholder(kind)]
        }
        Some(_) => effects.iter().map(EffectTranscript::from).collect(),
    }
}

/// Gene effects restricted to likely gene-disrupting kinds
pub fn lgd_gene_effects(effects: &[Effect]) -> Vec<EffectGene> {
    gene_effects(effects)
        .into_iter()
        .filter(|g| g.effect.in_group(EffectGroup::Lgds))
        .collect()
}

/// The summary of one allele: worst effect, per-gene and per-transcript
/// effects
///
/// Serialized as `worst!gene|gene!transcript|transcript`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleEffects {
    pub worst: EffectKind,
    pub genes: Vec<EffectGene>,
    pub transcripts: Vec<EffectTranscript>,
}

impl AlleleEffects {
    /// Summarize a list of effects, `None` when it is empty
    pub fn from_effects(effects: &[Effect]) -> Option<Self> {
        simplify_effects(effects)
    }

    /// Effect kinds of the gene entries
    pub fn types(&self) -> Vec<EffectKind> {
        self.genes.iter().map(|g| g.effect).collect()
    }

    /// Look up a transcript entry by id
    pub fn transcript(&self, transcript_id: &str) -> Option<&EffectTranscript> {
        self.transcripts
            .iter()
            .find(|t| t.transcript_id.as_deref() == Some(transcript_id))
    }
}

impl fmt::Display for AlleleEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genes: Vec<String> = self.genes.iter().map(|g| g.to_string()).collect();
        let transcripts: Vec<String> = self.transcripts.iter().map(|t| t.to_string()).collect();
        write!(f, "{}!{}!{}", self.worst, genes.join("|"), transcripts.join("|"))
    }
}

impl FromStr for AlleleEffects {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('!').collect();
        let [worst, genes, transcripts] = parts[..] else {
            return Err(FerroError::UnknownEffect {
                name: s.to_string(),
            });
        };
        let genes = genes
            .split('|')
            .filter(|g| !g.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<EffectGene>, _>>()?;
        let transcripts = transcripts
            .split('|')
            .filter(|t| !t.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<EffectTranscript>, _>>()?;
        if genes.is_empty() && transcripts.is_empty() {
            return Err(FerroError::UnknownEffect {
                name: s.to_string(),
            });
        }
        Ok(Self {
            worst: parse_kind(worst.trim())?,
            genes,
            transcripts,
        })
    }
}

/// Worst effect plus gene and transcript summaries
///
/// A list led by `unk_chr` summarizes to `unk_chr` everywhere.
pub fn simplify_effects(effects: &[Effect]) -> Option<AlleleEffects> {
    let first = effects.first()?;
    if first.effect == EffectKind::UnknownChromosome {
        let kind = EffectKind::UnknownChromosome;
        return Some(AlleleEffects {
            worst: kind,
            genes: vec![EffectGene::new(None, kind)],
            transcripts: vec![EffectTranscript::placeholder(kind)],
        });
    }
    Some(AlleleEffects {
        worst: worst_effect(effects)?,
        genes: gene_effects(effects),
        transcripts: transcript_effects(effects),
    })
}

/// `(worst, "gene:effect|…", "transcript:gene:effect:details|…")`
///
/// Missing genes print as `None`.
pub fn effects_description(effects: &[Effect]) -> Option<(String, String, String)> {
    let summary = simplify_effects(effects)?;
    let genes: Vec<String> = summary
        .genes
        .iter()
        .map(|g| format!("{}:{}", g.symbol.as_deref().unwrap_or(NONE), g.effect))
        .collect();
    let transcripts: Vec<String> = summary.transcripts.iter().map(|t| t.to_string()).collect();
    Some((
        summary.worst.to_string(),
        genes.join("|"),
        transcripts.join("|"),
    ))
}
