//! Normalized variant representation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change a variant makes to the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Replacement of reference bases (including multi-base replacements)
    Substitution,
    /// Bases inserted between two reference positions
    Insertion,
    /// Reference bases removed
    Deletion,
    /// Copy-number gain over an interval (`CNV+`)
    CopyNumberGain,
    /// Copy-number loss over an interval (`CNV-`)
    CopyNumberLoss,
}

impl VariantKind {
    /// Check if this is a copy-number change
    pub fn is_cnv(&self) -> bool {
        matches!(self, VariantKind::CopyNumberGain | VariantKind::CopyNumberLoss)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantKind::Substitution => "sub",
            VariantKind::Insertion => "ins",
            VariantKind::Deletion => "del",
            VariantKind::CopyNumberGain => "CNV+",
            VariantKind::CopyNumberLoss => "CNV-",
        };
        write!(f, "{}", name)
    }
}

/// A single genomic variant, ready for annotation
///
/// Positions are 1-based. An insertion at `pos` places its bases between
/// `pos - 1` and `pos`. For substitutions and deletions `pos..=pos_last`
/// are the reference bases affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub chrom: String,
    pub pos: u64,
    pub pos_last: u64,
    pub kind: VariantKind,
    /// Reference bases, when known
    pub reference: Option<String>,
    /// Alternate bases; `None` when the sequence is unknown
    pub alternate: Option<String>,
    /// Bases removed (deletions, CNVs), inserted (insertions), or the
    /// legacy substitution length `max(1, |alt| - |ref| + 1)`
    pub length: u64,
}

impl VariantSpec {
    /// Build a variant from a reference and an alternate allele
    ///
    /// The shared leading bases of the two alleles are dropped and `pos`
    /// shifted past them, so VCF-style anchored indels become plain
    /// insertions and deletions. Identical alleles are kept untouched and
    /// describe a no-op substitution.
    pub fn from_alleles(
        chrom: impl Into<String>,
        pos: u64,
        reference: &str,
        alternate: &str,
    ) -> Self {
        let reference = reference.to_ascii_uppercase();
        let alternate = alternate.to_ascii_uppercase();
        let chrom = chrom.into();

        if reference == alternate {
            let length = reference.len().max(1) as u64;
            return Self {
                chrom,
                pos,
                pos_last: pos + length - 1,
                kind: VariantKind::Substitution,
                reference: Some(reference),
                alternate: Some(alternate),
                length: 1,
            };
        }

        // Byte offset past the shared leading chars, valid in both alleles.
        let (shared_chars, shared) = reference
            .char_indices()
            .zip(alternate.chars())
            .take_while(|((_, r), a)| r == a)
            .fold((0, 0), |(n, _), ((i, c), _)| (n + 1, i + c.len_utf8()));
        let pos = pos + shared_chars as u64;
        let reference = &reference[shared..];
        let alternate = &alternate[shared..];

        if reference.is_empty() {
            Self::insertion(chrom, pos, alternate)
        } else if alternate.is_empty() {
            Self {
                reference: Some(reference.to_string()),
                ..Self::deletion(chrom, pos, reference.len() as u64)
            }
        } else {
            Self::substitution(chrom, pos, reference, Some(alternate.to_string()))
        }
    }

    /// A substitution of `reference` by `alternate`, without trimming
    pub fn substitution(
        chrom: impl Into<String>,
        pos: u64,
        reference: &str,
        alternate: Option<String>,
    ) -> Self {
        let ref_len = reference.len() as i64;
        let alt_len = alternate.as_ref().map_or(ref_len, |a| a.len() as i64);
        Self {
            chrom: chrom.into(),
            pos,
            pos_last: pos + (ref_len.max(1) as u64) - 1,
            kind: VariantKind::Substitution,
            reference: Some(reference.to_ascii_uppercase()),
            alternate: alternate.map(|a| a.to_ascii_uppercase()),
            length: (alt_len - ref_len + 1).max(1) as u64,
        }
    }

    /// An insertion of `sequence` placed between `pos - 1` and `pos`
    pub fn insertion(chrom: impl Into<String>, pos: u64, sequence: &str) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            pos_last: pos,
            kind: VariantKind::Insertion,
            reference: Some(String::new()),
            alternate: Some(sequence.to_ascii_uppercase()),
            length: sequence.len() as u64,
        }
    }

    /// A deletion of `length` bases starting at `pos`
    pub fn deletion(chrom: impl Into<String>, pos: u64, length: u64) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            pos_last: pos + length.max(1) - 1,
            kind: VariantKind::Deletion,
            reference: None,
            alternate: Some(String::new()),
            length,
        }
    }

    /// A copy-number change over `start..=end`
    pub fn cnv(chrom: impl Into<String>, start: u64, end: u64, gain: bool) -> Self {
        let end = end.max(start);
        Self {
            chrom: chrom.into(),
            pos: start,
            pos_last: end,
            kind: if gain {
                VariantKind::CopyNumberGain
            } else {
                VariantKind::CopyNumberLoss
            },
            reference: None,
            alternate: None,
            length: end - start + 1,
        }
    }

    /// Number of reference bases the variant replaces
    pub fn ref_len(&self) -> u64 {
        match self.kind {
            VariantKind::Insertion => 0,
            VariantKind::Substitution => self
                .reference
                .as_ref()
                .map_or(self.length, |r| r.len() as u64),
            VariantKind::Deletion | VariantKind::CopyNumberGain | VariantKind::CopyNumberLoss => {
                self.length
            }
        }
    }

    /// First position after the replaced reference bases (`pos + |ref|`)
    pub fn ref_position_last(&self) -> u64 {
        self.pos + self.ref_len()
    }

    /// Last replaced reference base, or `pos` for insertions
    pub fn corrected_last(&self) -> u64 {
        (self.pos + self.ref_len()).saturating_sub(1).max(self.pos)
    }

    /// Check if the alternate sequence is unknown (legacy `^`/`$` alleles, CNVs)
    pub fn is_sequence_unknown(&self) -> bool {
        self.alternate.is_none()
    }

    /// Check if the variant leaves the reference unchanged
    pub fn is_no_mutation(&self) -> bool {
        self.kind == VariantKind::Substitution
            && self.alternate.is_some()
            && self.reference == self.alternate
    }

    /// Alternate bases, empty when unknown
    pub fn alt_seq(&self) -> &str {
        self.alternate.as_deref().unwrap_or("")
    }
}

impl fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VariantKind::Substitution => write!(
                f,
                "{}:{} sub({}->{})",
                self.chrom,
                self.pos,
                self.reference.as_deref().unwrap_or(""),
                self.alternate.as_deref().unwrap_or("?")
            ),
            VariantKind::Insertion => write!(
                f,
                "{}:{} ins({})",
                self.chrom,
                self.pos,
                self.alternate.as_deref().unwrap_or("?")
            ),
            VariantKind::Deletion => write!(f, "{}:{} del({})", self.chrom, self.pos, self.length),
            VariantKind::CopyNumberGain | VariantKind::CopyNumberLoss => {
                write!(f, "{}:{}-{} {}", self.chrom, self.pos, self.pos_last, self.kind)
            }
        }
    }
}
