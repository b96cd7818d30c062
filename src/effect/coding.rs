//! Effects inside the coding sequence
//!
//! Checked in order: start codon loss, stop codon loss, frame shift and
//! finally the residue comparison. The first three return `None` to pass
//! the variant on to the next check.

use crate::codon::UNKNOWN_RESIDUE;
use crate::effect::request::AnnotationRequest;
use crate::effect::{Effect, EffectKind};
use crate::error::FerroError;
use crate::reference::{SequenceAccessor, Strand};

const STOP: &str = "End";

fn count_stops(residues: &[String]) -> usize {
    residues.iter().filter(|r| *r == STOP).count()
}

fn has_unknown(residues: &[String]) -> bool {
    residues.iter().any(|r| r == UNKNOWN_RESIDUE)
}

/// `noStart` when the start codon is destroyed
///
/// Insertions count only when they land inside the start codon. Deletions
/// and substitutions reaching past the CDS always destroy it; otherwise the
/// first alternate codon must still be a start codon.
pub fn start_loss<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Result<Option<Effect>, FerroError> {
    let (pos, last) = (request.pos(), request.last());
    let (cds_start, cds_end) = (request.cds_start(), request.cds_end());

    let hit = if request.is_insertion() {
        match request.strand() {
            Strand::Plus => cds_start + 1 <= pos && pos <= cds_start + 2,
            Strand::Minus => cds_end - 1 <= pos && pos <= cds_end,
        }
    } else {
        request.is_start_codon_affected()
    };
    if !hit {
        return Ok(None);
    }

    let crosses_cds = !request.is_insertion()
        && match request.strand() {
            Strand::Plus => pos < cds_start,
            Strand::Minus => last > cds_end,
        };
    if crosses_cds {
        return Ok(Some(request.effect_with_prot_pos(EffectKind::NoStart)));
    }

    let (_, alt_codons) = request.codons()?;
    let first_codon = match request.strand() {
        Strand::Plus => alt_codons.get(..3),
        Strand::Minus => alt_codons
            .len()
            .checked_sub(3)
            .and_then(|from| alt_codons.get(from..)),
    };
    let kept = match first_codon {
        Some(codon) => request.in_start_codons(codon)?,
        None => false,
    };
    log::debug!(
        "{}: start codon hit, alt codons {} kept={}",
        request.transcript.transcript_id,
        alt_codons,
        kept
    );

    if kept {
        Ok(None)
    } else {
        Ok(Some(request.effect_with_prot_pos(EffectKind::NoStart)))
    }
}

/// `noEnd` when the stop codon is destroyed
pub fn stop_loss<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Result<Option<Effect>, FerroError> {
    let (pos, last) = (request.pos(), request.last());
    let (cds_start, cds_end) = (request.cds_start(), request.cds_end());

    let hit = if request.is_insertion() {
        match request.strand() {
            Strand::Plus => cds_end - 1 <= pos && pos <= cds_end,
            Strand::Minus => cds_start + 1 <= pos && pos <= cds_start + 2,
        }
    } else {
        request.is_stop_codon_affected()
    };
    if !hit {
        return Ok(None);
    }

    let crosses_cds = !request.is_insertion()
        && match request.strand() {
            Strand::Plus => last > cds_end,
            Strand::Minus => pos < cds_start,
        };
    if crosses_cds {
        return Ok(Some(request.effect_with_prot_pos(EffectKind::NoEnd)));
    }

    if request.has_stop_codon()? {
        let (_, alt_aa) = request.amino_acids()?;
        if count_stops(alt_aa) == 0 {
            return Ok(Some(request.effect_with_prot_pos(EffectKind::NoEnd)));
        }
    }
    Ok(None)
}

/// `frame-shift`, `no-frame-shift` or `no-frame-shift-newStop` for
/// length-changing variants
pub fn frame_shift<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Result<Option<Effect>, FerroError> {
    let diff = (request.alt_len() - request.ref_len()).abs();
    if diff % 3 != 0 {
        return Ok(Some(request.effect_with_prot_pos(EffectKind::FrameShift)));
    }
    if diff == 0 {
        return Ok(None);
    }

    let (ref_aa, alt_aa) = request.amino_acids()?;
    let kind = if count_stops(alt_aa) > count_stops(ref_aa) {
        EffectKind::NoFrameShiftNewStop
    } else {
        EffectKind::NoFrameShift
    };
    request.effect_with_aa_change(kind).map(Some)
}

/// Residue comparison for same-length changes
pub fn protein_change<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Result<Effect, FerroError> {
    let (ref_aa, alt_aa) = request.amino_acids()?;
    let unknown = has_unknown(ref_aa) || has_unknown(alt_aa);
    let kind = if ref_aa == alt_aa && !unknown {
        EffectKind::Synonymous
    } else if count_stops(alt_aa) > 0 {
        EffectKind::Nonsense
    } else if unknown {
        EffectKind::CodingUnknown
    } else {
        EffectKind::Missense
    };
    request.effect_with_aa_change(kind)
}
