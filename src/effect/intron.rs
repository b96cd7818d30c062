//! Effects outside the coding sequence
//!
//! Promoter, UTR, intron and splice-site effects, plus the whole-transcript
//! and non-coding cases. Each function returns `None` when the variant is
//! not in the region it handles.

use crate::effect::request::AnnotationRequest;
use crate::effect::{Effect, EffectKind};
use crate::reference::{SequenceAccessor, Strand};

/// Check if the variant lies entirely outside the exonic span
pub fn is_outside<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> bool {
    let first = request.transcript.exonic_start() as i64;
    let last_exon = request.transcript.exonic_stop() as i64;
    if request.is_insertion() {
        request.pos() <= first || request.pos() > last_exon
    } else {
        request.last() < first || request.pos() > last_exon
    }
}

/// Promoter effect for a variant upstream of the transcript
///
/// The distance counts from the first exonic base, so the adjacent
/// upstream base is at distance 1.
pub fn promoter<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> Option<Effect> {
    if request.promoter_len == 0 || !is_outside(request) {
        return None;
    }
    // Last reference base upstream of the change.
    let upstream_last = if request.is_insertion() {
        request.pos() - 1
    } else {
        request.last()
    };
    let first = request.transcript.exonic_start() as i64;
    let last_exon = request.transcript.exonic_stop() as i64;
    let dist = match request.strand() {
        Strand::Plus if upstream_last < first => first - upstream_last,
        Strand::Minus if request.pos() > last_exon => request.pos() - last_exon,
        _ => return None,
    };
    if dist > request.promoter_len as i64 {
        return None;
    }
    Some(Effect {
        dist_from_5utr: Some(dist),
        ..Effect::for_transcript(EffectKind::Promoter, request.transcript)
    })
}

/// `all` for a coding transcript, `non-coding` otherwise, when the variant
/// covers every exon
pub fn whole_transcript<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Option<Effect> {
    let tm = request.transcript;
    if request.is_insertion()
        || request.pos() > tm.exonic_start() as i64
        || request.last() < tm.exonic_stop() as i64
    {
        return None;
    }
    if tm.is_coding() {
        Some(request.effect_with_prot_length(EffectKind::All))
    } else {
        Some(Effect {
            length: Some(tm.total_len()),
            ..request.effect(EffectKind::NonCoding)
        })
    }
}

/// Intron (over all exons) holding the variant: 0-based index and the
/// exonic bases bounding it
pub fn enclosing_intron<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Option<(usize, i64, i64)> {
    request
        .transcript
        .exons
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i, pair[0].stop as i64, pair[1].start as i64))
        .find(|&(_, start, end)| request.pos() > start && request.last() < end)
}

fn exon_intron_effect<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
    kind: EffectKind,
) -> Effect {
    match enclosing_intron(request) {
        Some((i, start, end)) => request.intronic_effect(
            kind,
            start,
            end,
            i as u64 + 1,
            request.transcript.intron_count() as u64,
        ),
        None => request.effect_with_prot_length(EffectKind::Unknown),
    }
}

/// Only genes named `tRNA...` are checked for an anticodon hit
fn anticodon_hit<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> bool {
    let tm = request.transcript;
    if !tm.gene.starts_with("tRNA") {
        return false;
    }
    match (tm.attribute_u64("anticodonB"), tm.attribute_u64("anticodonE")) {
        (Some(begin), Some(end)) => request.pos() <= end as i64 && request.last() >= begin as i64,
        _ => false,
    }
}

/// Effect on a non-coding transcript
pub fn non_coding<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> Effect {
    if !request.overlaps_exon() {
        return exon_intron_effect(request, EffectKind::NonCodingIntron);
    }
    let kind = if anticodon_hit(request) {
        EffectKind::TRnaAnticodon
    } else {
        EffectKind::NonCoding
    };
    Effect {
        length: Some(request.transcript.total_len()),
        ..request.effect(kind)
    }
}

// Exonic bases in [start, end].
fn exonic_bases<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
    start: i64,
    end: i64,
) -> i64 {
    request
        .transcript
        .exons
        .iter()
        .map(|e| ((e.stop as i64).min(end) - (e.start as i64).max(start) + 1).max(0))
        .sum()
}

/// UTR or UTR-intron effect for a variant entirely before or after the CDS
pub fn utr<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> Option<Effect> {
    let (cds_start, cds_end) = (request.cds_start(), request.cds_end());
    let (pos, last) = (request.pos(), request.last());
    let before = if request.is_insertion() {
        pos <= cds_start
    } else {
        last < cds_start
    };
    let after = pos > cds_end;
    if !before && !after {
        return None;
    }

    let five_prime = match request.strand() {
        Strand::Plus => before,
        Strand::Minus => after,
    };

    if !request.overlaps_exon() {
        let kind = if five_prime {
            EffectKind::Utr5Intron
        } else {
            EffectKind::Utr3Intron
        };
        return Some(exon_intron_effect(request, kind));
    }

    let exons = &request.transcript.exons;
    let dist = if before {
        if request.is_insertion() && pos == cds_start {
            1
        } else {
            // Exonic base of the variant closest to the CDS.
            let closest = exons
                .iter()
                .filter(|e| e.overlaps(pos as u64, last as u64))
                .map(|e| (e.stop as i64).min(last))
                .max()
                .unwrap_or(last);
            exonic_bases(request, closest, cds_start) - 1
        }
    } else {
        let closest = exons
            .iter()
            .filter(|e| e.overlaps(pos as u64, last as u64))
            .map(|e| (e.start as i64).max(pos))
            .min()
            .unwrap_or(pos);
        exonic_bases(request, cds_end, closest) - 1
    };

    let kind = if five_prime {
        EffectKind::Utr5
    } else {
        EffectKind::Utr3
    };
    Some(Effect {
        dist_from_coding: Some(dist),
        ..request.effect_with_prot_length(kind)
    })
}

/// Coding introns as (0-based index, last base before, first base after)
fn coding_introns<'a, S: SequenceAccessor + ?Sized>(
    request: &'a AnnotationRequest<'a, S>,
) -> impl Iterator<Item = (usize, i64, i64)> + 'a {
    request
        .cds_regions()
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i, pair[0].stop as i64, pair[1].start as i64))
}

fn coding_intron_count<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> u64 {
    request.cds_regions().len().saturating_sub(1) as u64
}

/// Splice-site effect when the variant hits the first or last two bases of
/// a coding intron
///
/// An insertion hits the site when it lands between any two of the four
/// bases `S, S+1, S+2` and `E-2, E-1, E` around the intron.
pub fn splice_site<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> Option<Effect> {
    let (pos, last) = (request.pos(), request.last());
    let how_many = coding_intron_count(request);
    coding_introns(request)
        .find(|&(_, s, e)| {
            if request.is_insertion() {
                [s + 1, s + 2, e - 1, e].contains(&pos)
            } else {
                [s + 1, s + 2, e - 2, e - 1]
                    .iter()
                    .any(|&site| pos <= site && site <= last)
            }
        })
        .map(|(i, s, e)| {
            request.coding_intronic_effect(EffectKind::SpliceSite, s, e, i as u64 + 1, how_many)
        })
}

/// Intron effect for a variant inside a coding intron
pub fn intron<S: SequenceAccessor + ?Sized>(request: &AnnotationRequest<S>) -> Option<Effect> {
    let (pos, last) = (request.pos(), request.last());
    let how_many = coding_intron_count(request);
    coding_introns(request)
        .find(|&(_, s, e)| pos > s && last < e)
        .map(|(i, s, e)| {
            request.coding_intronic_effect(EffectKind::Intron, s, e, i as u64 + 1, how_many)
        })
}
