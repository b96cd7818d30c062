//! Per-transcript effect dispatch

use crate::effect::request::AnnotationRequest;
use crate::effect::{coding, intron, Effect, EffectKind};
use crate::error::FerroError;
use crate::reference::SequenceAccessor;
use crate::variant::VariantKind;

/// Classify a variant against one transcript
///
/// Returns `None` when the variant is outside the transcript and too far
/// upstream to count as promoter. Region checks run from the outermost
/// (promoter, whole transcript, UTR) to the innermost (splice site, intron,
/// coding), and the first one that claims the variant wins.
pub fn classify<S: SequenceAccessor + ?Sized>(
    request: &AnnotationRequest<S>,
) -> Result<Option<Effect>, FerroError> {
    let upstream = intron::promoter(request);
    if upstream.is_none() && intron::is_outside(request) {
        return Ok(None);
    }

    if request.variant.is_sequence_unknown() && request.variant.kind != VariantKind::Deletion {
        log::debug!(
            "{}: unknown sequence for {}",
            request.transcript.transcript_id,
            request.variant
        );
        return Ok(Some(request.effect_with_prot_length(EffectKind::Unknown)));
    }

    if let Some(effect) = upstream {
        return Ok(Some(effect));
    }
    if let Some(effect) = intron::whole_transcript(request) {
        return Ok(Some(effect));
    }
    if !request.transcript.is_coding() {
        return Ok(Some(intron::non_coding(request)));
    }

    let region_checks: [fn(&AnnotationRequest<S>) -> Option<Effect>; 3] =
        [intron::utr, intron::splice_site, intron::intron];
    for check in region_checks {
        if let Some(effect) = check(request) {
            log::debug!(
                "{}: {} at {}",
                request.transcript.transcript_id,
                effect.effect,
                request.variant
            );
            return Ok(Some(effect));
        }
    }

    let coding_checks: [fn(&AnnotationRequest<S>) -> Result<Option<Effect>, FerroError>; 3] =
        [coding::start_loss, coding::stop_loss, coding::frame_shift];
    for check in coding_checks {
        if let Some(effect) = check(request)? {
            log::debug!(
                "{}: {} at {}",
                request.transcript.transcript_id,
                effect.effect,
                request.variant
            );
            return Ok(Some(effect));
        }
    }

    let effect = coding::protein_change(request)?;
    log::debug!(
        "{}: {} at {}",
        request.transcript.transcript_id,
        effect.effect,
        request.variant
    );
    Ok(Some(effect))
}
