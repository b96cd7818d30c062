//! End-to-end effect classification on the synthetic test genome
//!
//! Test categories:
//! - Point substitutions across every region of a transcript, both strands
//! - Insertions and deletions around codon, exon and CDS boundaries
//! - Non-coding and tRNA transcripts
//! - Mitochondrial genetic code
//! - Promoter, intergenic and copy-number handling
//!
//! Expected values are written as `transcript:gene:effect:details`, the
//! rendering used in annotation summaries.

use ferro_effect::{
    AnnotatorConfig, Effect, EffectKind, MockProvider, VariantAnnotator, VariantInput,
};
use rstest::rstest;

fn annotate_with(config: AnnotatorConfig, loc: &str, var: &str) -> Vec<Effect> {
    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::with_config(&provider, &provider, config);
    let input = VariantInput::new().loc(loc).var(var);
    annotator
        .annotate_variant(&input)
        .unwrap_or_else(|e| panic!("{} {}: {}", loc, var, e))
}

fn rendered(effects: &[Effect]) -> Vec<String> {
    effects.iter().map(|e| e.to_string()).collect()
}

// =============================================================================
// Substitutions
// =============================================================================

#[rstest]
// GENEP, plus strand
#[case("1:15", "sub(G->A)", "TXP1:GENEP:5'UTR:6")]
#[case("1:140", "sub(C->A)", "TXP1:GENEP:3'UTR:12")]
#[case("1:31", "sub(T->A)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:60", "sub(C->A)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:45", "sub(G->A)", "TXP1:GENEP:intron:1/2[14]")]
#[case("1:22", "sub(T->C)", "TXP1:GENEP:noStart:15")]
#[case("1:127", "sub(A->C)", "TXP1:GENEP:noEnd:15")]
#[case("1:61", "sub(G->A)", "TXP1:GENEP:missense:4/15(Gly->Glu)")]
#[case("1:70", "sub(G->A)", "TXP1:GENEP:nonsense:7/15(Trp->End)")]
#[case("1:65", "sub(T->C)", "TXP1:GENEP:synonymous:5/15")]
#[case("1:68", "sub(G->T)", "TXP1:GENEP:synonymous:6/15")]
// GENEM, minus strand
#[case("1:310", "sub(C->A)", "TXM1:GENEM:5'UTR:10")]
#[case("1:205", "sub(G->A)", "TXM1:GENEM:3'UTR:11")]
#[case("1:299", "sub(A->G)", "TXM1:GENEM:noStart:14")]
#[case("1:216", "sub(T->C)", "TXM1:GENEM:noEnd:14")]
#[case("1:240", "sub(C->A)", "TXM1:GENEM:intron:2/2[9]")]
#[case("1:272", "sub(C->A)", "TXM1:GENEM:splice-site:4/14")]
#[case("1:296", "sub(C->T)", "TXM1:GENEM:missense:2/14(Arg->His)")]
// Non-coding and tRNA
#[case("1:405", "sub(G->T)", "TXN1:NCGENE:non-coding:40")]
#[case("1:430", "sub(C->A)", "TXN1:NCGENE:non-coding-intron:1/1[9]")]
#[case("1:535", "sub(G->A)", "TXT1:tRNA1:tRNA:ANTICODON:72")]
#[case("1:510", "sub(C->A)", "TXT1:tRNA1:non-coding:72")]
// GENEU, introns in both UTRs
#[case("3:30", "sub(C->A)", "TXU1:GENEU:5'UTR-intron:1/3[9]")]
#[case("3:110", "sub(C->A)", "TXU1:GENEU:3'UTR-intron:3/3[9]")]
#[case("3:44", "sub(G->A)", "TXU1:GENEU:5'UTR:2")]
#[case("3:98", "sub(T->A)", "TXU1:GENEU:3'UTR:3")]
#[case("3:50", "sub(C->T)", "TXU1:GENEU:missense:2/9(Ala->Val)")]
#[case("3:62", "sub(C->A)", "TXU1:GENEU:splice-site:6/9")]
// Mitochondrial code: ATA starts, TGA is Trp
#[case("MT:3", "sub(A->G)", "MTX1:MTGENE:synonymous:1/9")]
#[case("MT:2", "sub(T->C)", "MTX1:MTGENE:noStart:9")]
#[case("MT:5", "sub(G->A)", "MTX1:MTGENE:nonsense:2/9(Trp->End)")]
fn test_substitution(#[case] loc: &str, #[case] var: &str, #[case] expected: &str) {
    let effects = annotate_with(AnnotatorConfig::default(), loc, var);
    assert_eq!(rendered(&effects), vec![expected.to_string()]);
}

// =============================================================================
// Insertions and deletions
// =============================================================================

#[rstest]
#[case("1:66", "ins(A)", "TXP1:GENEP:frame-shift:6/15")]
#[case("1:65", "del(1)", "TXP1:GENEP:frame-shift:5/15")]
#[case("1:64", "del(3)", "TXP1:GENEP:no-frame-shift:5/15(Phe,Thr->Ser)")]
#[case("1:64", "ins(GCC)", "TXP1:GENEP:no-frame-shift:5/15(Phe->Cys,Leu)")]
#[case("1:63", "ins(TAA)", "TXP1:GENEP:no-frame-shift-newStop:5/15(->End)")]
#[case("1:19", "del(4)", "TXP1:GENEP:noStart:15")]
#[case("1:126", "del(3)", "TXP1:GENEP:noEnd:15")]
#[case("1:29", "del(4)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:21", "ins(GGG)", "TXP1:GENEP:5'UTR:1")]
#[case("1:22", "ins(GGG)", "TXP1:GENEP:noStart:15")]
#[case("1:31", "ins(A)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:32", "ins(A)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:33", "ins(A)", "TXP1:GENEP:intron:1/2[2]")]
#[case("1:61", "ins(A)", "TXP1:GENEP:splice-site:4/15")]
#[case("1:400", "del(70)", "TXN1:NCGENE:non-coding:40")]
// An insertion before the first exonic base is outside the transcript.
#[case("1:11", "ins(GGG)", "None:None:intergenic:")]
#[case("1:161", "ins(A)", "None:None:intergenic:")]
fn test_indel(#[case] loc: &str, #[case] var: &str, #[case] expected: &str) {
    let effects = annotate_with(AnnotatorConfig::default(), loc, var);
    assert_eq!(rendered(&effects), vec![expected.to_string()]);
}

#[test]
fn test_deletion_covering_whole_transcript() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:5", "del(200)");
    assert_eq!(
        rendered(&effects),
        vec!["TXP1:GENEP:all:15", "TXM1:GENEM:3'UTR:12"]
    );
}

#[test]
fn test_multi_base_substitution() {
    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::new(&provider, &provider);
    let input = VariantInput::alleles("1", 66, "ACG", "TTT");
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(effects[0].effect, EffectKind::Missense);
    assert_eq!(effects[0].aa_change.as_deref(), Some("Thr->Phe"));
    assert_eq!(effects[0].prot_pos, Some(6));
}

#[test]
fn test_vcf_anchored_deletion_is_trimmed() {
    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::new(&provider, &provider);
    // Anchor base 64 is kept, 65 is deleted.
    let input = VariantInput::alleles("1", 64, "TT", "T");
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(rendered(&effects), vec!["TXP1:GENEP:frame-shift:5/15"]);
}

#[test]
fn test_ambiguous_base_is_coding_unknown() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:70", "sub(G->N)");
    assert_eq!(effects[0].effect, EffectKind::CodingUnknown);
    assert_eq!(effects[0].aa_change.as_deref(), Some("Trp->?"));
}

#[test]
fn test_legacy_allele_is_unknown() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:70", "sub(G->^G$)");
    assert_eq!(effects[0].effect, EffectKind::Unknown);
    assert_eq!(effects[0].prot_length, Some(15));
    assert_eq!(effects[0].prot_pos, None);
}

#[test]
fn test_intron_fields() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:240", "sub(C->A)");
    let e = &effects[0];
    assert_eq!(e.which_intron, Some(2));
    assert_eq!(e.how_many_introns, Some(2));
    assert_eq!(e.intron_length, Some(20));
    assert_eq!(e.dist_from_acceptor, Some(9));
    assert_eq!(e.dist_from_donor, Some(10));
    assert_eq!(e.prot_pos, Some(11));
}

// =============================================================================
// Promoter and intergenic
// =============================================================================

#[rstest]
#[case("1:330", 20, vec!["TXM1:GENEM:promoter:10"])]
#[case("1:5", 20, vec!["TXP1:GENEP:promoter:6"])]
#[case("1:5", 5, vec!["None:None:intergenic:"])]
#[case("1:600", 5000, vec!["TXM1:GENEM:promoter:280", "TXT1:tRNA1:promoter:28"])]
// Downstream of both neighbours: neither is a promoter hit.
#[case("1:175", 30, vec!["None:None:intergenic:"])]
fn test_promoter(#[case] loc: &str, #[case] promoter_len: u64, #[case] expected: Vec<&str>) {
    let provider = MockProvider::with_test_data();
    let base = provider_base(&provider, loc);
    let config = AnnotatorConfig::default().with_promoter_len(promoter_len);
    let alt = if base == "A" { "C" } else { "A" };
    let effects = annotate_with(config, loc, &format!("sub({}->{})", base, alt));
    assert_eq!(rendered(&effects), expected);
}

#[test]
fn test_promoter_insertion_at_first_exon() {
    let config = AnnotatorConfig::default().with_promoter_len(20);
    let effects = annotate_with(config, "1:11", "ins(A)");
    assert_eq!(rendered(&effects), vec!["TXP1:GENEP:promoter:1"]);
}

#[test]
fn test_promoter_disabled_on_mitochondria() {
    let config = AnnotatorConfig::default().with_promoter_len(5000);
    let effects = annotate_with(config, "MT:45", "sub(G->A)");
    assert_eq!(effects, vec![Effect::new(EffectKind::Intergenic)]);
}

fn provider_base(provider: &MockProvider, loc: &str) -> String {
    use ferro_effect::SequenceAccessor;
    let (chrom, pos) = loc.split_once(':').unwrap();
    let pos: u64 = pos.parse().unwrap();
    SequenceAccessor::get(provider, chrom, pos, pos).unwrap()
}

#[rstest]
#[case("2:50", EffectKind::Intergenic)]
#[case("1:180", EffectKind::Intergenic)]
#[case("22:100", EffectKind::UnknownChromosome)]
fn test_no_transcript(#[case] loc: &str, #[case] expected: EffectKind) {
    let effects = annotate_with(AnnotatorConfig::default(), loc, "sub(C->G)");
    assert_eq!(effects, vec![Effect::new(expected)]);
}

#[test]
fn test_no_mutation() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:61", "sub(G->G)");
    assert_eq!(effects, vec![Effect::new(EffectKind::NoMutation)]);
}

// =============================================================================
// Copy-number variants
// =============================================================================

#[test]
fn test_cnv_reports_each_transcript() {
    let effects = annotate_with(AnnotatorConfig::default(), "1:100-250", "CNV+");
    assert_eq!(rendered(&effects), vec!["TXP1:GENEP:unknown:None", "TXM1:GENEM:unknown:None"]);

    let effects = annotate_with(AnnotatorConfig::default(), "1:170-190", "CNV-");
    assert_eq!(effects, vec![Effect::new(EffectKind::Intergenic)]);
}

#[test]
fn test_typed_cnv() {
    let config = AnnotatorConfig::default().with_typed_cnv_effects(true);
    let effects = annotate_with(config.clone(), "1:400-600", "CNV-");
    let ids: Vec<_> = effects.iter().map(|e| e.transcript_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("TXN1"), Some("TXT1")]);
    assert!(effects
        .iter()
        .all(|e| e.effect == EffectKind::CnvLoss && e.length == Some(201)));

    let effects = annotate_with(config, "2:1-10", "CNV+");
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].effect, EffectKind::CnvGain);
    assert_eq!(effects[0].gene, None);
    assert_eq!(effects[0].length, Some(10));
}

#[test]
fn test_cnv_from_type_and_length() {
    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::new(&provider, &provider);
    let input = VariantInput::new()
        .chrom("3")
        .position(50)
        .typ("CNV+")
        .length(10);
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(rendered(&effects), vec!["TXU1:GENEU:unknown:None"]);
}
