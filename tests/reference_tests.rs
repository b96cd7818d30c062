//! Annotation against on-disk reference data
//!
//! Writes the synthetic test genome to a FASTA file and its transcripts to
//! gene-model tables, then checks the file-backed annotator agrees with the
//! in-memory one.

use ferro_effect::reference::{load_gene_models, load_gene_models_as, GeneModelFormat};
use ferro_effect::{
    AnnotatorConfig, EffectKind, FastaAccessor, MockProvider, SequenceAccessor, VariantAnnotator,
    VariantInput,
};
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DEFAULT_MODELS: &str = "chr\ttrID\tgene\tstrand\ttsBeg\ttxEnd\tcdsStart\tcdsEnd\texonStarts\texonEnds\texonFrames\tatts\n\
    1\tTXP1\tGENEP\t+\t11\t160\t21\t128\t11,61,121\t30,90,160\t0,1,1\t\n\
    1\tTXM1\tGENEM\t-\t201\t320\t216\t300\t201,251,291\t230,270,320\t0,1,0\t\n\
    1\tTXN1\tNCGENE\t+\t401\t460\t461\t460\t401,441\t420,460\t-1,-1\t\n\
    1\tTXT1\ttRNA1\t-\t501\t572\t573\t572\t501\t572\t-1\tanticodonB:534;anticodonE:536\n";

// Same transcripts in refFlat (0-based starts).
const REF_FLAT_MODELS: &str = "#geneName\tname\tchrom\tstrand\ttxStart\ttxEnd\tcdsStart\tcdsEnd\texonCount\texonStarts\texonEnds\n\
    GENEP\tTXP1\t1\t+\t10\t160\t20\t128\t3\t10,60,120,\t30,90,160,\n\
    GENEM\tTXM1\t1\t-\t200\t320\t215\t300\t3\t200,250,290,\t230,270,320,\n";

/// Write chromosome 1 of the test genome as `chr1`, 60 bases per line
fn write_genome(dir: &TempDir) -> PathBuf {
    let provider = MockProvider::with_test_data();
    let chr1 = SequenceAccessor::get(&provider, "1", 1, 600).unwrap();
    let mut content = String::from(">chr1 synthetic\n");
    for line in chr1.as_bytes().chunks(60) {
        content.push_str(std::str::from_utf8(line).unwrap());
        content.push('\n');
    }
    let path = dir.path().join("genome.fa");
    fs::write(&path, content).unwrap();
    path
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn rendered(effects: &[ferro_effect::Effect]) -> Vec<String> {
    effects.iter().map(|e| e.to_string()).collect()
}

fn mock_effects(loc: &str, var: &str) -> Vec<String> {
    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::new(&provider, &provider);
    let input = VariantInput::new().loc(loc).var(var);
    rendered(&annotator.annotate_variant(&input).unwrap())
}

fn file_effects(genome: &Path, models: &Path, loc: &str, var: &str) -> Vec<String> {
    let fasta = FastaAccessor::new(genome).unwrap();
    let db = load_gene_models(models).unwrap();
    let annotator = VariantAnnotator::new(fasta, db);
    let input = VariantInput::new().loc(loc).var(var);
    rendered(&annotator.annotate_variant(&input).unwrap())
}

#[rstest]
#[case("1:15", "sub(G->A)")]
#[case("1:45", "sub(G->A)")]
#[case("1:61", "sub(G->A)")]
#[case("1:70", "sub(G->A)")]
#[case("1:66", "ins(A)")]
#[case("1:64", "del(3)")]
#[case("1:127", "sub(A->C)")]
#[case("1:240", "sub(C->A)")]
#[case("1:272", "sub(C->A)")]
#[case("1:296", "sub(C->T)")]
#[case("1:299", "sub(A->G)")]
#[case("1:430", "sub(C->A)")]
#[case("1:535", "sub(G->A)")]
#[case("1:180", "sub(C->G)")]
fn test_default_models_match_mock(#[case] loc: &str, #[case] var: &str) {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir);
    let models = write_file(&dir, "genes.txt", DEFAULT_MODELS);
    assert_eq!(file_effects(&genome, &models, loc, var), mock_effects(loc, var));
}

#[rstest]
#[case("1:61", "sub(G->A)")]
#[case("1:22", "sub(T->C)")]
#[case("1:31", "sub(T->A)")]
#[case("1:296", "sub(C->T)")]
#[case("1:216", "sub(T->C)")]
fn test_ref_flat_models_match_mock(#[case] loc: &str, #[case] var: &str) {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir);
    let models = write_file(&dir, "refFlat.txt", REF_FLAT_MODELS);

    let fasta = FastaAccessor::new(&genome).unwrap();
    let db = load_gene_models_as(&models, GeneModelFormat::RefFlat).unwrap();
    let annotator = VariantAnnotator::new(fasta, db);
    let input = VariantInput::new().loc(loc).var(var);
    let effects = annotator.annotate_variant(&input).unwrap();

    // refFlat ids carry an occurrence suffix; the display name is the
    // unsuffixed id, so the rendering matches.
    assert_eq!(rendered(&effects), mock_effects(loc, var));
    assert!(effects[0]
        .transcript_id
        .as_deref()
        .is_some_and(|id| !id.ends_with("_1")));
}

#[test]
fn test_chromosome_in_genome_only() {
    let dir = TempDir::new().unwrap();
    let genome = write_file(&dir, "genome.fa", ">chr1\nACGTACGTAC\n>chr2\nACGTACGTAC\n");
    let models = write_file(&dir, "genes.txt", DEFAULT_MODELS);
    let fasta = FastaAccessor::new(&genome).unwrap();
    let db = load_gene_models(&models).unwrap();
    let annotator = VariantAnnotator::new(fasta, db);

    let input = VariantInput::alleles("2", 5, "A", "C");
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(effects[0].effect, EffectKind::Intergenic);

    let input = VariantInput::alleles("7", 5, "A", "C");
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(effects[0].effect, EffectKind::UnknownChromosome);
}

#[test]
fn test_reference_read_from_genome() {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir);
    let models = write_file(&dir, "genes.txt", DEFAULT_MODELS);
    let fasta = FastaAccessor::new(&genome).unwrap();
    let db = load_gene_models(&models).unwrap();
    let annotator = VariantAnnotator::new(fasta, db);

    // No reference allele given: it is read from the FASTA.
    let input = VariantInput::new().chrom("1").position(61).typ("sub").seq("A");
    let effects = annotator.annotate_variant(&input).unwrap();
    assert_eq!(effects[0].aa_change.as_deref(), Some("Gly->Glu"));
}

#[test]
fn test_config_file_drives_annotator() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(
        &dir,
        "effect.toml",
        "promoter_len = 20\ntyped_cnv_effects = true\n",
    );
    let config = AnnotatorConfig::load_from_path(&config_path).unwrap();

    let provider = MockProvider::with_test_data();
    let annotator = VariantAnnotator::with_config(&provider, &provider, config);

    let effects = annotator
        .annotate_variant(&VariantInput::new().loc("1:330").var("sub(C->A)"))
        .unwrap();
    assert_eq!(effects[0].effect, EffectKind::Promoter);
    assert_eq!(effects[0].dist_from_5utr, Some(10));

    let effects = annotator
        .annotate_variant(&VariantInput::new().loc("1:100-250").var("CNV-"))
        .unwrap();
    assert!(effects.iter().all(|e| e.effect == EffectKind::CnvLoss));
}
