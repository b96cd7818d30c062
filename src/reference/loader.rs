//! Transcript database loading
//!
//! This module loads transcript models from the tab-separated gene-model
//! formats in common use: the default gene-model table, UCSC refFlat and GTF.
//! [`load_gene_models`] sniffs the format from the file header.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::FerroError;
use crate::reference::provider::TranscriptIndex;
use crate::reference::transcript::{Exon, Strand, TranscriptModel};

/// A database of transcript models indexed for overlap queries
#[derive(Debug, Default)]
pub struct TranscriptDb {
    /// Transcripts in insertion order
    transcripts: Vec<TranscriptModel>,
    /// Index from transcript ID to position in `transcripts`
    id_index: HashMap<String, usize>,
    /// Index from gene symbol to transcript positions
    gene_index: HashMap<String, Vec<usize>>,
    /// Per-chromosome `(tx_start, tx_end, position)`, sorted by start
    region_index: HashMap<String, Vec<(u64, u64, usize)>>,
}

impl TranscriptDb {
    /// Create a new empty transcript database
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transcript model after checking its invariants.
    ///
    /// A model whose ID is already present replaces nothing; the ID index
    /// keeps pointing at the first one.
    pub fn add(&mut self, transcript: TranscriptModel) -> Result<(), FerroError> {
        transcript.validate()?;
        let idx = self.transcripts.len();

        self.id_index
            .entry(transcript.transcript_id.clone())
            .or_insert(idx);
        self.gene_index
            .entry(transcript.gene.clone())
            .or_default()
            .push(idx);

        let regions = self.region_index.entry(transcript.chrom.clone()).or_default();
        let at = regions.partition_point(|(start, _, _)| *start <= transcript.tx.0);
        regions.insert(at, (transcript.tx.0, transcript.tx.1, idx));

        self.transcripts.push(transcript);
        Ok(())
    }

    /// Get a transcript by its ID
    pub fn get(&self, id: &str) -> Option<&TranscriptModel> {
        self.id_index.get(id).map(|&idx| &self.transcripts[idx])
    }

    /// Get all transcripts for a gene
    pub fn get_by_gene(&self, gene: &str) -> Vec<&TranscriptModel> {
        self.gene_index
            .get(gene)
            .map(|ids| ids.iter().map(|&idx| &self.transcripts[idx]).collect())
            .unwrap_or_default()
    }

    /// Get all transcripts overlapping a genomic region
    pub fn get_by_region(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        self.region_index
            .get(chrom)
            .map(|regions| {
                regions
                    .iter()
                    .take_while(|(tx_start, _, _)| *tx_start <= end)
                    .filter(|(_, tx_end, _)| *tx_end >= start)
                    .map(|(_, _, idx)| &self.transcripts[*idx])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Chromosomes with at least one transcript
    pub fn chromosomes(&self) -> impl Iterator<Item = &String> {
        self.region_index.keys()
    }

    /// Get the number of transcripts
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Iterate over all transcripts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptModel> {
        self.transcripts.iter()
    }
}

impl TranscriptIndex for TranscriptDb {
    fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        self.get_by_region(chrom, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        self.region_index.contains_key(chrom)
    }
}

/// Supported gene-model file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneModelFormat {
    /// `chr trID gene strand tsBeg txEnd cdsStart cdsEnd exonStarts exonEnds exonFrames atts`
    Default,
    /// UCSC refFlat with a `#geneName` header
    RefFlat,
    /// GTF (exon / CDS / stop_codon features)
    Gtf,
}

impl fmt::Display for GeneModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneModelFormat::Default => write!(f, "default"),
            GeneModelFormat::RefFlat => write!(f, "refflat"),
            GeneModelFormat::Gtf => write!(f, "gtf"),
        }
    }
}

impl FromStr for GeneModelFormat {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(GeneModelFormat::Default),
            "refflat" => Ok(GeneModelFormat::RefFlat),
            "gtf" => Ok(GeneModelFormat::Gtf),
            other => Err(FerroError::Config {
                msg: format!("unknown gene model format '{}'", other),
            }),
        }
    }
}

impl GeneModelFormat {
    /// Guess the format from the first non-comment line of a file
    pub fn detect(first_line: &str) -> Option<Self> {
        let fields: Vec<&str> = first_line.split('\t').collect();
        if fields.first() == Some(&"#geneName") {
            return Some(GeneModelFormat::RefFlat);
        }
        if fields.contains(&"trID") && fields.contains(&"exonFrames") {
            return Some(GeneModelFormat::Default);
        }
        if fields.len() >= 9
            && fields[3].parse::<u64>().is_ok()
            && fields[4].parse::<u64>().is_ok()
        {
            return Some(GeneModelFormat::Gtf);
        }
        None
    }
}

fn open(path: &Path) -> Result<BufReader<File>, FerroError> {
    let file = File::open(path).map_err(|e| FerroError::Io {
        msg: format!("Failed to open gene model file {}: {}", path.display(), e),
    })?;
    Ok(BufReader::new(file))
}

/// Load gene models, detecting the format from the file header
pub fn load_gene_models<P: AsRef<Path>>(path: P) -> Result<TranscriptDb, FerroError> {
    let path = path.as_ref();
    let mut first = None;
    for line in open(path)?.lines() {
        let line = line?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() || (trimmed.starts_with('#') && !trimmed.starts_with("#geneName")) {
            continue;
        }
        first = Some(trimmed.to_string());
        break;
    }

    let format = first
        .as_deref()
        .and_then(GeneModelFormat::detect)
        .ok_or_else(|| FerroError::Io {
            msg: format!("cannot detect gene model format of {}", path.display()),
        })?;
    log::debug!("loading {} as {} gene models", path.display(), format);
    load_gene_models_as(path, format)
}

/// Load gene models in a known format
pub fn load_gene_models_as<P: AsRef<Path>>(
    path: P,
    format: GeneModelFormat,
) -> Result<TranscriptDb, FerroError> {
    let reader = open(path.as_ref())?;
    let db = match format {
        GeneModelFormat::Default => read_default(reader)?,
        GeneModelFormat::RefFlat => read_ref_flat(reader)?,
        GeneModelFormat::Gtf => read_gtf(reader)?,
    };
    log::debug!("loaded {} transcripts", db.len());
    Ok(db)
}

fn parse_error(line_no: usize, msg: impl fmt::Display) -> FerroError {
    FerroError::Io {
        msg: format!("gene models line {}: {}", line_no, msg),
    }
}

fn parse_u64(value: &str, line_no: usize, column: &str) -> Result<u64, FerroError> {
    value
        .trim()
        .parse()
        .map_err(|_| parse_error(line_no, format!("bad {} '{}'", column, value)))
}

fn parse_list<T: FromStr>(value: &str, line_no: usize, column: &str) -> Result<Vec<T>, FerroError> {
    value
        .trim()
        .trim_end_matches(',')
        .split(',')
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| parse_error(line_no, format!("bad {} entry '{}'", column, v)))
        })
        .collect()
}

fn parse_strand(value: &str, line_no: usize) -> Result<Strand, FerroError> {
    Strand::from_symbol(value.trim())
        .ok_or_else(|| parse_error(line_no, format!("bad strand '{}'", value)))
}

/// Column lookup for header-driven tab-separated formats
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(header: &str, required: &[&str]) -> Result<Self, FerroError> {
        let index: HashMap<String, usize> = header
            .split('\t')
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        if let Some(missing) = required.iter().find(|c| !index.contains_key(**c)) {
            return Err(parse_error(1, format!("missing column '{}'", missing)));
        }
        Ok(Self { index })
    }

    fn get<'a>(&self, fields: &[&'a str], name: &str) -> Option<&'a str> {
        self.index.get(name).and_then(|&i| fields.get(i).copied())
    }

    fn require<'a>(
        &self,
        fields: &[&'a str],
        name: &str,
        line_no: usize,
    ) -> Result<&'a str, FerroError> {
        self.get(fields, name)
            .ok_or_else(|| parse_error(line_no, format!("missing value for '{}'", name)))
    }
}

const DEFAULT_COLUMNS: [&str; 12] = [
    "chr",
    "trID",
    "gene",
    "strand",
    "tsBeg",
    "txEnd",
    "cdsStart",
    "cdsEnd",
    "exonStarts",
    "exonEnds",
    "exonFrames",
    "atts",
];

/// Read the default gene-model table (1-based coordinates, frames given)
pub fn read_default<R: BufRead>(reader: R) -> Result<TranscriptDb, FerroError> {
    let mut db = TranscriptDb::new();
    let mut lines = reader.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => line?,
        None => return Ok(db),
    };
    let cols = Columns::new(&header, &DEFAULT_COLUMNS)?;

    for (i, line) in lines {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        let starts: Vec<u64> =
            parse_list(cols.require(&fields, "exonStarts", line_no)?, line_no, "exonStarts")?;
        let ends: Vec<u64> =
            parse_list(cols.require(&fields, "exonEnds", line_no)?, line_no, "exonEnds")?;
        let frames: Vec<i64> =
            parse_list(cols.require(&fields, "exonFrames", line_no)?, line_no, "exonFrames")?;
        if starts.len() != ends.len() || starts.len() != frames.len() {
            return Err(parse_error(line_no, "exon column lengths differ"));
        }
        let exons = starts
            .iter()
            .zip(&ends)
            .zip(&frames)
            .map(|((&start, &stop), &frame)| Exon {
                start,
                stop,
                frame: u8::try_from(frame).ok(),
            })
            .collect();

        let tr_id = cols.require(&fields, "trID", line_no)?.to_string();
        let mut tm = TranscriptModel::new(
            cols.require(&fields, "gene", line_no)?,
            tr_id.clone(),
            cols.require(&fields, "chr", line_no)?,
            parse_strand(cols.require(&fields, "strand", line_no)?, line_no)?,
            (
                parse_u64(cols.require(&fields, "tsBeg", line_no)?, line_no, "tsBeg")?,
                parse_u64(cols.require(&fields, "txEnd", line_no)?, line_no, "txEnd")?,
            ),
            (
                parse_u64(cols.require(&fields, "cdsStart", line_no)?, line_no, "cdsStart")?,
                parse_u64(cols.require(&fields, "cdsEnd", line_no)?, line_no, "cdsEnd")?,
            ),
            exons,
        );
        tm.tr_name = Some(
            cols.get(&fields, "trOrigId")
                .map_or(tr_id, |s| s.to_string()),
        );
        if let Some(atts) = cols.get(&fields, "atts") {
            for pair in atts.split(';').filter(|a| !a.trim().is_empty()) {
                if let Some((key, value)) = pair.split_once(':') {
                    tm.attributes.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }
        db.add(tm)?;
    }
    Ok(db)
}

const REF_FLAT_COLUMNS: [&str; 11] = [
    "#geneName",
    "name",
    "chrom",
    "strand",
    "txStart",
    "txEnd",
    "cdsStart",
    "cdsEnd",
    "exonCount",
    "exonStarts",
    "exonEnds",
];

/// Read UCSC refFlat (0-based half-open starts, frames recomputed)
///
/// Transcript IDs get an occurrence suffix, so the second `NM_1` row becomes
/// `NM_1_2`.
pub fn read_ref_flat<R: BufRead>(reader: R) -> Result<TranscriptDb, FerroError> {
    let mut db = TranscriptDb::new();
    let mut lines = reader.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => line?,
        None => return Ok(db),
    };
    let cols = Columns::new(&header, &REF_FLAT_COLUMNS)?;
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, line) in lines {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        let starts: Vec<u64> =
            parse_list(cols.require(&fields, "exonStarts", line_no)?, line_no, "exonStarts")?;
        let ends: Vec<u64> =
            parse_list(cols.require(&fields, "exonEnds", line_no)?, line_no, "exonEnds")?;
        if starts.len() != ends.len() {
            return Err(parse_error(line_no, "exon column lengths differ"));
        }
        let exons = starts
            .iter()
            .zip(&ends)
            .map(|(&start, &stop)| Exon::new(start + 1, stop))
            .collect();

        let tr_name = cols.require(&fields, "name", line_no)?.to_string();
        let count = seen.entry(tr_name.clone()).or_insert(0);
        *count += 1;

        let mut tm = TranscriptModel::new(
            cols.require(&fields, "#geneName", line_no)?,
            format!("{}_{}", tr_name, count),
            cols.require(&fields, "chrom", line_no)?,
            parse_strand(cols.require(&fields, "strand", line_no)?, line_no)?,
            (
                parse_u64(cols.require(&fields, "txStart", line_no)?, line_no, "txStart")? + 1,
                parse_u64(cols.require(&fields, "txEnd", line_no)?, line_no, "txEnd")?,
            ),
            (
                parse_u64(cols.require(&fields, "cdsStart", line_no)?, line_no, "cdsStart")? + 1,
                parse_u64(cols.require(&fields, "cdsEnd", line_no)?, line_no, "cdsEnd")?,
            ),
            exons,
        );
        tm.tr_name = Some(tr_name);
        tm.update_frames();
        db.add(tm)?;
    }
    Ok(db)
}

/// Parse GTF attribute string
fn parse_gtf_attributes(attr_str: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();

    for part in attr_str.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        // GTF format: key "value"
        if let Some((key, value)) = part.split_once(' ') {
            let value = value.trim().trim_matches('"').to_string();
            attrs.insert(key.to_string(), value);
        }
    }

    attrs
}

/// Accumulates GTF features of one transcript
struct TranscriptBuilder {
    id: String,
    gene: String,
    chrom: String,
    strand: Strand,
    tx: (u64, u64),
    exons: Vec<(u64, u64)>,
    cds: Option<(u64, u64)>,
}

impl TranscriptBuilder {
    fn extend_cds(&mut self, start: u64, end: u64) {
        self.cds = Some(match self.cds {
            Some((s, e)) => (s.min(start), e.max(end)),
            None => (start, end),
        });
    }

    fn build(mut self) -> TranscriptModel {
        self.exons.sort_by_key(|(start, _)| *start);
        let exons: Vec<Exon> = self.exons.iter().map(|&(s, e)| Exon::new(s, e)).collect();
        let tx = match (self.exons.first(), self.exons.last()) {
            (Some(first), Some(last)) => (self.tx.0.min(first.0), self.tx.1.max(last.1)),
            _ => self.tx,
        };
        // Non-coding transcripts carry an empty CDS just past their end.
        let cds = self.cds.unwrap_or((tx.1 + 1, tx.1));

        let mut tm = TranscriptModel::new(
            self.gene,
            self.id.clone(),
            self.chrom,
            self.strand,
            tx,
            cds,
            exons,
        );
        tm.tr_name = Some(self.id);
        tm.update_frames();
        tm
    }
}

/// Read GTF, grouping `exon`, `CDS` and `stop_codon` features by `transcript_id`
pub fn read_gtf<R: BufRead>(reader: R) -> Result<TranscriptDb, FerroError> {
    let mut order: Vec<String> = Vec::new();
    let mut builders: HashMap<String, TranscriptBuilder> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            return Err(parse_error(line_no, "expected 9 columns"));
        }

        let feature = fields[2];
        if !matches!(feature, "transcript" | "exon" | "CDS" | "stop_codon") {
            continue;
        }
        let start = parse_u64(fields[3], line_no, "start")?;
        let end = parse_u64(fields[4], line_no, "end")?;
        let attrs = parse_gtf_attributes(fields[8]);
        let Some(tr_id) = attrs.get("transcript_id").cloned() else {
            log::warn!("gene models line {}: {} without transcript_id", line_no, feature);
            continue;
        };

        if !builders.contains_key(&tr_id) {
            let gene = attrs
                .get("gene_name")
                .or_else(|| attrs.get("gene_id"))
                .cloned()
                .unwrap_or_else(|| tr_id.clone());
            order.push(tr_id.clone());
            builders.insert(
                tr_id.clone(),
                TranscriptBuilder {
                    id: tr_id.clone(),
                    gene,
                    chrom: fields[0].to_string(),
                    strand: parse_strand(fields[6], line_no)?,
                    tx: (start, end),
                    exons: Vec::new(),
                    cds: None,
                },
            );
        }
        let Some(builder) = builders.get_mut(&tr_id) else {
            continue;
        };

        match feature {
            "transcript" => builder.tx = (start, end),
            "exon" => builder.exons.push((start, end)),
            _ => builder.extend_cds(start, end),
        }
    }

    let mut db = TranscriptDb::new();
    for id in order {
        if let Some(builder) = builders.remove(&id) {
            if builder.exons.is_empty() {
                log::warn!("transcript {} has no exons, skipped", id);
                continue;
            }
            db.add(builder.build())?;
        }
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const DEFAULT_TABLE: &str = "chr\ttrID\tgene\tstrand\ttsBeg\ttxEnd\tcdsStart\tcdsEnd\texonStarts\texonEnds\texonFrames\tatts\n\
        1\tTX1\tG1\t+\t100\t400\t130\t350\t100,200,300\t160,250,400\t0,1,1\tgene_biotype:protein_coding\n\
        1\tTX2\tG2\t-\t500\t600\t601\t600\t500\t600\t-1\tanticodonB:540;anticodonE:542\n";

    const REF_FLAT: &str = "#geneName\tname\tchrom\tstrand\ttxStart\ttxEnd\tcdsStart\tcdsEnd\texonCount\texonStarts\texonEnds\n\
        G1\tNM_1\t1\t+\t99\t400\t129\t350\t3\t99,199,299,\t160,250,400,\n\
        G1\tNM_1\t2\t+\t99\t400\t129\t350\t3\t99,199,299,\t160,250,400,\n";

    const GTF: &str = "#comment\n\
        1\ttest\ttranscript\t100\t400\t.\t+\t.\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\texon\t100\t160\t.\t+\t.\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\texon\t200\t250\t.\t+\t.\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\texon\t300\t400\t.\t+\t.\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\tCDS\t130\t160\t.\t+\t0\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\tCDS\t200\t250\t.\t+\t2\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\tCDS\t300\t346\t.\t+\t2\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\tstop_codon\t347\t349\t.\t+\t0\tgene_id \"g1\"; transcript_id \"T1\"; gene_name \"G1\";\n\
        1\ttest\texon\t500\t600\t.\t-\t.\tgene_id \"g2\"; transcript_id \"T2\";\n";

    #[test]
    fn test_read_default() {
        let db = read_default(Cursor::new(DEFAULT_TABLE)).unwrap();
        assert_eq!(db.len(), 2);

        let tx1 = db.get("TX1").unwrap();
        assert_eq!(tx1.cds, (130, 350));
        assert_eq!(tx1.exons[0].frame, Some(0));
        assert_eq!(tx1.exons[1].frame, Some(1));
        assert!(tx1.frames_consistent());
        assert_eq!(tx1.attributes.get("gene_biotype").map(String::as_str), Some("protein_coding"));

        let tx2 = db.get("TX2").unwrap();
        assert_eq!(tx2.strand, Strand::Minus);
        assert!(!tx2.is_coding());
        assert_eq!(tx2.attribute_u64("anticodonB"), Some(540));
    }

    #[test]
    fn test_read_default_missing_column() {
        let result = read_default(Cursor::new("chr\ttrID\tgene\n1\tT\tG\n"));
        assert!(matches!(result, Err(FerroError::Io { .. })));
    }

    #[test]
    fn test_read_ref_flat() {
        let db = read_ref_flat(Cursor::new(REF_FLAT)).unwrap();
        assert_eq!(db.len(), 2);
        let first = db.get("NM_1_1").unwrap();
        assert_eq!(first.tx, (100, 400));
        assert_eq!(first.cds, (130, 350));
        assert_eq!(first.exons[0].start, 100);
        assert_eq!(first.tr_name.as_deref(), Some("NM_1"));
        assert_eq!(first.exons[1].frame, Some(1));
        assert_eq!(db.get("NM_1_2").unwrap().chrom, "2");
    }

    #[test]
    fn test_read_gtf() {
        let db = read_gtf(Cursor::new(GTF)).unwrap();
        assert_eq!(db.len(), 2);

        let t1 = db.get("T1").unwrap();
        assert_eq!(t1.gene, "G1");
        assert_eq!(t1.cds, (130, 349));
        assert_eq!(t1.exons.len(), 3);
        assert_eq!(t1.cds_len() % 3, 0);

        let t2 = db.get("T2").unwrap();
        assert_eq!(t2.gene, "g2");
        assert!(!t2.is_coding());
        assert_eq!(t2.tx, (500, 600));
    }

    #[test]
    fn test_region_queries() {
        let db = read_default(Cursor::new(DEFAULT_TABLE)).unwrap();
        assert_eq!(db.get_by_region("1", 390, 510).len(), 2);
        assert_eq!(db.get_by_region("1", 401, 499).len(), 0);
        assert_eq!(db.overlapping("1", 1, 100)[0].transcript_id, "TX1");
        assert!(db.has_chromosome("1"));
        assert!(!db.has_chromosome("2"));
        assert_eq!(db.get_by_gene("G2").len(), 1);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            GeneModelFormat::detect(DEFAULT_TABLE.lines().next().unwrap()),
            Some(GeneModelFormat::Default)
        );
        assert_eq!(
            GeneModelFormat::detect(REF_FLAT.lines().next().unwrap()),
            Some(GeneModelFormat::RefFlat)
        );
        assert_eq!(
            GeneModelFormat::detect(GTF.lines().nth(1).unwrap()),
            Some(GeneModelFormat::Gtf)
        );
        assert_eq!(GeneModelFormat::detect("hello"), None);
        assert_eq!("GTF".parse::<GeneModelFormat>().unwrap(), GeneModelFormat::Gtf);
        assert!("bed".parse::<GeneModelFormat>().is_err());
    }

    #[test]
    fn test_load_gene_models_detects() {
        for (content, expected) in [(DEFAULT_TABLE, 2), (REF_FLAT, 2), (GTF, 2)] {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(content.as_bytes()).unwrap();
            let db = load_gene_models(file.path()).unwrap();
            assert_eq!(db.len(), expected);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_gene_models("/nonexistent/genes.txt");
        assert!(matches!(result, Err(FerroError::Io { .. })));
    }
}
