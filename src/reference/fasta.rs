//! Indexed FASTA genome
//!
//! Random access to a reference genome stored as plain FASTA, using the
//! `.fai` index next to the file or an index built by scanning it once.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::FerroError;
use crate::reference::provider::SequenceAccessor;

/// Index entry for a sequence in a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
struct FastaIndexEntry {
    /// Sequence name
    name: String,
    /// Length of the sequence
    length: u64,
    /// Byte offset to the start of sequence data
    offset: u64,
    /// Number of bases per line
    line_bases: u64,
    /// Number of bytes per line (including newline)
    line_bytes: u64,
}

/// Genome backed by an indexed FASTA file
///
/// Chromosome names resolve through explicit aliases first, then by adding
/// or removing a `chr` prefix, so `"1"` finds `chr1` and `"chrM"` finds `MT`.
#[derive(Debug)]
pub struct FastaAccessor {
    /// Path to the FASTA file
    path: PathBuf,
    /// Index of sequences
    index: HashMap<String, FastaIndexEntry>,
    /// Chromosome name aliases
    aliases: HashMap<String, String>,
}

impl FastaAccessor {
    /// Open a FASTA file
    ///
    /// Looks for `<file>.fai`; when absent the index is built by scanning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The file is gzip-compressed (not supported)
    /// - The `.fai` index is malformed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let path = path.as_ref().to_path_buf();

        if is_gzip_file(&path)? {
            return Err(FerroError::Io {
                msg: format!(
                    "FASTA file appears to be gzip-compressed: {}; decompress it first",
                    path.display()
                ),
            });
        }

        let fai_path = PathBuf::from(format!("{}.fai", path.display()));
        let index = if fai_path.exists() {
            log::debug!("using FASTA index {}", fai_path.display());
            load_fai_index(&fai_path)?
        } else {
            log::debug!("no .fai for {}, scanning", path.display());
            build_fasta_index(&path)?
        };

        let mut aliases = HashMap::new();
        for (alias, canonical) in [("chrM", "MT"), ("MT", "chrM"), ("M", "MT")] {
            aliases.insert(alias.to_string(), canonical.to_string());
        }

        Ok(Self {
            path,
            index,
            aliases,
        })
    }

    /// Add a chromosome alias
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_string(), canonical.to_string());
    }

    /// Resolve a chromosome name to the name used in the file
    fn resolve_name(&self, name: &str) -> Option<&FastaIndexEntry> {
        if let Some(entry) = self.index.get(name) {
            return Some(entry);
        }
        if let Some(entry) = self.aliases.get(name).and_then(|c| self.index.get(c)) {
            return Some(entry);
        }
        let alt_name = match name.strip_prefix("chr") {
            Some(bare) => bare.to_string(),
            None => format!("chr{}", name),
        };
        self.index.get(&alt_name)
    }

    fn read_range(
        &self,
        entry: &FastaIndexEntry,
        start: u64,
        end: u64,
    ) -> Result<String, FerroError> {
        // 0-based offsets into the sequence
        let first = start - 1;
        let seq_len = end - first;

        let line_start = first / entry.line_bases;
        let byte_offset = first % entry.line_bases;
        let file_offset = entry.offset + line_start * entry.line_bytes + byte_offset;

        let num_lines = (seq_len + byte_offset).div_ceil(entry.line_bases);
        let newline_bytes = entry.line_bytes - entry.line_bases;
        let bytes_to_read = seq_len + num_lines * newline_bytes;

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(file_offset))?;

        let mut buffer = Vec::with_capacity(bytes_to_read as usize);
        file.take(bytes_to_read).read_to_end(&mut buffer)?;

        let sequence: String = buffer
            .iter()
            .filter(|&&b| b != b'\n' && b != b'\r')
            .take(seq_len as usize)
            .map(|&b| b.to_ascii_uppercase() as char)
            .collect();
        Ok(sequence)
    }

    /// Get all sequence names
    pub fn sequence_names(&self) -> impl Iterator<Item = &String> {
        self.index.keys()
    }
}

impl SequenceAccessor for FastaAccessor {
    fn get(&self, chrom: &str, start: u64, end: u64) -> Result<String, FerroError> {
        if end < start {
            return Ok(String::new());
        }
        let entry = self
            .resolve_name(chrom)
            .ok_or_else(|| FerroError::sequence_access(chrom, start, end, "unknown chromosome"))?;
        if start == 0 || end > entry.length {
            return Err(FerroError::sequence_access(
                chrom,
                start,
                end,
                format!("outside {} of length {}", entry.name, entry.length),
            ));
        }
        self.read_range(entry, start, end)
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        self.resolve_name(chrom).is_some()
    }

    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.resolve_name(chrom).map(|e| e.length)
    }
}

fn fai_field(fields: &[&str], i: usize, what: &str, name: &str) -> Result<u64, FerroError> {
    fields[i].parse().map_err(|_| FerroError::Io {
        msg: format!("Invalid {} '{}' in FAI for sequence '{}'", what, fields[i], name),
    })
}

/// Load a FASTA index (.fai) file
fn load_fai_index(path: &Path) -> Result<HashMap<String, FastaIndexEntry>, FerroError> {
    let reader = BufReader::new(File::open(path)?);
    let mut index = HashMap::new();

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            continue;
        }

        let name = fields[0].to_string();
        let entry = FastaIndexEntry {
            length: fai_field(&fields, 1, "length", &name)?,
            offset: fai_field(&fields, 2, "offset", &name)?,
            line_bases: fai_field(&fields, 3, "line_bases", &name)?,
            line_bytes: fai_field(&fields, 4, "line_bytes", &name)?,
            name: name.clone(),
        };
        if entry.line_bases == 0 || entry.line_bytes < entry.line_bases {
            return Err(FerroError::Io {
                msg: format!(
                    "Invalid FAI entry for '{}': line_bases={}, line_bytes={}",
                    name, entry.line_bases, entry.line_bytes
                ),
            });
        }
        index.insert(name, entry);
    }

    Ok(index)
}

/// Build a FASTA index by scanning the file
fn build_fasta_index(path: &Path) -> Result<HashMap<String, FastaIndexEntry>, FerroError> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut index = HashMap::new();
    let mut current: Option<FastaIndexEntry> = None;
    let mut byte_position = 0u64;

    let mut line = String::new();
    loop {
        let line_start = byte_position;
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        byte_position += bytes_read as u64;

        if let Some(header) = line.strip_prefix('>') {
            if let Some(entry) = current.take() {
                index.insert(entry.name.clone(), entry);
            }
            let name = header.split_whitespace().next().unwrap_or("").to_string();
            current = Some(FastaIndexEntry {
                name,
                length: 0,
                offset: byte_position,
                line_bases: 0,
                line_bytes: 0,
            });
        } else if let Some(entry) = current.as_mut() {
            let seq_len = line.trim_end().len() as u64;
            if entry.line_bases == 0 && seq_len > 0 {
                entry.offset = line_start;
                entry.line_bases = seq_len;
                entry.line_bytes = bytes_read as u64;
            }
            entry.length += seq_len;
        }
    }

    if let Some(entry) = current {
        index.insert(entry.name.clone(), entry);
    }

    // Empty records cannot be read from.
    index.retain(|_, e| e.line_bases > 0);
    Ok(index)
}

/// Check if a file is gzip-compressed by reading its magic bytes
fn is_gzip_file(path: &Path) -> Result<bool, FerroError> {
    let mut file = File::open(path).map_err(|e| FerroError::Io {
        msg: format!("Failed to open FASTA file {}: {}", path.display(), e),
    })?;

    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_fasta(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("genome.fa");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const FASTA: &str = ">chr1 test\nACGTACGTAC\nGTACGTACGT\nAC\n>MT\nattaggcc\n";

    #[test]
    fn test_build_fasta_index() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let index = build_fasta_index(&path).unwrap();
        let chr1 = &index["chr1"];
        assert_eq!(chr1.length, 22);
        assert_eq!(chr1.offset, 11);
        assert_eq!(chr1.line_bases, 10);
        assert_eq!(chr1.line_bytes, 11);
        assert_eq!(index["MT"].length, 8);
    }

    #[test]
    fn test_get_across_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let fasta = FastaAccessor::new(&path).unwrap();
        assert_eq!(fasta.get("chr1", 1, 4).unwrap(), "ACGT");
        assert_eq!(fasta.get("chr1", 9, 12).unwrap(), "ACGT");
        assert_eq!(fasta.get("chr1", 21, 22).unwrap(), "AC");
        assert_eq!(fasta.get("chr1", 5, 4).unwrap(), "");
    }

    #[test]
    fn test_name_resolution() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let fasta = FastaAccessor::new(&path).unwrap();
        assert_eq!(fasta.get("1", 1, 2).unwrap(), "AC");
        assert_eq!(fasta.get("chrM", 1, 4).unwrap(), "ATTA");
        assert!(fasta.has_chromosome("M"));
        assert!(!fasta.has_chromosome("2"));
        assert_eq!(fasta.chromosome_length("1"), Some(22));
    }

    #[test]
    fn test_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let fasta = FastaAccessor::new(&path).unwrap();
        assert!(matches!(
            fasta.get("chr1", 20, 23),
            Err(FerroError::SequenceAccess { .. })
        ));
        assert!(fasta.get("chr9", 1, 1).is_err());
    }

    #[test]
    fn test_uses_fai() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let mut fai = File::create(dir.path().join("genome.fa.fai")).unwrap();
        fai.write_all(b"chr1\t22\t11\t10\t11\nMT\t8\t40\t8\t9\n").unwrap();
        let fasta = FastaAccessor::new(&path).unwrap();
        assert_eq!(fasta.get("MT", 5, 8).unwrap(), "GGCC");
        assert_eq!(fasta.get("chr1", 10, 11).unwrap(), "CG");
    }

    #[test]
    fn test_invalid_fai() {
        let dir = TempDir::new().unwrap();
        let path = write_fasta(&dir, FASTA);
        let mut fai = File::create(dir.path().join("genome.fa.fai")).unwrap();
        fai.write_all(b"chr1\t22\t11\t0\t11\n").unwrap();
        assert!(matches!(
            FastaAccessor::new(&path),
            Err(FerroError::Io { .. })
        ));
    }

    #[test]
    fn test_gzip_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genome.fa.gz");
        File::create(&path)
            .unwrap()
            .write_all(&[0x1f, 0x8b, 0x08, 0x00])
            .unwrap();
        assert!(FastaAccessor::new(&path).is_err());
    }
}
