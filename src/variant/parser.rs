//! Variant input parsing
//!
//! Three input shapes are accepted:
//! - a location (`chrom:pos` or `chrom:start-end`) with a notation string
//!   (`sub(REF->ALT)`, `ins(SEQ)`, `del(N)`, `CNV+`, `CNV-`)
//! - a chromosome and position with `ref`/`alt` alleles
//! - a chromosome and position with a type (`sub`, `ins`, `del`, `CNV+`,
//!   `CNV-`) plus `seq` or `length`

use crate::error::FerroError;
use crate::reference::SequenceAccessor;
use crate::variant::spec::{VariantKind, VariantSpec};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{char, digit1},
    combinator::all_consuming,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// `chrom:pos` or `chrom:start-end`
static LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:\s]+):(\d+)(?:-(\d+))?$").unwrap());

/// `pos` or `start-end`
static POSITION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(?:-(\d+))?$").unwrap());

/// A parsed variant notation string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notation {
    /// `sub(REF->ALT)`
    Substitution { reference: String, alternate: String },
    /// `ins(SEQ)`
    Insertion(String),
    /// `del(N)`
    Deletion(u64),
    /// `CNV+` (gain) or `CNV-` (loss)
    CopyNumber { gain: bool },
}

fn parse_sequence(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_alphanumeric() || c == '^' || c == '$').parse(input)
}

fn parse_substitution(input: &str) -> IResult<&str, Notation> {
    let (input, _) = tag_no_case("sub").parse(input)?;
    let (input, (reference, alternate)) = delimited(
        char('('),
        separated_pair(parse_sequence, tag("->"), parse_sequence),
        char(')'),
    )
    .parse(input)?;
    Ok((
        input,
        Notation::Substitution {
            reference: reference.to_string(),
            alternate: alternate.to_string(),
        },
    ))
}

fn parse_insertion(input: &str) -> IResult<&str, Notation> {
    let (input, _) = tag_no_case("ins").parse(input)?;
    let (input, seq) = delimited(char('('), parse_sequence, char(')')).parse(input)?;
    Ok((input, Notation::Insertion(seq.to_string())))
}

fn parse_deletion(input: &str) -> IResult<&str, Notation> {
    let (input, _) = tag_no_case("del").parse(input)?;
    let (remaining, digits) = delimited(char('('), digit1, char(')')).parse(input)?;
    let length: u64 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((remaining, Notation::Deletion(length)))
}

fn parse_copy_number(input: &str) -> IResult<&str, Notation> {
    let (input, (_, sign)) = (tag_no_case("cnv"), alt((char('+'), char('-')))).parse(input)?;
    Ok((input, Notation::CopyNumber { gain: sign == '+' }))
}

/// Parse a variant notation string such as `sub(A->G)` or `del(3)`
pub fn parse_notation(var: &str) -> Result<Notation, FerroError> {
    all_consuming(alt((
        parse_substitution,
        parse_insertion,
        parse_deletion,
        parse_copy_number,
    )))
    .parse(var.trim())
    .map(|(_, notation)| notation)
    .map_err(|_| FerroError::malformed(format!("unrecognized variant notation '{}'", var)))
}

/// Parse a `chrom:pos` or `chrom:start-end` location
pub fn parse_location(loc: &str) -> Result<(String, u64, Option<u64>), FerroError> {
    let caps = LOCATION_PATTERN
        .captures(loc.trim())
        .ok_or_else(|| FerroError::malformed(format!("invalid location '{}'", loc)))?;
    let start = parse_number(&caps[2])?;
    let end = caps.get(3).map(|m| parse_number(m.as_str())).transpose()?;
    Ok((caps[1].to_string(), start, end))
}

fn parse_position(position: &str) -> Result<(u64, Option<u64>), FerroError> {
    let caps = POSITION_PATTERN
        .captures(position.trim())
        .ok_or_else(|| FerroError::malformed(format!("invalid position '{}'", position)))?;
    let start = parse_number(&caps[1])?;
    let end = caps.get(2).map(|m| parse_number(m.as_str())).transpose()?;
    Ok((start, end))
}

/// Largest accepted position or length, far beyond any real chromosome
pub const MAX_POSITION: u64 = 1 << 40;

fn parse_number(s: &str) -> Result<u64, FerroError> {
    match s.parse::<u64>() {
        Ok(0) => Err(FerroError::malformed("positions are 1-based")),
        Ok(n) if n > MAX_POSITION => Err(FerroError::InvalidCoordinates {
            msg: format!("position {} is out of range", n),
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(FerroError::malformed(format!("invalid number '{}'", s))),
    }
}

/// Legacy allele encoding with `^`/`$` markers; the sequence is unknown
fn is_legacy_allele(seq: &str) -> bool {
    seq.contains('^') || seq.contains('$')
}

fn check_bases(seq: &str) -> Result<(), FerroError> {
    match seq
        .chars()
        .find(|c| !matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N'))
    {
        Some(c) => Err(FerroError::malformed(format!(
            "invalid base '{}' in '{}'",
            c, seq
        ))),
        None => Ok(()),
    }
}

/// Caller-supplied variant fields
///
/// # Example
///
/// ```
/// use ferro_effect::reference::MockProvider;
/// use ferro_effect::variant::{VariantInput, VariantKind};
///
/// let genome = MockProvider::with_test_data();
/// let spec = VariantInput::new()
///     .loc("1:65")
///     .var("del(3)")
///     .parse(&genome)
///     .unwrap();
/// assert_eq!(spec.kind, VariantKind::Deletion);
/// assert_eq!(spec.pos_last, 67);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantInput {
    pub loc: Option<String>,
    pub var: Option<String>,
    pub chrom: Option<String>,
    pub position: Option<String>,
    pub reference: Option<String>,
    pub alternate: Option<String>,
    pub length: Option<u64>,
    pub seq: Option<String>,
    pub typ: Option<String>,
}

impl VariantInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a chromosome/position/ref/alt input
    pub fn alleles(chrom: &str, position: u64, reference: &str, alternate: &str) -> Self {
        Self::new()
            .chrom(chrom)
            .position(position)
            .reference(reference)
            .alternate(alternate)
    }

    pub fn loc(mut self, loc: impl Into<String>) -> Self {
        self.loc = Some(loc.into());
        self
    }

    pub fn var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    pub fn chrom(mut self, chrom: impl Into<String>) -> Self {
        self.chrom = Some(chrom.into());
        self
    }

    /// Position as `pos` or `start-end`
    pub fn position(mut self, position: impl ToString) -> Self {
        self.position = Some(position.to_string());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternate = Some(alternate.into());
        self
    }

    pub fn length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn seq(mut self, seq: impl Into<String>) -> Self {
        self.seq = Some(seq.into());
        self
    }

    pub fn typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// Turn the fields into a [`VariantSpec`]
    ///
    /// The genome is read only when a substitution comes without its
    /// reference allele.
    pub fn parse<S: SequenceAccessor + ?Sized>(
        &self,
        genome: &S,
    ) -> Result<VariantSpec, FerroError> {
        let (chrom, start, end) = self.location()?;

        if let Some(var) = &self.var {
            return match parse_notation(var)? {
                Notation::Substitution {
                    reference,
                    alternate,
                } => allele_variant(chrom, start, Some(reference), &alternate, genome),
                Notation::Insertion(seq) => insertion_variant(chrom, start, &seq),
                Notation::Deletion(length) => deletion_variant(chrom, start, length),
                Notation::CopyNumber { gain } => cnv_variant(chrom, start, end, self.length, gain),
            };
        }

        if let Some(alternate) = &self.alternate {
            return allele_variant(chrom, start, self.reference.clone(), alternate, genome);
        }

        let typ = self
            .typ
            .as_deref()
            .ok_or_else(|| FerroError::malformed("variant type is missing"))?;
        match parse_type(typ)? {
            VariantKind::Substitution => {
                let seq = self.required_seq()?;
                allele_variant(chrom, start, self.reference.clone(), seq, genome)
            }
            VariantKind::Insertion => insertion_variant(chrom, start, self.required_seq()?),
            VariantKind::Deletion => {
                let length = self
                    .length
                    .ok_or_else(|| FerroError::malformed("deletion length is missing"))?;
                deletion_variant(chrom, start, length)
            }
            VariantKind::CopyNumberGain => cnv_variant(chrom, start, end, self.length, true),
            VariantKind::CopyNumberLoss => cnv_variant(chrom, start, end, self.length, false),
        }
    }

    fn location(&self) -> Result<(String, u64, Option<u64>), FerroError> {
        match (&self.chrom, &self.loc) {
            (Some(chrom), _) => {
                let position = self
                    .position
                    .as_deref()
                    .ok_or_else(|| FerroError::malformed("variant position is missing"))?;
                let (start, end) = parse_position(position)?;
                Ok((chrom.clone(), start, end))
            }
            (None, Some(loc)) => parse_location(loc),
            (None, None) => Err(FerroError::malformed("variant location is missing")),
        }
    }

    fn required_seq(&self) -> Result<&str, FerroError> {
        self.seq
            .as_deref()
            .ok_or_else(|| FerroError::malformed("variant sequence is missing"))
    }
}

fn parse_type(typ: &str) -> Result<VariantKind, FerroError> {
    let lowered = typ.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "sub" | "substitution" => Ok(VariantKind::Substitution),
        "ins" | "insertion" => Ok(VariantKind::Insertion),
        "del" | "deletion" => Ok(VariantKind::Deletion),
        "cnv+" => Ok(VariantKind::CopyNumberGain),
        "cnv-" => Ok(VariantKind::CopyNumberLoss),
        _ => Err(FerroError::malformed(format!("unknown variant type '{}'", typ))),
    }
}

fn allele_variant<S: SequenceAccessor + ?Sized>(
    chrom: String,
    pos: u64,
    reference: Option<String>,
    alternate: &str,
    genome: &S,
) -> Result<VariantSpec, FerroError> {
    if is_legacy_allele(alternate) {
        log::warn!(
            "legacy allele '{}' at {}:{}; sequence treated as unknown",
            alternate,
            chrom,
            pos
        );
        let reference = reference.map(|r| r.to_ascii_uppercase());
        let length = reference
            .as_ref()
            .map_or(1, |r| r.len().max(1) as u64);
        return Ok(VariantSpec {
            chrom,
            pos,
            pos_last: pos + length - 1,
            kind: VariantKind::Substitution,
            reference,
            alternate: None,
            length,
        });
    }
    check_bases(alternate)?;

    let reference = match reference {
        Some(reference) => reference,
        None => {
            let end = pos + alternate.len().max(1) as u64 - 1;
            log::debug!("reading reference allele at {}:{}-{}", chrom, pos, end);
            genome.get(&chrom, pos, end)?
        }
    };
    check_bases(&reference)?;
    if reference.is_empty() && alternate.is_empty() {
        return Err(FerroError::malformed("both alleles are empty"));
    }

    Ok(VariantSpec::from_alleles(chrom, pos, &reference, alternate))
}

fn insertion_variant(chrom: String, pos: u64, seq: &str) -> Result<VariantSpec, FerroError> {
    let bases: String = seq.chars().filter(|c| !c.is_ascii_digit()).collect();
    if bases.is_empty() {
        return Err(FerroError::malformed("insertion sequence is missing"));
    }
    if is_legacy_allele(&bases) {
        log::warn!(
            "legacy insertion '{}' at {}:{}; sequence treated as unknown",
            bases,
            chrom,
            pos
        );
        let length = bases.chars().filter(|c| *c != '^' && *c != '$').count() as u64;
        return Ok(VariantSpec {
            alternate: None,
            length,
            ..VariantSpec::insertion(chrom, pos, "")
        });
    }
    check_bases(&bases)?;
    Ok(VariantSpec::insertion(chrom, pos, &bases))
}

fn deletion_variant(chrom: String, pos: u64, length: u64) -> Result<VariantSpec, FerroError> {
    if length == 0 {
        return Err(FerroError::malformed("deletion length must be positive"));
    }
    if length > MAX_POSITION {
        return Err(FerroError::InvalidCoordinates {
            msg: format!("deletion length {} is out of range", length),
        });
    }
    Ok(VariantSpec::deletion(chrom, pos, length))
}

fn cnv_variant(
    chrom: String,
    start: u64,
    end: Option<u64>,
    length: Option<u64>,
    gain: bool,
) -> Result<VariantSpec, FerroError> {
    let end = match (end, length) {
        (Some(end), _) => end,
        (None, Some(length)) if length > 0 && length <= MAX_POSITION => start + length - 1,
        _ => {
            return Err(FerroError::malformed(
                "copy-number variant needs an end position or a length",
            ))
        }
    };
    if end < start {
        return Err(FerroError::InvalidCoordinates {
            msg: format!("CNV end {} is before start {}", end, start),
        });
    }
    Ok(VariantSpec::cnv(chrom, start, end, gain))
}
