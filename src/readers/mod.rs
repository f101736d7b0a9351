
/// Contains the reader for phased block files (HapCUT-style)
pub mod block_reader;
/// Contains readers for haplotype files and generic allele row files
pub mod haplotype_reader;
/// Contains readers for short and long format fragment matrices
pub mod matrix_reader;

use crate::data_types::haplotype::HaplotypeError;

use flate2::bufread::MultiGzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Everything that can go wrong while loading one of our text inputs
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("failed to open {path:?}: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("failed to read line {line_number}: {source}")]
    Read { line_number: usize, source: std::io::Error },
    #[error("malformed line {line_number} ({line:?}): {kind}")]
    Malformed { line_number: usize, line: String, kind: MalformedKind }
}

impl ParseError {
    fn malformed(line_number: usize, line: &str, kind: MalformedKind) -> ParseError {
        ParseError::Malformed {
            line_number,
            line: line.to_string(),
            kind
        }
    }

    /// Returns the specific shape problem if this was a malformed line
    pub fn malformed_kind(&self) -> Option<&MalformedKind> {
        match self {
            ParseError::Malformed { kind, .. } => Some(kind),
            _ => None
        }
    }
}

/// The specific shape problem with an input line
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum MalformedKind {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("{value:?} is not a non-negative integer")]
    NotAnInteger { value: String },
    #[error("1-based offsets and sites must be at least 1")]
    ZeroIndex,
    #[error("invalid allele character {character:?} at column {column}")]
    AlleleChar { column: usize, character: char },
    #[error("row has width {width}, expected {expected}")]
    Width { width: usize, expected: usize },
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("missing header line")]
    MissingHeader,
    #[error("block marker requires numeric offset and length fields")]
    BlockMarker,
    #[error("block length {length} exceeds the maximum of {max} sites")]
    BlockLength { length: usize, max: usize },
    #[error("site line appears before any block marker")]
    SiteWithoutBlock,
    #[error("site {site} is outside of its block (sites {first}-{last})")]
    SiteOutsideBlock { site: usize, first: usize, last: usize },
    #[error("{0}")]
    Haplotype(#[from] HaplotypeError)
}

/// Determines how offsets and site indices in a text file are counted
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OffsetBase {
    /// Offsets start at 0, as written by our simulators
    #[default]
    Zero,
    /// Offsets start at 1, as in HapCUT-style outputs
    One
}

impl OffsetBase {
    /// Converts an offset from the file into a 0-based offset
    fn to_zero_based(self, value: usize) -> Option<usize> {
        match self {
            OffsetBase::Zero => Some(value),
            OffsetBase::One => value.checked_sub(1)
        }
    }
}

/// The fragment matrix layout
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MatrixFormat {
    /// `<offset>\t<alleles>` per fragment
    Short,
    /// two header lines (height, width) and then one full-width row per fragment
    Long
}

/// Opens a file for buffered line reading, transparently decompressing `.gz` files
/// # Arguments
/// * `filename` - the file to open
/// # Errors
/// * if the file cannot be opened
pub fn open_input(filename: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file: File = File::open(filename).map_err(|source| ParseError::Open {
        path: filename.to_path_buf(),
        source
    })?;
    let file_reader = BufReader::new(file);
    let is_gzip: bool = filename.extension().unwrap_or_default() == "gz";
    if is_gzip {
        debug!("Opening {filename:?} with gzip decompression");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file_reader))))
    } else {
        Ok(Box::new(file_reader))
    }
}

/// Iterates over the lines of a reader, yielding (1-based line number, line) and converting read failures
fn numbered_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String), ParseError>> {
    reader.lines().enumerate().map(|(i, line_result)| {
        let line_number = i + 1;
        line_result
            .map(|line| (line_number, line))
            .map_err(|source| ParseError::Read { line_number, source })
    })
}

/// Parses a non-negative integer field
fn parse_integer(value: &str) -> Result<usize, MalformedKind> {
    value.parse::<usize>().map_err(|_| MalformedKind::NotAnInteger { value: value.to_string() })
}
