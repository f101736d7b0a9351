use crate::data_types::allele::{Allele, parse_alleles};
use crate::data_types::fragment::{Fragment, FragmentMatrix};
use crate::readers::{MalformedKind, MatrixFormat, OffsetBase, ParseError, numbered_lines, open_input, parse_integer};

use log::debug;
use std::io::BufRead;
use std::path::Path;

/// Converts an allele string into alleles, reporting the bad column on failure
fn parse_allele_field(value: &str) -> Result<Vec<Allele>, MalformedKind> {
    parse_alleles(value).map_err(|(column, character)| MalformedKind::AlleleChar { column, character })
}

/// Loads a short format fragment matrix: one `<offset>\t<alleles>` line per fragment.
/// Blank lines are skipped.
/// # Arguments
/// * `reader` - the source of lines
/// * `offset_base` - whether offsets in the file are 0- or 1-based
/// # Errors
/// * if a line does not have exactly two fields
/// * if the offset is not a valid integer (or is 0 for 1-based input)
/// * if the allele string has characters outside of `0`, `1`, `-`
pub fn read_short_matrix<R: BufRead>(reader: R, offset_base: OffsetBase) -> Result<FragmentMatrix, ParseError> {
    let mut fragments: Vec<Fragment> = vec![];
    for line_result in numbered_lines(reader) {
        let (line_number, line) = line_result?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 2 {
            return Err(ParseError::malformed(line_number, &line, MalformedKind::FieldCount { expected: 2, found: fields.len() }));
        }

        let raw_offset: usize = parse_integer(fields[0])
            .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
        let offset: usize = offset_base.to_zero_based(raw_offset)
            .ok_or_else(|| ParseError::malformed(line_number, &line, MalformedKind::ZeroIndex))?;
        let alleles = parse_allele_field(fields[1])
            .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
        fragments.push(Fragment::new(offset, alleles));
    }
    debug!("Loaded {} fragments from short format matrix", fragments.len());
    Ok(FragmentMatrix::new(fragments, None))
}

/// Loads a long format fragment matrix: a `height` line, a `width` line, then `height` full-width rows.
/// Each row is reduced to the fragment between its first and last called allele.
/// # Arguments
/// * `reader` - the source of lines
/// # Errors
/// * if either header line is missing or not an integer
/// * if a row does not have exactly `width` characters or contains a bad allele
/// * if the number of rows does not match `height`
pub fn read_long_matrix<R: BufRead>(reader: R) -> Result<FragmentMatrix, ParseError> {
    let mut height: Option<usize> = None;
    let mut width: Option<usize> = None;
    let mut fragments: Vec<Fragment> = vec![];
    let mut last_line_number: usize = 0;

    for line_result in numbered_lines(reader) {
        let (line_number, line) = line_result?;
        last_line_number = line_number;
        let value: &str = line.trim();
        if value.is_empty() {
            continue;
        }

        if height.is_none() || width.is_none() {
            let parsed: usize = parse_integer(value)
                .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
            if height.is_none() {
                height = Some(parsed);
            } else {
                width = Some(parsed);
            }
            continue;
        }

        let expected: usize = width.unwrap_or_default();
        let row = parse_allele_field(value)
            .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
        if row.len() != expected {
            return Err(ParseError::malformed(line_number, &line, MalformedKind::Width { width: row.len(), expected }));
        }
        fragments.push(Fragment::from_row(&row));
    }

    let (height, width) = match (height, width) {
        (Some(h), Some(w)) => (h, w),
        _ => return Err(ParseError::malformed(last_line_number, "", MalformedKind::MissingHeader))
    };
    if fragments.len() != height {
        return Err(ParseError::malformed(last_line_number, "", MalformedKind::RowCount { expected: height, found: fragments.len() }));
    }
    debug!("Loaded {height}x{width} long format matrix");
    Ok(FragmentMatrix::new(fragments, Some(width)))
}

/// Loads a fragment matrix from a file in the given format; `.gz` files are decompressed
/// # Arguments
/// * `filename` - the file to load
/// * `format` - short or long layout
/// * `offset_base` - only used for short format, long format rows are always positional
pub fn load_fragment_matrix(filename: &Path, format: MatrixFormat, offset_base: OffsetBase) -> Result<FragmentMatrix, ParseError> {
    let reader = open_input(filename)?;
    match format {
        MatrixFormat::Short => read_short_matrix(reader, offset_base),
        MatrixFormat::Long => read_long_matrix(reader)
    }
}
