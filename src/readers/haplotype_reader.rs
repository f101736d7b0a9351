use crate::data_types::allele::{Allele, parse_alleles};
use crate::data_types::haplotype::{Haplotype, HaplotypeSet};
use crate::readers::{MalformedKind, ParseError, numbered_lines, open_input};

use std::io::BufRead;
use std::path::Path;

/// A single row of alleles along with the line it came from
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlleleRow {
    pub line_number: usize,
    pub alleles: Vec<Allele>
}

/// Loads rows of alleles, split into groups wherever one or more blank lines occur.
/// Whitespace inside a row is ignored, so both `0101` and `0 1 0 1` are accepted.
/// # Arguments
/// * `reader` - the source of lines
/// # Errors
/// * if any row contains characters outside of `0`, `1`, `-`
pub fn read_allele_groups<R: BufRead>(reader: R) -> Result<Vec<Vec<AlleleRow>>, ParseError> {
    let mut groups: Vec<Vec<AlleleRow>> = vec![];
    let mut current_group: Vec<AlleleRow> = vec![];
    for line_result in numbered_lines(reader) {
        let (line_number, line) = line_result?;
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            if !current_group.is_empty() {
                groups.push(std::mem::take(&mut current_group));
            }
            continue;
        }

        let alleles = parse_alleles(&compact)
            .map_err(|(column, character)| ParseError::malformed(line_number, &line, MalformedKind::AlleleChar { column, character }))?;
        current_group.push(AlleleRow { line_number, alleles });
    }
    if !current_group.is_empty() {
        groups.push(current_group);
    }
    Ok(groups)
}

/// Loads every allele row of a file, ignoring blank lines
pub fn read_allele_rows<R: BufRead>(reader: R) -> Result<Vec<AlleleRow>, ParseError> {
    Ok(read_allele_groups(reader)?.into_iter().flatten().collect())
}

/// Loads a haplotype file (one `0`/`1` string per line) into a validated haplotype set
/// # Errors
/// * if a row contains a gap or a bad character
/// * if the rows do not all have the same width, or there are no rows at all
pub fn read_haplotype_set<R: BufRead>(reader: R) -> Result<HaplotypeSet, ParseError> {
    let rows: Vec<AlleleRow> = read_allele_rows(reader)?;
    let mut haplotypes: Vec<Haplotype> = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let haplotype = Haplotype::new(row.alleles.clone())
            .map_err(|e| ParseError::malformed(row.line_number, "", MalformedKind::from(e)))?;
        if let Some(first) = haplotypes.first() {
            if first.width() != haplotype.width() {
                return Err(ParseError::malformed(row.line_number, "", MalformedKind::Width {
                    width: haplotype.width(),
                    expected: first.width()
                }));
            }
        }
        haplotypes.push(haplotype);
    }
    let last_line: usize = rows.last().map(|r| r.line_number).unwrap_or(0);
    HaplotypeSet::new(haplotypes)
        .map_err(|e| ParseError::malformed(last_line, "", MalformedKind::from(e)))
}

/// Loads a haplotype set from a file; `.gz` files are decompressed
pub fn load_haplotype_set(filename: &Path) -> Result<HaplotypeSet, ParseError> {
    let reader = open_input(filename)?;
    read_haplotype_set(reader)
}

/// Loads allele row groups from a file; `.gz` files are decompressed
pub fn load_allele_groups(filename: &Path) -> Result<Vec<Vec<AlleleRow>>, ParseError> {
    let reader = open_input(filename)?;
    read_allele_groups(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::haplotype::HaplotypeError;

    #[test]
    fn test_read_haplotype_set() {
        let set = read_haplotype_set("0110\n1001\n".as_bytes()).unwrap();
        assert_eq!(set.ploidy(), 2);
        assert_eq!(set.haplotypes()[1].to_string(), "1001");

        let err = read_haplotype_set("0110\n10-1\n".as_bytes()).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(&MalformedKind::Haplotype(HaplotypeError::GapInHaplotype { site: 2 })));

        let err = read_haplotype_set("0110\n101\n".as_bytes()).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(&MalformedKind::Width { width: 3, expected: 4 }));

        let err = read_haplotype_set("\n".as_bytes()).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(&MalformedKind::Haplotype(HaplotypeError::EmptySet)));
    }

    #[test]
    fn test_read_allele_groups() {
        let data = "0 1 1\n1 0 -\n\n\n0 1 1\n1 0 0\n";
        let groups = read_allele_groups(data.as_bytes()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][1].alleles, parse_alleles("10-").unwrap());
        assert_eq!(groups[1][0].line_number, 5);
    }
}
