use crate::data_types::allele::{Allele, alleles_to_string};

use std::ops::Range;

/// Container for the alleles observed by a single read (or read pair), anchored at a site offset
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fragment {
    /// the first site covered by `alleles`, always 0-based internally
    offset: usize,
    /// the observed alleles; gaps are allowed anywhere, including the ends
    alleles: Vec<Allele>
}

impl Fragment {
    /// Creates a new fragment from an offset and the observed alleles.
    /// # Arguments
    /// * `offset` - 0-based index of the first site in `alleles`
    /// * `alleles` - the observations, may contain gaps
    pub fn new(offset: usize, alleles: Vec<Allele>) -> Fragment {
        Fragment {
            offset,
            alleles
        }
    }

    /// Builds a fragment from a full-width row, where anything outside the first and last called allele is dropped.
    /// Rows without any calls become an empty fragment at offset 0.
    /// # Arguments
    /// * `row` - the full-width allele row (e.g. from a long format matrix)
    pub fn from_row(row: &[Allele]) -> Fragment {
        let first_allele = row.iter().position(|a| a.is_called());
        match first_allele {
            Some(first) => {
                let last = row.iter().rposition(|a| a.is_called()).unwrap_or(first) + 1;
                Fragment::new(first, row[first..last].to_vec())
            },
            None => Fragment::new(0, vec![])
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    /// Returns the site range covered by this fragment
    pub fn span(&self) -> Range<usize> {
        self.offset..(self.offset + self.alleles.len())
    }

    /// Returns the allele for the given global site index, sites outside the span are gaps
    pub fn allele(&self, site: usize) -> Allele {
        if self.span().contains(&site) {
            self.alleles[site - self.offset]
        } else {
            Allele::Gap
        }
    }

    /// Returns the number of alleles that are called (i.e. 0 or 1)
    pub fn num_called(&self) -> usize {
        self.alleles.iter()
            .filter(|a| a.is_called())
            .count()
    }

    /// Returns the number of gaps inside the span
    pub fn num_gaps(&self) -> usize {
        self.alleles.len() - self.num_called()
    }

    /// Counts the sites where both this fragment and the given alleles are called and disagree.
    /// `alleles[0]` is aligned to global site `alleles_offset`.
    /// # Arguments
    /// * `alleles` - the alleles to compare against, typically a phase block or haplotype
    /// * `alleles_offset` - the global site of `alleles[0]`
    /// # Panics
    /// * if the fragment span is not fully contained in the compared alleles
    pub fn count_mismatches(&self, alleles: &[Allele], alleles_offset: usize) -> usize {
        assert!(self.offset >= alleles_offset && self.span().end <= alleles_offset + alleles.len());
        let shift = self.offset - alleles_offset;
        self.alleles.iter().enumerate()
            .filter(|&(i, &a)| a.mismatches(alleles[shift + i]))
            .count()
    }

    /// Renders the fragment across the full matrix width, padding with gaps on both sides
    /// # Panics
    /// * if the fragment does not fit within `width`
    pub fn to_row_string(&self, width: usize) -> String {
        assert!(self.span().end <= width);
        let mut row = String::with_capacity(width);
        row.extend(std::iter::repeat(Allele::GAP_CHAR).take(self.offset));
        row.push_str(&alleles_to_string(&self.alleles));
        row.extend(std::iter::repeat(Allele::GAP_CHAR).take(width - self.span().end));
        row
    }
}

/// An ordered collection of fragments; order only matters for reproducible output
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FragmentMatrix {
    fragments: Vec<Fragment>,
    /// the number of sites, if known (e.g. from a long format header)
    width: Option<usize>
}

impl FragmentMatrix {
    pub fn new(fragments: Vec<Fragment>, width: Option<usize>) -> FragmentMatrix {
        FragmentMatrix {
            fragments,
            width
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn height(&self) -> usize {
        self.fragments.len()
    }

    /// Returns the declared width, or the furthest fragment end if none was declared
    pub fn width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            self.fragments.iter()
                .map(|f| f.span().end)
                .max()
                .unwrap_or(0)
        })
    }

    /// Returns the index of the first fragment extending past `width`, if any
    pub fn first_out_of_bounds(&self, width: usize) -> Option<usize> {
        self.fragments.iter().position(|f| f.span().end > width)
    }

    /// Total number of called entries in the matrix
    pub fn num_called(&self) -> usize {
        self.fragments.iter().map(|f| f.num_called()).sum()
    }

    /// Total number of gap entries inside fragment spans
    pub fn num_gaps(&self) -> usize {
        self.fragments.iter().map(|f| f.num_gaps()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::allele::parse_alleles;

    #[test]
    fn test_from_row() {
        let fragment = Fragment::from_row(&parse_alleles("--01-1---").unwrap());
        assert_eq!(fragment, Fragment::new(2, parse_alleles("01-1").unwrap()));
        assert_eq!(fragment.span(), 2..6);
        assert_eq!(fragment.num_called(), 3);
        assert_eq!(fragment.num_gaps(), 1);
        assert_eq!(fragment.to_row_string(9), "--01-1---");

        let empty = Fragment::from_row(&parse_alleles("----").unwrap());
        assert!(empty.is_empty());
        assert_eq!(empty.to_row_string(4), "----");
    }

    #[test]
    fn test_allele() {
        let fragment = Fragment::new(3, parse_alleles("10").unwrap());
        assert_eq!(fragment.allele(0), Allele::Gap);
        assert_eq!(fragment.allele(3), Allele::One);
        assert_eq!(fragment.allele(4), Allele::Zero);
        assert_eq!(fragment.allele(5), Allele::Gap);
    }

    #[test]
    fn test_count_mismatches() {
        let fragment = Fragment::new(2, parse_alleles("01-1").unwrap());
        let block = parse_alleles("1011-0").unwrap();
        // block[2..6] = "11-0" vs "01-1"; gap on both sides is ignored
        assert_eq!(fragment.count_mismatches(&block, 0), 2);

        // same comparison but with the block anchored at site 1
        let block = parse_alleles("011-0").unwrap();
        assert_eq!(fragment.count_mismatches(&block, 1), 2);
    }

    #[test]
    fn test_matrix_width() {
        let matrix = FragmentMatrix::new(vec![
            Fragment::new(0, parse_alleles("01").unwrap()),
            Fragment::new(4, parse_alleles("1-1").unwrap())
        ], None);
        assert_eq!(matrix.width(), 7);
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.num_called(), 4);
        assert_eq!(matrix.num_gaps(), 1);
        assert_eq!(matrix.first_out_of_bounds(7), None);
        assert_eq!(matrix.first_out_of_bounds(6), Some(1));
    }
}
