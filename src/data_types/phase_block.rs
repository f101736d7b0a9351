use crate::data_types::allele::Allele;

use std::ops::Range;

/// A contiguous, phased range of sites produced by an external phasing tool.
/// Sites that were not phased inside the block are stored as gaps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhaseBlock {
    /// 0-based index of the first site in the block
    start: usize,
    /// one allele per site in `start..start+alleles.len()`
    alleles: Vec<Allele>
}

impl PhaseBlock {
    /// Creates a new phase block
    /// # Arguments
    /// * `start` - 0-based index of the first site
    /// * `alleles` - the phased alleles, gaps for undetermined sites
    pub fn new(start: usize, alleles: Vec<Allele>) -> PhaseBlock {
        PhaseBlock {
            start,
            alleles
        }
    }

    /// Creates a block of the given length where every site is still undetermined
    pub fn unphased(start: usize, length: usize) -> PhaseBlock {
        PhaseBlock::new(start, vec![Allele::Gap; length])
    }

    pub fn get_start(&self) -> usize {
        self.start
    }

    /// Returns the exclusive end of the block
    pub fn get_end(&self) -> usize {
        self.start + self.alleles.len()
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.get_end()
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    /// Returns the number of sites that were actually phased
    pub fn get_num_phased(&self) -> usize {
        self.alleles.iter().filter(|a| a.is_called()).count()
    }

    /// Sets the allele for a global site index
    /// # Panics
    /// * if `site` is outside of the block
    pub fn set_allele(&mut self, site: usize, allele: Allele) {
        assert!(self.range().contains(&site));
        self.alleles[site - self.start] = allele;
    }

    /// Returns true if every site in `span` lies within this block
    pub fn contains(&self, span: &Range<usize>) -> bool {
        span.start >= self.start && span.end <= self.get_end()
    }

    /// Returns the block with every called allele flipped, which is the same diploid phasing
    pub fn complement(&self) -> PhaseBlock {
        PhaseBlock {
            start: self.start,
            alleles: self.alleles.iter().map(|a| a.complement()).collect()
        }
    }
}
