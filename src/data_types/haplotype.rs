use crate::data_types::allele::Allele;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum HaplotypeError {
    #[error("haplotype contains a gap at site {site}")]
    GapInHaplotype { site: usize },
    #[error("haplotype set must contain at least one haplotype")]
    EmptySet,
    #[error("haplotype {index} has width {width}, expected {expected}")]
    WidthMismatch { index: usize, width: usize, expected: usize }
}

/// A fully called sequence of alleles, one per site
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Haplotype {
    alleles: Vec<Allele>
}

impl Haplotype {
    /// Creates a new haplotype, which must not contain any gaps
    /// # Arguments
    /// * `alleles` - the called alleles for every site
    /// # Errors
    /// * if any of the alleles is a gap
    pub fn new(alleles: Vec<Allele>) -> Result<Haplotype, HaplotypeError> {
        if let Some(site) = alleles.iter().position(|a| !a.is_called()) {
            return Err(HaplotypeError::GapInHaplotype { site });
        }
        Ok(Haplotype { alleles })
    }

    /// Builds a haplotype from raw bits
    pub fn from_bits(bits: &[bool]) -> Haplotype {
        Haplotype {
            alleles: bits.iter().map(|&b| Allele::from_bit(b)).collect()
        }
    }

    /// Returns the bitwise complement of this haplotype
    pub fn complement(&self) -> Haplotype {
        Haplotype {
            alleles: self.alleles.iter().map(|a| a.complement()).collect()
        }
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn allele(&self, site: usize) -> Allele {
        self.alleles[site]
    }

    pub fn width(&self) -> usize {
        self.alleles.len()
    }
}

impl std::fmt::Display for Haplotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for a in self.alleles.iter() {
            write!(f, "{a}")?;
        }
        Ok(())
    }
}

/// A collection of `k` equal-width haplotypes, i.e. the full phasing for a ploidy `k` sample
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HaplotypeSet {
    haplotypes: Vec<Haplotype>
}

impl HaplotypeSet {
    /// Creates a new haplotype set
    /// # Errors
    /// * if `haplotypes` is empty
    /// * if the haplotypes do not share a single width
    pub fn new(haplotypes: Vec<Haplotype>) -> Result<HaplotypeSet, HaplotypeError> {
        if haplotypes.is_empty() {
            return Err(HaplotypeError::EmptySet);
        }
        let expected = haplotypes[0].width();
        for (index, h) in haplotypes.iter().enumerate() {
            if h.width() != expected {
                return Err(HaplotypeError::WidthMismatch { index, width: h.width(), expected });
            }
        }
        Ok(HaplotypeSet { haplotypes })
    }

    /// Wraps haplotypes that were generated with a shared, non-zero width
    pub(crate) fn from_generated(haplotypes: Vec<Haplotype>) -> HaplotypeSet {
        debug_assert!(!haplotypes.is_empty());
        debug_assert!(haplotypes.iter().all(|h| h.width() == haplotypes[0].width()));
        HaplotypeSet { haplotypes }
    }

    pub fn haplotypes(&self) -> &[Haplotype] {
        &self.haplotypes
    }

    pub fn ploidy(&self) -> usize {
        self.haplotypes.len()
    }

    pub fn width(&self) -> usize {
        self.haplotypes[0].width()
    }

    /// Returns true if every site has at least one 0 and one 1 across the set
    pub fn is_polymorphic(&self) -> bool {
        (0..self.width()).all(|site| {
            let ones = self.haplotypes.iter()
                .filter(|h| h.allele(site) == Allele::One)
                .count();
            ones > 0 && ones < self.ploidy()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::allele::parse_alleles;

    fn hap(value: &str) -> Haplotype {
        Haplotype::new(parse_alleles(value).unwrap()).unwrap()
    }

    #[test]
    fn test_haplotype_rejects_gaps() {
        let result = Haplotype::new(parse_alleles("01-0").unwrap());
        assert_eq!(result, Err(HaplotypeError::GapInHaplotype { site: 2 }));
    }

    #[test]
    fn test_complement() {
        let h = hap("0110");
        assert_eq!(h.complement().to_string(), "1001");
        assert_eq!(h.complement().complement(), h);
    }

    #[test]
    fn test_haplotype_set() {
        let set = HaplotypeSet::new(vec![hap("0110"), hap("1001")]).unwrap();
        assert_eq!(set.ploidy(), 2);
        assert_eq!(set.width(), 4);
        assert!(set.is_polymorphic());

        let set = HaplotypeSet::new(vec![hap("0110"), hap("1000"), hap("0100")]).unwrap();
        assert!(!set.is_polymorphic());

        assert_eq!(HaplotypeSet::new(vec![]), Err(HaplotypeError::EmptySet));
        assert_eq!(
            HaplotypeSet::new(vec![hap("01"), hap("011")]),
            Err(HaplotypeError::WidthMismatch { index: 1, width: 3, expected: 2 })
        );
    }
}
