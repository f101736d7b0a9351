use crate::data_types::haplotype::{Haplotype, HaplotypeSet};
use crate::data_types::phase_block::PhaseBlock;
use crate::scoring::ScoreError;

use bit_vec::BitVec;
use log::trace;
use rustc_hash::FxHashMap as HashMap;
use std::ops::AddAssign;

/// Switch and flip error counts for one or more blocks
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SwitchFlipScore {
    /// Runs of two or more consecutive disagreements
    pub switches: usize,
    /// Isolated single-site disagreements
    pub flips: usize,
    /// The number of phased sites that went into the comparison
    pub compared_sites: usize
}

impl SwitchFlipScore {
    /// Total number of error events
    pub fn total_errors(&self) -> usize {
        self.switches + self.flips
    }
}

impl AddAssign for SwitchFlipScore {
    fn add_assign(&mut self, rhs: Self) {
        self.switches += rhs.switches;
        self.flips += rhs.flips;
        self.compared_sites += rhs.compared_sites;
    }
}

/// For the best match search, records which haplotype a block most closely follows
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BestMatch {
    /// index of the block in the input order
    pub block_index: usize,
    /// index of the haplotype with the fewest errors, ties go to the lowest index
    pub haplotype_index: usize,
    /// the switch + flip errors against that haplotype
    pub errors: usize
}

/// Builds the agreement bits of a block against the true haplotype.
/// Only phased sites contribute a bit, so gaps shift the indices without being counted.
fn agreement_bits(haplotype: &Haplotype, block: &PhaseBlock) -> BitVec {
    let mut agreement = BitVec::with_capacity(block.len());
    for (i, &allele) in block.alleles().iter().enumerate() {
        if allele.is_called() {
            agreement.push(allele == haplotype.allele(block.get_start() + i));
        }
    }
    agreement
}

/// Classifies the maximal runs of disagreement: a run of one is a flip, anything longer is a single switch.
/// Fewer than two bits contribute nothing.
/// # Arguments
/// * `agreement` - true where the reconstruction agrees with the truth
fn count_disagreement_runs(agreement: &BitVec) -> (usize, usize) {
    let mut switches: usize = 0;
    let mut flips: usize = 0;
    if agreement.len() < 2 {
        return (switches, flips);
    }

    let mut i: usize = 0;
    while i < agreement.len() {
        if !agreement[i] {
            let run_start: usize = i;
            while i + 1 < agreement.len() && !agreement[i + 1] {
                i += 1;
            }
            if i == run_start {
                flips += 1;
            } else {
                switches += 1;
            }
        }
        i += 1;
    }
    (switches, flips)
}

/// Scores a single block against the true haplotype
/// # Panics
/// * if the block extends past the end of the haplotype
pub fn score_block(haplotype: &Haplotype, block: &PhaseBlock) -> SwitchFlipScore {
    assert!(block.get_end() <= haplotype.width());
    let agreement = agreement_bits(haplotype, block);
    if agreement.len() < 2 {
        return SwitchFlipScore::default();
    }
    let (switches, flips) = count_disagreement_runs(&agreement);
    SwitchFlipScore {
        switches,
        flips,
        compared_sites: agreement.len()
    }
}

/// Checks that every block fits on the haplotype
fn check_bounds(width: usize, blocks: &[PhaseBlock]) -> Result<(), ScoreError> {
    match blocks.iter().position(|b| b.get_end() > width) {
        Some(index) => Err(ScoreError::BlockOutOfBounds { index, end: blocks[index].get_end(), width }),
        None => Ok(())
    }
}

/// Counts switch and flip errors of reconstructed blocks against the true haplotype, summed over all blocks.
/// # Arguments
/// * `haplotype` - the true haplotype
/// * `blocks` - the reconstructed phase blocks
/// # Errors
/// * if a block extends past the end of the true haplotype
pub fn score_switch_flip(haplotype: &Haplotype, blocks: &[PhaseBlock]) -> Result<SwitchFlipScore, ScoreError> {
    check_bounds(haplotype.width(), blocks)?;
    let mut total = SwitchFlipScore::default();
    for (index, block) in blocks.iter().enumerate() {
        let block_score = score_block(haplotype, block);
        trace!("block {index}: {} sites, {} switches, {} flips", block_score.compared_sites, block_score.switches, block_score.flips);
        total += block_score;
    }
    Ok(total)
}

/// For every block, finds the haplotype in the set with the fewest switch + flip errors.
/// # Arguments
/// * `blocks` - the reconstructed blocks, e.g. individual found haplotype segments
/// * `haplotypes` - the candidate true haplotypes
/// # Errors
/// * if a block extends past the end of the haplotypes
pub fn best_haplotype_matches(blocks: &[PhaseBlock], haplotypes: &HaplotypeSet) -> Result<Vec<BestMatch>, ScoreError> {
    check_bounds(haplotypes.width(), blocks)?;
    let matches = blocks.iter().enumerate()
        .map(|(block_index, block)| {
            let mut best = BestMatch { block_index, haplotype_index: 0, errors: usize::MAX };
            for (haplotype_index, haplotype) in haplotypes.haplotypes().iter().enumerate() {
                let errors = score_block(haplotype, block).total_errors();
                if errors < best.errors {
                    best.haplotype_index = haplotype_index;
                    best.errors = errors;
                }
            }
            best
        })
        .collect();
    Ok(matches)
}

/// Tallies how many blocks were best matched to each haplotype index
pub fn count_best_matches(matches: &[BestMatch]) -> HashMap<usize, usize> {
    let mut counts: HashMap<usize, usize> = Default::default();
    for m in matches.iter() {
        *counts.entry(m.haplotype_index).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::allele::parse_alleles;

    fn hap(value: &str) -> Haplotype {
        Haplotype::new(parse_alleles(value).unwrap()).unwrap()
    }

    fn block(start: usize, value: &str) -> PhaseBlock {
        PhaseBlock::new(start, parse_alleles(value).unwrap())
    }

    fn score(truth: &str, found: &str) -> (usize, usize) {
        let result = score_switch_flip(&hap(truth), &[block(0, found)]).unwrap();
        (result.switches, result.flips)
    }

    #[test]
    fn test_identical() {
        assert_eq!(score("0110100", "0110100"), (0, 0));
    }

    #[test]
    fn test_isolated_flip() {
        assert_eq!(score("0000000", "0001000"), (0, 1));
        // boundaries are plain runs as well
        assert_eq!(score("0000000", "1000001"), (0, 2));
    }

    #[test]
    fn test_switch_runs() {
        assert_eq!(score("0000000", "0011000"), (1, 0));
        assert_eq!(score("0000000", "0011110"), (1, 0));
        assert_eq!(score("0000000", "1100100"), (1, 1));
        assert_eq!(score("0000000", "0001111"), (1, 0));
    }

    #[test]
    fn test_gaps_are_skipped() {
        // the gap is removed before runs are computed, so the two disagreements become adjacent
        assert_eq!(score("00000", "01-10"), (1, 0));
        assert_eq!(score("000000", "00-100"), (0, 1));

        let result = score_switch_flip(&hap("000000"), &[block(0, "00-100")]).unwrap();
        assert_eq!(result.compared_sites, 5);
    }

    #[test]
    fn test_short_blocks() {
        assert_eq!(score("0", "1"), (0, 0));
        assert_eq!(score("000", "1--"), (0, 0));
    }

    #[test]
    fn test_multiple_blocks() {
        let truth = hap("0101010101");
        let blocks = vec![block(0, "0111"), block(4, "10"), block(6, "0101")];
        let result = score_switch_flip(&truth, &blocks).unwrap();
        assert_eq!(result, SwitchFlipScore { switches: 1, flips: 1, compared_sites: 10 });
        assert_eq!(result.total_errors(), 2);
    }

    #[test]
    fn test_out_of_bounds() {
        let err = score_switch_flip(&hap("0101"), &[block(0, "01"), block(3, "01")]).unwrap_err();
        assert_eq!(err, ScoreError::BlockOutOfBounds { index: 1, end: 5, width: 4 });
    }

    #[test]
    fn test_best_haplotype_matches() {
        let haplotypes = HaplotypeSet::new(vec![hap("000000"), hap("111111"), hap("010101")]).unwrap();
        let blocks = vec![block(0, "0101"), block(2, "1011"), block(0, "000100")];
        let matches = best_haplotype_matches(&blocks, &haplotypes).unwrap();
        assert_eq!(matches, vec![
            BestMatch { block_index: 0, haplotype_index: 2, errors: 0 },
            BestMatch { block_index: 1, haplotype_index: 1, errors: 1 },
            BestMatch { block_index: 2, haplotype_index: 0, errors: 1 }
        ]);

        let counts = count_best_matches(&matches);
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&c| c == 1));
    }
}
