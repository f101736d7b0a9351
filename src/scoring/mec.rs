use crate::data_types::fragment::Fragment;
use crate::data_types::haplotype::{Haplotype, HaplotypeSet};
use crate::data_types::phase_block::PhaseBlock;
use crate::scoring::ScoreError;

use log::{debug, trace, warn};

/// What to do with a fragment that no phase block fully contains
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Leave it out of the MEC, but still count its entries and record it as unmatched
    #[default]
    Exclude,
    /// Stop scoring and report the fragment
    Error
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum MecError {
    #[error("fragment {index} (sites {start}..{end}) is not contained in any phase block")]
    UnmatchedFragment { index: usize, start: usize, end: usize }
}

/// Result of MEC scoring
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MecScore {
    /// The minimum error correction summed over all matched fragments
    pub mec: usize,
    /// The number of called (0/1) entries across all fragments, matched or not
    pub total_entries: usize,
    /// The number of fragments that were not contained in any block
    pub unmatched_fragments: usize
}

/// Scores one fragment against the block that contains it.
/// Block phase is arbitrary, so the fragment may match the block or its complement.
/// # Arguments
/// * `fragment` - the fragment to score, must be contained in `block`
/// * `block` - the containing block
fn fragment_correction(fragment: &Fragment, block: &PhaseBlock) -> usize {
    let num_called: usize = fragment.num_called();
    let mismatch: usize = fragment.count_mismatches(block.alleles(), block.get_start());
    mismatch.min(num_called - mismatch)
}

/// Calculates the minimum error correction of a fragment matrix given a set of diploid phase blocks.
/// Each fragment is scored against the first block (in order) that fully contains its span.
/// # Arguments
/// * `fragments` - the fragments to score, order does not matter
/// * `blocks` - the phase blocks, assumed to be non-overlapping
/// * `policy` - how to handle fragments that no block contains
/// # Errors
/// * if `policy` is `UnmatchedPolicy::Error` and a fragment is not contained in any block
pub fn score_mec(fragments: &[Fragment], blocks: &[PhaseBlock], policy: UnmatchedPolicy) -> Result<MecScore, MecError> {
    let mut score = MecScore::default();
    for (index, fragment) in fragments.iter().enumerate() {
        let num_called: usize = fragment.num_called();
        if num_called == 0 {
            // all-gap rows carry nothing to correct
            continue;
        }
        score.total_entries += num_called;

        let span = fragment.span();
        match blocks.iter().find(|b| b.contains(&span)) {
            Some(block) => {
                let correction = fragment_correction(fragment, block);
                trace!("fragment {index} => block at {}, correction {correction}", block.get_start());
                score.mec += correction;
            },
            None => {
                match policy {
                    UnmatchedPolicy::Exclude => {
                        debug!("Fragment {index} (sites {}..{}) is not contained in any block, skipping", span.start, span.end);
                        score.unmatched_fragments += 1;
                    },
                    UnmatchedPolicy::Error => {
                        return Err(MecError::UnmatchedFragment { index, start: span.start, end: span.end });
                    }
                }
            }
        }
    }
    Ok(score)
}

/// Calculates the minimum error correction against a single full-length haplotype.
/// This is the same as scoring against one block that starts at the first site and covers the whole haplotype.
/// # Arguments
/// * `fragments` - the fragments to score
/// * `haplotype` - the haplotype, the complement is implied
/// * `policy` - how to handle fragments that run past the end of the haplotype
pub fn score_mec_haplotype(fragments: &[Fragment], haplotype: &Haplotype, policy: UnmatchedPolicy) -> Result<MecScore, MecError> {
    let block = PhaseBlock::new(0, haplotype.alleles().to_vec());
    score_mec(fragments, std::slice::from_ref(&block), policy)
}

/// Picks the haplotype that MEC is scored against from a true haplotype file.
/// A single line or a complementary pair are both accepted. A second line that is not the complement
/// of the first is logged and otherwise ignored.
/// # Errors
/// * if the set has more than two haplotypes, the diploid formula does not apply
pub fn diploid_reference(haplotypes: &HaplotypeSet) -> Result<&Haplotype, ScoreError> {
    match haplotypes.haplotypes() {
        [first] => Ok(first),
        [first, second] => {
            if *second != first.complement() {
                warn!("Second haplotype is not the complement of the first, MEC only uses the first");
            }
            Ok(first)
        },
        _ => Err(ScoreError::UnsupportedPloidy { ploidy: haplotypes.ploidy() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::allele::parse_alleles;

    fn frag(offset: usize, value: &str) -> Fragment {
        Fragment::new(offset, parse_alleles(value).unwrap())
    }

    fn block(start: usize, value: &str) -> PhaseBlock {
        PhaseBlock::new(start, parse_alleles(value).unwrap())
    }

    #[test]
    fn test_perfect_fragments() {
        let blocks = vec![block(0, "01101"), block(5, "1100")];
        let fragments = vec![
            frag(0, "011"),
            frag(1, "1-01"),
            // complement of the block also scores 0
            frag(2, "010"),
            frag(5, "11"),
            frag(6, "011")
        ];
        let score = score_mec(&fragments, &blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score, MecScore { mec: 0, total_entries: 14, unmatched_fragments: 0 });
    }

    #[test]
    fn test_errors_and_complement() {
        let blocks = vec![block(0, "010101")];
        let fragments = vec![
            // one error relative to the block
            frag(0, "0111"),
            // two errors relative to the complement "1010"
            frag(2, "0000"),
            // ties between the block and its complement
            frag(4, "11")
        ];
        let score = score_mec(&fragments, &blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score.mec, 1 + 2 + 1);
        assert_eq!(score.total_entries, 10);

        let complement_blocks: Vec<PhaseBlock> = blocks.iter().map(|b| b.complement()).collect();
        let complement_score = score_mec(&fragments, &complement_blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score, complement_score);

        // gaps in the block are never compared, but the fragment entries still count
        let gap_blocks = vec![block(0, "0101--")];
        let score = score_mec(&fragments, &gap_blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score.mec, 1 + 1);
    }

    #[test]
    fn test_unmatched_fragments() {
        let blocks = vec![block(0, "0101"), block(4, "0101")];
        let fragments = vec![
            frag(0, "0101"),
            // spans both blocks
            frag(2, "0101"),
            frag(4, "1")
        ];
        let score = score_mec(&fragments, &blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score, MecScore { mec: 0, total_entries: 9, unmatched_fragments: 1 });

        let err = score_mec(&fragments, &blocks, UnmatchedPolicy::Error).unwrap_err();
        assert_eq!(err, MecError::UnmatchedFragment { index: 1, start: 2, end: 6 });
    }

    #[test]
    fn test_first_containing_block() {
        // overlapping blocks are not expected, but the first one wins
        let blocks = vec![block(0, "0000"), block(0, "0101")];
        let fragments = vec![frag(0, "0101")];
        let score = score_mec(&fragments, &blocks, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score.mec, 2);
    }

    #[test]
    fn test_score_mec_haplotype() {
        let haplotype = Haplotype::new(parse_alleles("0110").unwrap()).unwrap();
        let fragments = vec![frag(0, "0110"), frag(1, "10"), frag(3, "01")];
        let score = score_mec_haplotype(&fragments, &haplotype, UnmatchedPolicy::Exclude).unwrap();
        assert_eq!(score, MecScore { mec: 1, total_entries: 8, unmatched_fragments: 1 });
    }

    #[test]
    fn test_diploid_reference() {
        let hap = |value: &str| Haplotype::new(parse_alleles(value).unwrap()).unwrap();

        let single = HaplotypeSet::new(vec![hap("0110")]).unwrap();
        assert_eq!(diploid_reference(&single).unwrap(), &hap("0110"));

        let pair = HaplotypeSet::new(vec![hap("0110"), hap("1001")]).unwrap();
        assert_eq!(diploid_reference(&pair).unwrap(), &hap("0110"));

        // not complementary, still scored against the first line
        let uneven = HaplotypeSet::new(vec![hap("0110"), hap("0111")]).unwrap();
        assert_eq!(diploid_reference(&uneven).unwrap(), &hap("0110"));

        let tetraploid = HaplotypeSet::new(vec![hap("0110"), hap("1001"), hap("0101"), hap("1010")]).unwrap();
        assert_eq!(diploid_reference(&tetraploid).unwrap_err(), ScoreError::UnsupportedPloidy { ploidy: 4 });
    }
}
