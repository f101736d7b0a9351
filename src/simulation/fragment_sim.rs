use crate::data_types::allele::Allele;
use crate::data_types::fragment::{Fragment, FragmentMatrix};
use crate::data_types::haplotype::{Haplotype, HaplotypeSet};
use crate::simulation::config::{ConfigError, SimulationConfig};
use crate::simulation::coverage::balanced_start_offsets;
use crate::simulation::haplotypes::generate_haplotypes;
use crate::simulation::{NoiseModel, SimulationStats};

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

/// Everything produced by a single simulation run
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// The true haplotypes the fragments were drawn from
    pub haplotypes: HaplotypeSet,
    /// The simulated fragments, grouped by source haplotype in haplotype order
    pub fragments: FragmentMatrix,
    /// What the noise model did
    pub stats: SimulationStats
}

/// Splits shuffled start offsets into one pool per haplotype, pool `j` taking every `ploidy`-th entry starting at `j`.
/// For diploids this is the even and odd positions.
fn split_pools(starts: &[usize], ploidy: usize) -> Vec<Vec<usize>> {
    (0..ploidy)
        .map(|j| starts.iter().skip(j).step_by(ploidy).copied().collect())
        .collect()
}

/// Draws one noisy fragment from `haplotype` starting at `start`
fn simulate_fragment<R: Rng + ?Sized>(
    haplotype: &Haplotype, start: usize, config: &SimulationConfig, noise: &NoiseModel,
    rng: &mut R, stats: &mut SimulationStats
) -> Fragment {
    let segment_length: usize = config.segment_length();
    let truth: &[Allele] = haplotype.alleles();
    let mut alleles: Vec<Allele> = Vec::with_capacity(config.span_length());

    noise.observe_all(&truth[start..start + segment_length], rng, stats, &mut alleles);
    if config.paired_end.is_some() {
        // the insert is never observed
        let insert_length: usize = config.insert_length();
        alleles.extend(std::iter::repeat(Allele::Gap).take(insert_length));
        let mate_start: usize = start + segment_length + insert_length;
        noise.observe_all(&truth[mate_start..mate_start + segment_length], rng, stats, &mut alleles);
    }
    Fragment::new(start, alleles)
}

/// Simulates a fragment matrix from freshly generated haplotypes.
/// Start offsets are balanced across all legal positions, shuffled, and dealt out to the haplotypes in turn.
/// # Arguments
/// * `config` - the simulation parameters
/// * `rng` - the random source, a seeded generator makes the output reproducible
/// # Errors
/// * if the configuration fails validation, nothing is generated in that case
pub fn simulate_fragments<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<SimulationResult, ConfigError> {
    config.validate()?;

    let haplotypes: HaplotypeSet = generate_haplotypes(config.ploidy, config.width, rng);
    let noise = NoiseModel {
        gap_rate: config.gap_rate,
        error_rate: config.error_rate
    };

    let mut starts: Vec<usize> = balanced_start_offsets(config.height, config.valid_starts());
    starts.shuffle(rng);
    let pools: Vec<Vec<usize>> = split_pools(&starts, config.ploidy);

    let mut stats = SimulationStats::default();
    let mut fragments: Vec<Fragment> = Vec::with_capacity(config.height);
    for (hap_index, (haplotype, pool)) in haplotypes.haplotypes().iter().zip(pools.iter()).enumerate() {
        debug!("Drawing {} fragments from haplotype {hap_index}", pool.len());
        for &start in pool.iter() {
            fragments.push(simulate_fragment(haplotype, start, config, &noise, rng, &mut stats));
        }
    }

    debug!("Simulated {} fragments: {} calls, {} gaps, {} errors", fragments.len(), stats.total_calls, stats.gaps_injected, stats.errors_injected);
    Ok(SimulationResult {
        haplotypes,
        fragments: FragmentMatrix::new(fragments, Some(config.width)),
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::phase_block::PhaseBlock;
    use crate::scoring::mec::{score_mec, UnmatchedPolicy};
    use crate::simulation::config::PairedEnd;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn config(height: usize, width: usize, fragment_length: Option<usize>) -> SimulationConfig {
        SimulationConfig {
            height,
            width,
            fragment_length,
            ..Default::default()
        }
    }

    fn simulate(config: &SimulationConfig, seed: u64) -> SimulationResult {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        simulate_fragments(config, &mut rng).unwrap()
    }

    /// true if `fragment` is an exact copy of some haplotype over its span
    fn matches_haplotype(fragment: &Fragment, haplotypes: &HaplotypeSet) -> bool {
        haplotypes.haplotypes().iter()
            .any(|h| fragment.count_mismatches(h.alleles(), 0) == 0)
    }

    #[test]
    fn test_split_pools() {
        let starts = vec![5, 1, 4, 2, 3];
        assert_eq!(split_pools(&starts, 2), vec![vec![5, 4, 3], vec![1, 2]]);
        assert_eq!(split_pools(&starts, 3), vec![vec![5, 2], vec![1, 3], vec![4]]);
    }

    #[test]
    fn test_full_length_noiseless() {
        let result = simulate(&config(4, 10, Some(10)), 0);
        let haplotypes = result.haplotypes.haplotypes();
        let fragments = result.fragments.fragments();
        assert_eq!(fragments.len(), 4);
        assert_eq!(result.fragments.width(), 10);

        // pools are emitted in haplotype order
        for f in fragments[0..2].iter() {
            assert_eq!(f.offset(), 0);
            assert_eq!(f.alleles(), haplotypes[0].alleles());
        }
        for f in fragments[2..4].iter() {
            assert_eq!(f.alleles(), haplotypes[0].complement().alleles());
        }

        let block = PhaseBlock::new(0, haplotypes[0].alleles().to_vec());
        let score = score_mec(fragments, &[block], UnmatchedPolicy::Error).unwrap();
        assert_eq!(score.mec, 0);
        assert_eq!(score.total_entries, 40);
        assert_eq!(result.stats.total_calls, 40);
    }

    #[test]
    fn test_default_fragment_length() {
        let result = simulate(&config(3, 7, None), 1);
        assert!(result.fragments.fragments().iter().all(|f| f.len() == 7 && f.offset() == 0));
    }

    #[test]
    fn test_balanced_coverage() {
        let cfg = config(53, 30, Some(8));
        let result = simulate(&cfg, 2);
        let mut counts = vec![0; cfg.valid_starts()];
        for f in result.fragments.fragments().iter() {
            assert_eq!(f.len(), 8);
            counts[f.offset()] += 1;
            assert!(matches_haplotype(f, &result.haplotypes));
        }
        let min = *counts.iter().min().unwrap();
        let max = *counts.iter().max().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn test_gap_rate() {
        let cfg = SimulationConfig {
            gap_rate: 0.2,
            ..config(2000, 50, Some(10))
        };
        let result = simulate(&cfg, 3);
        assert_eq!(result.stats.total_calls, 20000);
        assert_eq!(result.fragments.num_gaps(), result.stats.gaps_injected);

        let observed = result.stats.gaps_injected as f64 / result.stats.total_calls as f64;
        assert!((observed - 0.2).abs() < 0.02, "observed gap rate {observed}");
    }

    #[test]
    fn test_error_rate() {
        let cfg = SimulationConfig {
            error_rate: 0.1,
            ..config(1000, 40, Some(20))
        };
        let result = simulate(&cfg, 4);
        let observed = result.stats.errors_injected as f64 / result.stats.total_calls as f64;
        assert!((observed - 0.1).abs() < 0.02, "observed error rate {observed}");
        assert_eq!(result.fragments.num_gaps(), 0);

        // MEC can only undercount the injected errors
        let block = PhaseBlock::new(0, result.haplotypes.haplotypes()[0].alleles().to_vec());
        let score = score_mec(result.fragments.fragments(), &[block], UnmatchedPolicy::Error).unwrap();
        assert!(score.mec <= result.stats.errors_injected);
        assert!(score.mec > 0);
    }

    #[test]
    fn test_polyploid_pools() {
        let cfg = SimulationConfig {
            ploidy: 3,
            ..config(10, 12, Some(4))
        };
        let result = simulate(&cfg, 5);
        assert_eq!(result.haplotypes.ploidy(), 3);
        assert!(result.haplotypes.is_polymorphic());

        // pools of 4, 3, 3 in haplotype order
        let fragments = result.fragments.fragments();
        let haplotypes = result.haplotypes.haplotypes();
        let pool_sizes = [4, 3, 3];
        let mut index = 0;
        for (haplotype, &size) in haplotypes.iter().zip(pool_sizes.iter()) {
            for f in fragments[index..index + size].iter() {
                assert_eq!(f.count_mismatches(haplotype.alleles(), 0), 0);
            }
            index += size;
        }
    }

    #[test]
    fn test_paired_end() {
        let cfg = SimulationConfig {
            paired_end: Some(PairedEnd { insert_length: 4 }),
            ..config(20, 30, Some(5))
        };
        let result = simulate(&cfg, 6);
        for f in result.fragments.fragments().iter() {
            assert_eq!(f.len(), 14);
            assert!(f.offset() + 14 <= 30);
            assert!(f.alleles()[5..9].iter().all(|&a| a == Allele::Gap));
            assert_eq!(f.num_called(), 10);
            assert!(matches_haplotype(f, &result.haplotypes));
        }
        // inserts are not counted as injected gaps
        assert_eq!(result.stats.total_calls, 200);
        assert_eq!(result.stats.gaps_injected, 0);
    }

    #[test]
    fn test_reproducible() {
        let cfg = SimulationConfig {
            gap_rate: 0.1,
            error_rate: 0.05,
            ..config(30, 20, Some(6))
        };
        let result1 = simulate(&cfg, 99);
        let result2 = simulate(&cfg, 99);
        assert_eq!(result1.haplotypes, result2.haplotypes);
        assert_eq!(result1.fragments, result2.fragments);
        assert_eq!(result1.stats, result2.stats);
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let err = simulate_fragments(&config(4, 10, Some(11)), &mut rng).unwrap_err();
        assert_eq!(err, ConfigError::FragmentLength { length: 11, max: 10 });
    }
}
