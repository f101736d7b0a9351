
/// Configuration and validation for the fragment matrix simulator
pub mod config;
/// Balanced assignment of fragment start offsets
pub mod coverage;
/// Fragment matrix simulation from random haplotypes
pub mod fragment_sim;
/// Random haplotype generation
pub mod haplotypes;
/// Read-level simulation with SNPs placed along a genome
pub mod read_sim;

use crate::data_types::allele::Allele;

use rand::Rng;
use std::ops::AddAssign;

/// Counts of what the noise model did to the emitted calls
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SimulationStats {
    /// Calls drawn from a haplotype, before any noise
    pub total_calls: usize,
    /// Calls replaced by a gap
    pub gaps_injected: usize,
    /// Calls flipped to the other allele
    pub errors_injected: usize
}

impl AddAssign for SimulationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.total_calls += rhs.total_calls;
        self.gaps_injected += rhs.gaps_injected;
        self.errors_injected += rhs.errors_injected;
    }
}

/// Per-call noise: a call is first dropped to a gap with `gap_rate`, and otherwise flipped with `error_rate`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseModel {
    pub gap_rate: f64,
    pub error_rate: f64
}

impl NoiseModel {
    /// Applies noise to a single true allele and records the outcome
    pub fn observe<R: Rng + ?Sized>(&self, allele: Allele, rng: &mut R, stats: &mut SimulationStats) -> Allele {
        stats.total_calls += 1;
        if rng.gen::<f64>() < self.gap_rate {
            stats.gaps_injected += 1;
            Allele::Gap
        } else if rng.gen::<f64>() < self.error_rate {
            stats.errors_injected += 1;
            allele.complement()
        } else {
            allele
        }
    }

    /// Applies noise to a run of true alleles, appending the observed calls to `output`
    pub fn observe_all<R: Rng + ?Sized>(&self, alleles: &[Allele], rng: &mut R, stats: &mut SimulationStats, output: &mut Vec<Allele>) {
        output.extend(alleles.iter().map(|&a| self.observe(a, rng, stats)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_noiseless() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let mut stats = SimulationStats::default();
        let noise = NoiseModel::default();
        let truth = vec![Allele::Zero, Allele::One, Allele::One];
        let mut observed = vec![];
        noise.observe_all(&truth, &mut rng, &mut stats, &mut observed);
        assert_eq!(observed, truth);
        assert_eq!(stats, SimulationStats { total_calls: 3, gaps_injected: 0, errors_injected: 0 });
    }

    #[test]
    fn test_always_gap_or_flip() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let mut stats = SimulationStats::default();

        let gaps = NoiseModel { gap_rate: 1.0, error_rate: 1.0 };
        assert_eq!(gaps.observe(Allele::One, &mut rng, &mut stats), Allele::Gap);

        let flips = NoiseModel { gap_rate: 0.0, error_rate: 1.0 };
        assert_eq!(flips.observe(Allele::One, &mut rng, &mut stats), Allele::Zero);
        assert_eq!(flips.observe(Allele::Zero, &mut rng, &mut stats), Allele::One);
        assert_eq!(stats, SimulationStats { total_calls: 3, gaps_injected: 1, errors_injected: 2 });
    }
}
