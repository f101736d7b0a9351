use crate::data_types::allele::Allele;
use crate::data_types::fragment::{Fragment, FragmentMatrix};
use crate::data_types::haplotype::HaplotypeSet;
use crate::simulation::config::{check_rate, ConfigError};
use crate::simulation::haplotypes::generate_haplotypes;
use crate::simulation::{NoiseModel, SimulationStats};

use log::{debug, info};
use rand::Rng;
use rand_distr::{Distribution, Geometric, LogNormal, Normal};
use std::ops::Range;

/// The distribution that fragment lengths are drawn from
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LengthDistribution {
    #[default]
    Normal,
    LogNormal
}

/// Fragment length model; draws are clamped to [min, max]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LengthModel {
    pub mean: usize,
    pub sd: usize,
    pub min: usize,
    pub max: usize,
    pub distribution: LengthDistribution
}

impl Default for LengthModel {
    fn default() -> Self {
        LengthModel {
            mean: 550,
            sd: 30,
            min: 500,
            max: 600,
            distribution: LengthDistribution::Normal
        }
    }
}

/// Read-level simulation parameters
#[derive(Clone, Debug, PartialEq)]
pub struct ReadSimConfig {
    /// average depth over the genome
    pub coverage: usize,
    /// number of SNP sites, i.e. the matrix width
    pub num_snps: usize,
    /// probability of a SNP at any genome position
    pub snp_rate: f64,
    /// probability that a sequenced call is flipped
    pub error_rate: f64,
    /// fragment (or insert, when paired) length model
    pub length: LengthModel,
    /// length of each mate for paired reads
    pub read_length: usize,
    /// if true, only the ends of each fragment are sequenced
    pub paired: bool,
    /// number of haplotypes
    pub ploidy: usize
}

impl Default for ReadSimConfig {
    fn default() -> Self {
        ReadSimConfig {
            coverage: 10,
            num_snps: 100,
            snp_rate: 0.01,
            error_rate: 0.02,
            length: LengthModel::default(),
            read_length: 150,
            paired: false,
            ploidy: 2
        }
    }
}

impl ReadSimConfig {
    /// Checks every parameter against its allowed range.
    /// # Errors
    /// * if coverage or any length parameter is 0
    /// * if the minimum length is larger than the maximum
    /// * if there are fewer than two SNPs, or a rate is outside its range
    /// * if paired reads have no read length
    pub fn validate(&self) -> Result<(), ConfigError> {
        let length = &self.length;
        if self.coverage == 0 || length.mean == 0 || length.min == 0 || length.max == 0 {
            return Err(ConfigError::NonPositiveParameter);
        }
        if length.min > length.max {
            return Err(ConfigError::LengthBounds { min: length.min, max: length.max });
        }
        if self.num_snps < 2 {
            return Err(ConfigError::TooFewSnps { num_snps: self.num_snps });
        }
        if self.ploidy < 2 {
            return Err(ConfigError::Ploidy { ploidy: self.ploidy });
        }
        check_rate("error rate", self.error_rate)?;
        // a zero SNP rate would never place the next SNP
        if self.snp_rate <= 0.0 {
            return Err(ConfigError::Rate { name: "SNP rate", value: self.snp_rate });
        }
        check_rate("SNP rate", self.snp_rate)?;
        if self.paired && self.read_length == 0 {
            return Err(ConfigError::ReadLength);
        }
        Ok(())
    }

    /// Dumps the configuration to the logger
    pub fn log_settings(&self) {
        info!("Read simulation:");
        info!("\tCoverage: {}", self.coverage);
        info!("\tSNPs: {}", self.num_snps);
        info!("\tSNP rate: {}", self.snp_rate);
        info!("\tError rate: {}", self.error_rate);
        info!("\tPloidy: {}", self.ploidy);
        info!("\tFragment length: {} ({}, sd {}, clamped to {}-{})",
            self.length.mean, self.length.distribution, self.length.sd, self.length.min, self.length.max);
        if self.paired {
            info!("\tPaired-end: ENABLED (read length {})", self.read_length);
        } else {
            info!("\tPaired-end: DISABLED");
        }
    }
}

/// Output of the read simulator
#[derive(Clone, Debug)]
pub struct ReadSimulationResult {
    /// genome position of each SNP, strictly increasing
    pub snp_positions: Vec<usize>,
    /// total simulated genome length
    pub genome_length: usize,
    pub haplotypes: HaplotypeSet,
    /// fragments over SNP indices, in read order
    pub fragments: FragmentMatrix,
    pub stats: SimulationStats
}

/// Draws fragment lengths in genome coordinates
enum LengthSampler {
    Normal(Normal<f64>),
    LogNormal(LogNormal<f64>)
}

impl LengthSampler {
    /// Builds the sampler; the log-normal parameters are set so that the draws have the configured mean and sd
    fn new(model: &LengthModel) -> Result<LengthSampler, ConfigError> {
        let mean: f64 = model.mean as f64;
        let sd: f64 = model.sd as f64;
        let sampler = match model.distribution {
            LengthDistribution::Normal => {
                Normal::new(mean, sd).map(LengthSampler::Normal)
            },
            LengthDistribution::LogNormal => {
                let sigma2: f64 = (1.0 + (sd * sd) / (mean * mean)).ln();
                let mu: f64 = mean.ln() - sigma2 / 2.0;
                LogNormal::new(mu, sigma2.sqrt()).map(LengthSampler::LogNormal)
            }
        };
        sampler.map_err(|e| ConfigError::LengthModel { message: e.to_string() })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            LengthSampler::Normal(d) => d.sample(rng),
            LengthSampler::LogNormal(d) => d.sample(rng)
        }
    }
}

/// Places `num_snps` SNPs: the first at `first`, then each one a geometric(`snp_rate`) distance (at least 1) after the last
fn place_snps<R: Rng + ?Sized>(num_snps: usize, first: usize, snp_rate: f64, rng: &mut R) -> Result<Vec<usize>, ConfigError> {
    let geometric = Geometric::new(snp_rate)
        .map_err(|e| ConfigError::LengthModel { message: e.to_string() })?;
    let mut positions: Vec<usize> = Vec::with_capacity(num_snps);
    let mut position: usize = first;
    positions.push(position);
    for _ in 1..num_snps {
        // failures before the first success, so shift by one
        position += geometric.sample(rng) as usize + 1;
        positions.push(position);
    }
    Ok(positions)
}

/// Index of the first SNP strictly after `position`
fn snps_up_to(snp_positions: &[usize], position: usize) -> usize {
    snp_positions.partition_point(|&p| p <= position)
}

/// Works out which SNP indices a paired read covers.
/// The second mate never re-covers SNPs from the first, so overlapping mates are merged.
/// Returns the mate ranges, either of which may be empty.
fn paired_snp_ranges(snp_positions: &[usize], start: usize, end: usize, read_length: usize) -> (Range<usize>, Range<usize>) {
    let mate1 = snps_up_to(snp_positions, start)..snps_up_to(snp_positions, start + read_length);
    let mate2_start = snps_up_to(snp_positions, end.saturating_sub(read_length)).max(mate1.end);
    let mate2_end = snps_up_to(snp_positions, end).max(mate2_start);
    (mate1, mate2_start..mate2_end)
}

/// Simulates reads along a genome with randomly placed SNPs and converts them into fragments over SNP indices.
/// # Arguments
/// * `config` - the simulation parameters
/// * `rng` - the random source
/// # Errors
/// * if the configuration fails validation
pub fn simulate_reads<R: Rng + ?Sized>(config: &ReadSimConfig, rng: &mut R) -> Result<ReadSimulationResult, ConfigError> {
    config.validate()?;
    let sampler = LengthSampler::new(&config.length)?;

    let snp_positions: Vec<usize> = place_snps(config.num_snps, config.length.max - 1, config.snp_rate, rng)?;
    let haplotypes: HaplotypeSet = generate_haplotypes(config.ploidy, config.num_snps, rng);
    let genome_length: usize = snp_positions[snp_positions.len() - 1] + 1;
    let num_reads: usize = genome_length * config.coverage / 2 / config.length.mean;
    debug!("Genome length {genome_length}, simulating {num_reads} reads");

    let noise = NoiseModel {
        gap_rate: 0.0,
        error_rate: config.error_rate
    };
    let mut stats = SimulationStats::default();
    let mut fragments: Vec<Fragment> = vec![];

    for _ in 0..num_reads {
        let haplotype = &haplotypes.haplotypes()[rng.gen_range(0..config.ploidy)];
        let length: usize = sampler.sample(rng).clamp(config.length.min as f64, config.length.max as f64) as usize;
        let start: usize = rng.gen_range(0..genome_length);
        let end: usize = start + length;
        let truth: &[Allele] = haplotype.alleles();

        if config.paired {
            let (mate1, mate2) = paired_snp_ranges(&snp_positions, start, end, config.read_length);
            if mate1.len() + mate2.len() <= 1 {
                continue;
            }
            let offset: usize = if mate1.is_empty() { mate2.start } else { mate1.start };
            let mut alleles: Vec<Allele> = Vec::with_capacity(mate2.end - offset);
            noise.observe_all(&truth[mate1.clone()], rng, &mut stats, &mut alleles);
            if !mate1.is_empty() && !mate2.is_empty() {
                // SNPs between the mates are not observed
                alleles.extend(std::iter::repeat(Allele::Gap).take(mate2.start - mate1.end));
            }
            noise.observe_all(&truth[mate2], rng, &mut stats, &mut alleles);
            fragments.push(Fragment::new(offset, alleles));
        } else {
            let first_snp: usize = snps_up_to(&snp_positions, start);
            let end_snp: usize = snps_up_to(&snp_positions, end);
            if end_snp <= first_snp + 1 {
                continue;
            }
            let mut alleles: Vec<Allele> = Vec::with_capacity(end_snp - first_snp);
            noise.observe_all(&truth[first_snp..end_snp], rng, &mut stats, &mut alleles);
            fragments.push(Fragment::new(first_snp, alleles));
        }
    }

    debug!("Kept {} of {num_reads} reads covering at least two SNPs", fragments.len());
    Ok(ReadSimulationResult {
        snp_positions,
        genome_length,
        haplotypes,
        fragments: FragmentMatrix::new(fragments, Some(config.num_snps)),
        stats
    })
}
