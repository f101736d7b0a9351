
use clap::{Args, Parser, Subcommand};
use lazy_static::lazy_static;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::readers::{MatrixFormat, OffsetBase};
use crate::scoring::mec::UnmatchedPolicy;
use crate::simulation::config::{PairedEnd, SimulationConfig};
use crate::simulation::read_sim::{LengthDistribution, LengthModel, ReadSimConfig};

lazy_static! {
    /// Stores the full version string we plan to use.
    /// # Examples
    /// * `0.3.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"));
}

#[derive(Clone, Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about)]
pub struct Settings {
    #[clap(subcommand)]
    pub command: Command,

    /// Output summary file with one row per run (optional, csv/tsv)
    #[clap(long = "summary-file")]
    #[clap(value_name = "FILE")]
    #[clap(global = true)]
    pub summary_filename: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    #[clap(global = true)]
    pub verbosity: u8
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Simulate a fragment matrix from random haplotypes
    Simulate(SimulateSettings),
    /// Simulate reads over a genome with randomly placed SNPs
    SimulateReads(ReadSimSettings),
    /// Score a fragment matrix against phase blocks with the minimum error correction
    Mec(MecSettings),
    /// Count switch and flip errors of phase blocks against a true haplotype
    SwitchError(SwitchErrorSettings),
    /// Find the closest true haplotype for each found haplotype segment
    HapMatch(HapMatchSettings),
    /// Compute the vector error between found and real haplotype sets
    VectorError(VectorErrorSettings)
}

#[derive(Clone, Args)]
pub struct SimulateSettings {
    /// Output fragment matrix
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "matrix-out")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub matrix_filename: PathBuf,

    /// Output true haplotypes
    #[clap(required = true)]
    #[clap(long = "haplotype-out")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotype_filename: PathBuf,

    /// Also write the full-width matrix to <matrix-out>.long
    #[clap(long = "long-format")]
    #[clap(help_heading = Some("Input/Output"))]
    pub long_format: bool,

    /// Number of fragments
    #[clap(long = "height")]
    #[clap(value_name = "COUNT")]
    #[clap(default_value = "2")]
    #[clap(help_heading = Some("Matrix"))]
    pub height: usize,

    /// Number of sites
    #[clap(long = "width")]
    #[clap(value_name = "COUNT")]
    #[clap(default_value = "1")]
    #[clap(help_heading = Some("Matrix"))]
    pub width: usize,

    /// Fragment length, or segment length for paired-end fragments (default: full usable width)
    #[clap(long = "fragment-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(help_heading = Some("Matrix"))]
    pub fragment_length: Option<usize>,

    /// Number of haplotypes
    #[clap(long = "ploidy")]
    #[clap(value_name = "K")]
    #[clap(default_value = "2")]
    #[clap(help_heading = Some("Matrix"))]
    pub ploidy: usize,

    /// Simulate paired-end fragments
    #[clap(long = "paired-end")]
    #[clap(help_heading = Some("Matrix"))]
    pub paired_end: bool,

    /// Number of unobserved sites between the two segments of a paired-end fragment
    #[clap(long = "insert-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "0")]
    #[clap(help_heading = Some("Matrix"))]
    pub insert_length: usize,

    /// Probability that a call is replaced by a gap
    #[clap(long = "gap-rate")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.0")]
    #[clap(help_heading = Some("Noise"))]
    pub gap_rate: f64,

    /// Probability that a call is flipped
    #[clap(long = "error-rate")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.0")]
    #[clap(help_heading = Some("Noise"))]
    pub error_rate: f64,

    /// Random seed (default: random)
    #[clap(long = "seed")]
    #[clap(value_name = "SEED")]
    pub seed: Option<u64>
}

impl SimulateSettings {
    /// Builds the simulation configuration, no checks are performed here
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            height: self.height,
            width: self.width,
            gap_rate: self.gap_rate,
            error_rate: self.error_rate,
            fragment_length: self.fragment_length,
            ploidy: self.ploidy,
            paired_end: if self.paired_end {
                Some(PairedEnd { insert_length: self.insert_length })
            } else {
                None
            }
        }
    }
}

#[derive(Clone, Args)]
pub struct ReadSimSettings {
    /// Output fragment matrix
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "matrix-out")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub matrix_filename: PathBuf,

    /// Output true haplotypes
    #[clap(required = true)]
    #[clap(long = "haplotype-out")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotype_filename: PathBuf,

    /// Average sequencing depth
    #[clap(long = "coverage")]
    #[clap(value_name = "DEPTH")]
    #[clap(default_value = "10")]
    #[clap(help_heading = Some("Genome"))]
    pub coverage: usize,

    /// Number of SNPs
    #[clap(long = "num-snps")]
    #[clap(value_name = "COUNT")]
    #[clap(default_value = "100")]
    #[clap(help_heading = Some("Genome"))]
    pub num_snps: usize,

    /// Probability of a SNP at any position
    #[clap(long = "snp-rate")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.01")]
    #[clap(help_heading = Some("Genome"))]
    pub snp_rate: f64,

    /// Number of haplotypes
    #[clap(long = "ploidy")]
    #[clap(value_name = "K")]
    #[clap(default_value = "2")]
    #[clap(help_heading = Some("Genome"))]
    pub ploidy: usize,

    /// Mean fragment length
    #[clap(long = "fraglength-mean")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "550")]
    #[clap(help_heading = Some("Fragments"))]
    pub fraglength_mean: usize,

    /// Standard deviation of the fragment length
    #[clap(long = "fraglength-sd")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "30")]
    #[clap(help_heading = Some("Fragments"))]
    pub fraglength_sd: usize,

    /// Minimum fragment length
    #[clap(long = "fraglength-min")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "500")]
    #[clap(help_heading = Some("Fragments"))]
    pub fraglength_min: usize,

    /// Maximum fragment length
    #[clap(long = "fraglength-max")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "600")]
    #[clap(help_heading = Some("Fragments"))]
    pub fraglength_max: usize,

    /// Fragment length distribution (normal or lognormal)
    #[clap(long = "distribution")]
    #[clap(value_name = "DIST")]
    #[clap(default_value = "normal")]
    #[clap(help_heading = Some("Fragments"))]
    pub distribution: LengthDistribution,

    /// Sequence only both ends of each fragment
    #[clap(long = "paired")]
    #[clap(help_heading = Some("Fragments"))]
    pub paired: bool,

    /// Length of each read in a pair
    #[clap(long = "read-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "150")]
    #[clap(help_heading = Some("Fragments"))]
    pub read_length: usize,

    /// Probability that a sequenced call is flipped
    #[clap(long = "error-rate")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.02")]
    #[clap(help_heading = Some("Noise"))]
    pub error_rate: f64,

    /// Random seed (default: random)
    #[clap(long = "seed")]
    #[clap(value_name = "SEED")]
    pub seed: Option<u64>
}

impl ReadSimSettings {
    /// Builds the read simulation configuration, no checks are performed here
    pub fn read_sim_config(&self) -> ReadSimConfig {
        ReadSimConfig {
            coverage: self.coverage,
            num_snps: self.num_snps,
            snp_rate: self.snp_rate,
            error_rate: self.error_rate,
            length: LengthModel {
                mean: self.fraglength_mean,
                sd: self.fraglength_sd,
                min: self.fraglength_min,
                max: self.fraglength_max,
                distribution: self.distribution
            },
            read_length: self.read_length,
            paired: self.paired,
            ploidy: self.ploidy
        }
    }
}

#[derive(Clone, Args)]
pub struct MecSettings {
    /// Input fragment matrix
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "fragments")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub fragments_filename: PathBuf,

    /// Input phased blocks
    #[clap(short = 'b')]
    #[clap(long = "blocks")]
    #[clap(value_name = "FILE")]
    #[clap(conflicts_with = "haplotype_filename")]
    #[clap(help_heading = Some("Input/Output"))]
    pub blocks_filename: Option<PathBuf>,

    /// Input haplotype, scored as a single block over the whole matrix
    #[clap(long = "haplotype")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotype_filename: Option<PathBuf>,

    /// The fragment matrix is in long format
    #[clap(long = "long-format")]
    #[clap(help_heading = Some("Input/Output"))]
    pub long_format: bool,

    /// Fragment offsets are 1-based
    #[clap(long = "one-based")]
    #[clap(help_heading = Some("Input/Output"))]
    pub one_based: bool,

    /// Handling of fragments not contained in any block (exclude or error)
    #[clap(long = "unmatched")]
    #[clap(value_name = "POLICY")]
    #[clap(default_value = "exclude")]
    pub unmatched_policy: UnmatchedPolicy
}

impl MecSettings {
    pub fn matrix_format(&self) -> MatrixFormat {
        if self.long_format { MatrixFormat::Long } else { MatrixFormat::Short }
    }

    pub fn offset_base(&self) -> OffsetBase {
        if self.one_based { OffsetBase::One } else { OffsetBase::Zero }
    }
}

#[derive(Clone, Args)]
pub struct SwitchErrorSettings {
    /// Input true haplotype (first line is used)
    #[clap(required = true)]
    #[clap(long = "haplotype")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotype_filename: PathBuf,

    /// Input phased blocks
    #[clap(required = true)]
    #[clap(short = 'b')]
    #[clap(long = "blocks")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub blocks_filename: PathBuf
}

#[derive(Clone, Args)]
pub struct HapMatchSettings {
    /// Input true haplotypes, one per line
    #[clap(required = true)]
    #[clap(long = "haplotypes")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotypes_filename: PathBuf,

    /// Input found haplotype segments as `<offset>\t<alleles>` lines
    #[clap(required = true)]
    #[clap(long = "found")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub found_filename: PathBuf,

    /// Segment offsets are 1-based
    #[clap(long = "one-based")]
    #[clap(help_heading = Some("Input/Output"))]
    pub one_based: bool
}

impl HapMatchSettings {
    pub fn offset_base(&self) -> OffsetBase {
        if self.one_based { OffsetBase::One } else { OffsetBase::Zero }
    }
}

#[derive(Clone, Args)]
pub struct VectorErrorSettings {
    /// Input found haplotypes; without --real, the real set follows after a blank line
    #[clap(required = true)]
    #[clap(long = "found")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub found_filename: PathBuf,

    /// Input real haplotypes
    #[clap(long = "real")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub real_filename: Option<PathBuf>
}

pub fn get_raw_settings() -> Settings {
    Settings::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
fn check_required_filename(filename: &Path, label: &str) {
    if !filename.exists() {
        error!("{} does not exist: \"{}\"", label, filename.display());
        std::process::exit(exitcode::NOINPUT);
    } else {
        info!("{}: \"{}\"", label, filename.display());
    }
}

/// Logs an output file and warns if it is about to be replaced
fn check_output_filename(filename: &Path, label: &str) {
    if filename.exists() {
        warn!("{} exists and will be overwritten: \"{}\"", label, filename.display());
    } else {
        info!("{}: \"{}\"", label, filename.display());
    }
}

/// Returns the path of the long format matrix that goes with `matrix_filename`
pub fn long_matrix_filename(matrix_filename: &Path) -> PathBuf {
    let mut long_filename = matrix_filename.to_owned().into_os_string();
    long_filename.push(".long");
    PathBuf::from(long_filename)
}

/// Do some additional checks here, exiting on anything that clap cannot catch for us.
/// Configuration problems exit before any output is written.
/// # Arguments
/// * `settings` - the raw settings, nothing has been checked other than what clap does for us.
pub fn check_settings(settings: Settings) -> Settings {
    if let Some(summary_filename) = settings.summary_filename.as_ref() {
        check_output_filename(summary_filename, "Summary file");
    }

    match &settings.command {
        Command::Simulate(sim_settings) => {
            let config = sim_settings.simulation_config();
            if let Err(e) = config.validate() {
                error!("Invalid simulation settings: {e}");
                std::process::exit(exitcode::USAGE);
            }
            if !sim_settings.paired_end && sim_settings.insert_length != 0 {
                warn!("--insert-length is ignored without --paired-end");
            }
            check_output_filename(&sim_settings.matrix_filename, "Matrix file");
            if sim_settings.long_format {
                check_output_filename(&long_matrix_filename(&sim_settings.matrix_filename), "Long matrix file");
            }
            check_output_filename(&sim_settings.haplotype_filename, "Haplotype file");
            config.log_settings();
        },
        Command::SimulateReads(read_settings) => {
            let config = read_settings.read_sim_config();
            if let Err(e) = config.validate() {
                error!("Invalid read simulation settings: {e}");
                std::process::exit(exitcode::USAGE);
            }
            if config.length.mean < config.length.min || config.length.mean > config.length.max {
                warn!("Mean fragment length {} is outside of [{}, {}], most lengths will be clamped", config.length.mean, config.length.min, config.length.max);
            }
            check_output_filename(&read_settings.matrix_filename, "Matrix file");
            check_output_filename(&read_settings.haplotype_filename, "Haplotype file");
            config.log_settings();
        },
        Command::Mec(mec_settings) => {
            check_required_filename(&mec_settings.fragments_filename, "Fragment matrix");
            match (mec_settings.blocks_filename.as_ref(), mec_settings.haplotype_filename.as_ref()) {
                (Some(blocks_filename), None) => check_required_filename(blocks_filename, "Phased blocks"),
                (None, Some(haplotype_filename)) => check_required_filename(haplotype_filename, "Haplotype"),
                _ => {
                    error!("Exactly one of --blocks or --haplotype must be provided");
                    std::process::exit(exitcode::USAGE);
                }
            };
            if mec_settings.long_format && mec_settings.one_based {
                warn!("--one-based has no effect on long format matrices");
            }
            info!("Matrix format: {}", mec_settings.matrix_format());
            info!("Unmatched fragments: {}", mec_settings.unmatched_policy);
        },
        Command::SwitchError(switch_settings) => {
            check_required_filename(&switch_settings.haplotype_filename, "Haplotype");
            check_required_filename(&switch_settings.blocks_filename, "Phased blocks");
        },
        Command::HapMatch(match_settings) => {
            check_required_filename(&match_settings.haplotypes_filename, "Haplotypes");
            check_required_filename(&match_settings.found_filename, "Found haplotypes");
        },
        Command::VectorError(ve_settings) => {
            check_required_filename(&ve_settings.found_filename, "Found haplotypes");
            match ve_settings.real_filename.as_ref() {
                Some(real_filename) => check_required_filename(real_filename, "Real haplotypes"),
                None => info!("Real haplotypes: second group of \"{}\"", ve_settings.found_filename.display())
            };
        }
    };

    //send the settings back
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Settings::command().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() {
        let settings = Settings::try_parse_from(["phaseval", "simulate", "--matrix-out", "m.txt", "--haplotype-out", "h.txt"]).unwrap();
        match settings.command {
            Command::Simulate(sim_settings) => {
                assert_eq!(sim_settings.simulation_config(), SimulationConfig::default());
                assert!(sim_settings.seed.is_none());
            },
            _ => panic!("wrong subcommand")
        };
    }

    #[test]
    fn test_simulate_paired() {
        let settings = Settings::try_parse_from([
            "phaseval", "-v", "simulate", "-o", "m.txt", "--haplotype-out", "h.txt",
            "--height", "10", "--width", "20", "--fragment-length", "5", "--paired-end", "--insert-length", "3",
            "--seed", "12"
        ]).unwrap();
        assert_eq!(settings.verbosity, 1);
        match settings.command {
            Command::Simulate(sim_settings) => {
                let config = sim_settings.simulation_config();
                assert_eq!(config.paired_end, Some(PairedEnd { insert_length: 3 }));
                assert_eq!(config.span_length(), 13);
                assert_eq!(sim_settings.seed, Some(12));
            },
            _ => panic!("wrong subcommand")
        };
    }

    #[test]
    fn test_read_sim_defaults() {
        let settings = Settings::try_parse_from(["phaseval", "simulate-reads", "-o", "m.txt", "--haplotype-out", "h.txt", "--distribution", "lognormal"]).unwrap();
        match settings.command {
            Command::SimulateReads(read_settings) => {
                let config = read_settings.read_sim_config();
                assert_eq!(config.length.distribution, LengthDistribution::LogNormal);
                assert_eq!(ReadSimConfig { length: LengthModel::default(), ..config }, ReadSimConfig::default());
            },
            _ => panic!("wrong subcommand")
        };
    }

    #[test]
    fn test_mec_options() {
        let settings = Settings::try_parse_from([
            "phaseval", "mec", "-f", "frags.txt", "--blocks", "blocks.txt", "--one-based", "--unmatched", "error",
            "--summary-file", "summary.csv"
        ]).unwrap();
        assert_eq!(settings.summary_filename, Some(PathBuf::from("summary.csv")));
        match settings.command {
            Command::Mec(mec_settings) => {
                assert_eq!(mec_settings.unmatched_policy, UnmatchedPolicy::Error);
                assert_eq!(mec_settings.offset_base(), OffsetBase::One);
                assert_eq!(mec_settings.matrix_format(), MatrixFormat::Short);
            },
            _ => panic!("wrong subcommand")
        };

        // blocks and haplotype are mutually exclusive
        assert!(Settings::try_parse_from(["phaseval", "mec", "-f", "f", "-b", "b", "--haplotype", "h"]).is_err());
        assert!(Settings::try_parse_from(["phaseval", "mec", "-f", "f", "--unmatched", "maybe"]).is_err());
    }

    #[test]
    fn test_long_matrix_filename() {
        assert_eq!(long_matrix_filename(Path::new("out/matrix.txt")), PathBuf::from("out/matrix.txt.long"));
    }
}
