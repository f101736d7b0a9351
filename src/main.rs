
use phaseval::cli::{Command, HapMatchSettings, MecSettings, ReadSimSettings, Settings, SimulateSettings, SwitchErrorSettings, VectorErrorSettings, check_settings, get_raw_settings, long_matrix_filename};
use phaseval::data_types::allele::Allele;
use phaseval::data_types::phase_block::PhaseBlock;
use phaseval::readers::{MatrixFormat, ParseError};
use phaseval::readers::block_reader::load_phase_blocks;
use phaseval::readers::haplotype_reader::{AlleleRow, load_allele_groups, load_haplotype_set};
use phaseval::readers::matrix_reader::load_fragment_matrix;
use phaseval::scoring::mec::{diploid_reference, score_mec, score_mec_haplotype};
use phaseval::scoring::switch_flip::{best_haplotype_matches, count_best_matches, score_switch_flip};
use phaseval::scoring::vector_error::score_vector_error;
use phaseval::simulation::fragment_sim::simulate_fragments;
use phaseval::simulation::read_sim::simulate_reads;
use phaseval::writers::haplotype_writer::save_haplotypes;
use phaseval::writers::matrix_writer::save_fragment_matrix;
use phaseval::writers::score_writer::{SummaryRow, SummaryWriter};

use log::{LevelFilter, debug, error, info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use simple_error::bail;
use std::error::Error;
use std::time::Instant;

fn main() {
    // get the settings
    let settings: Settings = get_raw_settings();
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: Settings = check_settings(settings);
    let start_time: Instant = Instant::now();

    let summary_row: SummaryRow = match &cli_settings.command {
        Command::Simulate(sim_settings) => run_simulate(sim_settings),
        Command::SimulateReads(read_settings) => run_simulate_reads(read_settings),
        Command::Mec(mec_settings) => run_mec(mec_settings),
        Command::SwitchError(switch_settings) => run_switch_error(switch_settings),
        Command::HapMatch(match_settings) => run_hap_match(match_settings),
        Command::VectorError(ve_settings) => run_vector_error(ve_settings)
    };

    if let Some(summary_filename) = cli_settings.summary_filename.as_ref() {
        let write_result = SummaryWriter::new(summary_filename)
            .and_then(|mut writer| writer.write_row(&summary_row));
        if let Err(e) = write_result {
            error!("Error while writing summary file: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Finished in {:.3} seconds.", start_time.elapsed().as_secs_f64());
}

/// Logs a loading failure and exits with the matching code
fn exit_on_parse_error(e: &ParseError, label: &str) -> ! {
    error!("Error while loading {}: {}", label, e);
    let code: exitcode::ExitCode = match e {
        ParseError::Open { .. } => exitcode::NOINPUT,
        ParseError::Read { .. } => exitcode::IOERR,
        ParseError::Malformed { .. } => exitcode::DATAERR
    };
    std::process::exit(code);
}

/// Builds the RNG from the provided seed, or picks (and logs) a random one
fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    let seed: u64 = match seed {
        Some(s) => s,
        None => {
            let s: u64 = rand::thread_rng().gen();
            info!("No seed provided, using random seed {s}");
            s
        }
    };
    debug!("Random seed: {seed}");
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

fn run_simulate(settings: &SimulateSettings) -> SummaryRow {
    let config = settings.simulation_config();
    let mut rng = seeded_rng(settings.seed);
    let result = match simulate_fragments(&config, &mut rng) {
        Ok(r) => r,
        Err(e) => {
            // already validated, but just in case
            error!("Invalid simulation settings: {}", e);
            std::process::exit(exitcode::USAGE);
        }
    };

    let mut outputs = vec![(settings.matrix_filename.clone(), MatrixFormat::Short)];
    if settings.long_format {
        outputs.push((long_matrix_filename(&settings.matrix_filename), MatrixFormat::Long));
    }
    for (filename, format) in outputs.iter() {
        if let Err(e) = save_fragment_matrix(filename, &result.fragments, *format) {
            error!("Error while writing fragment matrix to {:?}: {}", filename, e);
            std::process::exit(exitcode::IOERR);
        }
    }
    if let Err(e) = save_haplotypes(&settings.haplotype_filename, &result.haplotypes) {
        error!("Error while writing haplotypes to {:?}: {}", settings.haplotype_filename, e);
        std::process::exit(exitcode::IOERR);
    }

    let stats = result.stats;
    info!("Simulated {} fragments over {} sites: {} calls, {} gaps, {} errors",
        result.fragments.height(), config.width, stats.total_calls, stats.gaps_injected, stats.errors_injected);
    SummaryRow::from_simulation("simulate", &settings.matrix_filename, result.fragments.height(), config.width, &stats)
}

fn run_simulate_reads(settings: &ReadSimSettings) -> SummaryRow {
    let config = settings.read_sim_config();
    let mut rng = seeded_rng(settings.seed);
    let result = match simulate_reads(&config, &mut rng) {
        Ok(r) => r,
        Err(e) => {
            error!("Invalid read simulation settings: {}", e);
            std::process::exit(exitcode::USAGE);
        }
    };

    if result.fragments.height() == 0 {
        warn!("No reads covered at least two SNPs, the fragment matrix is empty");
    }
    if let Err(e) = save_fragment_matrix(&settings.matrix_filename, &result.fragments, MatrixFormat::Short) {
        error!("Error while writing fragment matrix to {:?}: {}", settings.matrix_filename, e);
        std::process::exit(exitcode::IOERR);
    }
    if let Err(e) = save_haplotypes(&settings.haplotype_filename, &result.haplotypes) {
        error!("Error while writing haplotypes to {:?}: {}", settings.haplotype_filename, e);
        std::process::exit(exitcode::IOERR);
    }

    let stats = result.stats;
    info!("Simulated {} fragments over {} SNPs (genome length {}): {} calls, {} errors",
        result.fragments.height(), config.num_snps, result.genome_length, stats.total_calls, stats.errors_injected);
    SummaryRow::from_simulation("simulate-reads", &settings.matrix_filename, result.fragments.height(), config.num_snps, &stats)
}

fn run_mec(settings: &MecSettings) -> SummaryRow {
    let matrix = match load_fragment_matrix(&settings.fragments_filename, settings.matrix_format(), settings.offset_base()) {
        Ok(m) => m,
        Err(e) => exit_on_parse_error(&e, "fragment matrix")
    };
    debug!("Loaded {} fragments spanning {} sites", matrix.height(), matrix.width());

    let score_result = match (settings.blocks_filename.as_ref(), settings.haplotype_filename.as_ref()) {
        (Some(blocks_filename), _) => {
            let blocks: Vec<PhaseBlock> = match load_phase_blocks(blocks_filename) {
                Ok(b) => b,
                Err(e) => exit_on_parse_error(&e, "phased blocks")
            };
            debug!("Loaded {} phased blocks", blocks.len());
            score_mec(matrix.fragments(), &blocks, settings.unmatched_policy)
        },
        (None, Some(haplotype_filename)) => {
            let haplotypes = match load_haplotype_set(haplotype_filename) {
                Ok(h) => h,
                Err(e) => exit_on_parse_error(&e, "haplotype")
            };
            let haplotype = match diploid_reference(&haplotypes) {
                Ok(h) => h,
                Err(e) => {
                    error!("Error while loading {:?}: {}", haplotype_filename, e);
                    std::process::exit(exitcode::DATAERR);
                }
            };
            if let Some(index) = matrix.first_out_of_bounds(haplotype.width()) {
                warn!("Fragment {} extends past the {} haplotype sites", index, haplotype.width());
            }
            score_mec_haplotype(matrix.fragments(), haplotype, settings.unmatched_policy)
        },
        (None, None) => {
            error!("Exactly one of --blocks or --haplotype must be provided");
            std::process::exit(exitcode::USAGE);
        }
    };

    let score = match score_result {
        Ok(s) => s,
        Err(e) => {
            error!("Error while scoring: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };
    if score.unmatched_fragments > 0 {
        warn!("{} fragments were not contained in any block and were excluded from the MEC", score.unmatched_fragments);
    }

    println!("MEC: {}", score.mec);
    println!("Fragment Matrix 0/1 Entries: {}", score.total_entries);
    println!("Unmatched fragments: {}", score.unmatched_fragments);
    SummaryRow::from_mec(&settings.fragments_filename, &score)
}

fn run_switch_error(settings: &SwitchErrorSettings) -> SummaryRow {
    let haplotypes = match load_haplotype_set(&settings.haplotype_filename) {
        Ok(h) => h,
        Err(e) => exit_on_parse_error(&e, "haplotype")
    };
    if haplotypes.ploidy() > 1 {
        debug!("Haplotype file has {} lines, only the first is compared", haplotypes.ploidy());
    }
    let blocks: Vec<PhaseBlock> = match load_phase_blocks(&settings.blocks_filename) {
        Ok(b) => b,
        Err(e) => exit_on_parse_error(&e, "phased blocks")
    };

    let score = match score_switch_flip(&haplotypes.haplotypes()[0], &blocks) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while scoring: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };
    debug!("Compared {} phased sites across {} blocks", score.compared_sites, blocks.len());

    println!("Switch: {}", score.switches);
    println!("Flip: {}", score.flips);
    SummaryRow::from_switch_flip(&settings.blocks_filename, &score)
}

fn run_hap_match(settings: &HapMatchSettings) -> SummaryRow {
    let haplotypes = match load_haplotype_set(&settings.haplotypes_filename) {
        Ok(h) => h,
        Err(e) => exit_on_parse_error(&e, "haplotypes")
    };
    let found = match load_fragment_matrix(&settings.found_filename, MatrixFormat::Short, settings.offset_base()) {
        Ok(m) => m,
        Err(e) => exit_on_parse_error(&e, "found haplotypes")
    };

    // every found segment is compared as its own block
    let blocks: Vec<PhaseBlock> = found.fragments().iter()
        .map(|f| PhaseBlock::new(f.offset(), f.alleles().to_vec()))
        .collect();
    let matches = match best_haplotype_matches(&blocks, &haplotypes) {
        Ok(m) => m,
        Err(e) => {
            error!("Error while scoring: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };

    for best in matches.iter() {
        println!("{} : {}", best.errors, haplotypes.haplotypes()[best.haplotype_index]);
    }

    let counts = count_best_matches(&matches);
    for haplotype_index in 0..haplotypes.ploidy() {
        info!("Haplotype {}: best match for {} segments", haplotype_index, counts.get(&haplotype_index).unwrap_or(&0));
    }
    SummaryRow::from_best_matches(&settings.found_filename, &matches)
}

/// Converts groups of rows into plain allele vectors
fn group_alleles(group: Vec<AlleleRow>) -> Vec<Vec<Allele>> {
    group.into_iter().map(|row| row.alleles).collect()
}

/// Loads the found and real sets, either from two files or from two blank-line separated groups in one file
fn load_vector_error_sets(settings: &VectorErrorSettings) -> Result<(Vec<Vec<Allele>>, Vec<Vec<Allele>>), Box<dyn Error>> {
    let mut found_groups = load_allele_groups(&settings.found_filename)?;
    match settings.real_filename.as_ref() {
        Some(real_filename) => {
            let found: Vec<Vec<Allele>> = found_groups.into_iter().flat_map(group_alleles).collect();
            let real: Vec<Vec<Allele>> = load_allele_groups(real_filename)?.into_iter().flat_map(group_alleles).collect();
            Ok((found, real))
        },
        None => {
            if found_groups.len() != 2 {
                bail!("expected found and real haplotypes as two groups separated by a blank line, found {} group(s)", found_groups.len());
            }
            let real_group = found_groups.pop().unwrap_or_default();
            let found_group = found_groups.pop().unwrap_or_default();
            Ok((group_alleles(found_group), group_alleles(real_group)))
        }
    }
}

fn run_vector_error(settings: &VectorErrorSettings) -> SummaryRow {
    let (found, real) = match load_vector_error_sets(settings) {
        Ok(sets) => sets,
        Err(e) => {
            if let Some(parse_error) = e.downcast_ref::<ParseError>() {
                exit_on_parse_error(parse_error, "haplotype sets");
            }
            error!("Error while loading haplotype sets: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };
    debug!("Loaded {} found and {} real haplotypes", found.len(), real.len());

    let vector_error = match score_vector_error(&found, &real) {
        Ok(ve) => ve,
        Err(e) => {
            error!("Error while scoring: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };

    println!("{vector_error}");
    SummaryRow::from_vector_error(&settings.found_filename, vector_error)
}
