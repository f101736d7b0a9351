use crate::scoring::mec::MecScore;
use crate::scoring::switch_flip::{BestMatch, SwitchFlipScore};
use crate::simulation::SimulationStats;

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One row of the summary file; columns that do not apply to a subcommand are left empty
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryRow {
    /// the subcommand that produced the row
    command: String,
    /// the primary input (or output, for simulations) of the run
    input: String,
    /// MEC scoring
    mec: Option<usize>,
    total_entries: Option<usize>,
    unmatched_fragments: Option<usize>,
    /// switch/flip scoring
    switches: Option<usize>,
    flips: Option<usize>,
    compared_sites: Option<usize>,
    /// best haplotype matching
    matched_blocks: Option<usize>,
    best_match_errors: Option<usize>,
    /// vector error
    vector_error: Option<usize>,
    /// simulation
    height: Option<usize>,
    width: Option<usize>,
    total_calls: Option<usize>,
    gaps_injected: Option<usize>,
    errors_injected: Option<usize>
}

impl SummaryRow {
    fn new(command: &str, input: &Path) -> SummaryRow {
        SummaryRow {
            command: command.to_string(),
            input: input.display().to_string(),
            ..Default::default()
        }
    }

    pub fn from_mec(input: &Path, score: &MecScore) -> SummaryRow {
        SummaryRow {
            mec: Some(score.mec),
            total_entries: Some(score.total_entries),
            unmatched_fragments: Some(score.unmatched_fragments),
            ..Self::new("mec", input)
        }
    }

    pub fn from_switch_flip(input: &Path, score: &SwitchFlipScore) -> SummaryRow {
        SummaryRow {
            switches: Some(score.switches),
            flips: Some(score.flips),
            compared_sites: Some(score.compared_sites),
            ..Self::new("switch-error", input)
        }
    }

    /// Summarizes best matches as the number of blocks and the sum of their errors
    pub fn from_best_matches(input: &Path, matches: &[BestMatch]) -> SummaryRow {
        SummaryRow {
            matched_blocks: Some(matches.len()),
            best_match_errors: Some(matches.iter().map(|m| m.errors).sum()),
            ..Self::new("hap-match", input)
        }
    }

    pub fn from_vector_error(input: &Path, vector_error: usize) -> SummaryRow {
        SummaryRow {
            vector_error: Some(vector_error),
            ..Self::new("vector-error", input)
        }
    }

    /// # Arguments
    /// * `command` - which simulator produced the matrix
    /// * `output` - the matrix file that was written
    /// * `height` - the number of fragments written
    /// * `width` - the number of sites
    /// * `stats` - what the noise model did
    pub fn from_simulation(command: &str, output: &Path, height: usize, width: usize, stats: &SimulationStats) -> SummaryRow {
        SummaryRow {
            height: Some(height),
            width: Some(width),
            total_calls: Some(stats.total_calls),
            gaps_injected: Some(stats.gaps_injected),
            errors_injected: Some(stats.errors_injected),
            ..Self::new(command, output)
        }
    }
}

/// This is a wrapper for writing score summaries to a delimited file
pub struct SummaryWriter<W: Write> {
    /// Handle for the CSV writer
    csv_writer: csv::Writer<W>
}

impl SummaryWriter<File> {
    /// Creates a new writer for a given filename
    /// # Arguments
    /// * `filename` - the path to write the summary to, comma-delimited if it ends with `.csv` and tab-delimited otherwise
    pub fn new(filename: &Path) -> csv::Result<SummaryWriter<File>> {
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;
        Ok(SummaryWriter {
            csv_writer
        })
    }
}

impl<W: Write> SummaryWriter<W> {
    /// Wraps an arbitrary sink with the given delimiter
    pub fn from_writer(writer: W, delimiter: u8) -> SummaryWriter<W> {
        SummaryWriter {
            csv_writer: csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_writer(writer)
        }
    }

    /// Writes a single row, the header is emitted before the first one
    pub fn write_row(&mut self, row: &SummaryRow) -> csv::Result<()> {
        self.csv_writer.serialize(row)?;
        self.csv_writer.flush()?;
        Ok(())
    }
}
