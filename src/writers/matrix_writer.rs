use crate::data_types::allele::alleles_to_string;
use crate::data_types::fragment::FragmentMatrix;
use crate::readers::MatrixFormat;

use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one `<offset>\t<alleles>` line per fragment, offsets are 0-based.
/// Empty fragments have nothing to write and are left out.
/// # Arguments
/// * `writer` - the output sink
/// * `matrix` - the fragments to write
pub fn write_short_matrix<W: Write>(writer: &mut W, matrix: &FragmentMatrix) -> std::io::Result<()> {
    for fragment in matrix.fragments().iter() {
        if fragment.is_empty() {
            continue;
        }
        writeln!(writer, "{}\t{}", fragment.offset(), alleles_to_string(fragment.alleles()))?;
    }
    Ok(())
}

/// Writes the matrix as a `height` line, a `width` line, and one full-width row per fragment.
/// # Arguments
/// * `writer` - the output sink
/// * `matrix` - the fragments to write, the matrix width determines the row length
pub fn write_long_matrix<W: Write>(writer: &mut W, matrix: &FragmentMatrix) -> std::io::Result<()> {
    let width: usize = matrix.width();
    writeln!(writer, "{}", matrix.height())?;
    writeln!(writer, "{width}")?;
    for fragment in matrix.fragments().iter() {
        writeln!(writer, "{}", fragment.to_row_string(width))?;
    }
    Ok(())
}

/// Saves a fragment matrix to a file in the given format
/// # Arguments
/// * `filename` - the output path, overwritten if it exists
/// * `matrix` - the fragments to write
/// * `format` - short or long format
/// # Errors
/// * if the file cannot be created or written
pub fn save_fragment_matrix(filename: &Path, matrix: &FragmentMatrix, format: MatrixFormat) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(filename)?);
    match format {
        MatrixFormat::Short => write_short_matrix(&mut writer, matrix)?,
        MatrixFormat::Long => write_long_matrix(&mut writer, matrix)?
    };
    writer.flush()?;
    debug!("Wrote {} fragments to {filename:?} ({format})", matrix.height());
    Ok(())
}
