use crate::data_types::haplotype::HaplotypeSet;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one line of `0`/`1` per haplotype, in set order
pub fn write_haplotypes<W: Write>(writer: &mut W, haplotypes: &HaplotypeSet) -> std::io::Result<()> {
    for haplotype in haplotypes.haplotypes().iter() {
        writeln!(writer, "{haplotype}")?;
    }
    Ok(())
}

/// Saves a haplotype set to a file
/// # Errors
/// * if the file cannot be created or written
pub fn save_haplotypes(filename: &Path, haplotypes: &HaplotypeSet) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(filename)?);
    write_haplotypes(&mut writer, haplotypes)?;
    writer.flush()
}
