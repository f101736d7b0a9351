use crate::data_types::allele::Allele;
use crate::data_types::phase_block::PhaseBlock;
use crate::readers::{MalformedKind, ParseError, numbered_lines, open_input, parse_integer};

use log::{debug, trace};
use std::io::BufRead;
use std::path::Path;

/// Upper bound on the `len` of a single block marker, far above any real phase block
pub const MAX_BLOCK_LENGTH: usize = 1 << 28;

/// Parses a block marker like `BLOCK: offset: 5 len: 4 phased: 4 ...` into a 0-based (start, length)
fn parse_block_marker(fields: &[&str]) -> Result<(usize, usize), MalformedKind> {
    if fields.len() < 5 {
        return Err(MalformedKind::BlockMarker);
    }
    let offset: usize = parse_integer(fields[2]).map_err(|_| MalformedKind::BlockMarker)?;
    let length: usize = parse_integer(fields[4]).map_err(|_| MalformedKind::BlockMarker)?;
    if offset == 0 {
        return Err(MalformedKind::ZeroIndex);
    }
    if length > MAX_BLOCK_LENGTH || offset.checked_add(length).is_none() {
        return Err(MalformedKind::BlockLength { length, max: MAX_BLOCK_LENGTH });
    }
    Ok((offset - 1, length))
}

/// Loads phased blocks from a HapCUT-style output.
/// A `BLOCK` marker line opens a block covering 1-based sites `offset..offset+len-1`, followed by
/// one `<1-based site> <allele> ...` line per phased site, and a line starting with `*` closes it.
/// Sites that never get a line stay as gaps.
/// # Arguments
/// * `reader` - the source of lines
/// # Errors
/// * if a marker does not have numeric offset/len fields, or `len` is above `MAX_BLOCK_LENGTH`
/// * if a site line appears outside a block, points outside its block, or has a bad allele
pub fn read_phase_blocks<R: BufRead>(reader: R) -> Result<Vec<PhaseBlock>, ParseError> {
    let mut blocks: Vec<PhaseBlock> = vec![];
    let mut current_block: Option<PhaseBlock> = None;

    for line_result in numbered_lines(reader) {
        let (line_number, line) = line_result?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        if fields[0].contains("BLOCK") {
            // a new marker implicitly closes any open block
            if let Some(block) = current_block.take() {
                blocks.push(block);
            }
            let (start, length) = parse_block_marker(&fields)
                .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
            trace!("Opening block at {start} with length {length}");
            current_block = Some(PhaseBlock::unphased(start, length));
        } else if fields[0].contains('*') {
            if let Some(block) = current_block.take() {
                blocks.push(block);
            }
        } else {
            if fields.len() < 2 {
                return Err(ParseError::malformed(line_number, &line, MalformedKind::FieldCount { expected: 2, found: fields.len() }));
            }
            let raw_site: usize = parse_integer(fields[0])
                .map_err(|kind| ParseError::malformed(line_number, &line, kind))?;
            let site: usize = raw_site.checked_sub(1)
                .ok_or_else(|| ParseError::malformed(line_number, &line, MalformedKind::ZeroIndex))?;

            let mut chars = fields[1].chars();
            let allele: Allele = match (chars.next(), chars.next()) {
                (Some(c), None) => Allele::from_char(c)
                    .ok_or_else(|| ParseError::malformed(line_number, &line, MalformedKind::AlleleChar { column: 0, character: c }))?,
                _ => return Err(ParseError::malformed(line_number, &line, MalformedKind::FieldCount { expected: 2, found: fields.len() }))
            };

            let block: &mut PhaseBlock = current_block.as_mut()
                .ok_or_else(|| ParseError::malformed(line_number, &line, MalformedKind::SiteWithoutBlock))?;
            if !block.range().contains(&site) {
                return Err(ParseError::malformed(line_number, &line, MalformedKind::SiteOutsideBlock {
                    site: raw_site,
                    first: block.get_start() + 1,
                    last: block.get_end()
                }));
            }
            block.set_allele(site, allele);
        }
    }

    if let Some(block) = current_block.take() {
        blocks.push(block);
    }
    debug!("Loaded {} phase blocks", blocks.len());
    Ok(blocks)
}

/// Loads phased blocks from a file; `.gz` files are decompressed
pub fn load_phase_blocks(filename: &Path) -> Result<Vec<PhaseBlock>, ParseError> {
    let reader = open_input(filename)?;
    read_phase_blocks(reader)
}
