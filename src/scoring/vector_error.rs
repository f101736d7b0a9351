use crate::data_types::allele::Allele;
use crate::scoring::ScoreError;

use log::trace;

/// Checks that both sets are non-empty, have the same number of haplotypes, and share a single width.
/// Returns the shared width on success.
fn check_dimensions(found: &[Vec<Allele>], real: &[Vec<Allele>]) -> Result<usize, ScoreError> {
    if found.is_empty() || real.is_empty() || real[0].is_empty() {
        return Err(ScoreError::EmptyInput);
    }
    if found.len() != real.len() {
        return Err(ScoreError::PloidyMismatch { found: found.len(), real: real.len() });
    }
    let expected: usize = real[0].len();
    for (index, haplotype) in found.iter().chain(real.iter()).enumerate() {
        if haplotype.len() != expected {
            return Err(ScoreError::WidthMismatch { index, width: haplotype.len(), expected });
        }
    }
    Ok(expected)
}

/// The full-sequence distance between two found haplotypes, counting only columns where both are called
fn hamming_distance(hap1: &[Allele], hap2: &[Allele]) -> usize {
    hap1.iter().zip(hap2.iter())
        .filter(|(a, b)| a.mismatches(**b))
        .count()
}

/// Returns, for every found haplotype, whether its allele at `column` is present in any real haplotype at that column
fn column_matches(found: &[Vec<Allele>], real: &[Vec<Allele>], column: usize) -> Vec<bool> {
    found.iter()
        .map(|hap| {
            let allele = hap[column];
            allele.is_called() && real.iter().any(|r| r[column] == allele)
        })
        .collect()
}

/// Calculates the vector error between a found and a real haplotype set.
/// This is a per-column dynamic program where the label of each found haplotype may be re-chosen at any column,
/// paying the full-length distance between the two found haplotypes involved.
/// # Arguments
/// * `found` - the `k` reconstructed haplotypes, gaps are never treated as matches
/// * `real` - the `k` true haplotypes
/// # Errors
/// * if either set is empty or has zero width
/// * if the two sets differ in size or any haplotype differs in width
pub fn score_vector_error(found: &[Vec<Allele>], real: &[Vec<Allele>]) -> Result<usize, ScoreError> {
    let num_columns: usize = check_dimensions(found, real)?;
    let ploidy: usize = found.len();

    // pairwise distances only depend on the found set, so compute them once
    let distances: Vec<Vec<usize>> = found.iter()
        .map(|h1| found.iter().map(|h2| hamming_distance(h1, h2)).collect())
        .collect();

    // None means the found haplotype did not match any real haplotype at the column
    let mut previous_matches: Vec<bool> = column_matches(found, real, 0);
    let mut previous_costs: Vec<Option<usize>> = previous_matches.iter()
        .map(|&m| if m { Some(0) } else { None })
        .collect();

    for column in 1..num_columns {
        let current_matches: Vec<bool> = column_matches(found, real, column);
        let current_costs: Vec<Option<usize>> = (0..ploidy)
            .map(|hap| {
                if !current_matches[hap] {
                    return None;
                }
                // upper bound for the column
                let mut best: usize = column * ploidy;
                for hap2 in 0..ploidy {
                    if !previous_matches[hap2] {
                        continue;
                    }
                    if let Some(cost) = previous_costs[hap2] {
                        best = best.min(cost + distances[hap][hap2]);
                    }
                }
                Some(best)
            })
            .collect();
        trace!("column {column}: {current_costs:?}");

        previous_matches = current_matches;
        previous_costs = current_costs;
    }

    let vector_error: usize = previous_costs.iter()
        .flatten()
        .copied()
        .min()
        .unwrap_or(ploidy * num_columns);
    Ok(vector_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::allele::parse_alleles;

    fn haps(values: &[&str]) -> Vec<Vec<Allele>> {
        values.iter().map(|v| parse_alleles(v).unwrap()).collect()
    }

    #[test]
    fn test_identical_sets() {
        let real = haps(&["0110", "1001"]);
        assert_eq!(score_vector_error(&real, &real).unwrap(), 0);

        let real = haps(&["0110", "1001", "1100", "0011"]);
        assert_eq!(score_vector_error(&real, &real).unwrap(), 0);

        let real = haps(&["0", "1"]);
        assert_eq!(score_vector_error(&real, &real).unwrap(), 0);
    }

    #[test]
    fn test_relabeled_set() {
        // swapping which found haplotype is which does not cost anything by itself
        let real = haps(&["0110", "1001"]);
        let found = haps(&["1001", "0110"]);
        assert_eq!(score_vector_error(&found, &real).unwrap(), 0);
    }

    #[test]
    fn test_unmatched_columns() {
        // found haplotypes never match at the last column, so the worst case is reported
        let real = haps(&["000", "000"]);
        let found = haps(&["001", "001"]);
        assert_eq!(score_vector_error(&found, &real).unwrap(), 6);

        // the distance between two found haplotypes is paid when switching labels
        let real = haps(&["0000", "0000"]);
        let found = haps(&["0001", "0010"]);
        assert_eq!(score_vector_error(&found, &real).unwrap(), 2);
    }

    #[test]
    fn test_gaps_never_match() {
        let real = haps(&["01", "10"]);
        let found = haps(&["0-", "1-"]);
        assert_eq!(score_vector_error(&found, &real).unwrap(), 4);
    }

    #[test]
    fn test_dimension_errors() {
        let real = haps(&["01", "10"]);
        assert_eq!(score_vector_error(&haps(&["01"]), &real), Err(ScoreError::PloidyMismatch { found: 1, real: 2 }));
        assert_eq!(score_vector_error(&haps(&["01", "1"]), &real), Err(ScoreError::WidthMismatch { index: 1, width: 1, expected: 2 }));
        assert_eq!(score_vector_error(&[], &real), Err(ScoreError::EmptyInput));
    }
}
