use log::debug;

/// Picks `remaining` distinct offsets in [0, `valid_starts`) that are spread out across the range.
/// When fewer than half of the offsets are needed, take every `valid_starts / remaining`-th offset.
/// Otherwise exclude every `valid_starts / (valid_starts - remaining)`-th offset and take from what is left,
/// padding from the excluded offsets if the stride left too few behind.
fn spread_offsets(remaining: usize, valid_starts: usize) -> Vec<usize> {
    assert!(remaining < valid_starts);
    if remaining == 0 {
        return vec![];
    }

    if 2 * remaining <= valid_starts {
        let step: usize = valid_starts / remaining;
        return (0..valid_starts).step_by(step).take(remaining).collect();
    }

    let step: usize = valid_starts / (valid_starts - remaining);
    let (excluded, kept): (Vec<usize>, Vec<usize>) = (0..valid_starts).partition(|i| i % step == 0);
    let mut offsets: Vec<usize> = kept.into_iter().take(remaining).collect();
    if offsets.len() < remaining {
        debug!("Padding {} extra start offsets from the excluded set", remaining - offsets.len());
        let missing: usize = remaining - offsets.len();
        offsets.extend(excluded.into_iter().take(missing));
    }
    offsets
}

/// Assigns a start offset to each of `height` fragments so that every offset in [0, `valid_starts`) is used
/// either `height / valid_starts` or one more time.
/// The result is ordered by offset; shuffle it before handing it out.
/// # Arguments
/// * `height` - the number of fragments
/// * `valid_starts` - the number of legal start offsets
/// # Panics
/// * if `valid_starts` is 0
pub fn balanced_start_offsets(height: usize, valid_starts: usize) -> Vec<usize> {
    assert!(valid_starts > 0);
    let per_site: usize = height / valid_starts;
    let remaining: usize = height - per_site * valid_starts;

    let mut starts: Vec<usize> = Vec::with_capacity(height);
    for _ in 0..per_site {
        starts.extend(0..valid_starts);
    }
    starts.extend(spread_offsets(remaining, valid_starts));
    starts.sort_unstable();
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_counts(starts: &[usize], valid_starts: usize) -> Vec<usize> {
        let mut counts = vec![0; valid_starts];
        for &s in starts.iter() {
            counts[s] += 1;
        }
        counts
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(balanced_start_offsets(6, 3), vec![0, 0, 1, 1, 2, 2]);
        assert_eq!(balanced_start_offsets(4, 1), vec![0; 4]);
    }

    #[test]
    fn test_sparse_remainder() {
        // 2 extra over 10 offsets, every 5th one
        assert_eq!(balanced_start_offsets(2, 10), vec![0, 5]);
        assert_eq!(balanced_start_offsets(12, 10).len(), 12);
    }

    #[test]
    fn test_dense_remainder() {
        // 7 of 10 offsets, excluding every 3rd leaves 1, 2, 4, 5, 7, 8
        // so one excluded offset is needed as padding
        assert_eq!(balanced_start_offsets(7, 10), vec![0, 1, 2, 4, 5, 7, 8]);
        // 3 of 4 offsets: exclude every 4th -> 1, 2, 3
        assert_eq!(balanced_start_offsets(3, 4), vec![1, 2, 3]);
    }

    #[test]
    fn test_balanced_grid() {
        for valid_starts in 1..40 {
            for height in 1..120 {
                let starts = balanced_start_offsets(height, valid_starts);
                assert_eq!(starts.len(), height);
                let counts = usage_counts(&starts, valid_starts);
                let min = *counts.iter().min().unwrap();
                let max = *counts.iter().max().unwrap();
                assert!(max - min <= 1, "height={height} valid_starts={valid_starts} counts={counts:?}");
                assert_eq!(min, height / valid_starts);
            }
        }
    }
}
