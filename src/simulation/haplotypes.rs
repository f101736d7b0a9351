use crate::data_types::haplotype::{Haplotype, HaplotypeSet};

use rand::Rng;
use rand::seq::SliceRandom;

/// Generates a random set of `ploidy` haplotypes over `width` sites.
/// For diploids, the second haplotype is the complement of the first.
/// For higher ploidy, every site gets at least one 0 and one 1, with the remaining haplotypes drawn uniformly.
/// # Arguments
/// * `ploidy` - the number of haplotypes, at least 2
/// * `width` - the number of sites, at least 1
/// * `rng` - the random source
/// # Panics
/// * if `ploidy` is less than 2 or `width` is 0
pub fn generate_haplotypes<R: Rng + ?Sized>(ploidy: usize, width: usize, rng: &mut R) -> HaplotypeSet {
    assert!(ploidy >= 2 && width >= 1);

    if ploidy == 2 {
        let bits: Vec<bool> = (0..width).map(|_| rng.gen::<bool>()).collect();
        let haplotype = Haplotype::from_bits(&bits);
        let complement = haplotype.complement();
        return HaplotypeSet::from_generated(vec![haplotype, complement]);
    }

    // build site by site, then transpose into haplotypes
    let mut rows: Vec<Vec<bool>> = vec![Vec::with_capacity(width); ploidy];
    let mut column: Vec<bool> = Vec::with_capacity(ploidy);
    for _site in 0..width {
        column.clear();
        column.push(false);
        column.push(true);
        column.extend((2..ploidy).map(|_| rng.gen::<bool>()));
        column.shuffle(rng);
        for (row, &bit) in rows.iter_mut().zip(column.iter()) {
            row.push(bit);
        }
    }

    let haplotypes: Vec<Haplotype> = rows.iter()
        .map(|row| Haplotype::from_bits(row))
        .collect();
    HaplotypeSet::from_generated(haplotypes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_diploid() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let set = generate_haplotypes(2, 50, &mut rng);
        assert_eq!(set.ploidy(), 2);
        assert_eq!(set.width(), 50);
        assert_eq!(set.haplotypes()[1], set.haplotypes()[0].complement());
        assert!(set.is_polymorphic());
    }

    #[test]
    fn test_polyploid() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for ploidy in [3, 4, 6] {
            let set = generate_haplotypes(ploidy, 40, &mut rng);
            assert_eq!(set.ploidy(), ploidy);
            assert_eq!(set.width(), 40);
            assert!(set.is_polymorphic());
        }
    }

    #[test]
    fn test_reproducible() {
        let set1 = generate_haplotypes(4, 25, &mut Xoshiro256PlusPlus::seed_from_u64(7));
        let set2 = generate_haplotypes(4, 25, &mut Xoshiro256PlusPlus::seed_from_u64(7));
        assert_eq!(set1, set2);
    }
}
