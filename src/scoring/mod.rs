
/// Minimum error correction scoring of fragments against phase blocks
pub mod mec;
/// Switch and flip error counting against a true haplotype
pub mod switch_flip;
/// Vector error between a found and a real haplotype set
pub mod vector_error;

/// Dimension and bounds problems detected while scoring
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ScoreError {
    #[error("found set has {found} haplotypes but real set has {real}")]
    PloidyMismatch { found: usize, real: usize },
    #[error("haplotype {index} has width {width}, expected {expected}")]
    WidthMismatch { index: usize, width: usize, expected: usize },
    #[error("haplotype sets must contain at least one haplotype with at least one site")]
    EmptyInput,
    #[error("block {index} covers sites up to {end}, but the haplotype only has {width} sites")]
    BlockOutOfBounds { index: usize, end: usize, width: usize },
    #[error("MEC against a haplotype file requires a diploid set, found {ploidy} haplotypes")]
    UnsupportedPloidy { ploidy: usize }
}
