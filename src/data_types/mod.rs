
/// Contains the Allele type and string conversions
pub mod allele;
/// Contains the Fragment observation type and the FragmentMatrix collection
pub mod fragment;
/// Contains Haplotype and HaplotypeSet
pub mod haplotype;
/// Contains the PhaseBlock type produced by external phasing tools
pub mod phase_block;
