/// CLI functionality and checks
pub mod cli;
/// Contains the core data types: alleles, haplotypes, fragments, and phase blocks
pub mod data_types;
/// Contains the loaders for fragment matrices, phased blocks, and haplotype files
pub mod readers;
/// Phasing accuracy metrics: MEC, switch/flip errors, and vector error
pub mod scoring;
/// Fragment matrix and read simulators
pub mod simulation;
/// Contains all the various output writer functionality
pub mod writers;
