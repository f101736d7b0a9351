/// Contains the writer for true haplotype files
pub mod haplotype_writer;
/// Contains writers for short and long format fragment matrices
pub mod matrix_writer;
/// Contains the writer for the per-run score summary (csv/tsv)
pub mod score_writer;
