mod readers;
mod region;
mod seq;

pub use readers::{check_missing_bam_index, check_missing_faidx, open_bam_reader, open_genome_reader};
pub use region::GenomicRegion;
pub use seq::reverse_complement;

pub type Result<T> = std::result::Result<T, String>;
