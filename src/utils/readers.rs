use super::Result;
use rust_htslib::{bam, faidx};
use std::path::Path;

pub fn open_bam_reader(bam_path: &Path) -> Result<bam::IndexedReader> {
    check_missing_bam_index(bam_path)?;
    bam::IndexedReader::from_path(bam_path)
        .map_err(|e| format!("Failed to open alignment file {}: {}", bam_path.display(), e))
}

pub fn check_missing_bam_index(bam_path: &Path) -> Result<()> {
    let ext = bam_path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let bai = bam_path.with_extension(format!("{ext}.bai"));
    let csi = bam_path.with_extension(format!("{ext}.csi"));
    if !bai.exists() && !csi.exists() {
        return Err(format!(
            "Alignment index not found: {}. Create it with 'samtools index {}'",
            bai.display(),
            bam_path.display()
        ));
    }
    Ok(())
}

pub fn open_genome_reader(fasta_path: &Path) -> Result<faidx::Reader> {
    check_missing_faidx(fasta_path)?;
    faidx::Reader::from_path(fasta_path)
        .map_err(|e| format!("Failed to open genome file {}: {}", fasta_path.display(), e))
}

pub fn check_missing_faidx(fasta: &Path) -> Result<()> {
    let ext = fasta.extension().and_then(|s| s.to_str()).unwrap_or("");
    let fai = fasta.with_extension(format!("{ext}.fai"));
    if !fai.exists() {
        return Err(format!(
            "Reference index not found: {}. Create it with 'samtools faidx {}'",
            fai.display(),
            fasta.display()
        ));
    }
    let lower = fasta.to_string_lossy().to_ascii_lowercase();
    if lower.ends_with(".gz") || lower.ends_with(".bgz") || lower.ends_with(".bgzip") {
        let gzi = fasta.with_extension(format!("{ext}.gzi"));
        if !gzi.exists() {
            return Err(format!(
                "Compressed FASTA appears to be missing its .gzi index: {}. \
                 Create it with 'samtools faidx {}'",
                gzi.display(),
                fasta.display()
            ));
        }
    }
    Ok(())
}
