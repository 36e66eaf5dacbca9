//! Region-level construction of the anchored-column grid.
//!
//! For every alignment overlapping the requested region, the builder maps
//! stride points to read-base offsets, resolves those offsets into signal
//! event indices on both physical strands, harvests read-derived candidate
//! sequences for each inter-anchor interval, and finally transposes the
//! per-read results into the column-major `RealignmentInput`.

use crate::anchor::input::{Anchor, AnchoredColumn, ReadAnchorSet, RealignmentInput};
use crate::anchor::map::{map_anchor_offsets, Cigar};
use crate::signal::{SignalCatalog, SignalRead, Strand};
use crate::utils::{
    open_bam_reader, open_genome_reader, reverse_complement, GenomicRegion, Result,
};
use itertools::Itertools;
use rust_htslib::bam::{self, ext::BamRecordExtensions, Read};
use std::path::Path;
use std::str;

/// Anchoring parameters shared by every call of a region build.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Spacing between anchored reference positions.
    pub stride: i64,
    /// Window size (in bases) modeled by one signal event.
    pub motif_len: usize,
}

impl Params {
    pub fn new(stride: i64, motif_len: usize) -> Result<Self> {
        if stride <= 0 {
            return Err(format!("Invalid anchor stride {}: must be positive", stride));
        }
        if motif_len == 0 {
            return Err("Invalid motif length 0: must be positive".to_string());
        }
        Ok(Params { stride, motif_len })
    }
}

/// Builds the realignment scaffold for one reference region.
///
/// Opens the indexed alignment file and the reference FASTA, loads a signal
/// read through `catalog` for every primary alignment overlapping `region`,
/// and assembles one `AnchoredColumn` per stride point. The grid is fully
/// populated before it is returned; any failure aborts the whole build and
/// no partial result is handed out.
pub fn build_realignment_input<C: SignalCatalog>(
    bam_path: &Path,
    genome_path: &Path,
    catalog: &C,
    region: &GenomicRegion,
    params: &Params,
) -> Result<RealignmentInput<C::Read>> {
    let mut bam = open_bam_reader(bam_path)?;
    let genome = open_genome_reader(genome_path)?;

    if bam.header().tid(region.contig.as_bytes()).is_none() {
        return Err(format!(
            "Contig {} is missing from the header of {}",
            region.contig,
            bam_path.display()
        ));
    }

    // the last anchorable position sits at region.end, so fetch through it
    let mut ref_segment = genome
        .fetch_seq(&region.contig, region.start as usize, region.end as usize)
        .map_err(|e| format!("Error fetching reference sequence for {}: {}", region, e))?
        .to_vec();
    ref_segment.make_ascii_uppercase();

    bam.fetch((region.contig.as_str(), region.start, region.end))
        .map_err(|e| format!("BAM fetch error for region {}: {}", region, e))?;

    let num_points = region.num_stride_points(params.stride);
    let mut reads = Vec::new();
    let mut read_anchors = Vec::new();
    let mut alt_by_interval = vec![Vec::new(); num_points.saturating_sub(1)];

    let mut record = bam::Record::new();
    while let Some(result) = bam.read(&mut record) {
        result.map_err(|e| format!("Error reading alignment record in {}: {}", region, e))?;
        if record.is_supplementary() || record.is_secondary() || record.is_unmapped() {
            continue;
        }

        let read_name = str::from_utf8(record.qname())
            .map_err(|_| format!("Non-UTF-8 read name in {}", region))?
            .to_string();
        let locator = catalog.resolve(&read_name)?;
        let signal_read = catalog.load(&read_name, &locator)?;

        let cigar = Cigar {
            ref_pos: record.reference_start(),
            ops: record.cigar().take().to_vec(),
        };
        let anchor_offsets = map_anchor_offsets(&cigar, region, params.stride)?;

        let do_base_rc = record.is_reverse();
        let anchors = resolve_read_anchors(&signal_read, &anchor_offsets, do_base_rc)
            .map_err(|e| format!("Read {}: {}", read_name, e))?;

        let candidates =
            extract_alt_candidates(&signal_read, &anchor_offsets, do_base_rc, params.motif_len);
        for (ai, candidate) in candidates.into_iter().enumerate() {
            if let Some(candidate) = candidate {
                alt_by_interval[ai].push(candidate);
            }
        }

        reads.push(signal_read);
        read_anchors.push(anchors);
    }

    if reads.is_empty() {
        return Err(format!("No alignments overlap region {}", region));
    }
    log::debug!("{}: anchoring {} reads", region, reads.len());

    let columns =
        transpose_into_columns(&read_anchors, alt_by_interval, &ref_segment, num_points, params)?;

    Ok(RealignmentInput { reads, columns })
}

/// Resolves the per-stride base offsets of one read into event anchors on
/// both physical strands.
///
/// Reverse-aligned reads have each offset flipped into the opposite
/// coordinate frame before the event lookup; the two strands always carry
/// opposite effective orientations. A failed lookup for a known-valid
/// offset aborts the build.
fn resolve_read_anchors<R: SignalRead>(
    read: &R,
    anchor_offsets: &[Option<i64>],
    do_base_rc: bool,
) -> Result<ReadAnchorSet> {
    let mut anchors = ReadAnchorSet::new(anchor_offsets.len());

    for (ai, offset) in anchor_offsets.iter().enumerate() {
        let Some(offset) = *offset else {
            continue;
        };

        let offset = if do_base_rc {
            read.flip_base_offset(offset)
        } else {
            offset
        };

        for strand in Strand::BOTH {
            let event_index = read
                .closest_event(offset, strand)
                .ok_or_else(|| format!("no {} event near base offset {}", strand, offset))?;
            let is_reverse = match strand {
                Strand::Template => do_base_rc,
                Strand::Complement => !do_base_rc,
            };
            anchors.set(strand, ai, Anchor { event_index, is_reverse });
        }
    }

    Ok(anchors)
}

/// Extracts one read-derived candidate sequence per inter-anchor interval
/// covered on both sides by the read.
///
/// Each candidate spans the read bases between two consecutive anchors plus
/// `motif_len` trailing bases, so candidates of adjacent intervals share
/// their boundary bases the same way adjacent reference windows do. For
/// reverse-aligned reads the interval endpoints are flipped and swapped
/// before extraction and the span is reverse-complemented afterwards.
fn extract_alt_candidates<R: SignalRead>(
    read: &R,
    anchor_offsets: &[Option<i64>],
    do_base_rc: bool,
    motif_len: usize,
) -> Vec<Option<Vec<u8>>> {
    let mut candidates = vec![None; anchor_offsets.len().saturating_sub(1)];

    let max_offset = read.base_sequence().len() as i64 - motif_len as i64;
    if max_offset < 0 {
        return candidates;
    }

    for (ai, (cur, next)) in anchor_offsets.iter().tuple_windows().enumerate() {
        let (Some(cur), Some(next)) = (*cur, *next) else {
            continue;
        };

        let (mut span_start, mut span_end) = (cur, next);
        if do_base_rc {
            span_start = read.flip_base_offset(span_start);
            span_end = read.flip_base_offset(span_end);
            std::mem::swap(&mut span_start, &mut span_end);
        }

        let span_start = span_start.clamp(0, max_offset) as usize;
        let span_end = span_end.clamp(0, max_offset) as usize;

        let Some(span) = read.base_sequence().get(span_start..span_end + motif_len) else {
            continue;
        };
        candidates[ai] = Some(if do_base_rc {
            reverse_complement(span)
        } else {
            span.to_vec()
        });
    }

    candidates
}

/// Transposes the read-major anchor sets into one `AnchoredColumn` per
/// stride point, attaching the reference window and candidate sequences to
/// every non-terminal column.
fn transpose_into_columns(
    read_anchors: &[ReadAnchorSet],
    mut alt_by_interval: Vec<Vec<Vec<u8>>>,
    ref_segment: &[u8],
    num_points: usize,
    params: &Params,
) -> Result<Vec<AnchoredColumn>> {
    for anchors in read_anchors {
        if anchors.num_stride_points() != num_points {
            return Err(format!(
                "Anchor grid mismatch: a read produced {} stride points, expected {}",
                anchors.num_stride_points(),
                num_points
            ));
        }
    }

    let anchors_per_column = 2 * read_anchors.len();
    let stride = params.stride as usize;

    let mut columns = Vec::with_capacity(num_points);
    for ai in 0..num_points {
        let mut column = AnchoredColumn::default();
        for anchors in read_anchors {
            column.anchors.push(anchors.get(Strand::Template, ai));
            column.anchors.push(anchors.get(Strand::Complement, ai));
        }

        if column.anchors.len() != anchors_per_column {
            return Err(format!(
                "Column {} holds {} anchors, expected {}",
                ai,
                column.anchors.len(),
                anchors_per_column
            ));
        }

        // every column but the last carries the reference window for the
        // interval up to the next anchor, clipped at the segment's edge
        if ai + 1 < num_points {
            let window_start = ai * stride;
            let window_end = (window_start + stride + params.motif_len).min(ref_segment.len());
            let window = ref_segment.get(window_start..window_end).ok_or_else(|| {
                format!("Reference segment ends before the window of column {}", ai)
            })?;
            column.base_sequence = Some(window.to_vec());
            column.alt_sequences = std::mem::take(&mut alt_by_interval[ai]);
        }

        columns.push(column);
    }

    Ok(columns)
}
