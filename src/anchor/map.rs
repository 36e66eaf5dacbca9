//! Translation of one alignment's operation list into per-stride-point
//! read-base offsets.

use crate::utils::{GenomicRegion, Result};

pub use rust_htslib::bam::record::Cigar as CigarOp;

/// An alignment's operation list together with its reference start.
#[derive(Debug, Clone, PartialEq)]
pub struct Cigar {
    pub ref_pos: i64,
    pub ops: Vec<CigarOp>,
}

/// Walks the alignment operations and reports, for every stride point of
/// `region`, the offset of the read base aligned to that reference
/// position, or `None` where the alignment does not reach it.
///
/// Anchor points sit at absolute reference positions that are multiples of
/// `stride`; slot `i` of the output corresponds to reference position
/// `start + i*stride`. The offset is recorded on every reference-consuming
/// step, so a stride point falling inside a deletion carries the read
/// offset immediately preceding the deleted span rather than `None`.
pub fn map_anchor_offsets(
    cigar: &Cigar,
    region: &GenomicRegion,
    stride: i64,
) -> Result<Vec<Option<i64>>> {
    let mut out = vec![None; region.num_stride_points(stride)];

    let mut read_pos: i64 = 0;
    let mut ref_pos: i64 = cigar.ref_pos;

    for op in &cigar.ops {
        if ref_pos > region.end {
            break;
        }

        let (read_inc, ref_inc): (i64, i64) = match op {
            CigarOp::Match(_) | CigarOp::Equal(_) | CigarOp::Diff(_) => (1, 1),
            CigarOp::Del(_) | CigarOp::RefSkip(_) => (0, 1),
            CigarOp::Ins(_) | CigarOp::SoftClip(_) => (1, 0),
            // hard clips advance the read offset the same as soft clips
            CigarOp::HardClip(_) => (1, 0),
            other => {
                return Err(format!(
                    "Unhandled alignment operation {} in record starting at {}:{}",
                    other, region.contig, cigar.ref_pos
                ))
            }
        };

        for _ in 0..op.len() {
            if ref_inc > 0
                && ref_pos >= region.start
                && ref_pos <= region.end
                && ref_pos % stride == 0
            {
                out[((ref_pos - region.start) / stride) as usize] = Some(read_pos);
            }
            read_pos += read_inc;
            ref_pos += ref_inc;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    fn make_cigar(ref_pos: i64, encoding: &str) -> Cigar {
        let ops = CigarString::try_from(encoding).unwrap().to_vec();
        Cigar { ref_pos, ops }
    }

    fn region(start: i64, end: i64) -> GenomicRegion {
        GenomicRegion::new("chr1", start, end).unwrap()
    }

    #[test]
    fn all_match_alignment_maps_identity() {
        let cigar = make_cigar(0, "150M");
        let out = map_anchor_offsets(&cigar, &region(0, 100), 10).unwrap();
        assert_eq!(out.len(), 11);
        for (i, offset) in out.iter().enumerate() {
            assert_eq!(*offset, Some(10 * i as i64));
        }
    }

    #[test]
    fn insertion_shifts_only_downstream_anchors() {
        let plain = map_anchor_offsets(&make_cigar(0, "55M"), &region(0, 40), 10).unwrap();
        let inserted = map_anchor_offsets(&make_cigar(0, "25M5I25M"), &region(0, 40), 10).unwrap();
        assert_eq!(inserted[0], plain[0]);
        assert_eq!(inserted[1], plain[1]);
        assert_eq!(inserted[2], plain[2]);
        assert_eq!(inserted[3], plain[3].map(|offset| offset + 5));
        assert_eq!(inserted[4], plain[4].map(|offset| offset + 5));
        assert_eq!(inserted[3], Some(35));
    }

    #[test]
    fn anchor_inside_deletion_repeats_preceding_offset() {
        let out = map_anchor_offsets(&make_cigar(0, "18M5D30M"), &region(0, 40), 10).unwrap();
        assert_eq!(out[1], Some(10));
        // ref 20 is deleted; the offset freezes at the base before the gap
        assert_eq!(out[2], Some(18));
        assert_eq!(out[3], Some(25));
    }

    #[test]
    fn reference_skip_consumes_reference_like_deletion() {
        let deleted = map_anchor_offsets(&make_cigar(0, "18M5D30M"), &region(0, 40), 10).unwrap();
        let skipped = map_anchor_offsets(&make_cigar(0, "18M5N30M"), &region(0, 40), 10).unwrap();
        assert_eq!(deleted, skipped);
    }

    #[test]
    fn soft_and_hard_clips_advance_read_offset_identically() {
        let soft = map_anchor_offsets(&make_cigar(0, "5S50M"), &region(0, 40), 10).unwrap();
        let hard = map_anchor_offsets(&make_cigar(0, "5H50M"), &region(0, 40), 10).unwrap();
        assert_eq!(soft, hard);
        assert_eq!(soft[0], Some(5));
        assert_eq!(soft[4], Some(45));
    }

    #[test]
    fn alignment_starting_inside_region_leaves_leading_anchors_unset() {
        let out = map_anchor_offsets(&make_cigar(25, "50M"), &region(0, 60), 10).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        assert_eq!(out[3], Some(5));
        assert_eq!(out[6], Some(35));
    }

    #[test]
    fn anchors_sit_at_absolute_stride_multiples() {
        // region starting off-grid: the first anchorable position is 10
        let out = map_anchor_offsets(&make_cigar(0, "100M"), &region(5, 45), 10).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], Some(10));
        assert_eq!(out[1], Some(20));
        assert_eq!(out[4], None);
    }

    #[test]
    fn walk_stops_once_past_region_end() {
        // the trailing pad op is never reached because ref_pos > end
        let out = map_anchor_offsets(&make_cigar(0, "50M10P"), &region(0, 40), 10).unwrap();
        assert_eq!(out[4], Some(40));
    }

    #[test]
    fn pad_operation_is_rejected() {
        let err = map_anchor_offsets(&make_cigar(0, "10M5P30M"), &region(0, 40), 10);
        assert!(err.is_err());
        assert!(err.unwrap_err().contains("Unhandled alignment operation"));
    }
}
