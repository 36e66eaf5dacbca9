use super::Result;
use std::fmt;

/// A reference interval; anchor grids treat `end` as the last anchorable
/// position.
#[derive(Debug, PartialEq, Clone)]
pub struct GenomicRegion {
    pub contig: String,
    pub start: i64,
    pub end: i64,
}

impl GenomicRegion {
    pub fn new(contig: impl Into<String>, start: i64, end: i64) -> Result<Self> {
        if start < 0 {
            return Err(format!("Invalid region: negative start {}", start));
        }
        if start >= end {
            return Err(format!("Invalid region: start {} >= end {}", start, end));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    pub fn from_string(encoding: &str) -> Result<Self> {
        let elements: Vec<&str> = encoding.split(&[':', '-']).collect();
        if elements.len() != 3 {
            return Err(format!(
                "Invalid region encoding '{}': expected 'chrom:start-end'",
                encoding
            ));
        }

        let start: i64 = elements[1].parse().map_err(|_| {
            format!(
                "Invalid region encoding '{}': start '{}' must be a non-negative integer",
                encoding, elements[1]
            )
        })?;

        let end: i64 = elements[2].parse().map_err(|_| {
            format!(
                "Invalid region encoding '{}': end '{}' must be a non-negative integer",
                encoding, elements[2]
            )
        })?;

        Self::new(elements[0], start, end)
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of anchor points placed every `stride` bases across the region,
    /// including both boundary positions.
    pub fn num_stride_points(&self, stride: i64) -> usize {
        ((self.end - self.start) / stride + 1) as usize
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}
