//! Anchored-column scaffold construction for signal-level read realignment.
//!
//! Given long reads aligned to a reference region, this crate walks each
//! alignment to tie evenly spaced reference positions ("stride points") to
//! per-read, per-strand raw-signal event indices, then transposes the
//! per-read results into the column-major grid consumed by a downstream
//! HMM consensus step.

pub mod anchor;
pub mod signal;
pub mod utils;

pub use anchor::{
    build_realignment_input, Anchor, AnchoredColumn, Params, ReadAnchorSet, RealignmentInput,
};
pub use signal::{SignalCatalog, SignalRead, Strand};
pub use utils::GenomicRegion;
