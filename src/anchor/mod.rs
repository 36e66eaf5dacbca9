mod builder;
mod input;
mod map;

pub use builder::{build_realignment_input, Params};
pub use input::{Anchor, AnchoredColumn, ReadAnchorSet, RealignmentInput};
pub use map::{map_anchor_offsets, Cigar, CigarOp};
