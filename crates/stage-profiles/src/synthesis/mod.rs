//! Synthetic profile generation.
//!
//! - [`segments`]: random segments scaled to a fixed total
//! - [`profile`]: valley/peak curves built from those segments

mod profile;
mod segments;

pub use profile::{
    ProfileShape, ProfileTargets, shape_for, synthesize_profile, synthesize_stage,
};
pub use segments::{SegmentMode, scaled_random_segments, scaled_random_segments_with};
