//! Stage elevation profiles for display.
//!
//! A stage is shown with its measured track when one exists (an official GPX
//! route or a rider's TCX power trace); otherwise a plausible profile is
//! synthesized from the stage totals and its profile class.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stage_profiles::prelude::*;
//!
//! let provider = RouteDirectory::new("./Data");
//! let mut rng = rand::thread_rng();
//! let profile = select_from_provider(
//!     &stage,
//!     &provider,
//!     &ProfileSource::Gpx,
//!     &SynthesisConfig::default(),
//!     &mut rng,
//! )?;
//! ```

pub mod config;
pub mod selector;
pub mod synthesis;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{DrawRange, SynthesisConfig};
    pub use crate::selector::{SelectedProfile, select_from_provider, select_profile};
    pub use crate::synthesis::{
        ProfileShape, ProfileTargets, SegmentMode, scaled_random_segments, shape_for,
        synthesize_profile, synthesize_stage,
    };
    pub use stages::providers::{InMemoryTracks, ProfileSource, RouteDirectory, TrackProvider};
    pub use stages::{ProfileClass, ProfileCurve, RealTrack, StageRecord};
}
