//! Measured-or-synthetic profile selection.

use rand::Rng;
use serde::Serialize;
use stages::providers::{ProfileSource, TrackProvider};
use stages::{PowerError, ProfileCurve, RealTrack, StageRecord};
use tracing::{debug, info};

use crate::config::SynthesisConfig;
use crate::synthesis::synthesize_stage;

/// Profile chosen for a stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "profile", rename_all = "snake_case")]
pub enum SelectedProfile {
    /// A measured track, exactly as the provider returned it.
    Measured(RealTrack),
    Synthetic(ProfileCurve),
}

impl SelectedProfile {
    pub fn is_measured(&self) -> bool {
        matches!(self, SelectedProfile::Measured(_))
    }
}

/// Returns the measured track when there is one, otherwise synthesizes a
/// profile from the stage's totals and profile class.
pub fn select_profile(
    stage: &StageRecord,
    real_track: Option<RealTrack>,
    config: &SynthesisConfig,
    rng: &mut impl Rng,
) -> Result<SelectedProfile, PowerError> {
    match real_track {
        Some(track) => {
            debug!(stage = %stage.key(), source = ?track.source, "Using measured track");
            Ok(SelectedProfile::Measured(track))
        }
        None => {
            debug!(stage = %stage.key(), "Synthesizing profile");
            Ok(SelectedProfile::Synthetic(synthesize_stage(stage, config, rng)?))
        }
    }
}

/// Looks up the requested source with `provider`, then applies [`select_profile`].
///
/// `Estimated` never consults the provider. A requested track that does not
/// exist falls back to synthesis.
pub fn select_from_provider(
    stage: &StageRecord,
    provider: &dyn TrackProvider,
    source: &ProfileSource,
    config: &SynthesisConfig,
    rng: &mut impl Rng,
) -> Result<SelectedProfile, PowerError> {
    let key = stage.key();
    let real_track = match source {
        ProfileSource::Estimated => None,
        ProfileSource::Gpx => provider.route(key)?,
        ProfileSource::Rider(rider) => provider.power_trace(key, rider)?,
    };

    if real_track.is_none() && *source != ProfileSource::Estimated {
        info!("No {source:?} track for {key}, falling back to an estimated profile");
    }

    select_profile(stage, real_track, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stages::providers::InMemoryTracks;
    use stages::{Coordinate, StageKey, StageType, TrackPoint, TrackSource};

    fn stage(icon: &str) -> StageRecord {
        StageRecord {
            year: 2023,
            stage_index: 14,
            departure: "Annemasse".into(),
            arrival: "Morzine".into(),
            stage_type: StageType::Race,
            distance_km: 152.0,
            vertical_meters: 4200.0,
            gc_weight_kg: 61.0,
            gc_stage_time_s: 14_700.0,
            gc_speed_m_s: 10.3,
            grade: 0.0276,
            departure_coord: Coordinate { lat: 46.19, lon: 6.23 },
            arrival_coord: Coordinate { lat: 46.18, lon: 6.71 },
            departure_elevation_m: 430.0,
            arrival_elevation_m: 960.0,
            profile_icon: icon.into(),
            winner: Some("Rodriguez".into()),
            gc_leader: Some("Vingegaard".into()),
            winner_time: None,
        }
    }

    fn track_points() -> Vec<TrackPoint> {
        vec![
            TrackPoint {
                distance_km: 0.0,
                elevation_m: 430.0,
                lat: 46.19,
                lon: 6.23,
                power_w: None,
            },
            TrackPoint {
                distance_km: 0.137,
                elevation_m: 431.25,
                lat: 46.191,
                lon: 6.231,
                power_w: None,
            },
        ]
    }

    #[test]
    fn test_measured_track_passes_through() {
        let mut rng = StdRng::seed_from_u64(1);
        let track = RealTrack::new(TrackSource::MeasuredGps, track_points());
        let selected =
            select_profile(&stage("p5"), Some(track.clone()), &SynthesisConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(selected, SelectedProfile::Measured(track));
    }

    #[test]
    fn test_synthesizes_without_track() {
        let mut rng = StdRng::seed_from_u64(1);
        let selected =
            select_profile(&stage("p5"), None, &SynthesisConfig::default(), &mut rng).unwrap();
        let SelectedProfile::Synthetic(curve) = selected else {
            panic!("expected a synthetic profile");
        };
        assert_eq!(curve.len(), 14);
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = select_profile(&stage("p9"), None, &SynthesisConfig::default(), &mut rng);
        assert!(matches!(result, Err(PowerError::UnknownProfileClass(_))));
    }

    #[test]
    fn test_provider_lookup() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = StageKey::new(2023, 14);
        let provider = InMemoryTracks::new()
            .with_route(key, track_points())
            .with_power_trace(key, "Kuss", track_points());
        let config = SynthesisConfig::default();
        let s = stage("p3");

        let gpx = select_from_provider(&s, &provider, &ProfileSource::Gpx, &config, &mut rng)
            .unwrap();
        assert!(matches!(
            gpx,
            SelectedProfile::Measured(RealTrack { source: TrackSource::MeasuredGps, .. })
        ));

        let rider = ProfileSource::Rider("Kuss".into());
        let trace = select_from_provider(&s, &provider, &rider, &config, &mut rng).unwrap();
        assert!(matches!(
            trace,
            SelectedProfile::Measured(RealTrack { source: TrackSource::MeasuredPowerTrace { .. }, .. })
        ));

        let estimated =
            select_from_provider(&s, &provider, &ProfileSource::Estimated, &config, &mut rng)
                .unwrap();
        assert!(!estimated.is_measured());

        let missing = ProfileSource::Rider("Pogacar".into());
        let fallback = select_from_provider(&s, &provider, &missing, &config, &mut rng).unwrap();
        assert!(!fallback.is_measured());
    }
}
