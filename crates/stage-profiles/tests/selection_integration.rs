//! End-to-end profile selection against tracks on disk.

use std::fs;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use stage_profiles::prelude::*;
use stages::{Coordinate, StageType};

const ROUTE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="45.09" lon="6.07"><ele>720.0</ele></trkpt>
    <trkpt lat="45.10" lon="6.07"><ele>910.0</ele></trkpt>
    <trkpt lat="45.11" lon="6.06"><ele>1120.0</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

fn alpe_stage() -> StageRecord {
    StageRecord {
        year: 2022,
        stage_index: 12,
        departure: "Briançon".into(),
        arrival: "Alpe d'Huez".into(),
        stage_type: StageType::Race,
        distance_km: 165.1,
        vertical_meters: 4750.0,
        gc_weight_kg: 60.0,
        gc_stage_time_s: 17_820.0,
        gc_speed_m_s: 9.26,
        grade: 0.0288,
        departure_coord: Coordinate { lat: 44.9, lon: 6.64 },
        arrival_coord: Coordinate { lat: 45.09, lon: 6.07 },
        departure_elevation_m: 1326.0,
        arrival_elevation_m: 1850.0,
        profile_icon: "p5".into(),
        winner: Some("Pidcock".into()),
        gc_leader: Some("Vingegaard".into()),
        winner_time: None,
    }
}

fn write_routes(test_id: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "stage-profiles-{test_id}-{}",
        std::process::id()
    ));
    let year_dir = root.join("Routes").join("2022");
    fs::create_dir_all(&year_dir).unwrap();
    fs::write(year_dir.join("stage-12-parcours.gpx"), ROUTE_GPX).unwrap();
    root
}

#[test]
fn test_measured_route_is_returned_unchanged() {
    let root = write_routes("measured");
    let dir = RouteDirectory::new(&root);
    let stage = alpe_stage();
    let mut rng = StdRng::seed_from_u64(3);

    let expected = dir.route(stage.key()).unwrap().unwrap();
    let selected = select_from_provider(
        &stage,
        &dir,
        &ProfileSource::Gpx,
        &SynthesisConfig::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(selected, SelectedProfile::Measured(expected));

    fs::remove_dir_all(root).ok();
}

#[test]
fn test_missing_trace_falls_back_to_synthesis() {
    let root = write_routes("fallback");
    let dir = RouteDirectory::new(&root);
    let stage = alpe_stage();
    let mut rng = StdRng::seed_from_u64(3);

    let selected = select_from_provider(
        &stage,
        &dir,
        &ProfileSource::Rider("Kuss".into()),
        &SynthesisConfig::default(),
        &mut rng,
    )
    .unwrap();

    let SelectedProfile::Synthetic(curve) = selected else {
        panic!("expected a synthetic profile");
    };
    // Mountains with an uphill finish: 7 peaks.
    assert_eq!(curve.len(), 14);
    assert_eq!(curve.points[0].distance_km, 0.0);
    assert_eq!(curve.points[0].elevation_m, 1326.0);
    assert_eq!(curve.points[13].elevation_m, 1850.0);
    assert!((curve.total_distance_km() - 165.1).abs() < 1e-9);

    fs::remove_dir_all(root).ok();
}

#[test]
fn test_synthetic_profiles_per_class() {
    let config = SynthesisConfig::default();
    let mut rng = StdRng::seed_from_u64(21);

    for class in ProfileClass::ALL {
        let mut stage = alpe_stage();
        stage.profile_icon = class.icon().to_string();
        let shape = shape_for(class);

        let SelectedProfile::Synthetic(curve) =
            select_profile(&stage, None, &config, &mut rng).unwrap()
        else {
            panic!("expected a synthetic profile for {class}");
        };
        assert_eq!(curve.len(), shape.peak_count * 2);
        for pair in curve.points.windows(2) {
            assert!(pair[1].distance_km >= pair[0].distance_km);
        }
        // Peaks rise from the departure valley by the drawn gains.
        let max = curve.max_elevation_m().unwrap();
        assert!(max > stage.departure_elevation_m);
    }
}

#[test]
fn test_selected_profile_json() {
    let mut rng = StdRng::seed_from_u64(5);
    let selected =
        select_profile(&alpe_stage(), None, &SynthesisConfig::default(), &mut rng).unwrap();
    let json = serde_json::to_value(&selected).unwrap();
    assert_eq!(json["type"], "synthetic");
    assert_eq!(json["profile"]["points"].as_array().unwrap().len(), 14);
}
