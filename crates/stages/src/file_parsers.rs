//! Measured track parsers for GPX routes and TCX power traces.
//!
//! Both parsers produce [`TrackPoint`]s with a cumulative distance in km, so a
//! measured track can be plotted against the same axis as a synthesized curve.

use std::io::Read;

use geo::{Distance as _, Haversine, Point};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::models::TrackPoint;

/// Error type for parsing failures
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse GPX file: {0}")]
    GpxError(String),
    #[error("Failed to parse TCX file: {0}")]
    TcxError(String),
    #[error("No track points found")]
    EmptyTrack,
}

/// Parse a GPX route, flattening every track and segment in file order.
///
/// The first point sits at 0 km; each following point adds the haversine
/// distance to its predecessor within the same segment. The gap between two
/// segments is not counted. A point without elevation keeps the previous one.
pub fn parse_gpx(reader: impl Read) -> Result<Vec<TrackPoint>, ParseError> {
    let gpx = gpx::read(reader).map_err(|e| ParseError::GpxError(e.to_string()))?;

    let mut points = Vec::new();
    let mut distance_km = 0.0;
    let mut last_elevation: Option<f64> = None;

    for track in &gpx.tracks {
        for seg in &track.segments {
            let mut prev: Option<Point> = None;
            for pt in &seg.points {
                let point = pt.point();
                let elevation_m = pt.elevation.or(last_elevation).unwrap_or(0.0);
                if let Some(prev) = prev {
                    distance_km += Haversine.distance(prev, point) / 1000.0;
                }

                points.push(TrackPoint {
                    distance_km,
                    elevation_m,
                    lat: point.y(),
                    lon: point.x(),
                    power_w: None,
                });
                prev = Some(point);
                last_elevation = Some(elevation_m);
            }
        }
    }

    if points.is_empty() {
        return Err(ParseError::EmptyTrack);
    }
    Ok(points)
}

#[derive(Debug, Default)]
struct PendingTrackpoint {
    lat: Option<f64>,
    lon: Option<f64>,
    altitude_m: Option<f64>,
    distance_m: Option<f64>,
    watts: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
enum TcxField {
    Latitude,
    Longitude,
    Altitude,
    Distance,
    Watts,
}

impl TcxField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"LatitudeDegrees" => Some(TcxField::Latitude),
            b"LongitudeDegrees" => Some(TcxField::Longitude),
            b"AltitudeMeters" => Some(TcxField::Altitude),
            b"DistanceMeters" => Some(TcxField::Distance),
            b"Watts" => Some(TcxField::Watts),
            _ => None,
        }
    }
}

/// Parse a TCX (Training Center XML) activity into a power trace.
///
/// Trackpoints without a position are skipped. Power is read from the
/// `TPX/Watts` extension under any namespace prefix. Distance comes from
/// `DistanceMeters`, or is accumulated from positions when a point lacks it.
pub fn parse_tcx(content: &str) -> Result<Vec<TrackPoint>, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut points: Vec<TrackPoint> = Vec::new();
    let mut pending: Option<PendingTrackpoint> = None;
    let mut field: Option<TcxField> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == b"Trackpoint" {
                    pending = Some(PendingTrackpoint::default());
                } else if pending.is_some() {
                    field = TcxField::from_local_name(name.as_ref());
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(f), Some(tp)) = (field, pending.as_mut()) {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::TcxError(format!("Failed to unescape text: {e}")))?;
                    let value: f64 = text.trim().parse().map_err(|_| {
                        ParseError::TcxError(format!("Expected a number in {f:?}, got {text:?}"))
                    })?;
                    match f {
                        TcxField::Latitude => tp.lat = Some(value),
                        TcxField::Longitude => tp.lon = Some(value),
                        TcxField::Altitude => tp.altitude_m = Some(value),
                        TcxField::Distance => tp.distance_m = Some(value),
                        TcxField::Watts => tp.watts = Some(value),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                field = None;
                if e.local_name().as_ref() == b"Trackpoint" {
                    if let Some(tp) = pending.take() {
                        push_trackpoint(&mut points, tp);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::TcxError(format!("XML parsing error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    if points.is_empty() {
        return Err(ParseError::EmptyTrack);
    }
    Ok(points)
}

fn push_trackpoint(points: &mut Vec<TrackPoint>, tp: PendingTrackpoint) {
    let (Some(lat), Some(lon)) = (tp.lat, tp.lon) else {
        return;
    };
    let prev = points.last();
    let distance_km = match (tp.distance_m, prev) {
        (Some(meters), _) => meters / 1000.0,
        (None, Some(p)) => {
            p.distance_km
                + Haversine.distance(Point::new(p.lon, p.lat), Point::new(lon, lat)) / 1000.0
        }
        (None, None) => 0.0,
    };
    let elevation_m = tp
        .altitude_m
        .or_else(|| prev.map(|p| p.elevation_m))
        .unwrap_or(0.0);

    points.push(TrackPoint {
        distance_km,
        elevation_m,
        lat,
        lon,
        power_w: tp.watts,
    });
}
