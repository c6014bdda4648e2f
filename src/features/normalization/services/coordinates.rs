use crate::features::normalization::models::{
    BoundingBox, CoordinateEncoding, Coordinates, RegionProfile,
};
use crate::features::regions::models::{field_text, RawRecord};
use crate::shared::validation::{DEGREE_MINUTES_REGEX, WKT_POINT_REGEX};

/// Largest power of ten tried when rescaling a WKT component
const MAX_WKT_SCALE: i32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateOutcome {
    Found(Coordinates),
    /// Something was published but no encoding produced an in-box position
    Rejected(String),
    Absent,
}

/// Parse a decimal number, accepting a comma separator. Zero means unset.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim().replace(',', ".");
    match text.parse::<f64>() {
        Ok(v) if v != 0.0 && v.is_finite() => Some(v),
        _ => None,
    }
}

/// Integer micro-degrees become degrees; values that already look like
/// degrees are left untouched.
pub fn from_micro_degrees(value: f64) -> f64 {
    if value.abs() > 1000.0 {
        value / 1_000_000.0
    } else {
        value
    }
}

fn degree_minutes_component(part: &str) -> Option<f64> {
    let caps = DEGREE_MINUTES_REGEX.captures(part)?;
    let degrees_text = &caps[1];
    let degrees: f64 = degrees_text.parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let magnitude = degrees.abs() + minutes / 60.0;
    // "-0° 30'" still carries its sign in the text
    if degrees_text.starts_with('-') {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// `"43° 18.856', -8° 17.165'"` as `(lat, lon)`
pub fn parse_degree_minutes(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.split_once(',')?;
    Some((
        degree_minutes_component(lat)?,
        degree_minutes_component(lon)?,
    ))
}

/// The two numbers of a `POINT(x y)` literal, in text order
pub fn parse_wkt_point(text: &str) -> Option<(f64, f64)> {
    let caps = WKT_POINT_REGEX.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Fit a WKT point into `bounds`.
///
/// Published points come with either axis order and with the decimal point
/// dropped, so both orders are tried (`x` as longitude first) and each
/// component is divided by `10^k` for `k` in `0..=8` until the pair lands
/// inside the box.
pub fn adjust_wkt_point(x: f64, y: f64, bounds: &BoundingBox) -> Option<Coordinates> {
    for (lat_raw, lon_raw) in [(y, x), (x, y)] {
        for lat_scale in 0..=MAX_WKT_SCALE {
            let latitude = lat_raw / 10f64.powi(lat_scale);
            if !(bounds.min_lat..=bounds.max_lat).contains(&latitude) {
                continue;
            }
            for lon_scale in 0..=MAX_WKT_SCALE {
                let longitude = lon_raw / 10f64.powi(lon_scale);
                if bounds.contains(latitude, longitude) {
                    return Some(Coordinates {
                        latitude,
                        longitude,
                    });
                }
            }
        }
    }
    None
}

fn try_encoding(
    record: &RawRecord,
    encoding: &CoordinateEncoding,
    bounds: &BoundingBox,
) -> Option<Result<Coordinates, String>> {
    let in_box = |lat: f64, lon: f64| {
        if bounds.contains(lat, lon) {
            Ok(Coordinates {
                latitude: lat,
                longitude: lon,
            })
        } else {
            Err(format!("coordinates ({}, {}) outside region bounds", lat, lon))
        }
    };

    match encoding {
        CoordinateEncoding::MicroDegrees { lat, lon } => {
            let lat = parse_number(&field_text(record, lat))?;
            let lon = parse_number(&field_text(record, lon))?;
            Some(in_box(from_micro_degrees(lat), from_micro_degrees(lon)))
        }
        CoordinateEncoding::DegreeMinutes(keys) => {
            let text = field_text(record, keys);
            let (lat, lon) = parse_degree_minutes(&text)?;
            Some(in_box(lat, lon))
        }
        CoordinateEncoding::WktPoint(keys) => {
            let text = field_text(record, keys);
            let (x, y) = parse_wkt_point(&text)?;
            Some(
                adjust_wkt_point(x, y, bounds)
                    .ok_or_else(|| format!("point '{}' cannot be fitted to region bounds", text)),
            )
        }
        CoordinateEncoding::Decimal { lat, lon } => {
            let lat = parse_number(&field_text(record, lat))?;
            let lon = parse_number(&field_text(record, lon))?;
            Some(in_box(lat, lon))
        }
    }
}

/// Try the profile's encodings in order and keep the first in-box position
pub fn extract_coordinates(record: &RawRecord, profile: &RegionProfile) -> CoordinateOutcome {
    let mut rejection = None;
    for encoding in profile.coordinates {
        match try_encoding(record, encoding, &profile.bounds) {
            Some(Ok(coords)) => return CoordinateOutcome::Found(coords),
            Some(Err(reason)) => {
                rejection.get_or_insert(reason);
            }
            None => {}
        }
    }
    rejection.map_or(CoordinateOutcome::Absent, CoordinateOutcome::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::regions::models::Region;
    use serde_json::json;

    fn bounds(region: Region) -> BoundingBox {
        RegionProfile::for_region(region).bounds
    }

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_wkt_point_is_rescaled_into_catalonia() {
        let coords = adjust_wkt_point(413028.0, 2175842.0, &bounds(Region::Cat)).unwrap();
        assert!((coords.latitude - 41.3028).abs() < 1e-9);
        assert!((coords.longitude - 2.175842).abs() < 1e-9);
    }

    #[test]
    fn test_wkt_point_that_never_fits_is_absent() {
        assert_eq!(adjust_wkt_point(413028.0, 2175842.0, &bounds(Region::Gal)), None);
    }

    #[test]
    fn test_wkt_point_in_lon_lat_order() {
        let coords = adjust_wkt_point(-0.3763, 39.4699, &bounds(Region::Cv)).unwrap();
        assert_eq!(coords.latitude, 39.4699);
        assert_eq!(coords.longitude, -0.3763);
    }

    #[test]
    fn test_parse_degree_minutes() {
        let (lat, lon) = parse_degree_minutes("43° 18.856', -8° 17.165'").unwrap();
        assert!((lat - 43.314266).abs() < 1e-5);
        assert!((lon + 8.286083).abs() < 1e-5);
        assert!(parse_degree_minutes("sin datos").is_none());
    }

    #[test]
    fn test_micro_degrees() {
        assert_eq!(from_micro_degrees(41_387_400.0), 41.3874);
        assert_eq!(from_micro_degrees(2.17), 2.17);
    }

    #[test]
    fn test_extract_catalan_micro_degrees() {
        let profile = RegionProfile::for_region(Region::Cat);
        let r = record(json!({"lat": "41387400", "long": "2168600"}));
        assert!(matches!(extract_coordinates(&r, profile), CoordinateOutcome::Found(_)));

        let zero = record(json!({"lat": "0", "long": "0"}));
        assert_eq!(extract_coordinates(&zero, profile), CoordinateOutcome::Absent);
    }

    #[test]
    fn test_extract_out_of_box_is_rejected() {
        let profile = RegionProfile::for_region(Region::Cv);
        let r = record(json!({"LATITUD": "41.38", "LONGITUD": "2.17"}));
        assert!(matches!(
            extract_coordinates(&r, profile),
            CoordinateOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_extract_falls_through_to_wkt() {
        let profile = RegionProfile::for_region(Region::Cat);
        let r = record(json!({"geocoded_column": "POINT(413028 2175842)"}));
        assert!(matches!(extract_coordinates(&r, profile), CoordinateOutcome::Found(_)));
    }
}
