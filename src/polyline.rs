//! Encoded polyline codec.
//!
//! The route service returns its path as an encoded polyline (5-decimal
//! precision, the encoding used by the major mapping APIs): each coordinate
//! is a delta from the previous one, zigzag-signed, emitted as a sequence of
//! base-64-ish 5-bit chunks offset by 63. Decoding rejects malformed input
//! with an error rather than panicking, since the payload arrives from the
//! network.

use std::fmt;

use crate::GpsPoint;

const PRECISION: f64 = 1e5;

/// Error decoding an encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// The input ended in the middle of a varint chunk sequence.
    Truncated,
    /// A byte outside the valid encoding range (63..=126).
    InvalidByte(u8),
}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolylineError::Truncated => write!(f, "polyline ends mid-coordinate"),
            PolylineError::InvalidByte(b) => write!(f, "invalid polyline byte {b:#04x}"),
        }
    }
}

impl std::error::Error for PolylineError {}

/// Decode an encoded polyline into a path of GPS points.
///
/// # Example
///
/// ```rust
/// use bathroom_finder::polyline::decode_polyline;
///
/// let path = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(path.len(), 3);
/// assert!((path[0].latitude - 38.5).abs() < 1e-9);
/// assert!((path[0].longitude - -120.2).abs() < 1e-9);
/// ```
pub fn decode_polyline(encoded: &str) -> Result<Vec<GpsPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut path = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        lng += decode_value(bytes, &mut index)?;
        path.push(GpsPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }
    Ok(path)
}

/// Encode a path of GPS points as an encoded polyline.
///
/// The inverse of [`decode_polyline`]; used by tests and demos to fabricate
/// route payloads.
pub fn encode_polyline(path: &[GpsPoint]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for p in path {
        let lat = (p.latitude * PRECISION).round() as i64;
        let lng = (p.longitude * PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::Truncated);
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte(byte));
        }
        *index += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk & 0x20 == 0 {
            break;
        }
    }

    // Undo the zigzag sign encoding.
    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };

    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}
