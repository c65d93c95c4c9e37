//! Flexible polyline codec.
//!
//! Coordinates are quantized at a configurable decimal precision, delta
//! encoded, zigzag mapped, and packed into 5-bit groups with a continuation
//! bit. A two-value header carries the format version and the precision /
//! third-dimension flags. Third-dimension values are read and discarded.

use thiserror::Error;

use crate::geo::Coordinate;

const ENCODING_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const FORMAT_VERSION: u64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("invalid character {0:?} in polyline")]
    InvalidCharacter(char),

    #[error("unsupported polyline format version {0}")]
    UnsupportedVersion(u64),

    #[error("truncated polyline")]
    Truncated,
}

struct Reader<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> Reader<'a> {
    fn new(encoded: &'a str) -> Self {
        Reader {
            chars: encoded.chars(),
        }
    }

    /// Read the next unsigned varint, or None at end of input.
    fn next_unsigned(&mut self) -> Result<Option<u64>, PolylineError> {
        let mut value: u64 = 0;
        let mut shift = 0;
        let mut seen = false;
        for c in self.chars.by_ref() {
            let digit = decode_char(c)?;
            value |= u64::from(digit & 0x1f) << shift;
            seen = true;
            if digit & 0x20 == 0 {
                return Ok(Some(value));
            }
            shift += 5;
        }
        if seen {
            // Ended mid-varint with the continuation bit still set.
            Err(PolylineError::Truncated)
        } else {
            Ok(None)
        }
    }

    fn next_signed(&mut self) -> Result<Option<i64>, PolylineError> {
        Ok(self.next_unsigned()?.map(unzigzag))
    }
}

fn decode_char(c: char) -> Result<u8, PolylineError> {
    if !c.is_ascii() {
        return Err(PolylineError::InvalidCharacter(c));
    }
    ENCODING_TABLE
        .iter()
        .position(|&entry| entry == c as u8)
        .map(|index| index as u8)
        .ok_or(PolylineError::InvalidCharacter(c))
}

fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn push_unsigned(mut value: u64, out: &mut String) {
    while value >= 0x20 {
        out.push(ENCODING_TABLE[(0x20 | (value & 0x1f)) as usize] as char);
        value >>= 5;
    }
    out.push(ENCODING_TABLE[value as usize] as char);
}

fn push_signed(value: i64, out: &mut String) {
    push_unsigned(zigzag(value), out);
}

/// Decode an encoded path into an ordered coordinate sequence.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let mut reader = Reader::new(encoded);

    let version = reader.next_unsigned()?.ok_or(PolylineError::Truncated)?;
    if version != FORMAT_VERSION {
        return Err(PolylineError::UnsupportedVersion(version));
    }
    let header = reader.next_unsigned()?.ok_or(PolylineError::Truncated)?;
    let precision = (header & 15) as i32;
    let third_dim = (header >> 4) & 7;
    let scale = 10f64.powi(precision);

    let mut coordinates = Vec::new();
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    while let Some(delta_lat) = reader.next_signed()? {
        let delta_lng = reader.next_signed()?.ok_or(PolylineError::Truncated)?;
        if third_dim != 0 {
            reader.next_signed()?.ok_or(PolylineError::Truncated)?;
        }
        lat += delta_lat;
        lng += delta_lng;
        coordinates.push(Coordinate {
            latitude: lat as f64 / scale,
            longitude: lng as f64 / scale,
        });
    }
    Ok(coordinates)
}

/// Encode a coordinate sequence at the given decimal precision.
pub fn encode(coordinates: &[Coordinate], precision: u32) -> String {
    let scale = 10f64.powi(precision as i32);
    let mut out = String::new();
    push_unsigned(FORMAT_VERSION, &mut out);
    push_unsigned(u64::from(precision & 15), &mut out);

    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    for coordinate in coordinates {
        let lat = (coordinate.latitude * scale).round() as i64;
        let lng = (coordinate.longitude * scale).round() as i64;
        push_signed(lat - prev_lat, &mut out);
        push_signed(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the flexible polyline format documentation.
    const REFERENCE: &str = "BFoz5xJ67i1B1B7PzIhaxL7Y";

    fn reference_points() -> Vec<Coordinate> {
        [
            (50.10228, 8.69821),
            (50.10201, 8.69567),
            (50.10063, 8.69150),
            (50.09878, 8.68752),
        ]
        .iter()
        .map(|&(latitude, longitude)| Coordinate {
            latitude,
            longitude,
        })
        .collect()
    }

    #[test]
    fn test_decode_reference_polyline() {
        let decoded = decode(REFERENCE).unwrap();
        let expected = reference_points();
        assert_eq!(decoded.len(), expected.len());
        for (got, want) in decoded.iter().zip(&expected) {
            assert!((got.latitude - want.latitude).abs() < 1e-9);
            assert!((got.longitude - want.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_encode_reference_polyline() {
        assert_eq!(encode(&reference_points(), 5), REFERENCE);
    }

    #[test]
    fn test_round_trip_within_quantization() {
        let original = vec![
            Coordinate {
                latitude: 45.50884,
                longitude: -73.58781,
            },
            Coordinate {
                latitude: 45.49543,
                longitude: -73.57810,
            },
            Coordinate {
                latitude: -33.86882,
                longitude: 151.20930,
            },
            Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            },
        ];

        let decoded = decode(&encode(&original, 5)).unwrap();
        assert_eq!(decoded.len(), original.len());
        for (got, want) in decoded.iter().zip(&original) {
            assert!((got.latitude - want.latitude).abs() <= 0.5e-5);
            assert!((got.longitude - want.longitude).abs() <= 0.5e-5);
        }
    }

    #[test]
    fn test_empty_path() {
        let encoded = encode(&[], 5);
        assert_eq!(decode(&encoded).unwrap(), Vec::<Coordinate>::new());
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            decode("BF$"),
            Err(PolylineError::InvalidCharacter('$'))
        );
    }

    #[test]
    fn test_unsupported_version() {
        // 'C' decodes to version 2.
        assert_eq!(decode("CF"), Err(PolylineError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_truncated_pair() {
        // Header plus a single lat delta with no matching lng delta.
        let mut encoded = String::new();
        push_unsigned(FORMAT_VERSION, &mut encoded);
        push_unsigned(5, &mut encoded);
        push_signed(100, &mut encoded);
        assert_eq!(decode(&encoded), Err(PolylineError::Truncated));
    }
}
