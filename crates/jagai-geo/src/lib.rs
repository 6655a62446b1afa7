//! Geographic building blocks for JagAI dispatch.
//!
//! [`Coordinate`] is the shared position type. [`geocoding`] turns text into
//! places and places back into text, [`locate`] asks the device where it is,
//! and [`order`] declares the delivery order model.

pub mod geocoding;
pub mod locate;
pub mod order;

use std::fmt;

/// A position in decimal degrees.
///
/// No range validation is applied: whatever the device or a search result
/// reports is carried through as-is.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a pair of numeric-like strings, as returned in `lat`/`lon`
    /// fields of geocoding responses.
    ///
    /// Returns `None` when either part is not a finite number.
    #[must_use]
    pub fn parse(lat: &str, lon: &str) -> Option<Self> {
        let latitude = lat.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        let longitude = lon.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self::new(latitude, longitude))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`, the form used on the command line and in the
/// environment.
impl std::str::FromStr for Coordinate {
    type Err = InvalidCoordinate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| InvalidCoordinate(format!("missing ',' in \"{s}\"")))?;
        Self::parse(lat, lon)
            .ok_or_else(|| InvalidCoordinate(format!("not a \"lat,lon\" pair: \"{s}\"")))
    }
}

/// Percent-encode a string for use in a URL query parameter or a data URI.
#[must_use]
pub fn percent_encode(s: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCoordinate(String);

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidCoordinate {}
