//! Tokenizer for `ExifTool` GPS output.
//!
//! Each line printed with [`crate::tool::GPS_TRACK_FORMAT`] has three
//! comma-separated fields:
//!
//! ```text
//! 122.12345678 E, 37.12345678 N, 12.3
//! ```
//!
//! Longitude and latitude are unsigned degrees followed by a hemisphere
//! letter (whitespace before the letter is optional). Altitude is a plain
//! number, optionally signed and optionally suffixed with `#`. Any deviation
//! fails the line.

use std::str::FromStr;

use qtd2pg_core::{Altitude, AltitudeType, CoordinateSample};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{ExtractError, SampleError};

/// Parse one GPS line into a sample.
///
/// # Errors
///
/// Returns [`SampleError`] describing the first field that does not match.
pub fn parse_sample_line(
    line: &str,
    altitude_type: AltitudeType,
) -> Result<CoordinateSample, SampleError> {
    let fields: Vec<&str> = line.split(',').collect();
    let [lon_field, lat_field, alt_field] = fields.as_slice() else {
        return Err(SampleError::FieldCount(fields.len()));
    };

    let longitude = parse_hemisphere_field(lon_field, "longitude", 'E', 'W', 180.0)?;
    let latitude = parse_hemisphere_field(lat_field, "latitude", 'N', 'S', 90.0)?;
    let altitude = parse_altitude(alt_field, altitude_type)?;

    Ok(CoordinateSample {
        longitude,
        latitude,
        altitude,
    })
}

/// Parse every non-blank line of GPS output, in order.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedSample`] for the first line that does not
/// parse; no line is skipped.
pub fn parse_samples(
    raw: &str,
    altitude_type: AltitudeType,
) -> Result<Vec<CoordinateSample>, ExtractError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_sample_line(line, altitude_type).map_err(|source| ExtractError::MalformedSample {
                line_number: index + 1,
                line: line.to_string(),
                source,
            })
        })
        .collect()
}

/// Build the default video identifier from `CreateDate` output.
///
/// `[QuickTime]     CreateDate    : 2024:05:01 12:30:00` with prefix `VID`
/// becomes `VID_2024_05_01_12_30_00`.
///
/// # Errors
///
/// Returns [`ExtractError::MissingMetadata`] when the output holds no tag
/// value.
pub fn default_identifier(prefix: &str, raw: &str) -> Result<String, ExtractError> {
    let missing = || ExtractError::MissingMetadata("CreateDate");

    let line = raw.lines().find(|l| !l.trim().is_empty()).ok_or_else(missing)?;
    let (_, value) = line.split_once(": ").ok_or_else(missing)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(missing());
    }

    let normalized = value.replace(':', "_").replace(' ', "_");
    Ok(format!("{prefix}_{normalized}"))
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn parse_hemisphere_field(
    raw: &str,
    field: &'static str,
    positive: char,
    negative: char,
    limit: f64,
) -> Result<f64, SampleError> {
    let trimmed = raw.trim();
    let marker = trimmed.chars().last().ok_or(SampleError::Empty { field })?;

    let sign = if marker == positive {
        1.0
    } else if marker == negative {
        -1.0
    } else if marker.is_ascii_alphabetic() {
        return Err(SampleError::Hemisphere { field, marker });
    } else {
        return Err(SampleError::MissingHemisphere { field });
    };

    let digits = trimmed[..trimmed.len() - marker.len_utf8()].trim_end();
    if !is_unsigned_number(digits) {
        return Err(SampleError::Number {
            field,
            value: digits.to_string(),
        });
    }

    let magnitude = digits.parse::<f64>().map_err(|_| SampleError::Number {
        field,
        value: digits.to_string(),
    })?;
    if magnitude > limit {
        return Err(SampleError::OutOfRange {
            field,
            value: digits.to_string(),
        });
    }

    Ok(sign * magnitude)
}

fn parse_altitude(raw: &str, altitude_type: AltitudeType) -> Result<Altitude, SampleError> {
    const FIELD: &str = "altitude";

    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('#').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return Err(SampleError::Empty { field: FIELD });
    }

    let (negative, digits) = match trimmed.as_bytes()[0] {
        b'+' => (false, &trimmed[1..]),
        b'-' => (true, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if !is_unsigned_number(digits) {
        return Err(SampleError::Number {
            field: FIELD,
            value: trimmed.to_string(),
        });
    }

    let magnitude = Decimal::from_str(digits).map_err(|_| SampleError::Number {
        field: FIELD,
        value: trimmed.to_string(),
    })?;
    let meters = if negative { -magnitude } else { magnitude };

    match altitude_type {
        AltitudeType::Integer => meters
            .trunc()
            .to_i32()
            .map(Altitude::Integer)
            .ok_or_else(|| SampleError::OutOfRange {
                field: FIELD,
                value: trimmed.to_string(),
            }),
        AltitudeType::Decimal => Ok(Altitude::Decimal(meters.round_dp(1))),
    }
}

/// Digits with at most one decimal point and at least one digit.
fn is_unsigned_number(s: &str) -> bool {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
