// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::gps;
use crate::time;
use crate::Error::*;
use crate::Result;
use chrono::{DateTime, Utc};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::fmt::Display;
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// Street View static image endpoint used by [`GeoRecord::street_view_url`].
pub const STREET_VIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

/// The six EXIF GPS tags a record is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum Field {
    #[strum(serialize = "GPSLatitude")]
    Latitude,

    #[strum(serialize = "GPSLatitudeRef")]
    LatitudeRef,

    #[strum(serialize = "GPSLongitude")]
    Longitude,

    #[strum(serialize = "GPSLongitudeRef")]
    LongitudeRef,

    #[strum(serialize = "GPSTimeStamp")]
    TimeStamp,

    #[strum(serialize = "GPSDateStamp")]
    DateStamp,
}

impl Field {
    pub fn tag(&self) -> exif::Tag {
        match self {
            Field::Latitude => exif::Tag::GPSLatitude,
            Field::LatitudeRef => exif::Tag::GPSLatitudeRef,
            Field::Longitude => exif::Tag::GPSLongitude,
            Field::LongitudeRef => exif::Tag::GPSLongitudeRef,
            Field::TimeStamp => exif::Tag::GPSTimeStamp,
            Field::DateStamp => exif::Tag::GPSDateStamp,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Three base-60 parts: degrees, minutes and seconds of an angle, or
/// hours, minutes and seconds of a GPS time stamp.
#[derive(Debug, Clone, Copy)]
pub struct Sexagesimal {
    parts: [exif::Rational; 3],
}

impl Sexagesimal {
    /// Builds from up to three rationals. Missing trailing parts are zero.
    /// An empty slice or a zero denominator is rejected.
    pub fn from_rationals(rationals: &[exif::Rational]) -> Option<Self> {
        if rationals.is_empty() || rationals.iter().take(3).any(|r| r.denom == 0) {
            return None;
        }

        let zero = exif::Rational { num: 0, denom: 1 };
        let part = |i: usize| rationals.get(i).copied().unwrap_or(zero);

        Some(Self {
            parts: [part(0), part(1), part(2)],
        })
    }

    /// Builds from `(numerator, denominator)` pairs, as stored in EXIF.
    pub fn new(first: (u32, u32), second: (u32, u32), third: (u32, u32)) -> Option<Self> {
        Self::from_rationals(&[first.into(), second.into(), third.into()])
    }

    /// Signed decimal degrees for the given hemisphere reference letter.
    pub fn to_decimal(&self, hemisphere: &str) -> BigRational {
        let [deg, min, sec] = self.parts.map(|r| gps::to_big_rational(&r));
        gps::sexagesimal_to_decimal(&deg, &min, &sec, hemisphere)
    }

    /// Each part as a `(numerator, denominator)` pair.
    pub fn pairs(&self) -> [(u32, u32); 3] {
        self.parts.map(|r| (r.num, r.denom))
    }

    /// Each part with its fractional component discarded.
    pub fn whole_parts(&self) -> time::HourMinuteSecond {
        let [a, b, c] = self.parts.map(|r| i64::from(r.num / r.denom));
        (a, b, c)
    }
}

/// Compares stored numerators and denominators, so 1/2 and 2/4 differ.
impl PartialEq for Sexagesimal {
    fn eq(&self, other: &Self) -> bool {
        self.pairs() == other.pairs()
    }
}

/// GPS location and time of one photo, as found in its EXIF data.
///
/// Every field is optional because any tag may be absent from a file.
/// Derived values that need a missing tag fail with [`crate::Error::MissingField`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeoRecord {
    pub latitude: Option<Sexagesimal>,

    /// "N" or "S"
    pub latitude_ref: Option<String>,

    pub longitude: Option<Sexagesimal>,

    /// "E" or "W"
    pub longitude_ref: Option<String>,

    /// UTC time of the GPS fix.
    pub time_stamp: Option<Sexagesimal>,

    /// UTC date of the GPS fix as "YYYY:MM:DD".
    pub date_stamp: Option<String>,
}

impl GeoRecord {
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Latitude => self.latitude.is_some(),
            Field::LatitudeRef => self.latitude_ref.is_some(),
            Field::Longitude => self.longitude.is_some(),
            Field::LongitudeRef => self.longitude_ref.is_some(),
            Field::TimeStamp => self.time_stamp.is_some(),
            Field::DateStamp => self.date_stamp.is_some(),
        }
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::iter().filter(|f| !self.has(*f)).collect()
    }

    /// True if all six GPS tags are present.
    pub fn is_complete(&self) -> bool {
        Field::iter().all(|f| self.has(f))
    }

    /// Exact signed decimal latitude and longitude.
    pub fn coordinates(&self) -> Result<(BigRational, BigRational)> {
        let latitude = self.latitude.as_ref().ok_or(MissingField(Field::Latitude))?;
        let latitude_ref = self
            .latitude_ref
            .as_deref()
            .ok_or(MissingField(Field::LatitudeRef))?;
        let longitude = self.longitude.as_ref().ok_or(MissingField(Field::Longitude))?;
        let longitude_ref = self
            .longitude_ref
            .as_deref()
            .ok_or(MissingField(Field::LongitudeRef))?;

        Ok((
            latitude.to_decimal(latitude_ref),
            longitude.to_decimal(longitude_ref),
        ))
    }

    /// Latitude and longitude as "lat,lon" with six decimal places.
    pub fn decimal_degrees(&self) -> Result<String> {
        let (latitude, longitude) = self.coordinates()?;
        Ok(format!(
            "{},{}",
            gps::format_decimal(&latitude, gps::DECIMAL_PLACES),
            gps::format_decimal(&longitude, gps::DECIMAL_PLACES)
        ))
    }

    pub fn lat_lng(&self) -> Result<(f64, f64)> {
        let (latitude, longitude) = self.coordinates()?;
        let to_f64 = |value: &BigRational| {
            value
                .to_f64()
                .ok_or_else(|| InvalidCoordinate(format!("{} is not representable", value)))
        };
        Ok((to_f64(&latitude)?, to_f64(&longitude)?))
    }

    /// The H3 cell containing this photo's location.
    pub fn cell_index(&self, resolution: h3o::Resolution) -> Result<h3o::CellIndex> {
        let (lat, lng) = self.lat_lng()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoordinate(format!("{},{} out of range", lat, lng)));
        }

        let ll = h3o::LatLng::new(lat, lng).map_err(|e| InvalidCoordinate(e.to_string()))?;
        Ok(ll.to_cell(resolution))
    }

    /// Seconds since the Unix epoch of the GPS fix, or 0 if the date or time is missing.
    ///
    /// Date parsing is lenient: see [`time::lenient_date_time`].
    pub fn unix(&self) -> i64 {
        let (Some(date_stamp), Some(time_stamp)) = (&self.date_stamp, &self.time_stamp) else {
            return 0;
        };

        time::lenient_date_time(date_stamp, time_stamp.whole_parts())
            .map(|dt| dt.timestamp())
            .unwrap_or(0)
    }

    /// UTC time of the GPS fix, rejecting malformed dates and times.
    pub fn taken_at(&self) -> Result<DateTime<Utc>> {
        let date_stamp = self
            .date_stamp
            .as_deref()
            .ok_or(MissingField(Field::DateStamp))?;
        let time_stamp = self.time_stamp.as_ref().ok_or(MissingField(Field::TimeStamp))?;
        time::strict_date_time(date_stamp, time_stamp.whole_parts())
    }

    /// Street View image URL for this photo's location. No request is made.
    pub fn street_view_url(&self) -> Result<String> {
        Ok(format!(
            "{}?location={}&size=640x640&fov=120&heading=0&sensor=false",
            STREET_VIEW_URL,
            self.decimal_degrees()?
        ))
    }
}

impl Display for GeoRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.decimal_degrees() {
            Ok(location) => write!(f, "{}", location)?,
            Err(_) => write!(f, "unknown location")?,
        }
        match self.taken_at() {
            Ok(taken_at) => write!(f, " at {}", taken_at.to_rfc3339()),
            Err(_) => write!(f, " at unknown time"),
        }
    }
}
