// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::model::{Field, GeoRecord, Sexagesimal};
use crate::Error::*;
use crate::Result;
use exif::{Exif, In, Tag, Value};
use std::fs;
use std::io::BufReader;
use std::path::Path;

/// Decoded EXIF tags that can be looked up by tag identifier.
pub trait TagSet {
    /// The primary IFD field for `tag`, if present.
    fn field(&self, tag: Tag) -> Option<&exif::Field>;
}

impl TagSet for Exif {
    fn field(&self, tag: Tag) -> Option<&exif::Field> {
        self.get_field(tag, In::PRIMARY)
    }
}

impl TagSet for [exif::Field] {
    fn field(&self, tag: Tag) -> Option<&exif::Field> {
        self.iter().find(|f| f.tag == tag && f.ifd_num == In::PRIMARY)
    }
}

impl GeoRecord {
    /// Reads GPS tags from the EXIF data of the file at `path`.
    pub fn from_path(path: &Path) -> Result<GeoRecord> {
        let exif_data = {
            let file = fs::File::open(path).map_err(|source| FileOpen {
                path: path.to_path_buf(),
                source,
            })?;

            let f = &mut BufReader::new(file);
            exif::Reader::new()
                .read_from_container(f)
                .map_err(|source| ExifDecode {
                    path: Some(path.to_path_buf()),
                    source,
                })?
        };

        Ok(GeoRecord::from_tags(&exif_data))
    }

    /// Reads GPS tags from a raw EXIF payload, such as a TIFF header and IFDs.
    pub fn from_raw(data: Vec<u8>) -> Result<GeoRecord> {
        let exif_data = exif::Reader::new()
            .read_raw(data)
            .map_err(|source| ExifDecode { path: None, source })?;

        Ok(GeoRecord::from_tags(&exif_data))
    }

    /// Looks up each GPS tag independently. A tag that is missing or has an
    /// unexpected value type leaves its field empty.
    pub fn from_tags<T: TagSet + ?Sized>(tags: &T) -> GeoRecord {
        GeoRecord {
            latitude: sexagesimal(tags, Field::Latitude),
            latitude_ref: ascii(tags, Field::LatitudeRef),
            longitude: sexagesimal(tags, Field::Longitude),
            longitude_ref: ascii(tags, Field::LongitudeRef),
            time_stamp: sexagesimal(tags, Field::TimeStamp),
            date_stamp: ascii(tags, Field::DateStamp),
        }
    }
}

impl From<&Exif> for GeoRecord {
    fn from(exif_data: &Exif) -> Self {
        GeoRecord::from_tags(exif_data)
    }
}

fn sexagesimal<T: TagSet + ?Sized>(tags: &T, field: Field) -> Option<Sexagesimal> {
    match tags.field(field.tag())?.value {
        Value::Rational(ref vec) => Sexagesimal::from_rationals(vec),
        _ => None,
    }
}

fn ascii<T: TagSet + ?Sized>(tags: &T, field: Field) -> Option<String> {
    match tags.field(field.tag())?.value {
        Value::Ascii(ref vec) => vec
            .first()
            .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_field(tag: Tag, s: &str) -> exif::Field {
        exif::Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![s.as_bytes().to_vec()]),
        }
    }

    fn rational_field(tag: Tag, parts: &[(u32, u32)]) -> exif::Field {
        exif::Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(parts.iter().map(|p| (*p).into()).collect()),
        }
    }

    fn golden_gate_fields() -> Vec<exif::Field> {
        vec![
            rational_field(Tag::GPSLatitude, &[(37, 1), (48, 1), (4536, 100)]),
            ascii_field(Tag::GPSLatitudeRef, "N"),
            rational_field(Tag::GPSLongitude, &[(122, 1), (25, 1), (852, 100)]),
            ascii_field(Tag::GPSLongitudeRef, "W"),
            rational_field(Tag::GPSTimeStamp, &[(14, 1), (30, 1), (0, 1)]),
            ascii_field(Tag::GPSDateStamp, "2023:06:15"),
        ]
    }

    #[test]
    fn from_tags_complete() {
        let record = GeoRecord::from_tags(golden_gate_fields().as_slice());
        assert!(record.is_complete());
        assert_eq!("37.812600,-122.419033", record.decimal_degrees().unwrap());
        assert_eq!(1686839400, record.unix());
    }

    #[test]
    fn from_tags_partial() {
        let fields: Vec<exif::Field> = golden_gate_fields()
            .into_iter()
            .filter(|f| f.tag != Tag::GPSDateStamp)
            .collect();

        let record = GeoRecord::from_tags(fields.as_slice());
        assert!(record.date_stamp.is_none());
        assert!(record.latitude.is_some());
        assert_eq!(0, record.unix());
    }

    #[test]
    fn from_tags_empty() {
        let fields: Vec<exif::Field> = vec![];
        assert_eq!(GeoRecord::default(), GeoRecord::from_tags(fields.as_slice()));
    }

    #[test]
    fn from_tags_wrong_value_type() {
        let fields = vec![
            ascii_field(Tag::GPSLatitude, "37 48 45.36"),
            rational_field(Tag::GPSLatitudeRef, &[(1, 1)]),
        ];
        let record = GeoRecord::from_tags(fields.as_slice());
        assert!(record.latitude.is_none());
        assert!(record.latitude_ref.is_none());
    }

    #[test]
    fn from_tags_ignores_thumbnail_ifd() {
        let mut field = ascii_field(Tag::GPSDateStamp, "2023:06:15");
        field.ifd_num = In::THUMBNAIL;
        let fields = vec![field];
        assert!(GeoRecord::from_tags(fields.as_slice()).date_stamp.is_none());
    }

    #[test]
    fn from_path_missing_file() {
        let result = GeoRecord::from_path(Path::new("/no/such/photo.jpg"));
        assert!(matches!(result, Err(FileOpen { .. })));
    }

    #[test]
    fn from_raw_garbage() {
        let result = GeoRecord::from_raw(b"not exif at all".to_vec());
        assert!(matches!(result, Err(ExifDecode { path: None, .. })));
    }
}
