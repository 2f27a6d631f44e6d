// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::model::Field;
use std::path::PathBuf;
use thiserror::Error;

/// Bespoke errors
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened for reading.
    #[error("open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a readable EXIF container.
    #[error("decode EXIF{}: {source}", of_path(.path))]
    ExifDecode {
        path: Option<PathBuf>,
        #[source]
        source: exif::Error,
    },

    /// A derived value was requested from a record lacking a required tag.
    #[error("missing EXIF field {0}")]
    MissingField(Field),

    #[error("malformed GPS date/time: {0}")]
    MalformedDate(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

fn of_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" of {}", p.display()))
        .unwrap_or_default()
}
