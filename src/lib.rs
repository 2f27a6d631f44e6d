// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Extract GPS location and time from the EXIF data of photos and index
//! them by the moment they were taken.

pub mod error;
pub mod gps;
pub mod photo;
pub mod time;

pub use error::Error;
pub use photo::aggregate;
pub use photo::Aggregator;
pub use photo::GeoIndex;
pub use photo::GeoRecord;
pub use photo::TagSet;

/// A typedef of the result returned by many methods.
pub type Result<T, E = Error> = std::result::Result<T, E>;
