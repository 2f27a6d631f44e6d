// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod metadata;
pub mod model;
pub mod scanner;

pub use metadata::TagSet;
pub use model::Field;
pub use model::GeoRecord;
pub use model::Sexagesimal;

pub use scanner::aggregate;
pub use scanner::Aggregator;
pub use scanner::GeoIndex;
pub use scanner::PICTURE_SUFFIXES;
