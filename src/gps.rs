// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sexagesimal to decimal degree conversion.
//!
//! Arithmetic is done on exact big rationals so that nothing is lost between
//! the EXIF rationals and the final rounding to [`DECIMAL_PLACES`].

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

/// Number of decimal places used when displaying a coordinate.
/// Six places is roughly 0.11 m at the equator.
pub const DECIMAL_PLACES: usize = 6;

/// Converts degrees, minutes and seconds plus a hemisphere reference letter
/// into signed decimal degrees.
///
/// Only "S" and "W" negate the result. Any other reference, including an
/// unrecognised one, is treated as north or east.
pub fn sexagesimal_to_decimal(
    degrees: &BigRational,
    minutes: &BigRational,
    seconds: &BigRational,
    hemisphere: &str,
) -> BigRational {
    let sixty = BigRational::from_integer(BigInt::from(60));
    let decimal = degrees + minutes / &sixty + seconds / (&sixty * &sixty);

    if is_negative_hemisphere(hemisphere) {
        -decimal
    } else {
        decimal
    }
}

/// N and E are the positive directions, like on an x,y axis.
fn is_negative_hemisphere(hemisphere: &str) -> bool {
    matches!(hemisphere.trim_end_matches('\0'), "S" | "W")
}

/// Renders an exact value with `precision` fractional digits.
/// The last digit is rounded to nearest, with halves rounded away from zero.
/// Negative values keep their sign even when they round to zero.
pub fn format_decimal(value: &BigRational, precision: usize) -> String {
    let scale = num_traits::pow(BigInt::from(10), precision);
    let scaled = (value.abs() * BigRational::from_integer(scale.clone()))
        .round()
        .to_integer();

    let sign = if value.is_negative() { "-" } else { "" };

    let int_part = &scaled / &scale;
    if precision == 0 {
        return format!("{}{}", sign, int_part);
    }

    let frac_part = (&scaled % &scale).to_string();
    format!("{}{}.{:0>width$}", sign, int_part, frac_part, width = precision)
}

/// Exact value of an EXIF rational. Callers must reject zero denominators first.
pub(crate) fn to_big_rational(r: &exif::Rational) -> BigRational {
    BigRational::new(BigInt::from(r.num), BigInt::from(r.denom))
}
