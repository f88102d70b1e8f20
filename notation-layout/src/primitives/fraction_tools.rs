//! Tools for working with fractions as musical lengths.

use std::cmp::Ordering;

use fraction::Fraction;

use crate::{LayoutError, LayoutResult};

/// Numerator and denominator of a finite, non-negative fraction.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use notation_layout::primitives::fraction_parts;
/// assert_eq!(fraction_parts(&Fraction::new(6u64, 8u64)).unwrap(), (3, 4));
/// assert!(fraction_parts(&Fraction::new(1u64, 0u64)).is_err());
/// ```
pub fn fraction_parts(frac: &Fraction) -> LayoutResult<(u64, u64)> {
    if frac.is_sign_negative() && *frac != Fraction::new(0u64, 1u64) {
        return Err(LayoutError::Arithmetic(format!(
            "negative fraction: {}",
            frac
        )));
    }
    let numer = frac.numer().ok_or_else(|| {
        LayoutError::Arithmetic(format!("no numerator in fraction: {}", frac))
    })?;
    let denom = frac.denom().ok_or_else(|| {
        LayoutError::Arithmetic(format!(
            "no denominator in fraction: {}",
            frac
        ))
    })?;
    if *denom == 0 {
        return Err(LayoutError::Arithmetic(format!(
            "zero denominator in fraction: {}",
            frac
        )));
    }
    Ok((*numer, *denom))
}

/// Compare two non-negative fractions by cross-multiplication.
///
/// Works on raw parts, so no float rounding is involved. Fractions without
/// parts (NaN, infinity) compare as equal to each other and greater than
/// everything else.
pub fn compare_fractions(a: &Fraction, b: &Fraction) -> Ordering {
    match (a.numer().zip(a.denom()), b.numer().zip(b.denom())) {
        (Some((an, ad)), Some((bn, bd))) => {
            let left = *an as u128 * *bd as u128;
            let right = *bn as u128 * *ad as u128;
            left.cmp(&right)
        }
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Float approximation. Only for display and spacing weights.
pub fn fraction_to_f64(frac: &Fraction) -> f64 {
    match frac.numer().zip(frac.denom()) {
        Some((n, d)) if *d != 0 => {
            let value = *n as f64 / *d as f64;
            match frac.is_sign_negative() {
                true => -value,
                false => value,
            }
        }
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use fraction::Fraction;

    use super::{compare_fractions, fraction_parts, fraction_to_f64};

    #[test]
    fn test_compare_fractions() {
        let third = Fraction::new(1u64, 3u64);
        let quarter = Fraction::new(1u64, 4u64);
        assert_eq!(compare_fractions(&third, &quarter), Ordering::Greater);
        assert_eq!(compare_fractions(&quarter, &third), Ordering::Less);
        assert_eq!(
            compare_fractions(&Fraction::new(2u64, 8u64), &quarter),
            Ordering::Equal
        );
    }

    #[test]
    fn test_fraction_parts() {
        assert_eq!(
            fraction_parts(&Fraction::new(0u64, 5u64)).unwrap(),
            (0, 1)
        );
        assert!(fraction_parts(&Fraction::new_neg(1u64, 4u64)).is_err());
    }

    #[test]
    fn test_fraction_to_f64() {
        assert_eq!(fraction_to_f64(&Fraction::new(3u64, 8u64)), 0.375);
        assert_eq!(fraction_to_f64(&Fraction::new_neg(1u64, 2u64)), -0.5);
    }
}
