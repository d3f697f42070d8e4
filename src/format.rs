//! Number formatting for text reports.

/// Formats `x` with `digits` significant digits, switching to exponent
/// notation for very small or large magnitudes. Trailing zeros are dropped.
pub fn sig(x: f64, digits: usize) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{x}");
    }
    let digits = digits.max(1);
    let exp = x.abs().log10().floor() as i32;
    if exp < -4 || exp >= digits as i32 {
        let s = format!("{:.*e}", digits - 1, x);
        match s.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{exponent}", trim_zeros(mantissa)),
            None => s,
        }
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

/// Seconds to milliseconds, formatted with five significant digits.
pub fn ms(seconds: f64) -> String {
    sig(seconds * 1000.0, 5)
}

/// Fraction to percent, formatted with five significant digits.
pub fn percent(fraction: f64) -> String {
    sig(fraction * 100.0, 5)
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notation() {
        assert_eq!(sig(3045.2857760377788, 5), "3045.3");
        assert_eq!(sig(-162.92946543447903, 5), "-162.93");
        assert_eq!(sig(0.15074747225868837, 5), "0.15075");
        assert_eq!(sig(2.0, 5), "2");
    }

    #[test]
    fn exponent_notation() {
        assert_eq!(sig(5.36159e-5, 5), "5.3616e-5");
        assert_eq!(sig(1234567.0, 5), "1.2346e6");
        assert_eq!(sig(2e-6, 5), "2e-6");
    }

    #[test]
    fn zero_and_non_finite() {
        assert_eq!(sig(0.0, 5), "0");
        assert_eq!(sig(f64::NAN, 5), "NaN");
    }

    #[test]
    fn unit_helpers() {
        assert_eq!(ms(0.005361598768784667), "5.3616");
        assert_eq!(percent(0.8492039795236836), "84.92");
    }
}
