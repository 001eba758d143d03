//! Minor-unit money arithmetic
//!
//! Every amount in the engine is an i64 in minor currency units (cents).
//! Floats never touch stored values; formatting happens only at the
//! export and API boundaries.

/// Commission owed on `revenue_minor` at `rate_bps` basis points,
/// rounded half-up to the nearest minor unit.
///
/// The intermediate product is widened to i128 so a large revenue sum
/// cannot overflow before the division.
pub fn commission_minor(revenue_minor: i64, rate_bps: i32) -> i64 {
    let product = (revenue_minor as i128) * (rate_bps as i128);
    ((product + 5_000) / 10_000) as i64
}

/// Render minor units as a decimal string, e.g. 123456 -> "1234.56"
pub fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_rounds_half_up() {
        // 100.50 at 8.5% = 8.5425 -> 8.54
        assert_eq!(commission_minor(10_050, 850), 854);
        // 0.10 at 5% = 0.005 -> 0.01
        assert_eq!(commission_minor(10, 500), 1);
        // 0.09 at 5% = 0.0045 -> 0.00
        assert_eq!(commission_minor(9, 500), 0);
    }

    #[test]
    fn commission_exact_values_unchanged() {
        assert_eq!(commission_minor(10_000, 1_000), 1_000);
        assert_eq!(commission_minor(0, 850), 0);
        assert_eq!(commission_minor(10_000, 0), 0);
    }

    #[test]
    fn commission_survives_large_revenue() {
        // near-i64 revenue must not overflow the intermediate product
        let revenue = i64::MAX / 2;
        let expected = ((revenue as i128 * 850 + 5_000) / 10_000) as i64;
        assert_eq!(commission_minor(revenue, 850), expected);
    }

    #[test]
    fn format_minor_pads_cents() {
        assert_eq!(format_minor(0), "0.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(123_456), "1234.56");
        assert_eq!(format_minor(-75), "-0.75");
    }
}
