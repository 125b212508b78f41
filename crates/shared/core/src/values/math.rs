//! Fixed-point helpers
//!
//! Share and fee conversions multiply two large base-unit amounts before
//! dividing. With 18-decimal assets the product easily leaves `u128`, so
//! the multiplication is carried in 256 bits and only the quotient has to
//! fit back into an `Amount`.

use super::Amount;

/// `floor(a * b / denominator)`, or `None` on division by zero or when the
/// quotient does not fit in 128 bits.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Option<Amount> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }

    let (hi, lo) = full_mul(a, b);
    div_wide(hi, lo, denominator)
}

/// `10^exp`, or `None` if it overflows
pub fn pow10(exp: u8) -> Option<Amount> {
    10u128.checked_pow(u32::from(exp))
}

/// 128 x 128 -> 256 bit multiplication, returned as (high, low) halves
fn full_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;

    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // At most 3 * (2^64 - 1), no overflow
    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);

    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// Restoring long division of a 256-bit value by a 128-bit divisor
fn div_wide(hi: u128, lo: u128, divisor: u128) -> Option<u128> {
    // Quotient would need more than 128 bits
    if hi >= divisor {
        return None;
    }

    let mut remainder = hi;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= divisor {
            remainder = remainder.wrapping_sub(divisor);
            quotient |= 1;
        }
    }
    Some(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values_floor() {
        assert_eq!(mul_div(10, 3, 4), Some(7)); // 30 / 4 = 7.5
        assert_eq!(mul_div(0, 3, 4), Some(0));
        assert_eq!(mul_div(1, 1, 0), None);
    }

    #[test]
    fn test_wide_intermediate() {
        // 10^24 * 10^24 / 10^24 leaves u128 in the middle
        let e24 = 10u128.pow(24);
        assert_eq!(mul_div(e24, e24, e24), Some(e24));

        // 3 * 10^24 * 7 * 10^23 / 10^25 = 2.1 * 10^23
        assert_eq!(
            mul_div(3 * e24, 7 * 10u128.pow(23), 10u128.pow(25)),
            Some(21 * 10u128.pow(22))
        );
    }

    #[test]
    fn test_wide_floor_division() {
        let max = u128::MAX;
        // (2^128 - 1)^2 / (2^128 - 1) = 2^128 - 1
        assert_eq!(mul_div(max, max, max), Some(max));
        // (2^128 - 1) * 3 / 2 does not fit
        assert_eq!(mul_div(max, 3, 2), None);
        // (2^128 - 1) * 2 / 3 floors
        assert_eq!(mul_div(max, 2, 3), Some(max / 3 * 2));
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), Some(1));
        assert_eq!(pow10(18), Some(1_000_000_000_000_000_000));
        assert_eq!(pow10(39), None);
    }
}
