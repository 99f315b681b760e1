//! NordFloat: the 48-bit floating-point format of the legacy instruments.
//!
//! Three 16-bit words. Word 0 holds the sign (bit 15) and a 15-bit exponent
//! biased by `0x4000`; words 1 and 2 hold a 32-bit mantissa with an explicit
//! leading bit, so the value is `0.mantissa * 2^(exponent - 0x4000)`. Zero is
//! three zero words.

use crate::conversion::NORD_WORDS;

const EXPONENT_BIAS: i32 = 0x4000;
const EXPONENT_MASK: u16 = 0x7fff;
const SIGN_BIT: u16 = 0x8000;

/// Convert an IEEE single into NordFloat words.
///
/// Infinities and NaN saturate to the largest magnitude of the same sign.
pub fn from_f32(value: f32) -> [u16; NORD_WORDS] {
    let bits = value.to_bits();
    let sign = if bits >> 31 != 0 { SIGN_BIT } else { 0 };

    if value == 0.0 {
        return [0; NORD_WORDS];
    }
    if !value.is_finite() {
        return [sign | EXPONENT_MASK, 0xffff, 0xffff];
    }

    let mut exponent = ((bits >> 23) & 0xff) as i32;
    let mut fraction = bits & 0x7f_ffff;
    if exponent == 0 {
        // Subnormal: renormalise so the leading bit sits at bit 23.
        exponent = 1;
        while fraction & 0x80_0000 == 0 {
            fraction <<= 1;
            exponent -= 1;
        }
    } else {
        fraction |= 0x80_0000;
    }

    // 1.f * 2^(e - 127) == 0.1f * 2^(e - 126)
    let biased = (exponent - 126 + EXPONENT_BIAS) as u16 & EXPONENT_MASK;
    let mantissa = fraction << 8;
    [sign | biased, (mantissa >> 16) as u16, mantissa as u16]
}

/// Convert NordFloat words into an IEEE double.
///
/// Exponents beyond the double range overflow to infinity or underflow
/// towards zero.
pub fn to_f64(words: [u16; NORD_WORDS]) -> f64 {
    let mantissa = ((words[1] as u32) << 16) | words[2] as u32;
    if mantissa == 0 {
        return 0.0;
    }
    let exponent = (words[0] & EXPONENT_MASK) as i32 - EXPONENT_BIAS;
    let magnitude = scale(mantissa as f64, exponent - 32);
    if words[0] & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// `x * 2^exp` without overflowing the intermediate power.
fn scale(mut x: f64, mut exp: i32) -> f64 {
    const STEP: i32 = 1000;
    while exp > STEP {
        x *= 2f64.powi(STEP);
        exp -= STEP;
    }
    while exp < -STEP {
        x *= 2f64.powi(-STEP);
        exp += STEP;
    }
    x * 2f64.powi(exp)
}
