//! Lenient numeric text parsing and rendering.
//!
//! Parsing follows the C library conventions the tool has always had:
//! leading blanks are skipped, the longest valid prefix is used, and text
//! with no digits reads as zero.

use std::fmt::{Display, LowerExp};

use crate::conversion::Style;

/// Parse an integer in `radix`, falling back to unsigned on signed overflow.
///
/// A value outside both the signed and unsigned 64-bit ranges reads as 0.
/// Negative text in the unsigned range wraps, as `strtoul` does.
pub fn parse_integer(text: &[u8], radix: u32) -> i64 {
    let mut s = skip_blanks(text);

    let negative = match s.first() {
        Some(b'-') => {
            s = &s[1..];
            true
        }
        Some(b'+') => {
            s = &s[1..];
            false
        }
        _ => false,
    };

    if radix == 16
        && s.len() > 2
        && s[0] == b'0'
        && matches!(s[1], b'x' | b'X')
        && (s[2] as char).is_digit(16)
    {
        s = &s[2..];
    }

    let mut magnitude: Option<u64> = Some(0);
    let mut any = false;
    for digit in s.iter().map_while(|&b| (b as char).to_digit(radix)) {
        any = true;
        magnitude = magnitude
            .and_then(|m| m.checked_mul(radix as u64))
            .and_then(|m| m.checked_add(digit as u64));
    }
    if !any {
        return 0;
    }

    match magnitude {
        Some(m) if !negative && m <= i64::MAX as u64 => m as i64,
        Some(m) if negative && m <= 1 << 63 => (m as i64).wrapping_neg(),
        Some(m) if negative => m.wrapping_neg() as i64,
        Some(m) => m as i64,
        None => 0,
    }
}

/// Accumulate leading `0`/`1` digits; anything else ends the scan.
pub fn parse_binary(text: &[u8]) -> i64 {
    text.iter()
        .take_while(|&&b| b == b'0' || b == b'1')
        .fold(0i64, |acc, &b| acc.wrapping_mul(2).wrapping_add((b - b'0') as i64))
}

/// Parse an integer according to a text style.
pub fn parse_styled(text: &[u8], style: Style) -> i64 {
    match style {
        Style::Default | Style::Decimal => parse_integer(text, 10),
        Style::Binary => parse_binary(text),
        Style::Octal => parse_integer(text, 8),
        Style::Hex => parse_integer(text, 16),
    }
}

/// Parse the longest floating-point prefix of `text`, or 0.
pub fn parse_float(text: &[u8]) -> f64 {
    let s = skip_blanks(text);
    let len = float_prefix_len(s);
    std::str::from_utf8(&s[..len])
        .ok()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0.0)
}

fn float_prefix_len(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let rest = &s[i..];
    for word in ["infinity", "inf", "nan"] {
        if rest.len() >= word.len() && rest[..word.len()].eq_ignore_ascii_case(word.as_bytes()) {
            return i + word.len();
        }
    }

    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let whole = digits(i);
    i += whole;
    let mut fraction = 0;
    if s.get(i) == Some(&b'.') {
        fraction = digits(i + 1);
        i += 1 + fraction;
    }
    if whole + fraction == 0 {
        return 0;
    }

    if matches!(s.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exponent = digits(j);
        if exponent > 0 {
            i = j + exponent;
        }
    }
    i
}

fn skip_blanks(text: &[u8]) -> &[u8] {
    let start = text
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(text.len());
    &text[start..]
}

/// Render an integer of `width` bytes.
///
/// `value` must already be sign- or zero-extended as the caller wants it
/// shown: Binary, Octal and Hex print its bit pattern, decimal prints it
/// signed unless `unsigned` is set.
pub fn render_integer(value: i64, width: usize, style: Style, unsigned: bool) -> String {
    let bits = value as u64;
    match style {
        Style::Binary => {
            let digits = 8 * width;
            let mask = if digits >= 64 { u64::MAX } else { (1u64 << digits) - 1 };
            format!("{:0digits$b}", bits & mask)
        }
        Style::Octal => format!("{bits:o}"),
        Style::Hex => format!("{bits:x}"),
        Style::Default | Style::Decimal if unsigned => bits.to_string(),
        Style::Default | Style::Decimal => value.to_string(),
    }
}

/// Shortest round-trippable text, switching to exponent form for very large
/// or very small magnitudes.
pub fn render_float<T: Display + LowerExp>(value: T) -> String {
    let exponential = format!("{value:e}");
    let Some((_, exponent)) = exponential.rsplit_once('e') else {
        // inf, -inf, NaN
        return exponential.to_lowercase();
    };
    match exponent.parse::<i32>() {
        Ok(exp) if (-5..17).contains(&exp) => value.to_string(),
        _ => exponential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_integer(b"42", 10), 42);
        assert_eq!(parse_integer(b"  -17", 10), -17);
        assert_eq!(parse_integer(b"+8", 10), 8);
        assert_eq!(parse_integer(b"007", 10), 7);
        assert_eq!(parse_integer(b"12abc", 10), 12);
        assert_eq!(parse_integer(b"12\n", 10), 12);
    }

    #[test]
    fn test_parse_no_digits_is_zero() {
        assert_eq!(parse_integer(b"", 10), 0);
        assert_eq!(parse_integer(b"abc", 10), 0);
        assert_eq!(parse_integer(b"-", 10), 0);
    }

    #[test]
    fn test_parse_overflow_falls_back_to_unsigned() {
        assert_eq!(parse_integer(b"18446744073709551615", 10), -1);
        assert_eq!(parse_integer(b"9223372036854775808", 10), i64::MIN);
        assert_eq!(parse_integer(b"-9223372036854775808", 10), i64::MIN);
        assert_eq!(parse_integer(b"-9223372036854775809", 10), i64::MAX);
    }

    #[test]
    fn test_parse_out_of_both_ranges_is_zero() {
        assert_eq!(parse_integer(b"18446744073709551616", 10), 0);
        assert_eq!(parse_integer(b"-99999999999999999999", 10), 0);
    }

    #[test]
    fn test_parse_hex_and_octal() {
        assert_eq!(parse_integer(b"ff", 16), 255);
        assert_eq!(parse_integer(b"0x1F", 16), 31);
        assert_eq!(parse_integer(b"0x", 16), 0);
        assert_eq!(parse_integer(b"777", 8), 511);
        assert_eq!(parse_integer(b"789", 8), 7);
    }

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_binary(b"1010"), 10);
        assert_eq!(parse_binary(b"0011x1"), 3);
        assert_eq!(parse_binary(b" 1"), 0);
        assert_eq!(parse_binary(b""), 0);
    }

    #[test]
    fn test_parse_styled() {
        assert_eq!(parse_styled(b"10", Style::Default), 10);
        assert_eq!(parse_styled(b"10", Style::Hex), 16);
        assert_eq!(parse_styled(b"10", Style::Octal), 8);
        assert_eq!(parse_styled(b"10", Style::Binary), 2);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(b"1.5"), 1.5);
        assert_eq!(parse_float(b" -2.5e3xyz"), -2500.0);
        assert_eq!(parse_float(b"1e"), 1.0);
        assert_eq!(parse_float(b".5"), 0.5);
        assert_eq!(parse_float(b"junk"), 0.0);
        assert_eq!(parse_float(b"3.25\n"), 3.25);
        assert!(parse_float(b"inf").is_infinite());
        assert!(parse_float(b"-Infinity").is_sign_negative());
        assert!(parse_float(b"nan").is_nan());
    }

    #[test]
    fn test_render_hex_int() {
        assert_eq!(render_integer(10, 4, Style::Hex, false), "a");
    }

    #[test]
    fn test_render_binary_int() {
        assert_eq!(
            render_integer(10, 4, Style::Binary, false),
            "00000000000000000000000000001010"
        );
        assert_eq!(render_integer(-1, 1, Style::Binary, false), "11111111");
        assert_eq!(render_integer(-1, 8, Style::Binary, false), "1".repeat(64));
    }

    #[test]
    fn test_render_decimal_sign() {
        assert_eq!(render_integer(-5, 4, Style::Default, false), "-5");
        assert_eq!(render_integer(-1, 8, Style::Decimal, true), "18446744073709551615");
        assert_eq!(render_integer(255, 1, Style::Decimal, true), "255");
    }

    #[test]
    fn test_render_octal() {
        assert_eq!(render_integer(8, 2, Style::Octal, false), "10");
    }

    #[test]
    fn test_render_float() {
        assert_eq!(render_float(1.5f64), "1.5");
        assert_eq!(render_float(0.1f32), "0.1");
        assert_eq!(render_float(100.0f64), "100");
        assert_eq!(render_float(-2.25e100f64), "-2.25e100");
        assert_eq!(render_float(1.0e-7f64), "1e-7");
        assert_eq!(render_float(f64::INFINITY), "inf");
        assert_eq!(render_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(render_float(f64::NAN), "nan");
    }
}
