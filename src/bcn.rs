//! BCN codes: three small fields packed into one 16-bit word.
//!
//! Layout: `b` in bits 15..11, `c` in bits 10..5, `n` in bits 4..0. Packing
//! keeps four bits of `b`; unpacking reads the whole top field so any word
//! renders.

use crate::error::ConvertError;

/// Unpacked BCN fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bcn {
    pub b: u16,
    pub c: u16,
    pub n: u16,
}

impl Bcn {
    pub fn new(b: u16, c: u16, n: u16) -> Self {
        Self { b, c, n }
    }

    pub fn pack(self) -> u16 {
        ((self.b & 15) << 11) | ((self.c & 63) << 5) | (self.n & 31)
    }

    pub fn unpack(word: u16) -> Self {
        Self {
            b: word >> 11,
            c: (word >> 5) & 63,
            n: word & 31,
        }
    }

    /// Parse `b c n` or `b,c,n`.
    ///
    /// Either blanks or commas separate the fields, never both; blanks may
    /// follow a comma. Each field is a decimal integer. Values wider than
    /// their field are masked on pack.
    pub fn parse(text: &[u8]) -> Result<Self, ConvertError> {
        let fail = || ConvertError::parse("BCN", text);
        let text = std::str::from_utf8(text).map_err(|_| fail())?;

        let fields: Vec<&str> = if text.contains(',') {
            let parts: Vec<&str> = text.split(',').collect();
            let last = parts.len().saturating_sub(1);
            parts
                .iter()
                .enumerate()
                .map(|(i, part)| if i == last { part.trim() } else { part.trim_start() })
                .collect()
        } else {
            text.split_ascii_whitespace().collect()
        };
        let [b, c, n] = fields.as_slice() else {
            return Err(fail());
        };

        let field = |s: &str| s.parse::<i32>().map(|v| v as u16).map_err(|_| fail());
        Ok(Self::new(field(b)?, field(c)?, field(n)?))
    }
}

impl std::fmt::Display for Bcn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.b, self.c, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_all_fields() {
        for b in 0..=15 {
            for c in 0..=63 {
                for n in 0..=31 {
                    let bcn = Bcn::new(b, c, n);
                    assert_eq!(Bcn::unpack(bcn.pack()), bcn);
                }
            }
        }
    }

    #[test]
    fn test_pack_layout() {
        assert_eq!(Bcn::new(1, 0, 0).pack(), 0x0800);
        assert_eq!(Bcn::new(0, 1, 0).pack(), 0x0020);
        assert_eq!(Bcn::new(0, 0, 1).pack(), 0x0001);
        assert_eq!(Bcn::new(15, 63, 31).pack(), 0x7fff);
    }

    #[test]
    fn test_pack_masks_wide_fields() {
        assert_eq!(Bcn::new(16, 64, 32).pack(), 0);
    }

    #[test]
    fn test_unpack_top_bit() {
        assert_eq!(Bcn::unpack(0x8000), Bcn::new(16, 0, 0));
    }

    #[test]
    fn test_parse_space_separated() {
        assert_eq!(Bcn::parse(b"3 17 9").unwrap(), Bcn::new(3, 17, 9));
    }

    #[test]
    fn test_parse_comma_separated() {
        assert_eq!(Bcn::parse(b"3,17,9").unwrap(), Bcn::new(3, 17, 9));
        assert_eq!(Bcn::parse(b"3, 17, 9\n").unwrap(), Bcn::new(3, 17, 9));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Bcn::parse(b"3 17").is_err());
        assert!(Bcn::parse(b"a,b,c").is_err());
        assert!(Bcn::parse(b"1 2 3 4").is_err());
        assert!(Bcn::parse(b"").is_err());
        assert!(Bcn::parse(b"1,,2,3").is_err());
        assert!(Bcn::parse(b"1 2,3").is_err());
        assert!(Bcn::parse(b",1,2,3,").is_err());
        assert!(Bcn::parse(b"1 , 2 ,3").is_err());
        assert!(Bcn::parse(b"1,2,").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Bcn::new(3, 17, 9).to_string(), "3,17,9");
    }
}
