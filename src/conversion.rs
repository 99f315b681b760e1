//! Conversion control: what type a direction carries and how it is written.
//!
//! A run holds two [`ConversionSpec`] values, one for the text → binary
//! input side and one for the binary → text output side. Both are built once
//! and never change afterwards.

use std::ffi::c_long;
use std::fmt;

/// Width in bytes of the platform `long`.
pub const LONG_WIDTH: usize = size_of::<c_long>();

/// Width in bytes of a binary date: a 64-bit `time_t` of seconds since the
/// epoch, whatever the width of `long`.
pub const TIME_WIDTH: usize = size_of::<i64>();

/// Number of 16-bit words in a NordFloat value.
pub const NORD_WORDS: usize = 3;

/// Kind of value carried through a conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Bytes passed through with no interpretation.
    Raw,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Text passed through unchanged, variable width.
    String,
    /// Packed instrument point name.
    PointName,
    /// Packed 16-bit `b,c,n` code.
    Bcn,
    /// Legacy 48-bit floating point.
    NordFloat,
    /// Seconds since 1970-01-01.
    Date,
}

impl ScalarType {
    /// Canonical binary width, or `None` for variable-width types.
    ///
    /// Point names report `None` here because their width belongs to the
    /// installed codec, see [`crate::Capabilities::width_of`].
    pub fn width(self) -> Option<usize> {
        match self {
            ScalarType::Char => Some(1),
            ScalarType::Short | ScalarType::Bcn => Some(2),
            ScalarType::Int | ScalarType::Float => Some(4),
            ScalarType::Long => Some(LONG_WIDTH),
            ScalarType::Double => Some(8),
            ScalarType::NordFloat => Some(2 * NORD_WORDS),
            ScalarType::Date => Some(TIME_WIDTH),
            ScalarType::Raw | ScalarType::String | ScalarType::PointName => None,
        }
    }

    /// Char, Short, Int and Long: the types [`Style`] applies to.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarType::Char | ScalarType::Short | ScalarType::Int | ScalarType::Long
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::Raw => "raw",
            ScalarType::Char => "char",
            ScalarType::Short => "short",
            ScalarType::Int => "int",
            ScalarType::Long => "long",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::String => "string",
            ScalarType::PointName => "point name",
            ScalarType::Bcn => "BCN",
            ScalarType::NordFloat => "NordFloat",
            ScalarType::Date => "date",
        })
    }
}

/// Text notation for integer types. Ignored by every other type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Default,
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Style {
    /// Signed rendering only happens in decimal notation.
    pub fn is_decimal(self) -> bool {
        matches!(self, Style::Default | Style::Decimal)
    }
}

/// Quoting applied to string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
    #[default]
    None,
    Shell,
    Tcl,
}

/// Configuration of one conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    pub scalar_type: ScalarType,
    pub style: Style,
    pub quoting: Quoting,
    /// Unsigned for integer types, UTC for dates.
    pub unsigned_or_utc: bool,
    /// Reverse byte order of the binary form at this boundary.
    pub byte_swap: bool,
}

impl Default for ConversionSpec {
    fn default() -> Self {
        Self {
            scalar_type: ScalarType::Int,
            style: Style::Default,
            quoting: Quoting::None,
            unsigned_or_utc: false,
            byte_swap: false,
        }
    }
}

impl ConversionSpec {
    pub fn new(scalar_type: ScalarType) -> Self {
        Self {
            scalar_type,
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_quoting(mut self, quoting: Quoting) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn unsigned(mut self, yes: bool) -> Self {
        self.unsigned_or_utc = yes;
        self
    }

    /// Same flag as [`ConversionSpec::unsigned`], named for dates.
    pub fn utc(self, yes: bool) -> Self {
        self.unsigned(yes)
    }

    pub fn swapped(mut self, yes: bool) -> Self {
        self.byte_swap = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_signed_int() {
        let spec = ConversionSpec::default();
        assert_eq!(spec.scalar_type, ScalarType::Int);
        assert_eq!(spec.style, Style::Default);
        assert_eq!(spec.quoting, Quoting::None);
        assert!(!spec.unsigned_or_utc);
        assert!(!spec.byte_swap);
    }

    #[test]
    fn test_fixed_widths() {
        assert_eq!(ScalarType::Char.width(), Some(1));
        assert_eq!(ScalarType::Short.width(), Some(2));
        assert_eq!(ScalarType::Bcn.width(), Some(2));
        assert_eq!(ScalarType::Int.width(), Some(4));
        assert_eq!(ScalarType::Float.width(), Some(4));
        assert_eq!(ScalarType::Double.width(), Some(8));
        assert_eq!(ScalarType::NordFloat.width(), Some(6));
        assert!(matches!(ScalarType::Long.width(), Some(4 | 8)));
        assert_eq!(ScalarType::Date.width(), Some(8));
    }

    #[test]
    fn test_variable_widths() {
        assert_eq!(ScalarType::Raw.width(), None);
        assert_eq!(ScalarType::String.width(), None);
        assert_eq!(ScalarType::PointName.width(), None);
    }

    #[test]
    fn test_builder_chain() {
        let spec = ConversionSpec::new(ScalarType::Date).utc(true).swapped(true);
        assert_eq!(spec.scalar_type, ScalarType::Date);
        assert!(spec.unsigned_or_utc);
        assert!(spec.byte_swap);
    }

    #[test]
    fn test_integer_family() {
        assert!(ScalarType::Char.is_integer());
        assert!(ScalarType::Long.is_integer());
        assert!(!ScalarType::Bcn.is_integer());
        assert!(!ScalarType::Float.is_integer());
    }
}
