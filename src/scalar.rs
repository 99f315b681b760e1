//! The scalar register exchanged between the encoder and decoder.
//!
//! [`Scalar`] holds one strongly-typed value; [`ScalarBuffer`] is its
//! native-order binary form, at most eight bytes long. Byte swapping is an
//! explicit operation on the buffer, never a reinterpretation of memory.

use crate::conversion::{LONG_WIDTH, NORD_WORDS, ScalarType, TIME_WIDTH};

/// Capacity of the binary register.
pub const REGISTER_BYTES: usize = 8;

/// Granularity of a byte swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapUnit {
    /// Reverse every meaningful byte of the value.
    Whole,
    /// Reverse the two bytes of each 16-bit word, keeping word order.
    Words,
}

impl SwapUnit {
    pub fn for_type(scalar_type: ScalarType) -> Self {
        match scalar_type {
            ScalarType::NordFloat | ScalarType::PointName => SwapUnit::Words,
            _ => SwapUnit::Whole,
        }
    }
}

/// Binary form of one value; only the first `len` bytes are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalarBuffer {
    bytes: [u8; REGISTER_BYTES],
    len: usize,
}

impl ScalarBuffer {
    /// Copy up to [`REGISTER_BYTES`] bytes into a register.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(REGISTER_BYTES);
        let mut buffer = Self::default();
        buffer.bytes[..len].copy_from_slice(&bytes[..len]);
        buffer.len = len;
        buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn swap(&mut self, unit: SwapUnit) {
        let bytes = &mut self.bytes[..self.len];
        match unit {
            SwapUnit::Whole => bytes.reverse(),
            SwapUnit::Words => bytes.chunks_exact_mut(2).for_each(|word| word.swap(0, 1)),
        }
    }

    pub fn swapped(mut self, unit: SwapUnit) -> Self {
        self.swap(unit);
        self
    }
}

/// One value of a fixed-width type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Char(i8),
    Short(i16),
    Int(i32),
    /// Platform `long`, stored as 64 bits; narrowed on encode when `long`
    /// is 32 bits.
    Long(i64),
    Float(f32),
    Double(f64),
    Bcn(u16),
    NordFloat([u16; NORD_WORDS]),
    PointName(Vec<u16>),
    /// Seconds since the epoch, narrowed like `Long`.
    Date(i64),
}

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Char(_) => ScalarType::Char,
            Scalar::Short(_) => ScalarType::Short,
            Scalar::Int(_) => ScalarType::Int,
            Scalar::Long(_) => ScalarType::Long,
            Scalar::Float(_) => ScalarType::Float,
            Scalar::Double(_) => ScalarType::Double,
            Scalar::Bcn(_) => ScalarType::Bcn,
            Scalar::NordFloat(_) => ScalarType::NordFloat,
            Scalar::PointName(_) => ScalarType::PointName,
            Scalar::Date(_) => ScalarType::Date,
        }
    }

    /// Narrow an integer to `scalar_type`, keeping its low-order bits.
    pub fn from_integer(scalar_type: ScalarType, value: i64) -> Option<Self> {
        Some(match scalar_type {
            ScalarType::Char => Scalar::Char(value as i8),
            ScalarType::Short => Scalar::Short(value as i16),
            ScalarType::Int => Scalar::Int(value as i32),
            ScalarType::Long => Scalar::Long(narrow_word(value, LONG_WIDTH)),
            _ => return None,
        })
    }

    /// Native-order binary form.
    pub fn encode(&self) -> ScalarBuffer {
        match self {
            Scalar::Char(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::Short(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::Int(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::Long(v) => encode_word(*v, LONG_WIDTH),
            Scalar::Float(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::Double(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::Bcn(v) => ScalarBuffer::from_bytes(&v.to_ne_bytes()),
            Scalar::NordFloat(words) => encode_words(words),
            Scalar::PointName(words) => encode_words(words),
            Scalar::Date(v) => encode_word(*v, TIME_WIDTH),
        }
    }

    /// Encode, then swap if asked.
    pub fn encode_swapped(&self, swap: bool) -> ScalarBuffer {
        let buffer = self.encode();
        if swap {
            buffer.swapped(SwapUnit::for_type(self.scalar_type()))
        } else {
            buffer
        }
    }

    /// Interpret native-order bytes as `scalar_type`.
    ///
    /// Returns `None` for types without a fixed binary form, or when
    /// `bytes` is not exactly one value wide.
    pub fn decode(scalar_type: ScalarType, bytes: &[u8]) -> Option<Self> {
        if scalar_type == ScalarType::PointName {
            if bytes.is_empty() || bytes.len() % 2 != 0 || bytes.len() > REGISTER_BYTES {
                return None;
            }
            return Some(Scalar::PointName(decode_words(bytes)));
        }
        if scalar_type.width() != Some(bytes.len()) {
            return None;
        }
        Some(match scalar_type {
            ScalarType::Char => Scalar::Char(i8::from_ne_bytes([bytes[0]])),
            ScalarType::Short => Scalar::Short(i16::from_ne_bytes(array(bytes))),
            ScalarType::Int => Scalar::Int(i32::from_ne_bytes(array(bytes))),
            ScalarType::Long => Scalar::Long(decode_word(bytes)),
            ScalarType::Float => Scalar::Float(f32::from_ne_bytes(array(bytes))),
            ScalarType::Double => Scalar::Double(f64::from_ne_bytes(array(bytes))),
            ScalarType::Bcn => Scalar::Bcn(u16::from_ne_bytes(array(bytes))),
            ScalarType::NordFloat => {
                let mut words = [0u16; NORD_WORDS];
                words.copy_from_slice(&decode_words(bytes));
                Scalar::NordFloat(words)
            }
            ScalarType::Date => Scalar::Date(decode_word(bytes)),
            ScalarType::Raw | ScalarType::String | ScalarType::PointName => return None,
        })
    }

    /// Swap `bytes` if asked, then decode.
    pub fn decode_swapped(scalar_type: ScalarType, bytes: &[u8], swap: bool) -> Option<Self> {
        if swap {
            let buffer = ScalarBuffer::from_bytes(bytes).swapped(SwapUnit::for_type(scalar_type));
            Self::decode(scalar_type, buffer.as_bytes())
        } else {
            Self::decode(scalar_type, bytes)
        }
    }
}

fn narrow_word(value: i64, width: usize) -> i64 {
    if width == 4 { value as i32 as i64 } else { value }
}

fn encode_word(value: i64, width: usize) -> ScalarBuffer {
    if width == 4 {
        ScalarBuffer::from_bytes(&(value as i32).to_ne_bytes())
    } else {
        ScalarBuffer::from_bytes(&value.to_ne_bytes())
    }
}

fn decode_word(bytes: &[u8]) -> i64 {
    if bytes.len() == 4 {
        i32::from_ne_bytes(array(bytes)) as i64
    } else {
        i64::from_ne_bytes(array(bytes))
    }
}

fn encode_words(words: &[u16]) -> ScalarBuffer {
    let mut bytes = [0u8; REGISTER_BYTES];
    let count = words.len().min(REGISTER_BYTES / 2);
    for (slot, word) in bytes.chunks_exact_mut(2).zip(&words[..count]) {
        slot.copy_from_slice(&word.to_ne_bytes());
    }
    ScalarBuffer::from_bytes(&bytes[..2 * count])
}

fn decode_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect()
}

/// Callers check the length first.
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
