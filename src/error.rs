//! Error type shared by every conversion stage.
//!
//! Every error is terminal for a run: stages propagate with `?` and the
//! sink loop stops at the first failure.

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use crate::conversion::ScalarType;

/// Errors raised while configuring or driving a conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A token could not be interpreted as the requested kind of value.
    #[error("Unrecognised {what}: {text:?}")]
    Parse { what: &'static str, text: String },

    /// The point-name codec rejected a name.
    #[error("Point name pack error: {0}")]
    PointName(String),

    /// A declared configuration value with no implementation behind it.
    #[error("{0} not implemented yet")]
    Unimplemented(&'static str),

    /// A type whose codec is absent from the active capability set.
    #[error("{0} values not supported on this platform")]
    Unsupported(ScalarType),

    /// Raw data was routed into a scalar codec stage.
    #[error("BUG: raw type in {0}")]
    RawInStage(&'static str),

    /// A buffer could not be grown.
    #[error("Out of memory reserving {bytes} bytes")]
    Allocation { bytes: usize },

    /// Input ended part-way through a fixed-width frame.
    #[error("Truncated input: expected {expected} bytes, got {got}")]
    TruncatedInput { expected: usize, got: usize },

    /// The named input could not be opened.
    #[error("Cannot open {} for read: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConvertError {
    pub(crate) fn parse(what: &'static str, text: &[u8]) -> Self {
        ConvertError::Parse {
            what,
            text: String::from_utf8_lossy(text).trim_end().to_string(),
        }
    }
}

/// Grow `buf` so it can hold `len` bytes, reporting exhaustion as an error.
pub(crate) fn reserve_total(buf: &mut Vec<u8>, len: usize) -> Result<(), ConvertError> {
    if len > buf.len() {
        buf.try_reserve(len - buf.len())
            .map_err(|_: TryReserveError| ConvertError::Allocation { bytes: len })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_trims_line_end() {
        let err = ConvertError::parse("BCN", b"1 2\n");
        assert_eq!(err.to_string(), "Unrecognised BCN: \"1 2\"");
    }

    #[test]
    fn test_unsupported_names_type() {
        let err = ConvertError::Unsupported(ScalarType::PointName);
        assert_eq!(
            err.to_string(),
            "point name values not supported on this platform"
        );
    }

    #[test]
    fn test_reserve_total_grows() {
        let mut buf = Vec::new();
        reserve_total(&mut buf, 64).unwrap();
        assert!(buf.capacity() >= 64);
    }
}
