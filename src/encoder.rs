//! Text → binary stage.

use std::sync::Arc;

use tracing::trace;

use crate::bcn::Bcn;
use crate::capability::{Capabilities, PointNameCodec};
use crate::conversion::{ConversionSpec, Quoting, ScalarType};
use crate::date::DateParser;
use crate::error::ConvertError;
use crate::nordfloat;
use crate::numeric::{parse_float, parse_styled};
use crate::scalar::{Scalar, ScalarBuffer};
use crate::stage::Producer;

/// Size requested upstream for one text token.
pub const TOKEN_CHUNK: usize = 1024;

/// Converts each upstream text token into the binary form of one value.
///
/// Fixed-width types come out exactly one value wide. Strings pass through
/// unchanged.
pub struct Encoder<P> {
    upstream: P,
    spec: ConversionSpec,
    point_names: Option<Arc<dyn PointNameCodec + Send + Sync>>,
    dates: DateParser,
    register: ScalarBuffer,
}

impl<P: Producer> Encoder<P> {
    pub fn new(
        upstream: P,
        spec: ConversionSpec,
        capabilities: &Capabilities,
    ) -> Result<Self, ConvertError> {
        if spec.scalar_type == ScalarType::Raw {
            return Err(ConvertError::RawInStage("input converter"));
        }
        capabilities.require(spec.scalar_type)?;
        Ok(Self {
            upstream,
            spec,
            point_names: capabilities.point_names.clone(),
            dates: DateParser::new(spec.unsigned_or_utc),
            register: ScalarBuffer::default(),
        })
    }

    /// Replace the date parser, e.g. with one on a fixed clock.
    pub fn with_date_parser(mut self, dates: DateParser) -> Self {
        self.dates = dates;
        self
    }
}

impl<P: Producer> Producer for Encoder<P> {
    fn pull(&mut self, _size: usize) -> Result<Option<&[u8]>, ConvertError> {
        let Some(token) = self.upstream.pull(TOKEN_CHUNK)? else {
            return Ok(None);
        };

        if self.spec.scalar_type == ScalarType::String {
            return match self.spec.quoting {
                Quoting::None => Ok(Some(token)),
                Quoting::Shell => Err(ConvertError::Unimplemented("Shell quoting")),
                Quoting::Tcl => Err(ConvertError::Unimplemented("Tcl quoting")),
            };
        }

        let scalar = encode_token(&self.spec, self.point_names.as_deref(), &self.dates, token)?;
        trace!(?scalar, "encoded");
        self.register = scalar.encode_swapped(self.spec.byte_swap);
        Ok(Some(self.register.as_bytes()))
    }

    fn name(&self) -> &str {
        "ENCODE"
    }
}

fn encode_token(
    spec: &ConversionSpec,
    point_names: Option<&(dyn PointNameCodec + Send + Sync)>,
    dates: &DateParser,
    token: &[u8],
) -> Result<Scalar, ConvertError> {
    let scalar_type = spec.scalar_type;
    Ok(match scalar_type {
        ScalarType::Char | ScalarType::Short | ScalarType::Int | ScalarType::Long => {
            let value = parse_styled(token, spec.style);
            Scalar::from_integer(scalar_type, value)
                .ok_or(ConvertError::Unsupported(scalar_type))?
        }
        ScalarType::Float => Scalar::Float(parse_float(token) as f32),
        ScalarType::Double => Scalar::Double(parse_float(token)),
        ScalarType::Bcn => Scalar::Bcn(Bcn::parse(token)?.pack()),
        ScalarType::NordFloat => Scalar::NordFloat(nordfloat::from_f32(parse_float(token) as f32)),
        ScalarType::PointName => {
            let codec = point_names.ok_or(ConvertError::Unsupported(scalar_type))?;
            let text = token_text(token, "point name")?;
            let words = codec.pack(text).map_err(ConvertError::PointName)?;
            if words.len() != codec.words() {
                return Err(ConvertError::PointName(format!(
                    "codec packed {} words, expected {}",
                    words.len(),
                    codec.words()
                )));
            }
            Scalar::PointName(words)
        }
        ScalarType::Date => Scalar::Date(dates.parse(token_text(token, "date")?)?),
        // Strings never reach the register.
        ScalarType::Raw | ScalarType::String => {
            return Err(ConvertError::RawInStage("input converter"));
        }
    })
}

fn token_text<'a>(token: &'a [u8], what: &'static str) -> Result<&'a str, ConvertError> {
    std::str::from_utf8(token)
        .map(|text| text.trim_end_matches(['\r', '\n']))
        .map_err(|_| ConvertError::parse(what, token))
}
