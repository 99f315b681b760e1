//! Binary → text stage.

use std::sync::Arc;

use tracing::trace;

use crate::bcn::Bcn;
use crate::capability::{Capabilities, PointNameCodec};
use crate::conversion::{ConversionSpec, LONG_WIDTH, ScalarType};
use crate::date::render_date;
use crate::encoder::TOKEN_CHUNK;
use crate::error::ConvertError;
use crate::nordfloat;
use crate::numeric::{render_float, render_integer};
use crate::scalar::Scalar;
use crate::stage::Producer;

/// Renders each fixed-width upstream frame as one text token.
///
/// Expects exactly one value per pull from upstream, which an expander
/// guarantees. Strings pass through unchanged.
pub struct Decoder<P> {
    upstream: P,
    spec: ConversionSpec,
    width: usize,
    point_names: Option<Arc<dyn PointNameCodec + Send + Sync>>,
    text: String,
}

impl<P: Producer> Decoder<P> {
    pub fn new(
        upstream: P,
        spec: ConversionSpec,
        capabilities: &Capabilities,
    ) -> Result<Self, ConvertError> {
        if spec.scalar_type == ScalarType::Raw {
            return Err(ConvertError::RawInStage("output converter"));
        }
        capabilities.require(spec.scalar_type)?;
        Ok(Self {
            upstream,
            spec,
            width: capabilities
                .width_of(spec.scalar_type)
                .unwrap_or(TOKEN_CHUNK),
            point_names: capabilities.point_names.clone(),
            text: String::new(),
        })
    }
}

impl<P: Producer> Producer for Decoder<P> {
    fn pull(&mut self, _size: usize) -> Result<Option<&[u8]>, ConvertError> {
        let scalar_type = self.spec.scalar_type;
        let Some(frame) = self.upstream.pull(self.width)? else {
            return Ok(None);
        };
        if scalar_type == ScalarType::String {
            return Ok(Some(frame));
        }

        let scalar = Scalar::decode_swapped(scalar_type, frame, self.spec.byte_swap).ok_or(
            ConvertError::TruncatedInput {
                expected: self.width,
                got: frame.len(),
            },
        )?;
        trace!(?scalar, "decoded");
        self.text = render(&self.spec, self.point_names.as_deref(), &scalar)?;
        Ok(Some(self.text.as_bytes()))
    }

    fn name(&self) -> &str {
        "DECODE"
    }
}

fn render(
    spec: &ConversionSpec,
    point_names: Option<&(dyn PointNameCodec + Send + Sync)>,
    scalar: &Scalar,
) -> Result<String, ConvertError> {
    Ok(match scalar {
        Scalar::Char(v) => render_sized(*v as i64, 1, spec),
        Scalar::Short(v) => render_sized(*v as i64, 2, spec),
        Scalar::Int(v) => render_sized(*v as i64, 4, spec),
        Scalar::Long(v) => render_sized(*v, LONG_WIDTH, spec),
        Scalar::Float(v) => render_float(*v),
        Scalar::Double(v) => render_float(*v),
        Scalar::Bcn(word) => Bcn::unpack(*word).to_string(),
        Scalar::NordFloat(words) => render_float(nordfloat::to_f64(*words)),
        Scalar::PointName(words) => point_names
            .ok_or(ConvertError::Unsupported(ScalarType::PointName))?
            .unpack(words)
            .map_err(ConvertError::PointName)?,
        Scalar::Date(seconds) => render_date(*seconds, spec.unsigned_or_utc)?,
    })
}

/// Sign-extend only for signed decimal output; every other style shows the
/// value's own bits.
fn render_sized(value: i64, width: usize, spec: &ConversionSpec) -> String {
    let signed = spec.style.is_decimal() && !spec.unsigned_or_utc;
    let value = if signed || width >= 8 {
        value
    } else {
        value & ((1i64 << (8 * width)) - 1)
    };
    render_integer(value, width, spec.style, spec.unsigned_or_utc)
}
