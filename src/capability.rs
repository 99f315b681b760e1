//! Which platform-specific codecs this build can run.
//!
//! BCN and NordFloat have pure implementations and are switched by cargo
//! features. Point names depend on a site-specific packing scheme, so they
//! are only available once a [`PointNameCodec`] has been installed.

use std::fmt;
use std::sync::Arc;

use crate::conversion::ScalarType;
use crate::error::ConvertError;
use crate::scalar::REGISTER_BYTES;

/// Packs structured point-name text into fixed 16-bit words and back.
pub trait PointNameCodec {
    /// Number of 16-bit words in one packed name.
    fn words(&self) -> usize;

    /// Pack a name. The error text is the codec's own diagnostic.
    fn pack(&self, text: &str) -> Result<Vec<u16>, String>;

    /// Render packed words in the native point-name notation.
    fn unpack(&self, words: &[u16]) -> Result<String, String>;
}

/// The set of optional codecs available to a run.
#[derive(Clone)]
pub struct Capabilities {
    pub bcn: bool,
    pub nord_float: bool,
    pub point_names: Option<Arc<dyn PointNameCodec + Send + Sync>>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            bcn: cfg!(feature = "bcn"),
            nord_float: cfg!(feature = "nordfloat"),
            point_names: None,
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("bcn", &self.bcn)
            .field("nord_float", &self.nord_float)
            .field(
                "point_names",
                &self.point_names.as_ref().map(|codec| codec.words()),
            )
            .finish()
    }
}

impl Capabilities {
    /// No optional codecs at all.
    pub fn none() -> Self {
        Self {
            bcn: false,
            nord_float: false,
            point_names: None,
        }
    }

    pub fn with_point_names(mut self, codec: Arc<dyn PointNameCodec + Send + Sync>) -> Self {
        self.point_names = Some(codec);
        self
    }

    pub fn supports(&self, scalar_type: ScalarType) -> bool {
        match scalar_type {
            ScalarType::Bcn => self.bcn,
            ScalarType::NordFloat => self.nord_float,
            ScalarType::PointName => self.point_names.is_some(),
            _ => true,
        }
    }

    /// Binary width of `scalar_type` under this capability set.
    pub fn width_of(&self, scalar_type: ScalarType) -> Option<usize> {
        match scalar_type {
            ScalarType::PointName => self.point_names.as_ref().map(|codec| 2 * codec.words()),
            other => other.width(),
        }
    }

    /// Fail unless `scalar_type` can be carried through the register.
    pub fn require(&self, scalar_type: ScalarType) -> Result<(), ConvertError> {
        if !self.supports(scalar_type) {
            return Err(ConvertError::Unsupported(scalar_type));
        }
        match self.width_of(scalar_type) {
            Some(width) if width > REGISTER_BYTES => Err(ConvertError::PointName(format!(
                "packed names of {width} bytes do not fit the {REGISTER_BYTES}-byte register"
            ))),
            _ => Ok(()),
        }
    }
}
