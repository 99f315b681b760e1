//! # cconv-rs
//!
//! Streaming conversion of scalar values between text and binary.
//!
//! Values are read as text tokens (command arguments or lines of a file)
//! or as raw bytes, packed into their binary form, and written back out as
//! text in another type or notation, or as raw bytes.
//!
//! ## Overview
//!
//! A run is a linear chain of pull stages:
//! - **Sources** hand out arguments, lines or raw bytes
//! - **Encoder** turns each text token into one binary value
//! - **Reducer** and **Expander** re-cut the byte stream into whole values
//! - **Decoder** renders each binary value as text
//!
//! The sink at the end of the chain drives everything by pulling.
//!
//! ## Example
//!
//! ```
//! use cconv_rs::{ConversionSpec, RunConfig, ScalarType, SourceSelector, Style, run};
//!
//! let config = RunConfig::new(SourceSelector::Arguments(vec!["255".into(), "16".into()]))
//!     .with_input(ConversionSpec::new(ScalarType::Short))
//!     .with_output(ConversionSpec::new(ScalarType::Short).with_style(Style::Hex));
//!
//! let mut out = Vec::new();
//! run(&config, &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "ff\n10\n");
//! ```

pub mod bcn;
pub mod capability;
pub mod config;
pub mod conversion;
pub mod date;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod nordfloat;
pub mod numeric;
pub mod pipeline;
pub mod reframe;
pub mod scalar;
pub mod source;
pub mod stage;

pub use bcn::Bcn;
pub use capability::{Capabilities, PointNameCodec};
pub use config::{RunConfig, SourceSelector};
pub use conversion::{ConversionSpec, Quoting, ScalarType, Style};
pub use date::{DateParser, render_date};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::ConvertError;
pub use pipeline::{RunSummary, build, run};
pub use reframe::{Expander, Reducer, TruncationPolicy};
pub use scalar::{Scalar, ScalarBuffer, SwapUnit};
pub use source::{ArgumentSource, LineSource, RawFileSource, open_input};
pub use stage::Producer;
