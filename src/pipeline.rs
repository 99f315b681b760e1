//! Chain assembly and the sink loop that drives it.
//!
//! ```text
//! source -> [encoder] -> reducer -> [expander] -> [decoder] -> sink
//! ```
//!
//! The encoder is left out for raw input. The expander is left out for raw
//! and string output, the decoder for raw output.

use std::io::Write;

use tracing::{debug, info};

use crate::config::{RunConfig, SourceSelector};
use crate::conversion::ScalarType;
use crate::date::DateParser;
use crate::decoder::Decoder;
use crate::encoder::{Encoder, TOKEN_CHUNK};
use crate::error::ConvertError;
use crate::reframe::{Expander, Reducer};
use crate::source::{ArgumentSource, LineSource, RawFileSource, open_input};
use crate::stage::Producer;

/// What a finished run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tokens for text output, chunks for raw output.
    pub chunks: usize,
    /// Bytes written, not counting line ends.
    pub bytes: usize,
}

/// Validate `config` and assemble its stage chain.
pub fn build(config: &RunConfig) -> Result<Box<dyn Producer>, ConvertError> {
    config.validate()?;
    let input = config.input.scalar_type;
    let output = config.output.scalar_type;

    let mut chain: Box<dyn Producer> = match &config.source {
        SourceSelector::Arguments(args) => Box::new(ArgumentSource::new(args.iter().cloned())),
        SourceSelector::File(path) => {
            let reader = open_input(path)?;
            if input == ScalarType::Raw {
                Box::new(RawFileSource::new(reader))
            } else {
                Box::new(LineSource::new(reader))
            }
        }
    };
    let mut names = vec![chain.name().to_string()];

    if input != ScalarType::Raw {
        let mut encoder = Encoder::new(chain, config.input, &config.capabilities)?;
        if let Some(now) = config.now {
            let dates = DateParser::new(config.input.unsigned_or_utc).with_now(now);
            encoder = encoder.with_date_parser(dates);
        }
        chain = Box::new(encoder);
        names.push(chain.name().to_string());
    }

    // Values can arrive in any size; cut them down to what is asked for.
    chain = Box::new(Reducer::new(chain));
    names.push(chain.name().to_string());

    if output != ScalarType::Raw && output != ScalarType::String {
        chain = Box::new(Expander::with_policy(chain, config.truncation));
        names.push(chain.name().to_string());
    }
    if output != ScalarType::Raw {
        chain = Box::new(Decoder::new(chain, config.output, &config.capabilities)?);
        names.push(chain.name().to_string());
    }

    debug!(stages = %names.join(" | "), "pipeline assembled");
    Ok(chain)
}

/// Run a conversion to completion, writing everything to `out`.
///
/// Raw output is written as is; text output gets one token per line.
pub fn run(config: &RunConfig, out: &mut impl Write) -> Result<RunSummary, ConvertError> {
    let mut chain = build(config)?;
    let raw = config.output.scalar_type == ScalarType::Raw;

    let mut summary = RunSummary::default();
    while let Some(chunk) = chain.pull(TOKEN_CHUNK)? {
        out.write_all(chunk)?;
        if !raw {
            out.write_all(b"\n")?;
        }
        summary.chunks += 1;
        summary.bytes += chunk.len();
    }
    out.flush()?;

    info!(
        chunks = summary.chunks,
        bytes = summary.bytes,
        "conversion finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{ConversionSpec, Style};

    fn args(values: &[&str]) -> SourceSelector {
        SourceSelector::Arguments(values.iter().map(|v| v.to_string()).collect())
    }

    fn output_of(config: &RunConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_int_to_int() {
        let config = RunConfig::new(args(&["007", "-3"]));
        assert_eq!(output_of(&config), "7\n-3\n");
    }

    #[test]
    fn test_int_to_hex() {
        let config = RunConfig::new(args(&["10"]))
            .with_output(ConversionSpec::new(ScalarType::Int).with_style(Style::Hex));
        assert_eq!(output_of(&config), "a\n");
    }

    #[test]
    fn test_stage_order() {
        let config = RunConfig::new(args(&["1"]));
        let chain = build(&config).unwrap();
        assert_eq!(chain.name(), "DECODE");

        let raw = RunConfig::new(args(&["1"])).with_output(ConversionSpec::new(ScalarType::Raw));
        assert_eq!(build(&raw).unwrap().name(), "REDUCE");
    }

    #[test]
    fn test_raw_output_has_no_line_ends() {
        let config = RunConfig::new(args(&["1", "2"]))
            .with_input(ConversionSpec::new(ScalarType::Char))
            .with_output(ConversionSpec::new(ScalarType::Raw));
        let mut out: Vec<u8> = Vec::new();
        let summary = run(&config, &mut out).unwrap();
        assert_eq!(out, vec![1, 2]);
        assert_eq!(summary.bytes, 2);
    }

    #[test]
    fn test_summary_counts_tokens() {
        let config = RunConfig::new(args(&["1", "2", "3"]));
        let summary = run(&config, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                chunks: 3,
                bytes: 3
            }
        );
    }

    #[test]
    fn test_fixed_clock_fills_missing_date_fields() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let config = RunConfig::new(args(&["10:30"]))
            .with_input(ConversionSpec::new(ScalarType::Date).utc(true))
            .with_output(ConversionSpec::new(ScalarType::Date).utc(true))
            .with_now(now);
        assert_eq!(output_of(&config), "Mon Jan 15 10:30:00 2024\n");
    }

    #[test]
    fn test_no_values_writes_nothing() {
        let config = RunConfig::new(args(&[]));
        assert_eq!(output_of(&config), "");
    }
}
