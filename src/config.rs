//! Everything a run needs, gathered before any stage is built.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::capability::Capabilities;
use crate::conversion::ConversionSpec;
use crate::error::ConvertError;
use crate::reframe::TruncationPolicy;

/// Where the text or bytes of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    /// One value per argument.
    Arguments(Vec<String>),
    /// A file read line by line (or raw for raw input); `-` is stdin.
    File(PathBuf),
}

/// Configuration of one conversion run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: ConversionSpec,
    pub output: ConversionSpec,
    pub source: SourceSelector,
    pub truncation: TruncationPolicy,
    pub capabilities: Capabilities,
    /// Wall-clock time for date fields the input leaves out; the system
    /// clock when unset.
    pub now: Option<NaiveDateTime>,
}

impl RunConfig {
    /// Int in, int out, default capabilities, zero-filled final frames.
    pub fn new(source: SourceSelector) -> Self {
        Self {
            input: ConversionSpec::default(),
            output: ConversionSpec::default(),
            source,
            truncation: TruncationPolicy::default(),
            capabilities: Capabilities::default(),
            now: None,
        }
    }

    pub fn with_input(mut self, input: ConversionSpec) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: ConversionSpec) -> Self {
        self.output = output;
        self
    }

    pub fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.truncation = truncation;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Fail fast on types this run cannot carry.
    pub fn validate(&self) -> Result<(), ConvertError> {
        self.capabilities.require(self.input.scalar_type)?;
        self.capabilities.require(self.output.scalar_type)?;
        Ok(())
    }
}
