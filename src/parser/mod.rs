//! Parser adapters
//!
//! A [`ParserAdapter`] knows how to add positional arguments and options,
//! and how to turn tokens into a flat name→value mapping. The entry-point
//! builder only talks to this trait, so an adapter other than the shipped
//! [`ClapParser`] (an interactive prompt, a test double) can be plugged in
//! through the builder's type parameter.

mod clap_parser;
mod coerce;

pub use clap_parser::ClapParser;

use crate::error::SetupResult;
use crate::spec::OptionSpec;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat mapping from bound name to parsed value
pub type ParsedArgs = BTreeMap<String, Value>;

/// What an adapter is constructed from
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdapterConfig {
    /// Program name shown in usage
    pub name: String,
    /// Description shown in help
    pub description: String,
    /// Adapter-specific keys; only those listed by
    /// [`ParserAdapter::config_keys`] are accepted
    pub extra: BTreeMap<String, Value>,
}

/// Output stream a parse exit writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    /// Standard output (help)
    Stdout,
    /// Standard error (usage errors)
    Stderr,
}

/// Parsing ended the invocation: help was requested or the input was
/// malformed. Carries exactly what should be printed and the exit status.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseExit {
    /// Process exit status
    pub code: i32,
    /// Where `message` goes
    pub stream: Stream,
    /// Fully rendered text, including the trailing newline
    pub message: String,
}

/// Contract between the entry-point builder and a concrete parser.
///
/// Both `add_*` methods receive the declared spec and the spec derived
/// from the function signature separately; declared keys must win. They
/// return the bound name: the key the element fills in the parsed mapping.
pub trait ParserAdapter {
    /// Construct the adapter
    fn from_config(config: &AdapterConfig) -> SetupResult<Self>
    where
        Self: Sized;

    /// Names of the extra configuration keys this adapter understands
    fn config_keys() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }

    /// Add a named flag/option targeting `name`
    fn add_option(
        &mut self,
        name: &str,
        decorator_spec: &OptionSpec,
        param_spec: &OptionSpec,
    ) -> SetupResult<String>;

    /// Add a positional argument targeting `name`
    fn add_argument(
        &mut self,
        name: &str,
        decorator_spec: &OptionSpec,
        param_spec: &OptionSpec,
    ) -> SetupResult<String>;

    /// Parse `tokens`, or the process arguments when `None`
    fn parse(&self, tokens: Option<Vec<String>>) -> Result<ParsedArgs, ParseExit>;
}
