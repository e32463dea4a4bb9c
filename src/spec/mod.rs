//! Per-parameter specifications and how they are merged with a signature

mod merge;
mod option;

pub use merge::{merge, Binding, ElementKind};
pub use option::{Action, DefaultValue, Nargs, OptionSpec};

use crate::error::{SetupError, SetupResult};
use serde_json::Value;

/// What the author attached to one parameter key: a help string or a full
/// options mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamSpec {
    /// Shorthand for an options mapping with only `help`
    Help(String),
    /// Full options mapping
    Options(OptionSpec),
}

impl ParamSpec {
    /// Build from a dynamic value, as read from a declarations file
    pub fn from_value(name: &str, value: &Value) -> SetupResult<Self> {
        match value {
            Value::String(help) => Ok(Self::Help(help.clone())),
            Value::Object(map) => OptionSpec::from_map(name, map).map(Self::Options),
            other => Err(SetupError::spec(
                name,
                format!(
                    "must be either a help string or a mapping of options, got {}",
                    other
                ),
            )),
        }
    }

    /// The spec as an options mapping
    pub fn to_options(&self) -> OptionSpec {
        match self {
            Self::Help(help) => OptionSpec::new().help(help.clone()),
            Self::Options(options) => options.clone(),
        }
    }
}

impl From<&str> for ParamSpec {
    fn from(help: &str) -> Self {
        Self::Help(help.to_string())
    }
}

impl From<String> for ParamSpec {
    fn from(help: String) -> Self {
        Self::Help(help)
    }
}

impl From<OptionSpec> for ParamSpec {
    fn from(options: OptionSpec) -> Self {
        Self::Options(options)
    }
}
