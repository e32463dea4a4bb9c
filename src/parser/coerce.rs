//! clap value parser applying a [`TypeHint`].

use crate::signature::TypeHint;
use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use clap::{Arg, Command};
use serde_json::Value;
use std::ffi::OsStr;

/// Turns each raw token into a [`Value`]; coercion failures become usage
/// errors reported by clap.
#[derive(Clone, Debug)]
pub(crate) struct CoerceValue {
    hint: TypeHint,
}

impl CoerceValue {
    pub(crate) fn new(hint: TypeHint) -> Self {
        Self { hint }
    }
}

impl TypedValueParser for CoerceValue {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        self.hint.coerce(raw).map_err(|message| {
            let target = arg
                .map(|a| a.to_string())
                .unwrap_or_else(|| "value".to_string());
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("argument {}: {}\n", target, message),
            )
            .with_cmd(cmd)
        })
    }
}
