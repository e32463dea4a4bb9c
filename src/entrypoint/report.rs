//! Turning an invocation outcome into output and an exit status.

use super::Outcome;
use crate::parser::Stream;
use serde_json::Value;
use std::io::{self, Write};

/// Hook deciding what an invocation prints and which status it exits with.
///
/// Replace it through [`EntrypointBuilder::reporter`](super::EntrypointBuilder::reporter)
/// to, for example, pretty-print return values or log failures elsewhere.
pub trait Reporter {
    /// Write `outcome` to `out`/`err` and return the exit status
    fn report(
        &self,
        name: &str,
        outcome: &Outcome,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<i32>;
}

/// Default reporter.
///
/// Strings are printed verbatim, `null` prints nothing and every other
/// value is printed as compact JSON. Function errors go to the error
/// stream with their full context chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(
        &self,
        name: &str,
        outcome: &Outcome,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<i32> {
        match outcome {
            Outcome::Returned(value) => {
                match value {
                    Value::Null => {}
                    Value::String(text) => writeln!(out, "{}", text)?,
                    other => writeln!(out, "{}", other)?,
                }
                out.flush()?;
            }
            Outcome::Failed(error) => {
                writeln!(err, "{}: {:#}", name, error)?;
            }
            Outcome::Exited(exit) => match exit.stream {
                Stream::Stdout => {
                    write!(out, "{}", exit.message)?;
                    out.flush()?;
                }
                Stream::Stderr => write!(err, "{}", exit.message)?,
            },
            Outcome::Broken(error) => {
                writeln!(err, "{}: internal error: {}", name, error)?;
            }
        }
        Ok(outcome.exit_code())
    }
}
