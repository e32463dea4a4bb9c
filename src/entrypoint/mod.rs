//! Built entry points and how they run
//!
//! An [`Entrypoint`] owns everything needed to go from command-line tokens
//! to a reported result: the parser adapter, the dispatch table, the wrapped
//! function and the reporter. It is produced by [`EntrypointBuilder`] and
//! never changes afterwards.

mod builder;
mod registry;
mod report;

pub use builder::{EntrypointBuilder, NameStyle};
pub use registry::Registry;
pub use report::{ConsoleReporter, Reporter};

use crate::dispatch::{CallArgs, DispatchTable};
use crate::error::DispatchError;
use crate::parser::{ClapParser, ParseExit, ParserAdapter};
use crate::spec::Binding;
use anyhow::Result;
use serde_json::Value;
use std::io::{self, Write};
use tracing::{debug, error};

/// Exit status for a function that returned an error
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for a broken dispatch contract
pub const EXIT_INTERNAL: i32 = 70;

/// Type-erased wrapped function
pub(crate) type BoxedFunction = Box<dyn Fn(CallArgs) -> Result<Value>>;

/// What one invocation produced
#[derive(Debug)]
pub enum Outcome {
    /// The function returned this value
    Returned(Value),
    /// The function returned an error
    Failed(anyhow::Error),
    /// Parsing stopped early: help or a usage error
    Exited(ParseExit),
    /// The parsed mapping did not match the dispatch table
    Broken(DispatchError),
}

impl Outcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Returned(_) => 0,
            Self::Failed(_) => EXIT_FAILURE,
            Self::Exited(exit) => exit.code,
            Self::Broken(_) => EXIT_INTERNAL,
        }
    }

    /// The returned value, if the function ran successfully
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Returned(value) => Some(value),
            _ => None,
        }
    }
}

/// A function wired to a command line.
pub struct Entrypoint<P = ClapParser> {
    name: String,
    description: String,
    function_name: String,
    reference: String,
    bindings: Vec<Binding>,
    parser: P,
    table: DispatchTable,
    function: BoxedFunction,
    reporter: Box<dyn Reporter>,
}

impl<P: ParserAdapter> Entrypoint<P> {
    /// Command name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description shown in help
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Name of the wrapped function
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// `<module>:<function>.invoke`, as stored in the registry
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// How each declared spec was bound
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The parser adapter
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Call the wrapped function directly, bypassing parsing and reporting
    pub fn call(&self, args: CallArgs) -> Result<Value> {
        (self.function)(args)
    }

    /// Parse, dispatch and call without printing anything
    pub fn run(&self, tokens: Option<Vec<String>>) -> Outcome {
        let parsed = match self.parser.parse(tokens) {
            Ok(parsed) => parsed,
            Err(exit) => {
                debug!(entrypoint = %self.name, code = exit.code, "parsing stopped");
                return Outcome::Exited(exit);
            }
        };

        match self.table.invoke(|call| (self.function)(call), &parsed) {
            Ok(Ok(value)) => Outcome::Returned(value),
            Ok(Err(e)) => Outcome::Failed(e),
            Err(e) => {
                error!(entrypoint = %self.name, error = %e, "dispatch contract broken");
                Outcome::Broken(e)
            }
        }
    }

    /// Run and report to the given writers, returning the exit status
    pub fn invoke_to(
        &self,
        tokens: Option<Vec<String>>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        let outcome = self.run(tokens);
        match self.reporter.report(&self.name, &outcome, out, err) {
            Ok(code) => code,
            Err(e) => {
                debug!(entrypoint = %self.name, error = %e, "failed to write report");
                outcome.exit_code().max(EXIT_FAILURE)
            }
        }
    }

    /// Run against the process streams and exit with the resulting status.
    ///
    /// `None` parses the process arguments.
    pub fn invoke(&self, tokens: Option<Vec<String>>) -> ! {
        let code = self.invoke_to(tokens, &mut io::stdout().lock(), &mut io::stderr().lock());
        std::process::exit(code)
    }
}

impl<P> std::fmt::Debug for Entrypoint<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entrypoint")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("reference", &self.reference)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
