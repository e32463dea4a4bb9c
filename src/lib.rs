//! entrypoint - turn ordinary functions into command-line entry points
//!
//! A function is described by its parameter list ([`Param`]) and wrapped in
//! an [`EntrypointBuilder`] together with per-parameter specs. Building
//! the entry point:
//!
//! - **`signature`** - classifies every parameter by kind
//! - **`spec`** - merges each declared spec with the parameter's own default
//!   and type, and decides between a positional argument and a named option
//! - **`parser`** - adds the element to a [`ParserAdapter`] ([`ClapParser`]
//!   by default)
//! - **`dispatch`** - records where each argument will come from and checks
//!   that every required parameter is covered
//!
//! Invoking it parses tokens, rebuilds the call and reports the result.
//!
//! # Example
//!
//! ```
//! use entrypoint::{EntrypointBuilder, OptionSpec, Param, TypeHint};
//!
//! let ep = EntrypointBuilder::new(
//!     "scale",
//!     [Param::plain("value"), Param::keyword_only("factor").with_default(2)],
//!     |args| -> anyhow::Result<i64> {
//!         Ok(args.arg::<i64>(0)? * args.keyword::<i64>("factor")?)
//!     },
//! )
//! .doc("Multiply a value.")
//! .param("value", OptionSpec::new().help("the value").value_type(TypeHint::Int))
//! .param("_factor", OptionSpec::new().help("multiplier").value_type(TypeHint::Int))
//! .build()
//! .unwrap();
//!
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = ep.invoke_to(
//!     Some(vec!["21".into(), "--factor".into(), "2".into()]),
//!     &mut out,
//!     &mut err,
//! );
//! assert_eq!(code, 0);
//! assert_eq!(String::from_utf8(out).unwrap(), "42\n");
//! ```
//!
//! # Declarations files
//!
//! Names, descriptions and specs can also come from a TOML or JSON file;
//! see [`config`]. The [`manifest`] module writes a [`Registry`] into a
//! package manifest.

#![warn(missing_docs)]

pub mod config;
pub mod demos;
pub mod dispatch;
pub mod entrypoint;
pub mod error;
pub mod manifest;
pub mod parser;
pub mod signature;
pub mod spec;

pub use config::{EntrypointSection, EntrypointsFile};
pub use dispatch::{CallArgs, DispatchTable};
pub use entrypoint::{
    ConsoleReporter, Entrypoint, EntrypointBuilder, NameStyle, Outcome, Registry, Reporter,
};
pub use error::{DispatchError, SetupError, SetupResult};
pub use manifest::ManifestDocument;
pub use parser::{AdapterConfig, ClapParser, ParseExit, ParsedArgs, ParserAdapter, Stream};
pub use signature::{
    classify, DeclaredKind, Param, ParameterDescriptor, ParameterKind, Signature, TypeHint,
};
pub use spec::{Action, DefaultValue, Nargs, OptionSpec, ParamSpec};
