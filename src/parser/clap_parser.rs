//! Default parser adapter built on clap.
//!
//! Usage errors are reformatted into the two-line shape
//!
//! ```text
//! usage: example <foo> <bar> <baz>
//! example: error: unexpected argument '4' found
//! ```
//!
//! and help starts with the usage line, a blank line and the description.

use super::coerce::CoerceValue;
use super::{AdapterConfig, ParseExit, ParsedArgs, ParserAdapter, Stream};
use crate::error::{SetupError, SetupResult};
use crate::signature::TypeHint;
use crate::spec::{Action, DefaultValue, Nargs, OptionSpec};
use clap::builder::ValueRange;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

const HELP_TEMPLATE: &str = "usage: {usage}\n\n{about-with-newline}\n{all-args}{after-help}";
const HELP_TEMPLATE_NO_ABOUT: &str = "usage: {usage}\n\n{all-args}{after-help}";

/// Exit status for mappings the adapter itself cannot read back
const INTERNAL_ERROR: i32 = 70;

/// What the adapter needs to read one element back out of the matches
#[derive(Clone, Debug)]
struct BoundArg {
    id: String,
    action: Action,
    multiple: bool,
    default: Option<DefaultValue>,
}

/// Shape of the most recently added positional argument
#[derive(Clone, Debug)]
struct PositionalShape {
    id: String,
    optional: bool,
    unbounded: bool,
}

/// [`ParserAdapter`] delegating token parsing to clap.
///
/// Options get a short alias from the first letter of the target name and
/// a long alias with underscores replaced by hyphens.
///
/// # Example
///
/// ```
/// use entrypoint::{AdapterConfig, ClapParser, OptionSpec, ParserAdapter, TypeHint};
/// use serde_json::json;
///
/// let config = AdapterConfig {
///     name: "demo".to_string(),
///     ..AdapterConfig::default()
/// };
/// let mut parser = ClapParser::from_config(&config).unwrap();
/// let spec = OptionSpec::new().value_type(TypeHint::Int);
/// let bound = parser.add_option("first_value", &spec, &OptionSpec::new()).unwrap();
/// assert_eq!(bound, "first_value");
///
/// let parsed = parser.parse(Some(vec!["--first-value".into(), "3".into()])).unwrap();
/// assert_eq!(parsed["first_value"], json!(3));
/// ```
#[derive(Clone, Debug)]
pub struct ClapParser {
    name: String,
    description: String,
    epilog: Option<String>,
    args: Vec<Arg>,
    bound: Vec<BoundArg>,
    last_positional: Option<PositionalShape>,
    shorts: HashSet<char>,
    longs: HashSet<String>,
}

impl ClapParser {
    /// The clap command as currently configured
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .bin_name(self.name.clone())
            .no_binary_name(true)
            .disable_version_flag(true);
        command = if self.description.is_empty() {
            command.help_template(HELP_TEMPLATE_NO_ABOUT)
        } else {
            command
                .help_template(HELP_TEMPLATE)
                .about(self.description.clone())
        };
        if let Some(epilog) = &self.epilog {
            command = command.after_help(epilog.clone());
        }
        command.args(self.args.iter().cloned())
    }

    fn claim_id(&self, id: &str) -> SetupResult<()> {
        if id.is_empty() {
            return Err(SetupError::conflict("empty destination name"));
        }
        if id == "help" || self.bound.iter().any(|b| b.id == id) {
            return Err(SetupError::conflict(format!(
                "destination `{}` is already bound",
                id
            )));
        }
        Ok(())
    }

    fn usage_line(&self) -> String {
        let rendered = self.command().render_usage().to_string();
        let usage = rendered.trim();
        let usage = usage
            .strip_prefix("Usage:")
            .or_else(|| usage.strip_prefix("usage:"))
            .unwrap_or(usage)
            .trim_start();
        format!("usage: {}", usage)
    }

    fn exit_from(&self, err: clap::Error) -> ParseExit {
        let rendered = err.render().to_string();
        if !err.use_stderr() {
            return ParseExit {
                code: err.exit_code(),
                stream: Stream::Stdout,
                message: rendered,
            };
        }
        ParseExit {
            code: err.exit_code(),
            stream: Stream::Stderr,
            message: format!(
                "{}\n{}: error: {}\n",
                self.usage_line(),
                self.name,
                summarize(&rendered)
            ),
        }
    }

    fn internal_exit(&self, message: impl std::fmt::Display) -> ParseExit {
        ParseExit {
            code: INTERNAL_ERROR,
            stream: Stream::Stderr,
            message: format!("{}: internal error: {}\n", self.name, message),
        }
    }

    fn extract(&self, matches: &ArgMatches, bound: &BoundArg) -> Result<Option<Value>, ParseExit> {
        if matches.value_source(&bound.id) != Some(ValueSource::CommandLine) {
            return Ok(match &bound.default {
                Some(DefaultValue::Suppress) => None,
                Some(DefaultValue::Value(value)) => Some(value.clone()),
                None => Some(match bound.action {
                    Action::StoreTrue => Value::Bool(false),
                    Action::StoreFalse => Value::Bool(true),
                    Action::Count => Value::from(0u8),
                    _ if bound.multiple => Value::Array(Vec::new()),
                    _ => Value::Null,
                }),
            });
        }

        let value = match bound.action {
            Action::StoreTrue | Action::StoreFalse => matches
                .try_get_one::<bool>(&bound.id)
                .map_err(|e| self.internal_exit(e))?
                .map(|flag| Value::Bool(*flag))
                .unwrap_or(Value::Null),
            Action::Count => matches
                .try_get_one::<u8>(&bound.id)
                .map_err(|e| self.internal_exit(e))?
                .map(|count| Value::from(*count))
                .unwrap_or(Value::Null),
            Action::Store | Action::Append => {
                let values: Vec<Value> = matches
                    .try_get_many::<Value>(&bound.id)
                    .map_err(|e| self.internal_exit(e))?
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                if bound.multiple {
                    Value::Array(values)
                } else {
                    values.into_iter().next().unwrap_or(Value::Null)
                }
            }
        };
        Ok(Some(value))
    }
}

impl ParserAdapter for ClapParser {
    fn from_config(config: &AdapterConfig) -> SetupResult<Self> {
        let epilog = match config.extra.get("epilog") {
            None => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                return Err(SetupError::config(format!(
                    "`epilog` must be a string, got {}",
                    other
                )));
            }
        };

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            epilog,
            args: Vec::new(),
            bound: Vec::new(),
            last_positional: None,
            // -h/--help belong to clap
            shorts: HashSet::from(['h']),
            longs: HashSet::from(["help".to_string()]),
        })
    }

    fn config_keys() -> &'static [&'static str] {
        &["epilog"]
    }

    fn add_option(
        &mut self,
        name: &str,
        decorator_spec: &OptionSpec,
        param_spec: &OptionSpec,
    ) -> SetupResult<String> {
        let spec = param_spec.overlay(decorator_spec);
        let id = spec.dest.clone().unwrap_or_else(|| name.to_string());
        self.claim_id(&id)?;

        let short = match name.chars().next() {
            Some(c) if c != '-' => c,
            _ => {
                return Err(SetupError::spec(
                    name,
                    "option names must start with a character usable as a short flag",
                ));
            }
        };
        let long = name.replace('_', "-");
        if self.shorts.contains(&short) {
            return Err(SetupError::conflict(format!(
                "option string -{} for `{}` is already in use",
                short, name
            )));
        }
        if self.longs.contains(&long) {
            return Err(SetupError::conflict(format!(
                "option string --{} for `{}` is already in use",
                long, name
            )));
        }

        let action = spec.action.unwrap_or(Action::Store);
        let mut arg = Arg::new(id.clone()).short(short).long(long.clone());
        if let Some(help) = &spec.help {
            arg = arg.help(help.clone());
        }

        let multiple = match action {
            Action::StoreTrue => {
                arg = arg.action(ArgAction::SetTrue).overrides_with(id.clone());
                false
            }
            Action::StoreFalse => {
                arg = arg.action(ArgAction::SetFalse).overrides_with(id.clone());
                false
            }
            Action::Count => {
                arg = arg.action(ArgAction::Count);
                false
            }
            Action::Store | Action::Append => {
                let hint = spec.value_type.unwrap_or(TypeHint::Str);
                // a repeated single-valued option keeps its last value
                let clap_action = if action == Action::Append {
                    ArgAction::Append
                } else {
                    arg = arg.overrides_with(id.clone());
                    ArgAction::Set
                };
                arg = arg
                    .action(clap_action)
                    .value_parser(CoerceValue::new(hint))
                    .value_name(spec.metavar.clone().unwrap_or_else(|| id.to_uppercase()))
                    .required(spec.required.unwrap_or(spec.default.is_none()));
                if let Some(nargs) = spec.nargs {
                    arg = arg.num_args(value_range(nargs));
                }
                action == Action::Append || spec.nargs.is_some_and(|n| n.is_multiple())
            }
        };

        debug!(option = %id, short = %short, long = %long, ?action, "added option");
        self.shorts.insert(short);
        self.longs.insert(long);
        self.args.push(arg);
        self.bound.push(BoundArg {
            id: id.clone(),
            action,
            multiple,
            default: spec.default,
        });
        Ok(id)
    }

    fn add_argument(
        &mut self,
        name: &str,
        decorator_spec: &OptionSpec,
        param_spec: &OptionSpec,
    ) -> SetupResult<String> {
        let mut spec = param_spec.overlay(decorator_spec);
        if spec.action.is_some_and(|a| a.is_flag()) {
            return Err(SetupError::spec(
                name,
                "positional arguments must take a value",
            ));
        }
        // A default makes a positional optional unless an arity was given.
        if spec.nargs.is_none() && spec.default.is_some() {
            spec.nargs = Some(Nargs::Optional);
        }

        let id = spec.dest.clone().unwrap_or_else(|| name.to_string());
        self.claim_id(&id)?;

        let required = spec
            .required
            .unwrap_or(!spec.nargs.is_some_and(|n| n.allows_none()));
        let unbounded = spec.nargs.is_some_and(|n| n.is_unbounded());

        if let Some(previous) = &self.last_positional {
            if previous.unbounded {
                return Err(SetupError::conflict(format!(
                    "positional `{}` cannot follow variable-length positional `{}`",
                    id, previous.id
                )));
            }
            if previous.optional && required {
                return Err(SetupError::conflict(format!(
                    "required positional `{}` cannot follow optional positional `{}`",
                    id, previous.id
                )));
            }
        }

        let mut arg = Arg::new(id.clone())
            .action(ArgAction::Set)
            .value_parser(CoerceValue::new(spec.value_type.unwrap_or(TypeHint::Str)))
            .value_name(spec.metavar.clone().unwrap_or_else(|| name.to_string()))
            .required(required);
        // Absence is expressed through `required`; clap positionals always
        // consume at least one value when present.
        arg = match spec.nargs {
            None | Some(Nargs::Optional) => arg.num_args(1),
            Some(Nargs::Exactly(count)) => arg.num_args(count),
            Some(Nargs::ZeroOrMore) | Some(Nargs::OneOrMore) => arg.num_args(1..),
        };
        if let Some(help) = &spec.help {
            arg = arg.help(help.clone());
        }

        debug!(argument = %id, required, unbounded, "added positional argument");
        self.last_positional = Some(PositionalShape {
            id: id.clone(),
            optional: !required,
            unbounded,
        });
        self.args.push(arg);
        self.bound.push(BoundArg {
            id: id.clone(),
            action: Action::Store,
            multiple: spec.nargs.is_some_and(|n| n.is_multiple()),
            default: spec.default,
        });
        Ok(id)
    }

    fn parse(&self, tokens: Option<Vec<String>>) -> Result<ParsedArgs, ParseExit> {
        let command = self.command();
        let matches = match tokens {
            Some(tokens) => command.try_get_matches_from(tokens),
            None => command.try_get_matches_from(std::env::args_os().skip(1)),
        }
        .map_err(|e| self.exit_from(e))?;

        let mut parsed = ParsedArgs::new();
        for bound in &self.bound {
            if let Some(value) = self.extract(&matches, bound)? {
                parsed.insert(bound.id.clone(), value);
            }
        }
        Ok(parsed)
    }
}

fn value_range(nargs: Nargs) -> ValueRange {
    match nargs {
        Nargs::Exactly(count) => ValueRange::new(count),
        Nargs::Optional => ValueRange::new(0..=1),
        Nargs::ZeroOrMore => ValueRange::new(0..),
        Nargs::OneOrMore => ValueRange::new(1..),
    }
}

/// Reduce a rendered clap error to its message, without the `error:`
/// prefix, the usage block and the trailing hint.
fn summarize(rendered: &str) -> String {
    let lines: Vec<&str> = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:"))
        .filter(|line| !line.is_empty() && !line.starts_with("tip:"))
        .collect();
    let joined = lines.join(" ");
    joined
        .strip_prefix("error:")
        .map(str::trim_start)
        .unwrap_or(&joined)
        .to_string()
}
