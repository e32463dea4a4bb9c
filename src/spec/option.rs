//! Option descriptions handed to parser adapters.

use crate::error::{SetupError, SetupResult};
use crate::signature::TypeHint;
use serde_json::{Map, Value};

/// Number of command-line values one element consumes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly `n` values, collected into a sequence
    Exactly(usize),
    /// `?`: zero or one value
    Optional,
    /// `*`: any number of values
    ZeroOrMore,
    /// `+`: at least one value
    OneOrMore,
}

impl Nargs {
    /// Whether the parsed value is a sequence rather than a single value
    pub fn is_multiple(&self) -> bool {
        !matches!(self, Self::Optional)
    }

    /// Whether the element may consume no values at all
    pub fn allows_none(&self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    /// Whether there is no upper bound on consumed values
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    fn from_value(name: &str, value: &Value) -> SetupResult<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "?" => Ok(Self::Optional),
                "*" => Ok(Self::ZeroOrMore),
                "+" => Ok(Self::OneOrMore),
                other => Err(SetupError::spec(name, format!("invalid nargs `{}`", other))),
            },
            Value::Number(n) => match n.as_u64() {
                Some(count) if count > 0 => Ok(Self::Exactly(count as usize)),
                _ => Err(SetupError::spec(name, format!("invalid nargs `{}`", n))),
            },
            other => Err(SetupError::spec(name, format!("invalid nargs `{}`", other))),
        }
    }
}

/// What a command-line element does when it is seen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Store the given value(s)
    Store,
    /// Flag that stores `true`
    StoreTrue,
    /// Flag that stores `false`
    StoreFalse,
    /// Collect every occurrence into a sequence
    Append,
    /// Count occurrences
    Count,
}

impl Action {
    /// Whether the element takes no value on the command line
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::StoreTrue | Self::StoreFalse | Self::Count)
    }

    /// Parse the spelling used in declarations
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "store" => Some(Self::Store),
            "store_true" => Some(Self::StoreTrue),
            "store_false" => Some(Self::StoreFalse),
            "append" => Some(Self::Append),
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

/// Value used when an element is not given on the command line
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    /// Use this value
    Value(Value),
    /// Leave the key out of the parsed mapping entirely
    Suppress,
}

/// Description of one command-line element.
///
/// Every field is optional so that two specs can be overlaid: the
/// declared spec on top of the one derived from the function signature.
///
/// # Example
///
/// ```
/// use entrypoint::{Nargs, OptionSpec, TypeHint};
///
/// let derived = OptionSpec::new().default("also default").value_type(TypeHint::Str);
/// let declared = OptionSpec::new().default("overridden").nargs(Nargs::Optional);
///
/// let merged = derived.overlay(&declared);
/// assert_eq!(merged.default_value(), Some(&serde_json::json!("overridden")));
/// assert_eq!(merged.value_type, Some(TypeHint::Str));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionSpec {
    /// Help text
    pub help: Option<String>,
    /// Fallback when not given
    pub default: Option<DefaultValue>,
    /// Coercion applied to each token
    pub value_type: Option<TypeHint>,
    /// Arity
    pub nargs: Option<Nargs>,
    /// Behaviour when seen
    pub action: Option<Action>,
    /// Key in the parsed mapping, if different from the element name
    pub dest: Option<String>,
    /// Whether the element must be given
    pub required: Option<bool>,
    /// Placeholder shown in usage
    pub metavar: Option<String>,
}

const KNOWN_KEYS: &[&str] = &[
    "help", "default", "suppress", "type", "nargs", "action", "dest", "required", "metavar",
];

impl OptionSpec {
    /// Empty spec
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Set the help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set a default value
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Leave the key out of the parsed mapping when not given
    pub fn suppress_default(mut self) -> Self {
        self.default = Some(DefaultValue::Suppress);
        self
    }

    /// Set the coercion
    pub fn value_type(mut self, hint: TypeHint) -> Self {
        self.value_type = Some(hint);
        self
    }

    /// Set the arity
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    /// Set the action
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Override the key in the parsed mapping
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Mark as required or optional explicitly
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Set the usage placeholder
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    /// The concrete default value, if one is set and not suppressed
    pub fn default_value(&self) -> Option<&Value> {
        match &self.default {
            Some(DefaultValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Fields set in `over` replace the ones in `self`
    pub fn overlay(&self, over: &OptionSpec) -> OptionSpec {
        OptionSpec {
            help: over.help.clone().or_else(|| self.help.clone()),
            default: over.default.clone().or_else(|| self.default.clone()),
            value_type: over.value_type.or(self.value_type),
            nargs: over.nargs.or(self.nargs),
            action: over.action.or(self.action),
            dest: over.dest.clone().or_else(|| self.dest.clone()),
            required: over.required.or(self.required),
            metavar: over.metavar.clone().or_else(|| self.metavar.clone()),
        }
    }

    /// Build from an options mapping as found in a declarations file
    pub fn from_map(name: &str, map: &Map<String, Value>) -> SetupResult<Self> {
        if let Some(unknown) = map.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(SetupError::spec(name, format!("unknown option key `{}`", unknown)));
        }

        let string = |key: &str| -> SetupResult<Option<String>> {
            match map.get(key) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(SetupError::spec(
                    name,
                    format!("`{}` must be a string, got {}", key, other),
                )),
            }
        };
        let boolean = |key: &str| -> SetupResult<Option<bool>> {
            match map.get(key) {
                None => Ok(None),
                Some(Value::Bool(b)) => Ok(Some(*b)),
                Some(other) => Err(SetupError::spec(
                    name,
                    format!("`{}` must be a boolean, got {}", key, other),
                )),
            }
        };

        let value_type = match string("type")? {
            None => None,
            Some(type_name) => Some(TypeHint::from_name(&type_name).ok_or_else(|| {
                SetupError::spec(name, format!("unknown type `{}`", type_name))
            })?),
        };
        let action = match string("action")? {
            None => None,
            Some(action_name) => Some(Action::from_name(&action_name).ok_or_else(|| {
                SetupError::spec(name, format!("unknown action `{}`", action_name))
            })?),
        };
        let nargs = map.get("nargs").map(|v| Nargs::from_value(name, v)).transpose()?;

        let default = match (boolean("suppress")?, map.get("default")) {
            (Some(true), Some(_)) => {
                return Err(SetupError::spec(
                    name,
                    "`suppress` and `default` are mutually exclusive",
                ));
            }
            (Some(true), None) => Some(DefaultValue::Suppress),
            (_, Some(value)) => Some(DefaultValue::Value(value.clone())),
            (_, None) => None,
        };

        Ok(Self {
            help: string("help")?,
            default,
            value_type,
            nargs,
            action,
            dest: string("dest")?,
            required: boolean("required")?,
            metavar: string("metavar")?,
        })
    }
}
