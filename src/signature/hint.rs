//! Type hints used to coerce raw command-line tokens into values.

use serde_json::{Number, Value};
use std::fmt;

/// Coercion applied to each raw token before it reaches the parsed mapping.
///
/// A hint can come from the function's own parameter annotation or from the
/// declared spec's `type` key; the declared one wins.
///
/// # Example
///
/// ```
/// use entrypoint::TypeHint;
/// use serde_json::json;
///
/// assert_eq!(TypeHint::Int.coerce("42").unwrap(), json!(42));
/// assert!(TypeHint::Int.coerce("forty-two").is_err());
/// assert_eq!(TypeHint::from_name("float"), Some(TypeHint::Float));
/// ```
#[derive(Clone, Copy, Debug)]
pub enum TypeHint {
    /// Keep the token as a string
    Str,
    /// Signed 64-bit integer
    Int,
    /// Finite floating point number
    Float,
    /// `true`/`false`, `yes`/`no`, `1`/`0`
    Bool,
    /// Caller-supplied coercion
    Custom {
        /// Name shown in error messages
        name: &'static str,
        /// Coercion function; the error string becomes the usage error
        parse: fn(&str) -> Result<Value, String>,
    },
}

impl TypeHint {
    /// Look up a built-in hint by the name used in declarations files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" | "string" => Some(Self::Str),
            "int" | "integer" => Some(Self::Int),
            "float" | "number" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Short name of this hint
    pub fn name(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Custom { name, .. } => *name,
        }
    }

    /// Convert one raw token
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        let invalid = || format!("invalid {} value: '{}'", self.name(), raw);
        match self {
            Self::Str => Ok(Value::String(raw.to_string())),
            Self::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid()),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid),
            Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            Self::Custom { parse, .. } => parse(raw),
        }
    }
}

impl PartialEq for TypeHint {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_coercions() {
        assert_eq!(TypeHint::Str.coerce("4").unwrap(), json!("4"));
        assert_eq!(TypeHint::Int.coerce("-7").unwrap(), json!(-7));
        assert_eq!(TypeHint::Float.coerce("2.5").unwrap(), json!(2.5));
        assert_eq!(TypeHint::Bool.coerce("Yes").unwrap(), json!(true));
        assert_eq!(TypeHint::Bool.coerce("0").unwrap(), json!(false));
    }

    #[test]
    fn test_invalid_values_name_the_hint() {
        let err = TypeHint::Int.coerce("abc").unwrap_err();
        assert_eq!(err, "invalid int value: 'abc'");
        assert!(TypeHint::Float.coerce("NaN").is_err());
        assert!(TypeHint::Bool.coerce("maybe").is_err());
    }

    #[test]
    fn test_custom_hint() {
        fn upper(raw: &str) -> Result<Value, String> {
            Ok(Value::String(raw.to_uppercase()))
        }
        let hint = TypeHint::Custom {
            name: "upper",
            parse: upper,
        };
        assert_eq!(hint.coerce("abc").unwrap(), json!("ABC"));
        assert_eq!(hint.to_string(), "upper");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TypeHint::from_name("integer"), Some(TypeHint::Int));
        assert_eq!(TypeHint::from_name("string"), Some(TypeHint::Str));
        assert_eq!(TypeHint::from_name("complex"), None);
    }
}
