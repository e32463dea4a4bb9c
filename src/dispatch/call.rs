//! The reconstructed call handed to a wrapped function.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Arguments for one call, split the way a signature splits them.
///
/// `keywords` holds keyword-only parameters; `captured` holds whatever the
/// variadic keyword parameter collected. The two never share a name.
///
/// # Example
///
/// ```
/// use entrypoint::CallArgs;
/// use serde_json::json;
///
/// let args = CallArgs {
///     positional: vec![json!("first"), json!(1), json!(2)],
///     ..CallArgs::default()
/// };
/// let first: String = args.arg(0).unwrap();
/// let rest: Vec<i64> = args.rest(1).unwrap();
/// assert_eq!(first, "first");
/// assert_eq!(rest, vec![1, 2]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    /// Plain parameters followed by the variadic positional values
    pub positional: Vec<Value>,
    /// Keyword-only parameters
    pub keywords: BTreeMap<String, Value>,
    /// Values routed into the variadic keyword parameter
    pub captured: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Deserialize the positional value at `index`
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self
            .positional
            .get(index)
            .ok_or_else(|| anyhow!("missing positional argument {}", index))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("positional argument {} has the wrong type", index))
    }

    /// Deserialize every positional value from `from` onwards
    pub fn rest<T: DeserializeOwned>(&self, from: usize) -> Result<Vec<T>> {
        self.positional
            .iter()
            .enumerate()
            .skip(from)
            .map(|(index, value)| {
                serde_json::from_value(value.clone())
                    .with_context(|| format!("positional argument {} has the wrong type", index))
            })
            .collect()
    }

    /// Deserialize a keyword-only value, falling back to captured values
    pub fn keyword<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .keywords
            .get(name)
            .or_else(|| self.captured.get(name))
            .ok_or_else(|| anyhow!("missing keyword argument `{}`", name))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("keyword argument `{}` has the wrong type", name))
    }

    /// Keyword-only and captured values together
    pub fn all_keywords(&self) -> BTreeMap<String, Value> {
        let mut all = self.keywords.clone();
        all.extend(self.captured.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors() {
        let mut args = CallArgs {
            positional: vec![json!(1), json!(2)],
            ..CallArgs::default()
        };
        args.keywords.insert("x".to_string(), json!("y"));
        args.captured.insert("spam".to_string(), json!("lovely"));

        assert_eq!(args.arg::<i64>(1).unwrap(), 2);
        assert_eq!(args.keyword::<String>("x").unwrap(), "y");
        assert_eq!(args.keyword::<String>("spam").unwrap(), "lovely");
        assert_eq!(args.all_keywords().len(), 2);
    }

    #[test]
    fn test_missing_and_mistyped() {
        let args = CallArgs {
            positional: vec![json!("text")],
            ..CallArgs::default()
        };
        assert!(args.arg::<String>(3).is_err());
        assert!(args.arg::<i64>(0).is_err());
        assert!(args.keyword::<String>("nope").is_err());
        assert!(args.rest::<String>(1).unwrap().is_empty());
    }
}
