//! Merge a declared spec with what the function signature already says.

use super::{DefaultValue, Nargs, OptionSpec, ParamSpec};
use crate::dispatch::DispatchTable;
use crate::error::{SetupError, SetupResult};
use crate::parser::ParserAdapter;
use crate::signature::{ParameterKind, Signature};
use tracing::debug;

/// Which parser method an element went through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// `add_argument`
    Positional,
    /// `add_option`
    Option,
}

/// Result of merging one declared spec
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Element name with any leading underscore removed
    pub name: String,
    /// Key the parser fills in the parsed mapping
    pub bound: String,
    /// How the element was added
    pub kind: ElementKind,
}

/// Merge `spec` for the declared `key` into `parser` and record in `table`
/// where the resulting value goes.
///
/// A leading underscore on `key` asks for a named option rather than a
/// positional argument. Parameters the signature does not have, and the
/// variadic keyword parameter, always become options.
pub fn merge<P: ParserAdapter>(
    signature: &Signature,
    table: &mut DispatchTable,
    parser: &mut P,
    key: &str,
    spec: &ParamSpec,
) -> SetupResult<Binding> {
    let (name, mut as_option) = match key.strip_prefix('_') {
        Some("") => return Err(SetupError::spec(key, "a lone underscore names nothing")),
        Some(rest) => (rest, true),
        None => (key, false),
    };
    if name.is_empty() {
        return Err(SetupError::spec(key, "empty parameter name"));
    }

    let mut derived = OptionSpec::new();
    match signature.get(name) {
        None => as_option = true,
        Some(param) => {
            if param.kind == ParameterKind::VarKeyword {
                as_option = true;
            }
            if let Some(default) = &param.default {
                derived = derived.default(default.clone());
            }
            if let Some(hint) = param.annotation {
                derived = derived.value_type(hint);
            }
            if param.kind == ParameterKind::VarPositional {
                derived = derived.nargs(Nargs::ZeroOrMore);
            }
        }
    }

    let declared = spec.to_options();
    let (bound, kind) = if as_option {
        (
            parser.add_option(name, &declared, &derived)?,
            ElementKind::Option,
        )
    } else {
        (
            parser.add_argument(name, &declared, &derived)?,
            ElementKind::Positional,
        )
    };
    table.guarantee(&bound)?;

    // a missing key can only be tolerated by the variadic keyword mapping
    let suppressed = derived.overlay(&declared).default == Some(DefaultValue::Suppress);
    if suppressed && !table.captured_names().is_some_and(|c| c.contains(&bound)) {
        return Err(SetupError::spec(
            key,
            "suppressed default only allowed for captured names",
        ));
    }

    debug!(key, name, bound = %bound, ?kind, "merged parameter spec");
    Ok(Binding {
        name: name.to_string(),
        bound,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AdapterConfig, ParseExit, ParsedArgs};
    use crate::signature::{Param, TypeHint};
    use serde_json::json;

    /// Adapter that only records what it was asked to add
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(ElementKind, String, OptionSpec)>,
    }

    impl ParserAdapter for Recorder {
        fn from_config(_config: &AdapterConfig) -> SetupResult<Self> {
            Ok(Self::default())
        }

        fn add_option(
            &mut self,
            name: &str,
            decorator_spec: &OptionSpec,
            param_spec: &OptionSpec,
        ) -> SetupResult<String> {
            let merged = param_spec.overlay(decorator_spec);
            let bound = merged.dest.clone().unwrap_or_else(|| name.to_string());
            self.calls.push((ElementKind::Option, name.to_string(), merged));
            Ok(bound)
        }

        fn add_argument(
            &mut self,
            name: &str,
            decorator_spec: &OptionSpec,
            param_spec: &OptionSpec,
        ) -> SetupResult<String> {
            self.calls.push((
                ElementKind::Positional,
                name.to_string(),
                param_spec.overlay(decorator_spec),
            ));
            Ok(name.to_string())
        }

        fn parse(&self, _tokens: Option<Vec<String>>) -> Result<ParsedArgs, ParseExit> {
            Ok(ParsedArgs::new())
        }
    }

    fn setup(params: Vec<Param>) -> (Signature, DispatchTable, Recorder) {
        let signature = Signature::new(params).unwrap();
        let table = DispatchTable::new(&signature);
        (signature, table, Recorder::default())
    }

    #[test]
    fn test_underscore_selects_option() {
        let (sig, mut table, mut parser) = setup(vec![Param::plain("first"), Param::plain("second")]);
        let first = merge(&sig, &mut table, &mut parser, "_first", &"help".into()).unwrap();
        let second = merge(&sig, &mut table, &mut parser, "second", &"help".into()).unwrap();

        assert_eq!(first.kind, ElementKind::Option);
        assert_eq!(first.name, "first");
        assert_eq!(second.kind, ElementKind::Positional);
        table.validate().unwrap();
    }

    #[test]
    fn test_signature_default_and_hint_propagate() {
        let (sig, mut table, mut parser) = setup(vec![
            Param::plain("second").with_default("default"),
            Param::plain("third").with_default("also default").annotated(TypeHint::Str),
        ]);
        merge(&sig, &mut table, &mut parser, "second", &"help".into()).unwrap();
        merge(
            &sig,
            &mut table,
            &mut parser,
            "third",
            &OptionSpec::new().default("overridden").into(),
        )
        .unwrap();

        let (_, _, second) = &parser.calls[0];
        assert_eq!(second.default_value(), Some(&json!("default")));
        let (_, _, third) = &parser.calls[1];
        assert_eq!(third.default_value(), Some(&json!("overridden")));
        assert_eq!(third.value_type, Some(TypeHint::Str));
    }

    #[test]
    fn test_var_keyword_and_unknown_names_become_options() {
        let (sig, mut table, mut parser) =
            setup(vec![Param::plain("a").with_default(1), Param::var_keyword("kwargs")]);
        let spam = merge(&sig, &mut table, &mut parser, "spam", &"help".into()).unwrap();
        let kwargs = merge(&sig, &mut table, &mut parser, "kwargs", &"help".into()).unwrap();
        assert_eq!(spam.kind, ElementKind::Option);
        assert_eq!(kwargs.kind, ElementKind::Option);
        assert!(table.captured_names().unwrap().contains("spam"));
    }

    #[test]
    fn test_unknown_name_without_capture_fails() {
        let (sig, mut table, mut parser) = setup(vec![Param::plain("a")]);
        assert!(matches!(
            merge(&sig, &mut table, &mut parser, "ghost", &"help".into()),
            Err(SetupError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_var_positional_gets_sequence_arity() {
        let (sig, mut table, mut parser) = setup(vec![Param::var_positional("args")]);
        merge(&sig, &mut table, &mut parser, "args", &"values".into()).unwrap();
        let (_, _, spec) = &parser.calls[0];
        assert_eq!(spec.nargs, Some(Nargs::ZeroOrMore));

        let (sig, mut table, mut parser) = setup(vec![Param::var_positional("args")]);
        merge(
            &sig,
            &mut table,
            &mut parser,
            "args",
            &OptionSpec::new().nargs(Nargs::OneOrMore).into(),
        )
        .unwrap();
        let (_, _, spec) = &parser.calls[0];
        assert_eq!(spec.nargs, Some(Nargs::OneOrMore));
    }

    #[test]
    fn test_dest_is_what_gets_guaranteed() {
        let (sig, mut table, mut parser) = setup(vec![Param::plain("original_name").with_default(true)]);
        let binding = merge(
            &sig,
            &mut table,
            &mut parser,
            "_renamed_and_inverted",
            &OptionSpec::new().dest("original_name").into(),
        )
        .unwrap();
        assert_eq!(binding.name, "renamed_and_inverted");
        assert_eq!(binding.bound, "original_name");
        let call = table
            .dispatch(&[("original_name".to_string(), json!(false))].into_iter().collect())
            .unwrap();
        assert_eq!(call.positional, vec![json!(false)]);
    }

    #[test]
    fn test_suppressed_default_needs_captured_name() {
        let (sig, mut table, mut parser) =
            setup(vec![Param::keyword_only("level").with_default(3)]);
        let err = merge(
            &sig,
            &mut table,
            &mut parser,
            "_level",
            &OptionSpec::new()
                .value_type(TypeHint::Int)
                .suppress_default()
                .into(),
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::InvalidSpec { .. }));

        let (sig, mut table, mut parser) =
            setup(vec![Param::plain("a"), Param::var_keyword("kwargs")]);
        let binding = merge(
            &sig,
            &mut table,
            &mut parser,
            "_verbosity",
            &OptionSpec::new().suppress_default().into(),
        )
        .unwrap();
        assert!(table.captured_names().unwrap().contains(&binding.bound));
    }

    #[test]
    fn test_lone_underscore_rejected() {
        let (sig, mut table, mut parser) = setup(vec![Param::var_keyword("kwargs")]);
        assert!(matches!(
            merge(&sig, &mut table, &mut parser, "_", &"help".into()),
            Err(SetupError::InvalidSpec { .. })
        ));
        assert!(parser.calls.is_empty());
    }
}
