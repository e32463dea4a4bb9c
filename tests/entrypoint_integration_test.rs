//! End-to-end tests driving entry points through their command lines.

use entrypoint::demos::{self, Demos};
use entrypoint::{
    AdapterConfig, CallArgs, EntrypointBuilder, OptionSpec, Outcome, Param, ParseExit,
    ParsedArgs, ParserAdapter, Reporter, SetupError, SetupResult, TypeHint,
};
use serde_json::{json, Value};
use std::io::Write;

fn tokens(line: &str) -> Option<Vec<String>> {
    Some(line.split_whitespace().map(String::from).collect())
}

fn run(demos: &Demos, name: &str, line: &str) -> (i32, String, String) {
    let entrypoint = demos
        .get(name)
        .unwrap_or_else(|| panic!("no demo named {name}"));
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = entrypoint.invoke_to(tokens(line), &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_round_trip() {
    let demos = Demos::build().unwrap();
    let (code, out, err) = run(&demos, "example", "4 5 6");
    assert_eq!(code, 0);
    assert_eq!(out, "foo=4, bar=5, baz=6\n");
    assert!(err.is_empty());
}

#[test]
fn test_bad_command_lines() {
    let demos = Demos::build().unwrap();
    for line in ["", "1", "1 2", "1 2 3 4"] {
        let (code, out, err) = run(&demos, "example", line);
        assert_ne!(code, 0, "tokens {line:?}");
        assert!(out.is_empty());
        let lines: Vec<&str> = err.lines().collect();
        assert!(lines[0].starts_with("usage: example"), "got {err:?}");
        assert!(lines[1].starts_with("example: error:"), "got {err:?}");
    }
}

#[test]
fn test_help() {
    let demos = Demos::build().unwrap();
    for (name, description) in [
        ("example", "An example entry point for testing."),
        ("renamed", "An example with custom labels."),
    ] {
        for flag in ["-h", "--help"] {
            let (code, out, err) = run(&demos, name, flag);
            assert_eq!(code, 0);
            assert!(err.is_empty());
            let lines: Vec<&str> = out.lines().collect();
            assert!(lines[0].starts_with(&format!("usage: {name}")), "got {out:?}");
            assert_eq!(lines[1], "");
            assert_eq!(lines[2], description);
        }
    }
}

#[test]
fn test_declared_epilog_in_help() {
    let demos = Demos::build().unwrap();
    let (_, out, _) = run(&demos, "renamed", "--help");
    assert!(out.contains("Declared in demos.toml rather than in code."));
}

#[test]
fn test_empty_entrypoint_prints_nothing() {
    let demos = Demos::build().unwrap();
    assert_eq!(run(&demos, "empty", ""), (0, String::new(), String::new()));
    assert_eq!(demos.get("empty").unwrap().description(), "");
}

#[test]
fn test_defaults() {
    let demos = Demos::build().unwrap();
    let (code, out, _) = run(&demos, "defaults", "first");
    assert_eq!(code, 0);
    assert_eq!(out, "[\"first\",\"default\",\"overridden\"]\n");

    let (_, out, _) = run(&demos, "defaults", "first second third");
    assert_eq!(out, "[\"first\",\"second\",\"third\"]\n");
}

#[test]
fn test_positional_by_keyword_permutations() {
    let demos = Demos::build().unwrap();
    let mut seen = 0;
    for first in ["-f 1", "--first 1"] {
        for second in ["-s 2", "--second 2"] {
            for line in [format!("{first} {second}"), format!("{second} {first}")] {
                let (code, out, err) = run(&demos, "positional_by_keyword", &line);
                assert_eq!(code, 0, "tokens {line:?}: {err}");
                assert_eq!(out, "[1,2]\n");
                seen += 1;
            }
        }
    }
    assert_eq!(seen, 8);
}

#[test]
fn test_hard() {
    let demos = Demos::build().unwrap();
    let (code, out, err) = run(&demos, "hard", "first 1 2 3 -x y --spam=lovely");
    assert_eq!(code, 0, "{err}");
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value, json!(["first", [1, 2, 3], "y", {"spam": "lovely"}]));

    let (code, _, err) = run(&demos, "hard", "first 1 -x y --eggs=green --bacon=crispy");
    assert_eq!(code, 0, "{err}");

    // at least one extra value is required
    let (code, _, err) = run(&demos, "hard", "first -x y");
    assert_eq!(code, 2);
    assert!(err.starts_with("usage: hard"));
}

#[test]
fn test_inverse_flag() {
    let demos = Demos::build().unwrap();
    assert_eq!(run(&demos, "inverse_flag", "").1, "true\n");
    assert_eq!(run(&demos, "inverse_flag", "-r").1, "false\n");
    assert_eq!(run(&demos, "inverse_flag", "--renamed-and-inverted").1, "false\n");
}

#[test]
fn test_coercion_errors_are_usage_errors() {
    let demos = Demos::build().unwrap();
    assert_eq!(run(&demos, "variadic", "1 2 3").1, "6\n");
    assert_eq!(run(&demos, "variadic", "").1, "0\n");

    let (code, _, err) = run(&demos, "variadic", "1 two");
    assert_eq!(code, 2);
    assert!(err.contains("invalid int value: 'two'"), "got {err:?}");
}

#[test]
fn test_direct_call_equals_command_line() {
    let demos = Demos::build().unwrap();
    let (_, out, _) = run(&demos, "example", "a b c");
    assert_eq!(out.trim_end(), demos::example("a", "b", "c"));

    let (_, out, _) = run(&demos, "positional_by_keyword", "--second 2 -f 1");
    assert_eq!(
        serde_json::from_str::<Value>(&out).unwrap(),
        json!(demos::positional_by_keyword(1, 2))
    );
}

#[test]
fn test_unsupplied_parameter_fails_to_build() {
    let err = EntrypointBuilder::new(
        "incomplete",
        [Param::plain("a"), Param::plain("b"), Param::keyword_only("c")],
        |_: CallArgs| -> anyhow::Result<()> { Ok(()) },
    )
    .param("a", "supplied")
    .build()
    .unwrap_err();

    match err {
        SetupError::Unsupplied {
            positions,
            keywords,
        } => {
            assert_eq!(positions, vec![1]);
            assert_eq!(keywords, vec!["c".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_positional_only_rejected() {
    let err = EntrypointBuilder::new(
        "strict",
        [Param::positional_only("a")],
        |_: CallArgs| -> anyhow::Result<()> { Ok(()) },
    )
    .build()
    .unwrap_err();
    assert!(matches!(err, SetupError::InvalidParameterKind { .. }));
}

#[test]
fn test_suppressed_keyword_only_fails_to_build() {
    let err = EntrypointBuilder::new(
        "levels",
        [Param::keyword_only("level").with_default(3)],
        |args: CallArgs| -> anyhow::Result<i64> { args.keyword("level") },
    )
    .param(
        "_level",
        OptionSpec::new()
            .value_type(TypeHint::Int)
            .suppress_default(),
    )
    .build()
    .unwrap_err();
    assert!(matches!(err, SetupError::InvalidSpec { .. }));
}

#[test]
fn test_function_errors_exit_with_one() {
    let ep = EntrypointBuilder::new(
        "failing",
        [Param::plain("what")],
        |args: CallArgs| -> anyhow::Result<()> {
            anyhow::bail!("could not {}", args.arg::<String>(0)?)
        },
    )
    .param("what", "what to fail at")
    .build()
    .unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = ep.invoke_to(tokens("comply"), &mut out, &mut err);
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert_eq!(String::from_utf8(err).unwrap(), "failing: could not comply\n");
}

/// Adapter that ignores tokens and hands back the mapping it was
/// configured with
struct FixedParser {
    parsed: ParsedArgs,
}

impl ParserAdapter for FixedParser {
    fn from_config(config: &AdapterConfig) -> SetupResult<Self> {
        let parsed = match config.extra.get("parsed") {
            Some(Value::Object(map)) => map.clone().into_iter().collect(),
            Some(other) => return Err(SetupError::config(format!("bad mapping {other}"))),
            None => ParsedArgs::new(),
        };
        Ok(Self { parsed })
    }

    fn config_keys() -> &'static [&'static str] {
        &["parsed"]
    }

    fn add_option(&mut self, name: &str, d: &OptionSpec, p: &OptionSpec) -> SetupResult<String> {
        Ok(p.overlay(d).dest.unwrap_or_else(|| name.to_string()))
    }

    fn add_argument(&mut self, name: &str, d: &OptionSpec, p: &OptionSpec) -> SetupResult<String> {
        self.add_option(name, d, p)
    }

    fn parse(&self, _tokens: Option<Vec<String>>) -> Result<ParsedArgs, ParseExit> {
        Ok(self.parsed.clone())
    }
}

fn echo_builder() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "echo",
        [Param::plain("text"), Param::var_keyword("kwargs")],
        |args: CallArgs| -> anyhow::Result<Value> {
            Ok(json!({"text": args.arg::<String>(0)?, "extra": args.captured}))
        },
    )
    .param("text", "what to echo")
    .param("_loud", "an option only the captured mapping sees")
}

#[test]
fn test_custom_parser_adapter() {
    let ep = echo_builder()
        .with_parser::<FixedParser>()
        .config("parsed", json!({"text": "hacked result", "loud": true}))
        .build()
        .unwrap();

    let outcome = ep.run(None);
    assert_eq!(
        outcome.value(),
        Some(&json!({"text": "hacked result", "extra": {"loud": true}}))
    );

    // the default adapter does not know the key
    let err = echo_builder()
        .config("parsed", json!({}))
        .build()
        .unwrap_err();
    assert!(matches!(err, SetupError::UnknownConfigKey(_)));
}

#[test]
fn test_broken_contract_is_internal_error() {
    let ep = echo_builder()
        .with_parser::<FixedParser>()
        .config("parsed", json!({"loud": false}))
        .build()
        .unwrap();

    assert!(matches!(ep.run(None), Outcome::Broken(_)));

    let mut out = Vec::new();
    let mut err = Vec::new();
    assert_eq!(ep.invoke_to(None, &mut out, &mut err), 70);
    assert!(String::from_utf8(err)
        .unwrap()
        .starts_with("echo: internal error:"));
}

/// Reporter printing results as pretty JSON and hiding failures
struct PrettyReporter;

impl Reporter for PrettyReporter {
    fn report(
        &self,
        _name: &str,
        outcome: &Outcome,
        out: &mut dyn Write,
        _err: &mut dyn Write,
    ) -> std::io::Result<i32> {
        if let Some(value) = outcome.value() {
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        }
        Ok(outcome.exit_code())
    }
}

#[test]
fn test_replacing_the_reporter() {
    let ep = EntrypointBuilder::new(
        "pair",
        [Param::plain("a"), Param::plain("b")],
        |args: CallArgs| -> anyhow::Result<Vec<String>> { args.rest(0) },
    )
    .param("a", "first")
    .param("b", "second")
    .reporter(PrettyReporter)
    .build()
    .unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    assert_eq!(ep.invoke_to(tokens("x y"), &mut out, &mut err), 0);
    assert_eq!(String::from_utf8(out).unwrap(), "[\n  \"x\",\n  \"y\"\n]\n");
}
