//! Bundled demo entry points.
//!
//! Each demo is an ordinary function plus the declaration that exposes it on
//! the command line, so it can be called directly or through its entry
//! point with the same result. `entrypoint-demo` runs them by name.

use crate::config::EntrypointsFile;
use crate::dispatch::CallArgs;
use crate::entrypoint::{Entrypoint, EntrypointBuilder, NameStyle, Registry};
use crate::error::{SetupError, SetupResult};
use crate::manifest::{update_manifest, DEFAULT_TABLE};
use crate::signature::{Param, TypeHint};
use crate::spec::{Action, Nargs, OptionSpec};
use anyhow::Result;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

const DECLARATIONS: &str = include_str!("demos.toml");

const MODULE: &str = module_path!();

/// Returns its arguments formatted into a string
pub fn example(foo: &str, bar: &str, baz: &str) -> String {
    format!("foo={}, bar={}, baz={}", foo, bar, baz)
}

/// Arguments named like builder settings
pub fn tricky(_description: &str, _name: &str) {}

/// Every parameter kind at once
pub fn hard(
    first: String,
    args: Vec<i64>,
    x: String,
    kwargs: Map<String, Value>,
) -> (String, Vec<i64>, String, Map<String, Value>) {
    (first, args, x, kwargs)
}

/// Optional positionals with signature and declared defaults
pub fn defaults(first: &str, second: Option<&str>, third: Option<&str>) -> (String, String, String) {
    (
        first.to_string(),
        second.unwrap_or("default").to_string(),
        third.unwrap_or("also default").to_string(),
    )
}

/// Plain parameters supplied through named options
pub fn positional_by_keyword(first: i64, second: i64) -> (i64, i64) {
    (first, second)
}

/// Echoes a flag stored under a different name than it is spelled
pub fn inverse_flag(original_name: bool) -> bool {
    original_name
}

/// Sum of any number of integers
pub fn variadic(args: &[i64]) -> i64 {
    args.iter().sum()
}

/// Write `registry` into the scripts table of the manifest at `manifest`
pub fn update_metadata(manifest: &Path, table: &str, registry: &Registry) -> Result<String> {
    update_manifest(manifest, table, registry)?;
    Ok(format!(
        "wrote {} entry points to `{}` in {}",
        registry.len(),
        table,
        manifest.display()
    ))
}

fn empty_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new("empty", [], |_: CallArgs| -> Result<()> { Ok(()) })
}

fn example_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "example",
        [Param::plain("foo"), Param::plain("bar"), Param::plain("baz")],
        |args: CallArgs| -> Result<String> {
            Ok(example(
                &args.arg::<String>(0)?,
                &args.arg::<String>(1)?,
                &args.arg::<String>(2)?,
            ))
        },
    )
    .doc(
        "An example entry point for testing.\n\n\
         Everything after the first line is ignored.",
    )
    .param("foo", "the value for foo")
    .param("bar", "the value for bar")
    .param("baz", "the value for baz")
}

fn to_rename_entrypoint(declarations: &EntrypointsFile) -> SetupResult<EntrypointBuilder> {
    let section = declarations
        .section("to_rename")
        .ok_or_else(|| SetupError::config("no declarations for `to_rename`"))?;
    EntrypointBuilder::new(
        "to_rename",
        [Param::plain("foo"), Param::plain("bar"), Param::plain("baz")],
        |args: CallArgs| -> Result<String> {
            Ok(example(
                &args.arg::<String>(0)?,
                &args.arg::<String>(1)?,
                &args.arg::<String>(2)?,
            ))
        },
    )
    .doc("This text should be replaced explicitly.")
    .apply(section)
}

fn tricky_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "tricky",
        [Param::plain("description"), Param::plain("name")],
        |args: CallArgs| -> Result<()> {
            tricky(&args.arg::<String>(0)?, &args.arg::<String>(1)?);
            Ok(())
        },
    )
    .doc("Parameters may share their names with builder settings.")
    .description("")
    .param("description", "description")
    .param("name", "name")
}

fn hard_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "hard",
        [
            Param::plain("first"),
            Param::var_positional("args"),
            Param::keyword_only("x"),
            Param::var_keyword("kwargs"),
        ],
        |args: CallArgs| -> Result<(String, Vec<i64>, String, Map<String, Value>)> {
            Ok(hard(
                args.arg(0)?,
                args.rest(1)?,
                args.keyword("x")?,
                args.captured.clone().into_iter().collect(),
            ))
        },
    )
    .doc("A harder test of how command-line args are mapped to parameters.")
    .param("first", "an ordinary argument")
    .param(
        "args",
        OptionSpec::new()
            .help("additional integer arguments")
            .nargs(Nargs::OneOrMore)
            .value_type(TypeHint::Int),
    )
    .param("_x", "a keyword-only argument with no default")
    .param("_spam", OptionSpec::new().help("spam value").suppress_default())
    .param("_bacon", OptionSpec::new().help("bacon value").suppress_default())
    .param("_eggs", OptionSpec::new().help("eggs value").suppress_default())
}

fn defaults_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "defaults",
        [
            Param::plain("first"),
            Param::plain("second").with_default("default"),
            Param::plain("third").with_default("also default"),
        ],
        |args: CallArgs| -> Result<(String, String, String)> {
            let second: String = args.arg(1)?;
            let third: String = args.arg(2)?;
            Ok(defaults(&args.arg::<String>(0)?, Some(&second), Some(&third)))
        },
    )
    .doc("Optional positionals take their defaults from the signature or the declaration.")
    .param("first", "an ordinary argument")
    .param("second", "an argument with a default value")
    .param(
        "third",
        OptionSpec::new()
            .help("explicitly optional")
            .nargs(Nargs::Optional)
            .default("overridden"),
    )
}

fn positional_by_keyword_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "positional_by_keyword",
        [Param::plain("first"), Param::plain("second")],
        |args: CallArgs| -> Result<(i64, i64)> {
            Ok(positional_by_keyword(args.arg(0)?, args.arg(1)?))
        },
    )
    .param(
        "_first",
        OptionSpec::new().help("first argument").value_type(TypeHint::Int),
    )
    .param(
        "_second",
        OptionSpec::new().help("second argument").value_type(TypeHint::Int),
    )
}

fn inverse_flag_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "inverse_flag",
        [Param::plain("original_name").with_default(true)],
        |args: CallArgs| -> Result<bool> { Ok(inverse_flag(args.arg(0)?)) },
    )
    .doc("A flag stored under a different name than it is spelled.")
    .param(
        "_renamed_and_inverted",
        OptionSpec::new()
            .action(Action::StoreFalse)
            .dest("original_name"),
    )
}

fn variadic_entrypoint() -> EntrypointBuilder {
    EntrypointBuilder::new(
        "variadic",
        [Param::var_positional("args").annotated(TypeHint::Int)],
        |args: CallArgs| -> Result<i64> { Ok(variadic(&args.rest::<i64>(0)?)) },
    )
    .doc("Add up any number of integers.")
    .param("args", "values")
}

fn update_metadata_entrypoint(registry: Rc<RefCell<Registry>>) -> EntrypointBuilder {
    EntrypointBuilder::new(
        "update_metadata",
        [
            Param::keyword_only("manifest").with_default("Cargo.toml"),
            Param::keyword_only("table").with_default(DEFAULT_TABLE),
        ],
        move |args: CallArgs| -> Result<String> {
            let manifest: String = args.keyword("manifest")?;
            let table: String = args.keyword("table")?;
            update_metadata(Path::new(&manifest), &table, &registry.borrow())
        },
    )
    .name("epmanager-{name}")
    .name_style(NameStyle::Kebab)
    .doc("Record the registered entry points in a package manifest.")
    .param("_manifest", "manifest file to update")
    .param("_table", "dotted path of the scripts table")
}

/// Every demo entry point, built and registered
pub struct Demos {
    entrypoints: BTreeMap<String, Entrypoint>,
    registry: Rc<RefCell<Registry>>,
}

impl Demos {
    /// Build all demos
    pub fn build() -> SetupResult<Self> {
        let declarations = EntrypointsFile::from_toml_str(DECLARATIONS)?;
        let registry = Rc::new(RefCell::new(Registry::new()));

        let builders = vec![
            empty_entrypoint(),
            example_entrypoint(),
            to_rename_entrypoint(&declarations)?,
            tricky_entrypoint(),
            hard_entrypoint(),
            defaults_entrypoint(),
            positional_by_keyword_entrypoint(),
            inverse_flag_entrypoint(),
            variadic_entrypoint(),
            update_metadata_entrypoint(Rc::clone(&registry)),
        ];

        let mut entrypoints = BTreeMap::new();
        for builder in builders {
            let entrypoint = builder.module(MODULE).register(&mut registry.borrow_mut())?;
            entrypoints.insert(entrypoint.name().to_string(), entrypoint);
        }

        Ok(Self {
            entrypoints,
            registry,
        })
    }

    /// Entry point registered as `name`
    pub fn get(&self, name: &str) -> Option<&Entrypoint> {
        self.entrypoints.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entrypoints.keys().map(String::as_str).collect()
    }

    /// Snapshot of the registry
    pub fn registry(&self) -> Registry {
        self.registry.borrow().clone()
    }
}
