use super::{BoxedFunction, ConsoleReporter, Entrypoint, Registry, Reporter};
use crate::config::EntrypointSection;
use crate::dispatch::{CallArgs, DispatchTable};
use crate::error::{SetupError, SetupResult};
use crate::parser::{AdapterConfig, ClapParser, ParserAdapter};
use crate::signature::{Param, Signature};
use crate::spec::{merge, ParamSpec};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::debug;

/// How the function name is turned into a command name
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// Use the name unchanged
    #[default]
    AsIs,
    /// Replace underscores with hyphens
    Kebab,
}

/// Accumulates the declaration of one entry point.
///
/// # Example
///
/// ```
/// use entrypoint::{EntrypointBuilder, Param};
///
/// let ep = EntrypointBuilder::new(
///     "example",
///     [Param::plain("foo"), Param::plain("bar")],
///     |args| -> anyhow::Result<String> {
///         Ok(format!("foo={}, bar={}", args.arg::<String>(0)?, args.arg::<String>(1)?))
///     },
/// )
/// .doc("An example entry point.")
/// .param("foo", "the value for foo")
/// .param("bar", "the value for bar")
/// .build()
/// .unwrap();
///
/// let outcome = ep.run(Some(vec!["4".into(), "5".into()]));
/// assert_eq!(outcome.value(), Some(&serde_json::json!("foo=4, bar=5")));
/// ```
pub struct EntrypointBuilder<P = ClapParser> {
    function_name: String,
    params: Vec<Param>,
    function: BoxedFunction,
    doc: Option<String>,
    name: Option<String>,
    name_style: NameStyle,
    description: Option<String>,
    specs: Vec<(String, ParamSpec)>,
    config: BTreeMap<String, Value>,
    module: String,
    reporter: Box<dyn Reporter>,
    parser: PhantomData<P>,
}

impl EntrypointBuilder<ClapParser> {
    /// Start declaring an entry point for `function`, whose parameters are
    /// `params` in declaration order.
    pub fn new<F, R, E>(
        function_name: impl Into<String>,
        params: impl IntoIterator<Item = Param>,
        function: F,
    ) -> Self
    where
        F: Fn(CallArgs) -> Result<R, E> + 'static,
        R: Serialize,
        E: Into<anyhow::Error>,
    {
        let function_name = function_name.into();
        let context_name = function_name.clone();
        let function: BoxedFunction = Box::new(move |args| {
            let returned = function(args).map_err(Into::into)?;
            serde_json::to_value(returned)
                .with_context(|| format!("failed to serialize the result of `{}`", context_name))
        });

        Self {
            function_name,
            params: params.into_iter().collect(),
            function,
            doc: None,
            name: None,
            name_style: NameStyle::default(),
            description: None,
            specs: Vec::new(),
            config: BTreeMap::new(),
            module: "crate".to_string(),
            reporter: Box::new(ConsoleReporter),
            parser: PhantomData,
        }
    }
}

impl<P: ParserAdapter> EntrypointBuilder<P> {
    /// Use a different parser adapter
    pub fn with_parser<Q: ParserAdapter>(self) -> EntrypointBuilder<Q> {
        EntrypointBuilder {
            function_name: self.function_name,
            params: self.params,
            function: self.function,
            doc: self.doc,
            name: self.name,
            name_style: self.name_style,
            description: self.description,
            specs: self.specs,
            config: self.config,
            module: self.module,
            reporter: self.reporter,
            parser: PhantomData,
        }
    }

    /// Function documentation; its first line is the default description
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Override the command name. `{name}` is replaced by the function name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Naming convention applied to the final command name
    pub fn name_style(mut self, style: NameStyle) -> Self {
        self.name_style = style;
        self
    }

    /// Override the description, even with an empty one
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare how the parameter (or option, with a leading `_`) `key` is
    /// exposed. Declaration order is the order elements are added.
    pub fn param(mut self, key: impl Into<String>, spec: impl Into<ParamSpec>) -> Self {
        self.specs.push((key.into(), spec.into()));
        self
    }

    /// Extra parser adapter configuration
    pub fn config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Module path used in the registry reference
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Replace the default [`ConsoleReporter`]
    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Apply a section of a declarations file
    pub fn apply(mut self, section: &EntrypointSection) -> SetupResult<Self> {
        if section.function != self.function_name {
            return Err(SetupError::config(format!(
                "declaration for `{}` applied to function `{}`",
                section.function, self.function_name
            )));
        }
        if let Some(name) = &section.name {
            self.name = Some(name.clone());
        }
        if let Some(description) = &section.description {
            self.description = Some(description.clone());
        }
        for (key, value) in &section.params {
            let spec = ParamSpec::from_value(key, value)?;
            self.specs.push((key.clone(), spec));
        }
        for (key, value) in &section.config {
            self.config.insert(key.clone(), value.clone());
        }
        Ok(self)
    }

    fn effective_name(&self) -> String {
        let name = match &self.name {
            Some(template) => template.replace("{name}", &self.function_name),
            None => self.function_name.clone(),
        };
        match self.name_style {
            NameStyle::AsIs => name,
            NameStyle::Kebab => name.replace('_', "-"),
        }
    }

    fn effective_description(&self) -> String {
        match (&self.description, &self.doc) {
            (Some(description), _) => description.clone(),
            (None, Some(doc)) => doc.lines().next().unwrap_or_default().trim().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Classify the signature, build the parser and check that every
    /// required parameter will be supplied.
    pub fn build(self) -> SetupResult<Entrypoint<P>> {
        let signature = Signature::new(self.params.iter().cloned())?;
        let name = self.effective_name();
        let description = self.effective_description();

        if let Some(unknown) = self
            .config
            .keys()
            .find(|key| !P::config_keys().contains(&key.as_str()))
        {
            return Err(SetupError::UnknownConfigKey(unknown.clone()));
        }

        let mut parser = P::from_config(&AdapterConfig {
            name: name.clone(),
            description: description.clone(),
            extra: self.config.clone(),
        })?;
        let mut table = DispatchTable::new(&signature);
        let mut bindings = Vec::with_capacity(self.specs.len());
        for (key, spec) in &self.specs {
            bindings.push(merge(&signature, &mut table, &mut parser, key, spec)?);
        }
        table.validate()?;

        let reference = format!("{}:{}.invoke", self.module, self.function_name);
        debug!(
            entrypoint = %name,
            function = %self.function_name,
            elements = bindings.len(),
            "built entry point"
        );

        Ok(Entrypoint {
            name,
            description,
            function_name: self.function_name,
            reference,
            bindings,
            parser,
            table,
            function: self.function,
            reporter: self.reporter,
        })
    }

    /// Build and record the entry point in `registry`
    pub fn register(self, registry: &mut Registry) -> SetupResult<Entrypoint<P>> {
        let entrypoint = self.build()?;
        registry.register(entrypoint.name(), entrypoint.reference());
        Ok(entrypoint)
    }
}
