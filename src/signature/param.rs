//! Parameter declarations and their classified form.

use super::TypeHint;
use serde_json::Value;
use std::fmt;

/// Kind of a parameter after classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Positional-or-keyword parameter
    Plain,
    /// Catch-all for extra positional values
    VarPositional,
    /// Parameter that can only be supplied by name
    KeywordOnly,
    /// Catch-all for extra named values
    VarKeyword,
}

/// Kind of a parameter as declared by the function author.
///
/// This is wider than [`ParameterKind`]: positional-only parameters can be
/// declared but are rejected by classification, since parsed flags can only
/// reach parameters by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclaredKind {
    /// Positional-only parameter (never accepted)
    PositionalOnly,
    /// Positional-or-keyword parameter
    PositionalOrKeyword,
    /// Variadic positional parameter
    VarPositional,
    /// Keyword-only parameter
    KeywordOnly,
    /// Variadic keyword parameter
    VarKeyword,
}

impl fmt::Display for DeclaredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PositionalOnly => "POSITIONAL_ONLY",
            Self::PositionalOrKeyword => "POSITIONAL_OR_KEYWORD",
            Self::VarPositional => "VAR_POSITIONAL",
            Self::KeywordOnly => "KEYWORD_ONLY",
            Self::VarKeyword => "VAR_KEYWORD",
        };
        f.write_str(name)
    }
}

/// One parameter of a function, as declared.
///
/// # Example
///
/// ```
/// use entrypoint::{Param, TypeHint};
///
/// let second = Param::plain("second").with_default("default");
/// let count = Param::keyword_only("count").annotated(TypeHint::Int);
/// assert_eq!(second.name(), "second");
/// assert!(count.default().is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    name: String,
    kind: DeclaredKind,
    default: Option<Value>,
    annotation: Option<TypeHint>,
}

impl Param {
    fn new(name: impl Into<String>, kind: DeclaredKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
        }
    }

    /// Positional-or-keyword parameter
    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::PositionalOrKeyword)
    }

    /// Positional-only parameter
    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::PositionalOnly)
    }

    /// Variadic positional parameter
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::VarPositional)
    }

    /// Keyword-only parameter
    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::KeywordOnly)
    }

    /// Variadic keyword parameter
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::VarKeyword)
    }

    /// Give the parameter a default value, making it optional
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a type annotation
    pub fn annotated(mut self, hint: TypeHint) -> Self {
        self.annotation = Some(hint);
        self
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind
    pub fn kind(&self) -> DeclaredKind {
        self.kind
    }

    /// Default value, if any
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Type annotation, if any
    pub fn annotation(&self) -> Option<TypeHint> {
        self.annotation
    }
}

/// A classified parameter: the only form the rest of the crate consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Classified kind
    pub kind: ParameterKind,
    /// Default value; `None` means required
    pub default: Option<Value>,
    /// Type annotation used as a fallback coercion
    pub annotation: Option<TypeHint>,
}

impl ParameterDescriptor {
    /// Whether the parameter must receive a value from somewhere
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
