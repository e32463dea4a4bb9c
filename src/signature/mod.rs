//! Parameter classification.
//!
//! Rust has no runtime signature introspection, so the function author
//! declares the parameters once with [`Param`] and [`Signature::new`]
//! classifies them into [`ParameterDescriptor`]s. Everything downstream
//! consumes only the descriptor list.
//!
//! ```
//! use entrypoint::{Param, ParameterKind, Signature};
//!
//! let signature = Signature::new([
//!     Param::plain("first"),
//!     Param::var_positional("args"),
//!     Param::keyword_only("x"),
//!     Param::var_keyword("kwargs"),
//! ])
//! .unwrap();
//!
//! assert_eq!(signature.len(), 4);
//! assert_eq!(signature.get("x").unwrap().kind, ParameterKind::KeywordOnly);
//! assert!(signature.var_keyword().is_some());
//! ```

mod hint;
mod param;

pub use hint::TypeHint;
pub use param::{DeclaredKind, Param, ParameterDescriptor, ParameterKind};

use crate::error::{SetupError, SetupResult};
use std::collections::HashSet;

/// Ordered, classified parameter list of one function
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    params: Vec<ParameterDescriptor>,
}

impl Signature {
    /// Classify declared parameters, failing fast on anything the
    /// dispatcher could not feed.
    pub fn new(params: impl IntoIterator<Item = Param>) -> SetupResult<Self> {
        let params = classify(params)?;
        Ok(Self { params })
    }

    /// Signature of a function that takes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The variadic keyword parameter, if declared
    pub fn var_keyword(&self) -> Option<&ParameterDescriptor> {
        self.params.last().filter(|p| p.kind == ParameterKind::VarKeyword)
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.params.iter()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the function takes no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Turn declared parameters into descriptors, enforcing the shape rules of
/// a callable signature.
pub fn classify(params: impl IntoIterator<Item = Param>) -> SetupResult<Vec<ParameterDescriptor>> {
    let mut seen = HashSet::new();
    let mut descriptors: Vec<ParameterDescriptor> = Vec::new();

    for param in params {
        let name = param.name().to_string();
        if name.is_empty() {
            return Err(SetupError::signature("parameter names must not be empty"));
        }
        if !seen.insert(name.clone()) {
            return Err(SetupError::signature(format!("duplicate parameter `{}`", name)));
        }
        if descriptors
            .last()
            .is_some_and(|p| p.kind == ParameterKind::VarKeyword)
        {
            return Err(SetupError::signature(format!(
                "parameter `{}` follows the variadic keyword parameter, which must be last",
                name
            )));
        }

        let kind = match param.kind() {
            DeclaredKind::PositionalOrKeyword => {
                if descriptors.iter().any(|p| {
                    matches!(p.kind, ParameterKind::VarPositional | ParameterKind::KeywordOnly)
                }) {
                    return Err(SetupError::signature(format!(
                        "positional parameter `{}` follows a variadic positional or keyword-only parameter",
                        name
                    )));
                }
                ParameterKind::Plain
            }
            DeclaredKind::VarPositional => {
                if descriptors.iter().any(|p| p.kind == ParameterKind::VarPositional) {
                    return Err(SetupError::signature(format!(
                        "`{}` is a second variadic positional parameter",
                        name
                    )));
                }
                if descriptors.iter().any(|p| p.kind == ParameterKind::KeywordOnly) {
                    return Err(SetupError::signature(format!(
                        "variadic positional parameter `{}` follows a keyword-only parameter",
                        name
                    )));
                }
                ParameterKind::VarPositional
            }
            DeclaredKind::KeywordOnly => ParameterKind::KeywordOnly,
            DeclaredKind::VarKeyword => ParameterKind::VarKeyword,
            other @ DeclaredKind::PositionalOnly => {
                return Err(SetupError::InvalidParameterKind {
                    name,
                    kind: other.to_string(),
                });
            }
        };

        if matches!(kind, ParameterKind::VarPositional | ParameterKind::VarKeyword)
            && param.default().is_some()
        {
            return Err(SetupError::signature(format!(
                "variadic parameter `{}` cannot have a default value",
                name
            )));
        }

        descriptors.push(ParameterDescriptor {
            name,
            kind,
            default: param.default().cloned(),
            annotation: param.annotation(),
        });
    }

    Ok(descriptors)
}
