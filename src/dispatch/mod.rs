//! Dispatch table - maps parsed values back onto a function call
//!
//! The table records, for every declared parameter, where its value will
//! come from once parsing is done: a literal (the parameter's default) or a
//! key in the parsed mapping. Parameters that no key is bound to and that
//! have no default make [`DispatchTable::validate`] fail, so an entry point
//! that could call its function with a missing argument never gets built.

mod call;

pub use call::CallArgs;

use crate::error::{DispatchError, SetupError, SetupResult};
use crate::parser::ParsedArgs;
use crate::signature::{ParameterKind, Signature};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

/// Where a slot's value comes from
#[derive(Clone, Debug, PartialEq)]
enum Source {
    /// Required parameter nothing has been bound to yet
    Unset,
    /// Pass this value as-is
    Literal(Value),
    /// Look this key up in the parsed mapping
    Parsed(String),
}

/// Position of a named parameter in the call
#[derive(Clone, Copy, Debug, PartialEq)]
enum Location {
    Positional(usize),
    VarPositional,
    Keyword,
}

/// Per-function record of where each argument comes from
#[derive(Clone, Debug)]
pub struct DispatchTable {
    positional: Vec<(String, Source)>,
    var_positional: Source,
    keywords: Vec<(String, Source)>,
    /// `None` when the function has no variadic keyword parameter
    captured: Option<BTreeSet<String>>,
    locations: HashMap<String, Location>,
}

impl DispatchTable {
    /// Build the table with every slot at its default source
    pub fn new(signature: &Signature) -> Self {
        let mut table = Self {
            positional: Vec::new(),
            // Even without a variadic positional parameter the call gets an
            // empty extension.
            var_positional: Source::Literal(Value::Array(Vec::new())),
            keywords: Vec::new(),
            captured: None,
            locations: HashMap::new(),
        };

        for param in signature.iter() {
            let source = param
                .default
                .clone()
                .map(Source::Literal)
                .unwrap_or(Source::Unset);
            match param.kind {
                ParameterKind::Plain => {
                    table
                        .locations
                        .insert(param.name.clone(), Location::Positional(table.positional.len()));
                    table.positional.push((param.name.clone(), source));
                }
                ParameterKind::VarPositional => {
                    table
                        .locations
                        .insert(param.name.clone(), Location::VarPositional);
                }
                ParameterKind::KeywordOnly => {
                    table.locations.insert(param.name.clone(), Location::Keyword);
                    table.keywords.push((param.name.clone(), source));
                }
                ParameterKind::VarKeyword => {
                    // Not addressed by name: unknown keys get collected here.
                    table.captured = Some(BTreeSet::new());
                }
            }
        }

        table
    }

    /// Declare that the parameter `name` will be read from the parsed
    /// mapping under the same key. Unknown names go to the capture set if
    /// there is one.
    pub fn guarantee(&mut self, name: &str) -> SetupResult<()> {
        let source = Source::Parsed(name.to_string());
        match self.locations.get(name).copied() {
            Some(Location::Positional(index)) => self.positional[index].1 = source,
            Some(Location::VarPositional) => self.var_positional = source,
            Some(Location::Keyword) => {
                if let Some(slot) = self.keywords.iter_mut().find(|(k, _)| k == name) {
                    slot.1 = source;
                }
            }
            None => match self.captured.as_mut() {
                Some(captured) => {
                    captured.insert(name.to_string());
                }
                None => {
                    return Err(SetupError::UnknownParameter {
                        name: name.to_string(),
                    });
                }
            },
        }
        trace!(name, "guaranteed parameter source");
        Ok(())
    }

    /// Ensure that parameters without default values will get values from
    /// the parsed arguments.
    pub fn validate(&self) -> SetupResult<()> {
        let positions: Vec<usize> = self
            .positional
            .iter()
            .enumerate()
            .filter(|(_, (_, source))| *source == Source::Unset)
            .map(|(i, _)| i)
            .collect();
        let keywords: Vec<String> = self
            .keywords
            .iter()
            .filter(|(_, source)| *source == Source::Unset)
            .map(|(name, _)| name.clone())
            .collect();

        if positions.is_empty() && keywords.is_empty() {
            Ok(())
        } else {
            Err(SetupError::Unsupplied {
                positions,
                keywords,
            })
        }
    }

    /// Names routed into the variadic keyword parameter
    pub fn captured_names(&self) -> Option<&BTreeSet<String>> {
        self.captured.as_ref()
    }

    /// Reconstruct the call from a parsed mapping
    pub fn dispatch(&self, parsed: &ParsedArgs) -> Result<CallArgs, DispatchError> {
        let mut positional = self
            .positional
            .iter()
            .map(|(_, source)| resolve(source, parsed))
            .collect::<Result<Vec<_>, _>>()?;

        match resolve(&self.var_positional, parsed)? {
            Value::Array(items) => positional.extend(items),
            _ => {
                let origin = match &self.var_positional {
                    Source::Parsed(key) => key.clone(),
                    _ => "<default>".to_string(),
                };
                return Err(DispatchError::NotASequence(origin));
            }
        }

        let keywords = self
            .keywords
            .iter()
            .map(|(name, source)| Ok((name.clone(), resolve(source, parsed)?)))
            .collect::<Result<_, DispatchError>>()?;

        let mut call = CallArgs {
            positional,
            keywords,
            ..CallArgs::default()
        };

        if let Some(captured) = &self.captured {
            for name in captured {
                if let Some(value) = parsed.get(name) {
                    debug_assert!(!call.keywords.contains_key(name));
                    call.captured.insert(name.clone(), value.clone());
                }
            }
        }

        debug!(
            positional = call.positional.len(),
            keywords = call.keywords.len(),
            captured = call.captured.len(),
            "dispatched parsed arguments"
        );
        Ok(call)
    }

    /// Reconstruct the call and make it
    pub fn invoke<F, R>(&self, func: F, parsed: &ParsedArgs) -> Result<R, DispatchError>
    where
        F: FnOnce(CallArgs) -> R,
    {
        Ok(func(self.dispatch(parsed)?))
    }
}

fn resolve(source: &Source, parsed: &ParsedArgs) -> Result<Value, DispatchError> {
    match source {
        Source::Literal(value) => Ok(value.clone()),
        Source::Parsed(key) => parsed
            .get(key)
            .cloned()
            .ok_or_else(|| DispatchError::MissingValue(key.clone())),
        // validate() rules this out before any entry point is built
        Source::Unset => Err(DispatchError::MissingValue("<unset>".to_string())),
    }
}
