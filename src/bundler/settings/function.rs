//! Function entries produced by the host configuration layer.

use serde::Deserialize;

/// Deployable function definition as declared by the host framework.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionHandle {
    /// Deployed function name
    #[serde(default)]
    pub name: Option<String>,
    /// Handler reference, e.g. `src/users.handler`
    pub handler: String,
}

/// One function to build, pointing at its entry point source file.
///
/// Several entries may share an `entry_path`; the compiler sees each path once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionEntry {
    /// Entry point path relative to the service root, e.g. `src/users.ts`
    pub entry_path: String,
    /// Function definition; entries without one are dropped from results
    pub function: Option<FunctionHandle>,
    /// Function alias (configuration key)
    pub alias: String,
}

impl FunctionEntry {
    /// Creates an entry with a function definition.
    pub fn new(entry_path: impl Into<String>, alias: impl Into<String>, function: FunctionHandle) -> Self {
        Self {
            entry_path: entry_path.into(),
            function: Some(function),
            alias: alias.into(),
        }
    }
}
