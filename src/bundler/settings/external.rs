//! External package declarations.
//!
//! Externals may be declared as a plain package name or as an object keyed by
//! package name carrying post-install directives:
//!
//! ```toml
//! external = ["pg", { sharp = { scripts = ["rebuild-sharp"] } }]
//! ```
//!
//! Only this module understands both shapes; everything downstream works on
//! [`Externals`].

use serde::Deserialize;
use std::collections::BTreeMap;

/// Wildcard accepted in `exclude` meaning "exclude every dependency".
pub const EXCLUDE_ALL: &str = "*";

/// Post-install directives for one external package.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDirectives {
    /// Manifest scripts to run after dependencies are installed.
    #[serde(default)]
    pub scripts: Vec<String>,
}

/// One entry of the `external` list as written in configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum ExternalSpec {
    /// Plain package name
    Name(String),
    /// Package name(s) with directives
    Detailed(BTreeMap<String, ExternalDirectives>),
}

/// Normalized external packages.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Externals {
    names: Vec<String>,
    scripts: BTreeMap<String, Vec<String>>,
}

impl Externals {
    /// Flattens both declaration shapes, keeping first-seen order.
    pub fn from_specs(specs: &[ExternalSpec]) -> Self {
        let mut externals = Self::default();

        for spec in specs {
            match spec {
                ExternalSpec::Name(name) => externals.push_name(name),
                ExternalSpec::Detailed(map) => {
                    for (name, directives) in map {
                        externals.push_name(name);
                        if !directives.scripts.is_empty() {
                            externals
                                .scripts
                                .entry(name.clone())
                                .or_default()
                                .extend(directives.scripts.iter().cloned());
                        }
                    }
                }
            }
        }

        externals
    }

    fn push_name(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    /// Declared external package names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Post-install scripts declared for externals, in declaration order.
    pub fn post_install_scripts(&self) -> Vec<String> {
        let mut scripts = Vec::new();
        for name in &self.names {
            if let Some(list) = self.scripts.get(name) {
                for script in list {
                    if !scripts.contains(script) {
                        scripts.push(script.clone());
                    }
                }
            }
        }
        scripts
    }

    /// Names the compiler must leave unbundled: externals plus `exclude`,
    /// unless `exclude` contains [`EXCLUDE_ALL`].
    pub fn compiler_externals(&self, exclude: &[String]) -> Vec<String> {
        let mut names = self.names.clone();
        if !exclude.iter().any(|e| e == EXCLUDE_ALL) {
            for name in exclude {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Externals that must be installed into the package, i.e. not excluded.
    pub fn install_targets(&self, exclude: &[String]) -> Vec<String> {
        if exclude.iter().any(|e| e == EXCLUDE_ALL) {
            return Vec::new();
        }
        self.names
            .iter()
            .filter(|name| !exclude.contains(name))
            .cloned()
            .collect()
    }

    /// True when no externals were declared.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
