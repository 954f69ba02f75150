//! Target platform, module format and output extension rules.

use crate::bundler::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Compiler target platform.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Node.js runtime
    #[default]
    Node,
    /// Browser runtime
    Browser,
    /// No platform assumptions; module format defaults to ESM
    Neutral,
}

impl Platform {
    /// Value passed to the compiler's `--platform` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Node => "node",
            Platform::Browser => "browser",
            Platform::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output module format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// CommonJS
    Cjs,
    /// ECMAScript modules
    Esm,
    /// Immediately invoked function expression
    Iife,
}

impl ModuleFormat {
    /// Value passed to the compiler's `--format` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleFormat::Cjs => "cjs",
            ModuleFormat::Esm => "esm",
            ModuleFormat::Iife => "iife",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the build emits ES modules.
///
/// A neutral platform without an explicit format emits ESM.
pub fn is_esm(platform: Platform, format: Option<ModuleFormat>) -> bool {
    match format {
        Some(format) => format == ModuleFormat::Esm,
        None => platform == Platform::Neutral,
    }
}

/// Rejects output extensions that contradict the module format.
pub fn validate_out_extension(
    platform: Platform,
    format: Option<ModuleFormat>,
    out_extension: &str,
) -> Result<()> {
    let esm = is_esm(platform, format);

    if esm && out_extension == ".cjs" {
        return Err(Error::Config(
            "format \"esm\" or platform \"neutral\" should not output a file with extension \".cjs\""
                .into(),
        ));
    }

    if !esm && out_extension == ".mjs" {
        return Err(Error::Config(
            "non-esm builds should not output a file with extension \".mjs\"".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esm_with_cjs_extension_is_rejected() {
        let err = validate_out_extension(Platform::Node, Some(ModuleFormat::Esm), ".cjs");
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn neutral_platform_defaults_to_esm() {
        assert!(is_esm(Platform::Neutral, None));
        assert!(validate_out_extension(Platform::Neutral, None, ".cjs").is_err());
        assert!(validate_out_extension(Platform::Neutral, None, ".mjs").is_ok());
    }

    #[test]
    fn cjs_with_mjs_extension_is_rejected() {
        assert!(validate_out_extension(Platform::Node, None, ".mjs").is_err());
        assert!(validate_out_extension(Platform::Node, Some(ModuleFormat::Cjs), ".mjs").is_err());
        assert!(validate_out_extension(Platform::Browser, Some(ModuleFormat::Iife), ".mjs").is_err());
    }

    #[test]
    fn compatible_combinations_pass() {
        assert!(validate_out_extension(Platform::Node, None, ".js").is_ok());
        assert!(validate_out_extension(Platform::Node, Some(ModuleFormat::Cjs), ".cjs").is_ok());
        assert!(validate_out_extension(Platform::Node, Some(ModuleFormat::Esm), ".mjs").is_ok());
        assert!(validate_out_extension(Platform::Neutral, Some(ModuleFormat::Cjs), ".cjs").is_ok());
    }
}
