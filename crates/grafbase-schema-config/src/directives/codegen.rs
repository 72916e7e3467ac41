use std::fmt;

use crate::{render::display_utils::schema_inline, ConfigError};

/// Generation of typed resolver signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Codegen {
    pub enabled: Option<bool>,
    /// Where the generated file is written, relative to the project root.
    pub path: Option<String>,
}

impl Codegen {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) if path.trim().is_empty() => Err(ConfigError::InvalidDirective {
                directive: "codegen",
                reason: "the path cannot be empty".to_owned(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Codegen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_inline("codegen", f)?
            .opt_arg("enabled", self.enabled)?
            .opt_arg("path", self.path.as_deref())?;

        Ok(())
    }
}
