use std::fmt;

use crate::{render::display_utils::schema_block, ConfigError};

/// Restricts the engine to operations registered ahead of time. A request carrying the bypass
/// header with the expected value may send any operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustedDocuments {
    pub enforced: bool,
    pub bypass_header_name: Option<String>,
    pub bypass_header_value: Option<String>,
}

impl TrustedDocuments {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let reason = match (&self.bypass_header_name, &self.bypass_header_value) {
            (Some(name), Some(_)) if name.trim().is_empty() => "the bypass header name cannot be empty",
            (Some(_), None) => "a bypass header name needs a bypass header value",
            (None, Some(_)) => "a bypass header value needs a bypass header name",
            _ => return Ok(()),
        };

        Err(ConfigError::InvalidDirective {
            directive: "trustedDocuments",
            reason: reason.to_owned(),
        })
    }
}

impl fmt::Display for TrustedDocuments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_block("trustedDocuments", f)?
            .arg("enforced", self.enforced)?
            .opt_arg("bypassHeaderName", self.bypass_header_name.as_deref())?
            .opt_arg("bypassHeaderValue", self.bypass_header_value.as_deref())?
            .finish()
    }
}
