use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::{render::display_utils::schema_inline, ConfigError};

/// The federation version announced when none is configured.
pub const FEDERATION_VERSION: &str = "2.3";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("must be valid"))
}

/// Exposes the schema as a federation subgraph.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Federation {
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FEDERATION_VERSION.to_owned()
}

impl Default for Federation {
    fn default() -> Self {
        Federation {
            version: default_version(),
        }
    }
}

impl Federation {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !version_regex().is_match(&self.version) {
            return Err(ConfigError::InvalidDirective {
                directive: "federation",
                reason: format!("`{}` is not a federation version", self.version),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Federation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_inline("federation", f)?.arg("version", self.version.as_str())?;
        Ok(())
    }
}
