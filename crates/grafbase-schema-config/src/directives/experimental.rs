use std::fmt;

use crate::render::display_utils::schema_inline;

/// Opt-in switches for features not yet stable. Unset switches are left to the engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Experimental {
    /// Enable experimental usage of KV in resolvers.
    pub kv: Option<bool>,
    pub ai: Option<bool>,
    pub codegen: Option<bool>,
    pub partial_caching: Option<bool>,
    pub runtime_logs: Option<bool>,
}

impl fmt::Display for Experimental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_inline("experimental", f)?
            .opt_arg("kv", self.kv)?
            .opt_arg("ai", self.ai)?
            .opt_arg("codegen", self.codegen)?
            .opt_arg("partialCaching", self.partial_caching)?
            .opt_arg("runtimeLogs", self.runtime_logs)?;

        Ok(())
    }
}
