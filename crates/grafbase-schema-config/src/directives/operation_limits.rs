use std::fmt;

use crate::render::display_utils::schema_block;

/// Limits on the shape of incoming operations. Unset limits are not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationLimits {
    pub depth: Option<u16>,
    pub height: Option<u16>,
    pub aliases: Option<u16>,
    pub root_fields: Option<u16>,
    pub complexity: Option<u16>,
}

impl fmt::Display for OperationLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = |value: Option<u16>| value.map(u32::from);

        schema_block("operationLimits", f)?
            .opt_arg("depth", limit(self.depth))?
            .opt_arg("height", limit(self.height))?
            .opt_arg("aliases", limit(self.aliases))?
            .opt_arg("rootFields", limit(self.root_fields))?
            .opt_arg("complexity", limit(self.complexity))?
            .finish()
    }
}
