use std::fmt;

use crate::render::display_utils::schema_inline;

/// Turns schema introspection on or off, whatever the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Introspection {
    pub enable: bool,
}

impl fmt::Display for Introspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_inline("introspection", f)?.arg("enable", self.enable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders() {
        assert_eq!(
            Introspection { enable: false }.to_string(),
            "extend schema @introspection(enable: false)"
        );
    }
}
