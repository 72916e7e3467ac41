use std::sync::OnceLock;

use regex::Regex;

use crate::ConfigError;

fn variable_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("must be valid"))
}

/// Matches any "{{ something }}"
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([[[:alnum:]]_.]+)\s*\}\}").expect("must be valid"))
}

/// A reference to an environment variable, resolved by the engine at runtime.
///
/// Returns the `{{ env.NAME }}` placeholder to embed in any string value of the configuration.
/// The variable itself is never read here.
///
/// ```
/// let token = grafbase_schema_config::env("GITHUB_TOKEN").unwrap();
/// assert_eq!(format!("Bearer {token}"), "Bearer {{ env.GITHUB_TOKEN }}");
/// ```
pub fn env(variable_name: &str) -> Result<String, ConfigError> {
    if !variable_name_regex().is_match(variable_name) {
        return Err(ConfigError::InvalidEnvironmentVariable(variable_name.to_owned()));
    }

    Ok(format!("{{{{ env.{variable_name} }}}}"))
}

/// Whether the value embeds at least one `{{ ... }}` placeholder, making it unknowable until the
/// engine resolves it.
pub(crate) fn has_placeholder(value: &str) -> bool {
    placeholder_regex().is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholder() {
        assert_eq!(env("API_KEY").unwrap(), "{{ env.API_KEY }}");
        assert!(has_placeholder(&env("API_KEY").unwrap()));
        assert!(has_placeholder("Bearer {{env.TOKEN}}"));
        assert!(!has_placeholder("https://example.com"));
    }

    #[test]
    fn rejects_invalid_names() {
        let error = env("1-API KEY").unwrap_err();
        assert_eq!(error.to_string(), "`1-API KEY` is not a valid environment variable name");
        assert!(env("").is_err());
    }
}
