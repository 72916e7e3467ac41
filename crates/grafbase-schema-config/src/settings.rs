use crate::{
    directives::{
        Codegen, Cors, Experimental, Federation, Introspection, OperationLimits, RateLimitingInput, TrustedDocuments,
    },
    ConfigError,
};

/// The schema-wide directives, as written in a TOML settings document. Every section is optional
/// and only the present ones are installed by
/// [`SchemaConfig::apply_settings`](crate::SchemaConfig::apply_settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSettings {
    pub federation: Option<Federation>,
    pub introspection: Option<Introspection>,
    pub operation_limits: Option<OperationLimits>,
    pub cors: Option<Cors>,
    pub rate_limiting: Option<RateLimitingInput>,
    pub trusted_documents: Option<TrustedDocuments>,
    pub experimental: Option<Experimental>,
    pub codegen: Option<Codegen>,
}

impl SchemaSettings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use indoc::indoc;

    use super::*;
    use crate::directives::{AnyOr, HttpMethod};

    #[test]
    fn empty_document() {
        assert_eq!(SchemaSettings::from_toml("").unwrap(), SchemaSettings::default());
    }

    #[test]
    fn every_section() {
        let settings = SchemaSettings::from_toml(indoc! {r#"
            [federation]

            [introspection]
            enable = false

            [operation_limits]
            depth = 10
            root_fields = 5

            [cors]
            max_age = "1m"
            allowed_methods = ["GET", "POST"]
            allowed_origins = "any"

            [[rate_limiting.rules]]
            name = "per-ip"
            limit = 100
            duration = "10s"
            condition = { ips = "any" }

            [trusted_documents]
            enforced = true

            [experimental]
            kv = true

            [codegen]
            enabled = true
            path = "generated"
        "#})
        .unwrap();

        assert_eq!(settings.federation, Some(Federation::default()));
        assert_eq!(settings.introspection, Some(Introspection { enable: false }));

        let limits = settings.operation_limits.unwrap();
        assert_eq!(limits.depth, Some(10));
        assert_eq!(limits.root_fields, Some(5));

        let cors = settings.cors.unwrap();
        assert_eq!(cors.max_age, Some(Duration::from_secs(60)));
        assert_eq!(
            cors.allowed_methods,
            Some(AnyOr::Explicit(vec![HttpMethod::Get, HttpMethod::Post]))
        );
        assert_eq!(cors.allowed_origins, Some(AnyOr::Any));

        let rules = settings.rate_limiting.unwrap().rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].duration, Duration::from_secs(10));
        assert_eq!(rules[0].condition.ips, Some(AnyOr::Any));

        assert_eq!(settings.experimental.unwrap().kv, Some(true));
        assert_eq!(settings.codegen.unwrap().path.as_deref(), Some("generated"));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let error = SchemaSettings::from_toml("[graphql]\npath = \"/graphql\"\n").unwrap_err();

        assert!(matches!(error, ConfigError::Settings(_)), "{error}");
        assert!(error.to_string().starts_with("invalid settings: "), "{error}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = SchemaSettings::from_toml("[cors]\nallow_origins = \"any\"\n").unwrap_err();
        assert!(error.to_string().contains("allow_origins"), "{error}");
    }
}
