use std::fmt;

use super::{required, validate_name, validate_url};
use crate::{render::display_utils::DirectiveBlock, ConfigError};

const SCHEMES: &[&str] = &["postgres", "postgresql"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPostgres {
    name: String,
    url: Option<String>,
}

impl PartialPostgres {
    pub(super) fn new(name: impl Into<String>) -> Self {
        PartialPostgres {
            name: name.into(),
            url: None,
        }
    }

    /// The connection string, usually an `{{ env.DATABASE_URL }}` placeholder.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn finalize(self, namespace: Option<bool>) -> Result<PostgresConnector, ConfigError> {
        validate_name(&self.name)?;

        let url = required(&self.name, "url", self.url)?;
        validate_url(&self.name, "url", &url, SCHEMES)?;

        Ok(PostgresConnector {
            name: self.name,
            url,
            namespace: namespace.unwrap_or(true),
        })
    }
}

/// A serverless Neon database, reached through the Postgres connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialNeon(PartialPostgres);

impl PartialNeon {
    pub(super) fn new(name: impl Into<String>) -> Self {
        PartialNeon(PartialPostgres::new(name))
    }

    #[must_use]
    pub fn url(self, url: impl Into<String>) -> Self {
        PartialNeon(self.0.url(url))
    }

    pub fn finalize(self, namespace: Option<bool>) -> Result<PostgresConnector, ConfigError> {
        self.0.finalize(namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConnector {
    pub(super) name: String,
    url: String,
    pub(super) namespace: bool,
}

impl fmt::Display for PostgresConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DirectiveBlock::new("postgres", f)?
            .arg("name", self.name.as_str())?
            .arg("url", self.url.as_str())?
            .arg("namespace", self.namespace)?
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_block() {
        let connector = PartialPostgres::new("Postgres")
            .url("{{ env.DATABASE_URL }}")
            .finalize(Some(false))
            .unwrap();

        let expected = [
            "  @postgres(",
            r#"    name: "Postgres""#,
            r#"    url: "{{ env.DATABASE_URL }}""#,
            "    namespace: false",
            "  )",
        ];

        assert_eq!(connector.to_string(), expected.join("\n"));
    }

    #[test]
    fn url_is_required() {
        let error = PartialPostgres::new("Postgres").finalize(None).unwrap_err();

        assert_eq!(error.to_string(), "the connector `Postgres` is invalid: the url is missing");
    }

    #[test]
    fn neon_urls_are_postgres_urls() {
        let error = PartialNeon::new("Neon")
            .url("https://console.neon.tech")
            .finalize(None)
            .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidConnector { .. }));
    }
}
