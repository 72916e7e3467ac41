use std::fmt;

use super::{required, validate_name, validate_url, ConnectorHeaders, Transforms};
use crate::{env::has_placeholder, render::display_utils::DirectiveBlock, ConfigError};

/// A REST API described by an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialOpenApi {
    name: String,
    url: Option<String>,
    schema: Option<String>,
    headers: ConnectorHeaders,
    transforms: Transforms,
}

impl PartialOpenApi {
    pub(super) fn new(name: impl Into<String>) -> Self {
        PartialOpenApi {
            name: name.into(),
            url: None,
            schema: None,
            headers: ConnectorHeaders::default(),
            transforms: Transforms::default(),
        }
    }

    /// Overrides the server URL declared in the schema document.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Where the OpenAPI document is fetched from, a URL or a path relative to the project.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: impl FnOnce(&mut ConnectorHeaders)) -> Self {
        headers(&mut self.headers);
        self
    }

    #[must_use]
    pub fn transforms(mut self, transforms: impl FnOnce(&mut Transforms)) -> Self {
        transforms(&mut self.transforms);
        self
    }

    pub fn finalize(self, namespace: Option<bool>) -> Result<OpenApiConnector, ConfigError> {
        validate_name(&self.name)?;

        if let Some(url) = &self.url {
            validate_url(&self.name, "url", url, &["http", "https"])?;
        }

        let schema = required(&self.name, "schema", self.schema)?;

        if schema.contains("://") && !has_placeholder(&schema) {
            validate_url(&self.name, "schema", &schema, &["http", "https"])?;
        }

        self.headers.validate(&self.name)?;
        self.transforms.validate(&self.name)?;

        Ok(OpenApiConnector {
            name: self.name,
            url: self.url,
            schema,
            namespace: namespace.unwrap_or(true),
            headers: self.headers,
            transforms: self.transforms,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiConnector {
    pub(super) name: String,
    url: Option<String>,
    schema: String,
    pub(super) namespace: bool,
    headers: ConnectorHeaders,
    transforms: Transforms,
}

impl fmt::Display for OpenApiConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DirectiveBlock::new("openapi", f)?
            .arg("name", self.name.as_str())?
            .opt_arg("url", self.url.as_deref())?
            .arg("schema", self.schema.as_str())?
            .arg("namespace", self.namespace)?
            .list("headers", self.headers.headers_sdl())?
            .list("introspectionHeaders", self.headers.introspection_headers_sdl())?
            .opt_arg("transforms", self.transforms.to_sdl())?
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::QueryNaming;

    #[test]
    fn renders_schema_after_url() {
        let connector = PartialOpenApi::new("Stripe")
            .schema("https://raw.githubusercontent.com/stripe/openapi/master/openapi/spec3.json")
            .headers(|headers| {
                headers.set_static("Authorization", "Bearer {{ env.STRIPE_API_KEY }}");
            })
            .transforms(|transforms| {
                transforms.query_naming(QueryNaming::OperationId).exclude("*.metadata");
            })
            .finalize(Some(false))
            .unwrap();

        let expected = [
            "  @openapi(",
            r#"    name: "Stripe""#,
            r#"    schema: "https://raw.githubusercontent.com/stripe/openapi/master/openapi/spec3.json""#,
            "    namespace: false",
            "    headers: [",
            r#"      { name: "Authorization", value: "Bearer {{ env.STRIPE_API_KEY }}" }"#,
            "    ]",
            r#"    transforms: { exclude: ["*.metadata"], queryNaming: OPERATION_ID }"#,
            "  )",
        ];

        assert_eq!(connector.to_string(), expected.join("\n"));
    }

    #[test]
    fn schema_is_required() {
        let error = PartialOpenApi::new("Stripe").finalize(None).unwrap_err();

        assert_eq!(error.to_string(), "the connector `Stripe` is invalid: the schema is missing");
    }
}
