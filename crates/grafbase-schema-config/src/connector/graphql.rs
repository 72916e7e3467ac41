use std::fmt;

use super::{invalid, required, validate_name, validate_url, ConnectorHeaders, Transforms};
use crate::{render::display_utils::DirectiveBlock, ConfigError};

/// A remote GraphQL API, introspected by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialGraphQl {
    name: String,
    url: Option<String>,
    headers: ConnectorHeaders,
    transforms: Transforms,
}

impl PartialGraphQl {
    pub(super) fn new(name: impl Into<String>) -> Self {
        PartialGraphQl {
            name: name.into(),
            url: None,
            headers: ConnectorHeaders::default(),
            transforms: Transforms::default(),
        }
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
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

    pub fn finalize(self, namespace: Option<bool>) -> Result<GraphQlConnector, ConfigError> {
        validate_name(&self.name)?;

        let url = required(&self.name, "url", self.url)?;
        validate_url(&self.name, "url", &url, &["http", "https"])?;

        self.headers.validate(&self.name)?;
        self.transforms.validate(&self.name)?;

        if self.transforms.query_naming.is_some() {
            return Err(invalid(&self.name, "`queryNaming` is only supported by OpenAPI connectors"));
        }

        Ok(GraphQlConnector {
            name: self.name,
            url,
            namespace: namespace.unwrap_or(true),
            headers: self.headers,
            transforms: self.transforms,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlConnector {
    pub(super) name: String,
    url: String,
    pub(super) namespace: bool,
    headers: ConnectorHeaders,
    transforms: Transforms,
}

impl fmt::Display for GraphQlConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DirectiveBlock::new("graphql", f)?
            .arg("name", self.name.as_str())?
            .arg("url", self.url.as_str())?
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
    use crate::connector::{HeaderValue, QueryNaming};

    #[test]
    fn renders_headers_and_transforms() {
        let connector = PartialGraphQl::new("Github")
            .url("https://api.github.com/graphql")
            .headers(|headers| {
                headers
                    .set_static("Authorization", "Bearer {{ env.GITHUB_TOKEN }}")
                    .set("x-request-id", HeaderValue::forward("x-request-id"))
                    .introspection("Authorization", "Bearer {{ env.GITHUB_ADMIN_TOKEN }}");
            })
            .transforms(|transforms| {
                transforms.exclude("Query.viewer");
            })
            .finalize(None)
            .unwrap();

        let expected = [
            "  @graphql(",
            r#"    name: "Github""#,
            r#"    url: "https://api.github.com/graphql""#,
            "    namespace: true",
            "    headers: [",
            r#"      { name: "Authorization", value: "Bearer {{ env.GITHUB_TOKEN }}" }"#,
            r#"      { name: "x-request-id", forward: "x-request-id" }"#,
            "    ]",
            "    introspectionHeaders: [",
            r#"      { name: "Authorization", value: "Bearer {{ env.GITHUB_ADMIN_TOKEN }}" }"#,
            "    ]",
            r#"    transforms: { exclude: ["Query.viewer"] }"#,
            "  )",
        ];

        assert_eq!(connector.to_string(), expected.join("\n"));
    }

    #[test]
    fn query_naming_is_openapi_only() {
        let error = PartialGraphQl::new("Github")
            .url("https://api.github.com/graphql")
            .transforms(|transforms| {
                transforms.query_naming(QueryNaming::OperationId);
            })
            .finalize(None)
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "the connector `Github` is invalid: `queryNaming` is only supported by OpenAPI connectors"
        );
    }
}
