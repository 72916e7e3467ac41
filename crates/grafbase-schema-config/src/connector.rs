//! Connectors to upstream data sources.
//!
//! Connectors are built in two phases: a partial builder collects the parameters, and
//! `finalize` decides the namespace and checks everything, producing the connector added to the
//! schema. Connectors are namespaced unless told otherwise.

mod graphql;
mod headers;
mod openapi;
mod postgres;

use std::{fmt, sync::OnceLock};

use regex::Regex;

pub use self::{
    graphql::{GraphQlConnector, PartialGraphQl},
    headers::{ConnectorHeaders, HeaderValue},
    openapi::{OpenApiConnector, PartialOpenApi},
    postgres::{PartialNeon, PartialPostgres, PostgresConnector},
};
use crate::{env::has_placeholder, render::display_utils::SdlValue, ConfigError};

fn connector_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("must be valid"))
}

fn invalid(connector: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConnector {
        name: connector.to_owned(),
        reason: reason.into(),
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if !connector_name_regex().is_match(name) {
        return Err(invalid(
            name,
            "names must start with a letter or an underscore, followed by letters, digits or underscores",
        ));
    }

    Ok(())
}

/// Checks `url` is absolute and uses one of `schemes`. Values with placeholders are only known
/// to the engine.
fn validate_url(connector: &str, argument: &str, url: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    if has_placeholder(url) {
        return Ok(());
    }

    let parsed =
        url::Url::parse(url).map_err(|err| invalid(connector, format!("the {argument} `{url}` is not valid: {err}")))?;

    if !schemes.contains(&parsed.scheme()) {
        return Err(invalid(
            connector,
            format!("the {argument} `{url}` must use one of the schemes {}", schemes.join(", ")),
        ));
    }

    Ok(())
}

fn required(connector: &str, argument: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| invalid(connector, format!("the {argument} is missing")))
}

/// How the OpenAPI connector names the fields of the generated query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryNaming {
    /// Names taken from the schemas the operations return, falling back to the operation id.
    SchemaName,
    OperationId,
}

/// Changes applied to the upstream schema before it is exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transforms {
    exclude: Vec<String>,
    query_naming: Option<QueryNaming>,
}

impl Transforms {
    /// Hides a field from the exposed schema, given as a `Type.field` path. `*` matches any
    /// type or field.
    pub fn exclude(&mut self, path: impl Into<String>) -> &mut Self {
        self.exclude.push(path.into());
        self
    }

    pub fn query_naming(&mut self, naming: QueryNaming) -> &mut Self {
        self.query_naming = Some(naming);
        self
    }

    fn validate(&self, connector: &str) -> Result<(), ConfigError> {
        if let Some(path) = self.exclude.iter().find(|path| path.split('.').any(str::is_empty)) {
            return Err(invalid(connector, format!("`{path}` is not a valid exclude path")));
        }

        Ok(())
    }

    fn to_sdl(&self) -> Option<SdlValue<'_>> {
        let mut object = Vec::new();

        if !self.exclude.is_empty() {
            object.push(("exclude", SdlValue::strings(self.exclude.iter().map(String::as_str))));
        }

        if let Some(naming) = self.query_naming {
            object.push(("queryNaming", SdlValue::enum_value(naming.to_string())));
        }

        (!object.is_empty()).then_some(SdlValue::Object(object))
    }
}

/// A connector waiting for its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialConnector {
    Postgres(PartialPostgres),
    Neon(PartialNeon),
    GraphQl(PartialGraphQl),
    OpenApi(PartialOpenApi),
}

impl PartialConnector {
    /// Builds the connector. `namespace` defaults to `true`.
    pub fn finalize(self, namespace: Option<bool>) -> Result<Connector, ConfigError> {
        match self {
            PartialConnector::Postgres(partial) => partial.finalize(namespace).map(Connector::Postgres),
            PartialConnector::Neon(partial) => partial.finalize(namespace).map(Connector::Postgres),
            PartialConnector::GraphQl(partial) => partial.finalize(namespace).map(Connector::GraphQl),
            PartialConnector::OpenApi(partial) => partial.finalize(namespace).map(Connector::OpenApi),
        }
    }
}

impl From<PartialPostgres> for PartialConnector {
    fn from(partial: PartialPostgres) -> Self {
        PartialConnector::Postgres(partial)
    }
}

impl From<PartialNeon> for PartialConnector {
    fn from(partial: PartialNeon) -> Self {
        PartialConnector::Neon(partial)
    }
}

impl From<PartialGraphQl> for PartialConnector {
    fn from(partial: PartialGraphQl) -> Self {
        PartialConnector::GraphQl(partial)
    }
}

impl From<PartialOpenApi> for PartialConnector {
    fn from(partial: PartialOpenApi) -> Self {
        PartialConnector::OpenApi(partial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connector {
    Postgres(PostgresConnector),
    GraphQl(GraphQlConnector),
    OpenApi(OpenApiConnector),
}

impl Connector {
    pub fn name(&self) -> &str {
        match self {
            Connector::Postgres(connector) => &connector.name,
            Connector::GraphQl(connector) => &connector.name,
            Connector::OpenApi(connector) => &connector.name,
        }
    }

    /// Whether the types of the connector are nested under its name.
    pub fn namespace(&self) -> bool {
        match self {
            Connector::Postgres(connector) => connector.namespace,
            Connector::GraphQl(connector) => connector.namespace,
            Connector::OpenApi(connector) => connector.namespace,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Connector::Postgres(_) => "postgres",
            Connector::GraphQl(_) => "graphql",
            Connector::OpenApi(_) => "openapi",
        }
    }
}

/// Renders the directive of the connector, indented to sit under an `extend schema` header.
impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::Postgres(connector) => connector.fmt(f),
            Connector::GraphQl(connector) => connector.fmt(f),
            Connector::OpenApi(connector) => connector.fmt(f),
        }
    }
}

pub fn postgres(name: impl Into<String>) -> PartialPostgres {
    PartialPostgres::new(name)
}

pub fn neon(name: impl Into<String>) -> PartialNeon {
    PartialNeon::new(name)
}

pub fn graphql(name: impl Into<String>) -> PartialGraphQl {
    PartialGraphQl::new(name)
}

pub fn openapi(name: impl Into<String>) -> PartialOpenApi {
    PartialOpenApi::new(name)
}
