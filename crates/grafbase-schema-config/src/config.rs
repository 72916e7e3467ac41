//! The root of a schema configuration, and the compiler producing the SDL document from it.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    auth::Auth,
    cache::GlobalCache,
    connector::{Connector, PartialConnector},
    directives::{DirectiveKind, RateLimiting, SchemaDirective},
    graph::{Graph, TypeKind},
    render::RootExtension,
    settings::SchemaSettings,
    ConfigError,
};

/// Owns the graph, the connectors, the schema-wide directives and the auth configuration of a
/// schema. [`SchemaConfig::render`] is the terminal operation producing the SDL text.
///
/// ```
/// use grafbase_schema_config::{field, Graph, Query, SchemaConfig};
///
/// let mut graph = Graph::new();
/// graph.model("Post", [("title", field::string())]).unwrap();
/// graph
///     .query(Query::new("hello").returns(field::string()).resolver("hello"))
///     .unwrap();
///
/// let config = SchemaConfig::new(graph);
///
/// assert_eq!(
///     config.render().unwrap(),
///     "extend type Query {\n  hello: String! @resolver(name: \"hello\")\n}\n\ntype Post @model {\n  title: String!\n}\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    graph: Graph,
    connectors: Vec<Connector>,
    directives: BTreeMap<DirectiveKind, SchemaDirective>,
    auth: Option<Auth>,
    cache: Option<GlobalCache>,
}

impl SchemaConfig {
    pub fn new(graph: Graph) -> Self {
        SchemaConfig {
            graph,
            ..Default::default()
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Finalizes the connector and adds it to the schema. `namespace` defaults to `true`.
    pub fn datasource(
        &mut self,
        connector: impl Into<PartialConnector>,
        namespace: Option<bool>,
    ) -> Result<&mut Self, ConfigError> {
        let connector = connector.into().finalize(namespace)?;

        if let Some(existing) = self
            .connectors
            .iter()
            .find(|existing| existing.name().eq_ignore_ascii_case(connector.name()))
        {
            return Err(ConfigError::ConnectorCollision {
                name: connector.name().to_owned(),
                existing: existing.name().to_owned(),
            });
        }

        tracing::debug!(
            name = connector.name(),
            kind = connector.kind(),
            namespace = connector.namespace(),
            "registered connector"
        );

        let namespaced = connector.namespace();
        self.connectors.push(connector);

        let flat = self
            .connectors
            .iter()
            .filter(|connector| !connector.namespace())
            .map(Connector::name)
            .collect::<Vec<_>>();

        if !namespaced && flat.len() > 1 {
            tracing::warn!(
                connectors = %flat.join(", "),
                "several connectors are not namespaced, their types may collide"
            );
        }

        Ok(self)
    }

    /// Installs a schema-wide directive, replacing the previous one of the same kind.
    pub fn directive(&mut self, directive: impl Into<SchemaDirective>) -> Result<&mut Self, ConfigError> {
        let directive = directive.into();
        directive.validate()?;

        if self.directives.insert(directive.kind(), directive).is_some() {
            tracing::debug!("replaced a schema directive");
        }

        Ok(self)
    }

    pub fn auth(&mut self, auth: Auth) -> &mut Self {
        self.auth = Some(auth);
        self
    }

    pub fn cache(&mut self, cache: GlobalCache) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    /// Installs every directive present in the settings.
    pub fn apply_settings(&mut self, settings: SchemaSettings) -> Result<&mut Self, ConfigError> {
        let SchemaSettings {
            federation,
            introspection,
            operation_limits,
            cors,
            rate_limiting,
            trusted_documents,
            experimental,
            codegen,
        } = settings;

        let rate_limiting = rate_limiting.map(RateLimiting::try_from).transpose()?;

        let directives = [
            federation.map(SchemaDirective::from),
            introspection.map(SchemaDirective::from),
            operation_limits.map(SchemaDirective::from),
            cors.map(SchemaDirective::from),
            rate_limiting.map(SchemaDirective::from),
            trusted_documents.map(SchemaDirective::from),
            experimental.map(SchemaDirective::from),
            codegen.map(SchemaDirective::from),
        ];

        for directive in directives.into_iter().flatten() {
            self.directive(directive)?;
        }

        Ok(self)
    }

    /// Renders the whole schema to SDL. Fails without producing any text if the configuration
    /// is invalid, for example when a reference points to a type that was never defined.
    #[tracing::instrument(skip_all)]
    pub fn render(&self) -> Result<String, ConfigError> {
        self.graph.validate()?;
        self.validate_auth()?;

        if let Some(cache) = &self.cache {
            cache.validate(&self.graph)?;
        }

        let mut sections: Vec<String> = self.directives.values().map(ToString::to_string).collect();

        if !self.connectors.is_empty() {
            sections.push(format!("extend schema\n{}", self.connectors.iter().join("\n")));
        }

        for kind in [TypeKind::Interface, TypeKind::Enum, TypeKind::Input, TypeKind::Object] {
            sections.extend(self.definitions_of(kind));
        }

        sections.extend(self.graph.extensions().iter().map(ToString::to_string));

        if self.graph.queries().next().is_some() {
            sections.push(
                RootExtension {
                    root: "Query",
                    fields: self.graph.queries(),
                }
                .to_string(),
            );
        }

        if self.graph.mutations().next().is_some() {
            sections.push(
                RootExtension {
                    root: "Mutation",
                    fields: self.graph.mutations(),
                }
                .to_string(),
            );
        }

        for kind in [TypeKind::Union, TypeKind::Model] {
            sections.extend(self.definitions_of(kind));
        }

        sections.extend(self.auth.iter().map(ToString::to_string));
        sections.extend(self.cache.iter().map(ToString::to_string));

        tracing::debug!(
            directives = self.directives.len(),
            connectors = self.connectors.len(),
            types = self.graph.definitions().count(),
            queries = self.graph.queries().len(),
            mutations = self.graph.mutations().len(),
            "rendered schema"
        );

        if sections.is_empty() {
            return Ok(String::new());
        }

        let mut sdl = sections.join("\n\n");
        sdl.push('\n');

        Ok(sdl)
    }

    fn definitions_of(&self, kind: TypeKind) -> impl Iterator<Item = String> + '_ {
        self.graph
            .definitions()
            .filter(move |definition| definition.kind == kind)
            .map(ToString::to_string)
    }

    /// Rules attached to models and fields are evaluated against the global providers.
    fn validate_auth(&self) -> Result<(), ConfigError> {
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }

        let needs_provider = self.graph.definitions().any(|definition| {
            definition.auth.as_ref().is_some_and(|rules| rules.needs_provider())
                || definition
                    .fields
                    .iter()
                    .any(|(_, field)| field.auth.as_ref().is_some_and(|rules| rules.needs_provider()))
        });

        if needs_provider && !self.auth.as_ref().is_some_and(Auth::has_providers) {
            return Err(ConfigError::InvalidAuth(
                "types and fields use rules other than `public`, but no auth provider is configured".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{connector, directives::Introspection, field, AuthProvider, AuthRules, Federation};

    #[test]
    fn empty_schema_renders_nothing() {
        assert_eq!(SchemaConfig::default().render().unwrap(), "");
    }

    #[test]
    fn sections_follow_the_fixed_order() {
        let mut graph = Graph::new();
        graph.model("User", [("name", field::string())]).unwrap();
        graph.object("Address", [("street", field::string())]).unwrap();
        graph.enum_type("Role", ["ADMIN", "USER"]).unwrap();

        let mut config = SchemaConfig::new(graph);
        config
            .directive(Introspection { enable: true })
            .unwrap()
            .directive(Federation::default())
            .unwrap();
        config.datasource(connector::postgres("Pg").url("postgres://localhost/db"), None).unwrap();

        assert_eq!(
            config.render().unwrap(),
            indoc! {r#"
                extend schema @federation(version: "2.3")

                extend schema @introspection(enable: true)

                extend schema
                  @postgres(
                    name: "Pg"
                    url: "postgres://localhost/db"
                    namespace: true
                  )

                enum Role {
                  ADMIN
                  USER
                }

                type Address {
                  street: String!
                }

                type User @model {
                  name: String!
                }
            "#}
        );
    }

    #[test]
    fn directives_of_the_same_kind_are_replaced() {
        let mut config = SchemaConfig::default();
        config.directive(Introspection { enable: true }).unwrap();
        config.directive(Introspection { enable: false }).unwrap();

        assert_eq!(config.render().unwrap(), "extend schema @introspection(enable: false)\n");
    }

    #[test]
    fn connector_names_collide_case_insensitively() {
        let mut config = SchemaConfig::default();
        config
            .datasource(connector::graphql("Github").url("https://api.github.com/graphql"), None)
            .unwrap();

        let error = config
            .datasource(connector::graphql("github").url("https://example.com/graphql"), Some(false))
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "the connector name `github` collides with the connector `Github`"
        );
    }

    #[test]
    fn model_rules_need_a_provider() {
        let mut graph = Graph::new();
        graph
            .define(
                crate::TypeDefinition::model("Secret")
                    .field("value", field::string())
                    .auth(|rules: &mut AuthRules| {
                        rules.private();
                    }),
            )
            .unwrap();

        let mut config = SchemaConfig::new(graph);
        assert!(matches!(config.render(), Err(ConfigError::InvalidAuth(_))));

        config.auth(Auth::new([AuthProvider::oidc("https://example.com")]));
        config.render().unwrap();
    }

    #[test]
    fn invalid_graphs_render_nothing() {
        let mut graph = Graph::new();
        graph.model("Post", [("author", field::relation("User"))]).unwrap();

        let error = SchemaConfig::new(graph).render().unwrap_err();
        assert!(matches!(error, ConfigError::UnresolvedReference { .. }), "{error}");
    }
}
