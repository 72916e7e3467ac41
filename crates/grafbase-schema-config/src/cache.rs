//! Response caching: `@cache` on models, types and fields, and the schema-wide rule list.

use std::{fmt, time::Duration};

use crate::{
    field::FieldKind,
    graph::{Graph, TypeKind, TypeRef},
    render::display_utils::{schema_block, DirectiveWriter, SdlValue},
    ConfigError,
};

/// Which cached entries a mutation touching the type purges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationInvalidation {
    Entity,
    List,
    Type,
    /// Purges entries tagged with the value of this field.
    Field(String),
}

impl MutationInvalidation {
    fn to_sdl(&self) -> SdlValue<'_> {
        match self {
            MutationInvalidation::Entity => SdlValue::enum_value("entity"),
            MutationInvalidation::List => SdlValue::enum_value("list"),
            MutationInvalidation::Type => SdlValue::enum_value("type"),
            MutationInvalidation::Field(field) => SdlValue::Object(vec![("field", SdlValue::from(field.as_str()))]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    Public,
    ApiKey,
    Claim(String),
    Header(String),
}

impl CacheScope {
    fn to_sdl(&self) -> SdlValue<'_> {
        match self {
            CacheScope::Public => SdlValue::enum_value("public"),
            CacheScope::ApiKey => SdlValue::enum_value("apikey"),
            CacheScope::Claim(claim) => SdlValue::Object(vec![("claim", SdlValue::from(claim.as_str()))]),
            CacheScope::Header(header) => SdlValue::Object(vec![("header", SdlValue::from(header.as_str()))]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControl {
    max_age: Duration,
    stale_while_revalidate: Option<Duration>,
    mutation_invalidation: Option<MutationInvalidation>,
    scopes: Vec<CacheScope>,
}

impl CacheControl {
    pub fn new(max_age: Duration) -> Self {
        CacheControl {
            max_age,
            stale_while_revalidate: None,
            mutation_invalidation: None,
            scopes: Vec::new(),
        }
    }

    #[must_use]
    pub fn stale_while_revalidate(mut self, duration: Duration) -> Self {
        self.stale_while_revalidate = Some(duration);
        self
    }

    #[must_use]
    pub fn mutation_invalidation(mut self, invalidation: MutationInvalidation) -> Self {
        self.mutation_invalidation = Some(invalidation);
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: CacheScope) -> Self {
        self.scopes.push(scope);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(MutationInvalidation::Field(field)) = &self.mutation_invalidation {
            if field.trim().is_empty() {
                return Err(ConfigError::InvalidCacheRule(
                    "the mutation invalidation field cannot be empty".to_owned(),
                ));
            }
        }

        let empty_scope = self.scopes.iter().any(|scope| match scope {
            CacheScope::Claim(name) | CacheScope::Header(name) => name.trim().is_empty(),
            CacheScope::Public | CacheScope::ApiKey => false,
        });

        if empty_scope {
            return Err(ConfigError::InvalidCacheRule(
                "claim and header scopes need a name".to_owned(),
            ));
        }

        Ok(())
    }

    fn arguments(&self) -> Vec<(&'static str, SdlValue<'_>)> {
        let mut arguments = vec![("maxAge", SdlValue::from(self.max_age.as_secs()))];

        if let Some(swr) = self.stale_while_revalidate {
            arguments.push(("staleWhileRevalidate", SdlValue::from(swr.as_secs())));
        }

        if let Some(invalidation) = &self.mutation_invalidation {
            arguments.push(("mutationInvalidation", invalidation.to_sdl()));
        }

        if !self.scopes.is_empty() {
            arguments.push(("scopes", SdlValue::List(self.scopes.iter().map(CacheScope::to_sdl).collect())));
        }

        arguments
    }
}

/// Renders the inline `@cache(..)` directive of a model, type or field.
impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = DirectiveWriter::new("cache", f)?;

        for (name, value) in self.arguments() {
            writer = writer.arg(name, value)?;
        }

        Ok(())
    }
}

/// A type targeted by a global cache rule, optionally narrowed to some of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTarget {
    ty: TypeRef,
    fields: Vec<String>,
}

impl CacheTarget {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        CacheTarget {
            ty: ty.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRule {
    targets: Vec<CacheTarget>,
    control: CacheControl,
}

impl CacheRule {
    pub fn new(targets: impl IntoIterator<Item = CacheTarget>, control: CacheControl) -> Self {
        CacheRule {
            targets: targets.into_iter().collect(),
            control,
        }
    }

    fn to_sdl(&self) -> SdlValue<'_> {
        let types = if self.targets.iter().all(|target| target.fields.is_empty()) {
            SdlValue::strings(self.targets.iter().map(|target| target.ty.name()))
        } else {
            let targets = self
                .targets
                .iter()
                .map(|target| {
                    let mut object = vec![("name", SdlValue::from(target.ty.name()))];

                    if !target.fields.is_empty() {
                        object.push(("fields", SdlValue::strings(target.fields.iter().map(String::as_str))));
                    }

                    SdlValue::Object(object)
                })
                .collect();

            SdlValue::List(targets)
        };

        let mut object = vec![("types", types)];
        object.extend(self.control.arguments());

        SdlValue::Object(object)
    }

    fn validate(&self, graph: &Graph) -> Result<(), ConfigError> {
        self.control.validate()?;

        if self.targets.is_empty() {
            return Err(ConfigError::InvalidCacheRule("a rule needs at least one type".to_owned()));
        }

        for target in &self.targets {
            let name = target.ty.name();

            if name == "Mutation" {
                return Err(ConfigError::InvalidCacheRule("mutations cannot be cached".to_owned()));
            }

            let definition = match (graph.resolve(&target.ty), &target.ty) {
                (Some(definition), _) => definition,
                (None, TypeRef::Handle(_)) => {
                    return Err(ConfigError::InvalidCacheRule(format!(
                        "the type `{name}` is not defined in the graph"
                    )))
                }
                // Types coming from connectors are only known to the engine.
                (None, TypeRef::Named(_)) => continue,
            };

            if let Some(missing) = target.fields.iter().find(|field| definition.get_field(field).is_none()) {
                return Err(ConfigError::InvalidCacheRule(format!(
                    "the field `{missing}` is not defined on `{name}`"
                )));
            }

            if let Some(MutationInvalidation::Field(field_name)) = &self.control.mutation_invalidation {
                if definition.kind == TypeKind::Model && field_name == "id" {
                    continue;
                }

                let Some(field) = definition.get_field(field_name) else {
                    return Err(ConfigError::InvalidCacheRule(format!(
                        "the mutation invalidation field `{field_name}` is not defined on `{name}`"
                    )));
                };

                if field.is_list() || !matches!(field.kind, FieldKind::Scalar(_)) {
                    return Err(ConfigError::InvalidCacheRule(format!(
                        "the mutation invalidation field `{name}.{field_name}` must be a scalar"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Caching rules applying to the whole schema, rendered after the auth block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalCache {
    rules: Vec<CacheRule>,
}

impl GlobalCache {
    pub fn new(rules: impl IntoIterator<Item = CacheRule>) -> Self {
        GlobalCache {
            rules: rules.into_iter().collect(),
        }
    }

    pub(crate) fn validate(&self, graph: &Graph) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::InvalidCacheRule("at least one rule is required".to_owned()));
        }

        self.rules.iter().try_for_each(|rule| rule.validate(graph))
    }
}

impl fmt::Display for GlobalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_block("cache", f)?
            .list("rules", self.rules.iter().map(CacheRule::to_sdl))?
            .finish()
    }
}
