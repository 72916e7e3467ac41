use std::{collections::HashSet, mem};

use crate::{
    field::FieldDefinition,
    graph::{validate_name, KeyDirective, TypeKind, TypeRef},
    ConfigError,
};

/// A field resolved by a resolver file: a root query or mutation, or a field added to an
/// existing type with [`Graph::extend`](crate::Graph::extend).
///
/// ```
/// use grafbase_schema_config::{field, Graph, Query};
///
/// let mut graph = Graph::new();
///
/// graph
///     .query(
///         Query::new("hello")
///             .argument("name", field::string().optional())
///             .returns(field::string())
///             .resolver("hello"),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) name: String,
    pub(crate) arguments: Vec<(String, FieldDefinition)>,
    pub(crate) returns: Option<FieldDefinition>,
    pub(crate) resolver: Option<String>,
}

impl Query {
    pub fn new(name: impl Into<String>) -> Self {
        Query {
            name: name.into(),
            arguments: Vec::new(),
            returns: None,
            resolver: None,
        }
    }

    /// Adds an argument. Arguments render in the order they were added.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, argument: FieldDefinition) -> Self {
        self.arguments.push((name.into(), argument));
        self
    }

    #[must_use]
    pub fn returns(mut self, returns: FieldDefinition) -> Self {
        self.returns = Some(returns);
        self
    }

    #[must_use]
    pub fn resolver(mut self, name: impl Into<String>) -> Self {
        self.resolver = Some(name.into());
        self
    }

    /// Checks the field and moves the resolver to the return type, where it renders.
    pub(crate) fn finish(mut self, parent: &str) -> Result<Self, ConfigError> {
        validate_name(&self.name, || format!("a field of `{parent}`"))?;

        let name = self.name.clone();
        let invalid = |reason: &str| ConfigError::InvalidModifier {
            type_name: parent.to_owned(),
            field_name: name.clone(),
            reason: reason.to_owned(),
        };

        let Some(resolver) = self.resolver.clone() else {
            return Err(invalid("a resolver field needs a resolver"));
        };

        let Some(returns) = self.returns.take() else {
            return Err(invalid("a resolver field needs a return type"));
        };

        if returns.default.is_some() {
            return Err(invalid("a resolver field cannot have a default value"));
        }

        returns.validate(parent, &self.name, TypeKind::Object)?;
        self.returns = Some(returns.resolver(resolver));

        let path = format!("{parent}.{}", self.name);
        let mut seen = HashSet::new();

        for (name, argument) in &self.arguments {
            validate_name(name, || format!("an argument of `{path}`"))?;

            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    type_name: path.clone(),
                    field_name: name.clone(),
                });
            }

            argument.validate(&path, name, TypeKind::Input)?;
        }

        Ok(self)
    }
}

/// Fields and keys added to an existing type, rendered as `extend type`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExtension {
    pub(crate) target: TypeRef,
    pub(crate) fields: Vec<Query>,
    pub(crate) keys: Vec<KeyDirective>,
}

impl TypeExtension {
    pub(crate) fn new(target: TypeRef) -> Self {
        TypeExtension {
            target,
            fields: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: Query) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn key(&mut self, key: KeyDirective) -> &mut Self {
        self.keys.push(key);
        self
    }

    pub(crate) fn validate(&mut self) -> Result<(), ConfigError> {
        let target = self.target.name().to_owned();
        validate_name(&target, || "an extended type".to_owned())?;

        let invalid = |reason: String| ConfigError::InvalidType {
            name: target.clone(),
            reason,
        };

        if let TypeRef::Handle(handle) = &self.target {
            if !matches!(handle.kind(), TypeKind::Model | TypeKind::Object | TypeKind::Interface) {
                return Err(invalid(format!("{} types cannot be extended", handle.kind())));
            }
        }

        if self.fields.is_empty() && self.keys.is_empty() {
            return Err(invalid("an extension needs at least one field or key".to_owned()));
        }

        for key in &self.keys {
            key.validate(&target)?;
        }

        let mut seen = HashSet::new();

        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    type_name: target.clone(),
                    field_name: field.name.clone(),
                });
            }
        }

        self.fields = mem::take(&mut self.fields)
            .into_iter()
            .map(|field| field.finish(&target))
            .collect::<Result<_, _>>()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field, Graph};

    #[test]
    fn queries_need_a_resolver_and_a_return_type() {
        let mut graph = Graph::new();

        let error = graph.query(Query::new("hello").returns(field::string())).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid modifier on `Query.hello`: a resolver field needs a resolver"
        );

        let error = graph.mutation(Query::new("create").resolver("create")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid modifier on `Mutation.create`: a resolver field needs a return type"
        );
    }

    #[test]
    fn duplicate_root_fields() {
        let mut graph = Graph::new();
        let hello = Query::new("hello").returns(field::string()).resolver("hello");

        graph.query(hello.clone()).unwrap();
        graph.mutation(hello.clone()).unwrap();

        let error = graph.query(hello).unwrap_err();
        assert_eq!(error.to_string(), "the query field `hello` is defined more than once");
    }

    #[test]
    fn arguments_are_input_positions() {
        let mut graph = Graph::new();

        let error = graph
            .query(
                Query::new("search")
                    .argument("term", field::string().resolver("nope"))
                    .returns(field::string())
                    .resolver("search"),
            )
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "invalid modifier on `Query.search.term`: `resolver` is not supported on input fields"
        );
    }

    #[test]
    fn extensions_need_content() {
        let mut graph = Graph::new();

        let error = graph.extend("StripeCustomer", |_| ()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "the type `StripeCustomer` is invalid: an extension needs at least one field or key"
        );

        graph
            .extend("StripeCustomer", |extension| {
                extension.add_field(Query::new("note").returns(field::string()).resolver("note"));
            })
            .unwrap();
    }
}
