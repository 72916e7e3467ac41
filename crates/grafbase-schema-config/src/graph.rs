mod definition;
mod validate;

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

pub use self::definition::{KeyDirective, TypeDefinition, TypeKind};
use crate::{
    field::FieldDefinition,
    query::{Query, TypeExtension},
    ConfigError,
};

/// Position of a definition in its graph, in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// A handle to a definition registered in a [`Graph`], usable as a field or union target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    id: TypeId,
    name: String,
    kind: TypeKind,
}

impl TypeHandle {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }
}

/// A reference to a type, resolved when the schema is rendered.
///
/// Handles point to definitions that already exist. Names allow pointing at a definition made
/// later in the same graph, which is how mutually recursive models are declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Handle(TypeHandle),
    Named(String),
}

impl TypeRef {
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Handle(handle) => handle.name(),
            TypeRef::Named(name) => name,
        }
    }
}

impl From<TypeHandle> for TypeRef {
    fn from(handle: TypeHandle) -> Self {
        TypeRef::Handle(handle)
    }
}

impl From<&TypeHandle> for TypeRef {
    fn from(handle: &TypeHandle) -> Self {
        TypeRef::Handle(handle.clone())
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Named(name.to_owned())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Named(name)
    }
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[_A-Za-z][_0-9A-Za-z]*$").expect("must be valid"))
}

pub(crate) fn validate_name(name: &str, location: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if !name_regex().is_match(name) || name.starts_with("__") {
        return Err(ConfigError::InvalidName {
            name: name.to_owned(),
            location: location(),
        });
    }

    Ok(())
}

/// The registry of every type of the schema, with the root fields and type extensions bound to
/// resolvers. Definitions render in the order they were registered.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    types: IndexMap<String, TypeDefinition>,
    queries: IndexMap<String, Query>,
    mutations: IndexMap<String, Query>,
    extensions: Vec<TypeExtension>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition built with [`TypeDefinition`].
    pub fn define(&mut self, definition: TypeDefinition) -> Result<TypeHandle, ConfigError> {
        definition.validate()?;

        if self.types.contains_key(&definition.name) {
            return Err(ConfigError::DuplicateType { name: definition.name });
        }

        tracing::debug!(name = %definition.name, kind = %definition.kind, "registered type");

        let handle = TypeHandle {
            id: TypeId(self.types.len()),
            name: definition.name.clone(),
            kind: definition.kind,
        };

        self.types.insert(definition.name.clone(), definition);

        Ok(handle)
    }

    /// Registers a type of any kind carrying fields: a model, an object type, an input or an
    /// interface. Enums and unions have their own constructors.
    pub fn define_type<I, S>(&mut self, name: &str, kind: TypeKind, fields: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        let definition = match kind {
            TypeKind::Model => TypeDefinition::model(name),
            TypeKind::Object => TypeDefinition::object(name),
            TypeKind::Input => TypeDefinition::input(name),
            TypeKind::Interface => TypeDefinition::interface(name),
            TypeKind::Enum | TypeKind::Union => {
                return Err(ConfigError::InvalidType {
                    name: name.to_owned(),
                    reason: format!("{kind} types cannot be defined with fields"),
                })
            }
        };

        self.define(definition.fields(fields))
    }

    pub fn model<I, S>(&mut self, name: &str, fields: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        self.define_type(name, TypeKind::Model, fields)
    }

    pub fn object<I, S>(&mut self, name: &str, fields: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        self.define_type(name, TypeKind::Object, fields)
    }

    pub fn input<I, S>(&mut self, name: &str, fields: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        self.define_type(name, TypeKind::Input, fields)
    }

    pub fn interface<I, S>(&mut self, name: &str, fields: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        self.define_type(name, TypeKind::Interface, fields)
    }

    pub fn enum_type<I, S>(&mut self, name: &str, variants: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.define(TypeDefinition::enumeration(name, variants))
    }

    pub fn union<I, T>(&mut self, name: &str, members: I) -> Result<TypeHandle, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeRef>,
    {
        self.define(TypeDefinition::union(name, members))
    }

    /// Appends a field to a registered type. The field renders after the existing ones.
    pub fn add_field(
        &mut self,
        handle: &TypeHandle,
        name: impl Into<String>,
        field: FieldDefinition,
    ) -> Result<(), ConfigError> {
        let definition = self.definition_mut(handle)?;
        let name = name.into();

        definition.check_new_field(&name, &field)?;
        definition.push_field(name, field);

        Ok(())
    }

    /// Adds a field to `Query`, resolved by the query's resolver.
    pub fn query(&mut self, query: Query) -> Result<(), ConfigError> {
        let query = query.finish("Query")?;

        if self.queries.contains_key(&query.name) {
            return Err(ConfigError::DuplicateRootField {
                root: "query",
                name: query.name,
            });
        }

        tracing::debug!(name = %query.name, "registered query");
        self.queries.insert(query.name.clone(), query);

        Ok(())
    }

    /// Adds a field to `Mutation`, resolved by the mutation's resolver.
    pub fn mutation(&mut self, mutation: Query) -> Result<(), ConfigError> {
        let mutation = mutation.finish("Mutation")?;

        if self.mutations.contains_key(&mutation.name) {
            return Err(ConfigError::DuplicateRootField {
                root: "mutation",
                name: mutation.name,
            });
        }

        tracing::debug!(name = %mutation.name, "registered mutation");
        self.mutations.insert(mutation.name.clone(), mutation);

        Ok(())
    }

    /// Extends a type of this graph, or a type introspected from a connector when given a name,
    /// with resolver fields or federation keys.
    pub fn extend(
        &mut self,
        target: impl Into<TypeRef>,
        extension: impl FnOnce(&mut TypeExtension),
    ) -> Result<(), ConfigError> {
        let mut ext = TypeExtension::new(target.into());
        extension(&mut ext);
        ext.validate()?;

        tracing::debug!(target = %ext.target.name(), "registered type extension");
        self.extensions.push(ext);

        Ok(())
    }

    /// Drops every definition. Handles created before become unresolvable.
    pub fn clear(&mut self) {
        self.types.clear();
        self.queries.clear();
        self.mutations.clear();
        self.extensions.clear();
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.queries.is_empty() && self.mutations.is_empty() && self.extensions.is_empty()
    }

    pub(crate) fn definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub(crate) fn queries(&self) -> impl ExactSizeIterator<Item = &Query> + Clone {
        self.queries.values()
    }

    pub(crate) fn mutations(&self) -> impl ExactSizeIterator<Item = &Query> + Clone {
        self.mutations.values()
    }

    pub(crate) fn extensions(&self) -> &[TypeExtension] {
        &self.extensions
    }

    /// Finds the definition a reference points to.
    pub(crate) fn resolve(&self, target: &TypeRef) -> Option<&TypeDefinition> {
        match target {
            TypeRef::Handle(handle) => self
                .types
                .get_index(handle.id.0)
                .map(|(_, definition)| definition)
                .filter(|definition| definition.name == handle.name),
            TypeRef::Named(name) => self.types.get(name),
        }
    }

    fn definition_mut(&mut self, handle: &TypeHandle) -> Result<&mut TypeDefinition, ConfigError> {
        self.types
            .get_index_mut(handle.id.0)
            .map(|(_, definition)| definition)
            .filter(|definition| definition.name == handle.name)
            .ok_or_else(|| ConfigError::InvalidType {
                name: handle.name.clone(),
                reason: "the type is not registered in this graph".to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[test]
    fn duplicate_types_are_rejected() {
        let mut graph = Graph::new();
        graph.model("Post", [("title", field::string())]).unwrap();

        let error = graph.object("Post", [("body", field::string())]).unwrap_err();

        assert!(matches!(error, ConfigError::DuplicateType { ref name } if name == "Post"));
        assert_eq!(error.to_string(), "the type `Post` is defined more than once");
    }

    #[test]
    fn handles_resolve_to_their_definition() {
        let mut graph = Graph::new();
        let post = graph.model("Post", [("title", field::string())]).unwrap();

        assert_eq!(post.kind(), TypeKind::Model);
        assert_eq!(graph.resolve(&TypeRef::from(&post)).map(|d| d.name()), Some("Post"));
        assert_eq!(graph.resolve(&TypeRef::from("Post")).map(|d| d.name()), Some("Post"));
        assert!(graph.resolve(&TypeRef::from("Comment")).is_none());

        graph.clear();
        assert!(graph.is_empty());
        assert!(graph.resolve(&TypeRef::from(&post)).is_none());
    }

    #[test]
    fn fields_can_be_appended() {
        let mut graph = Graph::new();
        let user = graph.model("User", [("name", field::string())]).unwrap();

        graph.add_field(&user, "email", field::email().unique()).unwrap();

        let error = graph.add_field(&user, "name", field::string()).unwrap_err();
        assert_eq!(error.to_string(), "the field `name` is defined more than once on `User`");

        let names: Vec<_> = graph.get("User").unwrap().field_names().collect();
        assert_eq!(names, ["name", "email"]);
    }

    #[test]
    fn enums_and_unions_need_their_own_constructors() {
        let mut graph = Graph::new();

        let error = graph
            .define_type("Color", TypeKind::Enum, [("red", field::string())])
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "the type `Color` is invalid: enum types cannot be defined with fields"
        );
    }

    #[test]
    fn names_are_validated() {
        let mut graph = Graph::new();

        let error = graph.model("my-model", [("title", field::string())]).unwrap_err();
        assert_eq!(error.to_string(), "`my-model` is not a valid GraphQL name for a type");

        let error = graph.model("Post", [("__typename", field::string())]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "`__typename` is not a valid GraphQL name for a field of `Post`"
        );
    }
}
