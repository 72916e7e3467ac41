use std::collections::HashSet;

use super::{validate_name, TypeRef};
use crate::{auth::AuthRules, cache::CacheControl, field::FieldDefinition, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    /// A type backed by the built-in database, rendered with `@model`.
    Model,
    Object,
    Input,
    Interface,
    Union,
    Enum,
}

impl TypeKind {
    pub(crate) fn has_fields(self) -> bool {
        matches!(
            self,
            TypeKind::Model | TypeKind::Object | TypeKind::Input | TypeKind::Interface
        )
    }

    pub(crate) fn is_output(self) -> bool {
        !matches!(self, TypeKind::Input)
    }
}

/// A federation entity key: `@key(fields: "id")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirective {
    pub(crate) fields: String,
    pub(crate) resolvable: bool,
}

impl KeyDirective {
    pub fn new(fields: impl Into<String>) -> Self {
        KeyDirective {
            fields: fields.into(),
            resolvable: true,
        }
    }

    #[must_use]
    pub fn resolvable(mut self, resolvable: bool) -> Self {
        self.resolvable = resolvable;
        self
    }

    pub(crate) fn validate(&self, type_name: &str) -> Result<(), ConfigError> {
        if self.fields.trim().is_empty() {
            return Err(ConfigError::InvalidType {
                name: type_name.to_owned(),
                reason: "a key needs at least one field".to_owned(),
            });
        }

        Ok(())
    }
}

/// A named definition of the graph, built fluently and registered with
/// [`Graph::define`](super::Graph::define).
///
/// ```
/// use grafbase_schema_config::{field, Graph, TypeDefinition};
///
/// let mut graph = Graph::new();
///
/// graph
///     .define(
///         TypeDefinition::model("Post")
///             .field("title", field::string().search())
///             .field("comments", field::relation("Comment").optional().list().optional())
///             .search(),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) fields: Vec<(String, FieldDefinition)>,
    pub(crate) variants: Vec<String>,
    pub(crate) members: Vec<TypeRef>,
    pub(crate) interfaces: Vec<TypeRef>,
    pub(crate) keys: Vec<KeyDirective>,
    pub(crate) search: bool,
    pub(crate) cache: Option<CacheControl>,
    pub(crate) auth: Option<AuthRules>,
}

impl TypeDefinition {
    fn new(name: &str, kind: TypeKind) -> Self {
        TypeDefinition {
            name: name.to_owned(),
            kind,
            fields: Vec::new(),
            variants: Vec::new(),
            members: Vec::new(),
            interfaces: Vec::new(),
            keys: Vec::new(),
            search: false,
            cache: None,
            auth: None,
        }
    }

    pub fn model(name: &str) -> Self {
        Self::new(name, TypeKind::Model)
    }

    pub fn object(name: &str) -> Self {
        Self::new(name, TypeKind::Object)
    }

    pub fn input(name: &str) -> Self {
        Self::new(name, TypeKind::Input)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn enumeration<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut definition = Self::new(name, TypeKind::Enum);
        definition.variants = variants.into_iter().map(Into::into).collect();
        definition
    }

    pub fn union<I, T>(name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeRef>,
    {
        let mut definition = Self::new(name, TypeKind::Union);
        definition.members = members.into_iter().map(Into::into).collect();
        definition
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldDefinition)>,
        S: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(name, field)| (name.into(), field)));
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn key(mut self, key: KeyDirective) -> Self {
        self.keys.push(key);
        self
    }

    /// Makes every searchable field of the model searchable.
    #[must_use]
    pub fn search(mut self) -> Self {
        self.search = true;
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: CacheControl) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn auth(mut self, rules: impl FnOnce(&mut AuthRules)) -> Self {
        let mut auth = AuthRules::default();
        rules(&mut auth);
        self.auth = Some(auth);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub(crate) fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find_map(|(field_name, field)| (field_name == name).then_some(field))
    }

    pub(crate) fn check_new_field(&self, name: &str, field: &FieldDefinition) -> Result<(), ConfigError> {
        if !self.kind.has_fields() {
            return Err(self.invalid(format!("{} types cannot have fields", self.kind)));
        }

        validate_name(name, || format!("a field of `{}`", self.name))?;

        if self.get_field(name).is_some() {
            return Err(ConfigError::DuplicateField {
                type_name: self.name.clone(),
                field_name: name.to_owned(),
            });
        }

        field.validate(&self.name, name, self.kind)
    }

    pub(crate) fn push_field(&mut self, name: String, field: FieldDefinition) {
        self.fields.push((name, field));
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidType {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        validate_name(&self.name, || "a type".to_owned())?;

        match self.kind {
            TypeKind::Enum => self.validate_enum()?,
            TypeKind::Union => self.validate_union()?,
            _ => {
                let mut seen = HashSet::new();

                for (name, field) in &self.fields {
                    validate_name(name, || format!("a field of `{}`", self.name))?;

                    if !seen.insert(name.as_str()) {
                        return Err(ConfigError::DuplicateField {
                            type_name: self.name.clone(),
                            field_name: name.clone(),
                        });
                    }

                    field.validate(&self.name, name, self.kind)?;
                }
            }
        }

        let fielded_output = matches!(self.kind, TypeKind::Model | TypeKind::Object | TypeKind::Interface);

        if !self.interfaces.is_empty() && !fielded_output {
            return Err(self.invalid(format!("{} types cannot implement interfaces", self.kind)));
        }

        if let Some(interface) = self.interfaces.iter().find_map(|target| match target {
            TypeRef::Handle(handle) if handle.kind() != TypeKind::Interface => Some(handle),
            _ => None,
        }) {
            return Err(self.invalid(format!("`{}` is not an interface", interface.name())));
        }

        if !self.keys.is_empty() && !fielded_output {
            return Err(self.invalid(format!("{} types cannot have a federation key", self.kind)));
        }

        for key in &self.keys {
            key.validate(&self.name)?;
        }

        if self.search && self.kind != TypeKind::Model {
            return Err(self.invalid("`search` is only supported on models"));
        }

        if self.auth.is_some() && self.kind != TypeKind::Model {
            return Err(self.invalid("`auth` is only supported on models"));
        }

        if let Some(auth) = &self.auth {
            auth.validate()?;
        }

        if self.cache.is_some() && !matches!(self.kind, TypeKind::Model | TypeKind::Object) {
            return Err(self.invalid("`cache` is only supported on models and object types"));
        }

        if let Some(cache) = &self.cache {
            cache.validate()?;
        }

        Ok(())
    }

    fn validate_enum(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEnum {
            name: self.name.clone(),
            reason,
        };

        if self.variants.is_empty() {
            return Err(invalid("an enum needs at least one value".to_owned()));
        }

        let mut seen = HashSet::new();

        for variant in &self.variants {
            validate_name(variant, || format!("a value of `{}`", self.name))?;

            if matches!(variant.as_str(), "true" | "false" | "null") {
                return Err(invalid(format!("`{variant}` cannot be used as an enum value")));
            }

            if !seen.insert(variant.as_str()) {
                return Err(invalid(format!("the value `{variant}` is defined more than once")));
            }
        }

        Ok(())
    }

    fn validate_union(&self) -> Result<(), ConfigError> {
        let invalid = |member: &str, reason: &str| ConfigError::InvalidUnionMember {
            union_name: self.name.clone(),
            member: member.to_owned(),
            reason: reason.to_owned(),
        };

        if self.members.is_empty() {
            return Err(self.invalid("a union needs at least one member"));
        }

        let mut seen = HashSet::new();

        for member in &self.members {
            if !seen.insert(member.name()) {
                return Err(invalid(member.name(), "the member is listed more than once"));
            }

            if let TypeRef::Handle(handle) = member {
                if !matches!(handle.kind(), TypeKind::Model | TypeKind::Object) {
                    return Err(invalid(member.name(), "union members must be object types or models"));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field, Graph};

    #[test]
    fn enum_values_are_checked() {
        let error = TypeDefinition::enumeration("Color", ["RED", "RED"]).validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "the enum `Color` is invalid: the value `RED` is defined more than once"
        );

        let error = TypeDefinition::enumeration("Flag", ["true"]).validate().unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEnum { .. }));

        let error = TypeDefinition::enumeration("Empty", Vec::<String>::new())
            .validate()
            .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEnum { .. }));
    }

    #[test]
    fn union_members_must_be_object_types() {
        let mut graph = Graph::new();
        let color = graph.enum_type("Color", ["RED"]).unwrap();
        let user = graph.object("User", [("name", field::string())]).unwrap();

        let error = graph.union("Anything", [&user, &color]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "the union `Anything` cannot contain `Color`: union members must be object types or models"
        );

        let error = graph.union("Twice", [&user, &user]).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidUnionMember { .. }));
    }

    #[test]
    fn type_level_attachments_depend_on_the_kind() {
        let error = TypeDefinition::object("Address")
            .field("street", field::string())
            .search()
            .validate()
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "the type `Address` is invalid: `search` is only supported on models"
        );

        let error = TypeDefinition::input("Filter")
            .key(KeyDirective::new("id"))
            .validate()
            .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidType { .. }));
    }

    #[test]
    fn duplicate_fields_in_a_definition() {
        let error = TypeDefinition::model("User")
            .field("name", field::string())
            .field("name", field::string().optional())
            .validate()
            .unwrap_err();

        assert!(matches!(error, ConfigError::DuplicateField { .. }));
    }
}
