//! Checks run before rendering, once every forward reference can be resolved.

use std::collections::{HashMap, HashSet};

use super::{Graph, TypeDefinition, TypeKind, TypeRef};
use crate::{
    field::{FieldDefinition, FieldKind},
    query::Query,
    ConfigError,
};

fn duplicate_extension_field(target: &str, field_name: &str) -> ConfigError {
    let root = match target {
        "Query" => "query",
        "Mutation" => "mutation",
        _ => {
            return ConfigError::DuplicateField {
                type_name: target.to_owned(),
                field_name: field_name.to_owned(),
            }
        }
    };

    ConfigError::DuplicateRootField {
        root,
        name: field_name.to_owned(),
    }
}

impl Graph {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for definition in self.definitions() {
            self.validate_definition(definition)?;
        }

        for query in self.queries() {
            self.validate_resolver_field("Query", query)?;
        }

        for mutation in self.mutations() {
            self.validate_resolver_field("Mutation", mutation)?;
        }

        // Fields already present on each extended type, root fields included.
        let mut extended: HashMap<&str, HashSet<&str>> = HashMap::from([
            ("Query", self.queries().map(|query| query.name.as_str()).collect()),
            ("Mutation", self.mutations().map(|mutation| mutation.name.as_str()).collect()),
        ]);

        for extension in self.extensions() {
            let target = self.resolve(&extension.target);

            if let TypeRef::Handle(handle) = &extension.target {
                if target.is_none() {
                    return Err(ConfigError::InvalidType {
                        name: handle.name().to_owned(),
                        reason: "the extended type is not defined in the graph".to_owned(),
                    });
                }
            }

            let seen = extended.entry(extension.target.name()).or_default();

            for field in &extension.fields {
                let defined = target.is_some_and(|definition| definition.get_field(&field.name).is_some());

                if defined || !seen.insert(field.name.as_str()) {
                    return Err(duplicate_extension_field(extension.target.name(), &field.name));
                }
            }

            for field in &extension.fields {
                self.validate_resolver_field(extension.target.name(), field)?;
            }
        }

        Ok(())
    }

    fn validate_definition(&self, definition: &TypeDefinition) -> Result<(), ConfigError> {
        for (field_name, field) in &definition.fields {
            self.validate_field(&definition.name, field_name, definition.kind, field)?;

            if let Some(scope) = &field.unique {
                if let Some(missing) = scope.iter().find(|name| definition.get_field(name).is_none()) {
                    return Err(ConfigError::InvalidModifier {
                        type_name: definition.name.clone(),
                        field_name: field_name.clone(),
                        reason: format!("the unique scope field `{missing}` is not defined on the type"),
                    });
                }
            }
        }

        for interface in &definition.interfaces {
            match self.resolve(interface) {
                Some(target) if target.kind == TypeKind::Interface => (),
                Some(_) => {
                    return Err(ConfigError::InvalidType {
                        name: definition.name.clone(),
                        reason: format!("`{}` is not an interface", interface.name()),
                    })
                }
                None => {
                    return Err(ConfigError::InvalidType {
                        name: definition.name.clone(),
                        reason: format!("the interface `{}` is not defined in the graph", interface.name()),
                    })
                }
            }
        }

        for member in &definition.members {
            let reason = match self.resolve(member) {
                Some(target) if matches!(target.kind, TypeKind::Model | TypeKind::Object) => continue,
                Some(_) => "union members must be object types or models",
                None => "the member is not defined in the graph",
            };

            return Err(ConfigError::InvalidUnionMember {
                union_name: definition.name.clone(),
                member: member.name().to_owned(),
                reason: reason.to_owned(),
            });
        }

        Ok(())
    }

    fn validate_resolver_field(&self, parent: &str, field: &Query) -> Result<(), ConfigError> {
        let path = format!("{parent}.{}", field.name);

        for (name, argument) in &field.arguments {
            self.validate_field(&path, name, TypeKind::Input, argument)?;
        }

        if let Some(returns) = &field.returns {
            self.validate_field(parent, &field.name, TypeKind::Object, returns)?;
        }

        Ok(())
    }

    fn validate_field(
        &self,
        type_name: &str,
        field_name: &str,
        owner_kind: TypeKind,
        field: &FieldDefinition,
    ) -> Result<(), ConfigError> {
        let Some(target) = field.kind.target() else {
            return Ok(());
        };

        let Some(definition) = self.resolve(target) else {
            return Err(ConfigError::UnresolvedReference {
                type_name: type_name.to_owned(),
                field_name: field_name.to_owned(),
                target: target.name().to_owned(),
            });
        };

        let target_error = |reason: &str| ConfigError::InvalidReferenceTarget {
            type_name: type_name.to_owned(),
            field_name: field_name.to_owned(),
            target: target.name().to_owned(),
            reason: reason.to_owned(),
        };

        match (&field.kind, owner_kind, definition.kind) {
            (FieldKind::Relation { .. }, _, TypeKind::Model) => (),
            (FieldKind::Relation { .. }, _, _) => return Err(target_error("relations must point to a model")),
            (_, TypeKind::Input, TypeKind::Input | TypeKind::Enum) => (),
            (_, TypeKind::Input, _) => return Err(target_error("input fields can only reference inputs and enums")),
            (_, owner, TypeKind::Input) if owner.is_output() => {
                return Err(target_error("output fields cannot reference input types"))
            }
            _ => (),
        }

        let Some(default) = &field.default else {
            return Ok(());
        };

        let default_error = |reason: String| ConfigError::InvalidDefault {
            type_name: type_name.to_owned(),
            field_name: field_name.to_owned(),
            reason,
        };

        if definition.kind != TypeKind::Enum {
            return Err(default_error(format!(
                "only enum types can have a default value, and `{}` is a {}",
                definition.name, definition.kind
            )));
        }

        if let Some(variant) = default
            .enum_variants()
            .into_iter()
            .find(|variant| !definition.variants.iter().any(|known| known == variant))
        {
            return Err(default_error(format!(
                "`{variant}` is not a value of the enum `{}`",
                definition.name
            )));
        }

        Ok(())
    }
}
