//! Field shapes: a base kind, the list and nullability wrappers applied to it, and the
//! attachments rendered as field directives.
//!
//! Modifiers compose left to right. Fields start required; [`FieldDefinition::optional`] makes the
//! outermost layer nullable and [`FieldDefinition::list`] wraps the current shape in a required
//! list:
//!
//! ```
//! use grafbase_schema_config::field;
//!
//! // [Comment]
//! let comments = field::relation("Comment").optional().list().optional();
//! // [Comment!]!
//! let required = field::relation("Comment").list();
//! # let _ = (comments, required);
//! ```

use std::borrow::Cow;

use wrapping::Wrapping;

use crate::{
    auth::AuthRules,
    cache::CacheControl,
    graph::{TypeKind, TypeRef},
    render::display_utils::SdlValue,
    ConfigError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum ScalarType {
    String,
    #[strum(serialize = "ID")]
    Id,
    Email,
    Int,
    Float,
    Boolean,
    Date,
    DateTime,
    #[strum(serialize = "IPAddress")]
    IpAddress,
    Timestamp,
    #[strum(serialize = "URL")]
    Url,
    #[strum(serialize = "JSON")]
    Json,
    PhoneNumber,
    Decimal,
    Bytes,
    BigInt,
}

impl ScalarType {
    fn is_string_like(self) -> bool {
        matches!(
            self,
            ScalarType::String
                | ScalarType::Id
                | ScalarType::Email
                | ScalarType::Date
                | ScalarType::DateTime
                | ScalarType::IpAddress
                | ScalarType::Url
                | ScalarType::PhoneNumber
                | ScalarType::Decimal
                | ScalarType::Bytes
        )
    }

    fn accepts(self, value: &DefaultValue) -> bool {
        match (self, value) {
            // SDL has no literal for NaN or infinity.
            (_, DefaultValue::Float(f)) if !f.is_finite() => false,
            (ScalarType::Json, _) => true,
            (scalar, DefaultValue::String(_)) => scalar.is_string_like() || scalar == ScalarType::BigInt,
            (ScalarType::Int | ScalarType::Timestamp | ScalarType::BigInt | ScalarType::Float, DefaultValue::Int(_)) => {
                true
            }
            (ScalarType::Float, DefaultValue::Float(_)) => true,
            (ScalarType::Boolean, DefaultValue::Boolean(_)) => true,
            _ => false,
        }
    }
}

/// A default value attached with [`FieldDefinition::default`].
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    /// A variant of the referenced enum, written bare.
    Enum(String),
    List(Vec<DefaultValue>),
}

impl DefaultValue {
    pub fn enum_value(variant: impl Into<String>) -> Self {
        DefaultValue::Enum(variant.into())
    }

    pub(crate) fn to_sdl(&self) -> SdlValue<'_> {
        match self {
            DefaultValue::String(s) => SdlValue::String(Cow::Borrowed(s)),
            DefaultValue::Int(i) => SdlValue::Int(*i),
            DefaultValue::Float(f) => SdlValue::Float(*f),
            DefaultValue::Boolean(b) => SdlValue::Boolean(*b),
            DefaultValue::Enum(variant) => SdlValue::enum_value(variant.as_str()),
            DefaultValue::List(values) => SdlValue::List(values.iter().map(DefaultValue::to_sdl).collect()),
        }
    }

    /// Every enum variant mentioned, lists included.
    pub(crate) fn enum_variants(&self) -> Vec<&str> {
        match self {
            DefaultValue::Enum(variant) => vec![variant.as_str()],
            DefaultValue::List(values) => values.iter().flat_map(DefaultValue::enum_variants).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::String(value.to_owned())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::String(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Int(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Int(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Boolean(value)
    }
}

impl<T: Into<DefaultValue>> From<Vec<T>> for DefaultValue {
    fn from(values: Vec<T>) -> Self {
        DefaultValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldKind {
    Scalar(ScalarType),
    Reference(TypeRef),
    Relation { target: TypeRef, name: Option<String> },
}

impl FieldKind {
    pub(crate) fn type_name(&self) -> &str {
        match self {
            FieldKind::Scalar(scalar) => scalar.into(),
            FieldKind::Reference(target) | FieldKind::Relation { target, .. } => target.name(),
        }
    }

    pub(crate) fn target(&self) -> Option<&TypeRef> {
        match self {
            FieldKind::Scalar(_) => None,
            FieldKind::Reference(target) | FieldKind::Relation { target, .. } => Some(target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LengthLimit {
    pub(crate) min: Option<u32>,
    pub(crate) max: Option<u32>,
}

/// A misuse of the modifier chain, reported when the field is added to a type.
#[derive(Debug, Clone, PartialEq)]
enum FieldIssue {
    Modifier(String),
    Default(String),
}

/// The shape of a field and its attachments. Built with the constructors of this module and
/// refined with chained modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub(crate) kind: FieldKind,
    pub(crate) wrapping: Wrapping,
    pub(crate) default: Option<DefaultValue>,
    /// `Some(scope)` when unique; an empty scope renders a bare `@unique`.
    pub(crate) unique: Option<Vec<String>>,
    pub(crate) length: Option<LengthLimit>,
    pub(crate) search: bool,
    pub(crate) mapped_name: Option<String>,
    pub(crate) resolver: Option<String>,
    pub(crate) join: Option<String>,
    pub(crate) cache: Option<CacheControl>,
    pub(crate) auth: Option<AuthRules>,
    pub(crate) deprecated: Option<Option<String>>,
    pub(crate) shareable: bool,
    pub(crate) inaccessible: bool,
    pub(crate) override_from: Option<String>,
    pub(crate) provides: Option<String>,
    pub(crate) tags: Vec<String>,
    terminal: Option<&'static str>,
    issue: Option<FieldIssue>,
}

impl FieldDefinition {
    fn new(kind: FieldKind) -> Self {
        FieldDefinition {
            kind,
            wrapping: Wrapping::required(),
            default: None,
            unique: None,
            length: None,
            search: false,
            mapped_name: None,
            resolver: None,
            join: None,
            cache: None,
            auth: None,
            deprecated: None,
            shareable: false,
            inaccessible: false,
            override_from: None,
            provides: None,
            tags: Vec::new(),
            terminal: None,
            issue: None,
        }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(FieldKind::Scalar(scalar))
    }

    /// A field typed by another definition of the graph: an enum, an input, an object type, an
    /// interface, a union or a model.
    pub fn reference(target: impl Into<TypeRef>) -> Self {
        Self::new(FieldKind::Reference(target.into()))
    }

    /// A relation between two models. The target may be defined later in the graph.
    pub fn relation(target: impl Into<TypeRef>) -> Self {
        Self::new(FieldKind::Relation {
            target: target.into(),
            name: None,
        })
    }

    fn invalid(mut self, issue: FieldIssue) -> Self {
        if self.issue.is_none() {
            self.issue = Some(issue);
        }

        self
    }

    fn invalid_modifier(self, reason: impl Into<String>) -> Self {
        self.invalid(FieldIssue::Modifier(reason.into()))
    }

    fn check_not_terminal(self, modifier: &str) -> Self {
        match self.terminal {
            Some(terminal) => {
                let reason = format!("`{modifier}` cannot be applied after `{terminal}`");
                self.invalid_modifier(reason)
            }
            None => self,
        }
    }

    /// Makes the outermost layer nullable: the inner type, or the last list applied.
    #[must_use]
    pub fn optional(self) -> Self {
        let mut this = self.check_not_terminal("optional");
        this.wrapping = this.wrapping.without_non_null();
        this
    }

    /// Wraps the current shape in a required list.
    #[must_use]
    pub fn list(self) -> Self {
        let mut this = self.check_not_terminal("list");

        match this.wrapping.list_non_null() {
            Some(wrapping) => {
                this.wrapping = wrapping;
                this
            }
            None => this.invalid_modifier("too many nested lists"),
        }
    }

    #[must_use]
    pub fn unique(self) -> Self {
        self.unique_with_scope(Vec::<String>::new())
    }

    /// Unique together with the other fields of `scope`.
    #[must_use]
    pub fn unique_with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.wrapping.is_list() {
            return self.invalid_modifier("`unique` is not supported on list fields");
        }

        if matches!(self.kind, FieldKind::Relation { .. }) {
            return self.invalid_modifier("`unique` is not supported on relations");
        }

        self.unique = Some(scope.into_iter().map(Into::into).collect());
        self.terminal = Some("unique");
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        let value = value.into();

        if let Err(reason) = self.check_default(&value) {
            return self.invalid(FieldIssue::Default(reason));
        }

        self.default = Some(value);
        self.terminal = Some("default");
        self
    }

    fn check_default(&self, value: &DefaultValue) -> Result<(), String> {
        fn check(kind: &FieldKind, value: &DefaultValue, depth: usize) -> Result<(), String> {
            match (value, depth) {
                (DefaultValue::List(items), 1..) => items.iter().try_for_each(|item| check(kind, item, depth - 1)),
                (DefaultValue::List(_), 0) => Err("a list default on a field that is not a list".to_owned()),
                (_, 1..) => Err("a list field needs a list default".to_owned()),
                (value, 0) => match kind {
                    FieldKind::Scalar(scalar) if scalar.accepts(value) => Ok(()),
                    FieldKind::Scalar(scalar) => Err(format!("{value:?} is not a valid {scalar} value")),
                    FieldKind::Reference(_) if matches!(value, DefaultValue::Enum(_)) => Ok(()),
                    FieldKind::Reference(_) => Err(
                        "only enum values can be used as defaults of reference fields".to_owned(),
                    ),
                    FieldKind::Relation { .. } => Err("relations cannot have a default value".to_owned()),
                },
            }
        }

        check(&self.kind, value, self.wrapping.list_wrappings().len())
    }

    /// Limits the length of a string or list field.
    #[must_use]
    pub fn length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        match (min, max) {
            (None, None) => self.invalid_modifier("`length` needs a minimum or a maximum"),
            (Some(min), Some(max)) if min > max => {
                self.invalid_modifier(format!("`length` minimum {min} is greater than the maximum {max}"))
            }
            _ => {
                self.length = Some(LengthLimit { min, max });
                self
            }
        }
    }

    #[must_use]
    pub fn search(mut self) -> Self {
        self.search = true;
        self
    }

    /// Names the relation, to tell apart several relations between the same models.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        match &mut self.kind {
            FieldKind::Relation { name: slot, .. } => {
                *slot = Some(name.into());
                self
            }
            _ => self.invalid_modifier("`name` is only supported on relations"),
        }
    }

    /// Maps the field to a different name in the underlying data source.
    #[must_use]
    pub fn mapped(mut self, name: impl Into<String>) -> Self {
        self.mapped_name = Some(name.into());
        self
    }

    /// Binds the field to a resolver file. The path is passed through verbatim.
    #[must_use]
    pub fn resolver(mut self, name: impl Into<String>) -> Self {
        self.resolver = Some(name.into());
        self
    }

    #[must_use]
    pub fn join(mut self, select: impl Into<String>) -> Self {
        self.join = Some(select.into());
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

    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecated = Some(reason.map(str::to_owned));
        self
    }

    #[must_use]
    pub fn shareable(mut self) -> Self {
        self.shareable = true;
        self
    }

    #[must_use]
    pub fn inaccessible(mut self) -> Self {
        self.inaccessible = true;
        self
    }

    #[must_use]
    pub fn override_from(mut self, subgraph: impl Into<String>) -> Self {
        self.override_from = Some(subgraph.into());
        self
    }

    #[must_use]
    pub fn provides(mut self, fields: impl Into<String>) -> Self {
        self.provides = Some(fields.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    pub fn is_list(&self) -> bool {
        self.wrapping.is_list()
    }

    pub fn is_required(&self) -> bool {
        self.wrapping.is_required()
    }

    /// Checks the field can be placed on a type of `type_kind`.
    pub(crate) fn validate(&self, type_name: &str, field_name: &str, type_kind: TypeKind) -> Result<(), ConfigError> {
        let modifier_error = |reason: &str| ConfigError::InvalidModifier {
            type_name: type_name.to_owned(),
            field_name: field_name.to_owned(),
            reason: reason.to_owned(),
        };

        match &self.issue {
            Some(FieldIssue::Modifier(reason)) => return Err(modifier_error(reason)),
            Some(FieldIssue::Default(reason)) => {
                return Err(ConfigError::InvalidDefault {
                    type_name: type_name.to_owned(),
                    field_name: field_name.to_owned(),
                    reason: reason.clone(),
                })
            }
            None => (),
        }

        if let Some(auth) = &self.auth {
            auth.validate()?;
        }

        if self.length.is_some() {
            let string_like = matches!(self.kind, FieldKind::Scalar(scalar) if scalar.is_string_like());

            if !string_like && !self.wrapping.is_list() {
                return Err(modifier_error("`length` is only supported on string and list fields"));
            }
        }

        if type_kind != TypeKind::Model {
            if matches!(self.kind, FieldKind::Relation { .. }) {
                return Err(modifier_error("relations are only supported on model fields"));
            }

            if self.unique.is_some() {
                return Err(modifier_error("`unique` is only supported on model fields"));
            }

            if self.search {
                return Err(modifier_error("`search` is only supported on model fields"));
            }
        }

        if type_kind == TypeKind::Input {
            let unsupported = [
                (self.resolver.is_some(), "`resolver`"),
                (self.join.is_some(), "`join`"),
                (self.cache.is_some(), "`cache`"),
                (self.auth.is_some(), "`auth`"),
                (self.provides.is_some(), "`provides`"),
                (self.shareable, "`shareable`"),
                (self.override_from.is_some(), "`override_from`"),
            ];

            if let Some((_, modifier)) = unsupported.into_iter().find(|(used, _)| *used) {
                return Err(modifier_error(&format!("{modifier} is not supported on input fields")));
            }
        }

        Ok(())
    }
}

macro_rules! scalar_constructors {
    ($($(#[$meta:meta])* $fn_name:ident => $scalar:ident,)*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name() -> FieldDefinition {
                FieldDefinition::scalar(ScalarType::$scalar)
            }
        )*
    };
}

scalar_constructors! {
    string => String,
    id => Id,
    email => Email,
    int => Int,
    float => Float,
    boolean => Boolean,
    date => Date,
    datetime => DateTime,
    ip_address => IpAddress,
    /// Milliseconds since the Unix epoch.
    timestamp => Timestamp,
    url => Url,
    json => Json,
    phone_number => PhoneNumber,
    decimal => Decimal,
    bytes => Bytes,
    bigint => BigInt,
}

/// A field typed by another definition of the graph.
pub fn reference(target: impl Into<TypeRef>) -> FieldDefinition {
    FieldDefinition::reference(target)
}

/// A field typed by an enum of the graph.
pub fn enum_ref(target: impl Into<TypeRef>) -> FieldDefinition {
    FieldDefinition::reference(target)
}

/// A field typed by an input object of the graph.
pub fn input_ref(target: impl Into<TypeRef>) -> FieldDefinition {
    FieldDefinition::reference(target)
}

/// A relation between two models.
pub fn relation(target: impl Into<TypeRef>) -> FieldDefinition {
    FieldDefinition::relation(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_string(field: &FieldDefinition) -> String {
        field.wrapping.display(field.kind.type_name()).to_string()
    }

    #[test]
    fn modifiers_compose_left_to_right() {
        assert_eq!(type_string(&string()), "String!");
        assert_eq!(type_string(&string().optional()), "String");
        assert_eq!(type_string(&string().list()), "[String!]!");
        assert_eq!(type_string(&string().optional().list()), "[String]!");
        assert_eq!(type_string(&string().list().optional()), "[String!]");
        assert_eq!(type_string(&relation("Comment").optional().list().optional()), "[Comment]");
        assert_eq!(type_string(&int().list().optional().list()), "[[Int!]]!");
    }

    #[test]
    fn scalar_names() {
        assert_eq!(type_string(&id()), "ID!");
        assert_eq!(type_string(&ip_address()), "IPAddress!");
        assert_eq!(type_string(&url()), "URL!");
        assert_eq!(type_string(&json()), "JSON!");
        assert_eq!(type_string(&datetime()), "DateTime!");
        assert_eq!(type_string(&bigint()), "BigInt!");
    }

    #[test]
    fn unique_on_list_is_rejected() {
        let error = string().list().unique().validate("User", "tags", TypeKind::Model).unwrap_err();

        assert_eq!(
            error.to_string(),
            "invalid modifier on `User.tags`: `unique` is not supported on list fields"
        );
    }

    #[test]
    fn modifiers_after_terminal_attachments_are_rejected() {
        let error = string()
            .default("foo")
            .optional()
            .validate("User", "name", TypeKind::Model)
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "invalid modifier on `User.name`: `optional` cannot be applied after `default`"
        );
    }

    #[test]
    fn defaults_are_checked_against_the_base_kind() {
        assert!(int().default(3).validate("T", "f", TypeKind::Object).is_ok());
        assert!(float().default(3).validate("T", "f", TypeKind::Object).is_ok());
        assert!(string().list().default(vec!["a", "b"]).validate("T", "f", TypeKind::Object).is_ok());

        let error = int().default("three").validate("T", "f", TypeKind::Object).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidDefault { .. }), "{error}");

        let error = string().default(vec!["a"]).validate("T", "f", TypeKind::Object).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid default value on `T.f`: a list default on a field that is not a list"
        );

        let error = relation("Post").default("x").validate("T", "f", TypeKind::Model).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidDefault { .. }), "{error}");

        let error = float().default(f64::NAN).validate("T", "f", TypeKind::Model).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid default value on `T.f`: Float(NaN) is not a valid Float value"
        );

        let error = json().default(f64::INFINITY).validate("T", "f", TypeKind::Model).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidDefault { .. }), "{error}");

        let error = float()
            .list()
            .default(vec![1.5, f64::NEG_INFINITY])
            .validate("T", "f", TypeKind::Model)
            .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidDefault { .. }), "{error}");
    }

    #[test]
    fn model_only_attachments() {
        assert!(email().unique().validate("User", "email", TypeKind::Model).is_ok());

        let error = email().unique().validate("Address", "email", TypeKind::Object).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid modifier on `Address.email`: `unique` is only supported on model fields"
        );

        let error = relation("Post").validate("Address", "post", TypeKind::Object).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidModifier { .. }));
    }

    #[test]
    fn input_fields_cannot_have_resolvers() {
        let error = string()
            .resolver("inputs/name")
            .validate("CreateUser", "name", TypeKind::Input)
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "invalid modifier on `CreateUser.name`: `resolver` is not supported on input fields"
        );
    }

    #[test]
    fn length_bounds() {
        assert!(string().length(Some(1), Some(255)).validate("T", "f", TypeKind::Object).is_ok());
        assert!(int().list().length(None, Some(5)).validate("T", "f", TypeKind::Object).is_ok());
        assert!(int().length(None, Some(5)).validate("T", "f", TypeKind::Object).is_err());
        assert!(string().length(Some(5), Some(1)).validate("T", "f", TypeKind::Object).is_err());
        assert!(string().length(None, None).validate("T", "f", TypeKind::Object).is_err());
    }
}
