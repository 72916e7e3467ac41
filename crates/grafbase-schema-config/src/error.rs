/// A configuration error. Raised while building the graph or rendering it, and always fatal to
/// the render: no SDL is produced once one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the type `{name}` is defined more than once")]
    DuplicateType { name: String },
    #[error("the field `{field_name}` is defined more than once on `{type_name}`")]
    DuplicateField { type_name: String, field_name: String },
    #[error("`{name}` is not a valid GraphQL name for {location}")]
    InvalidName { name: String, location: String },
    #[error("`{type_name}.{field_name}` references `{target}`, which is not defined in the graph")]
    UnresolvedReference {
        type_name: String,
        field_name: String,
        target: String,
    },
    #[error("`{type_name}.{field_name}` cannot reference `{target}`: {reason}")]
    InvalidReferenceTarget {
        type_name: String,
        field_name: String,
        target: String,
        reason: String,
    },
    #[error("invalid modifier on `{type_name}.{field_name}`: {reason}")]
    InvalidModifier {
        type_name: String,
        field_name: String,
        reason: String,
    },
    #[error("invalid default value on `{type_name}.{field_name}`: {reason}")]
    InvalidDefault {
        type_name: String,
        field_name: String,
        reason: String,
    },
    #[error("the union `{union_name}` cannot contain `{member}`: {reason}")]
    InvalidUnionMember {
        union_name: String,
        member: String,
        reason: String,
    },
    #[error("the enum `{name}` is invalid: {reason}")]
    InvalidEnum { name: String, reason: String },
    #[error("the type `{name}` is invalid: {reason}")]
    InvalidType { name: String, reason: String },
    #[error("the {root} field `{name}` is defined more than once")]
    DuplicateRootField { root: &'static str, name: String },
    #[error("the connector `{name}` is invalid: {reason}")]
    InvalidConnector { name: String, reason: String },
    #[error("the connector name `{name}` collides with the connector `{existing}`")]
    ConnectorCollision { name: String, existing: String },
    #[error("the rate limiting rule `{rule}` is invalid: {reason}")]
    InvalidRateLimitRule { rule: String, reason: String },
    #[error("invalid arguments for @{directive}: {reason}")]
    InvalidDirective { directive: &'static str, reason: String },
    #[error("invalid auth configuration: {0}")]
    InvalidAuth(String),
    #[error("invalid cache rule: {0}")]
    InvalidCacheRule(String),
    #[error("`{0}` is not a valid environment variable name")]
    InvalidEnvironmentVariable(String),
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),
}
