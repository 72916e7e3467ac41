//! Schema-wide directives. Each one is a small value holding its parameters and rendering itself
//! as an `extend schema` fragment. A schema holds at most one directive of each kind.

mod codegen;
mod cors;
mod experimental;
mod federation;
mod introspection;
mod operation_limits;
mod rate_limiting;
mod trusted_documents;

use std::fmt;

pub use self::{
    codegen::Codegen,
    cors::{Cors, HttpMethod},
    experimental::Experimental,
    federation::{Federation, FEDERATION_VERSION},
    introspection::Introspection,
    operation_limits::OperationLimits,
    rate_limiting::{
        ClaimCondition, HeaderCondition, RateLimiting, RateLimitingCondition, RateLimitingConditionInput,
        RateLimitingInput, RateLimitingRule, RateLimitingRuleInput,
    },
    trusted_documents::TrustedDocuments,
};
use crate::{render::display_utils::SdlValue, ConfigError};

/// Either every value (`"any"` in settings, rendered `"*"`) or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(expecting = "expecting string \"any\", or an array")]
pub enum AnyOr<T> {
    Any,
    #[serde(untagged)]
    Explicit(Vec<T>),
}

impl<T> AnyOr<T> {
    pub(crate) fn to_sdl<'a>(&'a self, item: impl Fn(&'a T) -> SdlValue<'a>) -> SdlValue<'a> {
        match self {
            AnyOr::Any => SdlValue::from("*"),
            AnyOr::Explicit(items) => SdlValue::List(items.iter().map(item).collect()),
        }
    }

    pub(crate) fn explicit(&self) -> &[T] {
        match self {
            AnyOr::Any => &[],
            AnyOr::Explicit(items) => items,
        }
    }
}

/// The kind of a [`SchemaDirective`]. The ordering is the render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum DirectiveKind {
    Federation,
    Introspection,
    OperationLimits,
    Cors,
    RateLimiting,
    TrustedDocuments,
    Experimental,
    Codegen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDirective {
    Federation(Federation),
    Introspection(Introspection),
    OperationLimits(OperationLimits),
    Cors(Cors),
    RateLimiting(RateLimiting),
    TrustedDocuments(TrustedDocuments),
    Experimental(Experimental),
    Codegen(Codegen),
}

impl SchemaDirective {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            SchemaDirective::Federation(_) => DirectiveKind::Federation,
            SchemaDirective::Introspection(_) => DirectiveKind::Introspection,
            SchemaDirective::OperationLimits(_) => DirectiveKind::OperationLimits,
            SchemaDirective::Cors(_) => DirectiveKind::Cors,
            SchemaDirective::RateLimiting(_) => DirectiveKind::RateLimiting,
            SchemaDirective::TrustedDocuments(_) => DirectiveKind::TrustedDocuments,
            SchemaDirective::Experimental(_) => DirectiveKind::Experimental,
            SchemaDirective::Codegen(_) => DirectiveKind::Codegen,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SchemaDirective::Federation(federation) => federation.validate(),
            SchemaDirective::Cors(cors) => cors.validate(),
            SchemaDirective::RateLimiting(rate_limiting) => rate_limiting.validate(),
            SchemaDirective::TrustedDocuments(trusted_documents) => trusted_documents.validate(),
            SchemaDirective::Codegen(codegen) => codegen.validate(),
            SchemaDirective::Introspection(_)
            | SchemaDirective::OperationLimits(_)
            | SchemaDirective::Experimental(_) => Ok(()),
        }
    }
}

impl fmt::Display for SchemaDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDirective::Federation(directive) => directive.fmt(f),
            SchemaDirective::Introspection(directive) => directive.fmt(f),
            SchemaDirective::OperationLimits(directive) => directive.fmt(f),
            SchemaDirective::Cors(directive) => directive.fmt(f),
            SchemaDirective::RateLimiting(directive) => directive.fmt(f),
            SchemaDirective::TrustedDocuments(directive) => directive.fmt(f),
            SchemaDirective::Experimental(directive) => directive.fmt(f),
            SchemaDirective::Codegen(directive) => directive.fmt(f),
        }
    }
}

macro_rules! directive_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for SchemaDirective {
                fn from(directive: $variant) -> Self {
                    SchemaDirective::$variant(directive)
                }
            }
        )*
    };
}

directive_from!(
    Federation,
    Introspection,
    OperationLimits,
    Cors,
    RateLimiting,
    TrustedDocuments,
    Experimental,
    Codegen
);
