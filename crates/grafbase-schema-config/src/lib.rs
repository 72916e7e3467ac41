//! Describes a Grafbase schema in Rust and renders it to GraphQL SDL.
//!
//! A [`Graph`] holds the types of the schema. Fields are built with the constructors of the
//! [`field`] module and may reference types defined later, by name: every reference is resolved
//! when the schema is rendered. A [`SchemaConfig`] adds the connectors, the schema-wide
//! directives and the auth configuration around the graph, and
//! [`SchemaConfig::render`] produces the SDL document consumed by the engine.
//!
//! ```
//! use grafbase_schema_config::{connector, field, Graph, SchemaConfig};
//!
//! let mut graph = Graph::new();
//!
//! graph
//!     .model(
//!         "Post",
//!         [
//!             ("title", field::string()),
//!             ("comments", field::relation("Comment").optional().list().optional()),
//!         ],
//!     )
//!     .unwrap();
//!
//! graph.model("Comment", [("body", field::string())]).unwrap();
//!
//! let mut config = SchemaConfig::new(graph);
//!
//! config
//!     .datasource(connector::postgres("Postgres").url("{{ env.DATABASE_URL }}"), None)
//!     .unwrap();
//!
//! let sdl = config.render().unwrap();
//! assert!(sdl.contains("comments: [Comment]"));
//! ```

mod auth;
mod cache;
mod config;
pub mod connector;
mod directives;
mod env;
mod error;
pub mod field;
mod graph;
mod query;
mod render;
mod settings;

pub use self::{
    auth::{
        Auth, AuthOperation, AuthProvider, AuthRule, AuthRules, AuthorizerProvider, JwksProvider, JwtProvider,
        OidcProvider,
    },
    cache::{CacheControl, CacheRule, CacheScope, CacheTarget, GlobalCache, MutationInvalidation},
    config::SchemaConfig,
    directives::*,
    env::env,
    error::ConfigError,
    field::{DefaultValue, FieldDefinition, ScalarType},
    graph::{Graph, KeyDirective, TypeDefinition, TypeHandle, TypeId, TypeKind, TypeRef},
    query::{Query, TypeExtension},
    settings::SchemaSettings,
};
