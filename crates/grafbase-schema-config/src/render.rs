//! SDL rendering of the graph definitions. Schema-level directives and connectors render
//! themselves; [`SchemaConfig::render`](crate::SchemaConfig::render) assembles the document.

pub(crate) mod display_utils;

use std::fmt::{self, Display, Write};

use itertools::Itertools;

use self::display_utils::{DirectiveWriter, SdlValue, FIELD_INDENT};
use crate::{
    field::{FieldDefinition, FieldKind},
    graph::{KeyDirective, TypeDefinition, TypeKind},
    query::{Query, TypeExtension},
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldPosition {
    /// Fields of models, object types and interfaces. Defaults render as `@default`.
    Output,
    /// Input fields and arguments. Defaults render GraphQL-natively, as `= value`.
    Input,
}

/// Opens a directive after the previous content of the line.
fn directive<'a, 'b>(f: &'a mut fmt::Formatter<'b>, name: &str) -> Result<DirectiveWriter<'a, 'b>, fmt::Error> {
    f.write_char(' ')?;
    DirectiveWriter::new(name, f)
}

fn write_field(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    field: &FieldDefinition,
    position: FieldPosition,
) -> fmt::Result {
    write!(f, "{name}: {}", field.wrapping.display(field.kind.type_name()))?;

    if position == FieldPosition::Input {
        if let Some(default) = &field.default {
            write!(f, " = {}", default.to_sdl())?;
        }
    }

    write_field_directives(f, field, position)
}

fn write_field_directives(f: &mut fmt::Formatter<'_>, field: &FieldDefinition, position: FieldPosition) -> fmt::Result {
    if let FieldKind::Relation { name: Some(name), .. } = &field.kind {
        directive(f, "relation")?.arg("name", name.as_str())?;
    }

    if position == FieldPosition::Output {
        if let Some(default) = &field.default {
            directive(f, "default")?.arg("value", default.to_sdl())?;
        }
    }

    if let Some(scope) = &field.unique {
        let fields = (!scope.is_empty()).then(|| SdlValue::strings(scope.iter().map(String::as_str)));
        directive(f, "unique")?.opt_arg("fields", fields)?;
    }

    if let Some(length) = field.length {
        directive(f, "length")?
            .opt_arg("min", length.min)?
            .opt_arg("max", length.max)?;
    }

    if field.search {
        directive(f, "search")?;
    }

    if let Some(name) = &field.mapped_name {
        directive(f, "map")?.arg("name", name.as_str())?;
    }

    if let Some(resolver) = &field.resolver {
        directive(f, "resolver")?.arg("name", resolver.as_str())?;
    }

    if let Some(select) = &field.join {
        directive(f, "join")?.arg("select", select.as_str())?;
    }

    if let Some(cache) = &field.cache {
        write!(f, " {cache}")?;
    }

    if let Some(auth) = &field.auth {
        directive(f, "auth")?.arg("rules", auth.to_sdl())?;
    }

    if let Some(reason) = &field.deprecated {
        directive(f, "deprecated")?.opt_arg("reason", reason.as_deref())?;
    }

    if field.shareable {
        directive(f, "shareable")?;
    }

    if field.inaccessible {
        directive(f, "inaccessible")?;
    }

    if let Some(from) = &field.override_from {
        directive(f, "override")?.arg("from", from.as_str())?;
    }

    if let Some(fields) = &field.provides {
        directive(f, "provides")?.arg("fields", fields.as_str())?;
    }

    for tag in &field.tags {
        directive(f, "tag")?.arg("name", tag.as_str())?;
    }

    Ok(())
}

fn write_keys(f: &mut fmt::Formatter<'_>, keys: &[KeyDirective]) -> fmt::Result {
    for key in keys {
        let writer = directive(f, "key")?.arg("fields", key.fields.as_str())?;

        if !key.resolvable {
            writer.arg("resolvable", false)?;
        }
    }

    Ok(())
}

/// Writes ` {`, one line per item and the closing brace. Nothing is written without items.
fn write_body<I, F>(f: &mut fmt::Formatter<'_>, items: I, mut write_item: F) -> fmt::Result
where
    I: IntoIterator,
    F: FnMut(&mut fmt::Formatter<'_>, I::Item) -> fmt::Result,
{
    let mut items = items.into_iter().peekable();

    if items.peek().is_none() {
        return Ok(());
    }

    f.write_str(" {\n")?;

    for item in items {
        f.write_str(FIELD_INDENT)?;
        write_item(f, item)?;
        f.write_char('\n')?;
    }

    f.write_char('}')
}

fn write_resolver_field(f: &mut fmt::Formatter<'_>, field: &Query) -> fmt::Result {
    f.write_str(&field.name)?;

    if !field.arguments.is_empty() {
        f.write_char('(')?;

        for (idx, (name, argument)) in field.arguments.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }

            write_field(f, name, argument, FieldPosition::Input)?;
        }

        f.write_char(')')?;
    }

    match &field.returns {
        Some(returns) => {
            write!(f, ": {}", returns.wrapping.display(returns.kind.type_name()))?;
            write_field_directives(f, returns, FieldPosition::Output)
        }
        None => Ok(()),
    }
}

impl Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            TypeKind::Model | TypeKind::Object => "type",
            TypeKind::Input => "input",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
        };

        write!(f, "{keyword} {}", self.name)?;

        if !self.interfaces.is_empty() {
            write!(f, " implements {}", self.interfaces.iter().map(|i| i.name()).join(" & "))?;
        }

        if self.kind == TypeKind::Model {
            f.write_str(" @model")?;
        }

        if self.search {
            f.write_str(" @search")?;
        }

        write_keys(f, &self.keys)?;

        if let Some(cache) = &self.cache {
            write!(f, " {cache}")?;
        }

        if let Some(auth) = &self.auth {
            directive(f, "auth")?.arg("rules", auth.to_sdl())?;
        }

        let position = match self.kind {
            TypeKind::Input => FieldPosition::Input,
            _ => FieldPosition::Output,
        };

        match self.kind {
            TypeKind::Union => write!(f, " = {}", self.members.iter().map(|member| member.name()).join(" | ")),
            TypeKind::Enum => write_body(f, &self.variants, |f, variant| f.write_str(variant)),
            _ => write_body(f, &self.fields, |f, (name, field)| write_field(f, name, field, position)),
        }
    }
}

impl Display for TypeExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extend type {}", self.target.name())?;
        write_keys(f, &self.keys)?;
        write_body(f, &self.fields, write_resolver_field)
    }
}

/// Renders the `extend type Query` or `extend type Mutation` block of the root fields.
pub(crate) struct RootExtension<I> {
    pub(crate) root: &'static str,
    pub(crate) fields: I,
}

impl<'a, I> Display for RootExtension<I>
where
    I: Iterator<Item = &'a Query> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extend type {}", self.root)?;
        write_body(f, self.fields.clone(), write_resolver_field)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::{field, DefaultValue, Graph, KeyDirective, Query, TypeDefinition};

    fn render(graph: &Graph) -> String {
        graph.definitions().map(ToString::to_string).collect::<Vec<_>>().join("\n\n")
    }

    #[test]
    fn model_fields_render_in_insertion_order() {
        let mut graph = Graph::new();
        graph
            .model(
                "Post",
                [
                    ("title", field::string().length(Some(1), Some(255))),
                    ("slug", field::string().unique()),
                    ("comments", field::relation("Comment").optional().list().optional()),
                    ("views", field::int().default(0)),
                ],
            )
            .unwrap();

        assert_eq!(
            render(&graph),
            indoc! {r#"
                type Post @model {
                  title: String! @length(min: 1, max: 255)
                  slug: String! @unique
                  comments: [Comment]
                  views: Int! @default(value: 0)
                }"#}
        );
    }

    #[test]
    fn enums_unions_and_inputs() {
        let mut graph = Graph::new();
        let color = graph.enum_type("Color", ["RED", "GREEN"]).unwrap();
        let cat = graph.object("Cat", [("name", field::string())]).unwrap();
        let dog = graph.object("Dog", [("name", field::string())]).unwrap();
        graph.union("Pet", [&cat, &dog]).unwrap();
        graph
            .input(
                "PetFilter",
                [
                    ("color", field::enum_ref(&color).default(DefaultValue::enum_value("RED"))),
                    ("limit", field::int().optional().default(10)),
                ],
            )
            .unwrap();

        assert_eq!(
            render(&graph),
            indoc! {r#"
                enum Color {
                  RED
                  GREEN
                }

                type Cat {
                  name: String!
                }

                type Dog {
                  name: String!
                }

                union Pet = Cat | Dog

                input PetFilter {
                  color: Color! = RED
                  limit: Int = 10
                }"#}
        );
    }

    #[test]
    fn type_level_directives() {
        let mut graph = Graph::new();
        let node = graph.interface("Node", [("id", field::id())]).unwrap();
        graph
            .define(
                TypeDefinition::object("Product")
                    .implements(&node)
                    .key(KeyDirective::new("id"))
                    .key(KeyDirective::new("sku").resolvable(false))
                    .field("id", field::id().shareable())
                    .field("sku", field::string().tag("public").tag("catalog"))
                    .field("legacy", field::string().optional().deprecated(Some("use sku")).inaccessible()),
            )
            .unwrap();
        graph.object("Empty", Vec::<(&str, _)>::new()).unwrap();

        assert_eq!(
            render(&graph),
            indoc! {r#"
                interface Node {
                  id: ID!
                }

                type Product implements Node @key(fields: "id") @key(fields: "sku", resolvable: false) {
                  id: ID! @shareable
                  sku: String! @tag(name: "public") @tag(name: "catalog")
                  legacy: String @deprecated(reason: "use sku") @inaccessible
                }

                type Empty"#}
        );
    }

    #[test]
    fn resolver_fields() {
        let mut graph = Graph::new();
        graph
            .query(
                Query::new("search")
                    .argument("term", field::string())
                    .argument("limit", field::int().optional().default(3))
                    .returns(field::string().list())
                    .resolver("search/run"),
            )
            .unwrap();
        graph
            .query(Query::new("ping").returns(field::boolean()).resolver("ping"))
            .unwrap();

        let queries = super::RootExtension {
            root: "Query",
            fields: graph.queries(),
        };

        assert_eq!(
            queries.to_string(),
            indoc! {r#"
                extend type Query {
                  search(term: String!, limit: Int = 3): [String!]! @resolver(name: "search/run")
                  ping: Boolean! @resolver(name: "ping")
                }"#}
        );
    }
}
