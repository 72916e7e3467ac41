use grafbase_schema_config::{
    field, Auth, AuthProvider, ConfigError, DefaultValue, Graph, Query, SchemaConfig, TypeDefinition,
};
use pretty_assertions::assert_eq;

fn blog() -> Result<SchemaConfig, ConfigError> {
    let mut graph = Graph::new();

    let node = graph.interface("Node", [("id", field::id())])?;
    let status = graph.enum_type("Status", ["DRAFT", "PUBLISHED"])?;

    graph.input(
        "PostFilter",
        [
            ("status", field::enum_ref(&status).optional()),
            ("first", field::int().optional().default(10)),
        ],
    )?;

    let author = graph.define(
        TypeDefinition::object("Author")
            .implements(&node)
            .field("id", field::id())
            .field("name", field::string()),
    )?;

    graph.union("SearchResult", ["Post", "Comment"])?;

    graph.define(
        TypeDefinition::model("Post")
            .search()
            .field("title", field::string().length(Some(1), Some(120)))
            .field(
                "status",
                field::enum_ref(&status).default(DefaultValue::enum_value("DRAFT")),
            )
            .field("author", field::reference(&author).optional())
            .field("comments", field::relation("Comment").optional().list().optional()),
    )?;

    graph.model(
        "Comment",
        [("body", field::string()), ("post", field::relation("Post"))],
    )?;

    graph.query(
        Query::new("posts")
            .argument("filter", field::input_ref("PostFilter").optional())
            .returns(field::reference("Post").list())
            .resolver("posts/list"),
    )?;

    graph.mutation(
        Query::new("publish")
            .argument("id", field::id())
            .returns(field::reference("Post").optional())
            .resolver("posts/publish"),
    )?;

    graph.extend("StripeCustomer", |extension| {
        extension.add_field(
            Query::new("nickname")
                .returns(field::string().optional())
                .resolver("stripe/nickname"),
        );
    })?;

    let mut config = SchemaConfig::new(graph);

    config.auth(
        Auth::new([AuthProvider::oidc(grafbase_schema_config::env("ISSUER_URL")?)]).rules(|rules| {
            rules.private();
        }),
    );

    Ok(config)
}

#[test]
fn full_document() {
    let sdl = blog().unwrap().render().unwrap();

    insta::assert_snapshot!(sdl, @r###"
    interface Node {
      id: ID!
    }

    enum Status {
      DRAFT
      PUBLISHED
    }

    input PostFilter {
      status: Status
      first: Int = 10
    }

    type Author implements Node {
      id: ID!
      name: String!
    }

    extend type StripeCustomer {
      nickname: String @resolver(name: "stripe/nickname")
    }

    extend type Query {
      posts(filter: PostFilter): [Post!]! @resolver(name: "posts/list")
    }

    extend type Mutation {
      publish(id: ID!): Post @resolver(name: "posts/publish")
    }

    union SearchResult = Post | Comment

    type Post @model @search {
      title: String! @length(min: 1, max: 120)
      status: Status! @default(value: DRAFT)
      author: Author
      comments: [Comment]
    }

    type Comment @model {
      body: String!
      post: Post!
    }

    extend schema
      @auth(
        providers: [
          { type: oidc, issuer: "{{ env.ISSUER_URL }}" }
        ]
        rules: [
          { allow: private }
        ]
      )
    "###);
}

#[test]
fn rendered_document_is_valid_sdl() {
    let sdl = blog().unwrap().render().unwrap();

    cynic_parser::parse_type_system_document(&sdl).unwrap();
}

#[test]
fn rendering_is_deterministic() {
    let config = blog().unwrap();

    assert_eq!(config.render().unwrap(), config.render().unwrap());
    assert_eq!(config.render().unwrap(), blog().unwrap().render().unwrap());
}

#[test]
fn list_modifiers_compose_left_to_right() {
    let mut graph = Graph::new();

    graph
        .model(
            "Post",
            [
                ("nullable", field::relation("Comment").optional().list().optional()),
                ("required", field::relation("Comment").list()),
                ("inner_nullable", field::relation("Comment").optional().list()),
                ("outer_nullable", field::relation("Comment").list().optional()),
                ("nested", field::int().list().optional().list()),
            ],
        )
        .unwrap();

    graph.model("Comment", [("body", field::string())]).unwrap();

    let sdl = SchemaConfig::new(graph).render().unwrap();

    insta::assert_snapshot!(sdl, @r###"
    type Post @model {
      nullable: [Comment]
      required: [Comment!]!
      inner_nullable: [Comment]!
      outer_nullable: [Comment!]
      nested: [[Int!]]!
    }

    type Comment @model {
      body: String!
    }
    "###);
}

#[test]
fn cyclic_relations() {
    let mut graph = Graph::new();

    graph
        .model("User", [("friends", field::relation("User").list())])
        .unwrap();
    graph
        .model("Team", [("members", field::relation("User").list().name("membership"))])
        .unwrap();

    let sdl = SchemaConfig::new(graph).render().unwrap();

    insta::assert_snapshot!(sdl, @r###"
    type User @model {
      friends: [User!]!
    }

    type Team @model {
      members: [User!]! @relation(name: "membership")
    }
    "###);
}

#[test]
fn cleared_graph_renders_nothing() {
    let mut config = blog().unwrap();
    config.graph_mut().clear();

    assert!(config.graph().is_empty());
    assert_eq!(
        config.render().unwrap(),
        indoc::indoc! {r#"
            extend schema
              @auth(
                providers: [
                  { type: oidc, issuer: "{{ env.ISSUER_URL }}" }
                ]
                rules: [
                  { allow: private }
                ]
              )
        "#}
    );
}
