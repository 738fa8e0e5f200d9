//! Contract checks on the SDL text published through `_service`.

use apollo_compiler::Schema;
use apollo_subgraph::subgraph::sdl;

const FEDERATED_REVIEWS: &str = r#"
    directive @key(fields: _FieldSet!) on OBJECT | INTERFACE
    directive @external on FIELD_DEFINITION
    directive @requires(fields: _FieldSet!) on FIELD_DEFINITION
    directive @provides(fields: _FieldSet!) on FIELD_DEFINITION
    directive @extends on OBJECT | INTERFACE

    scalar _FieldSet
    scalar _Any

    type _Service {
      sdl: String!
    }

    type Query {
      me: User
    }

    type User @key(fields: "id") @extends {
      id: ID! @external
      reviews: [Review] @provides(fields: "rating")
      rating: Int @requires(fields: "id")
    }

    type Review {
      rating: Int
    }
"#;

fn reviews_schema() -> Schema {
    Schema::parse(FEDERATED_REVIEWS, "reviews.graphql").expect("reviews schema parses")
}

#[test]
fn federation_definitions_never_appear() {
    let printed = sdl(&reviews_schema());
    for forbidden in [
        "directive @key",
        "directive @external",
        "directive @requires",
        "directive @provides",
        "directive @extends",
        "directive @deprecated",
        "directive @include",
        "directive @skip",
        "directive @specifiedBy",
        "scalar _Any",
        "scalar _FieldSet",
        "type _Service",
        "type _Entity",
        "union _Entity",
    ] {
        assert!(
            !printed.contains(forbidden),
            "published SDL must not contain {forbidden:?}:\n{printed}"
        );
    }
}

#[test]
fn directive_usages_survive_on_visible_definitions() {
    let printed = sdl(&reviews_schema());
    assert!(printed.contains(r#"@key(fields: "id")"#));
    assert!(printed.contains("@extends"));
    assert!(printed.contains("@external"));
    assert!(printed.contains(r#"@provides(fields: "rating")"#));
    assert!(printed.contains(r#"@requires(fields: "id")"#));
}

#[test]
fn published_sdl_is_stable_and_alphabetical() {
    insta::assert_snapshot!(sdl(&reviews_schema()), @r#"
    schema {
      query: Query
    }

    type Query {
      me: User
    }

    type Review {
      rating: Int
    }

    type User @key(fields: "id") @extends {
      id: ID! @external
      reviews: [Review] @provides(fields: "rating")
      rating: Int @requires(fields: "id")
    }
    "#);
}

#[test]
fn published_sdl_names_the_root_operation_types() {
    // Emitted even though the root keeps the default name.
    let printed = sdl(&reviews_schema());
    assert!(printed.contains("schema {\n  query: Query\n}"));
}

#[test]
fn deprecations_are_published_without_their_definition() {
    let schema = Schema::parse(
        r#"
        type Query {
          current: String
          legacy: String @deprecated(reason: "use current")
        }
        "#,
        "deprecations.graphql",
    )
    .expect("schema parses");
    let printed = sdl(&schema);
    assert!(!printed.contains("directive @deprecated"));
    assert!(printed.contains(r#"legacy: String @deprecated(reason: "use current")"#));
}

#[test]
fn published_sdl_parses_on_its_own() {
    let printed = sdl(&reviews_schema());
    Schema::parse(&printed, "published.graphql").expect("published SDL is standalone");
}
