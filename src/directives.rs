//! The five federation directives: `@key`, `@external`, `@requires`,
//! `@provides`, `@extends`.
//!
//! Each directive comes in two forms: a bound usage for annotating a type or
//! field, and a definition for declaring the directive in a schema. The
//! aggregate accessors return everything sorted by name, so output built from
//! them stays stable no matter the declaration order here.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::Argument;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveDefinition;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::ast::Value;
use apollo_compiler::name;
use itertools::Itertools;

use crate::spec::FIELDSET_SCALAR_NAME;

pub const KEY_DIRECTIVE_NAME: Name = name!("key");
pub const EXTERNAL_DIRECTIVE_NAME: Name = name!("external");
pub const REQUIRES_DIRECTIVE_NAME: Name = name!("requires");
pub const PROVIDES_DIRECTIVE_NAME: Name = name!("provides");
pub const EXTENDS_DIRECTIVE_NAME: Name = name!("extends");
pub const FIELDS_ARGUMENT_NAME: Name = name!("fields");

/// `@key(fields: "...")` usage marking a type as an entity.
pub fn key_directive_usage(fields: &str) -> Directive {
    fields_directive_usage(KEY_DIRECTIVE_NAME, fields)
}

/// `@external` usage marking a field as owned by another subgraph.
pub fn external_directive_usage() -> Directive {
    bare_directive_usage(EXTERNAL_DIRECTIVE_NAME)
}

/// `@requires(fields: "...")` usage.
pub fn requires_directive_usage(fields: &str) -> Directive {
    fields_directive_usage(REQUIRES_DIRECTIVE_NAME, fields)
}

/// `@provides(fields: "...")` usage.
pub fn provides_directive_usage(fields: &str) -> Directive {
    fields_directive_usage(PROVIDES_DIRECTIVE_NAME, fields)
}

/// `@extends` usage marking a type as an extension of another subgraph's type.
pub fn extends_directive_usage() -> Directive {
    bare_directive_usage(EXTENDS_DIRECTIVE_NAME)
}

fn bare_directive_usage(name: Name) -> Directive {
    Directive {
        name,
        arguments: Vec::new(),
    }
}

fn fields_directive_usage(name: Name, fields: &str) -> Directive {
    Directive {
        name,
        arguments: vec![Node::new(Argument {
            name: FIELDS_ARGUMENT_NAME,
            value: Node::new(Value::String(fields.to_owned())),
        })],
    }
}

/// `directive @key(fields: _FieldSet!) on OBJECT | INTERFACE`.
pub fn key_directive_definition() -> Node<DirectiveDefinition> {
    fields_directive_definition(
        KEY_DIRECTIVE_NAME,
        vec![DirectiveLocation::Object, DirectiveLocation::Interface],
    )
}

/// `directive @external on FIELD_DEFINITION`.
pub fn external_directive_definition() -> Node<DirectiveDefinition> {
    bare_directive_definition(
        EXTERNAL_DIRECTIVE_NAME,
        vec![DirectiveLocation::FieldDefinition],
    )
}

/// `directive @requires(fields: _FieldSet!) on FIELD_DEFINITION`.
pub fn requires_directive_definition() -> Node<DirectiveDefinition> {
    fields_directive_definition(
        REQUIRES_DIRECTIVE_NAME,
        vec![DirectiveLocation::FieldDefinition],
    )
}

/// `directive @provides(fields: _FieldSet!) on FIELD_DEFINITION`.
pub fn provides_directive_definition() -> Node<DirectiveDefinition> {
    fields_directive_definition(
        PROVIDES_DIRECTIVE_NAME,
        vec![DirectiveLocation::FieldDefinition],
    )
}

/// `directive @extends on OBJECT | INTERFACE`.
pub fn extends_directive_definition() -> Node<DirectiveDefinition> {
    bare_directive_definition(
        EXTENDS_DIRECTIVE_NAME,
        vec![DirectiveLocation::Object, DirectiveLocation::Interface],
    )
}

fn bare_directive_definition(
    name: Name,
    locations: Vec<DirectiveLocation>,
) -> Node<DirectiveDefinition> {
    Node::new(DirectiveDefinition {
        description: None,
        name,
        arguments: Vec::new(),
        repeatable: false,
        locations,
    })
}

fn fields_directive_definition(
    name: Name,
    locations: Vec<DirectiveLocation>,
) -> Node<DirectiveDefinition> {
    Node::new(DirectiveDefinition {
        description: None,
        name,
        arguments: vec![Node::new(InputValueDefinition {
            description: None,
            name: FIELDS_ARGUMENT_NAME,
            ty: Type::NonNullNamed(FIELDSET_SCALAR_NAME).into(),
            default_value: None,
            directives: Default::default(),
        })],
        repeatable: false,
        locations,
    })
}

/// Names of every federation directive, sorted lexicographically.
pub fn all_directive_names() -> Vec<Name> {
    all_directive_definitions()
        .iter()
        .map(|definition| definition.name.clone())
        .collect()
}

/// One argument-free usage per federation directive, sorted by name.
pub fn all_directive_usages() -> Vec<Directive> {
    all_directive_names()
        .into_iter()
        .map(bare_directive_usage)
        .collect()
}

/// Every federation directive definition, sorted by name.
pub fn all_directive_definitions() -> Vec<Node<DirectiveDefinition>> {
    [
        key_directive_definition(),
        external_directive_definition(),
        requires_directive_definition(),
        provides_directive_definition(),
        extends_directive_definition(),
    ]
    .into_iter()
    .sorted_by(|a, b| a.name.cmp(&b.name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_are_sorted_by_name() {
        let names: Vec<_> = all_directive_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["extends", "external", "key", "provides", "requires"]
        );
        let definition_names: Vec<_> = all_directive_definitions()
            .iter()
            .map(|definition| definition.name.to_string())
            .collect();
        assert_eq!(definition_names, names);
        let usage_names: Vec<_> = all_directive_usages()
            .iter()
            .map(|usage| usage.name.to_string())
            .collect();
        assert_eq!(usage_names, names);
    }

    #[test]
    fn key_usage_binds_the_fields_argument() {
        assert_eq!(
            key_directive_usage("id organization { id }").to_string(),
            r#"@key(fields: "id organization { id }")"#
        );
    }

    #[test]
    fn field_level_directives_declare_field_definition_location() {
        for definition in [
            external_directive_definition(),
            requires_directive_definition(),
            provides_directive_definition(),
        ] {
            assert_eq!(definition.locations, vec![DirectiveLocation::FieldDefinition]);
        }
    }

    #[test]
    fn type_level_directives_declare_object_and_interface_locations() {
        for definition in [key_directive_definition(), extends_directive_definition()] {
            assert_eq!(
                definition.locations,
                vec![DirectiveLocation::Object, DirectiveLocation::Interface]
            );
        }
    }

    #[test]
    fn fields_arguments_are_non_null_fieldset() {
        let definition = requires_directive_definition();
        let fields = definition.arguments.first().expect("fields argument");
        assert_eq!(fields.ty.to_string(), "_FieldSet!");
    }

    #[test]
    fn definitions_render_as_sdl_declarations() {
        assert_eq!(
            key_directive_definition().to_string(),
            "directive @key(fields: _FieldSet!) on OBJECT | INTERFACE"
        );
        assert_eq!(
            external_directive_definition().to_string(),
            "directive @external on FIELD_DEFINITION"
        );
    }
}
