//! Definitions mandated by the Apollo Federation subgraph specification.
//!
//! A subgraph schema exposes a small, fixed surface to the gateway: the
//! `_service` root field serving the publishable SDL, the `_entities` root
//! field resolving entity representations, and the `_Any` / `_Entity` /
//! `_FieldSet` / `_Service` types backing them. This module holds the names
//! of that surface and builds its definitions.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::name;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::ScalarType;
use apollo_compiler::schema::UnionType;
use apollo_compiler::ty;

pub const ANY_SCALAR_NAME: Name = name!("_Any");
pub const ENTITY_UNION_NAME: Name = name!("_Entity");
pub const FIELDSET_SCALAR_NAME: Name = name!("_FieldSet");
pub const SERVICE_TYPE_NAME: Name = name!("_Service");
pub const ENTITIES_QUERY_NAME: Name = name!("_entities");
pub const SERVICE_QUERY_NAME: Name = name!("_service");
pub const SDL_FIELD_NAME: Name = name!("sdl");
pub const REPRESENTATIONS_ARGUMENT_NAME: Name = name!("representations");

/// Type names a subgraph never publishes in its SDL.
pub fn federation_type_names() -> [Name; 4] {
    [
        ANY_SCALAR_NAME,
        ENTITY_UNION_NAME,
        FIELDSET_SCALAR_NAME,
        SERVICE_TYPE_NAME,
    ]
}

/// `scalar _Any`. Wire representation of an entity reference; coercion is
/// caller-overridable and defaults to passthrough.
pub fn any_scalar_type() -> ExtendedType {
    scalar_type(ANY_SCALAR_NAME)
}

/// `scalar _FieldSet`. Carries key field selections as plain strings; the
/// selection syntax is not validated here.
pub fn fieldset_scalar_type() -> ExtendedType {
    scalar_type(FIELDSET_SCALAR_NAME)
}

fn scalar_type(name: Name) -> ExtendedType {
    ExtendedType::Scalar(Node::new(ScalarType {
        description: None,
        name,
        directives: Default::default(),
    }))
}

/// `type _Service { sdl: String! }`.
pub fn service_object_type() -> ExtendedType {
    let mut fields = IndexMap::default();
    fields.insert(
        SDL_FIELD_NAME,
        Component::new(FieldDefinition {
            description: None,
            name: SDL_FIELD_NAME,
            arguments: Vec::new(),
            ty: ty!(String!),
            directives: Default::default(),
        }),
    );
    ExtendedType::Object(Node::new(ObjectType {
        description: None,
        name: SERVICE_TYPE_NAME,
        implements_interfaces: Default::default(),
        directives: Default::default(),
        fields,
    }))
}

/// Root field `_service: _Service!`.
pub fn service_query_field() -> Component<FieldDefinition> {
    Component::new(FieldDefinition {
        description: None,
        name: SERVICE_QUERY_NAME,
        arguments: Vec::new(),
        ty: Type::NonNullNamed(SERVICE_TYPE_NAME),
        directives: Default::default(),
    })
}

/// Root field `_entities(representations: [_Any!]!): [_Entity]!`.
pub fn entities_query_field() -> Component<FieldDefinition> {
    Component::new(FieldDefinition {
        description: None,
        name: ENTITIES_QUERY_NAME,
        arguments: vec![Node::new(InputValueDefinition {
            description: None,
            name: REPRESENTATIONS_ARGUMENT_NAME,
            ty: Type::NonNullList(Box::new(Type::NonNullNamed(ANY_SCALAR_NAME))).into(),
            default_value: None,
            directives: Default::default(),
        })],
        ty: Type::NonNullList(Box::new(Type::Named(ENTITY_UNION_NAME))),
        directives: Default::default(),
    })
}

/// `union _Entity = ...` over the discovered entity type names.
///
/// The union is built fresh for every build; the member list is never cached
/// or shared between schemas.
pub fn entity_union_type(members: impl IntoIterator<Item = Name>) -> ExtendedType {
    ExtendedType::Union(Node::new(UnionType {
        description: None,
        name: ENTITY_UNION_NAME,
        directives: Default::default(),
        members: members.into_iter().map(ComponentName::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_has_a_non_null_sdl_string_field() {
        let ExtendedType::Object(service) = service_object_type() else {
            panic!("_Service must be an object type");
        };
        let sdl_field = service.fields.get("sdl").expect("sdl field");
        assert_eq!(sdl_field.ty.to_string(), "String!");
        assert!(sdl_field.arguments.is_empty());
    }

    #[test]
    fn entities_field_takes_non_null_list_of_non_null_any() {
        let field = entities_query_field();
        assert_eq!(field.ty.to_string(), "[_Entity]!");
        let representations = field
            .arguments
            .first()
            .expect("representations argument");
        assert_eq!(representations.name, REPRESENTATIONS_ARGUMENT_NAME);
        assert_eq!(representations.ty.to_string(), "[_Any!]!");
    }

    #[test]
    fn service_field_is_non_null() {
        assert_eq!(service_query_field().ty.to_string(), "_Service!");
    }

    #[test]
    fn entity_union_preserves_member_order() {
        let ExtendedType::Union(union_) =
            entity_union_type([name!("Product"), name!("User")])
        else {
            panic!("_Entity must be a union type");
        };
        let members: Vec<_> = union_.members.iter().map(|member| member.name.clone()).collect();
        assert_eq!(members, vec![name!("Product"), name!("User")]);
    }
}
