//! Transforms an executable GraphQL schema into an Apollo Federation subgraph.
//!
//! [`federate`] copies the caller's schema and code registry, grafts the
//! federation surface onto the copy (directive definitions, `_Service`,
//! `_Any`, and for schemas with entities the `_Entity` union and
//! `Query._entities`), and binds the data fetchers backing `Query._service`.
//! The SDL published through `_service` is computed from the schema as it
//! stood before the graft, with federation and built-in directive
//! definitions hidden so the text can be composed into a supergraph.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexSet;
use apollo_compiler::name;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::validation::Valid;
use indexmap::map::Entry;
use serde_json_bytes::json;

use crate::ExecutableSchema;
use crate::directives::KEY_DIRECTIVE_NAME;
use crate::directives::all_directive_definitions;
use crate::directives::all_directive_names;
use crate::error::FederationError;
use crate::error::MultipleFederationErrors;
use crate::error::SingleFederationError;
use crate::registry::CodeRegistry;
use crate::registry::Coercing;
use crate::registry::ConstantFetcher;
use crate::registry::DataFetcher;
use crate::registry::DataFetcherFactory;
use crate::registry::FieldCoordinates;
use crate::registry::IdentityCoercing;
use crate::registry::StringCoercing;
use crate::registry::TypeResolver;
use crate::sdl::PrintOptions;
use crate::sdl::print_schema;
use crate::spec::ANY_SCALAR_NAME;
use crate::spec::ENTITIES_QUERY_NAME;
use crate::spec::ENTITY_UNION_NAME;
use crate::spec::FIELDSET_SCALAR_NAME;
use crate::spec::SDL_FIELD_NAME;
use crate::spec::SERVICE_QUERY_NAME;
use crate::spec::SERVICE_TYPE_NAME;
use crate::spec::any_scalar_type;
use crate::spec::entities_query_field;
use crate::spec::entity_union_type;
use crate::spec::federation_type_names;
use crate::spec::fieldset_scalar_type;
use crate::spec::service_object_type;
use crate::spec::service_query_field;

/// Built-in directives whose definitions never appear in published SDL.
const STANDARD_DIRECTIVE_NAMES: [Name; 4] = [
    name!("deprecated"),
    name!("include"),
    name!("skip"),
    name!("specifiedBy"),
];

const DEFAULT_QUERY_TYPE_NAME: Name = name!("Query");

/// Where the data fetcher for `Query._entities` comes from.
///
/// With `Unset`, the fetcher must already be bound in the code registry
/// under the query root's `_entities` coordinates.
#[derive(Clone, Default)]
pub enum EntityResolution {
    /// Bind this fetcher as-is.
    Direct(Arc<dyn DataFetcher>),
    /// Ask the factory to create the fetcher for the `_entities` coordinates.
    Factory(Arc<dyn DataFetcherFactory>),
    #[default]
    Unset,
}

impl fmt::Debug for EntityResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Unset => f.write_str("Unset"),
        }
    }
}

/// Caller-supplied wiring for [`federate`].
///
/// The defaults assume the code registry already carries any required
/// entity wiring and coerce `_Any` values verbatim.
#[derive(Clone)]
pub struct SubgraphOptions {
    /// Resolves each `_entities` result item to its concrete object type.
    pub entity_type_resolver: Option<Arc<dyn TypeResolver>>,
    /// Supplies the data fetcher for `Query._entities`.
    pub entity_resolution: EntityResolution,
    /// Coercing bound to the `_Any` scalar, unless one is already registered.
    pub any_coercing: Arc<dyn Coercing>,
}

impl Default for SubgraphOptions {
    fn default() -> Self {
        Self {
            entity_type_resolver: None,
            entity_resolution: EntityResolution::Unset,
            any_coercing: Arc::new(IdentityCoercing),
        }
    }
}

impl fmt::Debug for SubgraphOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubgraphOptions")
            .field("entity_type_resolver", &self.entity_type_resolver.is_some())
            .field("entity_resolution", &self.entity_resolution)
            .finish_non_exhaustive()
    }
}

/// A federation-ready schema and the code registry that executes it.
///
/// The SDL behind `_service` is fixed when the subgraph is built. Mutating
/// `schema` afterwards does not change what `_service` returns.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub schema: Valid<Schema>,
    pub code_registry: CodeRegistry,
}

/// Builds a [`Subgraph`] from `executable` without modifying it.
///
/// Fails if the schema has entities but neither `options` nor the code
/// registry supply the `_Entity` type resolver and `_entities` data fetcher,
/// or if the grafted schema does not validate.
pub fn federate(
    executable: &ExecutableSchema,
    options: &SubgraphOptions,
) -> Result<Subgraph, FederationError> {
    let entity_names = locate_entities(&executable.schema);
    let query_root = executable
        .schema
        .schema_definition
        .query
        .as_ref()
        .map(|query| query.name.clone())
        .unwrap_or(DEFAULT_QUERY_TYPE_NAME);
    validate_entity_wiring(executable, options, &entity_names, &query_root)?;
    tracing::debug!(
        entities = entity_names.len(),
        query_root = %query_root,
        "federating subgraph schema"
    );

    // The published SDL reflects the schema as handed to us, not the graft.
    let sdl = sdl(&executable.schema);
    let mut schema = executable.schema.clone();
    let mut code_registry = executable.code_registry.clone();
    graft_federation_definitions(&mut schema, &entity_names)?;
    bind_federation_code(&mut code_registry, options, &entity_names, &query_root, sdl);
    let schema = schema.validate()?;
    Ok(Subgraph {
        schema,
        code_registry,
    })
}

/// Renders `schema` as the SDL a gateway composes from.
///
/// Federation directive definitions, built-in directive definitions, and
/// federation type definitions are hidden. Directive applications such as
/// `@key(fields: "id")` still render on the definitions that carry them,
/// and the `schema { ... }` block renders even when every root operation
/// uses its default type name.
pub fn sdl(schema: &Schema) -> String {
    let hidden_directives: IndexSet<String> = all_directive_names()
        .into_iter()
        .chain(STANDARD_DIRECTIVE_NAMES)
        .map(|name| name.to_string())
        .collect();
    let hidden_types: IndexSet<String> = federation_type_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let options = PrintOptions {
        include_scalar_types: true,
        include_schema_definition: true,
        include_directive_usages: true,
        directive_definition_filter: Arc::new(move |name| !hidden_directives.contains(name)),
        type_definition_filter: Arc::new(move |name| !hidden_types.contains(name)),
    };
    print_schema(schema, &options)
}

/// Names of the object types that belong in the `_Entity` union, in schema
/// order.
///
/// A type is an entity if it carries `@key` itself or implements an
/// interface that does. Interfaces never join the union, but their `@key`
/// makes every implementing object type a member.
fn locate_entities(schema: &Schema) -> IndexSet<Name> {
    let keyed_interfaces: IndexSet<Name> = schema
        .types
        .iter()
        .filter(|(_, ty)| matches!(ty, ExtendedType::Interface(_)) && has_key_directive(ty))
        .map(|(name, _)| name.clone())
        .collect();
    let mut entities = IndexSet::default();
    for (name, ty) in &schema.types {
        let ExtendedType::Object(object) = ty else {
            continue;
        };
        let inherits_key = object
            .implements_interfaces
            .iter()
            .any(|interface| keyed_interfaces.contains(&interface.name));
        if has_key_directive(ty) || inherits_key {
            entities.insert(name.clone());
        }
    }
    entities
}

fn has_key_directive(ty: &ExtendedType) -> bool {
    ty.directives().has(KEY_DIRECTIVE_NAME.as_str())
}

/// Checks that entity wiring is available before anything gets built, so
/// the caller sees every gap at once.
fn validate_entity_wiring(
    executable: &ExecutableSchema,
    options: &SubgraphOptions,
    entity_names: &IndexSet<Name>,
    query_root: &Name,
) -> Result<(), FederationError> {
    if entity_names.is_empty() {
        return Ok(());
    }
    let mut errors = MultipleFederationErrors::new();
    let resolver_available = options.entity_type_resolver.is_some()
        || executable
            .code_registry
            .has_type_resolver(ENTITY_UNION_NAME.as_str());
    if !resolver_available {
        errors.push(SingleFederationError::MissingEntityTypeResolver);
    }
    let fetcher_available = !matches!(options.entity_resolution, EntityResolution::Unset)
        || executable
            .code_registry
            .has_data_fetcher(&FieldCoordinates::new(
                query_root.clone(),
                ENTITIES_QUERY_NAME,
            ));
    if !fetcher_available {
        errors.push(SingleFederationError::MissingEntitiesDataFetcher);
    }
    errors.into_result()
}

/// Inserts the federation directive definitions, federation types, and root
/// fields into `schema`. Definitions already present in the schema win.
///
/// Fails only when the named query root turns out not to be an object type,
/// which a valid input schema cannot produce.
fn graft_federation_definitions(
    schema: &mut Schema,
    entity_names: &IndexSet<Name>,
) -> Result<(), FederationError> {
    for definition in all_directive_definitions() {
        if let Entry::Vacant(entry) = schema.directive_definitions.entry(definition.name.clone()) {
            entry.insert(definition);
        }
    }
    schema
        .types
        .entry(FIELDSET_SCALAR_NAME)
        .or_insert_with(fieldset_scalar_type);
    schema
        .types
        .entry(SERVICE_TYPE_NAME)
        .or_insert_with(service_object_type);
    if !entity_names.is_empty() {
        schema
            .types
            .entry(ANY_SCALAR_NAME)
            .or_insert_with(any_scalar_type);
        // Always freshly built so the membership matches this schema.
        schema.types.insert(
            ENTITY_UNION_NAME,
            entity_union_type(entity_names.iter().cloned()),
        );
    }

    let query_root = schema
        .schema_definition
        .make_mut()
        .query
        .get_or_insert(ComponentName::from(DEFAULT_QUERY_TYPE_NAME))
        .name
        .clone();
    let root_type = schema.types.entry(query_root.clone()).or_insert_with(|| {
        ExtendedType::Object(Node::new(ObjectType {
            description: None,
            name: query_root.clone(),
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields: Default::default(),
        }))
    });
    let ExtendedType::Object(query_type) = root_type else {
        return Err(FederationError::internal(format!(
            "query root type {query_root} is not an object type"
        )));
    };
    let query_type = query_type.make_mut();
    query_type
        .fields
        .entry(SERVICE_QUERY_NAME)
        .or_insert_with(service_query_field);
    if !entity_names.is_empty() {
        query_type
            .fields
            .entry(ENTITIES_QUERY_NAME)
            .or_insert_with(entities_query_field);
    }
    Ok(())
}

/// Registers the fetchers, resolver, and coercing behind the grafted
/// definitions. Wiring availability was checked up front, so `Unset` here
/// means the registry already holds the `_entities` fetcher.
fn bind_federation_code(
    code_registry: &mut CodeRegistry,
    options: &SubgraphOptions,
    entity_names: &IndexSet<Name>,
    query_root: &Name,
    sdl: String,
) {
    if !code_registry.has_coercing(FIELDSET_SCALAR_NAME.as_str()) {
        code_registry.bind_coercing(FIELDSET_SCALAR_NAME, Arc::new(StringCoercing));
    }
    code_registry.bind_data_fetcher(
        FieldCoordinates::new(SERVICE_TYPE_NAME, SDL_FIELD_NAME),
        Arc::new(ConstantFetcher::new(json!(sdl.clone()))),
    );
    code_registry.bind_data_fetcher(
        FieldCoordinates::new(query_root.clone(), SERVICE_QUERY_NAME),
        Arc::new(ConstantFetcher::new(json!({ "sdl": sdl }))),
    );
    if entity_names.is_empty() {
        return;
    }
    if !code_registry.has_coercing(ANY_SCALAR_NAME.as_str()) {
        code_registry.bind_coercing(ANY_SCALAR_NAME, options.any_coercing.clone());
    }
    let entities_coordinates = FieldCoordinates::new(query_root.clone(), ENTITIES_QUERY_NAME);
    match &options.entity_resolution {
        EntityResolution::Direct(fetcher) => {
            code_registry.bind_data_fetcher(entities_coordinates, fetcher.clone());
        }
        EntityResolution::Factory(factory) => {
            let fetcher = factory.create(&entities_coordinates);
            code_registry.bind_data_fetcher(entities_coordinates, fetcher);
        }
        EntityResolution::Unset => {}
    }
    if let Some(resolver) = &options.entity_type_resolver {
        code_registry.bind_type_resolver(ENTITY_UNION_NAME, resolver.clone());
    }
}
