//! Resolver bindings for a schema.
//!
//! A GraphQL engine pairs a type system with the code that produces values
//! for it. [`CodeRegistry`] is that pairing table: data fetchers keyed by
//! `Type.field` coordinates, runtime type resolvers keyed by abstract type
//! name, and scalar coercions keyed by scalar name. The registry only stores
//! bindings; invoking them is the embedding engine's business.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::response::JsonMap;
use apollo_compiler::response::JsonValue;
use indexmap::IndexMap;

/// Address of a single field definition, displayed as `Type.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCoordinates {
    pub type_name: Name,
    pub field_name: Name,
}

impl FieldCoordinates {
    pub fn new(type_name: Name, field_name: Name) -> Self {
        Self {
            type_name,
            field_name,
        }
    }
}

impl fmt::Display for FieldCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// Failure reported by a data fetcher or a coercion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the embedding engine hands a data fetcher when it invokes it: the
/// parent object value and the coerced field arguments.
#[derive(Debug, Clone)]
pub struct DataFetchingEnvironment {
    pub source: JsonValue,
    pub arguments: JsonMap,
}

impl Default for DataFetchingEnvironment {
    fn default() -> Self {
        Self {
            source: JsonValue::Null,
            arguments: JsonMap::default(),
        }
    }
}

/// Produces the value of one field.
pub trait DataFetcher: Send + Sync {
    fn fetch(&self, environment: &DataFetchingEnvironment) -> Result<JsonValue, FieldError>;
}

impl<F> DataFetcher for F
where
    F: Fn(&DataFetchingEnvironment) -> Result<JsonValue, FieldError> + Send + Sync,
{
    fn fetch(&self, environment: &DataFetchingEnvironment) -> Result<JsonValue, FieldError> {
        self(environment)
    }
}

/// Fetcher returning one fixed value, however it is invoked.
#[derive(Debug, Clone)]
pub struct ConstantFetcher {
    value: JsonValue,
}

impl ConstantFetcher {
    pub fn new(value: JsonValue) -> Self {
        Self { value }
    }
}

impl DataFetcher for ConstantFetcher {
    fn fetch(&self, _environment: &DataFetchingEnvironment) -> Result<JsonValue, FieldError> {
        Ok(self.value.clone())
    }
}

/// Maps a runtime value of an abstract type to the name of the concrete
/// object type it belongs to.
pub trait TypeResolver: Send + Sync {
    fn resolve_type(&self, value: &JsonValue) -> Option<Name>;
}

impl<F> TypeResolver for F
where
    F: Fn(&JsonValue) -> Option<Name> + Send + Sync,
{
    fn resolve_type(&self, value: &JsonValue) -> Option<Name> {
        self(value)
    }
}

/// Builds a data fetcher for a binding site, for callers that cannot share
/// one fetcher across builds.
pub trait DataFetcherFactory: Send + Sync {
    fn create(&self, coordinates: &FieldCoordinates) -> Arc<dyn DataFetcher>;
}

impl<F> DataFetcherFactory for F
where
    F: Fn(&FieldCoordinates) -> Arc<dyn DataFetcher> + Send + Sync,
{
    fn create(&self, coordinates: &FieldCoordinates) -> Arc<dyn DataFetcher> {
        self(coordinates)
    }
}

/// Serialization behavior of a custom scalar.
pub trait Coercing: Send + Sync {
    /// Converts an internal value to its wire form.
    fn serialize(&self, value: &JsonValue) -> Result<JsonValue, FieldError>;
    /// Converts a wire value to its internal form.
    fn parse_value(&self, value: &JsonValue) -> Result<JsonValue, FieldError>;
}

/// Passes values through unchanged in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCoercing;

impl Coercing for IdentityCoercing {
    fn serialize(&self, value: &JsonValue) -> Result<JsonValue, FieldError> {
        Ok(value.clone())
    }

    fn parse_value(&self, value: &JsonValue) -> Result<JsonValue, FieldError> {
        Ok(value.clone())
    }
}

/// Delegates to the built-in `String` scalar's rules: strings pass through,
/// anything else is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCoercing;

impl StringCoercing {
    fn coerce(value: &JsonValue) -> Result<JsonValue, FieldError> {
        if value.is_string() {
            Ok(value.clone())
        } else {
            Err(FieldError::new(format!(
                "expected a string value, found: {value}"
            )))
        }
    }
}

impl Coercing for StringCoercing {
    fn serialize(&self, value: &JsonValue) -> Result<JsonValue, FieldError> {
        Self::coerce(value)
    }

    fn parse_value(&self, value: &JsonValue) -> Result<JsonValue, FieldError> {
        Self::coerce(value)
    }
}

/// The resolver-binding table of a schema.
///
/// Rebinding a key replaces the previous binding. Iteration order is
/// insertion order, which keeps diagnostics deterministic.
#[derive(Clone, Default)]
pub struct CodeRegistry {
    data_fetchers: IndexMap<FieldCoordinates, Arc<dyn DataFetcher>>,
    type_resolvers: IndexMap<Name, Arc<dyn TypeResolver>>,
    coercings: IndexMap<Name, Arc<dyn Coercing>>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_data_fetcher(&mut self, coordinates: FieldCoordinates, fetcher: Arc<dyn DataFetcher>) {
        self.data_fetchers.insert(coordinates, fetcher);
    }

    pub fn has_data_fetcher(&self, coordinates: &FieldCoordinates) -> bool {
        self.data_fetchers.contains_key(coordinates)
    }

    pub fn data_fetcher(&self, coordinates: &FieldCoordinates) -> Option<&Arc<dyn DataFetcher>> {
        self.data_fetchers.get(coordinates)
    }

    pub fn bind_type_resolver(&mut self, type_name: Name, resolver: Arc<dyn TypeResolver>) {
        self.type_resolvers.insert(type_name, resolver);
    }

    pub fn has_type_resolver(&self, type_name: &str) -> bool {
        self.type_resolvers.contains_key(type_name)
    }

    pub fn type_resolver(&self, type_name: &str) -> Option<&Arc<dyn TypeResolver>> {
        self.type_resolvers.get(type_name)
    }

    pub fn bind_coercing(&mut self, scalar_name: Name, coercing: Arc<dyn Coercing>) {
        self.coercings.insert(scalar_name, coercing);
    }

    pub fn has_coercing(&self, scalar_name: &str) -> bool {
        self.coercings.contains_key(scalar_name)
    }

    pub fn coercing(&self, scalar_name: &str) -> Option<&Arc<dyn Coercing>> {
        self.coercings.get(scalar_name)
    }
}

impl fmt::Debug for CodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeRegistry")
            .field(
                "data_fetchers",
                &self.data_fetchers.keys().collect::<Vec<_>>(),
            )
            .field(
                "type_resolvers",
                &self.type_resolvers.keys().collect::<Vec<_>>(),
            )
            .field("coercings", &self.coercings.keys().collect::<Vec<_>>())
            .finish()
    }
}
