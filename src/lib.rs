//! Apollo Federation support for GraphQL subgraph services.
//!
//! A subgraph service owns one piece of a federated graph. This crate takes
//! the service's ordinary GraphQL schema, together with the data fetchers
//! and type resolvers that execute it, and produces the schema a federation
//! gateway talks to: the federation directives and types are grafted in,
//! `Query._service` publishes the subgraph's SDL, and for schemas with
//! entities `Query._entities` resolves representations through the caller's
//! wiring.
//!
//! [`federate`] is the entry point and [`Subgraph`] is what it produces.
//! The input schema and registry are never modified, so a caller can
//! federate the same [`ExecutableSchema`] more than once.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod directives;
pub mod error;
pub mod registry;
pub mod sdl;
pub mod spec;
pub mod subgraph;

use apollo_compiler::Schema;

use crate::error::FederationError;
use crate::registry::CodeRegistry;
pub use crate::subgraph::EntityResolution;
pub use crate::subgraph::Subgraph;
pub use crate::subgraph::SubgraphOptions;
pub use crate::subgraph::federate;

/// A GraphQL schema paired with the code registry that executes it.
///
/// This is the input to [`federate`]. The schema holds the type system, the
/// registry holds the data fetchers, type resolvers, and scalar coercings
/// the service runs at execution time.
#[derive(Debug, Clone)]
pub struct ExecutableSchema {
    pub schema: Schema,
    pub code_registry: CodeRegistry,
}

impl ExecutableSchema {
    pub fn new(schema: Schema, code_registry: CodeRegistry) -> Self {
        Self {
            schema,
            code_registry,
        }
    }

    /// Parses `source_text` and pairs the schema with an empty registry.
    pub fn parse(source_text: &str) -> Result<Self, FederationError> {
        let schema = Schema::parse(source_text, "schema.graphql")?;
        Ok(Self::new(schema, CodeRegistry::new()))
    }
}

const _: () = {
    const fn assert_thread_safe<T: Sync + Send>() {}

    assert_thread_safe::<ExecutableSchema>();
    assert_thread_safe::<Subgraph>();
};

#[cfg(test)]
mod test_executable_schema {
    use super::*;

    #[test]
    fn parse_failures_surface_as_federation_errors() {
        let error = ExecutableSchema::parse("type {").expect_err("malformed document");
        assert!(!error.to_graphql_errors().is_empty());
    }

    #[test]
    fn parse_pairs_the_schema_with_an_empty_registry() {
        let executable = ExecutableSchema::parse("type Query { ok: Boolean }").expect("parses");
        assert!(executable.schema.types.contains_key("Query"));
        assert!(!executable.code_registry.has_type_resolver("_Entity"));
    }
}
