//! SDL rendering with definition-level filtering.
//!
//! [`print_schema`] behaves like a full-fidelity SDL printer, with two
//! injected predicates that suppress individual directive definitions and
//! type definitions from the output. Suppression is definition-only:
//! directive *usages* on visible definitions still render, and references to
//! hidden types from visible fields still print by name. Definitions are
//! emitted alphabetically within each category so the same schema always
//! renders to the same text.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;
use itertools::Itertools;

/// Predicate deciding whether the named definition appears in the output.
pub type NameFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Controls for [`print_schema`]. The default renders everything.
#[derive(Clone)]
pub struct PrintOptions {
    /// Render scalar type definitions.
    pub include_scalar_types: bool,
    /// Always render the `schema { ... }` block. When off, the block is
    /// still emitted if a root operation uses a non-default type name, since
    /// the output must stay valid standalone SDL.
    pub include_schema_definition: bool,
    /// Render directive applications on definitions and the schema block.
    pub include_directive_usages: bool,
    /// Keeps a directive definition iff it returns true for its name.
    pub directive_definition_filter: NameFilter,
    /// Keeps a type definition iff it returns true for its name.
    pub type_definition_filter: NameFilter,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            include_scalar_types: true,
            include_schema_definition: true,
            include_directive_usages: true,
            directive_definition_filter: Arc::new(|_| true),
            type_definition_filter: Arc::new(|_| true),
        }
    }
}

impl fmt::Debug for PrintOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintOptions")
            .field("include_scalar_types", &self.include_scalar_types)
            .field("include_schema_definition", &self.include_schema_definition)
            .field("include_directive_usages", &self.include_directive_usages)
            .finish_non_exhaustive()
    }
}

/// Renders `schema` as SDL text, honoring the filters in `options`.
pub fn print_schema(schema: &Schema, options: &PrintOptions) -> String {
    let mut definitions: Vec<String> = Vec::new();
    if let Some(block) = schema_definition_block(schema, options) {
        definitions.push(block);
    }
    for (name, definition) in schema
        .directive_definitions
        .iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
    {
        if !(options.directive_definition_filter)(name.as_str()) {
            continue;
        }
        definitions.push(definition.to_string());
    }
    for (name, ty) in schema.types.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        if ty.is_built_in() || name.as_str().starts_with("__") {
            continue;
        }
        if !options.include_scalar_types && matches!(ty, ExtendedType::Scalar(_)) {
            continue;
        }
        if !(options.type_definition_filter)(name.as_str()) {
            continue;
        }
        if options.include_directive_usages {
            definitions.push(ty.to_string());
        } else {
            definitions.push(without_directive_usages(ty).to_string());
        }
    }
    tracing::trace!(count = definitions.len(), "rendered SDL definitions");
    let mut sdl = definitions
        .iter()
        .map(|definition| definition.trim_end())
        .join("\n\n");
    sdl.push('\n');
    sdl
}

fn schema_definition_block(schema: &Schema, options: &PrintOptions) -> Option<String> {
    let definition = &schema.schema_definition;
    if definition.query.is_none() && definition.mutation.is_none() && definition.subscription.is_none()
    {
        // A schema block with no operation types would not parse back.
        return None;
    }
    let non_default_roots = definition
        .query
        .as_ref()
        .is_some_and(|query| query.name.as_str() != "Query")
        || definition
            .mutation
            .as_ref()
            .is_some_and(|mutation| mutation.name.as_str() != "Mutation")
        || definition
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.name.as_str() != "Subscription");
    let rendered_directives = options.include_directive_usages && !definition.directives.is_empty();
    if !options.include_schema_definition && !non_default_roots && !rendered_directives {
        return None;
    }

    let mut block = String::from("schema");
    if options.include_directive_usages {
        for directive in definition.directives.iter() {
            block.push(' ');
            block.push_str(&directive.to_string());
        }
    }
    block.push_str(" {\n");
    if let Some(query) = &definition.query {
        block.push_str(&format!("  query: {}\n", query.name));
    }
    if let Some(mutation) = &definition.mutation {
        block.push_str(&format!("  mutation: {}\n", mutation.name));
    }
    if let Some(subscription) = &definition.subscription {
        block.push_str(&format!("  subscription: {}\n", subscription.name));
    }
    block.push('}');
    Some(block)
}

/// Copy of `ty` with every directive application removed, from the type down
/// through fields, arguments, enum values, and input fields.
fn without_directive_usages(ty: &ExtendedType) -> ExtendedType {
    let mut ty = ty.clone();
    match &mut ty {
        ExtendedType::Scalar(scalar) => {
            scalar.make_mut().directives = Default::default();
        }
        ExtendedType::Object(object) => {
            let object = object.make_mut();
            object.directives = Default::default();
            for field in object.fields.values_mut() {
                let field = field.make_mut();
                field.directives = Default::default();
                for argument in &mut field.arguments {
                    argument.make_mut().directives = Default::default();
                }
            }
        }
        ExtendedType::Interface(interface) => {
            let interface = interface.make_mut();
            interface.directives = Default::default();
            for field in interface.fields.values_mut() {
                let field = field.make_mut();
                field.directives = Default::default();
                for argument in &mut field.arguments {
                    argument.make_mut().directives = Default::default();
                }
            }
        }
        ExtendedType::Union(union_) => {
            union_.make_mut().directives = Default::default();
        }
        ExtendedType::Enum(enum_) => {
            let enum_ = enum_.make_mut();
            enum_.directives = Default::default();
            for value in enum_.values.values_mut() {
                value.make_mut().directives = Default::default();
            }
        }
        ExtendedType::InputObject(input_object) => {
            let input_object = input_object.make_mut();
            input_object.directives = Default::default();
            for field in input_object.fields.values_mut() {
                field.make_mut().directives = Default::default();
            }
        }
    }
    ty
}
