use std::fmt;
use std::fmt::Display;
use std::fmt::Write;

use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;
use serde::Serialize;

/// Position reported with a composition error.
///
/// Subgraph schemas are assembled from programmatic parts, so composition
/// errors have no source text to point into. They all carry the fixed
/// out-of-band marker [`NO_LOCATION`] instead of a real offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub line: i32,
    pub column: i32,
}

/// The location attached to every composition error.
pub const NO_LOCATION: ErrorLocation = ErrorLocation {
    line: -1,
    column: -1,
};

/// Classification tag reported with every composition error, matching the
/// error-type tag GraphQL servers attach to schema problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum ErrorClassification {
    ValidationError,
}

/// Wire-shaped view of a composition error: the message, the no-location
/// marker, and the classification, ready to serialize into a GraphQL error
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQLError {
    pub message: String,
    pub locations: Vec<ErrorLocation>,
    #[serde(rename = "errorType")]
    pub error_type: ErrorClassification,
}

/// One problem found while building a subgraph schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SingleFederationError {
    /// An entity type was discovered but nothing resolves the concrete type
    /// of an `_Entity` value.
    #[error("Missing a type resolver for _Entity")]
    MissingEntityTypeResolver,
    /// An entity type was discovered but nothing fetches `Query._entities`.
    #[error("Missing a data fetcher for _entities")]
    MissingEntitiesDataFetcher,
    /// The schema was rejected by apollo-compiler validation.
    #[error("{message}")]
    InvalidGraphQL { message: String },
    /// A state the input contract rules out was reached anyway.
    #[error("{message}")]
    Internal { message: String },
}

impl SingleFederationError {
    pub fn locations(&self) -> Vec<ErrorLocation> {
        vec![NO_LOCATION]
    }

    pub fn classification(&self) -> ErrorClassification {
        ErrorClassification::ValidationError
    }

    pub fn to_graphql_error(&self) -> GraphQLError {
        GraphQLError {
            message: self.to_string(),
            locations: self.locations(),
            error_type: self.classification(),
        }
    }
}

/// All problems found during one build, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipleFederationErrors {
    pub errors: Vec<SingleFederationError>,
}

impl MultipleFederationErrors {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    pub fn push(&mut self, error: SingleFederationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collapses the accumulated errors: success when empty, the lone error
    /// when there is exactly one, the aggregate otherwise.
    pub fn into_result(mut self) -> Result<(), FederationError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0).into()),
            _ => Err(self.into()),
        }
    }
}

impl Display for MultipleFederationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The following errors occurred:")?;
        for error in &self.errors {
            write!(f, "\n  - ")?;
            for c in error.to_string().chars() {
                if c == '\n' {
                    write!(f, "\n    ")?;
                } else {
                    f.write_char(c)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for MultipleFederationErrors {}

impl FromIterator<SingleFederationError> for MultipleFederationErrors {
    fn from_iter<T: IntoIterator<Item = SingleFederationError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Failure of a subgraph build: either a single composition error or an
/// aggregate of every problem found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FederationError {
    #[error(transparent)]
    SingleFederationError(#[from] SingleFederationError),
    #[error(transparent)]
    MultipleFederationErrors(#[from] MultipleFederationErrors),
}

impl FederationError {
    pub fn internal(message: impl Into<String>) -> Self {
        SingleFederationError::Internal {
            message: message.into(),
        }
        .into()
    }

    /// Uniform view of the underlying errors, whatever the arity.
    pub fn errors(&self) -> Vec<&SingleFederationError> {
        match self {
            Self::SingleFederationError(error) => vec![error],
            Self::MultipleFederationErrors(errors) => errors.errors.iter().collect(),
        }
    }

    pub fn to_graphql_errors(&self) -> Vec<GraphQLError> {
        self.errors()
            .into_iter()
            .map(SingleFederationError::to_graphql_error)
            .collect()
    }
}

impl From<DiagnosticList> for FederationError {
    fn from(diagnostics: DiagnosticList) -> Self {
        diagnostics
            .iter()
            .map(|diagnostic| SingleFederationError::InvalidGraphQL {
                message: diagnostic.to_string(),
            })
            .collect::<MultipleFederationErrors>()
            .into()
    }
}

impl<T> From<WithErrors<T>> for FederationError {
    fn from(value: WithErrors<T>) -> Self {
        value.errors.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_error_displays_its_message_alone() {
        let error: FederationError = SingleFederationError::MissingEntityTypeResolver.into();
        assert_eq!(error.to_string(), "Missing a type resolver for _Entity");
    }

    #[test]
    fn multiple_errors_display_as_indented_list() {
        let mut errors = MultipleFederationErrors::new();
        errors.push(SingleFederationError::MissingEntityTypeResolver);
        errors.push(SingleFederationError::MissingEntitiesDataFetcher);
        assert_eq!(
            errors.to_string(),
            "The following errors occurred:\n  \
             - Missing a type resolver for _Entity\n  \
             - Missing a data fetcher for _entities"
        );
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(MultipleFederationErrors::new().into_result().is_ok());
    }

    #[test]
    fn into_result_collapses_a_singleton_to_the_single_error() {
        let mut errors = MultipleFederationErrors::new();
        errors.push(SingleFederationError::MissingEntitiesDataFetcher);
        let error = errors.into_result().expect_err("one error expected");
        assert!(matches!(
            error,
            FederationError::SingleFederationError(SingleFederationError::MissingEntitiesDataFetcher)
        ));
    }

    #[test]
    fn every_error_reports_the_no_location_marker_and_validation_class() {
        let error = SingleFederationError::MissingEntitiesDataFetcher.to_graphql_error();
        assert_eq!(error.locations, vec![NO_LOCATION]);
        assert_eq!(error.error_type, ErrorClassification::ValidationError);
        assert_eq!(
            serde_json::to_value(&error).expect("serializable error"),
            serde_json::json!({
                "message": "Missing a data fetcher for _entities",
                "locations": [{ "line": -1, "column": -1 }],
                "errorType": "ValidationError",
            })
        );
    }

    #[test]
    fn aggregate_errors_expose_each_graphql_error() {
        let error: FederationError = MultipleFederationErrors {
            errors: vec![
                SingleFederationError::MissingEntityTypeResolver,
                SingleFederationError::MissingEntitiesDataFetcher,
            ],
        }
        .into();
        let rendered = error.to_graphql_errors();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].message, "Missing a type resolver for _Entity");
        assert_eq!(rendered[1].message, "Missing a data fetcher for _entities");
    }
}
