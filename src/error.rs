use std::path::PathBuf;
use thiserror::Error;

use k_nn::KnnError;

/// Error type returned by a [`Classifier`](crate::Classifier) implementation.
pub type ClassifierError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while turning an observation into a label.
///
/// Everything here is recoverable: the caller fixes its input and resubmits.
/// An unmapped class index is not an error, see
/// [`Diagnosis::Unresolved`](crate::Diagnosis::Unresolved).
#[derive(Debug, Error)]
pub enum PredictError {
    /// An ordered flag sequence whose length differs from the catalog size.
    #[error("expected {expected} symptom flags, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    /// Input that is neither a code mapping nor a flag sequence.
    #[error("observation must be a mapping of symptom codes or a sequence of flags, got {found}")]
    UnsupportedInputType { found: &'static str },
    /// A mapping key outside the catalog, under the reject policy.
    #[error("unknown symptom code `{code}`")]
    UnknownSymptom { code: String },
    /// A flag that is not 0/1 or true/false.
    #[error("symptom {symptom} has flag {value}, expected 0 or 1")]
    InvalidFlag { symptom: String, value: String },
    /// The classifier was built for a different number of features than the catalog has.
    #[error("classifier expects {classifier} features but the catalog has {catalog} symptoms")]
    FeatureCountMismatch { catalog: usize, classifier: usize },
    /// The classifier itself reported a failure.
    #[error("classifier failed: {0}")]
    Classifier(#[source] ClassifierError),
    /// The classifier returned no class for the row.
    #[error("classifier returned no prediction")]
    EmptyClassifierOutput,
}

/// The classifier artifact could not be loaded. Serving must not start.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model unavailable at {}: {reason}", path.display())]
    ModelUnavailable {
        path: PathBuf,
        #[source]
        reason: ArtifactError,
    },
}

impl ModelError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ModelError::ModelUnavailable { path, .. } => path,
        }
    }
}

/// Why an artifact was rejected.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported artifact format version {found}, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("artifact contains no reference points")]
    Empty,
    #[error("reference point {index} has {actual} features, artifact declares {declared}")]
    FeatureCount {
        index: usize,
        declared: usize,
        actual: usize,
    },
    #[error("invalid classifier parameters: {0}")]
    Knn(#[from] KnnError),
}

/// A knowledge base document was unreadable or inconsistent.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("cannot read knowledge base: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("symptom catalog is empty")]
    EmptyCatalog,
    #[error("duplicate symptom code `{0}`")]
    DuplicateSymptom(String),
    #[error("disease table is empty")]
    EmptyDiseaseTable,
    #[error("duplicate disease class {0}")]
    DuplicateClass(usize),
}
