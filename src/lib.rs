//! Maps a vector of clinical symptom flags to a pregnancy-complication label
//! using a pre-trained classifier.
//!
//! ```no_run
//! use gestadx::{KnowledgeBase, Observation, Predictor, load_model};
//!
//! let model = load_model("models/pregnancy_knn.json")?;
//! let knowledge = KnowledgeBase::pregnancy();
//! let predictor = Predictor::new(&model, &knowledge)?;
//! let label = predictor.predict(&Observation::from_present(["G5", "G6", "G7"]))?;
//! println!("{label}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod classifier;
mod error;
mod knowledge;
mod model;
mod observation;
mod predictor;

pub use classifier::Classifier;
pub use error::{ArtifactError, ClassifierError, KnowledgeBaseError, ModelError, PredictError};
pub use knowledge::{
    DISCLAIMER, DiseaseTable, KnowledgeBase, Symptom, SymptomCatalog, UNRESOLVED_LABEL,
    UnknownSymptomPolicy,
};
pub use model::{ARTIFACT_FORMAT_VERSION, KnnModel, Metric, ModelArtifact, ReferencePoint, load_model};
pub use observation::Observation;
pub use predictor::{Diagnosis, FeatureVector, Predictor};
