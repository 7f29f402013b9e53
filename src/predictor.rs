use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::fmt::{Display, Formatter};

use dx_helpers::Float;

use crate::classifier::Classifier;
use crate::error::PredictError;
use crate::knowledge::{KnowledgeBase, UNRESOLVED_LABEL, UnknownSymptomPolicy};
use crate::observation::Observation;

/// An observation encoded as a single 1 x N row of 0/1 values in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array2<f64>);

impl FeatureVector {
    fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let row: Array1<f64> = flags.into_iter().map(f64::from_flag).collect();
        FeatureVector(row.insert_axis(Axis(0)))
    }

    /// The matrix handed to the classifier.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.0.row(0)
    }

    pub fn len(&self) -> usize {
        self.0.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.0.ncols() == 0
    }

    /// Number of symptoms encoded as present.
    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|&&x| x > 0.0).count()
    }
}

/// Outcome of a prediction, keeping "unknown" apart from genuine labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis<'a> {
    Resolved { class: usize, label: &'a str },
    /// The classifier emitted a class index the disease table does not know.
    Unresolved { class: usize },
}

impl<'a> Diagnosis<'a> {
    /// The disease label, or [`UNRESOLVED_LABEL`].
    pub fn label(&self) -> &'a str {
        match self {
            Diagnosis::Resolved { label, .. } => *label,
            Diagnosis::Unresolved { .. } => UNRESOLVED_LABEL,
        }
    }

    pub fn class(&self) -> usize {
        match self {
            Diagnosis::Resolved { class, .. } | Diagnosis::Unresolved { class } => *class,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Diagnosis::Resolved { .. })
    }
}

impl Display for Diagnosis<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps symptom observations to disease labels through a borrowed classifier.
///
/// The predictor holds no state of its own: the knowledge base and the
/// classifier are both lent to it and never mutated, so `predict` is a pure
/// function of its input.
pub struct Predictor<'a, C: Classifier + ?Sized> {
    classifier: &'a C,
    knowledge: &'a KnowledgeBase,
}

impl<'a, C: Classifier + ?Sized> Clone for Predictor<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C: Classifier + ?Sized> Copy for Predictor<'a, C> {}

impl<C: Classifier + ?Sized> std::fmt::Debug for Predictor<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("classifier", &self.classifier.name())
            .field("symptoms", &self.knowledge.catalog().len())
            .field("diseases", &self.knowledge.diseases().len())
            .finish()
    }
}

impl<'a, C: Classifier + ?Sized> Predictor<'a, C> {
    /// Creates a predictor over an already-loaded classifier.
    ///
    /// # Errors
    ///
    /// Returns `PredictError::FeatureCountMismatch` if the classifier reports
    /// an input width different from the catalog size.
    pub fn new(classifier: &'a C, knowledge: &'a KnowledgeBase) -> Result<Self, PredictError> {
        let catalog = knowledge.catalog().len();
        if let Some(n) = classifier.n_features() {
            if n != catalog {
                return Err(PredictError::FeatureCountMismatch {
                    catalog,
                    classifier: n,
                });
            }
        }
        Ok(Predictor {
            classifier,
            knowledge,
        })
    }

    pub fn knowledge(&self) -> &'a KnowledgeBase {
        self.knowledge
    }

    /// Validates `observation` and lays it out in catalog order.
    pub fn encode(&self, observation: &Observation) -> Result<FeatureVector, PredictError> {
        let catalog = self.knowledge.catalog();
        match observation {
            Observation::Keyed(flags) => {
                if self.knowledge.unknown_symptoms() == UnknownSymptomPolicy::Reject {
                    if let Some(code) = flags.keys().find(|code| !catalog.contains(code)) {
                        return Err(PredictError::UnknownSymptom { code: code.clone() });
                    }
                }
                Ok(FeatureVector::from_flags(
                    catalog
                        .codes()
                        .map(|code| flags.get(code).copied().unwrap_or(false)),
                ))
            }
            Observation::Sequence(flags) => {
                if flags.len() != catalog.len() {
                    return Err(PredictError::InvalidInputShape {
                        expected: catalog.len(),
                        actual: flags.len(),
                    });
                }
                Ok(FeatureVector::from_flags(flags.iter().copied()))
            }
        }
    }

    /// Runs the classifier and resolves its class index.
    pub fn diagnose(&self, observation: &Observation) -> Result<Diagnosis<'a>, PredictError> {
        let features = self.encode(observation)?;
        debug!(
            "encoded observation with {} of {} symptoms present",
            features.present_count(),
            features.len()
        );

        let class = self
            .classifier
            .predict(features.view())
            .map_err(PredictError::Classifier)?
            .first()
            .copied()
            .ok_or(PredictError::EmptyClassifierOutput)?;
        debug!("{} returned class {}", self.classifier.name(), class);

        Ok(match self.knowledge.diseases().resolve(class) {
            Some(label) => Diagnosis::Resolved { class, label },
            None => {
                warn!("class {} has no disease label", class);
                Diagnosis::Unresolved { class }
            }
        })
    }

    /// Returns the disease label for `observation`, or [`UNRESOLVED_LABEL`].
    pub fn predict(&self, observation: &Observation) -> Result<&'a str, PredictError> {
        self.diagnose(observation).map(|d| d.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::knowledge::{DiseaseTable, Symptom, SymptomCatalog};
    use std::sync::Mutex;

    /// Returns a fixed class and records what it was given.
    struct Stub {
        class: usize,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl Stub {
        fn new(class: usize) -> Self {
            Stub {
                class,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_seen(&self) -> Vec<f64> {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Classifier for Stub {
        fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
            assert_eq!(features.nrows(), 1);
            self.seen.lock().unwrap().push(features.row(0).to_vec());
            Ok(vec![self.class])
        }

        fn name(&self) -> String {
            "stub".to_string()
        }
    }

    fn tiny_kb() -> KnowledgeBase {
        let catalog = SymptomCatalog::new(vec![
            Symptom::new("A", "a", ""),
            Symptom::new("B", "b", ""),
            Symptom::new("C", "c", ""),
        ])
        .unwrap();
        KnowledgeBase::new(catalog, DiseaseTable::new([(0, "zero"), (1, "one")]).unwrap())
    }

    #[test]
    fn test_encode_keyed_in_catalog_order() {
        let kb = tiny_kb();
        let stub = Stub::new(0);
        let predictor = Predictor::new(&stub, &kb).unwrap();
        let fv = predictor
            .encode(&Observation::keyed([("C", true), ("A", true), ("B", false)]))
            .unwrap();
        assert_eq!(fv.row().to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(fv.view().shape(), &[1, 3]);
    }

    #[test]
    fn test_classifier_receives_encoded_row() {
        let kb = tiny_kb();
        let stub = Stub::new(1);
        let predictor = Predictor::new(&stub, &kb).unwrap();
        let label = predictor
            .predict(&Observation::sequence(vec![false, true, true]))
            .unwrap();
        assert_eq!(label, "one");
        assert_eq!(stub.last_seen(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unknown_symptom_policy() {
        let stub = Stub::new(0);
        let obs = Observation::keyed([("A", true), ("Z", true)]);

        let strict = tiny_kb();
        let err = Predictor::new(&stub, &strict).unwrap().predict(&obs).unwrap_err();
        assert!(matches!(err, PredictError::UnknownSymptom { ref code } if code == "Z"));

        let lenient = tiny_kb().with_unknown_symptom_policy(UnknownSymptomPolicy::Ignore);
        let predictor = Predictor::new(&stub, &lenient).unwrap();
        // dropped keys are not counted as present
        assert_eq!(obs.present_count(), 2);
        assert_eq!(predictor.encode(&obs).unwrap().present_count(), 1);
        assert_eq!(predictor.predict(&obs).unwrap(), "zero");
        assert_eq!(stub.last_seen(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_diagnosis_distinguishes_unresolved() {
        let kb = tiny_kb();
        let stub = Stub::new(9);
        let predictor = Predictor::new(&stub, &kb).unwrap();
        let diagnosis = predictor.diagnose(&Observation::keyed::<_, String>([])).unwrap();
        assert_eq!(diagnosis, Diagnosis::Unresolved { class: 9 });
        assert!(!diagnosis.is_resolved());
        assert_eq!(diagnosis.class(), 9);
        assert_eq!(diagnosis.to_string(), UNRESOLVED_LABEL);
    }

    #[test]
    fn test_feature_count_mismatch() {
        struct Wide;
        impl Classifier for Wide {
            fn predict(&self, _: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
                Ok(vec![0])
            }
            fn name(&self) -> String {
                "wide".into()
            }
            fn n_features(&self) -> Option<usize> {
                Some(4)
            }
        }
        let kb = tiny_kb();
        assert!(matches!(
            Predictor::new(&Wide, &kb),
            Err(PredictError::FeatureCountMismatch { catalog: 3, classifier: 4 })
        ));
    }

    #[test]
    fn test_classifier_failures() {
        struct Failing;
        impl Classifier for Failing {
            fn predict(&self, _: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
                Err("model exploded".into())
            }
            fn name(&self) -> String {
                "failing".into()
            }
        }
        struct Silent;
        impl Classifier for Silent {
            fn predict(&self, _: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
                Ok(vec![])
            }
            fn name(&self) -> String {
                "silent".into()
            }
        }

        let kb = tiny_kb();
        let obs = Observation::sequence(vec![false; 3]);
        let err = Predictor::new(&Failing, &kb).unwrap().predict(&obs).unwrap_err();
        assert!(matches!(err, PredictError::Classifier(ref e) if e.to_string() == "model exploded"));
        let err = Predictor::new(&Silent, &kb).unwrap().predict(&obs).unwrap_err();
        assert!(matches!(err, PredictError::EmptyClassifierOutput));
    }

    #[test]
    fn test_works_through_dyn_classifier() {
        let kb = tiny_kb();
        let model: Box<dyn Classifier> = Box::new(Stub::new(0));
        let predictor = Predictor::new(model.as_ref(), &kb).unwrap();
        assert_eq!(predictor.predict(&Observation::sequence(vec![true; 3])).unwrap(), "zero");
    }
}
