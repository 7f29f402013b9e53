use dx_helpers::Distance;
use k_nn::KnnClassifier;
use ndarray::ArrayView2;

use crate::error::ClassifierError;

/// The contract every pre-trained model must satisfy.
///
/// Implementations are shared read-only between concurrent callers, hence
/// `Send + Sync` and `&self`.
pub trait Classifier: Send + Sync {
    /// Predict one class index per row of `features`.
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError>;

    /// Return the name of the classifier (e.g., "k-NN (L1, k=3)").
    fn name(&self) -> String;

    /// Number of columns the model was trained on, when known.
    fn n_features(&self) -> Option<usize> {
        None
    }
}

impl<D> Classifier for KnnClassifier<usize, f64, D>
where
    D: 'static + Distance<f64>,
{
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
        self.predict_batch(features).map_err(|e| e.into())
    }

    fn name(&self) -> String {
        format!("k-NN (k={})", self.k())
    }

    fn n_features(&self) -> Option<usize> {
        KnnClassifier::n_features(self)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
        (**self).predict(features)
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn n_features(&self) -> Option<usize> {
        (**self).n_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dx_helpers::{DataPoint, L1Dist};
    use ndarray::array;

    #[test]
    fn test_knn_through_trait_object() {
        let knn = KnnClassifier::new(
            1,
            vec![
                DataPoint::new(array![1.0, 0.0], 0usize),
                DataPoint::new(array![0.0, 1.0], 1usize),
            ],
            L1Dist,
        )
        .unwrap();
        let model: Box<dyn Classifier> = Box::new(knn);
        assert_eq!(model.n_features(), Some(2));
        assert_eq!(model.predict(array![[0.0, 1.0]].view()).unwrap(), vec![1]);
        assert_eq!(model.name(), "k-NN (k=1)");
    }

    #[test]
    fn test_knn_errors_are_boxed() {
        let knn = KnnClassifier::new(1, vec![DataPoint::new(array![1.0], 0usize)], L1Dist).unwrap();
        let err = Classifier::predict(&knn, array![[1.0, 1.0]].view()).unwrap_err();
        assert!(err.to_string().contains("expects 1"));
    }
}
