use std::collections::HashMap;
use std::fmt::Debug;
// These are the core components from our shared library.
use dx_helpers::{DataPoint, Distance};

// ndarray and dx_helpers are used in the public function signatures.
use dx_helpers::Float;
use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;

/// Errors that can occur when using the k-NN classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    #[error("k cannot be zero for a k-NN classifier")]
    InvalidK,
    /// Cannot predict with an empty training set
    #[error("cannot predict with an empty training set")]
    EmptyTrainingSet,
    /// Training points do not all share the same number of features
    #[error("training point {index} has {actual} features, expected {expected}")]
    MismatchedTrainingDimensions {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// The query does not have as many features as the training points
    #[error("query has {actual} features, the model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Invalid distance comparison (likely due to NaN values in data)
    #[error("invalid distance comparison (likely due to NaN values in data)")]
    InvalidDistance,
}

/// A k-Nearest Neighbors (k-NN) classifier.
///
/// This classifier predicts the label of a new data point by finding the `k`
/// most similar points in its training set and taking a majority vote among their labels.
///
/// Ties in the vote go to the tied label whose closest member ranks first
/// among the neighbours. Points at equal distance rank in training order, so
/// the result is fully deterministic.
///
/// # Type Parameters
///
/// * `L`: The type of the label (e.g., a class index, `String`, or a custom `enum`).
/// * `F`: The float type for the features (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement the `dx_helpers::Distance` trait.
#[derive(Debug, Clone)]
pub struct KnnClassifier<L, F, D>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: Vec<DataPoint<L, F>>,
    distance: D,
}

impl<L, F, D> KnnClassifier<L, F, D>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier.
    ///
    /// # Arguments
    ///
    /// * `k`: The number of neighbors to consider for classification. Must be greater than 0.
    /// * `training_data`: A vector of `DataPoint`s that the classifier will learn from.
    /// * `distance`: An instance of a struct that implements the `Distance` trait (e.g., `L1Dist`).
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0, and
    /// `KnnError::MismatchedTrainingDimensions` if the training points disagree
    /// on their number of features.
    pub fn new(
        k: usize,
        training_data: Vec<DataPoint<L, F>>,
        distance: D,
    ) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        if let Some(first) = training_data.first() {
            let expected = first.dim();
            if let Some((index, dp)) = training_data
                .iter()
                .enumerate()
                .find(|(_, dp)| dp.dim() != expected)
            {
                return Err(KnnError::MismatchedTrainingDimensions {
                    index,
                    expected,
                    actual: dp.dim(),
                });
            }
        }
        Ok(Self {
            k,
            training_data,
            distance,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.training_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training_data.is_empty()
    }

    /// Number of features each query must have, or `None` for an empty model.
    pub fn n_features(&self) -> Option<usize> {
        self.training_data.first().map(DataPoint::dim)
    }

    /// Predicts the label for a new, unseen data point.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyTrainingSet` if the training data is empty.
    /// Returns `KnnError::DimensionMismatch` if `features` has the wrong length.
    /// Returns `KnnError::InvalidDistance` if a distance is NaN.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, KnnError> {
        let expected = self.n_features().ok_or(KnnError::EmptyTrainingSet)?;
        if features.len() != expected {
            return Err(KnnError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        // Reduced distances keep the ranking of the true metric and skip the final sqrt.
        let mut distances: Vec<(F, &L)> = Vec::with_capacity(self.training_data.len());
        for dp in &self.training_data {
            let dist = self.distance.rdistance(dp.view(), features);
            if dist.is_nan() {
                return Err(KnnError::InvalidDistance);
            }
            distances.push((dist, &dp.label));
        }

        // Stable sort: equal distances keep training order.
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let num_neighbors = self.k.min(distances.len());
        let neighbors = &distances[..num_neighbors];

        // label -> (votes, rank of its nearest member)
        let mut votes: HashMap<&L, (usize, usize)> = HashMap::new();
        for (rank, (_, label)) in neighbors.iter().enumerate() {
            votes.entry(*label).or_insert((0, rank)).0 += 1;
        }

        votes
            .into_iter()
            .max_by(|(_, (va, ra)), (_, (vb, rb))| va.cmp(vb).then(rb.cmp(ra)))
            .map(|(label, _)| label.clone())
            .ok_or(KnnError::EmptyTrainingSet)
    }

    /// Predicts one label per row of `features`.
    pub fn predict_batch(&self, features: ArrayView2<F>) -> Result<Vec<L>, KnnError> {
        features.rows().into_iter().map(|row| self.predict(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dx_helpers::{L1Dist, L2Dist};
    use ndarray::array;

    #[test]
    fn test_knn_classification_simple() {
        // Define training data
        let training_data = vec![
            DataPoint::new(array![1.0, 1.0], "A"),
            DataPoint::new(array![2.0, 2.0], "A"),
            DataPoint::new(array![1.0, 2.0], "A"),
            DataPoint::new(array![8.0, 8.0], "B"),
            DataPoint::new(array![9.0, 8.0], "B"),
            DataPoint::new(array![8.0, 9.0], "B"),
        ];

        // Create a classifier with k=3 and L2 (Euclidean) distance
        let classifier = KnnClassifier::new(3, training_data, L2Dist).unwrap();

        // Point close to class "A"
        let point_a = array![2.5, 2.5];
        assert_eq!(classifier.predict(point_a.view()).unwrap(), "A");

        // Point close to class "B"
        let point_b = array![7.5, 8.5];
        assert_eq!(classifier.predict(point_b.view()).unwrap(), "B");
    }

    #[test]
    fn test_knn_k_larger_than_dataset() {
        let training_data = vec![
            DataPoint::new(array![1.0], "A"),
            DataPoint::new(array![2.0], "A"),
            DataPoint::new(array![10.0], "B"),
        ];

        // k=5 is larger than the dataset size of 3, but this should work fine.
        // The two 'A's will outvote the one 'B'.
        let classifier = KnnClassifier::new(5, training_data, L2Dist).unwrap();
        let point = array![3.0];
        assert_eq!(classifier.predict(point.view()).unwrap(), "A");
    }

    #[test]
    fn test_binary_vectors_with_hamming() {
        let training_data = vec![
            DataPoint::new(array![1.0, 1.0, 0.0, 0.0], 0usize),
            DataPoint::new(array![0.0, 0.0, 1.0, 1.0], 1usize),
        ];
        let classifier = KnnClassifier::new(1, training_data, L1Dist).unwrap();
        assert_eq!(classifier.predict(array![1.0, 0.0, 0.0, 0.0].view()).unwrap(), 0);
        assert_eq!(classifier.predict(array![0.0, 0.0, 0.0, 1.0].view()).unwrap(), 1);
    }

    #[test]
    fn test_tie_goes_to_nearest_member() {
        // k=2 gives one vote each; "B" owns the closest point.
        let training_data = vec![
            DataPoint::new(array![0.0], "A"),
            DataPoint::new(array![3.0], "B"),
        ];
        let classifier = KnnClassifier::new(2, training_data, L1Dist).unwrap();
        assert_eq!(classifier.predict(array![2.0].view()).unwrap(), "B");
    }

    #[test]
    fn test_tie_at_equal_distance_uses_training_order() {
        let training_data = vec![
            DataPoint::new(array![0.0], "A"),
            DataPoint::new(array![2.0], "B"),
        ];
        let classifier = KnnClassifier::new(2, training_data, L1Dist).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.predict(array![1.0].view()).unwrap(), "A");
        }
    }

    #[test]
    fn test_tie_at_equal_distance_ignores_label_order() {
        let training_data = vec![
            DataPoint::new(array![0.0], 1usize),
            DataPoint::new(array![2.0], 0usize),
        ];
        let classifier = KnnClassifier::new(2, training_data, L1Dist).unwrap();
        assert_eq!(classifier.predict(array![1.0].view()).unwrap(), 1);
    }

    #[test]
    fn test_predict_batch() {
        let training_data = vec![
            DataPoint::new(array![0.0, 0.0], 0usize),
            DataPoint::new(array![1.0, 1.0], 1usize),
        ];
        let classifier = KnnClassifier::new(1, training_data, L1Dist).unwrap();
        let rows = array![[0.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert_eq!(classifier.predict_batch(rows.view()).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn test_error_on_k_zero() {
        let training_data: Vec<DataPoint<&str, f64>> = vec![];
        let result = KnnClassifier::new(0, training_data, L2Dist);
        assert!(matches!(result, Err(KnnError::InvalidK)));
    }

    #[test]
    fn test_error_on_empty_training_set() {
        let training_data: Vec<DataPoint<&str, f64>> = vec![];
        let classifier = KnnClassifier::new(3, training_data, L2Dist).unwrap();
        let result = classifier.predict(array![1.0, 1.0].view());
        assert!(matches!(result, Err(KnnError::EmptyTrainingSet)));
        assert_eq!(classifier.n_features(), None);
    }

    #[test]
    fn test_error_on_mismatched_training_points() {
        let training_data = vec![
            DataPoint::new(array![1.0, 1.0], "A"),
            DataPoint::new(array![1.0], "B"),
        ];
        let result = KnnClassifier::new(1, training_data, L1Dist);
        assert_eq!(
            result.unwrap_err(),
            KnnError::MismatchedTrainingDimensions { index: 1, expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_error_on_query_dimension() {
        let training_data = vec![DataPoint::new(array![1.0, 1.0], "A")];
        let classifier = KnnClassifier::new(1, training_data, L1Dist).unwrap();
        let result = classifier.predict(array![1.0, 1.0, 1.0].view());
        assert_eq!(result, Err(KnnError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_error_on_nan() {
        let training_data = vec![DataPoint::new(array![1.0], "A")];
        let classifier = KnnClassifier::new(1, training_data, L2Dist).unwrap();
        let result = classifier.predict(array![f64::NAN].view());
        assert_eq!(result, Err(KnnError::InvalidDistance));
    }
}
