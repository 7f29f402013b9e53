use ndarray::{Array1, ArrayView1};
use crate::Float;
use std::fmt::Debug;

/// Represents a single reference point with features and a label.
///
/// L: The type of the label (e.g., a class index, String, enum).
/// F: The float type for the features (e.g., f32, f64).
#[derive(Debug, Clone)]
pub struct DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    /// Number of features carried by this point.
    pub fn dim(&self) -> usize {
        self.features.len()
    }

    pub fn view(&self) -> ArrayView1<'_, F> {
        self.features.view()
    }
}
