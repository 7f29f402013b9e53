use ndarray::{ArrayView1, Zip};
use std::fmt::Debug;

use crate::Float;

/// A distance metric between two feature vectors of equal length.
///
/// `rdistance` is a cheaper, order-preserving "reduced" distance used for
/// ranking neighbours; `distance` is the true metric.
pub trait Distance<F: Float>: Clone + Debug + Send + Sync {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist
    }
}

/// Manhattan distance. On binary symptom vectors this is the Hamming distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc + num_traits::Signed::abs(&(x - y)))
    }
}

/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdist_to_dist(self.rdistance(a, b))
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
            let d = x - y;
            acc + d * d
        })
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.sqrt()
    }
}
