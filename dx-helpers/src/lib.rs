use ndarray::{NdFloat, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, Signed};

use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

// Include submodules
mod common;
mod distance;

// Re-export types from submodules
pub use common::DataPoint;
pub use distance::{Distance, L1Dist, L2Dist};

/// Scalar type used for feature values throughout the workspace.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + ScalarOperand
    + std::marker::Unpin
{
    /// Encodes a presence flag as `1` or `0`.
    fn from_flag(present: bool) -> Self {
        if present { Self::one() } else { Self::zero() }
    }
}

impl Float for f32 {}

impl Float for f64 {}
