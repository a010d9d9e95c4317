use crate::error::ReconError;

use ndarray::{Array3, Array4, Axis};
use num_complex::Complex32;

/// Root-sum-of-squares reduction over the channel axis.
pub struct CoilCombiner;

impl CoilCombiner {
    /// Collapse `[channel, x, y, z]` into a real magnitude volume `[x, y, z]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel axis is empty
    pub fn combine(volume: &Array4<Complex32>) -> Result<Array3<f32>, ReconError> {
        if volume.len_of(Axis(0)) == 0 {
            return Err(ReconError::NoChannels);
        }

        let squared = volume.mapv(|v| v.norm_sqr());
        Ok(squared.sum_axis(Axis(0)).mapv(f32::sqrt))
    }
}
