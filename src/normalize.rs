use crate::acquisition::{EncodingGeometry, MAX_BITS_STORED};
use crate::error::ReconError;

use ndarray::Array3;

/// Rescales a magnitude volume into the integer window given by the stored
/// bit depth.
pub struct DynamicRangeNormalizer {
    max_val: i32,
}

impl DynamicRangeNormalizer {
    pub fn new(bits_stored: u32) -> Self {
        Self {
            max_val: (1i32 << bits_stored.min(MAX_BITS_STORED)) - 1,
        }
    }

    pub fn from_geometry(geometry: &EncodingGeometry) -> Self {
        Self::new(geometry.bits_stored())
    }

    /// Largest representable pixel value, `2^bits_stored - 1`.
    pub fn max_val(&self) -> i32 {
        self.max_val
    }

    /// Scale the volume so its peak maps to `max_val`, rounding to the
    /// nearest integer and saturating at the i16 range.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume peak is zero; scaling such a volume
    /// would divide by zero, so the condition is surfaced instead of
    /// producing NaN pixels
    pub fn normalize(&self, volume: &Array3<f32>) -> Result<Array3<i16>, ReconError> {
        let peak = volume.iter().fold(0.0f32, |acc, &v| acc.max(v));
        if peak <= 0.0 {
            return Err(ReconError::DegenerateDynamicRange);
        }

        let scale = self.max_val as f32 / peak;
        Ok(volume.mapv(|v| {
            (v * scale)
                .round()
                .clamp(i16::MIN as f32, i16::MAX as f32) as i16
        }))
    }
}
