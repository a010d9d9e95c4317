use crate::acquisition::MatrixSize;

use ndarray::{Array3, Axis, Slice};

/// Removes acquisition oversampling by symmetric center-cropping.
///
/// Each spatial axis is cropped independently to the reconstruction matrix
/// size; a target of zero leaves the axis untouched. Axis order is the
/// volume's own order: readout, phase-encode 1, partition.
pub struct SpatialCropper;

impl SpatialCropper {
    pub fn crop(mut volume: Array3<i16>, target: MatrixSize) -> Array3<i16> {
        for (axis, target) in [target.x, target.y, target.z].into_iter().enumerate() {
            let current = volume.len_of(Axis(axis));
            if target != 0 && target < current {
                let offset = (current - target) / 2;
                volume = volume
                    .slice_axis(Axis(axis), Slice::from(offset..offset + target))
                    .to_owned();
            }
        }
        volume
    }
}
