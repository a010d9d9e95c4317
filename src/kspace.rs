use crate::acquisition::{AcquisitionGroup, EncodingGeometry};
use crate::error::ReconError;

use log::debug;
use ndarray::{Array3, Array4, s};
use num_complex::Complex32;

/// Stacks a group's readouts into a 4D k-space volume
/// `[channel, readout, pe1, pe2]`.
pub struct KSpaceAssembler;

impl KSpaceAssembler {
    /// Assemble the k-space volume for one completed group
    ///
    /// # Arguments
    ///
    /// * `group` - Non-empty group of signal readouts in arrival order
    /// * `geometry` - Encoding geometry of the session
    ///
    /// # Errors
    ///
    /// Returns an error if readout dimensions differ within the group or the
    /// line count does not fill the encoded phase-encode grid
    pub fn assemble(
        group: &AcquisitionGroup,
        geometry: &EncodingGeometry,
    ) -> Result<Array4<Complex32>, ReconError> {
        let (y, z) = (geometry.encoded_matrix.y, geometry.encoded_matrix.z);
        let lines = group.len();
        if lines == 0 || lines != y * z {
            return Err(ReconError::IncompleteKSpace { lines, y, z });
        }

        let (channels, readout) = group[0].data().dim();
        if group.iter().any(|acq| acq.data().dim() != (channels, readout)) {
            return Err(ReconError::InconsistentDimensions);
        }

        let mut stacked = Array3::<Complex32>::zeros((channels, readout, lines));
        for (line, acq) in group.iter().enumerate() {
            stacked.slice_mut(s![.., .., line]).assign(acq.data());
        }

        // Flip readout and phase-encode to be consistent with ICE.
        let flipped = stacked
            .slice(s![.., ..;-1, ..;-1])
            .as_standard_layout()
            .into_owned();

        // The flat line axis splits into (pe1, pe2) with the partition index
        // varying fastest, the raster order the acquisition sequence uses.
        let volume = flipped
            .into_shape_with_order((channels, readout, y, z))
            .map_err(|_| ReconError::IncompleteKSpace { lines, y, z })?;

        debug!("raw data is size {:?}", volume.shape());
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{AcquisitionHeader, AcquisitionRecord, MatrixSize};
    use ndarray::Array2;

    fn geometry(y: usize, z: usize) -> EncodingGeometry {
        EncodingGeometry {
            encoded_matrix: MatrixSize { x: 4, y, z },
            ..EncodingGeometry::default()
        }
    }

    fn line(channels: usize, readout: usize, fill: f32) -> AcquisitionRecord {
        let data = Array2::from_elem((channels, readout), Complex32::new(fill, 0.0));
        AcquisitionRecord::new(data, 0, 0, AcquisitionHeader::default())
    }

    #[test]
    fn assembles_channel_readout_pe_volume() {
        let group: AcquisitionGroup = (0..6).map(|i| line(2, 4, i as f32)).collect();
        let volume = KSpaceAssembler::assemble(&group, &geometry(3, 2)).unwrap();

        assert_eq!(volume.dim(), (2, 4, 3, 2));
    }

    #[test]
    fn flips_readout_and_line_axes_before_reshaping() {
        let mut group = AcquisitionGroup::new();
        for i in 0..4 {
            let mut data = Array2::from_elem((1, 2), Complex32::new(0.0, 0.0));
            data[[0, 0]] = Complex32::new(i as f32, 0.0);
            data[[0, 1]] = Complex32::new(i as f32 + 10.0, 0.0);
            group.push(AcquisitionRecord::new(
                data,
                0,
                0,
                AcquisitionHeader::default(),
            ));
        }

        let volume = KSpaceAssembler::assemble(&group, &geometry(2, 2)).unwrap();

        // Line order reversed: flat positions now hold lines 3, 2, 1, 0, and
        // the readout axis is reversed within each line.
        assert_eq!(volume[[0, 0, 0, 0]], Complex32::new(13.0, 0.0));
        assert_eq!(volume[[0, 1, 0, 0]], Complex32::new(3.0, 0.0));
        assert_eq!(volume[[0, 0, 0, 1]], Complex32::new(12.0, 0.0));
        assert_eq!(volume[[0, 0, 1, 1]], Complex32::new(10.0, 0.0));
    }

    #[test]
    fn rejects_incomplete_phase_encode_grids() {
        let group: AcquisitionGroup = (0..5).map(|_| line(1, 4, 0.0)).collect();
        let result = KSpaceAssembler::assemble(&group, &geometry(2, 3));

        assert!(matches!(
            result,
            Err(ReconError::IncompleteKSpace { lines: 5, y: 2, z: 3 })
        ));
    }

    #[test]
    fn rejects_mixed_readout_dimensions() {
        let group = vec![line(1, 4, 0.0), line(1, 8, 0.0)];
        let result = KSpaceAssembler::assemble(&group, &geometry(1, 2));

        assert!(matches!(result, Err(ReconError::InconsistentDimensions)));
    }
}
