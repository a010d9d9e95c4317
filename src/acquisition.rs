use crate::enums::AcquisitionFlag;

use ndarray::Array2;
use num_complex::Complex32;

/// Bit depth used when the run header carries no `BitsStored` parameter.
pub const DEFAULT_BITS_STORED: u32 = 12;

/// Pixel buffers are signed 16-bit; a larger header override is meaningless
/// and would overflow the window arithmetic.
pub const MAX_BITS_STORED: u32 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatrixSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldOfView {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Read-only geometry derived from the run's encoding header.
///
/// Constant for a whole processing session; every group reconstructed over
/// the same connection shares it.
#[derive(Clone, Debug, Default)]
pub struct EncodingGeometry {
    pub encoded_matrix: MatrixSize,
    pub recon_matrix: MatrixSize,
    /// Field of view of the reconstruction space, in mm.
    pub field_of_view: FieldOfView,
    /// `BitsStored` user parameter, when the header carries one.
    pub bits_stored_override: Option<u32>,
}

impl EncodingGeometry {
    pub fn bits_stored(&self) -> u32 {
        self.bits_stored_override
            .unwrap_or(DEFAULT_BITS_STORED)
            .min(MAX_BITS_STORED)
    }
}

/// Orientation and slice identity copied from the raw readout header.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcquisitionHeader {
    pub slice: u16,
    pub position: [f32; 3],
    pub read_dir: [f32; 3],
    pub phase_dir: [f32; 3],
    pub slice_dir: [f32; 3],
}

/// One readout line: complex samples per channel plus acquisition context.
///
/// Immutable once received; ownership moves from the stream to the grouper
/// and on into the assembled group.
#[derive(Clone, Debug)]
pub struct AcquisitionRecord {
    data: Array2<Complex32>,
    flags: u64,
    partition: usize,
    header: AcquisitionHeader,
}

impl AcquisitionRecord {
    /// Create a record from a `channels x samples` signal matrix.
    pub fn new(
        data: Array2<Complex32>,
        flags: u64,
        partition: usize,
        header: AcquisitionHeader,
    ) -> Self {
        Self {
            data,
            flags,
            partition,
            header,
        }
    }

    pub fn is_flag_set(&self, flag: AcquisitionFlag) -> bool {
        self.flags & flag.bitmask() != 0
    }

    pub fn data(&self) -> &Array2<Complex32> {
        &self.data
    }

    pub fn channels(&self) -> usize {
        self.data.dim().0
    }

    pub fn samples(&self) -> usize {
        self.data.dim().1
    }

    /// Index along the second phase-encode axis (k-space encode step 2).
    pub fn partition(&self) -> usize {
        self.partition
    }

    pub fn header(&self) -> &AcquisitionHeader {
        &self.header
    }
}

/// One volume's worth of signal readouts, bounded by the last-in-slice flag.
pub type AcquisitionGroup = Vec<AcquisitionRecord>;
