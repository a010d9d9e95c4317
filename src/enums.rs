/// Acquisition flags, numbered as in the MRD raw data format (1-based bit
/// positions).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum AcquisitionFlag {
    FirstInSlice = 7,
    LastInSlice = 8,
    IsNoiseMeasurement = 19,
    IsPhaseCorrection = 24,
    LastInMeasurement = 25,
}

impl AcquisitionFlag {
    pub const fn bitmask(self) -> u64 {
        1u64 << (self as u64 - 1)
    }
}
