use thiserror::Error;

/// Failures surfaced by the reconstruction chain.
///
/// Errors are scoped to the group being processed; the pipeline drops the
/// failing group and continues with the next one.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("Inconsistent readout dimensions within group")]
    InconsistentDimensions,

    #[error("{lines} readouts do not fill a {y}x{z} phase-encode grid")]
    IncompleteKSpace { lines: usize, y: usize, z: usize },

    #[error("Coil combination requires at least one channel")]
    NoChannels,

    #[error("Magnitude volume is uniformly zero, dynamic range is undefined")]
    DegenerateDynamicRange,

    #[error("No raw header for partition {partition} (expected 0..={max_partition})")]
    PartitionGap {
        partition: usize,
        max_partition: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
