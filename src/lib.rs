//! # MRD-recon library
//!
//! This crate reconstructs cross-sectional images from streamed 3D
//! magnetic-resonance raw acquisition data.

//!
//! Readout records are pulled from an [`AcquisitionStream`], grouped into
//! complete volumetric acquisitions, assembled into k-space, transformed with
//! a centered 3D inverse FFT, coil-combined by root-sum-of-squares, rescaled
//! into an integer display window, center-cropped to the reconstruction
//! matrix and emitted per partition through an [`ImageSink`].
//! The incoming data is assumed to have the following properties:
//!  - Fully sampled Cartesian 3D acquisition (no parallel-imaging
//!    undersampling)
//!  - One volume per group, bounded by the last-in-slice flag
//!  - Partition index varies fastest within the flat phase-encode ordering
//!
//!  Library consumers provide the transport on both sides: the crate never
//!  opens sockets or files on its own, apart from the optional best-effort
//!  debug dumps of intermediate volumes.
//!
//!  Contributions are highly welcome!
//!
//! # Examples
//!
//! ## Reconstructing a streamed session
//!
//! Pull groups from a connection, reconstruct each one and hand the images to
//! a sink in ascending partition order.
//!
//! ```no_run
//! # use mrd_recon::{EncodingGeometry, MatrixSize, FieldOfView, ReconPipeline};
//! # use mrd_recon::{AcquisitionStream, ImageSink};
//! # fn run(stream: impl AcquisitionStream, mut sink: impl ImageSink) {
//! let geometry = EncodingGeometry {
//!     encoded_matrix: MatrixSize { x: 16, y: 8, z: 8 },
//!     recon_matrix: MatrixSize { x: 8, y: 8, z: 8 },
//!     field_of_view: FieldOfView { x: 256.0, y: 256.0, z: 128.0 },
//!     bits_stored_override: None,
//! };
//! let mut pipeline = ReconPipeline::new(geometry);
//! pipeline
//!     .run(stream, &mut sink)
//!     .expect("should have reconstructed the streamed session");
//! # }
//! ```

pub mod acquisition;
pub mod combine;
pub mod crop;
pub mod debug_dump;
pub mod enums;
pub mod error;
pub mod fourier;
pub mod grouper;
pub mod image;
pub mod kspace;
pub mod normalize;
pub mod pipeline;

pub use acquisition::{
    AcquisitionGroup, AcquisitionHeader, AcquisitionRecord, EncodingGeometry, FieldOfView,
    MatrixSize,
};
pub use enums::AcquisitionFlag;
pub use error::ReconError;
pub use grouper::{AcquisitionGrouper, AcquisitionStream};
pub use image::{ImageMeta, OutputImage};
pub use pipeline::{ImageSink, ReconPipeline};
