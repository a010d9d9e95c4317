use crate::acquisition::{AcquisitionGroup, EncodingGeometry};
use crate::combine::CoilCombiner;
use crate::crop::SpatialCropper;
use crate::debug_dump::DebugDump;
use crate::error::ReconError;
use crate::fourier::FourierReconstructor;
use crate::grouper::{AcquisitionGrouper, AcquisitionStream};
use crate::image::{ImageAssembler, OutputImage};
use crate::kspace::KSpaceAssembler;
use crate::normalize::DynamicRangeNormalizer;

use log::{debug, error, info};

/// Destination for reconstructed images, in emission order.
pub trait ImageSink {
    fn send_image(&mut self, image: OutputImage) -> Result<(), ReconError>;
}

/// Drives the full reconstruction chain for one streamed session.
///
/// Groups are processed strictly in arrival order and one at a time; a
/// group's images are sent before the next record is pulled. The only state
/// shared across groups is the constant [`EncodingGeometry`] and the cached
/// FFT plans.
pub struct ReconPipeline {
    geometry: EncodingGeometry,
    fourier: FourierReconstructor,
    debug_dump: Option<DebugDump>,
}

impl ReconPipeline {
    pub fn new(geometry: EncodingGeometry) -> Self {
        Self {
            geometry,
            fourier: FourierReconstructor::new(),
            debug_dump: None,
        }
    }

    /// Enable best-effort persistence of intermediate volumes.
    pub fn with_debug_dump(mut self, dump: DebugDump) -> Self {
        self.debug_dump = Some(dump);
        self
    }

    /// Consume the stream group by group.
    ///
    /// A failing group is reported and dropped; subsequent groups are
    /// unaffected. The stream resource is released on every exit path,
    /// including a sink failure.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink rejects an image
    pub fn run<S, K>(&mut self, stream: S, sink: &mut K) -> Result<(), ReconError>
    where
        S: AcquisitionStream,
        K: ImageSink,
    {
        for group in AcquisitionGrouper::new(stream) {
            match self.process_group(&group) {
                Ok(images) => {
                    for image in images {
                        debug!("sending image for slice {}", image.slice);
                        sink.send_image(image)?;
                    }
                }
                Err(err) => error!("dropping group of {} readouts: {err}", group.len()),
            }
        }
        Ok(())
    }

    /// Reconstruct one completed group into per-partition images.
    ///
    /// An empty group (degenerate terminator) yields no images.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the reconstruction chain; the pipeline
    /// itself holds no per-group state, so a later group can still succeed
    pub fn process_group(
        &mut self,
        group: &AcquisitionGroup,
    ) -> Result<Vec<OutputImage>, ReconError> {
        if group.is_empty() {
            return Ok(Vec::new());
        }

        info!("process_group called with {} readouts", group.len());

        let kspace = KSpaceAssembler::assemble(group, &self.geometry)?;
        if let Some(dump) = &self.debug_dump {
            dump.save_kspace("raw", &kspace);
        }

        let image = self.fourier.reconstruct(kspace);
        let magnitude = CoilCombiner::combine(&image)?;
        debug!("image data is size {:?}", magnitude.shape());
        if let Some(dump) = &self.debug_dump {
            dump.save_magnitude("img", &magnitude);
        }

        let normalizer = DynamicRangeNormalizer::from_geometry(&self.geometry);
        let pixels = normalizer.normalize(&magnitude)?;
        let cropped = SpatialCropper::crop(pixels, self.geometry.recon_matrix);
        debug!("image without oversampling is size {:?}", cropped.shape());
        if let Some(dump) = &self.debug_dump {
            dump.save_pixels("imgCrop", &cropped);
        }

        ImageAssembler::assemble(&cropped, group, &self.geometry, normalizer.max_val())
    }
}
