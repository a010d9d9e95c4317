use mrd_recon::{
    AcquisitionFlag, AcquisitionHeader, AcquisitionRecord, AcquisitionStream, EncodingGeometry,
    FieldOfView, ImageSink, MatrixSize, OutputImage, ReconError, ReconPipeline,
};

use ndarray::Array2;
use num_complex::Complex32;

struct PhantomStream {
    records: std::vec::IntoIter<AcquisitionRecord>,
}

impl AcquisitionStream for PhantomStream {
    fn next_record(&mut self) -> Option<AcquisitionRecord> {
        self.records.next()
    }

    fn close(&mut self) {
        log::info!("phantom stream closed");
    }
}

struct PrintSink;

impl ImageSink for PrintSink {
    fn send_image(&mut self, image: OutputImage) -> Result<(), ReconError> {
        println!(
            "slice {} {:?} peak {}",
            image.slice,
            image.pixels.dim(),
            image.pixels.iter().copied().max().unwrap_or(0),
        );
        Ok(())
    }
}

/// One fully sampled group: a DC-only phantom on a 2-channel 16x8x8 grid.
fn phantom_group(geometry: &EncodingGeometry) -> Vec<AcquisitionRecord> {
    let (x, y, z) = (
        geometry.encoded_matrix.x,
        geometry.encoded_matrix.y,
        geometry.encoded_matrix.z,
    );

    let mut records = Vec::with_capacity(y * z);
    for line in 0..y * z {
        let mut data = Array2::<Complex32>::zeros((2, x));
        if line == (y / 2) * z + z / 2 {
            data[[0, x / 2]] = Complex32::new(1.0, 0.0);
            data[[1, x / 2]] = Complex32::new(1.0, 0.0);
        }

        let flags = if line == y * z - 1 {
            AcquisitionFlag::LastInSlice.bitmask()
        } else {
            0
        };
        let header = AcquisitionHeader {
            read_dir: [1.0, 0.0, 0.0],
            phase_dir: [0.0, 1.0, 0.0],
            slice_dir: [0.0, 0.0, 1.0],
            ..AcquisitionHeader::default()
        };
        records.push(AcquisitionRecord::new(data, flags, line % z, header));
    }
    records
}

fn main() {
    env_logger::init();

    let geometry = EncodingGeometry {
        encoded_matrix: MatrixSize { x: 16, y: 8, z: 8 },
        recon_matrix: MatrixSize { x: 8, y: 8, z: 8 },
        field_of_view: FieldOfView {
            x: 256.0,
            y: 256.0,
            z: 128.0,
        },
        bits_stored_override: None,
    };

    let stream = PhantomStream {
        records: phantom_group(&geometry).into_iter(),
    };

    let mut pipeline = ReconPipeline::new(geometry);
    let mut sink = PrintSink;
    pipeline
        .run(stream, &mut sink)
        .expect("should have reconstructed the phantom group");
}
