use crate::acquisition::{AcquisitionGroup, AcquisitionHeader, EncodingGeometry};
use crate::error::ReconError;

use log::debug;
use ndarray::{Array2, Array3, Axis, s};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Display and provenance metadata carried by each output image.
///
/// Fixed schema serialized to the flat MRD MetaAttributes document; optional
/// fields are omitted when unset rather than written empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageMeta {
    pub data_role: String,
    pub processing_history: Vec<String>,
    pub window_center: String,
    pub window_width: String,
    pub image_row_dir: Option<[String; 3]>,
    pub image_column_dir: Option<[String; 3]>,
}

impl ImageMeta {
    /// Append a processing tag, preserving any history set upstream.
    pub fn append_history(&mut self, tag: &str) {
        self.processing_history.push(tag.to_string());
    }

    /// Serialize to the flat key/value document used on the wire.
    pub fn serialize(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?><ismrmrdMeta>");
        write_entry(&mut xml, "DataRole", std::slice::from_ref(&self.data_role));
        write_entry(&mut xml, "ImageProcessingHistory", &self.processing_history);
        write_entry(&mut xml, "WindowCenter", std::slice::from_ref(&self.window_center));
        write_entry(&mut xml, "WindowWidth", std::slice::from_ref(&self.window_width));
        if let Some(dir) = &self.image_row_dir {
            write_entry(&mut xml, "ImageRowDir", dir);
        }
        if let Some(dir) = &self.image_column_dir {
            write_entry(&mut xml, "ImageColumnDir", dir);
        }
        xml.push_str("</ismrmrdMeta>");
        xml
    }
}

fn write_entry(xml: &mut String, name: &str, values: &[String]) {
    let _ = write!(xml, "<meta><name>{name}</name>");
    for value in values {
        let _ = write!(xml, "<value>{value}</value>");
    }
    xml.push_str("</meta>");
}

/// One reconstructed partition, ready for the output boundary.
///
/// Created once and immutable thereafter.
#[derive(Clone, Debug)]
pub struct OutputImage {
    pub pixels: Array2<i16>,
    pub field_of_view: [f32; 3],
    pub slice: usize,
    pub read_dir: [f32; 3],
    pub phase_dir: [f32; 3],
    pub meta: ImageMeta,
}

impl OutputImage {
    /// Raw byte view of the pixel buffer for wire transport.
    pub fn pixel_bytes(&self) -> &[u8] {
        match self.pixels.as_slice() {
            Some(buffer) => bytemuck::cast_slice(buffer),
            None => &[],
        }
    }
}

/// Builds one output image per partition of the cropped volume.
pub struct ImageAssembler;

impl ImageAssembler {
    const HISTORY_TAGS: [&'static str; 2] = ["FIRE", "RUST"];

    /// Assemble images in ascending partition order
    ///
    /// # Arguments
    ///
    /// * `volume` - Cropped pixel volume `[x, y, partition]`
    /// * `group` - Originating group, source of the per-partition raw headers
    /// * `geometry` - Encoding geometry of the session
    /// * `max_val` - Peak pixel value used for the display window
    ///
    /// # Errors
    ///
    /// Returns an error if any partition in range has no raw header
    pub fn assemble(
        volume: &Array3<i16>,
        group: &AcquisitionGroup,
        geometry: &EncodingGeometry,
        max_val: i32,
    ) -> Result<Vec<OutputImage>, ReconError> {
        let headers: BTreeMap<usize, &AcquisitionHeader> = group
            .iter()
            .map(|acq| (acq.partition(), acq.header()))
            .collect();
        let max_partition = headers.keys().next_back().copied().unwrap_or(0);

        let partitions = volume.len_of(Axis(2));
        let mut images = Vec::with_capacity(partitions);

        for partition in 0..partitions {
            let header = headers
                .get(&partition)
                .copied()
                .ok_or(ReconError::PartitionGap {
                    partition,
                    max_partition,
                })?;

            let pixels = volume
                .slice(s![.., .., partition])
                .as_standard_layout()
                .to_owned();

            // The window center is a float on the wire ("2048.0"), the
            // width an integer ("4096").
            let mut meta = ImageMeta {
                data_role: "Image".to_string(),
                window_center: format!("{:.1}", (max_val as f64 + 1.0) / 2.0),
                window_width: (max_val + 1).to_string(),
                ..ImageMeta::default()
            };
            for tag in Self::HISTORY_TAGS {
                meta.append_history(tag);
            }

            // Orientation directions are only filled in when nothing
            // upstream set them already, never overwritten.
            if meta.image_row_dir.is_none() {
                meta.image_row_dir = Some(format_direction(header.read_dir));
            }
            if meta.image_column_dir.is_none() {
                meta.image_column_dir = Some(format_direction(header.phase_dir));
            }

            debug!("image meta attributes: {}", meta.serialize());

            images.push(OutputImage {
                pixels,
                field_of_view: [
                    geometry.field_of_view.x,
                    geometry.field_of_view.y,
                    geometry.field_of_view.z,
                ],
                slice: partition,
                read_dir: header.read_dir,
                phase_dir: header.phase_dir,
                meta,
            });
        }

        Ok(images)
    }
}

/// 18 decimal digits, matching the precision of the reference pipeline.
fn format_direction(dir: [f32; 3]) -> [String; 3] {
    dir.map(|v| format!("{v:.18}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{AcquisitionRecord, FieldOfView};
    use ndarray::{Array2, Array3};
    use num_complex::Complex32;

    fn record(partition: usize, read_dir: [f32; 3]) -> AcquisitionRecord {
        let header = AcquisitionHeader {
            read_dir,
            phase_dir: [0.0, 1.0, 0.0],
            ..AcquisitionHeader::default()
        };
        AcquisitionRecord::new(Array2::<Complex32>::zeros((1, 4)), 0, partition, header)
    }

    fn geometry() -> EncodingGeometry {
        EncodingGeometry {
            field_of_view: FieldOfView {
                x: 220.0,
                y: 220.0,
                z: 144.0,
            },
            ..EncodingGeometry::default()
        }
    }

    #[test]
    fn one_image_per_partition_in_ascending_order() {
        let volume = Array3::<i16>::zeros((4, 4, 3));
        let group = vec![
            record(2, [1.0, 0.0, 0.0]),
            record(0, [1.0, 0.0, 0.0]),
            record(1, [1.0, 0.0, 0.0]),
        ];

        let images = ImageAssembler::assemble(&volume, &group, &geometry(), 4095).unwrap();

        assert_eq!(images.len(), 3);
        for (index, image) in images.iter().enumerate() {
            assert_eq!(image.slice, index);
            assert_eq!(image.pixels.dim(), (4, 4));
            assert_eq!(image.field_of_view, [220.0, 220.0, 144.0]);
        }
    }

    #[test]
    fn missing_partition_header_is_fatal() {
        let volume = Array3::<i16>::zeros((4, 4, 3));
        let group = vec![record(0, [1.0, 0.0, 0.0]), record(2, [1.0, 0.0, 0.0])];

        let result = ImageAssembler::assemble(&volume, &group, &geometry(), 4095);
        assert!(matches!(
            result,
            Err(ReconError::PartitionGap {
                partition: 1,
                max_partition: 2
            })
        ));
    }

    #[test]
    fn gap_reports_group_maximum_even_after_cropping() {
        // Two partitions survive the z-crop, but the group observed
        // partitions up to 5; the error must name the observed range.
        let volume = Array3::<i16>::zeros((2, 2, 2));
        let group = vec![record(0, [1.0, 0.0, 0.0]), record(5, [1.0, 0.0, 0.0])];

        let result = ImageAssembler::assemble(&volume, &group, &geometry(), 4095);
        assert!(matches!(
            result,
            Err(ReconError::PartitionGap {
                partition: 1,
                max_partition: 5
            })
        ));
    }

    #[test]
    fn window_metadata_derives_from_max_val() {
        let volume = Array3::<i16>::zeros((2, 2, 1));
        let group = vec![record(0, [1.0, 0.0, 0.0])];

        let images = ImageAssembler::assemble(&volume, &group, &geometry(), 4095).unwrap();
        let meta = &images[0].meta;

        assert_eq!(meta.data_role, "Image");
        assert_eq!(meta.window_center, "2048.0");
        assert_eq!(meta.window_width, "4096");
        assert_eq!(meta.processing_history, vec!["FIRE", "RUST"]);
    }

    #[test]
    fn orientation_directions_use_eighteen_decimals() {
        let volume = Array3::<i16>::zeros((2, 2, 1));
        let group = vec![record(0, [1.0, 0.0, 0.0])];

        let images = ImageAssembler::assemble(&volume, &group, &geometry(), 4095).unwrap();
        let row_dir = images[0].meta.image_row_dir.as_ref().unwrap();

        assert_eq!(row_dir[0], "1.000000000000000000");
        assert_eq!(row_dir[1], "0.000000000000000000");
    }

    #[test]
    fn meta_serializes_to_flat_key_value_document() {
        let mut meta = ImageMeta {
            data_role: "Image".to_string(),
            window_center: "2048.0".to_string(),
            window_width: "4096".to_string(),
            ..ImageMeta::default()
        };
        meta.append_history("FIRE");

        let xml = meta.serialize();
        assert!(xml.starts_with("<?xml version=\"1.0\"?><ismrmrdMeta>"));
        assert!(xml.contains("<meta><name>DataRole</name><value>Image</value></meta>"));
        assert!(xml.contains(
            "<meta><name>ImageProcessingHistory</name><value>FIRE</value></meta>"
        ));
        assert!(!xml.contains("ImageRowDir"));
        assert!(xml.ends_with("</ismrmrdMeta>"));
    }
}
