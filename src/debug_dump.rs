use log::{debug, warn};
use ndarray::{Array3, Array4};
use ndarray_npy::{WriteNpyExt, write_npy};
use num_complex::Complex32;
use std::path::{Path, PathBuf};

/// Best-effort persistence of intermediate volumes for offline inspection.
///
/// Failures such as a missing write permission are logged and swallowed; the
/// reconstruction never depends on these files.
pub struct DebugDump {
    folder: PathBuf,
}

impl DebugDump {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
        }
    }

    pub fn save_kspace(&self, name: &str, volume: &Array4<Complex32>) {
        self.write(name, volume);
    }

    pub fn save_magnitude(&self, name: &str, volume: &Array3<f32>) {
        self.write(name, volume);
    }

    pub fn save_pixels(&self, name: &str, volume: &Array3<i16>) {
        self.write(name, volume);
    }

    fn write<T: WriteNpyExt>(&self, name: &str, array: &T) {
        if let Err(err) = std::fs::create_dir_all(&self.folder) {
            warn!(
                "could not create debug folder {}: {err}",
                self.folder.display()
            );
            return;
        }

        let path = self.folder.join(format!("{name}.npy"));
        match write_npy(&path, array) {
            Ok(()) => debug!("wrote {}", path.display()),
            Err(err) => warn!("could not write {}: {err}", path.display()),
        }
    }
}
