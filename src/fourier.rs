use ndarray::{Array4, Axis, Zip};
use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::Arc;

/// Centered 3D inverse Fourier transform over the spatial axes of a k-space
/// volume `[channel, readout, pe1, pe2]`.
///
/// Each spatial axis is shifted so the centered zero-frequency term lands at
/// index 0, inverse-transformed, and shifted back. rustfft leaves the inverse
/// transform unscaled, which already matches the scanner convention of
/// multiplying the normalized inverse by the voxel count, so no separate
/// rescaling pass is needed.
pub struct FourierReconstructor {
    planner: FftPlanner<f32>,
    plans: HashMap<usize, Arc<dyn Fft<f32>>>,
}

impl FourierReconstructor {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            plans: HashMap::new(),
        }
    }

    /// Transform k-space into the (complex) image domain.
    pub fn reconstruct(&mut self, mut volume: Array4<Complex32>) -> Array4<Complex32> {
        for axis in 1..4 {
            let len = volume.len_of(Axis(axis));
            if len <= 1 {
                continue;
            }
            let plan = self.plan_inverse(len);

            roll_axis(&mut volume, axis, len / 2);
            ifft_axis(&mut volume, axis, plan.as_ref());
            roll_axis(&mut volume, axis, len - len / 2);
        }
        volume
    }

    fn plan_inverse(&mut self, len: usize) -> Arc<dyn Fft<f32>> {
        if let Some(plan) = self.plans.get(&len) {
            return Arc::clone(plan);
        }
        let plan = self.planner.plan_fft_inverse(len);
        self.plans.insert(len, Arc::clone(&plan));
        plan
    }
}

impl Default for FourierReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotate an axis right by `shift`, i.e. element `i` moves to
/// `(i + shift) % len`. `len / 2` is fftshift, `len - len / 2` undoes it.
fn roll_axis(volume: &mut Array4<Complex32>, axis: usize, shift: usize) {
    let len = volume.len_of(Axis(axis));
    if len == 0 || shift % len == 0 {
        return;
    }

    let mut rolled = Array4::zeros(volume.raw_dim());
    for i in 0..len {
        rolled
            .index_axis_mut(Axis(axis), (i + shift) % len)
            .assign(&volume.index_axis(Axis(axis), i));
    }
    *volume = rolled;
}

fn ifft_axis(volume: &mut Array4<Complex32>, axis: usize, plan: &dyn Fft<f32>) {
    Zip::from(volume.lanes_mut(Axis(axis))).par_for_each(|mut lane| {
        let mut scratch: Vec<Complex32> = lane.to_vec();
        plan.process(&mut scratch);
        for (dst, src) in lane.iter_mut().zip(scratch) {
            *dst = src;
        }
    });
}
