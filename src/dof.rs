use std::f32::consts::TAU;
use std::iter::FusedIterator;

use glam::{Mat3, Vec3};

use crate::camera::{look_at, CameraState};

pub const DEFAULT_APERTURE: f32 = 0.001;

/// Ray origin and view basis for one depth-of-field sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePose {
    pub origin: Vec3,
    /// Columns are (right, up, forward)
    pub basis: Mat3,
}

/// Thin-lens sampler: origins on a circular aperture aimed at one focal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfFieldSampler {
    aperture: f32,
}

impl DepthOfFieldSampler {
    pub fn new(aperture: f32) -> Self {
        Self { aperture }
    }

    pub fn aperture(&self) -> f32 {
        self.aperture
    }

    /// Focus distance for a focal length; quadratic so the far range is reachable
    pub fn effective_focal(focal_length: f32) -> f32 {
        focal_length * focal_length
    }

    /// Lens frame for the current camera pose
    pub fn lens(&self, state: &CameraState) -> ThinLens {
        let focal = state.forward * Self::effective_focal(state.focal_length);
        let right = focal.cross(state.world_up).normalize();
        let up = right.cross(focal).normalize();

        ThinLens {
            origin: state.origin,
            right,
            up,
            focal_point: state.origin + focal,
            aperture: self.aperture,
        }
    }

    /// Lazily generate `count` sample poses; `count` must be at least 1
    pub fn generate(&self, state: &CameraState, count: usize) -> Samples {
        debug_assert!(count >= 1, "depth-of-field needs at least one sample");
        Samples {
            lens: self.lens(state),
            index: 0,
            count,
        }
    }
}

impl Default for DepthOfFieldSampler {
    fn default() -> Self {
        Self::new(DEFAULT_APERTURE)
    }
}

/// Aperture frame shared by every sample of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinLens {
    pub origin: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub focal_point: Vec3,
    pub aperture: f32,
}

impl ThinLens {
    /// Pose of sample `index` out of `count` around the aperture circle
    pub fn sample(&self, index: usize, count: usize) -> SamplePose {
        let angle = index as f32 * TAU / count as f32;
        let bokeh = self.right * angle.cos() + self.up * angle.sin();
        let origin = self.origin + self.aperture * bokeh;
        let direction = (self.focal_point - origin).normalize();

        SamplePose {
            origin,
            basis: look_at(direction, self.up),
        }
    }
}

/// Iterator over the sample poses of one frame
#[derive(Debug, Clone)]
pub struct Samples {
    lens: ThinLens,
    index: usize,
    count: usize,
}

impl Iterator for Samples {
    type Item = SamplePose;

    fn next(&mut self) -> Option<SamplePose> {
        if self.index >= self.count {
            return None;
        }
        let pose = self.lens.sample(self.index, self.count);
        self.index += 1;
        Some(pose)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples {}

impl FusedIterator for Samples {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3, eps: f32) {
        assert!((a - b).abs().max_element() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn effective_focal_squares() {
        assert_eq!(DepthOfFieldSampler::effective_focal(0.1), 0.1f32 * 0.1f32);
        assert!((DepthOfFieldSampler::effective_focal(0.1) - 0.01).abs() < 1e-9);
        assert_eq!(DepthOfFieldSampler::effective_focal(2.0), 4.0);
        assert_eq!(DepthOfFieldSampler::effective_focal(4.0), 16.0);
    }

    #[test]
    fn lens_frame_for_default_camera() {
        let lens = DepthOfFieldSampler::default().lens(&CameraState::default());

        assert_vec_eq(lens.right, Vec3::Z, 1e-6);
        assert_vec_eq(lens.up, Vec3::Y, 1e-6);
        assert_vec_eq(lens.focal_point, Vec3::new(0.1 * 0.1, 0.0, 0.0), 1e-7);
    }

    #[test]
    fn single_sample_is_offset_along_right() {
        let state = CameraState::default();
        let sampler = DepthOfFieldSampler::default();
        let samples: Vec<_> = sampler.generate(&state, 1).collect();

        assert_eq!(samples.len(), 1);
        let expected = state.origin + DEFAULT_APERTURE * sampler.lens(&state).right;
        assert_eq!(samples[0].origin, expected);
        assert_ne!(samples[0].origin, state.origin);
    }

    #[test]
    fn samples_lie_on_aperture_circle() {
        let state = CameraState::default();
        let sampler = DepthOfFieldSampler::new(0.5);

        for pose in sampler.generate(&state, 12) {
            let radius = (pose.origin - state.origin).length();
            assert!((radius - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn samples_aim_at_focal_point() {
        let mut state = CameraState::default();
        state.focal_length = 2.0;
        let sampler = DepthOfFieldSampler::new(0.2);
        let lens = sampler.lens(&state);

        for pose in sampler.generate(&state, 7) {
            let to_focus = (lens.focal_point - pose.origin).normalize();
            assert_vec_eq(pose.basis.z_axis, to_focus, 1e-5);
        }
    }

    #[test]
    fn iterator_is_exact_and_restartable() {
        let state = CameraState::default();
        let samples = DepthOfFieldSampler::default().generate(&state, 50);

        assert_eq!(samples.len(), 50);
        let first: Vec<_> = samples.clone().collect();
        let second: Vec<_> = samples.collect();
        assert_eq!(first, second);
    }
}
