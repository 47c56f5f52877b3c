use crate::dof::SamplePose;

/// Per-sample uniform data for GPU
///
/// Mirrors `struct Sample` in `sdf.wgsl`: every `vec3` is followed by a
/// scalar that fills its padding slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SampleUniform {
    pub origin: [f32; 3],
    pub time: f32,
    pub right: [f32; 3],
    /// Blend weight of this sample, 1 / (index + 1)
    pub weight: f32,
    pub up: [f32; 3],
    /// Surface width / height
    pub aspect: f32,
    pub forward: [f32; 3],
    pub _pad: f32,
}

impl SampleUniform {
    /// Uniform for sample `index`; weights form a running mean under alpha blending
    pub fn new(pose: &SamplePose, index: usize, time: f32, aspect: f32) -> Self {
        Self {
            origin: pose.origin.to_array(),
            time,
            right: pose.basis.x_axis.to_array(),
            weight: 1.0 / (index as f32 + 1.0),
            up: pose.basis.y_axis.to_array(),
            aspect,
            forward: pose.basis.z_axis.to_array(),
            _pad: 0.0,
        }
    }
}
