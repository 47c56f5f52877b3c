pub mod camera;
pub mod cli;
pub mod core;
pub mod dof;
pub mod frame;
pub mod logging;
pub mod overlay;
pub mod renderer;
pub mod settings;
pub mod types;

pub use camera::{CameraController, CameraState};
pub use dof::{DepthOfFieldSampler, SamplePose};
