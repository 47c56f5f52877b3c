use std::path::Path;

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::{
    CameraController, CameraState, CAMERA_SPEED, DEFAULT_FOCAL_LENGTH, DEFAULT_SAMPLES,
};
use crate::cli::Cli;
use crate::dof::{DepthOfFieldSampler, DEFAULT_APERTURE};

pub const INITIAL_WINDOW_WIDTH: u32 = 1000;
pub const INITIAL_WINDOW_HEIGHT: u32 = 1000;

/// Tunables loaded from an optional JSON file, then overridden by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub speed: f32,
    pub aperture: f32,
    pub samples: u32,
    pub focal_length: f32,
    pub origin: [f32; 3],
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: CAMERA_SPEED,
            aperture: DEFAULT_APERTURE,
            samples: DEFAULT_SAMPLES,
            focal_length: DEFAULT_FOCAL_LENGTH,
            origin: [0.0; 3],
            window_width: INITIAL_WINDOW_WIDTH,
            window_height: INITIAL_WINDOW_HEIGHT,
        }
    }
}

impl Settings {
    /// Settings from the CLI: config file if given, then flag overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        Ok(settings)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(width) = cli.width {
            self.window_width = width;
        }
        if let Some(height) = cli.height {
            self.window_height = height;
        }
        if let Some(samples) = cli.samples {
            self.samples = samples;
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.samples >= 1, "samples must be at least 1");
        ensure!(self.speed > 0.0, "speed must be positive, got {}", self.speed);
        ensure!(self.aperture >= 0.0, "aperture must not be negative, got {}", self.aperture);
        ensure!(
            self.window_width > 0 && self.window_height > 0,
            "window size must be non-zero, got {}x{}",
            self.window_width,
            self.window_height
        );
        Ok(())
    }

    pub fn camera_controller(&self) -> CameraController {
        let state = CameraState::new(Vec3::from_array(self.origin), self.focal_length);
        CameraController::new(state, self.speed, self.samples)
    }

    pub fn sampler(&self) -> DepthOfFieldSampler {
        DepthOfFieldSampler::new(self.aperture)
    }
}
