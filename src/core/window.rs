/// Window dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero (minimized window)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Source of the current window size
///
/// Queried on every cursor event, never cached, since the window may be
/// resized between two events.
pub trait WindowContext {
    fn dimensions(&self) -> WindowDimensions;
}

impl WindowContext for winit::window::Window {
    fn dimensions(&self) -> WindowDimensions {
        let size = self.inner_size();
        WindowDimensions::new(size.width, size.height)
    }
}

impl WindowContext for WindowDimensions {
    fn dimensions(&self) -> WindowDimensions {
        *self
    }
}
