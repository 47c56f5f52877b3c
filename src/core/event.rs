use super::controller::{Key, Modifiers, MouseButton};

/// Semantic input event produced by the input adapter
///
/// Cursor coordinates are normalized device coordinates: both axes span
/// `[-1, 1]` and `+y` points up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    MouseMove {
        x: f32,
        y: f32,
    },
    MouseButtonDown {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    MouseButtonUp {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    KeyDown {
        key: Key,
        mods: Modifiers,
    },
    KeyUp {
        key: Key,
        mods: Modifiers,
    },
    #[default]
    None,
}

impl Event {
    pub fn key_down(key: Key) -> Self {
        Event::KeyDown {
            key,
            mods: Modifiers::empty(),
        }
    }

    pub fn key_up(key: Key) -> Self {
        Event::KeyUp {
            key,
            mods: Modifiers::empty(),
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Event::MouseMove { x, y }
    }

    pub fn button_down(button: MouseButton, x: f32, y: f32) -> Self {
        Event::MouseButtonDown { button, x, y }
    }

    pub fn button_up(button: MouseButton, x: f32, y: f32) -> Self {
        Event::MouseButtonUp { button, x, y }
    }

    /// Normalized cursor position for mouse events
    pub fn cursor(&self) -> Option<(f32, f32)> {
        match *self {
            Event::MouseMove { x, y }
            | Event::MouseButtonDown { x, y, .. }
            | Event::MouseButtonUp { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }
}
