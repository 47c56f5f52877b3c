use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use super::controller::{Key, Modifiers, MouseButton};
use super::event::Event;
use super::event_queue::EventQueue;
use super::window::{WindowContext, WindowDimensions};

/// Adapter that turns winit window events into queued [`Event`]s
///
/// Holds its own handle to the queue; the frame loop holds another.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    queue: EventQueue,
    modifiers: Modifiers,
    /// Last cursor position in physical pixels
    cursor: Option<PhysicalPosition<f64>>,
}

impl InputTranslator {
    pub fn new(queue: EventQueue) -> Self {
        Self {
            queue,
            modifiers: Modifiers::empty(),
            cursor: None,
        }
    }

    /// Translate a window event and push the result to the queue
    ///
    /// Returns the pushed event, `None` when the window event has no
    /// counterpart.
    pub fn handle(&mut self, window: &dyn WindowContext, event: &WindowEvent) -> Option<Event> {
        let translated = self.translate(window, event)?;
        self.queue.push(translated);
        Some(translated)
    }

    fn translate(&mut self, window: &dyn WindowContext, event: &WindowEvent) -> Option<Event> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                Some(self.key(event.physical_key, event.state, event.repeat))
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(window.dimensions(), *position)
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_input(window.dimensions(), *state, *button)
            }
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers_changed(m.state());
                None
            }
            _ => None,
        }
    }

    /// Key press/release; autorepeat becomes [`Event::None`]
    pub fn key(&self, physical_key: PhysicalKey, state: ElementState, repeat: bool) -> Event {
        if repeat {
            return Event::None;
        }

        let key = map_key(physical_key);
        let mods = self.modifiers;
        match state {
            ElementState::Pressed => Event::KeyDown { key, mods },
            ElementState::Released => Event::KeyUp { key, mods },
        }
    }

    pub fn cursor_moved(
        &mut self,
        dims: WindowDimensions,
        position: PhysicalPosition<f64>,
    ) -> Option<Event> {
        self.track_cursor(position);
        let (x, y) = normalize_cursor(position, dims)?;
        Some(Event::MouseMove { x, y })
    }

    /// Button edge at the last known cursor position
    pub fn mouse_input(
        &self,
        dims: WindowDimensions,
        state: ElementState,
        button: WinitMouseButton,
    ) -> Option<Event> {
        let position = self.cursor.unwrap_or(PhysicalPosition::new(
            dims.width as f64 / 2.0,
            dims.height as f64 / 2.0,
        ));
        let (x, y) = normalize_cursor(position, dims)?;
        let button = map_mouse_button(button);

        Some(match state {
            ElementState::Pressed => Event::MouseButtonDown { button, x, y },
            ElementState::Released => Event::MouseButtonUp { button, x, y },
        })
    }

    pub fn modifiers_changed(&mut self, state: ModifiersState) {
        self.modifiers = map_modifiers(state);
    }

    /// Record the cursor position without producing an event
    ///
    /// Used for moves the overlay consumed, so the next button edge still
    /// anchors at the real pointer position.
    pub fn track_cursor(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
    }
}

/// Map a pixel position to `[-1, 1]` on both axes with `+y` up
///
/// Returns `None` for a zero-sized window.
pub fn normalize_cursor(position: PhysicalPosition<f64>, dims: WindowDimensions) -> Option<(f32, f32)> {
    if dims.is_empty() {
        return None;
    }

    let x = (position.x / dims.width as f64) * 2.0 - 1.0;
    let y = ((position.y / dims.height as f64) * 2.0 - 1.0) * -1.0;
    Some((x as f32, y as f32))
}

fn map_key(physical_key: PhysicalKey) -> Key {
    match physical_key {
        PhysicalKey::Code(code) => match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyR => Key::R,
            KeyCode::Space => Key::Space,
            // Right shift stays unbound so the two keys never share one held state
            KeyCode::ShiftLeft => Key::Shift,
            KeyCode::Escape => Key::Escape,
            other => Key::Other(other as u32),
        },
        PhysicalKey::Unidentified(_) => Key::Other(0),
    }
}

fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(code) => MouseButton::Other(code),
    }
}

fn map_modifiers(state: ModifiersState) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, state.shift_key());
    mods.set(Modifiers::CONTROL, state.control_key());
    mods.set(Modifiers::ALT, state.alt_key());
    mods.set(Modifiers::SUPER, state.super_key());
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    // KeyEvent has private platform fields, so these tests drive the
    // per-event translation functions directly.

    fn translator() -> (InputTranslator, EventQueue) {
        let queue = EventQueue::new();
        (InputTranslator::new(queue.clone()), queue)
    }

    #[test]
    fn test_normalize_corners() {
        let dims = WindowDimensions::new(1000, 500);

        assert_eq!(
            normalize_cursor(PhysicalPosition::new(0.0, 0.0), dims),
            Some((-1.0, 1.0))
        );
        assert_eq!(
            normalize_cursor(PhysicalPosition::new(1000.0, 500.0), dims),
            Some((1.0, -1.0))
        );
        assert_eq!(
            normalize_cursor(PhysicalPosition::new(500.0, 250.0), dims),
            Some((0.0, 0.0))
        );
    }

    #[test]
    fn test_normalize_zero_sized_window() {
        let dims = WindowDimensions::new(0, 0);
        assert_eq!(normalize_cursor(PhysicalPosition::new(10.0, 10.0), dims), None);
    }

    #[test]
    fn test_cursor_uses_current_size() {
        let (mut t, _) = translator();
        let pos = PhysicalPosition::new(400.0, 300.0);

        let small = t.cursor_moved(WindowDimensions::new(800, 600), pos);
        let large = t.cursor_moved(WindowDimensions::new(1600, 1200), pos);

        assert_eq!(small, Some(Event::MouseMove { x: 0.0, y: 0.0 }));
        assert_eq!(large, Some(Event::MouseMove { x: -0.5, y: 0.5 }));
    }

    #[test]
    fn test_key_press_release() {
        let (t, _) = translator();
        let w = PhysicalKey::Code(KeyCode::KeyW);

        assert_eq!(t.key(w, ElementState::Pressed, false), Event::key_down(Key::W));
        assert_eq!(t.key(w, ElementState::Released, false), Event::key_up(Key::W));
    }

    #[test]
    fn test_key_repeat_is_none() {
        let (t, _) = translator();
        let w = PhysicalKey::Code(KeyCode::KeyW);

        assert_eq!(t.key(w, ElementState::Pressed, true), Event::None);
    }

    #[test]
    fn test_key_carries_modifiers() {
        let (mut t, _) = translator();
        t.modifiers_changed(ModifiersState::SHIFT | ModifiersState::CONTROL);

        let event = t.key(PhysicalKey::Code(KeyCode::KeyD), ElementState::Pressed, false);
        assert_eq!(
            event,
            Event::KeyDown {
                key: Key::D,
                mods: Modifiers::SHIFT | Modifiers::CONTROL
            }
        );
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)), Key::Shift);
        assert_eq!(
            map_key(PhysicalKey::Code(KeyCode::ShiftRight)),
            Key::Other(KeyCode::ShiftRight as u32)
        );
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Space)), Key::Space);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyR)), Key::R);
        assert!(matches!(
            map_key(PhysicalKey::Code(KeyCode::KeyZ)),
            Key::Other(_)
        ));
    }

    #[test]
    fn test_button_uses_last_cursor() {
        let (mut t, _) = translator();
        let dims = WindowDimensions::new(200, 100);

        t.cursor_moved(dims, PhysicalPosition::new(150.0, 25.0));
        let down = t.mouse_input(dims, ElementState::Pressed, WinitMouseButton::Left);
        let up = t.mouse_input(dims, ElementState::Released, WinitMouseButton::Left);

        assert_eq!(down, Some(Event::button_down(MouseButton::Left, 0.5, 0.5)));
        assert_eq!(up, Some(Event::button_up(MouseButton::Left, 0.5, 0.5)));
    }

    #[test]
    fn test_tracked_cursor_anchors_button() {
        let (mut t, queue) = translator();
        let dims = WindowDimensions::new(200, 100);

        t.cursor_moved(dims, PhysicalPosition::new(0.0, 0.0));
        t.track_cursor(PhysicalPosition::new(150.0, 25.0));
        let down = t.mouse_input(dims, ElementState::Pressed, WinitMouseButton::Left);

        assert_eq!(down, Some(Event::button_down(MouseButton::Left, 0.5, 0.5)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_button_without_cursor_uses_center() {
        let (t, _) = translator();
        let dims = WindowDimensions::new(200, 100);

        let down = t.mouse_input(dims, ElementState::Pressed, WinitMouseButton::Right);
        assert_eq!(down, Some(Event::button_down(MouseButton::Right, 0.0, 0.0)));
    }

    #[test]
    fn test_modifier_mapping() {
        assert_eq!(map_modifiers(ModifiersState::empty()), Modifiers::empty());
        assert_eq!(
            map_modifiers(ModifiersState::ALT | ModifiersState::SUPER),
            Modifiers::ALT | Modifiers::SUPER
        );
    }

    #[test]
    fn test_translator_shares_queue() {
        let (t, queue) = translator();
        let clone = t.clone();
        assert!(clone.queue.is_empty());
        clone.queue.push(Event::key_down(Key::Q));
        assert_eq!(queue.drain(), vec![Event::key_down(Key::Q)]);
    }
}
