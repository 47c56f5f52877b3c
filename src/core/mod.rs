pub mod clock;
pub mod controller;
pub mod event;
pub mod event_queue;
pub mod input_adapter;
pub mod window;

pub use clock::*;
pub use controller::*;
pub use event::*;
pub use event_queue::*;
pub use input_adapter::*;
pub use window::*;
