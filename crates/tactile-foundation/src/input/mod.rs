//! Touch input: sessions, listener streams and the window that routes them.

mod session;
mod stream;
mod types;
mod window;

pub use session::TouchSession;
pub use stream::{NextMove, TouchDowns, TouchMoves, TouchRef, WindowMoves};
pub use types::{MouseButton, TouchId, TouchInput, TouchMotion, WheelDirection};
pub use window::{ongoing_drags, Window};
