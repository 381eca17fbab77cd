pub mod session;
pub mod window;

pub use session::FocusSession;
pub use window::{ForegroundWindow, WindowHandle, WindowSnapshot, UNKNOWN_PROCESS};
