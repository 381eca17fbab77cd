//! WindowProbe service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for asking the desktop
//! which window has focus (handle, owning pid, title). They MUST NOT resolve
//! process names or keep any focus history. Process names come from
//! ProcessResolver, session accounting belongs exclusively to FocusTracker.

mod desktop;
mod dry_run;
mod kdotool;
mod sway;
mod r#trait;
#[cfg(windows)]
mod win32;
mod xdotool;

pub use self::dry_run::DryRunProbe;
pub use self::r#trait::{create_window_probe, WindowProbe};
