use crate::error::Result;
use crate::events::{ForegroundWindow, WindowHandle};
use crate::tracker_error;
use std::process::{Command, Output};
use tracing::debug;

use super::r#trait::WindowProbe;

pub struct XdotoolProbe;

impl XdotoolProbe {
    pub fn new() -> Self {
        Self
    }

    fn run(args: &[&str]) -> Result<Output> {
        Command::new("xdotool").args(args).output().map_err(|e| {
            debug!("xdotool не найден или не работает: {}", e);
            tracker_error!(probe, "xdotool не найден: {}", e)
        })
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

impl WindowProbe for XdotoolProbe {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    fn test(&self) -> Result<()> {
        let output = Self::run(&["getactivewindow"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(tracker_error!(probe, "xdotool failed"))
        }
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        let id_output = Self::run(&["getactivewindow"])?;
        if !id_output.status.success() {
            // Нет активного окна (например, фокус на рабочем столе)
            debug!(
                "xdotool getactivewindow: {}",
                String::from_utf8_lossy(&id_output.stderr).trim()
            );
            return Ok(None);
        }

        let window_id = Self::stdout(&id_output);
        if window_id.is_empty() {
            return Ok(None);
        }

        let pid_output = Self::run(&["getwindowpid", &window_id])?;
        if !pid_output.status.success() {
            return Err(tracker_error!(probe, "xdotool getwindowpid {} failed", window_id));
        }
        let pid_text = Self::stdout(&pid_output);
        let process_id = pid_text
            .parse::<u32>()
            .map_err(|e| tracker_error!(probe, "xdotool вернул неверный pid '{}': {}", pid_text, e))?;

        let name_output = Self::run(&["getwindowname", &window_id])?;
        if !name_output.status.success() {
            return Err(tracker_error!(probe, "xdotool getwindowname {} failed", window_id));
        }
        let title = Self::stdout(&name_output);
        debug!("xdotool получил заголовок окна: '{}'", title);

        Ok(Some(ForegroundWindow::new(
            WindowHandle::new(window_id),
            process_id,
            title,
        )))
    }
}
