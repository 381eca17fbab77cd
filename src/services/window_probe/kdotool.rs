use crate::error::Result;
use crate::events::{ForegroundWindow, WindowHandle};
use crate::tracker_error;
use std::collections::HashMap;
use std::process::{Command, Output};
use tracing::debug;

use super::r#trait::WindowProbe;

pub struct KdotoolProbe;

/// При запуске через sudo kdotool должен попасть в сессионную шину пользователя
fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Ok(output) = Command::new("id").args(["-u", &sudo_user]).output() {
                if let Ok(uid_str) = String::from_utf8(output.stdout) {
                    let uid = uid_str.trim();
                    let user_runtime_dir = format!("/run/user/{}", uid);
                    let dbus_address = format!("unix:path={}/bus", user_runtime_dir);

                    debug!("Подставляем переменные окружения для пользователя {}: uid={}", sudo_user, uid);
                    env_vars.insert("DBUS_SESSION_BUS_ADDRESS".to_string(), dbus_address);
                    env_vars.insert("XDG_RUNTIME_DIR".to_string(), user_runtime_dir);
                    env_vars.insert("USER".to_string(), sudo_user);
                }
            }
        }
    }

    if let Ok(display_var) = std::env::var("DISPLAY") {
        env_vars.insert("DISPLAY".to_string(), display_var);
    }

    env_vars
}

impl KdotoolProbe {
    pub fn new() -> Self {
        Self
    }

    fn create_command(args: &[&str]) -> Command {
        let mut cmd = if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            let mut cmd = Command::new("sudo");
            cmd.args(["-E", "-u", &sudo_user, "kdotool"]);
            cmd.args(args);
            cmd
        } else {
            let mut cmd = Command::new("kdotool");
            cmd.args(args);
            cmd
        };

        for (key, value) in build_env_overrides() {
            cmd.env(key, value);
        }

        cmd
    }

    fn run(args: &[&str]) -> Result<Output> {
        Self::create_command(args)
            .output()
            .map_err(|e| tracker_error!(probe, "kdotool не найден: {}", e))
    }

    fn checked(args: &[&str]) -> Result<String> {
        let output = Self::run(args)?;
        if !output.status.success() {
            debug!(
                "kdotool {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(tracker_error!(probe, "kdotool {} failed", args[0]));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl WindowProbe for KdotoolProbe {
    fn name(&self) -> &'static str {
        "kdotool"
    }

    fn test(&self) -> Result<()> {
        debug!("=== Тестируем kdotool ===");
        let window_id = Self::checked(&["getactivewindow"])?;
        debug!("kdotool получил window_id: '{}'", window_id);
        Self::checked(&["getwindowname", &window_id])?;
        debug!("=== kdotool работает ===");
        Ok(())
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        let id_output = Self::run(&["getactivewindow"])?;
        if !id_output.status.success() {
            return Ok(None);
        }

        let window_id = String::from_utf8_lossy(&id_output.stdout).trim().to_string();
        if window_id.is_empty() {
            return Ok(None);
        }

        let title = Self::checked(&["getwindowname", &window_id])?;
        let pid_text = Self::checked(&["getwindowpid", &window_id])?;
        let process_id = pid_text
            .parse::<u32>()
            .map_err(|e| tracker_error!(probe, "kdotool вернул неверный pid '{}': {}", pid_text, e))?;

        Ok(Some(ForegroundWindow::new(
            WindowHandle::new(window_id),
            process_id,
            title,
        )))
    }
}
