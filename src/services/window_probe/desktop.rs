use crate::error::Result;
use crate::tracker_error;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

use super::kdotool::KdotoolProbe;
use super::r#trait::WindowProbe;
use super::sway::SwayProbe;
use super::xdotool::XdotoolProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnvironment {
    KDE,
    Sway,
    X11Generic,
    WaylandGeneric,
    Windows,
    Unknown,
}

pub fn detect_desktop_environment() -> DesktopEnvironment {
    if cfg!(windows) {
        return DesktopEnvironment::Windows;
    }

    if std::env::var("SWAYSOCK").is_ok() {
        return DesktopEnvironment::Sway;
    }

    if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
        match desktop.to_lowercase().as_str() {
            d if d.contains("kde") => return DesktopEnvironment::KDE,
            d if d.contains("sway") => return DesktopEnvironment::Sway,
            _ => {}
        }
    }

    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        match session.as_str() {
            "wayland" => return DesktopEnvironment::WaylandGeneric,
            "x11" => return DesktopEnvironment::X11Generic,
            _ => {}
        }
    }

    if let Ok(output) = Command::new("pgrep").arg("-f").arg("kwin").output() {
        if !output.stdout.is_empty() {
            return DesktopEnvironment::KDE;
        }
    }

    DesktopEnvironment::Unknown
}

/// Порядок перебора бэкендов для среды; первым идёт самый вероятный
fn candidates(env: DesktopEnvironment) -> Vec<Arc<dyn WindowProbe>> {
    let kdotool: Arc<dyn WindowProbe> = Arc::new(KdotoolProbe::new());
    let xdotool: Arc<dyn WindowProbe> = Arc::new(XdotoolProbe::new());
    let sway: Arc<dyn WindowProbe> = Arc::new(SwayProbe::new());

    match env {
        DesktopEnvironment::KDE => vec![kdotool, xdotool],
        DesktopEnvironment::Sway => vec![sway],
        DesktopEnvironment::X11Generic => vec![xdotool],
        DesktopEnvironment::Windows => windows_candidates(),
        DesktopEnvironment::WaylandGeneric | DesktopEnvironment::Unknown => {
            vec![kdotool, xdotool, sway]
        }
    }
}

#[cfg(windows)]
fn windows_candidates() -> Vec<Arc<dyn WindowProbe>> {
    vec![Arc::new(super::win32::Win32Probe::new())]
}

#[cfg(not(windows))]
fn windows_candidates() -> Vec<Arc<dyn WindowProbe>> {
    Vec::new()
}

/// Определяет рабочий бэкенд для режима `auto`
pub fn detect_working_backend() -> Result<Arc<dyn WindowProbe>> {
    let env = detect_desktop_environment();
    info!("Обнаружена среда рабочего стола: {:?}", env);
    info!("Определяем рабочий метод опроса окон...");

    for probe in candidates(env) {
        match probe.test() {
            Ok(()) => {
                info!("Используем {}", probe.name());
                return Ok(probe);
            }
            Err(e) => debug!("{} не работает: {}", probe.name(), e),
        }
    }

    Err(tracker_error!(service_unavailable, "Ни один метод опроса окон не работает"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_follow_environment() {
        let names: Vec<&str> = candidates(DesktopEnvironment::KDE)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["kdotool", "xdotool"]);

        let names: Vec<&str> = candidates(DesktopEnvironment::Sway)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["sway"]);

        assert_eq!(candidates(DesktopEnvironment::Unknown).len(), 3);
    }
}
