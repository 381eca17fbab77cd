use crate::config::Config;
use crate::error::Result;
use crate::tracker_error;
use crate::events::ForegroundWindow;
use std::sync::Arc;
use tracing::info;

use super::desktop::detect_working_backend;
use super::dry_run::DryRunProbe;
use super::kdotool::KdotoolProbe;
use super::sway::SwayProbe;
use super::xdotool::XdotoolProbe;

/// Source of the current foreground window.
///
/// Implementations are blocking and are called from the blocking pool.
pub trait WindowProbe: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Check that the backend works in this session
    fn test(&self) -> Result<()>;

    /// `Ok(None)` means there is no foreground window right now;
    /// `Err` is an API failure. Both mean "no observation this tick".
    fn foreground_window(&self) -> Result<Option<ForegroundWindow>>;
}

/// Factory function to create a window probe from the configured backend
pub fn create_window_probe(config: &Config, dry_run: bool) -> Result<Arc<dyn WindowProbe>> {
    if dry_run {
        info!("Dry-run режим - используется эмуляция окон");
        return Ok(Arc::new(DryRunProbe::new()));
    }

    let probe: Arc<dyn WindowProbe> = match config.probe.backend.as_str() {
        "auto" => detect_working_backend()?,
        "xdotool" => Arc::new(XdotoolProbe::new()),
        "kdotool" => Arc::new(KdotoolProbe::new()),
        "sway" => Arc::new(SwayProbe::new()),
        "dry_run" => Arc::new(DryRunProbe::new()),
        #[cfg(windows)]
        "windows" => Arc::new(super::win32::Win32Probe::new()),
        other => {
            return Err(tracker_error!(
                service_unavailable,
                "бэкенд пробы '{}' недоступен на этой платформе",
                other
            ))
        }
    };

    info!("Проба активного окна: {}", probe.name());
    Ok(probe)
}
