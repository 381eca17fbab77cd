use crate::error::Result;
use crate::events::{ForegroundWindow, WindowHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::r#trait::WindowProbe;

/// (handle, pid, процесс, заголовок)
const FAKE_WINDOWS: [(&str, u32, &str, &str); 4] = [
    ("dry-1", 1001, "terminal", "Terminal - dry_run"),
    ("dry-2", 1002, "browser", "Browser - dry_run"),
    ("dry-3", 1003, "editor", "Editor - dry_run"),
    ("dry-4", 1004, "game", "Game - dry_run"),
];

/// Сколько опросов подряд держится одно окно
const POLLS_PER_WINDOW: usize = 5;

pub struct DryRunProbe {
    polls: AtomicUsize,
}

impl DryRunProbe {
    pub fn new() -> Self {
        Self {
            polls: AtomicUsize::new(0),
        }
    }

    /// Имена процессов эмулируемых окон для `StaticResolver`
    pub fn process_table() -> Vec<(u32, String)> {
        FAKE_WINDOWS
            .iter()
            .map(|(_, pid, name, _)| (*pid, name.to_string()))
            .collect()
    }
}

impl WindowProbe for DryRunProbe {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn test(&self) -> Result<()> {
        Ok(())
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        let poll = self.polls.fetch_add(1, Ordering::Relaxed);
        let (handle, pid, _, title) = FAKE_WINDOWS[(poll / POLLS_PER_WINDOW) % FAKE_WINDOWS.len()];

        if poll % POLLS_PER_WINDOW == 0 {
            info!("Dry-run: эмулируем смену окна на: {}", title);
        }

        Ok(Some(ForegroundWindow::new(
            WindowHandle::new(handle),
            pid,
            title.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switches_window_after_fixed_polls() {
        let probe = DryRunProbe::new();

        let first: Vec<_> = (0..POLLS_PER_WINDOW)
            .map(|_| probe.foreground_window().unwrap().unwrap().handle)
            .collect();
        assert!(first.iter().all(|h| h.as_str() == "dry-1"));

        let next = probe.foreground_window().unwrap().unwrap();
        assert_eq!(next.handle.as_str(), "dry-2");
        assert_eq!(next.process_id, 1002);
    }

    #[test]
    fn test_process_table_covers_all_windows() {
        let table = DryRunProbe::process_table();
        assert_eq!(table.len(), FAKE_WINDOWS.len());
        assert!(table.contains(&(1003, "editor".to_string())));
    }
}
