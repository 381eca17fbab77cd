use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Имя процесса, подставляемое когда резолвер не смог его определить
pub const UNKNOWN_PROCESS: &str = "Unknown";

/// Непрозрачный идентификатор окна, выданный ОС.
///
/// Уникален среди открытых окон в конкретный момент, но может быть
/// переиспользован после закрытия окна.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Сырой ответ пробы: активное окно без имени процесса
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    pub handle: WindowHandle,
    pub process_id: u32,
    pub title: String,
}

impl ForegroundWindow {
    pub fn new(handle: WindowHandle, process_id: u32, title: String) -> Self {
        Self {
            handle,
            process_id,
            title,
        }
    }
}

/// Снимок активного окна в момент опроса
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub handle: WindowHandle,
    pub process_id: u32,
    pub title: String,
    pub process_name: String,
    pub captured_at: DateTime<Utc>,
}

impl WindowSnapshot {
    pub fn new(window: ForegroundWindow, process_name: String, captured_at: DateTime<Utc>) -> Self {
        Self {
            handle: window.handle,
            process_id: window.process_id,
            title: window.title,
            process_name,
            captured_at,
        }
    }

    /// Тот же ли это фокус (сравнивается только handle)
    pub fn same_window(&self, other: &WindowSnapshot) -> bool {
        self.handle == other.handle
    }
}

impl fmt::Display for WindowSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({}, pid {})", self.title, self.process_name, self.process_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(handle: &str, title: &str) -> WindowSnapshot {
        WindowSnapshot::new(
            ForegroundWindow::new(WindowHandle::new(handle), 10, title.to_string()),
            "ed.exe".to_string(),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn test_snapshot_carries_probe_fields() {
        let s = snapshot("0x1a", "Editor");

        assert_eq!(s.handle.as_str(), "0x1a");
        assert_eq!(s.process_id, 10);
        assert_eq!(s.title, "Editor");
        assert_eq!(s.process_name, "ed.exe");
    }

    #[test]
    fn test_same_window_ignores_title() {
        let a = snapshot("1", "Editor - a.txt");
        let b = snapshot("1", "Editor - b.txt");
        let c = snapshot("2", "Editor - a.txt");

        assert!(a.same_window(&b));
        assert!(!a.same_window(&c));
    }

    #[test]
    fn test_display() {
        assert_eq!(snapshot("1", "Editor").to_string(), "\"Editor\" (ed.exe, pid 10)");
    }
}
