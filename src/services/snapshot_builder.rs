use crate::debug_if_enabled;
use crate::events::{WindowSnapshot, UNKNOWN_PROCESS};
use crate::services::{ProcessResolver, WindowProbe};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Склеивает ответы пробы окна и резолвера процессов в один снимок
pub struct SnapshotBuilder {
    probe: Arc<dyn WindowProbe>,
    resolver: Arc<dyn ProcessResolver>,
}

impl SnapshotBuilder {
    pub fn new(probe: Arc<dyn WindowProbe>, resolver: Arc<dyn ProcessResolver>) -> Self {
        Self { probe, resolver }
    }

    pub fn probe_name(&self) -> &'static str {
        self.probe.name()
    }

    /// `None` означает "в этот тик наблюдения нет" и не является сменой фокуса.
    pub fn capture(&self) -> Option<WindowSnapshot> {
        let window = match self.probe.foreground_window() {
            Ok(Some(window)) => window,
            Ok(None) => {
                debug!("Нет активного окна ({})", self.probe.name());
                return None;
            }
            Err(e) => {
                warn!("Не удалось получить активное окно через {}: {}", self.probe.name(), e);
                return None;
            }
        };

        let process_name = match self.resolver.name_of(window.process_id) {
            Ok(name) => name,
            Err(e) if e.is_resolver_failure() => {
                warn!("Не удалось получить имя процесса для \"{}\": {}", window.title, e);
                UNKNOWN_PROCESS.to_string()
            }
            Err(e) => {
                error!("Ошибка резолвера процессов для pid {}: {}", window.process_id, e);
                UNKNOWN_PROCESS.to_string()
            }
        };

        let snapshot = WindowSnapshot::new(window, process_name, Utc::now());
        debug_if_enabled!("Активное окно: {} [{}]", snapshot, snapshot.handle);

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TrackerError};
    use crate::events::{ForegroundWindow, WindowHandle};
    use crate::services::process_resolver::StaticResolver;
    use crate::tracker_error;

    enum Answer {
        Window,
        NoWindow,
        Failure,
    }

    struct FakeProbe(Answer);

    impl WindowProbe for FakeProbe {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn test(&self) -> Result<()> {
            Ok(())
        }

        fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
            match self.0 {
                Answer::Window => Ok(Some(ForegroundWindow::new(
                    WindowHandle::new("12345"),
                    12345,
                    "Test Window".to_string(),
                ))),
                Answer::NoWindow => Ok(None),
                Answer::Failure => Err(tracker_error!(probe, "X server went away")),
            }
        }
    }

    struct DeniedResolver;

    impl ProcessResolver for DeniedResolver {
        fn name_of(&self, process_id: u32) -> Result<String> {
            Err(TrackerError::AccessDenied(process_id))
        }
    }

    fn builder(answer: Answer, resolver: Arc<dyn ProcessResolver>) -> SnapshotBuilder {
        SnapshotBuilder::new(Arc::new(FakeProbe(answer)), resolver)
    }

    #[test]
    fn test_capture_builds_full_snapshot() {
        let resolver = Arc::new(StaticResolver::new([(12345, "test.exe".to_string())]));
        let before = Utc::now();
        let snapshot = builder(Answer::Window, resolver).capture().unwrap();

        assert_eq!(snapshot.handle.as_str(), "12345");
        assert_eq!(snapshot.process_id, 12345);
        assert_eq!(snapshot.title, "Test Window");
        assert_eq!(snapshot.process_name, "test.exe");
        assert!(snapshot.captured_at >= before);
    }

    #[test]
    fn test_missing_process_uses_sentinel() {
        let resolver = Arc::new(StaticResolver::new([]));
        let snapshot = builder(Answer::Window, resolver).capture().unwrap();

        assert_eq!(snapshot.process_name, UNKNOWN_PROCESS);
        assert_eq!(snapshot.title, "Test Window");
    }

    #[test]
    fn test_access_denied_uses_sentinel() {
        let snapshot = builder(Answer::Window, Arc::new(DeniedResolver))
            .capture()
            .unwrap();

        assert_eq!(snapshot.process_name, "Unknown");
    }

    #[test]
    fn test_probe_failure_yields_nothing() {
        let resolver = Arc::new(StaticResolver::new([]));
        assert!(builder(Answer::NoWindow, resolver.clone()).capture().is_none());
        assert!(builder(Answer::Failure, resolver).capture().is_none());
    }
}
