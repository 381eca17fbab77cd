use crate::error::{Result, TrackerError};
use std::collections::HashMap;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Resolves a process id into a human-readable process name.
pub trait ProcessResolver: Send + Sync {
    /// Fails with `ProcessNotFound` if the process is gone and with
    /// `AccessDenied` if it cannot be inspected.
    fn name_of(&self, process_id: u32) -> Result<String>;
}

/// Резолвер на базе sysinfo.
///
/// Каждый запрос читает процесс заново; завершённый или зомби-процесс
/// даёт `ProcessNotFound`.
#[derive(Default)]
pub struct SysinfoResolver;

impl SysinfoResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessResolver for SysinfoResolver {
    fn name_of(&self, process_id: u32) -> Result<String> {
        let pid = Pid::from_u32(process_id);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        let process = system
            .process(pid)
            .ok_or(TrackerError::ProcessNotFound(process_id))?;

        if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
            return Err(TrackerError::ProcessNotFound(process_id));
        }

        let name = process.name().to_string_lossy().into_owned();
        if name.is_empty() {
            // Процесс виден, но его метаданные закрыты
            return Err(TrackerError::AccessDenied(process_id));
        }

        Ok(name)
    }
}

/// Фиксированная таблица pid -> имя (dry-run режим)
pub struct StaticResolver {
    names: HashMap<u32, String>,
}

impl StaticResolver {
    pub fn new(names: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }
}

impl ProcessResolver for StaticResolver {
    fn name_of(&self, process_id: u32) -> Result<String> {
        self.names
            .get(&process_id)
            .cloned()
            .ok_or(TrackerError::ProcessNotFound(process_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_resolves_own_process() {
        let resolver = SysinfoResolver::new();
        let name = resolver.name_of(std::process::id()).unwrap();
        assert!(!name.is_empty());
    }

    #[test]
    fn test_sysinfo_missing_process_is_not_found() {
        let resolver = SysinfoResolver::new();
        assert!(matches!(
            resolver.name_of(u32::MAX - 1),
            Err(TrackerError::ProcessNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_sysinfo_forgets_exited_process() {
        let resolver = SysinfoResolver::new();
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        assert_eq!(resolver.name_of(pid).unwrap(), "sleep");

        child.kill().unwrap();
        child.wait().unwrap();

        assert!(matches!(resolver.name_of(pid), Err(TrackerError::ProcessNotFound(p)) if p == pid));
    }

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new([(7, "ed.exe".to_string())]);

        assert_eq!(resolver.name_of(7).unwrap(), "ed.exe");
        assert!(matches!(resolver.name_of(8), Err(TrackerError::ProcessNotFound(8))));
    }
}
